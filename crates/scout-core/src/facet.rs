//! Facet projection of an aggregated result. Pure view-state: switching the
//! active facet never re-fetches or re-ranks anything.

use serde::{Deserialize, Serialize};

use crate::model::{AggregatedResult, EntityKind, Project, Query, ScoredMatch, Task, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveFacet {
    #[default]
    All,
    Tasks,
    Projects,
    Users,
}

impl ActiveFacet {
    /// Cycling order used by interactive front ends.
    pub const ALL: [ActiveFacet; 4] = [Self::All, Self::Tasks, Self::Projects, Self::Users];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// The single entity kind this facet selects, `None` for `All`.
    pub fn kind(self) -> Option<EntityKind> {
        match self {
            Self::All => None,
            Self::Tasks => Some(EntityKind::Task),
            Self::Projects => Some(EntityKind::Project),
            Self::Users => Some(EntityKind::User),
        }
    }
}

impl std::fmt::Display for ActiveFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Tasks => write!(f, "tasks"),
            Self::Projects => write!(f, "projects"),
            Self::Users => write!(f, "users"),
        }
    }
}

impl std::str::FromStr for ActiveFacet {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "tasks" | "task" => Ok(Self::Tasks),
            "projects" | "project" => Ok(Self::Projects),
            "users" | "user" => Ok(Self::Users),
            _ => Err(format!("unknown facet: {s}")),
        }
    }
}

/// Borrowed view of one ranked sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultSection<'a> {
    Tasks(&'a [ScoredMatch<Task>]),
    Projects(&'a [ScoredMatch<Project>]),
    Users(&'a [ScoredMatch<User>]),
}

impl ResultSection<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Tasks(_) => EntityKind::Task,
            Self::Projects(_) => EntityKind::Project,
            Self::Users(_) => EntityKind::User,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Tasks(m) => m.len(),
            Self::Projects(m) => m.len(),
            Self::Users(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn section(result: &AggregatedResult, kind: EntityKind) -> ResultSection<'_> {
    match kind {
        EntityKind::Task => ResultSection::Tasks(&result.tasks),
        EntityKind::Project => ResultSection::Projects(&result.projects),
        EntityKind::User => ResultSection::Users(&result.users),
    }
}

/// Select the sections to render for `facet`.
///
/// `All` yields every non-empty sequence in tasks, projects, users order.
/// A specific facet yields exactly its own sequence, even when empty.
pub fn project(result: &AggregatedResult, facet: ActiveFacet) -> Vec<ResultSection<'_>> {
    match facet.kind() {
        Some(kind) => vec![section(result, kind)],
        None => [EntityKind::Task, EntityKind::Project, EntityKind::User]
            .into_iter()
            .map(|kind| section(result, kind))
            .filter(|s| !s.is_empty())
            .collect(),
    }
}

/// Owned copy of a projected section, suitable for publishing to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "matches", rename_all = "lowercase")]
pub enum Section {
    Tasks(Vec<ScoredMatch<Task>>),
    Projects(Vec<ScoredMatch<Project>>),
    Users(Vec<ScoredMatch<User>>),
}

impl Section {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Tasks(_) => EntityKind::Task,
            Self::Projects(_) => EntityKind::Project,
            Self::Users(_) => EntityKind::User,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Tasks(m) => m.len(),
            Self::Projects(m) => m.len(),
            Self::Users(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(label, distance)` pairs in ranked order.
    pub fn entries(&self) -> Vec<(&str, f64)> {
        match self {
            Self::Tasks(m) => m.iter().map(|s| (s.label(), s.distance)).collect(),
            Self::Projects(m) => m.iter().map(|s| (s.label(), s.distance)).collect(),
            Self::Users(m) => m.iter().map(|s| (s.label(), s.distance)).collect(),
        }
    }
}

impl From<ResultSection<'_>> for Section {
    fn from(section: ResultSection<'_>) -> Self {
        match section {
            ResultSection::Tasks(m) => Self::Tasks(m.to_vec()),
            ResultSection::Projects(m) => Self::Projects(m.to_vec()),
            ResultSection::Users(m) => Self::Users(m.to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub query: Query,
    pub generation: u64,
    pub facet: ActiveFacet,
    pub sections: Vec<Section>,
}

impl Projection {
    pub fn new(result: &AggregatedResult, facet: ActiveFacet) -> Self {
        Self {
            query: result.query.clone(),
            generation: result.generation,
            facet,
            sections: project(result, facet).into_iter().map(Section::from).collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

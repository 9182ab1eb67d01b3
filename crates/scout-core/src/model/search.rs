use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::entity::{CandidateEntity, EntityKind, Matchable, Project, Task, User};

/// The user's current search intent. Cheap to clone, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(Arc<str>);

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Arc::from(text.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lower-cased form submitted to the remote API.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Raw payload of the search endpoint. Any variant may be missing or `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
    #[serde(default)]
    pub projects: Option<Vec<Project>>,
    #[serde(default)]
    pub users: Option<Vec<User>>,
}

impl SearchResponse {
    /// Missing variants become empty sequences.
    pub fn into_candidates(self) -> CandidateSet {
        for (kind, missing) in [
            (EntityKind::Task, self.tasks.is_none()),
            (EntityKind::Project, self.projects.is_none()),
            (EntityKind::User, self.users.is_none()),
        ] {
            if missing {
                tracing::debug!(%kind, "search response has no sequence for variant, treating as empty");
            }
        }

        CandidateSet {
            tasks: self.tasks.unwrap_or_default(),
            projects: self.projects.unwrap_or_default(),
            users: self.users.unwrap_or_default(),
        }
    }
}

/// Unranked candidates for one query, one sequence per variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub users: Vec<User>,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.tasks.len() + self.projects.len() + self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into the tagged union, tasks first, then projects, then users.
    pub fn into_entities(self) -> Vec<CandidateEntity> {
        let mut entities = Vec::with_capacity(self.len());
        entities.extend(self.tasks.into_iter().map(CandidateEntity::from));
        entities.extend(self.projects.into_iter().map(CandidateEntity::from));
        entities.extend(self.users.into_iter().map(CandidateEntity::from));
        entities
    }
}

/// A candidate paired with its match distance in `[0.0, 1.0]`, 0.0 being perfect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch<T> {
    pub item: T,
    pub distance: f64,
    /// Position of the item in the candidate sequence it was ranked from.
    pub index: usize,
}

impl<T: Matchable> ScoredMatch<T> {
    pub fn kind(&self) -> EntityKind {
        T::KIND
    }

    pub fn label(&self) -> &str {
        self.item.match_key()
    }
}

/// Ranked matches for one settled query. All three sequences come from the
/// same query snapshot; a newer query replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub query: Query,
    pub generation: u64,
    pub tasks: Vec<ScoredMatch<Task>>,
    pub projects: Vec<ScoredMatch<Project>>,
    pub users: Vec<ScoredMatch<User>>,
}

impl AggregatedResult {
    pub fn total(&self) -> usize {
        self.tasks.len() + self.projects.len() + self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Task => self.tasks.len(),
            EntityKind::Project => self.projects.len(),
            EntityKind::User => self.users.len(),
        }
    }
}

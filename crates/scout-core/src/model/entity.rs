use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the three searchable entity types a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    Project,
    User,
}

impl EntityKind {
    /// Plural heading used when rendering a result section.
    pub fn section_title(&self) -> &'static str {
        match self {
            Self::Task => "Tasks",
            Self::Project => "Projects",
            Self::User => "Users",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Project => write!(f, "project"),
            Self::User => write!(f, "user"),
        }
    }
}

/// An entity that exposes exactly one text field for fuzzy comparison.
pub trait Matchable {
    const KIND: EntityKind;

    /// The designated matchable field: `title`, `name` or `username`.
    fn match_key(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "Work In Progress")]
    WorkInProgress,
    #[serde(rename = "Under Review")]
    UnderReview,
    Completed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToDo => write!(f, "To Do"),
            Self::WorkInProgress => write!(f, "Work In Progress"),
            Self::UnderReview => write!(f, "Under Review"),
            Self::Completed => write!(f, "Completed"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
    Backlog,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Urgent => write!(f, "Urgent"),
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
            Self::Backlog => write!(f, "Backlog"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Comma-separated tag list, as stored by the API.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub points: Option<i32>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub author_user_id: Option<i64>,
    #[serde(default)]
    pub assigned_user_id: Option<i64>,
}

impl Task {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            tags: None,
            start_date: None,
            due_date: None,
            points: None,
            project_id: None,
            author_user_id: None,
            assigned_user_id: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_project(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Matchable for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn match_key(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl Matchable for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn match_key(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub cognito_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
}

impl User {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            email: None,
            profile_picture_url: None,
            cognito_id: None,
            team_id: None,
        }
    }
}

impl Matchable for User {
    const KIND: EntityKind = EntityKind::User;

    fn match_key(&self) -> &str {
        &self.username
    }
}

/// Tagged union over the three searchable entity types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CandidateEntity {
    Task(Task),
    Project(Project),
    User(User),
}

impl CandidateEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Task(_) => EntityKind::Task,
            Self::Project(_) => EntityKind::Project,
            Self::User(_) => EntityKind::User,
        }
    }

    pub fn match_key(&self) -> &str {
        match self {
            Self::Task(t) => t.match_key(),
            Self::Project(p) => p.match_key(),
            Self::User(u) => u.match_key(),
        }
    }
}

impl From<Task> for CandidateEntity {
    fn from(task: Task) -> Self {
        Self::Task(task)
    }
}

impl From<Project> for CandidateEntity {
    fn from(project: Project) -> Self {
        Self::Project(project)
    }
}

impl From<User> for CandidateEntity {
    fn from(user: User) -> Self {
        Self::User(user)
    }
}

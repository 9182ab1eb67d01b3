//! Gantt-style timeline rows for a project's tasks.
//!
//! Every task becomes one bar. Missing dates fall back to "now", progress is
//! derived from story points, and a project with no tasks still renders a
//! single disabled placeholder bar spanning one day.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Task;

pub const PLACEHOLDER_ID: &str = "default-task";
pub const PLACEHOLDER_NAME: &str = "No tasks yet";

/// Time scale of the timeline grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    Week,
    #[default]
    Month,
}

impl ViewMode {
    /// Width of one grid column in pixels.
    pub fn column_width(self) -> u32 {
        match self {
            Self::Month => 150,
            Self::Day | Self::Week => 100,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(format!("unknown view mode: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Percent complete. Not clamped: more than 10 points reads above 100.
    pub progress: f64,
    pub disabled: bool,
}

impl TimelineRow {
    fn placeholder(now: DateTime<Utc>) -> Self {
        Self {
            id: PLACEHOLDER_ID.to_string(),
            name: PLACEHOLDER_NAME.to_string(),
            start: now,
            end: now + Duration::days(1),
            progress: 0.0,
            disabled: true,
        }
    }

    fn from_task(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("Task-{}", task.id),
            name: task.title.clone(),
            start: task.start_date.unwrap_or(now),
            end: task.due_date.unwrap_or(now),
            progress: task
                .points
                .map(|p| f64::from(p) / 10.0 * 100.0)
                .unwrap_or(0.0),
            disabled: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.disabled && self.id == PLACEHOLDER_ID
    }
}

/// One bar per task, in input order; a single placeholder for no tasks.
pub fn rows(tasks: &[Task], now: DateTime<Utc>) -> Vec<TimelineRow> {
    if tasks.is_empty() {
        return vec![TimelineRow::placeholder(now)];
    }
    tasks.iter().map(|t| TimelineRow::from_task(t, now)).collect()
}

/// A project's timeline as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub project_id: i64,
    pub view_mode: ViewMode,
    pub column_width: u32,
    pub rows: Vec<TimelineRow>,
}

impl Timeline {
    pub fn new(project_id: i64, tasks: &[Task], view_mode: ViewMode, now: DateTime<Utc>) -> Self {
        Self {
            project_id,
            view_mode,
            column_width: view_mode.column_width(),
            rows: rows(tasks, now),
        }
    }

    /// Number of real tasks shown; the placeholder does not count.
    pub fn task_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_placeholder()).count()
    }
}

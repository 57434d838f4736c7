use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub done_at: DateTime<Utc>, // completion/archive time; equals created_at until archived
    pub is_done: bool,
    pub is_removed: bool,
    pub position: i64, // ordering key among active tasks, lower first
}

impl Task {
    pub fn new(text: String, position: i64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            text,
            created_at: now,
            done_at: now,
            is_done: false,
            is_removed: false,
            position,
        }
    }

    /// A task that has not been archived yet
    pub fn is_active(&self) -> bool {
        !self.is_removed
    }

    /// Copy of this task marked as archived at `now`
    pub fn archived_at(&self, now: DateTime<Utc>) -> Self {
        Self {
            is_removed: true,
            done_at: now,
            ..self.clone()
        }
    }

    pub fn toggled(&self) -> Self {
        Self {
            is_done: !self.is_done,
            ..self.clone()
        }
    }
}

/// Where newly added tasks land in the active list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    #[default]
    Top,
    Bottom,
}

impl InsertPosition {
    pub fn label(self) -> &'static str {
        match self {
            InsertPosition::Top => "Top of the list",
            InsertPosition::Bottom => "Bottom of the list",
        }
    }
}

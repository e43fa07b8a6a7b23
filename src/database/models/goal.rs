use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Goal lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Expired,
}

impl GoalStatus {
    /// Case-insensitive parse of a stored status label
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "active" => Some(GoalStatus::Active),
            "completed" => Some(GoalStatus::Completed),
            "expired" => Some(GoalStatus::Expired),
            _ => None,
        }
    }
}

/// Goal document stored at `users/{user_id}/goals/{id}`
///
/// Fields beyond `id`, `title` and `status` are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `goal` object of a create request, before an id is assigned
#[derive(Debug, Clone, Deserialize)]
pub struct NewGoal {
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<GoalStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body of `POST /api/user/:user_id/goals`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub user_id: Option<String>,
    pub goal: Option<NewGoal>,
}

impl NewGoal {
    /// Trimmed title, `None` when missing or blank
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Attach a store-assigned id; a caller-supplied `id` never overrides it
    pub fn into_goal(self, id: String) -> Option<Goal> {
        let title = self.title()?.to_string();
        let mut extra = self.extra;
        extra.remove("id");
        Some(Goal {
            id,
            title,
            status: self.status.unwrap_or_default(),
            extra,
        })
    }
}

/// Per-status goal counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub active: usize,
    pub completed: usize,
    pub expired: usize,
}

/// Aggregate view of one user's goals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub total: usize,
    pub by_status: StatusCounts,
}

impl GoalSummary {
    pub fn from_statuses(statuses: impl IntoIterator<Item = GoalStatus>) -> Self {
        let mut summary = Self::default();
        for status in statuses {
            summary.total += 1;
            match status {
                GoalStatus::Active => summary.by_status.active += 1,
                GoalStatus::Completed => summary.by_status.completed += 1,
                GoalStatus::Expired => summary.by_status.expired += 1,
            }
        }
        summary
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::goal::Goal;

/// Profile document stored at `users/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<Goal>>,
}

/// Body of `PUT /api/user/:user_id`, the identity provider's provisioning sync
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionProfile {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Body of `PATCH /api/user/:user_id`; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

impl UserProfile {
    pub fn provisioned(id: &str, body: ProvisionProfile, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            created_at,
            updated_at: None,
            goals: None,
        }
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

// models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::parse_expiry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: Uuid,
    pub text: String,
    pub votes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub options: Vec<PollOption>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// What the poll-creation form submits. Nothing here is checked until it goes
/// through [`crate::validation::validate_create_poll`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollDraft {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub total_votes: u32,
    pub expires_at: String,
}

impl Poll {
    /// Builds a poll from a draft that already passed validation.
    ///
    /// Text is trimmed and blank options are dropped here, since the
    /// validator only counts them.
    pub fn from_draft(draft: &PollDraft, created_by: &str, now: DateTime<Utc>) -> Self {
        let options = draft
            .options
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .map(|text| PollOption {
                id: Uuid::new_v4(),
                text: text.to_string(),
                votes: 0,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            options,
            created_by: created_by.to_string(),
            created_at: now,
            expires_at: draft.expires_at.as_deref().and_then(parse_expiry),
            is_active: true,
        }
    }
}

/// Demo listing shown on the polls page until persistence exists.
pub fn demo_polls() -> Vec<PollSummary> {
    vec![
        PollSummary {
            id: 1,
            title: "What's your favorite programming language?".to_string(),
            description:
                "A poll to see which programming languages are most popular among developers"
                    .to_string(),
            total_votes: 156,
            expires_at: "2024-12-31".to_string(),
        },
        PollSummary {
            id: 2,
            title: "Best framework for web development?".to_string(),
            description: "Vote for your preferred web development framework".to_string(),
            total_votes: 89,
            expires_at: "2024-12-25".to_string(),
        },
    ]
}

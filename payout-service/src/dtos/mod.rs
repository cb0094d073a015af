//! Request and response bodies for the payout endpoints.

use crate::services::progress::TaskProgress;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Body of `POST /payment-entries/bulk-pay-and-submit`.
///
/// `docnames` accepts either a JSON array or a JSON-encoded array string,
/// which is what spreadsheet-driven clients send.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkPayAndSubmitRequest {
    #[validate(length(min = 1, message = "auth_id is required"))]
    pub auth_id: String,
    #[serde(deserialize_with = "list_or_json_string")]
    pub docnames: Vec<String>,
    /// Force the online-payment flag on every document before validation.
    #[serde(default)]
    pub mark_online_payment: bool,
    /// Client-chosen progress channel id; generated when absent on the
    /// queued path.
    #[serde(default)]
    pub task_id: Option<String>,
}

fn list_or_json_string<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeList {
        List(Vec<String>),
        Encoded(String),
    }

    match MaybeList::deserialize(deserializer)? {
        MaybeList::List(names) => Ok(names),
        MaybeList::Encoded(raw) => serde_json::from_str(&raw).map_err(serde::de::Error::custom),
    }
}

/// Outcome of a bulk dispatch.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkPayAndSubmitResponse {
    /// The batch ran inline; the failed names are final.
    Completed { failed: Vec<String> },
    /// The batch was accepted for background execution; results arrive on
    /// the progress channel.
    Queued { task_id: String, message: String },
}

#[derive(Debug, Serialize)]
pub struct AuthorizationCheckResponse {
    pub name: String,
    pub authorized: bool,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizationQuery {
    pub auth_id: String,
}

#[derive(Debug, Serialize)]
pub struct TaskProgressResponse {
    pub task_id: String,
    #[serde(flatten)]
    pub progress: TaskProgress,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single notification as delivered by the LifeLink API.
///
/// `read` is the only field that ever changes after creation; everything else
/// is immutable once the server has assigned it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// Free-form category tag, e.g. "request" or "system".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for the administrative/test creation path
/// (`POST /notifications`). The server assigns `id`, `read` and `createdAt`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Query parameters for `GET /notifications`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread_only: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Sort key for the derived sort query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Kind,
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Aggregate summary over the current local list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationStats {
    pub total: usize,
    pub unread: usize,
    pub read: usize,
    /// Record count per category tag.
    pub by_kind: BTreeMap<String, usize>,
    /// Records created since UTC midnight.
    pub today: usize,
}

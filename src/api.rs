//! HTTP client for the LifeLink notification API.
//!
//! Every endpoint answers with the `{success, data?, message?}` envelope.
//! A transport error, a non-2xx status, a malformed envelope and
//! `success: false` are all the same kind of failure to callers: an
//! [`ApiError`] whose display string carries the server's `message` when
//! one was given.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

use crate::errors::ApiError;
use crate::models::notification::{FetchParams, NewNotification, Notification};

/// The `{success, data?, message?}` response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of a successful `GET /notifications`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchData {
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub unread_count: usize,
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    /// Bearer token for the current session; absent while logged out.
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// `base` should point at the API root, e.g. `https://api.lifelink.example/api/v1/`.
    /// A missing trailing slash is corrected so endpoint joins resolve under it.
    pub fn new(base: Url, token: Option<String>) -> Result<Self, ApiError> {
        let base = if base.path().ends_with('/') {
            base
        } else {
            Url::parse(&format!("{base}/"))?
        };
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent("LifeLink-Notify/1.0")
                .build()
                .expect("failed to build notify HTTP client"),
            base,
            token: RwLock::new(token),
        })
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock poisoned") = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    fn bearer(&self) -> Result<String, ApiError> {
        self.token
            .read()
            .expect("token lock poisoned")
            .clone()
            .ok_or(ApiError::MissingAuth)
    }

    /// Check status, decode the envelope, and unwrap `success`.
    async fn envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<Envelope<T>, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                code: status.as_u16(),
                body,
            });
        }
        let envelope: Envelope<T> = resp.json().await.map_err(|e| {
            tracing::debug!(error = %e, "failed to decode response envelope");
            ApiError::MalformedEnvelope
        })?;
        if !envelope.success {
            return Err(ApiError::Rejected {
                message: envelope
                    .message
                    .unwrap_or_else(|| "remote reported failure".to_string()),
            });
        }
        Ok(envelope)
    }

    /// Decode an envelope whose `data` is required.
    async fn data<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        Self::envelope::<T>(resp)
            .await?
            .data
            .ok_or(ApiError::MalformedEnvelope)
    }

    /// Decode an acknowledgement envelope (`{success}` with no payload).
    async fn ack(resp: reqwest::Response) -> Result<(), ApiError> {
        Self::envelope::<serde_json::Value>(resp).await.map(|_| ())
    }

    // ── Notification endpoints ────────────────────────────────

    pub async fn fetch(&self, params: &FetchParams) -> Result<FetchData, ApiError> {
        let resp = self
            .http
            .get(self.endpoint("notifications")?)
            .bearer_auth(self.bearer()?)
            .query(params)
            .send()
            .await?;
        Self::data(resp).await
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .patch(self.endpoint(&format!("notifications/{id}/read"))?)
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        Self::ack(resp).await
    }

    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        let resp = self
            .http
            .patch(self.endpoint("notifications/read-all")?)
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        Self::ack(resp).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.endpoint(&format!("notifications/{id}"))?)
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        Self::ack(resp).await
    }

    pub async fn delete_all(&self) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.endpoint("notifications")?)
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        Self::ack(resp).await
    }

    pub async fn create(&self, record: &NewNotification) -> Result<Notification, ApiError> {
        let resp = self
            .http
            .post(self.endpoint("notifications")?)
            .bearer_auth(self.bearer()?)
            .json(record)
            .send()
            .await?;
        Self::data(resp).await
    }

    // ── Settings passthrough ──────────────────────────────────
    //
    // The settings object (category toggles, frequency, quiet hours) is
    // server-defined and never interpreted client-side.

    pub async fn settings(&self) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .http
            .get(self.endpoint("notifications/settings")?)
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        Self::data(resp).await
    }

    pub async fn update_settings(
        &self,
        settings: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .http
            .put(self.endpoint("notifications/settings")?)
            .bearer_auth(self.bearer()?)
            .json(settings)
            .send()
            .await?;
        let envelope = Self::envelope::<serde_json::Value>(resp).await?;
        Ok(envelope.data.unwrap_or(serde_json::Value::Null))
    }
}

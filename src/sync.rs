//! Store + remote reconciliation and session lifecycle.
//!
//! `NotificationSync` owns the local [`StoreState`], the [`ApiClient`] and
//! the [`Poller`]. Every operation fails soft: a remote failure collapses
//! into a string recorded in the store's `last_error` and returned as
//! `Err(String)`, and prior local state stays intact (the optimistic
//! mark-as-read is rolled back on failure rather than left to drift).
//!
//! The handle is an explicitly constructed object, cloned and passed by
//! reference to consumers; there is no global instance. Dropping the last
//! handle aborts the polling task.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use crate::api::ApiClient;
use crate::models::notification::{
    FetchParams, NewNotification, Notification, NotificationStats, SortDirection, SortField,
};
use crate::poller::Poller;
use crate::store::StoreState;

/// Fail-soft operation outcome: `Err` carries the same string that was
/// recorded in `last_error`.
pub type OpResult<T = ()> = Result<T, String>;

#[derive(Clone)]
pub struct NotificationSync {
    inner: Arc<Inner>,
}

struct Inner {
    store: Mutex<StoreState>,
    api: ApiClient,
    poller: Mutex<Poller>,
    poll_interval: Duration,
}

impl NotificationSync {
    pub fn new(api: ApiClient, poll_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(StoreState::new()),
                api,
                poller: Mutex::new(Poller::new()),
                poll_interval,
            }),
        }
    }

    /// Lock the store. Held only across pure state transitions, never
    /// across an await.
    fn store(&self) -> MutexGuard<'_, StoreState> {
        self.inner.store.lock().expect("store mutex poisoned")
    }

    fn poller(&self) -> MutexGuard<'_, Poller> {
        self.inner.poller.lock().expect("poller mutex poisoned")
    }

    /// Record a failure and hand the same string back to the caller.
    fn fail<T>(&self, message: String) -> OpResult<T> {
        tracing::debug!(error = %message, "notification operation failed");
        self.store().record_error(message.clone());
        Err(message)
    }

    // ── Session lifecycle ─────────────────────────────────────

    /// Install the session token, do the initial fetch, and start polling.
    ///
    /// The poller starts even when the initial fetch fails; the next tick
    /// retries. The returned result reflects the initial fetch.
    pub async fn login(&self, token: String) -> OpResult {
        self.inner.api.set_token(Some(token));
        let initial = self.refresh(FetchParams::default()).await;

        // The tick holds only a weak handle so the polling task never keeps
        // the sync state alive on its own.
        let weak = Arc::downgrade(&self.inner);
        self.poller().start(self.inner.poll_interval, move || {
            let weak = Weak::clone(&weak);
            async move {
                match weak.upgrade() {
                    Some(inner) => {
                        NotificationSync { inner }
                            .refresh(FetchParams::default())
                            .await
                    }
                    None => Ok(()),
                }
            }
        });
        initial
    }

    /// Stop polling, drop the token, and clear session-owned local state.
    pub fn logout(&self) {
        self.poller().stop();
        self.inner.api.set_token(None);
        let mut store = self.store();
        store.clear_local();
        store.clear_error();
        tracing::info!("notification session closed");
    }

    pub fn is_polling(&self) -> bool {
        self.poller().is_polling()
    }

    // ── Remote-backed operations ──────────────────────────────

    /// Fetch and wholesale-replace the local list. On failure the existing
    /// list is untouched.
    pub async fn refresh(&self, params: FetchParams) -> OpResult {
        match self.inner.api.fetch(&params).await {
            Ok(data) => {
                let mut store = self.store();
                store.replace(data.notifications, data.unread_count);
                store.clear_error();
                tracing::debug!(
                    total = store.notifications().len(),
                    unread = store.unread_count(),
                    "notification list refreshed"
                );
                Ok(())
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Optimistically flip `read` locally, then tell the server. A failed
    /// remote write rolls the flip back so the counter never drifts.
    pub async fn mark_as_read(&self, id: &str) -> OpResult {
        let changed = self.store().mark_read_local(id);
        match self.inner.api.mark_read(id).await {
            Ok(()) => {
                self.store().clear_error();
                Ok(())
            }
            Err(e) => {
                if changed {
                    self.store().unmark_read_local(id);
                }
                self.fail(e.to_string())
            }
        }
    }

    pub async fn mark_all_as_read(&self) -> OpResult {
        match self.inner.api.mark_all_read().await {
            Ok(()) => {
                let mut store = self.store();
                store.mark_all_read_local();
                store.clear_error();
                Ok(())
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    pub async fn delete(&self, id: &str) -> OpResult {
        match self.inner.api.delete(id).await {
            Ok(()) => {
                let mut store = self.store();
                store.remove_local(id);
                store.clear_error();
                Ok(())
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    pub async fn clear_all(&self) -> OpResult {
        match self.inner.api.delete_all().await {
            Ok(()) => {
                let mut store = self.store();
                store.clear_local();
                store.clear_error();
                Ok(())
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Administrative/test path: create on the server, then prepend the
    /// record the server returns.
    pub async fn create(&self, record: NewNotification) -> OpResult<Notification> {
        match self.inner.api.create(&record).await {
            Ok(created) => {
                let mut store = self.store();
                store.insert_local(created.clone());
                store.clear_error();
                Ok(created)
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    // ── Settings passthrough (no local state) ─────────────────

    pub async fn settings(&self) -> OpResult<serde_json::Value> {
        match self.inner.api.settings().await {
            Ok(v) => Ok(v),
            Err(e) => self.fail(e.to_string()),
        }
    }

    pub async fn update_settings(&self, settings: serde_json::Value) -> OpResult<serde_json::Value> {
        match self.inner.api.update_settings(&settings).await {
            Ok(v) => Ok(v),
            Err(e) => self.fail(e.to_string()),
        }
    }

    // ── Snapshots and derived queries ─────────────────────────

    pub fn notifications(&self) -> Vec<Notification> {
        self.store().notifications().to_vec()
    }

    pub fn unread_count(&self) -> usize {
        self.store().unread_count()
    }

    pub fn last_error(&self) -> Option<String> {
        self.store().last_error().map(str::to_string)
    }

    pub fn by_kind(&self, kind: &str) -> Vec<Notification> {
        self.store().by_kind(kind).into_iter().cloned().collect()
    }

    pub fn in_range(
        &self,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> Vec<Notification> {
        self.store().in_range(from, to).into_iter().cloned().collect()
    }

    pub fn partition(&self) -> (Vec<Notification>, Vec<Notification>) {
        let store = self.store();
        let (unread, read) = store.partition();
        (
            unread.into_iter().cloned().collect(),
            read.into_iter().cloned().collect(),
        )
    }

    pub fn sorted(&self, field: SortField, direction: SortDirection) -> Vec<Notification> {
        self.store().sorted(field, direction)
    }

    pub fn stats(&self) -> NotificationStats {
        self.store().stats()
    }
}

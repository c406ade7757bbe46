//! Local notification state.
//!
//! `StoreState` is the authoritative client-side view of the notification
//! list and its unread counter. All mutators here are pure state transitions
//! with no I/O; the sync layer decides when to apply them around remote
//! calls. Invariant: after every mutator, `unread_count` equals the number
//! of records with `read == false`.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::models::notification::{Notification, NotificationStats, SortDirection, SortField};

#[derive(Debug, Default)]
pub struct StoreState {
    notifications: Vec<Notification>,
    unread_count: usize,
    last_error: Option<String>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Wholesale replacement from a fetch response.
    ///
    /// The server also reports an unread count; if it disagrees with the
    /// list it ships, the list wins and the counter is re-derived.
    pub fn replace(&mut self, notifications: Vec<Notification>, server_unread: usize) {
        let derived = notifications.iter().filter(|n| !n.read).count();
        if derived != server_unread {
            tracing::debug!(
                server_unread,
                derived,
                "server unread count disagrees with the fetched list; using derived value"
            );
        }
        self.notifications = notifications;
        self.unread_count = derived;
    }

    /// Flip a record to read. Returns whether anything changed, so a failed
    /// remote write can be rolled back without un-reading a record that was
    /// already read.
    pub fn mark_read_local(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id && !n.read) {
            Some(n) => {
                n.read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    /// Rollback path for a failed remote mark-as-read.
    pub fn unmark_read_local(&mut self, id: &str) {
        if let Some(n) = self.notifications.iter_mut().find(|n| n.id == id && n.read) {
            n.read = false;
            self.unread_count += 1;
        }
    }

    pub fn mark_all_read_local(&mut self) {
        for n in &mut self.notifications {
            n.read = true;
        }
        self.unread_count = 0;
    }

    /// Remove a record by id. The counter drops only if the removed record
    /// was unread.
    pub fn remove_local(&mut self, id: &str) -> Option<Notification> {
        let pos = self.notifications.iter().position(|n| n.id == id)?;
        let removed = self.notifications.remove(pos);
        if !removed.read {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
        Some(removed)
    }

    pub fn clear_local(&mut self) {
        self.notifications.clear();
        self.unread_count = 0;
    }

    /// Prepend a newly created record.
    pub fn insert_local(&mut self, record: Notification) {
        if !record.read {
            self.unread_count += 1;
        }
        self.notifications.insert(0, record);
    }

    // ── Derived queries (pure, no side effects) ───────────────

    pub fn by_kind<'a>(&'a self, kind: &str) -> Vec<&'a Notification> {
        self.notifications.iter().filter(|n| n.kind == kind).collect()
    }

    /// Records created within `[from, to]` inclusive.
    pub fn in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.created_at >= from && n.created_at <= to)
            .collect()
    }

    /// Split into (unread, read), preserving list order.
    pub fn partition(&self) -> (Vec<&Notification>, Vec<&Notification>) {
        self.notifications.iter().partition(|n| !n.read)
    }

    pub fn sorted(&self, field: SortField, direction: SortDirection) -> Vec<Notification> {
        let mut out = self.notifications.clone();
        out.sort_by(|a, b| {
            let ord = match field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Kind => a.kind.cmp(&b.kind),
                SortField::Read => a.read.cmp(&b.read),
            };
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        out
    }

    pub fn stats(&self) -> NotificationStats {
        let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for n in &self.notifications {
            *by_kind.entry(n.kind.clone()).or_default() += 1;
        }
        let today = Utc::now().date_naive();
        NotificationStats {
            total: self.notifications.len(),
            unread: self.unread_count,
            read: self.notifications.len() - self.unread_count,
            by_kind,
            today: self
                .notifications
                .iter()
                .filter(|n| n.created_at.date_naive() == today)
                .count(),
        }
    }

    #[cfg(test)]
    pub(crate) fn derived_unread(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, kind: &str, read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            kind: kind.to_string(),
            title: Some(format!("title-{id}")),
            body: None,
            read,
            created_at: Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap(),
        }
    }

    fn seeded() -> StoreState {
        let mut state = StoreState::new();
        state.replace(
            vec![
                record("1", "request", false),
                record("2", "system", true),
                record("3", "request", false),
            ],
            2,
        );
        state
    }

    #[test]
    fn replace_rederives_counter_when_server_value_disagrees() {
        let mut state = StoreState::new();
        state.replace(vec![record("1", "request", false)], 7);
        assert_eq!(state.unread_count(), 1);
    }

    #[test]
    fn mark_read_decrements_once_and_floors_at_zero() {
        let mut state = seeded();
        assert!(state.mark_read_local("1"));
        assert_eq!(state.unread_count(), 1);
        // Second flip of the same record changes nothing.
        assert!(!state.mark_read_local("1"));
        assert_eq!(state.unread_count(), 1);
        assert!(state.mark_read_local("3"));
        assert!(!state.mark_read_local("missing"));
        assert_eq!(state.unread_count(), 0);
        assert_eq!(state.unread_count(), state.derived_unread());
    }

    #[test]
    fn unmark_restores_counter_after_rollback() {
        let mut state = seeded();
        assert!(state.mark_read_local("1"));
        state.unmark_read_local("1");
        assert_eq!(state.unread_count(), 2);
        assert_eq!(state.unread_count(), state.derived_unread());
        // Rolling back a record that was never flipped does nothing.
        state.unmark_read_local("2");
        assert_eq!(state.unread_count(), 3);
    }

    #[test]
    fn mark_all_read_is_idempotent() {
        let mut state = seeded();
        state.mark_all_read_local();
        assert_eq!(state.unread_count(), 0);
        assert!(state.notifications().iter().all(|n| n.read));
        state.mark_all_read_local();
        assert_eq!(state.unread_count(), 0);
        assert!(state.notifications().iter().all(|n| n.read));
    }

    #[test]
    fn remove_drops_exactly_one_record() {
        let mut state = seeded();
        let removed = state.remove_local("1").unwrap();
        assert_eq!(removed.id, "1");
        assert_eq!(state.notifications().len(), 2);
        assert!(state.notifications().iter().all(|n| n.id != "1"));
        assert_eq!(state.unread_count(), 1);

        // Removing a read record leaves the counter alone.
        state.remove_local("2");
        assert_eq!(state.unread_count(), 1);
        assert!(state.remove_local("missing").is_none());
        assert_eq!(state.unread_count(), state.derived_unread());
    }

    #[test]
    fn clear_on_empty_list_is_a_no_op() {
        let mut state = StoreState::new();
        state.clear_local();
        assert!(state.notifications().is_empty());
        assert_eq!(state.unread_count(), 0);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn insert_prepends_and_counts_unread() {
        let mut state = seeded();
        state.insert_local(record("4", "system", false));
        assert_eq!(state.notifications()[0].id, "4");
        assert_eq!(state.unread_count(), 3);
        state.insert_local(record("5", "system", true));
        assert_eq!(state.unread_count(), 3);
        assert_eq!(state.unread_count(), state.derived_unread());
    }

    #[test]
    fn counter_invariant_holds_across_mixed_sequences() {
        let mut state = seeded();
        state.mark_read_local("3");
        state.insert_local(record("4", "urgent", false));
        state.remove_local("1");
        state.mark_all_read_local();
        state.insert_local(record("5", "request", false));
        state.remove_local("5");
        assert_eq!(state.unread_count(), state.derived_unread());
        state.clear_local();
        assert_eq!(state.unread_count(), 0);
    }

    #[test]
    fn spec_scenario_mark_read_zeroes_counter() {
        let mut state = StoreState::new();
        state.replace(vec![record("1", "request", false), record("2", "request", true)], 1);
        state.mark_read_local("1");
        assert!(state.notifications().iter().all(|n| n.read));
        assert_eq!(state.unread_count(), 0);
    }

    #[test]
    fn partition_and_kind_filter() {
        let state = seeded();
        let (unread, read) = state.partition();
        assert_eq!(unread.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(), ["1", "3"]);
        assert_eq!(read.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(), ["2"]);
        assert_eq!(state.by_kind("request").len(), 2);
        assert_eq!(state.by_kind("system").len(), 1);
        assert!(state.by_kind("unknown").is_empty());
    }

    #[test]
    fn sorted_respects_field_and_direction() {
        let mut state = StoreState::new();
        let mut early = record("a", "system", true);
        early.created_at = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let mut late = record("b", "request", false);
        late.created_at = Utc.with_ymd_and_hms(2026, 8, 25, 0, 0, 0).unwrap();
        state.replace(vec![early, late], 1);

        let asc = state.sorted(SortField::CreatedAt, SortDirection::Ascending);
        assert_eq!(asc[0].id, "a");
        let desc = state.sorted(SortField::CreatedAt, SortDirection::Descending);
        assert_eq!(desc[0].id, "b");
        let by_read = state.sorted(SortField::Read, SortDirection::Ascending);
        assert!(!by_read[0].read);
        let by_kind = state.sorted(SortField::Kind, SortDirection::Ascending);
        assert_eq!(by_kind[0].kind, "request");
    }

    #[test]
    fn in_range_is_inclusive() {
        let state = seeded();
        let from = Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 8, 21, 0, 0, 0).unwrap();
        assert_eq!(state.in_range(from, to).len(), 3);
        let later = Utc.with_ymd_and_hms(2026, 8, 22, 0, 0, 0).unwrap();
        assert!(state.in_range(later, later).is_empty());
    }

    #[test]
    fn stats_counts_by_kind() {
        let state = seeded();
        let stats = state.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.unread, 2);
        assert_eq!(stats.read, 1);
        assert_eq!(stats.by_kind["request"], 2);
        assert_eq!(stats.by_kind["system"], 1);
        // Seeded records are dated 2026-08-20, not today.
        assert_eq!(stats.today, 0);
    }
}

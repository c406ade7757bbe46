//! Properties of the local notification store, exercised through the
//! public API with no remote involved.
//!
//! The central invariant: after every mutator, the unread counter equals
//! the number of records in the list with `read == false`.

use chrono::{TimeZone, Utc};

use lifelink_notify::models::notification::{Notification, SortDirection, SortField};
use lifelink_notify::store::StoreState;

fn record(id: &str, kind: &str, read: bool, day: u32) -> Notification {
    Notification {
        id: id.to_string(),
        kind: kind.to_string(),
        title: None,
        body: None,
        read,
        created_at: Utc.with_ymd_and_hms(2026, 8, day, 9, 0, 0).unwrap(),
    }
}

fn derived_unread(state: &StoreState) -> usize {
    state.notifications().iter().filter(|n| !n.read).count()
}

#[test]
fn counter_tracks_list_through_arbitrary_operation_sequences() {
    let mut state = StoreState::new();

    // Interleave every mutator and recheck the invariant after each step.
    let steps: Vec<Box<dyn Fn(&mut StoreState)>> = vec![
        Box::new(|s| {
            s.replace(
                vec![
                    record("1", "request", false, 10),
                    record("2", "system", true, 11),
                    record("3", "request", false, 12),
                ],
                2,
            )
        }),
        Box::new(|s| {
            s.mark_read_local("1");
        }),
        Box::new(|s| s.insert_local(record("4", "urgent", false, 13))),
        Box::new(|s| {
            s.remove_local("2");
        }),
        Box::new(|s| {
            s.mark_read_local("does-not-exist");
        }),
        Box::new(|s| s.mark_all_read_local()),
        Box::new(|s| s.insert_local(record("5", "request", false, 14))),
        Box::new(|s| {
            s.remove_local("5");
        }),
        Box::new(|s| s.clear_local()),
    ];

    for step in steps {
        step(&mut state);
        assert_eq!(state.unread_count(), derived_unread(&state));
    }
}

#[test]
fn mark_all_read_twice_equals_once() {
    let mut state = StoreState::new();
    state.replace(
        vec![record("1", "request", false, 10), record("2", "system", false, 11)],
        2,
    );

    state.mark_all_read_local();
    let once: Vec<_> = state.notifications().to_vec();
    let count_once = state.unread_count();

    state.mark_all_read_local();
    assert_eq!(state.notifications(), once.as_slice());
    assert_eq!(state.unread_count(), count_once);
    assert_eq!(count_once, 0);
}

#[test]
fn delete_yields_n_minus_one_records() {
    let mut state = StoreState::new();
    state.replace(
        vec![
            record("1", "request", false, 10),
            record("2", "system", true, 11),
            record("3", "request", false, 12),
            record("4", "urgent", true, 13),
        ],
        2,
    );

    state.remove_local("3");
    assert_eq!(state.notifications().len(), 3);
    assert!(state.notifications().iter().all(|n| n.id != "3"));
    assert_eq!(state.unread_count(), derived_unread(&state));
}

#[test]
fn mark_read_scenario_from_two_record_list() {
    let mut state = StoreState::new();
    state.replace(
        vec![record("1", "request", false, 10), record("2", "request", true, 10)],
        1,
    );
    assert_eq!(state.unread_count(), 1);

    state.mark_read_local("1");
    assert!(state.notifications().iter().all(|n| n.read));
    assert_eq!(state.unread_count(), 0);
}

#[test]
fn clear_on_empty_store_reports_nothing() {
    let mut state = StoreState::new();
    state.clear_local();
    assert!(state.notifications().is_empty());
    assert_eq!(state.unread_count(), 0);
    assert!(state.last_error().is_none());
}

#[test]
fn derived_queries_do_not_mutate_state() {
    let mut state = StoreState::new();
    state.replace(
        vec![
            record("1", "request", false, 10),
            record("2", "system", true, 15),
            record("3", "request", false, 20),
        ],
        2,
    );

    let _ = state.by_kind("request");
    let _ = state.partition();
    let _ = state.sorted(SortField::Kind, SortDirection::Descending);
    let _ = state.in_range(
        Utc.with_ymd_and_hms(2026, 8, 12, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 8, 18, 0, 0, 0).unwrap(),
    );
    let stats = state.stats();

    assert_eq!(state.notifications().len(), 3);
    assert_eq!(state.unread_count(), 2);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.unread, 2);
    assert_eq!(stats.by_kind["request"], 2);
}

#[test]
fn range_filter_selects_by_created_at() {
    let mut state = StoreState::new();
    state.replace(
        vec![
            record("early", "request", false, 5),
            record("mid", "request", false, 15),
            record("late", "request", false, 25),
        ],
        3,
    );

    let hits = state.in_range(
        Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 8, 20, 0, 0, 0).unwrap(),
    );
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "mid");
}

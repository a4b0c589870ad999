//! Property tests for epic status derivation and slot overlap.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use taskboard::aggregate::derive_status;
use taskboard::schedule::{Slot, TimeIndex};
use taskboard::{Status, Subtask, TaskManager, WorkItem};

fn status_strategy() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::New),
        Just(Status::InProgress),
        Just(Status::Done),
    ]
}

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid time")
}

fn slot(id: u64, start_minute: i64, length: i64) -> Slot {
    let start = base() + Duration::minutes(start_minute);
    Slot {
        id,
        start,
        end: start + Duration::minutes(length),
    }
}

/// Epic status is NEW when every subtask is NEW (or there are none), DONE
/// when every subtask is DONE, and IN_PROGRESS otherwise.
#[test]
fn prop_epic_status_rule() {
    proptest!(|(statuses in prop::collection::vec(status_strategy(), 0..12))| {
        let expected = if statuses.iter().all(|status| *status == Status::New) {
            Status::New
        } else if statuses.iter().all(|status| *status == Status::Done) {
            Status::Done
        } else {
            Status::InProgress
        };
        prop_assert_eq!(derive_status(statuses.iter().copied()), expected);

        let mut manager = TaskManager::new();
        let epic_id = manager.add_epic(&taskboard::Epic::new("E", "")).expect("epic");
        let epic = manager.get_epic(epic_id).expect("epic");
        for (n, status) in statuses.iter().enumerate() {
            let mut subtask = Subtask::new(format!("S{n}"), "");
            subtask.set_status(*status);
            manager.add_subtask(&subtask, &epic).expect("subtask");
        }
        prop_assert_eq!(manager.get_epic(epic_id).expect("epic").status(), expected);
    });
}

/// Overlap is symmetric, and touching intervals never overlap.
#[test]
fn prop_overlap_symmetry() {
    proptest!(|(a_start in 0i64..600, a_len in 0i64..120, b_start in 0i64..600, b_len in 0i64..120)| {
        let a = slot(1, a_start, a_len);
        let b = slot(2, b_start, b_len);
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));

        let touching = slot(3, a_start + a_len, b_len);
        if a_len > 0 {
            prop_assert!(!a.overlaps(&touching));
        }
    });
}

/// Whatever order slots arrive in, the index never holds two overlapping slots.
#[test]
fn prop_index_never_stores_overlaps() {
    proptest!(|(slots in prop::collection::vec((0i64..480, 0i64..90), 1..40))| {
        let mut index = TimeIndex::new();
        for (n, (start, length)) in slots.iter().enumerate() {
            let _ = index.schedule(slot(n as u64 + 1, *start, *length));
        }
        let stored: Vec<Slot> = index.iter().copied().collect();
        for (i, left) in stored.iter().enumerate() {
            for right in &stored[i + 1..] {
                prop_assert!(!left.overlaps(right));
            }
        }
    });
}

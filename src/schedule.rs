//! Time index over scheduled tasks and subtasks.
//!
//! Slots are ordered by `(start, id)`. Stored slots never overlap, so a
//! candidate only has to be checked against its immediate predecessor and
//! successor in that order. Epics are never indexed.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;

use crate::model::{TaskId, WorkItem};

/// Half-open interval `[start, end)` occupied by one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: TaskId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    /// Slot of a timed item, `None` for items without a start time.
    pub fn of<T: WorkItem + ?Sized>(item: &T) -> Option<Self> {
        let start = item.start_time()?;
        let end = item.end_time().unwrap_or(start);
        Some(Self {
            id: item.id(),
            start,
            end,
        })
    }

    /// Intersecting intervals overlap. Identical start instants always
    /// overlap, even for zero-length slots; touching ends do not.
    pub fn overlaps(&self, other: &Slot) -> bool {
        if self.start == other.start {
            return true;
        }
        self.start < other.end && other.start < self.end
    }

    fn key(&self) -> (NaiveDateTime, TaskId) {
        (self.start, self.id)
    }
}

/// Rejected placement: the candidate and the stored slot it collides with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConflict {
    pub candidate: Slot,
    pub existing: Slot,
}

#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    slots: BTreeMap<(NaiveDateTime, TaskId), Slot>,
    starts: HashMap<TaskId, NaiveDateTime>,
}

impl TimeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.starts.contains_key(&id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Slot> {
        let start = self.starts.get(&id)?;
        self.slots.get(&(*start, id))
    }

    /// Slots in start-time order.
    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    /// Find the stored slot a candidate would collide with.
    ///
    /// A stored slot with the candidate's own id is skipped, so an update is
    /// checked against everything except its previous interval.
    pub fn find_conflict(&self, candidate: &Slot) -> Option<Slot> {
        let key = candidate.key();
        let predecessor = self
            .slots
            .range(..key)
            .rev()
            .map(|(_, slot)| slot)
            .find(|slot| slot.id != candidate.id);
        let successor = self
            .slots
            .range(key..)
            .map(|(_, slot)| slot)
            .find(|slot| slot.id != candidate.id);

        predecessor
            .into_iter()
            .chain(successor)
            .find(|slot| slot.overlaps(candidate))
            .copied()
    }

    pub fn has_conflict(&self, candidate: &Slot) -> bool {
        self.find_conflict(candidate).is_some()
    }

    /// Insert or move the slot for `candidate.id`.
    ///
    /// On conflict the index is left exactly as it was, including any
    /// previous slot of the same id.
    pub fn schedule(&mut self, candidate: Slot) -> Result<(), SlotConflict> {
        if let Some(existing) = self.find_conflict(&candidate) {
            return Err(SlotConflict {
                candidate,
                existing,
            });
        }
        self.remove(candidate.id);
        self.starts.insert(candidate.id, candidate.start);
        self.slots.insert(candidate.key(), candidate);
        Ok(())
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Slot> {
        let start = self.starts.remove(&id)?;
        self.slots.remove(&(start, id))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.starts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid time")
    }

    fn slot(id: TaskId, hour: u32, minute: u32, minutes: i64) -> Slot {
        let start = at(hour, minute);
        Slot {
            id,
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    #[test]
    fn overlapping_slot_rejected() {
        let mut index = TimeIndex::new();
        index.schedule(slot(1, 10, 0, 30)).expect("first slot");

        let err = index.schedule(slot(2, 10, 20, 10)).expect_err("overlap");
        assert_eq!(err.existing.id, 1);
        assert_eq!(index.len(), 1);
        assert!(!index.contains(2));
    }

    #[test]
    fn back_to_back_slots_fit() {
        let mut index = TimeIndex::new();
        index.schedule(slot(1, 10, 0, 30)).expect("first slot");
        index.schedule(slot(2, 10, 30, 10)).expect("adjacent after");
        index.schedule(slot(3, 9, 50, 10)).expect("adjacent before");
        let order: Vec<TaskId> = index.iter().map(|slot| slot.id).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn same_start_conflicts_even_with_zero_length() {
        let mut index = TimeIndex::new();
        index.schedule(slot(1, 10, 0, 0)).expect("zero length");
        assert!(index.schedule(slot(2, 10, 0, 0)).is_err());
        assert!(index.schedule(slot(3, 10, 0, 15)).is_err());
    }

    #[test]
    fn zero_length_inside_interval_conflicts() {
        let mut index = TimeIndex::new();
        index.schedule(slot(1, 10, 0, 30)).expect("first slot");
        assert!(index.has_conflict(&slot(2, 10, 10, 0)));
        assert!(!index.has_conflict(&slot(2, 10, 30, 0)));
    }

    #[test]
    fn moving_a_slot_ignores_its_previous_interval() {
        let mut index = TimeIndex::new();
        index.schedule(slot(1, 10, 0, 30)).expect("first slot");
        index.schedule(slot(2, 11, 0, 30)).expect("second slot");

        index.schedule(slot(1, 10, 15, 30)).expect("shift within own interval");
        assert_eq!(index.get(1).map(|slot| slot.start), Some(at(10, 15)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn failed_move_keeps_previous_slot() {
        let mut index = TimeIndex::new();
        index.schedule(slot(1, 10, 0, 30)).expect("first slot");
        index.schedule(slot(2, 11, 0, 30)).expect("second slot");

        assert!(index.schedule(slot(1, 11, 15, 10)).is_err());
        assert_eq!(index.get(1), Some(&slot(1, 10, 0, 30)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn neighbors_found_across_many_slots() {
        let mut index = TimeIndex::new();
        for (id, hour) in (8..18).enumerate() {
            index
                .schedule(slot(id as TaskId + 1, hour, 0, 30))
                .expect("hourly slot");
        }
        assert!(index.has_conflict(&slot(100, 12, 29, 5)));
        assert!(!index.has_conflict(&slot(100, 12, 30, 30)));
        assert!(index.has_conflict(&slot(100, 12, 30, 31)));

        index.remove(5);
        assert!(!index.has_conflict(&slot(100, 12, 0, 60)));
    }
}

//! Planning queue with a dynamic priority comparator.
//!
//! Slots are planned hardest-first. The comparator orders entries
//! lexicographically: requested slots before unrequested ones, fewer
//! requesters first (few requesters mean little flexibility — place the
//! slot while they are still unblocked), tighter candidate sets first,
//! and more rule-entangled duties first on ties.
//!
//! Candidate sets shrink while planning runs, so the ordering cannot be
//! frozen into a heap. The queue keeps entries in insertion order
//! (chronological, then catalog order) and re-evaluates the comparator
//! against live state at every pop; insertion order is thereby also the
//! final tie-breaker.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::{DutyId, PersonId, WishRegistry};
use crate::network::RuleNetwork;

use super::candidates::PlanningMap;

/// An unplanned slot with its live candidate set.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    /// Date of the slot.
    pub date: NaiveDate,
    /// Duty form of the slot.
    pub duty: DutyId,
    /// Whether anyone requested this slot.
    pub wished: bool,
    /// Number of persons requesting this slot.
    pub wish_count: usize,
    /// Rule entanglement of the duty (larger = planned earlier on ties).
    pub fine_priority: usize,
    /// Live candidate set, ordered by person id.
    pub candidates: BTreeSet<PersonId>,
}

impl QueueEntry {
    /// Comparator key; lower sorts first.
    fn sort_key(&self) -> (bool, usize, usize, Reverse<usize>) {
        (
            !self.wished,
            self.wish_count,
            self.candidates.len(),
            Reverse(self.fine_priority),
        )
    }
}

/// Priority queue over unplanned slots.
#[derive(Debug, Clone, Default)]
pub struct PlanningQueue {
    entries: Vec<QueueEntry>,
}

impl PlanningQueue {
    /// Builds the queue from a planning map, preserving the map's date
    /// and slot order as insertion order.
    pub fn build(map: PlanningMap, wishes: &WishRegistry, network: &RuleNetwork) -> Self {
        let mut entries = Vec::new();
        for (date, slots) in map {
            for slot in slots {
                entries.push(QueueEntry {
                    date,
                    wished: slot.wished,
                    wish_count: wishes.wish_count(date, &slot.duty),
                    fine_priority: network.fine_priority(&slot.duty),
                    duty: slot.duty,
                    candidates: slot.candidates,
                });
            }
        }
        Self { entries }
    }

    /// Removes and returns the highest-priority entry, re-evaluating the
    /// comparator against the current candidate sets.
    pub fn pop_best(&mut self) -> Option<QueueEntry> {
        let best = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.sort_key())
            .map(|(i, _)| i)?;
        Some(self.entries.remove(best))
    }

    /// The live candidate set of a slot still in the queue.
    pub fn candidates_for(&self, date: NaiveDate, duty: &str) -> Option<&BTreeSet<PersonId>> {
        self.entries
            .iter()
            .find(|e| e.date == date && e.duty == duty)
            .map(|e| &e.candidates)
    }

    /// Removes a slot from the queue. Returns whether it was present.
    pub fn remove_entry(&mut self, date: NaiveDate, duty: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !(e.date == date && e.duty == duty));
        self.entries.len() < before
    }

    /// Removes a person from one slot's candidate set.
    pub fn remove_candidate(&mut self, date: NaiveDate, duty: &str, person: &str) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.date == date && e.duty == duty)
        {
            entry.candidates.remove(person);
        }
    }

    /// Removes a person from every slot of a day.
    pub fn remove_candidate_on_day(&mut self, date: NaiveDate, person: &str) {
        for entry in self.entries.iter_mut().filter(|e| e.date == date) {
            entry.candidates.remove(person);
        }
    }

    /// Removes a person from the slots of a day whose duty satisfies a
    /// predicate (used for the follow-up-free pruning of the previous
    /// day).
    pub fn remove_candidate_on_day_where<F>(&mut self, date: NaiveDate, person: &str, pred: F)
    where
        F: Fn(&str) -> bool,
    {
        for entry in self
            .entries
            .iter_mut()
            .filter(|e| e.date == date && pred(&e.duty))
        {
            entry.candidates.remove(person);
        }
    }

    /// Number of queued slots whose candidate set contains the person.
    pub fn availability_count(&self, person: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.candidates.contains(person))
            .count()
    }

    /// Number of queued slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is exhausted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(
        d: NaiveDate,
        duty: &str,
        wished: bool,
        wish_count: usize,
        fine_priority: usize,
        candidates: &[&str],
    ) -> QueueEntry {
        QueueEntry {
            date: d,
            duty: duty.to_string(),
            wished,
            wish_count,
            fine_priority,
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn queue(entries: Vec<QueueEntry>) -> PlanningQueue {
        PlanningQueue { entries }
    }

    #[test]
    fn test_wished_slots_first() {
        let d = date(2025, 6, 6);
        let mut q = queue(vec![
            entry(d, "plain", false, 0, 0, &["P1", "P2"]),
            entry(d, "wanted", true, 2, 0, &["P1", "P2", "P3"]),
        ]);
        assert_eq!(q.pop_best().unwrap().duty, "wanted");
        assert_eq!(q.pop_best().unwrap().duty, "plain");
    }

    #[test]
    fn test_fewer_wishers_first_among_wished() {
        let d = date(2025, 6, 6);
        let mut q = queue(vec![
            entry(d, "popular", true, 3, 0, &["P1"]),
            entry(d, "niche", true, 1, 0, &["P1", "P2"]),
        ]);
        assert_eq!(q.pop_best().unwrap().duty, "niche");
    }

    #[test]
    fn test_tighter_candidate_set_first() {
        let d = date(2025, 6, 6);
        let mut q = queue(vec![
            entry(d, "loose", false, 0, 0, &["P1", "P2", "P3"]),
            entry(d, "tight", false, 0, 0, &["P1"]),
        ]);
        assert_eq!(q.pop_best().unwrap().duty, "tight");
    }

    #[test]
    fn test_fine_priority_breaks_ties_descending() {
        let d = date(2025, 6, 6);
        let mut q = queue(vec![
            entry(d, "plain", false, 0, 0, &["P1", "P2"]),
            entry(d, "entangled", false, 0, 4, &["P1", "P2"]),
        ]);
        assert_eq!(q.pop_best().unwrap().duty, "entangled");
    }

    #[test]
    fn test_insertion_order_is_final_tie_breaker() {
        let mut q = queue(vec![
            entry(date(2025, 6, 2), "a", false, 0, 0, &["P1"]),
            entry(date(2025, 6, 3), "b", false, 0, 0, &["P1"]),
        ]);
        assert_eq!(q.pop_best().unwrap().duty, "a");
        assert_eq!(q.pop_best().unwrap().duty, "b");
        assert!(q.pop_best().is_none());
    }

    #[test]
    fn test_removal_reorders_live() {
        let d = date(2025, 6, 6);
        let mut q = queue(vec![
            entry(d, "first", false, 0, 0, &["P1"]),
            entry(d, "second", false, 0, 0, &["P1", "P2"]),
        ]);
        // Shrinking "second" below "first" flips the pop order.
        q.remove_candidate(d, "second", "P1");
        q.remove_candidate(d, "second", "P2");
        assert_eq!(q.pop_best().unwrap().duty, "second");
    }

    #[test]
    fn test_remove_candidate_on_day() {
        let d = date(2025, 6, 6);
        let other = date(2025, 6, 7);
        let mut q = queue(vec![
            entry(d, "a", false, 0, 0, &["P1", "P2"]),
            entry(d, "b", false, 0, 0, &["P1"]),
            entry(other, "c", false, 0, 0, &["P1"]),
        ]);
        q.remove_candidate_on_day(d, "P1");
        assert_eq!(
            q.candidates_for(d, "a").unwrap().iter().collect::<Vec<_>>(),
            vec!["P2"]
        );
        assert!(q.candidates_for(d, "b").unwrap().is_empty());
        assert_eq!(q.candidates_for(other, "c").unwrap().len(), 1);
    }

    #[test]
    fn test_remove_candidate_on_day_where() {
        let d = date(2025, 6, 6);
        let mut q = queue(vec![
            entry(d, "night", false, 0, 0, &["P1"]),
            entry(d, "day", false, 0, 0, &["P1"]),
        ]);
        q.remove_candidate_on_day_where(d, "P1", |duty| duty == "night");
        assert!(q.candidates_for(d, "night").unwrap().is_empty());
        assert_eq!(q.candidates_for(d, "day").unwrap().len(), 1);
    }

    #[test]
    fn test_remove_entry_and_availability() {
        let d = date(2025, 6, 6);
        let mut q = queue(vec![
            entry(d, "a", false, 0, 0, &["P1", "P2"]),
            entry(d, "b", false, 0, 0, &["P1"]),
        ]);
        assert_eq!(q.availability_count("P1"), 2);
        assert_eq!(q.availability_count("P2"), 1);
        assert!(q.remove_entry(d, "b"));
        assert!(!q.remove_entry(d, "b"));
        assert_eq!(q.availability_count("P1"), 1);
        assert_eq!(q.len(), 1);
    }
}

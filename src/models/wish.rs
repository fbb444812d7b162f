//! Duty wishes and day-off wishes.
//!
//! Staff may request a specific duty on a specific date, or request a
//! date to stay duty-free. The registry keeps the requested persons per
//! slot, per-person submission counters, and the set of wishes the
//! planner actually fulfilled — the counters drive the fairness
//! tie-breaking during wish selection (few fulfilled first, many
//! submitted first).

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DutyId, PersonId};

/// A fulfilled duty request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Wish {
    /// Requested date.
    pub date: NaiveDate,
    /// Requested duty form.
    pub duty: DutyId,
    /// Requesting person.
    pub person: PersonId,
}

/// Registry of duty requests and day-off requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WishRegistry {
    requested: BTreeMap<NaiveDate, BTreeMap<DutyId, BTreeSet<PersonId>>>,
    off: BTreeMap<NaiveDate, BTreeSet<PersonId>>,
    submitted: BTreeMap<PersonId, u32>,
    fulfilled: BTreeSet<Wish>,
}

impl WishRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a duty request and bumps the person's submission count.
    pub fn add_wish(
        &mut self,
        date: NaiveDate,
        duty: impl Into<DutyId>,
        person: impl Into<PersonId>,
    ) {
        let person = person.into();
        let newly = self
            .requested
            .entry(date)
            .or_default()
            .entry(duty.into())
            .or_default()
            .insert(person.clone());
        if newly {
            *self.submitted.entry(person).or_insert(0) += 1;
        }
    }

    /// Builder: registers a duty request.
    pub fn with_wish(
        mut self,
        date: NaiveDate,
        duty: impl Into<DutyId>,
        person: impl Into<PersonId>,
    ) -> Self {
        self.add_wish(date, duty, person);
        self
    }

    /// Registers a day-off request.
    pub fn add_off_wish(&mut self, date: NaiveDate, person: impl Into<PersonId>) {
        self.off.entry(date).or_default().insert(person.into());
    }

    /// Builder: registers a day-off request.
    pub fn with_off_wish(mut self, date: NaiveDate, person: impl Into<PersonId>) -> Self {
        self.add_off_wish(date, person);
        self
    }

    /// Whether anyone requested the given slot.
    pub fn is_requested(&self, date: NaiveDate, duty: &str) -> bool {
        self.wish_count(date, duty) > 0
    }

    /// Number of persons requesting the given slot.
    pub fn wish_count(&self, date: NaiveDate, duty: &str) -> usize {
        self.requested
            .get(&date)
            .and_then(|d| d.get(duty))
            .map(|p| p.len())
            .unwrap_or(0)
    }

    /// Persons requesting the given slot (empty if none).
    pub fn requested_persons(&self, date: NaiveDate, duty: &str) -> BTreeSet<PersonId> {
        self.requested
            .get(&date)
            .and_then(|d| d.get(duty))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the person asked for the date to stay duty-free.
    pub fn has_off_wish(&self, date: NaiveDate, person: &str) -> bool {
        self.off
            .get(&date)
            .map(|p| p.contains(person))
            .unwrap_or(false)
    }

    /// Marks a requested slot as fulfilled for the person.
    ///
    /// Only actually requested wishes can be fulfilled; returns whether
    /// the mark was newly recorded.
    pub fn mark_fulfilled(&mut self, date: NaiveDate, duty: &str, person: &str) -> bool {
        let requested = self
            .requested
            .get(&date)
            .and_then(|d| d.get(duty))
            .map(|p| p.contains(person))
            .unwrap_or(false);
        if !requested {
            return false;
        }
        self.fulfilled.insert(Wish {
            date,
            duty: duty.to_string(),
            person: person.to_string(),
        })
    }

    /// Whether the given wish was fulfilled.
    pub fn is_fulfilled(&self, date: NaiveDate, duty: &str, person: &str) -> bool {
        self.fulfilled.contains(&Wish {
            date,
            duty: duty.to_string(),
            person: person.to_string(),
        })
    }

    /// Number of fulfilled wishes of the person.
    pub fn fulfilled_count(&self, person: &str) -> usize {
        self.fulfilled.iter().filter(|w| w.person == person).count()
    }

    /// Number of wishes the person submitted.
    pub fn submitted_count(&self, person: &str) -> u32 {
        self.submitted.get(person).copied().unwrap_or(0)
    }

    /// All fulfilled wishes, ordered by (date, duty, person).
    pub fn fulfilled(&self) -> impl Iterator<Item = &Wish> + '_ {
        self.fulfilled.iter()
    }
}

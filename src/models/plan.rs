//! Plan state: the duty roster under construction.
//!
//! A plan maps each date to the duties staffed that day and their
//! holders. During planning the map only grows; entries are removed
//! solely through [`DutyPlan::unassign`], the public operation the
//! repair phase uses.
//!
//! The monthly accounting helpers live here because both the driver's
//! dynamic candidate filter and external repair strategies need them.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{DutyCatalog, DutyId, PersonId};

/// Assignment map: date → duty form → person.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DutyPlan {
    entries: BTreeMap<NaiveDate, BTreeMap<DutyId, PersonId>>,
}

impl DutyPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a person to a duty slot, replacing any previous holder.
    pub fn assign(
        &mut self,
        date: NaiveDate,
        duty: impl Into<DutyId>,
        person: impl Into<PersonId>,
    ) {
        self.entries
            .entry(date)
            .or_default()
            .insert(duty.into(), person.into());
    }

    /// Removes an assignment and returns the previous holder.
    ///
    /// Days left without any assignment disappear from the date set.
    pub fn unassign(&mut self, date: NaiveDate, duty: &str) -> Option<PersonId> {
        let day = self.entries.get_mut(&date)?;
        let removed = day.remove(duty);
        if day.is_empty() {
            self.entries.remove(&date);
        }
        removed
    }

    /// Merges externally produced assignments into the plan.
    pub fn seed<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (NaiveDate, DutyId, PersonId)>,
    {
        for (date, duty, person) in entries {
            self.assign(date, duty, person);
        }
    }

    /// The holder of a duty slot.
    pub fn person_for(&self, date: NaiveDate, duty: &str) -> Option<&PersonId> {
        self.entries.get(&date).and_then(|d| d.get(duty))
    }

    /// The duty a person holds on a date, if any.
    pub fn duty_of(&self, date: NaiveDate, person: &str) -> Option<&DutyId> {
        self.entries
            .get(&date)?
            .iter()
            .find(|(_, p)| p.as_str() == person)
            .map(|(duty, _)| duty)
    }

    /// Whether the person holds any duty on the date.
    pub fn is_assigned(&self, date: NaiveDate, person: &str) -> bool {
        self.duty_of(date, person).is_some()
    }

    /// All assignments of a day, ordered by duty id.
    pub fn duties_on(&self, date: NaiveDate) -> Option<&BTreeMap<DutyId, PersonId>> {
        self.entries.get(&date)
    }

    /// Dates carrying at least one assignment, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.keys().copied()
    }

    /// Total number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.entries.values().map(|d| d.len()).sum()
    }

    /// Whether the plan holds no assignments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weighted duty total of a person in the calendar month of `date`.
    ///
    /// Each held duty contributes its form weight; forms missing from
    /// the catalog count as 1.0.
    pub fn weighted_month_total(
        &self,
        date: NaiveDate,
        person: &str,
        catalog: &DutyCatalog,
    ) -> f64 {
        self.month_entries(date)
            .flat_map(|(_, duties)| duties.iter())
            .filter(|(_, p)| p.as_str() == person)
            .map(|(duty, _)| catalog.form(duty).map(|f| f.weight).unwrap_or(1.0))
            .sum()
    }

    /// How often the person holds the given form in the month of `date`.
    pub fn monthly_count_of_form(&self, date: NaiveDate, person: &str, duty: &str) -> u32 {
        self.month_entries(date)
            .filter_map(|(_, duties)| duties.get(duty))
            .filter(|p| p.as_str() == person)
            .count() as u32
    }

    /// Length of the person's run of the given form ending the day
    /// before `date`: the largest `k` such that the person holds the
    /// form on `date - 1 .. date - k`.
    pub fn run_length_before(&self, date: NaiveDate, person: &str, duty: &str) -> u32 {
        let mut run = 0;
        let mut day = date;
        loop {
            let Some(prev) = day.checked_sub_days(Days::new(1)) else {
                return run;
            };
            match self.person_for(prev, duty) {
                Some(p) if p == person => run += 1,
                _ => return run,
            }
            day = prev;
        }
    }

    /// Whether the person held a follow-up-free duty the day before.
    pub fn follow_up_free_yesterday(
        &self,
        date: NaiveDate,
        person: &str,
        catalog: &DutyCatalog,
    ) -> bool {
        let Some(yesterday) = date.checked_sub_days(Days::new(1)) else {
            return false;
        };
        self.duty_of(yesterday, person)
            .and_then(|duty| catalog.form(duty))
            .map(|form| form.follow_up_free)
            .unwrap_or(false)
    }

    fn month_entries(
        &self,
        date: NaiveDate,
    ) -> impl Iterator<Item = (&NaiveDate, &BTreeMap<DutyId, PersonId>)> + '_ {
        let (year, month) = (date.year(), date.month());
        self.entries
            .iter()
            .filter(move |(d, _)| d.year() == year && d.month() == month)
    }
}

//! Priority-driven duty planner.
//!
//! The driver pops the hardest slot off the planning queue, decides
//! between joint placement (MUST duty-duty combinations staff all
//! linked slots with one person at once) and single placement, selects
//! the best person under the dynamic limits, and cascades the
//! consequences through the remaining candidate sets. It never aborts:
//! slots that cannot be staffed are recorded and left open for the
//! repair phase.
//!
//! # Determinism
//!
//! Candidate sets iterate in person-id order and all ties fall back to
//! that order (or to queue insertion order), so a given input always
//! produces the same plan.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::checker::{check_plan, RuleViolation};
use crate::models::{
    DutyCatalog, DutyForm, DutyId, DutyPlan, EntityRef, HolidayCalendar, Person, PersonId, Rule,
    RuleKind, RuleWeight, WishRegistry,
};
use crate::network::RuleNetwork;

use super::candidates::{build_planning_map, static_eligible};
use super::queue::{PlanningQueue, QueueEntry};

/// Tunables of the planning run.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Weighted monthly duty budget of a full-time person.
    pub full_time_monthly_duties: f64,
    /// Safety margin kept below the monthly budget during selection.
    pub selection_headroom: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            full_time_monthly_duties: 10.0,
            selection_headroom: 1.0,
        }
    }
}

impl PlannerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full-time monthly duty budget.
    pub fn with_monthly_duties(mut self, duties: f64) -> Self {
        self.full_time_monthly_duties = duties;
        self
    }

    /// Sets the selection headroom below the monthly budget.
    pub fn with_selection_headroom(mut self, headroom: f64) -> Self {
        self.selection_headroom = headroom;
        self
    }
}

/// A slot the planner could not staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfilledSlot {
    /// Date of the open slot.
    pub date: NaiveDate,
    /// Duty form of the open slot.
    pub duty: DutyId,
}

/// The duty-scheduling engine.
///
/// Owns the plan, the wish-fulfillment state, and the record of open
/// slots for the duration of a run; people, catalog, rules, and the
/// holiday calendar are read-only shared inputs.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use duty_roster::models::{DutyCatalog, DutyForm, HolidayCalendar, Person, WishRegistry};
/// use duty_roster::network::RuleNetwork;
/// use duty_roster::scheduler::DutyScheduler;
///
/// let people = vec![Person::new("P1")];
/// let catalog = DutyCatalog::new().with_form(DutyForm::new("day-mon", Weekday::Mon));
/// let network = RuleNetwork::new();
/// let calendar = HolidayCalendar::new();
///
/// let mut scheduler =
///     DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
/// scheduler.run(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(), 7);
///
/// assert_eq!(scheduler.plan().assignment_count(), 1);
/// assert!(scheduler.unfilled().is_empty());
/// ```
#[derive(Debug)]
pub struct DutyScheduler<'a> {
    people: &'a [Person],
    catalog: &'a DutyCatalog,
    network: &'a RuleNetwork,
    calendar: &'a HolidayCalendar,
    config: PlannerConfig,
    person_index: HashMap<PersonId, usize>,
    wishes: WishRegistry,
    plan: DutyPlan,
    unfilled: Vec<UnfilledSlot>,
}

impl<'a> DutyScheduler<'a> {
    /// Creates a scheduler over validated inputs.
    pub fn new(
        people: &'a [Person],
        catalog: &'a DutyCatalog,
        network: &'a RuleNetwork,
        calendar: &'a HolidayCalendar,
        wishes: WishRegistry,
    ) -> Self {
        let person_index = people
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self {
            people,
            catalog,
            network,
            calendar,
            config: PlannerConfig::default(),
            person_index,
            wishes,
            plan: DutyPlan::new(),
            unfilled: Vec::new(),
        }
    }

    /// Sets the planner configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Merges externally produced assignments before planning.
    pub fn seed_plan<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (NaiveDate, DutyId, PersonId)>,
    {
        self.plan.seed(entries);
    }

    /// Plans all slots of `[start, start + horizon_days)`.
    pub fn run(&mut self, start: NaiveDate, horizon_days: u32) {
        let map = build_planning_map(
            start,
            horizon_days,
            self.people,
            self.catalog,
            self.network,
            &self.wishes,
            &self.plan,
            self.calendar,
        );
        let mut queue = PlanningQueue::build(map, &self.wishes, self.network);
        info!(event = "plan_start", slots = queue.len());

        while let Some(entry) = queue.pop_best() {
            self.plan_slot(entry, &mut queue);
        }

        info!(
            event = "plan_end",
            assignments = self.plan.assignment_count(),
            unfilled = self.unfilled.len()
        );
    }

    /// The plan built so far.
    pub fn plan(&self) -> &DutyPlan {
        &self.plan
    }

    /// The wish registry with fulfillment state.
    pub fn wishes(&self) -> &WishRegistry {
        &self.wishes
    }

    /// Slots the planner could not staff, in planning order.
    pub fn unfilled(&self) -> &[UnfilledSlot] {
        &self.unfilled
    }

    /// Checks every rule against the current plan.
    pub fn violations(&self) -> Vec<RuleViolation> {
        check_plan(self.network, &self.plan, self.catalog, self.calendar, self.people)
    }

    // Repair interface

    /// Places a person into a slot, replacing any previous holder.
    pub fn place(&mut self, date: NaiveDate, duty: impl Into<DutyId>, person: impl Into<PersonId>) {
        self.plan.assign(date, duty, person);
    }

    /// Removes an assignment and returns the previous holder.
    pub fn unplace(&mut self, date: NaiveDate, duty: &str) -> Option<PersonId> {
        self.plan.unassign(date, duty)
    }

    /// Statically eligible persons for a slot against the current plan.
    ///
    /// Empty when the duty is not active on the date.
    pub fn candidates(&self, date: NaiveDate, duty: &str) -> BTreeSet<PersonId> {
        let Some(form) = self.catalog.form(duty) else {
            return BTreeSet::new();
        };
        if !self.catalog.is_active_on(form, date, self.calendar) {
            return BTreeSet::new();
        }
        self.people
            .iter()
            .filter(|p| {
                static_eligible(
                    date,
                    p,
                    form,
                    &self.plan,
                    &self.wishes,
                    self.network,
                    self.catalog,
                )
            })
            .map(|p| p.id.clone())
            .collect()
    }

    // Placement

    fn plan_slot(&mut self, entry: QueueEntry, queue: &mut PlanningQueue) {
        if entry.candidates.is_empty() {
            debug!(date = %entry.date, duty = %entry.duty, "slot has no candidates");
            self.unfilled.push(UnfilledSlot {
                date: entry.date,
                duty: entry.duty,
            });
            return;
        }
        let network = self.network;
        let combi = network.duty_duty_rules(&entry.duty, RuleWeight::Must, RuleKind::Combination);
        if combi.is_empty() {
            self.place_single(&entry, queue);
        } else if !self.place_joint(&entry, &combi, queue) {
            debug!(
                date = %entry.date,
                duty = %entry.duty,
                "joint placement failed; falling back to single placement"
            );
            self.place_single(&entry, queue);
        }
    }

    fn place_single(&mut self, entry: &QueueEntry, queue: &mut PlanningQueue) {
        let catalog = self.catalog;
        let Some(form) = catalog.form(&entry.duty) else {
            return;
        };
        match self.select_best(&entry.candidates, entry.date, form, queue, false) {
            Some(person) => {
                self.commit(queue, entry.date, form, &person);
                self.forbidden_cascade_root(queue, &person, entry.date, &entry.duty);
            }
            None => {
                debug!(date = %entry.date, duty = %entry.duty, "no candidate passed selection");
                self.unfilled.push(UnfilledSlot {
                    date: entry.date,
                    duty: entry.duty.clone(),
                });
            }
        }
    }

    /// Staffs a slot together with all its MUST-combination partners.
    ///
    /// Returns `false` when no person can cover every linked slot; the
    /// caller then falls back to single placement and the checker
    /// reports the missing combination afterwards.
    fn place_joint(
        &mut self,
        entry: &QueueEntry,
        rules: &[&Rule],
        queue: &mut PlanningQueue,
    ) -> bool {
        let catalog = self.catalog;
        let Some(form) = catalog.form(&entry.duty) else {
            return false;
        };

        let mut linked: Vec<(DutyId, NaiveDate)> = Vec::new();
        for rule in rules {
            let Some(other) = rule.other_duty(&entry.duty) else {
                return false;
            };
            let Some(partner_day) = rule.linked_day(entry.date, &entry.duty, catalog) else {
                return false;
            };
            linked.push((other.clone(), partner_day));
        }

        let mut joint = entry.candidates.clone();
        for (other, partner_day) in &linked {
            match queue.candidates_for(*partner_day, other) {
                Some(partner_candidates) => joint.retain(|p| partner_candidates.contains(p)),
                None => return false,
            }
            if joint.is_empty() {
                return false;
            }
        }

        let Some(person) = self.select_best(&joint, entry.date, form, queue, true) else {
            return false;
        };

        self.commit(queue, entry.date, form, &person);
        for (other, partner_day) in &linked {
            if let Some(other_form) = catalog.form(other) {
                self.commit(queue, *partner_day, other_form, &person);
            }
            queue.remove_entry(*partner_day, other);
        }

        self.forbidden_cascade_root(queue, &person, entry.date, &entry.duty);
        for (other, partner_day) in &linked {
            self.forbidden_cascade_root(queue, &person, *partner_day, other);
        }
        true
    }

    /// Writes an assignment and prunes same-day, previous-day, and
    /// next-day candidate sets accordingly.
    fn commit(&mut self, queue: &mut PlanningQueue, date: NaiveDate, form: &DutyForm, person: &str) {
        self.plan.assign(date, form.id.clone(), person);
        info!(event = "assign", date = %date, duty = %form.id, person = %person);

        queue.remove_candidate_on_day(date, person);

        // Planning is not chronological: an open follow-up-free slot on
        // the previous day must not be staffed with this person anymore.
        if let Some(prev) = date.checked_sub_days(Days::new(1)) {
            let catalog = self.catalog;
            queue.remove_candidate_on_day_where(prev, person, |duty| {
                catalog.form(duty).map(|f| f.follow_up_free).unwrap_or(false)
            });
        }
        if form.follow_up_free {
            if let Some(next) = date.checked_add_days(Days::new(1)) {
                queue.remove_candidate_on_day(next, person);
            }
        }
    }

    fn forbidden_cascade_root(
        &self,
        queue: &mut PlanningQueue,
        person: &str,
        date: NaiveDate,
        duty: &str,
    ) {
        let mut visited = HashSet::new();
        self.forbidden_cascade(queue, person, date, duty, &mut visited);
    }

    /// Bars the person from every slot reachable through MUST-forbidden
    /// duty-duty rules. The visited set caps the walk at one removal per
    /// (rule, date) so rule cycles terminate.
    fn forbidden_cascade(
        &self,
        queue: &mut PlanningQueue,
        person: &str,
        date: NaiveDate,
        duty: &str,
        visited: &mut HashSet<(String, NaiveDate)>,
    ) {
        for rule in self
            .network
            .duty_duty_rules(duty, RuleWeight::Must, RuleKind::Forbidden)
        {
            if !visited.insert((rule.id.clone(), date)) {
                continue;
            }
            let Some(other) = rule.other_duty(duty) else {
                continue;
            };
            let Some(partner_day) = rule.linked_day(date, duty, self.catalog) else {
                continue;
            };
            queue.remove_candidate(partner_day, other, person);
            self.forbidden_cascade(queue, person, partner_day, other, visited);
        }
    }

    // Selection

    fn select_best(
        &mut self,
        pool: &BTreeSet<PersonId>,
        date: NaiveDate,
        form: &DutyForm,
        queue: &PlanningQueue,
        bypass: bool,
    ) -> Option<PersonId> {
        let wish_pool: BTreeSet<PersonId> = self
            .wishes
            .requested_persons(date, &form.id)
            .intersection(pool)
            .cloned()
            .collect();
        if !wish_pool.is_empty() {
            if let Some(person) = self.select_best_wish(&wish_pool, date, form, queue, bypass) {
                self.wishes.mark_fulfilled(date, &form.id, &person);
                debug!(date = %date, duty = %form.id, person = %person, "wish fulfilled");
                return Some(person);
            }
        }

        pool.iter()
            .filter(|p| self.passes_dynamic_filter(p, date, form, bypass))
            .min_by(|a, b| {
                let load_a = self.plan.weighted_month_total(date, a, self.catalog);
                let load_b = self.plan.weighted_month_total(date, b, self.catalog);
                cmp_f64(load_a, load_b)
                    .then_with(|| {
                        queue
                            .availability_count(a)
                            .cmp(&queue.availability_count(b))
                    })
                    .then_with(|| cmp_f64(0.5 * load_a, 0.5 * load_b))
            })
            .cloned()
    }

    /// Picks the fairest requester: few wishes fulfilled so far first,
    /// many submitted first, then scarce availability and low monthly
    /// load.
    fn select_best_wish(
        &self,
        pool: &BTreeSet<PersonId>,
        date: NaiveDate,
        form: &DutyForm,
        queue: &PlanningQueue,
        bypass: bool,
    ) -> Option<PersonId> {
        pool.iter()
            .filter(|p| self.passes_dynamic_filter(p, date, form, bypass))
            .min_by(|a, b| {
                self.wishes
                    .fulfilled_count(a)
                    .cmp(&self.wishes.fulfilled_count(b))
                    .then_with(|| {
                        self.wishes
                            .submitted_count(b)
                            .cmp(&self.wishes.submitted_count(a))
                    })
                    .then_with(|| {
                        queue
                            .availability_count(a)
                            .cmp(&queue.availability_count(b))
                    })
                    .then_with(|| {
                        cmp_f64(
                            self.plan.weighted_month_total(date, a, self.catalog),
                            self.plan.weighted_month_total(date, b, self.catalog),
                        )
                    })
            })
            .cloned()
    }

    /// Selection-time limits that depend on the evolving plan.
    fn passes_dynamic_filter(
        &self,
        person_id: &str,
        date: NaiveDate,
        form: &DutyForm,
        bypass: bool,
    ) -> bool {
        let Some(person) = self.person(person_id) else {
            return false;
        };

        let load = self.plan.weighted_month_total(date, person_id, self.catalog);
        let budget = (self.config.full_time_monthly_duties * person.work_capacity).round();
        if load >= budget - self.config.selection_headroom {
            return false;
        }
        if self.plan.monthly_count_of_form(date, person_id, &form.id) >= form.max_per_month {
            return false;
        }
        for linked in &form.linked_forms {
            if let Some(holder) = self.plan.person_for(date, linked) {
                if self.network.exists_must_forbidden(
                    &EntityRef::Person(person_id.to_string()),
                    &EntityRef::Person(holder.clone()),
                ) {
                    return false;
                }
            }
        }
        // A follow-up-free duty cannot go to someone already planned on
        // the next day.
        if form.follow_up_free {
            if let Some(next) = date.checked_add_days(Days::new(1)) {
                if self.plan.is_assigned(next, person_id) {
                    return false;
                }
            }
        }
        if !bypass {
            if self.plan.follow_up_free_yesterday(date, person_id, self.catalog) {
                return false;
            }
            if self.plan.run_length_before(date, person_id, &form.id) >= form.max_in_a_row {
                return false;
            }
        }
        true
    }

    fn person(&self, id: &str) -> Option<&Person> {
        self.person_index.get(id).map(|&i| &self.people[i])
    }
}

fn cmp_f64(a: f64, b: f64) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::RuleStatus;
    use crate::models::DutyGroup;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-06-02 is a Monday; 06-06 Friday, 06-07 Saturday, 06-08 Sunday.

    #[test]
    fn test_single_person_single_slot() {
        let people = vec![Person::new("P1")];
        let catalog = DutyCatalog::new().with_form(DutyForm::new("day-mon", Weekday::Mon));
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new();

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        s.run(date(2025, 6, 2), 1);

        assert_eq!(
            s.plan().person_for(date(2025, 6, 2), "day-mon"),
            Some(&"P1".to_string())
        );
        assert!(s.unfilled().is_empty());
        assert!(s.violations().is_empty());
    }

    #[test]
    fn test_follow_up_free_cascade() {
        let people = vec![Person::new("P1"), Person::new("P2")];
        let catalog = DutyCatalog::new()
            .with_form(DutyForm::new("night-fri", Weekday::Fri).with_follow_up_free())
            .with_form(DutyForm::new("day-sat", Weekday::Sat));
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new();
        let wishes = WishRegistry::new().with_wish(date(2025, 6, 6), "night-fri", "P1");

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, wishes);
        s.run(date(2025, 6, 6), 2);

        assert_eq!(
            s.plan().person_for(date(2025, 6, 6), "night-fri"),
            Some(&"P1".to_string())
        );
        // P1 is barred from Saturday by the follow-up-free cascade.
        assert_eq!(
            s.plan().person_for(date(2025, 6, 7), "day-sat"),
            Some(&"P2".to_string())
        );
        assert!(s.wishes().is_fulfilled(date(2025, 6, 6), "night-fri", "P1"));
        assert!(s.unfilled().is_empty());
    }

    #[test]
    fn test_mandatory_combination_same_person() {
        let people = vec![Person::new("P1"), Person::new("P2")];
        let catalog = DutyCatalog::new()
            .with_form(DutyForm::new("night-fri", Weekday::Fri))
            .with_form(DutyForm::new("night-sun", Weekday::Sun));
        let network = RuleNetwork::new().with_rule(Rule::duty_duty(
            "fri-sun-combi",
            "night-fri",
            "night-sun",
            RuleWeight::Must,
            RuleKind::Combination,
        ));
        let calendar = HolidayCalendar::new();

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        s.run(date(2025, 6, 6), 3);

        let fri = s.plan().person_for(date(2025, 6, 6), "night-fri");
        let sun = s.plan().person_for(date(2025, 6, 8), "night-sun");
        assert!(fri.is_some());
        assert_eq!(fri, sun);
        assert!(s.unfilled().is_empty());
        assert!(s.violations().is_empty());
    }

    #[test]
    fn test_in_a_row_limit_leaves_third_day_open() {
        // One Sunday form that also runs on the two following holidays,
        // so the same form occupies three consecutive days.
        let people = vec![Person::new("P1")];
        let catalog = DutyCatalog::new()
            .with_group(DutyGroup::new("ward", true))
            .with_form(
                DutyForm::new("ward-sun", Weekday::Sun)
                    .with_group("ward")
                    .with_max_in_a_row(2),
            );
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new()
            .with_holiday(date(2025, 6, 9))
            .with_holiday(date(2025, 6, 10));

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        s.run(date(2025, 6, 8), 3);

        assert_eq!(
            s.plan().person_for(date(2025, 6, 8), "ward-sun"),
            Some(&"P1".to_string())
        );
        assert_eq!(
            s.plan().person_for(date(2025, 6, 9), "ward-sun"),
            Some(&"P1".to_string())
        );
        assert_eq!(s.plan().person_for(date(2025, 6, 10), "ward-sun"), None);
        assert_eq!(
            s.unfilled(),
            &[UnfilledSlot {
                date: date(2025, 6, 10),
                duty: "ward-sun".to_string()
            }]
        );
    }

    #[test]
    fn test_forbidden_person_pair_on_concurrent_duties() {
        let people = vec![Person::new("P1"), Person::new("P2"), Person::new("P3")];
        let catalog = DutyCatalog::new()
            .with_form(DutyForm::new("line-a", Weekday::Fri).with_linked_form("line-b"))
            .with_form(DutyForm::new("line-b", Weekday::Fri).with_linked_form("line-a"));
        let network = RuleNetwork::new().with_rule(Rule::person_person(
            "p1-p2-apart",
            "P1",
            "P2",
            RuleWeight::Must,
            RuleKind::Forbidden,
        ));
        let calendar = HolidayCalendar::new();

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        s.run(date(2025, 6, 6), 1);

        let a = s.plan().person_for(date(2025, 6, 6), "line-a").cloned();
        let b = s.plan().person_for(date(2025, 6, 6), "line-b").cloned();
        assert!(a.is_some() && b.is_some());
        let pair = (a.unwrap(), b.unwrap());
        assert_ne!(pair, ("P1".to_string(), "P2".to_string()));
        assert_ne!(pair, ("P2".to_string(), "P1".to_string()));
        assert!(s.violations().is_empty());
    }

    #[test]
    fn test_wish_tie_break_prefers_more_submitted() {
        let people = vec![Person::new("P1"), Person::new("P2")];
        let catalog = DutyCatalog::new()
            .with_form(DutyForm::new("day-mon", Weekday::Mon))
            .with_form(DutyForm::new("day-tue", Weekday::Tue));
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new();

        // P1 submitted five wishes, P2 one; both want Monday's slot.
        let mut wishes = WishRegistry::new();
        wishes.add_wish(date(2025, 6, 2), "day-mon", "P1");
        wishes.add_wish(date(2025, 6, 2), "day-mon", "P2");
        for week in 1..5 {
            wishes.add_wish(date(2025, 6, 2 + 7 * week), "day-mon", "P1");
        }
        assert_eq!(wishes.submitted_count("P1"), 5);
        assert_eq!(wishes.submitted_count("P2"), 1);

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, wishes);
        s.run(date(2025, 6, 2), 1);

        assert_eq!(
            s.plan().person_for(date(2025, 6, 2), "day-mon"),
            Some(&"P1".to_string())
        );
        assert!(s.wishes().is_fulfilled(date(2025, 6, 2), "day-mon", "P1"));
        assert!(!s.wishes().is_fulfilled(date(2025, 6, 2), "day-mon", "P2"));
    }

    #[test]
    fn test_unfilled_when_everyone_absent() {
        let people = vec![Person::new("P1").with_absence(date(2025, 6, 2))];
        let catalog = DutyCatalog::new().with_form(DutyForm::new("day-mon", Weekday::Mon));
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new();

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        s.run(date(2025, 6, 2), 1);

        assert!(s.plan().is_empty());
        assert_eq!(s.unfilled().len(), 1);
    }

    #[test]
    fn test_seeded_plan_blocks_follow_up_day() {
        let people = vec![Person::new("P1"), Person::new("P2")];
        let catalog = DutyCatalog::new()
            .with_form(DutyForm::new("night-fri", Weekday::Fri).with_follow_up_free())
            .with_form(DutyForm::new("day-sat", Weekday::Sat));
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new();

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        // Friday was staffed externally.
        s.seed_plan(vec![(
            date(2025, 6, 6),
            "night-fri".to_string(),
            "P1".to_string(),
        )]);
        s.run(date(2025, 6, 7), 1);

        assert_eq!(
            s.plan().person_for(date(2025, 6, 7), "day-sat"),
            Some(&"P2".to_string())
        );
    }

    #[test]
    fn test_joint_placement_falls_back_when_partner_outside_horizon() {
        let people = vec![Person::new("P1")];
        let catalog = DutyCatalog::new()
            .with_form(DutyForm::new("night-fri", Weekday::Fri))
            .with_form(DutyForm::new("night-sun", Weekday::Sun));
        let network = RuleNetwork::new().with_rule(Rule::duty_duty(
            "fri-sun-combi",
            "night-fri",
            "night-sun",
            RuleWeight::Must,
            RuleKind::Combination,
        ));
        let calendar = HolidayCalendar::new();

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        // Horizon covers Friday only; the Sunday partner slot does not exist.
        s.run(date(2025, 6, 6), 1);

        // Single-placement fallback staffs Friday anyway...
        assert_eq!(
            s.plan().person_for(date(2025, 6, 6), "night-fri"),
            Some(&"P1".to_string())
        );
        // ...and the checker reports the combination as missing.
        let violations = s.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].status, RuleStatus::CombinationMissing);
        assert_eq!(violations[0].rule_id, "fri-sun-combi");
    }

    #[test]
    fn test_monthly_budget_blocks_selection() {
        // Capacity 0.2 -> budget round(2) = 2; with headroom 1 the
        // weighted load must stay below 1, so a second duty in the same
        // month is rejected.
        let people = vec![Person::new("P1").with_capacity(0.2)];
        let catalog = DutyCatalog::new().with_form(DutyForm::new("day-mon", Weekday::Mon));
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new();

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        s.run(date(2025, 6, 2), 14); // two Mondays

        assert_eq!(s.plan().assignment_count(), 1);
        assert_eq!(s.unfilled().len(), 1);
    }

    #[test]
    fn test_max_per_month_cap() {
        let people = vec![Person::new("P1"), Person::new("P2")];
        let catalog = DutyCatalog::new()
            .with_form(DutyForm::new("day-mon", Weekday::Mon).with_max_per_month(1));
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new();

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        s.run(date(2025, 6, 2), 14); // two Mondays

        // The cap forces the second Monday onto the other person.
        let first = s.plan().person_for(date(2025, 6, 2), "day-mon").unwrap();
        let second = s.plan().person_for(date(2025, 6, 9), "day-mon").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_holiday_staffs_sunday_variant() {
        let people = vec![Person::new("P1")];
        let catalog = DutyCatalog::new()
            .with_group(DutyGroup::new("ward", true))
            .with_form(DutyForm::new("ward-mon", Weekday::Mon).with_group("ward"))
            .with_form(
                DutyForm::new("ward-sun", Weekday::Sun)
                    .with_group("ward")
                    .with_max_in_a_row(2),
            );
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new().with_holiday(date(2025, 6, 9));

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        s.run(date(2025, 6, 9), 1);

        // The holiday Monday runs the Sunday variant, not the Monday form.
        assert_eq!(
            s.plan().person_for(date(2025, 6, 9), "ward-sun"),
            Some(&"P1".to_string())
        );
        assert_eq!(s.plan().person_for(date(2025, 6, 9), "ward-mon"), None);
    }

    #[test]
    fn test_repair_interface_roundtrip() {
        let people = vec![Person::new("P1"), Person::new("P2")];
        let catalog = DutyCatalog::new().with_form(DutyForm::new("day-mon", Weekday::Mon));
        let network = RuleNetwork::new();
        let calendar = HolidayCalendar::new();

        let mut s = DutyScheduler::new(&people, &catalog, &network, &calendar, WishRegistry::new());
        s.run(date(2025, 6, 2), 1);

        let monday = date(2025, 6, 2);
        let holder = s.plan().person_for(monday, "day-mon").cloned().unwrap();
        assert_eq!(s.unplace(monday, "day-mon"), Some(holder));

        let pool = s.candidates(monday, "day-mon");
        assert_eq!(pool.len(), 2);
        s.place(monday, "day-mon", "P2");
        assert_eq!(
            s.plan().person_for(monday, "day-mon"),
            Some(&"P2".to_string())
        );

        // Off-weekday queries yield nothing.
        assert!(s.candidates(date(2025, 6, 3), "day-mon").is_empty());
    }
}

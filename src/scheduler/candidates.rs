//! Static eligibility and planning-map construction.
//!
//! Before any queue processing, every slot of the horizon gets its
//! statically eligible candidate set: the people who could hold the
//! duty judging only by facts known up front (absence, fitness, day-off
//! wishes, person-duty and rotation bans, and the follow-up/run state
//! of any seeded assignments). Dynamic limits — monthly caps, forbidden
//! neighbors — are deliberately left to selection time, where the
//! evolving plan is known.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate};

use crate::models::{
    DutyCatalog, DutyForm, DutyId, DutyPlan, EntityRef, HolidayCalendar, Person, PersonId,
    RuleKind, RuleWeight, WishRegistry,
};
use crate::network::RuleNetwork;

/// One slot of the planning map: a duty on a date with its wish flag
/// and statically eligible candidates.
#[derive(Debug, Clone)]
pub struct SlotCandidates {
    /// Duty form of the slot.
    pub duty: DutyId,
    /// Whether anyone requested this slot.
    pub wished: bool,
    /// Statically eligible persons, ordered by id.
    pub candidates: BTreeSet<PersonId>,
}

/// Date-ordered planning map; slots within a day follow catalog order.
pub type PlanningMap = BTreeMap<NaiveDate, Vec<SlotCandidates>>;

/// Whether a person could hold a duty on a date judging only by static
/// facts.
///
/// All of the following must hold:
/// 1. not absent and duty-fit
/// 2. no day-off wish on the date
/// 3. no MUST-forbidden person-duty rule
/// 4. no follow-up-free duty held the day before
/// 5. below the form's in-a-row limit (maximal run ending yesterday)
/// 6. an existing same-day duty requires a MUST duty-duty combination
/// 7. no MUST-forbidden rule against the person's active rotation
pub fn static_eligible(
    date: NaiveDate,
    person: &Person,
    form: &DutyForm,
    plan: &DutyPlan,
    wishes: &WishRegistry,
    network: &RuleNetwork,
    catalog: &DutyCatalog,
) -> bool {
    if person.is_absent(date) || !person.duty_fit {
        return false;
    }
    if wishes.has_off_wish(date, &person.id) {
        return false;
    }
    let duty_ref = EntityRef::Duty(form.id.clone());
    if network.exists_must_forbidden(&EntityRef::Person(person.id.clone()), &duty_ref) {
        return false;
    }
    if plan.follow_up_free_yesterday(date, &person.id, catalog) {
        return false;
    }
    if plan.run_length_before(date, &person.id, &form.id) >= form.max_in_a_row {
        return false;
    }
    if let Some(held) = plan.duty_of(date, &person.id) {
        if !network.exists(
            &duty_ref,
            &EntityRef::Duty(held.clone()),
            RuleWeight::Must,
            RuleKind::Combination,
        ) {
            return false;
        }
    }
    if let Some(rotation) = person.active_rotation(date) {
        if network.exists_must_forbidden(&EntityRef::Rotation(rotation.clone()), &duty_ref) {
            return false;
        }
    }
    true
}

/// The duty forms to staff on a date: the holiday-duty set on holidays,
/// otherwise the forms matching the weekday, in catalog order.
pub fn relevant_duties<'a>(
    date: NaiveDate,
    catalog: &'a DutyCatalog,
    calendar: &HolidayCalendar,
) -> Vec<&'a DutyForm> {
    if calendar.is_holiday(date) {
        catalog.holiday_duties()
    } else {
        catalog
            .forms()
            .iter()
            .filter(|f| f.weekday == date.weekday())
            .collect()
    }
}

/// Builds the planning map for `[start, start + horizon_days)`.
///
/// Seeded plan entries participate: they shrink candidate sets through
/// the follow-up and in-a-row checks.
#[allow(clippy::too_many_arguments)]
pub fn build_planning_map(
    start: NaiveDate,
    horizon_days: u32,
    people: &[Person],
    catalog: &DutyCatalog,
    network: &RuleNetwork,
    wishes: &WishRegistry,
    plan: &DutyPlan,
    calendar: &HolidayCalendar,
) -> PlanningMap {
    let mut map = PlanningMap::new();
    for offset in 0..horizon_days {
        let Some(date) = start.checked_add_days(Days::new(offset.into())) else {
            break;
        };
        let slots = relevant_duties(date, catalog, calendar)
            .into_iter()
            .map(|form| SlotCandidates {
                duty: form.id.clone(),
                wished: wishes.is_requested(date, &form.id),
                candidates: people
                    .iter()
                    .filter(|p| static_eligible(date, p, form, plan, wishes, network, catalog))
                    .map(|p| p.id.clone())
                    .collect(),
            })
            .collect();
        map.insert(date, slots);
    }
    map
}

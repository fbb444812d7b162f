//! Post-hoc rule checking.
//!
//! After planning, every rule of every weight is evaluated against the
//! finished plan, date by date. MUST rules were already enforced during
//! placement, so their violations signal either a failed joint
//! placement (combination missing after the single-placement fallback)
//! or a driver defect (forbidden violated); SHOULD and MAY findings are
//! diagnostics for the repair phase.
//!
//! The checker is pure: it never mutates the plan, and checking the
//! same plan twice yields identical results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    DutyCatalog, DutyPlan, HolidayCalendar, Person, Rule, RuleKind, RuleParticipants,
};
use crate::network::RuleNetwork;

/// Outcome of evaluating one rule on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    /// The rule is satisfied.
    Ok,
    /// A combination rule's pair is not jointly assigned.
    CombinationMissing,
    /// A forbidden rule's pair is jointly assigned.
    ForbiddenViolated,
}

/// A rule found unsatisfied on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Date of the finding.
    pub date: NaiveDate,
    /// What went wrong.
    pub status: RuleStatus,
    /// Identifier of the violated rule.
    pub rule_id: String,
}

/// Checks every rule against the plan.
///
/// Rules are visited per subtype in network insertion order (duty-duty,
/// person-person, person-duty, rotation-duty), dates ascending; only
/// non-OK outcomes are returned.
pub fn check_plan(
    network: &RuleNetwork,
    plan: &DutyPlan,
    catalog: &DutyCatalog,
    calendar: &HolidayCalendar,
    people: &[Person],
) -> Vec<RuleViolation> {
    let dates: Vec<NaiveDate> = plan.dates().collect();
    let mut violations = Vec::new();

    for rule in network.all_duty_duty_rules() {
        for &date in &dates {
            if duty_duty_relevant(rule, date, catalog, calendar) {
                let linked = duty_duty_linked(rule, date, plan, catalog);
                record(&mut violations, rule, date, linked);
            }
        }
    }
    for rule in network.all_person_person_rules() {
        for &date in &dates {
            if person_person_relevant(rule, date, plan) {
                let linked = person_person_linked(rule, date, plan, catalog);
                record(&mut violations, rule, date, linked);
            }
        }
    }
    for rule in network.all_person_duty_rules() {
        for &date in &dates {
            if duty_active_for_rule(rule, date, catalog, calendar) {
                let linked = person_duty_linked(rule, date, plan);
                record(&mut violations, rule, date, linked);
            }
        }
    }
    for rule in network.all_rotation_duty_rules() {
        for &date in &dates {
            if duty_active_for_rule(rule, date, catalog, calendar) {
                let linked = rotation_duty_linked(rule, date, plan, people);
                record(&mut violations, rule, date, linked);
            }
        }
    }

    debug!(event = "check_end", violations = violations.len());
    violations
}

fn record(violations: &mut Vec<RuleViolation>, rule: &Rule, date: NaiveDate, linked: bool) {
    let status = match (rule.kind, linked) {
        (RuleKind::Combination, true) | (RuleKind::Forbidden, false) => RuleStatus::Ok,
        (RuleKind::Combination, false) => RuleStatus::CombinationMissing,
        (RuleKind::Forbidden, true) => RuleStatus::ForbiddenViolated,
    };
    if status != RuleStatus::Ok {
        violations.push(RuleViolation {
            date,
            status,
            rule_id: rule.id.clone(),
        });
    }
}

/// A duty-duty rule matters on a date when either form is active there;
/// on holidays both groups must additionally apply on holidays.
fn duty_duty_relevant(
    rule: &Rule,
    date: NaiveDate,
    catalog: &DutyCatalog,
    calendar: &HolidayCalendar,
) -> bool {
    let RuleParticipants::DutyDuty { earlier, later } = &rule.participants else {
        return false;
    };
    let (Some(first), Some(second)) = (catalog.form(earlier), catalog.form(later)) else {
        return false;
    };
    if calendar.is_holiday(date)
        && !(catalog.group_applies_on_holidays(first) && catalog.group_applies_on_holidays(second))
    {
        return false;
    }
    catalog.is_active_on(first, date, calendar) || catalog.is_active_on(second, date, calendar)
}

/// Two duty forms are linked on a date when both the date's slot and
/// the linked day's slot are planned and held by the same person. Only
/// the first possible partner day is examined.
fn duty_duty_linked(rule: &Rule, date: NaiveDate, plan: &DutyPlan, catalog: &DutyCatalog) -> bool {
    let RuleParticipants::DutyDuty { earlier, later } = &rule.participants else {
        return false;
    };
    // Today holds the earlier form: the partner lies in the future.
    if let Some(holder) = plan.person_for(date, earlier) {
        if let Some(partner_day) = rule.linked_day_forward(date, catalog) {
            if let Some(partner_holder) = plan.person_for(partner_day, later) {
                return holder == partner_holder;
            }
        }
    }
    // Today holds the later form: the partner lies in the past.
    if let Some(holder) = plan.person_for(date, later) {
        if let Some(partner_day) = rule.linked_day_backward(date, catalog) {
            if let Some(partner_holder) = plan.person_for(partner_day, earlier) {
                return holder == partner_holder;
            }
        }
    }
    false
}

fn person_person_relevant(rule: &Rule, date: NaiveDate, plan: &DutyPlan) -> bool {
    let RuleParticipants::PersonPerson { a, b } = &rule.participants else {
        return false;
    };
    plan.is_assigned(date, a) || plan.is_assigned(date, b)
}

/// Two persons are linked on a date when they hold concurrent duties:
/// one form lists the other as a linked form.
fn person_person_linked(
    rule: &Rule,
    date: NaiveDate,
    plan: &DutyPlan,
    catalog: &DutyCatalog,
) -> bool {
    let RuleParticipants::PersonPerson { a, b } = &rule.participants else {
        return false;
    };
    let (Some(duty_a), Some(duty_b)) = (plan.duty_of(date, a), plan.duty_of(date, b)) else {
        return false;
    };
    let concurrent = |x: &str, y: &str| {
        catalog
            .form(x)
            .map(|f| f.linked_forms.iter().any(|l| l == y))
            .unwrap_or(false)
    };
    concurrent(duty_a, duty_b) || concurrent(duty_b, duty_a)
}

/// Person-duty and rotation-duty rules matter whenever their duty is
/// active on the date.
fn duty_active_for_rule(
    rule: &Rule,
    date: NaiveDate,
    catalog: &DutyCatalog,
    calendar: &HolidayCalendar,
) -> bool {
    let duty = match &rule.participants {
        RuleParticipants::PersonDuty { duty, .. } => duty,
        RuleParticipants::RotationDuty { duty, .. } => duty,
        _ => return false,
    };
    catalog
        .form(duty)
        .map(|f| catalog.is_active_on(f, date, calendar))
        .unwrap_or(false)
}

fn person_duty_linked(rule: &Rule, date: NaiveDate, plan: &DutyPlan) -> bool {
    let RuleParticipants::PersonDuty { person, duty } = &rule.participants else {
        return false;
    };
    plan.person_for(date, duty) == Some(person)
}

/// A rotation and a duty are linked on a date when the duty's holder
/// has that rotation active.
fn rotation_duty_linked(
    rule: &Rule,
    date: NaiveDate,
    plan: &DutyPlan,
    people: &[Person],
) -> bool {
    let RuleParticipants::RotationDuty { rotation, duty } = &rule.participants else {
        return false;
    };
    let Some(holder) = plan.person_for(date, duty) else {
        return false;
    };
    people
        .iter()
        .find(|p| &p.id == holder)
        .and_then(|p| p.active_rotation(date))
        == Some(rotation)
}

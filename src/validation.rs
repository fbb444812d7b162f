//! Input validation for rostering problems.
//!
//! Checks structural integrity of people, the duty catalog, and the
//! rule network before planning. Detects:
//! - Duplicate IDs
//! - Work capacities outside (0, 1]
//! - Inconsistent duty metadata (`max_in_a_row` < 1)
//! - Dangling references (groups, linked forms, rule participants)
//!
//! Validation failures are fatal: the planner assumes a validated
//! input and never re-checks these conditions.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{DutyCatalog, Person, RuleParticipants};
use crate::network::RuleNetwork;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A person's work capacity is outside (0, 1].
    InvalidCapacity,
    /// A duty form carries inconsistent metadata.
    InvalidDutyMetadata,
    /// A reference points to an entity that doesn't exist.
    UnknownReference,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input of a rostering problem.
///
/// Checks:
/// 1. No duplicate person, duty-form, or duty-group IDs
/// 2. Work capacities within (0, 1]
/// 3. `max_in_a_row >= 1` on every form
/// 4. Group and linked-form references resolve
/// 5. Rule participants (persons, duties) resolve
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    people: &[Person],
    catalog: &DutyCatalog,
    network: &RuleNetwork,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut person_ids = HashSet::new();
    for p in people {
        if !person_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate person ID: {}", p.id),
            ));
        }
        if !(p.work_capacity > 0.0 && p.work_capacity <= 1.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!(
                    "Person '{}' has work capacity {} outside (0, 1]",
                    p.id, p.work_capacity
                ),
            ));
        }
    }

    let mut group_ids = HashSet::new();
    for g in catalog.groups() {
        if !group_ids.insert(g.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate duty-group ID: {}", g.id),
            ));
        }
    }

    let mut duty_ids = HashSet::new();
    for f in catalog.forms() {
        if !duty_ids.insert(f.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate duty-form ID: {}", f.id),
            ));
        }
        if f.max_in_a_row < 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDutyMetadata,
                format!("Duty form '{}' has max_in_a_row < 1", f.id),
            ));
        }
        if let Some(group) = f.group.as_deref() {
            if catalog.group(group).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Duty form '{}' references unknown group '{group}'", f.id),
                ));
            }
        }
        for linked in &f.linked_forms {
            if catalog.form(linked).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!(
                        "Duty form '{}' references unknown linked form '{linked}'",
                        f.id
                    ),
                ));
            }
        }
    }

    for rule in network.rules() {
        let (persons, duties): (Vec<&str>, Vec<&str>) = match &rule.participants {
            RuleParticipants::DutyDuty { earlier, later } => {
                (vec![], vec![earlier.as_str(), later.as_str()])
            }
            RuleParticipants::PersonPerson { a, b } => (vec![a.as_str(), b.as_str()], vec![]),
            RuleParticipants::PersonDuty { person, duty } => {
                (vec![person.as_str()], vec![duty.as_str()])
            }
            RuleParticipants::RotationDuty { duty, .. } => (vec![], vec![duty.as_str()]),
        };
        for p in persons {
            if !person_ids.contains(p) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Rule '{}' references unknown person '{p}'", rule.id),
                ));
            }
        }
        for d in duties {
            if !duty_ids.contains(d) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Rule '{}' references unknown duty '{d}'", rule.id),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DutyForm, DutyGroup, Rule, RuleKind, RuleWeight};
    use chrono::Weekday;

    fn sample_people() -> Vec<Person> {
        vec![Person::new("P1"), Person::new("P2")]
    }

    fn sample_catalog() -> DutyCatalog {
        DutyCatalog::new()
            .with_group(DutyGroup::new("night", true))
            .with_form(DutyForm::new("night-fri", Weekday::Fri).with_group("night"))
            .with_form(DutyForm::new("night-sun", Weekday::Sun).with_group("night"))
    }

    #[test]
    fn test_valid_input() {
        let network = RuleNetwork::new().with_rule(Rule::duty_duty(
            "r1",
            "night-fri",
            "night-sun",
            RuleWeight::Must,
            RuleKind::Combination,
        ));
        assert!(validate_input(&sample_people(), &sample_catalog(), &network).is_ok());
    }

    #[test]
    fn test_duplicate_person_id() {
        let people = vec![Person::new("P1"), Person::new("P1")];
        let errors =
            validate_input(&people, &sample_catalog(), &RuleNetwork::new()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_invalid_capacity() {
        let mut person = Person::new("P1");
        person.work_capacity = 0.0;
        let errors =
            validate_input(&[person], &sample_catalog(), &RuleNetwork::new()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidCapacity));
    }

    #[test]
    fn test_max_in_a_row_zero() {
        let mut catalog = sample_catalog();
        let mut form = DutyForm::new("broken", Weekday::Mon);
        form.max_in_a_row = 0;
        catalog.add_form(form);

        let errors =
            validate_input(&sample_people(), &catalog, &RuleNetwork::new()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidDutyMetadata));
    }

    #[test]
    fn test_unknown_group_and_linked_form() {
        let catalog = DutyCatalog::new().with_form(
            DutyForm::new("orphan", Weekday::Mon)
                .with_group("nowhere")
                .with_linked_form("missing"),
        );
        let errors =
            validate_input(&sample_people(), &catalog, &RuleNetwork::new()).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::UnknownReference)
                .count(),
            2
        );
    }

    #[test]
    fn test_rule_with_unknown_participants() {
        let network = RuleNetwork::new()
            .with_rule(Rule::person_person(
                "r1",
                "P1",
                "GHOST",
                RuleWeight::Must,
                RuleKind::Forbidden,
            ))
            .with_rule(Rule::person_duty(
                "r2",
                "P2",
                "no-such-duty",
                RuleWeight::Must,
                RuleKind::Forbidden,
            ));
        let errors = validate_input(&sample_people(), &sample_catalog(), &network).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::UnknownReference)
                .count(),
            2
        );
    }

    #[test]
    fn test_multiple_errors_reported_together() {
        let people = vec![Person::new("P1"), Person::new("P1")];
        let catalog = DutyCatalog::new()
            .with_form(DutyForm::new("orphan", Weekday::Mon).with_group("nowhere"));
        let errors = validate_input(&people, &catalog, &RuleNetwork::new()).unwrap_err();
        assert!(errors.len() >= 2);
    }
}

//! Duty-rostering domain models.
//!
//! Provides the core data types for describing a rostering problem
//! and its solution: people, duty forms and groups, rules, wishes,
//! the holiday calendar, and the plan under construction.

mod calendar;
mod duty;
mod person;
mod plan;
mod rule;
mod wish;

pub use calendar::HolidayCalendar;
pub use duty::{DutyCatalog, DutyForm, DutyGroup};
pub use person::{Person, RotationWindow};
pub use plan::DutyPlan;
pub use rule::{EntityRef, Rule, RuleKind, RuleParticipants, RuleWeight};
pub use wish::{Wish, WishRegistry};

/// Person identifier.
pub type PersonId = String;
/// Duty-form identifier.
pub type DutyId = String;
/// Duty-group identifier.
pub type GroupId = String;
/// Rotation-template identifier.
pub type RotationId = String;

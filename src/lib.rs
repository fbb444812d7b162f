//! Constraint-driven duty rostering.
//!
//! Assigns people to duty slots across a calendar horizon: each day
//! carries the duty forms applicable to its weekday (or the holiday
//! variants), every form takes at most one person, and placement
//! respects absences, work capacity, follow-up-free days, consecutive
//! run limits, explicit duty wishes, and a network of pairwise rules.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Person`, `DutyForm`, `DutyGroup`,
//!   `Rule`, `WishRegistry`, `DutyPlan`, `HolidayCalendar`
//! - **`network`**: `RuleNetwork`, the indexed rule store
//! - **`validation`**: Input integrity checks (duplicate IDs, capacity
//!   ranges, dangling references)
//! - **`scheduler`**: The planning engine — candidate computation, the
//!   dynamic-priority queue, and the `DutyScheduler` driver
//! - **`checker`**: Post-hoc rule evaluation yielding violations
//!
//! # Planning model
//!
//! The engine is greedy and deterministic: a priority queue orders the
//! open slots hardest-first (requested slots, then scarce candidate
//! sets), MUST-weight rules are enforced during placement, and whatever
//! cannot be staffed is handed to an external repair phase as open
//! slots plus checker violations. It is a heuristic, not a solver — no
//! optimality is claimed.
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"

pub mod checker;
pub mod models;
pub mod network;
pub mod scheduler;
pub mod validation;

pub use checker::{check_plan, RuleStatus, RuleViolation};
pub use models::{
    DutyCatalog, DutyForm, DutyGroup, DutyPlan, HolidayCalendar, Person, Rule, RuleKind,
    RuleWeight, WishRegistry,
};
pub use network::RuleNetwork;
pub use scheduler::{DutyScheduler, PlannerConfig, UnfilledSlot};
pub use validation::{validate_input, ValidationError, ValidationErrorKind};

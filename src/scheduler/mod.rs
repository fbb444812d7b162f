//! The duty-scheduling engine.
//!
//! Planning runs in three stages:
//!
//! 1. **Candidates** — every slot of the horizon gets its statically
//!    eligible candidate set ([`candidates`]).
//! 2. **Queue** — slots are ordered hardest-first by a dynamic
//!    comparator ([`queue`]).
//! 3. **Driver** — slots are staffed one by one, joint placements for
//!    mandatory combinations included, with cascading candidate pruning
//!    ([`DutyScheduler`]).
//!
//! The driver never fails; open slots and residual rule violations are
//! reported for the external repair phase.

pub mod candidates;
pub mod queue;

mod driver;

pub use candidates::{build_planning_map, relevant_duties, static_eligible, SlotCandidates};
pub use driver::{DutyScheduler, PlannerConfig, UnfilledSlot};
pub use queue::{PlanningQueue, QueueEntry};

//! Person model.
//!
//! People are the staffing side of the roster: each person carries a
//! work capacity (fraction of a full-time duty budget), a duty-fitness
//! flag, a set of absence dates, and zero or more rotation windows that
//! tie the person to a higher-level work context for a date interval.
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering: A review of
//! applications, methods and models"

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::RotationId;

/// A person that can be assigned to duty slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Unique person identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Fraction of a full-time duty budget, in (0.0, 1.0].
    pub work_capacity: f64,
    /// Whether the person may hold duties at all.
    pub duty_fit: bool,
    /// Dates on which the person is absent (vacation, sickness, training).
    pub absences: BTreeSet<NaiveDate>,
    /// Rotation windows the person is assigned to.
    pub rotations: Vec<RotationWindow>,
}

/// A timed assignment of a person to a rotation template.
///
/// The interval is inclusive on both ends. Windows of one person are
/// expected not to overlap; if they do, the earliest registered window
/// wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationWindow {
    /// Rotation template identifier.
    pub rotation: RotationId,
    /// First day of the window (inclusive).
    pub start: NaiveDate,
    /// Last day of the window (inclusive).
    pub end: NaiveDate,
}

impl Person {
    /// Creates a new full-time, duty-fit person.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            work_capacity: 1.0,
            duty_fit: true,
            absences: BTreeSet::new(),
            rotations: Vec::new(),
        }
    }

    /// Sets the person's name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the work capacity (clamped to (0.0, 1.0]).
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.work_capacity = capacity.clamp(f64::MIN_POSITIVE, 1.0);
        self
    }

    /// Marks the person as not duty-fit.
    pub fn unfit(mut self) -> Self {
        self.duty_fit = false;
        self
    }

    /// Adds an absence date.
    pub fn with_absence(mut self, date: NaiveDate) -> Self {
        self.absences.insert(date);
        self
    }

    /// Adds a rotation window.
    pub fn with_rotation(
        mut self,
        rotation: impl Into<RotationId>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        self.rotations.push(RotationWindow {
            rotation: rotation.into(),
            start,
            end,
        });
        self
    }

    /// Whether the person is absent on the given date.
    #[inline]
    pub fn is_absent(&self, date: NaiveDate) -> bool {
        self.absences.contains(&date)
    }

    /// The rotation template active on the given date, if any.
    pub fn active_rotation(&self, date: NaiveDate) -> Option<&RotationId> {
        self.rotations
            .iter()
            .find(|w| w.start <= date && date <= w.end)
            .map(|w| &w.rotation)
    }
}

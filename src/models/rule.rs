//! Rules over persons, duties, and rotations.
//!
//! A rule couples exactly two entities with a weight and a kind. The
//! kind says whether the pair is a required joint assignment
//! (combination) or a prohibited one (forbidden); the weight says how
//! binding the rule is. Only MUST-weight rules are enforced during
//! placement — the rest surface as diagnostics from the checker.
//!
//! Rules are plain values: constructing one does not register it
//! anywhere. The caller assembles them into a
//! [`RuleNetwork`](crate::network::RuleNetwork).

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{DutyCatalog, DutyId, PersonId, RotationId};

/// How binding a rule is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleWeight {
    /// Enforced during placement.
    Must,
    /// Checked, reported, never enforced.
    Should,
    /// Advisory only.
    May,
}

/// What a rule demands of its pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// The pair must be jointly assigned.
    Combination,
    /// The pair must never be jointly assigned.
    Forbidden,
}

/// The two entities a rule couples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleParticipants {
    /// Two duty forms, linked across days within a seven-day window.
    /// `earlier` is the chronologically first form of the pair.
    DutyDuty { earlier: DutyId, later: DutyId },
    /// Two persons working concurrent duties on the same day.
    PersonPerson { a: PersonId, b: PersonId },
    /// A person and a duty form.
    PersonDuty { person: PersonId, duty: DutyId },
    /// A rotation template and a duty form.
    RotationDuty { rotation: RotationId, duty: DutyId },
}

/// Key under which an entity is indexed in the rule network.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EntityRef {
    /// A person, by id.
    Person(PersonId),
    /// A duty form, by id.
    Duty(DutyId),
    /// A rotation template, by id.
    Rotation(RotationId),
}

/// A single rule between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier.
    pub id: String,
    /// How binding the rule is.
    pub weight: RuleWeight,
    /// Combination or forbidden.
    pub kind: RuleKind,
    /// The coupled entities.
    pub participants: RuleParticipants,
}

impl Rule {
    /// Creates a rule between two duty forms. `earlier` must be the
    /// chronologically first form of the pair (e.g. the Friday duty of a
    /// Friday+Sunday combination).
    pub fn duty_duty(
        id: impl Into<String>,
        earlier: impl Into<DutyId>,
        later: impl Into<DutyId>,
        weight: RuleWeight,
        kind: RuleKind,
    ) -> Self {
        Self {
            id: id.into(),
            weight,
            kind,
            participants: RuleParticipants::DutyDuty {
                earlier: earlier.into(),
                later: later.into(),
            },
        }
    }

    /// Creates a rule between two persons.
    pub fn person_person(
        id: impl Into<String>,
        a: impl Into<PersonId>,
        b: impl Into<PersonId>,
        weight: RuleWeight,
        kind: RuleKind,
    ) -> Self {
        Self {
            id: id.into(),
            weight,
            kind,
            participants: RuleParticipants::PersonPerson {
                a: a.into(),
                b: b.into(),
            },
        }
    }

    /// Creates a rule between a person and a duty form.
    pub fn person_duty(
        id: impl Into<String>,
        person: impl Into<PersonId>,
        duty: impl Into<DutyId>,
        weight: RuleWeight,
        kind: RuleKind,
    ) -> Self {
        Self {
            id: id.into(),
            weight,
            kind,
            participants: RuleParticipants::PersonDuty {
                person: person.into(),
                duty: duty.into(),
            },
        }
    }

    /// Creates a rule between a rotation template and a duty form.
    pub fn rotation_duty(
        id: impl Into<String>,
        rotation: impl Into<RotationId>,
        duty: impl Into<DutyId>,
        weight: RuleWeight,
        kind: RuleKind,
    ) -> Self {
        Self {
            id: id.into(),
            weight,
            kind,
            participants: RuleParticipants::RotationDuty {
                rotation: rotation.into(),
                duty: duty.into(),
            },
        }
    }

    /// The entity keys this rule touches.
    pub fn entity_refs(&self) -> [EntityRef; 2] {
        match &self.participants {
            RuleParticipants::DutyDuty { earlier, later } => [
                EntityRef::Duty(earlier.clone()),
                EntityRef::Duty(later.clone()),
            ],
            RuleParticipants::PersonPerson { a, b } => {
                [EntityRef::Person(a.clone()), EntityRef::Person(b.clone())]
            }
            RuleParticipants::PersonDuty { person, duty } => {
                [EntityRef::Person(person.clone()), EntityRef::Duty(duty.clone())]
            }
            RuleParticipants::RotationDuty { rotation, duty } => [
                EntityRef::Rotation(rotation.clone()),
                EntityRef::Duty(duty.clone()),
            ],
        }
    }

    /// Whether the rule touches the given entity.
    pub fn involves(&self, entity: &EntityRef) -> bool {
        self.entity_refs().contains(entity)
    }

    /// For a duty-duty rule, the partner of the given form.
    pub fn other_duty(&self, duty: &str) -> Option<&DutyId> {
        match &self.participants {
            RuleParticipants::DutyDuty { earlier, later } if earlier == duty => Some(later),
            RuleParticipants::DutyDuty { earlier, later } if later == duty => Some(earlier),
            _ => None,
        }
    }

    /// The date implied for the later form when the earlier form runs on
    /// `date`: the first matching weekday in `[date, date + 7]`, so a
    /// same-day pair resolves to `date` itself.
    pub fn linked_day_forward(&self, date: NaiveDate, catalog: &DutyCatalog) -> Option<NaiveDate> {
        let RuleParticipants::DutyDuty { later, .. } = &self.participants else {
            return None;
        };
        let weekday = catalog.form(later)?.weekday;
        (0..=7)
            .filter_map(|i| date.checked_add_days(Days::new(i)))
            .find(|d| d.weekday() == weekday)
    }

    /// The date implied for the earlier form when the later form runs on
    /// `date`: the first matching weekday in `[date - 7, date]`, scanning
    /// backward from `date`.
    pub fn linked_day_backward(&self, date: NaiveDate, catalog: &DutyCatalog) -> Option<NaiveDate> {
        let RuleParticipants::DutyDuty { earlier, .. } = &self.participants else {
            return None;
        };
        let weekday = catalog.form(earlier)?.weekday;
        (0..=7)
            .filter_map(|i| date.checked_sub_days(Days::new(i)))
            .find(|d| d.weekday() == weekday)
    }

    /// The partner date of a duty-duty rule, seen from the side that was
    /// just planned: forward when `from_duty` is the earlier form,
    /// backward when it is the later one.
    pub fn linked_day(
        &self,
        date: NaiveDate,
        from_duty: &str,
        catalog: &DutyCatalog,
    ) -> Option<NaiveDate> {
        match &self.participants {
            RuleParticipants::DutyDuty { earlier, .. } if earlier == from_duty => {
                self.linked_day_forward(date, catalog)
            }
            RuleParticipants::DutyDuty { later, .. } if later == from_duty => {
                self.linked_day_backward(date, catalog)
            }
            _ => None,
        }
    }
}

//! Indexed rule store.
//!
//! The network indexes every rule under each participating entity and
//! under the normalized participant pair, so the planner can ask "which
//! rules touch this duty" or "is this pair forbidden" without scanning.
//! It is an explicit value passed by reference to the scheduler and the
//! checker; rules do not self-register anywhere. Lookups never fail —
//! unknown entities simply yield nothing.

use std::collections::{BTreeSet, HashMap};

use crate::models::{EntityRef, Rule, RuleKind, RuleParticipants, RuleWeight};

/// Bidirectional index over a set of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleNetwork {
    rules: Vec<Rule>,
    by_entity: HashMap<EntityRef, BTreeSet<usize>>,
    by_pair: HashMap<(EntityRef, EntityRef), BTreeSet<usize>>,
}

impl RuleNetwork {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule and indexes it under its participants.
    pub fn add_rule(&mut self, rule: Rule) {
        let idx = self.rules.len();
        let [a, b] = rule.entity_refs();
        self.by_entity.entry(a.clone()).or_default().insert(idx);
        self.by_entity.entry(b.clone()).or_default().insert(idx);
        self.by_pair.entry(pair_key(a, b)).or_default().insert(idx);
        self.rules.push(rule);
    }

    /// Builder: adds a rule and returns self.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.add_rule(rule);
        self
    }

    /// All rules in insertion order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the network holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules touching an entity, in insertion order.
    pub fn rules_of(&self, entity: &EntityRef) -> Vec<&Rule> {
        self.by_entity
            .get(entity)
            .into_iter()
            .flatten()
            .map(|&i| &self.rules[i])
            .collect()
    }

    /// Rules between two entities (order-insensitive), in insertion order.
    pub fn rules_between(&self, a: &EntityRef, b: &EntityRef) -> Vec<&Rule> {
        self.by_pair
            .get(&pair_key(a.clone(), b.clone()))
            .into_iter()
            .flatten()
            .map(|&i| &self.rules[i])
            .collect()
    }

    /// Rules touching an entity, narrowed to a weight and kind.
    pub fn filtered(&self, entity: &EntityRef, weight: RuleWeight, kind: RuleKind) -> Vec<&Rule> {
        self.rules_of(entity)
            .into_iter()
            .filter(|r| r.weight == weight && r.kind == kind)
            .collect()
    }

    /// Whether a rule of the given weight and kind exists between the
    /// two entities.
    pub fn exists(&self, a: &EntityRef, b: &EntityRef, weight: RuleWeight, kind: RuleKind) -> bool {
        self.rules_between(a, b)
            .iter()
            .any(|r| r.weight == weight && r.kind == kind)
    }

    /// Whether a MUST-forbidden rule exists between the two entities.
    pub fn exists_must_forbidden(&self, a: &EntityRef, b: &EntityRef) -> bool {
        self.exists(a, b, RuleWeight::Must, RuleKind::Forbidden)
    }

    /// Duty-duty rules of a form, narrowed to a weight and kind.
    pub fn duty_duty_rules(&self, duty: &str, weight: RuleWeight, kind: RuleKind) -> Vec<&Rule> {
        self.filtered(&EntityRef::Duty(duty.to_string()), weight, kind)
            .into_iter()
            .filter(|r| matches!(r.participants, RuleParticipants::DutyDuty { .. }))
            .collect()
    }

    /// Planning difficulty of a duty: the number of rules touching it.
    /// More entangled duties are harder to staff and get queued earlier.
    pub fn fine_priority(&self, duty: &str) -> usize {
        self.by_entity
            .get(&EntityRef::Duty(duty.to_string()))
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// All duty-duty rules, in insertion order.
    pub fn all_duty_duty_rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules
            .iter()
            .filter(|r| matches!(r.participants, RuleParticipants::DutyDuty { .. }))
    }

    /// All person-person rules, in insertion order.
    pub fn all_person_person_rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules
            .iter()
            .filter(|r| matches!(r.participants, RuleParticipants::PersonPerson { .. }))
    }

    /// All person-duty rules, in insertion order.
    pub fn all_person_duty_rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules
            .iter()
            .filter(|r| matches!(r.participants, RuleParticipants::PersonDuty { .. }))
    }

    /// All rotation-duty rules, in insertion order.
    pub fn all_rotation_duty_rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules
            .iter()
            .filter(|r| matches!(r.participants, RuleParticipants::RotationDuty { .. }))
    }
}

fn pair_key(a: EntityRef, b: EntityRef) -> (EntityRef, EntityRef) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

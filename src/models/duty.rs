//! Duty forms, duty groups, and the duty catalog.
//!
//! A duty form is a concrete shift type bound to one weekday — "night
//! duty, Monday" — with its own staffing rules: whether the next day must
//! stay free, how many days in a row one person may hold it, the monthly
//! cap, and a weight that feeds the monthly workload accounting. Forms of
//! the same kind across weekdays share a duty group; the group decides
//! whether the kind runs on public holidays.
//!
//! On a holiday only the SUNDAY form of each holiday-eligible group is
//! scheduled. That unifies the pay-tier handling of Sundays and holidays;
//! a group whose holiday shift has no Sunday sibling cannot currently be
//! represented.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::{DutyId, GroupId, HolidayCalendar};

/// A concrete shift type tied to a weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyForm {
    /// Unique duty-form identifier.
    pub id: DutyId,
    /// Human-readable name.
    pub name: String,
    /// Weekday this form applies to.
    pub weekday: Weekday,
    /// Duty group this form belongs to, if any.
    pub group: Option<GroupId>,
    /// Whether the holder must stay duty-free on the next calendar day.
    pub follow_up_free: bool,
    /// Maximum consecutive days one person may hold this form (>= 1).
    pub max_in_a_row: u32,
    /// Maximum times one person may hold this form per calendar month.
    pub max_per_month: u32,
    /// Workload weight counted against the monthly duty budget.
    pub weight: f64,
    /// Duty forms staffed concurrently on the same day (e.g. a second
    /// night line). Used for person-level forbidden-pair checks.
    pub linked_forms: Vec<DutyId>,
}

/// Equivalence class of duty forms across weekdays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyGroup {
    /// Unique group identifier.
    pub id: GroupId,
    /// Whether this group's duties are staffed on public holidays.
    pub applies_on_holidays: bool,
}

impl DutyForm {
    /// Creates a duty form for the given weekday.
    ///
    /// Defaults: no group, no follow-up-free, at most one day in a row,
    /// unconstrained monthly count, weight 1.0.
    pub fn new(id: impl Into<DutyId>, weekday: Weekday) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            weekday,
            group: None,
            follow_up_free: false,
            max_in_a_row: 1,
            max_per_month: 31,
            weight: 1.0,
            linked_forms: Vec::new(),
        }
    }

    /// Sets the duty name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Assigns the form to a duty group.
    pub fn with_group(mut self, group: impl Into<GroupId>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Marks the form as follow-up-free.
    pub fn with_follow_up_free(mut self) -> Self {
        self.follow_up_free = true;
        self
    }

    /// Sets the maximum consecutive days.
    pub fn with_max_in_a_row(mut self, max: u32) -> Self {
        self.max_in_a_row = max;
        self
    }

    /// Sets the monthly cap.
    pub fn with_max_per_month(mut self, max: u32) -> Self {
        self.max_per_month = max;
        self
    }

    /// Sets the workload weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Adds a concurrently staffed duty form.
    pub fn with_linked_form(mut self, duty: impl Into<DutyId>) -> Self {
        self.linked_forms.push(duty.into());
        self
    }
}

impl DutyGroup {
    /// Creates a duty group.
    pub fn new(id: impl Into<GroupId>, applies_on_holidays: bool) -> Self {
        Self {
            id: id.into(),
            applies_on_holidays,
        }
    }
}

/// Insertion-ordered store of duty forms and groups.
///
/// Catalog order matters: it fixes the slot order within a day during
/// planning-map construction and thereby the queue's tie-breaking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DutyCatalog {
    forms: Vec<DutyForm>,
    groups: Vec<DutyGroup>,
    #[serde(skip)]
    form_index: HashMap<DutyId, usize>,
    #[serde(skip)]
    group_index: HashMap<GroupId, usize>,
}

impl DutyCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a duty form. A form with a duplicate id replaces nothing and
    /// is still appended; duplicates are rejected by input validation.
    pub fn add_form(&mut self, form: DutyForm) {
        self.form_index
            .entry(form.id.clone())
            .or_insert(self.forms.len());
        self.forms.push(form);
    }

    /// Adds a duty group.
    pub fn add_group(&mut self, group: DutyGroup) {
        self.group_index
            .entry(group.id.clone())
            .or_insert(self.groups.len());
        self.groups.push(group);
    }

    /// Builder: adds a form and returns self.
    pub fn with_form(mut self, form: DutyForm) -> Self {
        self.add_form(form);
        self
    }

    /// Builder: adds a group and returns self.
    pub fn with_group(mut self, group: DutyGroup) -> Self {
        self.add_group(group);
        self
    }

    /// Looks up a duty form by id.
    pub fn form(&self, id: &str) -> Option<&DutyForm> {
        self.form_index.get(id).map(|&i| &self.forms[i])
    }

    /// Looks up a duty group by id.
    pub fn group(&self, id: &str) -> Option<&DutyGroup> {
        self.group_index.get(id).map(|&i| &self.groups[i])
    }

    /// All duty forms in insertion order.
    pub fn forms(&self) -> &[DutyForm] {
        &self.forms
    }

    /// All duty groups in insertion order.
    pub fn groups(&self) -> &[DutyGroup] {
        &self.groups
    }

    /// Whether the form's group is staffed on holidays.
    pub fn group_applies_on_holidays(&self, form: &DutyForm) -> bool {
        form.group
            .as_deref()
            .and_then(|g| self.group(g))
            .map(|g| g.applies_on_holidays)
            .unwrap_or(false)
    }

    /// The duty forms staffed on a public holiday: the first SUNDAY form
    /// of each holiday-eligible group, in catalog order.
    pub fn holiday_duties(&self) -> Vec<&DutyForm> {
        let mut seen_groups: Vec<&str> = Vec::new();
        let mut duties = Vec::new();
        for form in &self.forms {
            let Some(group_id) = form.group.as_deref() else {
                continue;
            };
            if form.weekday != Weekday::Sun || seen_groups.contains(&group_id) {
                continue;
            }
            if self.group(group_id).map(|g| g.applies_on_holidays) == Some(true) {
                seen_groups.push(group_id);
                duties.push(form);
            }
        }
        duties
    }

    /// Whether a form is active on a date.
    ///
    /// On a holiday only the SUNDAY forms of holiday-eligible groups are
    /// active; otherwise activity is a plain weekday match.
    pub fn is_active_on(
        &self,
        form: &DutyForm,
        date: NaiveDate,
        calendar: &HolidayCalendar,
    ) -> bool {
        if calendar.is_holiday(date) {
            self.group_applies_on_holidays(form) && form.weekday == Weekday::Sun
        } else {
            form.weekday == date.weekday()
        }
    }

    /// Rebuilds the id indexes. Needed after deserialization, which
    /// skips the index fields.
    pub fn reindex(&mut self) {
        self.form_index = self
            .forms
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id.clone(), i))
            .collect();
        self.group_index = self
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.clone(), i))
            .collect();
    }
}

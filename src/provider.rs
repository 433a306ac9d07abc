//! Routed CRUD over the record store.
//!
//! [`WorkProvider`] is the single entry point for reading and writing both
//! collections. Every operation takes a [`Target`], dispatches by exhaustive
//! match, validates inputs before any mutation, and fans successful
//! mutations out through the injected [`ChangeHub`].

use std::sync::Arc;

use tracing::debug;

use crate::changes::ChangeHub;
use crate::contract::{
    Filter, Reminder, ReminderValues, RowSet, Sort, Target, Task, TaskStatus, TaskValues, Values,
};
use crate::error::{LadderError, Result};
use crate::store::WorkStore;

/// Record-access layer for reminders and tasks.
pub struct WorkProvider {
    store: WorkStore,
    changes: Arc<ChangeHub>,
}

impl WorkProvider {
    /// Wrap an opened store with a change hub.
    pub fn new(store: WorkStore, changes: Arc<ChangeHub>) -> Self {
        Self { store, changes }
    }

    /// The hub mutations are announced on.
    pub fn changes(&self) -> &Arc<ChangeHub> {
        &self.changes
    }

    /// Query rows under `target`.
    ///
    /// Collection-level targets return all rows, optionally filtered.
    /// Item-level targets force identifier equality and ignore any
    /// caller-supplied filter.
    pub fn query(
        &self,
        target: &Target,
        filter: Option<&Filter>,
        order: Option<Sort>,
    ) -> Result<RowSet> {
        match target {
            Target::Reminders => Ok(RowSet::Reminders(
                self.store.query_reminders(filter, order)?,
            )),
            Target::Reminder(id) => Ok(RowSet::Reminders(
                self.store.query_reminders(Some(&Filter::Id(*id)), order)?,
            )),
            Target::Tasks => Ok(RowSet::Tasks(self.store.query_tasks(filter, order)?)),
            Target::Task(id) => Ok(RowSet::Tasks(
                self.store.query_tasks(Some(&Filter::Id(*id)), order)?,
            )),
        }
    }

    /// Insert a new row at a collection-level target.
    ///
    /// The target must match the entity tagged in `values`. Returns the
    /// assigned identifier and announces the change on the collection.
    pub fn insert(&self, target: &Target, values: Values) -> Result<i64> {
        let id = match (target, values) {
            (Target::Reminders, Values::Reminder(values)) => {
                let (name, details, hour, minute) = validate_reminder_insert(&values)?;
                self.store
                    .insert_reminder(&name, details.as_deref(), hour, minute)?
            }
            (Target::Tasks, Values::Task(values)) => {
                let (title, details, status) = validate_task_insert(&values)?;
                self.store.insert_task(&title, details.as_deref(), status)?
            }
            (target, values) => {
                return Err(LadderError::InvalidTarget(format!(
                    "insert of {:?} values is not supported at `{target}`",
                    values.collection()
                )))
            }
        };

        self.changes.notify(target);
        Ok(id)
    }

    /// Update rows under `target` with the present fields of `values`.
    ///
    /// Item-level targets override the filter with identifier equality;
    /// collection-level targets require a caller-supplied filter. Only
    /// present fields are validated and applied; an empty field set returns
    /// 0 without touching the store. Returns the number of rows changed.
    pub fn update(
        &self,
        target: &Target,
        values: Values,
        filter: Option<&Filter>,
    ) -> Result<usize> {
        let changed = match (target, &values) {
            (Target::Reminders, Values::Reminder(values)) => {
                let filter = require_collection_filter(target, filter)?;
                validate_reminder_update(values)?;
                if values.is_empty() {
                    return Ok(0);
                }
                self.store.update_reminders(values, Some(filter))?
            }
            (Target::Reminder(id), Values::Reminder(values)) => {
                validate_reminder_update(values)?;
                if values.is_empty() {
                    return Ok(0);
                }
                self.store.update_reminders(values, Some(&Filter::Id(*id)))?
            }
            (Target::Tasks, Values::Task(values)) => {
                let filter = require_collection_filter(target, filter)?;
                validate_task_update(values)?;
                if values.is_empty() {
                    return Ok(0);
                }
                self.store.update_tasks(values, Some(filter))?
            }
            (Target::Task(id), Values::Task(values)) => {
                validate_task_update(values)?;
                if values.is_empty() {
                    return Ok(0);
                }
                self.store.update_tasks(values, Some(&Filter::Id(*id)))?
            }
            (target, values) => {
                return Err(LadderError::InvalidTarget(format!(
                    "update with {:?} values is not supported at `{target}`",
                    values.collection()
                )))
            }
        };

        if changed > 0 {
            self.changes.notify(target);
        }
        Ok(changed)
    }

    /// Delete rows under `target`.
    ///
    /// Item-level targets force identifier equality. Collection-level
    /// targets use the caller filter; an absent filter deletes every row in
    /// the collection (deliberately permissive — confirmation is the
    /// caller's job). Returns the number of rows deleted.
    pub fn delete(&self, target: &Target, filter: Option<&Filter>) -> Result<usize> {
        let deleted = match target {
            Target::Reminders => self.store.delete_reminders(filter)?,
            Target::Reminder(id) => self.store.delete_reminders(Some(&Filter::Id(*id)))?,
            Target::Tasks => self.store.delete_tasks(filter)?,
            Target::Task(id) => self.store.delete_tasks(Some(&Filter::Id(*id)))?,
        };

        if deleted > 0 {
            self.changes.notify(target);
        } else {
            debug!("delete at `{target}` matched no rows");
        }
        Ok(deleted)
    }

    /// The fixed type tag for `target`. Malformed addresses never reach
    /// here — they fail in [`Target::parse`].
    pub fn resolve_type(&self, target: &Target) -> &'static str {
        target.type_tag()
    }

    // -----------------------------------------------------------------------
    // Typed convenience reads
    // -----------------------------------------------------------------------

    /// Look up a single reminder by identifier.
    pub fn reminder(&self, id: i64) -> Result<Option<Reminder>> {
        let mut rows = self.store.query_reminders(Some(&Filter::Id(id)), None)?;
        Ok(rows.pop())
    }

    /// All reminders, in identifier order.
    pub fn reminders(&self) -> Result<Vec<Reminder>> {
        self.store.query_reminders(None, Some(Sort::ById))
    }

    /// Look up a single task by identifier.
    pub fn task(&self, id: i64) -> Result<Option<Task>> {
        let mut rows = self.store.query_tasks(Some(&Filter::Id(id)), None)?;
        Ok(rows.pop())
    }

    /// All tasks, in identifier order.
    pub fn tasks(&self) -> Result<Vec<Task>> {
        self.store.query_tasks(None, Some(Sort::ById))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn require_collection_filter<'a>(
    target: &Target,
    filter: Option<&'a Filter>,
) -> Result<&'a Filter> {
    filter.ok_or_else(|| {
        LadderError::InvalidTarget(format!("collection update at `{target}` requires a filter"))
    })
}

fn validate_name(name: &str, field: &'static str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LadderError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn validate_hour(hour: u32) -> Result<()> {
    if hour > 23 {
        return Err(LadderError::validation(
            "hour",
            format!("{hour} is out of range 0-23"),
        ));
    }
    Ok(())
}

fn validate_minute(minute: u32) -> Result<()> {
    if minute > 59 {
        return Err(LadderError::validation(
            "minute",
            format!("{minute} is out of range 0-59"),
        ));
    }
    Ok(())
}

fn validate_status(raw: i64) -> Result<TaskStatus> {
    TaskStatus::from_i64(raw)
        .ok_or_else(|| LadderError::validation("status", format!("{raw} is not a valid status")))
}

/// Insert requires name and time; details stays optional.
fn validate_reminder_insert(
    values: &ReminderValues,
) -> Result<(String, Option<String>, u32, u32)> {
    let name = values
        .name
        .clone()
        .ok_or_else(|| LadderError::validation("name", "reminder requires a name"))?;
    validate_name(&name, "name")?;

    let hour = values
        .hour
        .ok_or_else(|| LadderError::validation("hour", "reminder requires a time"))?;
    validate_hour(hour)?;

    let minute = values
        .minute
        .ok_or_else(|| LadderError::validation("minute", "reminder requires a time"))?;
    validate_minute(minute)?;

    Ok((name, values.details.clone().flatten(), hour, minute))
}

/// Update checks only the fields that are present.
fn validate_reminder_update(values: &ReminderValues) -> Result<()> {
    if let Some(name) = &values.name {
        validate_name(name, "name")?;
    }
    if let Some(hour) = values.hour {
        validate_hour(hour)?;
    }
    if let Some(minute) = values.minute {
        validate_minute(minute)?;
    }
    Ok(())
}

/// Insert requires a title; a missing status defaults to not-started.
fn validate_task_insert(values: &TaskValues) -> Result<(String, Option<String>, TaskStatus)> {
    let title = values
        .title
        .clone()
        .ok_or_else(|| LadderError::validation("title", "task requires a title"))?;
    validate_name(&title, "title")?;

    let status = match values.status {
        Some(raw) => validate_status(raw)?,
        None => TaskStatus::default(),
    };

    Ok((title, values.details.clone().flatten(), status))
}

/// Update checks only the fields that are present.
fn validate_task_update(values: &TaskValues) -> Result<()> {
    if let Some(title) = &values.title {
        validate_name(title, "title")?;
    }
    if let Some(raw) = values.status {
        validate_status(raw)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

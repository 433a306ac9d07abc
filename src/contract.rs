//! Shared contract for the record-access layer.
//!
//! Defines the addressing scheme ([`Target`]), the typed rows the store
//! produces ([`Reminder`], [`Task`]), the partial field sets callers submit
//! ([`ReminderValues`], [`TaskValues`]), and the closed filter/sort variants
//! that make up the entire query surface.

use serde::{Deserialize, Serialize};

use crate::error::{LadderError, Result};

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Path segment addressing the reminders collection.
pub const PATH_REMINDERS: &str = "reminders";

/// Path segment addressing the tasks collection.
pub const PATH_TASKS: &str = "tasks";

/// Type tag for a reminders collection query result.
pub const TYPE_REMINDER_LIST: &str = "list/reminders";
/// Type tag for a single-reminder query result.
pub const TYPE_REMINDER_ITEM: &str = "item/reminders";
/// Type tag for a tasks collection query result.
pub const TYPE_TASK_LIST: &str = "list/tasks";
/// Type tag for a single-task query result.
pub const TYPE_TASK_ITEM: &str = "item/tasks";

/// The two record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Reminders,
    Tasks,
}

/// A resolved address: one of the two collections, or a single item in one.
///
/// Parsed once at the boundary from the textual forms `reminders`,
/// `reminders/{id}`, `tasks`, `tasks/{id}`; everything past the parse is an
/// exhaustive match with no string routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// The reminders collection.
    Reminders,
    /// A single reminder by identifier.
    Reminder(i64),
    /// The tasks collection.
    Tasks,
    /// A single task by identifier.
    Task(i64),
}

impl Target {
    /// Parse a textual address.
    ///
    /// Returns [`LadderError::InvalidTarget`] for anything other than the
    /// four recognized forms.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = raw.trim_matches('/').splitn(2, '/');
        let collection = segments.next().unwrap_or_default();
        let item = segments.next();

        let target = match (collection, item) {
            (PATH_REMINDERS, None) => Self::Reminders,
            (PATH_TASKS, None) => Self::Tasks,
            (PATH_REMINDERS, Some(id)) => Self::Reminder(parse_id(raw, id)?),
            (PATH_TASKS, Some(id)) => Self::Task(parse_id(raw, id)?),
            _ => return Err(LadderError::InvalidTarget(raw.to_owned())),
        };
        Ok(target)
    }

    /// The collection this target addresses.
    pub fn collection(&self) -> Collection {
        match self {
            Self::Reminders | Self::Reminder(_) => Collection::Reminders,
            Self::Tasks | Self::Task(_) => Collection::Tasks,
        }
    }

    /// Returns the item identifier for item-level targets.
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Reminder(id) | Self::Task(id) => Some(*id),
            Self::Reminders | Self::Tasks => None,
        }
    }

    /// Returns `true` for the two collection-level targets.
    pub fn is_collection(&self) -> bool {
        self.id().is_none()
    }

    /// The fixed type tag for this target.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Reminders => TYPE_REMINDER_LIST,
            Self::Reminder(_) => TYPE_REMINDER_ITEM,
            Self::Tasks => TYPE_TASK_LIST,
            Self::Task(_) => TYPE_TASK_ITEM,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reminders => write!(f, "{PATH_REMINDERS}"),
            Self::Reminder(id) => write!(f, "{PATH_REMINDERS}/{id}"),
            Self::Tasks => write!(f, "{PATH_TASKS}"),
            Self::Task(id) => write!(f, "{PATH_TASKS}/{id}"),
        }
    }
}

fn parse_id(raw: &str, segment: &str) -> Result<i64> {
    segment
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| LadderError::InvalidTarget(raw.to_owned()))
}

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

/// Progress status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Decode the stored integer form. Returns `None` for out-of-range values.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::NotStarted),
            1 => Some(Self::InProgress),
            2 => Some(Self::Completed),
            _ => None,
        }
    }

    /// The stored integer form.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Typed rows
// ---------------------------------------------------------------------------

/// A stored reminder row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub details: Option<String>,
    /// Hour of day, 0–23.
    pub hour: u32,
    /// Minute of hour, 0–59.
    pub minute: u32,
}

/// A stored task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
}

// ---------------------------------------------------------------------------
// Partial field sets
// ---------------------------------------------------------------------------

/// Fields submitted on reminder insert or update.
///
/// Every field is optionally present; only present fields are validated and
/// applied. `details` distinguishes "absent" from "explicitly set to NULL"
/// via the nested `Option`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderValues {
    pub name: Option<String>,
    pub details: Option<Option<String>>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

impl ReminderValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set `details`; `None` writes SQL NULL.
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn with_minute(mut self, minute: u32) -> Self {
        self.minute = Some(minute);
        self
    }

    pub fn with_time(self, hour: u32, minute: u32) -> Self {
        self.with_hour(hour).with_minute(minute)
    }

    /// Returns `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.details.is_none()
            && self.hour.is_none()
            && self.minute.is_none()
    }
}

/// Fields submitted on task insert or update.
///
/// `status` is carried as the raw stored integer so that an out-of-range
/// value reaches validation (and fails there) instead of being unexpressible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskValues {
    pub title: Option<String>,
    pub details: Option<Option<String>>,
    pub status: Option<i64>,
}

impl TaskValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set `details`; `None` writes SQL NULL.
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status.as_i64());
        self
    }

    /// Set the raw status integer, bypassing the enum. Validation rejects
    /// out-of-range values at the access layer.
    pub fn with_raw_status(mut self, status: i64) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.details.is_none() && self.status.is_none()
    }
}

/// A field set tagged with the entity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Values {
    Reminder(ReminderValues),
    Task(TaskValues),
}

impl Values {
    /// The collection this field set belongs to.
    pub fn collection(&self) -> Collection {
        match self {
            Self::Reminder(_) => Collection::Reminders,
            Self::Task(_) => Collection::Tasks,
        }
    }
}

impl From<ReminderValues> for Values {
    fn from(values: ReminderValues) -> Self {
        Self::Reminder(values)
    }
}

impl From<TaskValues> for Values {
    fn from(values: TaskValues) -> Self {
        Self::Task(values)
    }
}

// ---------------------------------------------------------------------------
// Filters, sort keys, result sets
// ---------------------------------------------------------------------------

/// The fixed, parameterized lookups the query surface supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Identifier equality (either collection).
    Id(i64),
    /// Status equality (tasks only).
    Status(TaskStatus),
}

/// The fixed orderings the query surface supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    /// By identifier (either collection).
    ById,
    /// By name (reminders) or title (tasks).
    ByName,
    /// By hour then minute (reminders only).
    ByTime,
    /// By status (tasks only).
    ByStatus,
}

/// Typed rows returned from [`query`](crate::provider::WorkProvider::query),
/// tagged by collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSet {
    Reminders(Vec<Reminder>),
    Tasks(Vec<Task>),
}

impl RowSet {
    /// Number of rows in the set.
    pub fn len(&self) -> usize {
        match self {
            Self::Reminders(rows) => rows.len(),
            Self::Tasks(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The reminder rows, if this set came from the reminders collection.
    pub fn into_reminders(self) -> Option<Vec<Reminder>> {
        match self {
            Self::Reminders(rows) => Some(rows),
            Self::Tasks(_) => None,
        }
    }

    /// The task rows, if this set came from the tasks collection.
    pub fn into_tasks(self) -> Option<Vec<Task>> {
        match self {
            Self::Reminders(_) => None,
            Self::Tasks(rows) => Some(rows),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_all_four_forms() {
        assert_eq!(Target::parse("reminders").unwrap(), Target::Reminders);
        assert_eq!(Target::parse("reminders/7").unwrap(), Target::Reminder(7));
        assert_eq!(Target::parse("tasks").unwrap(), Target::Tasks);
        assert_eq!(Target::parse("tasks/42").unwrap(), Target::Task(42));
    }

    #[test]
    fn parse_tolerates_surrounding_slashes() {
        assert_eq!(Target::parse("/reminders/7/").unwrap(), Target::Reminder(7));
    }

    #[test]
    fn parse_rejects_unknown_collections_and_bad_ids() {
        for raw in ["", "notes", "reminders/abc", "tasks/-3", "tasks/1/extra"] {
            assert!(
                matches!(Target::parse(raw), Err(LadderError::InvalidTarget(_))),
                "expected InvalidTarget for {raw:?}"
            );
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        for target in [
            Target::Reminders,
            Target::Reminder(3),
            Target::Tasks,
            Target::Task(12),
        ] {
            assert_eq!(Target::parse(&target.to_string()).unwrap(), target);
        }
    }

    #[test]
    fn type_tags_match_the_contract() {
        assert_eq!(Target::Reminders.type_tag(), "list/reminders");
        assert_eq!(Target::Reminder(1).type_tag(), "item/reminders");
        assert_eq!(Target::Tasks.type_tag(), "list/tasks");
        assert_eq!(Target::Task(1).type_tag(), "item/tasks");
    }

    #[test]
    fn status_integer_round_trip() {
        for status in [
            TaskStatus::NotStarted,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ] {
            assert_eq!(TaskStatus::from_i64(status.as_i64()), Some(status));
        }
        assert_eq!(TaskStatus::from_i64(3), None);
        assert_eq!(TaskStatus::from_i64(-1), None);
        assert_eq!(TaskStatus::from_i64(99), None);
    }

    #[test]
    fn default_status_is_not_started() {
        assert_eq!(TaskStatus::default(), TaskStatus::NotStarted);
    }

    #[test]
    fn values_builders_track_presence() {
        let values = ReminderValues::new().with_name("Sleep").with_time(23, 30);
        assert_eq!(values.name.as_deref(), Some("Sleep"));
        assert_eq!(values.hour, Some(23));
        assert_eq!(values.minute, Some(30));
        assert!(values.details.is_none(), "details was never supplied");
        assert!(!values.is_empty());
        assert!(ReminderValues::new().is_empty());
    }

    #[test]
    fn details_distinguishes_absent_from_null() {
        let absent = TaskValues::new().with_title("t");
        assert_eq!(absent.details, None);

        let cleared = TaskValues::new().with_details(None);
        assert_eq!(cleared.details, Some(None));
        assert!(!cleared.is_empty());
    }

    #[test]
    fn values_tag_their_collection() {
        let reminder: Values = ReminderValues::new().into();
        let task: Values = TaskValues::new().into();
        assert_eq!(reminder.collection(), Collection::Reminders);
        assert_eq!(task.collection(), Collection::Tasks);
    }
}

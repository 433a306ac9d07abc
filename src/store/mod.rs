//! Durable, schema-versioned SQLite storage for the two record collections.
//!
//! Sub-modules:
//! - `schema`: DDL, version stamp, destructive migration.
//!
//! The store owns a single connection behind a mutex; all writes are
//! serialized, and WAL mode lets readers proceed concurrently on the SQLite
//! side. Rows come back as the typed structs from [`crate::contract`] — there
//! are no column-index lookups anywhere above this layer.

pub(crate) mod schema;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use crate::contract::{Filter, Reminder, ReminderValues, Sort, Task, TaskStatus, TaskValues};
use crate::error::{LadderError, Result};

/// SQLite-backed table store for reminders and tasks.
pub struct WorkStore {
    conn: Mutex<Connection>,
}

impl WorkStore {
    /// Open (or create) the database at `path`.
    ///
    /// Creates parent directories as needed, applies the schema on first
    /// use, and runs the destructive migration when the stored schema
    /// version does not match [`schema::SCHEMA_VERSION`].
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        schema::apply_schema(&conn)?;
        if schema::migrate_if_needed(&conn)? {
            tracing::warn!("schema version changed, dropped and recreated both tables");
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database. Used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// The stored schema version.
    pub fn schema_version(&self) -> Result<Option<u32>> {
        let conn = self.lock()?;
        Ok(schema::read_schema_version(&conn)?)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LadderError::Lock(e.to_string()))
    }

    // -----------------------------------------------------------------------
    // Reminders
    // -----------------------------------------------------------------------

    pub(crate) fn query_reminders(
        &self,
        filter: Option<&Filter>,
        order: Option<Sort>,
    ) -> Result<Vec<Reminder>> {
        let (where_sql, where_params) = reminder_where(filter)?;
        let order_sql = reminder_order(order)?;
        let sql =
            format!("SELECT id, name, details, hour, minute FROM reminders{where_sql}{order_sql}");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(where_params), row_to_reminder)?;

        let mut reminders = Vec::new();
        for row in rows {
            reminders.push(row?);
        }
        Ok(reminders)
    }

    pub(crate) fn insert_reminder(
        &self,
        name: &str,
        details: Option<&str>,
        hour: u32,
        minute: u32,
    ) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reminders (name, details, hour, minute) VALUES (?1, ?2, ?3, ?4)",
            params![name, details, hour, minute],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Apply the present fields of `values` to every reminder matched by
    /// `filter`. Returns the number of rows changed.
    pub(crate) fn update_reminders(
        &self,
        values: &ReminderValues,
        filter: Option<&Filter>,
    ) -> Result<usize> {
        let mut sets: Vec<&str> = Vec::new();
        let mut sql_params: Vec<Value> = Vec::new();

        if let Some(name) = &values.name {
            sets.push("name = ?");
            sql_params.push(Value::from(name.clone()));
        }
        if let Some(details) = &values.details {
            sets.push("details = ?");
            sql_params.push(option_text(details));
        }
        if let Some(hour) = values.hour {
            sets.push("hour = ?");
            sql_params.push(Value::from(i64::from(hour)));
        }
        if let Some(minute) = values.minute {
            sets.push("minute = ?");
            sql_params.push(Value::from(i64::from(minute)));
        }
        if sets.is_empty() {
            return Ok(0);
        }

        let (where_sql, where_params) = reminder_where(filter)?;
        sql_params.extend(where_params);
        let sql = format!("UPDATE reminders SET {}{where_sql}", sets.join(", "));

        let conn = self.lock()?;
        Ok(conn.execute(&sql, params_from_iter(sql_params))?)
    }

    pub(crate) fn delete_reminders(&self, filter: Option<&Filter>) -> Result<usize> {
        let (where_sql, where_params) = reminder_where(filter)?;
        let sql = format!("DELETE FROM reminders{where_sql}");
        let conn = self.lock()?;
        Ok(conn.execute(&sql, params_from_iter(where_params))?)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub(crate) fn query_tasks(
        &self,
        filter: Option<&Filter>,
        order: Option<Sort>,
    ) -> Result<Vec<Task>> {
        let (where_sql, where_params) = task_where(filter)?;
        let order_sql = task_order(order)?;
        let sql = format!("SELECT id, title, details, status FROM tasks{where_sql}{order_sql}");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(where_params), row_to_task)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    pub(crate) fn insert_task(
        &self,
        title: &str,
        details: Option<&str>,
        status: TaskStatus,
    ) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tasks (title, details, status) VALUES (?1, ?2, ?3)",
            params![title, details, status.as_i64()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Apply the present fields of `values` to every task matched by
    /// `filter`. The status must already be range-checked by the caller.
    pub(crate) fn update_tasks(
        &self,
        values: &TaskValues,
        filter: Option<&Filter>,
    ) -> Result<usize> {
        let mut sets: Vec<&str> = Vec::new();
        let mut sql_params: Vec<Value> = Vec::new();

        if let Some(title) = &values.title {
            sets.push("title = ?");
            sql_params.push(Value::from(title.clone()));
        }
        if let Some(details) = &values.details {
            sets.push("details = ?");
            sql_params.push(option_text(details));
        }
        if let Some(status) = values.status {
            sets.push("status = ?");
            sql_params.push(Value::from(status));
        }
        if sets.is_empty() {
            return Ok(0);
        }

        let (where_sql, where_params) = task_where(filter)?;
        sql_params.extend(where_params);
        let sql = format!("UPDATE tasks SET {}{where_sql}", sets.join(", "));

        let conn = self.lock()?;
        Ok(conn.execute(&sql, params_from_iter(sql_params))?)
    }

    pub(crate) fn delete_tasks(&self, filter: Option<&Filter>) -> Result<usize> {
        let (where_sql, where_params) = task_where(filter)?;
        let sql = format!("DELETE FROM tasks{where_sql}");
        let conn = self.lock()?;
        Ok(conn.execute(&sql, params_from_iter(where_params))?)
    }
}

// ---------------------------------------------------------------------------
// Clause builders
// ---------------------------------------------------------------------------

fn option_text(value: &Option<String>) -> Value {
    match value {
        Some(text) => Value::from(text.clone()),
        None => Value::Null,
    }
}

fn reminder_where(filter: Option<&Filter>) -> Result<(&'static str, Vec<Value>)> {
    match filter {
        None => Ok(("", Vec::new())),
        Some(Filter::Id(id)) => Ok((" WHERE id = ?", vec![Value::from(*id)])),
        Some(Filter::Status(_)) => Err(LadderError::validation(
            "filter",
            "status filter applies to tasks only",
        )),
    }
}

fn task_where(filter: Option<&Filter>) -> Result<(&'static str, Vec<Value>)> {
    match filter {
        None => Ok(("", Vec::new())),
        Some(Filter::Id(id)) => Ok((" WHERE id = ?", vec![Value::from(*id)])),
        Some(Filter::Status(status)) => {
            Ok((" WHERE status = ?", vec![Value::from(status.as_i64())]))
        }
    }
}

fn reminder_order(order: Option<Sort>) -> Result<&'static str> {
    match order {
        None => Ok(""),
        Some(Sort::ById) => Ok(" ORDER BY id"),
        Some(Sort::ByName) => Ok(" ORDER BY name"),
        Some(Sort::ByTime) => Ok(" ORDER BY hour, minute"),
        Some(Sort::ByStatus) => Err(LadderError::validation(
            "order",
            "status ordering applies to tasks only",
        )),
    }
}

fn task_order(order: Option<Sort>) -> Result<&'static str> {
    match order {
        None => Ok(""),
        Some(Sort::ById) => Ok(" ORDER BY id"),
        Some(Sort::ByName) => Ok(" ORDER BY title"),
        Some(Sort::ByStatus) => Ok(" ORDER BY status"),
        Some(Sort::ByTime) => Err(LadderError::validation(
            "order",
            "time ordering applies to reminders only",
        )),
    }
}

// ---------------------------------------------------------------------------
// Row conversion
// ---------------------------------------------------------------------------

fn row_to_reminder(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reminder> {
    Ok(Reminder {
        id: row.get(0)?,
        name: row.get(1)?,
        details: row.get(2)?,
        hour: row.get(3)?,
        minute: row.get(4)?,
    })
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let status: i64 = row.get(3)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        details: row.get(2)?,
        // Only validated values are ever written; fall back to the default
        // rather than failing the whole row set.
        status: TaskStatus::from_i64(status).unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

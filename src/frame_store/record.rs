//! Generic record access shared by every persisted entity.
//!
//! Each entity describes its table once through [`Record`]; the free functions here
//! implement get/list/create/update/delete on top of that description. All of them
//! take a plain `&Connection`, so they run equally well on a connection or inside a
//! transaction opened by [`super::SqliteFrameStore::transaction`].

use super::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode, OptionalExtension, Row};

pub trait Record: Sized {
    const TABLE: &'static str;
    /// Human readable entity name, used in `NotFound` errors.
    const KIND: &'static str;
    /// Columns in insertion order. The first one is the primary key.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
    /// Values matching `COLUMNS`, in the same order.
    fn values(&self) -> Vec<Value>;

    /// Cleanup of dependent rows, run right after the record itself is deleted.
    fn after_delete(_conn: &Connection, _id: &str) -> StoreResult<()> {
        Ok(())
    }
}

pub fn text(s: impl Into<String>) -> Value {
    Value::Text(s.into())
}

pub fn opt_text(s: Option<impl Into<String>>) -> Value {
    s.map(|v| Value::Text(v.into())).unwrap_or(Value::Null)
}

pub fn timestamp(dt: &DateTime<Utc>) -> Value {
    Value::Text(dt.to_rfc3339())
}

pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Equality filter for [`list`] and [`count`].
#[derive(Default, Debug, Clone)]
pub struct Filter {
    clauses: Vec<String>,
    values: Vec<Value>,
    order_by: Option<&'static str>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: Value) -> Self {
        self.values.push(value);
        self.clauses
            .push(format!("{} = ?{}", column, self.values.len()));
        self
    }

    pub fn is_null(mut self, column: &'static str) -> Self {
        self.clauses.push(format!("{} IS NULL", column));
        self
    }

    pub fn is_not_null(mut self, column: &'static str) -> Self {
        self.clauses.push(format!("{} IS NOT NULL", column));
        self
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn select_sql<R: Record>() -> String {
    format!("SELECT {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

pub fn find<R: Record>(conn: &Connection, id: &str) -> StoreResult<Option<R>> {
    let sql = format!("{} WHERE {} = ?1", select_sql::<R>(), R::COLUMNS[0]);
    Ok(conn.query_row(&sql, [id], R::from_row).optional()?)
}

pub fn get<R: Record>(conn: &Connection, id: &str) -> StoreResult<R> {
    find(conn, id)?.ok_or_else(|| StoreError::not_found(R::KIND, id))
}

pub fn list<R: Record>(conn: &Connection, filter: &Filter) -> StoreResult<Vec<R>> {
    let order = filter.order_by.unwrap_or(R::COLUMNS[0]);
    let sql = format!(
        "{}{} ORDER BY {}",
        select_sql::<R>(),
        filter.where_sql(),
        order
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(params_from_iter(filter.values.iter()), R::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

pub fn count<R: Record>(conn: &Connection, filter: &Filter) -> StoreResult<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}{}", R::TABLE, filter.where_sql());
    let n: i64 = conn.query_row(&sql, params_from_iter(filter.values.iter()), |row| {
        row.get(0)
    })?;
    Ok(n as usize)
}

/// Inserts a new row. A primary key collision surfaces as `IntegrityConflict`.
pub fn insert<R: Record>(conn: &Connection, record: &R) -> StoreResult<()> {
    let placeholders = (1..=R::COLUMNS.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        R::TABLE,
        R::COLUMNS.join(", "),
        placeholders
    );
    match conn.execute(&sql, params_from_iter(record.values())) {
        Ok(_) => Ok(()),
        Err(e) if is_constraint_violation(&e) => Err(StoreError::IntegrityConflict(format!(
            "{} {}",
            R::KIND,
            record.id()
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Updates the given columns of one record. `updated` is refreshed unless it is
/// part of `changes`.
pub fn update_fields<R: Record>(
    conn: &Connection,
    id: &str,
    changes: &[(&str, Value)],
) -> StoreResult<()> {
    if changes.is_empty() {
        return get::<R>(conn, id).map(|_| ());
    }
    debug_assert!(changes
        .iter()
        .all(|(c, _)| R::COLUMNS.iter().any(|k| k == c)));

    let mut assignments: Vec<String> = Vec::with_capacity(changes.len() + 1);
    let mut values: Vec<Value> = Vec::with_capacity(changes.len() + 2);
    for (column, value) in changes {
        values.push(value.clone());
        assignments.push(format!("{} = ?{}", column, values.len()));
    }
    if R::COLUMNS.contains(&"updated") && !changes.iter().any(|(c, _)| *c == "updated") {
        values.push(timestamp(&Utc::now()));
        assignments.push(format!("updated = ?{}", values.len()));
    }
    values.push(text(id));
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        R::TABLE,
        assignments.join(", "),
        R::COLUMNS[0],
        values.len()
    );
    let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
    if changed == 0 {
        return Err(StoreError::not_found(R::KIND, id));
    }
    Ok(())
}

/// Writes every non-key column of `record`, stamping a fresh `updated`.
pub fn update<R: Record>(conn: &Connection, record: &R) -> StoreResult<()> {
    let changes: Vec<(&str, Value)> = R::COLUMNS
        .iter()
        .copied()
        .zip(record.values())
        .skip(1)
        .filter(|(column, _)| *column != "updated")
        .collect();
    update_fields::<R>(conn, record.id(), &changes)
}

/// Creates the record, falling back to an update when the key already exists.
pub fn save<R: Record>(conn: &Connection, record: &R) -> StoreResult<()> {
    match insert(conn, record) {
        Err(StoreError::IntegrityConflict(what)) => {
            tracing::debug!("{} exists, updating instead", what);
            update(conn, record)
        }
        other => other,
    }
}

pub fn delete<R: Record>(conn: &Connection, id: &str) -> StoreResult<()> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1", R::TABLE, R::COLUMNS[0]);
    if conn.execute(&sql, [id])? == 0 {
        return Err(StoreError::not_found(R::KIND, id));
    }
    R::after_delete(conn, id)
}

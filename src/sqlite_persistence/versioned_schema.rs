use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use tracing::info;

/// Offset added to every schema version before it is written to `PRAGMA user_version`,
/// so a database that was never managed by us (user_version 0) is never mistaken for v1.
pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                default_value: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }

    fn parse(s: &str) -> Option<SqlType> {
        match s {
            "TEXT" => Some(SqlType::Text),
            "INTEGER" => Some(SqlType::Integer),
            "REAL" => Some(SqlType::Real),
            _ => None,
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<&'static str>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Composite primary key. Leave empty when a single column carries `is_primary_key`.
    pub primary_key: &'static [&'static str],
    pub indices: &'static [(&'static str, &'static str)],
}

impl Table {
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let mut def = format!("{} {}", column.name, column.sql_type.as_sql());
                if column.is_primary_key {
                    def.push_str(" PRIMARY KEY");
                }
                if column.non_null {
                    def.push_str(" NOT NULL");
                }
                if let Some(default_value) = column.default_value {
                    def.push_str(&format!(" DEFAULT {}", default_value));
                }
                def
            })
            .collect();
        if !self.primary_key.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        }
        format!("CREATE TABLE {} ({});", self.name, parts.join(", "))
    }

    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute(&self.create_sql(), params![])?;
        for (index_name, columns) in self.indices {
            conn.execute(
                &format!("CREATE INDEX {} ON {}({});", index_name, self.name, columns),
                params![],
            )?;
        }
        Ok(())
    }

    fn expects_primary_key(&self, column: &Column) -> bool {
        column.is_primary_key || self.primary_key.contains(&column.name)
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        struct ActualColumn {
            name: String,
            sql_type: Option<SqlType>,
            non_null: bool,
            default_value: Option<String>,
            is_primary_key: bool,
        }

        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual_columns = stmt
            .query_map(params![], |row| {
                Ok(ActualColumn {
                    name: row.get(1)?,
                    sql_type: SqlType::parse(&row.get::<_, String>(2)?),
                    non_null: row.get::<_, i32>(3)? == 1,
                    default_value: row.get(4)?,
                    is_primary_key: row.get::<_, i32>(5)? > 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if actual_columns.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found: [{}], expected: [{}]",
                self.name,
                actual_columns.len(),
                self.columns.len(),
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            if actual.name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    actual.name
                );
            }
            if actual.sql_type.as_ref() != Some(expected.sql_type) {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {:?}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    actual.sql_type
                );
            }
            if actual.non_null != expected.non_null {
                bail!(
                    "Table {} column {} non-null mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.non_null,
                    actual.non_null
                );
            }
            // SQLite may report defaults wrapped in parentheses
            if actual.default_value.as_deref().map(strip_parentheses)
                != expected.default_value.map(strip_parentheses)
            {
                bail!(
                    "Table {} column {} default value mismatch: expected {:?}, got {:?}",
                    self.name,
                    expected.name,
                    expected.default_value,
                    actual.default_value
                );
            }
            if actual.is_primary_key != self.expects_primary_key(expected) {
                bail!(
                    "Table {} column {} primary key mismatch",
                    self.name,
                    expected.name
                );
            }
        }

        for (index_name, _) in self.indices {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, self.name],
                    |_| Ok(()),
                )
                .is_ok();
            if !exists {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }
        Ok(())
    }
}

fn strip_parentheses(s: &str) -> &str {
    s.strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(s)
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}

/// Brings `conn` to the latest of `schemas`.
///
/// A fresh database gets the latest schema created directly. An existing one is
/// validated against the schema matching its stored version and then migrated
/// forward inside a single transaction.
pub fn prepare_database(
    conn: &mut Connection,
    schemas: &[VersionedSchema],
    is_new_db: bool,
    label: &str,
) -> Result<()> {
    let latest = schemas
        .last()
        .with_context(|| format!("No schemas defined for {} database", label))?;

    if is_new_db {
        info!("Creating {} database with schema version {}", label, latest.version);
        let tx = conn.transaction()?;
        latest.create(&tx)?;
        tx.commit()?;
        return Ok(());
    }

    let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let db_version = raw_version - BASE_DB_VERSION as i64;
    if db_version < 1 {
        bail!(
            "{} database version {} is invalid (expected >= 1)",
            label,
            db_version
        );
    }

    let stored = schemas
        .iter()
        .find(|s| s.version as i64 == db_version)
        .with_context(|| format!("Unknown {} database version {}", label, db_version))?;
    stored.validate(conn).with_context(|| {
        format!(
            "{} database schema validation failed for version {}",
            label, db_version
        )
    })?;

    if stored.version < latest.version {
        let tx = conn.transaction()?;
        let mut current = stored.version;
        for schema in schemas.iter().filter(|s| s.version > stored.version) {
            info!(
                "Migrating {} database from version {} to {}",
                label, current, schema.version
            );
            if let Some(migration) = schema.migration {
                migration(&tx).with_context(|| {
                    format!("Failed to run migration to version {}", schema.version)
                })?;
            }
            current = schema.version;
        }
        tx.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + current),
            [],
        )?;
        tx.commit()?;
    }
    Ok(())
}

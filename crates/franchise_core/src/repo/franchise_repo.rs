//! Franchise aggregate store contract and SQLite document implementation.
//!
//! # Responsibility
//! - Upsert and load whole `Franchise` aggregates by id.
//! - Provide the full scan used by franchise name uniqueness checks.
//!
//! # Invariants
//! - `save` of an unsaved aggregate (`version == 0`) only inserts.
//! - `save` of a loaded aggregate only succeeds if the row still holds the
//!   version it was loaded with; the stored version is then incremented.
//! - Read paths reject corrupt documents instead of masking them.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::franchise::{Franchise, FranchiseId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FRANCHISE_COLUMNS: [&str; 6] = [
    "id",
    "name",
    "document",
    "version",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from franchise persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Aggregate could not be encoded as a document.
    Encode(serde_json::Error),
    /// Stored row changed (or already exists) since the aggregate was loaded.
    VersionConflict {
        id: FranchiseId,
        expected_version: u64,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted into a valid aggregate.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "cannot encode franchise document: {err}"),
            Self::VersionConflict {
                id,
                expected_version,
            } => write!(
                f,
                "franchise {id} was modified concurrently (expected version {expected_version})"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "franchise repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "franchise repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "franchise repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted franchise data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Aggregate store contract, independent of storage technology.
pub trait FranchiseRepository {
    /// Upserts one aggregate by id and returns the persisted representation.
    fn save(&self, franchise: &Franchise) -> RepoResult<Franchise>;
    /// Loads one aggregate by id.
    fn find_by_id(&self, id: &str) -> RepoResult<Option<Franchise>>;
    /// Loads every aggregate in creation order.
    fn find_all(&self) -> RepoResult<Vec<Franchise>>;
}

impl<R: FranchiseRepository + ?Sized> FranchiseRepository for &R {
    fn save(&self, franchise: &Franchise) -> RepoResult<Franchise> {
        (**self).save(franchise)
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Option<Franchise>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> RepoResult<Vec<Franchise>> {
        (**self).find_all()
    }
}

/// SQLite-backed store keeping one JSON document per franchise.
pub struct SqliteFranchiseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFranchiseRepository<'conn> {
    /// Creates a repository over a migrated connection.
    ///
    /// # Errors
    /// - Returns `UninitializedConnection` when migrations were not applied.
    /// - Returns `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl FranchiseRepository for SqliteFranchiseRepository<'_> {
    fn save(&self, franchise: &Franchise) -> RepoResult<Franchise> {
        let document = serde_json::to_string(franchise).map_err(RepoError::Encode)?;

        let changed = if franchise.version == 0 {
            self.conn.execute(
                "INSERT INTO franchises (id, name, document, version)
                 VALUES (?1, ?2, ?3, 1)
                 ON CONFLICT(id) DO NOTHING;",
                params![franchise.id, franchise.name, document],
            )?
        } else {
            self.conn.execute(
                "UPDATE franchises
                 SET
                    name = ?1,
                    document = ?2,
                    version = version + 1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?3 AND version = ?4;",
                params![
                    franchise.name,
                    document,
                    franchise.id,
                    version_to_db(franchise.version)?,
                ],
            )?
        };

        if changed == 0 {
            return Err(RepoError::VersionConflict {
                id: franchise.id.clone(),
                expected_version: franchise.version,
            });
        }

        let mut saved = franchise.clone();
        saved.version = franchise.version + 1;
        Ok(saved)
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Option<Franchise>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, document, version FROM franchises WHERE id = ?1;",
                [id],
                read_raw_row,
            )
            .optional()?;

        row.map(parse_franchise).transpose()
    }

    fn find_all(&self) -> RepoResult<Vec<Franchise>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, document, version FROM franchises ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut franchises = Vec::new();
        while let Some(row) = rows.next()? {
            franchises.push(parse_franchise(read_raw_row(row)?)?);
        }
        Ok(franchises)
    }
}

struct RawFranchiseRow {
    id: String,
    document: String,
    version: i64,
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawFranchiseRow> {
    Ok(RawFranchiseRow {
        id: row.get("id")?,
        document: row.get("document")?,
        version: row.get("version")?,
    })
}

fn parse_franchise(raw: RawFranchiseRow) -> RepoResult<Franchise> {
    let mut franchise: Franchise = serde_json::from_str(&raw.document).map_err(|err| {
        RepoError::InvalidData(format!("franchise `{}` document: {err}", raw.id))
    })?;

    if franchise.id != raw.id {
        return Err(RepoError::InvalidData(format!(
            "document id `{}` does not match row id `{}`",
            franchise.id, raw.id
        )));
    }

    franchise.version = u64::try_from(raw.version).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid version `{}` for franchise `{}`",
            raw.version, raw.id
        ))
    })?;
    Ok(franchise)
}

fn version_to_db(version: u64) -> RepoResult<i64> {
    i64::try_from(version)
        .map_err(|_| RepoError::InvalidData(format!("version {version} exceeds storage range")))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "franchises")? {
        return Err(RepoError::MissingRequiredTable("franchises"));
    }

    for column in FRANCHISE_COLUMNS {
        if !table_has_column(conn, "franchises", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "franchises",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

//! Dependent repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist dependent records with their status payload.
//! - Serve the pending queue filtered by pending statuses.
//!
//! # Invariants
//! - `replace_dependent` and `delete_dependent` are single conditional
//!   statements; they either apply fully or change nothing.
//! - `pending_since` is stamped by SQL when a record enters a pending state
//!   and cleared when it returns to `active`.
//! - `replace_dependent` keeps the given `created_at`; `None` restamps it.

use crate::model::dependent::{
    Dependent, DependentFields, DependentId, DependentState, DependentStatus,
};
use crate::model::sector::SectorId;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const DEPENDENT_SELECT_SQL: &str = "SELECT
    d.uuid AS uuid,
    d.sector_uuid AS sector_uuid,
    d.name AS name,
    d.address AS address,
    d.age AS age,
    d.status AS status,
    d.pending_reason AS pending_reason,
    d.pending_name AS pending_name,
    d.pending_address AS pending_address,
    d.pending_age AS pending_age,
    d.created_at AS created_at,
    d.pending_since AS pending_since
FROM dependents d";

/// Pending queue entry, annotated with its sector name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub sector_id: SectorId,
    pub sector_name: String,
    pub dependent: Dependent,
}

/// Repository interface for dependent records.
pub trait DependentRepository {
    /// Inserts a new record; the owning sector must exist.
    fn create_dependent(&self, dependent: &Dependent) -> RepoResult<DependentId>;
    fn get_dependent(
        &self,
        sector_id: SectorId,
        id: DependentId,
    ) -> RepoResult<Option<Dependent>>;
    /// Lists one sector's records ordered by name.
    fn list_dependents(&self, sector_id: SectorId) -> RepoResult<Vec<Dependent>>;
    /// Overwrites the full record if its stored status is still `expected`.
    fn replace_dependent(&self, dependent: &Dependent, expected: DependentStatus)
        -> RepoResult<()>;
    /// Deletes the record if its stored status is still `expected`.
    fn delete_dependent(
        &self,
        sector_id: SectorId,
        id: DependentId,
        expected: DependentStatus,
    ) -> RepoResult<()>;
    /// Lists pending records, optionally for one sector, by sector then name.
    fn list_pending(&self, sector_id: Option<SectorId>) -> RepoResult<Vec<PendingItem>>;
}

/// SQLite-backed dependent repository.
pub struct SqliteDependentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDependentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn sector_exists(&self, sector_id: SectorId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sectors WHERE uuid = ?1);",
            [sector_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn stored_status(
        &self,
        sector_id: SectorId,
        id: DependentId,
    ) -> RepoResult<Option<DependentStatus>> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM dependents WHERE uuid = ?1 AND sector_uuid = ?2;",
                params![id.to_string(), sector_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        status.map(|value| parse_status(&value)).transpose()
    }

    /// Turns a zero-row conditional write into the precise failure.
    fn conditional_write_failed(
        &self,
        sector_id: SectorId,
        id: DependentId,
        expected: DependentStatus,
    ) -> RepoError {
        match self.stored_status(sector_id, id) {
            Ok(Some(actual)) => RepoError::StatusMismatch {
                id,
                expected,
                actual,
            },
            Ok(None) => RepoError::NotFound {
                entity: "dependent",
                id,
            },
            Err(err) => err,
        }
    }
}

impl DependentRepository for SqliteDependentRepository<'_> {
    fn create_dependent(&self, dependent: &Dependent) -> RepoResult<DependentId> {
        dependent.validate()?;
        if !self.sector_exists(dependent.sector_id)? {
            return Err(RepoError::NotFound {
                entity: "sector",
                id: dependent.sector_id,
            });
        }

        let columns = StateColumns::from_state(&dependent.state);
        self.conn.execute(
            "INSERT INTO dependents (
                uuid,
                sector_uuid,
                name,
                address,
                age,
                status,
                pending_reason,
                pending_name,
                pending_address,
                pending_age,
                pending_since
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                CASE WHEN ?6 = 'active' THEN NULL ELSE (strftime('%s', 'now') * 1000) END
            );",
            params![
                dependent.id.to_string(),
                dependent.sector_id.to_string(),
                dependent.fields.name.as_str(),
                dependent.fields.address.as_str(),
                dependent.fields.age,
                columns.status.as_str(),
                columns.reason,
                columns.name,
                columns.address,
                columns.age,
            ],
        )?;

        Ok(dependent.id)
    }

    fn get_dependent(
        &self,
        sector_id: SectorId,
        id: DependentId,
    ) -> RepoResult<Option<Dependent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DEPENDENT_SELECT_SQL}
             WHERE d.uuid = ?1 AND d.sector_uuid = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), sector_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_dependent_row(row)?));
        }

        Ok(None)
    }

    fn list_dependents(&self, sector_id: SectorId) -> RepoResult<Vec<Dependent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DEPENDENT_SELECT_SQL}
             WHERE d.sector_uuid = ?1
             ORDER BY d.name ASC, d.uuid ASC;"
        ))?;

        let mut rows = stmt.query([sector_id.to_string()])?;
        let mut dependents = Vec::new();
        while let Some(row) = rows.next()? {
            dependents.push(parse_dependent_row(row)?);
        }

        Ok(dependents)
    }

    fn replace_dependent(
        &self,
        dependent: &Dependent,
        expected: DependentStatus,
    ) -> RepoResult<()> {
        dependent.validate()?;

        let columns = StateColumns::from_state(&dependent.state);
        let changed = self.conn.execute(
            "UPDATE dependents
             SET
                name = ?1,
                address = ?2,
                age = ?3,
                status = ?4,
                pending_reason = ?5,
                pending_name = ?6,
                pending_address = ?7,
                pending_age = ?8,
                pending_since = CASE
                    WHEN ?4 = 'active' THEN NULL
                    ELSE COALESCE(?9, strftime('%s', 'now') * 1000)
                END,
                created_at = COALESCE(?13, strftime('%s', 'now') * 1000),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10 AND sector_uuid = ?11 AND status = ?12;",
            params![
                dependent.fields.name.as_str(),
                dependent.fields.address.as_str(),
                dependent.fields.age,
                columns.status.as_str(),
                columns.reason,
                columns.name,
                columns.address,
                columns.age,
                dependent.pending_since,
                dependent.id.to_string(),
                dependent.sector_id.to_string(),
                expected.as_str(),
                dependent.created_at,
            ],
        )?;

        if changed == 0 {
            return Err(self.conditional_write_failed(dependent.sector_id, dependent.id, expected));
        }

        Ok(())
    }

    fn delete_dependent(
        &self,
        sector_id: SectorId,
        id: DependentId,
        expected: DependentStatus,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM dependents WHERE uuid = ?1 AND sector_uuid = ?2 AND status = ?3;",
            params![id.to_string(), sector_id.to_string(), expected.as_str()],
        )?;

        if changed == 0 {
            return Err(self.conditional_write_failed(sector_id, id, expected));
        }

        Ok(())
    }

    fn list_pending(&self, sector_id: Option<SectorId>) -> RepoResult<Vec<PendingItem>> {
        let pending_statuses = DependentStatus::PENDING
            .iter()
            .map(|status| format!("'{}'", status.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT
                sub.*,
                s.name AS sector_name
             FROM ({DEPENDENT_SELECT_SQL}) sub
             JOIN sectors s ON s.uuid = sub.sector_uuid
             WHERE sub.status IN ({pending_statuses})
               AND (?1 IS NULL OR sub.sector_uuid = ?1)
             ORDER BY s.name ASC, sub.name ASC, sub.uuid ASC;"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([sector_id.map(|id| id.to_string())])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let dependent = parse_dependent_row(row)?;
            items.push(PendingItem {
                sector_id: dependent.sector_id,
                sector_name: row.get("sector_name")?,
                dependent,
            });
        }

        Ok(items)
    }
}

/// Column projection of a `DependentState`.
struct StateColumns<'a> {
    status: DependentStatus,
    reason: Option<&'a str>,
    name: Option<&'a str>,
    address: Option<&'a str>,
    age: Option<u32>,
}

impl<'a> StateColumns<'a> {
    fn from_state(state: &'a DependentState) -> Self {
        let mut columns = Self {
            status: state.status(),
            reason: None,
            name: None,
            address: None,
            age: None,
        };
        match state {
            DependentState::PendingRemoval { reason } => columns.reason = Some(reason.as_str()),
            DependentState::PendingEdit { proposed } => {
                columns.name = Some(proposed.name.as_str());
                columns.address = Some(proposed.address.as_str());
                columns.age = proposed.age;
            }
            DependentState::Active | DependentState::PendingAddition => {}
        }
        columns
    }
}

fn parse_dependent_row(row: &Row<'_>) -> RepoResult<Dependent> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "dependents.uuid")?;
    let sector_text: String = row.get("sector_uuid")?;
    let sector_id = parse_uuid(&sector_text, "dependents.sector_uuid")?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text)?;
    let state = parse_state(
        id,
        status,
        row.get("pending_reason")?,
        row.get("pending_name")?,
        row.get("pending_address")?,
        row.get("pending_age")?,
    )?;

    let dependent = Dependent {
        id,
        sector_id,
        fields: DependentFields {
            name: row.get("name")?,
            address: row.get("address")?,
            age: row.get("age")?,
        },
        state,
        created_at: row.get("created_at")?,
        pending_since: row.get("pending_since")?,
    };
    dependent.validate()?;
    Ok(dependent)
}

fn parse_status(value: &str) -> RepoResult<DependentStatus> {
    DependentStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{value}` in dependents.status"))
    })
}

fn parse_state(
    id: DependentId,
    status: DependentStatus,
    reason: Option<String>,
    name: Option<String>,
    address: Option<String>,
    age: Option<u32>,
) -> RepoResult<DependentState> {
    let mismatch = || {
        RepoError::InvalidData(format!(
            "dependent {id} has pending payload inconsistent with status `{}`",
            status.as_str()
        ))
    };

    match (status, reason, name, address) {
        (DependentStatus::Active, None, None, None) if age.is_none() => Ok(DependentState::Active),
        (DependentStatus::PendingAddition, None, None, None) if age.is_none() => {
            Ok(DependentState::PendingAddition)
        }
        (DependentStatus::PendingRemoval, Some(reason), None, None) if age.is_none() => {
            Ok(DependentState::PendingRemoval { reason })
        }
        (DependentStatus::PendingEdit, None, Some(name), Some(address)) => {
            Ok(DependentState::PendingEdit {
                proposed: DependentFields { name, address, age },
            })
        }
        _ => Err(mismatch()),
    }
}

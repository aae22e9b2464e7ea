//! Sector repository contract and SQLite implementation.
//!
//! # Invariants
//! - Caretaker lists are stored as JSON text; reads accept both legacy and
//!   object entries, writes always emit object entries.
//! - `total_dependents` and `pending_count` are computed by the read query.

use crate::model::sector::{
    decode_caretakers, encode_caretakers, Caretaker, Sector, SectorId, SectorSummary,
};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SECTOR_SELECT_SQL: &str = "SELECT
    s.uuid AS uuid,
    s.name AS name,
    s.schedule AS schedule,
    s.caretakers AS caretakers
FROM sectors s";

/// Repository interface for sectors and their caretakers.
pub trait SectorRepository {
    fn create_sector(&self, sector: &Sector) -> RepoResult<SectorId>;
    fn get_sector(&self, id: SectorId) -> RepoResult<Option<Sector>>;
    /// Lists every sector by name, with derived dependent counts.
    fn list_sectors(&self) -> RepoResult<Vec<SectorSummary>>;
    /// Replaces the whole caretaker list of one sector.
    fn replace_caretakers(&self, id: SectorId, caretakers: &[Caretaker]) -> RepoResult<()>;
}

/// SQLite-backed sector repository.
pub struct SqliteSectorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSectorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SectorRepository for SqliteSectorRepository<'_> {
    fn create_sector(&self, sector: &Sector) -> RepoResult<SectorId> {
        sector.validate()?;
        let caretakers = encode_json(&sector.caretakers)?;

        self.conn.execute(
            "INSERT INTO sectors (uuid, name, schedule, caretakers)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                sector.id.to_string(),
                sector.name.as_str(),
                sector.schedule.as_str(),
                caretakers,
            ],
        )?;

        Ok(sector.id)
    }

    fn get_sector(&self, id: SectorId) -> RepoResult<Option<Sector>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SECTOR_SELECT_SQL} WHERE s.uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_sector_row(row)?));
        }

        Ok(None)
    }

    fn list_sectors(&self) -> RepoResult<Vec<SectorSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                s.uuid AS uuid,
                s.name AS name,
                s.schedule AS schedule,
                s.caretakers AS caretakers,
                (SELECT COUNT(*) FROM dependents d
                  WHERE d.sector_uuid = s.uuid) AS total_dependents,
                (SELECT COUNT(*) FROM dependents d
                  WHERE d.sector_uuid = s.uuid AND d.status <> 'active') AS pending_count
             FROM sectors s
             ORDER BY s.name ASC, s.uuid ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(SectorSummary {
                sector: parse_sector_row(row)?,
                total_dependents: row.get("total_dependents")?,
                pending_count: row.get("pending_count")?,
            });
        }

        Ok(summaries)
    }

    fn replace_caretakers(&self, id: SectorId, caretakers: &[Caretaker]) -> RepoResult<()> {
        caretakers.iter().try_for_each(Caretaker::validate)?;
        let encoded = encode_json(caretakers)?;

        let changed = self.conn.execute(
            "UPDATE sectors
             SET
                caretakers = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![encoded, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "sector",
                id,
            });
        }

        Ok(())
    }
}

fn encode_json(caretakers: &[Caretaker]) -> RepoResult<String> {
    encode_caretakers(caretakers)
        .map_err(|err| RepoError::InvalidData(format!("caretaker list encode failed: {err}")))
}

fn parse_sector_row(row: &Row<'_>) -> RepoResult<Sector> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "sectors.uuid")?;

    let caretakers_json: String = row.get("caretakers")?;
    let caretakers = decode_caretakers(&caretakers_json).map_err(|err| {
        RepoError::InvalidData(format!("invalid caretaker list in sectors.caretakers: {err}"))
    })?;

    Ok(Sector {
        id,
        name: row.get("name")?,
        schedule: row.get("schedule")?,
        caretakers,
    })
}

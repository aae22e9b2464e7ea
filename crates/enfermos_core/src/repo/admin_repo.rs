//! Admin directory repository contract and SQLite implementation.
//!
//! # Invariants
//! - Emails are normalized before every read and write.
//! - Upserting an existing email only refreshes the name.

use crate::model::admin::{normalize_email, Admin};
use crate::model::normalize_upper;
use crate::model::validation::ValidationError;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const ADMIN_SELECT_SQL: &str = "SELECT uuid, name, email, created_at FROM admins";

/// Whether an upsert inserted or refreshed the directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminUpsert {
    Created(Admin),
    Updated(Admin),
}

impl AdminUpsert {
    pub fn admin(&self) -> &Admin {
        match self {
            Self::Created(admin) | Self::Updated(admin) => admin,
        }
    }
}

/// Repository interface for the admin directory.
pub trait AdminRepository {
    /// Inserts the email, or renames the existing entry for it.
    fn upsert_admin(&self, name: &str, email: &str) -> RepoResult<AdminUpsert>;
    /// Looks an admin up by email; malformed emails are simply absent.
    fn find_admin_by_email(&self, email: &str) -> RepoResult<Option<Admin>>;
    /// Lists admins ordered by name.
    fn list_admins(&self) -> RepoResult<Vec<Admin>>;

    /// Directory membership check backing every privileged action.
    fn is_admin_email(&self, email: &str) -> RepoResult<bool> {
        Ok(self.find_admin_by_email(email)?.is_some())
    }
}

/// SQLite-backed admin directory.
pub struct SqliteAdminRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAdminRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_by_normalized_email(&self, email: &str) -> RepoResult<Option<Admin>> {
        let admin = self
            .conn
            .query_row(
                &format!("{ADMIN_SELECT_SQL} WHERE email = ?1;"),
                [email],
                RawAdmin::from_row,
            )
            .optional()?;
        admin.map(RawAdmin::into_admin).transpose()
    }
}

impl AdminRepository for SqliteAdminRepository<'_> {
    fn upsert_admin(&self, name: &str, email: &str) -> RepoResult<AdminUpsert> {
        let email = normalize_email(email)?;
        let name = normalize_upper(name);
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let created = match self.load_by_normalized_email(&email)? {
            Some(existing) => {
                self.conn.execute(
                    "UPDATE admins SET name = ?1 WHERE uuid = ?2;",
                    params![name, existing.id.to_string()],
                )?;
                false
            }
            None => {
                self.conn.execute(
                    "INSERT INTO admins (uuid, name, email) VALUES (?1, ?2, ?3);",
                    params![Uuid::new_v4().to_string(), name, email],
                )?;
                true
            }
        };

        let admin = self.load_by_normalized_email(&email)?.ok_or_else(|| {
            RepoError::InvalidData(format!("admin `{email}` missing after upsert"))
        })?;
        Ok(if created {
            AdminUpsert::Created(admin)
        } else {
            AdminUpsert::Updated(admin)
        })
    }

    fn find_admin_by_email(&self, email: &str) -> RepoResult<Option<Admin>> {
        let Ok(email) = normalize_email(email) else {
            return Ok(None);
        };
        self.load_by_normalized_email(&email)
    }

    fn list_admins(&self) -> RepoResult<Vec<Admin>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ADMIN_SELECT_SQL} ORDER BY name ASC, email ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut admins = Vec::new();
        while let Some(row) = rows.next()? {
            admins.push(RawAdmin::from_row(row)?.into_admin()?);
        }
        Ok(admins)
    }
}

/// Row values before uuid validation.
struct RawAdmin {
    uuid: String,
    name: String,
    email: String,
    created_at: i64,
}

impl RawAdmin {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uuid: row.get("uuid")?,
            name: row.get("name")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_admin(self) -> RepoResult<Admin> {
        Ok(Admin {
            id: parse_uuid(&self.uuid, "admins.uuid")?,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        })
    }
}

//! SQLite-backed credential storage.
//!
//! One row per credential. Metadata is stored in plain columns; the
//! secret is stored only as its envelope (`algorithm`, `nonce`,
//! `ciphertext`). The `seq` column is the insertion order used to break
//! ties between equal `created_at` values.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::crypto::{CipherAlgorithm, SecretEnvelope};
use crate::errors::{Result, VaultError};
use crate::vault::credential::{Credential, CredentialId, OwnerId};

use super::CredentialRepository;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS credentials (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,
    id           TEXT NOT NULL UNIQUE,
    owner_id     TEXT NOT NULL,
    service_name TEXT NOT NULL,
    username     TEXT NOT NULL,
    url          TEXT,
    notes        TEXT,
    algorithm    TEXT NOT NULL,
    nonce        BLOB NOT NULL,
    ciphertext   BLOB NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_credentials_owner ON credentials (owner_id, created_at, seq);";

const COLUMNS: &str = "id, owner_id, service_name, username, url, notes, \
                       algorithm, nonce, ciphertext, created_at, updated_at";

pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(storage("open"))?;

        // Owner-only access to the database file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        // WAL is best effort; some filesystems refuse it.
        let _ = conn.pragma_update(None, "journal_mode", "WAL");

        Self::init(conn)
    }

    /// A private database that lives as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage("open"))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(storage("schema"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Storage("connection lock poisoned".into()))
    }
}

fn storage(context: &'static str) -> impl Fn(rusqlite::Error) -> VaultError {
    move |e| VaultError::Storage(format!("{context}: {e}"))
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VaultError::Storage(format!("bad timestamp in row: {e}")))
}

/// Raw column values, converted to a [`Credential`] outside the row callback
/// so conversion errors surface as `VaultError`.
struct RawRow {
    id: String,
    owner_id: String,
    service_name: String,
    username: String,
    url: Option<String>,
    notes: Option<String>,
    algorithm: String,
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            service_name: row.get(2)?,
            username: row.get(3)?,
            url: row.get(4)?,
            notes: row.get(5)?,
            algorithm: row.get(6)?,
            nonce: row.get(7)?,
            ciphertext: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_credential(self) -> Result<Credential> {
        Ok(Credential {
            id: CredentialId::from(self.id),
            owner_id: OwnerId::new(self.owner_id)
                .map_err(|_| VaultError::Storage("row without owner".into()))?,
            service_name: self.service_name,
            username: self.username,
            url: self.url,
            notes: self.notes,
            secret_envelope: SecretEnvelope {
                algorithm: CipherAlgorithm::from_tag(&self.algorithm),
                nonce: self.nonce,
                ciphertext: self.ciphertext,
            },
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl CredentialRepository for SqliteRepository {
    fn insert(&self, credential: Credential) -> Result<()> {
        let conn = self.conn()?;
        let envelope = &credential.secret_envelope;
        conn.execute(
            &format!("INSERT INTO credentials ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
            params![
                credential.id.as_str(),
                credential.owner_id.as_str(),
                credential.service_name,
                credential.username,
                credential.url,
                credential.notes,
                envelope.algorithm.as_str(),
                envelope.nonce,
                envelope.ciphertext,
                timestamp(&credential.created_at),
                timestamp(&credential.updated_at),
            ],
        )
        .map_err(storage("insert"))?;
        Ok(())
    }

    fn list(&self, owner: &OwnerId) -> Result<Vec<Credential>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM credentials WHERE owner_id = ?1 ORDER BY created_at, seq"
            ))
            .map_err(storage("list prepare"))?;

        let rows = stmt
            .query_map(params![owner.as_str()], RawRow::from_row)
            .map_err(storage("list exec"))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(storage("list row"))?.into_credential()?);
        }
        Ok(out)
    }

    fn get(&self, owner: &OwnerId, id: &CredentialId) -> Result<Option<Credential>> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM credentials WHERE id = ?1 AND owner_id = ?2"),
                params![id.as_str(), owner.as_str()],
                RawRow::from_row,
            )
            .optional()
            .map_err(storage("get"))?;
        raw.map(RawRow::into_credential).transpose()
    }

    fn replace(&self, credential: Credential) -> Result<bool> {
        let conn = self.conn()?;
        let envelope = &credential.secret_envelope;
        let changed = conn
            .execute(
                "UPDATE credentials
                 SET service_name = ?3, username = ?4, url = ?5, notes = ?6,
                     algorithm = ?7, nonce = ?8, ciphertext = ?9, updated_at = ?10
                 WHERE id = ?1 AND owner_id = ?2",
                params![
                    credential.id.as_str(),
                    credential.owner_id.as_str(),
                    credential.service_name,
                    credential.username,
                    credential.url,
                    credential.notes,
                    envelope.algorithm.as_str(),
                    envelope.nonce,
                    envelope.ciphertext,
                    timestamp(&credential.updated_at),
                ],
            )
            .map_err(storage("update"))?;
        Ok(changed == 1)
    }

    fn remove(&self, owner: &OwnerId, id: &CredentialId) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "DELETE FROM credentials WHERE id = ?1 AND owner_id = ?2",
                params![id.as_str(), owner.as_str()],
            )
            .map_err(storage("delete"))?;
        Ok(changed == 1)
    }
}

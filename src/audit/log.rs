//! SQLite-backed audit log.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::errors::{Result, VaultError};

use super::{AuditEvent, AuditSink};

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    /// Owner fingerprint, never the raw identity.
    pub owner: String,
    pub credential_id: Option<String>,
    pub outcome: String,
}

pub struct AuditLog {
    conn: Mutex<Connection>,
}

impl AuditLog {
    /// Open (or create) the audit database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| VaultError::Audit(format!("open {}: {e}", path.display())))?;

        // Restrictive permissions on the audit database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| VaultError::Audit(format!("open: {e}")))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp     TEXT NOT NULL,
                operation     TEXT NOT NULL,
                owner         TEXT NOT NULL,
                credential_id TEXT,
                outcome       TEXT NOT NULL
            );",
        )
        .map_err(|e| VaultError::Audit(format!("schema: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// A panic while holding the lock cannot leave a half-applied statement
    /// behind, so a poisoned connection is still used after a warning.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("audit log lock poisoned; recovering connection");
            poisoned.into_inner()
        })
    }

    /// Query recent entries, most recent first.
    ///
    /// - `limit`: maximum number of entries to return.
    /// - `since`: if provided, only entries at or after this instant.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        // An epoch lower bound stands in for "no filter".
        let since = since
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
            .to_rfc3339_opts(SecondsFormat::Micros, true);

        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, operation, owner, credential_id, outcome
                 FROM audit_log
                 WHERE timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| VaultError::Audit(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![since, limit], |row| {
                let ts: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts)
                    .map_or(DateTime::<Utc>::UNIX_EPOCH, |dt| dt.with_timezone(&Utc));
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    owner: row.get(3)?,
                    credential_id: row.get(4)?,
                    outcome: row.get(5)?,
                })
            })
            .map_err(|e| VaultError::Audit(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| VaultError::Audit(format!("row parse: {e}")))?);
        }
        Ok(entries)
    }
}

impl AuditSink for AuditLog {
    fn record(&self, event: &AuditEvent<'_>) {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let result = conn.execute(
            "INSERT INTO audit_log (timestamp, operation, owner, credential_id, outcome)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                now,
                event.operation.as_str(),
                event.owner.fingerprint(),
                event.credential_id.map(|id| id.as_str()),
                event.outcome.as_str(),
            ],
        );
        if let Err(e) = result {
            tracing::warn!(
                error = %e,
                operation = event.operation.as_str(),
                "audit write failed"
            );
        }
    }
}

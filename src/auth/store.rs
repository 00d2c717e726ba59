//! SQLite-backed credential and session store.
//!
//! Tables:
//! - `accounts`: username, password_hash, role
//! - `sessions`: sid, identity_blob, expire
//!
//! Sessions carry a denormalized identity snapshot (no foreign key into
//! `accounts`) and are only ever addressed by the sid the client already
//! holds. There is deliberately no enumeration query over sessions.

use crate::auth::error::{AuthError, AuthResult};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A stored account row.
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub password_hash: String,
    /// Nullable for accounts that predate roles.
    pub role: Option<String>,
}

/// The `(username, role)` pair captured at session creation. A snapshot,
/// not a live reference: later account changes do not alter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Option<String>,
}

/// Thread-safe store over a single SQLite connection. Callers hold the
/// connection guard only for the duration of one statement, so it is
/// released on every exit path including errors.
pub struct AuthStore {
    conn: Mutex<rusqlite::Connection>,
}

impl AuthStore {
    /// Open (or create) the auth database at the given path.
    pub fn open(db_path: &Path) -> AuthResult<Self> {
        let conn = rusqlite::Connection::open(db_path)?;
        Self::init(conn)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> AuthResult<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: rusqlite::Connection) -> AuthResult<Self> {
        // WAL for concurrent reads + crash safety; busy_timeout bounds how
        // long a contended call blocks before surfacing a storage error.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                username TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                role TEXT
            );

            CREATE TABLE IF NOT EXISTS sessions (
                sid TEXT PRIMARY KEY,
                identity_blob TEXT NOT NULL,
                expire INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_expire ON sessions(expire);",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ── Accounts ────────────────────────────────────────────────────

    /// Insert a new account. The PRIMARY KEY constraint is the sole
    /// duplicate check, so concurrent signups for the same username cannot
    /// both succeed.
    pub fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        role: Option<&str>,
    ) -> AuthResult<()> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO accounts (username, password_hash, role) VALUES (?1, ?2, ?3)",
            rusqlite::params![username, password_hash, role],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(AuthError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Exact-match lookup. Absence is `Ok(None)`, not an error.
    pub fn find_account(&self, username: &str) -> AuthResult<Option<Account>> {
        let conn = self.conn.lock();
        let row = conn.query_row(
            "SELECT username, password_hash, role FROM accounts WHERE username = ?1",
            rusqlite::params![username],
            |row| {
                Ok(Account {
                    username: row.get(0)?,
                    password_hash: row.get(1)?,
                    role: row.get(2)?,
                })
            },
        );

        match row {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Sessions ────────────────────────────────────────────────────

    /// Persist a new session row. The caller mints a fresh random sid per
    /// login, so collisions do not occur in practice; a collision would
    /// surface as a constraint failure mapped to `Storage`.
    pub fn create_session(&self, sid: &str, identity: &Identity, expire: i64) -> AuthResult<()> {
        let blob = serde_json::to_string(identity)
            .map_err(|e| AuthError::Storage(format!("identity encode: {e}")))?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO sessions (sid, identity_blob, expire) VALUES (?1, ?2, ?3)",
            rusqlite::params![sid, blob, expire],
        )?;
        Ok(())
    }

    /// Resolve a sid to its identity snapshot.
    ///
    /// Lapsed rows are treated as absent: the lookup filters on
    /// `expire > now`, so an expired session reads as `None` even when the
    /// row has not been physically deleted.
    pub fn read_session(&self, sid: &str) -> AuthResult<Option<Identity>> {
        let now = Utc::now().timestamp();

        let conn = self.conn.lock();
        let row: Result<String, _> = conn.query_row(
            "SELECT identity_blob FROM sessions WHERE sid = ?1 AND expire > ?2",
            rusqlite::params![sid, now],
            |row| row.get(0),
        );

        match row {
            Ok(blob) => {
                let identity = serde_json::from_str(&blob)
                    .map_err(|e| AuthError::Storage(format!("identity decode: {e}")))?;
                Ok(Some(identity))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a session row. Deleting a nonexistent sid is a no-op.
    pub fn delete_session(&self, sid: &str) -> AuthResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM sessions WHERE sid = ?1",
            rusqlite::params![sid],
        )?;
        Ok(())
    }

    /// Delete rows whose expiry has passed. Expiry is already enforced at
    /// read time; this is a maintenance hook, not a correctness requirement.
    pub fn purge_expired_sessions(&self) -> AuthResult<u64> {
        let now = Utc::now().timestamp();
        let conn = self.conn.lock();
        let deleted = conn.execute(
            "DELETE FROM sessions WHERE expire <= ?1",
            rusqlite::params![now],
        )?;
        Ok(deleted as u64)
    }
}

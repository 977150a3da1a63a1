//! User and session persistence.
//!
//! # Invariants
//! - Emails are unique case-insensitively (`COLLATE NOCASE`).
//! - Only session token digests are stored, never plaintext tokens.
//! - Deleting a user cascades to sessions and tasks.

use crate::model::user::{User, UserId};
use crate::repo::{
    ensure_schema, is_unique_violation, parse_millis, parse_uuid, RepoError, RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::fmt::{Debug, Formatter};

const USER_COLUMNS: &[&str] = &["id", "name", "email", "password_hash", "created_at"];
const SESSION_COLUMNS: &[&str] = &["token_hash", "user_id", "created_at", "expires_at"];

/// User row including the stored password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

impl Debug for UserRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("user", &self.user)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Stored bearer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Repository interface for users and their sessions.
pub trait UserRepository {
    /// Inserts a user; `Conflict("email")` when the email is taken.
    fn create_user(&self, user: &User, password_hash: &str) -> RepoResult<()>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn create_session(&self, session: &SessionRecord) -> RepoResult<()>;
    fn find_session(&self, token_hash: &str) -> RepoResult<Option<SessionRecord>>;
    /// Returns whether a session was removed.
    fn delete_session(&self, token_hash: &str) -> RepoResult<bool>;
    /// Removes sessions that expired at or before `now`.
    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> RepoResult<usize>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, "users", USER_COLUMNS)?;
        ensure_schema(conn, "sessions", SESSION_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let inserted = self.conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                user.id.to_string(),
                user.name.as_str(),
                user.email.as_str(),
                password_hash,
                user.created_at.timestamp_millis(),
            ],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict("email")),
            Err(err) => Err(err.into()),
        }
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, password_hash, created_at
             FROM users
             WHERE email = ?1;",
        )?;
        let mut rows = stmt.query([email])?;
        match rows.next()? {
            Some(row) => Ok(Some(UserRecord {
                user: parse_user_row(row)?,
                password_hash: row.get("password_hash")?,
            })),
            None => Ok(None),
        }
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, created_at
             FROM users
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn create_session(&self, session: &SessionRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                session.token_hash.as_str(),
                session.user_id.to_string(),
                session.created_at.timestamp_millis(),
                session.expires_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    fn find_session(&self, token_hash: &str) -> RepoResult<Option<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT token_hash, user_id, created_at, expires_at
             FROM sessions
             WHERE token_hash = ?1;",
        )?;
        let mut rows = stmt.query([token_hash])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let user_text: String = row.get("user_id")?;
        Ok(Some(SessionRecord {
            token_hash: row.get("token_hash")?,
            user_id: parse_uuid(&user_text, "sessions.user_id")?,
            created_at: parse_millis(row.get("created_at")?, "sessions.created_at")?,
            expires_at: parse_millis(row.get("expires_at")?, "sessions.expires_at")?,
        }))
    }

    fn delete_session(&self, token_hash: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?1;", [token_hash])?;
        Ok(changed > 0)
    }

    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1;",
            [now.timestamp_millis()],
        )?;
        Ok(changed)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        created_at: parse_millis(row.get("created_at")?, "users.created_at")?,
    })
}

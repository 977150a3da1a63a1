//! Registration, login and bearer-session resolution.
//!
//! # Responsibility
//! - Create users with argon2 password hashes.
//! - Issue, resolve and revoke opaque bearer sessions.
//!
//! # Invariants
//! - Plaintext passwords and tokens are never persisted or logged.
//! - Stored sessions are keyed by the SHA-256 digest of their token.
//! - Expired sessions never resolve to a caller.
//! - Unknown emails and wrong passwords fail identically.

use crate::model::timestamp_now;
use crate::model::user::{Caller, IssuedSession, LoginInput, RegisterInput, User};
use crate::repo::user_repo::{SessionRecord, UserRepository};
use crate::repo::RepoError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Default bearer session lifetime.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 720;
/// Longest lifetime a deployment may configure (ten years).
pub const MAX_SESSION_TTL_HOURS: i64 = 10 * 365 * 24;
pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

// Verified against when the email is unknown, so both failure paths cost
// one argon2 verification.
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("taskflow-unknown-user").ok());

/// Authentication failures.
#[derive(Debug)]
pub enum AuthError {
    Validation(String),
    EmailTaken,
    InvalidCredentials,
    /// Token missing, unknown or expired.
    Unauthorized,
    PasswordHash(String),
    /// The configured lifetime pushes expiry past the representable range.
    SessionLifetime(Duration),
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::EmailTaken => write!(f, "User already exists"),
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::Unauthorized => write!(f, "Not authorized, token failed"),
            Self::PasswordHash(message) => write!(f, "password hashing failed: {message}"),
            Self::SessionLifetime(ttl) => write!(f, "session lifetime {ttl} overflows expiry"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Conflict("email") => Self::EmailTaken,
            other => Self::Repo(other),
        }
    }
}

/// Authentication facade over a user repository.
pub struct AuthService<R: UserRepository> {
    repo: R,
    session_ttl: Duration,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_session_ttl(repo, Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    pub fn with_session_ttl(repo: R, session_ttl: Duration) -> Self {
        Self { repo, session_ttl }
    }

    /// Creates a user and signs them in.
    ///
    /// # Errors
    /// - `Validation` for blank name, malformed email or short password.
    /// - `EmailTaken` when the email is already registered.
    pub fn register(&self, input: &RegisterInput) -> Result<IssuedSession, AuthError> {
        let name = input.name.trim();
        let email = normalize_email(&input.email);
        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "Please provide name, email and password".to_string(),
            ));
        }
        if !EMAIL_RE.is_match(&email) {
            return Err(AuthError::Validation(
                "Please provide a valid email".to_string(),
            ));
        }
        if input.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email,
            created_at: timestamp_now(),
        };
        let window = self.session_window()?;
        let password_hash =
            hash_password(&input.password).map_err(|err| AuthError::PasswordHash(err.to_string()))?;
        self.repo.create_user(&user, &password_hash)?;
        info!(
            "event=user_register module=auth status=ok user_id={}",
            user.id
        );

        self.issue_session(user, window)
    }

    /// Verifies credentials and issues a new session.
    pub fn login(&self, input: &LoginInput) -> Result<IssuedSession, AuthError> {
        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "Please provide email and password".to_string(),
            ));
        }

        let Some(record) = self.repo.find_user_by_email(&email)? else {
            if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
                let _ = verify_password(&input.password, dummy);
            }
            warn!("event=user_login module=auth status=denied reason=unknown_email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&input.password, &record.password_hash) {
            warn!(
                "event=user_login module=auth status=denied reason=bad_password user_id={}",
                record.user.id
            );
            return Err(AuthError::InvalidCredentials);
        }

        let window = self.session_window()?;
        info!(
            "event=user_login module=auth status=ok user_id={}",
            record.user.id
        );
        self.issue_session(record.user, window)
    }

    /// Resolves a bearer token to the calling identity.
    pub fn authenticate(&self, token: &str) -> Result<Caller, AuthError> {
        let token_hash = hash_token(token);
        let Some(session) = self.repo.find_session(&token_hash)? else {
            return Err(AuthError::Unauthorized);
        };

        if session.is_expired_at(timestamp_now()) {
            self.repo.delete_session(&token_hash)?;
            return Err(AuthError::Unauthorized);
        }

        Ok(Caller::new(session.user_id))
    }

    /// Profile of the authenticated caller.
    pub fn current_user(&self, caller: &Caller) -> Result<User, AuthError> {
        self.repo
            .get_user(caller.user_id)?
            .ok_or(AuthError::Unauthorized)
    }

    /// Revokes the session behind `token`.
    pub fn logout(&self, token: &str) -> Result<(), AuthError> {
        if !self.repo.delete_session(&hash_token(token))? {
            return Err(AuthError::Unauthorized);
        }
        info!("event=user_logout module=auth status=ok");
        Ok(())
    }

    /// Drops every expired session; returns how many were removed.
    pub fn purge_expired_sessions(&self) -> Result<usize, AuthError> {
        Ok(self.repo.delete_expired_sessions(timestamp_now())?)
    }

    /// `(created_at, expires_at)` for a session starting now.
    fn session_window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), AuthError> {
        let created_at = timestamp_now();
        let expires_at = created_at
            .checked_add_signed(self.session_ttl)
            .ok_or(AuthError::SessionLifetime(self.session_ttl))?;
        Ok((created_at, expires_at))
    }

    fn issue_session(
        &self,
        user: User,
        (created_at, expires_at): (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<IssuedSession, AuthError> {
        let token = generate_token();
        self.repo.create_session(&SessionRecord {
            token_hash: hash_token(&token),
            user_id: user.id,
            created_at,
            expires_at,
        })?;

        Ok(IssuedSession {
            token,
            user,
            expires_at,
        })
    }
}

/// Trims and lowercases an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hex SHA-256 digest used as the stored session key.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

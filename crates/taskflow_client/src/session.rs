//! Explicit authenticated session.
//!
//! # Invariants
//! - The bearer token never leaves this type except as a request header.
//! - `logout` consumes the session, so a revoked token cannot be reused.

use chrono::{DateTime, Utc};
use std::fmt::{Debug, Formatter};
use taskflow_core::{SessionEnvelope, User};

pub struct Session {
    token: String,
    user: User,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl From<SessionEnvelope> for Session {
    fn from(value: SessionEnvelope) -> Self {
        Self {
            token: value.token,
            user: value.user,
            expires_at: value.expires_at,
        }
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

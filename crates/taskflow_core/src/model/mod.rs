//! Domain model for tasks and the users who own them.
//!
//! # Invariants
//! - Every task carries exactly one owner, fixed at creation.
//! - Timestamps are kept at millisecond precision so in-memory values match
//!   what the store reads back.
//! - Deletion is a hard delete; there are no tombstones.

use chrono::{DateTime, SubsecRound, Utc};

pub mod envelope;
pub mod task;
pub mod user;

/// Current UTC time truncated to the precision persisted by the store.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

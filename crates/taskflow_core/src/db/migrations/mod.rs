//! Ordered schema ladder for the task store.
//!
//! The schema version lives in `PRAGMA user_version`. Each rung is a plain
//! SQL script compiled into the binary; rungs are append-only and their
//! versions strictly increase.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    sql: &'static str,
}

const LADDER: &[Migration] = &[
    Migration {
        version: 1,
        name: "users_sessions",
        sql: include_str!("0001_users_sessions.sql"),
    },
    Migration {
        version: 2,
        name: "tasks",
        sql: include_str!("0002_tasks.sql"),
    },
];

/// Schema version a freshly migrated store reports.
pub fn latest_version() -> u32 {
    LADDER.last().map_or(0, |rung| rung.version)
}

/// Migrations a store at `from_version` still needs, oldest first.
pub fn pending(from_version: u32) -> impl Iterator<Item = &'static Migration> {
    LADDER.iter().skip_while(move |rung| rung.version <= from_version)
}

/// Brings `conn` up to [`latest_version`] in a single transaction.
///
/// Returns the versions that were applied; empty when already current.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<Vec<u32>> {
    let found = current_user_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let mut applied = Vec::new();
    let tx = conn.transaction()?;
    for rung in pending(found) {
        tx.execute_batch(rung.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", rung.version))
            .map_err(|source| DbError::Migration {
                version: rung.version,
                name: rung.name,
                source,
            })?;
        applied.push(rung.version);
    }
    tx.commit()?;

    if !applied.is_empty() {
        info!(
            "event=db_migrate module=db status=ok from_version={found} to_version={supported} applied={}",
            applied.len()
        );
    }
    Ok(applied)
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

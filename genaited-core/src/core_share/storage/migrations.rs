//! Database migrations for the sharing schema
//!
//! Each migration is applied atomically and tracked in the
//! share_schema_version table.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::info;

use crate::core_share::types::Timestamp;

/// Current schema version for core_share
pub const CURRENT_SHARE_SCHEMA_VERSION: i32 = 1;

/// Migration descriptor
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub up_sql: &'static str,
    pub down_sql: Option<&'static str>,
}

/// All available migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial tutors, groups, and memberships schema",
        up_sql: r#"
            -- Schema version tracking for core_share
            CREATE TABLE IF NOT EXISTS share_schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            );

            -- Shared tutor configurations
            CREATE TABLE IF NOT EXISTS tutor_configs (
                id TEXT PRIMARY KEY,                    -- TutorId (uuid)
                owner_id TEXT NOT NULL,                 -- UserId
                name TEXT NOT NULL,
                description TEXT,
                instructions TEXT,
                category TEXT NOT NULL CHECK(category IN ('Curriculum', 'Teaching', 'Research', 'General')),
                icon TEXT,
                is_public INTEGER NOT NULL DEFAULT 0,
                passcode TEXT,                          -- NULL means unjoinable by code
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            -- Partial unique index: passcodes are unique among tutors that
            -- have one; public tutors all carry NULL.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_tutor_passcode
                ON tutor_configs(passcode) WHERE passcode IS NOT NULL;
            CREATE INDEX IF NOT EXISTS idx_tutor_owner ON tutor_configs(owner_id);
            CREATE INDEX IF NOT EXISTS idx_tutor_public ON tutor_configs(is_public);

            -- Study groups
            CREATE TABLE IF NOT EXISTS study_groups (
                id TEXT PRIMARY KEY,                    -- GroupId (uuid)
                owner_id TEXT NOT NULL,                 -- UserId
                name TEXT NOT NULL,
                description TEXT,
                institution TEXT NOT NULL,
                program TEXT,
                year INTEGER,
                semester INTEGER,
                passcode TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_group_passcode ON study_groups(passcode);
            CREATE INDEX IF NOT EXISTS idx_group_owner ON study_groups(owner_id);

            -- Membership ledger (one row per kind/resource/user triple)
            CREATE TABLE IF NOT EXISTS memberships (
                resource_kind TEXT NOT NULL CHECK(resource_kind IN ('Tutor', 'Group')),
                resource_id TEXT NOT NULL,
                user_id TEXT NOT NULL,                  -- UserId
                role TEXT NOT NULL CHECK(role IN ('Member', 'Admin')),
                joined_at INTEGER NOT NULL,
                PRIMARY KEY (resource_kind, resource_id, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_memberships_user ON memberships(user_id);
        "#,
        down_sql: Some(
            r#"
            DROP INDEX IF EXISTS idx_memberships_user;
            DROP TABLE IF EXISTS memberships;

            DROP INDEX IF EXISTS idx_group_owner;
            DROP INDEX IF EXISTS idx_group_passcode;
            DROP TABLE IF EXISTS study_groups;

            DROP INDEX IF EXISTS idx_tutor_public;
            DROP INDEX IF EXISTS idx_tutor_owner;
            DROP INDEX IF EXISTS idx_tutor_passcode;
            DROP TABLE IF EXISTS tutor_configs;

            DROP TABLE IF EXISTS share_schema_version;
        "#,
        ),
    }]
}

/// Get current schema version from database
fn get_current_version(pool: &Pool<SqliteConnectionManager>) -> Result<i32, rusqlite::Error> {
    let conn = pool.get().map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::other(format!(
            "failed to get connection: {e}"
        ))))
    })?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS share_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Result<i32, _> = conn.query_row(
        "SELECT version FROM share_schema_version ORDER BY version DESC LIMIT 1",
        [],
        |row| row.get(0),
    );

    Ok(version.unwrap_or(0))
}

/// Run all pending migrations
pub fn migrate(pool: &Pool<SqliteConnectionManager>) -> Result<(), rusqlite::Error> {
    let current_version = get_current_version(pool)?;
    let migrations = get_migrations();

    let pending: Vec<_> = migrations
        .into_iter()
        .filter(|m| m.version > current_version)
        .collect();

    if pending.is_empty() {
        return Ok(());
    }

    let conn = pool.get().map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::other(format!(
            "failed to get connection: {e}"
        ))))
    })?;

    for migration in pending {
        let tx = conn.unchecked_transaction()?;

        tx.execute_batch(migration.up_sql)?;

        tx.execute(
            "INSERT INTO share_schema_version (version, applied_at) VALUES (?, ?)",
            params![migration.version, Timestamp::now().as_millis() as i64],
        )?;

        tx.commit()?;

        info!(
            version = migration.version,
            description = migration.description,
            "applied share schema migration"
        );
    }

    Ok(())
}

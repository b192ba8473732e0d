//! Versioned schema migrations
//!
//! The applied version lives in `PRAGMA user_version`; every applied step is
//! also recorded in `schema_migrations`. Steps are additive and each one runs
//! inside its own transaction, so existing rows survive upgrades. The only
//! destructive path is [`reset`].

use rusqlite::{params, Connection};

use crate::constants::{DEFAULT_AVATAR, SCHEMA_VERSION};
use crate::error::{StoreError, StoreResult};
use crate::password::hash_password;

struct Migration {
    version: i64,
    name: &'static str,
    /// Receives the configured hash rounds for steps that rewrite credentials
    apply: fn(&Connection, u32) -> rusqlite::Result<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        apply: create_users,
    },
    Migration {
        version: 2,
        name: "add_avatar_path",
        apply: add_avatar_path,
    },
    Migration {
        version: 3,
        name: "hash_legacy_passwords",
        apply: hash_legacy_passwords,
    },
];

fn create_users(conn: &Connection, _hash_rounds: u32) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            firstName   TEXT,
            lastName    TEXT,
            username    TEXT UNIQUE,
            password    TEXT,
            email       TEXT UNIQUE
        );
        ",
    )
}

fn add_avatar_path(conn: &Connection, _hash_rounds: u32) -> rusqlite::Result<()> {
    // Databases from the later app revision already carry the column
    let has_avatar: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('users') WHERE name = 'avatarPath'",
        [],
        |row| row.get(0),
    )?;
    if has_avatar == 0 {
        conn.execute_batch("ALTER TABLE users ADD COLUMN avatarPath TEXT;")?;
    }
    conn.execute(
        "UPDATE users SET avatarPath = ?1 WHERE avatarPath IS NULL OR avatarPath = ''",
        params![DEFAULT_AVATAR],
    )?;
    Ok(())
}

fn hash_legacy_passwords(conn: &Connection, hash_rounds: u32) -> rusqlite::Result<()> {
    let legacy: Vec<(i64, String)> = {
        let mut stmt = conn.prepare(
            "SELECT id, password FROM users
             WHERE password IS NOT NULL AND password NOT LIKE 'sha256$%'",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    for (id, plaintext) in &legacy {
        conn.execute(
            "UPDATE users SET password = ?1 WHERE id = ?2",
            params![hash_password(plaintext, hash_rounds), id],
        )?;
    }
    if !legacy.is_empty() {
        tracing::info!(count = legacy.len(), "Hashed legacy cleartext passwords");
    }
    Ok(())
}

/// Current `user_version` of the database
pub fn schema_version(conn: &Connection) -> StoreResult<i64> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Apply every migration newer than the stored version. Returns the resulting version.
pub fn migrate(conn: &mut Connection, hash_rounds: u32) -> StoreResult<i64> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            applied_at  TEXT NOT NULL
        );
        ",
    )?;

    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchema {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.transaction()?;
        (migration.apply)(&tx, hash_rounds)?;
        tx.execute(
            "INSERT OR REPLACE INTO schema_migrations (version, name, applied_at)
             VALUES (?1, ?2, ?3)",
            params![
                migration.version,
                migration.name,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        tracing::info!(version = migration.version, name = migration.name, "Applied migration");
    }

    schema_version(conn)
}

/// Drop every table and rebuild the schema from scratch. Discards all users.
pub fn reset(conn: &mut Connection, hash_rounds: u32) -> StoreResult<i64> {
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS users;
        DROP TABLE IF EXISTS schema_migrations;
        PRAGMA user_version = 0;
        ",
    )?;
    tracing::warn!("Dropped users table");
    migrate(conn, hash_rounds)
}

//! Synchronous user repository over a single SQLite connection

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::fs;
use std::path::Path;

use crate::constants::DEFAULT_AVATAR;
use crate::db::schema;
use crate::error::{StoreError, StoreResult};
use crate::models::{Avatar, NewUser, UserRecord};
use crate::password::{hash_password, verify_password};

const SELECT_USER: &str =
    "SELECT id, firstName, lastName, username, password, email, avatarPath FROM users";

/// Owns the connection and implements every user-table statement
pub struct UserRepository {
    conn: Connection,
    hash_rounds: u32,
}

impl UserRepository {
    /// Open or create the database file at `path`
    pub fn open(path: &Path, hash_rounds: u32) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::info!(path = %path.display(), "Opened user database");
        Ok(UserRepository { conn, hash_rounds })
    }

    pub fn open_in_memory(hash_rounds: u32) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(UserRepository { conn, hash_rounds })
    }

    /// Bring the schema up to date
    pub fn initialize(&mut self) -> StoreResult<i64> {
        schema::migrate(&mut self.conn, self.hash_rounds)
    }

    /// Factory reset: drop all data and recreate the schema
    pub fn reset(&mut self) -> StoreResult<i64> {
        schema::reset(&mut self.conn, self.hash_rounds)
    }

    /// Insert a new user with the default avatar. Returns the new id.
    ///
    /// Names, username and email are stored trimmed; the password is kept as typed.
    pub fn insert(&self, user: &NewUser) -> StoreResult<i64> {
        let user = &user.trimmed();
        user.validate()?;
        let password_hash = hash_password(&user.password, self.hash_rounds);

        self.conn
            .execute(
                "INSERT INTO users (firstName, lastName, username, password, email, avatarPath)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.first_name,
                    user.last_name,
                    user.username,
                    password_hash,
                    user.email,
                    DEFAULT_AVATAR,
                ],
            )
            .map_err(|e| classify_insert_error(e, user))?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(id, username = %user.username, "User created");
        Ok(id)
    }

    pub fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{SELECT_USER} WHERE username = ?1"),
                params![username],
                row_to_user,
            )
            .optional()?;
        tracing::debug!(username, found = record.is_some(), "Looked up user");
        Ok(record)
    }

    /// Verify a login attempt. Unknown users and wrong passwords both yield `None`.
    pub fn authenticate(&self, username: &str, password: &str) -> StoreResult<Option<UserRecord>> {
        let username = username.trim();
        let record = self
            .find_by_username(username)?
            .filter(|user| verify_password(password, &user.password_hash));
        if record.is_none() {
            tracing::warn!(username, "Login rejected");
        }
        Ok(record)
    }

    /// Update first and last name, then confirm the row holds the new values
    pub fn update_profile(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<UserRecord> {
        if first_name.trim().is_empty() {
            return Err(StoreError::Validation { field: "first_name" });
        }
        if last_name.trim().is_empty() {
            return Err(StoreError::Validation { field: "last_name" });
        }

        let (first_name, last_name) = (first_name.trim(), last_name.trim());
        let changed = self.conn.execute(
            "UPDATE users SET firstName = ?1, lastName = ?2 WHERE username = ?3",
            params![first_name, last_name, username],
        )?;
        if changed == 0 {
            tracing::warn!(username, "Profile update for unknown user");
            return Err(StoreError::NotFound(username.to_string()));
        }

        let updated = self.reread(username)?;
        if updated.first_name != first_name || updated.last_name != last_name {
            tracing::error!(username, "Profile update did not persist");
            return Err(StoreError::PersistenceVerification {
                expected: format!("{first_name} {last_name}"),
                actual: updated.full_name(),
            });
        }

        tracing::info!(username, "Profile updated");
        Ok(updated)
    }

    /// Set the avatar for an existing user and confirm the stored value
    pub fn update_avatar(&self, username: &str, avatar: Avatar) -> StoreResult<UserRecord> {
        if self.find_by_username(username)?.is_none() {
            tracing::warn!(username, "Avatar update for unknown user");
            return Err(StoreError::NotFound(username.to_string()));
        }

        self.conn.execute(
            "UPDATE users SET avatarPath = ?1 WHERE username = ?2",
            params![avatar.as_str(), username],
        )?;

        let updated = self.reread(username)?;
        if updated.avatar != avatar {
            tracing::error!(username, expected = %avatar, actual = %updated.avatar, "Avatar update did not persist");
            return Err(StoreError::PersistenceVerification {
                expected: avatar.to_string(),
                actual: updated.avatar.to_string(),
            });
        }

        tracing::info!(username, avatar = %avatar, "Avatar updated");
        Ok(updated)
    }

    /// Every record in storage order
    pub fn list_all(&self) -> StoreResult<Vec<UserRecord>> {
        let mut stmt = self.conn.prepare(SELECT_USER)?;
        let rows = stmt.query_map([], row_to_user)?;
        let users = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Read a row back after a write. A vanished row means the write was lost.
    fn reread(&self, username: &str) -> StoreResult<UserRecord> {
        self.find_by_username(username)?
            .ok_or_else(|| StoreError::PersistenceVerification {
                expected: username.to_string(),
                actual: String::from("<missing row>"),
            })
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    let avatar: Option<String> = row.get(6)?;
    Ok(UserRecord {
        id: row.get(0)?,
        first_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        last_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        username: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        password_hash: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        email: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        avatar: Avatar::from_stored(avatar.as_deref()),
    })
}

/// Map a UNIQUE violation to the field that caused it
fn classify_insert_error(err: rusqlite::Error, user: &NewUser) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref failure, Some(ref message)) = err {
        if failure.code == ErrorCode::ConstraintViolation {
            // SQLite reports "UNIQUE constraint failed: users.<column>"
            if message.contains("users.username") {
                tracing::warn!(username = %user.username, "Duplicate username");
                return StoreError::DuplicateUsername(user.username.clone());
            }
            if message.contains("users.email") {
                tracing::warn!(email = %user.email, "Duplicate email");
                return StoreError::DuplicateEmail(user.email.clone());
            }
        }
    }
    StoreError::Storage(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repo() -> UserRepository {
        let mut repo = UserRepository::open_in_memory(10).unwrap();
        repo.initialize().unwrap();
        repo
    }

    fn jdoe() -> NewUser {
        NewUser::new("Jo", "Doe", "jdoe", "pw1", "jo@x.com")
    }

    #[test]
    fn test_insert_and_find() {
        let repo = test_repo();
        let id = repo.insert(&jdoe()).unwrap();

        let user = repo.find_by_username("jdoe").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.first_name, "Jo");
        assert_eq!(user.last_name, "Doe");
        assert_eq!(user.email, "jo@x.com");
        assert_eq!(user.avatar, Avatar::Man);
        assert_ne!(user.password_hash, "pw1");
    }

    #[test]
    fn test_find_missing_is_none() {
        let repo = test_repo();
        assert!(repo.find_by_username("ghost").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();

        let dup = NewUser::new("Other", "Person", "jdoe", "pw2", "other@x.com");
        assert!(matches!(
            repo.insert(&dup),
            Err(StoreError::DuplicateUsername(name)) if name == "jdoe"
        ));

        let original = repo.find_by_username("jdoe").unwrap().unwrap();
        assert_eq!(original.email, "jo@x.com");
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_email() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();

        let dup = NewUser::new("Other", "Person", "other", "pw2", "jo@x.com");
        assert!(matches!(
            repo.insert(&dup),
            Err(StoreError::DuplicateEmail(email)) if email == "jo@x.com"
        ));
    }

    #[test]
    fn test_insert_requires_all_fields() {
        let repo = test_repo();
        let user = NewUser::new("Jo", "Doe", "jdoe", "", "jo@x.com");
        assert!(matches!(
            repo.insert(&user),
            Err(StoreError::Validation { field: "password" })
        ));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_authenticate() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();

        assert!(repo.authenticate("jdoe", "pw1").unwrap().is_some());
        assert!(repo.authenticate("jdoe", "wrong").unwrap().is_none());
        assert!(repo.authenticate("ghost", "pw1").unwrap().is_none());
    }

    #[test]
    fn test_update_profile() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();

        let updated = repo.update_profile("jdoe", "A", "B").unwrap();
        assert_eq!(updated.first_name, "A");
        assert_eq!(updated.last_name, "B");

        let user = repo.find_by_username("jdoe").unwrap().unwrap();
        assert_eq!(user.first_name, "A");
        assert_eq!(user.last_name, "B");
        assert_eq!(user.username, "jdoe");
        assert_eq!(user.email, "jo@x.com");
        assert_eq!(user.avatar, Avatar::Man);
    }

    #[test]
    fn test_update_profile_missing_user() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();
        assert!(matches!(
            repo.update_profile("ghost", "A", "B"),
            Err(StoreError::NotFound(name)) if name == "ghost"
        ));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_update_profile_rejects_empty_names() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();
        assert!(matches!(
            repo.update_profile("jdoe", "", "B"),
            Err(StoreError::Validation { field: "first_name" })
        ));
        let user = repo.find_by_username("jdoe").unwrap().unwrap();
        assert_eq!(user.first_name, "Jo");
    }

    #[test]
    fn test_update_avatar() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();

        let updated = repo.update_avatar("jdoe", Avatar::Robot).unwrap();
        assert_eq!(updated.avatar, Avatar::Robot);
        let user = repo.find_by_username("jdoe").unwrap().unwrap();
        assert_eq!(user.avatar, Avatar::Robot);
        assert_eq!(user.first_name, "Jo");
    }

    #[test]
    fn test_update_avatar_missing_user() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();
        assert!(matches!(
            repo.update_avatar("ghost", Avatar::Cat),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_null_avatar_reads_as_default() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();
        repo.conn
            .execute("UPDATE users SET avatarPath = NULL", [])
            .unwrap();
        let user = repo.find_by_username("jdoe").unwrap().unwrap();
        assert_eq!(user.avatar, Avatar::Man);
    }

    #[test]
    fn test_list_all() {
        let repo = test_repo();
        assert!(repo.list_all().unwrap().is_empty());

        repo.insert(&jdoe()).unwrap();
        repo.insert(&NewUser::new("Al", "Bo", "albo", "pw", "al@x.com"))
            .unwrap();

        let users = repo.list_all().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.username == "albo"));
    }

    #[test]
    fn test_list_all_tolerates_legacy_null_username() {
        let mut repo = UserRepository::open_in_memory(10).unwrap();
        repo.conn
            .execute_batch(
                "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, firstName TEXT,
                    lastName TEXT, username TEXT UNIQUE, password TEXT, email TEXT UNIQUE);
                 INSERT INTO users (firstName, lastName, username, password, email)
                    VALUES ('Jo', 'Doe', 'jdoe', 'pw1', 'jo@x.com');
                 INSERT INTO users (firstName) VALUES ('orphan');",
            )
            .unwrap();
        repo.initialize().unwrap();

        let users = repo.list_all().unwrap();
        assert_eq!(users.len(), 2);
        let orphan = users.iter().find(|u| u.first_name == "orphan").unwrap();
        assert_eq!(orphan.username, "");
        assert_eq!(orphan.avatar, Avatar::Man);
        assert!(repo.authenticate("jdoe", "pw1").unwrap().is_some());
    }

    #[test]
    fn test_update_avatar_detects_lost_write() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();
        repo.conn
            .execute_batch(
                "CREATE TRIGGER pin_avatar AFTER UPDATE OF avatarPath ON users
                 BEGIN UPDATE users SET avatarPath = 'man' WHERE id = NEW.id; END;",
            )
            .unwrap();

        match repo.update_avatar("jdoe", Avatar::Robot) {
            Err(StoreError::PersistenceVerification { expected, actual }) => {
                assert_eq!(expected, "robot");
                assert_eq!(actual, "man");
            }
            other => panic!("expected verification failure, got {:?}", other),
        }
    }

    #[test]
    fn test_update_profile_detects_lost_write() {
        let repo = test_repo();
        repo.insert(&jdoe()).unwrap();
        repo.conn
            .execute_batch(
                "CREATE TRIGGER pin_names AFTER UPDATE OF firstName, lastName ON users
                 BEGIN UPDATE users SET firstName = 'Jo', lastName = 'Doe' WHERE id = NEW.id; END;",
            )
            .unwrap();

        match repo.update_profile("jdoe", "A", "B") {
            Err(StoreError::PersistenceVerification { expected, actual }) => {
                assert_eq!(expected, "A B");
                assert_eq!(actual, "Jo Doe");
            }
            other => panic!("expected verification failure, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_trims_identity_fields() {
        let repo = test_repo();
        repo.insert(&NewUser::new(" Jo ", "Doe", " jdoe ", " pw1", "jo@x.com "))
            .unwrap();

        let user = repo.find_by_username("jdoe").unwrap().unwrap();
        assert_eq!(user.first_name, "Jo");
        assert_eq!(user.email, "jo@x.com");
        assert!(repo.authenticate("jdoe", " pw1").unwrap().is_some());
        assert!(repo.authenticate(" jdoe", " pw1").unwrap().is_some());
        assert!(repo.authenticate("jdoe", "pw1").unwrap().is_none());

        assert!(matches!(
            repo.insert(&NewUser::new("Al", "Bo", "jdoe", "pw", "al@x.com")),
            Err(StoreError::DuplicateUsername(_))
        ));
    }

    #[test]
    fn test_ids_increase() {
        let repo = test_repo();
        let first = repo.insert(&jdoe()).unwrap();
        let second = repo
            .insert(&NewUser::new("Al", "Bo", "albo", "pw", "al@x.com"))
            .unwrap();
        assert!(second > first);
    }
}

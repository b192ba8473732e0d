//! Async handle to the store actor

use std::thread;
use tokio::sync::{mpsc, oneshot};

use crate::config::StoreConfig;
use crate::db::UserRepository;
use crate::error::{StoreError, StoreResult};
use crate::messages::{Reply, StoreCommand};
use crate::models::{Avatar, NewUser, UserRecord};
use crate::store::actor::StoreActor;

/// Cloneable handle used by every caller of the user store.
///
/// All clones talk to one actor, which owns the only connection and executes
/// commands in arrival order.
#[derive(Clone)]
pub struct UserStore {
    cmd_tx: mpsc::UnboundedSender<StoreCommand>,
}

impl UserStore {
    /// Open the configured database and start the actor.
    ///
    /// The schema is not touched; call [`UserStore::initialize`] before use.
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        let path = config.database_path.clone();
        let rounds = config.hash_rounds;
        let repo = tokio::task::spawn_blocking(move || UserRepository::open(&path, rounds))
            .await
            .map_err(|_| StoreError::Unavailable)??;
        Self::spawn(repo)
    }

    /// Start a store over a private in-memory database
    pub fn open_in_memory(hash_rounds: u32) -> StoreResult<Self> {
        Self::spawn(UserRepository::open_in_memory(hash_rounds)?)
    }

    fn spawn(repo: UserRepository) -> StoreResult<Self> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let actor = StoreActor::new(repo);
        thread::Builder::new()
            .name("userstore-db".into())
            .spawn(move || actor.run(cmd_rx))?;
        Ok(UserStore { cmd_tx })
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> StoreCommand) -> StoreResult<T> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(reply))
            .map_err(|_| StoreError::Unavailable)?;
        rx.await.map_err(|_| StoreError::Unavailable)?
    }

    /// Apply pending migrations. Returns the schema version.
    pub async fn initialize(&self) -> StoreResult<i64> {
        self.request(|reply| StoreCommand::Initialize { reply }).await
    }

    /// Drop every user and rebuild the schema
    pub async fn reset(&self) -> StoreResult<i64> {
        self.request(|reply| StoreCommand::Reset { reply }).await
    }

    /// Create a user with the default avatar. Returns the new id.
    pub async fn insert(
        &self,
        first_name: &str,
        last_name: &str,
        username: &str,
        password: &str,
        email: &str,
    ) -> StoreResult<i64> {
        self.insert_user(NewUser::new(first_name, last_name, username, password, email))
            .await
    }

    pub async fn insert_user(&self, user: NewUser) -> StoreResult<i64> {
        self.request(|reply| StoreCommand::Insert { user, reply })
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let username = username.to_string();
        self.request(|reply| StoreCommand::FindByUsername { username, reply })
            .await
    }

    /// Check a login. `None` for unknown users and wrong passwords alike.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> StoreResult<Option<UserRecord>> {
        let username = username.to_string();
        let password = password.to_string();
        self.request(|reply| StoreCommand::Authenticate {
            username,
            password,
            reply,
        })
        .await
    }

    pub async fn update_profile(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<UserRecord> {
        let username = username.to_string();
        let first_name = first_name.to_string();
        let last_name = last_name.to_string();
        self.request(|reply| StoreCommand::UpdateProfile {
            username,
            first_name,
            last_name,
            reply,
        })
        .await
    }

    pub async fn update_avatar(&self, username: &str, avatar: Avatar) -> StoreResult<UserRecord> {
        let username = username.to_string();
        self.request(|reply| StoreCommand::UpdateAvatar {
            username,
            avatar,
            reply,
        })
        .await
    }

    /// Every record, in storage order. Diagnostic use only.
    pub async fn list_all(&self) -> StoreResult<Vec<UserRecord>> {
        self.request(|reply| StoreCommand::ListAll { reply }).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.request(|reply| StoreCommand::Count { reply }).await
    }

    /// Stop the actor. Later calls on any clone fail with `Unavailable`.
    pub async fn shutdown(&self) -> StoreResult<()> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(StoreCommand::Shutdown { reply })
            .map_err(|_| StoreError::Unavailable)?;
        rx.await.map_err(|_| StoreError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> UserStore {
        let store = UserStore::open_in_memory(10).unwrap();
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = test_store().await;
        let id = store
            .insert("Jo", "Doe", "jdoe", "pw1", "jo@x.com")
            .await
            .unwrap();

        let user = store.find_by_username("jdoe").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.avatar, Avatar::Man);
    }

    #[tokio::test]
    async fn test_clones_share_connection() {
        let store = test_store().await;
        let other = store.clone();
        store
            .insert("Jo", "Doe", "jdoe", "pw1", "jo@x.com")
            .await
            .unwrap();
        assert_eq!(other.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_profile_updates_last_write_wins() {
        let store = test_store().await;
        store
            .insert("Jo", "Doe", "jdoe", "pw1", "jo@x.com")
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            store.update_profile("jdoe", "A", "One"),
            store.update_profile("jdoe", "B", "Two"),
        );
        assert!(a.is_ok() && b.is_ok());

        let user = store.find_by_username("jdoe").await.unwrap().unwrap();
        assert!(user.full_name() == "A One" || user.full_name() == "B Two");
    }

    #[tokio::test]
    async fn test_shutdown_makes_store_unavailable() {
        let store = test_store().await;
        store.shutdown().await.unwrap();
        assert!(matches!(
            store.count().await,
            Err(StoreError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_initialize_twice() {
        let store = test_store().await;
        store
            .insert("Jo", "Doe", "jdoe", "pw1", "jo@x.com")
            .await
            .unwrap();
        let version = store.initialize().await.unwrap();
        assert_eq!(version, crate::constants::SCHEMA_VERSION);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}

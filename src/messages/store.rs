//! Store messages - communication between the async handle and the store actor

use tokio::sync::oneshot;

use crate::error::StoreResult;
use crate::models::{Avatar, NewUser, UserRecord};

/// Reply channel carried by every command
pub type Reply<T> = oneshot::Sender<StoreResult<T>>;

/// Commands sent from `UserStore` handles to the store actor
pub enum StoreCommand {
    /// Apply pending schema migrations
    Initialize { reply: Reply<i64> },
    /// Drop and recreate every table
    Reset { reply: Reply<i64> },
    Insert {
        user: NewUser,
        reply: Reply<i64>,
    },
    FindByUsername {
        username: String,
        reply: Reply<Option<UserRecord>>,
    },
    Authenticate {
        username: String,
        password: String,
        reply: Reply<Option<UserRecord>>,
    },
    UpdateProfile {
        username: String,
        first_name: String,
        last_name: String,
        reply: Reply<UserRecord>,
    },
    UpdateAvatar {
        username: String,
        avatar: Avatar,
        reply: Reply<UserRecord>,
    },
    ListAll { reply: Reply<Vec<UserRecord>> },
    Count { reply: Reply<usize> },
    /// Stop the actor after acknowledging
    Shutdown { reply: oneshot::Sender<()> },
}

impl StoreCommand {
    /// Operation name for logging. Never includes arguments.
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::Initialize { .. } => "initialize",
            StoreCommand::Reset { .. } => "reset",
            StoreCommand::Insert { .. } => "insert",
            StoreCommand::FindByUsername { .. } => "find_by_username",
            StoreCommand::Authenticate { .. } => "authenticate",
            StoreCommand::UpdateProfile { .. } => "update_profile",
            StoreCommand::UpdateAvatar { .. } => "update_avatar",
            StoreCommand::ListAll { .. } => "list_all",
            StoreCommand::Count { .. } => "count",
            StoreCommand::Shutdown { .. } => "shutdown",
        }
    }

    /// Check if this command modifies stored data
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreCommand::Initialize { .. }
                | StoreCommand::Reset { .. }
                | StoreCommand::Insert { .. }
                | StoreCommand::UpdateProfile { .. }
                | StoreCommand::UpdateAvatar { .. }
        )
    }
}

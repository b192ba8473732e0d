//! Store actor - owns the SQLite connection and runs commands one at a time

use tokio::sync::mpsc;

use crate::db::UserRepository;
use crate::messages::StoreCommand;

/// Store actor that processes commands against the single connection
pub struct StoreActor {
    repo: UserRepository,
}

impl StoreActor {
    pub fn new(repo: UserRepository) -> Self {
        StoreActor { repo }
    }

    /// Run the actor message loop. Blocks the calling thread until every
    /// handle is dropped or a shutdown command arrives.
    pub fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<StoreCommand>) {
        tracing::debug!("Store actor started");
        while let Some(cmd) = cmd_rx.blocking_recv() {
            if self.handle_command(cmd) {
                break;
            }
        }
        tracing::debug!("Store actor stopped");
    }

    /// Handle one command, returns true if shutdown was requested
    fn handle_command(&mut self, cmd: StoreCommand) -> bool {
        tracing::trace!(op = cmd.name(), write = cmd.is_write(), "Store command");

        // A dropped reply receiver means the caller stopped waiting; the
        // operation has already run, so the send result is ignored.
        match cmd {
            StoreCommand::Initialize { reply } => {
                let _ = reply.send(self.repo.initialize());
            }
            StoreCommand::Reset { reply } => {
                let _ = reply.send(self.repo.reset());
            }
            StoreCommand::Insert { user, reply } => {
                let _ = reply.send(self.repo.insert(&user));
            }
            StoreCommand::FindByUsername { username, reply } => {
                let _ = reply.send(self.repo.find_by_username(&username));
            }
            StoreCommand::Authenticate {
                username,
                password,
                reply,
            } => {
                let _ = reply.send(self.repo.authenticate(&username, &password));
            }
            StoreCommand::UpdateProfile {
                username,
                first_name,
                last_name,
                reply,
            } => {
                let _ = reply.send(self.repo.update_profile(&username, &first_name, &last_name));
            }
            StoreCommand::UpdateAvatar {
                username,
                avatar,
                reply,
            } => {
                let _ = reply.send(self.repo.update_avatar(&username, avatar));
            }
            StoreCommand::ListAll { reply } => {
                let _ = reply.send(self.repo.list_all());
            }
            StoreCommand::Count { reply } => {
                let _ = reply.send(self.repo.count());
            }
            StoreCommand::Shutdown { reply } => {
                let _ = reply.send(());
                return true;
            }
        }

        false
    }
}

//! Account session - the signed-in user's details as the screens see them

use crate::models::{Avatar, NewUser, UserSummary};
use crate::session::alerts::{alert_message, signup_alert, Alert};
use crate::store::UserStore;

/// Register a new account. Success and failure both produce an alert to show.
pub async fn signup(store: &UserStore, user: NewUser) -> Result<Alert, Alert> {
    let username = user.username.clone();
    match store.insert_user(user).await {
        Ok(id) => {
            tracing::info!(id, username = %username, "Signup complete");
            Ok(Alert::success("Account created successfully!"))
        }
        Err(err) => {
            tracing::warn!(username = %username, error = %err, "Signup failed");
            Err(signup_alert(&err))
        }
    }
}

/// Details of the signed-in user, passed between screens.
///
/// Edits are applied locally first and rolled back to the last known-good
/// values when the store rejects them.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountSession {
    user: UserSummary,
}

impl AccountSession {
    /// Sign in with a username and password
    pub async fn login(store: &UserStore, username: &str, password: &str) -> Result<Self, Alert> {
        match store.authenticate(username, password).await {
            Ok(Some(record)) => {
                tracing::info!(username, "Signed in");
                Ok(AccountSession {
                    user: UserSummary::from(&record),
                })
            }
            Ok(None) => Err(Alert::error("Invalid username or password")),
            Err(err) => {
                tracing::error!(username, error = %err, "Login failed");
                Err(Alert::error(alert_message(&err)))
            }
        }
    }

    pub fn user(&self) -> &UserSummary {
        &self.user
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.user.first_name, self.user.last_name)
    }

    pub fn avatar(&self) -> Avatar {
        self.user.avatar_path
    }

    /// Change first and last name, restoring the previous names on failure
    pub async fn save_profile(
        &mut self,
        store: &UserStore,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), Alert> {
        let previous = (
            std::mem::replace(&mut self.user.first_name, first_name.to_string()),
            std::mem::replace(&mut self.user.last_name, last_name.to_string()),
        );

        match store
            .update_profile(&self.user.username, first_name, last_name)
            .await
        {
            Ok(record) => {
                self.user = UserSummary::from(&record);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(username = %self.user.username, error = %err, "Profile edit rolled back");
                self.user.first_name = previous.0;
                self.user.last_name = previous.1;
                Err(Alert::error(alert_message(&err)))
            }
        }
    }

    /// Pick a new avatar by identifier
    pub async fn choose_avatar(&mut self, store: &UserStore, avatar: &str) -> Result<(), Alert> {
        let avatar: Avatar = avatar
            .parse()
            .map_err(|err| Alert::error(alert_message(&err)))?;
        self.apply_avatar(store, avatar).await
    }

    /// Step the picker to the next avatar and save it
    pub async fn cycle_avatar(&mut self, store: &UserStore) -> Result<(), Alert> {
        let next = self.user.avatar_path.next();
        self.apply_avatar(store, next).await
    }

    async fn apply_avatar(&mut self, store: &UserStore, avatar: Avatar) -> Result<(), Alert> {
        let previous = std::mem::replace(&mut self.user.avatar_path, avatar);
        match store.update_avatar(&self.user.username, avatar).await {
            Ok(record) => {
                self.user = UserSummary::from(&record);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(username = %self.user.username, error = %err, "Avatar change rolled back");
                self.user.avatar_path = previous;
                Err(Alert::error(alert_message(&err)))
            }
        }
    }

    /// Reload the session from the stored record
    pub async fn refresh(&mut self, store: &UserStore) -> Result<(), Alert> {
        match store.find_by_username(&self.user.username).await {
            Ok(Some(record)) => {
                self.user = UserSummary::from(&record);
                Ok(())
            }
            Ok(None) => Err(Alert::error("User not found")),
            Err(err) => Err(Alert::error(alert_message(&err))),
        }
    }
}

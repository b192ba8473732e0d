//! User-facing alerts for store outcomes

use serde::Serialize;

use crate::error::StoreError;

/// A titled message the UI shows in a modal dialog
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Alert {
            title: "Error",
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Alert {
            title: "Success",
            message: message.into(),
        }
    }
}

/// Message shown for a store error outside of signup
pub fn alert_message(err: &StoreError) -> &'static str {
    match err {
        StoreError::Validation { .. } => "Please fill in all fields",
        StoreError::InvalidAvatar(_) => "Please choose one of the available avatars",
        StoreError::DuplicateUsername(_) => "This username is already taken",
        StoreError::DuplicateEmail(_) => "This email is already registered",
        StoreError::NotFound(_) => "User not found",
        StoreError::PersistenceVerification { .. } => {
            "Your changes could not be saved. Please try again."
        }
        StoreError::UnsupportedSchema { .. }
        | StoreError::Storage(_)
        | StoreError::Io(_)
        | StoreError::Unavailable => "Something went wrong",
    }
}

/// Signup keeps field-specific messages and a dedicated fallback
pub fn signup_alert(err: &StoreError) -> Alert {
    if err.is_user_error() {
        Alert::error(alert_message(err))
    } else {
        Alert::error("Failed to create account. Please try again.")
    }
}

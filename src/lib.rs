//! # userstore
//!
//! Local account store for a signup/login and profile application.
//!
//! ## Features
//! - One SQLite `users` table with unique usernames and emails
//! - Salted password hashing, verified by recomputation
//! - Versioned additive migrations, explicit factory reset
//! - Read-after-write verification on profile and avatar updates
//! - Session helpers mapping store errors to user-facing alerts
//!
//! ## Architecture
//! Actor-based with channels:
//! - Session Layer - what the screens call
//! - Store Layer - cloneable async handle (`UserStore`)
//! - Storage Layer - actor thread owning the only connection

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod logging;
pub mod messages;
pub mod models;
pub mod password;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use models::{Avatar, NewUser, UserRecord, UserSummary};
pub use session::{AccountSession, Alert};
pub use store::UserStore;

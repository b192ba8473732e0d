//! Session layer - what the login, signup and account screens need from the store
//!
//! Screens call into this layer and show the returned alerts; rendering and
//! navigation live elsewhere.

pub mod account;
pub mod alerts;

pub use account::{signup, AccountSession};
pub use alerts::{alert_message, Alert};

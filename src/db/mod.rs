//! Storage layer - SQLite schema and user-table statements
//!
//! Everything here is synchronous and owned by the store actor.

pub mod repository;
pub mod schema;

pub use repository::UserRepository;

//! Message types for communication with the store actor.

pub mod store;

pub use store::{Reply, StoreCommand};

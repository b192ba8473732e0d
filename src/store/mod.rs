//! Store layer - async access to the user table
//!
//! `UserStore` handles send commands over a channel to the `StoreActor`,
//! which owns the SQLite connection on a dedicated thread.

pub mod actor;
pub mod handle;

pub use actor::StoreActor;
pub use handle::UserStore;

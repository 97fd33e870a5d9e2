//! Persistence collaborators.
//!
//! The core never requires a store: without one, bookmarks and history live
//! only in the in-memory session.

mod sqlite_store;
mod traits;

pub use sqlite_store::SqliteUserDataStore;
pub use traits::UserDataStore;

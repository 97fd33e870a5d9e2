//! Per-session state: bookmarks, search history and the inactivity clock.
//!
//! Session state is an explicit value passed into every operation. The
//! [`SessionRegistry`] keeps one state per session id and runs the inactivity
//! check before anything else touches a session.

pub mod registry;
pub mod state;

pub use registry::{SessionRegistry, Touch};
pub use state::{
    is_inactive, Activity, BookmarkChange, SessionState, DEFAULT_INACTIVITY_MINUTES,
    DEFAULT_RECENT_SEARCH_LIMIT, MAX_INACTIVITY_MINUTES,
};

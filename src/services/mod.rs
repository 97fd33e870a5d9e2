//! Application service layer.
//!
//! Services contain business logic and orchestrate the catalog, the search
//! engine, session state and the optional store. They provide a clean
//! boundary between the MCP handlers and the lower layers.

mod bookmark_service;
mod history_service;
mod lookup_service;
mod session_gate;

pub use bookmark_service::{BookmarkService, BookmarkServiceImpl};
pub use history_service::{HistoryService, HistoryServiceImpl};
pub use lookup_service::{
    DrugDetail, FilterOptions, LookupResponse, LookupService, LookupServiceImpl,
};
pub use session_gate::{Clock, SessionEntry, SessionGate, SessionResponse};

//! Domain value objects and types.
//!
//! This module contains type-safe wrappers for catalog concepts: drug
//! identifiers and the ketogenic status classification. These value objects
//! validate or normalize at construction time so that invalid data cannot be
//! represented in the system.

pub mod drug_id;
pub mod errors;
pub mod keto_status;

pub use drug_id::DrugId;
pub use errors::ValidationError;
pub use keto_status::{KetoStatus, StatusIndicator};

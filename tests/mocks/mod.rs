//! Hand-written test doubles for the persistence layer.

mod mock_user_data_store;

#[allow(unused_imports)]
pub use mock_user_data_store::MockUserDataStore;

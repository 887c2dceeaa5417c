//! Record storage and the domain-specific stores built on top of it.

pub mod orders;
pub mod products;
pub mod record_store;
pub mod users;

pub use orders::OrderStore;
pub use products::ProductStore;
pub use record_store::{InMemoryRecordStore, RecordStore};
pub use users::UserDirectory;

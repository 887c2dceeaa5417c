//! Infrastructure layer: in-memory stores backing the HTTP service.

pub mod error;
pub mod store;

pub use error::RecordError;
pub use store::{InMemoryRecordStore, OrderStore, ProductStore, RecordStore, UserDirectory};

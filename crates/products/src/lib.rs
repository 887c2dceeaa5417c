//! Products catalog records.
//!
//! Plain deterministic record logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{NewProduct, Product, ProductPatch};

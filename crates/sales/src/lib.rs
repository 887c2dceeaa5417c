//! Customer orders.
//!
//! Plain deterministic record logic (no IO, no HTTP, no storage).

pub mod order;

pub use order::{NewOrder, Order, OrderLine, OrderPatch, OrderStatus};

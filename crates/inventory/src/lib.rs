//! Inventory domain module.
//!
//! This crate contains the stock-room rules (catalog filtering, staged carts,
//! commit planning) implemented purely as deterministic domain logic
//! (no IO, no HTTP, no clocks).

pub mod cart;
pub mod commit;
pub mod filter;
pub mod item;
pub mod stock;
pub mod store;

pub use cart::{CartKind, StagedCart, StagedLine};
pub use commit::{AuditEntry, CommitPlan, PlannedLine, plan_add, plan_request};
pub use filter::{Filter, Selector, filter_items};
pub use item::{InventoryItem, RowError};
pub use stock::{LOW_STOCK_THRESHOLD, StockLevel};
pub use store::InventoryStore;

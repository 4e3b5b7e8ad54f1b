//! `stockroom-client`
//!
//! **Responsibility:** stock-room client state and remote sheet access.
//!
//! This crate provides:
//! - The HTTP gateway to the spreadsheet endpoint (read catalog, write updates/logs)
//! - The per-user `Session` (catalog, request/add carts, login flag, commit guard)
//! - View models a UI renders from, plus transient notices
//!
//! Domain rules live in `stockroom-inventory`; this crate only wires them to IO.

pub mod config;
pub mod gateway;
pub mod notice;
pub mod session;
pub mod types;
pub mod view;

pub use config::ClientConfig;
pub use gateway::{GatewayError, HttpSheetGateway, RecordingGateway, SheetGateway, WriteMode};
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use session::{CommitReceipt, LoadError, Session, SessionError};
pub use types::{AddLogEntry, InventoryUpdate, RequestLogEntry, SheetCommand};
pub use view::{CartView, CatalogView, ItemCard};

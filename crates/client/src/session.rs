//! Per-user application state and the commit protocol.
//!
//! A `Session` owns the catalog, both staged carts, the login flag and the
//! notice board. Locks are held only for synchronous sections, never across
//! a gateway call, so a session can be shared as `Arc<Session<G>>`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use stockroom_core::{CommitId, DomainError, DomainResult, ItemId};
use stockroom_inventory::{
    CartKind, CommitPlan, Filter, InventoryItem, InventoryStore, PlannedLine, StagedCart,
    filter_items, plan_add, plan_request,
};

use crate::gateway::{GatewayError, SheetGateway};
use crate::notice::{Notice, NoticeBoard, NoticeKind};
use crate::types::SheetCommand;
use crate::view::{CartView, CatalogView};

/// The catalog could not be loaded; the store has been emptied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to load inventory: {0}")]
pub struct LoadError(#[from] pub GatewayError);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("you must be logged in to {action}")]
    NotLoggedIn { action: &'static str },

    /// Rejected before anything was sent.
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("a commit is already in progress")]
    CommitInFlight,

    /// The inventory update could not be sent; nothing changed locally.
    #[error("failed to send inventory update: {0}")]
    Transport(GatewayError),

    /// The inventory update went out but a later log write failed.
    #[error("inventory updated but only {written} of {total} log entries were written: {source}")]
    AuditIncomplete {
        written: usize,
        total: usize,
        source: GatewayError,
    },
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub commit_id: CommitId,
    pub kind: CartKind,
    pub job_order: Option<String>,
    pub lines: Vec<PlannedLine>,
    pub log_entries_written: usize,
}

pub struct Session<G> {
    gateway: G,
    store: RwLock<InventoryStore>,
    request_cart: Mutex<StagedCart>,
    add_cart: Mutex<StagedCart>,
    logged_in: AtomicBool,
    commit_gate: tokio::sync::Mutex<()>,
    notices: Mutex<NoticeBoard>,
}

impl<G: SheetGateway> Session<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            store: RwLock::new(InventoryStore::new()),
            request_cart: Mutex::new(StagedCart::new(CartKind::Request)),
            add_cart: Mutex::new(StagedCart::new(CartKind::Add)),
            logged_in: AtomicBool::new(false),
            commit_gate: tokio::sync::Mutex::new(()),
            notices: Mutex::new(NoticeBoard::default()),
        }
    }

    pub fn with_notice_ttl(self, ttl: Duration) -> Self {
        *lock(&self.notices) = NoticeBoard::new(ttl);
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // ---- catalog ----

    /// Replace the catalog from the remote sheet.
    ///
    /// Unusable rows are skipped. On any gateway failure the catalog is
    /// emptied rather than left stale.
    pub async fn load(&self) -> Result<usize, LoadError> {
        let rows = match self.gateway.fetch_inventory().await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!("Error loading inventory: {}", err);
                write(&self.store).reset();
                self.notify(NoticeKind::Error, "Error loading data. Please try again later.");
                return Err(LoadError(err));
            }
        };

        let mut items = Vec::with_capacity(rows.len());
        for (pos, row) in rows.iter().enumerate() {
            match InventoryItem::from_row(row) {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!("Skipping inventory row {}: {}", pos, e),
            }
        }

        if items.is_empty() {
            tracing::warn!("Inventory is empty");
        }
        tracing::info!(rows = rows.len(), items = items.len(), "Inventory loaded");

        let count = items.len();
        write(&self.store).replace(items);
        Ok(count)
    }

    /// Snapshot of an item as currently held.
    pub fn item(&self, id: &ItemId) -> Option<InventoryItem> {
        read(&self.store).find_by_id(id).cloned()
    }

    pub fn filtered_items(&self, filter: &Filter) -> Vec<InventoryItem> {
        let store = read(&self.store);
        filter_items(filter, store.items()).into_iter().cloned().collect()
    }

    pub fn catalog_view(&self, filter: &Filter) -> CatalogView {
        let store = read(&self.store);
        CatalogView::build(
            &store.categories(),
            &store.suppliers(),
            filter_items(filter, store.items()),
            self.is_logged_in(),
        )
    }

    // ---- login ----

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    /// Flip the login flag; there are no credentials. Returns the new state.
    pub fn toggle_login(&self) -> bool {
        let now_logged_in = !self.logged_in.fetch_xor(true, Ordering::SeqCst);
        let message = if now_logged_in {
            "Logged in successfully."
        } else {
            "Logged out successfully."
        };
        self.notify(NoticeKind::Success, message);
        now_logged_in
    }

    // ---- staging ----

    /// Stage `quantity` of an item into the request or add cart.
    ///
    /// The quantity is checked against live stock at this moment only.
    pub fn stage(&self, kind: CartKind, id: &ItemId, quantity: u64) -> Result<u64, SessionError> {
        let result = self.try_stage(kind, id, quantity);
        match &result {
            Ok(_) => self.notify(
                NoticeKind::Success,
                match kind {
                    CartKind::Request => "Item added to the request cart",
                    CartKind::Add => "Item staged for adding to inventory",
                },
            ),
            Err(err) => self.notify(NoticeKind::Error, staging_message(err)),
        }
        result
    }

    pub fn stage_request(&self, id: &ItemId, quantity: u64) -> Result<u64, SessionError> {
        self.stage(CartKind::Request, id, quantity)
    }

    pub fn stage_add(&self, id: &ItemId, quantity: u64) -> Result<u64, SessionError> {
        self.stage(CartKind::Add, id, quantity)
    }

    fn try_stage(&self, kind: CartKind, id: &ItemId, quantity: u64) -> Result<u64, SessionError> {
        self.require_login(kind)?;

        let item = self.item(id).ok_or_else(|| DomainError::not_found(id.clone()))?;
        if quantity > item.quantity() {
            return Err(DomainError::insufficient_stock(
                id.clone(),
                item.display_name(),
                item.quantity(),
                quantity,
            )
            .into());
        }

        Ok(lock(self.cart(kind)).add_or_increment(&item, quantity)?)
    }

    /// `+` on a cart line. Request lines stop at the item's live quantity.
    pub fn increment_line(&self, kind: CartKind, id: &ItemId) -> Result<u64, SessionError> {
        let live = self.item(id).map(|i| i.quantity()).unwrap_or(0);
        Ok(lock(self.cart(kind)).increment_line(id, live)?)
    }

    /// `-` on a cart line, never below 1.
    pub fn decrement_line(&self, kind: CartKind, id: &ItemId) -> Result<u64, SessionError> {
        Ok(lock(self.cart(kind)).decrement_line(id)?)
    }

    pub fn remove_line(&self, kind: CartKind, id: &ItemId) -> bool {
        lock(self.cart(kind)).remove(id)
    }

    /// Badge count for a cart.
    pub fn cart_total(&self, kind: CartKind) -> u64 {
        lock(self.cart(kind)).total_quantity()
    }

    /// Contents for the cart modal; opening it requires login.
    pub fn cart_view(&self, kind: CartKind) -> Result<CartView, SessionError> {
        if let Err(err) = self.require_login(kind) {
            self.notify(NoticeKind::Error, err.to_string());
            return Err(err);
        }
        Ok(CartView::from_cart(&lock(self.cart(kind))))
    }

    // ---- commit ----

    /// Commit the request cart against a job order.
    pub async fn confirm_request(&self, job_order: &str) -> Result<CommitReceipt, SessionError> {
        self.commit(CartKind::Request, job_order).await
    }

    /// Commit the add cart.
    pub async fn confirm_add(&self) -> Result<CommitReceipt, SessionError> {
        self.commit(CartKind::Add, "").await
    }

    async fn commit(&self, kind: CartKind, job_order: &str) -> Result<CommitReceipt, SessionError> {
        let result = self.run_commit(kind, job_order).await;
        match &result {
            Ok(receipt) => self.notify(NoticeKind::Success, success_message(receipt)),
            Err(err) => self.notify(NoticeKind::Error, commit_failure_message(kind, err)),
        }
        result
    }

    async fn run_commit(&self, kind: CartKind, job_order: &str) -> Result<CommitReceipt, SessionError> {
        self.require_login(kind)?;
        let _gate = self
            .commit_gate
            .try_lock()
            .map_err(|_| SessionError::CommitInFlight)?;

        let commit_id = CommitId::new();
        let plan = self.plan(kind, job_order).inspect_err(|e| {
            tracing::warn!("Commit {} ({}) rejected: {}", commit_id, kind.as_str(), e);
        })?;

        tracing::info!(
            commit_id = %commit_id,
            kind = kind.as_str(),
            lines = plan.lines().len(),
            "Sending inventory update"
        );

        if let Err(err) = self.gateway.send(&SheetCommand::update_for(&plan)).await {
            tracing::error!("Commit {}: inventory update failed: {}", commit_id, err);
            return Err(SessionError::Transport(err));
        }

        let entries = plan.audit_entries();
        let total = entries.len();
        let mut written = 0;
        let mut audit_failure = None;
        for entry in &entries {
            match self.gateway.send(&SheetCommand::from(entry)).await {
                Ok(()) => written += 1,
                Err(err) => {
                    tracing::error!(
                        "Commit {}: log entry for {} failed: {}",
                        commit_id,
                        entry.item_id,
                        err
                    );
                    audit_failure = Some(err);
                    break;
                }
            }
        }

        // The remote inventory has changed either way; follow it locally.
        if let Err(e) = plan.apply(&mut write(&self.store)) {
            tracing::warn!("Commit {}: catalog changed mid-commit, local apply skipped: {}", commit_id, e);
        }
        plan.settle(&mut lock(self.cart(kind)));

        if let Some(source) = audit_failure {
            return Err(SessionError::AuditIncomplete {
                written,
                total,
                source,
            });
        }

        tracing::info!("Commit {} complete ({} log entries)", commit_id, written);
        Ok(CommitReceipt {
            commit_id,
            kind,
            job_order: plan.job_order().map(str::to_string),
            lines: plan.lines().to_vec(),
            log_entries_written: written,
        })
    }

    fn plan(&self, kind: CartKind, job_order: &str) -> DomainResult<CommitPlan> {
        let cart = lock(self.cart(kind));
        let store = read(&self.store);
        match kind {
            CartKind::Request => plan_request(&cart, &store, job_order, Utc::now()),
            CartKind::Add => plan_add(&cart, &store, Utc::now()),
        }
    }

    // ---- notices ----

    /// Notices currently visible.
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).active(Utc::now())
    }

    /// The banner's current notice, if any.
    pub fn current_notice(&self) -> Option<Notice> {
        lock(&self.notices).latest(Utc::now()).cloned()
    }

    fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        lock(&self.notices).post(kind, message, Utc::now());
    }

    fn require_login(&self, kind: CartKind) -> Result<(), SessionError> {
        if self.is_logged_in() {
            return Ok(());
        }
        Err(SessionError::NotLoggedIn {
            action: match kind {
                CartKind::Request => "request items",
                CartKind::Add => "add items",
            },
        })
    }

    fn cart(&self, kind: CartKind) -> &Mutex<StagedCart> {
        match kind {
            CartKind::Request => &self.request_cart,
            CartKind::Add => &self.add_cart,
        }
    }
}

fn staging_message(err: &SessionError) -> String {
    match err {
        SessionError::Validation(DomainError::NotFound(_)) => "Item not found".to_string(),
        SessionError::Validation(DomainError::InsufficientStock { .. }) => "Not enough stock".to_string(),
        other => other.to_string(),
    }
}

fn success_message(receipt: &CommitReceipt) -> String {
    match (receipt.kind, &receipt.job_order) {
        (CartKind::Request, Some(job_order)) => format!("Request confirmed for job order {job_order}"),
        _ => "Items successfully added to inventory".to_string(),
    }
}

fn commit_failure_message(kind: CartKind, err: &SessionError) -> String {
    match err {
        SessionError::Validation(DomainError::EmptyCart) => match kind {
            CartKind::Request => "Your cart is empty".to_string(),
            CartKind::Add => "Your add cart is empty".to_string(),
        },
        SessionError::Validation(DomainError::MissingJobOrder) => {
            "Please enter a job order number".to_string()
        }
        SessionError::Validation(DomainError::InsufficientStock { name, .. }) => {
            format!("Insufficient stock for {name}")
        }
        SessionError::Validation(_) | SessionError::NotLoggedIn { .. } | SessionError::CommitInFlight => {
            err.to_string()
        }
        SessionError::Transport(_) | SessionError::AuditIncomplete { .. } => match kind {
            CartKind::Request => "Error confirming request".to_string(),
            CartKind::Add => "Error adding items".to_string(),
        },
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}

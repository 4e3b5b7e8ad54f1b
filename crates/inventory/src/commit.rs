//! Commit planning: turn a staged cart into quantity updates and audit entries.
//!
//! Planning is all-or-nothing and touches nothing. The caller sends the plan
//! to the remote store and only then calls [`CommitPlan::apply`] locally.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ItemId};

use crate::cart::{CartKind, StagedCart};
use crate::store::InventoryStore;

/// A cart line resolved against the live inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedLine {
    pub item_id: ItemId,
    pub name: String,
    pub staged_quantity: u64,
    pub old_quantity: u64,
    pub new_quantity: u64,
}

/// One audit log row. Write-once; never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub kind: CartKind,
    pub timestamp: DateTime<Utc>,
    /// Present for requests only.
    pub job_order: Option<String>,
    pub item_id: ItemId,
    /// Requested (request carts) or added (add carts) quantity.
    pub quantity: u64,
    pub old_quantity: u64,
    pub new_quantity: u64,
}

impl AuditEntry {
    /// Timestamp in the sheet's format (`2024-05-01T09:30:00.000Z`).
    pub fn timestamp_text(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Validated commit, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    kind: CartKind,
    job_order: Option<String>,
    timestamp: DateTime<Utc>,
    lines: Vec<PlannedLine>,
}

impl CommitPlan {
    pub fn kind(&self) -> CartKind {
        self.kind
    }

    pub fn job_order(&self) -> Option<&str> {
        self.job_order.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn lines(&self) -> &[PlannedLine] {
        &self.lines
    }

    /// `(id, new quantity)` pairs for the batched inventory update, in cart order.
    pub fn updates(&self) -> impl Iterator<Item = (&ItemId, u64)> + '_ {
        self.lines.iter().map(|l| (&l.item_id, l.new_quantity))
    }

    /// One audit entry per line, in cart order, sharing the plan's timestamp.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.lines
            .iter()
            .map(|l| AuditEntry {
                kind: self.kind,
                timestamp: self.timestamp,
                job_order: self.job_order.clone(),
                item_id: l.item_id.clone(),
                quantity: l.staged_quantity,
                old_quantity: l.old_quantity,
                new_quantity: l.new_quantity,
            })
            .collect()
    }

    /// Write the planned quantities into the local store.
    ///
    /// Every item is checked before any is written, so a store reloaded
    /// mid-commit is either fully updated or left alone.
    pub fn apply(&self, store: &mut InventoryStore) -> DomainResult<()> {
        for line in &self.lines {
            store.require(&line.item_id)?;
        }
        for line in &self.lines {
            store.apply_quantity(&line.item_id, line.new_quantity)?;
        }
        Ok(())
    }

    /// Remove the committed quantities from `cart`.
    ///
    /// Lines staged or bumped while the commit was in flight keep the extra.
    pub fn settle(&self, cart: &mut StagedCart) {
        for line in &self.lines {
            cart.settle(&line.item_id, line.staged_quantity);
        }
    }
}

/// Plan a request (stock out) commit.
///
/// Fails fast on the first line that would go negative; nothing is returned
/// for lines processed before it.
pub fn plan_request(
    cart: &StagedCart,
    store: &InventoryStore,
    job_order: &str,
    at: DateTime<Utc>,
) -> DomainResult<CommitPlan> {
    ensure_kind(cart, CartKind::Request)?;
    ensure_not_empty(cart)?;

    let job_order = job_order.trim();
    if job_order.is_empty() {
        return Err(DomainError::MissingJobOrder);
    }

    let lines = resolve_lines(cart, store, |item_id, name, live, staged| {
        live.checked_sub(staged)
            .ok_or_else(|| DomainError::insufficient_stock(item_id.clone(), name, live, staged))
    })?;

    Ok(CommitPlan {
        kind: CartKind::Request,
        job_order: Some(job_order.to_string()),
        timestamp: at,
        lines,
    })
}

/// Plan an add (stock in) commit. No upper bound is enforced.
pub fn plan_add(
    cart: &StagedCart,
    store: &InventoryStore,
    at: DateTime<Utc>,
) -> DomainResult<CommitPlan> {
    ensure_kind(cart, CartKind::Add)?;
    ensure_not_empty(cart)?;

    let lines = resolve_lines(cart, store, |_, name, live, staged| {
        live.checked_add(staged)
            .ok_or_else(|| DomainError::validation(format!("quantity overflow for {name}")))
    })?;

    Ok(CommitPlan {
        kind: CartKind::Add,
        job_order: None,
        timestamp: at,
        lines,
    })
}

fn ensure_kind(cart: &StagedCart, expected: CartKind) -> DomainResult<()> {
    if cart.kind() != expected {
        return Err(DomainError::validation(format!(
            "expected a {} cart, got a {} cart",
            expected.as_str(),
            cart.kind().as_str()
        )));
    }
    Ok(())
}

fn ensure_not_empty(cart: &StagedCart) -> DomainResult<()> {
    if cart.is_empty() {
        return Err(DomainError::EmptyCart);
    }
    Ok(())
}

fn resolve_lines<F>(cart: &StagedCart, store: &InventoryStore, next: F) -> DomainResult<Vec<PlannedLine>>
where
    F: Fn(&ItemId, &str, u64, u64) -> DomainResult<u64>,
{
    let mut lines = Vec::with_capacity(cart.len());
    for staged in cart.lines() {
        let item = store.require(&staged.item_id)?;
        let name = item.display_name();
        let new_quantity = next(item.id(), name, item.quantity(), staged.quantity)?;
        lines.push(PlannedLine {
            item_id: item.id().clone(),
            name: name.to_string(),
            staged_quantity: staged.quantity,
            old_quantity: item.quantity(),
            new_quantity,
        });
    }
    Ok(lines)
}

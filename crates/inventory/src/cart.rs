//! Staged carts: items picked in the catalog but not yet committed.

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ItemId};

use crate::item::InventoryItem;

/// Which way a cart moves stock once committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartKind {
    /// Take stock out against a job order.
    Request,
    /// Put stock back in.
    Add,
}

impl CartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartKind::Request => "request",
            CartKind::Add => "add",
        }
    }
}

/// One pending (item, quantity) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedLine {
    pub item_id: ItemId,
    /// Name as it was when staged, for display.
    pub name: Option<String>,
    pub quantity: u64,
}

/// Ordered pending lines; at most one line per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedCart {
    kind: CartKind,
    lines: Vec<StagedLine>,
}

impl StagedCart {
    pub fn new(kind: CartKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
        }
    }

    pub fn kind(&self) -> CartKind {
        self.kind
    }

    pub fn lines(&self) -> &[StagedLine] {
        &self.lines
    }

    pub fn line(&self, id: &ItemId) -> Option<&StagedLine> {
        self.lines.iter().find(|l| &l.item_id == id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Stage `quantity` of `item`, merging into an existing line.
    ///
    /// Stock checks against the live inventory are the caller's job; the cart
    /// only guarantees one line per item. Returns the line's new quantity.
    pub fn add_or_increment(&mut self, item: &InventoryItem, quantity: u64) -> DomainResult<u64> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }

        if let Some(line) = self.line_mut(item.id()) {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| DomainError::validation("staged quantity overflow"))?;
            return Ok(line.quantity);
        }

        self.lines.push(StagedLine {
            item_id: item.id().clone(),
            name: item.name().map(str::to_string),
            quantity,
        });
        Ok(quantity)
    }

    /// Bump a line by one.
    ///
    /// Request carts stop at `live_quantity`; add carts ignore it.
    pub fn increment_line(&mut self, id: &ItemId, live_quantity: u64) -> DomainResult<u64> {
        let kind = self.kind;
        let line = self
            .line_mut(id)
            .ok_or_else(|| DomainError::not_found(id.clone()))?;

        let bounded = kind == CartKind::Request;
        if !bounded || line.quantity < live_quantity {
            line.quantity = line.quantity.saturating_add(1);
        }
        Ok(line.quantity)
    }

    /// Drop a line by one, never below 1.
    pub fn decrement_line(&mut self, id: &ItemId) -> DomainResult<u64> {
        let line = self
            .line_mut(id)
            .ok_or_else(|| DomainError::not_found(id.clone()))?;
        if line.quantity > 1 {
            line.quantity -= 1;
        }
        Ok(line.quantity)
    }

    /// Remove a line entirely. Returns whether a line was removed.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.item_id != id);
        self.lines.len() != before
    }

    /// Sum of all staged quantities (badge count), saturating at `u64::MAX`.
    pub fn total_quantity(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |total, l| total.saturating_add(l.quantity))
    }

    /// Take `quantity` off a line after it was committed.
    ///
    /// Whatever was staged on top of the committed amount stays; a line that
    /// reaches zero is dropped. Returns what is left on the line.
    pub fn settle(&mut self, id: &ItemId, quantity: u64) -> u64 {
        let Some(pos) = self.lines.iter().position(|l| &l.item_id == id) else {
            return 0;
        };
        let left = self.lines[pos].quantity.saturating_sub(quantity);
        if left == 0 {
            self.lines.remove(pos);
        } else {
            self.lines[pos].quantity = left;
        }
        left
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, id: &ItemId) -> Option<&mut StagedLine> {
        self.lines.iter_mut().find(|l| &l.item_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, qty: u64) -> InventoryItem {
        InventoryItem::new(ItemId::new(id).unwrap(), qty).with_name(format!("Item {id}"))
    }

    fn id(s: &str) -> ItemId {
        ItemId::new(s).unwrap()
    }

    #[test]
    fn staging_same_item_twice_merges_lines() {
        let mut cart = StagedCart::new(CartKind::Request);
        let a1 = item("A1", 10);
        cart.add_or_increment(&a1, 2).unwrap();
        assert_eq!(cart.add_or_increment(&a1, 3).unwrap(), 5);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn lines_keep_insertion_order() {
        let mut cart = StagedCart::new(CartKind::Add);
        cart.add_or_increment(&item("B", 1), 1).unwrap();
        cart.add_or_increment(&item("A", 1), 1).unwrap();
        cart.add_or_increment(&item("B", 1), 1).unwrap();
        let order: Vec<_> = cart.lines().iter().map(|l| l.item_id.to_string()).collect();
        assert_eq!(order, vec!["B", "A"]);
        assert_eq!(cart.lines()[0].name.as_deref(), Some("Item B"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut cart = StagedCart::new(CartKind::Request);
        assert!(matches!(
            cart.add_or_increment(&item("A1", 5), 0),
            Err(DomainError::Validation(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn decrement_floors_at_one() {
        let mut cart = StagedCart::new(CartKind::Request);
        cart.add_or_increment(&item("A1", 5), 2).unwrap();
        assert_eq!(cart.decrement_line(&id("A1")).unwrap(), 1);
        assert_eq!(cart.decrement_line(&id("A1")).unwrap(), 1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn request_increment_stops_at_live_quantity() {
        let mut cart = StagedCart::new(CartKind::Request);
        cart.add_or_increment(&item("A1", 3), 2).unwrap();
        assert_eq!(cart.increment_line(&id("A1"), 3).unwrap(), 3);
        assert_eq!(cart.increment_line(&id("A1"), 3).unwrap(), 3);
    }

    #[test]
    fn add_increment_is_unbounded() {
        let mut cart = StagedCart::new(CartKind::Add);
        cart.add_or_increment(&item("A1", 3), 3).unwrap();
        assert_eq!(cart.increment_line(&id("A1"), 3).unwrap(), 4);
        assert_eq!(cart.increment_line(&id("A1"), 0).unwrap(), 5);
    }

    #[test]
    fn adjusting_unknown_line_is_not_found() {
        let mut cart = StagedCart::new(CartKind::Add);
        assert_eq!(cart.increment_line(&id("Z"), 1), Err(DomainError::not_found(id("Z"))));
        assert_eq!(cart.decrement_line(&id("Z")), Err(DomainError::not_found(id("Z"))));
    }

    #[test]
    fn remove_total_and_clear() {
        let mut cart = StagedCart::new(CartKind::Request);
        cart.add_or_increment(&item("A1", 9), 2).unwrap();
        cart.add_or_increment(&item("B2", 9), 4).unwrap();
        assert_eq!(cart.total_quantity(), 6);

        assert!(cart.remove(&id("A1")));
        assert!(!cart.remove(&id("A1")));
        assert_eq!(cart.total_quantity(), 4);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let mut cart = StagedCart::new(CartKind::Add);
        cart.add_or_increment(&item("A1", u64::MAX), u64::MAX).unwrap();
        cart.add_or_increment(&item("B2", 1), 1).unwrap();
        assert_eq!(cart.total_quantity(), u64::MAX);
    }

    #[test]
    fn settle_keeps_quantity_staged_after_the_commit() {
        let mut cart = StagedCart::new(CartKind::Request);
        cart.add_or_increment(&item("A1", 9), 3).unwrap();
        cart.add_or_increment(&item("B2", 9), 2).unwrap();

        assert_eq!(cart.settle(&id("A1"), 1), 2);
        assert_eq!(cart.settle(&id("B2"), 2), 0);
        assert_eq!(cart.settle(&id("Z9"), 1), 0);

        let left: Vec<_> = cart.lines().iter().map(|l| (l.item_id.to_string(), l.quantity)).collect();
        assert_eq!(left, vec![("A1".to_string(), 2)]);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: any sequence of stagings yields one line per ID whose quantity is the sum staged.
            #[test]
            fn staging_merges_per_item(
                picks in prop::collection::vec((0usize..4, 1u64..50), 0..30)
            ) {
                let ids = ["A1", "B2", "C3", "D4"];
                let mut cart = StagedCart::new(CartKind::Request);
                let mut expected = [0u64; 4];

                for (which, qty) in &picks {
                    cart.add_or_increment(&item(ids[*which], 1000), *qty).unwrap();
                    expected[*which] += qty;
                }

                let staged_ids = expected.iter().filter(|q| **q > 0).count();
                prop_assert_eq!(cart.len(), staged_ids);
                for (i, want) in expected.iter().enumerate() {
                    let got = cart.line(&id(ids[i])).map(|l| l.quantity).unwrap_or(0);
                    prop_assert_eq!(got, *want);
                }
                prop_assert_eq!(cart.total_quantity(), expected.iter().sum::<u64>());
            }
        }
    }
}

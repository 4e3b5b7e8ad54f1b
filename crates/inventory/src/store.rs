//! In-memory inventory store, replaced wholesale on every load.

use std::collections::HashMap;

use stockroom_core::{DomainError, DomainResult, ItemId};

use crate::item::InventoryItem;

/// Catalog of items in source order, indexed by ID.
///
/// When the sheet carries duplicate IDs the first row wins for lookups and
/// mutations; later duplicates are still listed.
#[derive(Debug, Clone, Default)]
pub struct InventoryStore {
    items: Vec<InventoryItem>,
    index: HashMap<ItemId, usize>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<InventoryItem>) -> Self {
        let mut store = Self::new();
        store.replace(items);
        store
    }

    /// Replace the whole catalog.
    pub fn replace(&mut self, items: Vec<InventoryItem>) {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            index.entry(item.id().clone()).or_insert(pos);
        }
        self.items = items;
        self.index = index;
    }

    /// Drop every item (used when a load fails).
    pub fn reset(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    pub fn find_by_id(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    /// Like [`find_by_id`](Self::find_by_id) but as a domain error.
    pub fn require(&self, id: &ItemId) -> DomainResult<&InventoryItem> {
        self.find_by_id(id)
            .ok_or_else(|| DomainError::not_found(id.clone()))
    }

    /// Overwrite an item's quantity in place.
    ///
    /// Only the commit path may call this; see [`crate::commit::CommitPlan::apply`].
    pub(crate) fn apply_quantity(&mut self, id: &ItemId, new_quantity: u64) -> DomainResult<()> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| DomainError::not_found(id.clone()))?;
        self.items[pos].set_quantity(new_quantity);
        Ok(())
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        distinct(self.items.iter().filter_map(InventoryItem::category))
    }

    /// Distinct suppliers in first-seen order.
    pub fn suppliers(&self) -> Vec<String> {
        distinct(self.items.iter().filter_map(InventoryItem::supplier))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::new(s).unwrap()
    }

    fn sample() -> InventoryStore {
        InventoryStore::from_items(vec![
            InventoryItem::new(id("A1"), 5).with_category("Fasteners").with_supplier("Acme"),
            InventoryItem::new(id("B2"), 0).with_category("Tools"),
            InventoryItem::new(id("C3"), 12).with_category("Fasteners").with_supplier("Bolt Co"),
        ])
    }

    #[test]
    fn find_by_id_hits_and_misses() {
        let store = sample();
        assert_eq!(store.find_by_id(&id("B2")).unwrap().quantity(), 0);
        assert!(store.find_by_id(&id("Z9")).is_none());
        assert_eq!(store.require(&id("Z9")), Err(DomainError::not_found(id("Z9"))));
    }

    #[test]
    fn replace_discards_previous_catalog() {
        let mut store = sample();
        store.replace(vec![InventoryItem::new(id("N1"), 1)]);
        assert_eq!(store.len(), 1);
        assert!(store.find_by_id(&id("A1")).is_none());
        assert!(store.find_by_id(&id("N1")).is_some());
    }

    #[test]
    fn reset_empties_store() {
        let mut store = sample();
        store.reset();
        assert!(store.is_empty());
        assert!(store.find_by_id(&id("A1")).is_none());
    }

    #[test]
    fn apply_quantity_overwrites_in_place() {
        let mut store = sample();
        store.apply_quantity(&id("A1"), 2).unwrap();
        assert_eq!(store.find_by_id(&id("A1")).unwrap().quantity(), 2);
        assert_eq!(store.items()[0].quantity(), 2);
        assert!(store.apply_quantity(&id("Z9"), 1).is_err());
    }

    #[test]
    fn duplicate_ids_resolve_to_first_row() {
        let store = InventoryStore::from_items(vec![
            InventoryItem::new(id("A1"), 5),
            InventoryItem::new(id("A1"), 9),
        ]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_id(&id("A1")).unwrap().quantity(), 5);
    }

    #[test]
    fn categories_and_suppliers_are_distinct_in_source_order() {
        let store = sample();
        assert_eq!(store.categories(), vec!["Fasteners", "Tools"]);
        assert_eq!(store.suppliers(), vec!["Acme", "Bolt Co"]);
    }
}

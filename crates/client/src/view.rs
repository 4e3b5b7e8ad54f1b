//! View models: what a UI renders, with no rendering of its own.

use serde::Serialize;

use stockroom_core::ItemId;
use stockroom_inventory::{CartKind, InventoryItem, StagedCart, StockLevel};

pub const UNNAMED_ITEM: &str = "Unnamed Item";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_ITEMS_FOUND: &str = "No items found.";

/// One catalog card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCard {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub quantity: u64,
    pub shelf: String,
    pub stock: StockLevel,
    pub alert: Option<&'static str>,
    /// Staging buttons are live only when logged in and the item is in stock.
    pub can_stage: bool,
}

impl ItemCard {
    pub fn from_item(item: &InventoryItem, logged_in: bool) -> Self {
        let stock = StockLevel::for_quantity(item.quantity());
        Self {
            id: item.id().clone(),
            name: item.name().unwrap_or(UNNAMED_ITEM).to_string(),
            category: item.category().unwrap_or(NOT_AVAILABLE).to_string(),
            supplier: item.supplier().unwrap_or(NOT_AVAILABLE).to_string(),
            quantity: item.quantity(),
            shelf: item.shelf().unwrap_or(NOT_AVAILABLE).to_string(),
            stock,
            alert: stock.alert(),
            can_stage: logged_in && item.quantity() > 0,
        }
    }
}

impl core::fmt::Display for ItemCard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{}] {} | {} | {} | qty {} | shelf {}",
            self.id, self.name, self.category, self.supplier, self.quantity, self.shelf
        )?;
        if let Some(alert) = self.alert {
            write!(f, " ({alert})")?;
        }
        Ok(())
    }
}

/// A tab or drop-down entry. `value` is what goes back into a `Selector`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn all(label: &str) -> Self {
        Self {
            value: "all".to_string(),
            label: label.to_string(),
        }
    }

    fn plain(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

/// The whole catalog screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogView {
    pub category_tabs: Vec<SelectOption>,
    pub supplier_options: Vec<SelectOption>,
    pub cards: Vec<ItemCard>,
    /// Set when no card survives the filter.
    pub empty_message: Option<&'static str>,
}

impl CatalogView {
    pub fn build<'a>(
        categories: &[String],
        suppliers: &[String],
        visible: impl IntoIterator<Item = &'a InventoryItem>,
        logged_in: bool,
    ) -> Self {
        let cards: Vec<ItemCard> = visible
            .into_iter()
            .map(|item| ItemCard::from_item(item, logged_in))
            .collect();

        Self {
            category_tabs: std::iter::once(SelectOption::all("All categories"))
                .chain(categories.iter().map(|c| SelectOption::plain(c)))
                .collect(),
            supplier_options: std::iter::once(SelectOption::all("All suppliers"))
                .chain(suppliers.iter().map(|s| SelectOption::plain(s)))
                .collect(),
            empty_message: cards.is_empty().then_some(NO_ITEMS_FOUND),
            cards,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    pub id: ItemId,
    pub name: String,
    pub quantity: u64,
}

/// Contents of the request or add modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub kind: CartKind,
    pub lines: Vec<CartLineView>,
    pub total_quantity: u64,
    pub total_label: String,
}

impl CartView {
    pub fn from_cart(cart: &StagedCart) -> Self {
        let total_quantity = cart.total_quantity();
        let total_label = match cart.kind() {
            CartKind::Request => format!("Total items: {total_quantity}"),
            CartKind::Add => format!("Total items to add: {total_quantity}"),
        };
        Self {
            kind: cart.kind(),
            lines: cart
                .lines()
                .iter()
                .map(|l| CartLineView {
                    id: l.item_id.clone(),
                    name: l.name.clone().unwrap_or_else(|| UNNAMED_ITEM.to_string()),
                    quantity: l.quantity,
                })
                .collect(),
            total_quantity,
            total_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::new(s).unwrap()
    }

    #[test]
    fn card_falls_back_for_missing_fields() {
        let card = ItemCard::from_item(&InventoryItem::new(id("X9"), 0), true);
        assert_eq!(card.name, UNNAMED_ITEM);
        assert_eq!(card.category, NOT_AVAILABLE);
        assert_eq!(card.shelf, NOT_AVAILABLE);
        assert_eq!(card.alert, Some("Out of stock"));
        assert!(!card.can_stage);
        assert_eq!(card.to_string(), "[X9] Unnamed Item | N/A | N/A | qty 0 | shelf N/A (Out of stock)");
    }

    #[test]
    fn card_staging_requires_login() {
        let item = InventoryItem::new(id("A1"), 50).with_name("Bolt");
        assert!(!ItemCard::from_item(&item, false).can_stage);
        assert!(ItemCard::from_item(&item, true).can_stage);
        assert_eq!(ItemCard::from_item(&item, true).alert, None);
    }

    #[test]
    fn catalog_view_prepends_all_options_and_flags_empty() {
        let view = CatalogView::build(&["Tools".to_string()], &[], std::iter::empty(), false);
        assert_eq!(view.category_tabs[0].value, "all");
        assert_eq!(view.category_tabs[1].label, "Tools");
        assert_eq!(view.supplier_options.len(), 1);
        assert_eq!(view.empty_message, Some(NO_ITEMS_FOUND));
    }

    #[test]
    fn cart_view_totals() {
        let mut cart = StagedCart::new(CartKind::Add);
        cart.add_or_increment(&InventoryItem::new(id("A1"), 5).with_name("Bolt"), 2).unwrap();
        cart.add_or_increment(&InventoryItem::new(id("B2"), 5), 3).unwrap();

        let view = CartView::from_cart(&cart);
        assert_eq!(view.total_quantity, 5);
        assert_eq!(view.total_label, "Total items to add: 5");
        assert_eq!(view.lines[1].name, UNNAMED_ITEM);
    }
}

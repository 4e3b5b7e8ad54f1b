//! Catalog filtering (category tab, supplier drop-down, free-text search).

use core::convert::Infallible;
use core::str::FromStr;

use crate::item::InventoryItem;

/// A category or supplier selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    #[default]
    All,
    Only(String),
}

impl Selector {
    pub fn only(value: impl Into<String>) -> Self {
        Self::Only(value.into())
    }

    /// An absent field never satisfies a specific selector.
    pub fn matches(&self, field: Option<&str>) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => field == Some(wanted.as_str()),
        }
    }
}

impl From<&str> for Selector {
    /// `"all"` is the UI's sentinel for "no restriction".
    fn from(s: &str) -> Self {
        if s == "all" { Selector::All } else { Selector::only(s) }
    }
}

impl FromStr for Selector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Filter state as selected in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    pub category: Selector,
    pub supplier: Selector,
    search: String,
}

impl Filter {
    pub fn new(category: Selector, supplier: Selector, search: &str) -> Self {
        Self {
            category,
            supplier,
            search: search.to_lowercase(),
        }
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_lowercase();
        self
    }

    /// The lowercased search term.
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        self.category.matches(item.category())
            && self.supplier.matches(item.supplier())
            && self.search_matches(item)
    }

    // Name is compared case-insensitively; the ID is compared as stored.
    fn search_matches(&self, item: &InventoryItem) -> bool {
        let name_hit = item
            .name()
            .is_some_and(|name| name.to_lowercase().contains(&self.search));
        name_hit || item.id().as_str().contains(&self.search)
    }
}

/// Visible subset of `items`, in source order.
pub fn filter_items<'a>(filter: &Filter, items: &'a [InventoryItem]) -> Vec<&'a InventoryItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

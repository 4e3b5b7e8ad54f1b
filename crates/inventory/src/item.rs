use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use stockroom_core::ItemId;

/// One catalog row as held by the inventory store.
///
/// Descriptive fields are optional: the spreadsheet may leave any of them
/// blank, and a blank cell never matches a specific category/supplier filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    #[serde(rename = "ID")]
    id: ItemId,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Category")]
    category: Option<String>,
    #[serde(rename = "Supplier")]
    supplier: Option<String>,
    #[serde(rename = "Quantity")]
    quantity: u64,
    #[serde(rename = "Shelf")]
    shelf: Option<String>,
}

/// Why a wire row could not become an [`InventoryItem`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("row is not an object")]
    NotAnObject,
    #[error("row has no ID")]
    MissingId,
    #[error("row could not be decoded: {0}")]
    Malformed(String),
}

/// Loose wire shape of a spreadsheet row; every cell may be missing or mistyped.
#[derive(Debug, Default, Deserialize)]
struct RawRow {
    #[serde(rename = "ID", default)]
    id: Option<Value>,
    #[serde(rename = "Name", default)]
    name: Option<Value>,
    #[serde(rename = "Category", default)]
    category: Option<Value>,
    #[serde(rename = "Supplier", default)]
    supplier: Option<Value>,
    #[serde(rename = "Quantity", default)]
    quantity: Option<Value>,
    #[serde(rename = "Shelf", default)]
    shelf: Option<Value>,
}

impl InventoryItem {
    pub fn new(id: ItemId, quantity: u64) -> Self {
        Self {
            id,
            name: None,
            category: None,
            supplier: None,
            quantity,
            shelf: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = non_blank(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_blank(category.into());
        self
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = non_blank(supplier.into());
        self
    }

    pub fn with_shelf(mut self, shelf: impl Into<String>) -> Self {
        self.shelf = non_blank(shelf.into());
        self
    }

    /// Decode one row of the `inventory` array.
    ///
    /// Numeric IDs are normalized to their string form. `Quantity` accepts a
    /// number or a numeric string; anything else (including negatives) reads as 0.
    pub fn from_row(row: &Value) -> Result<Self, RowError> {
        if !row.is_object() {
            return Err(RowError::NotAnObject);
        }
        let raw: RawRow =
            serde_json::from_value(row.clone()).map_err(|e| RowError::Malformed(e.to_string()))?;

        let id = raw
            .id
            .as_ref()
            .and_then(cell_text)
            .and_then(|s| ItemId::new(s).ok())
            .ok_or(RowError::MissingId)?;

        Ok(Self {
            id,
            name: raw.name.as_ref().and_then(cell_text),
            category: raw.category.as_ref().and_then(cell_text),
            supplier: raw.supplier.as_ref().and_then(cell_text),
            quantity: raw.quantity.as_ref().map(cell_quantity).unwrap_or(0),
            shelf: raw.shelf.as_ref().and_then(cell_text),
        })
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn shelf(&self) -> Option<&str> {
        self.shelf.as_deref()
    }

    /// Name for messages; falls back to the ID when the sheet has no name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    pub(crate) fn set_quantity(&mut self, quantity: u64) {
        self.quantity = quantity;
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Integral floats print without a fractional part (12.0 -> "12").
fn number_text(n: &serde_json::Number) -> String {
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.is_finite() => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

fn cell_quantity(value: &Value) -> u64 {
    if let Some(u) = value.as_u64() {
        return u;
    }
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_complete_row() {
        let row = json!({
            "ID": "A1",
            "Name": "Bolt M8",
            "Category": "Fasteners",
            "Supplier": "Acme",
            "Quantity": 5,
            "Shelf": "B-2"
        });
        let item = InventoryItem::from_row(&row).unwrap();
        assert_eq!(item.id().as_str(), "A1");
        assert_eq!(item.name(), Some("Bolt M8"));
        assert_eq!(item.category(), Some("Fasteners"));
        assert_eq!(item.supplier(), Some("Acme"));
        assert_eq!(item.quantity(), 5);
        assert_eq!(item.shelf(), Some("B-2"));
    }

    #[test]
    fn numeric_id_is_normalized_to_string() {
        let item = InventoryItem::from_row(&json!({ "ID": 1042, "Quantity": 1 })).unwrap();
        assert_eq!(item.id().as_str(), "1042");

        let item = InventoryItem::from_row(&json!({ "ID": 7.0 })).unwrap();
        assert_eq!(item.id().as_str(), "7");
    }

    #[test]
    fn quantity_is_lenient() {
        let q = |v: Value| InventoryItem::from_row(&json!({ "ID": "X", "Quantity": v })).unwrap().quantity();
        assert_eq!(q(json!("12")), 12);
        assert_eq!(q(json!(" 3 ")), 3);
        assert_eq!(q(json!(4.9)), 4);
        assert_eq!(q(json!(-2)), 0);
        assert_eq!(q(json!("lots")), 0);
        assert_eq!(q(Value::Null), 0);

        let missing = InventoryItem::from_row(&json!({ "ID": "X" })).unwrap();
        assert_eq!(missing.quantity(), 0);
    }

    #[test]
    fn blank_and_null_cells_are_absent() {
        let row = json!({ "ID": "A1", "Name": "", "Category": null, "Shelf": 3 });
        let item = InventoryItem::from_row(&row).unwrap();
        assert_eq!(item.name(), None);
        assert_eq!(item.category(), None);
        assert_eq!(item.supplier(), None);
        assert_eq!(item.shelf(), Some("3"));
        assert_eq!(item.display_name(), "A1");
    }

    #[test]
    fn rejects_rows_without_usable_id() {
        assert_eq!(InventoryItem::from_row(&Value::Null), Err(RowError::NotAnObject));
        assert_eq!(InventoryItem::from_row(&json!([1, 2])), Err(RowError::NotAnObject));
        assert_eq!(InventoryItem::from_row(&json!({ "Name": "x" })), Err(RowError::MissingId));
        assert_eq!(InventoryItem::from_row(&json!({ "ID": "  " })), Err(RowError::MissingId));
        assert_eq!(InventoryItem::from_row(&json!({ "ID": null })), Err(RowError::MissingId));
    }

    #[test]
    fn serializes_with_sheet_column_names() {
        let item = InventoryItem::new(ItemId::new("A1").unwrap(), 2).with_name("Bolt");
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["ID"], "A1");
        assert_eq!(v["Name"], "Bolt");
        assert_eq!(v["Quantity"], 2);
        assert!(v["Category"].is_null());
    }
}

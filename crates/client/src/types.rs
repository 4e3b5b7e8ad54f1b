//! Wire types for the spreadsheet endpoint.
//!
//! Every write is a JSON object tagged by `action`; the remaining keys depend
//! on the action. Field names follow the sheet's column headers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockroom_core::ItemId;
use stockroom_inventory::{AuditEntry, CartKind, CommitPlan};

use crate::gateway::GatewayError;

/// One write command sent to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum SheetCommand {
    #[serde(rename = "updateInventory")]
    UpdateInventory { updates: Vec<InventoryUpdate> },

    #[serde(rename = "requestLog")]
    RequestLog {
        #[serde(rename = "logEntry")]
        log_entry: RequestLogEntry,
    },

    #[serde(rename = "addLog")]
    AddLog {
        #[serde(rename = "logEntry")]
        log_entry: AddLogEntry,
    },
}

impl SheetCommand {
    /// The single batched update for a plan.
    pub fn update_for(plan: &CommitPlan) -> Self {
        SheetCommand::UpdateInventory {
            updates: plan
                .updates()
                .map(|(id, new_quantity)| InventoryUpdate {
                    id: id.clone(),
                    new_quantity,
                })
                .collect(),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            SheetCommand::UpdateInventory { .. } => "updateInventory",
            SheetCommand::RequestLog { .. } => "requestLog",
            SheetCommand::AddLog { .. } => "addLog",
        }
    }
}

impl From<&AuditEntry> for SheetCommand {
    fn from(entry: &AuditEntry) -> Self {
        let timestamp = entry.timestamp_text();
        match entry.kind {
            CartKind::Request => SheetCommand::RequestLog {
                log_entry: RequestLogEntry {
                    timestamp,
                    job_order_number: entry.job_order.clone().unwrap_or_default(),
                    material_id: entry.item_id.clone(),
                    requested_quantity: entry.quantity,
                    old_quantity: entry.old_quantity,
                    new_quantity: entry.new_quantity,
                },
            },
            CartKind::Add => SheetCommand::AddLog {
                log_entry: AddLogEntry {
                    timestamp,
                    material_id: entry.item_id.clone(),
                    added_quantity: entry.quantity,
                    old_quantity: entry.old_quantity,
                    new_quantity: entry.new_quantity,
                },
            },
        }
    }
}

/// `{ id, newQuantity }` element of an `updateInventory` batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    pub id: ItemId,
    pub new_quantity: u64,
}

/// Audit row for a stock request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestLogEntry {
    pub timestamp: String,
    pub job_order_number: String,
    #[serde(rename = "MaterialID")]
    pub material_id: ItemId,
    pub requested_quantity: u64,
    pub old_quantity: u64,
    pub new_quantity: u64,
}

/// Audit row for stock put back in. Carries no job order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddLogEntry {
    pub timestamp: String,
    #[serde(rename = "MaterialID")]
    pub material_id: ItemId,
    pub added_quantity: u64,
    pub old_quantity: u64,
    pub new_quantity: u64,
}

/// Pull the `inventory` array out of a read response body.
pub fn inventory_rows(body: Value) -> Result<Vec<Value>, GatewayError> {
    match body {
        Value::Object(mut map) => match map.remove("inventory") {
            Some(Value::Array(rows)) => Ok(rows),
            Some(_) => Err(GatewayError::Shape("`inventory` is not an array".to_string())),
            None => Err(GatewayError::Shape("missing `inventory` field".to_string())),
        },
        _ => Err(GatewayError::Shape("response body is not an object".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use stockroom_inventory::{InventoryItem, InventoryStore, StagedCart, plan_add, plan_request};

    fn id(s: &str) -> ItemId {
        ItemId::new(s).unwrap()
    }

    fn store() -> InventoryStore {
        InventoryStore::from_items(vec![InventoryItem::new(id("A1"), 5)])
    }

    #[test]
    fn request_commit_wire_shapes() {
        let store = store();
        let mut cart = StagedCart::new(CartKind::Request);
        cart.add_or_increment(store.find_by_id(&id("A1")).unwrap(), 3).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let plan = plan_request(&cart, &store, "JO-9", at).unwrap();

        let update = serde_json::to_value(SheetCommand::update_for(&plan)).unwrap();
        assert_eq!(
            update,
            json!({ "action": "updateInventory", "updates": [{ "id": "A1", "newQuantity": 2 }] })
        );

        let log = serde_json::to_value(SheetCommand::from(&plan.audit_entries()[0])).unwrap();
        assert_eq!(
            log,
            json!({
                "action": "requestLog",
                "logEntry": {
                    "Timestamp": "2024-05-01T09:30:00.000Z",
                    "JobOrderNumber": "JO-9",
                    "MaterialID": "A1",
                    "RequestedQuantity": 3,
                    "OldQuantity": 5,
                    "NewQuantity": 2
                }
            })
        );
    }

    #[test]
    fn add_log_omits_job_order() {
        let store = store();
        let mut cart = StagedCart::new(CartKind::Add);
        cart.add_or_increment(store.find_by_id(&id("A1")).unwrap(), 4).unwrap();
        let plan = plan_add(&cart, &store, Utc::now()).unwrap();

        let log = serde_json::to_value(SheetCommand::from(&plan.audit_entries()[0])).unwrap();
        assert_eq!(log["action"], "addLog");
        assert_eq!(log["logEntry"]["AddedQuantity"], 4);
        assert_eq!(log["logEntry"]["NewQuantity"], 9);
        assert!(log["logEntry"].get("JobOrderNumber").is_none());
        assert!(log["logEntry"].get("RequestedQuantity").is_none());
    }

    #[test]
    fn inventory_rows_requires_array() {
        assert_eq!(inventory_rows(json!({ "inventory": [1, 2] })).unwrap().len(), 2);
        assert!(matches!(inventory_rows(json!({ "inventory": {} })), Err(GatewayError::Shape(_))));
        assert!(matches!(inventory_rows(json!({ "items": [] })), Err(GatewayError::Shape(_))));
        assert!(matches!(inventory_rows(json!([])), Err(GatewayError::Shape(_))));
    }
}

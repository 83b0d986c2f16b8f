//! Record types for the two persisted collections.
//!
//! External field names follow the persisted format: PascalCase, with the
//! key spelled `ProductID` on both record kinds.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::catalog::{EntryRef, ItemRef};

/// A catalog product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Item {
    /// Unique key, assumed unique across all items
    #[serde(rename = "ProductID")]
    pub product_id: i32,

    pub product_number: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,

    pub weight_unit_measure_code: Option<String>,
    pub weight: f64,

    pub size_unit_measure_code: Option<String>,
    pub size: Option<String>,

    pub days_to_manufacture: i32,
    pub standard_cost: f64,
    pub list_price: f64,

    pub modified_date: NaiveDateTime,
    pub sell_start_date: NaiveDateTime,

    /// History entries currently linked to this item. Written only by the
    /// association engine.
    #[serde(skip)]
    pub(crate) entries: Vec<EntryRef>,
}

impl Item {
    pub fn new(product_id: i32) -> Self {
        Self {
            product_id,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_product_number(mut self, number: impl Into<String>) -> Self {
        self.product_number = Some(number.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_prices(mut self, standard_cost: f64, list_price: f64) -> Self {
        self.standard_cost = standard_cost;
        self.list_price = list_price;
        self
    }

    pub fn with_sell_start_date(mut self, date: NaiveDateTime) -> Self {
        self.sell_start_date = date;
        self
    }

    pub fn with_modified_date(mut self, date: NaiveDateTime) -> Self {
        self.modified_date = date;
        self
    }

    /// Standard cost multiplied by list price. Derived, never persisted.
    pub fn list_price_cost(&self) -> f64 {
        self.standard_cost * self.list_price
    }

    /// Handles of the history entries linked to this item.
    pub fn entries(&self) -> &[EntryRef] {
        &self.entries
    }
}

/// Compares persisted fields only; links are derived state.
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.product_id == other.product_id
            && self.product_number == other.product_number
            && self.name == other.name
            && self.color == other.color
            && self.weight_unit_measure_code == other.weight_unit_measure_code
            && self.weight == other.weight
            && self.size_unit_measure_code == other.size_unit_measure_code
            && self.size == other.size
            && self.days_to_manufacture == other.days_to_manufacture
            && self.standard_cost == other.standard_cost
            && self.list_price == other.list_price
            && self.modified_date == other.modified_date
            && self.sell_start_date == other.sell_start_date
    }
}

/// A single price change of a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HistoryEntry {
    /// Foreign key into the item collection
    #[serde(rename = "ProductID")]
    pub product_id: i32,

    pub start_date: NaiveDateTime,
    pub modified_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,

    pub list_price: f64,

    /// Owning item, if linked. Written only by the association engine.
    #[serde(skip)]
    pub(crate) owner: Option<ItemRef>,
}

impl HistoryEntry {
    pub fn new(product_id: i32) -> Self {
        Self {
            product_id,
            ..Self::default()
        }
    }

    pub fn with_list_price(mut self, list_price: f64) -> Self {
        self.list_price = list_price;
        self
    }

    pub fn with_validity(mut self, start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_modified_date(mut self, date: NaiveDateTime) -> Self {
        self.modified_date = date;
        self
    }

    /// Handle of the owning item, or `None` for an orphan.
    pub fn owner(&self) -> Option<ItemRef> {
        self.owner
    }
}

/// Compares persisted fields only; links are derived state.
impl PartialEq for HistoryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.product_id == other.product_id
            && self.start_date == other.start_date
            && self.modified_date == other.modified_date
            && self.end_date == other.end_date
            && self.list_price == other.list_price
    }
}

/// Both collections as read from a store, in persisted order.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub items: Vec<Item>,
    pub history: Vec<HistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_item_builder() {
        let item = Item::new(707)
            .with_name("Sport-100 Helmet, Red")
            .with_product_number("HL-U509-R")
            .with_color("Red")
            .with_prices(13.0863, 34.99);

        assert_eq!(item.product_id, 707);
        assert_eq!(item.name.as_deref(), Some("Sport-100 Helmet, Red"));
        assert!(item.entries().is_empty());
        assert!((item.list_price_cost() - 13.0863 * 34.99).abs() < 1e-9);
    }

    #[test]
    fn test_item_uses_external_field_names() {
        let item = Item::new(1).with_name("Blade");
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["ProductID"], 1);
        assert_eq!(value["Name"], "Blade");
        assert!(value.get("WeightUnitMeasureCode").is_some());
        assert!(value.get("Entries").is_none());
        assert!(value.get("ListPriceCost").is_none());
    }

    #[test]
    fn test_history_entry_parses_persisted_record() {
        let json = r#"{
            "ProductID": 707,
            "StartDate": "2011-05-31T00:00:00",
            "EndDate": null,
            "ListPrice": 33.6442,
            "ModifiedDate": "2012-05-29T00:00:00.123",
            "Extra": "ignored"
        }"#;

        let entry: HistoryEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.product_id, 707);
        assert_eq!(entry.start_date, timestamp(2011, 5, 31));
        assert!(entry.end_date.is_none());
        assert!(entry.owner().is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let item: Item = serde_json::from_str(r#"{"ProductID": 3}"#).unwrap();
        assert_eq!(item, Item::new(3));
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Categorized receipt data as returned by the model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Spending categories the model is asked to choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Groceries,
    Household,
    Automotive,
    /// Electronics, luxury items, and anything unclear
    Shopping,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Groceries,
        Category::Household,
        Category::Automotive,
        Category::Shopping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Household => "Household",
            Category::Automotive => "Automotive",
            Category::Shopping => "Shopping",
        }
    }

    /// What belongs in this category, as explained to the model
    pub fn description(&self) -> &'static str {
        match self {
            Category::Groceries => "food items",
            Category::Household => "cleaning/supply items",
            Category::Automotive => "car-related purchases",
            Category::Shopping => "electronics, luxury items, or if the category is unclear/unidentified",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// One purchased item
///
/// Fields stay as raw JSON values: the model's output is untrusted and the
/// CSV is a transcription of whatever it returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
}

impl LineItem {
    /// The category if it is one of the known labels
    pub fn known_category(&self) -> Option<Category> {
        self.category
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }
}

/// Parsed categorization of a single receipt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    #[serde(default)]
    pub items: Vec<LineItem>,

    /// Category label to subtotal, in the order the model listed them
    #[serde(default)]
    pub subtotals: Map<String, Value>,

    #[serde(
        default,
        rename = "before_tax_subtotals_of_all_categories_calcuated_by_ChatGPT"
    )]
    pub calculated_before_tax_total: Option<Value>,

    #[serde(default, rename = "before_tax_total_found_in_receipt_data_sent")]
    pub receipt_before_tax_total: Option<Value>,

    #[serde(default, rename = "sales_taxes_found_in_receipt_data_sent")]
    pub sales_tax: Option<Value>,

    #[serde(default, rename = "receipt_total_verified")]
    pub verified: Option<Value>,
}

impl Categorization {
    /// Category labels used by items or subtotals that fall outside the known set
    pub fn unknown_categories(&self) -> Vec<String> {
        let item_labels = self
            .items
            .iter()
            .filter(|i| i.known_category().is_none())
            .filter_map(|i| i.category.as_ref().and_then(Value::as_str));
        let subtotal_labels = self.subtotals.keys().map(String::as_str);

        let mut unknown: Vec<String> = item_labels
            .chain(subtotal_labels)
            .filter(|label| label.parse::<Category>().is_err())
            .map(String::from)
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("Groceries".parse::<Category>(), Ok(Category::Groceries));
        assert_eq!(" automotive ".parse::<Category>(), Ok(Category::Automotive));
        assert!("Pets".parse::<Category>().is_err());
    }

    #[test]
    fn test_deserialize_model_field_names() {
        let json = r#"{
            "items": [{"name": "Milk", "price": 3.50, "category": "Groceries"}],
            "subtotals": {"Groceries": 3.50},
            "before_tax_subtotals_of_all_categories_calcuated_by_ChatGPT": 3.50,
            "before_tax_total_found_in_receipt_data_sent": 3.50,
            "sales_taxes_found_in_receipt_data_sent": 0.21,
            "receipt_total_verified": true
        }"#;
        let parsed: Categorization = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].known_category(), Some(Category::Groceries));
        assert_eq!(parsed.verified, Some(Value::Bool(true)));
        assert!(parsed.sales_tax.is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let parsed: Categorization = serde_json::from_str(r#"{"items": [{"name": "Gum"}]}"#).unwrap();
        assert_eq!(parsed.items[0].price, None);
        assert!(parsed.subtotals.is_empty());
        assert_eq!(parsed.verified, None);
    }

    #[test]
    fn test_unknown_categories() {
        let parsed: Categorization = serde_json::from_str(
            r#"{"items": [{"name": "Kibble", "category": "Pets"}, {"name": "Soap", "category": "Household"}],
                "subtotals": {"Pets": 9.99, "Household": 2.00}}"#,
        )
        .unwrap();
        assert_eq!(parsed.unknown_categories(), vec!["Pets".to_string()]);
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! System instruction sent with every receipt

use crate::receipt::Category;

const PREAMBLE: &str = "\
You are a highly accurate receipt parser. You will receive receipt text where each \
line represents an item extracted from a PDF. Your goal is to analyze the receipt, \
categorize each item, calculate subtotals, and verify that the before-tax total you \
calculate matches the before-tax total found in the receipt text you received.

Instructions:
1. Extract relevant data:
   - Ignore blank lines, headers, and footers.
   - Identify each valid line item and extract its name and its price after discounts.
   - If a discount applies, subtract it from the original item price.
   - If an item is \"voided\", exclude it from all calculations.
   - Find the receipt's total before taxes are calculated.

2. Categorize each line item using one of these categories:
";

const SCHEMA: &str = r#"
3. Return a single JSON object formatted like this example. The example shows the
   format only; its values are placeholders, not the literal data:

{
  "items": [
    {"name": "Item Name", "price": 0.00, "category": "Groceries"},
    {"name": "Item Name", "price": 0.00, "category": "Automotive"},
    {"name": "Item Name", "price": 0.00, "category": "Household"},
    {"name": "Item Name", "price": 0.00, "category": "Shopping"}
  ],
  "subtotals": {
    "Groceries": 0.00,
    "Automotive": 0.00,
    "Household": 0.00,
    "Shopping": 0.00
  },
  "before_tax_subtotals_of_all_categories_calcuated_by_ChatGPT": 0.00,
  "before_tax_total_found_in_receipt_data_sent": 0.00,
  "sales_taxes_found_in_receipt_data_sent": 0.00,
  "receipt_total_verified": true
}

Set "receipt_total_verified" to true only if your calculated before-tax total matches
the before-tax total found in the receipt text.
"#;

/// Build the fixed system instruction
pub fn system_prompt() -> String {
    let mut prompt = String::from(PREAMBLE);
    for category in Category::ALL {
        prompt.push_str(&format!(
            "   - \"{}\" for {}\n",
            category.as_str(),
            category.description()
        ));
    }
    prompt.push_str(SCHEMA);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_category() {
        let prompt = system_prompt();
        for category in Category::ALL {
            assert!(prompt.contains(&format!("\"{}\" for", category)));
        }
    }

    #[test]
    fn test_prompt_names_output_fields() {
        let prompt = system_prompt();
        assert!(prompt.contains("receipt_total_verified"));
        assert!(prompt.contains("before_tax_total_found_in_receipt_data_sent"));
        assert!(prompt.contains("voided"));
        assert!(prompt.contains("placeholders, not the literal data"));
    }
}

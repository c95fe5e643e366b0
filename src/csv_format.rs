// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Renders a categorization as CSV
//!
//! Three sections separated by blank rows: items, subtotals, summary. The
//! output transcribes what the model returned; totals are not cross-checked.

use serde_json::Value;

use crate::receipt::Categorization;
use crate::Result;

pub const ITEM_HEADER: [&str; 3] = ["Item Name", "Price", "Category"];
pub const SUBTOTAL_HEADER: [&str; 2] = ["Category", "Subtotal"];
pub const CALCULATED_TOTAL_LABEL: &str = "Before Tax Total (Calculated by Model)";
pub const RECEIPT_TOTAL_LABEL: &str = "Before Tax Total (Found in Receipt Data)";
pub const SALES_TAX_LABEL: &str = "Sales Taxes";
pub const VERIFIED_LABEL: &str = "Receipt Total Verified";

const BLANK_ROW: &[u8] = b"\r\n";

/// Render a single JSON value as a CSV cell
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Render the full CSV document
pub fn to_csv(data: &Categorization) -> Result<String> {
    let mut out = Vec::new();

    let mut items = vec![ITEM_HEADER.iter().map(|s| s.to_string()).collect::<Vec<_>>()];
    items.extend(data.items.iter().map(|item| {
        vec![
            cell(item.name.as_ref()),
            cell(item.price.as_ref()),
            cell(item.category.as_ref()),
        ]
    }));
    write_rows(&mut out, &items)?;
    out.extend_from_slice(BLANK_ROW);

    let mut subtotals = vec![SUBTOTAL_HEADER.iter().map(|s| s.to_string()).collect::<Vec<_>>()];
    subtotals.extend(
        data.subtotals
            .iter()
            .map(|(category, subtotal)| vec![category.clone(), cell(Some(subtotal))]),
    );
    write_rows(&mut out, &subtotals)?;
    out.extend_from_slice(BLANK_ROW);

    let summary = [
        (CALCULATED_TOTAL_LABEL, &data.calculated_before_tax_total),
        (RECEIPT_TOTAL_LABEL, &data.receipt_before_tax_total),
        (SALES_TAX_LABEL, &data.sales_tax),
        (VERIFIED_LABEL, &data.verified),
    ]
    .into_iter()
    .map(|(label, value)| vec![label.to_string(), cell(value.as_ref())])
    .collect::<Vec<_>>();
    write_rows(&mut out, &summary)?;

    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn write_rows(out: &mut Vec<u8>, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::parse_reply;

    fn sample() -> Categorization {
        parse_reply(
            r#"{
                "items": [
                    {"name": "Milk", "price": 3.50, "category": "Groceries"},
                    {"name": "Oil Filter", "price": 12.99, "category": "Automotive"}
                ],
                "subtotals": {"Groceries": 3.50, "Automotive": 12.99},
                "before_tax_subtotals_of_all_categories_calcuated_by_ChatGPT": 16.49,
                "before_tax_total_found_in_receipt_data_sent": 16.49,
                "sales_taxes_found_in_receipt_data_sent": 1.20,
                "receipt_total_verified": true
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_layout() {
        let csv = to_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(
            lines,
            vec![
                "Item Name,Price,Category",
                "Milk,3.50,Groceries",
                "Oil Filter,12.99,Automotive",
                "",
                "Category,Subtotal",
                "Groceries,3.50",
                "Automotive,12.99",
                "",
                "Before Tax Total (Calculated by Model),16.49",
                "Before Tax Total (Found in Receipt Data),16.49",
                "Sales Taxes,1.20",
                "Receipt Total Verified,true",
                "",
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let data = sample();
        assert_eq!(to_csv(&data).unwrap(), to_csv(&data).unwrap());
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let data = parse_reply(r#"{"items": [{"name": "Mystery"}, {"price": 1}]}"#).unwrap();
        let csv = to_csv(&data).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines[1], "Mystery,,");
        assert_eq!(lines[2], ",1,");
        assert_eq!(lines[4], "Category,Subtotal");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Before Tax Total (Calculated by Model),");
        assert_eq!(lines[9], "Receipt Total Verified,");
    }

    #[test]
    fn test_subtotals_keep_model_order() {
        let data = parse_reply(r#"{"subtotals": {"Shopping": 5, "Automotive": 2, "Groceries": 1}}"#).unwrap();
        let csv = to_csv(&data).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(&lines[3..6], &["Shopping,5", "Automotive,2", "Groceries,1"]);
    }

    #[test]
    fn test_quoting() {
        let data = parse_reply(r#"{"items": [{"name": "Chips, \"Family\" Size", "price": "2.00", "category": "Groceries"}]}"#).unwrap();
        let csv = to_csv(&data).unwrap();
        assert!(csv.contains("\"Chips, \"\"Family\"\" Size\",2.00,Groceries\r\n"));
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell(None), "");
        assert_eq!(cell(Some(&Value::Null)), "");
        assert_eq!(cell(Some(&Value::Bool(false))), "false");
        assert_eq!(cell(Some(&serde_json::json!("x"))), "x");
        assert_eq!(cell(Some(&serde_json::json!([1, 2]))), "[1,2]");
    }
}

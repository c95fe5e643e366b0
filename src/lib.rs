// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! receiptwatch: PDF receipt categorizer
//!
//! Watches a folder for new PDF receipts, has an LLM categorize their line
//! items, and writes the result as CSV.

pub mod config;
pub mod csv_format;
pub mod error;
pub mod extractor;
pub mod history;
pub mod openai;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod receipt;
pub mod sanitizer;
pub mod watcher;

pub use config::AppConfig;
pub use error::{ReceiptError, Result};

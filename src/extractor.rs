// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! PDF text extraction

use lopdf::Document;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::{ReceiptError, Result};

/// Extract the text layer of every page, joined with newlines and trimmed
///
/// Pages that fail to decode or carry no text are skipped. A document with
/// no text on any page (an image-only scan, say) is an error.
pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| ReceiptError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = Document::load_mem(&bytes)
        .map_err(|e| ReceiptError::Pdf(format!("Failed to load PDF: {}", e)))?;

    let pages = doc.get_pages();
    debug!("{:?} has {} pages", path, pages.len());

    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => texts.push(text),
            Ok(_) => debug!("Page {} of {:?} has no text", page_number, path),
            Err(e) => warn!("Failed to extract page {} of {:?}: {}", page_number, path, e),
        }
    }

    let text = texts.join("\n").trim().to_string();
    if text.is_empty() {
        return Err(ReceiptError::NoText(path.to_path_buf()));
    }

    info!("Extracted {} characters from {:?}", text.len(), path);
    Ok(text)
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Per-receipt processing: extract, categorize, sanitize, format, write
//!
//! Each stage either hands its result to the next or ends processing for
//! that receipt. `handle` logs and records every outcome; the watch loop
//! only moves on to the next event.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::csv_format::to_csv;
use crate::extractor::extract_text;
use crate::history::{create_entry, History, Outcome};
use crate::openai::Categorizer;
use crate::output::save_csv;
use crate::sanitizer::parse_reply;
use crate::watcher::is_receipt;
use crate::{AppConfig, ReceiptError, Result};

const PREVIEW_CHARS: usize = 200;

/// Processing stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Categorize,
    Sanitize,
    Format,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Categorize => "categorize",
            Stage::Sanitize => "sanitize",
            Stage::Format => "format",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Runs receipts through every stage with a given categorizer
pub struct ReceiptPipeline<C> {
    categorizer: C,
    output_folder: PathBuf,
    history: Option<History>,
}

impl<C: Categorizer> ReceiptPipeline<C> {
    pub fn new(categorizer: C, config: &AppConfig) -> Self {
        Self {
            categorizer,
            output_folder: config.output_folder.clone(),
            history: Some(History::new(config.history_file.clone())),
        }
    }

    /// Build a pipeline writing to `output_folder`, optionally recording history
    pub fn with_history(categorizer: C, output_folder: PathBuf, history: Option<History>) -> Self {
        Self {
            categorizer,
            output_folder,
            history,
        }
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    /// Process one receipt, returning the path of the CSV written
    pub async fn process(&self, path: &Path) -> Result<PathBuf> {
        if !is_receipt(path) {
            return Err(ReceiptError::NotAReceipt(path.to_path_buf()));
        }

        info!("Processing receipt: {:?}", path);

        let text = extract_text(path)?;
        debug!("Extracted text (preview): {}", preview(&text));

        let reply = self.categorizer.categorize(&text).await?;
        info!("Categorized {:?}", path);

        let data = parse_reply(&reply)?;
        let unknown = data.unknown_categories();
        if !unknown.is_empty() {
            warn!("Model used categories outside the known set: {:?}", unknown);
        }
        debug!("Parsed {} items, {} subtotals", data.items.len(), data.subtotals.len());

        let csv = to_csv(&data)?;
        save_csv(&csv, path, &self.output_folder)
    }

    /// Process one receipt, logging the outcome and recording it in history
    pub async fn handle(&self, path: &Path) -> Result<PathBuf> {
        let result = self.process(path).await;

        let outcome = match &result {
            Ok(output) => {
                info!("Finished {:?} -> {:?}", path, output);
                Outcome::Written { output: output.clone() }
            }
            Err(e) => {
                let stage = e.stage();
                match stage {
                    Some(stage) => error!("Failed to process {:?} at {} stage: {}", path, stage, e),
                    None => error!("Failed to process {:?}: {}", path, e),
                }
                Outcome::Failed {
                    stage,
                    error: e.to_string(),
                }
            }
        };

        if let Some(history) = &self.history {
            if let Err(e) = history.append(&create_entry(path, outcome)) {
                warn!("Failed to record history for {:?}: {}", path, e);
            }
        }

        result
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

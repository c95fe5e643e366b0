// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for receiptwatch

use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::Stage;

/// Result type alias for receiptwatch operations
pub type Result<T> = std::result::Result<T, ReceiptError>;

/// receiptwatch error types
#[derive(Error, Debug)]
pub enum ReceiptError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Not a PDF receipt: {0:?}")]
    NotAReceipt(PathBuf),

    #[error("Cannot read receipt {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("No extractable text in {0:?}")]
    NoText(PathBuf),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Service error: {0}")]
    Service(String),

    #[error("No JSON object found in the response")]
    NoJsonObject,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReceiptError {
    /// Pipeline stage an error belongs to, if it comes from receipt processing
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::NotAReceipt(_) | Self::Unreadable { .. } | Self::Pdf(_) | Self::NoText(_) => {
                Some(Stage::Extract)
            }
            Self::Api(_) | Self::Service(_) => Some(Stage::Categorize),
            Self::NoJsonObject | Self::MalformedResponse(_) => Some(Stage::Sanitize),
            Self::Csv(_) => Some(Stage::Format),
            Self::Persistence { .. } => Some(Stage::Write),
            Self::Config(_) | Self::FileSystem(_) | Self::Watch(_) | Self::Json(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(ReceiptError::NoJsonObject.stage(), Some(Stage::Sanitize));
        assert_eq!(ReceiptError::Service("boom".into()).stage(), Some(Stage::Categorize));
        assert_eq!(ReceiptError::NoText(PathBuf::from("a.pdf")).stage(), Some(Stage::Extract));
        let unreadable = ReceiptError::Unreadable {
            path: PathBuf::from("a.pdf"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(unreadable.stage(), Some(Stage::Extract));
        assert_eq!(ReceiptError::Config("x".into()).stage(), None);
    }

    #[test]
    fn test_no_json_message() {
        assert_eq!(
            ReceiptError::NoJsonObject.to_string(),
            "No JSON object found in the response"
        );
    }
}

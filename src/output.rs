// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Writes rendered CSV files to the output folder

use std::path::{Path, PathBuf};
use tracing::info;

use crate::{ReceiptError, Result};

/// Output location for a receipt: its file stem with a `.csv` extension
pub fn output_path_for(receipt: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = receipt
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ReceiptError::NotAReceipt(receipt.to_path_buf()))?;

    let mut name = stem.to_os_string();
    name.push(".csv");
    Ok(output_dir.join(name))
}

/// Write the CSV for `receipt` into `output_dir`, replacing any earlier file
///
/// The content goes to a temporary sibling first and is renamed into place,
/// so the target is either the complete new CSV or untouched.
pub fn save_csv(csv: &str, receipt: &Path, output_dir: &Path) -> Result<PathBuf> {
    let target = output_path_for(receipt, output_dir)?;
    let persist = |path: &Path, source: std::io::Error| ReceiptError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(output_dir).map_err(|e| persist(output_dir, e))?;

    let mut tmp_name = target.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    std::fs::write(&tmp, csv).map_err(|e| persist(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &target) {
        let _ = std::fs::remove_file(&tmp);
        return Err(persist(&target, e));
    }

    info!("CSV saved to {:?}", target);
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name() {
        let out = output_path_for(Path::new("/inbox/receipt123.pdf"), Path::new("/csv")).unwrap();
        assert_eq!(out, PathBuf::from("/csv/receipt123.csv"));

        let out = output_path_for(Path::new("store.receipt.PDF"), Path::new("out")).unwrap();
        assert_eq!(out, PathBuf::from("out/store.receipt.csv"));
    }

    #[test]
    fn test_output_name_requires_file_name() {
        assert!(output_path_for(Path::new("/"), Path::new("out")).is_err());
    }

    #[test]
    fn test_save_creates_folder_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("csv");
        let receipt = dir.path().join("receipt123.pdf");

        let first = save_csv("a,b\r\n", &receipt, &output_dir).unwrap();
        assert_eq!(first, output_dir.join("receipt123.csv"));
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "a,b\r\n");

        let second = save_csv("c,d\r\n", &receipt, &output_dir).unwrap();
        assert_eq!(second, first);
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "c,d\r\n");

        let names: Vec<_> = std::fs::read_dir(&output_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("receipt123.csv")]);
    }

    #[test]
    fn test_save_failure_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();

        let err = save_csv("x", Path::new("r.pdf"), &blocker).unwrap_err();
        assert!(matches!(err, ReceiptError::Persistence { .. }));
    }
}

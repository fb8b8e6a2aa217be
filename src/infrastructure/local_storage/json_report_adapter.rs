// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Infrastructure adapter for persisting run reports as a JSON array on local storage.
//!
//! The report file for a source always holds a JSON array of run reports.
//! Each run re-reads the file, merges its own entry and rewrites the whole
//! array through a temporary file.

use crate::domain::entities::RunReport;
use crate::domain::errors::{ExportError, Result};
use crate::ports::report_port::ReportPort;
use log::{debug, warn};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// Concrete implementation of `ReportPort` for local filesystem storage.
#[derive(Debug, Default, Clone)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Loads the existing entries, tolerating missing, foreign or corrupt content.
    fn load_existing(&self, report_path: &Path) -> Vec<Value> {
        let content = match fs::read_to_string(report_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(
                    "Existing report {} is unreadable, starting a new one: {}",
                    report_path.display(),
                    e
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(content.trim_start_matches(UTF8_BOM)) {
            Ok(Value::Array(entries)) => entries,
            Ok(obj @ Value::Object(_)) => vec![obj],
            Ok(_) | Err(_) => {
                warn!(
                    "Existing report {} is not a report list, starting a new one",
                    report_path.display()
                );
                Vec::new()
            }
        }
    }

    /// Writes `entries` to a sibling temp file and renames it over `report_path`.
    fn write_atomic(&self, report_path: &Path, entries: &[Value]) -> std::io::Result<()> {
        let temp_path = report_path.with_extension("json.tmp");

        let result = (|| -> std::io::Result<()> {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            fs::rename(&temp_path, report_path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }
}

impl ReportPort for JsonReportAdapter {
    fn append_report(&self, report_path: &Path, report: &RunReport) -> Result<()> {
        let mut entries = self.load_existing(report_path);
        let record = serde_json::to_value(report)
            .map_err(|e| ExportError::ReportWrite(e.to_string()))?;
        entries.push(record);

        self.write_atomic(report_path, &entries).map_err(|e| {
            ExportError::ReportWrite(format!("{}: {}", report_path.display(), e))
        })?;

        debug!(
            "Report {} now holds {} run(s)",
            report_path.display(),
            entries.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RunStatus;

    fn report(message: &str) -> RunReport {
        RunReport {
            timestamp: "2024-01-02 03:04:05".into(),
            target_file: "C:/data/shop.mdb".into(),
            status: RunStatus::Success,
            exported_count: 1,
            exported_files: vec!["Orders.csv".into()],
            output_dir: "C:/data/shop".into(),
            tables_sorted_by_first_column: vec![],
            tables_without_sort_key: vec![],
            warning_messages: vec![],
            message: message.into(),
        }
    }

    fn read_entries(path: &Path) -> Vec<Value> {
        let content = fs::read_to_string(path).unwrap();
        serde_json::from_str::<Vec<Value>>(&content).unwrap()
    }

    #[test]
    fn test_append_to_missing_then_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_report.json");
        let adapter = JsonReportAdapter::new();

        adapter.append_report(&path, &report("R1")).unwrap();
        adapter.append_report(&path, &report("R2")).unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["message"], "R1");
        assert_eq!(entries[1]["message"], "R2");
        assert_eq!(entries[1]["status"], "SUCCESS");
        assert!(!dir.path().join("shop_report.json.tmp").exists());
    }

    #[test]
    fn test_bare_object_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_report.json");
        fs::write(&path, r#"{"message": "R0", "legacy": true}"#).unwrap();

        JsonReportAdapter::new()
            .append_report(&path, &report("R2"))
            .unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["message"], "R0");
        assert_eq!(entries[0]["legacy"], true);
        assert_eq!(entries[1]["message"], "R2");
    }

    #[test]
    fn test_corrupt_content_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_report.json");
        fs::write(&path, "{ not json").unwrap();

        JsonReportAdapter::new()
            .append_report(&path, &report("R2"))
            .unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["message"], "R2");
    }

    #[test]
    fn test_scalar_content_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_report.json");
        fs::write(&path, "42").unwrap();

        JsonReportAdapter::new()
            .append_report(&path, &report("R2"))
            .unwrap();

        assert_eq!(read_entries(&path).len(), 1);
    }

    #[test]
    fn test_bom_prefixed_array_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_report.json");
        fs::write(&path, "\u{feff}[{\"message\": \"R0\"}]").unwrap();

        JsonReportAdapter::new()
            .append_report(&path, &report("R1"))
            .unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["message"], "R0");
    }

    #[test]
    fn test_non_ascii_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_report.json");

        JsonReportAdapter::new()
            .append_report(&path, &report("受注テーブル"))
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("受注テーブル"));
        assert!(content.starts_with("[\n  {"));
    }

    #[test]
    fn test_unwritable_location_is_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("shop_report.json");

        let err = JsonReportAdapter::new()
            .append_report(&path, &report("R1"))
            .unwrap_err();
        assert!(matches!(err, ExportError::ReportWrite(_)));
    }
}

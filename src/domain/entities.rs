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

//! # Domain Entities
//!
//! Entities are the "Nouns" of our application: tables, columns, sort keys,
//! per-table outcomes and the run report.
//!
//! We use the `serde` crate (Serialize/Deserialize) for the types that are
//! persisted into the JSON report.

use crate::domain::errors::{ErrorKind, ExportError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A user table, in the order the source defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    /// Zero-based position in the enumeration.
    pub ordinal_position: usize,
}

/// A column of a table, as reported by the column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub ordinal: i32,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, ordinal: i32) -> Self {
        Self {
            name: name.into(),
            ordinal,
        }
    }
}

/// An entry of the source's internal object catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogObject {
    pub name: String,
    /// Internal creation identifier.
    pub id: i64,
}

/// A key column together with its declared position inside the key.
///
/// `position` is `None` when the driver does not report a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    pub name: String,
    pub position: Option<i32>,
}

impl KeyColumn {
    pub fn new(name: impl Into<String>, position: Option<i32>) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// A unique index candidate, columns in driver order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIndex {
    pub name: String,
    pub columns: Vec<KeyColumn>,
}

/// Which level of the priority chain produced a table's ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortTier {
    PrimaryKey,
    UniqueIndex,
    FirstColumn,
    None,
}

impl fmt::Display for SortTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortTier::PrimaryKey => write!(f, "PRIMARY_KEY"),
            SortTier::UniqueIndex => write!(f, "UNIQUE_INDEX"),
            SortTier::FirstColumn => write!(f, "FIRST_COLUMN"),
            SortTier::None => write!(f, "NONE"),
        }
    }
}

/// Ordering columns for a table.
///
/// `columns` is non-empty exactly when `tier` is not `SortTier::None`;
/// the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    columns: Vec<String>,
    tier: SortTier,
}

impl SortKey {
    /// A key of the given tier. Degrades to `SortKey::none()` when `columns` is empty.
    pub fn new(tier: SortTier, columns: Vec<String>) -> Self {
        if columns.is_empty() || tier == SortTier::None {
            return Self::none();
        }
        Self { columns, tier }
    }

    pub fn none() -> Self {
        Self {
            columns: Vec::new(),
            tier: SortTier::None,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn tier(&self) -> SortTier {
        self.tier
    }

    /// The `ORDER BY` columns, or `None` for the source's native order.
    pub fn order_by(&self) -> Option<&[String]> {
        if self.tier == SortTier::None {
            None
        } else {
            Some(&self.columns)
        }
    }
}

/// A tagged error recorded on an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ExportError> for OutcomeError {
    fn from(e: &ExportError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// The "Report Card" for one table of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub table: String,
    pub output_path: PathBuf,
    pub sort_tier: SortTier,
    /// Rows written. Zero when the export failed.
    pub rows: u64,
    pub error: Option<OutcomeError>,
}

impl ExportOutcome {
    pub fn success(table: &str, output_path: PathBuf, sort_tier: SortTier, rows: u64) -> Self {
        Self {
            table: table.to_string(),
            output_path,
            sort_tier,
            rows,
            error: None,
        }
    }

    pub fn failure(
        table: &str,
        output_path: PathBuf,
        sort_tier: SortTier,
        error: &ExportError,
    ) -> Self {
        Self {
            table: table.to_string(),
            output_path,
            sort_tier,
            rows: 0,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The output file name, without the directory.
    pub fn file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Success,
    #[serde(rename = "FAILED")]
    Failure,
    PartialSuccess,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "SUCCESS"),
            RunStatus::Failure => write!(f, "FAILED"),
            RunStatus::PartialSuccess => write!(f, "PARTIAL_SUCCESS"),
        }
    }
}

/// One entry of the persisted JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: String,
    pub target_file: String,
    pub status: RunStatus,
    pub exported_count: usize,
    pub exported_files: Vec<String>,
    pub output_dir: String,
    pub tables_sorted_by_first_column: Vec<String>,
    pub tables_without_sort_key: Vec<String>,
    /// Full, uncapped warning list.
    pub warning_messages: Vec<String>,
    pub message: String,
}

/// Recognized options of a single export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub write_report: bool,
    /// How many names / warnings the interactive summary shows.
    pub max_popup_warnings: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            write_report: false,
            max_popup_warnings: 5,
        }
    }
}

/// Everything the caller learns about one run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Human-readable summary including the capped warnings.
    pub message: String,
    /// Set when a fatal error short-circuited the run.
    pub error: Option<OutcomeError>,
    pub exported_count: usize,
    pub output_dir: PathBuf,
    pub exported_files: Vec<String>,
    pub tables_sorted_by_first_column: Vec<String>,
    pub tables_without_sort_key: Vec<String>,
    /// Capped list for the interactive summary.
    pub summary_warnings: Vec<String>,
    /// Full list, as persisted in the report.
    pub warnings: Vec<String>,
    pub outcomes: Vec<ExportOutcome>,
    /// Where the report was written, if it was.
    pub report_path: Option<PathBuf>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

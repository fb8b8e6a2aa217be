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

//! Core error definitions for the MDB to CSV exporter.
//!
//! This module provides a centralized `ExportError` enum and a `Result` type
//! used throughout the application. Every error maps onto an `ErrorKind`,
//! the tagged value recorded on run and table outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error types encountered during an export run.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Table listing failed: {0}")]
    Catalog(String),

    #[error("No exportable tables were found")]
    NoTablesFound,

    #[error("Export failed for {table}: {reason}")]
    TableExport { table: String, reason: String },

    #[error("Report could not be written: {0}")]
    ReportWrite(String),

    #[error("Output directory could not be created: {0}")]
    OutputDirectory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Builds a per-table failure from any displayable cause.
    pub fn table(table: &str, reason: impl fmt::Display) -> Self {
        ExportError::TableExport {
            table: table.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The tagged kind recorded on outcomes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::InvalidInput(_) | ExportError::Config(_) => ErrorKind::InvalidInput,
            ExportError::Connection(_) => ErrorKind::Connection,
            ExportError::Catalog(_) => ErrorKind::Catalog,
            ExportError::NoTablesFound => ErrorKind::NoTablesFound,
            ExportError::TableExport { .. } | ExportError::Io(_) => ErrorKind::TableExport,
            ExportError::ReportWrite(_) => ErrorKind::ReportWrite,
            ExportError::OutputDirectory(_) => ErrorKind::OutputDirectory,
        }
    }
}

/// Tagged error classification carried by outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidInput,
    Connection,
    Catalog,
    NoTablesFound,
    TableExport,
    ReportWrite,
    OutputDirectory,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Connection => "CONNECTION",
            ErrorKind::Catalog => "CATALOG",
            ErrorKind::NoTablesFound => "NO_TABLES_FOUND",
            ErrorKind::TableExport => "TABLE_EXPORT",
            ErrorKind::ReportWrite => "REPORT_WRITE",
            ErrorKind::OutputDirectory => "OUTPUT_DIRECTORY",
        };
        write!(f, "{}", name)
    }
}

/// A specialized Result type for the exporter.
pub type Result<T> = std::result::Result<T, ExportError>;

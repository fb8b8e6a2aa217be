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

//! Application configuration and command-line arguments.
//!
//! Settings come from an optional YAML or JSON file; every field has a
//! default so partial files are valid. Command-line flags override the file.

use crate::domain::entities::ExportOptions;
use crate::domain::errors::{ExportError, Result};
use crate::domain::filename::{DEFAULT_MAX_LENGTH, DEFAULT_TABLE_NAME};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DRIVER: &str = "Microsoft Access Driver (*.mdb, *.accdb)";

/// Shortest file name limit that still leaves room for collision suffixes.
pub const MIN_FILENAME_LENGTH: usize = 8;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub export: ExportSettings,
    pub driver: DriverSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportSettings {
    /// Append a run report next to the source file.
    pub write_report: bool,
    pub max_popup_warnings: usize,
    /// Recognized source extensions, compared case-insensitively.
    pub extensions: Vec<String>,
    pub default_table_name: String,
    pub max_filename_length: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            write_report: false,
            max_popup_warnings: 5,
            extensions: vec![".mdb".to_string(), ".accdb".to_string()],
            default_table_name: DEFAULT_TABLE_NAME.to_string(),
            max_filename_length: DEFAULT_MAX_LENGTH,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DriverSettings {
    /// ODBC driver name, without braces.
    pub driver: String,
    /// Appended verbatim to the connection string (e.g. `PWD=...`).
    pub extra_attributes: Option<String>,
    /// Rows fetched per round trip.
    pub batch_size: usize,
    /// Longest text value (bytes) fetched per cell.
    pub max_text_length: usize,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            driver: DEFAULT_DRIVER.to_string(),
            extra_attributes: None,
            batch_size: 500,
            max_text_length: 65536,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Export every table of an Access database to CSV", long_about = None)]
pub struct CliArgs {
    /// Database files to export, processed one after another
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path to configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Append a JSON run report next to each source file
    #[arg(long)]
    pub report: bool,

    /// How many warnings the printed summary lists
    #[arg(long)]
    pub max_popup_warnings: Option<usize>,

    /// ODBC driver name
    #[arg(long)]
    pub driver: Option<String>,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ExportError::Config(format!("{}: {}", path.display(), e)))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            serde_json::from_str(&contents).map_err(|e| ExportError::Config(e.to_string()))?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ExportError::Config(e.to_string()))?
        };

        Ok(config)
    }

    pub fn merge_cli(&mut self, args: &CliArgs) {
        if args.report {
            self.export.write_report = true;
        }
        if let Some(m) = args.max_popup_warnings {
            self.export.max_popup_warnings = m;
        }
        if let Some(d) = &args.driver {
            self.driver.driver = d.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.export.max_filename_length < MIN_FILENAME_LENGTH {
            return Err(ExportError::Config(format!(
                "max_filename_length must be at least {}",
                MIN_FILENAME_LENGTH
            )));
        }
        if self.export.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ExportError::Config(
                "at least one source extension is required".to_string(),
            ));
        }
        if self.driver.batch_size == 0 {
            return Err(ExportError::Config("batch_size must be at least 1".to_string()));
        }
        if self.driver.driver.trim().is_empty() {
            return Err(ExportError::Config("driver name is empty".to_string()));
        }
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            write_report: self.export.write_report,
            max_popup_warnings: self.export.max_popup_warnings,
        }
    }
}

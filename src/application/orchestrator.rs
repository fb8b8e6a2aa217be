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

//! The core application logic that orchestrates one export run.
//!
//! This module coordinates the catalog connector, the table enumerator, the
//! sort key resolver, the CSV exporter and the report port: enumerate,
//! resolve, export, report. Tables are processed strictly one after another
//! in enumeration order, which keeps output names and report contents
//! reproducible.

use crate::application::csv_exporter::export_table;
use crate::application::sort_key_resolver::resolve_sort_key;
use crate::application::table_enumerator::list_tables;
use crate::config::ExportSettings;
use crate::domain::entities::{
    ExportOptions, ExportOutcome, OutcomeError, RunOutcome, RunReport, RunStatus, SortTier,
};
use crate::domain::errors::{ErrorKind, ExportError, Result};
use crate::domain::filename::UniqueNameAllocator;
use crate::domain::warnings::{build_sort_warnings, cap_warnings};
use crate::infrastructure::odbc::DRIVER_HINT;
use crate::ports::catalog_port::CatalogConnector;
use crate::ports::report_port::ReportPort;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Output locations derived from a source file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    /// Sibling directory named after the source's base name.
    pub output_dir: PathBuf,
    /// `<base>_report.json` next to the source.
    pub report_path: PathBuf,
}

impl SourcePaths {
    pub fn for_source(source: &Path) -> Self {
        let parent = source.parent().unwrap_or_else(|| Path::new(""));
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            output_dir: parent.join(&stem),
            report_path: parent.join(format!("{}_report.json", stem)),
        }
    }
}

/// Orchestrates the end-to-end export of one source database file.
pub struct ExportOrchestrator {
    connector: Arc<dyn CatalogConnector>,
    report_port: Arc<dyn ReportPort>,
    settings: ExportSettings,
}

impl ExportOrchestrator {
    /// Creates a new ExportOrchestrator with the provided components.
    pub fn new(
        connector: Arc<dyn CatalogConnector>,
        report_port: Arc<dyn ReportPort>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            connector,
            report_port,
            settings,
        }
    }

    /// Exports every user table of `source_path`.
    ///
    /// Never panics or returns an error for expected failures: fatal
    /// problems come back as a `Failure` outcome tagged with the error kind,
    /// per-table problems as warnings on a `PartialSuccess` outcome.
    pub fn run(&self, source_path: &Path, options: &ExportOptions) -> RunOutcome {
        let start_time = Instant::now();
        info!("Starting export of {}", source_path.display());

        if let Err(e) = self.validate_source(source_path) {
            error!("{}", e);
            return fatal_outcome(PathBuf::new(), &e);
        }

        let paths = SourcePaths::for_source(source_path);
        let mut outcome = match self.export_tables(source_path, &paths.output_dir) {
            Ok(outcomes) => summarize(paths.output_dir.clone(), outcomes, options),
            Err(e) => {
                error!("Export of {} failed: {}", source_path.display(), e);
                fatal_outcome(paths.output_dir.clone(), &e)
            }
        };

        if options.write_report {
            self.write_report(source_path, &paths.report_path, &mut outcome);
        }

        info!(
            "Export of {} finished: {} ({} table(s) in {:.2}s)",
            source_path.display(),
            outcome.status,
            outcome.exported_count,
            start_time.elapsed().as_secs_f64()
        );
        outcome
    }

    fn validate_source(&self, source_path: &Path) -> Result<()> {
        if !source_path.is_file() {
            return Err(ExportError::InvalidInput(format!(
                "file not found: {}",
                source_path.display()
            )));
        }

        let file_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let recognized = self.settings.extensions.iter().any(|ext| {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            !ext.is_empty() && file_name.ends_with(&format!(".{}", ext))
        });
        if !recognized {
            return Err(ExportError::InvalidInput(format!(
                "unsupported file type: {} (expected {})",
                source_path.display(),
                self.settings.extensions.join(", ")
            )));
        }
        Ok(())
    }

    /// Runs the table loop inside one connection scope.
    ///
    /// The catalog is dropped, and the connection released, when this returns.
    fn export_tables(&self, source_path: &Path, output_dir: &Path) -> Result<Vec<ExportOutcome>> {
        let catalog = self.connector.open(source_path)?;

        let tables = list_tables(catalog.as_ref())?;
        if tables.is_empty() {
            return Err(ExportError::NoTablesFound);
        }

        fs::create_dir_all(output_dir).map_err(|e| {
            ExportError::OutputDirectory(format!("{}: {}", output_dir.display(), e))
        })?;

        let mut allocator = UniqueNameAllocator::new(
            &self.settings.default_table_name,
            self.settings.max_filename_length,
        );
        let mut outcomes = Vec::with_capacity(tables.len());

        for table in &tables {
            let sort_key = resolve_sort_key(catalog.as_ref(), &table.name);
            let output_path = allocator.allocate(output_dir, &table.name);
            info!(
                "Exporting {} (order: {} {:?}) -> {}",
                table.name,
                sort_key.tier(),
                sort_key.columns(),
                output_path.display()
            );

            let outcome = match export_table(catalog.as_ref(), &table.name, &sort_key, &output_path)
            {
                Ok(rows) => {
                    info!("Exported {} row(s) from {}", rows, table.name);
                    ExportOutcome::success(&table.name, output_path, sort_key.tier(), rows)
                }
                Err(e) => {
                    warn!("Table {} failed: {}", table.name, e);
                    ExportOutcome::failure(&table.name, output_path, sort_key.tier(), &e)
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    fn write_report(&self, source_path: &Path, report_path: &Path, outcome: &mut RunOutcome) {
        if outcome.error_kind() == Some(ErrorKind::InvalidInput) {
            return;
        }

        let report = build_report(source_path, outcome);
        match self.report_port.append_report(report_path, &report) {
            Ok(()) => {
                info!("Report written to {}", report_path.display());
                outcome.report_path = Some(report_path.to_path_buf());
            }
            Err(e) => {
                warn!("{}", e);
                let warning = e.to_string();
                outcome.message.push_str(&format!("\n\n{}", warning));
                outcome.summary_warnings.push(warning.clone());
                outcome.warnings.push(warning);
                if outcome.status == RunStatus::Success {
                    outcome.status = RunStatus::PartialSuccess;
                }
            }
        }
    }
}

fn with_tier(outcomes: &[ExportOutcome], tier: SortTier) -> Vec<String> {
    outcomes
        .iter()
        .filter(|o| o.sort_tier == tier)
        .map(|o| o.table.clone())
        .collect()
}

fn summarize(output_dir: PathBuf, outcomes: Vec<ExportOutcome>, options: &ExportOptions) -> RunOutcome {
    let exported_files: Vec<String> = outcomes
        .iter()
        .filter(|o| o.is_success())
        .map(|o| o.file_name())
        .collect();
    let exported_count = exported_files.len();
    let failed_count = outcomes.len() - exported_count;

    let status = if exported_count == 0 {
        RunStatus::Failure
    } else if failed_count > 0 {
        RunStatus::PartialSuccess
    } else {
        RunStatus::Success
    };

    let tables_sorted_by_first_column = with_tier(&outcomes, SortTier::FirstColumn);
    let tables_without_sort_key = with_tier(&outcomes, SortTier::None);

    let failure_warnings: Vec<String> = outcomes
        .iter()
        .filter_map(|o| {
            o.error
                .as_ref()
                .map(|e| format!("Table '{}' was not exported: {}", o.table, e.message))
        })
        .collect();

    let mut warnings =
        build_sort_warnings(&tables_sorted_by_first_column, &tables_without_sort_key, None);
    warnings.extend(failure_warnings.iter().cloned());

    let mut summary_warnings = build_sort_warnings(
        &tables_sorted_by_first_column,
        &tables_without_sort_key,
        Some(options.max_popup_warnings),
    );
    summary_warnings.extend(cap_warnings(&failure_warnings, options.max_popup_warnings));

    let mut message = match status {
        RunStatus::Success => format!(
            "{} table(s) exported to CSV.\nOutput: {}",
            exported_count,
            output_dir.display()
        ),
        RunStatus::PartialSuccess => format!(
            "{} of {} table(s) exported to CSV ({} failed).\nOutput: {}",
            exported_count,
            outcomes.len(),
            failed_count,
            output_dir.display()
        ),
        RunStatus::Failure => format!(
            "No table could be exported ({} failed).\nOutput: {}",
            failed_count,
            output_dir.display()
        ),
    };
    for warning in &summary_warnings {
        message.push_str("\n\n");
        message.push_str(warning);
    }

    let error = if status == RunStatus::Failure {
        outcomes.iter().find_map(|o| o.error.clone())
    } else {
        None
    };

    RunOutcome {
        status,
        message,
        error,
        exported_count,
        output_dir,
        exported_files,
        tables_sorted_by_first_column,
        tables_without_sort_key,
        summary_warnings,
        warnings,
        outcomes,
        report_path: None,
    }
}

fn fatal_message(e: &ExportError) -> String {
    match e {
        ExportError::Connection(details) => format!(
            "Failed to connect to the database file.\n{}\nDetails: {}",
            DRIVER_HINT, details
        ),
        ExportError::NoTablesFound => "No exportable tables were found.".to_string(),
        other => other.to_string(),
    }
}

fn fatal_outcome(output_dir: PathBuf, e: &ExportError) -> RunOutcome {
    RunOutcome {
        status: RunStatus::Failure,
        message: fatal_message(e),
        error: Some(OutcomeError::from(e)),
        exported_count: 0,
        output_dir,
        exported_files: Vec::new(),
        tables_sorted_by_first_column: Vec::new(),
        tables_without_sort_key: Vec::new(),
        summary_warnings: Vec::new(),
        warnings: Vec::new(),
        outcomes: Vec::new(),
        report_path: None,
    }
}

/// The persisted form of an outcome: full warnings, single-line message.
fn build_report(source_path: &Path, outcome: &RunOutcome) -> RunReport {
    let mut message = outcome
        .message
        .split("\n\n")
        .next()
        .unwrap_or_default()
        .to_string();
    for warning in &outcome.warnings {
        message.push_str("\n\n");
        message.push_str(warning);
    }

    RunReport {
        timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        target_file: source_path.display().to_string(),
        status: outcome.status,
        exported_count: outcome.exported_count,
        exported_files: outcome.exported_files.clone(),
        output_dir: outcome.output_dir.display().to_string(),
        tables_sorted_by_first_column: outcome.tables_sorted_by_first_column.clone(),
        tables_without_sort_key: outcome.tables_without_sort_key.clone(),
        warning_messages: outcome.warnings.clone(),
        message: message.replace("\r\n", " ").replace('\n', " "),
    }
}

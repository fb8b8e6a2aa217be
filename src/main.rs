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

//! # mdb2csv
//!
//! Command-line entry point: exports each given database file in turn and
//! prints the run summary.

use clap::Parser;
use log::{error, info, warn};
use mdb_csv_exporter::application::orchestrator::ExportOrchestrator;
use mdb_csv_exporter::config::{AppConfig, CliArgs};
use mdb_csv_exporter::domain::entities::RunStatus;
use mdb_csv_exporter::infrastructure::local_storage::json_report_adapter::JsonReportAdapter;
use mdb_csv_exporter::infrastructure::odbc::default_connector;
use std::process;
use std::sync::Arc;

fn main() {
    // 1. Initialize Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Load Config
    let mut config = match &args.config {
        Some(config_path) => match AppConfig::from_file(config_path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    // Merge CLI overrides
    config.merge_cli(&args);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    // 4. Initialize Hexagonal Components
    let connector = default_connector(&config.driver);
    let report_port = Arc::new(JsonReportAdapter::new());
    let orchestrator = ExportOrchestrator::new(connector, report_port, config.export.clone());
    let options = config.export_options();

    // 5. Run Orchestrator, one source at a time
    let mut failed = 0;
    for path in &args.paths {
        let outcome = orchestrator.run(path, &options);
        println!("[{}] {}", outcome.status, path.display());
        println!("{}", outcome.message);
        println!();

        match outcome.status {
            RunStatus::Failure => failed += 1,
            RunStatus::PartialSuccess => warn!("{} finished with warnings", path.display()),
            RunStatus::Success => {}
        }
    }

    info!(
        "Export finished. {}/{} file(s) exported.",
        args.paths.len() - failed,
        args.paths.len()
    );
    if failed > 0 {
        process::exit(1);
    }
}

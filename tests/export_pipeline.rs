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

use mdb_csv_exporter::application::orchestrator::ExportOrchestrator;
use mdb_csv_exporter::config::ExportSettings;
use mdb_csv_exporter::domain::entities::{ExportOptions, RunReport, RunStatus};
use mdb_csv_exporter::domain::errors::ErrorKind;
use mdb_csv_exporter::infrastructure::local_storage::json_report_adapter::JsonReportAdapter;
use mdb_csv_exporter::infrastructure::memory::memory_catalog::{
    InMemoryCatalog, InMemoryConnector, MemoryTable,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn orchestrator(catalog: InMemoryCatalog) -> ExportOrchestrator {
    ExportOrchestrator::new(
        Arc::new(InMemoryConnector::new(catalog)),
        Arc::new(JsonReportAdapter::new()),
        ExportSettings::default(),
    )
}

fn source_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"").unwrap();
    path
}

fn csv_text(path: &Path) -> String {
    let bytes = fs::read(path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "missing BOM in {}", path.display());
    String::from_utf8(bytes[3..].to_vec()).unwrap()
}

fn reports(path: &Path) -> Vec<RunReport> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn with_report() -> ExportOptions {
    ExportOptions {
        write_report: true,
        ..Default::default()
    }
}

fn shop() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_table(
            MemoryTable::new("Orders", &["OrderID", "Customer", "Total"])
                .primary_key(&["OrderID"])
                .text_row(&["3", "Carol", "7.50"])
                .text_row(&["1", "Alice", "12.00"])
                .text_row(&["2", "Bob, Jr.", "3.25"]),
        )
        .with_table(
            MemoryTable::new("Notes", &["ID", "Text"])
                .row(&[Some("20"), None])
                .text_row(&["10", "first \"note\""]),
        )
}

#[test]
fn test_exports_every_table_in_key_order() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_file(dir.path(), "shop.mdb");

    let outcome = orchestrator(shop()).run(&source, &with_report());

    assert_eq!(outcome.status, RunStatus::Success);
    assert_eq!(outcome.output_dir, dir.path().join("shop"));
    assert_eq!(outcome.exported_files, vec!["Orders.csv", "Notes.csv"]);
    assert_eq!(outcome.tables_sorted_by_first_column, vec!["Notes"]);
    assert!(outcome.tables_without_sort_key.is_empty());

    assert_eq!(
        csv_text(&dir.path().join("shop").join("Orders.csv")),
        "OrderID,Customer,Total\r\n1,Alice,12.00\r\n2,\"Bob, Jr.\",3.25\r\n3,Carol,7.50\r\n"
    );
    assert_eq!(
        csv_text(&dir.path().join("shop").join("Notes.csv")),
        "ID,Text\r\n10,\"first \"\"note\"\"\"\r\n20,\r\n"
    );

    let entries = reports(&dir.path().join("shop_report.json"));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, RunStatus::Success);
    assert_eq!(entries[0].exported_count, 2);
    assert_eq!(entries[0].tables_sorted_by_first_column, vec!["Notes"]);
    assert!(entries[0].target_file.ends_with("shop.mdb"));
}

#[test]
fn test_repeated_runs_are_byte_identical_and_append_reports() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_file(dir.path(), "shop.mdb");
    let orchestrator = orchestrator(shop());
    let orders = dir.path().join("shop").join("Orders.csv");

    orchestrator.run(&source, &with_report());
    let first = fs::read(&orders).unwrap();
    orchestrator.run(&source, &with_report());

    assert_eq!(fs::read(&orders).unwrap(), first);
    assert_eq!(reports(&dir.path().join("shop_report.json")).len(), 2);
}

#[test]
fn test_colliding_names_get_numeric_suffixes() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_file(dir.path(), "names.accdb");
    let catalog = InMemoryCatalog::new()
        .with_table(MemoryTable::new("A/B", &["ID"]).text_row(&["1"]))
        .with_table(MemoryTable::new("A?B", &["ID"]).text_row(&["2"]))
        .with_table(MemoryTable::new("CON", &["ID"]));

    let outcome = orchestrator(catalog).run(&source, &ExportOptions::default());

    assert_eq!(outcome.exported_files, vec!["A_B.csv", "A_B_1.csv", "CON_.csv"]);
    let out = dir.path().join("names");
    assert_eq!(csv_text(&out.join("A_B.csv")), "ID\r\n1\r\n");
    assert_eq!(csv_text(&out.join("A_B_1.csv")), "ID\r\n2\r\n");
}

#[test]
fn test_zero_tables_is_failure_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_file(dir.path(), "empty.mdb");

    let outcome = orchestrator(InMemoryCatalog::new()).run(&source, &with_report());

    assert_eq!(outcome.status, RunStatus::Failure);
    assert_eq!(outcome.error_kind(), Some(ErrorKind::NoTablesFound));
    assert!(!dir.path().join("empty").exists());

    let entries = reports(&dir.path().join("empty_report.json"));
    assert_eq!(entries[0].status, RunStatus::Failure);
    assert_eq!(entries[0].exported_count, 0);
    assert!(entries[0].exported_files.is_empty());
}

#[test]
fn test_generic_listing_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_file(dir.path(), "locked.mdb");
    let catalog = InMemoryCatalog::new()
        .with_table(MemoryTable::new("Zeta", &["ID"]))
        .with_table(MemoryTable::new("Alpha", &["ID"]))
        .without_internal_catalog();

    let outcome = orchestrator(catalog).run(&source, &ExportOptions::default());

    assert!(outcome.is_success());
    assert_eq!(outcome.exported_files, vec!["Alpha.csv", "Zeta.csv"]);
}

#[test]
fn test_table_without_any_key_is_exported_unordered() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_file(dir.path(), "raw.mdb");
    let mut table = MemoryTable::new("Log", &["Line"])
        .text_row(&["b"])
        .text_row(&["a"]);
    table.columns_unavailable = true;
    let catalog = InMemoryCatalog::new().with_table(table);

    let outcome = orchestrator(catalog.clone()).run(&source, &with_report());

    assert!(outcome.is_success());
    assert_eq!(outcome.tables_without_sort_key, vec!["Log"]);
    assert_eq!(csv_text(&dir.path().join("raw").join("Log.csv")), "Line\r\nb\r\na\r\n");
    assert_eq!(catalog.stream_requests()[0].order_by, None);

    let entries = reports(&dir.path().join("raw_report.json"));
    assert!(entries[0].warning_messages[0].contains("without ORDER BY"));
}

#[test]
fn test_unique_index_table_is_ordered_and_not_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_file(dir.path(), "catalogue.mdb");
    let mut products = MemoryTable::new("Products", &["Name", "Code"])
        .unique_index("UX_Code", &["Code"])
        .text_row(&["Widget", "30"])
        .text_row(&["Gadget", "10"])
        .text_row(&["Gizmo", "20"]);
    products.primary_key_unavailable = true;
    let catalog = InMemoryCatalog::new().with_table(products);

    let outcome = orchestrator(catalog.clone()).run(&source, &with_report());

    assert!(outcome.is_success());
    assert!(outcome.tables_sorted_by_first_column.is_empty());
    assert!(outcome.tables_without_sort_key.is_empty());
    assert!(outcome.warnings.is_empty());
    assert_eq!(
        catalog.stream_requests()[0].order_by,
        Some(vec!["Code".to_string()])
    );
    assert_eq!(
        csv_text(&dir.path().join("catalogue").join("Products.csv")),
        "Name,Code\r\nGadget,10\r\nGizmo,20\r\nWidget,30\r\n"
    );

    let entries = reports(&dir.path().join("catalogue_report.json"));
    assert!(entries[0].tables_sorted_by_first_column.is_empty());
    assert!(entries[0].tables_without_sort_key.is_empty());
    assert!(entries[0].warning_messages.is_empty());
}

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

//! Streams one table into a CSV file.
//!
//! Output is UTF-8 with a byte-order mark, comma-delimited, CRLF-terminated,
//! with a header row and RFC 4180 quoting. Rows are written as they arrive
//! from the catalog; nothing beyond the current driver batch is buffered.

use crate::domain::entities::SortKey;
use crate::domain::errors::{ExportError, Result};
use crate::ports::catalog_port::{CatalogPort, RowStream};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Exports `table` to `output_path` and returns the number of data rows.
///
/// The query runs before the file is opened, so a failing query leaves any
/// existing file untouched. A failure after that removes the partially
/// written file; files of other tables are never touched.
pub fn export_table(
    catalog: &dyn CatalogPort,
    table: &str,
    sort_key: &SortKey,
    output_path: &Path,
) -> Result<u64> {
    let mut rows = catalog
        .stream_rows(table, sort_key.order_by())
        .map_err(|e| as_table_error(table, e))?;

    let file = File::create(output_path).map_err(|e| ExportError::table(table, e))?;
    let result = write_rows(table, rows.as_mut(), file);
    if result.is_err() {
        if let Err(e) = fs::remove_file(output_path) {
            warn!(
                "Could not remove partial file {}: {}",
                output_path.display(),
                e
            );
        }
    }
    if let Ok(count) = &result {
        debug!("Wrote {} row(s) of {} to {}", count, table, output_path.display());
    }
    result
}

fn write_rows(table: &str, rows: &mut dyn RowStream, file: File) -> Result<u64> {
    let mut buf_writer = BufWriter::with_capacity(128 * 1024, file);
    buf_writer
        .write_all(UTF8_BOM)
        .map_err(|e| ExportError::table(table, e))?;

    let mut wtr = WriterBuilder::new()
        .delimiter(b',')
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(buf_writer);

    if !rows.columns().is_empty() {
        wtr.write_record(rows.columns())
            .map_err(|e| ExportError::table(table, e))?;
    }

    let mut count: u64 = 0;
    while let Some(row) = rows.next_row().map_err(|e| as_table_error(table, e))? {
        wtr.write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))
            .map_err(|e| ExportError::table(table, e))?;
        count += 1;
    }

    let mut buf_writer = wtr
        .into_inner()
        .map_err(|e| ExportError::table(table, e.error()))?;
    buf_writer
        .flush()
        .map_err(|e| ExportError::table(table, e))?;
    Ok(count)
}

fn as_table_error(table: &str, e: ExportError) -> ExportError {
    match e {
        ExportError::TableExport { .. } => e,
        other => ExportError::table(table, other),
    }
}

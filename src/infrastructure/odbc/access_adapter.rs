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

//! Infrastructure adapter for reading Access databases through ODBC.
//!
//! One `AccessOdbcCatalog` wraps exactly one ODBC connection. Catalog
//! functions that `odbc-api` does not wrap (`SQLPrimaryKeysW`,
//! `SQLStatisticsW`) are declared here, issued on a raw statement handle and
//! read back through the regular cursor machinery.
//!
//! All text is bound as UTF-16 (`SQL_C_WCHAR`) so the driver converts from
//! the database's code page itself.

use crate::config::DriverSettings;
use crate::domain::entities::{CatalogObject, ColumnDescriptor, KeyColumn, UniqueIndex};
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::odbc::catalog_rows;
use crate::infrastructure::odbc::sql_utils::{
    build_connection_string, build_select_query, SQL_INTERNAL_CATALOG,
};
use crate::ports::catalog_port::{CatalogConnector, CatalogPort, Row, RowStream};
use log::{debug, info};
use odbc_api::buffers::{ColumnarBuffer, TextColumn, WCharColumn};
use odbc_api::handles::{Statement, StatementImpl};
use odbc_api::sys::{HStmt, SmallInt, SqlReturn, USmallInt, WChar};
use odbc_api::{
    BlockCursor, Connection, ConnectionOptions, Cursor, CursorImpl, Environment, ResultSetMetadata,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::OnceLock;

const CATALOG_BATCH_SIZE: usize = 256;
const CATALOG_MAX_STR: usize = 1024;

const SQL_INDEX_UNIQUE: USmallInt = 0;
const SQL_QUICK: USmallInt = 0;

#[cfg_attr(windows, link(name = "odbc32"))]
#[cfg_attr(not(windows), link(name = "odbc"))]
extern "system" {
    fn SQLPrimaryKeysW(
        statement_handle: HStmt,
        catalog_name: *const WChar,
        catalog_name_length: SmallInt,
        schema_name: *const WChar,
        schema_name_length: SmallInt,
        table_name: *const WChar,
        table_name_length: SmallInt,
    ) -> SqlReturn;

    fn SQLStatisticsW(
        statement_handle: HStmt,
        catalog_name: *const WChar,
        catalog_name_length: SmallInt,
        schema_name: *const WChar,
        schema_name_length: SmallInt,
        table_name: *const WChar,
        table_name_length: SmallInt,
        unique: USmallInt,
        reserved: USmallInt,
    ) -> SqlReturn;
}

type WideRowSet = ColumnarBuffer<WCharColumn>;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|e| {
        ExportError::Connection(format!("ODBC driver manager unavailable: {}", e))
    })?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

/// Opens Access database files through the configured ODBC driver.
pub struct AccessOdbcConnector {
    settings: DriverSettings,
}

impl AccessOdbcConnector {
    pub fn new(settings: DriverSettings) -> Self {
        Self { settings }
    }
}

impl CatalogConnector for AccessOdbcConnector {
    fn open(&self, source: &Path) -> Result<Box<dyn CatalogPort>> {
        let conn_str = build_connection_string(
            &self.settings.driver,
            &source.to_string_lossy(),
            self.settings.extra_attributes.as_deref(),
        );
        info!("Connecting via ODBC driver {{{}}}", self.settings.driver);

        let conn = environment()?
            .connect_with_connection_string(&conn_str, ConnectionOptions::default())
            .map_err(|e| ExportError::Connection(e.to_string()))?;

        Ok(Box::new(AccessOdbcCatalog {
            conn,
            batch_size: self.settings.batch_size,
            max_text_length: self.settings.max_text_length,
        }))
    }
}

/// Concrete implementation of `CatalogPort` over one ODBC connection.
pub struct AccessOdbcCatalog {
    conn: Connection<'static>,
    batch_size: usize,
    max_text_length: usize,
}

fn catalog_err(e: odbc_api::Error) -> ExportError {
    ExportError::Catalog(e.to_string())
}

/// Binds every result column as UTF-16 text, each capped at `max_str_len` characters.
fn wide_row_set(
    batch_size: usize,
    cursor: &mut impl ResultSetMetadata,
    max_str_len: usize,
) -> std::result::Result<WideRowSet, odbc_api::Error> {
    let num_cols = cursor.num_result_cols()?.max(0) as u16;
    let mut columns = Vec::with_capacity(num_cols as usize);
    for col_index in 1..=num_cols {
        let len = cursor
            .col_display_size(col_index)?
            .map(|n| n.get().min(max_str_len))
            .unwrap_or(max_str_len)
            .max(1);
        columns.push((col_index, TextColumn::new(batch_size, len)));
    }
    Ok(ColumnarBuffer::new(columns))
}

fn batch_rows(batch: &WideRowSet) -> Vec<Row> {
    let views: Vec<_> = (0..batch.num_cols()).map(|c| batch.column(c)).collect();
    (0..batch.num_rows())
        .map(|r| {
            views
                .iter()
                .map(|view| view.get(r).map(String::from_utf16_lossy))
                .collect()
        })
        .collect()
}

/// Drains a (small) metadata cursor into rows of text.
fn read_all(mut cursor: impl Cursor) -> std::result::Result<Vec<Row>, odbc_api::Error> {
    let buffer = wide_row_set(CATALOG_BATCH_SIZE, &mut cursor, CATALOG_MAX_STR)?;
    let mut block = cursor.bind_buffer(buffer)?;
    let mut rows = Vec::new();
    while let Some(batch) = block.fetch()? {
        rows.extend(batch_rows(batch));
    }
    Ok(rows)
}

fn wide(text: &str) -> Result<Vec<WChar>> {
    let encoded: Vec<WChar> = text.encode_utf16().collect();
    if encoded.len() > SmallInt::MAX as usize {
        return Err(ExportError::Catalog(format!("table name too long: {}", text)));
    }
    Ok(encoded)
}

impl AccessOdbcCatalog {
    /// Runs a raw ODBC catalog function on a fresh statement and reads its result set.
    fn raw_catalog_call(
        &self,
        function: &str,
        call: impl FnOnce(HStmt) -> SqlReturn,
    ) -> Result<Vec<Row>> {
        let statement: StatementImpl<'_> = self
            .conn
            .preallocate()
            .map_err(catalog_err)?
            .into_statement();

        let ret = call(statement.as_sys());
        if ret == SqlReturn::ERROR || ret == SqlReturn::INVALID_HANDLE {
            return Err(ExportError::Catalog(format!("{} failed", function)));
        }

        // SAFETY: the catalog function succeeded, so the statement holds an open result set.
        let cursor = unsafe { CursorImpl::new(statement) };
        read_all(cursor).map_err(catalog_err)
    }
}

impl CatalogPort for AccessOdbcCatalog {
    fn list_internal_catalog(&self) -> Result<Vec<CatalogObject>> {
        let cursor = self
            .conn
            .execute(SQL_INTERNAL_CATALOG, ())
            .map_err(catalog_err)?
            .ok_or_else(|| ExportError::Catalog("MSysObjects returned no result set".into()))?;
        let rows = read_all(cursor).map_err(catalog_err)?;
        Ok(catalog_rows::catalog_objects(&rows))
    }

    fn list_tables_generic(&self) -> Result<Vec<String>> {
        let cursor = self.conn.tables("", "", "", "TABLE").map_err(catalog_err)?;
        let rows = read_all(cursor).map_err(catalog_err)?;
        Ok(catalog_rows::table_names(&rows))
    }

    fn primary_key_columns(&self, table: &str) -> Result<Vec<KeyColumn>> {
        let name = wide(table)?;
        let rows = self.raw_catalog_call("SQLPrimaryKeysW", |hstmt| unsafe {
            SQLPrimaryKeysW(
                hstmt,
                std::ptr::null(),
                0,
                std::ptr::null(),
                0,
                name.as_ptr(),
                name.len() as SmallInt,
            )
        })?;
        Ok(catalog_rows::primary_key_columns(&rows))
    }

    fn unique_index_candidates(&self, table: &str) -> Result<Vec<UniqueIndex>> {
        let name = wide(table)?;
        let rows = self.raw_catalog_call("SQLStatisticsW", |hstmt| unsafe {
            SQLStatisticsW(
                hstmt,
                std::ptr::null(),
                0,
                std::ptr::null(),
                0,
                name.as_ptr(),
                name.len() as SmallInt,
                SQL_INDEX_UNIQUE,
                SQL_QUICK,
            )
        })?;

        let indexes = catalog_rows::unique_indexes(&rows);
        debug!("{} unique index candidate(s) for {}", indexes.len(), table);
        Ok(indexes)
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let cursor = self.conn.columns("", "", table, "").map_err(catalog_err)?;
        let rows = read_all(cursor).map_err(catalog_err)?;
        Ok(catalog_rows::column_descriptors(&rows))
    }

    fn stream_rows<'a>(
        &'a self,
        table: &str,
        order_by: Option<&[String]>,
    ) -> Result<Box<dyn RowStream + 'a>> {
        let sql = build_select_query(table, order_by);
        debug!("Executing: {}", sql);

        let mut cursor = self
            .conn
            .execute(&sql, ())
            .map_err(|e| ExportError::table(table, e))?
            .ok_or_else(|| ExportError::table(table, "query returned no result set"))?;

        let columns = cursor
            .column_names()
            .map_err(|e| ExportError::table(table, e))?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(|e| ExportError::table(table, e))?;

        let buffer = wide_row_set(self.batch_size, &mut cursor, self.max_text_length)
            .map_err(|e| ExportError::table(table, e))?;
        let block = cursor
            .bind_buffer(buffer)
            .map_err(|e| ExportError::table(table, e))?;

        Ok(Box::new(OdbcRowStream {
            table: table.to_string(),
            columns,
            block,
            pending: VecDeque::new(),
            exhausted: false,
        }))
    }
}

/// Streams rows batch by batch; only one batch is held at a time.
struct OdbcRowStream<'a> {
    table: String,
    columns: Vec<String>,
    block: BlockCursor<CursorImpl<StatementImpl<'a>>, WideRowSet>,
    pending: VecDeque<Row>,
    exhausted: bool,
}

impl RowStream for OdbcRowStream<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        if self.pending.is_empty() && !self.exhausted {
            match self
                .block
                .fetch_with_truncation_check(true)
                .map_err(|e| ExportError::table(&self.table, e))?
            {
                Some(batch) => self.pending.extend(batch_rows(batch)),
                None => self.exhausted = true,
            }
        }
        Ok(self.pending.pop_front())
    }
}

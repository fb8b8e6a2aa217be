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

//! In-memory implementation of the catalog port.
//!
//! Holds tables, keys and rows in plain vectors and emulates the driver's
//! `ORDER BY`. Individual capabilities can be switched off to exercise the
//! fallback paths of the pipeline.

use crate::domain::entities::{CatalogObject, ColumnDescriptor, KeyColumn, UniqueIndex};
use crate::domain::errors::{ExportError, Result};
use crate::ports::catalog_port::{CatalogConnector, CatalogPort, Row, RowStream};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A table held by `InMemoryCatalog`.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub name: String,
    pub columns: Vec<String>,
    pub primary_key: Vec<KeyColumn>,
    pub unique_indexes: Vec<UniqueIndex>,
    pub rows: Vec<Row>,
    /// `columns()` fails for this table.
    pub columns_unavailable: bool,
    /// `primary_key_columns()` fails for this table.
    pub primary_key_unavailable: bool,
    /// `stream_rows()` fails for this table.
    pub stream_fails: bool,
    /// The row stream fails after yielding this many rows.
    pub fail_after_rows: Option<usize>,
}

impl MemoryTable {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Declares the primary key; key sequence follows slice order.
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns
            .iter()
            .enumerate()
            .map(|(i, c)| KeyColumn::new(*c, Some(i as i32 + 1)))
            .collect();
        self
    }

    pub fn unique_index(mut self, name: &str, columns: &[&str]) -> Self {
        self.unique_indexes.push(UniqueIndex {
            name: name.to_string(),
            columns: columns
                .iter()
                .enumerate()
                .map(|(i, c)| KeyColumn::new(*c, Some(i as i32 + 1)))
                .collect(),
        });
        self
    }

    pub fn row(mut self, values: &[Option<&str>]) -> Self {
        self.rows
            .push(values.iter().map(|v| v.map(str::to_string)).collect());
        self
    }

    pub fn text_row(self, values: &[&str]) -> Self {
        let values: Vec<Option<&str>> = values.iter().map(|v| Some(*v)).collect();
        self.row(&values)
    }
}

/// A `stream_rows` call observed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub table: String,
    pub order_by: Option<Vec<String>>,
}

/// Fake catalog for tests and dry runs.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    tables: Vec<MemoryTable>,
    internal_catalog_available: bool,
    generic_listing_available: bool,
    requests: Arc<Mutex<Vec<StreamRequest>>>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            internal_catalog_available: true,
            generic_listing_available: true,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a table; creation order is insertion order.
    pub fn with_table(mut self, table: MemoryTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn without_internal_catalog(mut self) -> Self {
        self.internal_catalog_available = false;
        self
    }

    pub fn without_generic_listing(mut self) -> Self {
        self.generic_listing_available = false;
        self
    }

    /// Every `stream_rows` call so far, across clones of this catalog.
    pub fn stream_requests(&self) -> Vec<StreamRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ExportError::table(name, "no such table"))
    }
}

impl CatalogPort for InMemoryCatalog {
    fn list_internal_catalog(&self) -> Result<Vec<CatalogObject>> {
        if !self.internal_catalog_available {
            return Err(ExportError::Catalog(
                "no read permission on MSysObjects".to_string(),
            ));
        }
        Ok(self
            .tables
            .iter()
            .enumerate()
            .map(|(i, t)| CatalogObject {
                name: t.name.clone(),
                id: (i as i64 + 1) * 10,
            })
            .collect())
    }

    fn list_tables_generic(&self) -> Result<Vec<String>> {
        if !self.generic_listing_available {
            return Err(ExportError::Catalog("connection lost".to_string()));
        }
        let mut names: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    fn primary_key_columns(&self, table: &str) -> Result<Vec<KeyColumn>> {
        let t = self.table(table)?;
        if t.primary_key_unavailable {
            return Err(ExportError::table(table, "SQLPrimaryKeys not supported"));
        }
        Ok(t.primary_key.clone())
    }

    fn unique_index_candidates(&self, table: &str) -> Result<Vec<UniqueIndex>> {
        Ok(self.table(table)?.unique_indexes.clone())
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let t = self.table(table)?;
        if t.columns_unavailable {
            return Err(ExportError::table(table, "column metadata unavailable"));
        }
        Ok(t.columns
            .iter()
            .enumerate()
            .map(|(i, c)| ColumnDescriptor::new(c.clone(), i as i32 + 1))
            .collect())
    }

    fn stream_rows<'a>(
        &'a self,
        table: &str,
        order_by: Option<&[String]>,
    ) -> Result<Box<dyn RowStream + 'a>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(StreamRequest {
                table: table.to_string(),
                order_by: order_by.map(|cols| cols.to_vec()),
            });
        }

        let t = self.table(table)?;
        if t.stream_fails {
            return Err(ExportError::table(table, "query failed"));
        }

        let mut rows = t.rows.clone();
        if let Some(order_by) = order_by {
            let mut positions = Vec::with_capacity(order_by.len());
            for col in order_by {
                let pos = t
                    .columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(col))
                    .ok_or_else(|| ExportError::table(table, format!("unknown column {}", col)))?;
                positions.push(pos);
            }
            rows.sort_by(|a, b| compare_rows(a, b, &positions));
        }

        Ok(Box::new(MemoryRowStream {
            columns: t.columns.clone(),
            rows: rows.into_iter(),
            fail_after_rows: t.fail_after_rows,
            emitted: 0,
        }))
    }
}

// NULLs sort first; values that both parse as integers compare numerically.
fn compare_rows(a: &Row, b: &Row, positions: &[usize]) -> Ordering {
    for &pos in positions {
        let left = a.get(pos).cloned().flatten();
        let right = b.get(pos).cloned().flatten();
        let ord = match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) => match (l.parse::<i64>(), r.parse::<i64>()) {
                (Ok(l), Ok(r)) => l.cmp(&r),
                _ => l.cmp(&r),
            },
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

struct MemoryRowStream {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Row>,
    fail_after_rows: Option<usize>,
    emitted: usize,
}

impl RowStream for MemoryRowStream {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        if self.fail_after_rows == Some(self.emitted) {
            return Err(ExportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "connection dropped while fetching",
            )));
        }
        let row = self.rows.next();
        if row.is_some() {
            self.emitted += 1;
        }
        Ok(row)
    }
}

/// Connector handing out clones of one in-memory catalog.
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    catalog: InMemoryCatalog,
    available: bool,
}

impl InMemoryConnector {
    pub fn new(catalog: InMemoryCatalog) -> Self {
        Self {
            catalog,
            available: true,
        }
    }

    /// A connector whose driver is missing.
    pub fn unavailable() -> Self {
        Self {
            catalog: InMemoryCatalog::new(),
            available: false,
        }
    }
}

impl CatalogConnector for InMemoryConnector {
    fn open(&self, source: &Path) -> Result<Box<dyn CatalogPort>> {
        if !self.available {
            return Err(ExportError::Connection(format!(
                "driver not available for {}",
                source.display()
            )));
        }
        Ok(Box::new(self.catalog.clone()))
    }
}

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

//! # Catalog Port
//!
//! In Hexagonal Architecture, a **Port** is like a "Slot" or a "Contract".
//!
//! This Port defines the narrow set of capabilities the export pipeline needs
//! from the database driver: listing tables, reading key and column metadata,
//! and streaming rows. It doesn't care IF the source is an Access file behind
//! ODBC or an in-memory fake for testing.

use crate::domain::entities::{CatalogObject, ColumnDescriptor, KeyColumn, UniqueIndex};
use crate::domain::errors::Result;
use std::path::Path;

/// One row of a table. `None` is a SQL NULL.
pub type Row = Vec<Option<String>>;

/// Rows of a single query, pulled one at a time.
pub trait RowStream {
    /// Column names in projection order.
    fn columns(&self) -> &[String];

    /// The next row, or `Ok(None)` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<Row>>;
}

/// `CatalogPort` is the contract between the pipeline and a connected source.
///
/// Every metadata method may fail; callers decide whether a failure is fatal.
pub trait CatalogPort {
    /// Entries of the source's internal object catalog.
    fn list_internal_catalog(&self) -> Result<Vec<CatalogObject>>;

    /// Table names from the driver's generic table listing, in driver order.
    fn list_tables_generic(&self) -> Result<Vec<String>>;

    /// Declared primary-key columns.
    fn primary_key_columns(&self, table: &str) -> Result<Vec<KeyColumn>>;

    /// Unique indexes, in the order the driver reports them.
    fn unique_index_candidates(&self, table: &str) -> Result<Vec<UniqueIndex>>;

    /// All columns of `table`.
    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Streams the full projection of `table`, ordered by `order_by` when given.
    fn stream_rows<'a>(
        &'a self,
        table: &str,
        order_by: Option<&[String]>,
    ) -> Result<Box<dyn RowStream + 'a>>;
}

/// Opens a connection-scoped catalog for a source file.
///
/// The connection lives exactly as long as the returned box; dropping it
/// releases the connection.
pub trait CatalogConnector: Send + Sync {
    fn open(&self, source: &Path) -> Result<Box<dyn CatalogPort>>;
}

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

//! Determines the ordering columns of a table.
//!
//! Tiers are tried strongest first: declared primary key, first unique
//! index, first column, and finally no ordering at all. A metadata failure
//! at one tier only means "no candidate" there; the chain moves on.

use crate::domain::entities::{KeyColumn, SortKey, SortTier};
use crate::ports::catalog_port::CatalogPort;
use log::debug;

pub fn resolve_sort_key(catalog: &dyn CatalogPort, table: &str) -> SortKey {
    if let Some(columns) = primary_key(catalog, table) {
        return SortKey::new(SortTier::PrimaryKey, columns);
    }
    if let Some(columns) = unique_index(catalog, table) {
        return SortKey::new(SortTier::UniqueIndex, columns);
    }
    if let Some(column) = first_column(catalog, table) {
        return SortKey::new(SortTier::FirstColumn, vec![column]);
    }
    SortKey::none()
}

fn primary_key(catalog: &dyn CatalogPort, table: &str) -> Option<Vec<String>> {
    match catalog.primary_key_columns(table) {
        Ok(columns) => non_empty(ordered_names(columns)),
        Err(e) => {
            debug!("Primary key lookup failed for {}: {}", table, e);
            None
        }
    }
}

fn unique_index(catalog: &dyn CatalogPort, table: &str) -> Option<Vec<String>> {
    match catalog.unique_index_candidates(table) {
        Ok(indexes) => indexes
            .into_iter()
            .map(|index| ordered_names(index.columns))
            .find(|columns| !columns.is_empty()),
        Err(e) => {
            debug!("Unique index lookup failed for {}: {}", table, e);
            None
        }
    }
}

fn first_column(catalog: &dyn CatalogPort, table: &str) -> Option<String> {
    match catalog.columns(table) {
        Ok(columns) => columns
            .into_iter()
            .enumerate()
            .min_by_key(|(i, c)| (c.ordinal, *i))
            .map(|(_, c)| c.name),
        Err(e) => {
            debug!("Column lookup failed for {}: {}", table, e);
            None
        }
    }
}

// Orders by declared position; unsequenced columns keep driver order at the end.
fn ordered_names(mut columns: Vec<KeyColumn>) -> Vec<String> {
    columns.retain(|c| !c.name.is_empty());
    columns.sort_by_key(|c| c.position.unwrap_or(i32::MAX));
    let mut names: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&column.name)) {
            names.push(column.name);
        }
    }
    names
}

fn non_empty(columns: Vec<String>) -> Option<Vec<String>> {
    if columns.is_empty() {
        None
    } else {
        Some(columns)
    }
}

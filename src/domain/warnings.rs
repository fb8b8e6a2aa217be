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

//! Human-readable warnings about weakly ordered tables.

/// Builds the sort-quality warnings for a run.
///
/// With `max_items` set, each table list is cut to that many names and
/// marked with a trailing ` ...`. `None` lists every table.
pub fn build_sort_warnings(
    tables_sorted_by_first_column: &[String],
    tables_without_sort_key: &[String],
    max_items: Option<usize>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if !tables_sorted_by_first_column.is_empty() {
        warnings.push(format!(
            "Note: no primary key or unique index was found for some tables; \
             they were sorted by their first column.\nTables: {}",
            limited_list(tables_sorted_by_first_column, max_items)
        ));
    }

    if !tables_without_sort_key.is_empty() {
        warnings.push(format!(
            "Note: no sort key could be determined for some tables; \
             they were exported without ORDER BY.\nTables: {}",
            limited_list(tables_without_sort_key, max_items)
        ));
    }

    warnings
}

/// Keeps at most `max_items` warnings, noting how many were left out.
pub fn cap_warnings(warnings: &[String], max_items: usize) -> Vec<String> {
    if warnings.len() <= max_items {
        return warnings.to_vec();
    }
    let mut capped = warnings[..max_items].to_vec();
    capped.push(format!("... and {} more", warnings.len() - max_items));
    capped
}

fn limited_list(names: &[String], max_items: Option<usize>) -> String {
    match max_items {
        Some(max) if names.len() > max => format!("{} ...", names[..max].join(", ")),
        _ => names.join(", "),
    }
}

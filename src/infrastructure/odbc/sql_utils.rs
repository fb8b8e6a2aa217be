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

//! Utility functions for generating Access SQL and ODBC connection strings.

/// Reads user tables (local, linked, ODBC-linked) in creation order.
pub const SQL_INTERNAL_CATALOG: &str =
    "SELECT Name, Id FROM MSysObjects WHERE Type IN (1, 4, 6) ORDER BY Id";

/// Quotes an identifier in Access bracket syntax, doubling any `]`.
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Builds the full-projection row query, with `ORDER BY` when columns are given.
pub fn build_select_query(table: &str, order_by: Option<&[String]>) -> String {
    let table_expr = quote_identifier(table);
    match order_by {
        Some(cols) if !cols.is_empty() => {
            let order_expr = cols
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ");
            format!("SELECT * FROM {} ORDER BY {}", table_expr, order_expr)
        }
        _ => format!("SELECT * FROM {}", table_expr),
    }
}

/// Builds `DRIVER={..};DBQ=..;` plus any extra attributes.
pub fn build_connection_string(driver: &str, database: &str, extra: Option<&str>) -> String {
    let mut conn_str = format!("DRIVER={{{}}};DBQ={};", driver, attribute_value(database));
    if let Some(extra) = extra.map(str::trim).filter(|e| !e.is_empty()) {
        conn_str.push_str(extra);
        if !extra.ends_with(';') {
            conn_str.push(';');
        }
    }
    conn_str
}

// Values containing separators or braces must be braced, with `}` doubled.
fn attribute_value(value: &str) -> String {
    if value.contains(|c| matches!(c, ';' | '{' | '}' | '=')) {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}

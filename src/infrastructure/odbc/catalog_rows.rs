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

//! Maps ODBC catalog result sets onto domain entities.
//!
//! Column positions are the zero-based positions defined by the ODBC
//! catalog functions; drivers may append columns but never reorder them.

use crate::domain::entities::{CatalogObject, ColumnDescriptor, KeyColumn, UniqueIndex};
use crate::ports::catalog_port::Row;

// SQLTables: TABLE_CAT, TABLE_SCHEM, TABLE_NAME, TABLE_TYPE, REMARKS
const TABLES_NAME: usize = 2;

// SQLPrimaryKeys: TABLE_CAT, TABLE_SCHEM, TABLE_NAME, COLUMN_NAME, KEY_SEQ, PK_NAME
const PK_COLUMN_NAME: usize = 3;
const PK_KEY_SEQ: usize = 4;

// SQLStatistics: ..., NON_UNIQUE(3), INDEX_QUALIFIER, INDEX_NAME(5), TYPE(6),
// ORDINAL_POSITION(7), COLUMN_NAME(8), ...
const STAT_NON_UNIQUE: usize = 3;
const STAT_INDEX_NAME: usize = 5;
const STAT_TYPE: usize = 6;
const STAT_ORDINAL: usize = 7;
const STAT_COLUMN_NAME: usize = 8;
const SQL_TABLE_STAT: &str = "0";

// SQLColumns: COLUMN_NAME(3), ..., ORDINAL_POSITION(16)
const COLUMNS_NAME: usize = 3;
const COLUMNS_ORDINAL: usize = 16;

fn cell(row: &Row, index: usize) -> Option<&str> {
    row.get(index).and_then(|v| v.as_deref())
}

fn parse_position(value: Option<&str>) -> Option<i32> {
    value.and_then(|v| v.trim().parse().ok())
}

/// `SELECT Name, Id FROM MSysObjects ...` rows. A missing id keeps row order.
pub fn catalog_objects(rows: &[Row]) -> Vec<CatalogObject> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let name = cell(row, 0)?.to_string();
            let id = cell(row, 1)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(i as i64);
            Some(CatalogObject { name, id })
        })
        .collect()
}

pub fn table_names(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| cell(row, TABLES_NAME).map(str::to_string))
        .collect()
}

pub fn primary_key_columns(rows: &[Row]) -> Vec<KeyColumn> {
    rows.iter()
        .filter_map(|row| {
            let name = cell(row, PK_COLUMN_NAME)?;
            Some(KeyColumn::new(name, parse_position(cell(row, PK_KEY_SEQ))))
        })
        .collect()
}

/// Groups unique index rows by INDEX_NAME, keeping driver order.
///
/// Table-statistic rows and rows flagged non-unique are skipped.
pub fn unique_indexes(rows: &[Row]) -> Vec<UniqueIndex> {
    let mut indexes: Vec<UniqueIndex> = Vec::new();
    for row in rows {
        if cell(row, STAT_TYPE).map(str::trim) == Some(SQL_TABLE_STAT) {
            continue;
        }
        if !matches!(cell(row, STAT_NON_UNIQUE).map(str::trim), None | Some("0")) {
            continue;
        }
        let (Some(index_name), Some(column)) =
            (cell(row, STAT_INDEX_NAME), cell(row, STAT_COLUMN_NAME))
        else {
            continue;
        };

        let column = KeyColumn::new(column, parse_position(cell(row, STAT_ORDINAL)));
        match indexes.iter_mut().find(|i| i.name == index_name) {
            Some(index) => index.columns.push(column),
            None => indexes.push(UniqueIndex {
                name: index_name.to_string(),
                columns: vec![column],
            }),
        }
    }
    indexes
}

/// Column list, first occurrence wins on case-insensitive duplicates.
pub fn column_descriptors(rows: &[Row]) -> Vec<ColumnDescriptor> {
    let mut columns: Vec<ColumnDescriptor> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let Some(name) = cell(row, COLUMNS_NAME) else {
            continue;
        };
        if columns.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            continue;
        }
        let ordinal = parse_position(cell(row, COLUMNS_ORDINAL)).unwrap_or(i as i32 + 1);
        columns.push(ColumnDescriptor::new(name, ordinal));
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a row with `values` placed at the given positions.
    fn row(width: usize, values: &[(usize, &str)]) -> Row {
        let mut row = vec![None; width];
        for (i, v) in values {
            row[*i] = Some(v.to_string());
        }
        row
    }

    fn stat(non_unique: &str, index: &str, kind: &str, ordinal: &str, column: &str) -> Row {
        row(
            13,
            &[
                (2, "Orders"),
                (3, non_unique),
                (5, index),
                (6, kind),
                (7, ordinal),
                (8, column),
            ],
        )
    }

    #[test]
    fn test_catalog_objects() {
        let rows = vec![
            row(2, &[(0, "Orders"), (1, "42")]),
            row(2, &[(1, "7")]),
            row(2, &[(0, "Notes")]),
        ];
        let objects = catalog_objects(&rows);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].id, 42);
        assert_eq!(objects[1].name, "Notes");
        assert_eq!(objects[1].id, 2);
    }

    #[test]
    fn test_table_names() {
        let rows = vec![
            row(5, &[(2, "Orders"), (3, "TABLE")]),
            row(5, &[(3, "TABLE")]),
        ];
        assert_eq!(table_names(&rows), vec!["Orders"]);
    }

    #[test]
    fn test_primary_key_columns() {
        let rows = vec![
            row(6, &[(2, "Lines"), (3, "LineNo"), (4, "2")]),
            row(6, &[(2, "Lines"), (3, "OrderID"), (4, " 1 ")]),
            row(6, &[(2, "Lines"), (3, "Extra")]),
            row(6, &[(2, "Lines"), (4, "3")]),
        ];
        assert_eq!(
            primary_key_columns(&rows),
            vec![
                KeyColumn::new("LineNo", Some(2)),
                KeyColumn::new("OrderID", Some(1)),
                KeyColumn::new("Extra", None),
            ]
        );
    }

    #[test]
    fn test_unique_indexes_group_in_driver_order() {
        let rows = vec![
            row(13, &[(2, "Orders"), (6, "0")]),
            stat("0", "UX_Code", "3", "2", "Region"),
            stat("1", "IX_Date", "3", "1", "OrderDate"),
            stat("0", "PrimaryKey", "3", "1", "OrderID"),
            stat("0", "UX_Code", "3", "1", "Code"),
        ];
        let indexes = unique_indexes(&rows);

        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].name, "UX_Code");
        assert_eq!(
            indexes[0].columns,
            vec![KeyColumn::new("Region", Some(2)), KeyColumn::new("Code", Some(1))]
        );
        assert_eq!(indexes[1].name, "PrimaryKey");
    }

    #[test]
    fn test_unique_indexes_skip_incomplete_rows() {
        let mut missing_flag = stat("0", "UX", "3", "x", "Code");
        missing_flag[3] = None;
        let rows = vec![missing_flag, row(13, &[(5, "UX"), (6, "3")])];

        let indexes = unique_indexes(&rows);
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].columns, vec![KeyColumn::new("Code", None)]);
    }

    #[test]
    fn test_column_descriptors() {
        let rows = vec![
            row(18, &[(3, "ID"), (16, "1")]),
            row(18, &[(3, "Text")]),
            row(18, &[(3, "id"), (16, "3")]),
            row(18, &[(16, "4")]),
        ];
        assert_eq!(
            column_descriptors(&rows),
            vec![ColumnDescriptor::new("ID", 1), ColumnDescriptor::new("Text", 2)]
        );
    }
}

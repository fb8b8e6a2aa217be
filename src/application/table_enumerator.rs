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

//! Discovers the exportable tables of a source, in source-defined order.

use crate::domain::entities::TableDescriptor;
use crate::domain::errors::{ExportError, Result};
use crate::ports::catalog_port::CatalogPort;
use log::{info, warn};
use std::collections::HashSet;

const SYSTEM_TABLE_PREFIXES: &[&str] = &["msys", "usys", "~"];

/// Returns true for names that are not internal bookkeeping tables.
pub fn is_user_table_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let lower = name.to_lowercase();
    !SYSTEM_TABLE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Lists user tables.
///
/// The internal object catalog (ordered by creation id) is tried first. The
/// driver's generic listing is used when the catalog is unreadable or holds
/// no user tables; its order is whatever the driver returns. Fails only if
/// neither strategy produces a usable answer.
pub fn list_tables(catalog: &dyn CatalogPort) -> Result<Vec<TableDescriptor>> {
    let internal = match catalog.list_internal_catalog() {
        Ok(mut objects) => {
            objects.sort_by_key(|o| o.id);
            let names = filter_user_tables(objects.into_iter().map(|o| o.name));
            if !names.is_empty() {
                info!("Found {} table(s) in the internal catalog", names.len());
                return Ok(describe(names));
            }
            Some(names)
        }
        Err(e) => {
            warn!("Internal catalog unreadable, using generic table listing: {}", e);
            None
        }
    };

    match catalog.list_tables_generic() {
        Ok(names) => {
            let names = filter_user_tables(names.into_iter());
            info!("Found {} table(s) via generic table listing", names.len());
            Ok(describe(names))
        }
        Err(e) => match internal {
            Some(names) => Ok(describe(names)),
            None => Err(ExportError::Catalog(format!(
                "internal catalog and generic table listing both failed: {}",
                e
            ))),
        },
    }
}

// Drops system tables and case-insensitive duplicates, keeping first occurrence.
fn filter_user_tables(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .filter(|n| is_user_table_name(n))
        .filter(|n| seen.insert(n.to_lowercase()))
        .collect()
}

fn describe(names: Vec<String>) -> Vec<TableDescriptor> {
    names
        .into_iter()
        .enumerate()
        .map(|(ordinal_position, name)| TableDescriptor {
            name,
            ordinal_position,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CatalogObject, ColumnDescriptor, KeyColumn, UniqueIndex};
    use crate::ports::catalog_port::RowStream;

    struct MockCatalog {
        internal: Option<Vec<CatalogObject>>,
        generic: Option<Vec<String>>,
    }

    impl CatalogPort for MockCatalog {
        fn list_internal_catalog(&self) -> Result<Vec<CatalogObject>> {
            self.internal
                .clone()
                .ok_or_else(|| ExportError::Catalog("denied".into()))
        }
        fn list_tables_generic(&self) -> Result<Vec<String>> {
            self.generic
                .clone()
                .ok_or_else(|| ExportError::Catalog("connection lost".into()))
        }
        fn primary_key_columns(&self, _table: &str) -> Result<Vec<KeyColumn>> {
            unreachable!()
        }
        fn unique_index_candidates(&self, _table: &str) -> Result<Vec<UniqueIndex>> {
            unreachable!()
        }
        fn columns(&self, _table: &str) -> Result<Vec<ColumnDescriptor>> {
            unreachable!()
        }
        fn stream_rows<'a>(
            &'a self,
            _table: &str,
            _order_by: Option<&[String]>,
        ) -> Result<Box<dyn RowStream + 'a>> {
            unreachable!()
        }
    }

    fn obj(name: &str, id: i64) -> CatalogObject {
        CatalogObject {
            name: name.to_string(),
            id,
        }
    }

    fn names(tables: &[TableDescriptor]) -> Vec<&str> {
        tables.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_system_table_names() {
        assert!(!is_user_table_name("MSysObjects"));
        assert!(!is_user_table_name("msysACEs"));
        assert!(!is_user_table_name("USysRibbons"));
        assert!(!is_user_table_name("~TMPCLP1234"));
        assert!(!is_user_table_name(""));
        assert!(is_user_table_name("Orders"));
        assert!(is_user_table_name("My MSys copy"));
    }

    #[test]
    fn test_internal_catalog_order_by_id() {
        let catalog = MockCatalog {
            internal: Some(vec![
                obj("Zeta", 3),
                obj("MSysObjects", 1),
                obj("Alpha", 7),
                obj("Orders", 2),
                obj("~TMP", 4),
            ]),
            generic: None,
        };
        let tables = list_tables(&catalog).unwrap();
        assert_eq!(names(&tables), vec!["Orders", "Zeta", "Alpha"]);
        assert_eq!(tables[2].ordinal_position, 2);
    }

    #[test]
    fn test_fallback_when_catalog_unreadable() {
        let catalog = MockCatalog {
            internal: None,
            generic: Some(vec!["Notes".into(), "Orders".into(), "USysConfig".into()]),
        };
        let tables = list_tables(&catalog).unwrap();
        assert_eq!(names(&tables), vec!["Notes", "Orders"]);
    }

    #[test]
    fn test_fallback_when_catalog_has_only_system_tables() {
        let catalog = MockCatalog {
            internal: Some(vec![obj("MSysACEs", 1)]),
            generic: Some(vec!["Orders".into()]),
        };
        assert_eq!(names(&list_tables(&catalog).unwrap()), vec!["Orders"]);
    }

    #[test]
    fn test_duplicates_are_dropped_case_insensitively() {
        let catalog = MockCatalog {
            internal: None,
            generic: Some(vec!["Orders".into(), "ORDERS".into(), "Notes".into()]),
        };
        assert_eq!(names(&list_tables(&catalog).unwrap()), vec!["Orders", "Notes"]);
    }

    #[test]
    fn test_both_strategies_failing_is_catalog_error() {
        let catalog = MockCatalog {
            internal: None,
            generic: None,
        };
        assert!(matches!(list_tables(&catalog), Err(ExportError::Catalog(_))));
    }

    #[test]
    fn test_empty_is_not_an_error() {
        let catalog = MockCatalog {
            internal: Some(vec![obj("MSysObjects", 1)]),
            generic: None,
        };
        assert!(list_tables(&catalog).unwrap().is_empty());

        let catalog = MockCatalog {
            internal: None,
            generic: Some(vec!["~sq_cForm".into()]),
        };
        assert!(list_tables(&catalog).unwrap().is_empty());
    }
}

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

//! ODBC access to Access database files.
//!
//! The concrete adapter needs the platform ODBC driver manager at link time
//! and is built with the `odbc` feature (on by default). Row mapping and SQL
//! building do not touch the driver and are always available.

#[cfg(feature = "odbc")]
pub mod access_adapter;
pub mod catalog_rows;
pub mod sql_utils;

use crate::config::DriverSettings;
use crate::ports::catalog_port::CatalogConnector;
use std::sync::Arc;

pub const DRIVER_HINT: &str =
    "The Microsoft Access Database Engine (ODBC driver) may not be installed.";

/// The connector the CLI uses for real source files.
#[cfg(feature = "odbc")]
pub fn default_connector(settings: &DriverSettings) -> Arc<dyn CatalogConnector> {
    Arc::new(access_adapter::AccessOdbcConnector::new(settings.clone()))
}

#[cfg(not(feature = "odbc"))]
pub fn default_connector(settings: &DriverSettings) -> Arc<dyn CatalogConnector> {
    Arc::new(unavailable::UnavailableConnector {
        driver: settings.driver.clone(),
    })
}

#[cfg(not(feature = "odbc"))]
mod unavailable {
    use crate::domain::errors::{ExportError, Result};
    use crate::ports::catalog_port::{CatalogConnector, CatalogPort};
    use std::path::Path;

    pub struct UnavailableConnector {
        pub driver: String,
    }

    impl CatalogConnector for UnavailableConnector {
        fn open(&self, source: &Path) -> Result<Box<dyn CatalogPort>> {
            Err(ExportError::Connection(format!(
                "cannot open {}: this build has no ODBC support (rebuild with the `odbc` feature to use {{{}}})",
                source.display(),
                self.driver
            )))
        }
    }
}

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

//! Port for persisting run reports.

use crate::domain::entities::RunReport;
use crate::domain::errors::Result;
use std::path::Path;

/// Port for merging one run's report into a persisted report file.
pub trait ReportPort: Send + Sync {
    /// Appends `report` to the report file at `report_path`.
    fn append_report(&self, report_path: &Path, report: &RunReport) -> Result<()>;
}

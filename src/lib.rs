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

//! # Access Database CSV Exporter
//!
//! Exports every user table of an Access database file to CSV, one file per
//! table, each ordered by the strongest available key so repeated runs over
//! unchanged data produce byte-identical output.
//!
//! The crate follows a Ports and Adapters layout: `domain` holds the pure
//! types and rules, `ports` the seams to the outside, `application` the export
//! pipeline and `infrastructure` the concrete driver and storage adapters.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

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

//! File-system safe naming for exported tables.
//!
//! `sanitize_filename` turns an arbitrary table name into a name that is
//! valid on Windows file systems, and `UniqueNameAllocator` hands out
//! collision-free names (case-insensitive) within one run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_TABLE_NAME: &str = "table";
pub const DEFAULT_MAX_LENGTH: usize = 120;

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const RESERVED_SUFFIX: &str = "_";

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Returns true if `stem` is a Windows device name, compared case-insensitively.
pub fn is_reserved_name(stem: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(stem))
}

/// Normalizes `name` into a safe file name (without extension).
///
/// The result never contains a forbidden or control character, never ends
/// with whitespace or a period, is never empty, never has a reserved device
/// name as its stem and is at most `max_length` characters long.
pub fn sanitize_filename(name: &str, default_name: &str, max_length: usize) -> String {
    let max_length = max_length.max(1);

    let mut safe = trim_and_truncate(&replace_forbidden(name), max_length);
    if safe.is_empty() {
        safe = trim_and_truncate(&replace_forbidden(default_name), max_length);
    }
    if safe.is_empty() {
        safe = trim_and_truncate(DEFAULT_TABLE_NAME, max_length);
    }

    avoid_reserved(safe, max_length)
}

fn replace_forbidden(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_control() || FORBIDDEN_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

fn trim_end_unsafe(name: &str) -> &str {
    name.trim_end_matches(|c: char| c.is_whitespace() || c == '.')
}

fn trim_and_truncate(name: &str, max_length: usize) -> String {
    let trimmed = trim_end_unsafe(name.trim_start());
    let truncated: String = trimmed.chars().take(max_length).collect();
    trim_end_unsafe(&truncated).to_string()
}

// Expects a non-empty, trimmed name of at most `max_length` chars.
fn avoid_reserved(name: String, max_length: usize) -> String {
    let stem = name.split('.').next().unwrap_or_default();
    if !is_reserved_name(stem) {
        return name;
    }

    let stem_len = stem.chars().count();
    if stem_len + RESERVED_SUFFIX.len() > max_length {
        let keep = max_length.saturating_sub(RESERVED_SUFFIX.len());
        let mut out: String = stem.chars().take(keep).collect();
        out.push_str(RESERVED_SUFFIX);
        return out;
    }

    let rest = &name[stem.len()..];
    let candidate = format!("{}{}{}", stem, RESERVED_SUFFIX, rest);
    let truncated: String = candidate.chars().take(max_length).collect();
    trim_end_unsafe(&truncated).to_string()
}

/// Hands out distinct output names for one run.
///
/// Names are compared case-insensitively. Given the same sequence of raw
/// names the same paths are produced.
#[derive(Debug)]
pub struct UniqueNameAllocator {
    used_names: HashSet<String>,
    default_name: String,
    max_length: usize,
}

impl Default for UniqueNameAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_NAME, DEFAULT_MAX_LENGTH)
    }
}

impl UniqueNameAllocator {
    pub fn new(default_name: &str, max_length: usize) -> Self {
        Self {
            used_names: HashSet::new(),
            default_name: default_name.to_string(),
            max_length: max_length.max(1),
        }
    }

    /// Claims a name for `raw_name` and returns `<output_dir>/<name>.csv`.
    pub fn allocate(&mut self, output_dir: &Path, raw_name: &str) -> PathBuf {
        let name = self.claim(raw_name);
        output_dir.join(format!("{}.csv", name))
    }

    /// Claims and returns the bare name, probing `_1`, `_2`, ... on collision.
    pub fn claim(&mut self, raw_name: &str) -> String {
        let base = sanitize_filename(raw_name, &self.default_name, self.max_length);
        let mut candidate = base.clone();
        let mut index = 1usize;

        while self.used_names.contains(&candidate.to_lowercase()) {
            let suffix = format!("_{}", index);
            let allowed = self.max_length.saturating_sub(suffix.len());
            let head: String = base.chars().take(allowed).collect();
            candidate = format!("{}{}", head, suffix);
            index += 1;
        }

        self.used_names.insert(candidate.to_lowercase());
        candidate
    }

    pub fn len(&self) -> usize {
        self.used_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used_names.is_empty()
    }
}

// Copyright 2025 ecsctl contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rendering and parsing of `NAME=VALUE` environment blocks, plus the
//! single-key upsert used by `env set`.

use crate::domain::definition::EnvVar;
use crate::shared::error::{EcsError, Result};

/// Renders environment pairs as a multiline `NAME=VALUE` block, one pair
/// per line. The inverse of [`parse_pairs`].
pub fn render_pairs(pairs: &[EnvVar]) -> String {
    let mut out = String::new();
    for pair in pairs {
        out.push_str(&format!("{}={}\n", pair.name, pair.value));
    }
    out
}

/// Parses a multiline `NAME=VALUE` block back into pairs. Blank lines are
/// skipped; a line without `=` fails with its 1-based line number.
pub fn parse_pairs(input: &str) -> Result<Vec<EnvVar>> {
    let mut output = Vec::new();
    for (i, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once('=').ok_or_else(|| {
            EcsError::invalid_argument(format!("problem parsing line {}: {}", i + 1, line))
        })?;
        output.push(EnvVar::new(name, value));
    }
    Ok(output)
}

/// Overwrites the first pair named `name` in place, or appends a new pair
/// when none matches. Order-preserving; duplicate names beyond the first
/// match are left untouched.
pub fn upsert(pairs: &mut Vec<EnvVar>, name: &str, value: &str) {
    for pair in pairs.iter_mut() {
        if pair.name == name {
            pair.value = value.to_string();
            return;
        }
    }
    pairs.push(EnvVar::new(name, value));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_overwrites_existing() {
        let mut pairs = vec![EnvVar::new("A", "1"), EnvVar::new("B", "2")];
        upsert(&mut pairs, "B", "3");
        assert_eq!(pairs, vec![EnvVar::new("A", "1"), EnvVar::new("B", "3")]);
    }

    #[test]
    fn test_upsert_appends_missing() {
        let mut pairs = vec![EnvVar::new("A", "1"), EnvVar::new("B", "2")];
        upsert(&mut pairs, "C", "4");
        assert_eq!(
            pairs,
            vec![
                EnvVar::new("A", "1"),
                EnvVar::new("B", "2"),
                EnvVar::new("C", "4"),
            ]
        );
    }

    #[test]
    fn test_upsert_only_first_duplicate() {
        let mut pairs = vec![EnvVar::new("A", "1"), EnvVar::new("A", "2")];
        upsert(&mut pairs, "A", "9");
        assert_eq!(pairs, vec![EnvVar::new("A", "9"), EnvVar::new("A", "2")]);
    }

    #[test]
    fn test_render_parse_round_trip() {
        let pairs = vec![
            EnvVar::new("DATABASE_URL", "postgres://db:5432/app"),
            EnvVar::new("LOG_LEVEL", "debug"),
        ];
        let block = render_pairs(&pairs);
        assert_eq!(parse_pairs(&block).unwrap(), pairs);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let parsed = parse_pairs("A=1\n\n  \nB=2\n").unwrap();
        assert_eq!(parsed, vec![EnvVar::new("A", "1"), EnvVar::new("B", "2")]);
    }

    #[test]
    fn test_parse_value_may_contain_equals() {
        let parsed = parse_pairs("TOKEN=abc=def").unwrap();
        assert_eq!(parsed, vec![EnvVar::new("TOKEN", "abc=def")]);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse_pairs("A=1\nnot-a-pair\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}

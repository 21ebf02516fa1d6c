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

//! Log stream naming, event rendering and the status filter.

pub mod aggregator;

use std::fmt;
use std::str::FromStr;

use crate::infrastructure::constants::LOG_TIMESTAMP_FORMAT;
use crate::shared::arn;
use crate::shared::error::EcsError;

/// One event fetched from a log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp_ms: i64,
    pub message: String,
}

impl LogEvent {
    /// Renders the event as `[timestamp] message`. The timestamp format is
    /// fixed-width and zero-padded UTC, which makes a lexicographic sort of
    /// rendered lines chronological. Changing the format breaks that
    /// invariant.
    pub fn render(&self) -> String {
        match chrono::DateTime::from_timestamp_millis(self.timestamp_ms) {
            Some(ts) => format!("[{}] {}", ts.format(LOG_TIMESTAMP_FORMAT), self.message),
            None => format!("[{}] {}", self.timestamp_ms, self.message),
        }
    }
}

/// Which tasks to pull streams for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    Running,
    Stopped,
    #[default]
    All,
}

impl FromStr for StatusFilter {
    type Err = EcsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            "all" => Ok(Self::All),
            other => Err(EcsError::invalid_argument(format!(
                "status must be one of running|stopped|all, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Derives the awslogs stream name for one task:
/// `{prefix}/{containerName}/{taskId}`.
pub fn stream_name(prefix: &str, container: &str, task_arn: &str) -> String {
    format!("{}/{}/{}", prefix, container, arn::resource_id(task_arn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fixed_width_timestamp() {
        let event = LogEvent {
            timestamp_ms: 1_704_067_201_000, // 2024-01-01 00:00:01 UTC
            message: "a".to_string(),
        };
        assert_eq!(event.render(), "[2024-01-01 00:00:01 UTC] a");
    }

    #[test]
    fn test_render_sorts_chronologically() {
        let early = LogEvent {
            timestamp_ms: 1_704_067_201_000,
            message: "a".to_string(),
        }
        .render();
        let late = LogEvent {
            timestamp_ms: 1_704_067_202_000,
            message: "b".to_string(),
        }
        .render();
        assert!(early < late);
    }

    #[test]
    fn test_stream_name() {
        let name = stream_name(
            "web",
            "app",
            "arn:aws:ecs:us-west-2:123456789012:task/default/8f2073d1",
        );
        assert_eq!(name, "web/app/8f2073d1");
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!("running".parse::<StatusFilter>().unwrap(), StatusFilter::Running);
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert!("bogus".parse::<StatusFilter>().is_err());
    }
}

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

//! Service, deployment and task records as seen by the operator.

pub mod cache;
pub mod descriptor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A long-running desired-count-managed wrapper around repeated
/// instantiations of a task definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub arn: String,
    pub name: String,
    pub cluster_arn: String,
    /// ARN of the currently deployed task definition.
    pub task_definition: String,
    pub status: Option<String>,
    pub desired_count: i32,
    pub running_count: i32,
    pub pending_count: i32,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default)]
    pub events: Vec<ServiceEvent>,
}

/// One rollout episode of a service transitioning between revisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub task_definition: String,
    pub status: String,
    pub desired_count: i32,
    pub pending_count: i32,
    pub running_count: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEvent {
    pub created_at: Option<DateTime<Utc>>,
    pub message: String,
}

/// Fields applied by an update-service call. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceUpdate {
    pub task_definition: Option<String>,
    pub desired_count: Option<i32>,
    pub force_new_deployment: bool,
}

/// One running (or stopped) instantiation of a task definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub arn: String,
    pub cluster_arn: String,
    pub last_status: String,
    pub stopped_reason: Option<String>,
    #[serde(default)]
    pub containers: Vec<TaskContainer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskContainer {
    pub name: String,
    pub exit_code: Option<i32>,
    pub reason: Option<String>,
}

/// Desired status filter accepted by the platform's task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredTaskStatus {
    Running,
    Stopped,
}

/// Raw outcome of a run-task submission, before failure reasons are
/// promoted to an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTaskOutcome {
    pub tasks: Vec<Task>,
    pub failures: Vec<RunFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunFailure {
    pub arn: Option<String>,
    pub reason: Option<String>,
    pub detail: Option<String>,
}

impl RunFailure {
    /// Human-readable single-line rendering used in `RunFailed` errors.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(arn) = &self.arn {
            parts.push(arn.clone());
        }
        if let Some(reason) = &self.reason {
            parts.push(reason.clone());
        }
        if let Some(detail) = &self.detail {
            parts.push(detail.clone());
        }
        if parts.is_empty() {
            "unknown failure".to_string()
        } else {
            parts.join(": ")
        }
    }
}

impl Task {
    /// Resolves the reported exit code of a stopped task. Any nonzero
    /// container code wins; a container that stopped without ever reporting
    /// a code (failed to start) synthesizes 1; otherwise the last
    /// container's code is reported.
    pub fn exit_code(&self) -> i32 {
        let mut last = 0;
        for container in &self.containers {
            match container.exit_code {
                Some(code) if code != 0 => return code,
                Some(code) => last = code,
                None => return 1,
            }
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stopped_task(containers: Vec<TaskContainer>) -> Task {
        Task {
            arn: "arn:aws:ecs:us-west-2:123456789012:task/default/abc123".to_string(),
            cluster_arn: "arn:aws:ecs:us-west-2:123456789012:cluster/default".to_string(),
            last_status: "STOPPED".to_string(),
            stopped_reason: None,
            containers,
        }
    }

    #[test]
    fn test_exit_code_nonzero_wins() {
        let task = stopped_task(vec![
            TaskContainer {
                name: "app".into(),
                exit_code: Some(0),
                reason: None,
            },
            TaskContainer {
                name: "worker".into(),
                exit_code: Some(137),
                reason: None,
            },
        ]);
        assert_eq!(task.exit_code(), 137);
    }

    #[test]
    fn test_exit_code_all_zero() {
        let task = stopped_task(vec![
            TaskContainer {
                name: "app".into(),
                exit_code: Some(0),
                reason: None,
            },
            TaskContainer {
                name: "worker".into(),
                exit_code: Some(0),
                reason: None,
            },
        ]);
        assert_eq!(task.exit_code(), 0);
    }

    #[test]
    fn test_exit_code_synthesized_on_failed_start() {
        let task = stopped_task(vec![TaskContainer {
            name: "app".into(),
            exit_code: None,
            reason: Some("CannotPullContainerError".to_string()),
        }]);
        assert_eq!(task.exit_code(), 1);
    }
}

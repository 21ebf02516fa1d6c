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

//! Helpers for picking apart Amazon Resource Names.

/// Returns the final path segment of an ARN, e.g. the task ID of a task ARN
/// or the plain name of a cluster/service ARN.
pub fn resource_id(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

/// Returns `family:revision` from a task definition ARN.
pub fn revision_name(arn: &str) -> &str {
    resource_id(arn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_from_task_arn() {
        let arn = "arn:aws:ecs:us-west-2:123456789012:task/default/8f2073d1c4a24e01";
        assert_eq!(resource_id(arn), "8f2073d1c4a24e01");
    }

    #[test]
    fn test_resource_id_without_slash() {
        assert_eq!(resource_id("plain-name"), "plain-name");
    }

    #[test]
    fn test_revision_name() {
        let arn = "arn:aws:ecs:us-west-2:123456789012:task-definition/web:42";
        assert_eq!(revision_name(arn), "web:42");
    }
}

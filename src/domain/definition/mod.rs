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

//! Task definition model and essential-container policy.

pub mod command;
pub mod edits;
pub mod environment;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::shared::error::{EcsError, Result};

/// An immutable, versioned task definition. `arn` and `revision` are
/// provider-assigned: a definition produced locally by an edit has
/// `arn == None` until it is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    pub family: String,
    #[serde(default)]
    pub revision: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    pub container_definitions: Vec<ContainerDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_compatibilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub essential: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_reservation: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_mappings: Vec<PortMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_configuration: Option<LogConfiguration>,
}

/// A name/value environment pair. Name uniqueness is enforced only at edit
/// time, never as a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfiguration {
    pub log_driver: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_path: Option<String>,
}

impl TaskDefinition {
    /// The essential container of this definition. The first container with
    /// the essential flag set wins; zero matches is an error.
    pub fn essential_container(&self) -> Result<&ContainerDefinition> {
        self.container_definitions
            .iter()
            .find(|c| c.essential)
            .ok_or_else(|| EcsError::EssentialContainerNotFound {
                family: self.family.clone(),
            })
    }

    /// Index of the essential container, same policy as
    /// [`essential_container`](Self::essential_container).
    pub(crate) fn essential_index(&self) -> Result<usize> {
        self.container_definitions
            .iter()
            .position(|c| c.essential)
            .ok_or_else(|| EcsError::EssentialContainerNotFound {
                family: self.family.clone(),
            })
    }

    /// Image of the essential container, or `None` when no container is
    /// marked essential. Used by the deploy-image dedup check.
    pub fn essential_image(&self) -> Option<&str> {
        self.essential_container().ok().map(|c| c.image.as_str())
    }

    /// Log configuration of the essential container. Fails unless the
    /// container uses the awslogs driver.
    pub fn awslogs_configuration(&self) -> Result<&LogConfiguration> {
        let container = self.essential_container()?;
        let config = container.log_configuration.as_ref().ok_or_else(|| {
            EcsError::UnsupportedLogDriver {
                found: "none".to_string(),
            }
        })?;
        if config.log_driver != crate::infrastructure::constants::AWSLOGS_DRIVER {
            return Err(EcsError::UnsupportedLogDriver {
                found: config.log_driver.clone(),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition_with(containers: Vec<ContainerDefinition>) -> TaskDefinition {
        TaskDefinition {
            family: "web".to_string(),
            revision: 3,
            arn: Some("arn:aws:ecs:us-west-2:123456789012:task-definition/web:3".to_string()),
            container_definitions: containers,
            volumes: Vec::new(),
            task_role_arn: None,
            execution_role_arn: None,
            network_mode: None,
            requires_compatibilities: Vec::new(),
            cpu: None,
            memory: None,
        }
    }

    #[test]
    fn test_essential_container_first_match_wins() {
        let def = definition_with(vec![
            ContainerDefinition {
                name: "sidecar".to_string(),
                image: "envoy:v1".to_string(),
                essential: false,
                ..Default::default()
            },
            ContainerDefinition {
                name: "app".to_string(),
                image: "web:v1".to_string(),
                essential: true,
                ..Default::default()
            },
        ]);
        assert_eq!(def.essential_container().unwrap().name, "app");
        assert_eq!(def.essential_image(), Some("web:v1"));
    }

    #[test]
    fn test_essential_container_missing() {
        let def = definition_with(vec![ContainerDefinition {
            name: "app".to_string(),
            image: "web:v1".to_string(),
            essential: false,
            ..Default::default()
        }]);
        let err = def.essential_container().unwrap_err();
        assert!(matches!(
            err,
            EcsError::EssentialContainerNotFound { ref family } if family == "web"
        ));
    }

    #[test]
    fn test_awslogs_configuration_requires_driver() {
        let mut container = ContainerDefinition {
            name: "app".to_string(),
            image: "web:v1".to_string(),
            essential: true,
            ..Default::default()
        };
        container.log_configuration = Some(LogConfiguration {
            log_driver: "json-file".to_string(),
            options: HashMap::new(),
        });
        let def = definition_with(vec![container]);
        assert!(matches!(
            def.awslogs_configuration().unwrap_err(),
            EcsError::UnsupportedLogDriver { ref found } if found == "json-file"
        ));
    }
}

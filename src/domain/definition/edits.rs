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

//! Copy-on-write edits against a task definition's essential container.

use crate::domain::definition::{EnvVar, TaskDefinition};
use crate::shared::error::{EcsError, Result};

/// One edit applied to a task definition. Container-level edits target the
/// essential container only; `SetFamily` renames the definition itself
/// (used by copy-revision workflows).
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerEdit {
    SetImage(String),
    SetCommand(Vec<String>),
    /// Full replacement of the environment list, not a merge.
    SetEnvironment(Vec<EnvVar>),
    SetMemory {
        memory: Option<i32>,
        reservation: Option<i32>,
    },
    SetName(String),
    SetFamily(String),
}

/// Applies `edits` in order to a copy of `def`'s essential container and
/// returns a new, unregistered definition. The input is treated as a
/// template: neither it nor any of its containers is mutated, and
/// non-essential containers are carried through unchanged.
pub fn apply_edits(def: &TaskDefinition, edits: &[ContainerEdit]) -> Result<TaskDefinition> {
    let index = def.essential_index()?;

    let mut out = def.clone();
    out.arn = None;
    let container = &mut out.container_definitions[index];

    for edit in edits {
        match edit {
            ContainerEdit::SetImage(image) => {
                if image.is_empty() {
                    return Err(EcsError::invalid_argument(
                        "image url may not be empty".to_string(),
                    ));
                }
                container.image = image.clone();
            }
            ContainerEdit::SetCommand(tokens) => {
                container.command = tokens.clone();
            }
            ContainerEdit::SetEnvironment(pairs) => {
                container.environment = pairs.clone();
            }
            ContainerEdit::SetMemory {
                memory,
                reservation,
            } => {
                if let Some(memory) = memory {
                    container.memory = Some(*memory);
                }
                if let Some(reservation) = reservation {
                    container.memory_reservation = Some(*reservation);
                }
            }
            ContainerEdit::SetName(name) => {
                container.name = name.clone();
            }
            ContainerEdit::SetFamily(family) => {
                out.family = family.clone();
                continue;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::definition::ContainerDefinition;

    fn fixture() -> TaskDefinition {
        TaskDefinition {
            family: "web".to_string(),
            revision: 7,
            arn: Some("arn:aws:ecs:us-west-2:123456789012:task-definition/web:7".to_string()),
            container_definitions: vec![
                ContainerDefinition {
                    name: "proxy".to_string(),
                    image: "nginx:1.25".to_string(),
                    essential: false,
                    ..Default::default()
                },
                ContainerDefinition {
                    name: "app".to_string(),
                    image: "web:v1".to_string(),
                    essential: true,
                    environment: vec![EnvVar::new("A", "1")],
                    memory: Some(512),
                    ..Default::default()
                },
            ],
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
    fn test_set_image_produces_unregistered_copy() {
        let def = fixture();
        let out = apply_edits(&def, &[ContainerEdit::SetImage("web:v2".to_string())]).unwrap();

        assert_eq!(out.arn, None);
        assert_eq!(out.family, "web");
        assert_eq!(out.container_definitions[1].image, "web:v2");
        // the input template is untouched
        assert_eq!(def.container_definitions[1].image, "web:v1");
        assert!(def.arn.is_some());
    }

    #[test]
    fn test_non_essential_containers_carried_through() {
        let def = fixture();
        let out = apply_edits(&def, &[ContainerEdit::SetImage("web:v2".to_string())]).unwrap();

        assert_eq!(
            out.container_definitions.len(),
            def.container_definitions.len()
        );
        assert_eq!(out.container_definitions[0], def.container_definitions[0]);
    }

    #[test]
    fn test_empty_image_rejected() {
        let def = fixture();
        let err = apply_edits(&def, &[ContainerEdit::SetImage(String::new())]).unwrap_err();
        assert!(matches!(err, EcsError::InvalidArgument(_)));
    }

    #[test]
    fn test_no_essential_container() {
        let mut def = fixture();
        def.container_definitions[1].essential = false;
        let err = apply_edits(&def, &[ContainerEdit::SetImage("web:v2".to_string())]).unwrap_err();
        assert!(matches!(err, EcsError::EssentialContainerNotFound { .. }));
    }

    #[test]
    fn test_edits_apply_in_order() {
        let def = fixture();
        let out = apply_edits(
            &def,
            &[
                ContainerEdit::SetImage("web:v2".to_string()),
                ContainerEdit::SetImage("web:v3".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(out.container_definitions[1].image, "web:v3");
    }

    #[test]
    fn test_set_environment_is_full_replacement() {
        let def = fixture();
        let out = apply_edits(
            &def,
            &[ContainerEdit::SetEnvironment(vec![EnvVar::new("B", "2")])],
        )
        .unwrap();
        assert_eq!(
            out.container_definitions[1].environment,
            vec![EnvVar::new("B", "2")]
        );
    }

    #[test]
    fn test_set_memory_partial() {
        let def = fixture();
        let out = apply_edits(
            &def,
            &[ContainerEdit::SetMemory {
                memory: None,
                reservation: Some(256),
            }],
        )
        .unwrap();
        let container = &out.container_definitions[1];
        assert_eq!(container.memory, Some(512));
        assert_eq!(container.memory_reservation, Some(256));
    }

    #[test]
    fn test_set_family_and_name_for_copy() {
        let def = fixture();
        let out = apply_edits(
            &def,
            &[
                ContainerEdit::SetFamily("web-worker".to_string()),
                ContainerEdit::SetName("worker".to_string()),
                ContainerEdit::SetCommand(vec!["php".into(), "artisan".into()]),
            ],
        )
        .unwrap();
        assert_eq!(out.family, "web-worker");
        assert_eq!(out.container_definitions[1].name, "worker");
        assert_eq!(out.container_definitions[1].command, vec!["php", "artisan"]);
    }
}

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

//! ECS control-plane client seam and its AWS SDK implementation.

use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types as sdk;

use crate::domain::definition::{
    ContainerDefinition, EnvVar, LogConfiguration, PortMapping, TaskDefinition, Volume,
};
use crate::domain::service::{
    Deployment, DesiredTaskStatus, RunFailure, RunTaskOutcome, Service, ServiceEvent,
    ServiceUpdate, Task, TaskContainer,
};
use crate::shared::error::{EcsError, Result};

#[async_trait::async_trait]
pub trait EcsClient: Send + Sync {
    /// Describes a single service. Zero or more than one match for the
    /// name is an `AmbiguousService` error carrying the match count.
    async fn describe_service(&self, cluster: &str, service: &str) -> Result<Service>;

    /// Describes a task definition by ARN or `family:revision` reference.
    async fn describe_task_definition(&self, reference: &str) -> Result<TaskDefinition>;

    /// Lists a family's revision ARNs, newest first.
    async fn list_task_definitions(&self, family: &str) -> Result<Vec<String>>;

    /// Registers a brand-new revision from the in-memory definition. Not
    /// idempotent: equivalent content registered twice yields two revisions.
    async fn register_task_definition(&self, def: &TaskDefinition) -> Result<TaskDefinition>;

    async fn update_service(
        &self,
        cluster: &str,
        service: &str,
        update: ServiceUpdate,
    ) -> Result<Service>;

    async fn list_clusters(&self) -> Result<Vec<String>>;

    async fn list_services(&self, cluster: &str) -> Result<Vec<String>>;

    /// Lists task ARNs for a cluster/family pair with the given desired
    /// status, across all pages.
    async fn list_tasks(
        &self,
        cluster: &str,
        family: &str,
        status: DesiredTaskStatus,
    ) -> Result<Vec<String>>;

    async fn describe_tasks(&self, cluster: &str, task_arns: &[String]) -> Result<Vec<Task>>;

    /// Submits a single run of `definition_arn`, overriding only the named
    /// container's command.
    async fn run_task(
        &self,
        cluster: &str,
        definition_arn: &str,
        container_name: &str,
        command: Vec<String>,
    ) -> Result<RunTaskOutcome>;
}

pub struct AwsEcsClient {
    client: aws_sdk_ecs::Client,
}

impl AwsEcsClient {
    pub fn new(client: aws_sdk_ecs::Client) -> Self {
        Self { client }
    }
}

fn transport<E: std::fmt::Debug + std::error::Error + Send + Sync + 'static>(
    err: aws_sdk_ecs::error::SdkError<E>,
) -> EcsError {
    EcsError::Transport(DisplayErrorContext(err).to_string())
}

#[async_trait::async_trait]
impl EcsClient for AwsEcsClient {
    async fn describe_service(&self, cluster: &str, service: &str) -> Result<Service> {
        let output = self
            .client
            .describe_services()
            .cluster(cluster)
            .services(service)
            .send()
            .await
            .map_err(transport)?;

        let services = output.services();
        if services.len() != 1 {
            return Err(EcsError::AmbiguousService {
                cluster: cluster.to_string(),
                service: service.to_string(),
                count: services.len(),
            });
        }
        convert_service(&services[0])
    }

    async fn describe_task_definition(&self, reference: &str) -> Result<TaskDefinition> {
        let output = self
            .client
            .describe_task_definition()
            .task_definition(reference)
            .send()
            .await
            .map_err(transport)?;

        let def = output
            .task_definition()
            .ok_or_else(|| EcsError::not_found("TaskDefinition", reference, "-"))?;
        Ok(convert_task_definition(def))
    }

    async fn list_task_definitions(&self, family: &str) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .list_task_definitions()
                .family_prefix(family)
                .sort(sdk::SortOrder::Desc);
            if let Some(t) = &token {
                request = request.next_token(t);
            }
            let output = request.send().await.map_err(transport)?;
            arns.extend(output.task_definition_arns().iter().cloned());
            match output.next_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        Ok(arns)
    }

    async fn register_task_definition(&self, def: &TaskDefinition) -> Result<TaskDefinition> {
        let containers: Vec<sdk::ContainerDefinition> = def
            .container_definitions
            .iter()
            .map(build_container_definition)
            .collect::<Result<_>>()?;
        let volumes: Vec<sdk::Volume> = def.volumes.iter().map(build_volume).collect();

        let mut request = self
            .client
            .register_task_definition()
            .family(&def.family)
            .set_container_definitions(Some(containers))
            .set_volumes(Some(volumes))
            .set_task_role_arn(def.task_role_arn.clone())
            .set_execution_role_arn(def.execution_role_arn.clone())
            .set_cpu(def.cpu.clone())
            .set_memory(def.memory.clone());
        if let Some(mode) = &def.network_mode {
            request = request.network_mode(sdk::NetworkMode::from(mode.as_str()));
        }
        for compatibility in &def.requires_compatibilities {
            request = request.requires_compatibilities(sdk::Compatibility::from(
                compatibility.as_str(),
            ));
        }

        let output = request
            .send()
            .await
            .map_err(|e| EcsError::RegistrationFailed(DisplayErrorContext(e).to_string()))?;
        let registered = output.task_definition().ok_or_else(|| {
            EcsError::RegistrationFailed("registration returned no task definition".to_string())
        })?;
        Ok(convert_task_definition(registered))
    }

    async fn update_service(
        &self,
        cluster: &str,
        service: &str,
        update: ServiceUpdate,
    ) -> Result<Service> {
        let mut request = self
            .client
            .update_service()
            .cluster(cluster)
            .service(service)
            .set_task_definition(update.task_definition)
            .set_desired_count(update.desired_count);
        if update.force_new_deployment {
            request = request.force_new_deployment(true);
        }

        let output = request.send().await.map_err(transport)?;
        let updated = output
            .service()
            .ok_or_else(|| EcsError::not_found("Service", service, cluster))?;
        convert_service(updated)
    }

    async fn list_clusters(&self) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut request = self.client.list_clusters();
            if let Some(t) = &token {
                request = request.next_token(t);
            }
            let output = request.send().await.map_err(transport)?;
            arns.extend(output.cluster_arns().iter().cloned());
            match output.next_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        Ok(arns)
    }

    async fn list_services(&self, cluster: &str) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut request = self.client.list_services().cluster(cluster);
            if let Some(t) = &token {
                request = request.next_token(t);
            }
            let output = request.send().await.map_err(transport)?;
            arns.extend(output.service_arns().iter().cloned());
            match output.next_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        Ok(arns)
    }

    async fn list_tasks(
        &self,
        cluster: &str,
        family: &str,
        status: DesiredTaskStatus,
    ) -> Result<Vec<String>> {
        let desired = match status {
            DesiredTaskStatus::Running => sdk::DesiredStatus::Running,
            DesiredTaskStatus::Stopped => sdk::DesiredStatus::Stopped,
        };
        let mut arns = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .list_tasks()
                .cluster(cluster)
                .family(family)
                .desired_status(desired.clone());
            if let Some(t) = &token {
                request = request.next_token(t);
            }
            let output = request.send().await.map_err(transport)?;
            arns.extend(output.task_arns().iter().cloned());
            match output.next_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        Ok(arns)
    }

    async fn describe_tasks(&self, cluster: &str, task_arns: &[String]) -> Result<Vec<Task>> {
        if task_arns.is_empty() {
            return Ok(Vec::new());
        }
        let output = self
            .client
            .describe_tasks()
            .cluster(cluster)
            .set_tasks(Some(task_arns.to_vec()))
            .send()
            .await
            .map_err(transport)?;
        Ok(output.tasks().iter().map(convert_task).collect())
    }

    async fn run_task(
        &self,
        cluster: &str,
        definition_arn: &str,
        container_name: &str,
        command: Vec<String>,
    ) -> Result<RunTaskOutcome> {
        let container_override = sdk::ContainerOverride::builder()
            .name(container_name)
            .set_command(Some(command))
            .build();
        let overrides = sdk::TaskOverride::builder()
            .container_overrides(container_override)
            .build();

        let output = self
            .client
            .run_task()
            .cluster(cluster)
            .task_definition(definition_arn)
            .overrides(overrides)
            .send()
            .await
            .map_err(transport)?;

        Ok(RunTaskOutcome {
            tasks: output.tasks().iter().map(convert_task).collect(),
            failures: output
                .failures()
                .iter()
                .map(|f| RunFailure {
                    arn: f.arn().map(str::to_string),
                    reason: f.reason().map(str::to_string),
                    detail: f.detail().map(str::to_string),
                })
                .collect(),
        })
    }
}

fn convert_service(service: &sdk::Service) -> Result<Service> {
    Ok(Service {
        arn: service.service_arn().unwrap_or_default().to_string(),
        name: service.service_name().unwrap_or_default().to_string(),
        cluster_arn: service.cluster_arn().unwrap_or_default().to_string(),
        task_definition: service
            .task_definition()
            .ok_or_else(|| {
                EcsError::not_found(
                    "TaskDefinition",
                    service.service_name().unwrap_or_default(),
                    service.cluster_arn().unwrap_or_default(),
                )
            })?
            .to_string(),
        status: service.status().map(str::to_string),
        desired_count: service.desired_count(),
        running_count: service.running_count(),
        pending_count: service.pending_count(),
        deployments: service
            .deployments()
            .iter()
            .map(|d| Deployment {
                task_definition: d.task_definition().unwrap_or_default().to_string(),
                status: d.status().unwrap_or_default().to_string(),
                desired_count: d.desired_count(),
                pending_count: d.pending_count(),
                running_count: d.running_count(),
                created_at: d.created_at().and_then(convert_timestamp),
            })
            .collect(),
        events: service
            .events()
            .iter()
            .map(|e| ServiceEvent {
                created_at: e.created_at().and_then(convert_timestamp),
                message: e.message().unwrap_or_default().to_string(),
            })
            .collect(),
    })
}

fn convert_timestamp(
    ts: &aws_sdk_ecs::primitives::DateTime,
) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

fn convert_task(task: &sdk::Task) -> Task {
    Task {
        arn: task.task_arn().unwrap_or_default().to_string(),
        cluster_arn: task.cluster_arn().unwrap_or_default().to_string(),
        last_status: task.last_status().unwrap_or_default().to_string(),
        stopped_reason: task.stopped_reason().map(str::to_string),
        containers: task
            .containers()
            .iter()
            .map(|c| TaskContainer {
                name: c.name().unwrap_or_default().to_string(),
                exit_code: c.exit_code(),
                reason: c.reason().map(str::to_string),
            })
            .collect(),
    }
}

fn convert_task_definition(def: &sdk::TaskDefinition) -> TaskDefinition {
    TaskDefinition {
        family: def.family().unwrap_or_default().to_string(),
        revision: def.revision(),
        arn: def.task_definition_arn().map(str::to_string),
        container_definitions: def
            .container_definitions()
            .iter()
            .map(convert_container_definition)
            .collect(),
        volumes: def
            .volumes()
            .iter()
            .map(|v| Volume {
                name: v.name().unwrap_or_default().to_string(),
                host_path: v.host().and_then(|h| h.source_path()).map(str::to_string),
            })
            .collect(),
        task_role_arn: def.task_role_arn().map(str::to_string),
        execution_role_arn: def.execution_role_arn().map(str::to_string),
        network_mode: def.network_mode().map(|m| m.as_str().to_string()),
        requires_compatibilities: def
            .requires_compatibilities()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect(),
        cpu: def.cpu().map(str::to_string),
        memory: def.memory().map(str::to_string),
    }
}

fn convert_container_definition(container: &sdk::ContainerDefinition) -> ContainerDefinition {
    ContainerDefinition {
        name: container.name().unwrap_or_default().to_string(),
        image: container.image().unwrap_or_default().to_string(),
        essential: container.essential().unwrap_or(false),
        environment: container
            .environment()
            .iter()
            .map(|kv| EnvVar {
                name: kv.name().unwrap_or_default().to_string(),
                value: kv.value().unwrap_or_default().to_string(),
            })
            .collect(),
        command: container.command().to_vec(),
        memory: container.memory(),
        memory_reservation: container.memory_reservation(),
        port_mappings: container
            .port_mappings()
            .iter()
            .map(|p| PortMapping {
                container_port: p.container_port(),
                host_port: p.host_port(),
                protocol: p.protocol().map(|t| t.as_str().to_string()),
            })
            .collect(),
        log_configuration: container.log_configuration().map(|lc| LogConfiguration {
            log_driver: lc.log_driver().as_str().to_string(),
            options: lc.options().cloned().unwrap_or_default(),
        }),
    }
}

fn build_container_definition(container: &ContainerDefinition) -> Result<sdk::ContainerDefinition> {
    let environment: Vec<sdk::KeyValuePair> = container
        .environment
        .iter()
        .map(|pair| {
            sdk::KeyValuePair::builder()
                .name(&pair.name)
                .value(&pair.value)
                .build()
        })
        .collect();
    let port_mappings: Vec<sdk::PortMapping> = container
        .port_mappings
        .iter()
        .map(|p| {
            sdk::PortMapping::builder()
                .set_container_port(p.container_port)
                .set_host_port(p.host_port)
                .set_protocol(
                    p.protocol
                        .as_deref()
                        .map(sdk::TransportProtocol::from),
                )
                .build()
        })
        .collect();

    let log_configuration = container
        .log_configuration
        .as_ref()
        .map(|lc| {
            sdk::LogConfiguration::builder()
                .log_driver(sdk::LogDriver::from(lc.log_driver.as_str()))
                .set_options(Some(lc.options.clone()))
                .build()
                .map_err(|e| EcsError::RegistrationFailed(e.to_string()))
        })
        .transpose()?;

    Ok(sdk::ContainerDefinition::builder()
        .name(&container.name)
        .image(&container.image)
        .essential(container.essential)
        .set_environment(Some(environment))
        .set_command(Some(container.command.clone()))
        .set_memory(container.memory)
        .set_memory_reservation(container.memory_reservation)
        .set_port_mappings(Some(port_mappings))
        .set_log_configuration(log_configuration)
        .build())
}

fn build_volume(volume: &Volume) -> sdk::Volume {
    let mut builder = sdk::Volume::builder().name(&volume.name);
    if volume.host_path.is_some() {
        builder = builder.host(
            sdk::HostVolumeProperties::builder()
                .set_source_path(volume.host_path.clone())
                .build(),
        );
    }
    builder.build()
}

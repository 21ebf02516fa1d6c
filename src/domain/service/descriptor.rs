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

//! The deployment pipeline: resolve, mutate, register, deploy, plus the
//! one-off task runner and service-level operations built on them.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::warn;

use crate::domain::definition::command::parse_command_override;
use crate::domain::definition::edits::{apply_edits, ContainerEdit};
use crate::domain::definition::environment;
use crate::domain::definition::{EnvVar, TaskDefinition};
use crate::domain::service::cache::ClusterCache;
use crate::domain::service::{Service, ServiceUpdate};
use crate::infrastructure::aws::EcsClient;
use crate::infrastructure::constants::{TASK_POLL_INTERVAL_SECS, TASK_STATUS_STOPPED};
use crate::shared::arn;
use crate::shared::error::{EcsError, Result};

/// How to locate the task definition an operation starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskDefinitionSource {
    /// The definition the service currently runs.
    Current,
    /// The newest registered revision in the service's family.
    #[default]
    Newest,
}

impl TaskDefinitionSource {
    /// Parses a `--task-definition-source` value. Unrecognized strings fall
    /// back to `current`, with a warning rather than an error.
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "newest" => Self::Newest,
            "current" => Self::Current,
            other => {
                warn!(
                    source = other,
                    "unknown task definition source, falling back to \"current\""
                );
                Self::Current
            }
        }
    }
}

/// Result of the deploy-image workflow.
#[derive(Debug, Clone)]
pub struct DeployImageOutcome {
    pub definition: TaskDefinition,
    /// False when the newest revision already carried the target image and
    /// registration was skipped.
    pub registered: bool,
    pub service: Service,
}

/// A successfully submitted one-off task.
#[derive(Debug, Clone)]
pub struct RunStarted {
    pub task_arn: String,
    pub task_id: String,
}

pub struct ServiceDescriptor {
    client: Arc<dyn EcsClient>,
    clusters: ClusterCache,
}

impl ServiceDescriptor {
    pub fn new(client: Arc<dyn EcsClient>) -> Self {
        Self {
            client,
            clusters: ClusterCache::new(),
        }
    }

    /// Fails with `NotFound` unless `cluster` names a known cluster.
    pub async fn validate_cluster(&self, cluster: &str) -> Result<()> {
        let names = self.clusters.cluster_names(&self.client).await?;
        if names.iter().any(|n| n == cluster) {
            Ok(())
        } else {
            Err(EcsError::not_found("Cluster", cluster, cluster))
        }
    }

    pub async fn cluster_names(&self) -> Result<Vec<String>> {
        let mut names = self.clusters.cluster_names(&self.client).await?;
        names.sort();
        Ok(names)
    }

    /// Plain service names for a cluster.
    pub async fn service_names(&self, cluster: &str) -> Result<Vec<String>> {
        let arns = self.client.list_services(cluster).await?;
        Ok(arns.iter().map(|a| arn::resource_id(a).to_string()).collect())
    }

    pub async fn find_service(&self, cluster: &str, service: &str) -> Result<Service> {
        self.client.describe_service(cluster, service).await
    }

    /// Resolver: the definition a service currently runs.
    pub async fn current_task_definition(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<TaskDefinition> {
        let service = self.client.describe_service(cluster, service).await?;
        self.client
            .describe_task_definition(&service.task_definition)
            .await
    }

    /// Resolver: the newest registered revision in a family.
    pub async fn newest_task_definition(&self, family: &str) -> Result<TaskDefinition> {
        let revisions = self.client.list_task_definitions(family).await?;
        let newest = revisions
            .first()
            .ok_or_else(|| EcsError::not_found("TaskDefinition", family, "-"))?;
        self.client.describe_task_definition(newest).await
    }

    /// Resolver entry point used by the revision-producing commands.
    pub async fn locate_task_definition(
        &self,
        cluster: &str,
        service: &str,
        source: TaskDefinitionSource,
    ) -> Result<TaskDefinition> {
        let current = self.current_task_definition(cluster, service).await?;
        match source {
            TaskDefinitionSource::Current => Ok(current),
            TaskDefinitionSource::Newest => self.newest_task_definition(&current.family).await,
        }
    }

    /// Registrar: submits an in-memory definition as a new revision.
    pub async fn register(&self, def: &TaskDefinition) -> Result<TaskDefinition> {
        self.client.register_task_definition(def).await
    }

    /// Deployer: points the service at a registered definition.
    pub async fn deploy(
        &self,
        cluster: &str,
        service: &str,
        def: &TaskDefinition,
    ) -> Result<Service> {
        let definition_arn = def.arn.clone().ok_or_else(|| {
            EcsError::invalid_argument(format!(
                "task definition {} has not been registered",
                def.family
            ))
        })?;
        self.client
            .update_service(
                cluster,
                service,
                ServiceUpdate {
                    task_definition: Some(definition_arn),
                    ..Default::default()
                },
            )
            .await
    }

    /// Deployer: fresh containers on the same revision.
    pub async fn force_redeploy(&self, cluster: &str, service: &str) -> Result<Service> {
        self.client
            .update_service(
                cluster,
                service,
                ServiceUpdate {
                    force_new_deployment: true,
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn scale(&self, cluster: &str, service: &str, desired_count: i32) -> Result<Service> {
        self.client
            .update_service(
                cluster,
                service,
                ServiceUpdate {
                    desired_count: Some(desired_count),
                    ..Default::default()
                },
            )
            .await
    }

    /// Deploy-image workflow. When the newest revision in the family
    /// already carries `image`, it is reused instead of registering a
    /// duplicate; otherwise the current definition is mutated and
    /// registered first.
    pub async fn deploy_image(
        &self,
        cluster: &str,
        service: &str,
        image: &str,
    ) -> Result<DeployImageOutcome> {
        let current = self.current_task_definition(cluster, service).await?;

        let reusable = match self.newest_task_definition(&current.family).await {
            Ok(newest) if newest.essential_image() == Some(image) => Some(newest),
            _ => None,
        };

        let (definition, registered) = match reusable {
            Some(def) => (def, false),
            None => {
                let mutated =
                    apply_edits(&current, &[ContainerEdit::SetImage(image.to_string())])?;
                (self.register(&mutated).await?, true)
            }
        };

        let service = self.deploy(cluster, service, &definition).await?;
        Ok(DeployImageOutcome {
            definition,
            registered,
            service,
        })
    }

    /// Fast-forwards a service to the newest revision in its family.
    /// Returns `None` when the service is already there.
    pub async fn deploy_newest(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Option<(TaskDefinition, Service)>> {
        let current = self.current_task_definition(cluster, service).await?;
        let newest = self.newest_task_definition(&current.family).await?;
        if newest.arn == current.arn {
            return Ok(None);
        }
        let service = self.deploy(cluster, service, &newest).await?;
        Ok(Some((newest, service)))
    }

    /// Registers a new revision with a different image, without deploying.
    pub async fn create_revision(
        &self,
        cluster: &str,
        service: &str,
        source: TaskDefinitionSource,
        image: &str,
    ) -> Result<TaskDefinition> {
        let def = self.locate_task_definition(cluster, service, source).await?;
        let mutated = apply_edits(&def, &[ContainerEdit::SetImage(image.to_string())])?;
        self.register(&mutated).await
    }

    /// Copies a definition into a new family, optionally swapping image,
    /// container name and command. Nothing is deployed.
    pub async fn copy_revision(
        &self,
        cluster: &str,
        service: &str,
        source: TaskDefinitionSource,
        family: &str,
        image: Option<&str>,
        container_name: Option<&str>,
        command_override: Option<&str>,
    ) -> Result<TaskDefinition> {
        let def = self.locate_task_definition(cluster, service, source).await?;

        let mut edits = vec![ContainerEdit::SetFamily(family.to_string())];
        if let Some(image) = image {
            edits.push(ContainerEdit::SetImage(image.to_string()));
        }
        if let Some(name) = container_name {
            edits.push(ContainerEdit::SetName(name.to_string()));
        }
        if let Some(command) = command_override {
            edits.push(ContainerEdit::SetCommand(parse_command_override(command)?));
        }

        let mutated = apply_edits(&def, &edits)?;
        self.register(&mutated).await
    }

    /// Registers and deploys a revision with new memory settings on the
    /// essential container.
    pub async fn set_memory(
        &self,
        cluster: &str,
        service: &str,
        memory: Option<i32>,
        reservation: Option<i32>,
    ) -> Result<(TaskDefinition, Service)> {
        let def = self
            .locate_task_definition(cluster, service, TaskDefinitionSource::Newest)
            .await?;
        let mutated = apply_edits(
            &def,
            &[ContainerEdit::SetMemory {
                memory,
                reservation,
            }],
        )?;
        let registered = self.register(&mutated).await?;
        let service = self.deploy(cluster, service, &registered).await?;
        Ok((registered, service))
    }

    /// The deployed essential container's environment.
    pub async fn environment(&self, cluster: &str, service: &str) -> Result<Vec<EnvVar>> {
        self.validate_cluster(cluster).await?;
        let def = self.current_task_definition(cluster, service).await?;
        Ok(def.essential_container()?.environment.clone())
    }

    /// Upserts the given pairs into the deployed environment, registers the
    /// result and deploys it.
    pub async fn set_environment_vars(
        &self,
        cluster: &str,
        service: &str,
        pairs: &[EnvVar],
    ) -> Result<(TaskDefinition, Service)> {
        let def = self.current_task_definition(cluster, service).await?;
        let mut env = def.essential_container()?.environment.clone();
        for pair in pairs {
            environment::upsert(&mut env, &pair.name, &pair.value);
        }
        self.replace_environment_of(cluster, service, &def, env)
            .await
    }

    /// Full environment replacement (used by `env edit`), registered and
    /// deployed.
    pub async fn replace_environment(
        &self,
        cluster: &str,
        service: &str,
        env: Vec<EnvVar>,
    ) -> Result<(TaskDefinition, Service)> {
        let def = self.current_task_definition(cluster, service).await?;
        self.replace_environment_of(cluster, service, &def, env)
            .await
    }

    async fn replace_environment_of(
        &self,
        cluster: &str,
        service: &str,
        def: &TaskDefinition,
        env: Vec<EnvVar>,
    ) -> Result<(TaskDefinition, Service)> {
        let mutated = apply_edits(def, &[ContainerEdit::SetEnvironment(env)])?;
        let registered = self.register(&mutated).await?;
        let service = self.deploy(cluster, service, &registered).await?;
        Ok((registered, service))
    }

    /// Scans every cluster/service pair for environment variables whose
    /// name contains `query` (case-insensitive). Services that fail to
    /// resolve are skipped.
    pub async fn find_environment(&self, query: &str) -> Result<Vec<EnvMatch>> {
        let needle = query.to_lowercase();
        let mut matches = Vec::new();
        for cluster in self.cluster_names().await? {
            let services = match self.service_names(&cluster).await {
                Ok(services) => services,
                Err(e) => {
                    warn!(cluster = %cluster, error = %e, "skipping cluster");
                    continue;
                }
            };
            for service in services {
                let def = match self.current_task_definition(&cluster, &service).await {
                    Ok(def) => def,
                    Err(_) => continue,
                };
                let Ok(container) = def.essential_container() else {
                    continue;
                };
                for pair in &container.environment {
                    if pair.name.to_lowercase().contains(&needle) {
                        matches.push(EnvMatch {
                            cluster: cluster.clone(),
                            service: service.clone(),
                            variable: pair.clone(),
                        });
                    }
                }
            }
        }
        Ok(matches)
    }

    /// Submits a one-off run of `def` with a command override on its
    /// essential container. Platform placement failures are reported, not
    /// retried.
    pub async fn run_once(
        &self,
        cluster: &str,
        def: &TaskDefinition,
        command: &str,
    ) -> Result<RunStarted> {
        let tokens = parse_command_override(command)?;
        let container = def.essential_container()?;
        let definition_arn = def.arn.as_deref().ok_or_else(|| {
            EcsError::invalid_argument(format!(
                "task definition {} has not been registered",
                def.family
            ))
        })?;

        let outcome = self
            .client
            .run_task(cluster, definition_arn, &container.name, tokens)
            .await?;

        if !outcome.failures.is_empty() {
            return Err(EcsError::RunFailed {
                reasons: outcome.failures.iter().map(|f| f.describe()).collect(),
            });
        }
        let task = outcome.tasks.first().ok_or_else(|| EcsError::RunFailed {
            reasons: vec!["platform returned no tasks and no failures".to_string()],
        })?;

        Ok(RunStarted {
            task_arn: task.arn.clone(),
            task_id: arn::resource_id(&task.arn).to_string(),
        })
    }

    /// Polls a task every few seconds until it stops, then resolves its
    /// exit code. `max_wait == None` opts into unbounded waiting.
    pub async fn wait_for_task(
        &self,
        cluster: &str,
        task_arn: &str,
        max_wait: Option<Duration>,
    ) -> Result<i32> {
        let started = Instant::now();
        loop {
            let tasks = self
                .client
                .describe_tasks(cluster, &[task_arn.to_string()])
                .await?;
            let task = tasks
                .iter()
                .find(|t| t.arn == task_arn)
                .ok_or_else(|| EcsError::not_found("Task", task_arn, cluster))?;

            if task.last_status == TASK_STATUS_STOPPED {
                return Ok(task.exit_code());
            }

            if let Some(max) = max_wait {
                if started.elapsed() >= max {
                    return Err(EcsError::Timeout(format!(
                        "task {} still {} after {:?}",
                        task_arn, task.last_status, max
                    )));
                }
            }
            sleep(Duration::from_secs(TASK_POLL_INTERVAL_SECS)).await;
        }
    }

    /// Invalidate cached cluster lookups (e.g. after creating a cluster
    /// out-of-band).
    pub async fn refresh_clusters(&self) {
        self.clusters.invalidate().await;
    }
}

/// One `env find` hit.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvMatch {
    pub cluster: String,
    pub service: String,
    pub variable: EnvVar,
}

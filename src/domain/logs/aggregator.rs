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

//! Concurrent log aggregation across a task family's streams.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::warn;

use crate::domain::definition::TaskDefinition;
use crate::domain::logs::{stream_name, StatusFilter};
use crate::domain::service::{DesiredTaskStatus, Task};
use crate::infrastructure::aws::{EcsClient, LogsClient};
use crate::infrastructure::constants::{
    MAX_EVENT_PAGES, MAX_STREAM_PAGES, MAX_TASKS_PER_STATUS, OPT_LOG_GROUP, OPT_STREAM_PREFIX,
    TASK_LOG_LOOKBACK_MINUTES,
};
use crate::shared::error::{EcsError, Result};

/// Tasks enumerated for a definition, split by status.
#[derive(Debug, Clone, Default)]
pub struct TaskSummary {
    pub running: Vec<Task>,
    pub stopped: Vec<Task>,
}

impl TaskSummary {
    /// Tasks selected by the status filter; `all` concatenates running
    /// before stopped.
    pub fn filtered(&self, filter: StatusFilter) -> Vec<Task> {
        match filter {
            StatusFilter::Running => self.running.clone(),
            StatusFilter::Stopped => self.stopped.clone(),
            StatusFilter::All => {
                let mut all = self.running.clone();
                all.extend(self.stopped.iter().cloned());
                all
            }
        }
    }
}

/// Result of a merged fetch. Failed streams contribute no lines; their
/// count is reported so callers can surface a warning.
#[derive(Debug, Clone, Default)]
pub struct MergedLogs {
    pub lines: Vec<String>,
    pub failed_streams: usize,
}

pub struct LogAggregator {
    ecs: Arc<dyn EcsClient>,
    logs: Arc<dyn LogsClient>,
}

impl LogAggregator {
    pub fn new(ecs: Arc<dyn EcsClient>, logs: Arc<dyn LogsClient>) -> Self {
        Self { ecs, logs }
    }

    /// Enumerates the definition's recent tasks, one capped query per
    /// status.
    pub async fn tasks_for_definition(
        &self,
        cluster: &str,
        def: &TaskDefinition,
    ) -> Result<TaskSummary> {
        Ok(TaskSummary {
            running: self
                .tasks_by_status(cluster, &def.family, DesiredTaskStatus::Running)
                .await?,
            stopped: self
                .tasks_by_status(cluster, &def.family, DesiredTaskStatus::Stopped)
                .await?,
        })
    }

    async fn tasks_by_status(
        &self,
        cluster: &str,
        family: &str,
        status: DesiredTaskStatus,
    ) -> Result<Vec<Task>> {
        let mut arns = self.ecs.list_tasks(cluster, family, status).await?;
        arns.truncate(MAX_TASKS_PER_STATUS);
        if arns.is_empty() {
            return Ok(Vec::new());
        }
        self.ecs.describe_tasks(cluster, &arns).await
    }

    /// Fetches every selected task's stream concurrently and merges the
    /// rendered lines into chronological order.
    ///
    /// The collector is started before any producer; producers each own a
    /// clone of the sender, and the last sender is dropped before the
    /// producers are joined, so the collector's drain loop always
    /// terminates on channel closure.
    pub async fn fetch_merged_logs(
        &self,
        cluster: &str,
        def: &TaskDefinition,
        filter: StatusFilter,
    ) -> Result<MergedLogs> {
        let config = def.awslogs_configuration()?;
        let group = required_option(config, OPT_LOG_GROUP)?;
        let prefix = required_option(config, OPT_STREAM_PREFIX)?;
        let container = def.essential_container()?.name.clone();

        let summary = self.tasks_for_definition(cluster, def).await?;
        let tasks = summary.filtered(filter);

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let collector = tokio::spawn(async move {
            let mut lines = Vec::new();
            while let Some(line) = rx.recv().await {
                lines.push(line);
            }
            lines
        });

        let mut producers = JoinSet::new();
        for task in &tasks {
            let stream = stream_name(&prefix, &container, &task.arn);
            let group = group.clone();
            let logs = Arc::clone(&self.logs);
            let tx = tx.clone();
            producers.spawn(async move {
                let events = logs.get_log_events(&group, &stream, None, None).await?;
                for event in events {
                    // receiver outlives every producer; a send can only fail
                    // after the collector has been dropped entirely
                    let _ = tx.send(event.render());
                }
                Ok::<_, EcsError>(())
            });
        }
        drop(tx);

        let mut failed_streams = 0usize;
        while let Some(joined) = producers.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failed_streams += 1;
                    warn!(error = %e, "log stream fetch failed");
                }
                Err(e) => {
                    failed_streams += 1;
                    warn!(error = %e, "log stream fetch panicked");
                }
            }
        }

        let mut lines = collector
            .await
            .map_err(|e| EcsError::transport(format!("log collector failed: {}", e)))?;
        // rendered timestamps are fixed-width, so a string sort is a
        // chronological sort
        lines.sort();
        Ok(MergedLogs {
            lines,
            failed_streams,
        })
    }

    /// Terminal operation behind the `logs` command: prints a task summary
    /// and the merged lines, warning when streams were dropped.
    pub async fn tail(&self, cluster: &str, service: &str, filter: StatusFilter) -> Result<()> {
        let service = self.ecs.describe_service(cluster, service).await?;
        let def = self
            .ecs
            .describe_task_definition(&service.task_definition)
            .await?;

        let summary = self.tasks_for_definition(cluster, &def).await?;
        println!(
            "Task summary: [{}] running, [{}] stopped",
            summary.running.len(),
            summary.stopped.len()
        );

        let merged = self.fetch_merged_logs(cluster, &def, filter).await?;
        println!("{}", merged.lines.join("\n"));
        if merged.failed_streams > 0 {
            warn!(
                count = merged.failed_streams,
                "some log streams could not be fetched"
            );
        }
        Ok(())
    }

    /// Stream-discovery variant used after one-off task runs: finds streams
    /// by prefix and prints recent events, bounded by the page caps.
    pub async fn print_task_logs(&self, def: &TaskDefinition, task_id: Option<&str>) -> Result<()> {
        let config = def.awslogs_configuration()?;
        let group = required_option(config, OPT_LOG_GROUP)?;
        let prefix = required_option(config, OPT_STREAM_PREFIX)?;
        let container = &def.essential_container()?.name;

        let search_prefix = match task_id {
            Some(id) => format!("{}/{}/{}", prefix, container, id),
            None => prefix.clone(),
        };
        let start_time = (Utc::now() - chrono::Duration::minutes(TASK_LOG_LOOKBACK_MINUTES))
            .timestamp_millis();

        let streams = self
            .logs
            .describe_log_streams(&group, &search_prefix, MAX_STREAM_PAGES)
            .await?;
        for stream in streams {
            let events = self
                .logs
                .get_log_events(&group, &stream, Some(start_time), Some(MAX_EVENT_PAGES))
                .await?;
            for event in events {
                println!("{}", event.render());
            }
        }
        Ok(())
    }
}

fn required_option(
    config: &crate::domain::definition::LogConfiguration,
    key: &str,
) -> Result<String> {
    config
        .options
        .get(key)
        .cloned()
        .ok_or_else(|| EcsError::invalid_argument(format!("log configuration is missing {}", key)))
}

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

//! Fan-out/fan-in log aggregation tests against in-memory stream stores.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ecsctl::domain::definition::{ContainerDefinition, LogConfiguration, TaskDefinition};
use ecsctl::domain::logs::aggregator::LogAggregator;
use ecsctl::domain::logs::{LogEvent, StatusFilter};
use ecsctl::domain::service::{
    DesiredTaskStatus, RunTaskOutcome, Service, ServiceUpdate, Task,
};
use ecsctl::infrastructure::aws::{EcsClient, LogsClient};
use ecsctl::shared::error::{EcsError, Result};

const ACCOUNT: &str = "arn:aws:ecs:us-west-2:123456789012";

fn logging_definition(driver: &str) -> TaskDefinition {
    let mut options = HashMap::new();
    options.insert("awslogs-group".to_string(), "/ecs/web".to_string());
    options.insert("awslogs-stream-prefix".to_string(), "web".to_string());
    options.insert("awslogs-region".to_string(), "us-west-2".to_string());

    TaskDefinition {
        family: "web".to_string(),
        revision: 5,
        arn: Some(format!("{}:task-definition/web:5", ACCOUNT)),
        container_definitions: vec![ContainerDefinition {
            name: "app".to_string(),
            image: "web:v5".to_string(),
            essential: true,
            log_configuration: Some(LogConfiguration {
                log_driver: driver.to_string(),
                options,
            }),
            ..Default::default()
        }],
        volumes: Vec::new(),
        task_role_arn: None,
        execution_role_arn: None,
        network_mode: None,
        requires_compatibilities: Vec::new(),
        cpu: None,
        memory: None,
    }
}

fn task(cluster: &str, id: &str, status: &str) -> Task {
    Task {
        arn: format!("{}:task/{}/{}", ACCOUNT, cluster, id),
        cluster_arn: format!("{}:cluster/{}", ACCOUNT, cluster),
        last_status: status.to_string(),
        stopped_reason: None,
        containers: Vec::new(),
    }
}

/// Task listings only; everything else is unreachable from these tests.
#[derive(Default)]
struct FakeTaskStore {
    running: Vec<Task>,
    stopped: Vec<Task>,
}

#[async_trait::async_trait]
impl EcsClient for FakeTaskStore {
    async fn describe_service(&self, cluster: &str, service: &str) -> Result<Service> {
        Err(EcsError::AmbiguousService {
            cluster: cluster.to_string(),
            service: service.to_string(),
            count: 0,
        })
    }

    async fn describe_task_definition(&self, reference: &str) -> Result<TaskDefinition> {
        Err(EcsError::not_found("TaskDefinition", reference, "-"))
    }

    async fn list_task_definitions(&self, _family: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn register_task_definition(&self, _def: &TaskDefinition) -> Result<TaskDefinition> {
        unimplemented!("not used by log aggregation")
    }

    async fn update_service(
        &self,
        _cluster: &str,
        _service: &str,
        _update: ServiceUpdate,
    ) -> Result<Service> {
        unimplemented!("not used by log aggregation")
    }

    async fn list_clusters(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn list_services(&self, _cluster: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn list_tasks(
        &self,
        _cluster: &str,
        _family: &str,
        status: DesiredTaskStatus,
    ) -> Result<Vec<String>> {
        let tasks = match status {
            DesiredTaskStatus::Running => &self.running,
            DesiredTaskStatus::Stopped => &self.stopped,
        };
        Ok(tasks.iter().map(|t| t.arn.clone()).collect())
    }

    async fn describe_tasks(&self, _cluster: &str, task_arns: &[String]) -> Result<Vec<Task>> {
        Ok(self
            .running
            .iter()
            .chain(self.stopped.iter())
            .filter(|t| task_arns.contains(&t.arn))
            .cloned()
            .collect())
    }

    async fn run_task(
        &self,
        _cluster: &str,
        _definition_arn: &str,
        _container_name: &str,
        _command: Vec<String>,
    ) -> Result<RunTaskOutcome> {
        unimplemented!("not used by log aggregation")
    }
}

/// Stream-name-keyed event store. Streams listed in `failing` error out;
/// optional per-stream delays exercise arbitrary completion order.
#[derive(Default)]
struct FakeStreamStore {
    streams: Mutex<HashMap<String, Vec<LogEvent>>>,
    failing: Vec<String>,
    delays_ms: HashMap<String, u64>,
}

impl FakeStreamStore {
    fn with_stream(self, name: &str, events: Vec<LogEvent>) -> Self {
        self.streams.lock().unwrap().insert(name.to_string(), events);
        self
    }
}

#[async_trait::async_trait]
impl LogsClient for FakeStreamStore {
    async fn get_log_events(
        &self,
        _group: &str,
        stream: &str,
        start_time_ms: Option<i64>,
        _max_pages: Option<usize>,
    ) -> Result<Vec<LogEvent>> {
        if let Some(delay) = self.delays_ms.get(stream) {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
        }
        if self.failing.iter().any(|s| s == stream) {
            return Err(EcsError::transport(format!("stream {} unavailable", stream)));
        }
        let events = self
            .streams
            .lock()
            .unwrap()
            .get(stream)
            .cloned()
            .unwrap_or_default();
        Ok(events
            .into_iter()
            .filter(|e| start_time_ms.map_or(true, |start| e.timestamp_ms >= start))
            .collect())
    }

    async fn describe_log_streams(
        &self,
        _group: &str,
        prefix: &str,
        _max_pages: usize,
    ) -> Result<Vec<String>> {
        let streams = self.streams.lock().unwrap();
        let mut names: Vec<String> = streams
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}

fn event(ts_ms: i64, message: &str) -> LogEvent {
    LogEvent {
        timestamp_ms: ts_ms,
        message: message.to_string(),
    }
}

// 2024-01-01 00:00:00 UTC
const T0: i64 = 1_704_067_200_000;

#[tokio::test]
async fn test_merged_lines_sorted_chronologically() {
    let tasks = FakeTaskStore {
        running: vec![task("prod", "aaaa", "RUNNING"), task("prod", "bbbb", "RUNNING")],
        stopped: Vec::new(),
    };
    // the slower stream holds the earlier events, so arrival order is
    // reversed chronological
    let mut streams = FakeStreamStore::default()
        .with_stream(
            "web/app/aaaa",
            vec![event(T0 + 1_000, "a"), event(T0 + 3_000, "c")],
        )
        .with_stream(
            "web/app/bbbb",
            vec![event(T0 + 2_000, "b"), event(T0 + 4_000, "d")],
        );
    streams.delays_ms.insert("web/app/aaaa".to_string(), 50);

    let aggregator = LogAggregator::new(Arc::new(tasks), Arc::new(streams));
    let merged = aggregator
        .fetch_merged_logs("prod", &logging_definition("awslogs"), StatusFilter::All)
        .await
        .unwrap();

    assert_eq!(merged.failed_streams, 0);
    assert_eq!(
        merged.lines,
        vec![
            "[2024-01-01 00:00:01 UTC] a",
            "[2024-01-01 00:00:02 UTC] b",
            "[2024-01-01 00:00:03 UTC] c",
            "[2024-01-01 00:00:04 UTC] d",
        ]
    );
}

#[tokio::test]
async fn test_failed_stream_is_dropped_not_fatal() {
    let tasks = FakeTaskStore {
        running: vec![task("prod", "aaaa", "RUNNING"), task("prod", "bbbb", "RUNNING")],
        stopped: Vec::new(),
    };
    let mut streams =
        FakeStreamStore::default().with_stream("web/app/aaaa", vec![event(T0 + 1_000, "a")]);
    streams.failing.push("web/app/bbbb".to_string());

    let aggregator = LogAggregator::new(Arc::new(tasks), Arc::new(streams));
    let merged = aggregator
        .fetch_merged_logs("prod", &logging_definition("awslogs"), StatusFilter::All)
        .await
        .unwrap();

    assert_eq!(merged.failed_streams, 1);
    assert_eq!(merged.lines, vec!["[2024-01-01 00:00:01 UTC] a"]);
}

#[tokio::test]
async fn test_status_filter_selects_tasks() {
    let tasks = FakeTaskStore {
        running: vec![task("prod", "aaaa", "RUNNING")],
        stopped: vec![task("prod", "bbbb", "STOPPED")],
    };
    let streams = FakeStreamStore::default()
        .with_stream("web/app/aaaa", vec![event(T0 + 1_000, "running line")])
        .with_stream("web/app/bbbb", vec![event(T0 + 2_000, "stopped line")]);

    let aggregator = LogAggregator::new(Arc::new(tasks), Arc::new(streams));
    let def = logging_definition("awslogs");

    let running = aggregator
        .fetch_merged_logs("prod", &def, StatusFilter::Running)
        .await
        .unwrap();
    assert_eq!(running.lines, vec!["[2024-01-01 00:00:01 UTC] running line"]);

    let stopped = aggregator
        .fetch_merged_logs("prod", &def, StatusFilter::Stopped)
        .await
        .unwrap();
    assert_eq!(stopped.lines, vec!["[2024-01-01 00:00:02 UTC] stopped line"]);

    let all = aggregator
        .fetch_merged_logs("prod", &def, StatusFilter::All)
        .await
        .unwrap();
    assert_eq!(all.lines.len(), 2);
}

#[tokio::test]
async fn test_unsupported_log_driver() {
    let tasks = FakeTaskStore::default();
    let streams = FakeStreamStore::default();
    let aggregator = LogAggregator::new(Arc::new(tasks), Arc::new(streams));

    let err = aggregator
        .fetch_merged_logs("prod", &logging_definition("json-file"), StatusFilter::All)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EcsError::UnsupportedLogDriver { ref found } if found == "json-file"
    ));
}

#[tokio::test]
async fn test_no_tasks_yields_no_lines() {
    let tasks = FakeTaskStore::default();
    let streams = FakeStreamStore::default();
    let aggregator = LogAggregator::new(Arc::new(tasks), Arc::new(streams));

    let merged = aggregator
        .fetch_merged_logs("prod", &logging_definition("awslogs"), StatusFilter::All)
        .await
        .unwrap();
    assert!(merged.lines.is_empty());
    assert_eq!(merged.failed_streams, 0);
}

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

//! CloudWatch Logs client seam and its AWS SDK implementation.

use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;

use crate::domain::logs::LogEvent;
use crate::shared::error::{EcsError, Result};

#[async_trait::async_trait]
pub trait LogsClient: Send + Sync {
    /// Fetches a stream's events in order, optionally bounded by a start
    /// time (epoch milliseconds) and a page cap.
    async fn get_log_events(
        &self,
        group: &str,
        stream: &str,
        start_time_ms: Option<i64>,
        max_pages: Option<usize>,
    ) -> Result<Vec<LogEvent>>;

    /// Lists stream names in a group matching a prefix, bounded by a page
    /// cap so a busy group cannot hang the caller.
    async fn describe_log_streams(
        &self,
        group: &str,
        prefix: &str,
        max_pages: usize,
    ) -> Result<Vec<String>>;
}

pub struct AwsLogsClient {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl AwsLogsClient {
    pub fn new(client: aws_sdk_cloudwatchlogs::Client) -> Self {
        Self { client }
    }
}

fn transport<E: std::fmt::Debug + std::error::Error + Send + Sync + 'static>(
    err: aws_sdk_cloudwatchlogs::error::SdkError<E>,
) -> EcsError {
    EcsError::Transport(DisplayErrorContext(err).to_string())
}

#[async_trait::async_trait]
impl LogsClient for AwsLogsClient {
    async fn get_log_events(
        &self,
        group: &str,
        stream: &str,
        start_time_ms: Option<i64>,
        max_pages: Option<usize>,
    ) -> Result<Vec<LogEvent>> {
        let mut events = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let mut request = self
                .client
                .get_log_events()
                .log_group_name(group)
                .log_stream_name(stream)
                .start_from_head(true)
                .set_start_time(start_time_ms);
            if let Some(t) = &token {
                request = request.next_token(t);
            }
            let output = request.send().await.map_err(transport)?;

            for event in output.events() {
                events.push(LogEvent {
                    timestamp_ms: event.timestamp().unwrap_or_default(),
                    message: event.message().unwrap_or_default().to_string(),
                });
            }

            pages += 1;
            if let Some(max) = max_pages {
                if pages >= max {
                    break;
                }
            }
            // the forward token repeats once the stream is exhausted
            match output.next_forward_token() {
                Some(next) if Some(next) != token.as_deref() => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(events)
    }

    async fn describe_log_streams(
        &self,
        group: &str,
        prefix: &str,
        max_pages: usize,
    ) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let mut request = self
                .client
                .describe_log_streams()
                .log_group_name(group)
                .log_stream_name_prefix(prefix);
            if let Some(t) = &token {
                request = request.next_token(t);
            }
            let output = request.send().await.map_err(transport)?;

            for stream in output.log_streams() {
                if let Some(name) = stream.log_stream_name() {
                    names.push(name.to_string());
                }
            }

            pages += 1;
            if pages >= max_pages {
                break;
            }
            match output.next_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        Ok(names)
    }
}

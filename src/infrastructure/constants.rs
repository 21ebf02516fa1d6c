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

/// Region fallback when no profile or environment region is configured
pub const DEFAULT_REGION: &str = "us-west-2";

/// Log driver required by the log aggregation commands
pub const AWSLOGS_DRIVER: &str = "awslogs";

/// awslogs driver option keys
pub const OPT_LOG_GROUP: &str = "awslogs-group";
pub const OPT_STREAM_PREFIX: &str = "awslogs-stream-prefix";

/// Most-recent task cap applied per desired status when enumerating
/// a family's tasks for log aggregation
pub const MAX_TASKS_PER_STATUS: usize = 100;

/// Safety valve on the stream-discovery log path: stop paginating after
/// this many pages of streams / events per stream rather than hanging on
/// a busy log group
pub const MAX_STREAM_PAGES: usize = 3;
pub const MAX_EVENT_PAGES: usize = 3;

/// Window of events fetched by the stream-discovery log path
pub const TASK_LOG_LOOKBACK_MINUTES: i64 = 10;

/// One-off task polling
pub const TASK_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 900;

/// Service status polling interval for `status --poll`
pub const STATUS_POLL_INTERVAL_SECS: u64 = 15;

/// Timestamp rendering for log lines. Fixed-width and zero-padded so the
/// lexicographic sort of rendered lines is also chronological.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Terminal task status
pub const TASK_STATUS_STOPPED: &str = "STOPPED";

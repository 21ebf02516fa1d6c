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

//! AWS SDK client construction.

pub mod ecs;
pub mod logs;

use std::sync::Arc;

use aws_config::meta::region::RegionProviderChain;

use crate::infrastructure::constants::DEFAULT_REGION;

pub use ecs::{AwsEcsClient, EcsClient};
pub use logs::{AwsLogsClient, LogsClient};

/// The process-wide client bundle: both SDK clients built once from a
/// single shared configuration and handed to components by reference.
pub struct AwsClients {
    pub ecs: Arc<dyn EcsClient>,
    pub logs: Arc<dyn LogsClient>,
}

impl AwsClients {
    /// Builds clients from the default provider chain (environment,
    /// profile, instance metadata), falling back to [`DEFAULT_REGION`]
    /// when no region is configured anywhere.
    pub async fn from_env() -> Self {
        let region = RegionProviderChain::default_provider().or_else(DEFAULT_REGION);
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        Self {
            ecs: Arc::new(AwsEcsClient::new(aws_sdk_ecs::Client::new(&config))),
            logs: Arc::new(AwsLogsClient::new(aws_sdk_cloudwatchlogs::Client::new(
                &config,
            ))),
        }
    }
}

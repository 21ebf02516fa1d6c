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

//! Process-wide cluster name lookup, populated at most once.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::infrastructure::aws::EcsClient;
use crate::shared::arn;
use crate::shared::error::Result;

/// Maps plain cluster names to their ARNs. Population is single-flight:
/// the mutex is held across the fetch so concurrent first lookups wait on
/// one network call instead of issuing duplicates.
pub struct ClusterCache {
    inner: Mutex<Option<HashMap<String, String>>>,
}

impl ClusterCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// The full name-to-ARN map, fetching it on first use.
    pub async fn cluster_map(
        &self,
        client: &Arc<dyn EcsClient>,
    ) -> Result<HashMap<String, String>> {
        let mut guard = self.inner.lock().await;
        if guard.is_none() {
            let arns = client.list_clusters().await?;
            let map = arns
                .into_iter()
                .map(|a| (arn::resource_id(&a).to_string(), a))
                .collect();
            *guard = Some(map);
        }
        Ok(guard.as_ref().cloned().unwrap_or_default())
    }

    /// Plain cluster names, unsorted.
    pub async fn cluster_names(&self, client: &Arc<dyn EcsClient>) -> Result<Vec<String>> {
        Ok(self.cluster_map(client).await?.into_keys().collect())
    }

    /// Drops the cached map so the next lookup refetches.
    pub async fn invalidate(&self) {
        *self.inner.lock().await = None;
    }
}

impl Default for ClusterCache {
    fn default() -> Self {
        Self::new()
    }
}

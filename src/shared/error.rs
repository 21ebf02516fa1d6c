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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, EcsError>;

#[derive(Error, Debug)]
pub enum EcsError {
    #[error("Resource not found: {resource_type} '{name}' in cluster '{cluster}'")]
    NotFound {
        resource_type: String,
        name: String,
        cluster: String,
    },

    #[error("Found {count} services matching name '{service}' in cluster '{cluster}', unable to continue")]
    AmbiguousService {
        cluster: String,
        service: String,
        count: usize,
    },

    #[error("No container marked essential in task family '{family}'")]
    EssentialContainerNotFound { family: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid command syntax: {0}")]
    InvalidCommandSyntax(String),

    #[error("Log driver '{found}' is not supported, the awslogs driver is required")]
    UnsupportedLogDriver { found: String },

    #[error("Failed to register task definition: {0}")]
    RegistrationFailed(String),

    #[error("Task placement failed: {}", reasons.join("; "))]
    RunFailed { reasons: Vec<String> },

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("ECS API error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EcsError {
    pub fn not_found(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
            cluster: cluster.into(),
        }
    }

    pub fn invalid_argument(context: impl Into<String>) -> Self {
        Self::InvalidArgument(context.into())
    }

    pub fn transport(context: impl Into<String>) -> Self {
        Self::Transport(context.into())
    }
}

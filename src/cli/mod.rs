//! CLI entry points and command context

pub mod commands;
pub mod display;
pub mod ecs;

pub use commands::CliArgs;

use std::sync::Arc;

use crate::domain::logs::aggregator::LogAggregator;
use crate::domain::service::descriptor::ServiceDescriptor;
use crate::infrastructure::aws::AwsClients;

/// Everything a command needs, built once at process start and passed by
/// reference into every `execute`.
pub struct CommandContext {
    pub descriptor: ServiceDescriptor,
    pub aggregator: LogAggregator,
}

impl CommandContext {
    pub fn new(clients: AwsClients) -> Self {
        let AwsClients { ecs, logs } = clients;
        Self {
            descriptor: ServiceDescriptor::new(Arc::clone(&ecs)),
            aggregator: LogAggregator::new(ecs, logs),
        }
    }
}

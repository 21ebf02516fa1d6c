// CLI command definitions

use super::ecs::{
    CopyTaskRevisionCommand, CreateTaskRevisionCommand, DeployCommand, DeployNewestTaskCommand,
    DescribeCommand, EnvCommand, EventsCommand, ListClustersCommand, ListServicesCommand,
    LogsCommand, PortsCommand, RefreshCommand, RunTaskCommand, ScaleCommand, SetMemoryCommand,
    StatusCommand,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ecsctl",
    version,
    about = "Operator tool for Amazon ECS services",
    long_about = "A standalone CLI tool for operating containerized services on ECS clusters: \
deploying images, editing task definitions, scaling, tailing logs and running one-off tasks"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Deploy a new image to a cluster service (registers a revision when needed)
    Deploy(DeployCommand),

    /// Fast-forward a service to the newest task definition in its family
    DeployNewestTask(DeployNewestTaskCommand),

    /// Duplicate a task definition into a new revision with a different image
    CreateTaskRevision(CreateTaskRevisionCommand),

    /// Copy a task definition into a new family, optionally with a new image or command
    CopyTaskRevision(CopyTaskRevisionCommand),

    /// Manage environment variables of service task definitions
    Env(EnvCommand),

    /// Set memory properties on the essential container of a service
    SetMemory(SetMemoryCommand),

    /// Run an individual task in a cluster with a command override
    RunTask(RunTaskCommand),

    /// Show recent logs for a service (requires the awslogs driver)
    Logs(LogsCommand),

    /// Force a new deployment of the same revision (fresh containers)
    Refresh(RefreshCommand),

    /// Set the number of desired instances of a service
    Scale(ScaleCommand),

    /// View current service deployment status
    Status(StatusCommand),

    /// Show recent events for a service
    Events(EventsCommand),

    /// Show the current task configuration for a service
    Describe(DescribeCommand),

    /// List clusters
    ListClusters(ListClustersCommand),

    /// List services in a cluster
    ListServices(ListServicesCommand),

    /// List exposed host ports per service in a cluster
    Ports(PortsCommand),
}

//! ECS operator commands

use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use tracing::warn;

use crate::cli::display::TableRenderer;
use crate::cli::CommandContext;
use crate::domain::definition::{environment, EnvVar};
use crate::domain::logs::StatusFilter;
use crate::domain::service::descriptor::TaskDefinitionSource;
use crate::infrastructure::constants::{
    DEFAULT_REGION, DEFAULT_WAIT_TIMEOUT_SECS, STATUS_POLL_INTERVAL_SECS,
};
use crate::shared::arn;

#[derive(Parser, Debug)]
pub struct DeployCommand {
    /// Cluster name
    pub cluster: String,

    /// Service name
    pub service: String,

    /// Image to deploy to the service's essential container
    pub image: String,
}

impl DeployCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let outcome = ctx
            .descriptor
            .deploy_image(&self.cluster, &self.service, &self.image)
            .await?;

        let definition_arn = outcome.definition.arn.as_deref().unwrap_or("-");
        if outcome.registered {
            println!("created task definition with image {}", self.image);
        } else {
            println!(
                "image already registered, reusing {}",
                arn::revision_name(definition_arn)
            );
        }
        println!(
            "updated service {} with task definition {} (deploying to {} containers)",
            outcome.service.name,
            arn::revision_name(definition_arn),
            outcome.service.desired_count
        );
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct DeployNewestTaskCommand {
    pub cluster: String,
    pub service: String,
}

impl DeployNewestTaskCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        match ctx
            .descriptor
            .deploy_newest(&self.cluster, &self.service)
            .await?
        {
            Some((def, service)) => {
                println!(
                    "updated service {} with task definition {}",
                    service.name,
                    arn::revision_name(def.arn.as_deref().unwrap_or("-"))
                );
            }
            None => {
                println!("service already running the newest revision");
            }
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct CreateTaskRevisionCommand {
    pub cluster: String,
    pub service: String,

    /// Image to update into the active container definition
    #[arg(long, short = 'i')]
    pub image: String,

    /// Locator for the starting task definition ("newest" uses the newest
    /// in the service's family, "current" the currently deployed)
    #[arg(long, short = 's', default_value = "newest")]
    pub task_definition_source: String,
}

impl CreateTaskRevisionCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let source = TaskDefinitionSource::parse_lenient(&self.task_definition_source);
        let def = ctx
            .descriptor
            .create_revision(&self.cluster, &self.service, source, &self.image)
            .await?;
        println!("{}", def.arn.as_deref().unwrap_or("-"));
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct CopyTaskRevisionCommand {
    pub cluster: String,
    pub service: String,

    /// Name of the new task definition family
    #[arg(long, short = 'f')]
    pub family_name: String,

    /// Image to update into the copied container definition
    #[arg(long, short = 'i')]
    pub image: Option<String>,

    /// Name for the copied essential container
    #[arg(long)]
    pub container_name: Option<String>,

    /// Command for the new family
    #[arg(long, short = 'c')]
    pub command_override: Option<String>,

    #[arg(long, short = 's', default_value = "newest")]
    pub task_definition_source: String,
}

impl CopyTaskRevisionCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let source = TaskDefinitionSource::parse_lenient(&self.task_definition_source);
        let def = ctx
            .descriptor
            .copy_revision(
                &self.cluster,
                &self.service,
                source,
                &self.family_name,
                self.image.as_deref(),
                self.container_name.as_deref(),
                self.command_override.as_deref(),
            )
            .await?;
        println!(
            "configured new task definition: {}",
            def.arn.as_deref().unwrap_or("-")
        );
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct EnvCommand {
    #[command(subcommand)]
    pub command: EnvSubcommand,
}

#[derive(clap::Subcommand, Debug)]
pub enum EnvSubcommand {
    /// List environment variables of the deployed essential container
    Get {
        cluster: String,
        service: String,
    },

    /// Set one or more NAME=VALUE pairs, register and deploy a new revision
    Set {
        cluster: String,
        service: String,
        /// Pairs in NAME=VALUE form
        #[arg(required = true)]
        vars: Vec<String>,
    },

    /// Edit the environment block in $EDITOR, register and deploy
    Edit {
        cluster: String,
        service: String,
    },

    /// Search all clusters and services for an environment variable by name
    Find {
        query: String,
    },
}

impl EnvCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        match &self.command {
            EnvSubcommand::Get { cluster, service } => {
                let env = ctx.descriptor.environment(cluster, service).await?;
                print!("{}", environment::render_pairs(&env));
                Ok(())
            }
            EnvSubcommand::Set {
                cluster,
                service,
                vars,
            } => {
                let pairs = vars
                    .iter()
                    .map(|v| {
                        v.split_once('=')
                            .map(|(name, value)| EnvVar::new(name, value))
                            .ok_or_else(|| {
                                anyhow::anyhow!("expected NAME=VALUE, got '{}'", v)
                            })
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;

                let (def, service) = ctx
                    .descriptor
                    .set_environment_vars(cluster, service, &pairs)
                    .await?;
                print_deployed_revision(&def.arn, &service.name, service.desired_count);
                Ok(())
            }
            EnvSubcommand::Edit { cluster, service } => {
                let env = ctx.descriptor.environment(cluster, service).await?;
                let edited = edit_string_block(&environment::render_pairs(&env))?;
                let parsed = environment::parse_pairs(&edited)?;
                if parsed == env {
                    println!("no changes, leaving service untouched");
                    return Ok(());
                }
                let (def, service) = ctx
                    .descriptor
                    .replace_environment(cluster, service, parsed)
                    .await?;
                print_deployed_revision(&def.arn, &service.name, service.desired_count);
                Ok(())
            }
            EnvSubcommand::Find { query } => {
                let matches = ctx.descriptor.find_environment(query).await?;
                if matches.is_empty() {
                    println!("no environment variables matching '{}'", query);
                    return Ok(());
                }
                for m in matches {
                    println!(
                        "{}/{} {}={}",
                        m.cluster, m.service, m.variable.name, m.variable.value
                    );
                }
                Ok(())
            }
        }
    }
}

fn print_deployed_revision(definition_arn: &Option<String>, service: &str, desired: i32) {
    println!(
        "deployed task definition {} to service {} ({} containers)",
        arn::revision_name(definition_arn.as_deref().unwrap_or("-")),
        service,
        desired
    );
}

#[derive(Parser, Debug)]
pub struct SetMemoryCommand {
    pub cluster: String,
    pub service: String,

    /// Hard memory limit in megabytes for the essential container
    #[arg(long, short = 'm')]
    pub memory: Option<i32>,

    /// Soft memory reservation in megabytes
    #[arg(long, short = 'r')]
    pub memory_reservation: Option<i32>,
}

impl SetMemoryCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        if self.memory.is_none() && self.memory_reservation.is_none() {
            anyhow::bail!("specify --memory and/or --memory-reservation");
        }
        let (def, service) = ctx
            .descriptor
            .set_memory(
                &self.cluster,
                &self.service,
                self.memory,
                self.memory_reservation,
            )
            .await?;
        println!(
            "configured new task definition: {}",
            arn::revision_name(def.arn.as_deref().unwrap_or("-"))
        );
        println!("deployed new memory to {} {}", self.cluster, service.name);
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct RunTaskCommand {
    pub cluster: String,
    pub service: String,

    /// Command override, quoted as a single argument,
    /// e.g. 'bin/snapshot --config assets/prod.json'
    pub command: String,

    #[arg(long, short = 's', default_value = "newest")]
    pub task_definition_source: String,

    /// Wait for completion of the task and exit with its exit code
    #[arg(long, short = 'w')]
    pub wait: bool,

    /// Maximum seconds to wait with --wait; 0 waits forever
    #[arg(long, default_value_t = DEFAULT_WAIT_TIMEOUT_SECS)]
    pub wait_timeout: u64,
}

impl RunTaskCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let source = TaskDefinitionSource::parse_lenient(&self.task_definition_source);
        let def = ctx
            .descriptor
            .locate_task_definition(&self.cluster, &self.service, source)
            .await?;
        let started = ctx
            .descriptor
            .run_once(&self.cluster, &def, &self.command)
            .await?;
        println!(
            "=> Created task {} ({})",
            started.task_id,
            console_task_url(&self.cluster, &started.task_id)
        );

        if !self.wait {
            return Ok(());
        }

        println!("==> Waiting for task to complete...");
        let max_wait = match self.wait_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let exit_code = ctx
            .descriptor
            .wait_for_task(&self.cluster, &started.task_arn, max_wait)
            .await?;

        println!("==> Retrieving container log output");
        if let Err(e) = ctx
            .aggregator
            .print_task_logs(&def, Some(&started.task_id))
            .await
        {
            warn!(error = %e, "unable to read logs");
        }
        println!("==> End container log output");

        if exit_code > 0 {
            eprintln!(
                "{}",
                format!("==> Received error code from container: {}", exit_code).red()
            );
        } else {
            println!("=> Task completed successfully");
        }
        std::process::exit(exit_code)
    }
}

#[derive(Parser, Debug)]
pub struct LogsCommand {
    pub cluster: String,
    pub service: String,

    /// Limit to only tasks of [status] (stopped|running|all)
    #[arg(long, short = 's', default_value = "all")]
    pub status: String,
}

impl LogsCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let filter: StatusFilter = self.status.parse()?;
        ctx.aggregator
            .tail(&self.cluster, &self.service, filter)
            .await?;
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct RefreshCommand {
    pub cluster: String,
    pub service: String,
}

impl RefreshCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        println!(
            "forcing new deployment for {}/{}",
            self.cluster, self.service
        );
        ctx.descriptor
            .force_redeploy(&self.cluster, &self.service)
            .await?;
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct ScaleCommand {
    pub cluster: String,
    pub service: String,

    /// Desired number of task instances
    pub desired_count: i32,
}

impl ScaleCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let service = ctx
            .descriptor
            .find_service(&self.cluster, &self.service)
            .await?;
        if service.desired_count == self.desired_count {
            println!("Service already set to scale ({})", self.desired_count);
            return Ok(());
        }
        let updated = ctx
            .descriptor
            .scale(&self.cluster, &self.service, self.desired_count)
            .await?;
        println!("Successfully scaled service");
        let renderer = TableRenderer::new();
        print!("{}", renderer.render_service_status(&self.cluster, &updated));
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct StatusCommand {
    pub cluster: String,
    pub service: String,

    /// Re-render every 15 seconds until the deployment count changes
    #[arg(long, short = 'p')]
    pub poll: bool,
}

impl StatusCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let renderer = TableRenderer::new();
        let service = ctx
            .descriptor
            .find_service(&self.cluster, &self.service)
            .await?;
        print!("{}", renderer.render_service_status(&self.cluster, &service));

        if !self.poll {
            return Ok(());
        }
        let mut previous = service.deployments.len();
        loop {
            tokio::time::sleep(Duration::from_secs(STATUS_POLL_INTERVAL_SECS)).await;
            let service = ctx
                .descriptor
                .find_service(&self.cluster, &self.service)
                .await?;
            print!("{}", renderer.render_service_status(&self.cluster, &service));
            if service.deployments.len() != previous {
                break;
            }
            previous = service.deployments.len();
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct EventsCommand {
    pub cluster: String,
    pub service: String,
}

impl EventsCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let service = ctx
            .descriptor
            .find_service(&self.cluster, &self.service)
            .await?;
        // platform returns newest first; print oldest first
        for event in service.events.iter().rev() {
            let ts = event
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("[{}] {}", ts, event.message);
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct DescribeCommand {
    pub cluster: String,
    pub service: String,
}

impl DescribeCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let def = ctx
            .descriptor
            .current_task_definition(&self.cluster, &self.service)
            .await?;
        println!("{}", serde_json::to_string_pretty(&def)?);
        println!();
        println!("AWS console: {}", console_service_url(&self.cluster, &self.service));
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct ListClustersCommand {}

impl ListClustersCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        for name in ctx.descriptor.cluster_names().await? {
            println!("{}", name);
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct ListServicesCommand {
    pub cluster: String,
}

impl ListServicesCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        for name in ctx.descriptor.service_names(&self.cluster).await? {
            println!("{}", name);
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct PortsCommand {
    pub cluster: String,
}

impl PortsCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        for service in ctx.descriptor.service_names(&self.cluster).await? {
            let def = match ctx
                .descriptor
                .current_task_definition(&self.cluster, &service)
                .await
            {
                Ok(def) => def,
                Err(_) => continue,
            };
            let ports: Vec<i32> = def
                .container_definitions
                .iter()
                .flat_map(|c| c.port_mappings.iter().filter_map(|p| p.host_port))
                .collect();
            println!("{} {:?}", service, ports);
        }
        Ok(())
    }
}

fn console_region() -> String {
    std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string())
}

fn console_service_url(cluster: &str, service: &str) -> String {
    let region = console_region();
    format!(
        "https://{}.console.aws.amazon.com/ecs/home?region={}#/clusters/{}/services/{}",
        region, region, cluster, service
    )
}

fn console_task_url(cluster: &str, task_id: &str) -> String {
    let region = console_region();
    format!(
        "https://{}.console.aws.amazon.com/ecs/home?region={}#/clusters/{}/tasks/{}/details",
        region, region, cluster, task_id
    )
}

/// Delegates editing of a string block to the operator's editor of choice,
/// similar to git commit.
fn edit_string_block(input: &str) -> anyhow::Result<String> {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("ecsctl-env-")
        .suffix(".env")
        .tempfile()?;
    file.write_all(input.as_bytes())?;
    file.flush()?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = std::process::Command::new(&editor)
        .arg(file.path())
        .status()?;
    if !status.success() {
        anyhow::bail!("editor {} exited with {}", editor, status);
    }

    Ok(std::fs::read_to_string(file.path())?)
}

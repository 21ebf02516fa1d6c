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

use clap::Parser;
use ecsctl::cli::{commands::Commands, CliArgs, CommandContext};
use ecsctl::infrastructure::aws::AwsClients;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();
    let ctx = CommandContext::new(AwsClients::from_env().await);

    match args.command {
        Commands::Deploy(cmd) => cmd.execute(&ctx).await,
        Commands::DeployNewestTask(cmd) => cmd.execute(&ctx).await,
        Commands::CreateTaskRevision(cmd) => cmd.execute(&ctx).await,
        Commands::CopyTaskRevision(cmd) => cmd.execute(&ctx).await,
        Commands::Env(cmd) => cmd.execute(&ctx).await,
        Commands::SetMemory(cmd) => cmd.execute(&ctx).await,
        Commands::RunTask(cmd) => cmd.execute(&ctx).await,
        Commands::Logs(cmd) => cmd.execute(&ctx).await,
        Commands::Refresh(cmd) => cmd.execute(&ctx).await,
        Commands::Scale(cmd) => cmd.execute(&ctx).await,
        Commands::Status(cmd) => cmd.execute(&ctx).await,
        Commands::Events(cmd) => cmd.execute(&ctx).await,
        Commands::Describe(cmd) => cmd.execute(&ctx).await,
        Commands::ListClusters(cmd) => cmd.execute(&ctx).await,
        Commands::ListServices(cmd) => cmd.execute(&ctx).await,
        Commands::Ports(cmd) => cmd.execute(&ctx).await,
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use tracing::info;

use kfctl::config::Config;
use kfctl::kfapp::{Command, KfApp, ResourceEnum};
use kfctl::kubernetes::create_client;
use kfctl::types::load_kfdef;

const USAGE: &str = "usage: kfctl <init|generate|apply|delete> [all|k8s|platform]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let command: Command = args.next().context(USAGE)?.parse().context(USAGE)?;
    let resources: ResourceEnum = match args.next() {
        Some(arg) => arg.parse().context(USAGE)?,
        None => ResourceEnum::All,
    };

    // Load configuration
    let config = Config::from_env()?;
    let kfdef = load_kfdef(&config.config_file)
        .with_context(|| format!("Failed to load {}", config.config_file.display()))?;
    let app = KfApp::new(kfdef, &config)?;
    info!(
        "Running {} for {} on platform {:?}",
        command,
        app.kfdef().name(),
        app.platform()
    );

    if command.needs_cluster() {
        let client = create_client(config.kube_context.as_deref()).await?;
        info!("Connected to Kubernetes cluster");

        match command {
            Command::Apply => app.apply(&client, resources).await?,
            _ => app.delete(&client, resources).await?,
        }
    } else {
        match command {
            Command::Init => app.init(resources).await?,
            _ => app.generate(resources).await?,
        }
    }

    info!("{} finished", command);
    Ok(())
}

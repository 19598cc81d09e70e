// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use k8ssandra_client::cleaner::ReleaseCleaner;
use k8ssandra_client::config::Config;
use k8ssandra_client::kubernetes::{load_kube_config, KubeResourceClient, ResourceRegistry};
use k8ssandra_client::upgrade::artifact::HelmRepositoryProvider;
use k8ssandra_client::upgrade::DefinitionUpgrader;

#[derive(Parser)]
#[command(name = "kubectl-k8ssandra")]
#[command(version)]
#[command(about = "Helm lifecycle helpers for k8ssandra releases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Namespace to operate in (defaults to the kubeconfig context's namespace)
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove the CassandraDatacenters (and their backups) of a Helm release so it can be uninstalled
    Remove {
        /// Helm release name
        release_name: String,

        /// Search every namespace instead of a single one
        #[arg(short = 'A', long)]
        all_namespaces: bool,
    },

    /// Install or update the CRDs shipped with a chart release
    Upgrade {
        /// Chart version to take the CRDs from
        #[arg(long)]
        target_version: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let kube_config = load_kube_config(cli.context).await?;
    info!("Using Kubernetes API at {}", kube_config.cluster_url);

    match cli.command {
        Commands::Remove {
            release_name,
            all_namespaces,
        } => {
            let namespace = if all_namespaces {
                None
            } else {
                Some(
                    cli.namespace
                        .unwrap_or_else(|| kube_config.default_namespace.clone()),
                )
            };
            let client = KubeResourceClient::from_config(
                kube_config,
                namespace.clone(),
                ResourceRegistry::k8ssandra(),
            )?;

            let report = ReleaseCleaner::new(Arc::new(client), namespace)
                .remove_resources(&release_name)
                .await?;

            for name in &report.datacenters {
                println!("cassandradatacenter/{} deleted", name);
            }
            for name in &report.backups {
                println!("cassandrabackup/{} deleted", name);
            }
        }
        Commands::Upgrade { target_version } => {
            let config = Config::from_env()?;
            let client = KubeResourceClient::from_config(
                kube_config,
                cli.namespace,
                ResourceRegistry::k8ssandra(),
            )?;
            let upgrader = DefinitionUpgrader::new(
                Arc::new(client),
                HelmRepositoryProvider::from_config(&config),
            );

            let report = upgrader.upgrade(&target_version).await?;

            for name in &report.created {
                println!("customresourcedefinition/{} created", name);
            }
            for name in &report.updated {
                println!("customresourcedefinition/{} replaced", name);
            }
        }
    }

    Ok(())
}

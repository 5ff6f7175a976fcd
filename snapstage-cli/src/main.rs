//! # Snapstage CLI
//!
//! Command-line interface for the snapstage lifecycle orchestrator.
//! Subcommands map one-to-one onto the lifecycle workflows: `new`, `clone`,
//! `modify`, `promote`, and `retire`.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use snapstage::prelude::*;
use snapstage::provider::http::HttpProvider;
use snapstage::tags::validate_managed_name;

#[derive(Parser)]
#[command(name = "snapstage")]
#[command(about = "Tag-driven lifecycle orchestration for snapshot-restored database clusters", long_about = None)]
struct Cli {
    /// Base URL of the provider gateway
    #[arg(long, env = "SNAPSTAGE_ENDPOINT", default_value = "http://localhost:8080", global = true)]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Clone)]
struct CommonOpts {
    /// Cloud account number
    #[arg(short = 'a', long)]
    account_number: String,

    /// Cloud region
    #[arg(short = 'r', long)]
    region: String,

    /// Logical name grouping the resource family
    #[arg(short = 'n', long)]
    managed_name: String,

    /// Ask for confirmation before any mutating call
    #[arg(short = 'i', long, default_value_t = true, action = ArgAction::Set)]
    interactive: bool,
}

/// Options shared by the two creation subcommands.
#[derive(Args, Clone)]
struct CreationOpts {
    /// Source cluster (snapshot origin or clone source)
    #[arg(short = 'c', long)]
    cluster_name: String,

    /// Subnet group for the new cluster
    #[arg(short = 's', long)]
    db_subnet_group_name: String,

    /// Database engine
    #[arg(short = 'e', long, default_value = "aurora-postgresql")]
    engine: String,

    /// Instance class for the new instance
    #[arg(short = 'd', long)]
    db_instance_class: String,

    /// Availability zone to pin the instance to
    #[arg(short = 'z', long)]
    availability_zone: Option<String>,

    /// Parameter group for the new instance
    #[arg(long)]
    db_parameter_group_name: Option<String>,

    /// Security group to attach (repeatable)
    #[arg(short = 'v', long = "vpc-security-group-id")]
    vpc_security_group_ids: Vec<String>,

    /// Extra key=value tag to attach at creation (repeatable)
    #[arg(short = 't', long = "tag")]
    tags: Vec<String>,

    /// Skip creation if a family member is younger than this many hours
    #[arg(short = 'H', long, default_value_t = 20)]
    minimum_age_hours: i64,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore a new cluster from the latest snapshot of a source cluster
    New {
        #[command(flatten)]
        common: CommonOpts,
        #[command(flatten)]
        creation: CreationOpts,
    },

    /// Create a copy-on-write clone of a source cluster
    Clone {
        #[command(flatten)]
        common: CommonOpts,
        #[command(flatten)]
        creation: CreationOpts,
    },

    /// Apply post-restore modifications to the family's `new` cluster
    Modify {
        #[command(flatten)]
        common: CommonOpts,

        /// IAM role ARN to attach to the cluster (repeatable)
        #[arg(long = "iam-role-arn")]
        iam_role_arns: Vec<String>,
    },

    /// Point DNS at the candidate resource and retire the previous one
    Promote {
        #[command(flatten)]
        common: CommonOpts,

        /// Hosted zone containing the record set
        #[arg(short = 'z', long)]
        hosted_zone_id: String,

        /// Record set name to repoint
        #[arg(long)]
        record_set: String,

        /// TTL for the updated record, in seconds
        #[arg(long, default_value_t = 60)]
        ttl: u32,
    },

    /// Delete the family's retired cluster
    Retire {
        #[command(flatten)]
        common: CommonOpts,
    },
}

/// Stdin-backed confirmation prompt.
struct StdinApproval;

#[async_trait]
impl Approval for StdinApproval {
    async fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N]: ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn context(endpoint: &str, common: &CommonOpts) -> Result<WorkflowContext> {
    if !validate_managed_name(&common.managed_name) {
        bail!(
            "invalid managed name {:?}: use lowercase alphanumerics and hyphens",
            common.managed_name
        );
    }
    let provider = Arc::new(HttpProvider::new(
        endpoint,
        &common.account_number,
        &common.region,
    ));
    Ok(WorkflowContext::new(
        provider.clone(),
        provider,
        Arc::new(StdinApproval),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::New { common, creation } => {
            let user_tags = parse_user_tags(&creation.tags).context("invalid --tag")?;
            let ctx = context(&cli.endpoint, common)?;
            run_new(
                &ctx,
                &NewClusterRequest {
                    managed_name: common.managed_name.clone(),
                    source_cluster_id: creation.cluster_name.clone(),
                    subnet_group: creation.db_subnet_group_name.clone(),
                    engine: creation.engine.clone(),
                    instance_class: creation.db_instance_class.clone(),
                    availability_zone: creation.availability_zone.clone(),
                    parameter_group: creation.db_parameter_group_name.clone(),
                    security_group_ids: creation.vpc_security_group_ids.clone(),
                    user_tags,
                    min_age_hours: creation.minimum_age_hours,
                    interactive: common.interactive,
                },
            )
            .await?
        }
        Commands::Clone { common, creation } => {
            let user_tags = parse_user_tags(&creation.tags).context("invalid --tag")?;
            let ctx = context(&cli.endpoint, common)?;
            run_clone(
                &ctx,
                &CloneClusterRequest {
                    managed_name: common.managed_name.clone(),
                    source_cluster_id: creation.cluster_name.clone(),
                    subnet_group: creation.db_subnet_group_name.clone(),
                    engine: creation.engine.clone(),
                    instance_class: creation.db_instance_class.clone(),
                    availability_zone: creation.availability_zone.clone(),
                    parameter_group: creation.db_parameter_group_name.clone(),
                    security_group_ids: creation.vpc_security_group_ids.clone(),
                    user_tags,
                    min_age_hours: creation.minimum_age_hours,
                    interactive: common.interactive,
                },
            )
            .await?
        }
        Commands::Modify {
            common,
            iam_role_arns,
        } => {
            let ctx = context(&cli.endpoint, common)?;
            run_modify(
                &ctx,
                &ModifyRequest {
                    managed_name: common.managed_name.clone(),
                    iam_role_arns: iam_role_arns.clone(),
                    interactive: common.interactive,
                },
            )
            .await?
        }
        Commands::Promote {
            common,
            hosted_zone_id,
            record_set,
            ttl,
        } => {
            let ctx = context(&cli.endpoint, common)?;
            run_promote(
                &ctx,
                &PromoteRequest {
                    managed_name: common.managed_name.clone(),
                    hosted_zone_id: hosted_zone_id.clone(),
                    record_set_name: record_set.clone(),
                    ttl: *ttl,
                    interactive: common.interactive,
                },
            )
            .await?
        }
        Commands::Retire { common } => {
            let ctx = context(&cli.endpoint, common)?;
            run_retire(
                &ctx,
                &RetireRequest {
                    managed_name: common.managed_name.clone(),
                    interactive: common.interactive,
                },
            )
            .await?
        }
    };

    println!("{outcome}");
    if !outcome.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_full_new_invocation() {
        let cli = Cli::parse_from([
            "snapstage",
            "new",
            "-a",
            "123456789012",
            "-r",
            "us-east-1",
            "-n",
            "reporting",
            "-c",
            "prod-cluster",
            "-s",
            "private-subnets",
            "-d",
            "db.r5.large",
            "--tag",
            "env=prod",
            "--interactive",
            "false",
        ]);
        match cli.command {
            Commands::New { common, creation } => {
                assert_eq!(common.managed_name, "reporting");
                assert!(!common.interactive);
                assert_eq!(creation.minimum_age_hours, 20);
                assert_eq!(creation.tags, vec!["env=prod".to_string()]);
            }
            _ => panic!("expected the new subcommand"),
        }
    }
}

//! AbuseIPDB CLI.

use abuseipdb_reputation::{AbuseCategory, Config, ReputationClient};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "abuseipdb")]
#[command(about = "Check and report IP addresses with AbuseIPDB")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "abuseipdb.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check an IP and print its score and spam verdict
    Check { ip: String },
    /// Report an abusive IP
    Report {
        ip: String,

        /// Category codes or names, comma separated (e.g. "18,ssh")
        #[arg(long, value_delimiter = ',', required = true)]
        categories: Vec<AbuseCategory>,

        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --print-config
    if args.print_config {
        println!("{}", Config::example());
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(config = %args.config.display(), "Loading configuration");
    let config = Config::load(&args.config)?;

    if args.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    let Some(command) = args.command else {
        anyhow::bail!("no command given, see --help");
    };

    let client = ReputationClient::with_defaults(config.abuseipdb, &config.cache)?;

    match command {
        Command::Check { ip } => {
            let (spam, result) = client.classify(Some(&ip)).await?;
            println!(
                "{} score={} reports={} spam={}",
                result.ip_address, result.abuse_confidence_score, result.total_reports, spam
            );
        }
        Command::Report {
            ip,
            categories,
            comment,
        } => {
            let codes: Vec<u8> = categories.iter().map(|c| c.code()).collect();
            let score = client.report_ip(&codes, Some(&ip), &comment).await?;
            println!("{ip} score={score}");
        }
    }

    Ok(())
}

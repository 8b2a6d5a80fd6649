//! housing-watch CLI
//!
//! Entry point for scheduled runs and manual checks.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use housing_watch::{
    error::Result,
    models::Config,
    notify::{MailCredentials, SmtpNotifier},
    pipeline::{self, Flow, ListingCheck, RunOutcome},
    services::HousingPortal,
    storage::{LocalStorage, SnapshotStore},
};

/// housing-watch - Student Housing Aarhus change notifier
#[derive(Parser, Debug)]
#[command(
    name = "housing-watch",
    version,
    about = "Emails a summary when the Student Housing Aarhus listings change"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Where the snapshot is kept
    #[arg(long, value_enum, default_value_t = Backend::Local, global = true)]
    backend: Backend,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// File under the local artifacts directory
    Local,
    /// Object in the artifacts bucket
    #[cfg(feature = "s3")]
    S3,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the jobs selected by the FLOWS environment variable
    Run,

    /// Check the housing portal now
    Check,

    /// Validate configuration and mail credentials
    Validate,

    /// Show the stored snapshot
    Info,

    /// Set up the artifacts bucket
    #[cfg(feature = "s3")]
    Provision {
        #[command(subcommand)]
        step: ProvisionStep,
    },
}

#[cfg(feature = "s3")]
#[derive(Subcommand, Debug)]
enum ProvisionStep {
    /// Create the private, encrypted, TLS-only bucket
    CreateBucket,
    /// Create artifact folders and the temporary-artifact expiry rule
    PrepareFolders,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

async fn open_store(config: &Config, backend: Backend) -> Box<dyn SnapshotStore> {
    match backend {
        Backend::Local => Box::new(LocalStorage::from_config(&config.storage)),
        #[cfg(feature = "s3")]
        Backend::S3 => Box::new(
            housing_watch::storage::S3Storage::from_config(&config.storage).await,
        ),
    }
}

async fn run_flow(flow: Flow, config: &Config, backend: Backend) -> Result<RunOutcome> {
    match flow {
        Flow::StudentHousing => {
            let source = HousingPortal::new(&config.source)?;
            let notifier = SmtpNotifier::new(&config.mail, MailCredentials::from_env()?)?;
            let store = open_store(config, backend).await;

            ListingCheck {
                source: &source,
                store: store.as_ref(),
                notifier: &notifier,
                portal_url: &config.source.url,
            }
            .run()
            .await
        }
    }
}

fn report_outcome(flow: Flow, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Unchanged => log::info!("{}: no changes", flow),
        RunOutcome::Notified {
            subject,
            added,
            removed,
        } => log::info!(
            "{}: notified \"{}\" ({} new, {} removed)",
            flow,
            subject,
            added,
            removed
        ),
    }
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = dotenvy::dotenv() {
        log::debug!("No .env loaded: {}", e);
    }

    let config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Run => {
            let flows = pipeline::flows_from_env();
            if flows.is_empty() {
                log::warn!("No flows selected; set {} (e.g. \"0\")", pipeline::FLOWS_VAR);
            }
            for flow in flows {
                log::info!("Running {}", flow);
                let outcome = run_flow(flow, &config, cli.backend).await?;
                report_outcome(flow, &outcome);
            }
        }

        Command::Check => {
            let flow = Flow::StudentHousing;
            let outcome = run_flow(flow, &config, cli.backend).await?;
            report_outcome(flow, &outcome);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let config = Config::load(&cli.config)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let credentials = MailCredentials::from_env()?;
            SmtpNotifier::new(&config.mail, credentials)?;
            log::info!("✓ Mail credentials OK");

            log::info!("All validations passed!");
        }

        Command::Info => {
            let store = open_store(&config, cli.backend).await;
            let snapshot = store.load().await?;

            log::info!("Snapshot: {}", store.location());
            log::info!("Available: {}", snapshot.available);
            log::info!("Listings: {}", snapshot.len());
            for (key, listing) in &snapshot.choices {
                log::debug!(
                    "  {} | {} | {}",
                    key,
                    listing.address.as_deref().unwrap_or("-"),
                    listing.date.as_deref().unwrap_or("-")
                );
            }
        }

        #[cfg(feature = "s3")]
        Command::Provision { step } => {
            let provisioner =
                housing_watch::storage::provision::Provisioner::from_env(config.storage.clone())
                    .await;
            match step {
                ProvisionStep::CreateBucket => provisioner.create_bucket().await?,
                ProvisionStep::PrepareFolders => provisioner.prepare_folders().await?,
            }
        }
    }

    log::info!("Done!");

    Ok(())
}

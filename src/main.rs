//! Skill attestation CLI
//!
//! Command-line surface for connecting a wallet session and submitting or
//! browsing on-chain skill attestations.

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use skill_attest::config::{rpc::chains, PRIVATE_KEY_ENV};
use skill_attest::{
    AttestationGateway, AttestationInput, AttestationRecord, Config, Error, LocalProvider, Result,
    RpcConfig, SessionManager, SessionStore, WalletProvider,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "skill-attest")]
#[command(about = "Submit and browse on-chain skill attestations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and persist the session
    Connect,

    /// Clear the session and the persisted address
    Disconnect,

    /// Show session state
    Status,

    /// Submit a skill attestation
    Attest {
        /// Address being vouched for
        #[arg(long)]
        subject: String,

        /// Skill name (at least 2 characters)
        #[arg(long)]
        skill: String,

        /// Why you are attesting this skill (at least 10 characters)
        #[arg(long)]
        description: String,
    },

    /// List attestations received by an address
    Received {
        /// Subject address (defaults to the connected wallet)
        #[arg(long)]
        subject: Option<String>,

        /// Filter by skill, address, or description substring
        #[arg(long)]
        search: Option<String>,
    },

    /// List attestations given by an address
    Given {
        /// Attester address (defaults to the connected wallet)
        #[arg(long)]
        attester: Option<String>,
    },

    /// Show both sides of the connected wallet's attestation history
    History,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load config
    let config = if let Some(config_path) = cli.config {
        let content =
            std::fs::read_to_string(&config_path).map_err(|e| Error::Config(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))?
    } else {
        Config::default()
    };

    let rpc = RpcConfig::from_env();
    let provider = build_provider(&rpc);
    let store = SessionStore::new(&config.session_file);
    let session = SessionManager::new(provider, store, rpc, config.request_timeout());

    match cli.command {
        Commands::Connect => {
            let address = session.connect().await?;
            println!("Connected as {}", address);
        }
        Commands::Disconnect => {
            session.disconnect().await?;
            println!("Disconnected");
        }
        Commands::Status => run_status(&session).await?,
        Commands::Attest {
            subject,
            skill,
            description,
        } => run_attest(&session, &subject, &skill, &description).await?,
        Commands::Received { subject, search } => {
            run_received(&session, subject, search).await?;
        }
        Commands::Given { attester } => run_given(&session, attester).await?,
        Commands::History => run_history(&session).await?,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config).unwrap());
        }
    }

    Ok(())
}

/// Build the wallet provider from the environment, if a key is present
fn build_provider(rpc: &RpcConfig) -> Option<Arc<dyn WalletProvider>> {
    match std::env::var(PRIVATE_KEY_ENV) {
        Ok(key) => match LocalProvider::from_hex(&key, rpc.clone(), chains::ETHEREUM) {
            Ok(provider) => {
                tracing::info!(address = %provider.address(), "Loaded wallet from PRIVATE_KEY");
                Some(Arc::new(provider))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load wallet from PRIVATE_KEY");
                None
            }
        },
        Err(_) => {
            tracing::debug!("No PRIVATE_KEY set - read-only mode");
            None
        }
    }
}

async fn run_status(session: &SessionManager) -> Result<()> {
    session.restore().await?;
    let snapshot = session.snapshot().await;

    match snapshot.address {
        Some(address) => println!("Connected: {}", address),
        None => println!("Not connected"),
    }
    Ok(())
}

async fn run_attest(
    session: &SessionManager,
    subject: &str,
    skill: &str,
    description: &str,
) -> Result<()> {
    session.restore().await?;

    let input = AttestationInput::parse(subject, skill, description)?;
    let gateway = AttestationGateway::new(session);
    let tx = gateway.submit(input).await?;

    println!("Attestation submitted: {}", tx);
    println!("  {}", tx.explorer_url());
    Ok(())
}

async fn run_received(
    session: &SessionManager,
    subject: Option<String>,
    search: Option<String>,
) -> Result<()> {
    let subject = resolve_address(session, subject, "subject").await?;
    let gateway = AttestationGateway::new(session);

    let mut records = gateway.fetch_received(subject).await?;
    if let Some(term) = search {
        records.retain(|r| r.matches_search(&term));
    }

    println!("Attestations received by {}", format_address(&subject));
    print_records(&records);
    Ok(())
}

async fn run_given(session: &SessionManager, attester: Option<String>) -> Result<()> {
    let attester = resolve_address(session, attester, "attester").await?;
    let gateway = AttestationGateway::new(session);

    let records = gateway.fetch_given(attester).await?;

    println!("Attestations given by {}", format_address(&attester));
    print_records(&records);
    Ok(())
}

async fn run_history(session: &SessionManager) -> Result<()> {
    session.restore().await?;
    let address = session.address().await.ok_or(Error::NotConnected)?;

    let gateway = AttestationGateway::new(session);
    let history = gateway.fetch_history(address).await;

    // Each path reports independently; a failed one renders as empty
    println!("Attestations received by {}", format_address(&address));
    if let Some(error) = history.received.error() {
        tracing::warn!(error, "received path unavailable");
    }
    print_records(history.received.records());

    println!();
    println!("Attestations given by {}", format_address(&address));
    if let Some(error) = history.given.error() {
        tracing::warn!(error, "given path unavailable");
    }
    print_records(history.given.records());

    Ok(())
}

/// Use the explicit address when given, otherwise fall back to the
/// restored session's address
async fn resolve_address(
    session: &SessionManager,
    explicit: Option<String>,
    role: &str,
) -> Result<Address> {
    if let Some(raw) = explicit {
        return Address::from_str(&raw)
            .map_err(|e| Error::InvalidInput(format!("invalid {} address: {}", role, e)));
    }

    session.restore().await?;
    session.address().await.ok_or(Error::NotConnected)
}

fn print_records(records: &[AttestationRecord]) {
    if records.is_empty() {
        println!("  (none)");
        return;
    }

    for record in records {
        let date = record
            .timestamp_utc()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{}] {} -> {}  {}",
            record.skill,
            format_address(&record.attester),
            format_address(&record.subject),
            date
        );
        println!("      {}", record.description);
    }
}

/// Shorten an address for display, `0x1234...5678` style
fn format_address(address: &Address) -> String {
    let s = address.to_string();
    format!("{}...{}", &s[..6], &s[s.len() - 4..])
}

//! nexus-wallet - Wallet transaction adapter for the Endless Nexus marketplace
//!
//! Offline tooling around the adapter: payload normalization, response
//! extraction, contract ids, and scripted end-to-end runs.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod providers;
pub mod transaction;
pub mod wallet;

use config::{ContractConfig, DeployAccountRecord, EntryFunction, NetworkConfig, ViewFunction};
use providers::scripted::{ScriptedSdk, ScriptedWallet, WalletScript};
use providers::{InjectedGlobals, ProviderDetector};
use transaction::{NoAccountSource, PayloadNormalizer, ResponseExtractor, TransactionRequest};
use wallet::{FileSessionStore, MemorySessionStore, SessionStore, WalletAdapter, WalletError};

/// nexus-wallet: Endless Nexus wallet adapter
#[derive(Parser)]
#[command(name = "nexus-wallet")]
#[command(about = "Wallet transaction adapter for the Endless Nexus marketplace", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonicalize a transaction request given as JSON
    Normalize {
        #[arg(value_name = "JSON")]
        request: String,
    },

    /// Extract the transaction hash from a provider response
    ExtractHash {
        #[arg(value_name = "JSON")]
        response: String,
    },

    /// Extract the account from a provider connect response
    ExtractAccount {
        #[arg(value_name = "JSON")]
        response: String,
    },

    /// List the marketplace entry and view function ids
    Contracts {
        /// Deployment account record whose address hosts the module
        #[arg(short, long, value_name = "FILE")]
        account: Option<PathBuf>,
    },

    /// Build the request payload for an agent call
    RequestPayload {
        /// Agent identifier
        #[arg(long)]
        agent: String,

        /// Prompt sent to the agent
        #[arg(long)]
        prompt: String,

        /// Attach a payment in EDS
        #[arg(long)]
        amount: Option<String>,
    },

    /// Replay a scripted wallet through connect, submit and disconnect
    Simulate {
        /// Simulation script (JSON)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Persist the session flag in this file instead of memory
        #[arg(short, long, value_name = "FILE")]
        session: Option<PathBuf>,
    },
}

/// Input of the `simulate` command
#[derive(Debug, Deserialize)]
struct SimulationScript {
    /// Global binding the scripted extension is injected under
    #[serde(default = "default_binding")]
    binding: String,
    #[serde(default)]
    wallet: Option<WalletScript>,
    #[serde(default)]
    sdk: Option<WalletScript>,
    request: TransactionRequest,
    #[serde(default)]
    view: Option<TransactionRequest>,
}

fn default_binding() -> String {
    "endless".to_string()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {}", e);
    }

    let result = match cli.command {
        Commands::Normalize { request } => normalize(&request),
        Commands::ExtractHash { response } => extract_hash(&response),
        Commands::ExtractAccount { response } => extract_account(&response).await,
        Commands::Contracts { account } => contracts(account.as_deref()),
        Commands::RequestPayload {
            agent,
            prompt,
            amount,
        } => request_payload(&agent, &prompt, amount.as_deref()),
        Commands::Simulate { script, session } => simulate(&script, session).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn parse_json(raw: &str) -> Result<Value, WalletError> {
    serde_json::from_str(raw).map_err(|e| WalletError::InvalidRequest(e.to_string()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), WalletError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| WalletError::InvalidRequest(e.to_string()))?;
    println!("{}", out);
    Ok(())
}

fn normalize(raw: &str) -> Result<(), WalletError> {
    let tx = PayloadNormalizer::normalize_value(&parse_json(raw)?)?;
    print_json(&tx)
}

fn extract_hash(raw: &str) -> Result<(), WalletError> {
    let result = ResponseExtractor::extract_transaction_hash(&parse_json(raw)?)?;
    print_json(&result)
}

async fn extract_account(raw: &str) -> Result<(), WalletError> {
    let account = ResponseExtractor::extract_account(&parse_json(raw)?, &NoAccountSource).await?;
    print_json(&account)
}

fn contracts(account: Option<&Path>) -> Result<(), WalletError> {
    let mut config = ContractConfig::from_build_env()?;
    if let Some(path) = account {
        let record = DeployAccountRecord::load(path)?;
        info!("Using deployment account {}", record);
        config = config.with_address(&record.address)?;
    }
    let network = NetworkConfig::TESTNET;

    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│  ENDLESS NEXUS CONTRACT                                     │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│  Network:  {}", network.name);
    println!("│  Address:  {}", config.address);
    println!("│  Module:   {}", config.module);
    println!("│  Explorer: {}", network.account_url(&config.address));
    println!("│                                                             │");
    println!("│  Entry functions:                                           │");
    for function in EntryFunction::ALL {
        println!("│  ├─ {}", config.function_id(function));
    }
    println!("│                                                             │");
    println!("│  View functions:                                            │");
    for view in ViewFunction::ALL {
        println!("│  ├─ {}", config.view_function_id(view));
    }
    println!("└─────────────────────────────────────────────────────────────┘");
    Ok(())
}

fn request_payload(agent: &str, prompt: &str, amount: Option<&str>) -> Result<(), WalletError> {
    let contract = ContractConfig::from_build_env()?;
    let request = match amount {
        Some(eds) => {
            let base_units = config::to_base_units(eds)?;
            info!("Payment: {}", config::format_eds(base_units));
            TransactionRequest::wrapped(
                contract.function_id(EntryFunction::RequestWithPayment),
                vec![],
                vec![json!(agent), json!(prompt), json!(base_units.to_string())],
            )
        }
        None => TransactionRequest::wrapped(
            contract.function_id(EntryFunction::RequestAiService),
            vec![],
            vec![json!(agent), json!(prompt)],
        ),
    };
    print_json(&request)
}

async fn simulate(script_path: &Path, session_path: Option<PathBuf>) -> Result<(), WalletError> {
    let raw = std::fs::read_to_string(script_path)
        .map_err(|e| WalletError::Config(format!("{}: {}", script_path.display(), e)))?;
    let script: SimulationScript = serde_json::from_str(&raw)
        .map_err(|e| WalletError::Config(format!("{}: {}", script_path.display(), e)))?;

    let globals = Arc::new(InjectedGlobals::new());
    if let Some(wallet) = script.wallet {
        globals.inject(&script.binding, Arc::new(ScriptedWallet::new(wallet)));
    }
    let mut detector = ProviderDetector::new(globals);
    if let Some(sdk) = script.sdk {
        detector = detector.with_sdk(Arc::new(ScriptedSdk::new(sdk)));
    }
    let session: Arc<dyn SessionStore> = match session_path {
        Some(path) => Arc::new(FileSessionStore::new(path)),
        None => Arc::new(MemorySessionStore::new()),
    };

    let mut adapter = WalletAdapter::new(detector, session);
    let restored = adapter.initialize().await;
    if !restored {
        adapter.connect().await?;
    }
    let account = adapter.account().cloned().ok_or(WalletError::NotConnected)?;
    let provider = adapter.active_provider().unwrap_or_default().to_string();

    let outcome = adapter.submit_transaction(&script.request).await;
    let view = match &script.view {
        Some(request) => Some(adapter.view(request).await),
        None => None,
    };
    adapter.disconnect().await;

    let network = NetworkConfig::TESTNET;
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│  SIMULATION                                                 │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│  Provider: {}", provider);
    println!("│  Account:  {}", account.short_address());
    println!("│  Restored: {}", restored);
    match &outcome {
        Ok(result) => {
            println!("│  Hash:     {}", result.hash);
            println!("│  Explorer: {}", network.transaction_url(&result.hash));
        }
        Err(e) => println!("│  Failed:   {}", e),
    }
    if let Some(view) = &view {
        match view {
            Ok(values) => println!("│  View:     {}", Value::Array(values.clone())),
            Err(e) => println!("│  View failed: {}", e),
        }
    }
    println!("│  State:    {}", adapter.state());
    println!("└─────────────────────────────────────────────────────────────┘");

    outcome.map(|_| ())
}

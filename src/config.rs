//! Contract and network configuration
//!
//! The deployed `{address, module}` pair is fixed at build time. Set
//! `NEXUS_MODULE_ADDRESS` / `NEXUS_MODULE_NAME` when compiling to target a
//! different deployment.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::wallet::{Result, WalletError};

/// Testnet deployment of the marketplace module
pub const DEFAULT_MODULE_ADDRESS: &str =
    "0x3bc5719c343fcc717043df3b59051398ec357d7768c2f9dc78c89cbd1672fa79";
pub const DEFAULT_MODULE_NAME: &str = "nexus_mock";

/// EDS has 8 decimals
pub const EDS_DECIMALS: u32 = 8;

/// Entry functions of the marketplace module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFunction {
    RequestAiService,
    RequestWithPayment,
}

impl EntryFunction {
    pub const ALL: [EntryFunction; 2] = [
        EntryFunction::RequestAiService,
        EntryFunction::RequestWithPayment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntryFunction::RequestAiService => "request_ai_service",
            EntryFunction::RequestWithPayment => "request_ai_service_with_payment",
        }
    }
}

/// View functions of the marketplace module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFunction {
    IsInitialized,
    GetServicePrice,
    GetTreasury,
    GetTotalRequests,
    GetUserBalance,
}

impl ViewFunction {
    pub const ALL: [ViewFunction; 5] = [
        ViewFunction::IsInitialized,
        ViewFunction::GetServicePrice,
        ViewFunction::GetTreasury,
        ViewFunction::GetTotalRequests,
        ViewFunction::GetUserBalance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ViewFunction::IsInitialized => "is_initialized",
            ViewFunction::GetServicePrice => "get_service_price",
            ViewFunction::GetTreasury => "get_treasury",
            ViewFunction::GetTotalRequests => "get_total_requests",
            ViewFunction::GetUserBalance => "get_user_eds_balance",
        }
    }
}

/// Where the marketplace module is deployed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    pub address: String,
    pub module: String,
}

impl ContractConfig {
    /// Validate and build a config
    pub fn new(address: &str, module: &str) -> Result<Self> {
        if !is_hex_address(address) {
            return Err(WalletError::Config(format!(
                "Invalid module address: {}",
                address
            )));
        }
        if module.is_empty() || !module.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(WalletError::Config(format!("Invalid module name: {}", module)));
        }
        Ok(Self {
            address: address.to_string(),
            module: module.to_string(),
        })
    }

    /// The pair baked in at build time
    pub fn from_build_env() -> Result<Self> {
        Self::new(
            option_env!("NEXUS_MODULE_ADDRESS").unwrap_or(DEFAULT_MODULE_ADDRESS),
            option_env!("NEXUS_MODULE_NAME").unwrap_or(DEFAULT_MODULE_NAME),
        )
    }

    /// Same module, published from a deployment account
    pub fn with_address(&self, address: &str) -> Result<Self> {
        Self::new(address, &self.module)
    }

    pub fn function_id(&self, function: EntryFunction) -> String {
        format!("{}::{}::{}", self.address, self.module, function.name())
    }

    pub fn view_function_id(&self, view: ViewFunction) -> String {
        format!("{}::{}::{}", self.address, self.module, view.name())
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_MODULE_ADDRESS.to_string(),
            module: DEFAULT_MODULE_NAME.to_string(),
        }
    }
}

/// Endless network endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: &'static str,
    pub chain_id: &'static str,
    pub fullnode_url: &'static str,
    pub faucet_url: &'static str,
    pub explorer_url: &'static str,
    /// Explorer `network` query parameter
    pub network_param: &'static str,
}

impl NetworkConfig {
    pub const TESTNET: NetworkConfig = NetworkConfig {
        name: "Endless Testnet",
        chain_id: "endless-testnet",
        fullnode_url: "https://rpc-testnet.endless.link/v1",
        faucet_url: "https://faucet-testnet.endless.link",
        explorer_url: "https://scan.endless.link",
        network_param: "testnet",
    };

    pub fn account_url(&self, address: &str) -> String {
        format!(
            "{}/account/{}?network={}",
            self.explorer_url, address, self.network_param
        )
    }

    pub fn transaction_url(&self, hash: &str) -> String {
        format!("{}/txn/{}?network={}", self.explorer_url, hash, self.network_param)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::TESTNET
    }
}

/// Account record written by the deployment tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployAccountRecord {
    pub address: String,
    pub private_key: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
}

impl DeployAccountRecord {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("{}: {}", path.display(), e)))?;
        let record: Self = serde_json::from_str(&raw)
            .map_err(|e| WalletError::Config(format!("{}: {}", path.display(), e)))?;
        if !is_hex_address(&record.address) {
            return Err(WalletError::Config(format!(
                "{}: invalid address {}",
                path.display(),
                record.address
            )));
        }
        Ok(record)
    }
}

impl std::fmt::Display for DeployAccountRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the private key
        write!(
            f,
            "{} (created {})",
            truncate_address(&self.address),
            self.created_at.to_rfc3339()
        )
    }
}

/// `0x` followed by an even number of hex digits
pub fn is_hex_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(digits) if !digits.is_empty() => hex::decode(digits).is_ok(),
        _ => false,
    }
}

/// `0x1234...abcd`; short values are returned unchanged
pub fn truncate_address(address: &str) -> String {
    const START: usize = 6;
    const END: usize = 4;

    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= START + END {
        return address.to_string();
    }
    let head: String = chars[..START].iter().collect();
    let tail: String = chars[chars.len() - END..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Convert an EDS amount (e.g. `"0.5"`) to base units, truncating
/// anything past 8 decimals
pub fn to_base_units(eds: &str) -> Result<u128> {
    let amount = Decimal::from_str(eds.trim())
        .map_err(|e| WalletError::InvalidRequest(format!("Invalid EDS amount {}: {}", eds, e)))?;
    if amount.is_sign_negative() {
        return Err(WalletError::InvalidRequest(format!(
            "EDS amount must not be negative: {}",
            eds
        )));
    }
    (amount * Decimal::from(10u64.pow(EDS_DECIMALS)))
        .trunc()
        .to_u128()
        .ok_or_else(|| WalletError::InvalidRequest(format!("EDS amount out of range: {}", eds)))
}

/// Format base units as EDS, dropping trailing zeros
pub fn format_eds(base_units: u128) -> String {
    let divisor = 10u128.pow(EDS_DECIMALS);
    let whole = base_units / divisor;
    let fraction = base_units % divisor;

    if fraction == 0 {
        return format!("{} EDS", whole);
    }
    let fraction = format!("{:0width$}", fraction, width = EDS_DECIMALS as usize);
    format!("{}.{} EDS", whole, fraction.trim_end_matches('0'))
}

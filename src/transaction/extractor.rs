//! Provider response extraction
//!
//! Wallets answer in several nested shapes. Each shape is handled by one pure
//! strategy returning `Option`; strategies run in a fixed order and the first
//! hit wins.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{ProviderResponse, TransactionResult};
use crate::providers::ProviderFault;
use crate::wallet::{Account, Result, WalletError};

/// An `args` value is taken as an address only if it is longer than this
pub const MIN_ADDRESS_LEN: usize = 60;

const APPROVED: &str = "Approved";

type AccountStrategy = fn(&Value) -> Option<Account>;
type HashStrategy = fn(&Value) -> Option<String>;

const ACCOUNT_STRATEGIES: &[(&str, AccountStrategy)] = &[
    ("address", top_level_account),
    ("args.address", args_account),
    ("data.address", data_account),
    ("account.address", nested_account),
];

const HASH_STRATEGIES: &[(&str, HashStrategy)] = &[
    ("approved args.hash", approved_args_hash),
    ("hash", top_level_hash),
    ("result.hash", result_hash),
    ("bare string", bare_string_hash),
];

/// Secondary account lookup used when a connect response is approved but
/// carries no address
#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn query_account(&self) -> std::result::Result<Option<Value>, ProviderFault>;
}

/// Account source that never answers, for offline extraction
pub struct NoAccountSource;

#[async_trait]
impl AccountSource for NoAccountSource {
    async fn query_account(&self) -> std::result::Result<Option<Value>, ProviderFault> {
        Ok(None)
    }
}

/// Reduces provider responses to an [`Account`] or a [`TransactionResult`]
pub struct ResponseExtractor;

impl ResponseExtractor {
    /// Extract the connected account.
    ///
    /// Runs the shape strategies. An `"Approved"` response without an
    /// address then gets at most one `source` query, and finally a scan of
    /// its `args` values.
    pub async fn extract_account<S>(response: &ProviderResponse, source: &S) -> Result<Account>
    where
        S: AccountSource + ?Sized,
    {
        if let Some(account) = Self::account_from_shape(response) {
            return Ok(account);
        }

        if is_approved(response) {
            debug!("Approved response without address, querying account");
            match source.query_account().await {
                Ok(Some(value)) => {
                    if let Some(account) = account_at(&value) {
                        return Ok(account);
                    }
                    debug!("Account query returned no address: {}", value);
                }
                Ok(None) => debug!("Account query returned nothing"),
                Err(e) => warn!("Account query failed: {}", e),
            }

            if let Some(account) = scan_args_for_address(response) {
                return Ok(account);
            }
        }

        Err(WalletError::NoAddressFound(response.to_string()))
    }

    /// Run only the fixed-shape account strategies
    pub fn account_from_shape(response: &ProviderResponse) -> Option<Account> {
        ACCOUNT_STRATEGIES.iter().find_map(|(name, strategy)| {
            let account = strategy(response)?;
            debug!("Address found via {}", name);
            Some(account)
        })
    }

    /// Extract the transaction hash of a submission
    pub fn extract_transaction_hash(response: &ProviderResponse) -> Result<TransactionResult> {
        HASH_STRATEGIES
            .iter()
            .find_map(|(name, strategy)| {
                let hash = strategy(response)?;
                debug!("Transaction hash found via {}", name);
                Some(TransactionResult { hash })
            })
            .ok_or(WalletError::NoHashFound)
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_approved(response: &Value) -> bool {
    response.get("status").and_then(Value::as_str) == Some(APPROVED)
}

/// An object with a non-empty string `address` and optional `publicKey`
fn account_at(value: &Value) -> Option<Account> {
    let address = non_empty_str(value.get("address"))?;
    let public_key = non_empty_str(value.get("publicKey"));
    Some(Account::new(address, public_key))
}

fn top_level_account(response: &Value) -> Option<Account> {
    account_at(response)
}

fn args_account(response: &Value) -> Option<Account> {
    response.get("args").and_then(account_at)
}

fn data_account(response: &Value) -> Option<Account> {
    response.get("data").and_then(account_at)
}

fn nested_account(response: &Value) -> Option<Account> {
    response.get("account").and_then(account_at)
}

/// `0x`-prefixed and longer than [`MIN_ADDRESS_LEN`].
///
/// Heuristic: any long hex-looking string qualifies, so an unrelated value in
/// `args` can be mistaken for an address.
pub fn looks_like_address(value: &str) -> bool {
    value.starts_with("0x") && value.len() > MIN_ADDRESS_LEN
}

/// Walk the values of an `args` mapping in order, taking the first
/// address-looking string or nested object with an `address`
fn scan_args_for_address(response: &Value) -> Option<Account> {
    let args = response.get("args")?.as_object()?;
    args.iter().find_map(|(key, value)| match value {
        Value::String(s) if looks_like_address(s) => {
            debug!("Potential address found in args.{}", key);
            Some(Account::new(s.clone(), None))
        }
        Value::Object(_) => account_at(value),
        _ => None,
    })
}

fn approved_args_hash(response: &Value) -> Option<String> {
    if !is_approved(response) {
        return None;
    }
    non_empty_str(response.pointer("/args/hash"))
}

fn top_level_hash(response: &Value) -> Option<String> {
    non_empty_str(response.get("hash"))
}

fn result_hash(response: &Value) -> Option<String> {
    non_empty_str(response.pointer("/result/hash"))
}

fn bare_string_hash(response: &Value) -> Option<String> {
    non_empty_str(Some(response))
}

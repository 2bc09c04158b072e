//! Wallet providers for the Endless Nexus adapter
//!
//! Two kinds of provider can sign for the user:
//! - a browser extension injected under a well-known global binding
//! - the web3 SDK client, which mediates through its own UI
//!
//! Both are reached through [`Provider`], a tagged union over the two
//! concrete variants. The adapter never probes provider objects for
//! properties; what a provider can do is declared by its type and its
//! [`Capabilities`].

pub mod detector;
pub mod extension;
pub mod scripted;
pub mod sdk;

use async_trait::async_trait;
use serde_json::Value;

use crate::transaction::{AccountSource, CanonicalTransaction, ProviderResponse};

pub use detector::{
    DetectionPolicy, InjectedGlobals, InjectionSource, ProviderDetector, ProviderRegistry,
    RegistryEntry, BINDING_NAMES, SDK_ENTRY_NAME,
};
pub use extension::DirectExtensionProvider;
pub use sdk::SdkMediatedProvider;

/// Failure reported by a provider call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderFault {
    /// The user declined inside the wallet
    #[error("{0}")]
    Rejected(String),
    /// Transport or runtime failure
    #[error("{0}")]
    Failed(String),
}

/// What an injected binding declares it can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub connect: bool,
    pub disconnect: bool,
    pub sign_and_submit: bool,
    pub account: bool,
}

impl Capabilities {
    /// Everything available
    pub const fn full() -> Self {
        Self {
            connect: true,
            disconnect: true,
            sign_and_submit: true,
            account: true,
        }
    }

    /// A binding is only usable if it can connect and submit
    pub fn is_usable(&self) -> bool {
        self.connect && self.sign_and_submit
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}

/// Surface of a wallet extension injected into the page
#[async_trait]
pub trait InjectedWallet: Send + Sync {
    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    async fn connect(&self) -> Result<ProviderResponse, ProviderFault>;

    async fn disconnect(&self) -> Result<(), ProviderFault>;

    async fn sign_and_submit_transaction(
        &self,
        payload: Value,
    ) -> Result<ProviderResponse, ProviderFault>;

    /// Current account, if the extension exposes one
    async fn account(&self) -> Result<Option<Value>, ProviderFault> {
        Ok(None)
    }
}

/// Surface of the web3 SDK client
#[async_trait]
pub trait SdkClient: Send + Sync {
    async fn connect(&self) -> Result<ProviderResponse, ProviderFault>;

    async fn disconnect(&self) -> Result<(), ProviderFault>;

    /// Takes `{payload: {function, functionArguments, typeArguments}}`
    async fn sign_and_submit_transaction(
        &self,
        request: Value,
    ) -> Result<ProviderResponse, ProviderFault>;

    /// Takes `{payload: {function, typeArguments, functionArguments}}`
    async fn view(&self, request: Value) -> Result<Vec<Value>, ProviderFault>;

    /// Preferred account lookup on SDK builds that expose it
    async fn get_account(&self) -> Result<Option<Value>, ProviderFault> {
        Ok(None)
    }

    async fn account(&self) -> Result<Option<Value>, ProviderFault> {
        Ok(None)
    }
}

/// Provider kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    DirectExtension,
    SdkMediated,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::DirectExtension => write!(f, "extension"),
            ProviderKind::SdkMediated => write!(f, "sdk"),
        }
    }
}

/// A selected provider
#[derive(Clone)]
pub enum Provider {
    DirectExtension(DirectExtensionProvider),
    SdkMediated(SdkMediatedProvider),
}

impl Provider {
    pub fn name(&self) -> &str {
        match self {
            Provider::DirectExtension(p) => p.name(),
            Provider::SdkMediated(p) => p.name(),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::DirectExtension(_) => ProviderKind::DirectExtension,
            Provider::SdkMediated(_) => ProviderKind::SdkMediated,
        }
    }

    /// Only the SDK client answers read-only calls
    pub fn supports_view(&self) -> bool {
        matches!(self, Provider::SdkMediated(_))
    }

    pub async fn connect(&self) -> Result<ProviderResponse, ProviderFault> {
        let response = match self {
            Provider::DirectExtension(p) => p.connect().await?,
            Provider::SdkMediated(p) => p.connect().await?,
        };
        check_rejection(response)
    }

    pub async fn disconnect(&self) -> Result<(), ProviderFault> {
        match self {
            Provider::DirectExtension(p) => p.disconnect().await,
            Provider::SdkMediated(p) => p.disconnect().await,
        }
    }

    /// The submission body this provider expects for `tx`
    pub fn submission_payload(&self, tx: &CanonicalTransaction) -> Result<Value, ProviderFault> {
        match self {
            Provider::DirectExtension(_) => DirectExtensionProvider::submission_payload(tx),
            Provider::SdkMediated(_) => SdkMediatedProvider::submission_payload(tx),
        }
    }

    pub async fn sign_and_submit(
        &self,
        tx: &CanonicalTransaction,
    ) -> Result<ProviderResponse, ProviderFault> {
        let payload = self.submission_payload(tx)?;
        let response = match self {
            Provider::DirectExtension(p) => p.sign_and_submit(payload).await?,
            Provider::SdkMediated(p) => p.sign_and_submit(payload).await?,
        };
        check_rejection(response)
    }

    pub async fn view(&self, tx: &CanonicalTransaction) -> Result<Vec<Value>, ProviderFault> {
        match self {
            Provider::SdkMediated(p) => p.view(tx).await,
            Provider::DirectExtension(p) => Err(ProviderFault::Failed(format!(
                "Provider {} does not support view calls",
                p.name()
            ))),
        }
    }
}

#[async_trait]
impl AccountSource for Provider {
    async fn query_account(&self) -> Result<Option<Value>, ProviderFault> {
        match self {
            Provider::DirectExtension(p) => p.account().await,
            Provider::SdkMediated(p) => p.account().await,
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

/// Wallets signal an in-wallet decline with `status: "Rejected"`
fn check_rejection(response: ProviderResponse) -> Result<ProviderResponse, ProviderFault> {
    if response.get("status").and_then(Value::as_str) == Some("Rejected") {
        let message = response
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("User rejected the request");
        return Err(ProviderFault::Rejected(message.to_string()));
    }
    Ok(response)
}

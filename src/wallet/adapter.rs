//! Wallet adapter
//!
//! Composes detection, normalization and extraction behind the surface the
//! UI uses. State transitions:
//!
//! ```text
//! Disconnected -> Connecting -> Connected | Error
//! Connected    -> Disconnected              (disconnect)
//! Error        -> Disconnected | Connecting (clear_error | connect)
//! ```
//!
//! Operations that change the session take `&mut self`, so one adapter
//! cannot run two connects (or a connect and a disconnect) at once.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::state::{Account, ConnectionState, WalletState};
use super::{Result, SessionStore, WalletError};
use crate::providers::{Provider, ProviderDetector};
use crate::transaction::{
    PayloadNormalizer, ResponseExtractor, TransactionRequest, TransactionResult,
};

/// Error recorded when a manual rescan finds nothing
pub const NO_EXTENSION_MESSAGE: &str = "No wallet extension detected. Please install Endless Wallet.";

/// Normalized connect / disconnect / submit / view surface over whichever
/// wallet provider is available
pub struct WalletAdapter {
    detector: ProviderDetector,
    session: Arc<dyn SessionStore>,
    state: WalletState,
}

impl WalletAdapter {
    pub fn new(detector: ProviderDetector, session: Arc<dyn SessionStore>) -> Self {
        Self {
            detector,
            session,
            state: WalletState::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> ConnectionState {
        self.state.status
    }

    pub fn is_connected(&self) -> bool {
        self.state.status == ConnectionState::Connected
    }

    pub fn is_connecting(&self) -> bool {
        self.state.status == ConnectionState::Connecting
    }

    pub fn account(&self) -> Option<&Account> {
        self.state.account.as_ref()
    }

    /// Last error message, verbatim
    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Whether the last detection pass found an injected extension
    pub fn detected(&self) -> bool {
        self.detector.detected()
    }

    /// Name of the provider backing the current session
    pub fn active_provider(&self) -> Option<&str> {
        self.state.provider.as_ref().map(Provider::name)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Startup sequence: detect with the bounded retry, then restore a
    /// previous session if there was one
    pub async fn initialize(&mut self) -> bool {
        self.detector.scan_with_retry().await;
        self.restore_session().await
    }

    /// Connect to the highest-priority provider
    pub async fn connect(&mut self) -> Result<Account> {
        self.state.begin_connect();
        info!("Connecting wallet...");

        match self.open_session().await {
            Ok((account, provider)) => {
                info!(
                    "Connected via {}: {}",
                    provider.name(),
                    account.short_address()
                );
                self.state.connected(account.clone(), provider);
                self.persist(true);
                Ok(account)
            }
            Err(e) => {
                warn!("Connect failed: {}", e);
                self.state.failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn open_session(&mut self) -> Result<(Account, Provider)> {
        let registry = self.detector.scan();
        let provider = registry
            .preferred()
            .cloned()
            .ok_or(WalletError::NoProviderAvailable)?;

        debug!("Using {} provider {}", provider.kind(), provider.name());
        let response = provider.connect().await?;
        debug!("Connect response: {}", response);

        let account = ResponseExtractor::extract_account(&response, &provider).await?;
        Ok((account, provider))
    }

    /// Drop the session. Provider failures are logged, never returned.
    pub async fn disconnect(&mut self) {
        info!("Disconnecting wallet...");
        if let Some(provider) = self.state.provider.take() {
            if let Err(e) = provider.disconnect().await {
                warn!("Provider disconnect failed, clearing session anyway: {}", e);
            }
        }
        self.state.reset();
        self.persist(false);
    }

    /// Reconnect if the persisted flag says the user was connected.
    ///
    /// A failed attempt clears the flag and leaves the adapter Disconnected
    /// with no error recorded.
    pub async fn restore_session(&mut self) -> bool {
        if !self.session.was_connected() {
            return false;
        }

        info!("Auto-connecting...");
        match self.connect().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Auto-connect failed, user needs to reconnect: {}", e);
                self.state.reset();
                self.persist(false);
                false
            }
        }
    }

    /// Manual re-detection of the injected extensions
    pub fn rescan(&mut self) -> bool {
        info!("Rescanning for wallet providers...");
        let registry = self.detector.scan();
        if !registry.has_extension() {
            self.state.error = Some(NO_EXTENSION_MESSAGE.to_string());
            false
        } else {
            self.state.clear_error();
            true
        }
    }

    /// Acknowledge the last error
    pub fn clear_error(&mut self) {
        self.state.clear_error();
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Sign and submit through the connected provider. Never retried.
    pub async fn submit_transaction(&self, request: &TransactionRequest) -> Result<TransactionResult> {
        let provider = match (self.state.status, self.state.provider.as_ref()) {
            (ConnectionState::Connected, Some(provider)) => provider,
            _ => return Err(WalletError::NotConnected),
        };

        let tx = PayloadNormalizer::normalize(request)?;
        info!(
            "Signing transaction {} ({} args) via {}",
            tx.function_id,
            tx.function_arguments.len(),
            provider.name()
        );

        let response = provider.sign_and_submit(&tx).await?;
        debug!("Transaction response: {}", response);

        let result = ResponseExtractor::extract_transaction_hash(&response)?;
        info!("Transaction hash: {}", result.hash);
        Ok(result)
    }

    /// Read-only call through the first provider that serves views.
    /// Needs no connected session and leaves `detected()` untouched.
    pub async fn view(&self, request: &TransactionRequest) -> Result<Vec<Value>> {
        let tx = PayloadNormalizer::normalize(request)?;
        let registry = self.detector.lookup();
        let provider = registry
            .view_provider()
            .ok_or(WalletError::NoProviderAvailable)?;

        debug!("View {} via {}", tx.function_id, provider.name());
        Ok(provider.view(&tx).await?)
    }

    fn persist(&self, connected: bool) {
        if let Err(e) = self.session.set_connected(connected) {
            warn!("Failed to persist session flag: {}", e);
        }
    }
}

//! Wallet adapter for the Endless Nexus marketplace
//!
//! This module owns the connection lifecycle: provider selection, session
//! restoration, and the single error contract every caller sees.

pub mod adapter;
pub mod session;
pub mod state;

use crate::providers::ProviderFault;

/// Common wallet error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("No wallet provider available")]
    NoProviderAvailable,

    #[error("Transaction function is required")]
    MissingFunctionId,

    #[error("No address returned from wallet. Response: {0}")]
    NoAddressFound(String),

    #[error("Could not extract transaction hash from response")]
    NoHashFound,

    #[error("Wallet not connected")]
    NotConnected,

    /// The user declined the request inside the wallet
    #[error("{0}")]
    ProviderRejected(String),

    /// Transport or runtime failure reported by the provider
    #[error("{0}")]
    ProviderCallFailed(String),

    #[error("Invalid transaction request: {0}")]
    InvalidRequest(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WalletError>;

impl From<ProviderFault> for WalletError {
    fn from(fault: ProviderFault) -> Self {
        match fault {
            ProviderFault::Rejected(msg) => WalletError::ProviderRejected(msg),
            ProviderFault::Failed(msg) => WalletError::ProviderCallFailed(msg),
        }
    }
}

// Re-export wallet types
pub use adapter::WalletAdapter;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, SESSION_KEY};
pub use state::{Account, ConnectionState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_fault_keeps_message() {
        let rejected: WalletError = ProviderFault::Rejected("User rejected the request".into()).into();
        assert_eq!(rejected, WalletError::ProviderRejected("User rejected the request".into()));
        assert_eq!(rejected.to_string(), "User rejected the request");

        let failed: WalletError = ProviderFault::Failed("network down".into()).into();
        assert_eq!(failed.to_string(), "network down");
    }
}

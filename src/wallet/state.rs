//! Connection state owned by a [`WalletAdapter`](super::WalletAdapter)

use serde::{Deserialize, Serialize};

use crate::config::truncate_address;
use crate::providers::Provider;

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Error => write!(f, "error"),
        }
    }
}

/// The connected wallet account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    #[serde(rename = "publicKey", default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl Account {
    pub fn new(address: impl Into<String>, public_key: Option<String>) -> Self {
        Self {
            address: address.into(),
            public_key,
        }
    }

    /// `0x1234...abcd`
    pub fn short_address(&self) -> String {
        truncate_address(&self.address)
    }
}

/// Everything the adapter knows about the current session
#[derive(Debug, Default)]
pub(crate) struct WalletState {
    pub status: ConnectionState,
    pub account: Option<Account>,
    pub error: Option<String>,
    pub provider: Option<Provider>,
}

impl WalletState {
    pub fn begin_connect(&mut self) {
        self.status = ConnectionState::Connecting;
        self.error = None;
    }

    pub fn connected(&mut self, account: Account, provider: Provider) {
        self.status = ConnectionState::Connected;
        self.account = Some(account);
        self.provider = Some(provider);
        self.error = None;
    }

    pub fn failed(&mut self, message: String) {
        self.status = ConnectionState::Error;
        self.account = None;
        self.provider = None;
        self.error = Some(message);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Acknowledge the recorded error
    pub fn clear_error(&mut self) {
        self.error = None;
        if self.status == ConnectionState::Error {
            self.status = ConnectionState::Disconnected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_then_acknowledged() {
        let mut state = WalletState::default();
        state.begin_connect();
        assert_eq!(state.status, ConnectionState::Connecting);

        state.failed("No wallet provider available".into());
        assert_eq!(state.status, ConnectionState::Error);
        assert_eq!(state.error.as_deref(), Some("No wallet provider available"));

        state.clear_error();
        assert_eq!(state.status, ConnectionState::Disconnected);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_clear_error_keeps_connection() {
        let mut state = WalletState {
            status: ConnectionState::Connected,
            error: Some("stale".into()),
            ..Default::default()
        };
        state.clear_error();
        assert_eq!(state.status, ConnectionState::Connected);
    }

    #[test]
    fn test_account_serializes_public_key_camel_case() {
        let account = Account::new("0xabc", Some("0xkey".into()));
        assert_eq!(
            serde_json::to_value(&account).unwrap(),
            serde_json::json!({ "address": "0xabc", "publicKey": "0xkey" })
        );
    }
}

//! Direct extension provider
//!
//! Talks to the wallet extension injected under `window.endless` (or the
//! compatible `window.aptos`). The extension expects an
//! `entry_function_payload` with snake_case field names.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{InjectedWallet, ProviderFault};
use crate::transaction::{CanonicalTransaction, FunctionArgument, ProviderResponse};

const ENTRY_FUNCTION_PAYLOAD: &str = "entry_function_payload";

#[derive(Serialize)]
struct EntryFunctionPayload<'a> {
    #[serde(rename = "type")]
    payload_type: &'static str,
    function: &'a str,
    type_arguments: &'a [String],
    arguments: &'a [FunctionArgument],
}

/// Provider backed by an injected extension binding
#[derive(Clone)]
pub struct DirectExtensionProvider {
    /// Global binding the extension was found under
    name: String,
    wallet: Arc<dyn InjectedWallet>,
}

impl DirectExtensionProvider {
    pub fn new(name: &str, wallet: Arc<dyn InjectedWallet>) -> Self {
        Self {
            name: name.to_string(),
            wallet,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn submission_payload(tx: &CanonicalTransaction) -> Result<Value, ProviderFault> {
        serde_json::to_value(EntryFunctionPayload {
            payload_type: ENTRY_FUNCTION_PAYLOAD,
            function: &tx.function_id,
            type_arguments: &tx.type_arguments,
            arguments: &tx.function_arguments,
        })
        .map_err(|e| ProviderFault::Failed(format!("Failed to encode payload: {}", e)))
    }

    pub async fn connect(&self) -> Result<ProviderResponse, ProviderFault> {
        debug!("Connecting through window.{}", self.name);
        self.wallet.connect().await
    }

    pub async fn disconnect(&self) -> Result<(), ProviderFault> {
        if !self.wallet.capabilities().disconnect {
            debug!("window.{} has no disconnect, skipping", self.name);
            return Ok(());
        }
        self.wallet.disconnect().await
    }

    pub async fn sign_and_submit(&self, payload: Value) -> Result<ProviderResponse, ProviderFault> {
        debug!("TX payload (window.{}): {}", self.name, payload);
        self.wallet.sign_and_submit_transaction(payload).await
    }

    pub async fn account(&self) -> Result<Option<Value>, ProviderFault> {
        if !self.wallet.capabilities().account {
            return Ok(None);
        }
        self.wallet.account().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_function_payload_shape() {
        let tx = CanonicalTransaction {
            function_id: "0xAB::nexus_mock::request_ai_service".into(),
            type_arguments: vec!["0x1::eds::EDS".into()],
            function_arguments: vec![json!("agent-7"), json!("hello")],
        };

        let payload = DirectExtensionProvider::submission_payload(&tx).unwrap();

        assert_eq!(
            payload,
            json!({
                "type": "entry_function_payload",
                "function": "0xAB::nexus_mock::request_ai_service",
                "type_arguments": ["0x1::eds::EDS"],
                "arguments": ["agent-7", "hello"]
            })
        );
    }
}

//! SDK-mediated provider
//!
//! Fallback used when no extension binding is present. The SDK wraps every
//! call in a `{payload: ...}` envelope with camelCase field names, and is the
//! only provider that serves view functions.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{ProviderFault, SdkClient};
use crate::transaction::{CanonicalTransaction, FunctionArgument, ProviderResponse};

#[derive(Serialize)]
struct SdkEnvelope<'a> {
    payload: SdkPayload<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SdkPayload<'a> {
    function: &'a str,
    function_arguments: &'a [FunctionArgument],
    type_arguments: &'a [String],
}

impl<'a> SdkEnvelope<'a> {
    fn encode(tx: &'a CanonicalTransaction) -> Result<Value, ProviderFault> {
        serde_json::to_value(SdkEnvelope {
            payload: SdkPayload {
                function: &tx.function_id,
                function_arguments: &tx.function_arguments,
                type_arguments: &tx.type_arguments,
            },
        })
        .map_err(|e| ProviderFault::Failed(format!("Failed to encode payload: {}", e)))
    }
}

/// Provider backed by the web3 SDK client
#[derive(Clone)]
pub struct SdkMediatedProvider {
    name: String,
    client: Arc<dyn SdkClient>,
}

impl SdkMediatedProvider {
    pub fn new(name: &str, client: Arc<dyn SdkClient>) -> Self {
        Self {
            name: name.to_string(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn submission_payload(tx: &CanonicalTransaction) -> Result<Value, ProviderFault> {
        SdkEnvelope::encode(tx)
    }

    pub async fn connect(&self) -> Result<ProviderResponse, ProviderFault> {
        debug!("Connecting through SDK");
        self.client.connect().await
    }

    pub async fn disconnect(&self) -> Result<(), ProviderFault> {
        self.client.disconnect().await
    }

    pub async fn sign_and_submit(&self, request: Value) -> Result<ProviderResponse, ProviderFault> {
        debug!("TX payload (SDK): {}", request);
        self.client.sign_and_submit_transaction(request).await
    }

    pub async fn view(&self, tx: &CanonicalTransaction) -> Result<Vec<Value>, ProviderFault> {
        let request = SdkEnvelope::encode(tx)?;
        debug!("View request (SDK): {}", request);
        self.client.view(request).await
    }

    /// `get_account`, falling back to `account` when it yields nothing
    pub async fn account(&self) -> Result<Option<Value>, ProviderFault> {
        match self.client.get_account().await {
            Ok(Some(account)) => return Ok(Some(account)),
            Ok(None) => {}
            Err(e) => debug!("get_account failed, trying account: {}", e),
        }
        self.client.account().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::scripted::{ScriptedReply, ScriptedSdk};
    use serde_json::json;

    const ADDR: &str = "0x3bc5719c343fcc717043df3b59051398ec357d7768c2f9dc78c89cbd1672fa79";

    #[tokio::test]
    async fn test_account_prefers_get_account() {
        let sdk = Arc::new(
            ScriptedSdk::default()
                .on_get_account(ScriptedReply::Response(json!({ "address": ADDR })))
                .on_account(ScriptedReply::Response(json!({ "address": "0xother" }))),
        );
        let provider = SdkMediatedProvider::new("sdk", sdk.clone());

        assert_eq!(provider.account().await, Ok(Some(json!({ "address": ADDR }))));
        assert_eq!(sdk.call_count("get_account"), 1);
        assert_eq!(sdk.call_count("account"), 0);
    }

    #[tokio::test]
    async fn test_account_falls_back_after_get_account() {
        let sdk = Arc::new(
            ScriptedSdk::default()
                .on_get_account(ScriptedReply::failed("not supported"))
                .on_account(ScriptedReply::Response(json!({ "address": ADDR }))),
        );
        let provider = SdkMediatedProvider::new("sdk", sdk.clone());

        assert_eq!(provider.account().await, Ok(Some(json!({ "address": ADDR }))));
        assert_eq!(sdk.call_count("account"), 1);

        // Neither lookup scripted
        let bare = SdkMediatedProvider::new("sdk", Arc::new(ScriptedSdk::default()));
        assert_eq!(bare.account().await, Ok(None));
    }

    #[test]
    fn test_sdk_envelope_shape() {
        let tx = CanonicalTransaction {
            function_id: "0xAB::nexus_mock::get_user_eds_balance".into(),
            type_arguments: vec![],
            function_arguments: vec![json!("0xuser")],
        };

        assert_eq!(
            SdkMediatedProvider::submission_payload(&tx).unwrap(),
            json!({
                "payload": {
                    "function": "0xAB::nexus_mock::get_user_eds_balance",
                    "functionArguments": ["0xuser"],
                    "typeArguments": []
                }
            })
        );
    }
}

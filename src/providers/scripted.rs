//! Scripted providers
//!
//! Replay canned provider replies and record every call. Used by the
//! `simulate` command to exercise the adapter offline, and by the tests.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{Capabilities, InjectedWallet, ProviderFault, SdkClient};
use crate::transaction::ProviderResponse;

/// Which fault a scripted reply raises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    Rejected,
    Failed,
}

/// One canned reply: either `{"fault": "...", "message": "..."}` or any
/// other JSON value returned as-is
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptedReply {
    Fault { fault: FaultKind, message: String },
    Response(Value),
}

impl ScriptedReply {
    pub fn rejected(message: &str) -> Self {
        ScriptedReply::Fault {
            fault: FaultKind::Rejected,
            message: message.to_string(),
        }
    }

    pub fn failed(message: &str) -> Self {
        ScriptedReply::Fault {
            fault: FaultKind::Failed,
            message: message.to_string(),
        }
    }

    fn into_result(self) -> Result<Value, ProviderFault> {
        match self {
            ScriptedReply::Response(value) => Ok(value),
            ScriptedReply::Fault {
                fault: FaultKind::Rejected,
                message,
            } => Err(ProviderFault::Rejected(message)),
            ScriptedReply::Fault {
                fault: FaultKind::Failed,
                message,
            } => Err(ProviderFault::Failed(message)),
        }
    }
}

/// Replies per method, consumed front to back
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletScript {
    #[serde(default)]
    pub connect: VecDeque<ScriptedReply>,
    #[serde(default)]
    pub disconnect: VecDeque<ScriptedReply>,
    #[serde(default)]
    pub submit: VecDeque<ScriptedReply>,
    #[serde(default)]
    pub account: VecDeque<ScriptedReply>,
    #[serde(default, rename = "getAccount")]
    pub get_account: VecDeque<ScriptedReply>,
    #[serde(default)]
    pub view: VecDeque<ScriptedReply>,
}

/// A recorded provider call
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedCall {
    pub method: &'static str,
    pub payload: Option<Value>,
}

#[derive(Default)]
struct ScriptState {
    script: Mutex<WalletScript>,
    calls: Mutex<Vec<ScriptedCall>>,
}

impl ScriptState {
    fn new(script: WalletScript) -> Self {
        Self {
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, method: &'static str, payload: Option<Value>) {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.push(ScriptedCall { method, payload });
    }

    fn next(&self, pick: fn(&mut WalletScript) -> &mut VecDeque<ScriptedReply>) -> Option<ScriptedReply> {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        pick(&mut script).pop_front()
    }

    fn push(&self, pick: fn(&mut WalletScript) -> &mut VecDeque<ScriptedReply>, reply: ScriptedReply) {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        pick(&mut script).push_back(reply);
    }

    fn calls(&self) -> Vec<ScriptedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn connect(&self) -> Result<ProviderResponse, ProviderFault> {
        self.record("connect", None);
        self.next(|s| &mut s.connect)
            .ok_or_else(|| ProviderFault::Failed("No scripted reply for connect".into()))?
            .into_result()
    }

    async fn disconnect(&self) -> Result<(), ProviderFault> {
        self.record("disconnect", None);
        match self.next(|s| &mut s.disconnect) {
            Some(reply) => reply.into_result().map(|_| ()),
            None => Ok(()),
        }
    }

    async fn submit(&self, payload: Value) -> Result<ProviderResponse, ProviderFault> {
        self.record("sign_and_submit_transaction", Some(payload));
        self.next(|s| &mut s.submit)
            .ok_or_else(|| ProviderFault::Failed("No scripted reply for submit".into()))?
            .into_result()
    }

    async fn account(&self) -> Result<Option<Value>, ProviderFault> {
        self.record("account", None);
        match self.next(|s| &mut s.account) {
            Some(reply) => reply.into_result().map(Some),
            None => Ok(None),
        }
    }

    async fn get_account(&self) -> Result<Option<Value>, ProviderFault> {
        self.record("get_account", None);
        match self.next(|s| &mut s.get_account) {
            Some(reply) => reply.into_result().map(Some),
            None => Ok(None),
        }
    }

    async fn view(&self, request: Value) -> Result<Vec<Value>, ProviderFault> {
        self.record("view", Some(request));
        let value = self
            .next(|s| &mut s.view)
            .ok_or_else(|| ProviderFault::Failed("No scripted reply for view".into()))?
            .into_result()?;
        match value {
            Value::Array(values) => Ok(values),
            other => Ok(vec![other]),
        }
    }
}

/// Scripted browser extension
#[derive(Default)]
pub struct ScriptedWallet {
    state: ScriptState,
    capabilities: Capabilities,
}

impl ScriptedWallet {
    pub fn new(script: WalletScript) -> Self {
        Self {
            state: ScriptState::new(script),
            capabilities: Capabilities::full(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn on_connect(self, reply: ScriptedReply) -> Self {
        self.state.push(|s| &mut s.connect, reply);
        self
    }

    pub fn on_disconnect(self, reply: ScriptedReply) -> Self {
        self.state.push(|s| &mut s.disconnect, reply);
        self
    }

    pub fn on_submit(self, reply: ScriptedReply) -> Self {
        self.state.push(|s| &mut s.submit, reply);
        self
    }

    pub fn on_account(self, reply: ScriptedReply) -> Self {
        self.state.push(|s| &mut s.account, reply);
        self
    }

    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.state.calls()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }
}

#[async_trait]
impl InjectedWallet for ScriptedWallet {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn connect(&self) -> Result<ProviderResponse, ProviderFault> {
        self.state.connect().await
    }

    async fn disconnect(&self) -> Result<(), ProviderFault> {
        self.state.disconnect().await
    }

    async fn sign_and_submit_transaction(&self, payload: Value) -> Result<ProviderResponse, ProviderFault> {
        self.state.submit(payload).await
    }

    async fn account(&self) -> Result<Option<Value>, ProviderFault> {
        self.state.account().await
    }
}

/// Scripted SDK client
#[derive(Default)]
pub struct ScriptedSdk {
    state: ScriptState,
}

impl ScriptedSdk {
    pub fn new(script: WalletScript) -> Self {
        Self {
            state: ScriptState::new(script),
        }
    }

    pub fn on_connect(self, reply: ScriptedReply) -> Self {
        self.state.push(|s| &mut s.connect, reply);
        self
    }

    pub fn on_submit(self, reply: ScriptedReply) -> Self {
        self.state.push(|s| &mut s.submit, reply);
        self
    }

    pub fn on_account(self, reply: ScriptedReply) -> Self {
        self.state.push(|s| &mut s.account, reply);
        self
    }

    pub fn on_get_account(self, reply: ScriptedReply) -> Self {
        self.state.push(|s| &mut s.get_account, reply);
        self
    }

    pub fn on_view(self, reply: ScriptedReply) -> Self {
        self.state.push(|s| &mut s.view, reply);
        self
    }

    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.state.calls()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }
}

#[async_trait]
impl SdkClient for ScriptedSdk {
    async fn connect(&self) -> Result<ProviderResponse, ProviderFault> {
        self.state.connect().await
    }

    async fn disconnect(&self) -> Result<(), ProviderFault> {
        self.state.disconnect().await
    }

    async fn sign_and_submit_transaction(&self, request: Value) -> Result<ProviderResponse, ProviderFault> {
        self.state.submit(request).await
    }

    async fn view(&self, request: Value) -> Result<Vec<Value>, ProviderFault> {
        self.state.view(request).await
    }

    async fn get_account(&self) -> Result<Option<Value>, ProviderFault> {
        self.state.get_account().await
    }

    async fn account(&self) -> Result<Option<Value>, ProviderFault> {
        self.state.account().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_deserialization() {
        let fault: ScriptedReply =
            serde_json::from_value(json!({ "fault": "rejected", "message": "no" })).unwrap();
        assert_eq!(fault, ScriptedReply::rejected("no"));

        let plain: ScriptedReply = serde_json::from_value(json!({ "hash": "0x1" })).unwrap();
        assert_eq!(plain, ScriptedReply::Response(json!({ "hash": "0x1" })));
    }

    #[tokio::test]
    async fn test_replies_consumed_in_order() {
        let wallet = ScriptedWallet::default()
            .on_submit(ScriptedReply::Response(json!("0x1")))
            .on_submit(ScriptedReply::failed("network down"));

        assert_eq!(wallet.sign_and_submit_transaction(json!({})).await, Ok(json!("0x1")));
        assert_eq!(
            wallet.sign_and_submit_transaction(json!({})).await,
            Err(ProviderFault::Failed("network down".into()))
        );
        assert!(wallet.sign_and_submit_transaction(json!({})).await.is_err());
        assert_eq!(wallet.call_count("sign_and_submit_transaction"), 3);
    }
}

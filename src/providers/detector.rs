//! Provider detection
//!
//! Extensions inject their binding whenever they finish loading, which may be
//! after the page script starts. Detection is therefore re-runnable: every
//! [`ProviderDetector::scan`] rebuilds the registry from scratch, and
//! [`ProviderDetector::scan_with_retry`] adds a bounded delayed re-check.
//!
//! The SDK client is always listed last when attached, but only injected
//! extensions count as "detected" and stop the re-check.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info};

use super::{
    DirectExtensionProvider, InjectedWallet, Provider, ProviderKind, SdkClient,
    SdkMediatedProvider,
};

/// Global bindings inspected, in preference order
pub const BINDING_NAMES: [&str; 2] = ["endless", "aptos"];

/// Registry name of the SDK client entry
pub const SDK_ENTRY_NAME: &str = "sdk";

/// Lookup of injected global bindings
pub trait InjectionSource: Send + Sync {
    fn binding(&self, name: &str) -> Option<Arc<dyn InjectedWallet>>;
}

/// In-process table of injected bindings
#[derive(Default)]
pub struct InjectedGlobals {
    bindings: RwLock<HashMap<String, Arc<dyn InjectedWallet>>>,
}

impl InjectedGlobals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject (or replace) a binding
    pub fn inject(&self, name: &str, wallet: Arc<dyn InjectedWallet>) {
        let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
        bindings.insert(name.to_string(), wallet);
    }

    pub fn remove(&self, name: &str) {
        let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
        bindings.remove(name);
    }
}

impl InjectionSource for InjectedGlobals {
    fn binding(&self, name: &str) -> Option<Arc<dyn InjectedWallet>> {
        let bindings = self.bindings.read().unwrap_or_else(|e| e.into_inner());
        bindings.get(name).cloned()
    }
}

/// A detected provider and the name it was found under
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub name: String,
    pub provider: Provider,
}

/// Providers found by one detection pass, in preference order
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
}

impl ProviderRegistry {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an injected extension was found
    pub fn has_extension(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.provider.kind() == ProviderKind::DirectExtension)
    }

    /// Highest-priority provider
    pub fn preferred(&self) -> Option<&Provider> {
        self.entries.first().map(|e| &e.provider)
    }

    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.provider)
    }

    /// First provider able to serve view calls
    pub fn view_provider(&self) -> Option<&Provider> {
        self.entries
            .iter()
            .map(|e| &e.provider)
            .find(|p| p.supports_view())
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

/// Bounded re-check policy for late extension injection
#[derive(Debug, Clone, Copy)]
pub struct DetectionPolicy {
    /// Wait before each re-check
    pub retry_delay: Duration,
    /// Re-checks after the first empty scan
    pub max_retries: u32,
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(500),
            max_retries: 1,
        }
    }
}

/// Finds the wallet providers currently available
pub struct ProviderDetector {
    source: Arc<dyn InjectionSource>,
    sdk: Option<Arc<dyn SdkClient>>,
    policy: DetectionPolicy,
    last: ProviderRegistry,
}

impl ProviderDetector {
    pub fn new(source: Arc<dyn InjectionSource>) -> Self {
        Self {
            source,
            sdk: None,
            policy: DetectionPolicy::default(),
            last: ProviderRegistry::default(),
        }
    }

    /// Attach the SDK client as the lowest-priority provider
    pub fn with_sdk(mut self, sdk: Arc<dyn SdkClient>) -> Self {
        self.sdk = Some(sdk);
        self
    }

    pub fn with_policy(mut self, policy: DetectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rebuild the registry from the current bindings
    pub fn scan(&mut self) -> ProviderRegistry {
        let registry = self.lookup();
        debug!("Provider scan: {:?}", registry.names());
        self.last = registry.clone();
        registry
    }

    /// Current providers, leaving the cached detection result alone
    pub fn lookup(&self) -> ProviderRegistry {
        let mut entries = Vec::new();

        for name in BINDING_NAMES {
            let Some(wallet) = self.source.binding(name) else {
                continue;
            };
            if !wallet.capabilities().is_usable() {
                debug!("window.{} present but cannot connect and submit", name);
                continue;
            }
            entries.push(RegistryEntry {
                name: name.to_string(),
                provider: Provider::DirectExtension(DirectExtensionProvider::new(name, wallet)),
            });
        }

        if let Some(sdk) = &self.sdk {
            entries.push(RegistryEntry {
                name: SDK_ENTRY_NAME.to_string(),
                provider: Provider::SdkMediated(SdkMediatedProvider::new(
                    SDK_ENTRY_NAME,
                    sdk.clone(),
                )),
            });
        }

        ProviderRegistry { entries }
    }

    /// Scan, then re-check after a fixed delay while no extension is found
    pub async fn scan_with_retry(&mut self) -> ProviderRegistry {
        let mut registry = self.scan();
        let mut attempt = 0;

        while !registry.has_extension() && attempt < self.policy.max_retries {
            attempt += 1;
            debug!(
                "No extension yet, re-checking in {:?} ({}/{})",
                self.policy.retry_delay, attempt, self.policy.max_retries
            );
            tokio::time::sleep(self.policy.retry_delay).await;
            registry = self.scan();
        }

        if !registry.has_extension() {
            info!("No wallet extension detected");
        } else {
            info!("Wallet providers detected: {:?}", registry.names());
        }
        registry
    }

    /// Whether the last scan found an injected extension
    pub fn detected(&self) -> bool {
        self.last.has_extension()
    }
}

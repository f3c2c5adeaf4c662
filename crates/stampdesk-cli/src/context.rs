//! Wiring shared by every subcommand: credential store, session, gateway
//! and flow.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use stampdesk_client::{
    CredentialStore, FallbackCredentialStore, FileCredentialStore, GatewayConfig, HttpGateway,
    MemoryCredentialStore, MockStampGateway, SessionManager, StampGateway,
};
use stampdesk_state::{ScanFlow, StaticPermissions};

/// Simulated round trip of the `--mock` backend.
const MOCK_LATENCY: Duration = Duration::from_millis(300);

/// Global options that decide how the context is built.
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Overrides `STAMPDESK_API_BASE_URL`.
    pub base_url: Option<String>,
    /// Credential file.
    pub store: PathBuf,
    /// Use the in-memory demo backend instead of the live service.
    pub mock: bool,
}

/// Everything a subcommand needs.
#[derive(Debug)]
pub struct AppContext {
    /// The scan flow, wired to the selected gateway.
    pub flow: ScanFlow,
    /// Whether a saved session was picked up at startup.
    pub restored: bool,
    /// Where the token is persisted.
    pub store_path: PathBuf,
}

impl AppContext {
    /// Build the context and restore any saved session.
    ///
    /// The credential file is backed by an in-memory store, so a read-only
    /// or missing directory degrades persistence but never blocks startup.
    pub async fn build(opts: &ContextOptions) -> Result<Self> {
        let store: Arc<dyn CredentialStore> = Arc::new(FallbackCredentialStore::new(
            Arc::new(FileCredentialStore::new(&opts.store)),
            Arc::new(MemoryCredentialStore::new()),
        ));
        let session = Arc::new(SessionManager::new(store));
        let restored = session.restore().await;

        let gateway: Arc<dyn StampGateway> = if opts.mock {
            Arc::new(MockStampGateway::with_demo_data(session.clone()).with_latency(MOCK_LATENCY))
        } else {
            let config = gateway_config(opts.base_url.as_deref())?;
            tracing::debug!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "using live stamp service");
            Arc::new(HttpGateway::new(config, session.clone()).context("failed to create HTTP gateway")?)
        };

        // A terminal has no camera; payloads are typed in, so permission is
        // always granted.
        let flow = ScanFlow::new(gateway, session, Arc::new(StaticPermissions::granted()));
        Ok(Self {
            flow,
            restored,
            store_path: opts.store.clone(),
        })
    }
}

/// Environment configuration with an optional base URL override.
pub fn gateway_config(base_url: Option<&str>) -> Result<GatewayConfig> {
    let env = GatewayConfig::from_env().context("invalid stamp service configuration")?;
    match base_url {
        Some(url) => Ok(GatewayConfig::new(url)
            .with_context(|| format!("invalid --base-url {url:?}"))?
            .with_timeout_secs(env.timeout_secs)),
        None => Ok(env),
    }
}

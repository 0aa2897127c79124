//! Gateway endpoint configuration
//!
//! Resolution order:
//! 1. `GATEWAY_URL` env var - highest priority
//! 2. `gateway_url` from the config file
//! 3. Public gateway of the configured network - rate limited, for testing
//!
//! # Examples
//!
//! ```bash
//! # Point at a private gateway
//! export GATEWAY_URL="http://10.0.0.5:8080"
//!
//! # No env var and no gateway_url: public gateway for the network
//! ```

use crate::config::Network;
use crate::{Error, Result};
use url::Url;

/// Environment variable names
pub mod env_vars {
    pub const GATEWAY_URL: &str = "GATEWAY_URL";
}

/// Public gateways (rate limited, for testing only)
mod public_gateways {
    pub const MAINNET: &str = "https://gateway.multiversx.com";
    pub const TESTNET: &str = "https://testnet-gateway.multiversx.com";
    pub const DEVNET: &str = "https://devnet-gateway.multiversx.com";
}

/// Where the gateway URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewaySource {
    Env,
    ConfigFile,
    PublicDefault,
}

/// Resolved gateway endpoint
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    url: Url,
    source: GatewaySource,
}

impl GatewayConfig {
    /// Resolve the gateway using the process environment
    pub fn from_env(network: Network, configured: Option<&str>) -> Result<Self> {
        let env_url = std::env::var(env_vars::GATEWAY_URL).ok();
        Self::resolve(env_url.as_deref(), configured, network)
    }

    /// Resolve from explicit inputs, highest priority first
    pub fn resolve(env_url: Option<&str>, configured: Option<&str>, network: Network) -> Result<Self> {
        let (raw, source) = if let Some(url) = env_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!("Using {} for the gateway", env_vars::GATEWAY_URL);
            (url, GatewaySource::Env)
        } else if let Some(url) = configured {
            (url, GatewaySource::ConfigFile)
        } else {
            tracing::warn!(
                network = network.name(),
                "No gateway configured, using public gateway (rate limited)"
            );
            (public_gateway(network), GatewaySource::PublicDefault)
        };

        let url = Url::parse(raw.trim())
            .map_err(|e| Error::Config(format!("invalid gateway URL {:?}: {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "gateway URL must be http or https, got {}",
                url
            )));
        }

        Ok(Self { url, source })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn source(&self) -> GatewaySource {
        self.source
    }
}

fn public_gateway(network: Network) -> &'static str {
    match network {
        Network::Mainnet => public_gateways::MAINNET,
        Network::Testnet => public_gateways::TESTNET,
        Network::Devnet => public_gateways::DEVNET,
    }
}

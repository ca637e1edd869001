// src/config.rs
//! Environment configuration for the gateway.
//!
//! All settings come from environment variables (a `.env` file is honored
//! via dotenv), loaded once at startup into a [`GatewayConfig`] that is
//! passed to the components needing it.
//!
//! ## Environment Variables
//! - `PROVIDER_ID`: the provider's on-chain MSA id (positive integer)
//! - `PROVIDER_KEY_SEED`: hex-encoded 32-byte Ed25519 seed for the
//!   provider's assertion-method key
//! - `PROVIDER_KEY_INDEX`: (optional) index of that key in the provider's
//!   itemized key list, default 0
//! - `FREQUENCY_NETWORK`: one of `local`, `testnet`, `mainnet`
//! - `PUBLIC_FOLLOWS_SCHEMA_ID`: (optional) override of the follow-graph
//!   schema id
//! - `ASSERTION_METHOD_SCHEMA_ID`: (optional) override of the
//!   assertion-method key schema id

use crate::error::ConfigError;
use dotenv::dotenv;
use std::str::FromStr;

/// The chain network the gateway fronts.
///
/// Schema ids differ per network; local chains assign ids at genesis, so
/// the local defaults mirror testnet and are expected to be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Local,
    Testnet,
    Mainnet,
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Network::Local),
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(format!(
                "'{}' is not one of: \"local\", \"testnet\", \"mainnet\"",
                other
            )),
        }
    }
}

/// Process-lifetime gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// The provider's MSA id, the issuer of all interaction tickets.
    pub provider_id: u64,

    /// Which chain network schema ids are resolved against.
    pub network: Network,

    /// Ed25519 seed of the provider's assertion-method signing key.
    pub provider_key_seed: [u8; 32],

    /// Index of the signing key in the provider's itemized key list.
    pub signing_key_index: u32,

    /// Schema id of the paginated public-follows storage.
    pub public_follows_schema_id: u16,

    /// Schema id of the itemized assertion-method key storage.
    pub assertion_method_schema_id: u16,
}

impl GatewayConfig {
    /// Loads configuration from the environment.
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load environment variables from .env file
        dotenv().ok();

        let provider_id = parse_var::<u64>("PROVIDER_ID")?;
        let network = parse_var::<Network>("FREQUENCY_NETWORK")?;
        let provider_key_seed = parse_seed("PROVIDER_KEY_SEED")?;

        let signing_key_index = parse_var_or("PROVIDER_KEY_INDEX", 0u32)?;
        let public_follows_schema_id =
            parse_var_or("PUBLIC_FOLLOWS_SCHEMA_ID", public_follows_schema_id(network))?;
        let assertion_method_schema_id = parse_var_or(
            "ASSERTION_METHOD_SCHEMA_ID",
            assertion_method_schema_id(network),
        )?;

        Ok(GatewayConfig {
            provider_id,
            network,
            provider_key_seed,
            signing_key_index,
            public_follows_schema_id,
            assertion_method_schema_id,
        })
    }

    /// The provider's DSNP user URI, used as credential issuer.
    pub fn provider_uri(&self) -> String {
        format!("dsnp://{}", self.provider_id)
    }
}

/// Default schema id of the public-follows paginated storage.
pub fn public_follows_schema_id(network: Network) -> u16 {
    match network {
        Network::Mainnet => 8,
        Network::Testnet | Network::Local => 13,
    }
}

/// Default schema id of the assertion-method itemized key storage.
pub fn assertion_method_schema_id(network: Network) -> u16 {
    match network {
        Network::Mainnet => 11,
        Network::Testnet | Network::Local => 18,
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    required_var(name)?
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidVar {
            var: name,
            reason: e.to_string(),
        })
}

fn parse_var_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidVar {
            var: name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_seed(name: &'static str) -> Result<[u8; 32], ConfigError> {
    let raw = required_var(name)?;
    let bytes = hex::decode(raw.trim_start_matches("0x")).map_err(|e| ConfigError::InvalidVar {
        var: name,
        reason: e.to_string(),
    })?;
    bytes.try_into().map_err(|_| ConfigError::InvalidVar {
        var: name,
        reason: "must be 32 bytes of hex".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parses_known_names() {
        assert_eq!("local".parse::<Network>().unwrap(), Network::Local);
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert!("rococo".parse::<Network>().is_err());
    }

    #[test]
    fn schema_ids_differ_per_network() {
        assert_eq!(public_follows_schema_id(Network::Mainnet), 8);
        assert_eq!(public_follows_schema_id(Network::Testnet), 13);
        assert_ne!(
            assertion_method_schema_id(Network::Mainnet),
            public_follows_schema_id(Network::Mainnet)
        );
    }
}

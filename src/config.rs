//! Configuration of the mint page.
//!
//! The values are the ones a static site would bake in at build time: which
//! network and contract to talk to, the price, and the display strings.
//!
//! ```
//! use evm_mint_connector::MintConfig;
//!
//! let config = MintConfig::from_vars([
//!     ("MINT_NETWORK_ID", "137"),
//!     ("MINT_CONTRACT_ADDRESS", "0x00000000000000000000000000000000000c0ffe"),
//!     ("MINT_UNIT_COST", "50000000000000000"),
//!     ("MINT_GAS_LIMIT", "285000"),
//!     ("MINT_MAX_SUPPLY", "10000"),
//!     ("MINT_NAME", "Crabs"),
//!     ("MINT_SYMBOL", "CRAB"),
//!     ("MINT_CHAIN", "MATIC"),
//!     ("HOME", "/root"),
//! ])?;
//! assert_eq!(config.display.price_line(config.unit_cost), "0.05 MATIC per 1 NFT");
//! # Ok::<(), evm_mint_connector::error::ConfigError>(())
//! ```

use crate::{
    error::ConfigError,
    ethereum::{Address, ChainId, Wei},
};
use serde::Deserialize;
use std::time::Duration;

/// prefix of the environment-style keys accepted by [`MintConfig::from_vars`]
pub const VAR_PREFIX: &str = "MINT_";

const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MintConfig {
    /// the chain the contract lives on, the wallet must be connected to it
    pub network_id: ChainId,
    pub contract_address: Address,
    /// price of one token, in wei
    pub unit_cost: Wei,
    /// gas limit of minting one token
    #[serde(deserialize_with = "de::u64_or_string")]
    pub gas_limit: u64,
    #[serde(deserialize_with = "de::u64_or_string")]
    pub max_supply: u64,
    /// public JSON-RPC endpoint used to read the supply without a wallet
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(
        default = "default_poll_interval_ms",
        deserialize_with = "de::u64_or_string"
    )]
    pub poll_interval_ms: u64,
    #[serde(flatten)]
    pub display: DisplayConfig,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// strings of the presentational shell
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    /// the collection's name
    pub name: String,
    /// the token symbol used in the success message
    pub symbol: String,
    /// label of the native token (`"MATIC"`, `"ETH"`...)
    pub chain: String,
    /// the unit price as it should be displayed, defaults to the unit cost in
    /// ether
    #[serde(default)]
    pub display_cost: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub discord_url: Option<String>,
    #[serde(default)]
    pub opensea_url: Option<String>,
}

impl DisplayConfig {
    /// `"0.05 MATIC per 1 NFT"`
    pub fn price_line(&self, unit_cost: Wei) -> String {
        let cost = self
            .display_cost
            .clone()
            .unwrap_or_else(|| unit_cost.to_ether());
        format!("{cost} {} per 1 NFT", self.chain)
    }
}

impl MintConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// read the configuration from a JS object, e.g. one the hosting page
    /// embedded at build time
    pub fn from_js(value: wasm_bindgen::JsValue) -> Result<Self, ConfigError> {
        let config: Self = serde_wasm_bindgen::from_value(value)
            .map_err(|error| ConfigError::Js(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the configuration from environment-style `MINT_*` pairs.
    ///
    /// Keys without the prefix and empty values are ignored, so this can be
    /// fed `std::env::vars()` directly.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let object = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.as_ref().strip_prefix(VAR_PREFIX)?.to_ascii_lowercase();
                let value = value.as_ref();
                (!value.is_empty()).then(|| (key, serde_json::Value::from(value)))
            })
            .collect::<serde_json::Map<_, _>>();

        let config: Self = serde_json::from_value(serde_json::Value::Object(object))?;
        config.validate()?;
        Ok(config)
    }

    /// A zero `unit_cost` is a free mint and is accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if self.gas_limit == 0 {
            return invalid("gas_limit", "must not be zero");
        }
        if self.max_supply == 0 {
            return invalid("max_supply", "must not be zero");
        }
        if self.poll_interval_ms == 0 {
            return invalid("poll_interval_ms", "must not be zero");
        }
        if self.display.name.trim().is_empty() {
            return invalid("name", "must not be empty");
        }
        if self.display.symbol.trim().is_empty() {
            return invalid("symbol", "must not be empty");
        }
        if let Some(url) = &self.rpc_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return invalid("rpc_url", "must be an http(s) URL");
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

mod de {
    use serde::Deserializer;

    /// environment-style values are strings, JSON ones are numbers
    pub fn u64_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;
        impl serde::de::Visitor<'_> for Visitor {
            type Value = u64;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "Expecting a positive integer")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(v)
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v).map_err(|_| E::custom(format!("negative value {v}")))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.fract() == 0.0 && v >= 0.0 && v <= u64::MAX as f64 {
                    Ok(v as u64)
                } else {
                    Err(E::custom(format!("invalid integer {v}")))
                }
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.trim()
                    .parse()
                    .map_err(|_| E::custom(format!("invalid integer `{v}'")))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn json_config() -> serde_json::Value {
        json! {{
            "network_id": 137,
            "contract_address": "0x00000000000000000000000000000000000c0ffe",
            "unit_cost": "50000000000000000",
            "gas_limit": 285000,
            "max_supply": 10000,
            "name": "Crabs",
            "symbol": "CRAB",
            "chain": "MATIC",
            "display_cost": "0.05",
            "twitter_url": "https://twitter.com/crabs",
        }}
    }

    #[test]
    fn from_json() -> anyhow::Result<()> {
        let config = MintConfig::from_json(&json_config().to_string())?;

        assert_eq!(config.network_id, ChainId(137));
        assert_eq!(config.unit_cost, Wei(50_000_000_000_000_000));
        assert_eq!(config.gas_limit, 285_000);
        assert_eq!(config.max_supply, 10_000);
        assert_eq!(config.rpc_url, None);
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.display.name, "Crabs");
        assert_eq!(
            config.display.twitter_url.as_deref(),
            Some("https://twitter.com/crabs")
        );
        assert_eq!(config.display.discord_url, None);
        Ok(())
    }

    #[test]
    fn from_vars() -> anyhow::Result<()> {
        let config = MintConfig::from_vars([
            ("MINT_NETWORK_ID", "80001"),
            ("MINT_CONTRACT_ADDRESS", "0x00000000000000000000000000000000000c0ffe"),
            ("MINT_UNIT_COST", "1000"),
            ("MINT_GAS_LIMIT", "285000"),
            ("MINT_MAX_SUPPLY", "500"),
            ("MINT_RPC_URL", "https://rpc-mumbai.example.org"),
            ("MINT_POLL_INTERVAL_MS", "500"),
            ("MINT_NAME", "Crabs"),
            ("MINT_SYMBOL", "CRAB"),
            ("MINT_CHAIN", "MATIC"),
            ("MINT_DISCORD_URL", ""),
            ("PATH", "/usr/bin"),
        ])?;

        assert_eq!(config.network_id, ChainId(80001));
        assert_eq!(config.unit_cost, Wei(1000));
        assert_eq!(config.max_supply, 500);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(
            config.rpc_url.as_deref(),
            Some("https://rpc-mumbai.example.org")
        );
        assert_eq!(config.display.discord_url, None);
        Ok(())
    }

    #[test]
    fn missing_field() {
        let mut config = json_config();
        config.as_object_mut().unwrap().remove("contract_address");
        assert!(matches!(
            MintConfig::from_json(&config.to_string()),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn rejects_zero_gas_limit() {
        let mut config = json_config();
        config["gas_limit"] = json!("0");
        assert!(matches!(
            MintConfig::from_json(&config.to_string()),
            Err(ConfigError::Invalid {
                field: "gas_limit",
                ..
            })
        ));
    }

    #[test]
    fn free_mint() -> anyhow::Result<()> {
        let mut config = json_config();
        config["unit_cost"] = json!(0);
        config.as_object_mut().unwrap().remove("display_cost");

        let config = MintConfig::from_json(&config.to_string())?;
        assert_eq!(config.unit_cost, Wei::ZERO);
        assert_eq!(config.display.price_line(config.unit_cost), "0 MATIC per 1 NFT");
        Ok(())
    }

    #[test]
    fn rejects_non_http_rpc() {
        let mut config = json_config();
        config["rpc_url"] = json!("ws://localhost:8546");
        assert!(matches!(
            MintConfig::from_json(&config.to_string()),
            Err(ConfigError::Invalid {
                field: "rpc_url",
                ..
            })
        ));
    }

    #[test]
    fn price_line() {
        let config = MintConfig::from_json(&json_config().to_string()).unwrap();
        assert_eq!(
            config.display.price_line(config.unit_cost),
            "0.05 MATIC per 1 NFT"
        );

        let display = DisplayConfig {
            display_cost: None,
            ..config.display
        };
        assert_eq!(
            display.price_line(Wei(20_000_000_000_000_000)),
            "0.02 MATIC per 1 NFT"
        );
    }
}

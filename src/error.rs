//! Errors reported by the wallet provider and by the mint page.

use crate::ethereum::{ChainId, TxHash};
use wasm_bindgen::JsValue;

/// Error codes of EIP-1193 providers, plus the JSON-RPC ones (EIP-1474)
/// that wallets forward from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
pub enum ProviderErrorCode {
    #[error("The user rejected the request.")]
    UserRejectedRequest,
    /// The page needs to request the accounts again.
    #[error("The requested method and/or account has not been authorized by the user.")]
    Unauthorized,
    #[error("The provider does not support the requested method.")]
    UnsupportedMethod,
    #[error("The provider is disconnected from all chains.")]
    Disconnected,
    #[error("The provider is not connected to the requested chain.")]
    ChainDisconnected,
    #[error("Unrecognized chain.")]
    UnrecognizedChain,
    #[error("Invalid JSON.")]
    ParseError,
    #[error("Invalid request.")]
    InvalidRequest,
    #[error("Method not found.")]
    MethodNotFound,
    #[error("Invalid params.")]
    InvalidParams,
    #[error("Internal error.")]
    InternalError,
    #[error("Invalid input.")]
    InvalidInput,
    #[error("Resource not found.")]
    ResourceNotFound,
    #[error("Resource unavailable.")]
    ResourceUnavailable,
    #[error("Transaction rejected.")]
    TransactionRejected,
    #[error("Limit exceeded.")]
    LimitExceeded,
    #[error("Unknown error code `{0}'")]
    Unknown(i64),
}

impl From<i64> for ProviderErrorCode {
    fn from(code: i64) -> Self {
        match code {
            4001 => Self::UserRejectedRequest,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            4901 => Self::ChainDisconnected,
            4902 => Self::UnrecognizedChain,
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32000 => Self::InvalidInput,
            -32001 => Self::ResourceNotFound,
            -32002 => Self::ResourceUnavailable,
            -32003 => Self::TransactionRejected,
            -32005 => Self::LimitExceeded,
            unknown => Self::Unknown(unknown),
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error, serde::Deserialize,
)]
#[error("{code} {message}")]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    #[serde(default)]
    pub message: String,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// decode the error a provider's promise was rejected with
    ///
    /// Providers reject with `{ code, message }` objects. Anything else
    /// becomes an [`ProviderErrorCode::InternalError`].
    pub fn from_js(error: JsValue) -> Self {
        serde_wasm_bindgen::from_value(error.clone()).unwrap_or_else(|decode_error| {
            Self::internal(format!(
                "Couldn't decode the error content: {decode_error} ({error:?})"
            ))
        })
    }

    /// the user declined in the wallet's popup
    pub fn is_user_rejection(&self) -> bool {
        self.code == ProviderErrorCode::UserRejectedRequest
    }
}

/// Failures of the connect and mint flows.
///
/// The `Display` of [`MintError::ProviderMissing`] and
/// [`MintError::WrongNetwork`] is the banner text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MintError {
    #[error("Please install MetaMask.")]
    ProviderMissing,
    #[error("Change the network to {expected}.")]
    WrongNetwork { expected: ChainId, actual: ChainId },
    #[error("Failed to connect the wallet: {0}")]
    ConnectionFailed(#[source] ProviderError),
    #[error("The mint transaction was rejected: {0}")]
    TransactionRejected(#[source] ProviderError),
    #[error("Buying is disabled until a wallet is connected to the right network")]
    BuyDisabled,
    #[error("A mint transaction is already in progress")]
    MintInFlight,
    #[error("The total cost or gas limit of {quantity} tokens does not fit")]
    Overflow { quantity: u32 },
}

impl MintError {
    pub(crate) fn reverted(hash: &TxHash) -> Self {
        Self::TransactionRejected(ProviderError::new(
            ProviderErrorCode::TransactionRejected,
            format!("transaction {hash} reverted"),
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration object: {0}")]
    Js(String),
    #[error("Invalid configuration: `{field}' {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl<'de> serde::Deserialize<'de> for ProviderErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;
        impl serde::de::Visitor<'_> for Visitor {
            type Value = ProviderErrorCode;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "Expecting an integer ProviderErrorCode")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ProviderErrorCode::from(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(v)
                    .map(ProviderErrorCode::from)
                    .map_err(|_| E::custom(format!("error code out of range: {v}")))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.fract() == 0.0 {
                    Ok(ProviderErrorCode::from(v as i64))
                } else {
                    Err(E::custom(format!("error code is not an integer: {v}")))
                }
            }
        }

        deserializer.deserialize_i64(Visitor)
    }
}

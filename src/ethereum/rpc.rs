//! Request and response shapes of the JSON-RPC methods the page uses.

use super::{Address, TxHash, Wei, abi, parse_quantity, to_quantity};
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};

/// parameters of `eth_sendTransaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: String,
    pub gas: String,
    pub data: String,
}

impl TransactionRequest {
    /// `mint(quantity)` paying `value` with at most `gas` gas
    pub fn mint(from: Address, contract: Address, quantity: u32, value: Wei, gas: u64) -> Self {
        Self {
            from,
            to: contract,
            value: value.to_quantity(),
            gas: to_quantity(gas),
            data: abi::encode_mint(quantity),
        }
    }
}

/// parameters of `eth_call`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRequest {
    pub to: Address,
    pub data: String,
}

impl CallRequest {
    pub fn total_supply(contract: Address) -> Self {
        Self {
            to: contract,
            data: abi::encode_total_supply(),
        }
    }
}

/// the part of `eth_getTransactionReceipt`'s result we care about
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
    /// `0x1` on success, `0x0` if the transaction reverted. Absent on
    /// pre-byzantium chains.
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        match self.status.as_deref() {
            Some(status) => parse_quantity(status).is_ok_and(|status| status == 1),
            None => true,
        }
    }

    pub fn block_number(&self) -> Option<u128> {
        self.block_number
            .as_deref()
            .and_then(|n| parse_quantity(n).ok())
    }
}

/// EIP-1193 `request()` arguments, also the body of a JSON-RPC call once
/// wrapped in a [`JsonRpcRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestArguments {
    pub method: &'static str,
    pub params: serde_json::Value,
}

impl RequestArguments {
    pub fn new(method: &'static str, params: serde_json::Value) -> Self {
        Self { method, params }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    #[serde(flatten)]
    pub arguments: RequestArguments,
}

impl JsonRpcRequest {
    pub fn new(id: u64, arguments: RequestArguments) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub id: Option<u64>,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<ProviderError>,
}

impl<T> JsonRpcResponse<T> {
    pub fn into_result(self) -> Result<Option<T>, ProviderError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

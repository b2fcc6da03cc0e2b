//! JSON-RPC over HTTP, for reads that do not need the wallet.

use crate::{
    client::ChainReader,
    error::ProviderError,
    ethereum::{
        Address, abi,
        rpc::{CallRequest, JsonRpcRequest, JsonRpcResponse, RequestArguments},
    },
};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::cell::Cell;

/// Read-only access to the chain through a public JSON-RPC endpoint.
///
/// Lets the page show the supply before (or without) a wallet connection.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    url: String,
    next_id: Cell<u64>,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            next_id: Cell::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn request<T>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        let id = self.next_id.replace(self.next_id.get() + 1);
        let body = JsonRpcRequest::new(id, RequestArguments::new(method, params));
        debug!("{} <- {method} #{id}", self.url);

        let response = gloo_net::http::Request::post(&self.url)
            .json(&body)
            .map_err(|error| {
                ProviderError::internal(format!("Couldn't encode the `{method}' request: {error}"))
            })?
            .send()
            .await
            .map_err(|error| ProviderError::internal(format!("`{method}' failed: {error}")))?;

        if !response.ok() {
            return Err(ProviderError::internal(format!(
                "`{method}' failed with HTTP status {}",
                response.status()
            )));
        }

        let response: JsonRpcResponse<T> = response.json().await.map_err(|error| {
            ProviderError::internal(format!("Couldn't decode the result of `{method}': {error}"))
        })?;
        response.into_result()?.ok_or_else(|| {
            ProviderError::internal(format!("`{method}' returned no result"))
        })
    }
}

impl ChainReader for HttpProvider {
    async fn total_supply(&self, contract: &Address) -> Result<u128, ProviderError> {
        let call = CallRequest::total_supply(contract.clone());
        let output: String = self.request("eth_call", json!([call, "latest"])).await?;
        abi::decode_uint256(&output).map_err(|error| {
            ProviderError::internal(format!("Invalid totalSupply output `{output}': {error}"))
        })
    }
}

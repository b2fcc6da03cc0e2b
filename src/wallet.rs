use crate::{
    ConnectedWallet,
    client::{ChainClient, ChainReader, Connection, WalletConnector},
    error::{ProviderError, ProviderErrorCode},
    ethereum::{
        Address, ChainId, TransactionReceipt, TxHash, abi,
        rpc::{CallRequest, RequestArguments, TransactionRequest},
    },
    ffi,
};
use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use std::time::Duration;
use wasm_bindgen::{JsCast as _, JsValue, closure::Closure};

/// how often [`Wallet::wait_for_receipt`] asks for the receipt by default
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The wallet extension's provider (`window.ethereum`).
#[derive(Clone, PartialEq)]
pub struct Wallet {
    provider: ffi::Eip1193Provider,
    poll_interval: Duration,
}

/// Get the provider injected by the wallet extension.
///
/// `None` means no wallet extension is installed, or that it was not
/// injected yet. You should make sure the page is loaded fully before calling
/// this function.
///
pub fn injected() -> Option<Wallet> {
    ffi::eip1193::ETHEREUM.with(|opt| opt.clone().map(Wallet::new))
}

impl Wallet {
    fn new(provider: ffi::Eip1193Provider) -> Self {
        Wallet {
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// change how often the transaction receipts are polled
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// a display name for the wallet application
    pub fn name(&self) -> &'static str {
        if self.provider.is_meta_mask().unwrap_or(false) {
            "MetaMask"
        } else {
            "Injected wallet"
        }
    }

    /// Submit an RPC request to the provider and decode its result.
    pub async fn request<T>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        // the provider expects plain objects, not `Map`s
        let args = RequestArguments::new(method, params)
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|error| {
                ProviderError::internal(format!("Couldn't encode the `{method}' request: {error}"))
            })?;

        match self.provider.request(args).await {
            Ok(result) => serde_wasm_bindgen::from_value(result).map_err(|decode_error| {
                ProviderError::internal(format!(
                    "Couldn't decode the result of `{method}': {decode_error}"
                ))
            }),
            Err(error) => Err(ProviderError::from_js(error)),
        }
    }

    /// the accounts the page is already authorised to use, without prompting
    pub async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.request("eth_accounts", json!([])).await
    }

    /// the chain the wallet is currently connected to
    pub async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        let chain_id: String = self.request("eth_chainId", json!([])).await?;
        ChainId::from_quantity(&chain_id).map_err(|error| {
            ProviderError::internal(format!("Invalid chain id `{chain_id}': {error}"))
        })
    }

    /// Returns the [`ConnectedWallet`] after prompting the user to authorise
    /// the page. If the page is already authorised this returns without
    /// prompting the user.
    ///
    pub async fn enable(&self) -> Result<ConnectedWallet, ProviderError> {
        let accounts: Vec<Address> = self.request("eth_requestAccounts", json!([])).await?;
        let Some(account) = accounts.into_iter().next() else {
            return Err(ProviderError::new(
                ProviderErrorCode::Unauthorized,
                "The wallet did not return any account",
            ));
        };
        let chain_id = self.chain_id().await?;

        Ok(ConnectedWallet::new(
            self.clone(),
            Connection { account, chain_id },
        ))
    }

    /// `eth_call` against the latest block, returns the raw output
    pub async fn call(&self, call: &CallRequest) -> Result<String, ProviderError> {
        self.request("eth_call", json!([call, "latest"])).await
    }

    /// the receipt of the transaction, `None` while it is still pending
    pub async fn transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    /// poll for the transaction's receipt until it is mined
    pub async fn wait_for_receipt(
        &self,
        hash: &TxHash,
    ) -> Result<TransactionReceipt, ProviderError> {
        loop {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            debug!("transaction {hash} still pending");
            gloo_timers::future::sleep(self.poll_interval).await;
        }
    }

    /// Call `listener` every time the `event` is emitted by the provider.
    ///
    /// The listener is removed when the returned [`Subscription`] is dropped.
    pub fn on<F>(&self, event: &'static str, listener: F) -> Subscription
    where
        F: FnMut(JsValue) + 'static,
    {
        let listener = Closure::<dyn FnMut(JsValue)>::new(listener);
        self.provider.on(event, listener.as_ref().unchecked_ref());
        Subscription {
            provider: self.provider.clone(),
            event,
            listener,
        }
    }

    /// the user switched network in the wallet
    pub fn on_chain_changed<F>(&self, mut listener: F) -> Subscription
    where
        F: FnMut(ChainId) + 'static,
    {
        self.on("chainChanged", move |value| {
            let chain_id = value.as_string().map(|s| ChainId::from_quantity(&s));
            match chain_id {
                Some(Ok(chain_id)) => listener(chain_id),
                Some(Err(error)) => warn!("ignoring chainChanged event: {error}"),
                None => warn!("ignoring chainChanged event: {value:?}"),
            }
        })
    }

    /// the user switched, connected or disconnected accounts. An empty list
    /// means the page is no longer authorised.
    pub fn on_accounts_changed<F>(&self, mut listener: F) -> Subscription
    where
        F: FnMut(Vec<Address>) + 'static,
    {
        self.on("accountsChanged", move |value| {
            match serde_wasm_bindgen::from_value::<Vec<Address>>(value) {
                Ok(accounts) => listener(accounts),
                Err(error) => warn!("ignoring accountsChanged event: {error}"),
            }
        })
    }

    /// the provider lost its connection to every chain
    pub fn on_disconnect<F>(&self, mut listener: F) -> Subscription
    where
        F: FnMut(ProviderError) + 'static,
    {
        self.on("disconnect", move |value| {
            listener(ProviderError::from_js(value));
        })
    }
}

/// Keeps a provider event listener registered, see [`Wallet::on`].
pub struct Subscription {
    provider: ffi::Eip1193Provider,
    event: &'static str,
    listener: Closure<dyn FnMut(JsValue)>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.provider
            .remove_listener(self.event, self.listener.as_ref().unchecked_ref());
    }
}

impl WalletConnector for Wallet {
    fn provider_present(&self) -> bool {
        true
    }

    async fn is_authorized(&self) -> Result<bool, ProviderError> {
        Ok(!self.accounts().await?.is_empty())
    }

    async fn connect(&self) -> Result<Connection, ProviderError> {
        Ok(self.enable().await?.connection().clone())
    }

    async fn current_chain(&self) -> Result<ChainId, ProviderError> {
        self.chain_id().await
    }
}

impl ChainReader for Wallet {
    async fn total_supply(&self, contract: &Address) -> Result<u128, ProviderError> {
        let output = self
            .call(&CallRequest::total_supply(contract.clone()))
            .await?;
        abi::decode_uint256(&output).map_err(|error| {
            ProviderError::internal(format!("Invalid totalSupply output `{output}': {error}"))
        })
    }
}

impl ChainClient for Wallet {
    async fn send_transaction(
        &self,
        transaction: &TransactionRequest,
    ) -> Result<TxHash, ProviderError> {
        self.request("eth_sendTransaction", json!([transaction]))
            .await
    }

    async fn confirm(&self, hash: &TxHash) -> Result<TransactionReceipt, ProviderError> {
        self.wait_for_receipt(hash).await
    }
}

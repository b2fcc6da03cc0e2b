//! The seams between the mint page and the outside world.
//!
//! [`Wallet`](crate::Wallet) implements all of them against the injected
//! browser provider and [`HttpProvider`](crate::HttpProvider) implements
//! [`ChainReader`] against a public JSON-RPC endpoint.

#![allow(async_fn_in_trait)]

use crate::{
    error::{ProviderError, ProviderErrorCode},
    ethereum::{Address, ChainId, TransactionReceipt, TxHash, rpc::TransactionRequest},
};

/// what a successful connection gives us: the selected account and the
/// chain the wallet is currently on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    pub account: Address,
    pub chain_id: ChainId,
}

pub trait WalletConnector {
    /// is there a wallet provider to talk to at all
    fn provider_present(&self) -> bool;

    /// has the user already authorised this page, i.e. will
    /// [`WalletConnector::connect`] succeed without prompting
    async fn is_authorized(&self) -> Result<bool, ProviderError>;

    async fn connect(&self) -> Result<Connection, ProviderError>;

    /// the chain the wallet is on right now, regardless of the events
    /// received so far
    async fn current_chain(&self) -> Result<ChainId, ProviderError>;
}

pub trait ChainReader {
    /// `totalSupply()` of the given contract
    async fn total_supply(&self, contract: &Address) -> Result<u128, ProviderError>;
}

pub trait ChainClient {
    /// submit the transaction, returns as soon as it is accepted
    async fn send_transaction(
        &self,
        transaction: &TransactionRequest,
    ) -> Result<TxHash, ProviderError>;

    /// wait until the transaction is included in a block
    async fn confirm(&self, hash: &TxHash) -> Result<TransactionReceipt, ProviderError>;
}

impl<T: WalletConnector> WalletConnector for &T {
    fn provider_present(&self) -> bool {
        (**self).provider_present()
    }

    async fn is_authorized(&self) -> Result<bool, ProviderError> {
        (**self).is_authorized().await
    }

    async fn connect(&self) -> Result<Connection, ProviderError> {
        (**self).connect().await
    }

    async fn current_chain(&self) -> Result<ChainId, ProviderError> {
        (**self).current_chain().await
    }
}

impl<T: ChainReader> ChainReader for &T {
    async fn total_supply(&self, contract: &Address) -> Result<u128, ProviderError> {
        (**self).total_supply(contract).await
    }
}

impl<T: ChainClient> ChainClient for &T {
    async fn send_transaction(
        &self,
        transaction: &TransactionRequest,
    ) -> Result<TxHash, ProviderError> {
        (**self).send_transaction(transaction).await
    }

    async fn confirm(&self, hash: &TxHash) -> Result<TransactionReceipt, ProviderError> {
        (**self).confirm(hash).await
    }
}

fn no_provider() -> ProviderError {
    ProviderError::new(ProviderErrorCode::Disconnected, "no wallet provider")
}

/// A wallet that was not found, as a [`WalletConnector`]: it is never
/// present and every call fails.
///
/// Lets the page be wired the same way whether or not the user has a
/// wallet extension installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWallet;

impl WalletConnector for NoWallet {
    fn provider_present(&self) -> bool {
        false
    }

    async fn is_authorized(&self) -> Result<bool, ProviderError> {
        Ok(false)
    }

    async fn connect(&self) -> Result<Connection, ProviderError> {
        Err(no_provider())
    }

    async fn current_chain(&self) -> Result<ChainId, ProviderError> {
        Err(no_provider())
    }
}

impl ChainClient for NoWallet {
    async fn send_transaction(&self, _: &TransactionRequest) -> Result<TxHash, ProviderError> {
        Err(no_provider())
    }

    async fn confirm(&self, _: &TxHash) -> Result<TransactionReceipt, ProviderError> {
        Err(no_provider())
    }
}

impl ChainReader for NoWallet {
    async fn total_supply(&self, _: &Address) -> Result<u128, ProviderError> {
        Err(no_provider())
    }
}

/// Either the injected wallet or [`NoWallet`].
#[derive(Clone)]
pub enum MaybeWallet<W> {
    Found(W),
    Missing(NoWallet),
}

impl<W> MaybeWallet<W> {
    pub fn new(wallet: Option<W>) -> Self {
        wallet.map_or(Self::Missing(NoWallet), Self::Found)
    }
}

impl<W: WalletConnector> WalletConnector for MaybeWallet<W> {
    fn provider_present(&self) -> bool {
        match self {
            Self::Found(wallet) => wallet.provider_present(),
            Self::Missing(none) => none.provider_present(),
        }
    }

    async fn is_authorized(&self) -> Result<bool, ProviderError> {
        match self {
            Self::Found(wallet) => wallet.is_authorized().await,
            Self::Missing(none) => none.is_authorized().await,
        }
    }

    async fn connect(&self) -> Result<Connection, ProviderError> {
        match self {
            Self::Found(wallet) => wallet.connect().await,
            Self::Missing(none) => none.connect().await,
        }
    }

    async fn current_chain(&self) -> Result<ChainId, ProviderError> {
        match self {
            Self::Found(wallet) => wallet.current_chain().await,
            Self::Missing(none) => none.current_chain().await,
        }
    }
}

impl<W: ChainClient> ChainClient for MaybeWallet<W> {
    async fn send_transaction(
        &self,
        transaction: &TransactionRequest,
    ) -> Result<TxHash, ProviderError> {
        match self {
            Self::Found(wallet) => wallet.send_transaction(transaction).await,
            Self::Missing(none) => none.send_transaction(transaction).await,
        }
    }

    async fn confirm(&self, hash: &TxHash) -> Result<TransactionReceipt, ProviderError> {
        match self {
            Self::Found(wallet) => wallet.confirm(hash).await,
            Self::Missing(none) => none.confirm(hash).await,
        }
    }
}

impl<W: ChainReader> ChainReader for MaybeWallet<W> {
    async fn total_supply(&self, contract: &Address) -> Result<u128, ProviderError> {
        match self {
            Self::Found(wallet) => wallet.total_supply(contract).await,
            Self::Missing(none) => none.total_supply(contract).await,
        }
    }
}

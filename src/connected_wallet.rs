use crate::{
    Wallet,
    client::Connection,
    error::ProviderError,
    ethereum::{Address, ChainId},
};

/// A [`Wallet`] the user authorised the page to use.
#[derive(Clone, PartialEq)]
pub struct ConnectedWallet {
    wallet: Wallet,
    connection: Connection,
}

impl ConnectedWallet {
    pub(crate) fn new(wallet: Wallet, connection: Connection) -> Self {
        Self { wallet, connection }
    }

    /// return the name of the wallet application
    pub fn name(&self) -> &'static str {
        self.wallet.name()
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// the account selected in the wallet when we connected
    pub fn account(&self) -> &Address {
        &self.connection.account
    }

    /// the chain the wallet was on the last time we asked
    pub fn chain_id(&self) -> ChainId {
        self.connection.chain_id
    }

    /// re-enable the connection to the wallet
    ///
    /// This is particularly useful after an `accountsChanged` event or if a
    /// request failed with [`ProviderErrorCode::Unauthorized`].
    ///
    /// [`ProviderErrorCode::Unauthorized`]: crate::error::ProviderErrorCode::Unauthorized
    ///
    pub async fn enable(&mut self) -> Result<(), ProviderError> {
        self.connection = self.wallet.enable().await?.connection;
        Ok(())
    }
}

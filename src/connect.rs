//! The wallet connection flow behind the "Connect" button.

use crate::{
    client::{Connection, WalletConnector},
    error::MintError,
    ethereum::{Address, ChainId},
    state::SharedState,
};
use log::{debug, info, warn};

pub struct ConnectControl<W> {
    connector: W,
    state: SharedState,
    network_id: ChainId,
    connection: Option<Connection>,
}

impl<W: WalletConnector> ConnectControl<W> {
    pub fn new(connector: W, state: SharedState, network_id: ChainId) -> Self {
        Self {
            connector,
            state,
            network_id,
            connection: None,
        }
    }

    pub fn connector(&self) -> &W {
        &self.connector
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// connected, and to the configured network
    pub fn is_on_network(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| connection.chain_id == self.network_id)
    }

    /// Connect the wallet (the user clicked "Connect").
    ///
    /// Failures are recorded in the shared state: a missing provider and a
    /// wrong network in the banner, the wallet's own error in the connector
    /// error slot. A failed attempt is never retried.
    pub async fn connect(&mut self) -> Result<Connection, MintError> {
        if !self.connector.provider_present() {
            warn!("no wallet provider found");
            self.state
                .set_error_message(MintError::ProviderMissing.to_string());
            return Err(MintError::ProviderMissing);
        }

        self.state.set_connecting(true);
        let result = self.connector.connect().await;
        self.state.set_connecting(false);

        match result {
            Ok(connection) => {
                info!(
                    "connected {} on chain {}",
                    connection.account, connection.chain_id
                );
                self.state.set_connector_error(None);
                self.connection = Some(connection.clone());
                self.check_network()?;
                Ok(connection)
            }
            Err(error) => {
                warn!("wallet connection failed: {error}");
                self.state.set_connector_error(Some(error.clone()));
                Err(MintError::ConnectionFailed(error))
            }
        }
    }

    /// Reconnect without prompting if the user authorised the page before.
    ///
    /// Returns `Ok(None)` when there is nothing to restore.
    pub async fn restore(&mut self) -> Result<Option<Connection>, MintError> {
        if !self.connector.provider_present() {
            return Ok(None);
        }
        match self.connector.is_authorized().await {
            Ok(true) => self.connect().await.map(Some),
            Ok(false) => {
                debug!("wallet not authorised yet");
                Ok(None)
            }
            Err(error) => {
                warn!("couldn't check the wallet authorisation: {error}");
                self.state.set_connector_error(Some(error.clone()));
                Err(MintError::ConnectionFailed(error))
            }
        }
    }

    /// Ask the wallet which chain it is on and apply it as a
    /// [`chain_changed`](Self::chain_changed).
    ///
    /// A `chainChanged` event can arrive late or not at all, this is checked
    /// before anything is sent on the connected chain.
    pub async fn sync_chain(&mut self) -> Result<(), MintError> {
        if self.connection.is_none() {
            return Ok(());
        }
        match self.connector.current_chain().await {
            Ok(chain_id) => self.chain_changed(chain_id),
            Err(error) => {
                warn!("couldn't read the wallet's chain: {error}");
                Err(MintError::ConnectionFailed(error))
            }
        }
    }

    /// the wallet switched network
    pub fn chain_changed(&mut self, chain_id: ChainId) -> Result<(), MintError> {
        if let Some(connection) = &mut self.connection {
            connection.chain_id = chain_id;
        }
        self.check_network()
    }

    /// the wallet switched account, an empty list means the user revoked
    /// the page's access
    pub fn accounts_changed(&mut self, accounts: Vec<Address>) -> Result<(), MintError> {
        match accounts.into_iter().next() {
            Some(account) => {
                if let Some(connection) = &mut self.connection {
                    connection.account = account;
                }
            }
            None => self.connection = None,
        }
        self.check_network()
    }

    pub fn disconnected(&mut self) {
        self.connection = None;
        self.state.clear_error_message();
    }

    /// put the banner in line with the network the wallet is on
    ///
    /// Without an active connection there is nothing to complain about.
    fn check_network(&self) -> Result<(), MintError> {
        let Some(connection) = &self.connection else {
            self.state.clear_error_message();
            return Ok(());
        };

        if connection.chain_id == self.network_id {
            self.state.clear_error_message();
            Ok(())
        } else {
            let error = MintError::WrongNetwork {
                expected: self.network_id,
                actual: connection.chain_id,
            };
            warn!("{error} (wallet is on {})", connection.chain_id);
            self.state.set_error_message(error.to_string());
            Err(error)
        }
    }
}

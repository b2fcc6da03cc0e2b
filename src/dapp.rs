//! The mint page put together: connection, mint widget and supply counter
//! sharing one [`SharedState`].

use crate::{
    client::{ChainClient, ChainReader, Connection, MaybeWallet, WalletConnector},
    config::MintConfig,
    connect::ConnectControl,
    error::MintError,
    ethereum::{Address, ChainId, TxHash},
    http::HttpProvider,
    mint::{BuyButton, MAX_QUANTITY, MIN_QUANTITY, MintControl, MintPhase},
    state::SharedState,
    wallet::{self, Subscription, Wallet},
};
use futures::{
    StreamExt as _,
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
};
use log::{debug, warn};
use std::{
    cell::{RefCell, RefMut},
    rc::Rc,
    time::Duration,
};

/// how long a queued wallet event waits before trying a busy page again
const BUSY_RETRY: Duration = Duration::from_millis(50);

/// A provider event, in the order the wallet emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    ChainChanged(ChainId),
    /// empty when the user revoked the page's access
    AccountsChanged(Vec<Address>),
    Disconnected,
}

/// Everything the page needs to render the header banner and the mint
/// widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintView {
    /// `0xABCD...1234` once connected
    pub account: Option<String>,
    pub is_connecting: bool,
    /// red banner, buying is disabled while it is set
    pub error_banner: Option<String>,
    /// green message of the last successful mint
    pub status_message: Option<String>,
    /// `"? / 10000"` then `"1234 / 10000"`
    pub progress: String,
    /// `"0.05 MATIC per 1 NFT"`
    pub price_line: String,
    pub quantity: u32,
    pub can_decrement: bool,
    pub can_increment: bool,
    pub buy: BuyButton,
}

pub struct Dapp<P, R> {
    state: SharedState,
    connect: ConnectControl<P>,
    mint: MintControl,
    /// when set, the supply is read from there rather than via the wallet
    reader: Option<R>,
}

impl<P, R> Dapp<P, R>
where
    P: WalletConnector + ChainClient + ChainReader,
    R: ChainReader,
{
    pub fn new(config: MintConfig, wallet: P, reader: Option<R>) -> Self {
        let state = SharedState::new();
        let connect = ConnectControl::new(wallet, state.clone(), config.network_id);
        let mint = MintControl::new(config, state.clone());
        Self {
            state,
            connect,
            mint,
            reader,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connect.connection()
    }

    pub fn mint_phase(&self) -> &MintPhase {
        self.mint.phase()
    }

    /// the error the last mint failed with, never shown in the banner
    pub fn last_rejection(&self) -> Option<&MintError> {
        self.mint.last_rejection()
    }

    /// Page load: reconnect a wallet that already authorised us, then read
    /// the supply.
    pub async fn mount(&mut self) {
        if let Err(error) = self.connect.restore().await {
            debug!("wallet not restored: {error}");
        }
        self.refresh_supply().await;
    }

    /// the user clicked "Connect"
    pub async fn connect(&mut self) -> Result<Connection, MintError> {
        let result = self.connect.connect().await;
        self.refresh_supply().await;
        result
    }

    /// the user clicked "Buy"
    ///
    /// The wallet's chain is read again first, so a network change the page
    /// has not heard about yet still disables buying.
    pub async fn buy(&mut self) -> Result<TxHash, MintError> {
        let Some(account) = self.connect.connection().map(|c| c.account.clone()) else {
            return Err(MintError::BuyDisabled);
        };
        // a wrong network sets the banner, `mint` then refuses to start
        if let Err(error @ MintError::ConnectionFailed(_)) = self.connect.sync_chain().await {
            return Err(error);
        }
        if !self.connect.is_on_network() {
            self.refresh_supply().await;
        }
        let result = self
            .mint
            .mint(self.connect.connector(), &account, true)
            .await;
        if result.is_ok() {
            self.refresh_supply().await;
        }
        result
    }

    pub fn increment(&mut self) {
        self.mint.increment();
    }

    pub fn decrement(&mut self) {
        self.mint.decrement();
    }

    /// Apply a wallet event to the connection. The supply is not re-read.
    pub fn apply(&mut self, event: WalletEvent) {
        let result = match event {
            WalletEvent::ChainChanged(chain_id) => self.connect.chain_changed(chain_id),
            WalletEvent::AccountsChanged(accounts) => self.connect.accounts_changed(accounts),
            WalletEvent::Disconnected => {
                self.connect.disconnected();
                Ok(())
            }
        };
        if let Err(error) = result {
            debug!("{error}");
        }
    }

    pub async fn chain_changed(&mut self, chain_id: ChainId) {
        self.apply(WalletEvent::ChainChanged(chain_id));
        self.refresh_supply().await;
    }

    pub async fn accounts_changed(&mut self, accounts: Vec<Address>) {
        self.apply(WalletEvent::AccountsChanged(accounts));
        self.refresh_supply().await;
    }

    pub async fn disconnected(&mut self) {
        self.apply(WalletEvent::Disconnected);
        self.refresh_supply().await;
    }

    /// Re-read the supply after a connection or network change.
    ///
    /// Through the wallet the supply can only be read on the configured
    /// network, anywhere else it goes back to the placeholder.
    pub async fn refresh_supply(&mut self) {
        if let Some(reader) = &self.reader {
            self.mint.refresh_supply(reader).await;
        } else if self.connect.is_on_network() {
            self.mint.refresh_supply(self.connect.connector()).await;
        } else {
            self.mint.reset_supply();
        }
    }

    pub fn view(&self) -> MintView {
        let state = self.state.snapshot();
        let connected = self.connect.is_connected();
        let quantity = self.mint.quantity().get();
        let config = self.mint.config();

        MintView {
            account: self.connection().map(|c| c.account.short()),
            is_connecting: state.is_connecting,
            error_banner: state.has_error().then(|| state.error_message.clone()),
            status_message: (!state.status_message.is_empty()).then_some(state.status_message),
            progress: self.mint.progress(),
            price_line: config.display.price_line(config.unit_cost),
            quantity,
            can_decrement: quantity > MIN_QUANTITY,
            can_increment: quantity < MAX_QUANTITY,
            buy: self.mint.buy_button(connected),
        }
    }
}

/// where [`Dapp::refresh_supply`] reads from
enum SupplySource<P, R> {
    Reader(R),
    Wallet(P),
    Placeholder,
}

impl<P, R> Dapp<P, R>
where
    P: WalletConnector + ChainClient + ChainReader + Clone,
    R: ChainReader + Clone,
{
    /// Apply the queued wallet events to the page shared as `this`, in order,
    /// until every sender is dropped.
    ///
    /// The page is only borrowed between awaits. An event arriving while
    /// another operation holds the page waits for it, and the page is never
    /// held while the supply is read.
    pub async fn process_events(
        this: Rc<RefCell<Self>>,
        mut events: UnboundedReceiver<WalletEvent>,
    ) {
        while let Some(event) = events.next().await {
            debug!("wallet event {event:?}");
            Self::borrow_page(&this).await.apply(event);
            Self::refresh_shared_supply(&this).await;
        }
        debug!("wallet events closed");
    }

    async fn borrow_page(this: &RefCell<Self>) -> RefMut<'_, Self> {
        loop {
            if let Ok(page) = this.try_borrow_mut() {
                return page;
            }
            gloo_timers::future::sleep(BUSY_RETRY).await;
        }
    }

    async fn refresh_shared_supply(this: &RefCell<Self>) {
        let (source, contract) = {
            let page = Self::borrow_page(this).await;
            (
                page.supply_source(),
                page.mint.config().contract_address.clone(),
            )
        };
        let result = match &source {
            SupplySource::Reader(reader) => reader.total_supply(&contract).await,
            SupplySource::Wallet(wallet) => wallet.total_supply(&contract).await,
            SupplySource::Placeholder => {
                Self::borrow_page(this).await.mint.reset_supply();
                return;
            }
        };
        Self::borrow_page(this).await.mint.record_supply(result);
    }

    fn supply_source(&self) -> SupplySource<P, R> {
        if let Some(reader) = &self.reader {
            SupplySource::Reader(reader.clone())
        } else if self.connect.is_on_network() {
            SupplySource::Wallet(self.connect.connector().clone())
        } else {
            SupplySource::Placeholder
        }
    }
}

/// a provider listener pushing `event(value)` on the queue
fn queue<T: 'static>(
    events: &UnboundedSender<WalletEvent>,
    event: fn(T) -> WalletEvent,
) -> impl FnMut(T) + 'static {
    let events = events.clone();
    move |value| {
        if events.unbounded_send(event(value)).is_err() {
            warn!("wallet event dropped, the page is gone");
        }
    }
}

/// The page running in the browser: the injected wallet (if any), and the
/// configured public endpoint for the supply.
pub type BrowserDapp = Dapp<MaybeWallet<Wallet>, HttpProvider>;

impl BrowserDapp {
    pub fn injected(config: MintConfig) -> Self {
        let poll_interval = config.poll_interval();
        let wallet = wallet::injected().map(|wallet| wallet.with_poll_interval(poll_interval));
        if wallet.is_none() {
            warn!("no injected wallet found");
        }
        let reader = config.rpc_url.clone().map(HttpProvider::new);
        Self::new(config, MaybeWallet::new(wallet), reader)
    }

    /// Follow the wallet's network and account changes.
    ///
    /// The events are queued and applied in order by
    /// [`Dapp::process_events`], running in the background until the
    /// returned subscriptions are dropped. Keep them alive as long as the
    /// page is.
    pub fn watch(this: &Rc<RefCell<Self>>) -> Vec<Subscription> {
        let MaybeWallet::Found(wallet) = this.borrow().connect.connector().clone() else {
            return Vec::new();
        };

        let (events, receiver) = mpsc::unbounded();
        wasm_bindgen_futures::spawn_local(Self::process_events(Rc::clone(this), receiver));

        let chain = wallet.on_chain_changed(queue(&events, WalletEvent::ChainChanged));
        let accounts = wallet.on_accounts_changed(queue(&events, WalletEvent::AccountsChanged));
        let mut disconnected = queue::<()>(&events, |()| WalletEvent::Disconnected);
        let disconnect = wallet.on_disconnect(move |error| {
            warn!("wallet disconnected: {error}");
            disconnected(());
        });

        vec![chain, accounts, disconnect]
    }
}

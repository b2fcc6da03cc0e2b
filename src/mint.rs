//! The mint widget: quantity selector, buy button and supply counter.

use crate::{
    client::{ChainClient, ChainReader},
    config::MintConfig,
    error::{MintError, ProviderError},
    ethereum::{Address, TransactionReceipt, TxHash, Wei, rpc::TransactionRequest},
    state::SharedState,
};
use log::{debug, info, warn};
use std::fmt;

pub const MIN_QUANTITY: u32 = 1;
/// most tokens a single transaction may mint
pub const MAX_QUANTITY: u32 = 10;

/// How many tokens to mint, always within `MIN_QUANTITY..=MAX_QUANTITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u32);

impl Quantity {
    pub const MIN: Self = Self(MIN_QUANTITY);
    pub const MAX: Self = Self(MAX_QUANTITY);

    pub fn new(quantity: u32) -> Option<Self> {
        (MIN_QUANTITY..=MAX_QUANTITY)
            .contains(&quantity)
            .then_some(Self(quantity))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// no effect at [`MAX_QUANTITY`]
    pub fn increment(&mut self) {
        if self.0 < MAX_QUANTITY {
            self.0 += 1;
        }
    }

    /// no effect at [`MIN_QUANTITY`]
    pub fn decrement(&mut self) {
        if self.0 > MIN_QUANTITY {
            self.0 -= 1;
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What gets submitted when the user clicks "Buy".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintRequest {
    pub quantity: Quantity,
    pub unit_cost: Wei,
    pub gas_limit_per_unit: u64,
}

impl MintRequest {
    pub fn new(quantity: Quantity, config: &MintConfig) -> Self {
        Self {
            quantity,
            unit_cost: config.unit_cost,
            gas_limit_per_unit: config.gas_limit,
        }
    }

    /// value to send along with the transaction
    pub fn total_cost(&self) -> Result<Wei, MintError> {
        self.unit_cost
            .checked_mul(u128::from(self.quantity.get()))
            .ok_or(MintError::Overflow {
                quantity: self.quantity.get(),
            })
    }

    pub fn total_gas_limit(&self) -> Result<u64, MintError> {
        self.gas_limit_per_unit
            .checked_mul(u64::from(self.quantity.get()))
            .ok_or(MintError::Overflow {
                quantity: self.quantity.get(),
            })
    }

    /// the `mint(quantity)` transaction, from `from` to `contract`
    pub fn transaction(
        &self,
        from: Address,
        contract: Address,
    ) -> Result<TransactionRequest, MintError> {
        Ok(TransactionRequest::mint(
            from,
            contract,
            self.quantity.get(),
            self.total_cost()?,
            self.total_gas_limit()?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintOutcome {
    Success {
        quantity: Quantity,
        account: Address,
        hash: TxHash,
    },
    Failure(MintError),
}

/// Lifecycle of the mint transaction.
///
/// `Settled` behaves like `Idle`: the user can mint again straight away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MintPhase {
    #[default]
    Idle,
    /// waiting for the wallet to accept the transaction
    Pending,
    /// waiting for the transaction to be mined
    Minting(TxHash),
    Settled(MintOutcome),
}

impl MintPhase {
    pub fn in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Minting(_))
    }
}

/// State of the buy button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuyButton {
    /// not connected, or the banner shows an error
    Disabled,
    Pending,
    Minting,
    Enabled,
}

impl BuyButton {
    pub fn label(self) -> &'static str {
        match self {
            Self::Disabled | Self::Enabled => "Buy",
            Self::Pending => "Pending",
            Self::Minting => "Minting",
        }
    }

    pub fn is_clickable(self) -> bool {
        self == Self::Enabled
    }
}

/// The minted supply, unknown until the first read resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Supply(Option<u128>);

impl Supply {
    pub const PLACEHOLDER: &'static str = "?";

    pub fn get(self) -> Option<u128> {
        self.0
    }
}

impl fmt::Display for Supply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(supply) => write!(f, "{supply}"),
            None => f.write_str(Self::PLACEHOLDER),
        }
    }
}

pub struct MintControl {
    config: MintConfig,
    state: SharedState,
    quantity: Quantity,
    phase: MintPhase,
    supply: Supply,
}

impl MintControl {
    pub fn new(config: MintConfig, state: SharedState) -> Self {
        Self {
            config,
            state,
            quantity: Quantity::default(),
            phase: MintPhase::Idle,
            supply: Supply::default(),
        }
    }

    pub fn config(&self) -> &MintConfig {
        &self.config
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn increment(&mut self) {
        self.quantity.increment();
    }

    pub fn decrement(&mut self) {
        self.quantity.decrement();
    }

    pub fn phase(&self) -> &MintPhase {
        &self.phase
    }

    /// The error the last mint failed with.
    ///
    /// Nothing is written to the shared state when a mint fails, this is the
    /// only place the rejection can be read back from.
    pub fn last_rejection(&self) -> Option<&MintError> {
        match &self.phase {
            MintPhase::Settled(MintOutcome::Failure(error)) => Some(error),
            _ => None,
        }
    }

    pub fn buy_button(&self, connected: bool) -> BuyButton {
        if !connected || self.state.read(|state| state.has_error()) {
            BuyButton::Disabled
        } else {
            match self.phase {
                MintPhase::Pending => BuyButton::Pending,
                MintPhase::Minting(_) => BuyButton::Minting,
                MintPhase::Idle | MintPhase::Settled(_) => BuyButton::Enabled,
            }
        }
    }

    /// Idle → Pending: compute the request for the selected quantity.
    pub fn begin(&mut self, connected: bool) -> Result<MintRequest, MintError> {
        if self.phase.in_flight() {
            return Err(MintError::MintInFlight);
        }
        if self.buy_button(connected) != BuyButton::Enabled {
            return Err(MintError::BuyDisabled);
        }

        let request = MintRequest::new(self.quantity, &self.config);
        request.total_cost()?;
        request.total_gas_limit()?;

        self.state.set_status_message("");
        self.phase = MintPhase::Pending;
        Ok(request)
    }

    /// Pending → Minting: the wallet accepted the transaction
    pub fn submitted(&mut self, hash: TxHash) {
        if self.phase != MintPhase::Pending {
            warn!("transaction {hash} submitted while {:?}", self.phase);
        }
        self.phase = MintPhase::Minting(hash);
    }

    /// Minting → Settled: the transaction was mined
    pub fn confirmed(
        &mut self,
        request: &MintRequest,
        account: &Address,
        receipt: TransactionReceipt,
    ) {
        let hash = receipt.transaction_hash.clone();
        if !receipt.succeeded() {
            self.failed(MintError::reverted(&hash));
            return;
        }

        info!(
            "{} {} minted to {account} in {hash}",
            request.quantity, self.config.display.symbol
        );
        self.state
            .set_status_message(self.success_message(request.quantity, account));
        self.phase = MintPhase::Settled(MintOutcome::Success {
            quantity: request.quantity,
            account: account.clone(),
            hash,
        });
    }

    /// Pending/Minting → Settled: the user declined, the node refused the
    /// transaction or it reverted.
    pub fn failed(&mut self, error: MintError) {
        warn!("mint failed: {error}");
        self.phase = MintPhase::Settled(MintOutcome::Failure(error));
    }

    /// `"Yay! 2 CRAB successfully sent to 0xABCD...1234"`
    pub fn success_message(&self, quantity: Quantity, account: &Address) -> String {
        format!(
            "Yay! {quantity} {} successfully sent to {}",
            self.config.display.symbol,
            account.short()
        )
    }

    /// Run the whole mint: submit through `client` from `account`, then wait
    /// for the confirmation.
    pub async fn mint<C: ChainClient>(
        &mut self,
        client: &C,
        account: &Address,
        connected: bool,
    ) -> Result<TxHash, MintError> {
        let request = self.begin(connected)?;

        let transaction =
            match request.transaction(account.clone(), self.config.contract_address.clone()) {
                Ok(transaction) => transaction,
                Err(error) => {
                    self.failed(error.clone());
                    return Err(error);
                }
            };
        debug!("submitting {transaction:?}");

        let hash = match client.send_transaction(&transaction).await {
            Ok(hash) => hash,
            Err(error) => {
                let error = MintError::TransactionRejected(error);
                self.failed(error.clone());
                return Err(error);
            }
        };
        self.submitted(hash.clone());

        match client.confirm(&hash).await {
            Ok(receipt) => {
                self.confirmed(&request, account, receipt);
                match self.last_rejection() {
                    Some(error) => Err(error.clone()),
                    None => Ok(hash),
                }
            }
            Err(error) => {
                let error = MintError::TransactionRejected(error);
                self.failed(error.clone());
                Err(error)
            }
        }
    }

    pub fn supply(&self) -> Supply {
        self.supply
    }

    /// `"1234 / 10000"`
    pub fn progress(&self) -> String {
        format!("{} / {}", self.supply, self.config.max_supply)
    }

    /// Read the supply. On failure the last known value stays displayed.
    pub async fn refresh_supply<R: ChainReader>(&mut self, reader: &R) -> Supply {
        let result = reader.total_supply(&self.config.contract_address).await;
        self.record_supply(result)
    }

    /// apply a supply read made elsewhere, see [`MintControl::refresh_supply`]
    pub fn record_supply(&mut self, result: Result<u128, ProviderError>) -> Supply {
        match result {
            Ok(supply) => {
                debug!("total supply is {supply}");
                self.supply = Supply(Some(supply));
            }
            Err(error) => warn!("couldn't read the total supply: {error}"),
        }
        self.supply
    }

    /// back to the placeholder
    pub fn reset_supply(&mut self) {
        self.supply = Supply::default();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use futures::executor::block_on;
    use serde_json::json;

    use super::*;
    use crate::error::{ProviderError, ProviderErrorCode};

    const ACCOUNT: &str = "0xABCDef0000000000000000000000000000001234";

    fn config() -> MintConfig {
        serde_json::from_value(json! {{
            "network_id": 137,
            "contract_address": "0x00000000000000000000000000000000000c0ffe",
            "unit_cost": "50000000000000000",
            "gas_limit": 285000,
            "max_supply": 10000,
            "name": "Crabs",
            "symbol": "CRAB",
            "chain": "MATIC",
        }})
        .unwrap()
    }

    fn hash(byte: u8) -> TxHash {
        TxHash::from_hex(&format!("0x{}", hex::encode([byte; 32]))).unwrap()
    }

    fn receipt(hash: &TxHash, status: &str) -> TransactionReceipt {
        serde_json::from_value(json! {{
            "transactionHash": hash,
            "blockNumber": "0x1",
            "status": status,
        }})
        .unwrap()
    }

    struct FakeChain {
        send: Result<TxHash, ProviderError>,
        status: &'static str,
        sent: RefCell<Vec<TransactionRequest>>,
        supply: Result<u128, ProviderError>,
        reads: Cell<usize>,
    }

    impl FakeChain {
        fn accepting() -> Self {
            Self {
                send: Ok(hash(0xab)),
                status: "0x1",
                sent: RefCell::new(Vec::new()),
                supply: Ok(42),
                reads: Cell::new(0),
            }
        }
    }

    impl ChainClient for FakeChain {
        async fn send_transaction(
            &self,
            transaction: &TransactionRequest,
        ) -> Result<TxHash, ProviderError> {
            self.sent.borrow_mut().push(transaction.clone());
            self.send.clone()
        }

        async fn confirm(&self, hash: &TxHash) -> Result<TransactionReceipt, ProviderError> {
            Ok(receipt(hash, self.status))
        }
    }

    impl ChainReader for FakeChain {
        async fn total_supply(&self, _: &Address) -> Result<u128, ProviderError> {
            self.reads.set(self.reads.get() + 1);
            self.supply.clone()
        }
    }

    fn account() -> Address {
        Address::from_hex(ACCOUNT).unwrap()
    }

    #[test]
    fn quantity_is_bounded() {
        let mut quantity = Quantity::default();
        assert_eq!(quantity.get(), 1);

        quantity.decrement();
        assert_eq!(quantity, Quantity::MIN);

        for _ in 0..25 {
            quantity.increment();
            assert!((MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity.get()));
        }
        assert_eq!(quantity, Quantity::MAX);

        for _ in 0..3 {
            quantity.decrement();
        }
        assert_eq!(quantity.get(), 7);

        assert_eq!(Quantity::new(0), None);
        assert_eq!(Quantity::new(11), None);
        assert_eq!(Quantity::new(10), Some(Quantity::MAX));
    }

    #[test]
    fn request_totals() {
        let request = MintRequest {
            quantity: Quantity::new(3).unwrap(),
            unit_cost: Wei::parse_units("0.05", 18).unwrap(),
            gas_limit_per_unit: 285_000,
        };
        assert_eq!(request.total_cost().unwrap().to_ether(), "0.15");
        assert_eq!(request.total_gas_limit().unwrap(), 855_000);
    }

    #[test]
    fn request_overflow() {
        let request = MintRequest {
            quantity: Quantity::MAX,
            unit_cost: Wei(u128::MAX / 2),
            gas_limit_per_unit: u64::MAX,
        };
        assert_eq!(
            request.total_cost(),
            Err(MintError::Overflow { quantity: 10 })
        );
        assert!(request.total_gas_limit().is_err());
    }

    #[test]
    fn buy_disabled_without_connection_or_with_error() {
        let state = SharedState::new();
        let mut control = MintControl::new(config(), state.clone());

        assert_eq!(control.buy_button(false), BuyButton::Disabled);
        assert_eq!(control.begin(false), Err(MintError::BuyDisabled));

        state.set_error_message("Change the network to 137.");
        assert_eq!(control.buy_button(true), BuyButton::Disabled);
        assert_eq!(control.begin(true), Err(MintError::BuyDisabled));

        state.clear_error_message();
        assert_eq!(control.buy_button(true), BuyButton::Enabled);
        assert_eq!(control.phase(), &MintPhase::Idle);
    }

    #[test]
    fn lifecycle() {
        let state = SharedState::new();
        state.set_status_message("previous mint");
        let mut control = MintControl::new(config(), state.clone());
        control.increment();

        let request = control.begin(true).unwrap();
        assert_eq!(request.quantity.get(), 2);
        assert_eq!(control.phase(), &MintPhase::Pending);
        assert_eq!(control.buy_button(true), BuyButton::Pending);
        assert_eq!(state.status_message(), "");

        assert_eq!(control.begin(true), Err(MintError::MintInFlight));

        control.submitted(hash(1));
        assert_eq!(control.buy_button(true), BuyButton::Minting);
        assert_eq!(control.begin(true), Err(MintError::MintInFlight));

        control.confirmed(&request, &account(), receipt(&hash(1), "0x1"));
        assert_eq!(
            state.status_message(),
            "Yay! 2 CRAB successfully sent to 0xABCD...1234"
        );
        assert_eq!(control.buy_button(true), BuyButton::Enabled);
        assert!(control.last_rejection().is_none());
    }

    #[test]
    fn mint_success() {
        let state = SharedState::new();
        let mut control = MintControl::new(config(), state.clone());
        control.increment();
        let chain = FakeChain::accepting();

        let result = block_on(control.mint(&chain, &account(), true));
        assert_eq!(result, Ok(hash(0xab)));

        let message = state.status_message();
        assert!(message.contains('2'));
        assert!(message.contains("0xABCD...1234"));

        let sent = chain.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].value, Wei(100_000_000_000_000_000).to_quantity());
        assert_eq!(sent[0].gas, "0x8b290");
        assert_eq!(sent[0].from, account());

        assert!(matches!(
            control.phase(),
            MintPhase::Settled(MintOutcome::Success { quantity, .. }) if quantity.get() == 2
        ));
    }

    #[test]
    fn mint_rejected_by_user_is_silent() {
        let state = SharedState::new();
        let mut control = MintControl::new(config(), state.clone());
        let rejection = ProviderError::new(ProviderErrorCode::UserRejectedRequest, "denied");
        let chain = FakeChain {
            send: Err(rejection.clone()),
            ..FakeChain::accepting()
        };

        let result = block_on(control.mint(&chain, &account(), true));
        assert_eq!(result, Err(MintError::TransactionRejected(rejection.clone())));

        assert_eq!(state.snapshot(), Default::default());
        assert_eq!(control.buy_button(true), BuyButton::Enabled);
        assert_eq!(
            control.last_rejection(),
            Some(&MintError::TransactionRejected(rejection))
        );
    }

    #[test]
    fn mint_reverted() {
        let state = SharedState::new();
        let mut control = MintControl::new(config(), state.clone());
        let chain = FakeChain {
            status: "0x0",
            ..FakeChain::accepting()
        };

        let result = block_on(control.mint(&chain, &account(), true));
        assert!(matches!(result, Err(MintError::TransactionRejected(_))));
        assert_eq!(state.status_message(), "");
        assert!(control.last_rejection().is_some());
    }

    #[test]
    fn mint_when_disabled_sends_nothing() {
        let mut control = MintControl::new(config(), SharedState::new());
        let chain = FakeChain::accepting();

        assert_eq!(
            block_on(control.mint(&chain, &account(), false)),
            Err(MintError::BuyDisabled)
        );
        assert!(chain.sent.borrow().is_empty());
        assert_eq!(control.phase(), &MintPhase::Idle);
    }

    #[test]
    fn supply_placeholder() {
        let mut control = MintControl::new(config(), SharedState::new());
        assert_eq!(control.supply().to_string(), "?");
        assert_eq!(control.progress(), "? / 10000");

        let failing = FakeChain {
            supply: Err(ProviderError::internal("node down")),
            ..FakeChain::accepting()
        };
        block_on(control.refresh_supply(&failing));
        assert_eq!(control.supply().to_string(), "?");

        let chain = FakeChain::accepting();
        assert_eq!(block_on(control.refresh_supply(&chain)).get(), Some(42));
        assert_eq!(control.progress(), "42 / 10000");

        block_on(control.refresh_supply(&failing));
        assert_eq!(control.progress(), "42 / 10000");

        control.reset_supply();
        assert_eq!(control.supply().to_string(), "?");
    }

    #[test]
    fn button_labels() {
        assert_eq!(BuyButton::Disabled.label(), "Buy");
        assert_eq!(BuyButton::Pending.label(), "Pending");
        assert_eq!(BuyButton::Minting.label(), "Minting");
        assert!(BuyButton::Enabled.is_clickable());
        assert!(!BuyButton::Minting.is_clickable());
    }
}

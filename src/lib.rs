/*!

# Mint page connector for EVM wallets

This library is meant to be used by the minting page of an NFT collection
running in the browser. It connects the EIP-1193 wallet injected by the
browser extension (MetaMask and alike), drives the mint transaction of the
collection's contract and keeps the supply counter up to date.

## Features

- Detect and connect the injected wallet
- Check the wallet is on the right network
- Select a quantity and mint through the contract's `mint(uint256)`
- Read the contract's `totalSupply()`, through the wallet or a public
  JSON-RPC endpoint

## Usage

First load the configuration and create the page's state:

```no_run
use evm_mint_connector::{BrowserDapp, MintConfig};

# async fn test(config: wasm_bindgen::JsValue) -> anyhow::Result<()> {
let config = MintConfig::from_js(config)?;
let mut dapp = BrowserDapp::injected(config);

// reconnect the wallet if the user already authorised the page
dapp.mount().await;
# Ok(()) }
```

Then forward the user's actions and render from [`Dapp::view`]:

```no_run
# use evm_mint_connector::{BrowserDapp, MintConfig};
#
# async fn test(mut dapp: BrowserDapp) -> anyhow::Result<()> {
dapp.connect().await?;
dapp.increment();
let hash = dapp.buy().await?;

let view = dapp.view();
println!("{} ({})", view.progress, view.status_message.unwrap_or_default());
# Ok(()) }
```

The building blocks ([`Wallet`], [`ConnectControl`], [`MintControl`]) can
also be used on their own. They talk to the outside world through the traits
of the [`client`] module.

*/

pub mod client;
pub mod config;
mod connect;
mod connected_wallet;
mod dapp;
pub mod error;
pub mod ethereum;
pub mod ffi;
mod http;
pub mod mint;
pub mod site;
mod state;
mod wallet;

pub use self::{
    config::{DisplayConfig, MintConfig},
    connect::ConnectControl,
    connected_wallet::ConnectedWallet,
    dapp::{BrowserDapp, Dapp, MintView, WalletEvent},
    ethereum::{Address, ChainId, TxHash, Wei},
    http::HttpProvider,
    mint::{MintControl, MintPhase, MintRequest, Quantity},
    state::{ConnectionState, SharedState},
    wallet::{Subscription, Wallet, injected},
};

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// The provider injected by the wallet extension, if any.
    #[wasm_bindgen(thread_local_v2, js_namespace = ["window"], js_name = "ethereum")]
    pub static ETHEREUM: Option<Eip1193Provider>;
}

#[wasm_bindgen]
extern "C" {
    #[derive(Clone, PartialEq)]
    pub type Eip1193Provider;

    /// Set by MetaMask (and by a number of wallets pretending to be
    /// MetaMask for compatibility).
    #[wasm_bindgen(method, getter, js_name = "isMetaMask")]
    pub fn is_meta_mask(this: &Eip1193Provider) -> Option<bool>;

    /// Submit an RPC request to the provider.
    ///
    /// `args` is a `{ method, params }` object. The promise resolves with the
    /// `result` of the RPC call or rejects with a `{ code, message }` error
    /// (EIP-1193 and EIP-1474 error codes).
    ///
    /// More details [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193#request-1)
    #[wasm_bindgen(method, catch)]
    pub async fn request(this: &Eip1193Provider, args: JsValue) -> Result<JsValue, JsValue>;

    /// Subscribe to provider events: `accountsChanged`, `chainChanged`,
    /// `connect` and `disconnect`.
    #[wasm_bindgen(method)]
    pub fn on(this: &Eip1193Provider, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method, js_name = "removeListener")]
    pub fn remove_listener(this: &Eip1193Provider, event: &str, listener: &js_sys::Function);
}

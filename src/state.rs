//! The page state shared by the connect button and the mint widget.

use crate::error::ProviderError;
use std::{cell::RefCell, rc::Rc};

/// What the page shows about the wallet connection and the last mint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// green text under the mint widget (success of the last mint)
    pub status_message: String,
    /// red banner; while it is set buying is disabled
    pub error_message: String,
    pub is_connecting: bool,
    /// the last error reported by the wallet while connecting
    pub connector_error: Option<ProviderError>,
}

impl ConnectionState {
    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }
}

/// Handle on the [`ConnectionState`] shared by the controls of one page.
///
/// Cloning the handle shares the state. Everything runs on the browser's
/// single thread, so this is an `Rc<RefCell<_>>`. The accessors never hand
/// out a borrow, so none can be held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedState(Rc<RefCell<ConnectionState>>);

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// a copy of the current state, for rendering
    pub fn snapshot(&self) -> ConnectionState {
        self.0.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&ConnectionState) -> R) -> R {
        f(&self.0.borrow())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut ConnectionState) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    pub fn error_message(&self) -> String {
        self.read(|state| state.error_message.clone())
    }

    pub fn set_error_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|state| state.error_message = message);
    }

    pub fn clear_error_message(&self) {
        self.update(|state| state.error_message.clear());
    }

    pub fn status_message(&self) -> String {
        self.read(|state| state.status_message.clone())
    }

    pub fn set_status_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|state| state.status_message = message);
    }

    pub fn is_connecting(&self) -> bool {
        self.read(|state| state.is_connecting)
    }

    pub fn set_connecting(&self, connecting: bool) {
        self.update(|state| state.is_connecting = connecting);
    }

    pub fn set_connector_error(&self, error: Option<ProviderError>) {
        self.update(|state| state.connector_error = error);
    }
}

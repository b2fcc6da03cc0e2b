//! Bindings to the objects the browser extensions inject in the page.

pub mod eip1193;

pub use self::eip1193::Eip1193Provider;

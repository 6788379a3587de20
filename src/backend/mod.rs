// ABOUTME: Transport backends and the factory that builds them from config
// ABOUTME: GSM is the only transport today; each new one adds a module and a factory arm

pub mod factory;
pub mod gsm;

pub use factory::{build_registry, create_backend};
pub use gsm::{GsmBackend, GsmSettings};

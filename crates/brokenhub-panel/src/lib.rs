//! brokenhub control panel library.
//!
//! Exposes the config store, reload trigger, and HTTP router so the binary
//! and the integration tests build the same application.

pub mod daemon_view;
pub mod error;
pub mod panel;
pub mod record;
pub mod reload;
pub mod render;
pub mod settings;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod test_util;

//! Event-driven side effects and reconciliation for the fuel price service.
//!
//! - [`domain`]: events, dispatcher, handlers, notification queue, sweeps,
//!   and the ports they depend on.
//! - [`outbound`]: Redis/in-memory cache stores and the HTTP mail relay.
//! - [`runtime`]: background task startup and shutdown.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod runtime;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::SideEffectSettings;
pub use runtime::{BackgroundServices, ReconciliationPorts};

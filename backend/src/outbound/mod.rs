//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **cache**: Redis-backed and in-memory [`crate::domain::ports::CacheStore`]
//! - **mail**: HTTP mail relay and log-only
//!   [`crate::domain::ports::NotificationTransport`]
//!
//! [`OutboundAdapters::from_settings`] selects between them from
//! [`crate::SideEffectSettings`].
//!
//! Adapters translate between domain types and wire representations and
//! contain no business logic.

mod adapters;
pub mod cache;
pub mod mail;

pub use adapters::{CacheBackend, MailBackend, OutboundAdapters, OutboundSetupError};

//! Test utilities for the fuelwatch crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

mod clock;
pub mod fixtures;
mod repositories;
mod transport;

pub use clock::MutableClock;
pub use repositories::{
    InMemoryAccounts, InMemoryBans, InMemoryProposals, InMemoryReports, InMemoryStatistics,
};
pub use transport::RecordingTransport;

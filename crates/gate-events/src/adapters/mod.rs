//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the outbound connection port.

mod mock_ledger;

pub use mock_ledger::MockLedger;

//! # LedgerGate Test Suite
//!
//! Unified test crate for flows that span gate-types, gate-checkpoint,
//! and gate-events together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Shared doubles and helpers
//! └── integration/      # Cross-crate listener and checkpoint flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p gate-tests
//!
//! # By category
//! cargo test -p gate-tests integration::
//! ```

pub mod integration;
pub mod support;

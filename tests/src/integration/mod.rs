//! # Integration Flows
//!
//! Cross-crate scenarios driving the registry, cursors, and checkpoint
//! stores together over the in-process ledger.

pub mod listener_flows;

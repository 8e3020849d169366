//! Chat widget core
//!
//! A conversation state machine driving a single-flight request lifecycle
//! against a remote agent, with best-effort persistence and a terminal
//! presentation layer.

pub mod client;
pub mod config;
pub mod runtime;
pub mod state_machine;
pub mod store;
pub mod ui;

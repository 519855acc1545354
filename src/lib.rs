//! wNCG bridge relay.
//!
//! Watches a source chain for bridge events, waits for them to be buried under enough
//! confirmations and reacts to each one exactly once, checkpointing progress so a restart neither
//! repeats nor skips work. The wired direction pays out Ethereum wNCG burns as NCG on Nine
//! Chronicles.
//!
//! # Module Structure
//!
//! - `bootstrap`: Wires configuration into a running relay
//! - `models`: Configuration, chain payloads and progress locations
//! - `services`: Monitors, observers, chain clients, state, transfers and notifications
//! - `utils`: Logging, HTTP, parsing and amount helpers

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;

//! Core services implementing the relay.
//!
//! - `blockchain`: Ethereum and Nine Chronicles transports, clients and event sources
//! - `monitor`: the publish/subscribe engine and the confirmation-depth poller
//! - `notification`: Slack notifications
//! - `observer`: consumers of published batches (burn payouts)
//! - `state`: durable checkpoints
//! - `transfer`: NCG payouts

pub mod blockchain;
pub mod monitor;
pub mod notification;
pub mod observer;
pub mod state;
pub mod transfer;

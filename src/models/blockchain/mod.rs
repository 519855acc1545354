//! Chain-specific payloads: Ethereum JSON-RPC shapes and the Nine Chronicles headless shapes.

pub mod ethereum;
pub mod nine_chronicles;

pub use ethereum::{burn_event_topic, BlockHeader, BurnEvent, RpcLog, BURN_EVENT_SIGNATURE};
pub use nine_chronicles::{NcgTransferHistory, NcgTransferredEvent};

//! Chain clients and the [`ChainEventSource`](crate::services::monitor::ChainEventSource)
//! implementations built on them.

mod ethereum;
mod headless;

pub use ethereum::{EthereumBurnEventSource, EthereumClient};
pub use headless::{
	HeadlessClientTrait, HeadlessGraphQLClient, NineChroniclesTransferredEventSource,
};

//! Blockchain access.
//!
//! - `transports`: JSON-RPC and GraphQL over HTTP with retries and endpoint rotation
//! - `clients`: Ethereum and Nine Chronicles headless clients plus their event sources

mod clients;
mod transports;

pub use clients::{
	EthereumBurnEventSource, EthereumClient, HeadlessClientTrait, HeadlessGraphQLClient,
	NineChroniclesTransferredEventSource,
};
pub use transports::{
	BlockchainTransport, EndpointManager, GraphQLTransportClient, HttpTransportClient,
	RotatingTransport, TransientErrorRetryStrategy, TransportError, ROTATE_ON_ERROR_CODES,
};

//! Transfer error types.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Errors raised while paying out on the destination chain
#[derive(ThisError, Debug)]
pub enum TransferError {
	/// The request was rejected before reaching the node
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// Nonce lookup or submission failed
	#[error("Network error: {0}")]
	NetworkError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl TransferError {
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn network_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::NetworkError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for TransferError {
	fn trace_id(&self) -> String {
		match self {
			Self::ValidationError(ctx) | Self::NetworkError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}

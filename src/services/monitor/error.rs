//! Monitor error types.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Errors raised by the polling engine
#[derive(ThisError, Debug)]
pub enum MonitorError {
	/// A chain query failed (tip, block hash, block index or events)
	#[error("Network error: {0}")]
	NetworkError(ErrorContext),

	/// The monitor was driven incorrectly, e.g. started twice
	#[error("Processing error: {0}")]
	ProcessingError(ErrorContext),

	/// A subscriber failed to handle a delivered item
	#[error("Delivery error: {0}")]
	DeliveryError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl MonitorError {
	pub fn network_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::NetworkError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn processing_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ProcessingError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn delivery_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::DeliveryError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for MonitorError {
	fn trace_id(&self) -> String {
		match self {
			Self::NetworkError(ctx) | Self::ProcessingError(ctx) | Self::DeliveryError(ctx) => {
				ctx.trace_id.clone()
			}
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}

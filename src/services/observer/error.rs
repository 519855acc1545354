//! Observer error types.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Errors an observer hands back to the engine
#[derive(ThisError, Debug)]
pub enum ObserverError {
	/// An event could not be acted on, e.g. its amount is not representable
	#[error("Processing error: {0}")]
	ProcessingError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl ObserverError {
	pub fn processing_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ProcessingError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for ObserverError {
	fn trace_id(&self) -> String {
		match self {
			Self::ProcessingError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}

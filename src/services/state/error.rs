//! State store error types.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

#[derive(ThisError, Debug)]
pub enum StateStoreError {
	/// Reading or writing the backing storage failed
	#[error("Storage error: {0}")]
	StorageError(ErrorContext),

	/// Stored content could not be decoded
	#[error("Corrupted state: {0}")]
	CorruptedState(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl StateStoreError {
	pub fn storage_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::StorageError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn corrupted_state(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::CorruptedState(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for StateStoreError {
	fn trace_id(&self) -> String {
		match self {
			Self::StorageError(ctx) | Self::CorruptedState(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}

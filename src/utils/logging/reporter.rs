//! Error tracking sink.
//!
//! Failures that the relay survives (a failed tick, a failed subscriber, a checkpoint that could
//! not be written) are handed to an [`ErrorReporter`] so they end up somewhere an operator looks.

use crate::utils::logging::error::{format_error_chain, TraceableError};

/// Fire-and-forget sink for errors the relay recovers from
pub trait ErrorReporter: Send + Sync {
	/// Records `error`. Must not fail or block for long.
	fn capture(&self, error: &(dyn std::error::Error + Send + Sync + 'static));
}

/// Reports errors through `tracing` with their full cause chain and trace id
#[derive(Debug, Default, Clone)]
pub struct TracingErrorReporter;

impl TracingErrorReporter {
	pub fn new() -> Self {
		Self
	}
}

impl ErrorReporter for TracingErrorReporter {
	fn capture(&self, error: &(dyn std::error::Error + Send + Sync + 'static)) {
		tracing::error!(
			trace_id = %error.trace_id(),
			error.chain = %format_error_chain(error),
			"Captured error"
		);
	}
}

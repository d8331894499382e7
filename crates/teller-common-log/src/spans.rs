//! Span helpers for access-control operations.

use tracing::{info_span, Span};

/// Span for a permission catalog fetch.
pub fn catalog_span(generation: u64) -> Span {
    info_span!(
        "catalog_fetch",
        generation = generation,
        error = tracing::field::Empty
    )
}

/// Span for a session operation (`check`, `login`, `logout`).
pub fn session_span(operation: &'static str) -> Span {
    info_span!("session", op = operation, error = tracing::field::Empty)
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
    }
}

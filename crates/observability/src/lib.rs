//! Shared tracing/logging setup for processes embedding the billing core.

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call from every test/binary entry point; only the first call
/// installs a subscriber.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

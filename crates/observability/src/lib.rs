//! Tracing/logging setup shared by OrderDesk binaries.

/// Initialize process-wide observability with JSON logs.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json);
}

/// Initialize with human-readable output (interactive tools).
pub fn init_pretty() {
    tracing::init(tracing::LogFormat::Pretty);
}

/// Tracing configuration (filters, formatters).
pub mod tracing;

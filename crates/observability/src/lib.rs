//! Process-wide logging setup shared by the binaries.

/// Install the global subscriber, format picked from `LOG_FORMAT`.
///
/// Later calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber construction (filter, formatter).
pub mod tracing;

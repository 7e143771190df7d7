//! Error Reporting Module
//!
//! The collaborator that producer failures are forwarded to before they are
//! re-raised to the caller. The query layer treats reporting as
//! fire-and-forget: a reporter that fails is logged and ignored so it can
//! never displace the original failure.

use std::fmt;

use tracing::{error, warn};

// == Severity ==
/// Severity attached to a forwarded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

// == Error Context ==
/// Contextual metadata attached to a reported failure.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The logical query key the caller asked for
    pub key: String,
    /// The cache key actually used (differs when a key override is in play)
    pub effective_key: String,
}

// == Error Reporter ==
/// External error-reporting collaborator.
///
/// Implementations forward the failure to whatever telemetry sink the
/// application uses. A failed `report` is absorbed by the caller, so
/// implementations may freely return errors for transport problems.
pub trait ErrorReporter: Send + Sync {
    fn report(
        &self,
        error: &anyhow::Error,
        severity: Severity,
        context: &ErrorContext,
    ) -> anyhow::Result<()>;
}

// == Tracing Reporter ==
/// Default reporter that logs through `tracing`.
///
/// Keeps the crate usable without an external telemetry sink; applications
/// plug in their own `ErrorReporter` for real error collection.
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(
        &self,
        err: &anyhow::Error,
        severity: Severity,
        context: &ErrorContext,
    ) -> anyhow::Result<()> {
        match severity {
            Severity::Warning => warn!(
                key = %context.key,
                effective_key = %context.effective_key,
                "query failed: {err:#}"
            ),
            Severity::Error | Severity::Critical => error!(
                key = %context.key,
                effective_key = %context.effective_key,
                severity = %severity,
                "query failed: {err:#}"
            ),
        }
        Ok(())
    }
}

//! Common error infrastructure for tower-core.
//!
//! Domain-specific errors (`SchedulerError`, `EffectError`, `LifecycleError`,
//! `ConfigError`) live next to the operations they guard. This module provides
//! the shared classification every one of them implements.
//!
//! Idempotent operations (duplicate activation, cancelling an absent timer)
//! are defined as no-ops and never produce an error.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: transient races that a later event resolves
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: configuration errors; retrying without fixing data cannot succeed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - a later event may succeed.
    ///
    /// Examples: target destroyed before its tick fired
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: zero period, malformed action id
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: duplicate timer where the caller already checked for one
    Internal,

    /// Fatal error - the triggering operation is aborted.
    ///
    /// Examples: unresolvable turret prefab, unknown effect kind
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or broken configuration.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all tower-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

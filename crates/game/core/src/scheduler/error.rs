//! Scheduler errors.

use crate::error::{CoreError, ErrorSeverity};
use crate::scheduler::ActionKey;

/// Errors raised when registering timers.
///
/// Cancelling an absent timer is not an error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// A timer with the same owner and id is already armed.
    #[error("action {0} is already scheduled")]
    DuplicateAction(ActionKey),

    /// Periodic timers must advance time on every firing.
    #[error("periodic action {0} must have a non-zero period")]
    ZeroPeriod(ActionKey),
}

impl CoreError for SchedulerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            // Callers check for existing timers first; reaching this is a bug
            Self::DuplicateAction(_) => ErrorSeverity::Internal,
            Self::ZeroPeriod(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateAction(_) => "SCHEDULER_DUPLICATE_ACTION",
            Self::ZeroPeriod(_) => "SCHEDULER_ZERO_PERIOD",
        }
    }
}

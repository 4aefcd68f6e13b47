use crate::effect::EffectError;
use crate::error::{CoreError, ErrorSeverity};
use crate::scheduler::SchedulerError;

/// Errors raised while a tower changes phase or scans.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The turret prefab could not be resolved.
    #[error("turret prefab '{0}' not found")]
    PrefabNotFound(String),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl CoreError for LifecycleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PrefabNotFound(_) => ErrorSeverity::Fatal,
            Self::Effect(e) => e.severity(),
            Self::Scheduler(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PrefabNotFound(_) => "LIFECYCLE_PREFAB_NOT_FOUND",
            Self::Effect(e) => e.error_code(),
            Self::Scheduler(e) => e.error_code(),
        }
    }
}

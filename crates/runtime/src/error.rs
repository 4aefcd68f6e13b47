//! Unified error type surfaced by the runtime.
//!
//! Wraps core failures so callers can bubble them up with one type while
//! keeping the core's severity classification.

use thiserror::Error;
use tower_core::{
    ConfigError, CoreError, EffectError, EntityId, ErrorSeverity, LifecycleError, SchedulerError,
};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("invalid runtime configuration")]
    Config(#[from] ConfigError),

    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    #[error("entity {0} is not a tower")]
    NotATower(EntityId),

    #[error("entity {0} is not a tower item")]
    NotAnItem(EntityId),

    #[error("scenario refers to unknown entity '{0}'")]
    UnknownName(String),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Lifecycle(e) => e.severity(),
            Self::Effect(e) => e.severity(),
            Self::Scheduler(e) => e.severity(),
            Self::Config(e) => e.severity(),
            Self::UnknownEntity(_) | Self::NotATower(_) | Self::NotAnItem(_) => {
                ErrorSeverity::Validation
            }
            Self::UnknownName(_) | Self::InvalidScenario(_) => ErrorSeverity::Fatal,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Lifecycle(e) => e.error_code(),
            Self::Effect(e) => e.error_code(),
            Self::Scheduler(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::UnknownEntity(_) => "RUNTIME_UNKNOWN_ENTITY",
            Self::NotATower(_) => "RUNTIME_NOT_A_TOWER",
            Self::NotAnItem(_) => "RUNTIME_NOT_AN_ITEM",
            Self::UnknownName(_) => "RUNTIME_UNKNOWN_NAME",
            Self::InvalidScenario(_) => "RUNTIME_INVALID_SCENARIO",
        }
    }
}

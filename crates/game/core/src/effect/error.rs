use crate::effect::EffectKind;
use crate::error::{CoreError, ErrorSeverity};
use crate::scheduler::SchedulerError;
use crate::state::EntityId;

/// Errors raised while applying or ticking effects.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    /// The effect kind has no definition in the registry.
    #[error("effect '{0}' is not registered")]
    UnknownEffect(EffectKind),

    /// An entity listed as an effector carries no effector component.
    #[error("entity {0} has no effector component")]
    MissingEffector(EntityId),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl CoreError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEffect(_) | Self::MissingEffector(_) => ErrorSeverity::Fatal,
            Self::Scheduler(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEffect(_) => "EFFECT_UNKNOWN_KIND",
            Self::MissingEffector(_) => "EFFECT_MISSING_EFFECTOR",
            Self::Scheduler(e) => e.error_code(),
        }
    }
}

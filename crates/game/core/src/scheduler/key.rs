//! Composite timer keys.

use std::fmt;
use std::str::FromStr;

use crate::effect::EffectKind;
use crate::state::EntityId;

/// What a timer is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionPurpose {
    /// Periodic target scan of a tower.
    Scan,
    /// Periodic damage tick of an effect.
    ApplyEffect(EffectKind),
    /// Expiry of an effect.
    EndEffect(EffectKind),
}

impl fmt::Display for ActionPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::ApplyEffect(kind) => write!(f, "apply_{kind}"),
            Self::EndEffect(kind) => write!(f, "end_{kind}"),
        }
    }
}

/// Timer identifier: a purpose plus the entity that caused it.
///
/// For effect timers the source is the effector, so a firing carries enough
/// information to find the effector's parameters. Timers live on the target
/// entity, which makes every `(purpose, effector, target)` triple unique.
///
/// The textual form `purpose|source` is used in logs and round-trips through
/// [`FromStr`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId {
    purpose: ActionPurpose,
    source: EntityId,
}

impl ActionId {
    pub const SEPARATOR: char = '|';

    pub fn new(purpose: ActionPurpose, source: EntityId) -> Self {
        Self { purpose, source }
    }

    /// Scan timer of `tower`.
    pub fn scan(tower: EntityId) -> Self {
        Self::new(ActionPurpose::Scan, tower)
    }

    /// Periodic tick timer of `kind` applied by `effector`.
    pub fn apply(kind: EffectKind, effector: EntityId) -> Self {
        Self::new(ActionPurpose::ApplyEffect(kind), effector)
    }

    /// Expiry timer of `kind` applied by `effector`.
    pub fn end(kind: EffectKind, effector: EntityId) -> Self {
        Self::new(ActionPurpose::EndEffect(kind), effector)
    }

    pub fn purpose(&self) -> ActionPurpose {
        self.purpose
    }

    /// Entity encoded in this id.
    pub fn source(&self) -> EntityId {
        self.source
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.purpose, Self::SEPARATOR, self.source.0)
    }
}

/// Errors produced when parsing the textual form of an [`ActionId`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionIdParseError {
    #[error("action id '{0}' has no source separator")]
    MissingSeparator(String),

    #[error("unknown action purpose '{0}'")]
    UnknownPurpose(String),

    #[error("invalid source entity '{0}'")]
    InvalidSource(String),
}

impl FromStr for ActionPurpose {
    type Err = ActionIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ActionIdParseError::UnknownPurpose(s.to_string());
        if s == "scan" {
            return Ok(Self::Scan);
        }
        if let Some(kind) = s.strip_prefix("apply_") {
            return EffectKind::from_str(kind)
                .map(Self::ApplyEffect)
                .map_err(|_| unknown());
        }
        if let Some(kind) = s.strip_prefix("end_") {
            return EffectKind::from_str(kind)
                .map(Self::EndEffect)
                .map_err(|_| unknown());
        }
        Err(unknown())
    }
}

impl FromStr for ActionId {
    type Err = ActionIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (purpose, source) = s
            .rsplit_once(Self::SEPARATOR)
            .ok_or_else(|| ActionIdParseError::MissingSeparator(s.to_string()))?;
        let source = source
            .parse::<u64>()
            .map_err(|_| ActionIdParseError::InvalidSource(source.to_string()))?;
        Ok(Self::new(purpose.parse()?, EntityId(source)))
    }
}

/// Full timer address: owner entity plus action id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionKey {
    pub owner: EntityId,
    pub id: ActionId,
}

impl ActionKey {
    pub fn new(owner: EntityId, id: ActionId) -> Self {
        Self { owner, id }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.owner)
    }
}

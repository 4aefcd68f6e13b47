use std::collections::HashMap;

use crate::config::ConfigError;
use crate::effect::{EffectDefinition, EffectError, EffectKind};

/// Lookup table from effect kind to its definition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectRegistry {
    definitions: HashMap<EffectKind, EffectDefinition>,
}

impl EffectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the stock definitions of every [`EffectKind`].
    pub fn builtin() -> Self {
        let definitions = [
            EffectDefinition::poison(),
            EffectDefinition::damage_over_time(),
            EffectDefinition::strike(),
        ];
        Self {
            definitions: definitions
                .into_iter()
                .map(|definition| (definition.kind, definition))
                .collect(),
        }
    }

    /// Builds a registry from definitions, rejecting invalid or repeated kinds.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = EffectDefinition>,
    ) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for definition in definitions {
            if registry.definitions.contains_key(&definition.kind) {
                return Err(ConfigError::DuplicateEffect(definition.kind));
            }
            registry.insert(definition)?;
        }
        Ok(registry)
    }

    /// Inserts or replaces a definition after validating it.
    pub fn insert(&mut self, definition: EffectDefinition) -> Result<(), ConfigError> {
        definition.validate()?;
        self.definitions.insert(definition.kind, definition);
        Ok(())
    }

    pub fn get(&self, kind: EffectKind) -> Option<&EffectDefinition> {
        self.definitions.get(&kind)
    }

    /// Like [`get`](Self::get), but a missing kind is a configuration error.
    pub fn require(&self, kind: EffectKind) -> Result<&EffectDefinition, EffectError> {
        self.get(kind).ok_or(EffectError::UnknownEffect(kind))
    }

    /// Returns an iterator over all registered kinds.
    pub fn kinds(&self) -> impl Iterator<Item = EffectKind> + '_ {
        self.definitions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

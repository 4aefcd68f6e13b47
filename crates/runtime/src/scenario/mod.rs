//! Scripted scenarios for driving a runtime from data.
//!
//! A scenario places named towers and enemies, then runs a list of steps
//! (advancing time, toggling towers, moving or destroying entities). Names
//! let steps refer to entities whose ids are only allocated at run time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tower_core::{EffectKind, EntityId, Vec3};
use tracing::info;

use crate::error::{Result, RuntimeError};
use crate::runtime::{Runtime, TowerSpec};

/// Tower placement specification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerPlacement {
    pub name: String,
    pub position: Vec3,
    pub range: f32,
    #[serde(default)]
    pub attack_speed_ms: Option<u64>,
    #[serde(default = "default_multiplier")]
    pub multiplier: f32,
    #[serde(default = "default_activated")]
    pub activated: bool,
    #[serde(default)]
    pub effectors: Vec<EffectKind>,
}

fn default_multiplier() -> f32 {
    1.0
}

fn default_activated() -> bool {
    true
}

impl TowerPlacement {
    fn spec(&self) -> TowerSpec {
        TowerSpec {
            position: self.position,
            range: self.range,
            attack_speed_ms: self.attack_speed_ms,
            multiplier: self.multiplier,
            activated: self.activated,
            effectors: self.effectors.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyPlacement {
    pub name: String,
    pub position: Vec3,
}

/// One scripted step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Advance simulated time by this many milliseconds.
    Advance(u64),
    Toggle { tower: String, activated: bool },
    Move { entity: String, to: Vec3 },
    /// Convert a tower into an item; the name follows the item.
    PickUp(String),
    /// Place a picked-up tower; the name follows the new tower.
    Place { tower: String, at: Vec3 },
    Destroy(String),
}

/// Scenario configuration for a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub towers: Vec<TowerPlacement>,
    #[serde(default)]
    pub enemies: Vec<EnemyPlacement>,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

/// Entities and damage totals after a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// Current entity of every name, including destroyed ones.
    pub entities: BTreeMap<String, EntityId>,
    /// Total damage delivered to each named enemy.
    pub damage: BTreeMap<String, u64>,
}

impl ScenarioOutcome {
    pub fn entity(&self, name: &str) -> Option<EntityId> {
        self.entities.get(name).copied()
    }

    pub fn damage_to(&self, name: &str) -> u64 {
        self.damage.get(name).copied().unwrap_or(0)
    }
}

impl Scenario {
    /// Load scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::InvalidScenario(format!(
                "Failed to read scenario file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = ron::from_str(content).map_err(|e| {
            RuntimeError::InvalidScenario(format!("Failed to parse scenario RON: {}", e))
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Rejects duplicate names so every step resolves to one entity.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        let names = self
            .towers
            .iter()
            .map(|t| &t.name)
            .chain(self.enemies.iter().map(|e| &e.name));
        for name in names {
            if !seen.insert(name) {
                return Err(RuntimeError::InvalidScenario(format!(
                    "entity name '{}' is used more than once",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Places every entity and runs every step against `runtime`.
    pub fn run(&self, runtime: &mut Runtime) -> Result<ScenarioOutcome> {
        info!(
            target: "tower_runtime::scenario",
            towers = self.towers.len(),
            enemies = self.enemies.len(),
            steps = self.steps.len(),
            "running scenario"
        );

        let mut outcome = ScenarioOutcome::default();
        for enemy in &self.enemies {
            let id = runtime.spawn_enemy(enemy.position);
            outcome.entities.insert(enemy.name.clone(), id);
        }
        for tower in &self.towers {
            let id = runtime.spawn_tower(tower.spec())?;
            outcome.entities.insert(tower.name.clone(), id);
        }

        for step in &self.steps {
            match step {
                ScenarioStep::Advance(ms) => runtime.advance(*ms)?,
                ScenarioStep::Toggle { tower, activated } => {
                    runtime.request_activation(lookup(&outcome, tower)?, *activated)?
                }
                ScenarioStep::Move { entity, to } => {
                    runtime.move_entity(lookup(&outcome, entity)?, *to)?
                }
                ScenarioStep::PickUp(tower) => {
                    let item = runtime.pick_up(lookup(&outcome, tower)?)?;
                    outcome.entities.insert(tower.clone(), item);
                }
                ScenarioStep::Place { tower, at } => {
                    let placed = runtime.place(lookup(&outcome, tower)?, *at)?;
                    outcome.entities.insert(tower.clone(), placed);
                }
                ScenarioStep::Destroy(entity) => runtime.destroy(lookup(&outcome, entity)?)?,
            }
        }

        for enemy in &self.enemies {
            let id = lookup(&outcome, &enemy.name)?;
            outcome
                .damage
                .insert(enemy.name.clone(), runtime.world().damage_to(id));
        }
        Ok(outcome)
    }
}

fn lookup(outcome: &ScenarioOutcome, name: &str) -> Result<EntityId> {
    outcome
        .entity(name)
        .ok_or_else(|| RuntimeError::UnknownName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps_and_defaults() {
        let scenario = Scenario::parse(
            r#"(
                towers: [(name: "t", position: (x: 0.0, y: 0.0, z: 0.0), range: 5.0)],
                enemies: [(name: "e", position: (x: 1.0, y: 0.0, z: 0.0))],
                steps: [
                    Advance(1000),
                    Toggle(tower: "t", activated: false),
                    Move(entity: "e", to: (x: 2.0, y: 0.0, z: 0.0)),
                    PickUp("t"),
                    Place(tower: "t", at: (x: 3.0, y: 0.0, z: 0.0)),
                    Destroy("e"),
                ],
            )"#,
        )
        .unwrap();

        let tower = &scenario.towers[0];
        assert!(tower.activated);
        assert_eq!(tower.multiplier, 1.0);
        assert_eq!(tower.attack_speed_ms, None);
        assert_eq!(scenario.steps.len(), 6);
        assert_eq!(scenario.steps[0], ScenarioStep::Advance(1000));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Scenario::parse(
            r#"(
                towers: [(name: "a", position: (x: 0.0, y: 0.0, z: 0.0), range: 1.0)],
                enemies: [(name: "a", position: (x: 0.0, y: 0.0, z: 0.0))],
            )"#,
        )
        .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidScenario(_)));
    }

    #[test]
    fn unknown_names_fail_the_run() {
        let scenario = Scenario {
            steps: vec![ScenarioStep::Destroy("ghost".into())],
            ..Scenario::default()
        };
        let mut runtime = Runtime::builder().build().unwrap();

        let err = scenario.run(&mut runtime).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownName(name) if name == "ghost"));
    }
}

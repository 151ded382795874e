//! Authored move-set data.
//!
//! Move sets are authored offline as RON or JSON, validated here, and built
//! into the immutable runtime structures. Attacks are declared once in a
//! table and referenced by id from moves, so two moves naming the same id
//! share one `AttackDefinition` by reference.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::attack::{AttackDefinition, ClipHandle, DamageSpec, HitVolume};
use crate::combat::moveset::{ComboMove, InputSymbol, MoveSet, SimpleMove};
use crate::combat::window::AttackWindow;

/// Validation failures for authored move-set data.
#[derive(Debug, Error)]
pub enum MoveSetConfigError {
    #[error("move set defines no moves")]
    Empty,
    #[error("attack `{0}` has non-positive duration {1}")]
    NonPositiveDuration(String, f32),
    #[error("attack `{0}` referenced by `{1}` is not defined")]
    UnknownAttack(String, String),
    #[error("simple move `{0}` has no attacks in its cycle")]
    EmptyAttackCycle(String),
    #[error("combo move `{0}` has an empty input sequence")]
    EmptySequence(String),
    #[error("simple moves `{1}` and `{2}` share the trigger {0:?}; triggers must be unique")]
    DuplicateTrigger(InputSymbol, String, String),
}

/// One authored attack. Window values are normalized times; out-of-range
/// values are clamped at build, matching the runtime window semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackDef {
    pub hit_center: [f32; 3],
    pub hit_half_extents: [f32; 3],
    pub base_damage: f32,
    pub window: Vec<f32>,
    pub duration: f32,
    pub clip: String,
}

impl AttackDef {
    fn to_attack(&self, name: &str) -> AttackDefinition {
        AttackDefinition {
            name: name.to_string(),
            hit_volume: HitVolume {
                center: Vec3::from_array(self.hit_center),
                half_extents: Vec3::from_array(self.hit_half_extents),
            },
            damage: DamageSpec {
                base_damage: self.base_damage,
            },
            window: AttackWindow::new(&self.window),
            duration: self.duration,
            clip: ClipHandle::new(self.clip.clone()),
        }
    }
}

/// An authored single-symbol move with its repeat cycle of attack ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleMoveDef {
    pub name: String,
    pub trigger: InputSymbol,
    pub attacks: Vec<String>,
}

/// An authored chained move: the exact sequence and its attack id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboMoveDef {
    pub name: String,
    pub sequence: Vec<InputSymbol>,
    pub attack: String,
}

/// A full authored move set: attack table plus moves referencing it by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveSetDef {
    pub attacks: BTreeMap<String, AttackDef>,
    pub basic_moves: Vec<SimpleMoveDef>,
    pub combo_moves: Vec<ComboMoveDef>,
}

impl MoveSetDef {
    /// Validate and build the runtime move set. Attacks referenced by several
    /// moves resolve to the same shared definition.
    pub fn build(&self) -> Result<MoveSet, MoveSetConfigError> {
        if self.basic_moves.is_empty() && self.combo_moves.is_empty() {
            return Err(MoveSetConfigError::Empty);
        }

        let mut attacks: BTreeMap<&str, Arc<AttackDefinition>> = BTreeMap::new();
        for (id, def) in &self.attacks {
            if def.duration <= 0.0 {
                return Err(MoveSetConfigError::NonPositiveDuration(
                    id.clone(),
                    def.duration,
                ));
            }
            attacks.insert(id.as_str(), Arc::new(def.to_attack(id)));
        }

        let lookup = |id: &str, owner: &str| {
            attacks.get(id).cloned().ok_or_else(|| {
                MoveSetConfigError::UnknownAttack(id.to_string(), owner.to_string())
            })
        };

        let mut seen_triggers: Vec<(InputSymbol, &str)> = Vec::new();
        let mut basic_moves = Vec::with_capacity(self.basic_moves.len());
        for mv in &self.basic_moves {
            if mv.attacks.is_empty() {
                return Err(MoveSetConfigError::EmptyAttackCycle(mv.name.clone()));
            }
            if let Some((_, first)) = seen_triggers.iter().find(|(t, _)| *t == mv.trigger) {
                return Err(MoveSetConfigError::DuplicateTrigger(
                    mv.trigger,
                    first.to_string(),
                    mv.name.clone(),
                ));
            }
            seen_triggers.push((mv.trigger, &mv.name));

            let cycle = mv
                .attacks
                .iter()
                .map(|id| lookup(id, &mv.name))
                .collect::<Result<Vec<_>, _>>()?;
            basic_moves.push(SimpleMove {
                name: mv.name.clone(),
                trigger: mv.trigger,
                attacks: cycle,
            });
        }

        let mut combo_moves = Vec::with_capacity(self.combo_moves.len());
        for mv in &self.combo_moves {
            if mv.sequence.is_empty() {
                return Err(MoveSetConfigError::EmptySequence(mv.name.clone()));
            }
            combo_moves.push(ComboMove {
                name: mv.name.clone(),
                sequence: mv.sequence.clone(),
                attack: lookup(&mv.attack, &mv.name)?,
            });
        }

        Ok(MoveSet::new(basic_moves, combo_moves))
    }
}

/// Load and validate a move set from disk. `.json` parses as JSON, anything
/// else as RON.
pub fn load_move_set(path: impl AsRef<Path>) -> anyhow::Result<MoveSet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading move set `{}`", path.display()))?;

    let def: MoveSetDef = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("parsing JSON move set `{}`", path.display()))?,
        _ => ron::from_str(&text)
            .with_context(|| format!("parsing RON move set `{}`", path.display()))?,
    };

    let set = def
        .build()
        .with_context(|| format!("validating move set `{}`", path.display()))?;
    Ok(set)
}

/// Template move set: punch cycle, kick, and two launcher combos.
/// Useful as an authoring starting point and as a test/bench fixture.
pub fn brawler() -> MoveSetDef {
    let attack = |center: [f32; 3],
                  half: [f32; 3],
                  damage: f32,
                  window: &[f32],
                  duration: f32,
                  clip: &str| AttackDef {
        hit_center: center,
        hit_half_extents: half,
        base_damage: damage,
        window: window.to_vec(),
        duration,
        clip: clip.into(),
    };

    MoveSetDef {
        attacks: BTreeMap::from([
            (
                "jab".into(),
                attack(
                    [0.0, 1.2, 0.8],
                    [0.4, 0.3, 0.6],
                    8.0,
                    &[0.15, 0.5],
                    0.35,
                    "clips/jab",
                ),
            ),
            (
                "hook".into(),
                attack(
                    [0.3, 1.2, 0.7],
                    [0.5, 0.3, 0.7],
                    14.0,
                    &[0.2, 0.6],
                    0.45,
                    "clips/hook",
                ),
            ),
            (
                "kick".into(),
                attack(
                    [0.0, 0.8, 1.0],
                    [0.4, 0.4, 0.9],
                    12.0,
                    &[0.25, 0.65],
                    0.5,
                    "clips/kick",
                ),
            ),
            (
                "rising-knee".into(),
                attack(
                    [0.0, 1.0, 0.9],
                    [0.4, 0.8, 0.6],
                    20.0,
                    &[0.2, 0.7],
                    0.8,
                    "clips/rising_knee",
                ),
            ),
            (
                "spin-slam".into(),
                attack(
                    [0.0, 1.0, 0.0],
                    [1.2, 0.6, 1.2],
                    28.0,
                    &[0.3, 0.8],
                    1.1,
                    "clips/spin_slam",
                ),
            ),
        ]),
        basic_moves: vec![
            SimpleMoveDef {
                name: "punch".into(),
                trigger: InputSymbol::LightAttack,
                attacks: vec!["jab".into(), "jab".into(), "hook".into()],
            },
            SimpleMoveDef {
                name: "kick".into(),
                trigger: InputSymbol::HeavyAttack,
                attacks: vec!["kick".into()],
            },
        ],
        combo_moves: vec![
            ComboMoveDef {
                name: "launcher".into(),
                sequence: vec![InputSymbol::Up, InputSymbol::Up],
                attack: "rising-knee".into(),
            },
            ComboMoveDef {
                name: "whirlwind".into(),
                sequence: vec![
                    InputSymbol::Up,
                    InputSymbol::Up,
                    InputSymbol::Down,
                ],
                attack: "spin-slam".into(),
            },
        ],
    }
}

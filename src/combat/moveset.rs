//! Move sets: the authoritative table of simple and combo moves.
//!
//! Matching rules:
//! - Basic moves match on the most recent buffered symbol; the first declared
//!   move with that trigger wins, and repeated presses cycle through its
//!   attack list.
//! - Combo moves match their full sequence as an exact prefix of the buffer.
//!   Combos are stable-sorted longest-sequence-first once at construction, so
//!   the first match is the longest match and equal-length ties keep authored
//!   order.

use std::cmp::Reverse;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::attack::{AnimationSink, AttackDefinition};

/// Discrete input alphabet recognized by the combo system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSymbol {
    Up,
    Down,
    Left,
    Right,
    LightAttack,
    HeavyAttack,
    Special,
    Guard,
}

/// A single-symbol move with a repeat cycle of attacks.
/// Pressing the trigger repeatedly steps through `attacks` modulo its length.
#[derive(Debug, Clone)]
pub struct SimpleMove {
    pub name: String,
    pub trigger: InputSymbol,
    pub attacks: Vec<Arc<AttackDefinition>>,
}

impl SimpleMove {
    pub fn matches(&self, symbol: InputSymbol) -> bool {
        self.trigger == symbol
    }
}

/// A chained move triggered by an exact input sequence.
#[derive(Debug, Clone)]
pub struct ComboMove {
    pub name: String,
    pub sequence: Vec<InputSymbol>,
    pub attack: Arc<AttackDefinition>,
}

impl ComboMove {
    /// Exact element-wise match of the sequence against the oldest
    /// `sequence.len()` buffered symbols. No wildcards.
    pub fn matches(&self, buffer: &[InputSymbol]) -> bool {
        buffer.len() >= self.sequence.len() && buffer[..self.sequence.len()] == self.sequence[..]
    }
}

/// What a buffer resolves to: an immediate basic attack, a pending combo,
/// both, or neither.
#[derive(Debug, Clone, Default)]
pub struct ComboResolution {
    /// Fires immediately on the press that resolved it.
    pub basic_attack: Option<Arc<AttackDefinition>>,
    /// Deferred until the buffer flushes; index into the sorted combo table.
    pub combo_index: Option<usize>,
}

/// Immutable table of moves shared by every controller using it.
#[derive(Debug, Clone, Default)]
pub struct MoveSet {
    basic_moves: Vec<SimpleMove>,
    combo_moves: Vec<ComboMove>,
}

impl MoveSet {
    /// Build a move set. Combo moves are stable-sorted by descending sequence
    /// length exactly once here; `process_combo` depends on that order for
    /// longest-match-wins resolution. Re-sorting an already sorted table is a
    /// no-op, so rebuilding from the same data is idempotent.
    pub fn new(basic_moves: Vec<SimpleMove>, mut combo_moves: Vec<ComboMove>) -> Self {
        combo_moves.sort_by_key(|mv| Reverse(mv.sequence.len()));
        Self {
            basic_moves,
            combo_moves,
        }
    }

    pub fn basic_moves(&self) -> &[SimpleMove] {
        &self.basic_moves
    }

    /// Combo moves in matcher order (longest sequence first).
    pub fn combo_moves(&self) -> &[ComboMove] {
        &self.combo_moves
    }

    /// Attack for a combo index previously returned by `process_combo`.
    /// Indices from anywhere else are a programming error and will panic.
    pub fn combo_attack(&self, index: usize) -> Arc<AttackDefinition> {
        Arc::clone(&self.combo_moves[index].attack)
    }

    /// Resolve the buffered input.
    ///
    /// Basic resolution scans declared order and matches the *last* symbol;
    /// combo resolution scans the length-sorted table and matches a prefix of
    /// the whole buffer. Both can resolve at once — the caller fires the
    /// basic attack now and defers the combo until the buffer flushes.
    pub fn process_combo(&self, buffer: &[InputSymbol]) -> ComboResolution {
        let mut resolution = ComboResolution::default();
        let Some(&last) = buffer.last() else {
            return resolution;
        };

        if let Some(mv) = self.basic_moves.iter().find(|mv| mv.matches(last)) {
            let repeats = repeat_count(buffer, mv.trigger);
            resolution.basic_attack = Some(Arc::clone(&mv.attacks[repeats % mv.attacks.len()]));
        }

        resolution.combo_index = self.combo_moves.iter().position(|mv| mv.matches(buffer));
        resolution
    }

    /// Hand every attack's clip to the playback collaborator, once per slot,
    /// before first use.
    pub fn register_clips(&self, sink: &mut impl AnimationSink) {
        for mv in &self.basic_moves {
            for attack in &mv.attacks {
                sink.register(&attack.clip);
            }
        }
        for mv in &self.combo_moves {
            sink.register(&mv.attack.clip);
        }
    }
}

/// Consecutive repeats of `trigger` at the tail of the buffer. The oldest
/// buffered symbol never counts, so a lone press resolves to the first attack
/// in the cycle.
fn repeat_count(buffer: &[InputSymbol], trigger: InputSymbol) -> usize {
    buffer
        .iter()
        .skip(1)
        .rev()
        .take_while(|&&symbol| symbol == trigger)
        .count()
}

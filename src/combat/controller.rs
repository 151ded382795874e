//! The combo controller: buffers input, resolves moves, and drives the
//! active attack's hit-timing over its duration.
//!
//! One controller per fighter. State lives on the component and is mutated
//! only by `tick`, once per frame, in a fixed order:
//!
//! 1. Flush the input buffer if its clear timer expired (starts any pending
//!    combo attack, terminating whatever was running).
//! 2. Advance the active attack: tick its timer, run the hit test, forward
//!    hits to the attacker collaborator.
//! 3. While a combo attack runs, input is locked out.
//! 4. Otherwise consume at most one newly pressed symbol: append it, ask the
//!    move set to resolve, fire any basic attack immediately, remember any
//!    combo match for the next flush.
//!
//! The fixed order means a symbol buffered this tick is never evaluated
//! against the flush it caused, and an attack that expired this tick cannot
//! swallow a same-tick hit test.

use std::sync::Arc;

use bevy::prelude::*;

use super::attack::{AnimationSink, AttackDefinition, DamageSpec, LayerMask, SpatialQuery};
use super::moveset::{InputSymbol, MoveSet};
use super::timer::Timer;
use crate::constants::{DEFAULT_COMBO_CLEAR_SECS, DEFAULT_HIT_BUFFER_CAPACITY};

/// Attacker-notification collaborator: receives successful hits for damage
/// resolution. Called at most once per tick, only with a non-empty batch.
pub trait HitSink {
    fn process_hits(&mut self, hits: &[Entity], damage: &DamageSpec);
}

/// Per-tick view of freshly pressed input symbols.
pub trait InputFrame {
    /// Cheap gate so quiet ticks skip the full symbol scan.
    fn any_just_pressed(&self) -> bool;
    /// Was this symbol newly pressed this tick?
    fn just_pressed(&self, symbol: InputSymbol) -> bool;
}

/// State machine driving combo recognition and attack timing for one fighter.
#[derive(Component, Debug)]
pub struct ComboController {
    move_set: Arc<MoveSet>,
    /// Recognized symbols; scan order doubles as intake priority.
    inputs: Vec<InputSymbol>,
    hitable_mask: LayerMask,

    input_buffer: Vec<InputSymbol>,
    pending_combo: Option<usize>,
    active_attack: Option<Arc<AttackDefinition>>,
    attack_timer: Timer,
    clear_timer: Timer,
    combo_attack_active: bool,

    /// Reusable capacity-bounded hit buffer; excess overlaps are dropped.
    hit_buffer: Vec<Entity>,
    /// Telemetry only: was the window active on the last advance?
    window_active: bool,
}

impl ComboController {
    pub fn new(move_set: Arc<MoveSet>, inputs: Vec<InputSymbol>) -> Self {
        Self {
            move_set,
            inputs,
            hitable_mask: LayerMask::ALL,
            input_buffer: Vec::new(),
            pending_combo: None,
            active_attack: None,
            attack_timer: Timer::default(),
            clear_timer: Timer::new(DEFAULT_COMBO_CLEAR_SECS),
            combo_attack_active: false,
            hit_buffer: vec![Entity::PLACEHOLDER; DEFAULT_HIT_BUFFER_CAPACITY],
            window_active: false,
        }
    }

    /// Seconds of input silence before the buffer flushes.
    pub fn with_clear_window(mut self, secs: f32) -> Self {
        self.clear_timer.set_max(secs, true);
        self
    }

    /// Capacity of the hit buffer (max overlaps reported per frame).
    pub fn with_hit_capacity(mut self, capacity: usize) -> Self {
        self.hit_buffer = vec![Entity::PLACEHOLDER; capacity];
        self
    }

    /// Collision layers this fighter's attacks may hit.
    pub fn with_hitable_mask(mut self, mask: LayerMask) -> Self {
        self.hitable_mask = mask;
        self
    }

    /// Run one frame of the state machine. See the module docs for the
    /// evaluation order; `hit_sink` may be absent, in which case computed
    /// hits are dropped with a warning.
    pub fn tick(
        &mut self,
        dt: f32,
        origin: Vec3,
        input: &impl InputFrame,
        spatial: &impl SpatialQuery,
        animation: &mut impl AnimationSink,
        hit_sink: Option<&mut dyn HitSink>,
    ) {
        // 1. Flush the buffered window before anything else this tick.
        if !self.input_buffer.is_empty() && self.clear_timer.tick(dt) {
            self.flush(animation);
        }

        // 2. Advance whatever attack is running (including one the flush
        //    just started) and run its hit test.
        if let Some(attack) = self.active_attack.clone() {
            self.advance_attack(&attack, dt, origin, spatial, animation, hit_sink);
        }

        // 3. Input lockout while a combo attack runs.
        if self.combo_attack_active {
            return;
        }

        // 4. At most one newly pressed symbol enters the buffer per tick.
        if input.any_just_pressed() {
            self.intake(input, animation);
        }
    }

    /// Terminate the running attack immediately (timeout does this too).
    pub fn terminate_attack(&mut self, animation: &mut impl AnimationSink) {
        self.end_attack(animation);
    }

    pub fn move_set(&self) -> &Arc<MoveSet> {
        &self.move_set
    }

    pub fn buffered_inputs(&self) -> &[InputSymbol] {
        &self.input_buffer
    }

    pub fn pending_combo(&self) -> Option<usize> {
        self.pending_combo
    }

    pub fn active_attack(&self) -> Option<&Arc<AttackDefinition>> {
        self.active_attack.as_ref()
    }

    pub fn is_combo_attack_active(&self) -> bool {
        self.combo_attack_active
    }

    pub fn hitable_mask(&self) -> LayerMask {
        self.hitable_mask
    }

    /// Translated hit volume, but only while the last tick's window was
    /// active. Debug visualization only; game logic never reads this.
    pub fn active_hit_volume(&self, origin: Vec3) -> Option<(Vec3, Vec3)> {
        if !self.window_active {
            return None;
        }
        let attack = self.active_attack.as_ref()?;
        Some((
            origin + attack.hit_volume.center,
            attack.hit_volume.half_extents,
        ))
    }

    /// Resolve the expired buffer: clear it, and if a combo was pending,
    /// replace any running attack with the combo's attack under lockout.
    fn flush(&mut self, animation: &mut impl AnimationSink) {
        self.input_buffer.clear();

        let Some(index) = self.pending_combo.take() else {
            return;
        };

        self.end_attack(animation);

        let attack = self.move_set.combo_attack(index);
        debug!(combo = index, attack = %attack.name, "combo flush");
        self.combo_attack_active = true;
        self.begin_attack(attack, animation);
    }

    fn advance_attack(
        &mut self,
        attack: &AttackDefinition,
        dt: f32,
        origin: Vec3,
        spatial: &impl SpatialQuery,
        animation: &mut impl AnimationSink,
        hit_sink: Option<&mut dyn HitSink>,
    ) {
        if self.attack_timer.tick(dt) {
            self.end_attack(animation);
            return;
        }

        let percent = self.attack_timer.percent_complete();
        self.window_active = attack.window.is_active(percent);

        let hit_count = attack.perform_attack(
            origin,
            &mut self.hit_buffer,
            percent,
            self.hitable_mask,
            spatial,
        );

        if hit_count > 0 {
            match hit_sink {
                Some(sink) => sink.process_hits(&self.hit_buffer[..hit_count], &attack.damage),
                None => warn!(
                    attack = %attack.name,
                    hit_count, "no attacker collaborator assigned; dropping hits"
                ),
            }
        }
    }

    /// Append one pressed symbol, re-resolve the buffer, fire any basic
    /// attack now and remember the latest combo match for the next flush.
    fn intake(&mut self, input: &impl InputFrame, animation: &mut impl AnimationSink) {
        let Some(symbol) = self
            .inputs
            .iter()
            .copied()
            .find(|&symbol| input.just_pressed(symbol))
        else {
            return;
        };

        self.input_buffer.push(symbol);

        let resolution = self.move_set.process_combo(&self.input_buffer);
        if let Some(attack) = resolution.basic_attack {
            // Later basic attacks override earlier ones; no queueing.
            self.begin_attack(attack, animation);
        }
        self.pending_combo = resolution.combo_index;

        self.clear_timer.reset();
    }

    fn begin_attack(&mut self, attack: Arc<AttackDefinition>, animation: &mut impl AnimationSink) {
        self.attack_timer.set_max(attack.duration, true);
        animation.play(&attack.clip);
        self.active_attack = Some(attack);
    }

    fn end_attack(&mut self, animation: &mut impl AnimationSink) {
        self.combo_attack_active = false;
        self.window_active = false;
        animation.stop();
        self.active_attack = None;
    }
}

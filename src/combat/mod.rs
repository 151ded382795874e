//! Combo combat: input buffering, combo recognition, and hit timing.
//!
//! - `timer` / `window` — countdown timers and parity-based attack windows
//! - `attack` — attack definitions and the spatial/animation contracts
//! - `moveset` — the move table and longest-match-first resolution
//! - `controller` — the per-fighter state machine
//! - `hitbox` — rapier sensor tracking behind the overlap-box contract
//!
//! `ComboPlugin` wires the bevy side: keyboard intake via `InputBindings`,
//! hit forwarding as `HitsDealt` events, and fire-and-forget
//! `AnimationCommand`s for the playback collaborator.

use bevy::prelude::*;

pub mod attack;
pub mod controller;
pub mod hitbox;
pub mod moveset;
pub mod timer;
pub mod window;

pub use attack::{
    AnimationSink, AttackDefinition, ClipHandle, DamageSpec, HitVolume, LayerMask, SpatialQuery,
};
pub use controller::{ComboController, HitSink, InputFrame};
pub use moveset::{ComboMove, ComboResolution, InputSymbol, MoveSet, SimpleMove};
pub use timer::Timer;
pub use window::AttackWindow;

pub struct ComboPlugin;

impl Plugin for ComboPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HitsDealt>().add_event::<AnimationCommand>().add_systems(
            Update,
            (
                hitbox::attach_hit_sensors,
                register_controller_clips,
                hitbox::track_sensor_overlaps,
                tick_combo_controllers,
                hitbox::sync_hit_sensors,
                draw_active_hit_volumes,
            )
                .chain(),
        );
    }
}

/// Successful hits from one attack this frame, for damage resolution.
/// Emitted at most once per controller per frame, never empty.
#[derive(Event, Debug, Clone)]
pub struct HitsDealt {
    pub attacker: Entity,
    pub targets: Vec<Entity>,
    pub damage: DamageSpec,
}

/// Fire-and-forget commands to the animation playback collaborator.
#[derive(Event, Debug, Clone)]
pub enum AnimationCommand {
    /// Announce a clip the entity will play later.
    Register { entity: Entity, clip: ClipHandle },
    /// Rewind whatever is playing and start this clip.
    Play { entity: Entity, clip: ClipHandle },
    /// Halt the entity's playback.
    Stop { entity: Entity },
}

/// Which key produces which input symbol; declared order is intake priority.
#[derive(Component, Debug, Clone)]
pub struct InputBindings(pub Vec<(KeyCode, InputSymbol)>);

impl InputBindings {
    /// Symbols in priority order, for `ComboController::new`.
    pub fn symbols(&self) -> Vec<InputSymbol> {
        self.0.iter().map(|(_, symbol)| *symbol).collect()
    }
}

/// `InputFrame` over the keyboard plus a binding table.
struct BoundInput<'a> {
    keyboard: &'a ButtonInput<KeyCode>,
    bindings: &'a InputBindings,
}

impl InputFrame for BoundInput<'_> {
    fn any_just_pressed(&self) -> bool {
        self.keyboard.get_just_pressed().next().is_some()
    }

    fn just_pressed(&self, symbol: InputSymbol) -> bool {
        self.bindings
            .0
            .iter()
            .any(|(key, bound)| *bound == symbol && self.keyboard.just_pressed(*key))
    }
}

/// `AnimationSink` that forwards to `AnimationCommand` events.
struct EventAnimation<'a, 'w> {
    entity: Entity,
    writer: &'a mut EventWriter<'w, AnimationCommand>,
}

impl AnimationSink for EventAnimation<'_, '_> {
    fn register(&mut self, clip: &ClipHandle) {
        self.writer.send(AnimationCommand::Register {
            entity: self.entity,
            clip: clip.clone(),
        });
    }

    fn play(&mut self, clip: &ClipHandle) {
        self.writer.send(AnimationCommand::Play {
            entity: self.entity,
            clip: clip.clone(),
        });
    }

    fn stop(&mut self) {
        self.writer.send(AnimationCommand::Stop {
            entity: self.entity,
        });
    }
}

/// `HitSink` that forwards to `HitsDealt` events.
struct EventHits<'a, 'w> {
    attacker: Entity,
    writer: &'a mut EventWriter<'w, HitsDealt>,
}

impl HitSink for EventHits<'_, '_> {
    fn process_hits(&mut self, hits: &[Entity], damage: &DamageSpec) {
        self.writer.send(HitsDealt {
            attacker: self.attacker,
            targets: hits.to_vec(),
            damage: *damage,
        });
    }
}

/// System: announce every clip of a newly added controller's move set.
pub fn register_controller_clips(
    added: Query<(Entity, &ComboController), Added<ComboController>>,
    mut animations: EventWriter<AnimationCommand>,
) {
    for (entity, controller) in &added {
        let mut sink = EventAnimation {
            entity,
            writer: &mut animations,
        };
        controller.move_set().register_clips(&mut sink);
    }
}

/// System: run every controller's per-frame state machine.
pub fn tick_combo_controllers(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut controllers: Query<(
        Entity,
        &mut ComboController,
        &Transform,
        &InputBindings,
        Option<&hitbox::HitSensorLink>,
    )>,
    sensors: Query<&hitbox::HitSensor>,
    mut hits: EventWriter<HitsDealt>,
    mut animations: EventWriter<AnimationCommand>,
) {
    let dt = time.delta_secs();

    for (entity, mut controller, transform, bindings, link) in &mut controllers {
        let input = BoundInput {
            keyboard: &keyboard,
            bindings,
        };
        let overlap = match link.and_then(|link| sensors.get(link.0).ok()) {
            Some(sensor) => hitbox::SensorOverlap::new(sensor),
            None => hitbox::SensorOverlap::empty(),
        };
        let mut animation = EventAnimation {
            entity,
            writer: &mut animations,
        };
        let mut hit_sink = EventHits {
            attacker: entity,
            writer: &mut hits,
        };

        controller.tick(
            dt,
            transform.translation,
            &input,
            &overlap,
            &mut animation,
            Some(&mut hit_sink),
        );
    }
}

/// System: debug-draw the hit volume while its window is active.
pub fn draw_active_hit_volumes(
    mut gizmos: Gizmos,
    controllers: Query<(&ComboController, &Transform)>,
) {
    for (controller, transform) in &controllers {
        if let Some((center, half_extents)) = controller.active_hit_volume(transform.translation) {
            gizmos.cuboid(
                Transform::from_translation(center).with_scale(half_extents * 2.0),
                Color::srgb(0.9, 0.3, 0.2),
            );
        }
    }
}

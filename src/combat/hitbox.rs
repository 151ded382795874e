//! Rapier-backed overlap tracking for active hit volumes.
//!
//! Each controller owns one persistent sensor entity. While an attack runs,
//! the sensor's cuboid collider mirrors the attack's hit volume at the
//! fighter's position; collision events fold into a live overlap set, and a
//! snapshot of that set answers the controller's overlap-box contract. When
//! no attack runs the sensor's filter group is emptied so it collides with
//! nothing.

use std::collections::BTreeSet;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::attack::{LayerMask, SpatialQuery};
use super::controller::ComboController;

/// Collision group constants for combat filtering.
pub struct CombatLayers;

impl CombatLayers {
    /// Fighter bodies (players, monsters)
    pub const FIGHTER: Group = Group::GROUP_1;
    /// Anything an attack may damage
    pub const HITTABLE: Group = Group::GROUP_2;
    /// Attack hit-volume sensors
    pub const HIT_SENSOR: Group = Group::GROUP_3;
}

/// Translate a combo-core layer mask into a rapier filter group.
pub fn mask_to_filter(mask: LayerMask) -> Group {
    Group::from_bits_truncate(mask.0)
}

/// Sensor entity shadowing one controller's active hit volume.
#[derive(Component, Debug)]
pub struct HitSensor {
    /// Controller entity this sensor belongs to; never reported as a hit.
    pub owner: Entity,
    /// Entities currently inside the volume. Ordered set so snapshots are
    /// deterministic for identical collision histories.
    pub overlapping: BTreeSet<Entity>,
}

/// Link from a controller entity to its sensor entity.
#[derive(Component, Debug)]
pub struct HitSensorLink(pub Entity);

/// System: give every new controller a parked sensor.
pub fn attach_hit_sensors(
    mut commands: Commands,
    controllers: Query<Entity, (Added<ComboController>, Without<HitSensorLink>)>,
) {
    for owner in &controllers {
        let sensor = commands
            .spawn((
                HitSensor {
                    owner,
                    overlapping: BTreeSet::new(),
                },
                Transform::default(),
                GlobalTransform::default(),
                Collider::cuboid(0.1, 0.1, 0.1),
                Sensor,
                ActiveEvents::COLLISION_EVENTS,
                // Parked: membership set, filters empty until an attack runs.
                CollisionGroups::new(CombatLayers::HIT_SENSOR, Group::NONE),
            ))
            .id();
        commands.entity(owner).insert(HitSensorLink(sensor));
    }
}

/// System: fold rapier collision events into each sensor's overlap set.
pub fn track_sensor_overlaps(
    mut collisions: EventReader<CollisionEvent>,
    mut sensors: Query<&mut HitSensor>,
) {
    for event in collisions.read() {
        let (a, b, started) = match event {
            CollisionEvent::Started(a, b, _) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _) => (*a, *b, false),
        };

        // Either side of the pair may be the sensor.
        for (sensor_entity, other) in [(a, b), (b, a)] {
            let Ok(mut sensor) = sensors.get_mut(sensor_entity) else {
                continue;
            };
            if other == sensor.owner {
                continue;
            }
            if started {
                sensor.overlapping.insert(other);
            } else {
                sensor.overlapping.remove(&other);
            }
        }
    }
}

/// System: keep each sensor's transform, collider, and filters in step with
/// its controller's active attack.
pub fn sync_hit_sensors(
    controllers: Query<(&ComboController, &Transform, &HitSensorLink)>,
    mut sensors: Query<
        (&mut Transform, &mut Collider, &mut CollisionGroups, &mut HitSensor),
        Without<ComboController>,
    >,
) {
    for (controller, transform, link) in &controllers {
        let Ok((mut sensor_tf, mut collider, mut groups, mut sensor)) = sensors.get_mut(link.0)
        else {
            continue;
        };

        match controller.active_attack() {
            Some(attack) => {
                let volume = attack.hit_volume;
                sensor_tf.translation = transform.translation + volume.center;
                *collider = Collider::cuboid(
                    volume.half_extents.x,
                    volume.half_extents.y,
                    volume.half_extents.z,
                );
                groups.filters = mask_to_filter(controller.hitable_mask());
            }
            None => {
                if groups.filters != Group::NONE {
                    groups.filters = Group::NONE;
                    sensor.overlapping.clear();
                }
            }
        }
    }
}

/// Snapshot view over a sensor's overlap set, answering the overlap-box
/// contract for one controller tick.
///
/// The box and mask arguments were already staged onto the sensor collider
/// by `sync_hit_sensors`; by the time the controller queries, the physics
/// step has resolved them into the overlap set.
pub struct SensorOverlap<'a> {
    overlapping: Option<&'a BTreeSet<Entity>>,
}

impl<'a> SensorOverlap<'a> {
    pub fn new(sensor: &'a HitSensor) -> Self {
        Self {
            overlapping: Some(&sensor.overlapping),
        }
    }

    /// View for a controller with no sensor attached yet: reports no hits.
    pub fn empty() -> Self {
        Self { overlapping: None }
    }
}

impl SpatialQuery for SensorOverlap<'_> {
    fn overlap_box(
        &self,
        _center: Vec3,
        _half_extents: Vec3,
        _mask: LayerMask,
        hits: &mut [Entity],
    ) -> usize {
        let Some(set) = self.overlapping else {
            return 0;
        };

        let mut count = 0;
        for &entity in set {
            if count == hits.len() {
                break;
            }
            hits[count] = entity;
            count += 1;
        }
        count
    }
}

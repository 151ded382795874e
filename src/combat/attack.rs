//! Attack definitions: hit volume, damage, window, duration, animation clip.
//!
//! Definitions are immutable combat data authored offline and shared by
//! reference (`Arc`) across every move that uses them; nothing mutates them at
//! runtime. The spatial query and animation playback are external
//! collaborators reached through the traits below.

use bevy::prelude::*;

use super::window::AttackWindow;

/// Bitmask selecting which collision layers an attack may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Opaque handle to an animation clip. The combo core never inspects it,
/// it only hands it to the playback collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipHandle(pub String);

impl ClipHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Damage descriptor forwarded with successful hits. Resolution (armor,
/// multipliers, status) happens downstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageSpec {
    pub base_damage: f32,
}

/// Axis-aligned box volume relative to the attacker's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
}

/// Calling contract for the external overlap-query collaborator.
///
/// Implementations must be synchronous, deterministic for identical inputs,
/// and must not allocate: results are written into the caller's buffer and
/// overlaps beyond its capacity are silently dropped.
pub trait SpatialQuery {
    /// Write entities overlapping the box into `hits`, return how many.
    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        mask: LayerMask,
        hits: &mut [Entity],
    ) -> usize;
}

/// Fire-and-forget animation playback collaborator.
///
/// Clips are registered once before first use; `play` rewinds whatever is
/// currently playing before swapping in the new clip.
pub trait AnimationSink {
    /// Announce a clip the controller will play later.
    fn register(&mut self, clip: &ClipHandle);
    /// Rewind the current clip to time zero and start this one.
    fn play(&mut self, clip: &ClipHandle);
    /// Halt playback entirely.
    fn stop(&mut self);
}

/// One attack: a hit volume scheduled over a duration, plus the damage and
/// clip that go with it.
#[derive(Debug, Clone)]
pub struct AttackDefinition {
    pub name: String,
    pub hit_volume: HitVolume,
    pub damage: DamageSpec,
    pub window: AttackWindow,
    /// Total attack duration in seconds.
    pub duration: f32,
    pub clip: ClipHandle,
}

impl AttackDefinition {
    /// Run the hit test for this frame.
    ///
    /// Returns 0 without touching the spatial collaborator whenever the
    /// window is inactive at `percent_complete` — no hits may be reported
    /// for an inactive frame even if the volume would overlap something.
    /// Otherwise issues one overlap query for the volume translated by
    /// `origin`, writing up to `hits.len()` results.
    pub fn perform_attack(
        &self,
        origin: Vec3,
        hits: &mut [Entity],
        percent_complete: f32,
        mask: LayerMask,
        spatial: &impl SpatialQuery,
    ) -> usize {
        if !self.window.is_active(percent_complete) {
            return 0;
        }

        spatial.overlap_box(
            origin + self.hit_volume.center,
            self.hit_volume.half_extents,
            mask,
            hits,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Call-counting stub that records the queried box.
    struct CountingQuery {
        calls: Cell<usize>,
        last_center: RefCell<Option<Vec3>>,
        results: Vec<Entity>,
    }

    impl CountingQuery {
        fn returning(results: Vec<Entity>) -> Self {
            Self {
                calls: Cell::new(0),
                last_center: RefCell::new(None),
                results,
            }
        }
    }

    impl SpatialQuery for CountingQuery {
        fn overlap_box(
            &self,
            center: Vec3,
            _half_extents: Vec3,
            _mask: LayerMask,
            hits: &mut [Entity],
        ) -> usize {
            self.calls.set(self.calls.get() + 1);
            *self.last_center.borrow_mut() = Some(center);
            let count = self.results.len().min(hits.len());
            hits[..count].copy_from_slice(&self.results[..count]);
            count
        }
    }

    fn test_attack(window: AttackWindow) -> AttackDefinition {
        AttackDefinition {
            name: "jab".into(),
            hit_volume: HitVolume {
                center: Vec3::new(0.0, 1.0, 1.5),
                half_extents: Vec3::new(0.5, 0.5, 0.8),
            },
            damage: DamageSpec { base_damage: 10.0 },
            window,
            duration: 0.5,
            clip: ClipHandle::new("clips/jab"),
        }
    }

    #[test]
    fn test_inactive_window_skips_spatial_query() {
        let attack = test_attack(AttackWindow::new(&[0.2, 0.6]));
        let query = CountingQuery::returning(vec![Entity::from_raw(7)]);
        let mut hits = [Entity::PLACEHOLDER; 4];

        // 0.4 sits in the inactive middle segment.
        let count = attack.perform_attack(Vec3::ZERO, &mut hits, 0.4, LayerMask::ALL, &query);

        assert_eq!(count, 0);
        assert_eq!(query.calls.get(), 0, "inactive frame must not query");
    }

    #[test]
    fn test_active_window_queries_translated_volume() {
        let attack = test_attack(AttackWindow::always_active());
        let query = CountingQuery::returning(vec![Entity::from_raw(7)]);
        let mut hits = [Entity::PLACEHOLDER; 4];

        let origin = Vec3::new(10.0, 0.0, 0.0);
        let count = attack.perform_attack(origin, &mut hits, 0.5, LayerMask::ALL, &query);

        assert_eq!(count, 1);
        assert_eq!(hits[0], Entity::from_raw(7));
        assert_eq!(query.calls.get(), 1);
        assert_eq!(
            query.last_center.borrow().unwrap(),
            origin + attack.hit_volume.center,
            "query center must be the volume translated by the origin"
        );
    }

    #[test]
    fn test_hit_buffer_capacity_bounds_results() {
        let attack = test_attack(AttackWindow::always_active());
        let many: Vec<Entity> = (0..10u32).map(Entity::from_raw).collect();
        let query = CountingQuery::returning(many);
        let mut hits = [Entity::PLACEHOLDER; 3];

        let count = attack.perform_attack(Vec3::ZERO, &mut hits, 0.0, LayerMask::ALL, &query);

        assert_eq!(count, 3, "excess overlaps beyond capacity are dropped");
    }
}

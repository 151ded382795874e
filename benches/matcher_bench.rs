//! Criterion benchmarks for the hot per-tick paths: combo matching, the
//! window parity predicate, and a full controller tick.

use std::sync::Arc;

use bevy::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use combo_core::combat::{
    AnimationSink, AttackDefinition, AttackWindow, ClipHandle, ComboController, ComboMove,
    DamageSpec, HitVolume, InputFrame, InputSymbol, LayerMask, MoveSet, SimpleMove, SpatialQuery,
};
use combo_core::config;

struct QuietInput;
impl InputFrame for QuietInput {
    fn any_just_pressed(&self) -> bool {
        false
    }
    fn just_pressed(&self, _symbol: InputSymbol) -> bool {
        false
    }
}

struct PressInput(InputSymbol);
impl InputFrame for PressInput {
    fn any_just_pressed(&self) -> bool {
        true
    }
    fn just_pressed(&self, symbol: InputSymbol) -> bool {
        symbol == self.0
    }
}

struct EmptySpace;
impl SpatialQuery for EmptySpace {
    fn overlap_box(
        &self,
        _center: Vec3,
        _half_extents: Vec3,
        _mask: LayerMask,
        _hits: &mut [Entity],
    ) -> usize {
        0
    }
}

struct NullAnimation;
impl AnimationSink for NullAnimation {
    fn register(&mut self, _clip: &ClipHandle) {}
    fn play(&mut self, _clip: &ClipHandle) {}
    fn stop(&mut self) {}
}

fn shared_attack() -> Arc<AttackDefinition> {
    Arc::new(AttackDefinition {
        name: "bench".into(),
        hit_volume: HitVolume {
            center: Vec3::ZERO,
            half_extents: Vec3::ONE,
        },
        damage: DamageSpec { base_damage: 1.0 },
        window: AttackWindow::new(&[0.1, 0.9]),
        duration: 0.5,
        clip: ClipHandle::new("clips/bench"),
    })
}

/// Synthetic move set: 32 combos of length 2..=5 over a 4-symbol alphabet.
fn wide_move_set() -> MoveSet {
    let alphabet = [
        InputSymbol::Up,
        InputSymbol::Down,
        InputSymbol::Left,
        InputSymbol::Right,
    ];
    let attack = shared_attack();

    let combos: Vec<ComboMove> = (0..32usize)
        .map(|i| {
            let len = 2 + i % 4;
            let sequence = (0..len).map(|j| alphabet[(i + j) % 4]).collect();
            ComboMove {
                name: format!("combo-{i}"),
                sequence,
                attack: Arc::clone(&attack),
            }
        })
        .collect();

    let basics = vec![SimpleMove {
        name: "mash".into(),
        trigger: InputSymbol::LightAttack,
        attacks: vec![Arc::clone(&attack); 3],
    }];

    MoveSet::new(basics, combos)
}

fn bench_matcher(c: &mut Criterion) {
    let set = wide_move_set();
    let miss_buffer = vec![InputSymbol::LightAttack; 8];
    let hit_buffer = vec![
        InputSymbol::Up,
        InputSymbol::Down,
        InputSymbol::Left,
        InputSymbol::Right,
        InputSymbol::Up,
    ];

    c.bench_function("process_combo_miss", |b| {
        b.iter(|| set.process_combo(black_box(&miss_buffer)))
    });

    c.bench_function("process_combo_hit", |b| {
        b.iter(|| set.process_combo(black_box(&hit_buffer)))
    });

    let brawler = config::brawler().build().unwrap();
    let buffer = vec![InputSymbol::Up, InputSymbol::Up, InputSymbol::Down];
    c.bench_function("process_combo_brawler", |b| {
        b.iter(|| brawler.process_combo(black_box(&buffer)))
    });
}

fn bench_window(c: &mut Criterion) {
    let window = AttackWindow::new(&[0.05, 0.15, 0.3, 0.45, 0.6, 0.7, 0.85, 0.95]);

    c.bench_function("window_is_active", |b| {
        b.iter(|| window.is_active(black_box(0.5)))
    });
}

fn bench_controller_tick(c: &mut Criterion) {
    let set = Arc::new(wide_move_set());

    c.bench_function("controller_tick_quiet", |b| {
        let mut ctl = ComboController::new(Arc::clone(&set), vec![InputSymbol::LightAttack]);
        b.iter(|| {
            ctl.tick(
                black_box(0.016),
                Vec3::ZERO,
                &QuietInput,
                &EmptySpace,
                &mut NullAnimation,
                None,
            )
        })
    });

    c.bench_function("controller_tick_press_and_flush", |b| {
        // Tiny clear window so the buffer flushes on the quiet tick and
        // never grows across iterations.
        let mut ctl = ComboController::new(Arc::clone(&set), vec![InputSymbol::LightAttack])
            .with_clear_window(0.01);
        let press = PressInput(InputSymbol::LightAttack);
        b.iter(|| {
            ctl.tick(
                black_box(0.016),
                Vec3::ZERO,
                &press,
                &EmptySpace,
                &mut NullAnimation,
                None,
            );
            ctl.tick(
                black_box(0.016),
                Vec3::ZERO,
                &QuietInput,
                &EmptySpace,
                &mut NullAnimation,
                None,
            );
        })
    });
}

criterion_group!(benches, bench_matcher, bench_window, bench_controller_tick);
criterion_main!(benches);

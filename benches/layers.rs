//! Layer recomputation benchmarks.
//!
//! Run with: `cargo bench --bench layers`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mtg_engine::abilities::Ability;
use mtg_engine::cards::{CardDefinition, CardType, CounterType, Keyword};
use mtg_engine::core::{GameConfig, GameState, PlayerId};
use mtg_engine::effects::{Affected, ContinuousEffect, Duration, ObjectFilter};
use mtg_engine::layers::LayerEngine;
use mtg_engine::zones::Zone;

fn anthem() -> CardDefinition {
    CardDefinition::new("Glorious Anthem")
        .with_type(CardType::Enchantment)
        .with_ability(Ability::static_effect(ContinuousEffect::boost(
            1,
            1,
            Affected::Filter(ObjectFilter::creature().you_control()),
            Duration::WhileOnBattlefield,
        )))
}

fn deathtouch_lord() -> CardDefinition {
    CardDefinition::new("Mer-Ek Nightblade")
        .with_type(CardType::Creature)
        .with_pt(2, 3)
        .with_ability(Ability::static_effect(ContinuousEffect::grant(
            Keyword::Deathtouch,
            Affected::Filter(
                ObjectFilter::creature()
                    .you_control()
                    .with_counter(CounterType::PlusOnePlusOne),
            ),
            Duration::WhileOnBattlefield,
        )))
}

/// A board of `creatures` vanilla creatures per player plus a few lords.
fn board(creatures: usize) -> GameState {
    let mut state = GameState::new(&GameConfig::new(4));
    let bear = CardDefinition::new("Grizzly Bears")
        .with_type(CardType::Creature)
        .with_pt(2, 2);
    for seat in 0..4u8 {
        let player = PlayerId(seat);
        state.create_object(&anthem(), player, Zone::Battlefield);
        state.create_object(&deathtouch_lord(), player, Zone::Battlefield);
        for i in 0..creatures {
            let id = state.create_object(&bear, player, Zone::Battlefield);
            if i % 3 == 0 {
                let _ = state.add_counters(id, CounterType::PlusOnePlusOne, 1);
            }
        }
    }
    let _ = state.take_events();
    state
}

fn benchmark_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("LayerEngine::compute");
    for creatures in [10, 50, 200] {
        let state = board(creatures);
        group.bench_with_input(BenchmarkId::new("creatures_per_player", creatures), &state, |b, state| {
            b.iter(|| black_box(LayerEngine::compute(black_box(state))));
        });
    }
    group.finish();
}

fn benchmark_apply_and_rollback(c: &mut Criterion) {
    let state = board(50);
    c.bench_function("apply_effects_on_checkpoint", |b| {
        b.iter(|| {
            let mut checkpoint = state.clone();
            black_box(checkpoint.apply_effects())
        });
    });
}

criterion_group!(benches, benchmark_compute, benchmark_apply_and_rollback);
criterion_main!(benches);

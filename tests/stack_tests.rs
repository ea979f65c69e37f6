//! Stack order, priority passing and fizzling.

mod common;

use common::*;
use mtg_engine::abilities::Ability;
use mtg_engine::cards::{CardDefinition, CardType};
use mtg_engine::core::{GameConfig, PlayerId};
use mtg_engine::costs::ManaType;
use mtg_engine::decisions::ScriptedDecisions;
use mtg_engine::effects::{EffectTarget, OneShotEffect, TargetSpec};
use mtg_engine::game::Game;
use mtg_engine::stack::StackItem;
use mtg_engine::zones::Zone;

fn murder() -> CardDefinition {
    CardDefinition::new("Murder")
        .with_mana_cost(cost("{1}{B}{B}"))
        .with_type(CardType::Instant)
        .with_ability(
            Ability::spell([OneShotEffect::Destroy {
                target: EffectTarget::Target(0),
            }
            .into()])
            .with_target(TargetSpec::creature()),
        )
}

fn cast_murder(game: &mut Game) -> mtg_engine::core::ObjectId {
    let spell = in_hand(game, &murder(), ALICE);
    give_mana(game, ALICE, ManaType::Black, 3);
    game.cast_spell(ALICE, spell).unwrap();
    spell
}

#[test]
fn test_last_cast_resolves_first() {
    let mut game = two_player_game();
    let first = in_hand(&mut game, &grizzly_bears(), ALICE);
    let second = in_hand(&mut game, &grizzly_bears(), BOB);
    give_mana(&mut game, ALICE, ManaType::Green, 2);
    give_mana(&mut game, BOB, ManaType::Green, 2);

    let first_entry = game.cast_spell(ALICE, first).unwrap();
    let second_entry = game.cast_spell(BOB, second).unwrap();
    assert_eq!(game.state().stack.top().map(|e| e.id), Some(second_entry));
    assert_eq!(game.state().stack.priority_player(), Some(BOB));

    assert_eq!(game.pass_priority(BOB).unwrap(), None);
    assert_eq!(game.pass_priority(ALICE).unwrap(), Some(second_entry));
    assert_eq!(game.state().zone_of(second), Some(Zone::Battlefield));
    assert_eq!(game.state().zone_of(first), Some(Zone::Stack));
    assert_eq!(game.state().controller_of(second), Some(BOB));

    // The active player receives priority after a resolution.
    assert_eq!(game.state().stack.priority_player(), Some(ALICE));
    assert_eq!(game.pass_priority(ALICE).unwrap(), None);
    assert_eq!(game.pass_priority(BOB).unwrap(), Some(first_entry));
    assert!(game.state().stack.is_empty());
}

#[test]
fn test_pass_out_of_turn_does_nothing() {
    let mut game = two_player_game();
    let bears = in_hand(&mut game, &grizzly_bears(), ALICE);
    give_mana(&mut game, ALICE, ManaType::Green, 2);
    game.cast_spell(ALICE, bears).unwrap();

    assert_eq!(game.pass_priority(BOB).unwrap(), None);
    assert_eq!(game.pass_priority(BOB).unwrap(), None);
    assert_eq!(game.state().zone_of(bears), Some(Zone::Stack));
    assert_eq!(game.pass_priority(ALICE).unwrap(), None);
    assert!(game.pass_priority(BOB).unwrap().is_some());
}

#[test]
fn test_every_remaining_player_must_pass() {
    init_tracing();
    let mut game = Game::new(GameConfig::new(4));
    let bears = in_hand(&mut game, &grizzly_bears(), ALICE);
    give_mana(&mut game, ALICE, ManaType::Green, 2);
    game.cast_spell(ALICE, bears).unwrap();
    game.concede(PlayerId(2)).unwrap();

    assert_eq!(game.pass_priority(ALICE).unwrap(), None);
    assert_eq!(game.pass_priority(BOB).unwrap(), None);
    assert!(game.pass_priority(PlayerId(3)).unwrap().is_some());
    assert_eq!(game.state().zone_of(bears), Some(Zone::Battlefield));
}

#[test]
fn test_empty_stack_pass() {
    let mut game = two_player_game();
    assert_eq!(game.pass_priority(ALICE).unwrap(), None);
    assert_eq!(game.resolve_top().unwrap(), None);
    assert_eq!(game.run_stack().unwrap(), 0);
}

#[test]
fn test_targeted_spell_resolves() {
    let mut game = two_player_game();
    let victim = on_battlefield(&mut game, &grizzly_bears(), BOB);
    let spell = cast_murder(&mut game);

    let entry = game.state().stack.top().unwrap().clone();
    assert!(matches!(entry.item, StackItem::Spell { object } if object == spell));
    assert_eq!(entry.targets.len(), 1);

    assert_eq!(game.run_stack().unwrap(), 1);
    assert_eq!(game.state().zone_of(victim), Some(Zone::Graveyard));
    assert_eq!(game.state().zone_of(spell), Some(Zone::Graveyard));
}

#[test]
fn test_spell_fizzles_when_target_changes_zones() {
    let mut game = two_player_game();
    let victim = on_battlefield(&mut game, &grizzly_bears(), BOB);
    let spell = cast_murder(&mut game);

    // Bounced and replayed: a new object as far as the spell is concerned.
    game.state_mut().move_object(victim, Zone::Hand).unwrap();
    game.state_mut().move_object(victim, Zone::Battlefield).unwrap();
    game.settle().unwrap();

    game.run_stack().unwrap();
    assert_eq!(game.state().zone_of(victim), Some(Zone::Battlefield));
    assert_eq!(game.state().zone_of(spell), Some(Zone::Graveyard));
}

#[test]
fn test_no_legal_target_cannot_cast() {
    let mut game = two_player_game();
    let spell = in_hand(&mut game, &murder(), ALICE);
    give_mana(&mut game, ALICE, ManaType::Black, 3);

    assert!(game.cast_spell(ALICE, spell).is_err());
    assert_eq!(game.state().zone_of(spell), Some(Zone::Hand));
    assert_eq!(game.state().player(ALICE).unwrap().mana_pool.total(), 3);
}

#[test]
fn test_triggered_ability_fizzles_without_asking() {
    let decider = ScriptedDecisions::new().target(1).answer([true]);
    let prompts = decider.prompts();
    let mut game = two_player_game().with_decider(ALICE, decider);
    let witch = on_battlefield(&mut game, &thorntooth_witch(), ALICE);
    let bears = on_battlefield(&mut game, &grizzly_bears(), BOB);
    let seedlings = in_hand(&mut game, &treefolk_seedlings(), ALICE);
    give_mana(&mut game, ALICE, ManaType::Green, 3);
    game.cast_spell(ALICE, seedlings).unwrap();

    game.state_mut().move_object(bears, Zone::Hand).unwrap();
    game.settle().unwrap();
    game.run_stack().unwrap();

    assert!(prompts.borrow().is_empty());
    assert_eq!(game.characteristics(witch).unwrap().power(), Some(3));
    assert_eq!(game.state().zone_of(seedlings), Some(Zone::Battlefield));
}

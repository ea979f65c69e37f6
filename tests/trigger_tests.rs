//! Triggered abilities: event triggers, state triggers, ordering and the bus.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use mtg_engine::abilities::Ability;
use mtg_engine::cards::{CardDefinition, CardType, CounterType};
use mtg_engine::core::Step;
use mtg_engine::costs::ManaType;
use mtg_engine::decisions::ScriptedDecisions;
use mtg_engine::effects::{Amount, OneShotEffect, PlayerRef};
use mtg_engine::game::Game;
use mtg_engine::triggers::{EventType, TriggerCondition, TriggerSpec};
use mtg_engine::zones::Zone;

fn cast_bears(game: &mut Game, player: mtg_engine::core::PlayerId) -> mtg_engine::core::ObjectId {
    let bears = in_hand(game, &grizzly_bears(), player);
    give_mana(game, player, ManaType::Green, 2);
    game.cast_spell(player, bears).unwrap();
    bears
}

#[test]
fn test_shrine_charges_on_own_upkeep_only() {
    let mut game = two_player_game();
    let shrine = on_battlefield(&mut game, &shrine_of_boundless_growth(), ALICE);

    game.advance_to(Step::Upkeep).unwrap();
    assert_eq!(game.state().turn.active_player, BOB);
    assert!(game.state().stack.is_empty());

    game.advance_to(Step::Upkeep).unwrap();
    assert_eq!(game.state().turn.active_player, ALICE);
    assert_eq!(game.state().stack.len(), 1);
    game.run_stack().unwrap();
    assert_eq!(counters(&game, shrine, CounterType::Charge), 1);
}

#[test]
fn test_shrine_charges_on_own_green_spells() {
    let mut game = two_player_game();
    let shrine = on_battlefield(&mut game, &shrine_of_boundless_growth(), ALICE);

    cast_bears(&mut game, ALICE);
    assert_eq!(game.state().stack.len(), 2);
    game.run_stack().unwrap();
    assert_eq!(counters(&game, shrine, CounterType::Charge), 1);

    cast_bears(&mut game, BOB);
    assert_eq!(game.state().stack.len(), 1);
    game.run_stack().unwrap();
    assert_eq!(counters(&game, shrine, CounterType::Charge), 1);

    // Colorless spells do not count.
    let thopter = in_hand(&mut game, &ornithopter(), ALICE);
    game.cast_spell(ALICE, thopter).unwrap();
    game.run_stack().unwrap();
    assert_eq!(counters(&game, shrine, CounterType::Charge), 1);
}

#[test]
fn test_shrine_counts_each_qualifying_event_once() {
    let mut game = two_player_game();
    let shrine = on_battlefield(&mut game, &shrine_of_boundless_growth(), ALICE);
    game.advance_to(Step::Upkeep).unwrap();
    game.advance_to(Step::Upkeep).unwrap();

    // Upkeep trigger plus one green spell before the next upkeep.
    game.advance_to(Step::PrecombatMain).unwrap();
    cast_bears(&mut game, ALICE);
    game.run_stack().unwrap();
    game.settle().unwrap();
    assert_eq!(counters(&game, shrine, CounterType::Charge), 2);
}

#[test]
fn test_shrine_sacrifice_uses_counters_it_had() {
    let mut game = two_player_game();
    let shrine = on_battlefield(&mut game, &shrine_of_boundless_growth(), ALICE);
    game.state_mut().add_counters(shrine, CounterType::Charge, 4).unwrap();
    game.settle().unwrap();

    let sacrifice = mana_ability(&game, shrine);
    assert_eq!(game.activate_ability(ALICE, shrine, sacrifice).unwrap(), None);
    assert_eq!(game.state().zone_of(shrine), Some(Zone::Graveyard));
    assert_eq!(game.state().player(ALICE).unwrap().mana_pool.get(ManaType::Colorless), 4);
}

#[test]
fn test_wurms_tooth_is_optional() {
    let decider = ScriptedDecisions::new().answer([true]);
    let prompts = decider.prompts();
    let mut game = two_player_game().with_decider(BOB, decider);
    on_battlefield(&mut game, &wurms_tooth(), BOB);

    cast_bears(&mut game, ALICE);
    game.run_stack().unwrap();
    assert_eq!(prompts.borrow().as_slice(), ["Gain 1 life?"]);
    assert_eq!(life(&game, BOB), 21);

    // Nobody answers for Alice: her copy is declined.
    on_battlefield(&mut game, &wurms_tooth(), ALICE);
    cast_bears(&mut game, ALICE);
    game.run_stack().unwrap();
    assert_eq!(life(&game, ALICE), 20);
    assert_eq!(life(&game, BOB), 21);
}

#[test]
fn test_synod_centurion_sacrificed_without_other_artifacts() {
    let mut game = two_player_game();
    let thopter = on_battlefield(&mut game, &ornithopter(), ALICE);
    let centurion = on_battlefield(&mut game, &synod_centurion(), ALICE);
    assert!(game.state().stack.is_empty());

    game.state_mut().move_object(thopter, Zone::Graveyard).unwrap();
    game.settle().unwrap();
    assert_eq!(game.state().stack.len(), 1);

    // Still true, but one instance is already waiting.
    game.settle().unwrap();
    assert_eq!(game.state().stack.len(), 1);

    game.run_stack().unwrap();
    assert_eq!(game.state().zone_of(centurion), Some(Zone::Graveyard));
    assert!(game.state().stack.is_empty());
}

#[test]
fn test_synod_centurion_ignores_opponents_artifacts() {
    let mut game = two_player_game();
    on_battlefield(&mut game, &ornithopter(), BOB);
    let centurion = on_battlefield(&mut game, &synod_centurion(), ALICE);
    assert_eq!(game.state().stack.len(), 1);
    game.run_stack().unwrap();
    assert_eq!(game.state().zone_of(centurion), Some(Zone::Graveyard));
}

#[test]
fn test_dies_trigger_sees_the_creature_it_was() {
    let dies = Ability::triggered(
        TriggerSpec::on(EventType::ZoneChanged)
            .with_condition(TriggerCondition::SourceIsSelf)
            .with_condition(TriggerCondition::ToZone(Zone::Graveyard)),
        [OneShotEffect::GainLife {
            player: PlayerRef::Controller,
            amount: Amount::Fixed(3),
        }
        .into()],
    );
    let martyr = CardDefinition::new("Faithful Martyr")
        .with_type(CardType::Creature)
        .with_pt(1, 1)
        .with_ability(dies);

    let mut game = two_player_game();
    let id = on_battlefield(&mut game, &martyr, ALICE);
    game.state_mut().move_object(id, Zone::Graveyard).unwrap();
    game.settle().unwrap();
    assert_eq!(game.state().stack.len(), 1);

    game.run_stack().unwrap();
    assert_eq!(life(&game, ALICE), 23);
    assert!(game.state().triggers.is_empty());
}

#[test]
fn test_apnap_order() {
    let mut game = two_player_game();
    on_battlefield(&mut game, &wurms_tooth(), BOB);
    on_battlefield(&mut game, &wurms_tooth(), ALICE);

    cast_bears(&mut game, ALICE);
    let controllers: Vec<_> = game.state().stack.iter().map(|e| e.controller).collect();
    // Spell, then the active player's trigger, then the other player's on top.
    assert_eq!(controllers, [ALICE, ALICE, BOB]);
}

fn two_triggers(decider: ScriptedDecisions) -> Game {
    let mut game = two_player_game().with_decider(ALICE, decider);
    on_battlefield(&mut game, &shrine_of_boundless_growth(), ALICE);
    on_battlefield(&mut game, &wurms_tooth(), ALICE);
    cast_bears(&mut game, ALICE);
    game
}

fn trigger_order(game: &Game) -> Vec<mtg_engine::core::AbilityId> {
    game.state().stack.iter().filter_map(|e| e.ability_id()).collect()
}

#[test]
fn test_controller_orders_own_triggers() {
    let default = trigger_order(&two_triggers(ScriptedDecisions::new()));
    let reversed = trigger_order(&two_triggers(ScriptedDecisions::new().order(vec![1, 0])));
    assert_eq!(default.len(), 2);
    assert_eq!(reversed, [default[1], default[0]]);

    // Not a permutation: the order is ignored.
    let invalid = trigger_order(&two_triggers(ScriptedDecisions::new().order(vec![0, 0])));
    assert_eq!(invalid, default);
}

#[test]
fn test_bus_delivers_published_events() {
    let mut game = two_player_game();
    let all = Rc::new(RefCell::new(Vec::new()));
    let casts = Rc::new(RefCell::new(0));

    let sink = Rc::clone(&all);
    game.bus_mut().subscribe(move |event| sink.borrow_mut().push(event.event_type));
    let counter = Rc::clone(&casts);
    let subscription = game.bus_mut().subscribe_to(EventType::SpellCast, move |_| *counter.borrow_mut() += 1);

    let bears = cast_bears(&mut game, ALICE);
    assert_eq!(*casts.borrow(), 1);
    assert!(all.borrow().contains(&EventType::ZoneChanged));
    assert!(all.borrow().contains(&EventType::SpellCast));

    game.run_stack().unwrap();
    assert_eq!(game.state().zone_of(bears), Some(Zone::Battlefield));
    assert!(all.borrow().contains(&EventType::EnteredBattlefield));

    assert!(game.bus_mut().unsubscribe(subscription));
    cast_bears(&mut game, ALICE);
    assert_eq!(*casts.borrow(), 1);
    assert!(!game.state().has_events());
}

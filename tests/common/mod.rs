//! Shared card fixtures and helpers for integration tests.

#![allow(dead_code)]

use mtg_engine::abilities::{Ability, AbilityKind, KickerAbility};
use mtg_engine::cards::{CardDefinition, CardType, CounterType, Keyword};
use mtg_engine::core::{AbilityId, GameConfig, ObjectId, PlayerId};
use mtg_engine::costs::{Cost, ManaCost, ManaType};
use mtg_engine::effects::{
    Affected, Amount, Condition, ContinuousEffect, ControlSource, Duration, Effect, EffectTarget,
    Modification, ObjectFilter, OneShotEffect, PlayerRef, TargetSpec,
};
use mtg_engine::game::Game;
use mtg_engine::triggers::{EventType, StashRule, TriggerCondition, TriggerSpec};
use mtg_engine::zones::Zone;

pub const ALICE: PlayerId = PlayerId(0);
pub const BOB: PlayerId = PlayerId(1);

/// Install a test subscriber once; `RUST_LOG` controls the output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn cost(text: &str) -> ManaCost {
    ManaCost::parse(text).unwrap()
}

fn add_counters(counter: CounterType, amount: Amount) -> OneShotEffect {
    OneShotEffect::AddCounters {
        target: EffectTarget::Source,
        counter,
        amount,
    }
}

fn enters() -> TriggerSpec {
    TriggerSpec::on(EventType::EnteredBattlefield).with_condition(TriggerCondition::SourceIsSelf)
}

pub fn grizzly_bears() -> CardDefinition {
    CardDefinition::new("Grizzly Bears")
        .with_mana_cost(cost("{1}{G}"))
        .with_type(CardType::Creature)
        .with_subtype("Bear")
        .with_pt(2, 2)
}

/// Kicker {2}{G}. If kicked, enters with three +1/+1 counters and haste.
pub fn pouncing_wurm() -> CardDefinition {
    let kicked_entry = Ability::triggered(
        enters().with_intervening_if(Condition::Kicked),
        [
            add_counters(CounterType::PlusOnePlusOne, Amount::Fixed(3)).into(),
            ContinuousEffect::grant(Keyword::Haste, Affected::Source, Duration::WhileOnBattlefield).into(),
        ],
    );
    CardDefinition::new("Pouncing Wurm")
        .with_mana_cost(cost("{3}{G}"))
        .with_type(CardType::Creature)
        .with_subtype("Wurm")
        .with_pt(3, 3)
        .with_ability(Ability::kicker(KickerAbility::new("{2}{G}").unwrap()))
        .with_ability(kicked_entry)
}

/// Multikicker {2}. Enters with a charge counter per kick;
/// {T}: Add {C} for each charge counter.
pub fn everflowing_chalice() -> CardDefinition {
    let counters = Ability::triggered(
        enters().with_intervening_if(Condition::Kicked),
        [add_counters(CounterType::Charge, Amount::KickedCount).into()],
    );
    let mana = Ability::mana(
        vec![Cost::TapSource],
        OneShotEffect::AddMana {
            mana: ManaType::Colorless,
            amount: Amount::CountersOnSource(CounterType::Charge),
        }
        .into(),
    );
    CardDefinition::new("Everflowing Chalice")
        .with_mana_cost(cost("{0}"))
        .with_type(CardType::Artifact)
        .with_ability(Ability::kicker(KickerAbility::multikicker("{2}").unwrap()))
        .with_ability(counters)
        .with_ability(mana)
}

/// Kicker {X}{G}. If kicked, enters with X +1/+1 counters.
pub fn bramble_hulk() -> CardDefinition {
    let grow = Ability::triggered(
        enters().with_intervening_if(Condition::Kicked),
        [add_counters(CounterType::PlusOnePlusOne, Amount::KickerX).into()],
    );
    CardDefinition::new("Bramble Hulk")
        .with_mana_cost(cost("{1}{G}"))
        .with_type(CardType::Creature)
        .with_pt(1, 1)
        .with_ability(Ability::kicker(KickerAbility::new("{X}{G}").unwrap()))
        .with_ability(grow)
}

/// At the beginning of your upkeep or whenever you cast a green spell, put a
/// charge counter on it. {T}, sacrifice it: Add {C} for each charge counter.
pub fn shrine_of_boundless_growth() -> CardDefinition {
    let charge = || add_counters(CounterType::Charge, Amount::Fixed(1)).into();
    let upkeep = Ability::triggered(
        TriggerSpec::on(EventType::StepBegan)
            .with_condition(TriggerCondition::StepIs(mtg_engine::core::Step::Upkeep))
            .with_condition(TriggerCondition::ActivePlayerIsController),
        [charge()],
    );
    let green_spell = Ability::triggered(
        TriggerSpec::on(EventType::SpellCast)
            .with_condition(TriggerCondition::EventPlayerIsController)
            .with_condition(TriggerCondition::EventSourceMatches(
                ObjectFilter::spell().with_color(mtg_engine::cards::Color::Green),
            )),
        [charge()],
    );
    let mana = Ability::mana(
        vec![Cost::TapSource, Cost::SacrificeSource],
        OneShotEffect::AddMana {
            mana: ManaType::Colorless,
            amount: Amount::CountersOnSource(CounterType::Charge),
        }
        .into(),
    );
    CardDefinition::new("Shrine of Boundless Growth")
        .with_mana_cost(cost("{3}"))
        .with_type(CardType::Artifact)
        .with_ability(upkeep)
        .with_ability(green_spell)
        .with_ability(mana)
}

/// Whenever a player casts a green spell, you may gain 1 life.
pub fn wurms_tooth() -> CardDefinition {
    let gain = Ability::triggered(
        TriggerSpec::on(EventType::SpellCast).with_condition(TriggerCondition::EventSourceMatches(
            ObjectFilter::spell().with_color(mtg_engine::cards::Color::Green),
        )),
        [OneShotEffect::GainLife {
            player: PlayerRef::Controller,
            amount: Amount::Fixed(1),
        }
        .into()],
    )
    .optional()
    .with_text("Gain 1 life");
    CardDefinition::new("Wurm's Tooth")
        .with_mana_cost(cost("{1}"))
        .with_type(CardType::Artifact)
        .with_ability(gain)
}

/// Whenever you cast a Treefolk spell, you may have target creature get
/// +3/-3 until end of turn.
pub fn thorntooth_witch() -> CardDefinition {
    let boost = Ability::triggered(
        TriggerSpec::on(EventType::SpellCast)
            .with_condition(TriggerCondition::EventPlayerIsController)
            .with_condition(TriggerCondition::EventSourceMatches(
                ObjectFilter::spell().with_subtype("Treefolk"),
            )),
        [ContinuousEffect::boost(3, -3, Affected::Target(0), Duration::EndOfTurn).into()],
    )
    .with_target(TargetSpec::creature())
    .optional()
    .with_text("Have target creature get +3/-3 until end of turn");
    CardDefinition::new("Thorntooth Witch")
        .with_mana_cost(cost("{5}{B}"))
        .with_type(CardType::Creature)
        .with_subtype("Treefolk")
        .with_subtype("Shaman")
        .with_pt(3, 4)
        .with_ability(boost)
}

pub fn treefolk_seedlings() -> CardDefinition {
    CardDefinition::new("Treefolk Seedlings")
        .with_mana_cost(cost("{2}{G}"))
        .with_type(CardType::Creature)
        .with_subtype("Treefolk")
        .with_pt(2, 3)
}

/// Whenever it attacks, attacking creatures gain trample until end of turn.
pub fn fangren_pathcutter() -> CardDefinition {
    let trample = Ability::triggered(
        TriggerSpec::on(EventType::AttackerDeclared).with_condition(TriggerCondition::SourceIsSelf),
        [ContinuousEffect::grant(
            Keyword::Trample,
            Affected::LockedFilter(ObjectFilter::creature().attacking()),
            Duration::EndOfTurn,
        )
        .into()],
    );
    CardDefinition::new("Fangren Pathcutter")
        .with_mana_cost(cost("{4}{G}{G}"))
        .with_type(CardType::Creature)
        .with_subtype("Beast")
        .with_pt(4, 6)
        .with_ability(trample)
}

/// Outlast {B}; each creature you control with a +1/+1 counter has deathtouch.
pub fn mer_ek_nightblade() -> CardDefinition {
    let outlast = Ability::activated(
        vec![Cost::Mana(cost("{B}")), Cost::TapSource],
        [add_counters(CounterType::PlusOnePlusOne, Amount::Fixed(1)).into()],
    )
    .with_text("Outlast {B}");
    let deathtouch = Ability::static_effect(ContinuousEffect::grant(
        Keyword::Deathtouch,
        Affected::Filter(
            ObjectFilter::creature()
                .you_control()
                .with_counter(CounterType::PlusOnePlusOne),
        ),
        Duration::WhileOnBattlefield,
    ));
    CardDefinition::new("Mer-Ek Nightblade")
        .with_mana_cost(cost("{3}{B}"))
        .with_type(CardType::Creature)
        .with_subtype("Orc")
        .with_subtype("Assassin")
        .with_pt(2, 3)
        .with_ability(outlast)
        .with_ability(deathtouch)
}

/// When you control no other artifacts, sacrifice it.
pub fn synod_centurion() -> CardDefinition {
    let sacrifice = Ability::state_triggered(
        Condition::ControlsNone(ObjectFilter::permanent().with_type(CardType::Artifact).another()),
        [OneShotEffect::Sacrifice {
            target: EffectTarget::Source,
        }
        .into()],
    );
    CardDefinition::new("Synod Centurion")
        .with_mana_cost(cost("{4}"))
        .with_type(CardType::Artifact)
        .with_type(CardType::Creature)
        .with_subtype("Construct")
        .with_pt(4, 4)
        .with_ability(sacrifice)
}

pub fn ornithopter() -> CardDefinition {
    CardDefinition::new("Ornithopter")
        .with_mana_cost(cost("{0}"))
        .with_type(CardType::Artifact)
        .with_type(CardType::Creature)
        .with_subtype("Thopter")
        .with_keyword(Keyword::Flying)
        .with_pt(0, 2)
}

/// Whenever a creature deals combat damage to you, that creature's controller
/// gains control of it. {T}: Add {C}. {1}, {T}: Attacking creatures get +1/+0
/// until end of turn.
pub fn contested_war_zone() -> CardDefinition {
    let control = Ability::triggered(
        TriggerSpec::on(EventType::DamagedPlayer)
            .with_condition(TriggerCondition::CombatDamage)
            .with_condition(TriggerCondition::EventPlayerIsController)
            .with_condition(TriggerCondition::EventSourceMatches(ObjectFilter::creature()))
            .stash(StashRule::EventSourceController),
        [ContinuousEffect::new(
            Modification::ChangeControl(ControlSource::Stashed),
            Affected::Source,
            Duration::Custom,
        )
        .into()],
    );
    let mana = Ability::mana(
        vec![Cost::TapSource],
        OneShotEffect::AddMana {
            mana: ManaType::Colorless,
            amount: Amount::Fixed(1),
        }
        .into(),
    );
    let rally = Ability::activated(
        vec![Cost::Mana(cost("{1}")), Cost::TapSource],
        [ContinuousEffect::boost(
            1,
            0,
            Affected::LockedFilter(ObjectFilter::creature().attacking()),
            Duration::EndOfTurn,
        )
        .into()],
    );
    CardDefinition::new("Contested War Zone")
        .with_type(CardType::Land)
        .with_ability(control)
        .with_ability(mana)
        .with_ability(rally)
}

/// Flying. As long as you control your commander, it gets +2/+2 and has
/// "Whenever this creature deals combat damage to a player, that player
/// sacrifices a creature."
pub fn demon_of_wailing_agonies() -> CardDefinition {
    let sacrifice = Ability::triggered(
        TriggerSpec::on(EventType::DamagedPlayer)
            .with_condition(TriggerCondition::CombatDamage)
            .with_condition(TriggerCondition::SourceIsSelf),
        [OneShotEffect::PlayerSacrifices {
            player: PlayerRef::EventPlayer,
            filter: ObjectFilter::creature(),
        }
        .into()],
    );
    let boost = ContinuousEffect::boost(2, 2, Affected::Source, Duration::WhileOnBattlefield)
        .as_long_as(Condition::ControlsCommander);
    let grant = ContinuousEffect::grant_ability(sacrifice, Affected::Source, Duration::WhileOnBattlefield)
        .as_long_as(Condition::ControlsCommander);
    CardDefinition::new("Demon of Wailing Agonies")
        .with_mana_cost(cost("{3}{B}{B}"))
        .with_type(CardType::Creature)
        .with_subtype("Demon")
        .with_keyword(Keyword::Flying)
        .with_pt(4, 4)
        .with_ability(Ability::static_effect(boost))
        .with_ability(Ability::static_effect(grant))
}

/// Detain up to two target creatures your opponents control.
pub fn lyev_decree() -> CardDefinition {
    let detain = Ability::spell([ContinuousEffect::new(
        Modification::Detain,
        Affected::AllTargets,
        Duration::UntilYourNextTurn,
    )
    .into()])
    .with_target(TargetSpec::Object(ObjectFilter::creature().opponent_controls()).up_to(2));
    CardDefinition::new("Lyev Decree")
        .with_mana_cost(cost("{1}{W}"))
        .with_type(CardType::Sorcery)
        .with_ability(detain)
}

/// As an additional cost, sacrifice a creature. Search your library for a
/// creature card and put it into your hand.
pub fn altar_of_bone() -> CardDefinition {
    let search = Ability::spell([OneShotEffect::SearchLibrary {
        filter: ObjectFilter::any_zone().with_type(CardType::Creature),
    }
    .into()])
    .with_cost(Cost::Sacrifice(ObjectFilter::creature().you_control()));
    CardDefinition::new("Altar of Bone")
        .with_mana_cost(cost("{G}{W}"))
        .with_type(CardType::Sorcery)
        .with_ability(search)
}

/// Kicker {1}{B} and/or {3}{R}. Target opponent loses 2 life, and 1 more
/// for each kicker paid.
pub fn twin_flame_hex() -> CardDefinition {
    let hex = Ability::spell([
        OneShotEffect::LoseLife {
            player: PlayerRef::Target(0),
            amount: Amount::Fixed(2),
        }
        .into(),
        Effect::when(
            Condition::Kicked,
            OneShotEffect::LoseLife {
                player: PlayerRef::Target(0),
                amount: Amount::KickedCount,
            }
            .into(),
        ),
    ])
    .with_target(TargetSpec::opponent());
    CardDefinition::new("Twin Flame Hex")
        .with_mana_cost(cost("{R}"))
        .with_type(CardType::Instant)
        .with_ability(Ability::kicker(
            KickerAbility::new("{1}{B}").unwrap().and_kicker("{3}{R}").unwrap(),
        ))
        .with_ability(hex)
}

/// Kicker {G}. Target creature gets +4/+4 until end of turn if it was kicked.
pub fn vines_of_vastwood() -> CardDefinition {
    let pump = Ability::spell([Effect::when(
        Condition::Kicked,
        ContinuousEffect::boost(4, 4, Affected::Target(0), Duration::EndOfTurn).into(),
    )])
    .with_target(TargetSpec::creature());
    CardDefinition::new("Vines of Vastwood")
        .with_mana_cost(cost("{G}"))
        .with_type(CardType::Instant)
        .with_ability(Ability::kicker(KickerAbility::new("{G}").unwrap()))
        .with_ability(pump)
}

/// A two-player game in Alice's first main phase.
pub fn two_player_game() -> Game {
    init_tracing();
    Game::new(GameConfig::default())
}

pub fn give_mana(game: &mut Game, player: PlayerId, mana: ManaType, amount: u32) {
    game.state_mut()
        .player_mut(player)
        .unwrap()
        .mana_pool
        .add(mana, amount);
}

pub fn in_hand(game: &mut Game, card: &CardDefinition, owner: PlayerId) -> ObjectId {
    game.create_object(card, owner, Zone::Hand).unwrap()
}

pub fn on_battlefield(game: &mut Game, card: &CardDefinition, owner: PlayerId) -> ObjectId {
    game.create_object(card, owner, Zone::Battlefield).unwrap()
}

pub fn counters(game: &Game, object: ObjectId, counter: CounterType) -> u32 {
    game.object(object).unwrap().counters.get(counter)
}

pub fn life(game: &Game, player: PlayerId) -> i64 {
    game.state().player(player).unwrap().life
}

/// Id of the object's first mana ability.
pub fn mana_ability(game: &Game, object: ObjectId) -> AbilityId {
    ability_where(game, object, |kind| matches!(kind, AbilityKind::Mana), 0)
}

/// Id of the object's `nth` activated (non-mana) ability.
pub fn activated_ability(game: &Game, object: ObjectId, nth: usize) -> AbilityId {
    ability_where(game, object, |kind| matches!(kind, AbilityKind::Activated), nth)
}

fn ability_where(game: &Game, object: ObjectId, pred: impl Fn(&AbilityKind) -> bool, nth: usize) -> AbilityId {
    game.object(object)
        .unwrap()
        .abilities
        .iter()
        .filter(|a| pred(&a.kind))
        .nth(nth)
        .map(|a| a.id)
        .unwrap()
}

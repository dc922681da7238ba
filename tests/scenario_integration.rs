//! Scenario integration tests
//!
//! Drives whole phases through the public API: spotting, crew actions,
//! movement, the phase cycle, save/load and a headless autoplayed battle.

use armoured_command::ai::play_input_phase;
use armoured_command::campaign::GroundCondition;
use armoured_command::content::tables::FAILED_MOVE_BONUS;
use armoured_command::content::{AmmoType, Catalogue, Terrain};
use armoured_command::core::{EngineConfig, FixedDice, IllegalAction, Nation, SeededDice, Side};
use armoured_command::crew::{CrewCommand, PositionKind};
use armoured_command::hex::HexCoord;
use armoured_command::scenario::{
    Clock, DayHex, Phase, Scenario, ScenarioContext, ScenarioOutcome, SoundEvent, MAP_RADIUS,
};
use armoured_command::unit::{MoveDirection, MoveOutcome, Unit};

fn skirmish(player: &str, enemies: &[(&str, HexCoord)]) -> Scenario {
    let catalogue = Catalogue::builtin().unwrap();
    let mut dice = SeededDice::new(2024);
    let mut tank = Unit::new(catalogue.get(player).unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
    tank.terrain = Terrain::OpenGround;
    tank.recalculate_movement(GroundCondition::Dry);
    let context = ScenarioContext::new(DayHex::default(), Nation::Poland, catalogue.roster(Nation::Poland));
    let mut scenario = Scenario::with_player(context, tank, EngineConfig::default()).unwrap();
    for (type_id, hex) in enemies {
        let enemy = Unit::new(catalogue.get(type_id).unwrap(), Side::Enemy, *hex, 3, &mut dice);
        scenario.add_unit(enemy);
    }
    scenario
}

#[test]
fn test_spotting_reports_each_enemy_once() {
    let mut scenario = skirmish("pzkpfw_iii_e", &[("polish_rifle_squad", HexCoord::new(0, -3))]);
    assert!(!scenario.units[1].spotted);

    // every crewman with a view rolls a 1, but only one report goes out
    let mut dice = FixedDice::always(1.0);
    scenario.run_spotting(&mut dice);

    assert!(scenario.units[1].spotted);
    assert_eq!(scenario.notifications.count_sounds(SoundEvent::Spotted), 1);
}

#[test]
fn test_spotting_failure_leaves_enemy_hidden() {
    let mut scenario = skirmish("pzkpfw_iii_e", &[("polish_rifle_squad", HexCoord::new(0, -3))]);
    let mut dice = FixedDice::always(100.0);
    scenario.run_spotting(&mut dice);
    assert!(!scenario.units[1].spotted);
    assert_eq!(scenario.notifications.count_sounds(SoundEvent::Spotted), 0);
}

#[test]
fn test_phase_cycle_closes_after_eight_advances() {
    let mut scenario = skirmish("pzkpfw_iii_e", &[("polish_rifle_squad", HexCoord::new(1, -3))]);
    let mut dice = FixedDice::always(99.0);
    let mut seen = Vec::new();
    for _ in 0..8 {
        seen.push(scenario.advance_phase(&mut dice).unwrap());
    }
    assert_eq!(
        seen,
        vec![
            Phase::Spotting,
            Phase::CrewAction,
            Phase::Movement,
            Phase::Shooting,
            Phase::CloseCombat,
            Phase::AlliedAction,
            Phase::EnemyAction,
            Phase::Command,
        ]
    );
    assert_eq!(scenario.turn, 2);
    assert_eq!(scenario.clock, Clock::new(8, 2));
}

#[test]
fn test_ready_rack_fills_to_capacity_during_crew_actions() {
    let mut scenario = skirmish("pzkpfw_iii_e", &[("7tp", HexCoord::new(0, -3))]);
    let loader = scenario.player().position_index(PositionKind::Loader).unwrap();
    scenario.set_crew_command(loader, CrewCommand::ManageReadyRack).unwrap();

    // orders are given in Command, the rack is handled in Crew Action
    assert_eq!(
        scenario.manage_ready_rack(0, AmmoType::Ap, 1),
        Err(IllegalAction::WrongPhase("Command".into()))
    );
    let mut dice = FixedDice::always(99.0);
    scenario.advance_phase(&mut dice).unwrap();
    scenario.advance_phase(&mut dice).unwrap();
    assert_eq!(scenario.phase, Phase::CrewAction);
    assert!(scenario.phase_needs_input());

    let rr_size = scenario.player().weapons[0].ammo.rr_size();
    let mut last = Ok(());
    for _ in 0..=rr_size {
        last = scenario.manage_ready_rack(0, AmmoType::Ap, 1);
        if last.is_err() {
            break;
        }
    }
    assert_eq!(last, Err(IllegalAction::ReadyRackFull));
    assert_eq!(scenario.player().weapons[0].ammo.rr_total(), rr_size);

    let stores = &scenario.player().weapons[0].ammo;
    assert!(stores.total() <= stores.max_ammo());

    assert_eq!(scenario.end_crew_actions(&mut dice), Ok(Phase::Movement));
}

#[test]
fn test_failed_move_builds_bonus_and_ends_movement() {
    let mut scenario = skirmish("pzkpfw_iii_e", &[("polish_rifle_squad", HexCoord::new(0, -3))]);
    scenario.phase = Phase::Movement;
    let mut dice = FixedDice::always(99.0);

    let outcome = scenario.move_player(MoveDirection::Forward, &mut dice).unwrap();
    assert_eq!(outcome, MoveOutcome::Failed);
    assert_eq!(scenario.phase, Phase::Shooting);
    assert_eq!(scenario.player().movement.forward_bonus, FAILED_MOVE_BONUS);
    assert_eq!(scenario.player().movement.reverse_bonus, 0.0);
    // the frame did not shift
    assert_eq!(scenario.units[1].hex, HexCoord::new(0, -3));
}

#[test]
fn test_forward_move_shifts_enemies_toward_player() {
    let mut scenario = skirmish("pzkpfw_iii_e", &[("polish_rifle_squad", HexCoord::new(0, -3))]);
    scenario.phase = Phase::Movement;
    // 1 moves, then every breakdown and bog roll misses
    let mut dice = FixedDice::scripted([1.0], 99.0);

    let outcome = scenario.move_player(MoveDirection::Forward, &mut dice).unwrap();
    assert!(matches!(outcome, MoveOutcome::Moved { .. }));
    assert_eq!(scenario.player().hex, HexCoord::ORIGIN);
    assert_eq!(scenario.units[1].hex, HexCoord::new(0, -2));
    assert_eq!(scenario.map.top(HexCoord::new(0, -2)), Some(scenario.units[1].id));
}

#[test]
fn test_save_and_resume_mid_turn() {
    let mut scenario = skirmish("pzkpfw_iii_e", &[("7tp", HexCoord::new(1, -3))]);
    let mut dice = FixedDice::always(99.0);
    for _ in 0..3 {
        scenario.advance_phase(&mut dice).unwrap();
    }
    let json = scenario.to_json().unwrap();
    let mut restored = Scenario::from_json(&json).unwrap();
    assert_eq!(restored.phase, Phase::Movement);
    assert_eq!(restored.units, scenario.units);
    assert!(restored.notifications.is_empty());

    for _ in 0..5 {
        restored.advance_phase(&mut dice).unwrap();
    }
    assert_eq!(restored.phase, Phase::Command);
    assert_eq!(restored.turn, 2);
}

#[test]
fn test_no_enemies_left_is_victory() {
    let mut scenario = skirmish("pzkpfw_iii_e", &[]);
    let mut dice = FixedDice::always(99.0);
    scenario.advance_phase(&mut dice).unwrap();
    assert!(scenario.finished);
    assert_eq!(scenario.report.outcome, Some(ScenarioOutcome::Victory));
    assert_eq!(scenario.advance_phase(&mut dice), Err(IllegalAction::ScenarioFinished));
}

#[test]
fn test_autoplayed_battle_keeps_map_consistent() {
    let catalogue = Catalogue::builtin().unwrap();
    let mut dice = SeededDice::new(77);
    let day_hex = DayHex {
        strength: 6,
        ..DayHex::default()
    };
    let context = ScenarioContext::new(day_hex, Nation::Poland, catalogue.roster(Nation::Poland));
    let player = Unit::new(catalogue.get("pzkpfw_iv_d").unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
    let mut scenario = Scenario::new(context, player, EngineConfig::default(), &mut dice).unwrap();

    for _ in 0..120 {
        if scenario.finished || scenario.turn > 15 {
            break;
        }
        play_input_phase(&mut scenario, &mut dice).unwrap();
        scenario.notifications.drain();

        assert_eq!(scenario.player().hex, HexCoord::ORIGIN);
        for unit in &scenario.units {
            assert!(scenario.map.occurrences(unit.id) <= 1, "{} stacked twice", unit.stats.name);
            assert!(unit.hex.distance(&HexCoord::ORIGIN) <= MAP_RADIUS);
        }
    }
    if scenario.finished {
        assert!(scenario.report.outcome.is_some());
    } else {
        assert!(scenario.phase_needs_input());
    }
}

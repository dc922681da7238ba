//! Headless Scenario Runner
//!
//! Plays one scenario with a stand-in commander and prints the result.

use std::path::PathBuf;

use armoured_command::ai::play_input_phase;
use armoured_command::content::{Catalogue, CampaignTerrain};
use armoured_command::core::error::{EngineError, Result};
use armoured_command::core::{EngineConfig, Nation, SeededDice, Side};
use armoured_command::hex::HexCoord;
use armoured_command::scenario::{DayHex, Mission, Notification, Scenario, ScenarioContext};
use armoured_command::unit::Unit;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless Scenario Runner - one tank battle, played automatically
#[derive(Parser, Debug)]
#[command(name = "armoured-command")]
#[command(about = "Run a tactical scenario headless and report the outcome")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Player unit type id
    #[arg(long, default_value = "pzkpfw_35t")]
    player: String,

    /// Enemy nation: poland, soviet or france
    #[arg(long, default_value = "poland")]
    enemy: String,

    /// Enemy strength of the day hex, 1-10
    #[arg(long, default_value_t = 3)]
    strength: u8,

    /// Day hex terrain: flat, grassland, forest, hills, villages or marsh
    #[arg(long, default_value = "flat")]
    terrain: String,

    /// Mission: advance, battle, counterattack, hill-defence,
    /// withdrawal or patrol
    #[arg(long, default_value = "advance")]
    mission: String,

    /// Squad units fighting alongside the player
    #[arg(long, default_value_t = 0)]
    squad: u32,

    /// Turn limit before the run is called off
    #[arg(long, default_value_t = 30)]
    turns: u32,

    /// Engine configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Print every message as it happens
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunResult {
    outcome: String,
    turns: u32,
    victory_points: u32,
    infantry_killed: u32,
    guns_killed: u32,
    vehicles_killed: u32,
    friendly_losses: u32,
    seed: u64,
}

fn parse_terrain(name: &str) -> Result<CampaignTerrain> {
    Ok(match name.to_lowercase().as_str() {
        "flat" => CampaignTerrain::Flat,
        "grassland" => CampaignTerrain::Grassland,
        "forest" => CampaignTerrain::Forest,
        "hills" => CampaignTerrain::Hills,
        "villages" => CampaignTerrain::Villages,
        "marsh" => CampaignTerrain::Marsh,
        other => return Err(EngineError::Config(format!("unknown terrain '{}'", other))),
    })
}

fn parse_nation(name: &str) -> Result<Nation> {
    Ok(match name.to_lowercase().as_str() {
        "germany" => Nation::Germany,
        "poland" => Nation::Poland,
        "soviet" | "soviet-union" => Nation::SovietUnion,
        "france" => Nation::France,
        other => return Err(EngineError::Config(format!("unknown nation '{}'", other))),
    })
}

fn parse_mission(name: &str) -> Result<Mission> {
    Ok(match name.to_lowercase().as_str() {
        "advance" => Mission::Advance,
        "battle" => Mission::Battle,
        "counterattack" => Mission::Counterattack,
        "hill-defence" => Mission::HillDefence,
        "withdrawal" => Mission::FightingWithdrawal,
        "patrol" => Mission::Patrol,
        other => return Err(EngineError::Config(format!("unknown mission '{}'", other))),
    })
}

fn print_notifications(scenario: &mut Scenario, verbose: bool) {
    let pending = scenario.notifications.drain();
    if !verbose {
        return;
    }
    for notification in pending {
        if let Notification::Message { text, .. } = notification {
            eprintln!("[turn {} {}] {}", scenario.turn, scenario.phase.name(), text);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("armoured_command=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut dice = SeededDice::new(seed);
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let catalogue = Catalogue::builtin()?;
    let enemy = parse_nation(&args.enemy)?;
    let day_hex = DayHex {
        terrain: parse_terrain(&args.terrain)?,
        strength: args.strength,
        ..DayHex::default()
    };
    let mut context = ScenarioContext::new(day_hex, enemy, catalogue.roster(enemy));
    context.mission = parse_mission(&args.mission)?;
    context.squad_size = args.squad;

    let player = Unit::new(catalogue.get(&args.player)?, Side::Player, HexCoord::ORIGIN, 0, &mut dice);
    tracing::info!(seed, player = %player.stats.name, "starting scenario");
    let mut scenario = Scenario::new(context, player, config, &mut dice)?;
    print_notifications(&mut scenario, args.verbose);

    while !scenario.finished && scenario.turn <= args.turns {
        play_input_phase(&mut scenario, &mut dice)?;
        print_notifications(&mut scenario, args.verbose);
    }

    let report = &scenario.report;
    let result = RunResult {
        outcome: report
            .outcome
            .map_or_else(|| "Unfinished".to_string(), |o| format!("{:?}", o)),
        turns: scenario.turn,
        victory_points: report.victory_points,
        infantry_killed: report.kills.infantry,
        guns_killed: report.kills.guns,
        vehicles_killed: report.kills.vehicles,
        friendly_losses: report.friendly_losses,
        seed,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("=== {} ===", result.outcome);
        println!("Turns: {}  Victory points: {}", result.turns, result.victory_points);
        println!(
            "Destroyed: {} infantry, {} guns, {} vehicles",
            result.infantry_killed, result.guns_killed, result.vehicles_killed
        );
        if result.friendly_losses > 0 {
            println!("Squad losses: {}", result.friendly_losses);
        }
        for (name, exp, levels) in &report.experience {
            println!("  {} - {} exp{}", name, exp, if *levels > 0 { " (promoted)" } else { "" });
        }
        println!("Seed: {}", seed);
    }
    Ok(())
}

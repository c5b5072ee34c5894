//! Dragons of Glory - event phase runner
//!
//! Loads an event catalog and a scenario, then plays the strategic event
//! phases of a number of turns and prints what fired.

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::PathBuf;

use dragons_of_glory::core::config::RulesConfig;
use dragons_of_glory::core::error::Result;
use dragons_of_glory::events::{EventEngine, PhaseOutcome, WeightedSelector};
use dragons_of_glory::game::phase::{advance_phase, GamePhase};
use dragons_of_glory::scenario::{load_event_catalog, ScenarioSpec};

/// Play the strategic event phases of a scenario
#[derive(Parser, Debug)]
#[command(name = "dragons_of_glory")]
#[command(about = "Run the strategic event phases of a Dragons of Glory scenario")]
struct Args {
    /// Event catalog (JSON list of event definitions)
    #[arg(long, default_value = "data/events.json")]
    events: PathBuf,

    /// Scenario file (JSON)
    #[arg(long, default_value = "data/scenario.json")]
    scenario: PathBuf,

    /// Rules configuration (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of turns to play
    #[arg(long, default_value_t = 5)]
    turns: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Draw events by probability instead of uniformly
    #[arg(long)]
    weighted: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dragons_of_glory=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RulesConfig::from_toml_str(&fs::read_to_string(path)?)?,
        None => RulesConfig::default(),
    };
    let catalog = load_event_catalog(&fs::read_to_string(&args.events)?)?;
    let spec = ScenarioSpec::from_json(&fs::read_to_string(&args.scenario)?)?;
    let mut scenario = spec.build(&catalog, &config)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    tracing::info!(scenario = %scenario.id, seed, "Starting");

    let mut engine = if args.weighted {
        EventEngine::with_selector(&catalog, Box::new(WeightedSelector::from_config(&config)))
    } else {
        EventEngine::new(&catalog)
    };

    println!("=== {} ===", scenario.id);
    println!("{} event(s) possible\n", scenario.pool.len());

    let last_turn = scenario.state.turn + args.turns;
    while scenario.state.turn < last_turn {
        if scenario.state.phase == GamePhase::StrategicEvents {
            let turn = scenario.state.turn;
            let side = scenario.state.active_player;
            match engine.run_event_phase(&mut scenario.pool, &mut scenario.state, &mut rng) {
                Ok(PhaseOutcome::Fired { event, .. }) => {
                    let description = catalog.lookup(&event).map(|d| d.description.clone()).unwrap_or_default();
                    println!("Turn {turn:>2} {side:<10} {event}  {description}");
                }
                Ok(PhaseOutcome::NoEvent) => println!("Turn {turn:>2} {side:<10} (no event)"),
                Err(err) => println!("Turn {turn:>2} {side:<10} event failed: {err}"),
            }
        }
        advance_phase(&mut scenario.state);
    }

    println!("\n{} event(s) left in the pool", scenario.pool.len());
    for side in dragons_of_glory::core::types::Allegiance::sides() {
        let player = scenario.state.player(side)?;
        println!(
            "{side}: {} countries, artifacts {:?}",
            player.controlled_countries.len(),
            player.artifacts
        );
    }
    Ok(())
}

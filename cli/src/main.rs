use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use robot_mission_core_rs::generation::{generate, GeneratorConfig};
use robot_mission_core_rs::{Heuristic, RunSummary, ScenarioConfig, Simulation, Status};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "robot-mission",
    version,
    about = "Run robot waste-collection missions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one mission and print its summary as JSON.
    Run {
        /// Scenario JSON file; when omitted a world is generated from the flags below.
        #[arg(long)]
        scenario: Option<PathBuf>,

        #[command(flatten)]
        world: WorldArgs,

        /// Claim heuristic for generated robots.
        #[arg(long, default_value = "closest")]
        heuristic: Heuristic,

        /// Give up after this many ticks and report the run as inconclusive.
        #[arg(long, default_value_t = 10_000)]
        max_ticks: u64,

        /// Forward every simulation event to the debug log.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run many generated missions for every heuristic, robot count and
    /// waste level, and print one line of mean results per combination.
    Batch {
        /// Missions per combination.
        #[arg(long, default_value_t = 100)]
        runs: u64,

        /// Heuristics to compare (repeatable); all of them when omitted.
        #[arg(long = "heuristic")]
        heuristics: Vec<Heuristic>,

        /// Robots of each tier (repeatable or comma-separated); 1, 2 and 4
        /// when omitted.
        #[arg(long, value_delimiter = ',')]
        robots: Vec<usize>,

        /// Waste items of each kind (repeatable or comma-separated); 4, 8 and
        /// 16 when omitted.
        #[arg(long, value_delimiter = ',')]
        waste: Vec<usize>,

        #[arg(long, default_value_t = 30)]
        width: i32,

        #[arg(long, default_value_t = 30)]
        height: i32,

        /// First seed; run `i` uses `seed + i`.
        #[arg(long, default_value_t = 1)]
        seed: u64,

        #[arg(long, default_value_t = 10_000)]
        max_ticks: u64,
    },
}

#[derive(Args, Debug)]
struct WorldArgs {
    #[arg(long, default_value_t = 30)]
    width: i32,
    #[arg(long, default_value_t = 30)]
    height: i32,
    #[arg(long, default_value_t = 2)]
    green_robots: usize,
    #[arg(long, default_value_t = 2)]
    yellow_robots: usize,
    #[arg(long, default_value_t = 2)]
    red_robots: usize,
    #[arg(long, default_value_t = 8)]
    green_waste: usize,
    #[arg(long, default_value_t = 0)]
    yellow_waste: usize,
    #[arg(long, default_value_t = 0)]
    red_waste: usize,
    /// Wall cells scattered over the grid.
    #[arg(long, default_value_t = 0)]
    walls: usize,
    #[arg(long, default_value_t = 1)]
    vision_radius: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const DEFAULT_ROBOTS: [usize; 3] = [1, 2, 4];
const DEFAULT_WASTE: [usize; 3] = [4, 8, 16];

/// Mean results of one heuristic, robot count and waste level over a batch.
#[derive(Debug, Serialize)]
struct BatchRow {
    heuristic: Heuristic,
    runs: u64,
    robots: usize,
    waste: usize,
    win_rate: f64,
    inconclusive: u64,
    mean_ticks: f64,
    mean_distance: f64,
    mean_delivered: f64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            scenario,
            world,
            heuristic,
            max_ticks,
            verbose,
        } => {
            let config = match scenario {
                Some(path) => load_scenario(&path)?,
                None => generate(&world.generator(heuristic))
                    .context("failed to generate scenario")?,
            };
            let summary = run_mission(config, max_ticks, verbose)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Batch {
            runs,
            heuristics,
            robots,
            waste,
            width,
            height,
            seed,
            max_ticks,
        } => {
            if runs == 0 {
                bail!("--runs must be at least 1");
            }
            let heuristics = or_default(heuristics, &Heuristic::ALL);
            let robots = or_default(robots, &DEFAULT_ROBOTS);
            let waste = or_default(waste, &DEFAULT_WASTE);
            for heuristic in &heuristics {
                for &robots in &robots {
                    for &waste in &waste {
                        let template = GeneratorConfig {
                            width,
                            height,
                            green_waste: waste,
                            yellow_waste: waste,
                            red_waste: waste,
                            green_robots: robots,
                            yellow_robots: robots,
                            red_robots: robots,
                            heuristic: *heuristic,
                            ..GeneratorConfig::default()
                        };
                        let row = run_batch(&template, runs, seed, max_ticks)?;
                        println!("{}", serde_json::to_string(&row)?);
                    }
                }
            }
        }
    }

    Ok(())
}

/// The values given on the command line, or `defaults` when there were none.
fn or_default<T: Clone>(given: Vec<T>, defaults: &[T]) -> Vec<T> {
    if given.is_empty() {
        defaults.to_vec()
    } else {
        given
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

impl WorldArgs {
    fn generator(&self, heuristic: Heuristic) -> GeneratorConfig {
        GeneratorConfig {
            width: self.width,
            height: self.height,
            green_waste: self.green_waste,
            yellow_waste: self.yellow_waste,
            red_waste: self.red_waste,
            green_robots: self.green_robots,
            yellow_robots: self.yellow_robots,
            red_robots: self.red_robots,
            walls: self.walls,
            heuristic,
            vision_radius: self.vision_radius,
            seed: self.seed,
            ..GeneratorConfig::default()
        }
    }
}

fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid scenario {}", path.display()))
}

fn run_mission(config: ScenarioConfig, max_ticks: u64, verbose: bool) -> Result<RunSummary> {
    let mut sim = Simulation::new(config).context("failed to build simulation")?;
    info!(
        fingerprint = sim.fingerprint(),
        agents = sim.agents().len(),
        items = sim.counts().total(),
        "mission started"
    );

    let mut logged = 0;
    while !sim.status().is_terminal() && sim.ticks_elapsed() < max_ticks {
        let result = sim.tick()?;
        if verbose {
            for event in sim.event_log().since(logged) {
                debug!(tick = event.tick(), kind = event.event_type(), event = ?event);
            }
            logged = sim.event_log().len();
        }
        if result.deliveries > 0 {
            debug!(tick = result.tick, delivered = sim.items_delivered(), "disposal");
        }
    }

    let summary = sim.summary();
    info!(
        status = %summary.status,
        ticks = summary.ticks,
        delivered = summary.items_delivered,
        inconclusive = summary.inconclusive,
        "mission finished"
    );
    Ok(summary)
}

fn run_batch(template: &GeneratorConfig, runs: u64, seed: u64, max_ticks: u64) -> Result<BatchRow> {
    let mut wins = 0;
    let mut inconclusive = 0;
    let mut ticks = 0;
    let mut distance = 0;
    let mut delivered = 0;

    for run in 0..runs {
        let config = GeneratorConfig {
            seed: seed.wrapping_add(run),
            ..template.clone()
        };
        let scenario = generate(&config)
            .with_context(|| format!("failed to generate scenario for seed {}", config.seed))?;
        let mut sim = Simulation::new(scenario)?;
        let summary = sim.run(max_ticks)?;
        debug!(heuristic = %template.heuristic, run, status = %summary.status, "batch run");

        if summary.status == Status::Won {
            wins += 1;
        }
        if summary.inconclusive {
            inconclusive += 1;
        }
        ticks += summary.ticks;
        distance += summary.total_distance_moved;
        delivered += summary.items_delivered;
    }

    let n = runs as f64;
    info!(
        heuristic = %template.heuristic,
        robots = template.green_robots,
        waste = template.green_waste,
        runs,
        wins,
        "batch finished"
    );
    Ok(BatchRow {
        heuristic: template.heuristic,
        runs,
        robots: template.green_robots,
        waste: template.green_waste,
        win_rate: wins as f64 / n,
        inconclusive,
        mean_ticks: ticks as f64 / n,
        mean_distance: distance as f64 / n,
        mean_delivered: delivered as f64 / n,
    })
}

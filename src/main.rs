use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use crossroads_sim::commands::{self, Command};
use crossroads_sim::generator::{self, GeneratorConfig};
use crossroads_sim::simulation::{IntersectionConfig, LeftTurnRule, PolicyKind, SimulationEngine};

#[derive(Parser)]
#[command(name = "crossroads_sim")]
#[command(about = "Traffic light scheduling simulation for a four-way intersection")]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Replay a command file and write the per-step departures
    Run {
        /// JSON command file
        input: PathBuf,

        /// Where to write the step statuses
        output: PathBuf,

        #[command(flatten)]
        settings: Settings,

        /// Print the intersection after every step
        #[arg(long)]
        trace: bool,

        /// Skip vehicles the engine rejects instead of failing the run
        #[arg(long)]
        lenient: bool,
    },

    /// Write a random command file
    Generate {
        output: PathBuf,

        /// Maximum number of vehicles to add
        #[arg(long, default_value = "20")]
        vehicles: usize,

        /// Number of steps
        #[arg(long, default_value = "30")]
        steps: usize,

        /// RNG seed for reproducible logs
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Chance of an arrival before each step, between 0 and 1
        #[arg(long, default_value = "0.8", value_parser = parse_probability)]
        arrival_probability: f64,
    },

    /// Run random traffic headless and print the intersection every tick
    Demo {
        /// Number of simulation ticks
        #[arg(long, default_value = "24")]
        ticks: usize,

        /// RNG seed for the generated traffic
        #[arg(long, default_value = "42")]
        seed: u64,

        #[command(flatten)]
        settings: Settings,
    },
}

/// Policy selection and timing overrides shared by `run` and `demo`
#[derive(Args)]
struct Settings {
    /// Scheduling policy: fixed, priority or paired
    #[arg(long, default_value = "fixed")]
    policy: PolicyKind,

    /// JSON file with an intersection configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// GREEN duration in ticks
    #[arg(long)]
    green: Option<u32>,

    /// YELLOW duration in ticks
    #[arg(long)]
    yellow: Option<u32>,

    /// RED_YELLOW duration in ticks
    #[arg(long)]
    red_yellow: Option<u32>,

    /// Queue length that lets a direction jump the rotation
    #[arg(long)]
    threshold: Option<usize>,

    /// Do not let vehicles cross on YELLOW
    #[arg(long)]
    no_yellow_crossing: bool,

    /// Left-turn gating under the paired policy: opposing or yellow
    #[arg(long)]
    left_turn_rule: Option<LeftTurnRule>,
}

impl Settings {
    fn intersection_config(&self) -> Result<IntersectionConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => IntersectionConfig::default(),
        };

        if let Some(green) = self.green {
            config.timings.green = green;
        }
        if let Some(yellow) = self.yellow {
            config.timings.yellow = yellow;
        }
        if let Some(red_yellow) = self.red_yellow {
            config.timings.red_yellow = red_yellow;
        }
        if let Some(threshold) = self.threshold {
            config.priority_threshold = threshold;
        }
        if self.no_yellow_crossing {
            config.yellow_crossing = false;
        }
        if let Some(rule) = self.left_turn_rule {
            config.left_turn = rule;
        }

        Ok(config)
    }

    fn engine(&self) -> Result<SimulationEngine> {
        let config = self.intersection_config()?;
        info!("Policy: {} | timings: {:?}", self.policy, config.timings);
        Ok(SimulationEngine::with_config(self.policy, config))
    }
}

fn parse_probability(value: &str) -> Result<f64, String> {
    let probability: f64 = value
        .parse()
        .map_err(|_| format!("{:?} is not a number", value))?;
    if probability.is_finite() && (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(format!("{} is not a probability between 0 and 1", value))
    }
}

fn load_config(path: &Path) -> Result<IntersectionConfig> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&input)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Mode::Run {
            input,
            output,
            settings,
            trace,
            lenient,
        } => run_file(&input, &output, &settings, trace, lenient),
        Mode::Generate {
            output,
            vehicles,
            steps,
            seed,
            arrival_probability,
        } => {
            let config = GeneratorConfig {
                vehicles,
                steps,
                seed,
                arrival_probability,
            };
            let commands = generator::generate_commands(&config);
            fs::write(&output, commands::render_commands(&commands)?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Wrote {} commands to {}", commands.len(), output.display());
            Ok(())
        }
        Mode::Demo {
            ticks,
            seed,
            settings,
        } => run_demo(ticks, seed, &settings),
    }
}

/// Replay a command file in console mode
fn run_file(input: &Path, output: &Path, settings: &Settings, trace: bool, lenient: bool) -> Result<()> {
    let commands = commands::load_commands(input)?;
    info!("Loaded {} commands from {}", commands.len(), input.display());

    let mut engine = settings.engine()?;
    if trace {
        engine.add_observer(|snapshot| println!("{}", snapshot.render()));
    }

    commands::run_commands(&mut engine, &commands, lenient)
        .with_context(|| format!("Failed to replay {}", input.display()))?;

    commands::write_step_reports(output, engine.step_reports())?;
    info!(
        "Wrote {} step statuses to {}",
        engine.step_reports().len(),
        output.display()
    );
    engine.stats().log_summary();
    Ok(())
}

/// Run the simulation in headless mode over generated traffic
fn run_demo(ticks: usize, seed: u64, settings: &Settings) -> Result<()> {
    println!("Running intersection simulation in headless mode...");
    println!("Ticks: {}, Seed: {}", ticks, seed);
    println!();

    let mut engine = settings.engine()?;
    engine.add_observer(|snapshot| {
        println!("{}", snapshot.render());
        println!();
    });

    let commands = generator::generate_commands(&GeneratorConfig {
        vehicles: ticks,
        steps: ticks,
        seed,
        ..GeneratorConfig::default()
    });
    let arrivals = commands
        .iter()
        .filter(|command| matches!(command, Command::AddVehicle { .. }))
        .count();
    info!("Generated {} arrivals over {} ticks", arrivals, ticks);

    commands::run_commands(&mut engine, &commands, false)?;

    println!("=== Final State ===");
    println!("{}", engine.stats());
    engine.stats().log_summary();
    Ok(())
}

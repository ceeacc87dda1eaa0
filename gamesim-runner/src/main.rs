mod reports;
mod seeds;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use gamesim_engine::{
    EventOutcome, RunObserver, RunStatus, Scheduler, SimConfig, Simulator, ThreadScheduler,
    VirtualClock,
};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use seeds::{expand_trials, resolve_seed_inputs, seed_tokens};

#[derive(Debug, Parser)]
#[command(name = "gamesim-runner", version = "0.1.0")]
#[command(about = "Run pitch strategy simulator trials and report scores")]
struct Args {
    /// JSON simulator config (player, speed_multiplier, fixed_side_order, continuous)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Trials per seed; extra trials use consecutive seeds
    #[arg(long, default_value_t = 1)]
    trials: usize,

    /// Override the player's passing skill (1-10)
    #[arg(long)]
    passing: Option<u8>,

    /// Override the player's control skill (1-10)
    #[arg(long)]
    control: Option<u8>,

    /// Override the player's dribbling skill (1-10)
    #[arg(long)]
    dribbling: Option<u8>,

    /// Override the speed multiplier (0.25-50)
    #[arg(long)]
    speed: Option<f64>,

    /// Run trials back to back with a short pause between them
    #[arg(long)]
    continuous: bool,

    /// Sleep through every wait instead of using a virtual clock
    #[arg(long)]
    realtime: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let start_time = Instant::now();
    let config = load_config(&args)?;
    let base_seeds = resolve_seed_inputs(&seed_tokens(&args.seeds))?;
    let seeds = expand_trials(&base_seeds, args.trials);

    if args.report == "console" {
        announce_banner(&config);
    }

    let simulator = run_trials(config, &seeds, args.realtime)?;
    write_reports(&args, &simulator, start_time)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn announce_banner(config: &SimConfig) {
    println!("{}", "⚽ Strategy Simulator Runner".bright_cyan().bold());
    println!("{}", "============================".cyan());
    println!(
        "Player {} | passing {} control {} dribbling {} | speed x{}",
        config.player.name.bold(),
        config.player.passing,
        config.player.control,
        config.player.dribbling,
        config.speed_multiplier
    );
}

fn read_config_file(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    SimConfig::from_json(&text).with_context(|| format!("invalid config in {}", path.display()))
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => read_config_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(passing) = args.passing {
        config.player.passing = passing;
    }
    if let Some(control) = args.control {
        config.player.control = control;
    }
    if let Some(dribbling) = args.dribbling {
        config.player.dribbling = dribbling;
    }
    if let Some(speed) = args.speed {
        config.speed_multiplier = speed;
    }
    if args.continuous {
        config.continuous = true;
    }
    config
        .validate()
        .context("invalid simulator configuration")?;
    Ok(config)
}

/// Logs each event and run as they finish.
struct LoggingObserver;

impl RunObserver for LoggingObserver {
    fn on_event_complete(&mut self, outcome: &EventOutcome) {
        debug!(
            "Event {:>2} | side {} ({}) | {}ms | errors {} | total {}ms{}",
            outcome.event_number,
            outcome.side_number,
            outcome.side_name,
            outcome.event_duration_ms,
            outcome.error_count,
            outcome.total_duration_ms,
            if outcome.exceeds_time_limit {
                " | over time limit"
            } else {
                ""
            }
        );
    }

    fn on_simulation_complete(&mut self, status: RunStatus) {
        info!("Run finished: {status:?}");
    }
}

fn execute<S: Scheduler>(
    simulator: &mut Simulator,
    seeds: &[u64],
    scheduler: &mut S,
) -> Result<()> {
    let mut observer = LoggingObserver;
    if simulator.config().continuous {
        let recorded = simulator.run_continuous(seeds.iter().copied(), scheduler, &mut observer)?;
        debug!("Continuous session recorded {recorded} trials");
    } else {
        for seed in seeds {
            simulator.run_trial(*seed, scheduler, &mut observer)?;
        }
    }
    Ok(())
}

fn run_trials(config: SimConfig, seeds: &[u64], realtime: bool) -> Result<Simulator> {
    let mut simulator = Simulator::new(config)?;
    if realtime {
        execute(&mut simulator, seeds, &mut ThreadScheduler)?;
    } else {
        execute(&mut simulator, seeds, &mut VirtualClock::new())?;
    }
    Ok(simulator)
}

fn write_reports(args: &Args, simulator: &Simulator, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::open(args.output.as_deref())?;
    let trials = simulator.trials();
    let stats = simulator.stats();

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, trials, &stats)?,
        "markdown" => {
            if trials.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Strategy Simulator Results\n\n_No trials recorded._"
                )?;
            } else {
                reports::generate_markdown_report(&mut output_target, trials, &stats)?;
            }
        }
        "csv" => reports::generate_csv_report(&mut output_target, &simulator.export_rows())?,
        _ => {
            if trials.is_empty() {
                writeln!(&mut output_target, "No trials recorded.")?;
            } else {
                reports::generate_console_report(
                    &mut output_target,
                    trials,
                    &stats,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush()?;
    Ok(())
}

/// Report destination: buffered stdout unless `--output` names a file.
enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn open(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout(BufWriter::new(stdout())));
        };
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        Ok(Self::File(BufWriter::new(file)))
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::File(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::File(out) => out.flush(),
        }
    }
}

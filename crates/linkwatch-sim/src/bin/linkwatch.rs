//! # linkwatch
//!
//! Replays the built-in link-quality scenarios through the health classifier
//! and prints per-second interface states, status transitions and an
//! end-of-run ranking.
//!
//! ## Usage
//!
//! ```bash
//! # Scenario B with both strategies (raw, then smoothed)
//! linkwatch run --scenario B
//!
//! # Every scenario, smoothed only, transitions and summary only
//! linkwatch run --scenario all --strategy smoothed --quiet
//!
//! # Custom thresholds, missing/late samples, seeded noise
//! linkwatch run --scenario A --config health.toml --imperfect --noise 5 --seed 7
//!
//! # Machine-readable reports
//! linkwatch run --scenario C --json
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use linkwatch_core::config::{HealthConfig, ScoreStrategy};
use linkwatch_sim::runner::{DEFAULT_RUN_SECS, RunOptions, RunReport, run_scenario};
use linkwatch_sim::scenario::{ImperfectDataConfig, NoiseConfig, ScenarioId};
use linkwatch_sim::table;

#[derive(Parser, Debug)]
#[command(
    name = "linkwatch",
    version,
    about = "Replay link-quality scenarios through the health classifier",
    after_help = "Diagnostics go to stderr, filtered by RUST_LOG (default: info)."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replays one scenario, or all of them, and prints the results.
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Scenario to replay.
    #[arg(short, long, value_enum, ignore_case = true)]
    scenario: ScenarioArg,

    /// Which active score drives the state machine.
    #[arg(long, value_enum, ignore_case = true, default_value_t = StrategyArg::Both)]
    strategy: StrategyArg,

    /// Ticks per run.
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_RUN_SECS,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    seconds: i64,

    /// TOML health config.
    #[arg(short, long, env = "LINKWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Drop and delay samples in every scenario.
    #[arg(long)]
    imperfect: bool,

    /// Multiplicative metric noise in percent.
    #[arg(long, value_parser = parse_noise_pct)]
    noise: Option<f64>,

    /// Noise seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Skip per-tick tables.
    #[arg(short, long)]
    quiet: bool,

    /// Print run reports as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ScenarioArg {
    A,
    B,
    C,
    D,
    All,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum StrategyArg {
    #[value(alias = "avg")]
    Raw,
    #[value(alias = "ewma")]
    Smoothed,
    Both,
}

fn parse_noise_pct(s: &str) -> Result<f64, String> {
    let pct: f64 = s.parse().map_err(|e| format!("invalid noise '{s}': {e}"))?;
    if !pct.is_finite() || pct < 0.0 {
        return Err(format!("must be a non-negative percentage, got {s}"));
    }
    Ok(pct)
}

impl RunArgs {
    fn scenarios(&self) -> Vec<ScenarioId> {
        match self.scenario {
            ScenarioArg::A => vec![ScenarioId::A],
            ScenarioArg::B => vec![ScenarioId::B],
            ScenarioArg::C => vec![ScenarioId::C],
            ScenarioArg::D => vec![ScenarioId::D],
            ScenarioArg::All => ScenarioId::ALL.to_vec(),
        }
    }

    fn strategies(&self) -> Vec<ScoreStrategy> {
        match self.strategy {
            StrategyArg::Raw => vec![ScoreStrategy::Raw],
            StrategyArg::Smoothed => vec![ScoreStrategy::Smoothed],
            StrategyArg::Both => vec![ScoreStrategy::Raw, ScoreStrategy::Smoothed],
        }
    }

    fn noise(&self) -> Option<NoiseConfig> {
        self.noise.map(|pct| NoiseConfig {
            pct,
            seed: self.seed,
        })
    }

    fn run_options(&self, scenario: ScenarioId) -> RunOptions {
        let mut opts = RunOptions::for_scenario(scenario);
        opts.seconds = self.seconds;
        if self.imperfect {
            opts.imperfect = ImperfectDataConfig::default();
        }
        opts.noise = self.noise();
        opts
    }
}

fn main() -> anyhow::Result<()> {
    // ── Parse CLI ───────────────────────────────────────────────
    let cli = Cli::parse();
    let Command::Run(args) = cli.command;

    // ── Logging ─────────────────────────────────────────────────
    // stdout carries the tables; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    // ── Config ──────────────────────────────────────────────────
    let config = match &args.config {
        Some(path) => HealthConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HealthConfig::default(),
    };
    for warning in config.lint() {
        tracing::warn!(field = warning.field, "{}", warning.message);
    }

    let scenarios = args.scenarios();
    let strategies = args.strategies();
    tracing::info!(
        ?scenarios,
        ?strategies,
        seconds = args.seconds,
        config = ?args.config,
        "linkwatch starting"
    );

    // ── Runs ────────────────────────────────────────────────────
    let mut reports = Vec::new();
    for &scenario in &scenarios {
        for &strategy in &strategies {
            let mut cfg = config.clone();
            cfg.score.strategy = strategy;
            let opts = args.run_options(scenario);
            reports.push(run_one(&cfg, &opts, &args));
        }
    }

    if args.json {
        let out = serde_json::to_string_pretty(&reports).context("serialising reports")?;
        println!("{out}");
    }
    Ok(())
}

fn run_one(cfg: &HealthConfig, opts: &RunOptions, args: &RunArgs) -> RunReport {
    let text = !args.json;
    if text {
        println!(
            "\n=== Scenario {} (strategy={}) ===",
            opts.scenario, cfg.score.strategy
        );
    }

    let report = run_scenario(cfg, opts, |tick| {
        if !text {
            return;
        }
        if !args.quiet {
            print!("{}", table::render_tick(tick.t, &tick.snapshots));
        }
        for ev in &tick.transitions {
            println!("{}", table::render_transition(ev));
        }
    });

    if text {
        print!("{}", table::render_summary(&report.ranked));
    }
    report
}

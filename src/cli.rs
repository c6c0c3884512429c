//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::bar::Bar;
use crate::domain::config::SimulationConfig;
use crate::domain::config_validation::validate_config;
use crate::domain::conflict::{ConflictAssessment, DataUnavailablePolicy};
use crate::domain::error::ReclaimerError;
use crate::domain::run::{SimulationResult, run_simulation};
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use std::collections::BTreeMap;

#[derive(Parser, Debug)]
#[command(name = "reclaimer", about = "Multi-timeframe reclamation strategy simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show available timeframes and data ranges for a symbol
    Info {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        symbol: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            data,
            symbol,
            output,
        } => run_simulate(&config, &data, &symbol, output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data, symbol } => run_info(&data, &symbol),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ReclaimerError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_simulate(
    config_path: &PathBuf,
    data_dir: &std::path::Path,
    symbol: &str,
    output_dir: Option<&std::path::Path>,
) -> ExitCode {
    // Stage 1: Load and build config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: Validate
    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Load bars for every required timeframe
    let data_port = CsvBarAdapter::new(data_dir.to_path_buf());
    let mut bars_by_timeframe: BTreeMap<Timeframe, Vec<Bar>> = BTreeMap::new();
    for timeframe in config.required_timeframes() {
        eprintln!("Loading {} {} bars...", symbol, timeframe);
        let bars = match data_port.fetch_bars(symbol, timeframe) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        eprintln!("  {} bars", bars.len());
        bars_by_timeframe.insert(timeframe, bars);
    }

    // Stage 4: Simulate
    eprintln!("Running simulation...");
    let result = match run_simulation(symbol, bars_by_timeframe, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Summarize, then write artifacts
    print_summary(&result, &config);

    if let Some(dir) = output_dir {
        let report = CsvReportAdapter::new();
        if let Err(e) = report.write(&result, dir) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Reports written to {}", dir.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Configuration OK");
    ExitCode::SUCCESS
}

fn run_info(data_dir: &std::path::Path, symbol: &str) -> ExitCode {
    let data_port = CsvBarAdapter::new(data_dir.to_path_buf());
    let timeframes = match data_port.list_timeframes(symbol) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if timeframes.is_empty() {
        eprintln!("No data files found for {}", symbol);
        return ExitCode::SUCCESS;
    }

    println!("{}:", symbol);
    for timeframe in timeframes {
        match data_port.data_range(symbol, timeframe) {
            Ok(Some((first, last, count))) => {
                println!("  {:>4}  {} .. {}  ({} bars)", timeframe.to_string(), first, last, count);
            }
            Ok(None) => println!("  {:>4}  (empty)", timeframe.to_string()),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }
    ExitCode::SUCCESS
}

fn print_summary(result: &SimulationResult, config: &SimulationConfig) {
    let m = &result.metrics;
    eprintln!();
    eprintln!("Trades:        {}", m.total_trades);
    eprintln!("Win rate:      {:.1}%", m.win_rate * 100.0);
    eprintln!("Profit factor: {:.2}", m.profit_factor);
    eprintln!("Max drawdown:  {:.2}%", m.max_drawdown_pct * 100.0);
    eprintln!(
        "Balance:       {:.2} -> {:.2}  ({:+.2}%)",
        config.initial_balance, m.final_balance, m.total_return_pct
    );
    for breakdown in &m.by_timeframe {
        eprintln!(
            "  {:>4}: {} trades, {:.1}% win, pnl {:+.2}",
            breakdown.timeframe.to_string(),
            breakdown.trades,
            breakdown.win_rate * 100.0,
            breakdown.total_pnl
        );
    }

    let d = &result.diagnostics;
    if d.total_skipped() > 0 || d.forced_closes > 0 || d.data_unavailable_conflicts > 0 {
        eprintln!();
        eprintln!(
            "warnings: {} signals skipped ({} missing data, {} below threshold, \
             {} blocked, {} no target, {} degenerate stop), {} forced closes, \
             {} unavailable reference lookups",
            d.total_skipped(),
            d.skipped_missing_data,
            d.skipped_below_threshold,
            d.skipped_blocked,
            d.skipped_no_target,
            d.skipped_degenerate_stop,
            d.forced_closes,
            d.data_unavailable_conflicts
        );
    }
}

fn parse_timeframe_key(
    section: &str,
    key: &str,
) -> Result<Timeframe, ReclaimerError> {
    Timeframe::parse(key).map_err(|_| ReclaimerError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: "unknown timeframe".into(),
    })
}

/// Assemble a [`SimulationConfig`] from the INI sections. Missing optional
/// keys fall back to the documented defaults; the hierarchy is required.
pub fn build_simulation_config(
    adapter: &dyn ConfigPort,
) -> Result<SimulationConfig, ReclaimerError> {
    let defaults = SimulationConfig::default();

    let hierarchy_str = adapter
        .get_string("simulation", "hierarchy")
        .ok_or_else(|| ReclaimerError::ConfigMissing {
            section: "simulation".into(),
            key: "hierarchy".into(),
        })?;
    let mut hierarchy = Vec::new();
    for part in hierarchy_str.split(',') {
        hierarchy.push(Timeframe::parse(part.trim())?);
    }

    let reference_timeframe = match adapter.get_string("simulation", "reference_timeframe") {
        Some(spelling) => Timeframe::parse(&spelling)?,
        None => *hierarchy.last().ok_or_else(|| ReclaimerError::ConfigInvalid {
            section: "simulation".into(),
            key: "hierarchy".into(),
            reason: "must not be empty".into(),
        })?,
    };

    let mut thresholds = std::collections::HashMap::new();
    for (key, value) in adapter.get_section("thresholds") {
        let timeframe = parse_timeframe_key("thresholds", &key)?;
        let threshold = value.parse().map_err(|_| ReclaimerError::ConfigInvalid {
            section: "thresholds".into(),
            key: key.clone(),
            reason: format!("not a number: {:?}", value),
        })?;
        thresholds.insert(timeframe, threshold);
    }

    let mut timeframe_weights = std::collections::HashMap::new();
    for (key, value) in adapter.get_section("weights") {
        let timeframe = parse_timeframe_key("weights", &key)?;
        let weight = value.parse().map_err(|_| ReclaimerError::ConfigInvalid {
            section: "weights".into(),
            key: key.clone(),
            reason: format!("not a number: {:?}", value),
        })?;
        timeframe_weights.insert(timeframe, weight);
    }

    let mut risk_multipliers = std::collections::HashMap::new();
    for (key, assessment) in [
        ("no_conflict", ConflictAssessment::NoConflict),
        ("direct_correction", ConflictAssessment::DirectCorrection),
        ("trap_setup", ConflictAssessment::TrapSetup),
        ("consolidation", ConflictAssessment::Consolidation),
    ] {
        if let Some(value) = adapter.get_string("risk", key) {
            let multiplier = value.parse().map_err(|_| ReclaimerError::ConfigInvalid {
                section: "risk".into(),
                key: key.into(),
                reason: format!("not a number: {:?}", value),
            })?;
            risk_multipliers.insert(assessment, multiplier);
        }
    }

    let data_unavailable_policy = match adapter
        .get_string("risk", "data_unavailable_policy")
        .as_deref()
    {
        None | Some("no_conflict") => DataUnavailablePolicy::TreatAsNoConflict,
        Some("block") => DataUnavailablePolicy::Block,
        Some(other) => {
            return Err(ReclaimerError::ConfigInvalid {
                section: "risk".into(),
                key: "data_unavailable_policy".into(),
                reason: format!("expected no_conflict or block, got {:?}", other),
            });
        }
    };

    let get_usize = |key: &str, default: usize| -> usize {
        adapter
            .get_int("simulation", key, default as i64)
            .max(0) as usize
    };

    Ok(SimulationConfig {
        initial_balance: adapter.get_double(
            "simulation",
            "initial_balance",
            defaults.initial_balance,
        ),
        base_risk_pct: adapter.get_double("risk", "base_risk_pct", defaults.base_risk_pct),
        hierarchy,
        reference_timeframe,
        thresholds,
        timeframe_weights,
        baseline_period: get_usize("baseline_period", defaults.baseline_period),
        confirmation_bars: get_usize("confirmation_bars", defaults.confirmation_bars),
        extension_lookback_bars: get_usize(
            "extension_lookback_bars",
            defaults.extension_lookback_bars,
        ),
        stop_lookback_bars: get_usize("stop_lookback_bars", defaults.stop_lookback_bars),
        stop_buffer_pct: adapter.get_double(
            "simulation",
            "stop_buffer_pct",
            defaults.stop_buffer_pct,
        ),
        breakeven_offset_pct: adapter.get_double(
            "simulation",
            "breakeven_offset_pct",
            defaults.breakeven_offset_pct,
        ),
        risk_multipliers,
        data_unavailable_policy,
    })
}

//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::trade_log_adapter::CsvTradeLogAdapter;
use crate::domain::config_validation::{
    rule_sections, validate_market_config, validate_rules_config, validate_simulation_config,
    MARKET_SECTION, SIMULATION_SECTION,
};
use crate::domain::error::BotsimError;
use crate::domain::indicator::{IndicatorField, IndicatorKind, IndicatorSnapshot};
use crate::domain::price_series::PriceSeries;
use crate::domain::rule::{Action, Operator, Rule};
use crate::domain::simulation::{
    run_on_series, run_simulation_with, total_bars, SimulationConfig, SimulationResult,
};
use crate::domain::synthetic::{
    derive_seed, generate_prices, parse_clusters, MarketModel, SeedInput,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DURATION_DAYS: i64 = 30;
pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;

#[derive(Parser, Debug)]
#[command(name = "botsim", about = "Rule-driven trading bot simulator")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [simulation] seed
        #[arg(long)]
        seed: Option<String>,
        /// Override [simulation] duration_days
        #[arg(long)]
        days: Option<u32>,
        /// Write the full result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the trade log as CSV
        #[arg(long)]
        trades: Option<PathBuf>,
    },
    /// Validate a configuration without running it
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print indicator readings at the last bar of the configured prices
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long)]
        days: Option<u32>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);
    match cli.command {
        Command::Simulate {
            config,
            seed,
            days,
            output,
            trades,
        } => run_simulate(
            &config,
            seed.as_deref(),
            days,
            output.as_deref(),
            trades.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Indicators { config, seed, days } => {
            run_indicators(&config, seed.as_deref(), days)
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("botsim={}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: BotsimError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn build_market_model(adapter: &dyn ConfigPort) -> Result<MarketModel, BotsimError> {
    let defaults = MarketModel::default();
    let clusters = match adapter.get_string(MARKET_SECTION, "clusters") {
        Some(text) => parse_clusters(&text).map_err(|reason| BotsimError::ConfigInvalid {
            section: MARKET_SECTION.into(),
            key: "clusters".into(),
            reason,
        })?,
        None => defaults.clusters,
    };
    Ok(MarketModel {
        base_price: adapter.get_double(MARKET_SECTION, "base_price", defaults.base_price),
        trend_per_bar: adapter.get_double(MARKET_SECTION, "trend_per_bar", defaults.trend_per_bar),
        sine_amplitude: adapter.get_double(MARKET_SECTION, "sine_amplitude", defaults.sine_amplitude),
        sine_frequency: adapter.get_double(MARKET_SECTION, "sine_frequency", defaults.sine_frequency),
        base_volatility: adapter.get_double(
            MARKET_SECTION,
            "base_volatility",
            defaults.base_volatility,
        ),
        cluster_volatility: adapter.get_double(
            MARKET_SECTION,
            "cluster_volatility",
            defaults.cluster_volatility,
        ),
        clusters,
        wick_factor: adapter.get_double(MARKET_SECTION, "wick_factor", defaults.wick_factor),
    })
}

fn non_negative(adapter: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, BotsimError> {
    let value = adapter.get_int(SIMULATION_SECTION, key, default as i64);
    usize::try_from(value).map_err(|_| BotsimError::ConfigInvalid {
        section: SIMULATION_SECTION.into(),
        key: key.into(),
        reason: format!("{} must be non-negative", key),
    })
}

pub fn build_simulation_config(adapter: &dyn ConfigPort) -> Result<SimulationConfig, BotsimError> {
    let defaults = SimulationConfig::default();
    Ok(SimulationConfig {
        bars_per_day: non_negative(adapter, "bars_per_day", defaults.bars_per_day)?,
        warmup_bars: non_negative(adapter, "warmup_bars", defaults.warmup_bars)?,
        position_size: adapter.get_double(SIMULATION_SECTION, "position_size", defaults.position_size),
        max_reasons: non_negative(adapter, "max_reasons", defaults.max_reasons)?,
        market: build_market_model(adapter)?,
    })
}

pub fn build_rule(adapter: &dyn ConfigPort, section: &str, position: usize) -> Result<Rule, BotsimError> {
    let required = |key: &str| {
        adapter
            .get_string(section, key)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| BotsimError::RuleInvalid {
                section: section.to_string(),
                reason: format!("missing {}", key),
            })
    };

    let indicator = IndicatorKind::parse(&required("indicator")?);
    let operator = Operator::parse(&required("operator")?);
    let action = Action::parse(&required("action")?);

    let default_order = i64::try_from(position + 1).unwrap_or(i64::MAX);
    let order = i32::try_from(adapter.get_int(section, "order", default_order)).map_err(|_| {
        BotsimError::RuleInvalid {
            section: section.to_string(),
            reason: "order out of range".into(),
        }
    })?;

    let period = adapter.get_int(section, "period", indicator.default_period() as i64);
    let period = usize::try_from(period)
        .ok()
        .filter(|&p| p > 0)
        .ok_or_else(|| BotsimError::RuleInvalid {
            section: section.to_string(),
            reason: format!("period {} must be positive", period),
        })?;

    let field = adapter
        .get_string(section, "field")
        .map_or(IndicatorField::Value, |name| IndicatorField::parse(&name));

    let mut rule = Rule::new(
        order,
        indicator,
        operator,
        adapter.get_double(section, "threshold", 0.0),
        action,
    )
    .with_period(period)
    .with_field(field);
    rule.enabled = adapter.get_bool(section, "enabled", true);
    Ok(rule)
}

/// All `[rule.<name>]` sections, in file order.
pub fn build_rules(adapter: &dyn ConfigPort) -> Result<Vec<Rule>, BotsimError> {
    rule_sections(adapter)
        .iter()
        .enumerate()
        .map(|(i, section)| build_rule(adapter, section, i))
        .collect()
}

/// `--seed` first, then `[simulation] seed`.
pub fn resolve_seed(adapter: &dyn ConfigPort, cli_seed: Option<&str>) -> Result<SeedInput, BotsimError> {
    cli_seed
        .map(str::to_string)
        .or_else(|| adapter.get_string(SIMULATION_SECTION, "seed"))
        .map(SeedInput::from)
        .ok_or_else(|| BotsimError::ConfigMissing {
            section: SIMULATION_SECTION.into(),
            key: "seed".into(),
        })
}

pub fn resolve_days(adapter: &dyn ConfigPort, cli_days: Option<u32>) -> Result<u32, BotsimError> {
    if let Some(days) = cli_days {
        return Ok(days);
    }
    let days = adapter.get_int(SIMULATION_SECTION, "duration_days", DEFAULT_DURATION_DAYS);
    u32::try_from(days).map_err(|_| BotsimError::ConfigInvalid {
        section: SIMULATION_SECTION.into(),
        key: "duration_days".into(),
        reason: format!("{} is out of range", days),
    })
}

/// Recorded prices named by `[simulation] price_file`, resolved relative to
/// the config file's directory.
pub fn load_recorded_prices(
    adapter: &dyn ConfigPort,
    config_path: &Path,
) -> Result<Option<PriceSeries>, BotsimError> {
    let Some(file) = adapter.get_string(SIMULATION_SECTION, "price_file") else {
        return Ok(None);
    };
    let base = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    CsvAdapter::new(base).load_prices(file.trim()).map(Some)
}

fn validate_all(adapter: &dyn ConfigPort) -> Result<(), BotsimError> {
    validate_simulation_config(adapter)?;
    validate_market_config(adapter)?;
    validate_rules_config(adapter)?;
    Ok(())
}

fn simulate(
    adapter: &dyn ConfigPort,
    config_path: &Path,
    cli_seed: Option<&str>,
    cli_days: Option<u32>,
) -> Result<SimulationResult, BotsimError> {
    validate_all(adapter)?;
    let config = build_simulation_config(adapter)?;
    let rules = build_rules(adapter)?;
    let balance = adapter.get_double(SIMULATION_SECTION, "initial_balance", DEFAULT_INITIAL_BALANCE);

    match load_recorded_prices(adapter, config_path)? {
        Some(prices) => {
            info!(bars = prices.len(), "using recorded prices");
            run_on_series(&rules, &prices, balance, &config)
        }
        None => {
            let seed = resolve_seed(adapter, cli_seed)?;
            let days = resolve_days(adapter, cli_days)?;
            run_simulation_with(&rules, days, balance, &seed, &config)
        }
    }
}

fn run_simulate(
    config_path: &Path,
    cli_seed: Option<&str>,
    cli_days: Option<u32>,
    output: Option<&Path>,
    trades: Option<&Path>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = match simulate(&adapter, config_path, cli_seed, cli_days) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    print_summary(&result);

    if let Some(path) = output {
        if let Err(e) = JsonReportAdapter.write(&result, path) {
            return fail(e);
        }
        eprintln!("\nResult written to: {}", path.display());
    }
    if let Some(path) = trades {
        if let Err(e) = CsvTradeLogAdapter.write(&result, path) {
            return fail(e);
        }
        eprintln!("Trade log written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

pub fn print_summary(result: &SimulationResult) {
    eprintln!("\n=== Simulation Results ===");
    if let Some(seed) = result.seed {
        eprintln!("Seed:             {}", seed);
    }
    eprintln!("Market:           {}", result.market_model);
    eprintln!(
        "Bars:             {} ({} warm-up, {} evaluated)",
        result.bars_simulated, result.warmup_bars, result.bars_evaluated
    );
    eprintln!("Initial Balance:  {:.2}", result.initial_balance);
    eprintln!("Final Balance:    {:.2}", result.final_balance);
    eprintln!("Net Profit:       {:.2}", result.net_profit);
    eprintln!("Total Trades:     {}", result.total_trades);
    eprintln!("Win Rate:         {:.1}%", result.stats.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", result.stats.profit_factor);
    eprintln!("Avg Bars Held:    {:.1}", result.stats.avg_bars_held);
    eprintln!("Final RSI(14):    {}", fmt_opt(result.final_rsi));
    eprintln!("Final SMA(20):    {}", fmt_opt(result.final_sma));
    if let Some(pos) = &result.open_position {
        eprintln!(
            "Open Position:    {} from bar {} @ {:.2}",
            pos.side, pos.entry_bar, pos.entry_price
        );
    }

    if !result.trigger_reasons.is_empty() {
        eprintln!("\n=== Recent Triggers ===");
        for reason in &result.trigger_reasons {
            eprintln!("  {}", reason);
        }
    }
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        return fail(e);
    }
    let rules = match build_rules(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    let mut sorted: Vec<&Rule> = rules.iter().collect();
    sorted.sort_by_key(|r| r.order);

    eprintln!("\nRules (evaluation order):");
    for rule in &sorted {
        let mut notes = Vec::new();
        if !rule.enabled {
            notes.push("disabled".to_string());
        }
        if !rule.is_recognized() {
            notes.push("unrecognized, never matches".to_string());
        }
        let suffix = if notes.is_empty() {
            String::new()
        } else {
            format!("  [{}]", notes.join(", "))
        };
        eprintln!(
            "  #{:<3} {} -> {}{}",
            rule.order, rule, rule.action, suffix
        );
    }

    if !rules.iter().any(|r| r.enabled) {
        return fail(BotsimError::NoRules);
    }

    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}

fn indicator_prices(
    adapter: &dyn ConfigPort,
    config_path: &Path,
    cli_seed: Option<&str>,
    cli_days: Option<u32>,
) -> Result<PriceSeries, BotsimError> {
    if let Some(prices) = load_recorded_prices(adapter, config_path)? {
        return Ok(prices);
    }
    let config = build_simulation_config(adapter)?;
    let seed = resolve_seed(adapter, cli_seed)?;
    let days = resolve_days(adapter, cli_days)?;
    let bars = total_bars(days, config.bars_per_day)?;
    Ok(generate_prices(&config.market, bars, derive_seed(&seed, days)))
}

pub fn run_indicators(config_path: &Path, cli_seed: Option<&str>, cli_days: Option<u32>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_simulation_config(&adapter).and_then(|_| validate_market_config(&adapter)) {
        return fail(e);
    }
    let prices = match indicator_prices(&adapter, config_path, cli_seed, cli_days) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let snap = IndicatorSnapshot::compute(&prices);
    eprintln!("Bars: {}", prices.len());
    eprintln!("Last close:       {}", fmt_opt(prices.close().last().copied()));
    eprintln!("RSI(14):          {}", fmt_opt(snap.rsi_14));
    eprintln!("SMA(20):          {}", fmt_opt(snap.sma_20));
    eprintln!("SMA(50):          {}", fmt_opt(snap.sma_50));
    eprintln!("EMA(12):          {}", fmt_opt(snap.ema_12));
    eprintln!("EMA(26):          {}", fmt_opt(snap.ema_26));
    eprintln!("ATR(14):          {}", fmt_opt(snap.atr_14));
    match snap.macd {
        Some(m) => eprintln!(
            "MACD(12,26,9):    line {:.4}  signal {:.4}  hist {:.4}",
            m.macd_line, m.signal_line, m.histogram
        ),
        None => eprintln!("MACD(12,26,9):    n/a"),
    }
    match snap.bollinger {
        Some(b) => eprintln!(
            "Bollinger(20,2):  upper {:.2}  middle {:.2}  lower {:.2}",
            b.upper, b.middle, b.lower
        ),
        None => eprintln!("Bollinger(20,2):  n/a"),
    }
    match snap.stochastic {
        Some(s) => eprintln!("Stochastic(14,3): %K {:.2}  %D {:.2}", s.k, s.d),
        None => eprintln!("Stochastic(14,3): n/a"),
    }
    ExitCode::SUCCESS
}

//! Bar-by-bar rule simulation.
//!
//! The engine walks a price series after a warm-up window, evaluates the
//! enabled rules in ascending `order` at every bar, and applies the action of
//! the first rule that matches to a single-position state machine:
//!
//! - Flat + Buy opens a long, Flat + Sell opens a short (entry at the close)
//! - Open + ClosePosition closes at the close and books `pnl` into the balance
//! - Any other combination leaves the position alone
//!
//! A position still open at the last bar is reported but not closed.

use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::domain::cache::IndicatorCache;
use crate::domain::config_validation::SIMULATION_SECTION;
use crate::domain::error::BotsimError;
use crate::domain::indicator::{
    IndicatorKind, IndicatorSnapshot, DEFAULT_MA_PERIOD, DEFAULT_RSI_PERIOD,
};
use crate::domain::position::{Position, PositionTracker, Side, Trade};
use crate::domain::price_series::PriceSeries;
use crate::domain::rule::{Action, Rule};
use crate::domain::rule_eval::{evaluate_rule, rule_value};
use crate::domain::stats::TradeStats;
use crate::domain::synthetic::{derive_seed, generate_prices, MarketModel, SeedInput};

pub const DEFAULT_BARS_PER_DAY: usize = 96;
pub const DEFAULT_WARMUP_BARS: usize = 50;
pub const DEFAULT_POSITION_SIZE: f64 = 10.0;
pub const DEFAULT_MAX_REASONS: usize = 20;
/// Upper bound on the length of a generated price series.
pub const MAX_SIMULATED_BARS: usize = 10_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub bars_per_day: usize,
    /// Minimum warm-up; raised to the longest rule lookback.
    pub warmup_bars: usize,
    /// Units per position.
    pub position_size: f64,
    /// Most recent trigger reasons kept in the result.
    pub max_reasons: usize,
    pub market: MarketModel,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bars_per_day: DEFAULT_BARS_PER_DAY,
            warmup_bars: DEFAULT_WARMUP_BARS,
            position_size: DEFAULT_POSITION_SIZE,
            max_reasons: DEFAULT_MAX_REASONS,
            market: MarketModel::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// Generator seed; absent for caller-supplied price series.
    pub seed: Option<u64>,
    pub market_model: String,
    pub bars_simulated: usize,
    pub bars_evaluated: usize,
    pub warmup_bars: usize,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub net_profit: f64,
    pub total_trades: usize,
    pub trade_log: Vec<Trade>,
    pub trigger_reasons: Vec<String>,
    pub open_position: Option<Position>,
    pub stats: TradeStats,
    pub final_rsi: Option<f64>,
    pub final_sma: Option<f64>,
    pub final_indicators: IndicatorSnapshot,
}

/// Length of a synthetic run, rejecting products that overflow or exceed
/// [`MAX_SIMULATED_BARS`].
pub fn total_bars(duration_days: u32, bars_per_day: usize) -> Result<usize, BotsimError> {
    (duration_days as usize)
        .checked_mul(bars_per_day)
        .filter(|&bars| bars <= MAX_SIMULATED_BARS)
        .ok_or_else(|| BotsimError::ConfigInvalid {
            section: SIMULATION_SECTION.into(),
            key: "bars_per_day".into(),
            reason: format!(
                "{} days of {} bars exceeds {} bars",
                duration_days, bars_per_day, MAX_SIMULATED_BARS
            ),
        })
}

/// Simulate `rules` over a synthetic market seeded from
/// `(seed_input, duration_days)` with default settings.
pub fn run_simulation(
    rules: &[Rule],
    duration_days: u32,
    initial_balance: f64,
    seed_input: &SeedInput,
) -> Result<SimulationResult, BotsimError> {
    run_simulation_with(
        rules,
        duration_days,
        initial_balance,
        seed_input,
        &SimulationConfig::default(),
    )
}

pub fn run_simulation_with(
    rules: &[Rule],
    duration_days: u32,
    initial_balance: f64,
    seed_input: &SeedInput,
    config: &SimulationConfig,
) -> Result<SimulationResult, BotsimError> {
    if active_rules(rules).is_empty() {
        return Err(BotsimError::NoRules);
    }

    let seed = derive_seed(seed_input, duration_days);
    let bars = total_bars(duration_days, config.bars_per_day)?;
    debug!(%seed_input, seed, bars, "generating synthetic prices");
    let prices = generate_prices(&config.market, bars, seed);

    let mut result = run_on_series(rules, &prices, initial_balance, config)?;
    result.seed = Some(seed);
    result.market_model = config.market.label();
    Ok(result)
}

/// Simulate `rules` over a caller-supplied price series.
pub fn run_on_series(
    rules: &[Rule],
    prices: &PriceSeries,
    initial_balance: f64,
    config: &SimulationConfig,
) -> Result<SimulationResult, BotsimError> {
    let active = active_rules(rules);
    if active.is_empty() {
        return Err(BotsimError::NoRules);
    }
    for rule in active.iter().filter(|r| !r.is_recognized()) {
        warn!(
            order = rule.order,
            rule = %rule,
            action = %rule.action,
            "rule has unrecognized vocabulary and will never match"
        );
    }

    let warmup = active
        .iter()
        .map(|r| r.lookback())
        .fold(config.warmup_bars, usize::max);

    let mut cache = IndicatorCache::new(prices);
    let mut tracker = PositionTracker::new(config.position_size);
    let mut balance = initial_balance;
    let mut reasons: VecDeque<String> = VecDeque::with_capacity(config.max_reasons);

    for (bar, &price) in prices.close().iter().enumerate().skip(warmup) {
        let Some(rule) = active
            .iter()
            .copied()
            .find(|rule| evaluate_rule(rule, &mut cache, bar))
        else {
            continue;
        };

        let actual = rule_value(rule, &mut cache, bar).unwrap_or(price);
        let trigger = format!(
            "Rule #{} matched: {} (actual: {:.2})",
            rule.order, rule, actual
        );

        match &rule.action {
            Action::Buy | Action::Sell => {
                let side = if rule.action == Action::Buy {
                    Side::Long
                } else {
                    Side::Short
                };
                if tracker.open(side, bar, price) {
                    debug!(bar, %side, price, order = rule.order, "position opened");
                    let verb = if side == Side::Long { "BUY" } else { "SELL" };
                    push_reason(
                        &mut reasons,
                        config.max_reasons,
                        format!("Bar {}: {} @ {:.2} | {}", bar, verb, price, trigger),
                    );
                }
            }
            Action::ClosePosition => {
                if let Some(trade) = tracker.close(bar, price) {
                    balance += trade.pnl;
                    debug!(bar, side = %trade.side, price, pnl = trade.pnl, "position closed");
                    let reason = format!(
                        "Bar {}: CLOSE {} PnL: {:.2} | {}",
                        bar, trade.side, trade.pnl, trigger
                    );
                    push_reason(&mut reasons, config.max_reasons, reason);
                }
            }
            Action::Wait | Action::Unrecognized(_) => {}
        }
    }

    let last_bar = prices.len().saturating_sub(1);
    let final_rsi = cache.value_at_bar(&IndicatorKind::Rsi, last_bar, DEFAULT_RSI_PERIOD);
    let final_sma = cache.value_at_bar(&IndicatorKind::Sma, last_bar, DEFAULT_MA_PERIOD);

    let (open_position, trade_log) = tracker.into_parts();
    let stats = TradeStats::compute(&trade_log);
    let net_profit = balance - initial_balance;

    info!(
        bars = prices.len(),
        warmup,
        trades = trade_log.len(),
        net_profit,
        open = open_position.is_some(),
        indicator_series = cache.computed(),
        "simulation complete"
    );

    Ok(SimulationResult {
        seed: None,
        market_model: "supplied series".to_string(),
        bars_simulated: prices.len(),
        bars_evaluated: prices.len().saturating_sub(warmup),
        warmup_bars: warmup,
        initial_balance,
        final_balance: balance,
        net_profit,
        total_trades: trade_log.len(),
        trade_log,
        trigger_reasons: reasons.into_iter().collect(),
        open_position,
        stats,
        final_rsi,
        final_sma,
        final_indicators: IndicatorSnapshot::compute(prices),
    })
}

/// Enabled rules in ascending `order`; ties keep their input order.
fn active_rules(rules: &[Rule]) -> Vec<&Rule> {
    let mut active: Vec<&Rule> = rules.iter().filter(|r| r.enabled).collect();
    active.sort_by_key(|r| r.order);
    active
}

fn push_reason(reasons: &mut VecDeque<String>, max: usize, reason: String) {
    if max == 0 {
        return;
    }
    while reasons.len() >= max {
        reasons.pop_front();
    }
    reasons.push_back(reason);
}

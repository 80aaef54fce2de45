//! Configuration validation.
//!
//! Checks numeric ranges and required keys before a simulation runs. Rule
//! vocabulary (indicator, field, operator, action names) is not checked here:
//! unknown names are accepted and simply never match.

use std::str::FromStr;

use crate::domain::error::BotsimError;
use crate::domain::simulation::total_bars;
use crate::domain::synthetic::parse_clusters;
use crate::ports::config_port::ConfigPort;

pub const SIMULATION_SECTION: &str = "simulation";
pub const MARKET_SECTION: &str = "market";
pub const RULE_SECTION_PREFIX: &str = "rule.";

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), BotsimError> {
    for key in ["duration_days", "bars_per_day", "warmup_bars", "max_reasons"] {
        validate_syntax::<i64>(config, SIMULATION_SECTION, key, "an integer")?;
    }
    for key in ["initial_balance", "position_size"] {
        validate_syntax::<f64>(config, SIMULATION_SECTION, key, "a number")?;
    }

    validate_positive_int(config, SIMULATION_SECTION, "duration_days", 30)?;
    validate_positive_int(config, SIMULATION_SECTION, "bars_per_day", 96)?;
    validate_non_negative_int(config, SIMULATION_SECTION, "warmup_bars")?;
    validate_non_negative_int(config, SIMULATION_SECTION, "max_reasons")?;
    validate_positive_double(config, SIMULATION_SECTION, "position_size", 10.0)?;

    let days = config.get_int(SIMULATION_SECTION, "duration_days", 30);
    let days = u32::try_from(days).map_err(|_| {
        invalid(
            SIMULATION_SECTION,
            "duration_days",
            &format!("duration_days {} is out of range", days),
        )
    })?;
    let per_day = config.get_int(SIMULATION_SECTION, "bars_per_day", 96);
    let per_day = usize::try_from(per_day).map_err(|_| {
        invalid(
            SIMULATION_SECTION,
            "bars_per_day",
            &format!("bars_per_day {} is out of range", per_day),
        )
    })?;
    total_bars(days, per_day)?;

    let balance = config.get_double(SIMULATION_SECTION, "initial_balance", 10_000.0);
    if !balance.is_finite() || balance < 0.0 {
        return Err(invalid(
            SIMULATION_SECTION,
            "initial_balance",
            "initial_balance must be non-negative",
        ));
    }
    Ok(())
}

pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), BotsimError> {
    for key in [
        "base_price",
        "trend_per_bar",
        "sine_amplitude",
        "sine_frequency",
        "base_volatility",
        "cluster_volatility",
        "wick_factor",
    ] {
        validate_syntax::<f64>(config, MARKET_SECTION, key, "a number")?;
    }
    validate_positive_double(config, MARKET_SECTION, "base_price", 2000.0)?;
    for key in ["base_volatility", "cluster_volatility", "wick_factor"] {
        let value = config.get_double(MARKET_SECTION, key, 0.0);
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(
                MARKET_SECTION,
                key,
                &format!("{} must be non-negative", key),
            ));
        }
    }
    if let Some(clusters) = config.get_string(MARKET_SECTION, "clusters") {
        parse_clusters(&clusters).map_err(|reason| invalid(MARKET_SECTION, "clusters", &reason))?;
    }
    Ok(())
}

/// Names of all `[rule.<name>]` sections.
pub fn rule_sections(config: &dyn ConfigPort) -> Vec<String> {
    config
        .sections()
        .into_iter()
        .filter(|s| s.starts_with(RULE_SECTION_PREFIX))
        .collect()
}

pub fn validate_rules_config(config: &dyn ConfigPort) -> Result<(), BotsimError> {
    let sections = rule_sections(config);
    if sections.is_empty() {
        return Err(BotsimError::NoRules);
    }
    for section in &sections {
        validate_rule_section(config, section)?;
    }
    Ok(())
}

fn validate_rule_section(config: &dyn ConfigPort, section: &str) -> Result<(), BotsimError> {
    for key in ["indicator", "operator", "action"] {
        match config.get_string(section, key) {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(BotsimError::RuleInvalid {
                    section: section.to_string(),
                    reason: format!("missing {}", key),
                })
            }
        }
    }

    if let Some(threshold) = config.get_string(section, "threshold") {
        if threshold.trim().parse::<f64>().is_err() {
            return Err(BotsimError::RuleInvalid {
                section: section.to_string(),
                reason: format!("threshold '{}' is not a number", threshold.trim()),
            });
        }
    }

    if let Some(period) = config.get_string(section, "period") {
        match period.trim().parse::<usize>() {
            Ok(p) if p > 0 => {}
            _ => {
                return Err(BotsimError::RuleInvalid {
                    section: section.to_string(),
                    reason: format!("period '{}' must be a positive integer", period.trim()),
                })
            }
        }
    }

    if let Some(order) = config.get_string(section, "order") {
        if order.trim().parse::<i32>().is_err() {
            return Err(BotsimError::RuleInvalid {
                section: section.to_string(),
                reason: format!("order '{}' is not an integer", order.trim()),
            });
        }
    }

    Ok(())
}

fn validate_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<(), BotsimError> {
    if config.get_int(section, key, default) < 1 {
        return Err(invalid(section, key, &format!("{} must be at least 1", key)));
    }
    Ok(())
}

fn validate_non_negative_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), BotsimError> {
    if config.get_int(section, key, 0) < 0 {
        return Err(invalid(section, key, &format!("{} must be non-negative", key)));
    }
    Ok(())
}

fn validate_positive_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), BotsimError> {
    let value = config.get_double(section, key, default);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(section, key, &format!("{} must be positive", key)));
    }
    Ok(())
}

/// A present value must parse as `T`; typed getters would otherwise fall
/// back to their default silently.
fn validate_syntax<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    expected: &str,
) -> Result<(), BotsimError> {
    match config.get_string(section, key) {
        Some(raw) if raw.trim().parse::<T>().is_err() => Err(invalid(
            section,
            key,
            &format!("{} '{}' is not {}", key, raw.trim(), expected),
        )),
        _ => Ok(()),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> BotsimError {
    BotsimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

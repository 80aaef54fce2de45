//! Rule evaluation against the indicator cache.
//!
//! # Evaluation Semantics
//!
//! - Comparison operators: evaluate the reading at the given bar
//! - `EQUALS`: within `EQUALS_TOLERANCE` of the threshold
//! - `CROSSES_ABOVE`/`CROSSES_BELOW`: need the reading at `bar - 1` too; `false` at bar 0
//! - Absent readings never match
//! - Unrecognized operators, indicators, fields and actions never match

use crate::domain::cache::IndicatorCache;
use crate::domain::crosses::{crosses_above, crosses_below};
use crate::domain::rule::{Action, Operator, Rule};

pub const EQUALS_TOLERANCE: f64 = 0.01;

/// Reading of the rule's indicator at `bar`, if defined.
pub fn rule_value(rule: &Rule, cache: &mut IndicatorCache, bar: usize) -> Option<f64> {
    cache.field_at_bar(&rule.indicator, &rule.field, bar, rule.period)
}

pub fn evaluate_rule(rule: &Rule, cache: &mut IndicatorCache, bar: usize) -> bool {
    if matches!(rule.action, Action::Unrecognized(_)) {
        return false;
    }
    let Some(current) = rule_value(rule, cache, bar) else {
        return false;
    };
    let threshold = rule.threshold;

    match &rule.operator {
        Operator::GreaterThan => current > threshold,
        Operator::LessThan => current < threshold,
        Operator::GreaterEqual => current >= threshold,
        Operator::LessEqual => current <= threshold,
        Operator::Equals => (current - threshold).abs() < EQUALS_TOLERANCE,
        Operator::CrossesAbove => previous_value(rule, cache, bar)
            .is_some_and(|previous| crosses_above(current, previous, threshold)),
        Operator::CrossesBelow => previous_value(rule, cache, bar)
            .is_some_and(|previous| crosses_below(current, previous, threshold)),
        Operator::Unrecognized(_) => false,
    }
}

fn previous_value(rule: &Rule, cache: &mut IndicatorCache, bar: usize) -> Option<f64> {
    rule_value(rule, cache, bar.checked_sub(1)?)
}

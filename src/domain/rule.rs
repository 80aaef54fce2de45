//! Trading rule model.
//!
//! A rule pairs one indicator reading with a comparison against a constant
//! threshold and names the action to take when the comparison holds:
//! - `Operator`: how the reading is compared (including crosses)
//! - `Action`: what the engine does on a match
//! - `Rule`: the full record, ordered by `order` within a rule set
//!
//! Vocabulary arriving from configuration that is not recognized is kept
//! verbatim in an `Unrecognized` case; such rules never match.

use std::fmt;

use crate::domain::indicator::{IndicatorField, IndicatorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    GreaterThan,
    LessThan,
    Equals,
    GreaterEqual,
    LessEqual,
    CrossesAbove,
    CrossesBelow,
    Unrecognized(String),
}

impl Operator {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "greater_than" | ">" => Operator::GreaterThan,
            "less_than" | "<" => Operator::LessThan,
            "equals" | "==" | "=" => Operator::Equals,
            "greater_equal" | ">=" => Operator::GreaterEqual,
            "less_equal" | "<=" => Operator::LessEqual,
            "crosses_above" => Operator::CrossesAbove,
            "crosses_below" => Operator::CrossesBelow,
            _ => Operator::Unrecognized(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Equals => "equals",
            Operator::GreaterEqual => "greater_equal",
            Operator::LessEqual => "less_equal",
            Operator::CrossesAbove => "crosses_above",
            Operator::CrossesBelow => "crosses_below",
            Operator::Unrecognized(name) => name,
        }
    }

    pub fn is_cross(&self) -> bool {
        matches!(self, Operator::CrossesAbove | Operator::CrossesBelow)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    ClosePosition,
    /// Matches and stops the scan without touching the position.
    Wait,
    Unrecognized(String),
}

impl Action {
    pub fn parse(name: &str) -> Self {
        let normalized: String = name
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect();
        match normalized.as_str() {
            "buy" => Action::Buy,
            "sell" => Action::Sell,
            "closeposition" | "close" => Action::ClosePosition,
            "wait" | "none" => Action::Wait,
            _ => Action::Unrecognized(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Buy => "Buy",
            Action::Sell => "Sell",
            Action::ClosePosition => "Close Position",
            Action::Wait => "Wait",
            Action::Unrecognized(name) => name,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub order: i32,
    pub indicator: IndicatorKind,
    /// Ignored for `Price` and `Macd`.
    pub period: usize,
    pub field: IndicatorField,
    pub operator: Operator,
    pub threshold: f64,
    pub action: Action,
    pub enabled: bool,
}

impl Rule {
    /// Enabled rule reading the primary output at the indicator's default period.
    pub fn new(
        order: i32,
        indicator: IndicatorKind,
        operator: Operator,
        threshold: f64,
        action: Action,
    ) -> Self {
        let period = indicator.default_period();
        Self {
            order,
            indicator,
            period,
            field: IndicatorField::Value,
            operator,
            threshold,
            action,
            enabled: true,
        }
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_field(mut self, field: IndicatorField) -> Self {
        self.field = field;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// False when any part of the rule's vocabulary was not understood.
    pub fn is_recognized(&self) -> bool {
        !matches!(self.indicator, IndicatorKind::Unrecognized(_))
            && !matches!(self.operator, Operator::Unrecognized(_))
            && !matches!(self.action, Action::Unrecognized(_))
            && !matches!(self.field, IndicatorField::Unrecognized(_))
    }

    /// Bars of history needed before this rule can match.
    pub fn lookback(&self) -> usize {
        let base = self
            .indicator
            .indicator_type(self.period)
            .and_then(|t| t.resolve_field(&self.field).map(|f| t.first_bar(&f)))
            .unwrap_or(0);
        if self.operator.is_cross() {
            base + 1
        } else {
            base
        }
    }

    /// Short label of the reading, e.g. `RSI(14)` or `MACD.signal`.
    pub fn reading_label(&self) -> String {
        let base = match &self.indicator {
            IndicatorKind::Price | IndicatorKind::Macd | IndicatorKind::Unrecognized(_) => {
                self.indicator.to_string()
            }
            kind => format!("{}({})", kind, self.period),
        };
        match &self.field {
            IndicatorField::Value => base,
            field => format!("{}.{}", base, field.as_str()),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.reading_label(),
            self.operator,
            self.threshold
        )
    }
}

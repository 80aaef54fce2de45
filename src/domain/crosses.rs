//! Cross detection between two consecutive samples.
//!
//! These are pure predicates over values that have already been resolved;
//! callers are responsible for looking up the current and previous samples.

/// `previous <= threshold && current > threshold`
pub fn crosses_above(current: f64, previous: f64, threshold: f64) -> bool {
    previous <= threshold && current > threshold
}

/// `previous >= threshold && current < threshold`
pub fn crosses_below(current: f64, previous: f64, threshold: f64) -> bool {
    previous >= threshold && current < threshold
}

/// One series moving from at-or-below another to strictly above it.
pub fn indicator_crosses_above(
    current: f64,
    previous: f64,
    current_other: f64,
    previous_other: f64,
) -> bool {
    previous <= previous_other && current > current_other
}

/// One series moving from at-or-above another to strictly below it.
pub fn indicator_crosses_below(
    current: f64,
    previous: f64,
    current_other: f64,
    previous_other: f64,
) -> bool {
    previous >= previous_other && current < current_other
}

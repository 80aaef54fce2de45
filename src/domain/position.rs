//! Single-position tracking and closed trades.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub side: Side,
    pub entry_bar: usize,
    pub entry_price: f64,
}

impl Position {
    /// Profit of closing `size` units at `exit_price`.
    pub fn pnl(&self, exit_price: f64, size: f64) -> f64 {
        match self.side {
            Side::Long => (exit_price - self.entry_price) * size,
            Side::Short => (self.entry_price - exit_price) * size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_bar: usize,
    pub exit_bar: usize,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
}

impl Trade {
    pub fn bars_held(&self) -> usize {
        self.exit_bar.saturating_sub(self.entry_bar)
    }
}

/// At most one open position; trades are appended only when it closes.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    size: f64,
    open: Option<Position>,
    trades: Vec<Trade>,
}

impl PositionTracker {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            open: None,
            trades: Vec::new(),
        }
    }

    /// Open a position. Returns `false` and changes nothing if one is open.
    pub fn open(&mut self, side: Side, bar: usize, price: f64) -> bool {
        if self.open.is_some() {
            return false;
        }
        self.open = Some(Position {
            side,
            entry_bar: bar,
            entry_price: price,
        });
        true
    }

    /// Close the open position, if any, and return the recorded trade.
    pub fn close(&mut self, bar: usize, price: f64) -> Option<&Trade> {
        let position = self.open.take()?;
        self.trades.push(Trade {
            entry_bar: position.entry_bar,
            exit_bar: bar,
            side: position.side,
            entry_price: position.entry_price,
            exit_price: price,
            pnl: position.pnl(price, self.size),
        });
        self.trades.last()
    }

    pub fn into_parts(self) -> (Option<Position>, Vec<Trade>) {
        (self.open, self.trades)
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a signal event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Buy side: price broke below the lower band / z threshold
    Enter,
    /// Sell side: price broke above the upper band
    Exit,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Enter => write!(f, "Enter"),
            SignalKind::Exit => write!(f, "Exit"),
        }
    }
}

/// How a boolean condition series is turned into events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerPolicy {
    /// Only the first day of each run where the condition holds
    EdgeTriggered,
    /// Every day the condition holds
    LevelSet,
}

impl fmt::Display for TriggerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerPolicy::EdgeTriggered => write!(f, "edge-triggered"),
            TriggerPolicy::LevelSet => write!(f, "level-set"),
        }
    }
}

/// A single event on a trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// Position in the source series
    pub index: usize,
    pub day: NaiveDate,
    pub kind: SignalKind,
    /// Series value on the event day
    pub price: f64,
}

/// Sparse set of events sharing a kind and a trigger policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub policy: TriggerPolicy,
    pub events: Vec<SignalEvent>,
}

impl Signal {
    pub fn new(kind: SignalKind, policy: TriggerPolicy) -> Self {
        Self {
            kind,
            policy,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, index: usize, day: NaiveDate, price: f64) {
        self.events.push(SignalEvent {
            index,
            day,
            kind: self.kind,
            price,
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.events.iter().map(|e| e.day).collect()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.events.iter().map(|e| e.index).collect()
    }

    pub fn fires_on(&self, day: NaiveDate) -> bool {
        self.events.iter().any(|e| e.day == day)
    }

    /// Events must be in series order, one per day
    pub fn validate(&self) -> Result<(), String> {
        if self.events.windows(2).any(|w| w[1].index <= w[0].index) {
            return Err("Signal events out of order".to_string());
        }
        if let Some(e) = self.events.iter().find(|e| !e.price.is_finite()) {
            return Err(format!("Non-finite price on {}", e.day));
        }
        Ok(())
    }
}

/// What an Enter event would have returned up to the latest price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalReturn {
    pub day: NaiveDate,
    pub entry_price: f64,
    pub latest_price: f64,
    /// (latest / entry - 1) * 100
    pub pct_change: f64,
}

impl SignalReturn {
    /// `None` when the entry price is not a positive number
    pub fn new(day: NaiveDate, entry_price: f64, latest_price: f64) -> Option<Self> {
        if !(entry_price > 0.0) || !latest_price.is_finite() {
            return None;
        }
        Some(Self {
            day,
            entry_price,
            latest_price,
            pct_change: (latest_price / entry_price - 1.0) * 100.0,
        })
    }
}

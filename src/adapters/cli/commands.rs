//! CLI Command Definitions
//!
//! Every analysis subcommand reads one or more daily histories from the data
//! directory. Flags given here override the configuration file for this
//! invocation only.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::strategy::{AnalysisConfig, BaseMode};

/// Anomaly Scope - rolling-statistics anomaly signals and drawdown probabilities
#[derive(Parser, Debug)]
#[command(
    name = "anomaly-scope",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Rolling-statistics anomaly signals and forward drawdown probabilities",
    long_about = "Anomaly Scope computes Bollinger and z-score anomaly signals, \
                  forward drawdown hit-probability tables and related screens \
                  from daily price histories stored as CSV files."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Override the data directory holding <SYMBOL>.csv files
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bollinger bands with edge-triggered Enter/Exit signals
    Bands(BandsCmd),

    /// Rolling z-score threshold days and the latest alert
    Zscore(ZScoreCmd),

    /// Forward drawdown hit-probability table
    Drawdown(DrawdownCmd),

    /// Whole-sample z-score screen across symbols
    Screen(ScreenCmd),

    /// Days until an entry-level trade turns profitable
    Holding(HoldingCmd),

    /// Monthly return seasonality
    Seasonality(SeasonalityCmd),
}

/// Optional day range shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,
}

/// Rolling window overrides
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Rolling window length in trading days
    #[arg(short, long, value_name = "DAYS")]
    pub window: Option<usize>,

    /// Observations required before a window yields a value
    #[arg(long, value_name = "COUNT")]
    pub min_periods: Option<usize>,
}

impl WindowArgs {
    fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(w) = self.window {
            config = config.with_window(w);
        }
        if let Some(m) = self.min_periods {
            config = config.with_min_periods(m);
        }
        config
    }
}

#[derive(Parser, Debug)]
pub struct BandsCmd {
    /// Symbol (file name in the data directory)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Upper band multiplier
    #[arg(long, value_name = "K")]
    pub upper: Option<f64>,

    /// Lower band multiplier
    #[arg(long, value_name = "K")]
    pub lower: Option<f64>,

    /// Export Enter signal returns to CSV
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,
}

impl BandsCmd {
    pub fn apply(&self, config: AnalysisConfig) -> AnalysisConfig {
        let config = self.window.apply(config);
        let upper = self.upper.unwrap_or(config.upper_multiplier);
        let lower = self.lower.unwrap_or(config.lower_multiplier);
        config.with_multipliers(upper, lower)
    }
}

#[derive(Parser, Debug)]
pub struct ZScoreCmd {
    /// Symbol (file name in the data directory)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Report every day with z at or below this value
    #[arg(short, long, value_name = "Z", allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// Show only the most recent N hits in text output
    #[arg(long, value_name = "N", default_value = "50")]
    pub tail: usize,

    /// Export threshold days to CSV
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,
}

impl ZScoreCmd {
    pub fn apply(&self, config: AnalysisConfig) -> AnalysisConfig {
        let config = self.window.apply(config);
        match self.threshold {
            Some(z) => config.with_z_threshold(z),
            None => config,
        }
    }
}

#[derive(Parser, Debug)]
pub struct DrawdownCmd {
    /// Symbol (file name in the data directory)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Forward horizons in trading days (comma separated)
    #[arg(long, value_name = "DAYS", value_delimiter = ',')]
    pub horizons: Option<Vec<usize>>,

    /// Drawdown thresholds as fractions (comma separated, e.g. 0.05,0.1)
    #[arg(long, value_name = "X", value_delimiter = ',')]
    pub thresholds: Option<Vec<f64>>,

    /// Base price: midpoint, close or low_plus_alpha
    #[arg(long, value_name = "MODE")]
    pub base: Option<BaseMode>,

    /// Weight for low_plus_alpha
    #[arg(long, value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Export the probability table to CSV
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,
}

impl DrawdownCmd {
    pub fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(h) = &self.horizons {
            config = config.with_horizons(h.clone());
        }
        if let Some(x) = &self.thresholds {
            config = config.with_thresholds(x.clone());
        }
        if let Some(mode) = self.base {
            config = config.with_base_mode(mode);
        }
        if let Some(alpha) = self.alpha {
            config = config.with_alpha(alpha);
        }
        config
    }
}

#[derive(Parser, Debug)]
pub struct ScreenCmd {
    /// Symbols to screen (defaults to the configured list)
    #[arg(value_name = "SYMBOL")]
    pub symbols: Vec<String>,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Trailing observations per symbol
    #[arg(short, long, value_name = "DAYS")]
    pub lookback: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct HoldingCmd {
    /// Symbol (defaults to the configured holding symbol)
    #[arg(value_name = "SYMBOL")]
    pub symbol: Option<String>,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Entry when the day's High reaches this level
    #[arg(short, long, value_name = "LEVEL")]
    pub entry_level: Option<f64>,

    /// List every trade in text output
    #[arg(long)]
    pub trades: bool,
}

#[derive(Parser, Debug)]
pub struct SeasonalityCmd {
    /// Symbol (file name in the data directory)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    #[command(flatten)]
    pub range: RangeArgs,
}

//! CLI Adapter
//!
//! Command-line interface for Anomaly Scope.
//! Uses clap derive macros for argument parsing.

mod commands;
pub mod render;

pub use commands::{
    BandsCmd, CliApp, Command, DrawdownCmd, HoldingCmd, OutputFormat, RangeArgs, ScreenCmd,
    SeasonalityCmd, WindowArgs, ZScoreCmd,
};

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits and the outer
//! surfaces:
//! - CSV: per-symbol daily histories on disk
//! - Export: CSV writers for result tables
//! - CLI: Command-line interface definitions and text rendering

pub mod cli;
pub mod csv_file;
pub mod export;

pub use cli::CliApp;
pub use csv_file::CsvHistorySource;

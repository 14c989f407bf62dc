//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    load_config, load_or_default, Config, LoaderError, DATA_DIR_ENV,
};

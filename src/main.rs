//! Anomaly Scope - Rolling-Statistics Anomaly Engine
//!
//! Bollinger and z-score anomaly signals plus forward drawdown probabilities
//! from daily price histories.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use anomaly_scope::adapters::cli::{self, render, CliApp, Command, OutputFormat};
use anomaly_scope::adapters::export::{
    export_to_path, write_drawdown_table, write_signal_returns, write_zscore_hits,
};
use anomaly_scope::adapters::CsvHistorySource;
use anomaly_scope::application::AnalysisService;
use anomaly_scope::config::{load_or_default, Config};
use anomaly_scope::domain::AnalysisError;
use anomaly_scope::ports::HistoryQuery;
use anomaly_scope::strategy::AnalysisConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (data dir overrides can go here)
    dotenvy::dotenv().ok();

    let app = cli::init();
    let config = load_or_default(&app.config)
        .with_context(|| format!("Failed to load configuration from {}", app.config.display()))?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    let result = dispatch(app, config).await;

    if let Err(e) = &result {
        if let Some(err) = e.downcast_ref::<AnalysisError>() {
            if err.is_data_unavailable() {
                eprintln!("No data: {}", err);
                std::process::exit(2);
            }
        }
    }
    result
}

fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    // Logs go to stderr so JSON on stdout stays parseable
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

async fn dispatch(app: CliApp, config: Config) -> Result<()> {
    let data_dir = app
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.resolved_dir());
    tracing::debug!("Data directory: {}", data_dir.display());

    let source = CsvHistorySource::new(data_dir);
    let base = AnalysisConfig::from(&config);
    let format = app.format;

    match app.command {
        Command::Bands(cmd) => {
            let service = AnalysisService::new(source, cmd.apply(base));
            let query = HistoryQuery::new(cmd.symbol.clone()).between(cmd.range.start, cmd.range.end);
            let report = service.run_bands(&query).await?;

            if let Some(path) = &cmd.export_csv {
                export_to_path(path, |w| write_signal_returns(&report.signals.enter_returns, w))
                    .with_context(|| format!("Failed to export {}", path.display()))?;
            }
            emit(format, &report, render::bands)
        }
        Command::Zscore(cmd) => {
            let service = AnalysisService::new(source, cmd.apply(base));
            let query = HistoryQuery::new(cmd.symbol.clone()).between(cmd.range.start, cmd.range.end);
            let report = service.run_zscore(&query).await?;

            if let Some(path) = &cmd.export_csv {
                export_to_path(path, |w| write_zscore_hits(&report.scan.hits, w))
                    .with_context(|| format!("Failed to export {}", path.display()))?;
            }
            emit(format, &report, |r| render::zscore(r, cmd.tail))
        }
        Command::Drawdown(cmd) => {
            let service = AnalysisService::new(source, cmd.apply(base));
            let query = HistoryQuery::new(cmd.symbol.clone()).between(cmd.range.start, cmd.range.end);
            let report = service.run_drawdown(&query).await?;

            if let Some(path) = &cmd.export_csv {
                export_to_path(path, |w| write_drawdown_table(&report.table, w))
                    .with_context(|| format!("Failed to export {}", path.display()))?;
            }
            emit(format, &report, render::drawdown)
        }
        Command::Screen(cmd) => {
            let symbols = if cmd.symbols.is_empty() {
                config.screen.symbols.clone()
            } else {
                cmd.symbols.clone()
            };
            let lookback = cmd.lookback.unwrap_or(config.screen.lookback);
            let service = AnalysisService::new(source, base);
            let report = service
                .run_screen(&symbols, lookback, cmd.range.start, cmd.range.end)
                .await?;
            emit(format, &report, render::screen)
        }
        Command::Holding(cmd) => {
            let symbol = cmd.symbol.clone().unwrap_or_else(|| config.holding.symbol.clone());
            let entry_level = cmd.entry_level.unwrap_or(config.holding.entry_level);
            let service = AnalysisService::new(source, base);
            let query = HistoryQuery::new(symbol.clone()).between(cmd.range.start, cmd.range.end);
            let report = service.run_holding(&query, entry_level).await?;
            emit(format, &report, |r| render::holding(&symbol, r, cmd.trades))
        }
        Command::Seasonality(cmd) => {
            let service = AnalysisService::new(source, base);
            let query = HistoryQuery::new(cmd.symbol.clone()).between(cmd.range.start, cmd.range.end);
            let report = service.run_seasonality(&query).await?;
            emit(format, &report, render::seasonality)
        }
    }
}

fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Text => print!("{}", text(value)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to serialize report")?
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_fails() {
        assert!(init_logging(false, true, "warn").is_ok());
        let err = init_logging(false, false, "warn").unwrap_err();
        assert!(err.to_string().contains("Failed to initialize logging"));
    }
}

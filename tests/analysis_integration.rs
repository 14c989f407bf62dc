//! Analysis Integration Tests
//!
//! End-to-end runs of the analysis service over both the in-memory
//! history and CSV files on disk:
//! 1. CSV file -> normalizer -> drawdown estimator
//! 2. Mock history -> Bollinger / z-score signals
//! 3. Multi-symbol screen with a missing symbol
//! 4. Monthly seasonality and CSV export
//!
//! All tests are deterministic and read only temporary files.

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use std::fs;
use tempfile::tempdir;

use anomaly_scope::adapters::export::{export_to_path, write_drawdown_table};
use anomaly_scope::adapters::CsvHistorySource;
use anomaly_scope::application::AnalysisService;
use anomaly_scope::domain::{ColumnKey, RawFrame, SignalKind, TriggerPolicy};
use anomaly_scope::ports::{HistoryQuery, MockPriceHistory};
use anomaly_scope::strategy::{AnalysisConfig, BaseMode, ZScoreAlert};

// ============================================================================
// Test Fixtures
// ============================================================================

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
}

/// Alternating 100/101 for ten days, a dip to 80, then 100 and 101
fn dip_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
    closes.extend([80.0, 100.0, 101.0]);
    closes
}

fn close_frame(closes: &[f64]) -> RawFrame {
    let mut frame = RawFrame::new(vec![ColumnKey::flat("Close")]);
    for (i, c) in closes.iter().enumerate() {
        frame.push_row(day(i as i64), vec![Some(*c)]).unwrap();
    }
    frame
}

/// Two-level CSV with Close fixed at 10 and Low falling 10, 9, ..., 1
fn falling_low_csv() -> String {
    let mut csv = String::from(
        "Price,Close,High,Low,Open,Volume\nTicker,TEST,TEST,TEST,TEST,TEST\nDate,,,,,\n",
    );
    for i in 0..10 {
        let low = 10 - i;
        csv.push_str(&format!("{},10,11,{},10,1000\n", day(i), low));
    }
    csv
}

// ============================================================================
// Drawdown
// ============================================================================

#[tokio::test]
async fn test_drawdown_from_grouped_csv() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("TEST.csv"), falling_low_csv()).unwrap();

    let config = AnalysisConfig::default()
        .with_horizons(vec![2, 9, 10])
        .with_thresholds(vec![0.2])
        .with_base_mode(BaseMode::Close);
    let service = AnalysisService::new(CsvHistorySource::new(dir.path()), config);

    let report = service.run_drawdown(&HistoryQuery::new("TEST")).await.unwrap();
    assert_eq!(report.days, 10);

    // Day 0 reaches 8/10 - 1, which sits just above -0.2 in binary floating point
    assert_eq!(report.table.window_count(2), Some(8));
    assert_relative_eq!(report.table.probability(2, 0.2).unwrap(), 87.5);

    // One valid start day for h = 9, none for h = 10
    assert_eq!(report.table.window_count(9), Some(1));
    assert_relative_eq!(report.table.probability(9, 0.2).unwrap(), 100.0);
    assert_eq!(report.table.window_count(10), Some(0));
    assert_eq!(report.table.probability(10, 0.2), None);

    let out = dir.path().join("table.csv");
    export_to_path(&out, |w| write_drawdown_table(&report.table, w)).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Horizon,20%,Windows");
    assert_eq!(lines[1], "2 days,87.50,8");
    assert_eq!(lines[3], "10 days,,0");
}

#[tokio::test]
async fn test_invalid_horizon_is_rejected() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("TEST.csv"), falling_low_csv()).unwrap();

    let config = AnalysisConfig::default().with_horizons(vec![0]);
    let service = AnalysisService::new(CsvHistorySource::new(dir.path()), config);
    assert!(service.run_drawdown(&HistoryQuery::new("TEST")).await.is_err());
}

// ============================================================================
// Signals
// ============================================================================

#[tokio::test]
async fn test_bands_enter_on_dip() {
    let source = MockPriceHistory::new().with_frame("DIP", close_frame(&dip_closes()));
    let service = AnalysisService::new(source.clone(), AnalysisConfig::default().with_window(10));

    let report = service.run_bands(&HistoryQuery::new("DIP")).await.unwrap();
    assert_eq!(report.days, 13);

    // First nine days have no band
    assert_eq!(report.band.first_defined(), Some(9));

    let enter = &report.signals.enter;
    assert_eq!(enter.kind, SignalKind::Enter);
    assert_eq!(enter.policy, TriggerPolicy::EdgeTriggered);
    assert_eq!(enter.days(), vec![day(10)]);
    assert!(report.signals.exit.is_empty());

    let ret = report.signals.enter_returns[0];
    assert_relative_eq!(ret.entry_price, 80.0);
    assert_relative_eq!(ret.latest_price, 101.0);
    assert_relative_eq!(ret.pct_change, 26.25, epsilon = 1e-9);

    let latest = report.latest.unwrap();
    assert_eq!(latest.day, day(12));
    assert_relative_eq!(latest.mean.unwrap(), 98.5, epsilon = 1e-9);
    assert_relative_eq!(latest.std_dev.unwrap(), 42.5_f64.sqrt(), epsilon = 1e-9);

    assert_eq!(source.get_calls().len(), 1);
}

#[tokio::test]
async fn test_zscore_threshold_days() {
    let source = MockPriceHistory::new().with_frame("DIP", close_frame(&dip_closes()));
    let config = AnalysisConfig::default().with_window(10).with_z_threshold(-2.0);
    let service = AnalysisService::new(source, config);

    let report = service.run_zscore(&HistoryQuery::new("dip")).await.unwrap();
    let scan = &report.scan;
    assert_eq!(scan.signal.policy, TriggerPolicy::LevelSet);
    assert_eq!(scan.hits.len(), 1);
    assert_eq!(scan.hits[0].day, day(10));
    // (80 - 98.5) / sqrt(42.5)
    assert_relative_eq!(scan.hits[0].result.z_score, -18.5 / 42.5_f64.sqrt(), epsilon = 1e-9);

    // Latest day is back above the mean
    assert!(scan.latest.unwrap().z_score > 0.0);
    assert_eq!(scan.alert, ZScoreAlert::None);
}

#[tokio::test]
async fn test_range_outside_history_is_data_unavailable() {
    let source = MockPriceHistory::new().with_frame("DIP", close_frame(&dip_closes()));
    let service = AnalysisService::new(source, AnalysisConfig::default().with_window(10));

    let query = HistoryQuery::new("DIP").between(Some(day(100)), None);
    let err = service.run_bands(&query).await.unwrap_err();
    assert!(err.is_data_unavailable());

    let err = service.run_bands(&HistoryQuery::new("NOPE")).await.unwrap_err();
    assert!(err.is_data_unavailable());
}

// ============================================================================
// Screen
// ============================================================================

#[tokio::test]
async fn test_screen_skips_missing_symbol() {
    let flat: Vec<f64> = (0..30).map(|i| 100.0 + (i % 3) as f64).collect();
    let mut falling: Vec<f64> = vec![100.0; 29];
    falling.push(90.0);

    let source = MockPriceHistory::new()
        .with_frame("SPY", close_frame(&flat))
        .with_frame("QQQ", close_frame(&falling));
    let service = AnalysisService::new(source, AnalysisConfig::default());

    let symbols = vec!["SPY".to_string(), "XLF".to_string(), "QQQ".to_string()];
    let report = service.run_screen(&symbols, 22, None, None).await.unwrap();

    assert_eq!(report.lookback, 22);
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].symbol, "XLF");

    // Most negative z first
    assert_eq!(report.rows[0].symbol, "QQQ");
    assert!(report.rows[0].z_score().unwrap() < -4.0);
    assert_eq!(report.rows[0].summary.count, 22);
}

// ============================================================================
// Seasonality
// ============================================================================

#[tokio::test]
async fn test_seasonality_from_flat_csv() {
    let dir = tempdir().unwrap();
    let csv = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-15,99,101,98,95,95,1000
2024-01-31,99,101,98,100,100,1000
2024-02-14,99,101,98,104,104,1000
2024-02-29,99,111,98,110,110,1000
2024-03-28,99,111,98,99,99,1000
";
    fs::write(dir.path().join("SPY.csv"), csv).unwrap();
    let service = AnalysisService::new(CsvHistorySource::new(dir.path()), AnalysisConfig::default());

    let analysis = service.run_seasonality(&HistoryQuery::new("SPY")).await.unwrap();
    let report = &analysis.report;

    assert_eq!(report.month_ends.len(), 3);
    assert_eq!(report.returns.len(), 2);
    assert_eq!(report.latest_year, Some(2024));

    let jan = &report.months[0];
    assert_eq!(jan.count, 0);
    assert_eq!(jan.probability_positive, None);

    let feb = &report.months[1];
    assert_relative_eq!(feb.mean.unwrap(), 10.0, epsilon = 1e-9);
    assert_relative_eq!(feb.probability_positive.unwrap(), 100.0);

    let mar = &report.months[2];
    assert_relative_eq!(mar.mean.unwrap(), -10.0, epsilon = 1e-9);
    assert_relative_eq!(mar.probability_positive.unwrap(), 0.0);
}

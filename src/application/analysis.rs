//! Analysis Service
//!
//! One call per analysis invocation: fetch the raw history through the
//! price history port, normalize it, and run one engine over it. Nothing is
//! cached between calls; the configuration is passed in explicitly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AlignedOhlc, AnalysisError, Band, DrawdownTable, Field, PriceSeries, RawFrame};
use crate::ports::{HistoryQuery, PriceHistoryPort};
use crate::stats::{moments, RollingStats};
use crate::strategy::{
    seasonality, AnalysisConfig, BaseMode, BollingerBands, BollingerSignals, DrawdownEstimator,
    HoldingPeriodModel, HoldingReport, ScreenReport, SeasonalityReport, ZScoreGate,
    ZScoreScan, ZScoreScreener,
};

/// Rolling statistics and band values on the latest day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingSnapshot {
    pub day: NaiveDate,
    pub close: f64,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub zscore: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandsReport {
    pub symbol: String,
    pub days: usize,
    pub latest: Option<RollingSnapshot>,
    pub band: Band,
    pub signals: BollingerSignals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreReport {
    pub symbol: String,
    pub scan: ZScoreScan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownReport {
    pub symbol: String,
    pub base_mode: BaseMode,
    pub alpha: f64,
    pub days: usize,
    pub table: DrawdownTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityAnalysis {
    pub symbol: String,
    pub report: SeasonalityReport,
}

/// Runs analyses against one price history provider
pub struct AnalysisService<P: PriceHistoryPort> {
    source: P,
    config: AnalysisConfig,
}

impl<P: PriceHistoryPort> AnalysisService<P> {
    pub fn new(source: P, config: AnalysisConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    async fn fetch(&self, query: &HistoryQuery) -> Result<RawFrame, AnalysisError> {
        let frame = self.source.fetch_history(query).await?;
        if frame.is_empty() {
            return Err(AnalysisError::DataUnavailable(format!(
                "no rows for {} in the requested range",
                query.symbol
            )));
        }
        Ok(frame)
    }

    async fn closes(&self, query: &HistoryQuery) -> Result<PriceSeries, AnalysisError> {
        self.fetch(query).await?.series(Field::Close, Some(&query.symbol))
    }

    async fn ohlc(&self, query: &HistoryQuery) -> Result<AlignedOhlc, AnalysisError> {
        self.fetch(query).await?.ohlc(Some(&query.symbol))
    }

    /// Bollinger bands, edge-triggered signals and the latest rolling statistics
    pub async fn run_bands(&self, query: &HistoryQuery) -> Result<BandsReport, AnalysisError> {
        self.config.validate_signals()?;
        let series = self.closes(query).await?;
        let window = self.config.window();

        let stats = RollingStats::compute(&series, window);
        let bands = BollingerBands::from_config(&self.config);
        let band = bands.band_from_stats(&stats);
        let signals = bands.signals(&series, &band)?;

        let latest = series.latest().map(|(day, close)| {
            let last = series.len() - 1;
            RollingSnapshot {
                day,
                close,
                mean: stats.mean.get(last),
                std_dev: stats.std_dev.get(last),
                zscore: stats.zscore.get(last),
                skewness: window.slice(series.values(), last).and_then(moments::skewness),
                kurtosis: window.slice(series.values(), last).and_then(moments::excess_kurtosis),
                upper: band.upper.get(last),
                lower: band.lower.get(last),
            }
        });

        tracing::info!(
            "{}: {} days, {} enter / {} exit signals",
            query.symbol,
            series.len(),
            signals.enter.len(),
            signals.exit.len()
        );

        Ok(BandsReport {
            symbol: query.symbol.clone(),
            days: series.len(),
            latest,
            band,
            signals,
        })
    }

    /// Level-set z-score threshold scan
    pub async fn run_zscore(&self, query: &HistoryQuery) -> Result<ZScoreReport, AnalysisError> {
        self.config.validate_signals()?;
        let series = self.closes(query).await?;
        let scan = ZScoreGate::from_config(&self.config).scan(&series);

        tracing::info!(
            "{}: {} day(s) at or below z = {}, latest alert {}",
            query.symbol,
            scan.hits.len(),
            scan.threshold,
            scan.alert.label()
        );

        Ok(ZScoreReport {
            symbol: query.symbol.clone(),
            scan,
        })
    }

    /// Forward drawdown probability table
    pub async fn run_drawdown(&self, query: &HistoryQuery) -> Result<DrawdownReport, AnalysisError> {
        self.config.validate_drawdown()?;
        let ohlc = self.ohlc(query).await?;
        let estimator = DrawdownEstimator::from_config(&self.config)?;
        let table = estimator.estimate_ohlc(&ohlc, self.config.base_mode, self.config.alpha)?;

        Ok(DrawdownReport {
            symbol: query.symbol.clone(),
            base_mode: self.config.base_mode,
            alpha: self.config.alpha,
            days: ohlc.len(),
            table,
        })
    }

    /// Whole-sample z-score screen over `symbols`
    ///
    /// Adjusted closes are used when the history carries them.
    pub async fn run_screen(
        &self,
        symbols: &[String],
        lookback: usize,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<ScreenReport, AnalysisError> {
        let screener = ZScoreScreener::new(lookback)?;
        let mut inputs = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let query = HistoryQuery::new(symbol.clone()).between(start, end);
            let history = match self.fetch(&query).await {
                Ok(frame) => match frame.series(Field::AdjClose, Some(symbol)) {
                    Err(AnalysisError::MissingField { .. }) => frame.series(Field::Close, Some(symbol)),
                    other => other,
                },
                Err(e) => Err(e),
            };
            inputs.push((symbol.clone(), history));
        }

        let report = screener.screen(inputs)?;
        tracing::info!(
            "Screened {} symbol(s), {} skipped",
            report.rows.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Days-until-profit model at `entry_level`
    pub async fn run_holding(
        &self,
        query: &HistoryQuery,
        entry_level: f64,
    ) -> Result<HoldingReport, AnalysisError> {
        let model = HoldingPeriodModel::new(entry_level)?;
        let ohlc = self.ohlc(query).await?;
        Ok(model.analyze(&ohlc))
    }

    /// Monthly return seasonality from closes
    pub async fn run_seasonality(&self, query: &HistoryQuery) -> Result<SeasonalityAnalysis, AnalysisError> {
        let series = self.closes(query).await?;
        let report = seasonality(&series)?;
        Ok(SeasonalityAnalysis {
            symbol: query.symbol.clone(),
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnKey;
    use crate::ports::{MarketDataError, MockPriceHistoryPort};
    use crate::strategy::ZScoreAlert;
    use chrono::Days;

    fn frame(closes: &[f64]) -> RawFrame {
        let mut frame = RawFrame::new(vec![
            ColumnKey::flat("High"),
            ColumnKey::flat("Low"),
            ColumnKey::flat("Close"),
        ]);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for (i, &c) in closes.iter().enumerate() {
            frame
                .push_row(start + Days::new(i as u64), vec![Some(c + 1.0), Some(c - 1.0), Some(c)])
                .unwrap();
        }
        frame
    }

    fn noisy(n: usize) -> Vec<f64> {
        (0..n).map(|i| if i % 2 == 0 { 99.9 } else { 100.1 }).collect()
    }

    fn service_with(closes: Vec<f64>, config: AnalysisConfig) -> AnalysisService<MockPriceHistoryPort> {
        let mut mock = MockPriceHistoryPort::new();
        mock.expect_fetch_history()
            .returning(move |_| Ok(frame(&closes)));
        AnalysisService::new(mock, config)
    }

    #[tokio::test]
    async fn test_run_bands() {
        let mut closes = noisy(40);
        closes[30] = 100.5;
        let service = service_with(closes, AnalysisConfig::default().with_window(20));

        let report = service.run_bands(&HistoryQuery::new("SPY")).await.unwrap();
        assert_eq!(report.days, 40);
        assert_eq!(report.signals.exit.indices(), vec![30]);
        let latest = report.latest.unwrap();
        assert!(latest.mean.is_some());
        assert!(latest.upper.unwrap() > latest.lower.unwrap());
        assert!(latest.kurtosis.is_some());
    }

    #[tokio::test]
    async fn test_run_zscore() {
        let mut closes = noisy(32);
        closes[30] = 99.0;
        closes[31] = 90.0;
        let config = AnalysisConfig::default().with_window(20).with_z_threshold(-3.0);
        let service = service_with(closes, config);

        let report = service.run_zscore(&HistoryQuery::new("SVIX")).await.unwrap();
        assert_eq!(report.scan.signal.indices(), vec![30, 31]);
        assert_eq!(report.scan.alert, ZScoreAlert::Extreme);
    }

    #[tokio::test]
    async fn test_run_drawdown() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 - i as f64).collect();
        let config = AnalysisConfig::default().with_horizons(vec![1, 60]).with_thresholds(vec![0.01]);
        let service = service_with(closes, config);

        let report = service.run_drawdown(&HistoryQuery::new("SPY")).await.unwrap();
        assert_eq!(report.days, 50);
        assert_eq!(report.table.window_count(1), Some(49));
        // Horizon longer than the history has no windows
        assert!(!report.table.is_row_defined(1));
        assert_eq!(report.table.probability(60, 0.01), None);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_fetch() {
        let mut mock = MockPriceHistoryPort::new();
        mock.expect_fetch_history().never();
        let service = AnalysisService::new(mock, AnalysisConfig::default().with_window(1));

        let err = service.run_bands(&HistoryQuery::new("SPY")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_data_unavailable() {
        let mut mock = MockPriceHistoryPort::new();
        mock.expect_fetch_history()
            .returning(|q| Err(MarketDataError::NotFound(q.symbol.clone())));
        let service = AnalysisService::new(mock, AnalysisConfig::default());

        let err = service.run_zscore(&HistoryQuery::new("NOPE")).await.unwrap_err();
        assert!(err.is_data_unavailable());
    }

    #[tokio::test]
    async fn test_empty_range_is_data_unavailable() {
        let mut mock = MockPriceHistoryPort::new();
        mock.expect_fetch_history()
            .returning(|_| Ok(RawFrame::new(vec![ColumnKey::flat("Close")])));
        let service = AnalysisService::new(mock, AnalysisConfig::default());

        let err = service.run_seasonality(&HistoryQuery::new("SPY")).await.unwrap_err();
        assert!(err.is_data_unavailable());
    }

    #[tokio::test]
    async fn test_run_screen_skips_missing_symbols() {
        let mut mock = MockPriceHistoryPort::new();
        mock.expect_fetch_history().returning(|q| {
            if q.symbol == "SPY" {
                Ok(frame(&[1.0, 2.0, 3.0, 4.0, 5.0]))
            } else {
                Err(MarketDataError::NotFound(q.symbol.clone()))
            }
        });
        let service = AnalysisService::new(mock, AnalysisConfig::default());

        let symbols = vec!["SPY".to_string(), "XLF".to_string()];
        let report = service.run_screen(&symbols, 5, None, None).await.unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].symbol, "SPY");
        assert_eq!(report.skipped[0].symbol, "XLF");
    }

    #[tokio::test]
    async fn test_run_holding() {
        let service = service_with(vec![20.0, 25.0, 22.0, 18.0], AnalysisConfig::default());
        let report = service.run_holding(&HistoryQuery::new("^VIX"), 21.0).await.unwrap();
        // Highs 21, 26, 23, 19: entries on days 0, 1 and 2
        assert_eq!(report.summary.trades, 3);
        assert_eq!(report.summary.resolved, 3);
    }
}

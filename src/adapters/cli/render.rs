//! Plain-text rendering of analysis reports
//!
//! Undefined values print as `n/a`. A drawdown row without valid windows
//! prints `n/a` in every column rather than 0%.

use std::fmt::Write;

use crate::application::{BandsReport, DrawdownReport, SeasonalityAnalysis, ZScoreReport};
use crate::strategy::{HoldingReport, ScreenReport};

fn opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

pub fn bands(report: &BandsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} days, bands +{}/-{} std",
        report.symbol, report.days, report.band.upper_multiplier, report.band.lower_multiplier
    );

    if let Some(s) = &report.latest {
        let _ = writeln!(out, "\nLatest ({})", s.day);
        let _ = writeln!(out, "  Close:     {:.2}", s.close);
        let _ = writeln!(out, "  Mean:      {}", opt(s.mean, 2));
        let _ = writeln!(out, "  Std:       {}", opt(s.std_dev, 4));
        let _ = writeln!(out, "  Z-score:   {}", opt(s.zscore, 2));
        let _ = writeln!(out, "  Skewness:  {}", opt(s.skewness, 3));
        let _ = writeln!(out, "  Kurtosis:  {}", opt(s.kurtosis, 3));
        let _ = writeln!(out, "  Upper:     {}", opt(s.upper, 2));
        let _ = writeln!(out, "  Lower:     {}", opt(s.lower, 2));
    }

    let _ = writeln!(out, "\nEnter signals ({})", report.signals.enter.len());
    if !report.signals.enter_returns.is_empty() {
        let _ = writeln!(out, "  {:<12} {:>12} {:>12} {:>10}", "Date", "Entry", "Latest", "% Change");
        for r in &report.signals.enter_returns {
            let _ = writeln!(
                out,
                "  {:<12} {:>12.2} {:>12.2} {:>9.2}%",
                r.day.to_string(),
                r.entry_price,
                r.latest_price,
                r.pct_change
            );
        }
    }

    let _ = writeln!(out, "\nExit signals ({})", report.signals.exit.len());
    for e in &report.signals.exit.events {
        let _ = writeln!(out, "  {:<12} {:>12.2}", e.day.to_string(), e.price);
    }
    out
}

pub fn zscore(report: &ZScoreReport, tail: usize) -> String {
    let scan = &report.scan;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} day(s) with z <= {}",
        report.symbol,
        scan.hits.len(),
        scan.threshold
    );

    if !scan.hits.is_empty() {
        let skip = scan.hits.len().saturating_sub(tail);
        if skip > 0 {
            let _ = writeln!(out, "  ... {} earlier day(s) omitted", skip);
        }
        let _ = writeln!(out, "  {:<12} {:>12} {:>8} {:>12}", "Date", "Close", "Z", "Mean");
        for h in scan.hits.iter().skip(skip) {
            let _ = writeln!(
                out,
                "  {:<12} {:>12.2} {:>8.2} {:>12.2}",
                h.day.to_string(),
                h.result.current_price,
                h.result.z_score,
                h.result.mean
            );
        }
    }

    match &scan.latest {
        Some(latest) => {
            let _ = writeln!(
                out,
                "\nLatest z-score: {:.2} (price {:.2}, mean {:.2}) alert: {}",
                latest.z_score,
                latest.current_price,
                latest.mean,
                scan.alert.label()
            );
        }
        None => {
            let _ = writeln!(out, "\nLatest z-score: n/a");
        }
    }
    out
}

pub fn drawdown(report: &DrawdownReport) -> String {
    let table = &report.table;
    let mut out = String::new();
    let _ = write!(out, "{}: {} days, base {:?}", report.symbol, report.days, report.base_mode);
    if let Some((first, last)) = table.date_range {
        let _ = write!(out, " ({} to {})", first, last);
    }
    let _ = writeln!(out);

    let _ = write!(out, "\n{:<10}", "Horizon");
    for label in table.threshold_labels() {
        let _ = write!(out, " {:>7}", label);
    }
    let _ = writeln!(out, " {:>8}", "Windows");

    for (i, label) in table.horizon_labels().into_iter().enumerate() {
        let _ = write!(out, "{:<10}", label);
        for j in 0..table.thresholds.len() {
            let cell = match table.cell(i, j) {
                Some(p) => format!("{:.2}%", p),
                None => "n/a".to_string(),
            };
            let _ = write!(out, " {:>7}", cell);
        }
        let _ = writeln!(out, " {:>8}", table.window_counts.get(i).copied().unwrap_or(0));
    }
    out
}

pub fn screen(report: &ScreenReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Z-score screen, last {} observations", report.lookback);
    let _ = writeln!(
        out,
        "{:<8} {:<12} {:>10} {:>10} {:>8} {:>8} {:>8}  {}",
        "Symbol", "As of", "Price", "Mean", "Z", "Skew", "Kurt", "Shape"
    );
    for row in &report.rows {
        let _ = writeln!(
            out,
            "{:<8} {:<12} {:>10.2} {:>10.2} {:>8} {:>8} {:>8}  {}",
            row.symbol,
            row.as_of.to_string(),
            row.price,
            row.summary.mean,
            opt(row.z_score(), 2),
            opt(row.summary.skewness, 2),
            opt(row.summary.kurtosis, 2),
            row.skew_class.map(|c| c.label()).unwrap_or("n/a")
        );
    }
    for skipped in &report.skipped {
        let _ = writeln!(out, "{:<8} skipped: {}", skipped.symbol, skipped.reason);
    }
    out
}

pub fn holding(symbol: &str, report: &HoldingReport, list_trades: bool) -> String {
    let s = &report.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{}: entry when High >= {}", symbol, report.entry_level);
    let _ = writeln!(out, "  Trades:      {} ({} resolved)", s.trades, s.resolved);
    let _ = writeln!(out, "  Mean days:   {}", opt(s.mean_days, 1));
    let _ = writeln!(out, "  Median days: {}", opt(s.median_days, 1));
    let _ = writeln!(
        out,
        "  Range:       {}",
        match (s.min_days, s.max_days) {
            (Some(min), Some(max)) => format!("{} to {} days", min, max),
            _ => "n/a".to_string(),
        }
    );

    if list_trades && !report.trades.is_empty() {
        let _ = writeln!(out, "\n  {:<12} {:<12} {:>6}", "Entry", "Exit", "Days");
        for t in &report.trades {
            let _ = writeln!(
                out,
                "  {:<12} {:<12} {:>6}{}",
                t.entry_day.to_string(),
                t.exit_day.to_string(),
                t.days_to_profit,
                if t.resolved { "" } else { "  (open)" }
            );
        }
    }
    out
}

pub fn seasonality(analysis: &SeasonalityAnalysis) -> String {
    let report = &analysis.report;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} monthly returns",
        analysis.symbol,
        report.returns.len()
    );
    let _ = writeln!(
        out,
        "{:<10} {:>6} {:>9} {:>9} {:>9} {:>8}",
        "Month", "Years", "Mean %", "Min %", "Max %", "P(up)"
    );
    for m in &report.months {
        let _ = writeln!(
            out,
            "{:<10} {:>6} {:>9} {:>9} {:>9} {:>8}",
            m.name,
            m.count,
            opt(m.mean, 2),
            opt(m.min, 2),
            opt(m.max, 2),
            m.probability_positive
                .map(|p| format!("{:.1}%", p))
                .unwrap_or_else(|| "n/a".to_string())
        );
    }

    if let Some(year) = report.latest_year {
        let _ = writeln!(out, "\n{}", year);
        for r in report.latest_year_returns() {
            let _ = writeln!(out, "  {:>2}: {:>7.2}%", r.month, r.pct_change);
        }
    }
    out
}

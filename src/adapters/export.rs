//! CSV export of result tables
//!
//! Undefined cells (no valid windows, undefined z-score) are written as
//! empty fields, never as 0.

use std::io::Write;
use std::path::Path;

use crate::domain::{DrawdownTable, SignalReturn};
use crate::strategy::zscore_gate::ZScoreHit;

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// `Horizon,2%,3%,...,Windows` with one row per horizon
pub fn write_drawdown_table<W: Write>(table: &DrawdownTable, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Horizon".to_string()];
    header.extend(table.threshold_labels());
    header.push("Windows".to_string());
    wtr.write_record(&header)?;

    for (i, label) in table.horizon_labels().into_iter().enumerate() {
        let mut row = vec![label];
        row.extend((0..table.thresholds.len()).map(|j| cell(table.cell(i, j))));
        row.push(table.window_counts.get(i).copied().unwrap_or(0).to_string());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `Date,Entry Price,Latest Price,% Change` per Enter event
pub fn write_signal_returns<W: Write>(returns: &[SignalReturn], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Date", "Entry Price", "Latest Price", "% Change"])?;
    for r in returns {
        wtr.write_record(&[
            r.day.to_string(),
            format!("{:.2}", r.entry_price),
            format!("{:.2}", r.latest_price),
            format!("{:.2}", r.pct_change),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// `Date,Close,Z,Mean,Std` per level-set hit
pub fn write_zscore_hits<W: Write>(hits: &[ZScoreHit], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Date", "Close", "Z", "Mean", "Std"])?;
    for h in hits {
        wtr.write_record(&[
            h.day.to_string(),
            format!("{:.2}", h.result.current_price),
            format!("{:.2}", h.result.z_score),
            format!("{:.2}", h.result.mean),
            format!("{:.4}", h.result.std_dev),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create `path` and hand a buffered writer to `write`
pub fn export_to_path<F>(path: &Path, write: F) -> Result<(), csv::Error>
where
    F: FnOnce(std::io::BufWriter<std::fs::File>) -> Result<(), csv::Error>,
{
    let file = std::fs::File::create(path)?;
    write(std::io::BufWriter::new(file))?;
    tracing::info!("Exported {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn table() -> DrawdownTable {
        DrawdownTable {
            horizons: vec![1, 5],
            thresholds: vec![0.02, 0.05],
            cells: vec![vec![Some(12.5), Some(0.0)], vec![None, None]],
            window_counts: vec![8, 0],
            date_range: None,
        }
    }

    #[test]
    fn test_drawdown_csv_layout() {
        let mut out = Vec::new();
        write_drawdown_table(&table(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Horizon,2%,5%,Windows");
        assert_eq!(lines[1], "1 days,12.50,0.00,8");
        // Empty row stays empty rather than 0%
        assert_eq!(lines[2], "5 days,,,0");
    }

    #[test]
    fn test_signal_returns_csv() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let returns = vec![SignalReturn::new(day, 80.0, 100.0).unwrap()];
        let mut out = Vec::new();
        write_signal_returns(&returns, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["Date,Entry Price,Latest Price,% Change", "2024-02-01,80.00,100.00,25.00"]
        );
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drawdown.csv");
        export_to_path(&path, |w| write_drawdown_table(&table(), w)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Horizon,2%,5%,Windows"));
    }
}

//! CSV export for forecast tables.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::ForecastDay;

/// Column header for the per-day forecast export.
const HEADER: &str = "date,day_name,sale_price,competitor_price_avg,\
                      discount_pct,predicted_units,revenue";

/// Exports a forecast table to a CSV file at the given path.
///
/// Writes a header row followed by one data row per day. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(days: &[ForecastDay], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(days, buf)
}

/// Writes a forecast table as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(days: &[ForecastDay], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for d in days {
        let r = &d.record;
        wtr.write_record(&[
            r.date.format("%Y-%m-%d").to_string(),
            r.day_name().to_string(),
            format!("{:.4}", r.sale_price),
            format!("{:.4}", r.competitor_price_avg),
            format!("{:.4}", r.discount_pct),
            format!("{:.4}", d.predicted_units),
            format!("{:.4}", d.revenue),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;
    use crate::sim::types::DailyRecord;

    fn make_day(i: u64) -> ForecastDay {
        let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap() + Days::new(i);
        let mut record = DailyRecord::new("shoe", date, 100.0);
        record.sale_price = 90.0;
        record.competitor_price_avg = 95.0;
        record.discount_pct = 10.0;
        ForecastDay {
            record,
            predicted_units: 12.5,
            revenue: 1125.0,
        }
    }

    #[test]
    fn header_matches_schema() {
        let mut buf = Vec::new();
        write_csv(&[make_day(0)], &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "date,day_name,sale_price,competitor_price_avg,discount_pct,predicted_units,revenue"
        );
    }

    #[test]
    fn row_count_matches_day_count() {
        let days: Vec<ForecastDay> = (0..30).map(make_day).collect();
        let mut buf = Vec::new();
        write_csv(&days, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        assert_eq!(lines.len(), 31);
        assert!(lines[1].starts_with("2025-11-01,Saturday,90.0000"));
    }

    #[test]
    fn deterministic_output() {
        let days: Vec<ForecastDay> = (0..5).map(make_day).collect();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&days, &mut buf1).ok();
        write_csv(&days, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn numeric_columns_parse() {
        let days: Vec<ForecastDay> = (0..3).map(make_day).collect();
        let mut buf = Vec::new();
        write_csv(&days, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let mut rows = 0;
        for record in rdr.records() {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            let rec = rec.unwrap_or_default();
            for i in 2..7 {
                assert!(rec[i].parse::<f64>().is_ok(), "column {i} should parse as f64");
            }
            rows += 1;
        }
        assert_eq!(rows, 3);
    }
}

use thiserror::Error;

use crate::models::{AggregatedSeries, LongRecord, WideTable};
use crate::reshape::Reducer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("not enough records to compute the metric")]
    InsufficientData,
    #[error("previous period value is zero")]
    DivisionByZero,
}

/// Value of the chronologically last record.
pub fn latest_value(series: &AggregatedSeries) -> Result<f64, MetricError> {
    series
        .records
        .last()
        .map(|record| record.value)
        .ok_or(MetricError::InsufficientData)
}

/// Percent change between the two chronologically last records. A zero
/// previous value is reported as `DivisionByZero` rather than
/// producing an infinite or NaN change.
pub fn percent_change(series: &AggregatedSeries) -> Result<f64, MetricError> {
    let len = series.records.len();
    if len < 2 {
        return Err(MetricError::InsufficientData);
    }
    let last = series.records[len - 1].value;
    let previous = series.records[len - 2].value;
    if previous == 0.0 {
        return Err(MetricError::DivisionByZero);
    }
    Ok((last - previous) / previous * 100.0)
}

/// Narrows a wide table to one city by exact state match then exact
/// city match, and melts the result. Multiple matching rows are
/// averaged per date. No match yields an empty series.
pub fn city_series(table: &WideTable, state: &str, city: &str) -> AggregatedSeries {
    let matching: Vec<usize> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.state_name == state && row.region_name == city)
        .map(|(idx, _)| idx)
        .collect();

    if matching.is_empty() {
        return AggregatedSeries::empty(city);
    }

    let records = table
        .real_date_columns()
        .filter_map(|(col_idx, date)| {
            Reducer::Mean
                .apply(matching.iter().map(|&row| table.rows[row].values[col_idx]))
                .map(|value| LongRecord {
                    region: city.to_string(),
                    date,
                    value,
                })
        })
        .collect();
    AggregatedSeries::new(city, records)
}

/// Renders a snapshot dollar amount the way the value boxes expect:
/// rounded to whole dollars, comma-separated thousands.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    let mut digits = rounded.unsigned_abs().to_string();

    let mut insert_at = digits.len() as isize - 3;
    while insert_at > 0 {
        digits.insert(insert_at as usize, ',');
        insert_at -= 3;
    }

    if rounded < 0 {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

/// Renders a percent change with the dashboard's sign convention:
/// non-negative values get a leading "+", negative values a leading
/// "-" followed by the magnitude.
pub fn format_percent_change(change: f64) -> String {
    if change < 0.0 {
        format!("-{:.2}%", change.abs())
    } else {
        format!("+{:.2}%", change)
    }
}

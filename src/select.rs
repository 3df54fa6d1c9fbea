use chrono::NaiveDate;

use crate::models::{AggregatedSeries, LongRecord, WideRow, WideTable, UNITED_STATES};

/// An inclusive calendar-date window. Construction normalizes the
/// bounds, so a reversed pair (as a two-handle slider can produce)
/// selects the same window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Keeps records dated inside `range`, both ends inclusive. Relative
/// order is preserved.
pub fn filter_dates(records: &[LongRecord], range: DateRange) -> Vec<LongRecord> {
    records
        .iter()
        .filter(|record| range.contains(record.date))
        .cloned()
        .collect()
}

/// Applies the date window to every series, keeping empty series so
/// callers can still tell "region exists, window empty" apart from
/// "region unknown".
pub fn filter_series_dates(
    series: Vec<AggregatedSeries>,
    range: DateRange,
) -> Vec<AggregatedSeries> {
    series
        .into_iter()
        .map(|s| {
            let records = filter_dates(&s.records, range);
            AggregatedSeries { records, ..s }
        })
        .collect()
}

/// Narrows to the series named `selected`. The "United States"
/// sentinel passes everything through unfiltered, which is what the
/// multi-state overlay charts want. An unknown name yields an empty
/// result, not an error.
pub fn select_region(series: Vec<AggregatedSeries>, selected: &str) -> Vec<AggregatedSeries> {
    if selected == UNITED_STATES {
        return series;
    }
    series.into_iter().filter(|s| s.name == selected).collect()
}

/// Same selection over raw wide rows, for the tabular views.
pub fn filter_table_rows<'a>(table: &'a WideTable, selected: &str) -> Vec<&'a WideRow> {
    table
        .rows
        .iter()
        .filter(|row| selected == UNITED_STATES || row.state_name == selected)
        .collect()
}

/// Distinct region names for a state, sorted ascending. Feeds the
/// dependent city dropdown; recomputed on every state change.
pub fn cities_for_state(table: &WideTable, state: &str) -> Vec<String> {
    let mut cities: Vec<String> = table
        .rows
        .iter()
        .filter(|row| row.state_name == state)
        .map(|row| row.region_name.clone())
        .collect();
    cities.sort();
    cities.dedup();
    cities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(region: &str, date: NaiveDate, value: f64) -> LongRecord {
        LongRecord {
            region: region.to_string(),
            date,
            value,
        }
    }

    fn sample_records() -> Vec<LongRecord> {
        vec![
            record("CA", date(2021, 1, 1), 100.0),
            record("CA", date(2021, 2, 1), 110.0),
            record("TX", date(2021, 3, 1), 50.0),
        ]
    }

    #[test]
    fn reversed_bounds_select_the_same_window() {
        let records = sample_records();
        let forward = filter_dates(&records, DateRange::new(date(2021, 1, 15), date(2021, 3, 15)));
        let reversed = filter_dates(&records, DateRange::new(date(2021, 3, 15), date(2021, 1, 15)));
        assert_eq!(forward, reversed);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn bounds_are_inclusive() {
        let records = sample_records();
        let range = DateRange::new(date(2021, 1, 1), date(2021, 2, 1));
        let kept = filter_dates(&records, range);
        assert_eq!(kept.len(), 2);

        let one_day_outside = DateRange::new(date(2021, 1, 2), date(2021, 1, 31));
        assert!(filter_dates(&records, one_day_outside).is_empty());
    }

    #[test]
    fn filtering_preserves_order() {
        let records = sample_records();
        let kept = filter_dates(&records, DateRange::new(date(2020, 1, 1), date(2022, 1, 1)));
        assert_eq!(kept, records);
    }

    #[test]
    fn united_states_sentinel_passes_everything_through() {
        let series = vec![
            AggregatedSeries::new("CA", vec![]),
            AggregatedSeries::new("TX", vec![]),
        ];
        let selected = select_region(series.clone(), UNITED_STATES);
        assert_eq!(selected, series);
    }

    #[test]
    fn named_selection_matches_exactly_one_series() {
        let series = vec![
            AggregatedSeries::new("CA", vec![record("CA", date(2021, 1, 1), 100.0)]),
            AggregatedSeries::new("TX", vec![record("TX", date(2021, 1, 1), 50.0)]),
        ];
        let selected = select_region(series.clone(), "TX");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "TX");

        assert!(select_region(series, "Narnia").is_empty());
    }

    use crate::models::{DateColumn, WideRow, WideTable};

    fn city_table() -> WideTable {
        let row = |name: &str, state: &str| WideRow {
            region_id: "0".to_string(),
            metadata: Vec::new(),
            region_name: name.to_string(),
            region_type: "city".to_string(),
            state_name: state.to_string(),
            values: Vec::new(),
        };
        WideTable {
            metadata_columns: Vec::new(),
            date_columns: Vec::<DateColumn>::new(),
            rows: vec![
                row("San Diego", "CA"),
                row("Fresno", "CA"),
                row("San Diego", "CA"),
                row("Austin", "TX"),
            ],
        }
    }

    #[test]
    fn city_list_is_sorted_deduplicated_and_idempotent() {
        let table = city_table();
        let first = cities_for_state(&table, "CA");
        assert_eq!(first, vec!["Fresno", "San Diego"]);
        assert_eq!(cities_for_state(&table, "CA"), first);
        assert!(cities_for_state(&table, "WY").is_empty());
    }

    #[test]
    fn table_rows_follow_the_same_selection_rules() {
        let table = city_table();
        assert_eq!(filter_table_rows(&table, UNITED_STATES).len(), 4);

        let ca = filter_table_rows(&table, "CA");
        assert_eq!(ca.len(), 3);
        assert!(ca.iter().all(|row| row.state_name == "CA"));

        assert!(filter_table_rows(&table, "WY").is_empty());
    }
}

use std::collections::HashMap;

use crate::models::{AggregatedSeries, LongRecord, WideTable, UNITED_STATES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    State,
    Country,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Sum,
}

impl Reducer {
    /// Reduces the present observations of one date column across a
    /// group of rows. `Sum` treats missing cells as contributing
    /// nothing; `Mean` averages only the present cells and yields
    /// `None` when the whole column is missing for the group.
    pub(crate) fn apply(self, values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
        let mut total = 0.0;
        let mut present = 0usize;
        for value in values.flatten() {
            total += value;
            present += 1;
        }
        match self {
            Reducer::Sum => Some(total),
            Reducer::Mean if present > 0 => Some(total / present as f64),
            Reducer::Mean => None,
        }
    }
}

/// Melts a wide table into long-format series, one per group.
///
/// `GroupBy::State` buckets rows by `StateName` and reduces each date
/// column per bucket; `GroupBy::Country` keeps only `RegionType ==
/// "country"` rows under the synthetic "United States" label. Artifact
/// columns never produce records, and every series comes out sorted by
/// date ascending.
pub fn reshape(table: &WideTable, group_by: GroupBy, reducer: Reducer) -> Vec<AggregatedSeries> {
    if table.real_date_columns().next().is_none() {
        return Vec::new();
    }

    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let key = match group_by {
            GroupBy::State if !row.state_name.is_empty() => row.state_name.as_str(),
            GroupBy::Country if row.region_type == "country" => UNITED_STATES,
            _ => continue,
        };
        groups.entry(key).or_default().push(row_idx);
    }

    let mut series: Vec<AggregatedSeries> = groups
        .into_iter()
        .map(|(name, row_indices)| {
            let records = table
                .real_date_columns()
                .filter_map(|(col_idx, date)| {
                    reducer
                        .apply(row_indices.iter().map(|&row| table.rows[row].values[col_idx]))
                        .map(|value| LongRecord {
                            region: name.to_string(),
                            date,
                            value,
                        })
                })
                .collect();
            AggregatedSeries::new(name, records)
        })
        .collect();

    series.sort_by(|a, b| a.name.cmp(&b.name));
    series
}

/// The full state-level view: every per-state series plus the country
/// aggregate appended last.
pub fn state_level_series(table: &WideTable, reducer: Reducer) -> Vec<AggregatedSeries> {
    let mut series = reshape(table, GroupBy::State, reducer);
    series.extend(reshape(table, GroupBy::Country, reducer));
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateColumn, WideRow};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(
        name: &str,
        region_type: &str,
        state: &str,
        values: Vec<Option<f64>>,
    ) -> WideRow {
        WideRow {
            region_id: "0".to_string(),
            metadata: Vec::new(),
            region_name: name.to_string(),
            region_type: region_type.to_string(),
            state_name: state.to_string(),
            values,
        }
    }

    fn sample_table() -> WideTable {
        WideTable {
            metadata_columns: Vec::new(),
            date_columns: vec![
                DateColumn {
                    label: "2021-01-01".to_string(),
                    date: Some(date(2021, 1, 1)),
                },
                DateColumn {
                    label: "2021-02-01".to_string(),
                    date: Some(date(2021, 2, 1)),
                },
            ],
            rows: vec![
                row("United States", "country", "", vec![Some(75.0), Some(75.0)]),
                row("Los Angeles", "city", "CA", vec![Some(90.0), Some(100.0)]),
                row("San Diego", "city", "CA", vec![Some(110.0), Some(120.0)]),
                row("Austin", "city", "TX", vec![Some(50.0), Some(40.0)]),
            ],
        }
    }

    #[test]
    fn state_grouping_reduces_with_mean() {
        let series = reshape(&sample_table(), GroupBy::State, Reducer::Mean);
        assert_eq!(series.len(), 2);
        let ca = &series[0];
        assert_eq!(ca.name, "CA");
        assert_eq!(ca.records[0].value, 100.0);
        assert_eq!(ca.records[1].value, 110.0);
        let tx = &series[1];
        assert_eq!(tx.name, "TX");
        assert_eq!(tx.records[1].value, 40.0);
    }

    #[test]
    fn state_grouping_reduces_with_sum() {
        let series = reshape(&sample_table(), GroupBy::State, Reducer::Sum);
        let ca = series.iter().find(|s| s.name == "CA").unwrap();
        assert_eq!(ca.records[0].value, 200.0);
        assert_eq!(ca.records[1].value, 220.0);
    }

    #[test]
    fn country_grouping_is_labeled_united_states() {
        let series = reshape(&sample_table(), GroupBy::Country, Reducer::Mean);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, UNITED_STATES);
        assert_eq!(series[0].records.len(), 2);
        assert_eq!(series[0].records[0].value, 75.0);
    }

    #[test]
    fn one_record_per_region_per_real_date_column() {
        let mut table = sample_table();
        table.date_columns.push(DateColumn {
            label: "index".to_string(),
            date: None,
        });
        for row in &mut table.rows {
            row.values.push(Some(999.0));
        }

        let real_columns = table.real_date_columns().count();
        for series in state_level_series(&table, Reducer::Mean) {
            assert_eq!(series.records.len(), real_columns);
            assert!(series.records.iter().all(|r| r.value != 999.0));
        }
    }

    #[test]
    fn missing_cells_are_skipped_by_mean() {
        let mut table = sample_table();
        table.rows[1].values[0] = None;
        let series = reshape(&table, GroupBy::State, Reducer::Mean);
        let ca = series.iter().find(|s| s.name == "CA").unwrap();
        // Only San Diego reports in January.
        assert_eq!(ca.records[0].value, 110.0);
    }

    #[test]
    fn zero_date_columns_yield_no_series() {
        let table = WideTable {
            metadata_columns: Vec::new(),
            date_columns: Vec::new(),
            rows: vec![row("Austin", "city", "TX", Vec::new())],
        };
        assert!(reshape(&table, GroupBy::State, Reducer::Mean).is_empty());
    }

    #[test]
    fn state_level_view_is_states_plus_country() {
        let series = state_level_series(&sample_table(), Reducer::Mean);
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["CA", "TX", UNITED_STATES]);
    }

    #[test]
    fn records_come_out_date_sorted() {
        let mut table = sample_table();
        table.date_columns.reverse();
        for row in &mut table.rows {
            row.values.reverse();
        }
        let series = reshape(&table, GroupBy::State, Reducer::Mean);
        for s in &series {
            assert!(s.records.windows(2).all(|w| w[0].date <= w[1].date));
        }
    }
}

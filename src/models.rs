use chrono::NaiveDate;
use serde::Serialize;

/// Column offset where the date-labeled snapshot columns begin in the
/// Zillow extracts. Everything before it is region metadata.
pub const DATE_COLUMNS_START: usize = 6;

/// Label of the synthetic country-wide series, and the selector
/// sentinel that means "no region filter".
pub const UNITED_STATES: &str = "United States";

/// One date-labeled column of a wide table. `date` is `None` for the
/// literal "index" label, a reshaping artifact that must never become
/// a record.
#[derive(Debug, Clone)]
pub struct DateColumn {
    pub label: String,
    pub date: Option<NaiveDate>,
}

/// One region row of a wide table. `values` is parallel to the table's
/// `date_columns`; `None` marks a missing observation.
#[derive(Debug, Clone)]
pub struct WideRow {
    pub region_id: String,
    pub region_name: String,
    pub region_type: String,
    pub state_name: String,
    pub metadata: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// A wide-format table: one row per region, one column per reporting
/// date. Built once at load and never mutated.
#[derive(Debug, Clone)]
pub struct WideTable {
    pub metadata_columns: Vec<String>,
    pub date_columns: Vec<DateColumn>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    /// Date columns that carry a real calendar date, paired with their
    /// positions in each row's `values`.
    pub fn real_date_columns(&self) -> impl Iterator<Item = (usize, NaiveDate)> + '_ {
        self.date_columns
            .iter()
            .enumerate()
            .filter_map(|(idx, col)| col.date.map(|date| (idx, date)))
    }
}

/// The melted unit: one (region, date, value) observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub region: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// A long-format series for one logical region, records sorted by date
/// ascending. The sort is established at construction; latest/previous
/// lookups depend on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSeries {
    pub name: String,
    pub records: Vec<LongRecord>,
}

impl AggregatedSeries {
    pub fn new(name: impl Into<String>, mut records: Vec<LongRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

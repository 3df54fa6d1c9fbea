use std::fmt::Write;

use crate::metrics::{self, MetricError};
use crate::models::{AggregatedSeries, UNITED_STATES};
use crate::reshape::{state_level_series, Reducer};
use crate::select::{self, DateRange};
use crate::store::{Dataset, DatasetStore};

pub const NO_DATA: &str = "No data available";
pub const NOT_ENOUGH_DATA: &str = "Not enough data for comparison";

/// One rendered value box: a label and its display string. Metric
/// errors never cross this boundary; they become placeholders here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueBox {
    pub label: String,
    pub value: String,
}

fn latest_or_placeholder(series: &AggregatedSeries) -> String {
    match metrics::latest_value(series) {
        Ok(value) => metrics::format_currency(value),
        Err(MetricError::InsufficientData | MetricError::DivisionByZero) => NO_DATA.to_string(),
    }
}

fn change_or_placeholder(series: &AggregatedSeries) -> String {
    match metrics::percent_change(series) {
        Ok(change) => metrics::format_percent_change(change),
        Err(MetricError::InsufficientData) => NOT_ENOUGH_DATA.to_string(),
        Err(MetricError::DivisionByZero) => NO_DATA.to_string(),
    }
}

fn state_series(
    store: &DatasetStore,
    dataset: Dataset,
    reducer: Reducer,
    state: &str,
) -> AggregatedSeries {
    let series = state_level_series(store.table(dataset), reducer);
    select::select_region(series, state)
        .into_iter()
        .find(|s| s.name == state)
        .unwrap_or_else(|| AggregatedSeries::empty(state))
}

/// The four dashboard value boxes for one state/city selection. Prices
/// come from the median-list-price table averaged per state; inventory
/// change comes from the for-sale-inventory table summed per state.
pub fn value_boxes(store: &DatasetStore, state: &str, city: Option<&str>) -> Vec<ValueBox> {
    let price = state_series(store, Dataset::MedianListPrice, Reducer::Mean, state);
    let inventory = state_series(store, Dataset::ForSaleInventory, Reducer::Sum, state);

    let mut boxes = vec![
        ValueBox {
            label: "Current Median List Price (State)".to_string(),
            value: latest_or_placeholder(&price),
        },
        ValueBox {
            label: "Home Inventory % Change (State)".to_string(),
            value: change_or_placeholder(&inventory),
        },
    ];

    if let Some(city) = city {
        let city_price = metrics::city_series(store.table(Dataset::MedianListPrice), state, city);
        let city_inventory =
            metrics::city_series(store.table(Dataset::ForSaleInventory), state, city);
        boxes.push(ValueBox {
            label: "Current Median List Price (City)".to_string(),
            value: latest_or_placeholder(&city_price),
        });
        boxes.push(ValueBox {
            label: "Home Inventory % Change (City)".to_string(),
            value: change_or_placeholder(&city_inventory),
        });
    }

    boxes
}

/// Chart-ready series for one dataset: state-level view (mean for
/// prices, sum for counts), date-filtered, then region-selected.
pub fn chart_series(
    store: &DatasetStore,
    dataset: Dataset,
    state: &str,
    range: DateRange,
) -> Vec<AggregatedSeries> {
    let reducer = match dataset {
        Dataset::MedianListPrice => Reducer::Mean,
        Dataset::ForSaleInventory | Dataset::NewListings => Reducer::Sum,
    };
    let series = state_level_series(store.table(dataset), reducer);
    let series = select::filter_series_dates(series, range);
    select::select_region(series, state)
}

/// A markdown dashboard for one selection: value boxes, one section
/// per dataset with the windowed series, and the dependent city list.
pub fn build_report(
    store: &DatasetStore,
    state: &str,
    city: Option<&str>,
    range: DateRange,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# US Housing Dashboard");
    let _ = writeln!(
        output,
        "Selection: {} / {} ({} to {})",
        state,
        city.unwrap_or("all cities"),
        range.start(),
        range.end()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Figures");
    for value_box in value_boxes(store, state, city) {
        let _ = writeln!(output, "- {}: {}", value_box.label, value_box.value);
    }

    for dataset in [
        Dataset::MedianListPrice,
        Dataset::ForSaleInventory,
        Dataset::NewListings,
    ] {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", dataset.title());

        let series = chart_series(store, dataset, state, range);
        if series.iter().all(|s| s.is_empty()) {
            let _ = writeln!(output, "{NO_DATA}");
            continue;
        }
        for s in series.iter().filter(|s| !s.is_empty()) {
            let first = &s.records[0];
            let last = &s.records[s.records.len() - 1];
            let _ = writeln!(
                output,
                "- {}: {} observations from {} to {}, latest {:.0}",
                s.name,
                s.records.len(),
                first.date,
                last.date,
                last.value
            );
        }
    }

    if state != UNITED_STATES {
        let cities = select::cities_for_state(store.table(Dataset::MedianListPrice), state);
        let _ = writeln!(output);
        let _ = writeln!(output, "## Cities in {state}");
        if cities.is_empty() {
            let _ = writeln!(output, "{NO_DATA}");
        } else {
            for city in cities {
                let _ = writeln!(output, "- {city}");
            }
        }
    }

    output
}

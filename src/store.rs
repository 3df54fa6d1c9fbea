use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use clap::ValueEnum;

use crate::models::{DateColumn, WideRow, WideTable, DATE_COLUMNS_START};

/// Label pandas leaves behind when a reset index gets melted along with
/// the date columns. Tolerated in headers, excluded from output.
pub const INDEX_ARTIFACT: &str = "index";

const REQUIRED_PREFIX: [&str; 4] = ["RegionID", "RegionName", "RegionType", "StateName"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    MedianListPrice,
    ForSaleInventory,
    NewListings,
}

impl Dataset {
    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::MedianListPrice => "ZillowDataMedianListPricetoJan2025.csv",
            Dataset::ForSaleInventory => "ZillowDataInventorytoJan2025.csv",
            Dataset::NewListings => "ZillowDataNewListingsto2025.csv",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Dataset::MedianListPrice => "Median List Price",
            Dataset::ForSaleInventory => "Home Inventory",
            Dataset::NewListings => "New Listings",
        }
    }
}

/// The three wide tables, loaded once at startup and shared read-only
/// by every pipeline invocation.
#[derive(Debug)]
pub struct DatasetStore {
    pub median_list_price: WideTable,
    pub for_sale_inventory: WideTable,
    pub new_listings: WideTable,
}

impl DatasetStore {
    /// Loads all three extracts from `dir`. Any missing file or
    /// malformed header is fatal; there is no partial-data mode.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            median_list_price: load_table(dir, Dataset::MedianListPrice)?,
            for_sale_inventory: load_table(dir, Dataset::ForSaleInventory)?,
            new_listings: load_table(dir, Dataset::NewListings)?,
        })
    }

    pub fn table(&self, dataset: Dataset) -> &WideTable {
        match dataset {
            Dataset::MedianListPrice => &self.median_list_price,
            Dataset::ForSaleInventory => &self.for_sale_inventory,
            Dataset::NewListings => &self.new_listings,
        }
    }
}

fn load_table(dir: &Path, dataset: Dataset) -> anyhow::Result<WideTable> {
    let path = dir.join(dataset.file_name());
    let file = std::fs::File::open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_wide_table(file).with_context(|| format!("malformed table in {}", path.display()))
}

/// Parses a wide-format extract: a fixed four-column region prefix, two
/// metadata columns, then one column per ISO reporting date.
pub fn read_wide_table(input: impl Read) -> anyhow::Result<WideTable> {
    let mut reader = csv::Reader::from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.len() < DATE_COLUMNS_START {
        anyhow::bail!(
            "header has {} columns, expected at least {}",
            headers.len(),
            DATE_COLUMNS_START
        );
    }
    for (idx, expected) in REQUIRED_PREFIX.iter().enumerate() {
        let found = &headers[idx];
        if found != *expected {
            anyhow::bail!("expected column {idx} to be {expected}, found {found}");
        }
    }

    let metadata_columns: Vec<String> = headers
        .iter()
        .take(DATE_COLUMNS_START)
        .skip(REQUIRED_PREFIX.len())
        .map(|label| label.to_string())
        .collect();

    let mut date_columns = Vec::new();
    for label in headers.iter().skip(DATE_COLUMNS_START) {
        let date = if label == INDEX_ARTIFACT {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(label, "%Y-%m-%d")
                    .with_context(|| format!("date column label {label} is not an ISO date"))?,
            )
        };
        date_columns.push(DateColumn {
            label: label.to_string(),
            date,
        });
    }

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let mut values = Vec::with_capacity(date_columns.len());
        for field in record.iter().skip(DATE_COLUMNS_START) {
            if field.is_empty() {
                values.push(None);
            } else {
                let value: f64 = field
                    .parse()
                    .with_context(|| format!("row {}: bad numeric cell {field}", line + 2))?;
                values.push(Some(value));
            }
        }

        rows.push(WideRow {
            region_id: record[0].to_string(),
            region_name: record[1].to_string(),
            region_type: record[2].to_string(),
            state_name: record[3].to_string(),
            metadata: record
                .iter()
                .take(DATE_COLUMNS_START)
                .skip(REQUIRED_PREFIX.len())
                .map(|field| field.to_string())
                .collect(),
            values,
        });
    }

    Ok(WideTable {
        metadata_columns,
        date_columns,
        rows,
    })
}

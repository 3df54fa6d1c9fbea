use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod metrics;
mod models;
mod report;
mod reshape;
mod select;
mod store;

use models::LongRecord;
use select::DateRange;
use store::{Dataset, DatasetStore};

// Slider bounds of the dashboard: the extracts cover Jan 2020 through
// Jan 2025.
const RANGE_MIN: &str = "2020-01-31";
const RANGE_MAX: &str = "2025-01-31";

#[derive(Parser)]
#[command(name = "housing-market-dashboard")]
#[command(about = "US housing market dashboard over Zillow extracts", long_about = None)]
struct Cli {
    /// Directory holding the three Zillow CSV extracts
    #[arg(long, default_value = "Data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard value boxes for a selection
    Summary {
        #[arg(long, default_value = models::UNITED_STATES)]
        state: String,
        #[arg(long)]
        city: Option<String>,
    },
    /// List the cities available for a state
    Cities {
        #[arg(long)]
        state: String,
    },
    /// Emit chart-ready long-format records as JSON
    Chart {
        #[arg(long, value_enum)]
        dataset: Dataset,
        #[arg(long, default_value = models::UNITED_STATES)]
        state: String,
        #[arg(long, default_value = RANGE_MIN)]
        start: NaiveDate,
        #[arg(long, default_value = RANGE_MAX)]
        end: NaiveDate,
    },
    /// Print the region-filtered wide table as CSV
    Table {
        #[arg(long, value_enum)]
        dataset: Dataset,
        #[arg(long, default_value = models::UNITED_STATES)]
        state: String,
    },
    /// Generate a markdown dashboard report
    Report {
        #[arg(long, default_value = models::UNITED_STATES)]
        state: String,
        #[arg(long)]
        city: Option<String>,
        #[arg(long, default_value = RANGE_MIN)]
        start: NaiveDate,
        #[arg(long, default_value = RANGE_MAX)]
        end: NaiveDate,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let store = DatasetStore::load(&cli.data_dir)
        .with_context(|| format!("failed to load datasets from {}", cli.data_dir.display()))?;

    match cli.command {
        Commands::Summary { state, city } => {
            for value_box in report::value_boxes(&store, &state, city.as_deref()) {
                println!("{}: {}", value_box.label, value_box.value);
            }
        }
        Commands::Cities { state } => {
            let cities =
                select::cities_for_state(store.table(Dataset::MedianListPrice), &state);
            if cities.is_empty() {
                println!("No cities found for {state}.");
            } else {
                for city in cities {
                    println!("{city}");
                }
            }
        }
        Commands::Chart {
            dataset,
            state,
            start,
            end,
        } => {
            let range = DateRange::new(start, end);
            let records: Vec<LongRecord> = report::chart_series(&store, dataset, &state, range)
                .into_iter()
                .flat_map(|series| series.records)
                .collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Table { dataset, state } => {
            let table = store.table(dataset);
            let rows = select::filter_table_rows(table, &state);

            let mut writer = csv::Writer::from_writer(std::io::stdout());
            let mut header = vec![
                "RegionID".to_string(),
                "RegionName".to_string(),
                "RegionType".to_string(),
                "StateName".to_string(),
            ];
            header.extend(table.metadata_columns.iter().cloned());
            header.extend(table.date_columns.iter().map(|col| col.label.clone()));
            writer.write_record(&header)?;

            for row in rows {
                let mut fields = vec![
                    row.region_id.clone(),
                    row.region_name.clone(),
                    row.region_type.clone(),
                    row.state_name.clone(),
                ];
                fields.extend(row.metadata.iter().cloned());
                fields.extend(
                    row.values
                        .iter()
                        .map(|value| value.map(|v| v.to_string()).unwrap_or_default()),
                );
                writer.write_record(&fields)?;
            }
            writer.flush()?;
        }
        Commands::Report {
            state,
            city,
            start,
            end,
            out,
        } => {
            let range = DateRange::new(start, end);
            let rendered = report::build_report(&store, &state, city.as_deref(), range);
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

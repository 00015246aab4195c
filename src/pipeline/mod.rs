// Data processing pipeline: load, inspect, coerce, filter, join and save

pub mod ingestion;
pub mod processing;
pub mod storage;

use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::table::Table;
use crate::types::{CleanedOrder, MasterRow};

use ingestion::{load_sources, LoadOptions};
use processing::filter::{dedup_all, filter_completed, DedupReport};
use processing::inspect::{inspect_sources, preview, InspectionReport};
use processing::join::{attach_totals, build_master, fill_defaults, order_totals, FillDefaults};
use processing::normalize::{normalize, CoercionReport, TypedTables};

/// Tables produced by a run, before they are written.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub cleaned_orders: Table<CleanedOrder>,
    pub master: Table<MasterRow>,
}

/// What a complete run did, stage by stage.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub inspection: InspectionReport,
    pub coercion: CoercionReport,
    pub orders_completed: usize,
    pub orders_dropped: usize,
    pub duplicates: DedupReport,
    pub master_rows: usize,
    pub cleaned_orders_path: PathBuf,
    pub master_path: PathBuf,
    pub duration_secs: f64,
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stages 1 to 5 without touching the output directory.
    pub fn transform(&self) -> Result<(PipelineOutput, PipelineReport)> {
        let started = Instant::now();
        let cleaning = &self.config.cleaning;

        // Step 1: Load
        let sources = load_sources(&self.config.input, &LoadOptions::from_config(&self.config))?;

        // Step 2: Inspect
        let inspection = inspect_sources(&sources, self.config.inspect.preview_rows);

        println!("\n=======================");
        println!("STEP 3: DATA CLEANING");
        println!("=======================\n");

        // Step 3: Coerce types
        let (typed, coercion) = normalize(sources);
        println!("✔️ Converted date and time columns.");
        println!("✔️ Numeric columns cleaned.");
        if coercion.total() > 0 {
            println!("   {} unparseable values set to missing", coercion.total());
        }

        // Step 4: Filter and dedup
        let TypedTables {
            customers,
            products,
            stores,
            orders,
            order_items,
        } = typed;
        let (completed, orders_dropped) = filter_completed(orders, &cleaning.completed_status);
        println!(
            "\n✔️ Kept only completed orders: {} rows remain.\n",
            completed.len()
        );
        let (tables, duplicates) = dedup_all(TypedTables {
            customers,
            products,
            stores,
            orders: completed,
            order_items,
        });
        for (table, removed) in &duplicates.removed {
            println!("✔️ {}: {} duplicates removed.", table, removed);
        }

        // Step 5: Join and aggregate
        let master = build_master(
            &tables.order_items,
            &tables.orders,
            &tables.products,
            &tables.customers,
            &tables.stores,
        );
        let (rows, columns) = master.shape();
        println!("\n✔️ Final merged data shape: ({}, {})\n", rows, columns);

        let totals = order_totals(&tables.order_items);
        let cleaned_orders = attach_totals(tables.orders, &totals);

        let defaults = FillDefaults {
            shipping_delay_days: cleaning.default_shipping_delay_days,
            payment_method: cleaning.default_payment_method.clone(),
        };
        let master = fill_defaults(master, &defaults);
        println!("✔️ Missing values handled.\n");

        let report = PipelineReport {
            inspection,
            coercion,
            orders_completed: cleaned_orders.len(),
            orders_dropped,
            duplicates,
            master_rows: master.len(),
            cleaned_orders_path: self.config.output.cleaned_orders_path(),
            master_path: self.config.output.master_path(),
            duration_secs: started.elapsed().as_secs_f64(),
        };

        Ok((
            PipelineOutput {
                cleaned_orders,
                master,
            },
            report,
        ))
    }

    /// Run every stage and write both output files.
    #[instrument(skip(self))]
    pub fn run(&self) -> Result<PipelineReport> {
        info!("🚀 Starting coffee sales pipeline");
        let started = Instant::now();
        let (output, mut report) = self.transform()?;

        storage::write_table(&report.cleaned_orders_path, &output.cleaned_orders)?;
        storage::write_table(&report.master_path, &output.master)?;

        println!("🎉 Data cleaning completed successfully!");
        println!("📁 Saved files:");
        println!("   → {}", report.cleaned_orders_path.display());
        println!("   → {}\n", report.master_path.display());

        println!("🔍 Sample of cleaned merged data:");
        println!(
            "{}",
            preview(&output.master, self.config.inspect.preview_rows)
        );

        report.duration_secs = started.elapsed().as_secs_f64();
        info!(
            master_rows = report.master_rows,
            cleaned_orders = report.orders_completed,
            duration_secs = report.duration_secs,
            "✅ Pipeline finished"
        );
        Ok(report)
    }
}

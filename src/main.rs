use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use coffee_sales_etl::config::Config;
use coffee_sales_etl::logging;
use coffee_sales_etl::pipeline::{Pipeline, PipelineReport};

#[derive(Parser)]
#[command(name = "coffee_sales_etl")]
#[command(about = "Clean and join the coffee sales exports into cleaned_orders.csv and coffee_sales_master.csv")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (TOML). Defaults to ./etl.toml when it exists
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding customers.csv, products.csv, stores.csv, orders.csv and order_items.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the two output files are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Rows shown in each table preview
    #[arg(long)]
    preview_rows: Option<usize>,

    /// Also write JSON logs, rotated daily, into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::load_or_default().context("loading etl.toml")?,
        };
        if let Some(dir) = self.data_dir {
            config.input.data_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output.dir = dir;
        }
        if let Some(rows) = self.preview_rows {
            config.inspect.preview_rows = rows;
        }
        Ok(config)
    }
}

fn print_summary(report: &PipelineReport) {
    println!("\n📊 Pipeline Results:");
    println!("   Missing source cells: {}", report.inspection.total_missing());
    if let Some(orders) = report.inspection.get("orders") {
        println!("   Source orders: {}", orders.rows);
    }
    println!("   Completed orders: {}", report.orders_completed);
    println!("   Orders dropped by status: {}", report.orders_dropped);
    println!("   Duplicates removed: {}", report.duplicates.total());
    println!("   Unparseable values: {}", report.coercion.total());
    println!("   Master rows: {}", report.master_rows);
    println!("   Duration: {:.2}s", report.duration_secs);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.log_dir.as_deref()).context("initializing logging")?;

    let pipeline = Pipeline::new(cli.into_config()?);
    let config = pipeline.config();
    info!(
        data_dir = %config.input.data_dir.display(),
        output_dir = %config.output.dir.display(),
        "Configuration loaded"
    );

    match pipeline.run() {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(e) => {
            error!("❌ Pipeline failed: {}", e);
            Err(e).context("coffee sales pipeline failed")
        }
    }
}

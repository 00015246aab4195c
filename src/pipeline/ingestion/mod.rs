// Pipeline ingestion: reads the five source exports into typed raw tables

use csv::{ReaderBuilder, StringRecord};
use metrics::counter;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::config::{Config, InputConfig};
use crate::constants;
use crate::error::{EtlError, Result};
use crate::table::{Record, Table};
use crate::types::{RawCustomer, RawOrder, RawOrderItem, RawProduct, RawStore};

/// A record shape that can be built from one CSV row of a source export.
pub trait SourceRecord: Record {
    /// Table name used in logs and header errors
    const TABLE: &'static str;
    /// Columns that must be present in the header; the rest of
    /// `Record::COLUMNS` may be absent and load as missing.
    const REQUIRED: &'static [&'static str];

    fn from_row(row: &RowView<'_>) -> Self;
}

/// Settings that decide how headers are checked and which cells count as missing.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub allow_extra_columns: bool,
    pub missing_markers: HashSet<String>,
}

impl LoadOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allow_extra_columns: config.schema.allow_extra_columns,
            missing_markers: config.cleaning.missing_markers.iter().cloned().collect(),
        }
    }

    fn is_missing(&self, value: &str) -> bool {
        self.missing_markers.contains(value)
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// One CSV row seen through the known columns of a record shape.
pub struct RowView<'a> {
    columns: &'static [&'static str],
    positions: &'a [Option<usize>],
    record: &'a StringRecord,
    options: &'a LoadOptions,
}

impl RowView<'_> {
    /// Cell text, `None` when the column is absent or the cell is a missing marker.
    pub fn text(&self, column: &str) -> Option<String> {
        let idx = self.columns.iter().position(|c| *c == column)?;
        let pos = self.positions.get(idx).copied().flatten()?;
        let value = self.record.get(pos)?;
        if self.options.is_missing(value) {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Key cell; a missing key becomes the empty string, which matches no real
    /// key and still renders as a missing cell.
    pub fn key(&self, column: &str) -> String {
        self.text(column).unwrap_or_default()
    }
}

/// Map each known column to its position in the header, rejecting headers the
/// record shape cannot take.
fn resolve_header<R: SourceRecord>(
    headers: &StringRecord,
    options: &LoadOptions,
) -> Result<Vec<Option<usize>>> {
    let mut seen = HashSet::new();
    for name in headers.iter() {
        if !seen.insert(name) {
            return Err(EtlError::DuplicateColumn {
                table: R::TABLE.to_string(),
                column: name.to_string(),
            });
        }
        if !R::COLUMNS.iter().any(|c| *c == name) {
            if options.allow_extra_columns {
                warn!(table = R::TABLE, column = name, "Ignoring unexpected column");
            } else {
                return Err(EtlError::UnexpectedColumn {
                    table: R::TABLE.to_string(),
                    column: name.to_string(),
                });
            }
        }
    }

    for required in R::REQUIRED {
        if !seen.contains(*required) {
            return Err(EtlError::MissingColumn {
                table: R::TABLE.to_string(),
                column: required.to_string(),
            });
        }
    }

    Ok(R::COLUMNS
        .iter()
        .map(|column| headers.iter().position(|h| h == *column))
        .collect())
}

/// Read one source export into a table of `R`.
#[instrument(skip(options), fields(table = R::TABLE))]
pub fn load_table<R: SourceRecord>(path: &Path, options: &LoadOptions) -> Result<Table<R>> {
    let file = File::open(path).map_err(|e| EtlError::io(path, e))?;
    // Short rows load with their trailing cells missing; long rows are rejected below
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| EtlError::csv(path, e))?
        .clone();
    let positions = resolve_header::<R>(&headers, options)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| EtlError::csv(path, e))?;
        if record.len() > headers.len() {
            return Err(EtlError::TooManyFields {
                path: path.to_path_buf(),
                line: record.position().map_or(0, |p| p.line()),
                expected: headers.len(),
                found: record.len(),
            });
        }
        let view = RowView {
            columns: R::COLUMNS,
            positions: &positions,
            record: &record,
            options,
        };
        rows.push(R::from_row(&view));
    }

    info!(rows = rows.len(), path = %path.display(), "Loaded table");
    counter!("etl_rows_loaded_total", "table" => R::TABLE).increment(rows.len() as u64);
    let present = positions.iter().map(Option::is_some).collect();
    Ok(Table::with_columns(R::TABLE, rows, present))
}

/// The five source exports, as loaded.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub customers: Table<RawCustomer>,
    pub products: Table<RawProduct>,
    pub stores: Table<RawStore>,
    pub orders: Table<RawOrder>,
    pub order_items: Table<RawOrderItem>,
}

/// Load every source export from the configured data directory.
pub fn load_sources(input: &InputConfig, options: &LoadOptions) -> Result<SourceTables> {
    Ok(SourceTables {
        customers: load_table(&input.path(&input.customers), options)?,
        products: load_table(&input.path(&input.products), options)?,
        stores: load_table(&input.path(&input.stores), options)?,
        orders: load_table(&input.path(&input.orders), options)?,
        order_items: load_table(&input.path(&input.order_items), options)?,
    })
}

impl SourceRecord for RawCustomer {
    const TABLE: &'static str = constants::CUSTOMERS_TABLE;
    const REQUIRED: &'static [&'static str] = Self::COLUMNS;

    fn from_row(row: &RowView<'_>) -> Self {
        Self {
            customer_id: row.key("customer_id"),
            signup_date: row.text("signup_date"),
            country: row.text("country"),
            city: row.text("city"),
            loyalty_member: row.text("loyalty_member"),
        }
    }
}

impl SourceRecord for RawProduct {
    const TABLE: &'static str = constants::PRODUCTS_TABLE;
    const REQUIRED: &'static [&'static str] = Self::COLUMNS;

    fn from_row(row: &RowView<'_>) -> Self {
        Self {
            product_id: row.key("product_id"),
            product_name: row.text("product_name"),
            category: row.text("category"),
            unit_price: row.text("unit_price"),
        }
    }
}

impl SourceRecord for RawStore {
    const TABLE: &'static str = constants::STORES_TABLE;
    const REQUIRED: &'static [&'static str] = Self::COLUMNS;

    fn from_row(row: &RowView<'_>) -> Self {
        Self {
            store_id: row.key("store_id"),
            store_name: row.text("store_name"),
            store_type: row.text("store_type"),
            country: row.text("country"),
            opened_date: row.text("opened_date"),
        }
    }
}

impl SourceRecord for RawOrder {
    const TABLE: &'static str = constants::ORDERS_TABLE;
    // payment_method and shipping_delay_days are not in every export
    const REQUIRED: &'static [&'static str] = &[
        "order_id",
        "customer_id",
        "store_id",
        "order_date",
        "order_time",
        "order_status",
    ];

    fn from_row(row: &RowView<'_>) -> Self {
        Self {
            order_id: row.key("order_id"),
            customer_id: row.key("customer_id"),
            store_id: row.key("store_id"),
            order_date: row.text("order_date"),
            order_time: row.text("order_time"),
            order_status: row.text("order_status"),
            payment_method: row.text("payment_method"),
            shipping_delay_days: row.text("shipping_delay_days"),
        }
    }
}

impl SourceRecord for RawOrderItem {
    const TABLE: &'static str = constants::ORDER_ITEMS_TABLE;
    const REQUIRED: &'static [&'static str] = &[
        "order_id",
        "product_id",
        "quantity",
        "unit_price",
        "total_price",
    ];

    fn from_row(row: &RowView<'_>) -> Self {
        Self {
            order_item_id: row.text("order_item_id"),
            order_id: row.key("order_id"),
            product_id: row.key("product_id"),
            quantity: row.text("quantity"),
            unit_price: row.text("unit_price"),
            total_price: row.text("total_price"),
        }
    }
}

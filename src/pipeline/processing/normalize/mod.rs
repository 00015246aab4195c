use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use metrics::counter;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::constants::{self, DATETIME_FORMATS, DATE_FORMATS, TIME_FORMAT};
use crate::pipeline::ingestion::SourceTables;
use crate::table::Table;
use crate::types::{Customer, Order, OrderItem, Product, Store};

/// Parse a date cell. Date-time values keep only their date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Parse a time-of-day cell, `HH:MM:SS` only.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).ok()
}

/// Parse a numeric cell. `NaN` counts as missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Typed tables after coercion.
#[derive(Debug, Clone)]
pub struct TypedTables {
    pub customers: Table<Customer>,
    pub products: Table<Product>,
    pub stores: Table<Store>,
    pub orders: Table<Order>,
    pub order_items: Table<OrderItem>,
}

/// Cells that held a value which could not be parsed, per (table, column).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercionReport {
    pub failures: BTreeMap<(&'static str, &'static str), usize>,
}

impl CoercionReport {
    pub fn total(&self) -> usize {
        self.failures.values().sum()
    }

    pub fn count(&self, table: &str, column: &str) -> usize {
        self.failures
            .iter()
            .filter(|((t, c), _)| *t == table && *c == column)
            .map(|(_, n)| *n)
            .sum()
    }
}

/// Per-cell coercion that records what it had to throw away.
struct Coercer {
    report: CoercionReport,
}

impl Coercer {
    fn coerce<T>(
        &mut self,
        table: &'static str,
        column: &'static str,
        raw: Option<String>,
        parse: fn(&str) -> Option<T>,
    ) -> Option<T> {
        let raw = raw?;
        let parsed = parse(&raw);
        if parsed.is_none() {
            debug!(table, column, value = %raw, "Unparseable value set to missing");
            *self.report.failures.entry((table, column)).or_insert(0) += 1;
        }
        parsed
    }

    fn date(&mut self, table: &'static str, column: &'static str, raw: Option<String>) -> Option<NaiveDate> {
        self.coerce(table, column, raw, parse_date)
    }

    fn time(&mut self, table: &'static str, column: &'static str, raw: Option<String>) -> Option<NaiveTime> {
        self.coerce(table, column, raw, parse_time)
    }

    fn number(&mut self, table: &'static str, column: &'static str, raw: Option<String>) -> Option<f64> {
        self.coerce(table, column, raw, parse_number)
    }
}

/// Coerce date, time and numeric columns. Never fails: a cell that does not
/// parse becomes missing and is counted in the report.
pub fn normalize(sources: SourceTables) -> (TypedTables, CoercionReport) {
    let mut c = Coercer {
        report: CoercionReport::default(),
    };

    let customers = sources.customers.map(constants::CUSTOMERS_TABLE, |r| Customer {
        signup_date: c.date(constants::CUSTOMERS_TABLE, "signup_date", r.signup_date),
        customer_id: r.customer_id,
        country: r.country,
        city: r.city,
        loyalty_member: r.loyalty_member,
    });

    let products = sources.products.map(constants::PRODUCTS_TABLE, |r| Product {
        unit_price: c.number(constants::PRODUCTS_TABLE, "unit_price", r.unit_price),
        product_id: r.product_id,
        product_name: r.product_name,
        category: r.category,
    });

    let stores = sources.stores.map(constants::STORES_TABLE, |r| Store {
        opened_date: c.date(constants::STORES_TABLE, "opened_date", r.opened_date),
        store_id: r.store_id,
        store_name: r.store_name,
        store_type: r.store_type,
        country: r.country,
    });

    let orders = sources.orders.map(constants::ORDERS_TABLE, |r| Order {
        order_date: c.date(constants::ORDERS_TABLE, "order_date", r.order_date),
        order_time: c.time(constants::ORDERS_TABLE, "order_time", r.order_time),
        shipping_delay_days: c.number(
            constants::ORDERS_TABLE,
            "shipping_delay_days",
            r.shipping_delay_days,
        ),
        order_id: r.order_id,
        customer_id: r.customer_id,
        store_id: r.store_id,
        order_status: r.order_status,
        payment_method: r.payment_method,
    });

    let order_items = sources.order_items.map(constants::ORDER_ITEMS_TABLE, |r| OrderItem {
        quantity: c.number(constants::ORDER_ITEMS_TABLE, "quantity", r.quantity),
        unit_price: c.number(constants::ORDER_ITEMS_TABLE, "unit_price", r.unit_price),
        total_price: c.number(constants::ORDER_ITEMS_TABLE, "total_price", r.total_price),
        order_item_id: r.order_item_id,
        order_id: r.order_id,
        product_id: r.product_id,
    });

    let report = c.report;
    for ((table, column), count) in &report.failures {
        warn!(table, column, count, "Coerced unparseable values to missing");
        counter!("etl_cells_coerced_missing_total", "table" => *table, "column" => *column)
            .increment(*count as u64);
    }
    info!(failures = report.total(), "Type normalization finished");

    (
        TypedTables {
            customers,
            products,
            stores,
            orders,
            order_items,
        },
        report,
    )
}

/// File and value constants shared across the pipeline stages.
/// Config defaults are built from these so the CLI and tests agree.

// Input files, read relative to the data directory
pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const PRODUCTS_FILE: &str = "products.csv";
pub const STORES_FILE: &str = "stores.csv";
pub const ORDERS_FILE: &str = "orders.csv";
pub const ORDER_ITEMS_FILE: &str = "order_items.csv";

// Output files, written relative to the output directory
pub const CLEANED_ORDERS_FILE: &str = "cleaned_orders.csv";
pub const MASTER_FILE: &str = "coffee_sales_master.csv";

// Table names used in logs, reports and header errors
pub const CUSTOMERS_TABLE: &str = "customers";
pub const PRODUCTS_TABLE: &str = "products";
pub const STORES_TABLE: &str = "stores";
pub const ORDERS_TABLE: &str = "orders";
pub const ORDER_ITEMS_TABLE: &str = "order_items";
pub const CLEANED_ORDERS_TABLE: &str = "cleaned_orders";
pub const MASTER_TABLE: &str = "coffee_sales_master";

pub const COMPLETED_STATUS: &str = "Completed";
pub const DEFAULT_PAYMENT_METHOD: &str = "Unknown";
pub const DEFAULT_SHIPPING_DELAY_DAYS: f64 = 0.0;
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Cell values read as missing, same set pandas' `read_csv` treats as NA.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Accepted layouts for date columns, tried in order.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Accepted layouts for date-time values in date columns; the time part is dropped.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

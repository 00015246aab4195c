use chrono::{NaiveDate, NaiveTime};

use crate::table::{date_cell, key_cell, number_cell, text_cell, time_cell, Record};

// Raw rows as loaded: every cell is still text, `None` marks a missing cell.

#[derive(Debug, Clone, PartialEq)]
pub struct RawCustomer {
    pub customer_id: String,
    pub signup_date: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub loyalty_member: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawProduct {
    pub product_id: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawStore {
    pub store_id: String,
    pub store_name: Option<String>,
    pub store_type: Option<String>,
    pub country: Option<String>,
    pub opened_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawOrder {
    pub order_id: String,
    pub customer_id: String,
    pub store_id: String,
    pub order_date: Option<String>,
    pub order_time: Option<String>,
    pub order_status: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_delay_days: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawOrderItem {
    pub order_item_id: Option<String>,
    pub order_id: String,
    pub product_id: String,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub total_price: Option<String>,
}

impl Record for RawCustomer {
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "signup_date",
        "country",
        "city",
        "loyalty_member",
    ];

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            key_cell(&self.customer_id),
            text_cell(&self.signup_date),
            text_cell(&self.country),
            text_cell(&self.city),
            text_cell(&self.loyalty_member),
        ]
    }
}

impl Record for RawProduct {
    const COLUMNS: &'static [&'static str] =
        &["product_id", "product_name", "category", "unit_price"];

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            key_cell(&self.product_id),
            text_cell(&self.product_name),
            text_cell(&self.category),
            text_cell(&self.unit_price),
        ]
    }
}

impl Record for RawStore {
    const COLUMNS: &'static [&'static str] = &[
        "store_id",
        "store_name",
        "store_type",
        "country",
        "opened_date",
    ];

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            key_cell(&self.store_id),
            text_cell(&self.store_name),
            text_cell(&self.store_type),
            text_cell(&self.country),
            text_cell(&self.opened_date),
        ]
    }
}

impl Record for RawOrder {
    const COLUMNS: &'static [&'static str] = Order::COLUMNS;

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            key_cell(&self.order_id),
            key_cell(&self.customer_id),
            key_cell(&self.store_id),
            text_cell(&self.order_date),
            text_cell(&self.order_time),
            text_cell(&self.order_status),
            text_cell(&self.payment_method),
            text_cell(&self.shipping_delay_days),
        ]
    }
}

impl Record for RawOrderItem {
    const COLUMNS: &'static [&'static str] = OrderItem::COLUMNS;

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            text_cell(&self.order_item_id),
            key_cell(&self.order_id),
            key_cell(&self.product_id),
            text_cell(&self.quantity),
            text_cell(&self.unit_price),
            text_cell(&self.total_price),
        ]
    }
}

// Typed rows after coercion.

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub customer_id: String,
    pub signup_date: Option<NaiveDate>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub loyalty_member: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    pub store_id: String,
    pub store_name: Option<String>,
    pub store_type: Option<String>,
    pub country: Option<String>,
    pub opened_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub store_id: String,
    pub order_date: Option<NaiveDate>,
    pub order_time: Option<NaiveTime>,
    pub order_status: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_delay_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub order_item_id: Option<String>,
    pub order_id: String,
    pub product_id: String,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
}

impl Record for Customer {
    const COLUMNS: &'static [&'static str] = RawCustomer::COLUMNS;

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            key_cell(&self.customer_id),
            date_cell(&self.signup_date),
            text_cell(&self.country),
            text_cell(&self.city),
            text_cell(&self.loyalty_member),
        ]
    }
}

impl Record for Product {
    const COLUMNS: &'static [&'static str] = RawProduct::COLUMNS;

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            key_cell(&self.product_id),
            text_cell(&self.product_name),
            text_cell(&self.category),
            number_cell(&self.unit_price),
        ]
    }
}

impl Record for Store {
    const COLUMNS: &'static [&'static str] = RawStore::COLUMNS;

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            key_cell(&self.store_id),
            text_cell(&self.store_name),
            text_cell(&self.store_type),
            text_cell(&self.country),
            date_cell(&self.opened_date),
        ]
    }
}

impl Record for Order {
    const COLUMNS: &'static [&'static str] = &[
        "order_id",
        "customer_id",
        "store_id",
        "order_date",
        "order_time",
        "order_status",
        "payment_method",
        "shipping_delay_days",
    ];

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            key_cell(&self.order_id),
            key_cell(&self.customer_id),
            key_cell(&self.store_id),
            date_cell(&self.order_date),
            time_cell(&self.order_time),
            text_cell(&self.order_status),
            text_cell(&self.payment_method),
            number_cell(&self.shipping_delay_days),
        ]
    }
}

impl Record for OrderItem {
    const COLUMNS: &'static [&'static str] = &[
        "order_item_id",
        "order_id",
        "product_id",
        "quantity",
        "unit_price",
        "total_price",
    ];

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            text_cell(&self.order_item_id),
            key_cell(&self.order_id),
            key_cell(&self.product_id),
            number_cell(&self.quantity),
            number_cell(&self.unit_price),
            number_cell(&self.total_price),
        ]
    }
}

/// A completed order with the summed `total_price` of its items.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedOrder {
    pub order: Order,
    /// `None` when the order has no items at all
    pub order_total: Option<f64>,
}

impl Record for CleanedOrder {
    const COLUMNS: &'static [&'static str] = &[
        "order_id",
        "customer_id",
        "store_id",
        "order_date",
        "order_time",
        "order_status",
        "payment_method",
        "shipping_delay_days",
        "order_total",
    ];

    fn cells(&self) -> Vec<Option<String>> {
        let mut cells = self.order.cells();
        cells.push(number_cell(&self.order_total));
        cells
    }
}

/// One order line joined to its order and enriched with product, customer and
/// store attributes.
///
/// Column names match what downstream notebooks already read: the item and
/// product prices are `unit_price_x` / `unit_price_y`, and the two countries
/// carry the `_cust_country` / `_store_country` suffixes.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterRow {
    pub order_item_id: Option<String>,
    pub order_id: String,
    pub product_id: String,
    pub quantity: Option<f64>,
    pub item_unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub customer_id: String,
    pub store_id: String,
    pub order_date: Option<NaiveDate>,
    pub order_time: Option<NaiveTime>,
    pub order_status: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_delay_days: Option<f64>,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub product_unit_price: Option<f64>,
    pub customer_country: Option<String>,
    pub city: Option<String>,
    pub loyalty_member: Option<String>,
    pub store_name: Option<String>,
    pub store_type: Option<String>,
    pub store_country: Option<String>,
}

impl Record for MasterRow {
    const COLUMNS: &'static [&'static str] = &[
        "order_item_id",
        "order_id",
        "product_id",
        "quantity",
        "unit_price_x",
        "total_price",
        "customer_id",
        "store_id",
        "order_date",
        "order_time",
        "order_status",
        "payment_method",
        "shipping_delay_days",
        "product_name",
        "category",
        "unit_price_y",
        "country_cust_country",
        "city",
        "loyalty_member",
        "store_name",
        "store_type",
        "country_store_country",
    ];

    fn cells(&self) -> Vec<Option<String>> {
        vec![
            text_cell(&self.order_item_id),
            key_cell(&self.order_id),
            key_cell(&self.product_id),
            number_cell(&self.quantity),
            number_cell(&self.item_unit_price),
            number_cell(&self.total_price),
            key_cell(&self.customer_id),
            key_cell(&self.store_id),
            date_cell(&self.order_date),
            time_cell(&self.order_time),
            text_cell(&self.order_status),
            text_cell(&self.payment_method),
            number_cell(&self.shipping_delay_days),
            text_cell(&self.product_name),
            text_cell(&self.category),
            number_cell(&self.product_unit_price),
            text_cell(&self.customer_country),
            text_cell(&self.city),
            text_cell(&self.loyalty_member),
            text_cell(&self.store_name),
            text_cell(&self.store_type),
            text_cell(&self.store_country),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order {
            order_id: "O1".to_string(),
            customer_id: "C1".to_string(),
            store_id: "S1".to_string(),
            order_date: NaiveDate::from_ymd_opt(2024, 3, 9),
            order_time: NaiveTime::from_hms_opt(8, 5, 0),
            order_status: Some("Completed".to_string()),
            payment_method: None,
            shipping_delay_days: Some(2.0),
        }
    }

    #[test]
    fn test_cells_line_up_with_columns() {
        let order = sample_order();
        assert_eq!(order.cells().len(), Order::COLUMNS.len());

        let cleaned = CleanedOrder {
            order: order.clone(),
            order_total: Some(12.5),
        };
        let cells = cleaned.cells();
        assert_eq!(cells.len(), CleanedOrder::COLUMNS.len());
        assert_eq!(cells[3].as_deref(), Some("2024-03-09"));
        assert_eq!(cells[4].as_deref(), Some("08:05:00"));
        assert_eq!(cells[6], None);
        assert_eq!(cells[8].as_deref(), Some("12.5"));
    }

    #[test]
    fn test_raw_and_typed_shapes_share_columns() {
        assert_eq!(RawOrder::COLUMNS, Order::COLUMNS);
        assert_eq!(RawOrderItem::COLUMNS, OrderItem::COLUMNS);
        assert_eq!(
            &CleanedOrder::COLUMNS[..Order::COLUMNS.len()],
            Order::COLUMNS
        );
    }

    #[test]
    fn test_master_columns_are_unique() {
        let mut names: Vec<&str> = MasterRow::COLUMNS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), MasterRow::COLUMNS.len());
    }
}

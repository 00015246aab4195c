use metrics::counter;
use tracing::info;

use crate::pipeline::processing::normalize::TypedTables;
use crate::table::{Record, Table};
use crate::types::Order;

/// Keep orders whose status is exactly `status`; everything else, including a
/// missing status, is dropped. Returns the kept orders and the dropped count.
pub fn filter_completed(orders: Table<Order>, status: &str) -> (Table<Order>, usize) {
    let before = orders.len();
    let kept = orders.filter(|o| o.order_status.as_deref() == Some(status));
    let dropped = before - kept.len();
    info!(kept = kept.len(), dropped, status, "Filtered orders by status");
    counter!("etl_orders_filtered_total").increment(dropped as u64);
    (kept, dropped)
}

/// Rows removed by exact-duplicate elimination, per table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub removed: Vec<(&'static str, usize)>,
}

impl DedupReport {
    pub fn total(&self) -> usize {
        self.removed.iter().map(|(_, n)| n).sum()
    }

    pub fn removed_from(&self, table: &str) -> usize {
        self.removed
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    fn record<R: Record>(&mut self, table: Table<R>) -> Table<R> {
        let (deduped, removed) = table.dedup();
        info!(table = deduped.name(), removed, "Removed duplicate rows");
        counter!("etl_duplicates_removed_total", "table" => deduped.name())
            .increment(removed as u64);
        self.removed.push((deduped.name(), removed));
        deduped
    }
}

/// Deduplicate every table. `tables.orders` is expected to be the filtered
/// orders already.
pub fn dedup_all(tables: TypedTables) -> (TypedTables, DedupReport) {
    let mut report = DedupReport::default();
    let deduped = TypedTables {
        customers: report.record(tables.customers),
        products: report.record(tables.products),
        stores: report.record(tables.stores),
        orders: report.record(tables.orders),
        order_items: report.record(tables.order_items),
    };
    (deduped, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;
    use crate::types::{Customer, OrderItem, Product, Store};

    fn order(id: &str, status: Option<&str>) -> Order {
        Order {
            order_id: id.to_string(),
            customer_id: "C1".to_string(),
            store_id: "S1".to_string(),
            order_date: None,
            order_time: None,
            order_status: status.map(str::to_string),
            payment_method: None,
            shipping_delay_days: None,
        }
    }

    fn item(order_id: &str, total: Option<f64>) -> OrderItem {
        OrderItem {
            order_item_id: None,
            order_id: order_id.to_string(),
            product_id: "P1".to_string(),
            quantity: Some(1.0),
            unit_price: total,
            total_price: total,
        }
    }

    #[test]
    fn test_only_exact_completed_status_survives() {
        let orders = Table::new(
            constants::ORDERS_TABLE,
            vec![
                order("O1", Some("Completed")),
                order("O2", Some("Cancelled")),
                order("O3", Some("completed")),
                order("O4", None),
                order("O5", Some("Returned")),
                order("O6", Some("Completed")),
            ],
        );

        let (kept, dropped) = filter_completed(orders, "Completed");
        assert_eq!(dropped, 4);
        let ids: Vec<&str> = kept.rows().iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["O1", "O6"]);
    }

    #[test]
    fn test_dedup_all_reports_per_table() {
        let tables = TypedTables {
            customers: Table::new(constants::CUSTOMERS_TABLE, Vec::<Customer>::new()),
            products: Table::new(constants::PRODUCTS_TABLE, Vec::<Product>::new()),
            stores: Table::new(constants::STORES_TABLE, Vec::<Store>::new()),
            orders: Table::new(
                constants::ORDERS_TABLE,
                vec![
                    order("O1", Some("Completed")),
                    order("O1", Some("Completed")),
                ],
            ),
            order_items: Table::new(
                constants::ORDER_ITEMS_TABLE,
                vec![
                    item("O1", Some(2.0)),
                    item("O1", None),
                    item("O1", Some(2.0)),
                    item("O1", None),
                    item("O1", Some(3.0)),
                ],
            ),
        };

        let (deduped, report) = dedup_all(tables);
        assert_eq!(deduped.orders.len(), 1);
        assert_eq!(deduped.order_items.len(), 3);
        assert_eq!(report.removed_from("orders"), 1);
        assert_eq!(report.removed_from("order_items"), 2);
        assert_eq!(report.removed_from("customers"), 0);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_orders_differing_only_in_time_of_day_collapse() {
        use crate::pipeline::processing::normalize::parse_date;

        let mut morning = order("O1", Some("Completed"));
        morning.order_date = parse_date("2024-01-05 08:00:00");
        let mut evening = order("O1", Some("Completed"));
        evening.order_date = parse_date("2024-01-05 17:30:00");

        let (kept, removed) = Table::new(constants::ORDERS_TABLE, vec![morning, evening]).dedup();
        assert_eq!(removed, 1);
        assert_eq!(kept.rows()[0].order_date, parse_date("2024-01-05"));
    }
}

use std::collections::HashMap;
use tracing::{info, warn};

use crate::constants;
use crate::table::{Record, Table};
use crate::types::{CleanedOrder, Customer, MasterRow, Order, OrderItem, Product, Store};

/// Index rows by key, first row wins. Later rows sharing a key are counted
/// and logged so the join never fans one item out into several rows.
fn index_by<'a, R: Record>(
    table: &'a Table<R>,
    key: impl Fn(&R) -> &str,
) -> HashMap<&'a str, &'a R> {
    let mut index = HashMap::with_capacity(table.len());
    let mut shadowed = 0usize;
    for row in table.rows() {
        let k: &'a str = key(row);
        if index.contains_key(k) {
            shadowed += 1;
        } else {
            index.insert(k, row);
        }
    }
    if shadowed > 0 {
        warn!(
            table = table.name(),
            shadowed, "Key is not unique, joining on the first row per key"
        );
    }
    index
}

/// Join every item of a completed order with its order, product, customer and
/// store. Items whose order is not in `orders` are dropped; missing products,
/// customers or stores leave their attributes missing.
pub fn build_master(
    items: &Table<OrderItem>,
    orders: &Table<Order>,
    products: &Table<Product>,
    customers: &Table<Customer>,
    stores: &Table<Store>,
) -> Table<MasterRow> {
    let orders_by_id = index_by(orders, |o| o.order_id.as_str());
    let products_by_id = index_by(products, |p| p.product_id.as_str());
    let customers_by_id = index_by(customers, |c| c.customer_id.as_str());
    let stores_by_id = index_by(stores, |s| s.store_id.as_str());

    let mut rows = Vec::with_capacity(items.len());
    for item in items.rows() {
        let Some(order) = orders_by_id.get(item.order_id.as_str()) else {
            continue;
        };
        let product = products_by_id.get(item.product_id.as_str());
        let customer = customers_by_id.get(order.customer_id.as_str());
        let store = stores_by_id.get(order.store_id.as_str());

        rows.push(MasterRow {
            order_item_id: item.order_item_id.clone(),
            order_id: item.order_id.clone(),
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            item_unit_price: item.unit_price,
            total_price: item.total_price,
            customer_id: order.customer_id.clone(),
            store_id: order.store_id.clone(),
            order_date: order.order_date,
            order_time: order.order_time,
            order_status: order.order_status.clone(),
            payment_method: order.payment_method.clone(),
            shipping_delay_days: order.shipping_delay_days,
            product_name: product.and_then(|p| p.product_name.clone()),
            category: product.and_then(|p| p.category.clone()),
            product_unit_price: product.and_then(|p| p.unit_price),
            customer_country: customer.and_then(|c| c.country.clone()),
            city: customer.and_then(|c| c.city.clone()),
            loyalty_member: customer.and_then(|c| c.loyalty_member.clone()),
            store_name: store.and_then(|s| s.store_name.clone()),
            store_type: store.and_then(|s| s.store_type.clone()),
            store_country: store.and_then(|s| s.country.clone()),
        });
    }

    info!(
        items = items.len(),
        joined = rows.len(),
        dropped = items.len() - rows.len(),
        "Built master table"
    );
    Table::new(constants::MASTER_TABLE, rows)
}

/// Sum of `total_price` per `order_id` over all items. Missing prices add
/// nothing, so an order whose prices are all missing totals 0.
pub fn order_totals(items: &Table<OrderItem>) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for item in items.rows() {
        let entry = totals.entry(item.order_id.clone()).or_insert(0.0);
        if let Some(price) = item.total_price {
            *entry += price;
        }
    }
    totals
}

/// Attach totals to the orders; an order with no items gets a missing total.
pub fn attach_totals(orders: Table<Order>, totals: &HashMap<String, f64>) -> Table<CleanedOrder> {
    orders.map(constants::CLEANED_ORDERS_TABLE, |order| CleanedOrder {
        order_total: totals.get(&order.order_id).copied(),
        order,
    })
}

/// Values used for master cells left missing after the joins.
#[derive(Debug, Clone, PartialEq)]
pub struct FillDefaults {
    pub shipping_delay_days: f64,
    pub payment_method: String,
}

impl Default for FillDefaults {
    fn default() -> Self {
        Self {
            shipping_delay_days: constants::DEFAULT_SHIPPING_DELAY_DAYS,
            payment_method: constants::DEFAULT_PAYMENT_METHOD.to_string(),
        }
    }
}

/// Fill missing `shipping_delay_days` and `payment_method`. Nothing else is touched.
pub fn fill_defaults(master: Table<MasterRow>, defaults: &FillDefaults) -> Table<MasterRow> {
    let name = master.name();
    master.map(name, |mut row| {
        row.shipping_delay_days = row.shipping_delay_days.or(Some(defaults.shipping_delay_days));
        row.payment_method = row
            .payment_method
            .or_else(|| Some(defaults.payment_method.clone()));
        row
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn order(id: &str, customer: &str, store: &str) -> Order {
        Order {
            order_id: id.to_string(),
            customer_id: customer.to_string(),
            store_id: store.to_string(),
            order_date: None,
            order_time: None,
            order_status: s("Completed"),
            payment_method: None,
            shipping_delay_days: None,
        }
    }

    fn item(order_id: &str, product_id: &str, total: Option<f64>) -> OrderItem {
        OrderItem {
            order_item_id: None,
            order_id: order_id.to_string(),
            product_id: product_id.to_string(),
            quantity: Some(1.0),
            unit_price: total,
            total_price: total,
        }
    }

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product {
            product_id: id.to_string(),
            product_name: s(name),
            category: s("Coffee"),
            unit_price: Some(price),
        }
    }

    fn customer(id: &str, country: &str) -> Customer {
        Customer {
            customer_id: id.to_string(),
            signup_date: None,
            country: s(country),
            city: s("Lisbon"),
            loyalty_member: s("False"),
        }
    }

    fn store(id: &str, country: &str) -> Store {
        Store {
            store_id: id.to_string(),
            store_name: s("Harbour"),
            store_type: s("Kiosk"),
            country: s(country),
            opened_date: None,
        }
    }

    fn tables() -> (
        Table<OrderItem>,
        Table<Order>,
        Table<Product>,
        Table<Customer>,
        Table<Store>,
    ) {
        (
            Table::new(
                constants::ORDER_ITEMS_TABLE,
                vec![
                    item("O1", "P1", Some(3.0)),
                    item("O9", "P1", Some(5.0)),
                    item("O1", "P404", Some(1.5)),
                    item("O2", "P1", None),
                ],
            ),
            Table::new(
                constants::ORDERS_TABLE,
                vec![order("O1", "C1", "S1"), order("O2", "C404", "S404"), order("O3", "C1", "S1")],
            ),
            Table::new(
                constants::PRODUCTS_TABLE,
                vec![product("P1", "Espresso", 2.5), product("P1", "Shadowed", 9.0)],
            ),
            Table::new(constants::CUSTOMERS_TABLE, vec![customer("C1", "PT")]),
            Table::new(constants::STORES_TABLE, vec![store("S1", "ES")]),
        )
    }

    #[test]
    fn test_inner_join_orders_left_join_attributes() {
        let (items, orders, products, customers, stores) = tables();
        let master = build_master(&items, &orders, &products, &customers, &stores);

        // O9 has no completed order
        assert_eq!(master.len(), 3);
        let first = &master.rows()[0];
        assert_eq!(first.product_name.as_deref(), Some("Espresso"));
        assert_eq!(first.product_unit_price, Some(2.5));
        assert_eq!(first.item_unit_price, Some(3.0));
        assert_eq!(first.customer_country.as_deref(), Some("PT"));
        assert_eq!(first.store_country.as_deref(), Some("ES"));

        let unknown_product = &master.rows()[1];
        assert_eq!(unknown_product.product_id, "P404");
        assert_eq!(unknown_product.product_name, None);
        assert_eq!(unknown_product.category, None);
        assert_eq!(unknown_product.customer_country.as_deref(), Some("PT"));

        let unknown_customer = &master.rows()[2];
        assert_eq!(unknown_customer.order_id, "O2");
        assert_eq!(unknown_customer.city, None);
        assert_eq!(unknown_customer.store_name, None);
    }

    #[test]
    fn test_totals_attach_to_completed_orders() {
        let (items, orders, ..) = tables();
        let totals = order_totals(&items);
        assert_eq!(totals.get("O1"), Some(&4.5));
        assert_eq!(totals.get("O2"), Some(&0.0));

        let cleaned = attach_totals(orders, &totals);
        let by_id: Vec<(&str, Option<f64>)> = cleaned
            .rows()
            .iter()
            .map(|c| (c.order.order_id.as_str(), c.order_total))
            .collect();
        assert_eq!(
            by_id,
            vec![("O1", Some(4.5)), ("O2", Some(0.0)), ("O3", None)]
        );
        assert_eq!(cleaned.name(), "cleaned_orders");
    }

    #[test]
    fn test_fill_defaults_only_touches_two_columns() {
        let (items, mut orders, products, customers, stores) = tables();
        let mut with_values = orders.clone().into_rows();
        with_values[0].payment_method = s("Card");
        with_values[0].shipping_delay_days = Some(2.0);
        orders = Table::new(constants::ORDERS_TABLE, with_values);

        let master = build_master(&items, &orders, &products, &customers, &stores);
        let filled = fill_defaults(master, &FillDefaults::default());

        let first = &filled.rows()[0];
        assert_eq!(first.payment_method.as_deref(), Some("Card"));
        assert_eq!(first.shipping_delay_days, Some(2.0));

        let last = &filled.rows()[2];
        assert_eq!(last.payment_method.as_deref(), Some("Unknown"));
        assert_eq!(last.shipping_delay_days, Some(0.0));
        assert_eq!(last.city, None);
        assert_eq!(last.total_price, None);
    }
}

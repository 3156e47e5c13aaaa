use std::fmt::Write;

use bigdecimal::BigDecimal;
use serde::Serialize;

use super::catalog::Product;
use super::order::{OrderCounts, OrderView};
use super::pricing::round_money;

pub const CURRENCY_SYMBOL: &str = "৳";
pub const LOW_STOCK_THRESHOLD: i32 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_customers: i64,
    /// Sum over placed orders that were not cancelled.
    pub total_revenue: BigDecimal,
    pub order_counts: OrderCounts,
    pub recent_orders: Vec<OrderView>,
    pub low_stock_products: Vec<Product>,
}

pub const CSV_HEADER: &str = "Order Number,Customer,Phone,Address,Products,Total,Status,Date";

/// Quote a field when it contains a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per order; products rendered as `name (xqty)` joined by `, `.
pub fn orders_csv(orders: &[OrderView]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for order in orders {
        let products = order
            .items
            .iter()
            .map(|item| format!("{} (x{})", item.product_name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ");
        let fields = [
            order.order_number.clone(),
            order.customer_name.clone(),
            order.customer_phone.clone(),
            order.customer_address.clone().unwrap_or_else(|| "N/A".to_string()),
            products,
            format!("{CURRENCY_SYMBOL}{}", round_money(&order.total)),
            order.status.to_string(),
            order.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        let _ = writeln!(csv, "{}", row.join(","));
    }
    csv
}

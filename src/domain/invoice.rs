use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::{OrderDraft, PaymentMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(format!("unknown invoice status '{other}'")),
        }
    }
}

/// `INV-<year>-<sequence zero-padded to 6>`.
pub fn invoice_number(year: i32, sequence: i64) -> String {
    format!("INV-{year}-{sequence:06}")
}

/// Invoice fields derived from an order about to be placed. The number is
/// assigned by the store from its sequence.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub subtotal: BigDecimal,
    pub delivery_charge: BigDecimal,
    pub total_amount: BigDecimal,
    pub invoice_date: DateTime<Utc>,
}

impl InvoiceDraft {
    /// Orders without a recorded payment method are billed cash on delivery.
    pub fn for_order(order: &OrderDraft, now: DateTime<Utc>) -> Self {
        let delivery_charge = BigDecimal::zero();
        Self {
            customer_name: order.customer.name.clone(),
            customer_phone: order.customer.phone.clone(),
            delivery_address: order.customer.address.clone(),
            payment_method: order.payment_method.unwrap_or(PaymentMethod::Cod),
            transaction_id: order.transaction_id.clone(),
            subtotal: order.total.clone(),
            total_amount: &order.total + &delivery_charge,
            delivery_charge,
            invoice_date: now,
        }
    }

    pub fn number(&self, sequence: i64) -> String {
        invoice_number(self.invoice_date.year(), sequence)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceView {
    pub id: Uuid,
    pub invoice_number: String,
    pub order_id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub subtotal: BigDecimal,
    pub delivery_charge: BigDecimal,
    pub total_amount: BigDecimal,
    pub status: InvoiceStatus,
    pub invoice_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::order::{CustomerDetails, OrderStatus};

    #[test]
    fn number_is_zero_padded() {
        assert_eq!(invoice_number(2026, 1), "INV-2026-000001");
        assert_eq!(invoice_number(2026, 123_456), "INV-2026-123456");
        assert_eq!(invoice_number(2027, 1_234_567), "INV-2027-1234567");
    }

    #[test]
    fn draft_copies_order_and_defaults_to_cod() {
        let order = OrderDraft {
            order_number: "ORD-1-1000".to_string(),
            user_id: None,
            customer: CustomerDetails {
                name: "Rahim".to_string(),
                phone: "01712345678".to_string(),
                address: "House 4, Mirpur, Dhaka".to_string(),
            },
            status: OrderStatus::Pending,
            total: BigDecimal::from(540),
            payment_method: None,
            transaction_id: None,
            items: vec![],
            issue_invoice: true,
            update_profile: false,
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let draft = InvoiceDraft::for_order(&order, now);
        assert_eq!(draft.payment_method, PaymentMethod::Cod);
        assert_eq!(draft.subtotal, BigDecimal::from(540));
        assert_eq!(draft.delivery_charge, BigDecimal::zero());
        assert_eq!(draft.total_amount, BigDecimal::from(540));
        assert_eq!(draft.delivery_address, "House 4, Mirpur, Dhaka");
        assert_eq!(draft.number(42), "INV-2026-000042");
    }
}

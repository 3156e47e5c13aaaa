use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle status.
///
/// `incomplete → pending → processing → shipped → delivered`, with
/// `cancelled` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Abandoned checkout snapshot.
    Incomplete,
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Incomplete,
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Incomplete => "incomplete",
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Incomplete => 0,
            OrderStatus::Pending => 1,
            OrderStatus::Processing => 2,
            OrderStatus::Shipped => 3,
            OrderStatus::Delivered => 4,
            OrderStatus::Cancelled => 5,
        }
    }

    /// Forward moves only (skipping ahead is fine), cancellation from any
    /// non-terminal state, and re-setting the current status as a no-op.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        if *self == to {
            return true;
        }
        if self.is_terminal() || to == OrderStatus::Incomplete {
            return false;
        }
        to == OrderStatus::Cancelled || to.rank() > self.rank()
    }

    /// Every status an order may currently hold for a move to `target` to be
    /// accepted.
    pub fn sources_for(target: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|s| s.can_transition_to(target))
            .collect()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Bkash,
    Nagad,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Bkash => "bkash",
            PaymentMethod::Nagad => "nagad",
        }
    }

    /// Mobile-wallet payments are confirmed by the shopper's transaction id.
    pub fn requires_transaction_id(&self) -> bool {
        matches!(self, PaymentMethod::Bkash | PaymentMethod::Nagad)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(PaymentMethod::Cod),
            "bkash" => Ok(PaymentMethod::Bkash),
            "nagad" => Ok(PaymentMethod::Nagad),
            other => Err(format!("unknown payment method '{other}'")),
        }
    }
}

/// Prefix of a human-facing order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderNumberKind {
    Placed,
    Incomplete,
}

impl OrderNumberKind {
    fn prefix(&self) -> &'static str {
        match self {
            OrderNumberKind::Placed => "ORD",
            OrderNumberKind::Incomplete => "INC",
        }
    }

    /// `<PREFIX>-<unix seconds>-<4-digit random>`. Not collision-proof; the
    /// store's unique constraint catches the rare clash.
    pub fn generate(&self) -> String {
        let suffix = rand::thread_rng().gen_range(1000..=9999);
        self.format(Utc::now().timestamp(), suffix)
    }

    pub fn format(&self, unix_seconds: i64, suffix: u16) -> String {
        format!("{}-{}-{:04}", self.prefix(), unix_seconds, suffix)
    }
}

/// One chosen variation, snapshotted onto an order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedVariation {
    pub attribute: String,
    pub variation_id: Uuid,
    pub value: String,
    pub price_adjustment: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub variations: Vec<SelectedVariation>,
}

impl OrderItemView {
    /// "Name (Size: L, Color: Red)", or just the name without variations.
    pub fn label(&self) -> String {
        if self.variations.is_empty() {
            return self.product_name.clone();
        }
        let chosen: Vec<String> = self
            .variations
            .iter()
            .map(|v| format!("{}: {}", v.attribute, v.value))
            .collect();
        format!("{} ({})", self.product_name, chosen.join(", "))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDraft {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub variations: Vec<SelectedVariation>,
}

/// Everything the store needs to persist a placed order in one transaction.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub customer: CustomerDetails,
    pub status: OrderStatus,
    pub total: BigDecimal,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
    pub items: Vec<LineDraft>,
    pub issue_invoice: bool,
    /// Overwrite the owning user's name/phone/address with `customer`.
    pub update_profile: bool,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub invoice_number: Option<String>,
}

/// Best-effort snapshot of a checkout form, keyed by `capture_key`.
#[derive(Debug, Clone)]
pub struct IncompleteDraft {
    pub capture_key: String,
    pub order_number: String,
    pub session_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub total: BigDecimal,
    pub item: LineDraft,
}

impl IncompleteDraft {
    pub fn capture_key(product_id: Uuid, session_id: &str) -> String {
        format!("{product_id}:{session_id}")
    }
}

/// Admin edit. `None` leaves the field untouched; the total is never
/// recomputed from items here.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub total: Option<BigDecimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Everything except incomplete captures, optionally one status only.
    Placed(Option<OrderStatus>),
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkStatusOutcome {
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderCounts {
    pub pending: i64,
    pub incomplete: i64,
}

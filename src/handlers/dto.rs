//! JSON shapes shared by the storefront, admin and API routes. Money is sent
//! as a decimal string ("90.00") to avoid floating-point drift.

use bigdecimal::BigDecimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::ProductPage;
use crate::domain::catalog::{Category, Product, ProductDetail, ProductVariation};
use crate::domain::content::{InfoCard, Notice, Showcase};
use crate::domain::invoice::InvoiceView;
use crate::domain::order::{OrderItemView, OrderView, PlacedOrder, SelectedVariation};
use crate::domain::pricing::{line_total, round_money};

fn money(value: &BigDecimal) -> String {
    round_money(value).to_string()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub products_count: i64,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            is_active: c.is_active,
            products_count: c.products_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VariationResponse {
    pub id: Uuid,
    /// Attribute name, e.g. "Size".
    pub name: String,
    pub value: String,
    pub price_adjustment: String,
    /// Base price plus the adjustment.
    pub final_price: String,
    pub stock: i32,
    pub sku: Option<String>,
    pub is_active: bool,
}

impl VariationResponse {
    fn new(v: ProductVariation, base_price: &BigDecimal) -> Self {
        Self {
            final_price: money(&v.final_price(base_price)),
            price_adjustment: money(&v.price_adjustment),
            id: v.id,
            name: v.name,
            value: v.value,
            stock: v.stock,
            sku: v.sku,
            is_active: v.is_active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub sale_price: Option<String>,
    /// Sale price when set, otherwise the base price.
    pub effective_price: String,
    pub stock: i32,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            effective_price: money(p.effective_price()),
            price: money(&p.price),
            sale_price: p.sale_price.as_ref().map(money),
            id: p.id,
            category_id: p.category_id,
            category_name: p.category_name,
            name: p.name,
            slug: p.slug,
            description: p.description,
            stock: p.stock,
            images: p.images,
            is_active: p.is_active,
            is_featured: p.is_featured,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub variations: Vec<VariationResponse>,
}

impl From<ProductDetail> for ProductDetailResponse {
    fn from(d: ProductDetail) -> Self {
        let base = d.product.price.clone();
        Self {
            variations: d
                .variations
                .into_iter()
                .map(|v| VariationResponse::new(v, &base))
                .collect(),
            product: d.product.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductPageResponse {
    #[serde(flatten)]
    pub detail: ProductDetailResponse,
    pub related: Vec<ProductResponse>,
}

impl From<ProductPage> for ProductPageResponse {
    fn from(page: ProductPage) -> Self {
        Self {
            detail: page.detail.into(),
            related: page.related.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SelectedVariationResponse {
    pub attribute: String,
    pub variation_id: Uuid,
    pub value: String,
    pub price_adjustment: String,
}

impl From<SelectedVariation> for SelectedVariationResponse {
    fn from(v: SelectedVariation) -> Self {
        Self {
            price_adjustment: money(&v.price_adjustment),
            attribute: v.attribute,
            variation_id: v.variation_id,
            value: v.value,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    /// `null` once the product has been deleted.
    pub product_id: Option<Uuid>,
    pub product_name: String,
    /// Product name with the chosen variations, e.g. "Panjabi (Size: L)".
    pub label: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
    pub variations: Vec<SelectedVariationResponse>,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        Self {
            label: item.label(),
            line_total: money(&line_total(&item.unit_price, item.quantity)),
            unit_price: money(&item.unit_price),
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            variations: item.variations.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub total: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub invoice_number: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        Self {
            id: o.id,
            order_number: o.order_number,
            user_id: o.user_id,
            customer_name: o.customer_name,
            customer_phone: o.customer_phone,
            customer_address: o.customer_address,
            total: money(&o.total),
            status: o.status.to_string(),
            payment_method: o.payment_method.map(|m| m.to_string()),
            transaction_id: o.transaction_id,
            invoice_number: o.invoice_number,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
            items: o.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedOrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub invoice_number: Option<String>,
    /// Public tracking page for the order.
    pub tracking_url: String,
}

impl From<PlacedOrder> for PlacedOrderResponse {
    fn from(p: PlacedOrder) -> Self {
        Self {
            tracking_url: format!("/orders/track/{}", p.order_number),
            id: p.order_id,
            order_number: p.order_number,
            invoice_number: p.invoice_number,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShowcaseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    /// Banner placement; absent for sliders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Showcase> for ShowcaseResponse {
    fn from(s: Showcase) -> Self {
        Self {
            id: s.id,
            title: s.title,
            description: s.description,
            image_url: s.image_url,
            link_url: s.link_url,
            position: s.position,
            sort_order: s.sort_order,
            is_active: s.is_active,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeResponse {
    pub id: Uuid,
    pub text: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Notice> for NoticeResponse {
    fn from(n: Notice) -> Self {
        Self {
            id: n.id,
            text: n.text,
            is_active: n.is_active,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InfoCardResponse {
    pub id: Uuid,
    pub title: String,
    pub subtitle: String,
    pub icon_type: String,
    pub icon_data: String,
    pub bg_color: String,
    pub text_color: String,
    pub border_color: String,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<InfoCard> for InfoCardResponse {
    fn from(c: InfoCard) -> Self {
        Self {
            id: c.id,
            title: c.title,
            subtitle: c.subtitle,
            icon_type: c.icon_type,
            icon_data: c.icon_data,
            bg_color: c.bg_color,
            text_color: c.text_color,
            border_color: c.border_color,
            sort_order: c.sort_order,
            is_active: c.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub order_id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub subtotal: String,
    pub delivery_charge: String,
    pub total_amount: String,
    pub status: String,
    pub invoice_date: String,
}

impl From<InvoiceView> for InvoiceResponse {
    fn from(i: InvoiceView) -> Self {
        Self {
            id: i.id,
            invoice_number: i.invoice_number,
            order_id: i.order_id,
            order_number: i.order_number,
            customer_name: i.customer_name,
            customer_phone: i.customer_phone,
            delivery_address: i.delivery_address,
            payment_method: i.payment_method.to_string(),
            transaction_id: i.transaction_id,
            subtotal: money(&i.subtotal),
            delivery_charge: money(&i.delivery_charge),
            total_amount: money(&i.total_amount),
            status: i.status.to_string(),
            invoice_date: i.invoice_date.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;

    use super::*;
    use crate::domain::order::{OrderStatus, PaymentMethod};

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("decimal")
    }

    #[test]
    fn order_response_formats_money_and_labels_items() {
        let order = OrderView {
            id: Uuid::new_v4(),
            order_number: "ORD-1700000000-0042".to_string(),
            user_id: None,
            session_id: None,
            customer_name: "Rahim".to_string(),
            customer_phone: "01712345678".to_string(),
            customer_address: Some("Road 7, Mirpur, Dhaka".to_string()),
            total: dec("180"),
            status: OrderStatus::Pending,
            payment_method: Some(PaymentMethod::Bkash),
            transaction_id: Some("TX1".to_string()),
            invoice_number: Some("INV-2026-000001".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: vec![OrderItemView {
                id: Uuid::new_v4(),
                product_id: None,
                product_name: "Panjabi".to_string(),
                quantity: 2,
                unit_price: dec("90"),
                variations: vec![SelectedVariation {
                    attribute: "Size".to_string(),
                    variation_id: Uuid::new_v4(),
                    value: "L".to_string(),
                    price_adjustment: dec("10"),
                }],
            }],
        };

        let response = OrderResponse::from(order);
        assert_eq!(response.total, "180.00");
        assert_eq!(response.status, "pending");
        assert_eq!(response.payment_method.as_deref(), Some("bkash"));
        assert_eq!(response.items[0].label, "Panjabi (Size: L)");
        assert_eq!(response.items[0].unit_price, "90.00");
        assert_eq!(response.items[0].line_total, "180.00");
        assert_eq!(response.items[0].variations[0].price_adjustment, "10.00");
    }
}

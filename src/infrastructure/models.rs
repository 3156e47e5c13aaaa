use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::{
    banners, categories, info_cards, invoices, notices, order_items, orders, product_variations,
    products, settings, sliders, users,
};

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct ProfileChangeset<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategoryRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub is_active: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = categories)]
pub struct CategoryChangeset<'a> {
    pub name: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub description: Option<&'a str>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = products)]
#[diesel(belongs_to(CategoryRow, foreign_key = category_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: BigDecimal,
    pub sale_price: Option<BigDecimal>,
    pub stock: i32,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow<'a> {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub price: &'a BigDecimal,
    pub sale_price: Option<&'a BigDecimal>,
    pub stock: i32,
    pub images: &'a [String],
    pub is_active: bool,
    pub is_featured: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset<'a> {
    pub category_id: Option<Uuid>,
    pub name: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<&'a BigDecimal>,
    /// `Some(None)` clears the sale price.
    pub sale_price: Option<Option<&'a BigDecimal>>,
    pub stock: Option<i32>,
    pub images: Option<&'a [String]>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = product_variations)]
#[diesel(belongs_to(ProductRow, foreign_key = product_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VariationRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub value: String,
    pub price_adjustment: BigDecimal,
    pub stock: i32,
    pub sku: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_variations)]
pub struct NewVariationRow<'a> {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: &'a str,
    pub value: &'a str,
    pub price_adjustment: &'a BigDecimal,
    pub stock: i32,
    pub sku: Option<&'a str>,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub total: BigDecimal,
    pub status: String,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub id: Uuid,
    pub order_number: &'a str,
    pub user_id: Option<Uuid>,
    pub session_id: Option<&'a str>,
    pub capture_key: Option<&'a str>,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub customer_address: Option<&'a str>,
    pub total: &'a BigDecimal,
    pub status: &'a str,
    pub payment_method: Option<&'a str>,
    pub transaction_id: Option<&'a str>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangeset<'a> {
    pub status: &'a str,
    pub customer_name: Option<&'a str>,
    pub customer_phone: Option<&'a str>,
    pub customer_address: Option<Option<&'a str>>,
    pub total: Option<&'a BigDecimal>,
    /// Cleared once the order leaves `incomplete`.
    pub capture_key: Option<Option<&'a str>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub variations: Value,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow<'a> {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Option<Uuid>,
    pub product_name: &'a str,
    pub quantity: i32,
    pub unit_price: &'a BigDecimal,
    pub variations: Value,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvoiceRow {
    pub id: Uuid,
    pub invoice_number: String,
    pub order_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub subtotal: BigDecimal,
    pub delivery_charge: BigDecimal,
    pub total_amount: BigDecimal,
    pub status: String,
    pub invoice_date: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = invoices)]
pub struct NewInvoiceRow<'a> {
    pub id: Uuid,
    pub invoice_number: &'a str,
    pub order_id: Uuid,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub delivery_address: &'a str,
    pub payment_method: &'a str,
    pub transaction_id: Option<&'a str>,
    pub subtotal: &'a BigDecimal,
    pub delivery_charge: &'a BigDecimal,
    pub total_amount: &'a BigDecimal,
    pub status: &'a str,
    pub invoice_date: DateTime<Utc>,
}

// ── Settings and content ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SettingRow {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = settings)]
pub struct NewSettingRow<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sliders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SliderRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = sliders)]
#[diesel(treat_none_as_null = true)]
pub struct SliderFields<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub image_url: &'a str,
    pub link_url: Option<&'a str>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = banners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BannerRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub position: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = banners)]
#[diesel(treat_none_as_null = true)]
pub struct BannerFields<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub image_url: &'a str,
    pub link_url: Option<&'a str>,
    pub position: &'a str,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = notices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NoticeRow {
    pub id: Uuid,
    pub text: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notices)]
pub struct NewNoticeRow<'a> {
    pub id: Uuid,
    pub text: &'a str,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = info_cards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InfoCardRow {
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
    pub updated_at: DateTime<Utc>,
}

/// The only columns the back office may change.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = info_cards)]
pub struct InfoCardChanges<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::catalog::{
    Category, CategoryChanges, CategoryInput, Page, Product, ProductChanges, ProductDetail,
    ProductFilter, ProductInput,
};
use super::content::{
    InfoCard, InfoCardUpdate, Notice, NoticeInput, Showcase, ShowcaseInput, ShowcaseKind,
};
use super::errors::DomainError;
use super::invoice::InvoiceView;
use super::order::{
    IncompleteDraft, OrderCounts, OrderDraft, OrderScope, OrderStatus, OrderUpdate, OrderView,
    PlacedOrder,
};
use super::user::{CustomerSummary, User};

pub trait CatalogRepository: Send + Sync + 'static {
    fn list_categories(&self, active_only: bool) -> Result<Vec<Category>, DomainError>;
    fn find_category(&self, id: Uuid) -> Result<Option<Category>, DomainError>;
    fn create_category(
        &self,
        id: Uuid,
        slug: &str,
        input: &CategoryInput,
    ) -> Result<Category, DomainError>;
    /// `slug` is only supplied when the name changed.
    fn update_category(
        &self,
        id: Uuid,
        slug: Option<&str>,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, DomainError>;
    fn delete_category(&self, id: Uuid) -> Result<bool, DomainError>;
    fn count_products_in_category(&self, id: Uuid) -> Result<i64, DomainError>;

    fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<Page<Product>, DomainError>;
    fn find_product(&self, id: Uuid) -> Result<Option<ProductDetail>, DomainError>;
    fn find_product_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>, DomainError>;
    fn create_product(
        &self,
        id: Uuid,
        slug: &str,
        input: &ProductInput,
    ) -> Result<ProductDetail, DomainError>;
    /// Variations, when present in `changes`, replace the whole set.
    fn update_product(
        &self,
        id: Uuid,
        slug: Option<&str>,
        changes: &ProductChanges,
    ) -> Result<Option<ProductDetail>, DomainError>;
    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError>;
    /// Lowest stock first, at most `limit` products with `stock <= threshold`.
    fn low_stock_products(&self, threshold: i32, limit: i64) -> Result<Vec<Product>, DomainError>;
    fn count_products(&self) -> Result<i64, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Order row, line items, optional invoice and optional profile update
    /// in one transaction. A clashing order number is a `Conflict`.
    fn place(&self, draft: &OrderDraft) -> Result<PlacedOrder, DomainError>;
    /// Insert-or-update on `capture_key`; returns the row id.
    fn upsert_incomplete(&self, draft: &IncompleteDraft) -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, scope: OrderScope, page: i64, limit: i64)
        -> Result<Page<OrderView>, DomainError>;
    /// Every order in `scope`, newest first.
    fn all(&self, scope: OrderScope) -> Result<Vec<OrderView>, DomainError>;
    /// Applies `update` only while the order still holds `expected`.
    /// Returns `false` when no row matched.
    fn update(
        &self,
        id: Uuid,
        expected: OrderStatus,
        update: &OrderUpdate,
    ) -> Result<bool, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    /// One statement: orders in `ids` whose status is in `from` move to
    /// `status`. Returns the number of rows changed.
    fn bulk_update_status(
        &self,
        ids: &[Uuid],
        status: OrderStatus,
        from: &[OrderStatus],
    ) -> Result<usize, DomainError>;
    fn bulk_delete(&self, ids: &[Uuid]) -> Result<usize, DomainError>;
    fn counts(&self) -> Result<OrderCounts, DomainError>;
    fn count_placed(&self) -> Result<i64, DomainError>;
    /// Sum of totals over placed orders that were not cancelled.
    fn revenue(&self) -> Result<BigDecimal, DomainError>;
    fn list_invoices(&self, page: i64, limit: i64) -> Result<Page<InvoiceView>, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn find_by_api_token(&self, token: &str) -> Result<Option<User>, DomainError>;
    fn set_api_token(&self, user_id: Uuid, token: &str) -> Result<bool, DomainError>;
    fn list_customers(&self, page: i64, limit: i64)
        -> Result<Page<CustomerSummary>, DomainError>;
    fn count_customers(&self) -> Result<i64, DomainError>;
}

pub trait SettingsRepository: Send + Sync + 'static {
    fn load(&self) -> Result<HashMap<String, String>, DomainError>;
    fn save(&self, pairs: &[(&'static str, String)]) -> Result<(), DomainError>;
}

pub trait ContentRepository: Send + Sync + 'static {
    fn list_showcases(
        &self,
        kind: ShowcaseKind,
        active_only: bool,
    ) -> Result<Vec<Showcase>, DomainError>;
    fn find_showcase(&self, kind: ShowcaseKind, id: Uuid) -> Result<Option<Showcase>, DomainError>;
    /// A `sort_order` of 0 shifts the rest down and stores this one at 1.
    fn create_showcase(
        &self,
        kind: ShowcaseKind,
        input: &ShowcaseInput,
    ) -> Result<Showcase, DomainError>;
    fn update_showcase(
        &self,
        kind: ShowcaseKind,
        id: Uuid,
        input: &ShowcaseInput,
    ) -> Result<Option<Showcase>, DomainError>;
    fn delete_showcase(&self, kind: ShowcaseKind, id: Uuid) -> Result<bool, DomainError>;

    fn list_notices(&self, active_only: bool) -> Result<Vec<Notice>, DomainError>;
    fn create_notice(&self, input: &NoticeInput) -> Result<Notice, DomainError>;
    fn delete_notice(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Ordered by `sort_order`.
    fn list_info_cards(&self, active_only: bool) -> Result<Vec<InfoCard>, DomainError>;
    fn update_info_card(
        &self,
        id: Uuid,
        update: &InfoCardUpdate,
    ) -> Result<Option<InfoCard>, DomainError>;
}

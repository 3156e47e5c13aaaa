//! In-memory repositories for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use uuid::Uuid;

use crate::domain::catalog::{
    Category, CategoryChanges, CategoryInput, Page, Product, ProductChanges, ProductDetail,
    ProductFilter, ProductInput, ProductVariation, VariationInput,
};
use crate::domain::content::{
    InfoCard, InfoCardUpdate, Notice, NoticeInput, Showcase, ShowcaseInput, ShowcaseKind,
};
use crate::domain::errors::DomainError;
use crate::domain::invoice::{InvoiceDraft, InvoiceStatus, InvoiceView};
use crate::domain::order::{
    IncompleteDraft, LineDraft, OrderCounts, OrderDraft, OrderItemView, OrderScope, OrderStatus,
    OrderUpdate, OrderView, PlacedOrder,
};
use crate::domain::ports::{
    CatalogRepository, ContentRepository, OrderRepository, SettingsRepository, UserRepository,
};
use crate::domain::user::{CustomerSummary, User};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().expect("fake repository lock")
}

fn paginate<T: Clone>(items: &[T], page: i64, limit: i64) -> Page<T> {
    let start = ((page - 1) * limit) as usize;
    Page {
        items: items.iter().skip(start).take(limit as usize).cloned().collect(),
        total: items.len() as i64,
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CatalogState {
    pub categories: Vec<Category>,
    pub products: Vec<ProductDetail>,
}

#[derive(Clone, Default)]
pub struct FakeCatalog {
    pub state: Arc<Mutex<CatalogState>>,
}

fn build_variations(product_id: Uuid, inputs: &[VariationInput]) -> Vec<ProductVariation> {
    inputs
        .iter()
        .map(|v| ProductVariation {
            id: Uuid::new_v4(),
            product_id,
            name: v.name.clone(),
            value: v.value.clone(),
            price_adjustment: v.price_adjustment.clone(),
            stock: v.stock,
            sku: v.sku.clone(),
            is_active: true,
        })
        .collect()
}

impl FakeCatalog {
    pub fn add_category(&self, name: &str) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: crate::domain::catalog::slugify(name),
            description: None,
            is_active: true,
            products_count: 0,
        };
        lock(&self.state).categories.push(category.clone());
        category
    }

    pub fn add_product(
        &self,
        category_id: Uuid,
        name: &str,
        price: BigDecimal,
        sale_price: Option<BigDecimal>,
        variations: &[VariationInput],
    ) -> ProductDetail {
        let id = Uuid::new_v4();
        let detail = ProductDetail {
            product: Product {
                id,
                category_id,
                category_name: None,
                name: name.to_string(),
                slug: crate::domain::catalog::slugify(name),
                description: String::new(),
                price,
                sale_price,
                stock: 20,
                images: vec![],
                is_active: true,
                is_featured: false,
                created_at: Utc::now(),
            },
            variations: build_variations(id, variations),
        };
        lock(&self.state).products.push(detail.clone());
        detail
    }
}

impl CatalogRepository for FakeCatalog {
    fn list_categories(&self, active_only: bool) -> Result<Vec<Category>, DomainError> {
        let state = lock(&self.state);
        Ok(state
            .categories
            .iter()
            .filter(|c| !active_only || c.is_active)
            .map(|c| Category {
                products_count: state
                    .products
                    .iter()
                    .filter(|p| p.product.category_id == c.id)
                    .count() as i64,
                ..c.clone()
            })
            .collect())
    }

    fn find_category(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        Ok(lock(&self.state).categories.iter().find(|c| c.id == id).cloned())
    }

    fn create_category(
        &self,
        id: Uuid,
        slug: &str,
        input: &CategoryInput,
    ) -> Result<Category, DomainError> {
        let mut state = lock(&self.state);
        if state.categories.iter().any(|c| c.name == input.name) {
            return Err(DomainError::Conflict("category name taken".to_string()));
        }
        let category = Category {
            id,
            name: input.name.clone(),
            slug: slug.to_string(),
            description: input.description.clone(),
            is_active: input.is_active,
            products_count: 0,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    fn update_category(
        &self,
        id: Uuid,
        slug: Option<&str>,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, DomainError> {
        let mut state = lock(&self.state);
        let Some(category) = state.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            category.name = name.clone();
        }
        if let Some(slug) = slug {
            category.slug = slug.to_string();
        }
        if let Some(description) = &changes.description {
            category.description = Some(description.clone());
        }
        if let Some(active) = changes.is_active {
            category.is_active = active;
        }
        Ok(Some(category.clone()))
    }

    fn delete_category(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = lock(&self.state);
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        Ok(state.categories.len() < before)
    }

    fn count_products_in_category(&self, id: Uuid) -> Result<i64, DomainError> {
        Ok(lock(&self.state)
            .products
            .iter()
            .filter(|p| p.product.category_id == id)
            .count() as i64)
    }

    fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<Page<Product>, DomainError> {
        let state = lock(&self.state);
        let category_by_slug = filter.category_slug.as_ref().and_then(|slug| {
            state
                .categories
                .iter()
                .find(|c| &c.slug == slug)
                .map(|c| c.id)
        });
        let mut matching: Vec<Product> = state
            .products
            .iter()
            .map(|d| &d.product)
            .filter(|p| !filter.active_only || p.is_active)
            .filter(|p| !filter.featured_only || p.is_featured)
            .filter(|p| filter.category_id.map_or(true, |id| p.category_id == id))
            .filter(|p| filter.exclude_id.map_or(true, |id| p.id != id))
            .filter(|p| {
                filter.category_slug.is_none() || Some(p.category_id) == category_by_slug
            })
            .filter(|p| {
                filter.search.as_ref().map_or(true, |q| {
                    p.name.to_lowercase().contains(&q.to_lowercase())
                })
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(&matching, page, limit))
    }

    fn find_product(&self, id: Uuid) -> Result<Option<ProductDetail>, DomainError> {
        Ok(lock(&self.state)
            .products
            .iter()
            .find(|d| d.product.id == id)
            .cloned())
    }

    fn find_product_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>, DomainError> {
        Ok(lock(&self.state)
            .products
            .iter()
            .find(|d| d.product.slug == slug)
            .cloned())
    }

    fn create_product(
        &self,
        id: Uuid,
        slug: &str,
        input: &ProductInput,
    ) -> Result<ProductDetail, DomainError> {
        let mut state = lock(&self.state);
        if state.products.iter().any(|d| d.product.slug == slug) {
            return Err(DomainError::Conflict("product slug taken".to_string()));
        }
        let detail = ProductDetail {
            product: Product {
                id,
                category_id: input.category_id,
                category_name: None,
                name: input.name.clone(),
                slug: slug.to_string(),
                description: input.description.clone(),
                price: input.price.clone(),
                sale_price: input.sale_price.clone(),
                stock: input.stock,
                images: input.images.clone(),
                is_active: input.is_active,
                is_featured: input.is_featured,
                created_at: Utc::now(),
            },
            variations: build_variations(id, &input.variations),
        };
        state.products.push(detail.clone());
        Ok(detail)
    }

    fn update_product(
        &self,
        id: Uuid,
        slug: Option<&str>,
        changes: &ProductChanges,
    ) -> Result<Option<ProductDetail>, DomainError> {
        let mut state = lock(&self.state);
        let Some(detail) = state.products.iter_mut().find(|d| d.product.id == id) else {
            return Ok(None);
        };
        let p = &mut detail.product;
        if let Some(name) = &changes.name {
            p.name = name.clone();
        }
        if let Some(slug) = slug {
            p.slug = slug.to_string();
        }
        if let Some(category_id) = changes.category_id {
            p.category_id = category_id;
        }
        if let Some(price) = &changes.price {
            p.price = price.clone();
        }
        if let Some(sale) = &changes.sale_price {
            p.sale_price = sale.clone();
        }
        if let Some(stock) = changes.stock {
            p.stock = stock;
        }
        if let Some(variations) = &changes.variations {
            detail.variations = build_variations(id, variations);
        }
        Ok(Some(detail.clone()))
    }

    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = lock(&self.state);
        let before = state.products.len();
        state.products.retain(|d| d.product.id != id);
        Ok(state.products.len() < before)
    }

    fn low_stock_products(&self, threshold: i32, limit: i64) -> Result<Vec<Product>, DomainError> {
        let state = lock(&self.state);
        let mut low: Vec<Product> = state
            .products
            .iter()
            .map(|d| d.product.clone())
            .filter(|p| p.stock <= threshold)
            .collect();
        low.sort_by_key(|p| p.stock);
        low.truncate(limit as usize);
        Ok(low)
    }

    fn count_products(&self) -> Result<i64, DomainError> {
        Ok(lock(&self.state).products.len() as i64)
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct OrderState {
    pub orders: Vec<OrderView>,
    pub invoices: Vec<InvoiceView>,
    pub capture_keys: HashMap<String, Uuid>,
    pub profile_updates: Vec<(Uuid, String, String, String)>,
    pub invoice_seq: i64,
    /// Number of upcoming `place` calls that fail with a number clash.
    pub forced_conflicts: u32,
    pub fail_upserts: bool,
}

#[derive(Clone, Default)]
pub struct FakeOrders {
    pub state: Arc<Mutex<OrderState>>,
}

fn item_view(line: &LineDraft) -> OrderItemView {
    OrderItemView {
        id: Uuid::new_v4(),
        product_id: Some(line.product_id),
        product_name: line.product_name.clone(),
        quantity: line.quantity,
        unit_price: line.unit_price.clone(),
        variations: line.variations.clone(),
    }
}

fn in_scope(order: &OrderView, scope: OrderScope) -> bool {
    match scope {
        OrderScope::Incomplete => order.status == OrderStatus::Incomplete,
        OrderScope::Placed(None) => order.status != OrderStatus::Incomplete,
        OrderScope::Placed(Some(status)) => order.status == status,
    }
}

impl FakeOrders {
    pub fn order_count(&self) -> usize {
        lock(&self.state).orders.len()
    }

    pub fn invoice_count(&self) -> usize {
        lock(&self.state).invoices.len()
    }
}

impl OrderRepository for FakeOrders {
    fn place(&self, draft: &OrderDraft) -> Result<PlacedOrder, DomainError> {
        let mut state = lock(&self.state);
        if state.forced_conflicts > 0 {
            state.forced_conflicts -= 1;
            return Err(DomainError::Conflict("order number taken".to_string()));
        }
        if state
            .orders
            .iter()
            .any(|o| o.order_number == draft.order_number)
        {
            return Err(DomainError::Conflict("order number taken".to_string()));
        }
        let now = Utc::now();
        let id = Uuid::new_v4();
        let invoice_number = if draft.issue_invoice {
            state.invoice_seq += 1;
            let invoice = InvoiceDraft::for_order(draft, now);
            let number = invoice.number(state.invoice_seq);
            state.invoices.push(InvoiceView {
                id: Uuid::new_v4(),
                invoice_number: number.clone(),
                order_id: id,
                order_number: draft.order_number.clone(),
                customer_name: invoice.customer_name,
                customer_phone: invoice.customer_phone,
                delivery_address: invoice.delivery_address,
                payment_method: invoice.payment_method,
                transaction_id: invoice.transaction_id,
                subtotal: invoice.subtotal,
                delivery_charge: invoice.delivery_charge,
                total_amount: invoice.total_amount,
                status: InvoiceStatus::Pending,
                invoice_date: invoice.invoice_date,
            });
            Some(number)
        } else {
            None
        };
        if draft.update_profile {
            if let Some(user_id) = draft.user_id {
                state.profile_updates.push((
                    user_id,
                    draft.customer.name.clone(),
                    draft.customer.phone.clone(),
                    draft.customer.address.clone(),
                ));
            }
        }
        state.orders.push(OrderView {
            id,
            order_number: draft.order_number.clone(),
            user_id: draft.user_id,
            session_id: None,
            customer_name: draft.customer.name.clone(),
            customer_phone: draft.customer.phone.clone(),
            customer_address: Some(draft.customer.address.clone()),
            total: draft.total.clone(),
            status: draft.status,
            payment_method: draft.payment_method,
            transaction_id: draft.transaction_id.clone(),
            invoice_number: invoice_number.clone(),
            created_at: now,
            updated_at: now,
            items: draft.items.iter().map(item_view).collect(),
        });
        Ok(PlacedOrder {
            order_id: id,
            order_number: draft.order_number.clone(),
            invoice_number,
        })
    }

    fn upsert_incomplete(&self, draft: &IncompleteDraft) -> Result<Uuid, DomainError> {
        let mut state = lock(&self.state);
        if state.fail_upserts {
            return Err(DomainError::Internal("database unavailable".to_string()));
        }
        let now = Utc::now();
        if let Some(id) = state.capture_keys.get(&draft.capture_key).copied() {
            if let Some(order) = state.orders.iter_mut().find(|o| o.id == id) {
                order.customer_name = draft.customer_name.clone();
                order.customer_phone = draft.customer_phone.clone();
                order.customer_address = draft.customer_address.clone();
                order.total = draft.total.clone();
                order.items = vec![item_view(&draft.item)];
                order.updated_at = now;
            }
            return Ok(id);
        }
        let id = Uuid::new_v4();
        state.capture_keys.insert(draft.capture_key.clone(), id);
        state.orders.push(OrderView {
            id,
            order_number: draft.order_number.clone(),
            user_id: None,
            session_id: Some(draft.session_id.clone()),
            customer_name: draft.customer_name.clone(),
            customer_phone: draft.customer_phone.clone(),
            customer_address: draft.customer_address.clone(),
            total: draft.total.clone(),
            status: OrderStatus::Incomplete,
            payment_method: None,
            transaction_id: None,
            invoice_number: None,
            created_at: now,
            updated_at: now,
            items: vec![item_view(&draft.item)],
        });
        Ok(id)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        Ok(lock(&self.state).orders.iter().find(|o| o.id == id).cloned())
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        Ok(lock(&self.state)
            .orders
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    fn list(
        &self,
        scope: OrderScope,
        page: i64,
        limit: i64,
    ) -> Result<Page<OrderView>, DomainError> {
        let all = self.all(scope)?;
        Ok(paginate(&all, page, limit))
    }

    fn all(&self, scope: OrderScope) -> Result<Vec<OrderView>, DomainError> {
        let state = lock(&self.state);
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| in_scope(o, scope))
            .cloned()
            .collect())
    }

    fn update(
        &self,
        id: Uuid,
        expected: OrderStatus,
        update: &OrderUpdate,
    ) -> Result<bool, DomainError> {
        let mut state = lock(&self.state);
        let Some(order) = state
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == expected)
        else {
            return Ok(false);
        };
        order.status = update.status;
        if let Some(name) = &update.customer_name {
            order.customer_name = name.clone();
        }
        if let Some(phone) = &update.customer_phone {
            order.customer_phone = phone.clone();
        }
        if let Some(address) = &update.customer_address {
            order.customer_address = Some(address.clone());
        }
        if let Some(total) = &update.total {
            order.total = total.clone();
        }
        if update.status != OrderStatus::Incomplete {
            state.capture_keys.retain(|_, order_id| *order_id != id);
        }
        Ok(true)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.bulk_delete(&[id])? == 1)
    }

    fn bulk_update_status(
        &self,
        ids: &[Uuid],
        status: OrderStatus,
        from: &[OrderStatus],
    ) -> Result<usize, DomainError> {
        let mut state = lock(&self.state);
        let mut updated = 0;
        for order in state.orders.iter_mut() {
            if ids.contains(&order.id) && from.contains(&order.status) {
                order.status = status;
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn bulk_delete(&self, ids: &[Uuid]) -> Result<usize, DomainError> {
        let mut state = lock(&self.state);
        let before = state.orders.len();
        state.orders.retain(|o| !ids.contains(&o.id));
        state.invoices.retain(|i| !ids.contains(&i.order_id));
        Ok(before - state.orders.len())
    }

    fn counts(&self) -> Result<OrderCounts, DomainError> {
        let state = lock(&self.state);
        let count = |status| state.orders.iter().filter(|o| o.status == status).count() as i64;
        Ok(OrderCounts {
            pending: count(OrderStatus::Pending),
            incomplete: count(OrderStatus::Incomplete),
        })
    }

    fn count_placed(&self) -> Result<i64, DomainError> {
        Ok(self.all(OrderScope::Placed(None))?.len() as i64)
    }

    fn revenue(&self) -> Result<BigDecimal, DomainError> {
        Ok(self
            .all(OrderScope::Placed(None))?
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .fold(BigDecimal::zero(), |acc, o| acc + &o.total))
    }

    fn list_invoices(&self, page: i64, limit: i64) -> Result<Page<InvoiceView>, DomainError> {
        let state = lock(&self.state);
        let newest_first: Vec<InvoiceView> = state.invoices.iter().rev().cloned().collect();
        Ok(paginate(&newest_first, page, limit))
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeUsers {
    pub users: Arc<Mutex<Vec<(User, Option<String>)>>>,
}

impl FakeUsers {
    pub fn add(&self, name: &str, is_admin: bool, token: Option<&str>) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            address: None,
            is_admin,
        };
        lock(&self.users).push((user.clone(), token.map(str::to_string)));
        user
    }

    pub fn token_of(&self, user_id: Uuid) -> Option<String> {
        lock(&self.users)
            .iter()
            .find(|(u, _)| u.id == user_id)
            .and_then(|(_, t)| t.clone())
    }
}

impl UserRepository for FakeUsers {
    fn find_by_api_token(&self, token: &str) -> Result<Option<User>, DomainError> {
        Ok(lock(&self.users)
            .iter()
            .find(|(_, t)| t.as_deref() == Some(token))
            .map(|(u, _)| u.clone()))
    }

    fn set_api_token(&self, user_id: Uuid, token: &str) -> Result<bool, DomainError> {
        let mut users = lock(&self.users);
        match users.iter_mut().find(|(u, _)| u.id == user_id) {
            Some(entry) => {
                entry.1 = Some(token.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn list_customers(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<Page<CustomerSummary>, DomainError> {
        let customers: Vec<CustomerSummary> = lock(&self.users)
            .iter()
            .filter(|(u, _)| !u.is_admin)
            .map(|(u, _)| CustomerSummary {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                phone: u.phone.clone(),
                address: u.address.clone(),
                total_orders: 0,
                joined: Utc::now(),
            })
            .collect();
        Ok(paginate(&customers, page, limit))
    }

    fn count_customers(&self) -> Result<i64, DomainError> {
        Ok(lock(&self.users).iter().filter(|(u, _)| !u.is_admin).count() as i64)
    }
}

// ── Settings ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeSettings {
    pub pairs: Arc<Mutex<HashMap<String, String>>>,
    pub loads: Arc<Mutex<usize>>,
}

impl SettingsRepository for FakeSettings {
    fn load(&self) -> Result<HashMap<String, String>, DomainError> {
        *lock(&self.loads) += 1;
        Ok(lock(&self.pairs).clone())
    }

    fn save(&self, pairs: &[(&'static str, String)]) -> Result<(), DomainError> {
        let mut stored = lock(&self.pairs);
        for (key, value) in pairs {
            stored.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

// ── Content ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ContentState {
    pub sliders: Vec<Showcase>,
    pub banners: Vec<Showcase>,
    pub notices: Vec<Notice>,
    pub info_cards: Vec<InfoCard>,
}

#[derive(Clone, Default)]
pub struct FakeContent {
    pub state: Arc<Mutex<ContentState>>,
}

fn rows(state: &mut ContentState, kind: ShowcaseKind) -> &mut Vec<Showcase> {
    match kind {
        ShowcaseKind::Slider => &mut state.sliders,
        ShowcaseKind::Banner => &mut state.banners,
    }
}

fn place_first(rows: &mut [Showcase], input: &ShowcaseInput, except: Option<Uuid>) -> i32 {
    if input.sort_order != 0 {
        return input.sort_order;
    }
    for row in rows.iter_mut().filter(|r| Some(r.id) != except) {
        row.sort_order += 1;
    }
    1
}

impl ContentRepository for FakeContent {
    fn list_showcases(
        &self,
        kind: ShowcaseKind,
        active_only: bool,
    ) -> Result<Vec<Showcase>, DomainError> {
        let mut state = lock(&self.state);
        let mut list: Vec<Showcase> = rows(&mut state, kind)
            .iter()
            .filter(|s| !active_only || s.is_active)
            .cloned()
            .collect();
        list.sort_by_key(|s| s.sort_order);
        Ok(list)
    }

    fn find_showcase(&self, kind: ShowcaseKind, id: Uuid) -> Result<Option<Showcase>, DomainError> {
        let mut state = lock(&self.state);
        Ok(rows(&mut state, kind).iter().find(|s| s.id == id).cloned())
    }

    fn create_showcase(
        &self,
        kind: ShowcaseKind,
        input: &ShowcaseInput,
    ) -> Result<Showcase, DomainError> {
        let mut state = lock(&self.state);
        let list = rows(&mut state, kind);
        let sort_order = place_first(list, input, None);
        let showcase = Showcase {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            link_url: input.link_url.clone(),
            position: input.position.clone(),
            sort_order,
            is_active: input.is_active,
            created_at: Utc::now(),
        };
        list.push(showcase.clone());
        Ok(showcase)
    }

    fn update_showcase(
        &self,
        kind: ShowcaseKind,
        id: Uuid,
        input: &ShowcaseInput,
    ) -> Result<Option<Showcase>, DomainError> {
        let mut state = lock(&self.state);
        let list = rows(&mut state, kind);
        if !list.iter().any(|s| s.id == id) {
            return Ok(None);
        }
        let sort_order = place_first(list, input, Some(id));
        let Some(row) = list.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        row.title = input.title.clone();
        row.description = input.description.clone();
        row.image_url = input.image_url.clone();
        row.link_url = input.link_url.clone();
        row.position = input.position.clone();
        row.sort_order = sort_order;
        row.is_active = input.is_active;
        Ok(Some(row.clone()))
    }

    fn delete_showcase(&self, kind: ShowcaseKind, id: Uuid) -> Result<bool, DomainError> {
        let mut state = lock(&self.state);
        let list = rows(&mut state, kind);
        let before = list.len();
        list.retain(|s| s.id != id);
        Ok(list.len() < before)
    }

    fn list_notices(&self, active_only: bool) -> Result<Vec<Notice>, DomainError> {
        Ok(lock(&self.state)
            .notices
            .iter()
            .rev()
            .filter(|n| !active_only || n.is_active)
            .cloned()
            .collect())
    }

    fn create_notice(&self, input: &NoticeInput) -> Result<Notice, DomainError> {
        let notice = Notice {
            id: Uuid::new_v4(),
            text: input.text.clone(),
            is_active: input.is_active,
            created_at: Utc::now(),
        };
        lock(&self.state).notices.push(notice.clone());
        Ok(notice)
    }

    fn delete_notice(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = lock(&self.state);
        let before = state.notices.len();
        state.notices.retain(|n| n.id != id);
        Ok(state.notices.len() < before)
    }

    fn list_info_cards(&self, active_only: bool) -> Result<Vec<InfoCard>, DomainError> {
        let mut cards: Vec<InfoCard> = lock(&self.state)
            .info_cards
            .iter()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        cards.sort_by_key(|c| c.sort_order);
        Ok(cards)
    }

    fn update_info_card(
        &self,
        id: Uuid,
        update: &InfoCardUpdate,
    ) -> Result<Option<InfoCard>, DomainError> {
        let mut state = lock(&self.state);
        let Some(card) = state.info_cards.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        card.title = update.title.clone();
        card.subtitle = update.subtitle.clone();
        card.is_active = update.is_active;
        card.updated_at = Utc::now();
        Ok(Some(card.clone()))
    }
}

//! Back-office endpoints under `/admin`: dashboard, invoices, customers,
//! store settings, promotional content and key rotation. Catalog and order
//! administration live with their API counterparts.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::content::{InfoCardUpdate, NoticeInput, ShowcaseInput, ShowcaseKind};
use crate::domain::order::OrderCounts;
use crate::domain::pricing::round_money;
use crate::domain::report::DashboardStats;
use crate::domain::settings::StoreSettings;
use crate::domain::user::CustomerSummary;
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::AdminUser;
use super::dto::{
    InfoCardResponse, InvoiceResponse, NoticeResponse, OrderResponse, ProductResponse,
    ShowcaseResponse,
};
use super::{blocking, ListParams, PageResponse};

// ── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_customers: i64,
    pub total_revenue: String,
    pub order_counts: OrderCounts,
    pub recent_orders: Vec<OrderResponse>,
    pub low_stock_products: Vec<ProductResponse>,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(s: DashboardStats) -> Self {
        Self {
            total_products: s.total_products,
            total_orders: s.total_orders,
            total_customers: s.total_customers,
            total_revenue: round_money(&s.total_revenue).to_string(),
            order_counts: s.order_counts,
            recent_orders: s.recent_orders.into_iter().map(Into::into).collect(),
            low_stock_products: s.low_stock_products.into_iter().map(Into::into).collect(),
        }
    }
}

pub async fn dashboard(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stats = blocking(move || state.reports.dashboard()).await?;
    Ok(HttpResponse::Ok().json(DashboardResponse::from(stats)))
}

// ── Invoices and customers ───────────────────────────────────────────────────

pub async fn list_invoices(
    _admin: AdminUser,
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let bounds = params.bounds();
    let page = blocking(move || state.orders.list_invoices(bounds.0, bounds.1)).await?;
    Ok(HttpResponse::Ok().json(PageResponse::new(
        page.items.into_iter().map(InvoiceResponse::from).collect(),
        page.total,
        bounds,
    )))
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub total_orders: i64,
    pub joined: String,
}

impl From<CustomerSummary> for CustomerResponse {
    fn from(c: CustomerSummary) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            address: c.address,
            total_orders: c.total_orders,
            joined: c.joined.to_rfc3339(),
        }
    }
}

pub async fn list_customers(
    _admin: AdminUser,
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let bounds = params.bounds();
    let page = blocking(move || state.accounts.customers(bounds.0, bounds.1)).await?;
    Ok(HttpResponse::Ok().json(PageResponse::new(
        page.items.into_iter().map(CustomerResponse::from).collect(),
        page.total,
        bounds,
    )))
}

// ── Settings ─────────────────────────────────────────────────────────────────

/// Only the fields present are changed.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsRequest {
    pub store_name: Option<String>,
    pub store_description: Option<String>,
    pub support_email: Option<String>,
    pub support_phone: Option<String>,
    pub logo: Option<String>,
    pub offer_title: Option<String>,
    pub offer_countdown_text: Option<String>,
    pub cod_enabled: Option<bool>,
    pub bkash_enabled: Option<bool>,
    pub nagad_enabled: Option<bool>,
    pub bkash_number: Option<String>,
    pub bkash_instructions: Option<String>,
    pub nagad_number: Option<String>,
    pub nagad_instructions: Option<String>,
}

fn patch<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl SettingsRequest {
    pub fn apply(self, mut settings: StoreSettings) -> StoreSettings {
        patch(&mut settings.store_name, self.store_name);
        patch(&mut settings.store_description, self.store_description);
        patch(&mut settings.support_email, self.support_email);
        patch(&mut settings.support_phone, self.support_phone);
        patch(&mut settings.logo, self.logo);
        patch(&mut settings.offer_title, self.offer_title);
        patch(&mut settings.offer_countdown_text, self.offer_countdown_text);
        patch(&mut settings.cod_enabled, self.cod_enabled);
        patch(&mut settings.bkash_enabled, self.bkash_enabled);
        patch(&mut settings.nagad_enabled, self.nagad_enabled);
        patch(&mut settings.bkash_number, self.bkash_number);
        patch(&mut settings.bkash_instructions, self.bkash_instructions);
        patch(&mut settings.nagad_number, self.nagad_number);
        patch(&mut settings.nagad_instructions, self.nagad_instructions);
        settings
    }
}

pub async fn get_settings(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let settings = blocking(move || state.settings.current()).await?;
    Ok(HttpResponse::Ok().json(settings))
}

pub async fn update_settings(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<SettingsRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let settings = blocking(move || {
        let merged = request.apply(state.settings.current()?);
        state.settings.update(merged)
    })
    .await?;
    Ok(HttpResponse::Ok().json(settings))
}

// ── Sliders and banners ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ShowcaseRequest {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    /// Banners only; defaults to `home`.
    pub position: Option<String>,
    /// `0` puts the entry first.
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl From<ShowcaseRequest> for ShowcaseInput {
    fn from(r: ShowcaseRequest) -> Self {
        ShowcaseInput {
            title: r.title,
            description: r.description.filter(|d| !d.trim().is_empty()),
            image_url: r.image_url,
            link_url: r.link_url.filter(|l| !l.trim().is_empty()),
            position: r.position.filter(|p| !p.trim().is_empty()),
            sort_order: r.sort_order,
            is_active: r.is_active,
        }
    }
}

async fn list_showcases(
    state: web::Data<AppState>,
    kind: ShowcaseKind,
) -> Result<HttpResponse, AppError> {
    let items = blocking(move || state.content.list(kind, false)).await?;
    let items: Vec<ShowcaseResponse> = items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

async fn get_showcase(
    state: web::Data<AppState>,
    kind: ShowcaseKind,
    id: Uuid,
) -> Result<HttpResponse, AppError> {
    let item = blocking(move || state.content.get(kind, id)).await?;
    Ok(HttpResponse::Ok().json(ShowcaseResponse::from(item)))
}

async fn create_showcase(
    state: web::Data<AppState>,
    kind: ShowcaseKind,
    body: ShowcaseRequest,
) -> Result<HttpResponse, AppError> {
    let input = ShowcaseInput::from(body);
    let item = blocking(move || state.content.create(kind, input)).await?;
    Ok(HttpResponse::Created().json(ShowcaseResponse::from(item)))
}

async fn update_showcase(
    state: web::Data<AppState>,
    kind: ShowcaseKind,
    id: Uuid,
    body: ShowcaseRequest,
) -> Result<HttpResponse, AppError> {
    let input = ShowcaseInput::from(body);
    let item = blocking(move || state.content.update(kind, id, input)).await?;
    Ok(HttpResponse::Ok().json(ShowcaseResponse::from(item)))
}

async fn delete_showcase(
    state: web::Data<AppState>,
    kind: ShowcaseKind,
    id: Uuid,
) -> Result<HttpResponse, AppError> {
    blocking(move || state.content.delete(kind, id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_sliders(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    list_showcases(state, ShowcaseKind::Slider).await
}

pub async fn get_slider(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    get_showcase(state, ShowcaseKind::Slider, path.into_inner()).await
}

pub async fn create_slider(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<ShowcaseRequest>,
) -> Result<HttpResponse, AppError> {
    create_showcase(state, ShowcaseKind::Slider, body.into_inner()).await
}

pub async fn update_slider(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ShowcaseRequest>,
) -> Result<HttpResponse, AppError> {
    update_showcase(state, ShowcaseKind::Slider, path.into_inner(), body.into_inner()).await
}

pub async fn delete_slider(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    delete_showcase(state, ShowcaseKind::Slider, path.into_inner()).await
}

pub async fn list_banners(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    list_showcases(state, ShowcaseKind::Banner).await
}

pub async fn get_banner(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    get_showcase(state, ShowcaseKind::Banner, path.into_inner()).await
}

pub async fn create_banner(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<ShowcaseRequest>,
) -> Result<HttpResponse, AppError> {
    create_showcase(state, ShowcaseKind::Banner, body.into_inner()).await
}

pub async fn update_banner(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ShowcaseRequest>,
) -> Result<HttpResponse, AppError> {
    update_showcase(state, ShowcaseKind::Banner, path.into_inner(), body.into_inner()).await
}

pub async fn delete_banner(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    delete_showcase(state, ShowcaseKind::Banner, path.into_inner()).await
}

// ── Notices ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NoticeRequest {
    pub text: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

pub async fn list_notices(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let notices = blocking(move || state.content.notices(false)).await?;
    let notices: Vec<NoticeResponse> = notices.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(notices))
}

pub async fn create_notice(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<NoticeRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = NoticeInput {
        text: body.text,
        is_active: body.is_active,
    };
    let notice = blocking(move || state.content.create_notice(input)).await?;
    Ok(HttpResponse::Created().json(NoticeResponse::from(notice)))
}

pub async fn delete_notice(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(move || state.content.delete_notice(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Info cards ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InfoCardRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Every card, hidden ones included, by sort order.
pub async fn list_info_cards(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let cards = blocking(move || state.content.info_cards(false)).await?;
    let cards: Vec<InfoCardResponse> = cards.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(cards))
}

/// Only the wording and visibility change; icon, colours and order are fixed.
pub async fn update_info_card(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<InfoCardRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let update = InfoCardUpdate {
        title: body.title,
        subtitle: body.subtitle,
        is_active: body.is_active,
    };
    let card = blocking(move || state.content.update_info_card(id, update)).await?;
    Ok(HttpResponse::Ok().json(InfoCardResponse::from(card)))
}

// ── API keys ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

/// Rotate the calling admin's own key. The old key stops working at once.
pub async fn generate_api_key(
    admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = admin.0.id;
    let api_key = blocking(move || state.accounts.rotate_api_key(user_id)).await?;
    Ok(HttpResponse::Ok().json(ApiKeyResponse { api_key }))
}

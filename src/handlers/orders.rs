//! Order management for staff (`/admin/orders`) and API clients
//! (`/api/orders`). Both paths place orders through the same service.

use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_service::{OrderLineInput, OrderRequest};
use crate::domain::checkout::VariationSelection;
use crate::domain::errors::ValidationErrors;
use crate::domain::order::{CustomerDetails, OrderScope, OrderStatus, OrderUpdate};
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::{AdminUser, ApiUser};
use super::dto::{OrderResponse, PlacedOrderResponse};
use super::{blocking, parse_money, ListParams, PageResponse};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal string. Priced from the catalog when omitted, and always for
    /// API orders.
    pub unit_price: Option<String>,
    /// Attribute name → chosen variation id.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub variations: VariationSelection,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    /// Initial status; defaults to `pending`. Ignored for API orders.
    pub status: Option<String>,
    /// Staff-fixed total as a decimal string. Ignored for API orders.
    pub total: Option<String>,
    /// `cod`, `bkash` or `nagad`. Required for API orders.
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub items: Vec<OrderLineRequest>,
    /// Staff orders only; API orders always get an invoice.
    pub issue_invoice: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    /// One placed status, or `all` (the default).
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkStatusRequest {
    pub order_ids: Vec<Uuid>,
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub order_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub deleted: usize,
}

fn parse_status(errors: &mut ValidationErrors, raw: &str) -> Option<OrderStatus> {
    match raw.trim().parse() {
        Ok(status) => Some(status),
        Err(_) => {
            errors.add("status", "is not a valid order status");
            None
        }
    }
}

impl CreateOrderRequest {
    fn into_request(self) -> Result<OrderRequest, AppError> {
        let mut errors = ValidationErrors::new();
        let status = self.status.as_deref().and_then(|s| parse_status(&mut errors, s));
        let total = self
            .total
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .and_then(|t| parse_money(&mut errors, "total", t));
        let items: Vec<OrderLineInput> = self
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| OrderLineInput {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item
                    .unit_price
                    .as_deref()
                    .and_then(|p| parse_money(&mut errors, &format!("items.{i}.unit_price"), p)),
                variations: item.variations,
            })
            .collect();
        if !errors.is_empty() {
            return Err(errors.into());
        }
        Ok(OrderRequest {
            customer: CustomerDetails {
                name: self.customer_name,
                phone: self.customer_phone,
                address: self.customer_address,
            },
            status,
            total,
            payment_method: self.payment_method,
            transaction_id: self.transaction_id,
            items,
            issue_invoice: self.issue_invoice.unwrap_or(true),
        })
    }
}

// ── Shared operations ────────────────────────────────────────────────────────

fn list_scope(query: &OrderListQuery) -> Result<OrderScope, AppError> {
    match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => Ok(OrderScope::Placed(None)),
        Some(raw) => match raw.parse::<OrderStatus>() {
            Ok(OrderStatus::Incomplete) => Ok(OrderScope::Incomplete),
            Ok(status) => Ok(OrderScope::Placed(Some(status))),
            Err(_) => Err(ValidationErrors::single("status", "is not a valid order status").into()),
        },
    }
}

async fn list_orders(
    state: web::Data<AppState>,
    scope: OrderScope,
    params: ListParams,
) -> Result<HttpResponse, AppError> {
    let bounds = params.bounds();
    let page = blocking(move || state.orders.list(scope, bounds.0, bounds.1)).await?;
    Ok(HttpResponse::Ok().json(PageResponse::new(
        page.items.into_iter().map(OrderResponse::from).collect(),
        page.total,
        bounds,
    )))
}

async fn get_order(state: web::Data<AppState>, id: Uuid) -> Result<HttpResponse, AppError> {
    let order = blocking(move || state.orders.get(id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

async fn update_order(
    state: web::Data<AppState>,
    id: Uuid,
    body: UpdateOrderRequest,
) -> Result<HttpResponse, AppError> {
    let mut errors = ValidationErrors::new();
    let status = body
        .status
        .as_deref()
        .and_then(|s| parse_status(&mut errors, s));
    let total = body
        .total
        .as_deref()
        .and_then(|t| parse_money(&mut errors, "total", t));
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let order = blocking(move || {
        let status = match status {
            Some(status) => status,
            None => state.orders.get(id)?.status,
        };
        state.orders.update(
            id,
            OrderUpdate {
                status,
                customer_name: body.customer_name,
                customer_phone: body.customer_phone,
                customer_address: body.customer_address,
                total,
            },
        )
    })
    .await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

async fn delete_order(state: web::Data<AppState>, id: Uuid) -> Result<HttpResponse, AppError> {
    blocking(move || state.orders.delete(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Admin routes ─────────────────────────────────────────────────────────────

/// GET /admin/orders?status=
///
/// Placed orders unless `status=incomplete` is asked for explicitly.
pub async fn admin_list(
    _admin: AdminUser,
    state: web::Data<AppState>,
    query: web::Query<OrderListQuery>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let scope = list_scope(&query)?;
    list_orders(state, scope, params.into_inner()).await
}

/// GET /admin/orders/incomplete
pub async fn admin_list_incomplete(
    _admin: AdminUser,
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    list_orders(state, OrderScope::Incomplete, params.into_inner()).await
}

/// GET /admin/orders/counts
pub async fn admin_counts(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let counts = blocking(move || state.orders.counts()).await?;
    Ok(HttpResponse::Ok().json(counts))
}

/// POST /admin/orders
pub async fn admin_create(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().into_request()?;
    let placed = blocking(move || state.orders.place_admin(request)).await?;
    Ok(HttpResponse::Created().json(PlacedOrderResponse::from(placed)))
}

pub async fn admin_get(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    get_order(state, path.into_inner()).await
}

pub async fn admin_update(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    update_order(state, path.into_inner(), body.into_inner()).await
}

pub async fn admin_delete(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    delete_order(state, path.into_inner()).await
}

/// POST /admin/orders/bulk-status
pub async fn admin_bulk_status(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<BulkStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let mut errors = ValidationErrors::new();
    let Some(status) = parse_status(&mut errors, &body.status) else {
        return Err(errors.into());
    };
    let outcome =
        blocking(move || state.orders.bulk_update_status(&body.order_ids, status)).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /admin/orders/bulk-delete
pub async fn admin_bulk_delete(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<BulkDeleteRequest>,
) -> Result<HttpResponse, AppError> {
    let ids = body.into_inner().order_ids;
    let deleted = blocking(move || state.orders.bulk_delete(&ids)).await?;
    Ok(HttpResponse::Ok().json(BulkDeleteResponse { deleted }))
}

/// GET /admin/orders/export/csv
pub async fn admin_export_csv(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let csv = blocking(move || state.orders.export_csv()).await?;
    let filename = format!("orders-{}.csv", Utc::now().format("%Y-%m-%d"));
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition::attachment(filename))
        .body(csv))
}

// ── API routes ───────────────────────────────────────────────────────────────

/// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery, ListParams),
    responses(
        (status = 200, description = "Paginated orders", body = PageResponse<OrderResponse>),
        (status = 401, description = "Missing or invalid API key"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_list(
    _user: ApiUser,
    state: web::Data<AppState>,
    query: web::Query<OrderListQuery>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let scope = list_scope(&query)?;
    list_orders(state, scope, params.into_inner()).await
}

/// POST /api/orders
///
/// API orders start as `pending`, are priced from the catalog and always
/// get an invoice. The order belongs to the key's owner.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = PlacedOrderResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 422, description = "Validation failed"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_create(
    user: ApiUser,
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().into_request()?;
    let placed = blocking(move || state.orders.place_api(request, &user.0)).await?;
    Ok(HttpResponse::Created().json(PlacedOrderResponse::from(placed)))
}

/// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order with its items", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_get(
    _user: ApiUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    get_order(state, path.into_inner()).await
}

/// PUT /api/orders/{id}
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Status change not allowed"),
        (status = 422, description = "Validation failed"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_update(
    _user: ApiUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    update_order(state, path.into_inner(), body.into_inner()).await
}

/// DELETE /api/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_delete(
    _user: ApiUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    delete_order(state, path.into_inner()).await
}

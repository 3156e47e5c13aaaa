//! Public storefront. Nothing here requires an API key; checkout picks up
//! the shopper when one is presented.

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_service::IncompleteCapture;
use crate::domain::catalog::ProductFilter;
use crate::domain::checkout::{CheckoutForm, VariationSelection};
use crate::domain::content::ShowcaseKind;
use crate::domain::settings::PublicSettings;
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::MaybeCustomer;
use super::catalog::ProductQuery;
use super::dto::{
    CategoryResponse, InfoCardResponse, NoticeResponse, OrderResponse, PlacedOrderResponse, ProductPageResponse,
    ProductResponse, ShowcaseResponse,
};
use super::{blocking, ListParams, PageResponse};

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeResponse {
    #[schema(value_type = Object)]
    pub settings: PublicSettings,
    pub sliders: Vec<ShowcaseResponse>,
    pub banners: Vec<ShowcaseResponse>,
    pub notices: Vec<NoticeResponse>,
    pub info_cards: Vec<InfoCardResponse>,
    pub featured_products: Vec<ProductResponse>,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer_name: String,
    /// 11 digits starting with `0`.
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub thana: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub delivery_location: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Attribute name → chosen variation id.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub variations: VariationSelection,
    /// `cod`, `bkash` or `nagad`.
    #[serde(default)]
    pub payment_method: String,
    /// Required for bkash and nagad.
    pub transaction_id: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

impl From<CheckoutRequest> for CheckoutForm {
    fn from(r: CheckoutRequest) -> Self {
        CheckoutForm {
            customer_name: r.customer_name,
            customer_phone: r.customer_phone,
            thana: r.thana,
            district: r.district,
            delivery_location: r.delivery_location,
            quantity: r.quantity,
            variations: r.variations,
            payment_method: r.payment_method,
            transaction_id: r.transaction_id,
        }
    }
}

/// Partial checkout form sent while the shopper is still typing.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct IncompleteOrderRequest {
    pub product_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub thana: Option<String>,
    pub district: Option<String>,
    pub delivery_location: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub variations: VariationSelection,
}

impl From<IncompleteOrderRequest> for IncompleteCapture {
    fn from(r: IncompleteOrderRequest) -> Self {
        IncompleteCapture {
            product_id: r.product_id,
            customer_name: r.customer_name,
            customer_phone: r.customer_phone,
            thana: r.thana,
            district: r.district,
            delivery_location: r.delivery_location,
            quantity: r.quantity,
            variations: r.variations,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaptureResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrackQuery {
    pub order_number: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionQuery {
    /// At least two characters; shorter queries return nothing.
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: String,
    pub image: Option<String>,
}

impl From<ProductResponse> for SuggestionResponse {
    fn from(p: ProductResponse) -> Self {
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            price: p.effective_price,
            image: p.images.into_iter().next(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Home page content", body = HomeResponse)),
    tag = "storefront"
)]
pub async fn home(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let home = blocking(move || {
        Ok(HomeResponse {
            settings: state.settings.current()?.public(),
            sliders: state
                .content
                .list(ShowcaseKind::Slider, true)?
                .into_iter()
                .map(Into::into)
                .collect(),
            banners: state
                .content
                .list(ShowcaseKind::Banner, true)?
                .into_iter()
                .map(Into::into)
                .collect(),
            notices: state
                .content
                .notices(true)?
                .into_iter()
                .map(Into::into)
                .collect(),
            info_cards: state
                .content
                .info_cards(true)?
                .into_iter()
                .map(Into::into)
                .collect(),
            featured_products: state
                .catalog
                .featured()?
                .into_iter()
                .map(Into::into)
                .collect(),
            categories: state
                .catalog
                .list_categories(true)?
                .into_iter()
                .map(Into::into)
                .collect(),
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(home))
}

#[utoipa::path(
    get,
    path = "/products",
    params(ProductQuery, ListParams),
    responses((status = 200, description = "Active products", body = PageResponse<ProductResponse>)),
    tag = "storefront"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ProductQuery>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let bounds = params.bounds();
    let query = query.into_inner();
    let filter = ProductFilter {
        category_slug: query.category.filter(|s| !s.trim().is_empty()),
        search: query.search.filter(|s| !s.trim().is_empty()),
        active_only: true,
        ..ProductFilter::default()
    };
    let page =
        blocking(move || state.catalog.list_products(&filter, bounds.0, bounds.1)).await?;
    Ok(HttpResponse::Ok().json(PageResponse::new(
        page.items.into_iter().map(ProductResponse::from).collect(),
        page.total,
        bounds,
    )))
}

#[utoipa::path(
    get,
    path = "/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product with variations and related products", body = ProductPageResponse),
        (status = 404, description = "Product not found or inactive"),
    ),
    tag = "storefront"
)]
pub async fn show_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let page = blocking(move || state.catalog.product_page(&slug)).await?;
    Ok(HttpResponse::Ok().json(ProductPageResponse::from(page)))
}

#[utoipa::path(
    post,
    path = "/products/{slug}/order",
    params(("slug" = String, Path, description = "Product slug")),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = PlacedOrderResponse),
        (status = 404, description = "Product not found or inactive"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "storefront"
)]
pub async fn checkout(
    customer: MaybeCustomer,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let form = CheckoutForm::from(body.into_inner());
    let placed = blocking(move || {
        let settings = state.settings.current()?;
        state
            .orders
            .checkout(&slug, &form, customer.0.as_ref(), &settings)
    })
    .await?;
    let response = PlacedOrderResponse::from(placed);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, response.tracking_url.clone()))
        .json(response))
}

#[utoipa::path(
    post,
    path = "/incomplete-orders",
    request_body = IncompleteOrderRequest,
    responses((status = 200, description = "Always succeeds", body = CaptureResponse)),
    tag = "storefront"
)]
pub async fn capture_incomplete(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<IncompleteOrderRequest>,
) -> HttpResponse {
    let session_id = req
        .cookie(&state.session_cookie)
        .map(|c| c.value().to_string());
    let capture = IncompleteCapture::from(body.into_inner());
    let result = blocking(move || {
        state
            .orders
            .capture_incomplete(session_id.as_deref(), &capture)
    })
    .await;
    if let Err(e) = result {
        log::error!("Incomplete order capture failed: {e}");
    }
    HttpResponse::Ok().json(CaptureResponse { success: true })
}

async fn track(state: web::Data<AppState>, order_number: String) -> Result<HttpResponse, AppError> {
    let order = blocking(move || state.orders.track(&order_number)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[utoipa::path(
    get,
    path = "/orders/track",
    params(TrackQuery),
    responses(
        (status = 200, description = "Order with line items", body = OrderResponse),
        (status = 404, description = "No order with that number"),
    ),
    tag = "storefront"
)]
pub async fn track_by_query(
    state: web::Data<AppState>,
    query: web::Query<TrackQuery>,
) -> Result<HttpResponse, AppError> {
    let order_number = query
        .into_inner()
        .order_number
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    track(state, order_number).await
}

#[utoipa::path(
    get,
    path = "/orders/track/{order_number}",
    params(("order_number" = String, Path, description = "Order number, e.g. ORD-1700000000-0042")),
    responses(
        (status = 200, description = "Order with line items", body = OrderResponse),
        (status = 404, description = "No order with that number"),
    ),
    tag = "storefront"
)]
pub async fn track_by_path(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    track(state, path.into_inner()).await
}

#[utoipa::path(
    get,
    path = "/search-suggestions",
    params(SuggestionQuery),
    responses((status = 200, description = "Up to five matching products", body = Vec<SuggestionResponse>)),
    tag = "storefront"
)]
pub async fn search_suggestions(
    state: web::Data<AppState>,
    query: web::Query<SuggestionQuery>,
) -> Result<HttpResponse, AppError> {
    let q = query.into_inner().q;
    let products = blocking(move || state.catalog.suggestions(&q)).await?;
    let suggestions: Vec<SuggestionResponse> = products
        .into_iter()
        .map(|p| SuggestionResponse::from(ProductResponse::from(p)))
        .collect();
    Ok(HttpResponse::Ok().json(suggestions))
}

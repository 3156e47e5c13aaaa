//! Product and category management, shared by the admin back office and
//! the key-gated API.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::catalog::{
    CategoryChanges, CategoryInput, ProductChanges, ProductFilter, ProductInput, VariationInput,
};
use crate::domain::errors::ValidationErrors;
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::{AdminUser, ApiUser};
use super::dto::{CategoryResponse, ProductDetailResponse, ProductResponse};
use super::{blocking, double_option, parse_money, ListParams, PageResponse};

// ── Request DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CategoryUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VariationRequest {
    /// Attribute name, e.g. "Size".
    pub name: String,
    pub value: String,
    /// Signed decimal string; defaults to "0".
    pub price_adjustment: Option<String>,
    #[serde(default)]
    pub stock: i32,
    pub sku: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub category_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal string, e.g. "450.00".
    pub price: String,
    pub sale_price: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub variations: Vec<VariationRequest>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductUpdateRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    /// `null` clears the sale price; omit to leave it unchanged.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub sale_price: Option<Option<String>>,
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    /// Replaces every existing variation when present.
    pub variations: Option<Vec<VariationRequest>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Only products of the category with this slug.
    pub category: Option<String>,
    /// Case-insensitive name substring.
    pub search: Option<String>,
}

fn default_true() -> bool {
    true
}

fn variation_inputs(
    errors: &mut ValidationErrors,
    variations: Vec<VariationRequest>,
) -> Vec<VariationInput> {
    variations
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let adjustment = match v.price_adjustment.as_deref() {
                Some(raw) => {
                    parse_money(errors, &format!("variations.{i}.price_adjustment"), raw)?
                }
                None => Default::default(),
            };
            Some(VariationInput {
                name: v.name,
                value: v.value,
                price_adjustment: adjustment,
                stock: v.stock,
                sku: v.sku,
            })
        })
        .collect()
}

impl ProductRequest {
    fn into_input(self) -> Result<ProductInput, AppError> {
        let mut errors = ValidationErrors::new();
        let price = parse_money(&mut errors, "price", &self.price);
        let sale_price = self
            .sale_price
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|raw| parse_money(&mut errors, "sale_price", raw));
        let variations = variation_inputs(&mut errors, self.variations);
        match price {
            Some(price) if errors.is_empty() => Ok(ProductInput {
                category_id: self.category_id,
                name: self.name,
                description: self.description,
                price,
                sale_price,
                stock: self.stock,
                images: self.images,
                is_active: self.is_active,
                is_featured: self.is_featured,
                variations,
            }),
            _ => Err(errors.into()),
        }
    }
}

impl ProductUpdateRequest {
    fn into_changes(self) -> Result<ProductChanges, AppError> {
        let mut errors = ValidationErrors::new();
        let price = self
            .price
            .as_deref()
            .and_then(|raw| parse_money(&mut errors, "price", raw));
        let sale_price = self.sale_price.map(|sale| {
            sale.as_deref()
                .filter(|s| !s.trim().is_empty())
                .and_then(|raw| parse_money(&mut errors, "sale_price", raw))
        });
        let variations = self
            .variations
            .map(|variations| variation_inputs(&mut errors, variations));
        if !errors.is_empty() {
            return Err(errors.into());
        }
        Ok(ProductChanges {
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            price,
            sale_price,
            stock: self.stock,
            images: self.images,
            is_active: self.is_active,
            is_featured: self.is_featured,
            variations,
        })
    }
}

// ── Shared operations ────────────────────────────────────────────────────────

async fn list_products(
    state: web::Data<AppState>,
    filter: ProductQuery,
    params: ListParams,
) -> Result<HttpResponse, AppError> {
    let bounds = params.bounds();
    let filter = ProductFilter {
        category_slug: filter.category,
        search: filter.search.filter(|s| !s.trim().is_empty()),
        ..ProductFilter::default()
    };
    let page =
        blocking(move || state.catalog.list_products(&filter, bounds.0, bounds.1)).await?;
    Ok(HttpResponse::Ok().json(PageResponse::new(
        page.items
            .into_iter()
            .map(ProductResponse::from)
            .collect(),
        page.total,
        bounds,
    )))
}

async fn get_product(state: web::Data<AppState>, id: Uuid) -> Result<HttpResponse, AppError> {
    let detail = blocking(move || state.catalog.get_product(id)).await?;
    Ok(HttpResponse::Ok().json(ProductDetailResponse::from(detail)))
}

async fn create_product(
    state: web::Data<AppState>,
    body: ProductRequest,
) -> Result<HttpResponse, AppError> {
    let input = body.into_input()?;
    let detail = blocking(move || state.catalog.create_product(input)).await?;
    Ok(HttpResponse::Created().json(ProductDetailResponse::from(detail)))
}

async fn update_product(
    state: web::Data<AppState>,
    id: Uuid,
    body: ProductUpdateRequest,
) -> Result<HttpResponse, AppError> {
    let changes = body.into_changes()?;
    let detail = blocking(move || state.catalog.update_product(id, changes)).await?;
    Ok(HttpResponse::Ok().json(ProductDetailResponse::from(detail)))
}

async fn delete_product(state: web::Data<AppState>, id: Uuid) -> Result<HttpResponse, AppError> {
    blocking(move || state.catalog.delete_product(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = blocking(move || state.catalog.list_categories(false)).await?;
    Ok(HttpResponse::Ok().json(
        categories
            .into_iter()
            .map(CategoryResponse::from)
            .collect::<Vec<_>>(),
    ))
}

async fn get_category(state: web::Data<AppState>, id: Uuid) -> Result<HttpResponse, AppError> {
    let category = blocking(move || state.catalog.get_category(id)).await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

async fn create_category(
    state: web::Data<AppState>,
    body: CategoryRequest,
) -> Result<HttpResponse, AppError> {
    let input = CategoryInput {
        name: body.name,
        description: body.description,
        is_active: body.is_active,
    };
    let category = blocking(move || state.catalog.create_category(input)).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

async fn update_category(
    state: web::Data<AppState>,
    id: Uuid,
    body: CategoryUpdateRequest,
) -> Result<HttpResponse, AppError> {
    let changes = CategoryChanges {
        name: body.name,
        description: body.description,
        is_active: body.is_active,
    };
    let category = blocking(move || state.catalog.update_category(id, changes)).await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

async fn delete_category(state: web::Data<AppState>, id: Uuid) -> Result<HttpResponse, AppError> {
    blocking(move || state.catalog.delete_category(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── API routes ───────────────────────────────────────────────────────────────

/// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery, ListParams),
    responses(
        (status = 200, description = "Paginated products", body = PageResponse<ProductResponse>),
        (status = 401, description = "Missing or invalid API key"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_list_products(
    _user: ApiUser,
    state: web::Data<AppState>,
    filter: web::Query<ProductQuery>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    list_products(state, filter.into_inner(), params.into_inner()).await
}

/// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product with variations", body = ProductDetailResponse),
        (status = 404, description = "Product not found"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_get_product(
    _user: ApiUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    get_product(state, path.into_inner()).await
}

/// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductDetailResponse),
        (status = 409, description = "Slug already taken"),
        (status = 422, description = "Validation failed"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_create_product(
    _user: ApiUser,
    state: web::Data<AppState>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    create_product(state, body.into_inner()).await
}

/// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = ProductUpdateRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductDetailResponse),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Validation failed"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_update_product(
    _user: ApiUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ProductUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    update_product(state, path.into_inner(), body.into_inner()).await
}

/// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_delete_product(
    _user: ApiUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    delete_product(state, path.into_inner()).await
}

/// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories", body = Vec<CategoryResponse>)),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_list_categories(
    _user: ApiUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    list_categories(state).await
}

/// GET /api/categories/{id}
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_get_category(
    _user: ApiUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    get_category(state, path.into_inner()).await
}

/// POST /api/categories
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 409, description = "Name already taken"),
        (status = 422, description = "Validation failed"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_create_category(
    _user: ApiUser,
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    create_category(state, body.into_inner()).await
}

/// PUT /api/categories/{id}
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    request_body = CategoryUpdateRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_update_category(
    _user: ApiUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CategoryUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    update_category(state, path.into_inner(), body.into_inner()).await
}

/// DELETE /api/categories/{id}
///
/// Refused with 400 while products still belong to the category.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category still has products"),
        (status = 404, description = "Category not found"),
    ),
    security(("api_key" = [])),
    tag = "api"
)]
pub async fn api_delete_category(
    _user: ApiUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    delete_category(state, path.into_inner()).await
}

// ── Admin routes ─────────────────────────────────────────────────────────────

pub async fn admin_list_products(
    _admin: AdminUser,
    state: web::Data<AppState>,
    filter: web::Query<ProductQuery>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    list_products(state, filter.into_inner(), params.into_inner()).await
}

pub async fn admin_get_product(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    get_product(state, path.into_inner()).await
}

pub async fn admin_create_product(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    create_product(state, body.into_inner()).await
}

pub async fn admin_update_product(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ProductUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    update_product(state, path.into_inner(), body.into_inner()).await
}

pub async fn admin_delete_product(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    delete_product(state, path.into_inner()).await
}

pub async fn admin_list_categories(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    list_categories(state).await
}

pub async fn admin_get_category(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    get_category(state, path.into_inner()).await
}

pub async fn admin_create_category(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    create_category(state, body.into_inner()).await
}

pub async fn admin_update_category(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CategoryUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    update_category(state, path.into_inner(), body.into_inner()).await
}

pub async fn admin_delete_category(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    delete_category(state, path.into_inner()).await
}

pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

use std::error::Error;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use handlers::{admin, catalog, orders, storefront};

pub use config::AppConfig;
pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("Applied {} database migration(s)", applied.len());
    }
    Ok(())
}

struct ApiKeyScheme;

impl Modify for ApiKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    handlers::auth::API_KEY_HEADER,
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Service",
        description = "Storefront, back-office and key-authenticated API for a small shop"
    ),
    paths(
        storefront::home,
        storefront::list_products,
        storefront::show_product,
        storefront::checkout,
        storefront::capture_incomplete,
        storefront::track_by_query,
        storefront::track_by_path,
        storefront::search_suggestions,
        catalog::api_list_products,
        catalog::api_get_product,
        catalog::api_create_product,
        catalog::api_update_product,
        catalog::api_delete_product,
        catalog::api_list_categories,
        catalog::api_get_category,
        catalog::api_create_category,
        catalog::api_update_category,
        catalog::api_delete_category,
        orders::api_list,
        orders::api_create,
        orders::api_get,
        orders::api_update,
        orders::api_delete,
    ),
    components(schemas(
        handlers::dto::ProductResponse,
        handlers::dto::ProductDetailResponse,
        handlers::dto::CategoryResponse,
        handlers::dto::OrderResponse,
        handlers::dto::PlacedOrderResponse,
        catalog::ProductRequest,
        catalog::CategoryRequest,
        orders::CreateOrderRequest,
        orders::UpdateOrderRequest,
        storefront::CheckoutRequest,
    )),
    modifiers(&ApiKeyScheme),
    tags(
        (name = "storefront", description = "Public shop pages"),
        (name = "api", description = "Catalog and order API, requires an API key"),
    )
)]
pub struct ApiDoc;

fn storefront_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(storefront::home))
        .route("/products", web::get().to(storefront::list_products))
        .route("/products/{slug}", web::get().to(storefront::show_product))
        .route("/products/{slug}/order", web::post().to(storefront::checkout))
        .route("/incomplete-orders", web::post().to(storefront::capture_incomplete))
        .route("/orders/track", web::get().to(storefront::track_by_query))
        .route("/orders/track/{order_number}", web::get().to(storefront::track_by_path))
        .route("/search-suggestions", web::get().to(storefront::search_suggestions));
}

fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/dashboard", web::get().to(admin::dashboard))
            .route("/products", web::get().to(catalog::admin_list_products))
            .route("/products", web::post().to(catalog::admin_create_product))
            .route("/products/{id}", web::get().to(catalog::admin_get_product))
            .route("/products/{id}", web::put().to(catalog::admin_update_product))
            .route("/products/{id}", web::delete().to(catalog::admin_delete_product))
            .route("/categories", web::get().to(catalog::admin_list_categories))
            .route("/categories", web::post().to(catalog::admin_create_category))
            .route("/categories/{id}", web::get().to(catalog::admin_get_category))
            .route("/categories/{id}", web::put().to(catalog::admin_update_category))
            .route("/categories/{id}", web::delete().to(catalog::admin_delete_category))
            .route("/orders", web::get().to(orders::admin_list))
            .route("/orders", web::post().to(orders::admin_create))
            .route("/orders/incomplete", web::get().to(orders::admin_list_incomplete))
            .route("/orders/counts", web::get().to(orders::admin_counts))
            .route("/orders/bulk-status", web::post().to(orders::admin_bulk_status))
            .route("/orders/bulk-delete", web::post().to(orders::admin_bulk_delete))
            .route("/orders/export/csv", web::get().to(orders::admin_export_csv))
            .route("/orders/{id}", web::get().to(orders::admin_get))
            .route("/orders/{id}", web::put().to(orders::admin_update))
            .route("/orders/{id}", web::delete().to(orders::admin_delete))
            .route("/invoices", web::get().to(admin::list_invoices))
            .route("/customers", web::get().to(admin::list_customers))
            .route("/settings", web::get().to(admin::get_settings))
            .route("/settings", web::put().to(admin::update_settings))
            .route("/sliders", web::get().to(admin::list_sliders))
            .route("/sliders", web::post().to(admin::create_slider))
            .route("/sliders/{id}", web::get().to(admin::get_slider))
            .route("/sliders/{id}", web::put().to(admin::update_slider))
            .route("/sliders/{id}", web::delete().to(admin::delete_slider))
            .route("/banners", web::get().to(admin::list_banners))
            .route("/banners", web::post().to(admin::create_banner))
            .route("/banners/{id}", web::get().to(admin::get_banner))
            .route("/banners/{id}", web::put().to(admin::update_banner))
            .route("/banners/{id}", web::delete().to(admin::delete_banner))
            .route("/notices", web::get().to(admin::list_notices))
            .route("/notices", web::post().to(admin::create_notice))
            .route("/notices/{id}", web::delete().to(admin::delete_notice))
            .route("/info-cards", web::get().to(admin::list_info_cards))
            .route("/info-cards/{id}", web::put().to(admin::update_info_card))
            .route("/api-key/generate", web::post().to(admin::generate_api_key)),
    );
}

fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/products", web::get().to(catalog::api_list_products))
            .route("/products", web::post().to(catalog::api_create_product))
            .route("/products/{id}", web::get().to(catalog::api_get_product))
            .route("/products/{id}", web::put().to(catalog::api_update_product))
            .route("/products/{id}", web::delete().to(catalog::api_delete_product))
            .route("/categories", web::get().to(catalog::api_list_categories))
            .route("/categories", web::post().to(catalog::api_create_category))
            .route("/categories/{id}", web::get().to(catalog::api_get_category))
            .route("/categories/{id}", web::put().to(catalog::api_update_category))
            .route("/categories/{id}", web::delete().to(catalog::api_delete_category))
            .route("/orders", web::get().to(orders::api_list))
            .route("/orders", web::post().to(orders::api_create))
            .route("/orders/{id}", web::get().to(orders::api_get))
            .route("/orders/{id}", web::put().to(orders::api_update))
            .route("/orders/{id}", web::delete().to(orders::api_delete)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(api_routes)
            .configure(admin_routes)
            .configure(storefront_routes)
    })
    .bind((host.to_string(), port))?
    .run())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_storefront_and_api_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/products/{slug}/order",
            "/orders/track/{order_number}",
            "/api/products",
            "/api/orders/{id}",
            "/api/categories/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc
            .components
            .as_ref()
            .map(|c| c.security_schemes.contains_key("api_key"))
            .unwrap_or(false);
        assert!(schemes);
    }
}

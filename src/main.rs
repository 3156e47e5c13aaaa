use actix_web::web;
use dotenvy::dotenv;
use storefront_service::{build_server, create_pool, run_migrations, AppConfig, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().expect("Invalid configuration");

    let pool = create_pool(&config.database_url, config.pool_size)
        .expect("Failed to create database pool");
    run_migrations(&pool).expect("Failed to run database migrations");

    let state = web::Data::new(AppState::new(pool, config.session_cookie));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}

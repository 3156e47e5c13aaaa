use crate::application::account_service::AccountService;
use crate::application::catalog_service::CatalogService;
use crate::application::content_service::ContentService;
use crate::application::order_service::OrderService;
use crate::application::report_service::ReportService;
use crate::application::settings_service::SettingsService;
use crate::db::DbPool;
use crate::infrastructure::catalog_repo::DieselCatalogRepository;
use crate::infrastructure::content_repo::DieselContentRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::settings_repo::DieselSettingsRepository;
use crate::infrastructure::user_repo::DieselUserRepository;

/// Services shared by every worker, wrapped in `web::Data`.
pub struct AppState {
    pub catalog: CatalogService<DieselCatalogRepository>,
    pub orders: OrderService<DieselCatalogRepository, DieselOrderRepository>,
    pub settings: SettingsService<DieselSettingsRepository>,
    pub content: ContentService<DieselContentRepository>,
    pub accounts: AccountService<DieselUserRepository>,
    pub reports:
        ReportService<DieselCatalogRepository, DieselOrderRepository, DieselUserRepository>,
    pub session_cookie: String,
}

impl AppState {
    pub fn new(pool: DbPool, session_cookie: impl Into<String>) -> Self {
        let catalog = DieselCatalogRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool.clone());
        let users = DieselUserRepository::new(pool.clone());
        Self {
            catalog: CatalogService::new(catalog.clone()),
            orders: OrderService::new(catalog.clone(), orders.clone()),
            settings: SettingsService::new(DieselSettingsRepository::new(pool.clone())),
            content: ContentService::new(DieselContentRepository::new(pool)),
            accounts: AccountService::new(users.clone()),
            reports: ReportService::new(catalog, orders, users),
            session_cookie: session_cookie.into(),
        }
    }
}

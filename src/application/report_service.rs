use crate::domain::errors::DomainError;
use crate::domain::order::OrderScope;
use crate::domain::ports::{CatalogRepository, OrderRepository, UserRepository};
use crate::domain::pricing::round_money;
use crate::domain::report::{DashboardStats, LOW_STOCK_THRESHOLD};

pub const DASHBOARD_ROWS: i64 = 5;

pub struct ReportService<C, O, U> {
    catalog: C,
    orders: O,
    users: U,
}

impl<C, O, U> ReportService<C, O, U>
where
    C: CatalogRepository,
    O: OrderRepository,
    U: UserRepository,
{
    pub fn new(catalog: C, orders: O, users: U) -> Self {
        Self {
            catalog,
            orders,
            users,
        }
    }

    pub fn dashboard(&self) -> Result<DashboardStats, DomainError> {
        Ok(DashboardStats {
            total_products: self.catalog.count_products()?,
            total_orders: self.orders.count_placed()?,
            total_customers: self.users.count_customers()?,
            total_revenue: round_money(&self.orders.revenue()?),
            order_counts: self.orders.counts()?,
            recent_orders: self
                .orders
                .list(OrderScope::Placed(None), 1, DASHBOARD_ROWS)?
                .items,
            low_stock_products: self
                .catalog
                .low_stock_products(LOW_STOCK_THRESHOLD, DASHBOARD_ROWS)?,
        })
    }
}

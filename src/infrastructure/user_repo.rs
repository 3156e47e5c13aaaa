use chrono::Utc;
use diesel::dsl::count;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::Page;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{CustomerSummary, User};
use crate::schema::{orders, users};

use super::models::UserRow;
use super::offset;

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_user(row: UserRow) -> User {
    User {
        id: row.id,
        name: row.name,
        email: row.email,
        phone: row.phone,
        address: row.address,
        is_admin: row.is_admin,
    }
}

impl UserRepository for DieselUserRepository {
    fn find_by_api_token(&self, token: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(users::table
            .filter(users::api_token.eq(token))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(to_user))
    }

    fn set_api_token(&self, user_id: Uuid, token: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let changed = diesel::update(users::table.find(user_id))
            .set((
                users::api_token.eq(token),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        Ok(changed > 0)
    }

    fn list_customers(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<Page<CustomerSummary>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = users::table
                .filter(users::is_admin.eq(false))
                .count()
                .get_result(conn)?;

            let rows = users::table
                .left_join(orders::table)
                .filter(users::is_admin.eq(false))
                .group_by(users::id)
                .select((UserRow::as_select(), count(orders::id.nullable())))
                .order(users::created_at.desc())
                .limit(limit)
                .offset(offset(page, limit))
                .load::<(UserRow, i64)>(conn)?;

            Ok(Page {
                items: rows
                    .into_iter()
                    .map(|(row, total_orders)| CustomerSummary {
                        id: row.id,
                        name: row.name,
                        email: row.email,
                        phone: row.phone,
                        address: row.address,
                        total_orders,
                        joined: row.created_at,
                    })
                    .collect(),
                total,
            })
        })
    }

    fn count_customers(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(users::table
            .filter(users::is_admin.eq(false))
            .count()
            .get_result(&mut conn)?)
    }
}

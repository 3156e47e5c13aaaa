use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::SettingsRepository;
use crate::schema::settings;

use super::models::{NewSettingRow, SettingRow};

#[derive(Clone)]
pub struct DieselSettingsRepository {
    pool: DbPool,
}

impl DieselSettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SettingsRepository for DieselSettingsRepository {
    fn load(&self) -> Result<HashMap<String, String>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = settings::table
            .select(SettingRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    fn save(&self, pairs: &[(&'static str, String)]) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let now = Utc::now();
        let rows: Vec<NewSettingRow<'_>> = pairs
            .iter()
            .map(|(key, value)| NewSettingRow {
                key,
                value,
                updated_at: now,
            })
            .collect();

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::insert_into(settings::table)
                .values(&rows)
                .on_conflict(settings::key)
                .do_update()
                .set((
                    settings::value.eq(excluded(settings::value)),
                    settings::updated_at.eq(excluded(settings::updated_at)),
                ))
                .execute(conn)?;
            Ok(())
        })
    }
}

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod dto;
pub mod orders;
pub mod storefront;

use std::str::FromStr;

use actix_web::web;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::errors::{DomainError, ValidationErrors};
use crate::domain::pricing::is_storable_amount;
use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Run blocking service work on the actix thread pool.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(work)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??)
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl ListParams {
    /// `(page, limit)` clamped to sane bounds.
    pub fn bounds(&self) -> (i64, i64) {
        (self.page.max(1), self.limit.clamp(1, MAX_PAGE_SIZE))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, total: i64, (page, limit): (i64, i64)) -> Self {
        Self {
            items,
            total,
            page,
            limit,
        }
    }
}

// ── Request parsing ──────────────────────────────────────────────────────────

/// Parse a decimal sent as a string (e.g. "9.99"), recording a field error
/// on failure or when the amount cannot be stored.
pub(crate) fn parse_money(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &str,
) -> Option<BigDecimal> {
    match BigDecimal::from_str(raw.trim()) {
        Ok(value) if is_storable_amount(&value) => Some(value),
        Ok(_) => {
            errors.add(
                field,
                "must have at most two decimal places and be below 10000000000",
            );
            None
        }
        Err(_) => {
            errors.add(field, "must be a decimal amount");
            None
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

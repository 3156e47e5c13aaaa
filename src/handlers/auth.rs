//! API-key extractors. The key travels in the `X-API-Key` header or the
//! `api_key` query parameter and maps to exactly one user.

use std::future::Future;
use std::pin::Pin;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use serde::Deserialize;

use crate::domain::user::User;
use crate::errors::AppError;
use crate::state::AppState;

use super::blocking;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Deserialize)]
struct KeyQuery {
    api_key: Option<String>,
}

fn presented_key(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    from_header
        .or_else(|| {
            web::Query::<KeyQuery>::from_query(req.query_string())
                .ok()
                .and_then(|q| q.into_inner().api_key)
        })
        .filter(|k| !k.trim().is_empty())
}

async fn resolve(req: HttpRequest) -> Result<User, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;
    let Some(key) = presented_key(&req) else {
        return Err(AppError::Unauthorized("API key required".to_string()));
    };
    let user = blocking(move || state.accounts.authenticate(&key)).await?;
    user.ok_or_else(|| {
        log::warn!(
            "Rejected API key from {}",
            req.peer_addr()
                .map(|a| a.ip().to_string())
                .unwrap_or_else(|| "unknown peer".to_string())
        );
        AppError::Unauthorized("Invalid API key".to_string())
    })
}

/// Any user holding a valid key.
#[derive(Debug, Clone)]
pub struct ApiUser(pub User);

impl FromRequest for ApiUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve(req).await.map(ApiUser) })
    }
}

/// A valid key that belongs to an administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = resolve(req).await?;
            if !user.is_admin {
                log::warn!("User {} attempted an admin action", user.id);
                return Err(AppError::Forbidden);
            }
            Ok(AdminUser(user))
        })
    }
}

/// The shopper, when the storefront request carries a valid key. Never
/// rejects the request.
#[derive(Debug, Clone)]
pub struct MaybeCustomer(pub Option<User>);

impl FromRequest for MaybeCustomer {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            if presented_key(&req).is_none() {
                return Ok(MaybeCustomer(None));
            }
            match resolve(req).await {
                Ok(user) => Ok(MaybeCustomer(Some(user))),
                Err(AppError::Unauthorized(_)) => Ok(MaybeCustomer(None)),
                Err(e) => Err(e),
            }
        })
    }
}

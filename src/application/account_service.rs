use uuid::Uuid;

use crate::domain::catalog::Page;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{generate_api_token, CustomerSummary, User};

pub struct AccountService<U> {
    repo: U,
}

impl<U: UserRepository> AccountService<U> {
    pub fn new(repo: U) -> Self {
        Self { repo }
    }

    /// The user owning `token`, if any. Blank tokens never match.
    pub fn authenticate(&self, token: &str) -> Result<Option<User>, DomainError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        self.repo.find_by_api_token(token)
    }

    /// Replace the user's key with a fresh one and return it.
    pub fn rotate_api_key(&self, user_id: Uuid) -> Result<String, DomainError> {
        let token = generate_api_token();
        if !self.repo.set_api_token(user_id, &token)? {
            return Err(DomainError::NotFound("User"));
        }
        log::info!("API key rotated for user {user_id}");
        Ok(token)
    }

    pub fn customers(&self, page: i64, limit: i64) -> Result<Page<CustomerSummary>, DomainError> {
        self.repo.list_customers(page, limit)
    }
}

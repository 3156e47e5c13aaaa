use serde::Serialize;
use uuid::Uuid;

use crate::domain::catalog::{
    slug_for, Category, CategoryChanges, CategoryInput, Page, Product, ProductChanges,
    ProductDetail, ProductFilter, ProductInput,
};
use crate::domain::errors::{DomainError, ValidationErrors};
use crate::domain::ports::CatalogRepository;

pub const RELATED_PRODUCTS: i64 = 4;
pub const FEATURED_PRODUCTS: i64 = 12;
pub const SUGGESTION_LIMIT: i64 = 5;
const MIN_SUGGESTION_QUERY: usize = 2;

/// Storefront product page.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    #[serde(flatten)]
    pub detail: ProductDetail,
    pub related: Vec<Product>,
}

pub struct CatalogService<C> {
    repo: C,
}

impl<C: CatalogRepository> CatalogService<C> {
    pub fn new(repo: C) -> Self {
        Self { repo }
    }

    // ── Categories ───────────────────────────────────────────────────────────

    pub fn list_categories(&self, active_only: bool) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories(active_only)
    }

    pub fn get_category(&self, id: Uuid) -> Result<Category, DomainError> {
        self.repo
            .find_category(id)?
            .ok_or(DomainError::NotFound("Category"))
    }

    pub fn create_category(&self, input: CategoryInput) -> Result<Category, DomainError> {
        input.validate()?;
        let id = Uuid::new_v4();
        let slug = slug_for(&input.name, id);
        let category = self.repo.create_category(id, &slug, &input)?;
        log::info!("Category '{}' created", category.name);
        Ok(category)
    }

    pub fn update_category(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Category, DomainError> {
        changes.validate()?;
        let slug = changes.name.as_deref().map(|name| slug_for(name, id));
        self.repo
            .update_category(id, slug.as_deref(), &changes)?
            .ok_or(DomainError::NotFound("Category"))
    }

    /// Refused while any product still belongs to the category.
    pub fn delete_category(&self, id: Uuid) -> Result<(), DomainError> {
        let products = self.repo.count_products_in_category(id)?;
        if products > 0 {
            return Err(DomainError::InUse(format!(
                "Cannot delete category with {products} associated product(s)"
            )));
        }
        if !self.repo.delete_category(id)? {
            return Err(DomainError::NotFound("Category"));
        }
        log::info!("Category {id} deleted");
        Ok(())
    }

    // ── Products ─────────────────────────────────────────────────────────────

    pub fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<Page<Product>, DomainError> {
        self.repo.list_products(filter, page, limit)
    }

    pub fn get_product(&self, id: Uuid) -> Result<ProductDetail, DomainError> {
        self.repo
            .find_product(id)?
            .ok_or(DomainError::NotFound("Product"))
    }

    /// Active product by slug plus a few active products from its category.
    pub fn product_page(&self, slug: &str) -> Result<ProductPage, DomainError> {
        let detail = self
            .repo
            .find_product_by_slug(slug)?
            .filter(|d| d.product.is_active)
            .ok_or(DomainError::NotFound("Product"))?;
        let related = self
            .repo
            .list_products(
                &ProductFilter {
                    category_id: Some(detail.product.category_id),
                    exclude_id: Some(detail.product.id),
                    active_only: true,
                    ..ProductFilter::default()
                },
                1,
                RELATED_PRODUCTS,
            )?
            .items;
        Ok(ProductPage { detail, related })
    }

    pub fn featured(&self) -> Result<Vec<Product>, DomainError> {
        let filter = ProductFilter {
            active_only: true,
            featured_only: true,
            ..ProductFilter::default()
        };
        Ok(self.repo.list_products(&filter, 1, FEATURED_PRODUCTS)?.items)
    }

    pub fn suggestions(&self, query: &str) -> Result<Vec<Product>, DomainError> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_QUERY {
            return Ok(Vec::new());
        }
        let filter = ProductFilter {
            search: Some(query.to_string()),
            active_only: true,
            ..ProductFilter::default()
        };
        Ok(self.repo.list_products(&filter, 1, SUGGESTION_LIMIT)?.items)
    }

    fn ensure_category(&self, category_id: Uuid) -> Result<(), DomainError> {
        if self.repo.find_category(category_id)?.is_none() {
            return Err(ValidationErrors::single("category_id", "does not exist").into());
        }
        Ok(())
    }

    pub fn create_product(&self, input: ProductInput) -> Result<ProductDetail, DomainError> {
        input.validate()?;
        self.ensure_category(input.category_id)?;
        let id = Uuid::new_v4();
        let slug = slug_for(&input.name, id);
        let detail = self.repo.create_product(id, &slug, &input)?;
        log::info!(
            "Product '{}' created with {} variation(s)",
            detail.product.name,
            detail.variations.len()
        );
        Ok(detail)
    }

    pub fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<ProductDetail, DomainError> {
        changes.validate()?;
        if let Some(category_id) = changes.category_id {
            self.ensure_category(category_id)?;
        }
        let slug = changes.name.as_deref().map(|name| slug_for(name, id));
        self.repo
            .update_product(id, slug.as_deref(), &changes)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_product(id)? {
            return Err(DomainError::NotFound("Product"));
        }
        log::info!("Product {id} deleted");
        Ok(())
    }
}

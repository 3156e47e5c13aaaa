use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::{DomainError, ValidationErrors};

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub products_count: i64,
}

#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: BigDecimal,
    pub sale_price: Option<BigDecimal>,
    pub stock: i32,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The price a shopper pays before variation adjustments.
    pub fn effective_price(&self) -> &BigDecimal {
        self.sale_price.as_ref().unwrap_or(&self.price)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductVariation {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Attribute name, e.g. "Size".
    pub name: String,
    /// Attribute value, e.g. "L".
    pub value: String,
    pub price_adjustment: BigDecimal,
    pub stock: i32,
    pub sku: Option<String>,
    pub is_active: bool,
}

impl ProductVariation {
    /// Listed price of this variation. Always relative to the product's base
    /// price, never the sale price.
    pub fn final_price(&self, base_price: &BigDecimal) -> BigDecimal {
        base_price + &self.price_adjustment
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variations: Vec<ProductVariation>,
}

#[derive(Debug, Clone)]
pub struct VariationInput {
    pub name: String,
    pub value: String,
    pub price_adjustment: BigDecimal,
    pub stock: i32,
    pub sku: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProductInput {
    pub category_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub sale_price: Option<BigDecimal>,
    pub stock: i32,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub variations: Vec<VariationInput>,
}

/// Partial product update. `variations`, when present, replaces the whole
/// variation set.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub sale_price: Option<Option<BigDecimal>>,
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub variations: Option<Vec<VariationInput>>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_slug: Option<String>,
    pub category_id: Option<Uuid>,
    pub exclude_id: Option<Uuid>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub active_only: bool,
    pub featured_only: bool,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Lowercase ASCII slug: alphanumerics kept, every other run of characters
/// collapsed to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Slug for a record, falling back to an id fragment for names with no ASCII
/// letters or digits (e.g. Bengali product names).
pub fn slug_for(name: &str, id: Uuid) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        let simple = id.simple().to_string();
        format!("item-{}", &simple[..8])
    } else {
        slug
    }
}

fn check_name(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.add(field, "is required");
    } else if value.chars().count() > max {
        errors.add(field, format!("must be at most {max} characters"));
    }
}

fn check_non_negative(errors: &mut ValidationErrors, field: &str, value: &BigDecimal) {
    if value < &BigDecimal::zero() {
        errors.add(field, "must not be negative");
    }
}

fn check_variations(errors: &mut ValidationErrors, variations: &[VariationInput]) {
    for (i, v) in variations.iter().enumerate() {
        check_name(errors, &format!("variations.{i}.name"), &v.name, 100);
        check_name(errors, &format!("variations.{i}.value"), &v.value, 100);
        if v.stock < 0 {
            errors.add(format!("variations.{i}.stock"), "must not be negative");
        }
    }
}

impl CategoryInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", &self.name, 255);
        errors.into_result()
    }
}

impl CategoryChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            check_name(&mut errors, "name", name, 255);
        }
        errors.into_result()
    }
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", &self.name, 255);
        check_non_negative(&mut errors, "price", &self.price);
        if let Some(sale) = &self.sale_price {
            check_non_negative(&mut errors, "sale_price", sale);
        }
        if self.stock < 0 {
            errors.add("stock", "must not be negative");
        }
        check_variations(&mut errors, &self.variations);
        errors.into_result()
    }
}

impl ProductChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            check_name(&mut errors, "name", name, 255);
        }
        if let Some(price) = &self.price {
            check_non_negative(&mut errors, "price", price);
        }
        if let Some(Some(sale)) = &self.sale_price {
            check_non_negative(&mut errors, "sale_price", sale);
        }
        if matches!(self.stock, Some(s) if s < 0) {
            errors.add("stock", "must not be negative");
        }
        if let Some(variations) = &self.variations {
            check_variations(&mut errors, variations);
        }
        errors.into_result()
    }
}

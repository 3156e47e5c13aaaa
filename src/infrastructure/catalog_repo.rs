use std::collections::HashMap;

use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::PgTextExpressionMethods;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{
    Category, CategoryChanges, CategoryInput, Page, Product, ProductChanges, ProductDetail,
    ProductFilter, ProductInput, ProductVariation, VariationInput,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{categories, product_variations, products};

use super::models::{
    CategoryChangeset, CategoryRow, NewCategoryRow, NewProductRow, NewVariationRow,
    ProductChangeset, ProductRow, VariationRow,
};
use super::offset;

#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_category(row: CategoryRow, products_count: i64) -> Category {
    Category {
        id: row.id,
        name: row.name,
        slug: row.slug,
        description: row.description,
        is_active: row.is_active,
        products_count,
    }
}

fn to_product(row: ProductRow, category_name: Option<String>) -> Product {
    Product {
        id: row.id,
        category_id: row.category_id,
        category_name,
        name: row.name,
        slug: row.slug,
        description: row.description,
        price: row.price,
        sale_price: row.sale_price,
        stock: row.stock,
        images: row.images,
        is_active: row.is_active,
        is_featured: row.is_featured,
        created_at: row.created_at,
    }
}

fn to_variation(row: VariationRow) -> ProductVariation {
    ProductVariation {
        id: row.id,
        product_id: row.product_id,
        name: row.name,
        value: row.value,
        price_adjustment: row.price_adjustment,
        stock: row.stock,
        sku: row.sku,
        is_active: row.is_active,
    }
}

/// `%query%` with LIKE wildcards in the query escaped.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'_, Pg> {
    let mut query = products::table.into_boxed();
    if filter.active_only {
        query = query.filter(products::is_active.eq(true));
    }
    if filter.featured_only {
        query = query.filter(products::is_featured.eq(true));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(products::category_id.eq(category_id));
    }
    if let Some(exclude) = filter.exclude_id {
        query = query.filter(products::id.ne(exclude));
    }
    if let Some(slug) = &filter.category_slug {
        query = query.filter(
            products::category_id.eq_any(
                categories::table
                    .filter(categories::slug.eq(slug))
                    .select(categories::id),
            ),
        );
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(products::name.ilike(like_pattern(search)));
    }
    query
}

fn category_names(conn: &mut PgConnection, rows: Vec<ProductRow>) -> QueryResult<Vec<Product>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.category_id).collect();
    let names: HashMap<Uuid, String> = categories::table
        .filter(categories::id.eq_any(ids))
        .select((categories::id, categories::name))
        .load::<(Uuid, String)>(conn)?
        .into_iter()
        .collect();
    Ok(rows
        .into_iter()
        .map(|row| {
            let name = names.get(&row.category_id).cloned();
            to_product(row, name)
        })
        .collect())
}

fn load_detail(conn: &mut PgConnection, row: ProductRow) -> QueryResult<ProductDetail> {
    let variations = VariationRow::belonging_to(&row)
        .select(VariationRow::as_select())
        .order((product_variations::name.asc(), product_variations::created_at.asc()))
        .load(conn)?;
    let product = category_names(conn, vec![row])?
        .into_iter()
        .next()
        .ok_or(diesel::result::Error::NotFound)?;
    Ok(ProductDetail {
        product,
        variations: variations.into_iter().map(to_variation).collect(),
    })
}

fn product_count(conn: &mut PgConnection, category_id: Uuid) -> QueryResult<i64> {
    products::table
        .filter(products::category_id.eq(category_id))
        .count()
        .get_result(conn)
}

fn insert_variations(
    conn: &mut PgConnection,
    product_id: Uuid,
    inputs: &[VariationInput],
) -> QueryResult<usize> {
    if inputs.is_empty() {
        return Ok(0);
    }
    let rows: Vec<NewVariationRow> = inputs
        .iter()
        .map(|v| NewVariationRow {
            id: Uuid::new_v4(),
            product_id,
            name: v.name.trim(),
            value: v.value.trim(),
            price_adjustment: &v.price_adjustment,
            stock: v.stock,
            sku: v.sku.as_deref(),
        })
        .collect();
    diesel::insert_into(product_variations::table)
        .values(&rows)
        .execute(conn)
}

impl CatalogRepository for DieselCatalogRepository {
    fn list_categories(&self, active_only: bool) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = categories::table.into_boxed();
        if active_only {
            query = query.filter(categories::is_active.eq(true));
        }
        let rows = query
            .select(CategoryRow::as_select())
            .order(categories::name.asc())
            .load(&mut conn)?;

        let counts: HashMap<Uuid, i64> = products::table
            .group_by(products::category_id)
            .select((products::category_id, count_star()))
            .load::<(Uuid, i64)>(&mut conn)?
            .into_iter()
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let count = counts.get(&row.id).copied().unwrap_or(0);
                to_category(row, count)
            })
            .collect())
    }

    fn find_category(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = categories::table
            .find(id)
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(Some(to_category(row, product_count(&mut conn, id)?))),
            None => Ok(None),
        }
    }

    fn create_category(
        &self,
        id: Uuid,
        slug: &str,
        input: &CategoryInput,
    ) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(categories::table)
            .values(&NewCategoryRow {
                id,
                name: input.name.trim(),
                slug,
                description: input.description.as_deref(),
                is_active: input.is_active,
            })
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)?;
        Ok(to_category(row, 0))
    }

    fn update_category(
        &self,
        id: Uuid,
        slug: Option<&str>,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(categories::table.find(id))
            .set(&CategoryChangeset {
                name: changes.name.as_deref().map(str::trim),
                slug,
                description: changes.description.as_deref(),
                is_active: changes.is_active,
                updated_at: chrono::Utc::now(),
            })
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(Some(to_category(row, product_count(&mut conn, id)?))),
            None => Ok(None),
        }
    }

    fn delete_category(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(categories::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn count_products_in_category(&self, id: Uuid) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(product_count(&mut conn, id)?)
    }

    fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<Page<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let rows = filtered(filter)
                .select(ProductRow::as_select())
                .order(products::created_at.desc())
                .limit(limit)
                .offset(offset(page, limit))
                .load(conn)?;

            Ok(Page {
                items: category_names(conn, rows)?,
                total,
            })
        })
    }

    fn find_product(&self, id: Uuid) -> Result<Option<ProductDetail>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(Some(load_detail(&mut conn, row)?)),
            None => Ok(None),
        }
    }

    fn find_product_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .filter(products::slug.eq(slug))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(Some(load_detail(&mut conn, row)?)),
            None => Ok(None),
        }
    }

    fn create_product(
        &self,
        id: Uuid,
        slug: &str,
        input: &ProductInput,
    ) -> Result<ProductDetail, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::insert_into(products::table)
                .values(&NewProductRow {
                    id,
                    category_id: input.category_id,
                    name: input.name.trim(),
                    slug,
                    description: &input.description,
                    price: &input.price,
                    sale_price: input.sale_price.as_ref(),
                    stock: input.stock,
                    images: &input.images,
                    is_active: input.is_active,
                    is_featured: input.is_featured,
                })
                .returning(ProductRow::as_returning())
                .get_result(conn)?;
            insert_variations(conn, id, &input.variations)?;
            Ok(load_detail(conn, row)?)
        })
    }

    fn update_product(
        &self,
        id: Uuid,
        slug: Option<&str>,
        changes: &ProductChanges,
    ) -> Result<Option<ProductDetail>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::update(products::table.find(id))
                .set(&ProductChangeset {
                    category_id: changes.category_id,
                    name: changes.name.as_deref().map(str::trim),
                    slug,
                    description: changes.description.as_deref(),
                    price: changes.price.as_ref(),
                    sale_price: changes.sale_price.as_ref().map(Option::as_ref),
                    stock: changes.stock,
                    images: changes.images.as_deref(),
                    is_active: changes.is_active,
                    is_featured: changes.is_featured,
                    updated_at: chrono::Utc::now(),
                })
                .returning(ProductRow::as_returning())
                .get_result(conn)
                .optional()?;
            let Some(row) = row else {
                return Ok(None);
            };

            if let Some(variations) = &changes.variations {
                diesel::delete(
                    product_variations::table.filter(product_variations::product_id.eq(id)),
                )
                .execute(conn)?;
                insert_variations(conn, id, variations)?;
            }
            Ok(Some(load_detail(conn, row)?))
        })
    }

    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn low_stock_products(&self, threshold: i32, limit: i64) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::stock.le(threshold))
            .select(ProductRow::as_select())
            .order((products::stock.asc(), products::name.asc()))
            .limit(limit)
            .load(&mut conn)?;
        Ok(category_names(&mut conn, rows)?)
    }

    fn count_products(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(products::table.count().get_result(&mut conn)?)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::infrastructure::test_db::setup_db;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn category_input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            description: None,
            is_active: true,
        }
    }

    fn product_input(category_id: Uuid, name: &str, variations: Vec<VariationInput>) -> ProductInput {
        ProductInput {
            category_id,
            name: name.to_string(),
            description: "Hand woven".to_string(),
            price: dec("1200.00"),
            sale_price: Some(dec("999.00")),
            stock: 4,
            images: vec!["products/a.jpg".to_string(), "products/b.jpg".to_string()],
            is_active: true,
            is_featured: false,
            variations,
        }
    }

    fn size(value: &str, adjustment: &str) -> VariationInput {
        VariationInput {
            name: "Size".to_string(),
            value: value.to_string(),
            price_adjustment: dec(adjustment),
            stock: 2,
            sku: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn product_roundtrip_with_variations() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        let category = repo
            .create_category(Uuid::new_v4(), "sarees", &category_input("Sarees"))
            .expect("category");

        let id = Uuid::new_v4();
        let created = repo
            .create_product(
                id,
                "tangail-saree",
                &product_input(category.id, "Tangail Saree", vec![size("M", "0"), size("L", "50.00")]),
            )
            .expect("product");
        assert_eq!(created.variations.len(), 2);
        assert_eq!(created.product.category_name.as_deref(), Some("Sarees"));
        assert_eq!(created.product.images.len(), 2);

        let by_slug = repo
            .find_product_by_slug("tangail-saree")
            .expect("query")
            .expect("found");
        assert_eq!(by_slug.product.id, id);
        assert_eq!(by_slug.product.sale_price, Some(dec("999.00")));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn update_replaces_variations_and_clears_sale_price() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        let category = repo
            .create_category(Uuid::new_v4(), "men", &category_input("Men"))
            .expect("category");
        let id = Uuid::new_v4();
        repo.create_product(id, "panjabi", &product_input(category.id, "Panjabi", vec![size("M", "0")]))
            .expect("product");

        let updated = repo
            .update_product(
                id,
                None,
                &ProductChanges {
                    sale_price: Some(None),
                    variations: Some(vec![size("XL", "20"), size("XXL", "40")]),
                    ..ProductChanges::default()
                },
            )
            .expect("update")
            .expect("exists");
        assert!(updated.product.sale_price.is_none());
        let values: Vec<&str> = updated.variations.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(values.len(), 2);
        assert!(values.contains(&"XL") && values.contains(&"XXL"));

        assert!(repo
            .update_product(Uuid::new_v4(), None, &ProductChanges::default())
            .expect("update")
            .is_none());
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn filters_by_category_slug_and_search() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        let women = repo
            .create_category(Uuid::new_v4(), "women", &category_input("Women"))
            .expect("category");
        let kids = repo
            .create_category(Uuid::new_v4(), "kids", &category_input("Kids"))
            .expect("category");
        for (category, name, slug) in [
            (women.id, "Silk Saree", "silk-saree"),
            (women.id, "100% Cotton Kurti", "cotton-kurti"),
            (kids.id, "Kids Saree Set", "kids-saree-set"),
        ] {
            repo.create_product(Uuid::new_v4(), slug, &product_input(category, name, vec![]))
                .expect("product");
        }

        let by_slug = repo
            .list_products(
                &ProductFilter {
                    category_slug: Some("women".to_string()),
                    ..ProductFilter::default()
                },
                1,
                20,
            )
            .expect("list");
        assert_eq!(by_slug.total, 2);

        let search = repo
            .list_products(
                &ProductFilter {
                    search: Some("saree".to_string()),
                    ..ProductFilter::default()
                },
                1,
                1,
            )
            .expect("list");
        assert_eq!(search.total, 2);
        assert_eq!(search.items.len(), 1);

        let percent = repo
            .list_products(
                &ProductFilter {
                    search: Some("100%".to_string()),
                    ..ProductFilter::default()
                },
                1,
                20,
            )
            .expect("list");
        assert_eq!(percent.total, 1);

        let categories = repo.list_categories(false).expect("categories");
        let counts: Vec<(String, i64)> = categories
            .into_iter()
            .map(|c| (c.name, c.products_count))
            .collect();
        assert_eq!(
            counts,
            vec![("Kids".to_string(), 1), ("Women".to_string(), 2)]
        );
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn category_in_use_is_protected_by_the_database() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);
        let category = repo
            .create_category(Uuid::new_v4(), "bags", &category_input("Bags"))
            .expect("category");
        repo.create_product(Uuid::new_v4(), "tote", &product_input(category.id, "Tote", vec![]))
            .expect("product");

        let err = repo.delete_category(category.id).expect_err("restricted");
        assert!(matches!(err, DomainError::InUse(_)));
        assert_eq!(repo.count_products_in_category(category.id).expect("count"), 1);

        let dup = repo
            .create_category(Uuid::new_v4(), "bags", &category_input("Bags"))
            .expect_err("duplicate name");
        assert!(matches!(dup, DomainError::Conflict(_)));
    }
}

//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use validator::Validate;

use boutique_core::validation::InsertProduct;
use boutique_core::{ProductId, ValidationFailure, to_money_scale};

use super::{RepositoryError, conflict_on_unique};
use crate::models::product::{Page, Product};

const SLUG_TAKEN: &str = "slug already exists";

#[derive(FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: String,
    category: String,
    images: Vec<String>,
    brand: String,
    description: String,
    stock: i32,
    price: Decimal,
    rating: Decimal,
    num_reviews: i32,
    is_featured: bool,
    banner: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            category: row.category,
            images: row.images,
            brand: row.brand,
            description: row.description,
            stock: row.stock,
            price: row.price,
            rating: row.rating,
            num_reviews: row.num_reviews,
            is_featured: row.is_featured,
            banner: row.banner,
            created_at: row.created_at,
        }
    }
}

/// Listing filters. Empty strings are treated as absent.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub query: Option<String>,
    pub category: Option<String>,
    /// 1-based page number.
    pub page: i64,
    pub page_size: i64,
}

impl ProductFilter {
    fn query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Clamped page and its row offset.
    fn page_offset(&self) -> (i64, i64) {
        super::page_offset(self.page, self.page_size)
    }
}

/// Validated price and stock, read out of their coerced form.
fn numeric_fields(product: &InsertProduct) -> Result<(Decimal, i32), RepositoryError> {
    product.validate().map_err(ValidationFailure::from)?;
    match (product.price.value(), product.stock.value()) {
        (Some(price), Some(stock)) => Ok((to_money_scale(price), stock)),
        _ => Err(ValidationFailure::field("price", "Price must be a number").into()),
    }
}

async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    product: &InsertProduct,
) -> Result<Product, RepositoryError> {
    let (price, stock) = numeric_fields(product)?;
    let row = sqlx::query_as::<_, ProductRow>(
        r"
        INSERT INTO products
            (name, slug, category, images, brand, description, stock, price, is_featured, banner)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, name, slug, category, images, brand, description, stock, price,
                  rating, num_reviews, is_featured, banner, created_at
        ",
    )
    .bind(&product.name)
    .bind(&product.slug)
    .bind(&product.category)
    .bind(&product.images)
    .bind(&product.brand)
    .bind(&product.description)
    .bind(stock)
    .bind(price)
    .bind(product.is_featured)
    .bind(&product.banner)
    .fetch_one(&mut **tx)
    .await
    .map_err(conflict_on_unique(SLUG_TAKEN))?;

    Ok(row.into())
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Page<Product>, RepositoryError> {
        let (page, offset) = filter.page_offset();

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, images, brand, description, stock, price,
                   rating, num_reviews, is_featured, banner, created_at
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR category = $2)
            ORDER BY created_at DESC, name ASC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(filter.query())
        .bind(filter.category())
        .bind(filter.page_size)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR category = $2)
            ",
        )
        .bind(filter.query())
        .bind(filter.category())
        .fetch_one(self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Product::from).collect(),
            page,
            filter.page_size,
            total,
        ))
    }

    /// The most recently created products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, images, brand, description, stock, price,
                   rating, num_reviews, is_featured, banner, created_at
            FROM products
            ORDER BY created_at DESC, name ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Featured products that have a banner image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, images, brand, description, stock, price,
                   rating, num_reviews, is_featured, banner, created_at
            FROM products
            WHERE is_featured AND banner IS NOT NULL
            ORDER BY created_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Distinct categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(
            sqlx::query_scalar("SELECT DISTINCT category FROM products ORDER BY category")
                .fetch_all(self.pool)
                .await?,
        )
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, images, brand, description, stock, price,
                   rating, num_reviews, is_featured, banner, created_at
            FROM products
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, images, brand, description, stock, price,
                   rating, num_reviews, is_featured, banner, created_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the payload fails its schema.
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    pub async fn create(&self, product: &InsertProduct) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let created = insert(&mut tx, product).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Replace a product's editable fields. Rating and review count are kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the payload fails its schema.
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the slug belongs to another product.
    pub async fn update(
        &self,
        id: ProductId,
        product: &InsertProduct,
    ) -> Result<Product, RepositoryError> {
        let (price, stock) = numeric_fields(product)?;
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name = $2, slug = $3, category = $4, images = $5, brand = $6,
                description = $7, stock = $8, price = $9, is_featured = $10, banner = $11
            WHERE id = $1
            RETURNING id, name, slug, category, images, brand, description, stock, price,
                      rating, num_reviews, is_featured, banner, created_at
            ",
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.category)
        .bind(&product.images)
        .bind(&product.brand)
        .bind(&product.description)
        .bind(stock)
        .bind(price)
        .bind(product.is_featured)
        .bind(&product.banner)
        .fetch_optional(self.pool)
        .await
        .map_err(conflict_on_unique(SLUG_TAKEN))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete every product and insert `products` in their place.
    ///
    /// Runs in one transaction: on any error nothing is deleted.
    ///
    /// # Errors
    ///
    /// Returns the first `RepositoryError` encountered; the transaction is
    /// rolled back.
    pub async fn replace_all(&self, products: &[InsertProduct]) -> Result<Vec<Product>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM products")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tracing::debug!(deleted, "Cleared products");

        let mut inserted = Vec::with_capacity(products.len());
        for product in products {
            inserted.push(insert(&mut tx, product).await?);
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

//! Catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use boutique_core::ProductId;

/// A product in the catalog.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub images: Vec<String>,
    pub brand: String,
    pub description: String,
    pub stock: i32,
    pub price: Decimal,
    /// Average review rating, recomputed on every review write.
    pub rating: Decimal,
    pub num_reviews: i32,
    pub is_featured: bool,
    pub banner: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// First image, used for cart and order snapshots.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images.first().map_or("", String::as_str)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: i64,
    pub total_pages: i64,
    pub total: i64,
}

impl<T> Page<T> {
    /// Build a page, deriving the page count from `total` and `page_size`.
    #[must_use]
    pub fn new(items: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            items,
            page,
            total_pages,
            total,
        }
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_counts() {
        let page: Page<()> = Page::new(Vec::new(), 1, 12, 25);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_previous());
        assert!(page.has_next());

        let last: Page<()> = Page::new(Vec::new(), 3, 12, 25);
        assert!(last.has_previous());
        assert!(!last.has_next());
    }

    #[test]
    fn test_empty_listing_has_no_pages() {
        let page: Page<()> = Page::new(Vec::new(), 1, 12, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
    }
}

//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use boutique_core::format::{CurrencyFormatter, format_date_time, form_url_query};
use boutique_core::validation::{Coerced, InsertReview};
use boutique_core::{Locale, ProductId};

use crate::db::{ProductFilter, ProductRepository, RepositoryError, ReviewRepository};
use crate::error::{AppError, Result, format_error};
use crate::filters;
use crate::form::FormState;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, Product, Review};
use crate::state::AppState;

use super::Layout;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub brand: String,
    pub description: String,
    pub image: String,
    pub images: Vec<String>,
    pub price: String,
    pub rating: String,
    pub num_reviews: i32,
    pub stock: i32,
    pub in_stock: bool,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, currency: &CurrencyFormatter) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            description: product.description.clone(),
            image: product.primary_image().to_owned(),
            images: product.images.clone(),
            price: currency.format(product.price),
            rating: format!("{:.1}", product.rating),
            num_reviews: product.num_reviews,
            stock: product.stock,
            in_stock: product.in_stock(),
        }
    }

    /// Views for a slice of products.
    #[must_use]
    pub fn many(products: &[Product], currency: &CurrencyFormatter) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, currency)).collect()
    }
}

/// Review display data for templates.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub user_name: String,
    pub rating: i32,
    pub title: String,
    pub description: String,
    pub date: String,
    pub is_verified_purchase: bool,
}

impl ReviewView {
    fn new(review: &Review, locale: Locale) -> Self {
        Self {
            user_name: review.user_name.clone(),
            rating: review.rating,
            title: review.title.clone(),
            description: review.description.clone(),
            date: format_date_time(&review.created_at, locale).date_only,
            is_verified_purchase: review.is_verified_purchase,
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
}

/// Review form data. `rating` stays text until coerced.
#[derive(Debug, Deserialize)]
pub struct ReviewSubmission {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub categories: Vec<String>,
    pub query: String,
    pub category: String,
    pub current_page: i64,
    pub total_pages: i64,
    pub total: i64,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductView,
    pub reviews: Vec<ReviewView>,
    pub can_review: bool,
    pub form: FormState,
}

/// Display product listing page.
#[instrument(skip_all, fields(page = ?query.page))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ListingQuery>,
    RawQuery(raw_query): RawQuery,
) -> Result<impl IntoResponse> {
    let filter = ProductFilter {
        query: query.q.clone(),
        category: query.category.clone(),
        page: query.page.unwrap_or(1).max(1),
        page_size: state.config().page_size,
    };

    let repo = ProductRepository::new(state.pool());
    let page = repo.list(&filter).await?;
    let categories = repo.categories().await?;

    let raw = raw_query.unwrap_or_default();
    let page_link = |n: i64| form_url_query("/products", &raw, "page", Some(&n.to_string()));

    Ok(ProductsIndexTemplate {
        layout: Layout::new(&state, user, "Products"),
        products: ProductView::many(&page.items, state.currency()),
        categories,
        query: query.q.unwrap_or_default(),
        category: query.category.unwrap_or_default(),
        current_page: page.page,
        total_pages: page.total_pages,
        total: page.total,
        previous_url: page.has_previous().then(|| page_link(page.page - 1)),
        next_url: page.has_next().then(|| page_link(page.page + 1)),
    })
}

/// Display product detail page.
#[instrument(skip_all, fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<Response> {
    let product = find_by_slug(&state, &slug).await?;
    render_show(&state, user, &product, FormState::Idle, StatusCode::OK).await
}

/// Add or replace the signed-in user's review of a product.
#[instrument(skip_all, fields(slug = %slug, user_id = %user.id))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
    Form(submission): Form<ReviewSubmission>,
) -> Result<Response> {
    let product = find_by_slug(&state, &slug).await?;
    let reviews = ReviewRepository::new(state.pool());

    let review = InsertReview {
        user_id: user.id,
        product_id: product.id,
        rating: Coerced::parse(&submission.rating),
        title: submission.title,
        description: submission.description,
        is_verified_purchase: reviews.has_purchased(user.id, product.id).await?,
    };

    match reviews.upsert(&review).await {
        Ok(()) => {
            tracing::info!(product_id = %product.id, "Review saved");
            Ok(Redirect::to(&format!("/products/{slug}")).into_response())
        }
        Err(RepositoryError::Invalid(failure)) => {
            render_show(
                &state,
                Some(user),
                &product,
                FormState::failure(format_error(&failure)),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

async fn find_by_slug(state: &AppState, slug: &str) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

async fn render_show(
    state: &AppState,
    user: Option<CurrentUser>,
    product: &Product,
    form: FormState,
    status: StatusCode,
) -> Result<Response> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product.id)
        .await?;

    let template = ProductShowTemplate {
        can_review: user.is_some(),
        layout: Layout::new(state, user, product.name.clone()),
        product: ProductView::new(product, state.currency()),
        reviews: reviews
            .iter()
            .map(|r| ReviewView::new(r, state.locale()))
            .collect(),
        form,
    };

    Ok((status, template).into_response())
}

#[cfg(test)]
mod tests {
    use boutique_core::CurrencyCode;
    use rust_decimal::Decimal;

    use super::*;

    fn product(images: Vec<String>, stock: i32) -> Product {
        Product {
            id: ProductId::generate(),
            name: "Linen Shirt".to_string(),
            slug: "linen-shirt".to_string(),
            category: "Shirts".to_string(),
            images,
            brand: "Atelier".to_string(),
            description: "Light and breathable".to_string(),
            stock,
            price: Decimal::new(4990, 2),
            rating: Decimal::new(45, 1),
            num_reviews: 2,
            is_featured: false,
            banner: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_product_view_formats_price_and_rating() {
        let currency = CurrencyFormatter::new(Locale::EnUs, CurrencyCode::USD);
        let view = ProductView::new(&product(vec!["/a.jpg".to_string()], 3), &currency);
        assert_eq!(view.price, "$49.90");
        assert_eq!(view.rating, "4.5");
        assert_eq!(view.image, "/a.jpg");
        assert!(view.in_stock);
    }

    #[test]
    fn test_product_view_without_images_or_stock() {
        let currency = CurrencyFormatter::new(Locale::EnUs, CurrencyCode::USD);
        let view = ProductView::new(&product(Vec::new(), 0), &currency);
        assert_eq!(view.image, "");
        assert!(!view.in_stock);
    }
}

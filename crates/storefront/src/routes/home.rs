//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

use super::Layout;
use super::products::ProductView;

const FEATURED_LIMIT: i64 = 4;
const LATEST_LIMIT: i64 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub featured: Vec<ProductView>,
    pub latest: Vec<ProductView>,
}

/// Display the home page.
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let repo = ProductRepository::new(state.pool());
    let featured = repo.featured(FEATURED_LIMIT).await?;
    let latest = repo.latest(LATEST_LIMIT).await?;

    Ok(HomeTemplate {
        layout: Layout::new(&state, user, "Home"),
        featured: ProductView::many(&featured, state.currency()),
        latest: ProductView::many(&latest, state.currency()),
    })
}

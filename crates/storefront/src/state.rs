//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use boutique_core::Locale;
use boutique_core::format::CurrencyFormatter;

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    currency: CurrencyFormatter,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let currency = CurrencyFormatter::new(config.locale, config.currency);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                currency,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Formatter for every amount shown to shoppers.
    #[must_use]
    pub fn currency(&self) -> &CurrencyFormatter {
        &self.inner.currency
    }

    /// Display locale for dates and numbers.
    #[must_use]
    pub fn locale(&self) -> Locale {
        self.inner.config.locale
    }
}

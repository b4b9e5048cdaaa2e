//! Seed the catalog from a YAML file.
//!
//! # Usage
//!
//! ```bash
//! boutique-cli seed products
//! boutique-cli seed products --file path/to/products.yaml
//! ```
//!
//! Every product is validated before the database is touched. The existing
//! catalog is then deleted and the new one inserted in a single transaction,
//! so a failure leaves the previous catalog in place.

use std::path::Path;

use boutique_core::ValidationFailure;
use boutique_core::validation::{FieldError, InsertProduct};
use boutique_storefront::db::{self, ProductRepository};
use validator::Validate;

use super::{CommandError, database_url};

/// Seed file bundled with the CLI, resolved against the crate directory so
/// the command works from any working directory.
pub const DEFAULT_PRODUCTS_FILE: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample-products.yaml");

/// Parse and validate a list of products.
///
/// Field paths are prefixed with the product's position, e.g. `[2].price`.
///
/// # Errors
///
/// Returns `CommandError::Yaml` for malformed input and
/// `CommandError::Validation` listing every invalid field.
pub fn parse_products(content: &str) -> Result<Vec<InsertProduct>, CommandError> {
    let products: Vec<InsertProduct> = serde_yaml::from_str(content)?;

    let errors: Vec<FieldError> = products
        .iter()
        .enumerate()
        .filter_map(|(index, product)| {
            product
                .validate()
                .err()
                .map(|e| (index, ValidationFailure::from(e)))
        })
        .flat_map(|(index, failure)| {
            failure
                .errors()
                .iter()
                .map(|error| FieldError {
                    path: format!("[{index}].{}", error.path),
                    message: error.message.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(CommandError::Validation(ValidationFailure::from_errors(errors)))
    }
}

/// Replace the catalog with the products in `file`.
///
/// # Errors
///
/// Returns an error if the file can't be read or validated, or if the
/// database write fails (in which case nothing is changed).
pub async fn products(file: &Path) -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!(path = %file.display(), "Loading products");
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CommandError::Io {
            path: file.display().to_string(),
            source,
        })?;
    let products = parse_products(&content)?;
    tracing::info!(count = products.len(), "Products validated");

    let pool = db::create_pool(&database_url).await?;
    tracing::info!("Connected to database");

    let inserted = ProductRepository::new(&pool).replace_all(&products).await?;

    tracing::info!(inserted = inserted.len(), "Seeding complete");
    for product in &inserted {
        tracing::debug!(id = %product.id, slug = %product.slug, "Inserted product");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_bundled_sample_is_valid() {
        let products = parse_products(include_str!("../../data/sample-products.yaml")).unwrap();
        assert_eq!(products.len(), 6);
        let first = products.first().unwrap();
        assert_eq!(first.slug, "polo-sporting-stretch-shirt");
        assert_eq!(first.price.value(), Some(Decimal::new(5999, 2)));
        assert!(products.iter().any(|p| p.stock.value() == Some(0)));
    }

    #[test]
    fn test_invalid_products_report_positions() {
        let yaml = r#"
- name: Good Shirt
  slug: good-shirt
  category: Shirts
  brand: Atelier
  description: Fine cotton
  images: [/a.jpg]
  price: "10.00"
  stock: 1
- name: Bad
  slug: bad-shirt
  category: Shirts
  brand: Atelier
  description: Fine cotton
  images: [/b.jpg]
  price: "10.00"
  stock: -2
"#;
        let Err(CommandError::Validation(failure)) = parse_products(yaml) else {
            panic!("expected a validation failure");
        };
        assert!(failure.has_path("[1].stock"));
        assert!(!failure.has_path("[1].name"));
        assert!(!failure.has_path("[0].stock"));
    }

    #[test]
    fn test_default_file_exists() {
        assert!(Path::new(DEFAULT_PRODUCTS_FILE).is_file());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            parse_products("not: [a list"),
            Err(CommandError::Yaml(_))
        ));
    }
}

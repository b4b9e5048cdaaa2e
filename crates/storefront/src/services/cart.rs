//! Cart line manipulation.
//!
//! Pure functions over a cart's lines; persistence is the caller's job.

use boutique_core::ValidationFailure;
use boutique_core::validation::{CartItem, Validated};

use crate::models::product::Product;

/// Snapshot a product as a single-unit cart line.
///
/// # Errors
///
/// Returns a `ValidationFailure` if the product can't form a valid line
/// (e.g. it has no image).
pub fn line_for(product: &Product, quantity: i32) -> Result<CartItem, ValidationFailure> {
    CartItem {
        product_id: product.id.to_string(),
        name: product.name.clone(),
        slug: product.slug.clone(),
        quantity,
        image: product.primary_image().to_owned(),
        price: product.price,
    }
    .validated()
}

/// Add `line` to `items`, merging with an existing line for the same product.
///
/// # Errors
///
/// Returns a `ValidationFailure` on `quantity` if the merged quantity would
/// exceed `stock`.
pub fn add_line(items: &mut Vec<CartItem>, line: CartItem, stock: i32) -> Result<(), ValidationFailure> {
    let existing = items.iter().position(|i| i.product_id == line.product_id);
    let current = existing
        .and_then(|index| items.get(index))
        .map_or(0, |i| i.quantity);
    let wanted = current.saturating_add(line.quantity);

    if wanted > stock {
        return Err(ValidationFailure::field(
            "quantity",
            format!("Not enough stock for {}", line.name),
        ));
    }

    match existing.and_then(|index| items.get_mut(index)) {
        Some(item) => {
            item.quantity = wanted;
            // Refresh the snapshot so price changes show up on the next add.
            item.price = line.price;
        }
        None => items.push(line),
    }
    Ok(())
}

/// Remove one unit of `product_id`, dropping the line when it reaches zero.
///
/// Returns `false` if the product is not in the cart.
pub fn remove_one(items: &mut Vec<CartItem>, product_id: &str) -> bool {
    let Some(index) = items.iter().position(|i| i.product_id == product_id) else {
        return false;
    };
    if let Some(item) = items.get_mut(index)
        && item.quantity > 1
    {
        item.quantity -= 1;
    } else {
        items.remove(index);
    }
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn line(id: &str, quantity: i32) -> CartItem {
        CartItem {
            product_id: id.to_owned(),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            quantity,
            image: "/images/p.jpg".to_owned(),
            price: Decimal::new(1999, 2),
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut items = Vec::new();
        add_line(&mut items, line("a", 1), 5).unwrap();
        add_line(&mut items, line("a", 2), 5).unwrap();
        add_line(&mut items, line("b", 1), 5).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.first().unwrap().quantity, 3);
    }

    #[test]
    fn test_add_beyond_stock_fails() {
        let mut items = vec![line("a", 2)];
        let failure = add_line(&mut items, line("a", 1), 2).unwrap_err();
        assert_eq!(failure.message_for("quantity"), Some("Not enough stock for Product a"));
        assert_eq!(items.first().unwrap().quantity, 2);
    }

    #[test]
    fn test_remove_one_decrements_then_drops() {
        let mut items = vec![line("a", 2)];
        assert!(remove_one(&mut items, "a"));
        assert_eq!(items.first().unwrap().quantity, 1);
        assert!(remove_one(&mut items, "a"));
        assert!(items.is_empty());
        assert!(!remove_one(&mut items, "a"));
    }
}

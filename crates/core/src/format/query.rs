//! Query-string merging for pagination and filter links.

use std::collections::BTreeMap;

/// Build a link to `path` whose query is `params` with `key` overwritten.
///
/// A `None` value removes the key. Keys are emitted in sorted order and
/// values are percent-encoded.
///
/// ```
/// use boutique_core::format::form_url_query;
///
/// let link = form_url_query("/products", "?q=shirt&page=1", "page", Some("2"));
/// assert_eq!(link, "/products?page=2&q=shirt");
/// ```
#[must_use]
pub fn form_url_query(path: &str, params: &str, key: &str, value: Option<&str>) -> String {
    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let raw = params.strip_prefix('?').unwrap_or(params);
    for (k, v) in url::form_urlencoded::parse(raw.as_bytes()) {
        query.entry(k.into_owned()).or_default().push(v.into_owned());
    }

    match value {
        Some(value) => {
            query.insert(key.to_owned(), vec![value.to_owned()]);
        }
        None => {
            query.remove(key);
        }
    }

    let serialized = query
        .iter()
        .flat_map(|(k, values)| {
            values.iter().map(move |v| {
                format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))
            })
        })
        .collect::<Vec<_>>()
        .join("&");

    if serialized.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{serialized}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrites_existing_key() {
        assert_eq!(
            form_url_query("/products", "category=shoes&page=4", "page", Some("5")),
            "/products?category=shoes&page=5"
        );
    }

    #[test]
    fn test_adds_missing_key() {
        assert_eq!(
            form_url_query("/products", "", "category", Some("hats")),
            "/products?category=hats"
        );
    }

    #[test]
    fn test_none_removes_key() {
        assert_eq!(
            form_url_query("/products", "?q=shirt&page=3", "page", None),
            "/products?q=shirt"
        );
        assert_eq!(form_url_query("/products", "page=3", "page", None), "/products");
    }

    #[test]
    fn test_values_are_encoded() {
        assert_eq!(
            form_url_query("/products", "q=red+shirt", "sort", Some("price asc")),
            "/products?q=red%20shirt&sort=price%20asc"
        );
    }
}

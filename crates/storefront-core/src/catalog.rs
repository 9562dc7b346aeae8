//! # Catalog Queries
//!
//! Helpers for building requests to the catalog read API
//! (`fetchProducts(limit, filterQuery?)`). The cart itself never calls the
//! catalog; these live here so every page builds the same filters.
//!
//! ## Category Pages
//! ```text
//! /category/shop            ──► no filter (all products)
//! /category/indoor-saunas   ──► "product_type:indoor OR title:indoor"
//! /category/unknown-slug    ──► no filter
//! ```

use serde::{Deserialize, Serialize};

/// Default page size for product grids.
pub const DEFAULT_GRID_LIMIT: u32 = 12;

/// Page size used when counting products in a category.
pub const CATEGORY_COUNT_LIMIT: u32 = 100;

/// Slug of the "all products" category.
pub const ALL_PRODUCTS_SLUG: &str = "shop";

const CATEGORY_FILTERS: &[(&str, &str)] = &[
    ("indoor-saunas", "product_type:indoor OR title:indoor"),
    (
        "outdoor-saunas",
        "product_type:outdoor OR title:outdoor OR title:barrel",
    ),
    ("steam-rooms", "product_type:steam OR title:steam"),
    ("infrared-saunas", "product_type:infrared OR title:infrared"),
    ("sauna-heaters", "product_type:heater OR title:heater"),
    ("accessories", "product_type:accessories OR product_type:accessory"),
];

/// Maps a category slug to its catalog filter query.
///
/// Returns `None` for the all-products slug and for unknown slugs; both mean
/// "unfiltered".
pub fn category_filter(slug: &str) -> Option<&'static str> {
    if slug == ALL_PRODUCTS_SLUG {
        return None;
    }
    CATEGORY_FILTERS
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, filter)| *filter)
}

/// Turns a slug into a page heading: `"indoor-saunas"` → `"Indoor Saunas"`.
pub fn format_category_name(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filter for "More {type}s" carousels on a product page.
pub fn related_products_filter(product_type: &str) -> String {
    format!("product_type:{}", product_type)
}

/// A product listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub limit: u32,
    pub filter: Option<String>,
    /// Handle to drop from results (the product currently on screen).
    pub exclude_handle: Option<String>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        CatalogQuery {
            limit: DEFAULT_GRID_LIMIT,
            filter: None,
            exclude_handle: None,
        }
    }
}

impl CatalogQuery {
    /// Query for a category page's product count.
    pub fn for_category(slug: &str) -> Self {
        CatalogQuery {
            limit: CATEGORY_COUNT_LIMIT,
            filter: category_filter(slug).map(str::to_string),
            exclude_handle: None,
        }
    }

    /// Query for a "More {type}s" carousel under a product.
    pub fn related_to(product_type: &str, handle: &str) -> Self {
        CatalogQuery {
            filter: Some(related_products_filter(product_type)),
            exclude_handle: Some(handle.to_string()),
            ..CatalogQuery::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Whether a product with `handle` belongs in the results.
    pub fn keeps(&self, handle: &str) -> bool {
        self.exclude_handle.as_deref() != Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_filter() {
        assert_eq!(category_filter("shop"), None);
        assert_eq!(
            category_filter("steam-rooms"),
            Some("product_type:steam OR title:steam")
        );
        assert_eq!(category_filter("garden-gnomes"), None);
    }

    #[test]
    fn test_format_category_name() {
        assert_eq!(format_category_name("indoor-saunas"), "Indoor Saunas");
        assert_eq!(format_category_name("accessories"), "Accessories");
        assert_eq!(format_category_name("a--b"), "A B");
    }

    #[test]
    fn test_related_query_excludes_current_product() {
        let q = CatalogQuery::related_to("Sauna", "barrel-sauna");
        assert_eq!(q.filter.as_deref(), Some("product_type:Sauna"));
        assert_eq!(q.limit, DEFAULT_GRID_LIMIT);
        assert!(!q.keeps("barrel-sauna"));
        assert!(q.keeps("cube-sauna"));
    }

    #[test]
    fn test_category_query() {
        let q = CatalogQuery::for_category("sauna-heaters").limit(50);
        assert_eq!(q.limit, 50);
        assert!(q.filter.unwrap().contains("heater"));
        assert!(CatalogQuery::for_category("shop").filter.is_none());
    }
}

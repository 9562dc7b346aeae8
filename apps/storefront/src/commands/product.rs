//! # Product Commands
//!
//! Product listing and "Add to cart" from a product page or card.
//!
//! The catalog itself is read-only input. Here it is a JSON export of the
//! catalog API (`products.json`), loaded once and searched in memory.
//!
//! ## Add-to-Cart Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Add to Cart                                          │
//! │                                                                         │
//! │  ProductCard "Add"            ProductInfo "Add to cart" (qty 2, Large)  │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  variant = first            variant = selected (or VariantNotFound)     │
//! │       │                                   │                             │
//! │       └─────────────────┬─────────────────┘                             │
//! │                         ▼                                               │
//! │          availableForSale? ── no ──► VARIANT_UNAVAILABLE                │
//! │                         │ yes                                           │
//! │                         ▼                                               │
//! │          LineItemInput::from_variant ──► CartStore::add_item            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use storefront_core::catalog::CatalogQuery;
use storefront_core::{LineItemInput, Money, Product};
use tracing::{debug, info};

use super::cart::CartResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::CartState;

// =============================================================================
// Catalog
// =============================================================================

/// In-memory product list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// Reads a catalog export: either `{"products": [...]}` or a bare array.
    pub fn from_path(path: &Path) -> ApiResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ApiError::not_found("Catalog file", &format!("{} ({})", path.display(), e))
        })?;
        let catalog = Self::from_json(&text)?;
        info!(path = %path.display(), products = catalog.products.len(), "Catalog loaded");
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> ApiResult<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum CatalogFile {
            Wrapped { products: Vec<Product> },
            Bare(Vec<Product>),
        }

        let file: CatalogFile = serde_json::from_str(text)
            .map_err(|e| ApiError::validation(format!("Invalid catalog JSON: {}", e)))?;

        Ok(match file {
            CatalogFile::Wrapped { products } | CatalogFile::Bare(products) => {
                Catalog::new(products)
            }
        })
    }

    pub fn by_handle(&self, handle: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.handle == handle)
    }

    /// Products matching a query, in catalog order.
    pub fn search(&self, query: &CatalogQuery) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| query.keeps(&p.handle))
            .filter(|p| {
                query
                    .filter
                    .as_deref()
                    .map_or(true, |filter| matches_filter(p, filter))
            })
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .collect()
    }
}

/// Evaluates a `field:value OR field:value` filter the way the catalog API
/// does for the fields we use: case-insensitive substring on `title` and
/// `product_type`.
pub fn matches_filter(product: &Product, filter: &str) -> bool {
    filter.split(" OR ").any(|term| {
        let Some((field, value)) = term.trim().split_once(':') else {
            return false;
        };
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return false;
        }
        let haystack = match field.trim() {
            "title" => product.title.to_lowercase(),
            "product_type" => product.product_type.as_deref().unwrap_or("").to_lowercase(),
            _ => return false,
        };
        haystack.contains(&value)
    })
}

// =============================================================================
// Commands
// =============================================================================

/// Product card data for grids and carousels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub handle: String,
    pub title: String,
    pub product_type: Option<String>,
    pub min_price: Option<Money>,
    pub image_url: Option<String>,
    /// Any variant can be bought.
    pub available: bool,
}

impl From<&Product> for ProductSummary {
    fn from(p: &Product) -> Self {
        ProductSummary {
            handle: p.handle.clone(),
            title: p.title.clone(),
            product_type: p.product_type.clone(),
            min_price: p.min_price().cloned(),
            image_url: p.featured_image().map(|img| img.url.clone()),
            available: p.variants.iter().any(|v| v.available_for_sale),
        }
    }
}

/// Lists products for a grid, category page or "more like this" carousel.
pub fn list_products(catalog: &Catalog, query: &CatalogQuery) -> Vec<ProductSummary> {
    debug!(filter = ?query.filter, limit = query.limit, "list_products command");
    catalog
        .search(query)
        .into_iter()
        .map(ProductSummary::from)
        .collect()
}

/// "More {type}s" carousel under a product page.
///
/// A product without a `product_type` has nothing to relate to, so the list
/// is empty rather than the whole catalog.
pub fn related_products(
    catalog: &Catalog,
    handle: &str,
    limit: Option<u32>,
) -> ApiResult<Vec<ProductSummary>> {
    let current = catalog
        .by_handle(handle)
        .ok_or_else(|| ApiError::not_found("Product", handle))?;

    let Some(product_type) = current
        .product_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
    else {
        debug!(handle = %handle, "No product type; no related products");
        return Ok(Vec::new());
    };

    let query = CatalogQuery::related_to(product_type, handle);
    let query = match limit {
        Some(n) => query.limit(n),
        None => query,
    };
    Ok(list_products(catalog, &query))
}

/// Adds a product to the cart by handle.
///
/// ## Arguments
/// * `variant_id` - Chosen variant; `None` adds the first variant
/// * `quantity` - Defaults to 1
///
/// ## Errors
/// - `NOT_FOUND` for an unknown handle or variant, or a product without variants
/// - `VARIANT_UNAVAILABLE` when the variant is not for sale
pub fn add_product_to_cart(
    cart: &CartState,
    catalog: &Catalog,
    handle: &str,
    variant_id: Option<&str>,
    quantity: Option<i64>,
) -> ApiResult<CartResponse> {
    let quantity = quantity.unwrap_or(1);
    debug!(handle = %handle, ?variant_id, quantity, "add_product_to_cart command");

    let product = catalog
        .by_handle(handle)
        .ok_or_else(|| ApiError::not_found("Product", handle))?;

    let variant = product.resolve_variant(variant_id)?;
    let input = LineItemInput::from_variant(product, variant, quantity)?;

    Ok(cart.with_cart_mut(|store| {
        store.add_item(input);
        CartResponse::from(&*store)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::{CartPersistence, CartStore, MemorySlotStore};
    use std::sync::Arc;
    use storefront_core::catalog::category_filter;
    use storefront_core::CurrencyCode;

    const CATALOG: &str = r#"{
        "products": [
            {
                "id": "gid://shopify/Product/1",
                "handle": "barrel-sauna",
                "title": "Outdoor Barrel Sauna",
                "productType": "Outdoor",
                "images": [{"url": "https://cdn.example/barrel.jpg"}],
                "variants": [
                    {
                        "id": "gid://shopify/ProductVariant/11",
                        "title": "Small",
                        "price": {"amount": "3999.0", "currencyCode": "USD"},
                        "selectedOptions": [{"name": "Size", "value": "Small"}]
                    },
                    {
                        "id": "gid://shopify/ProductVariant/12",
                        "title": "Large",
                        "price": {"amount": "4999.0", "currencyCode": "USD"},
                        "availableForSale": false,
                        "selectedOptions": [{"name": "Size", "value": "Large"}]
                    }
                ]
            },
            {
                "id": "gid://shopify/Product/2",
                "handle": "cabin-heater",
                "title": "Cabin Heater 6kW",
                "productType": "Heater",
                "variants": [
                    {
                        "id": "gid://shopify/ProductVariant/21",
                        "title": "Default Title",
                        "price": {"amount": "899.0", "currencyCode": "USD"}
                    }
                ]
            },
            {
                "id": "gid://shopify/Product/3",
                "handle": "empty-shell",
                "title": "Empty Shell",
                "variants": []
            }
        ]
    }"#;

    fn setup() -> (CartState, Catalog) {
        let slots = Arc::new(MemorySlotStore::new());
        let persistence = CartPersistence::new(slots, "storefront-cart");
        let cart = CartState::new(CartStore::hydrate(persistence, CurrencyCode::usd()));
        (cart, Catalog::from_json(CATALOG).unwrap())
    }

    #[test]
    fn test_add_first_variant() {
        let (cart, catalog) = setup();
        let response = add_product_to_cart(&cart, &catalog, "barrel-sauna", None, None).unwrap();

        let line = &response.items[0];
        assert_eq!(line.variant_id, "gid://shopify/ProductVariant/11");
        assert_eq!(line.variant_title, "Small");
        assert_eq!(line.product_handle.as_deref(), Some("barrel-sauna"));
        assert_eq!(line.image_url.as_deref(), Some("https://cdn.example/barrel.jpg"));
    }

    #[test]
    fn test_add_selected_variant_with_quantity() {
        let (cart, catalog) = setup();
        add_product_to_cart(
            &cart,
            &catalog,
            "cabin-heater",
            Some("gid://shopify/ProductVariant/21"),
            Some(2),
        )
        .unwrap();
        let response = add_product_to_cart(&cart, &catalog, "cabin-heater", None, Some(1)).unwrap();

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.totals.item_count, 3);
        assert_eq!(response.totals.subtotal.to_string(), "$2,697.00");
    }

    #[test]
    fn test_add_errors() {
        let (cart, catalog) = setup();

        let err = add_product_to_cart(&cart, &catalog, "nope", None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = add_product_to_cart(
            &cart,
            &catalog,
            "barrel-sauna",
            Some("gid://shopify/ProductVariant/12"),
            None,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::VariantUnavailable);

        let err = add_product_to_cart(&cart, &catalog, "barrel-sauna", Some("x"), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = add_product_to_cart(&cart, &catalog, "empty-shell", None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        assert!(cart.with_cart(|s| s.is_empty()));
    }

    #[test]
    fn test_category_listing() {
        let (_, catalog) = setup();

        let outdoor = list_products(&catalog, &CatalogQuery::for_category("outdoor-saunas"));
        assert_eq!(outdoor.len(), 1);
        assert_eq!(outdoor[0].handle, "barrel-sauna");
        assert_eq!(outdoor[0].min_price.as_ref().unwrap().to_string(), "$3,999.00");

        let all = list_products(&catalog, &CatalogQuery::for_category("shop"));
        assert_eq!(all.len(), 3);
        assert!(!all[2].available);
    }

    #[test]
    fn test_related_products_exclude_current() {
        let (_, catalog) = setup();
        let related = list_products(&catalog, &CatalogQuery::related_to("Heater", "cabin-heater"));
        assert!(related.is_empty());

        let query = CatalogQuery::related_to("Outdoor", "cabin-heater");
        assert_eq!(list_products(&catalog, &query).len(), 1);
    }

    #[test]
    fn test_related_products_without_type_is_empty() {
        let (_, catalog) = setup();

        assert!(related_products(&catalog, "empty-shell", None).unwrap().is_empty());
        assert!(related_products(&catalog, "cabin-heater", None).unwrap().is_empty());

        let err = related_products(&catalog, "nope", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_matches_filter() {
        let (_, catalog) = setup();
        let heater = catalog.by_handle("cabin-heater").unwrap();
        assert!(matches_filter(heater, category_filter("sauna-heaters").unwrap()));
        assert!(!matches_filter(heater, category_filter("steam-rooms").unwrap()));
        assert!(!matches_filter(heater, "vendor:heater"));
        assert!(!matches_filter(heater, "product_type:"));
    }

    #[test]
    fn test_bare_array_catalog() {
        let catalog = Catalog::from_json("[]").unwrap();
        assert!(catalog.products.is_empty());
        assert!(Catalog::from_json("{").is_err());
    }
}

//! @group General
//! Miscellaneous endpoints.

use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;

/// Health check.
///
/// Always answers with a static payload.
/// #@footer@#
/// Not rate limited.
///
/// @response {"status": "ok"}
pub async fn health() -> &'static str {
    "ok"
}

/**
 * @group Products
 * Browse and manage the catalogue.
 */
pub struct ProductController;

impl ProductController {
    /// List products.
    ///
    /// @queryParam page The page number.
    /// @queryParam tags[] Filter by tags. Example: sale
    /// @queryParam sort Sort column. No-example
    /// @responseFile products/index.json {'total': 2}
    pub async fn index(&self, Query(filter): Query<ProductFilter>) -> Json<Vec<Product>> {
        todo!()
    }

    /// Show a product.
    ///
    /// @uriParam id integer The product id. Example: 7
    /// @response 200 {"id": 7, "name": "Lamp"}
    /// @response 404 comment="Unknown product" {"message": "Not found"}
    pub async fn show(&self, Path(id): Path<u64>) -> Json<Product> {
        todo!()
    }

    /// @group Admin
    /// Create a product.
    ///
    /// @authenticated
    pub async fn store(&self, Json(input): Json<CreateProduct>) -> Json<Product> {
        todo!()
    }

    /// Download the product sheet.
    ///
    /// @responsePdfFile 200 products/sheet.pdf
    pub async fn sheet(&self, Path(id): Path<u64>) -> Vec<u8> {
        todo!()
    }
}

/// @bodyParam name string required Product name. Example: Lamp
/// @bodyParam price float required Price in euros. Example: 19.99
/// @bodyParam tags string[] Tags. Example: [sale, new]
/// @bodyParam dimensions.width integer Width in cm. Example: 30
#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    name: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    page: Option<u32>,
}

pub struct Product;

//! Products

use serde::{Deserialize, Serialize};

use super::{parse_price, FormError, Messages, Resource, ResourceForm, ResourceId};

/// A product as returned by `GET /products/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ResourceId,
    pub name: String,
    pub price: f64,
}

/// Create/update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
}

impl Resource for Product {
    type Input = ProductInput;

    const COLLECTION: &'static str = "products";

    const MESSAGES: Messages = Messages {
        load_failed: "Failed to load products",
        created: "Product created",
        updated: "Product updated",
        deleted: "Product deleted",
        create_failed: "Create failed",
        update_failed: "Update failed",
        delete_failed: "Delete failed",
        confirm_delete: "Are you sure you want to delete this product?",
    };

    fn id(&self) -> &ResourceId {
        &self.id
    }
}

/// Product form: both fields are required
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
}

impl ResourceForm for ProductForm {
    type Resource = Product;

    fn validate(&self) -> Result<ProductInput, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::Required("Product name".to_string()));
        }
        let price = parse_price("Price", &self.price)?;

        Ok(ProductInput {
            name: self.name.clone(),
            price,
        })
    }

    fn fill(&mut self, product: &Product) {
        self.name = product.name.clone();
        self.price = product.price.to_string();
    }

    fn is_blank(&self) -> bool {
        self.name.is_empty() && self.price.is_empty()
    }
}

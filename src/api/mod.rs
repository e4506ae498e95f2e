//! REST API Access
//!
//! Client side of the remote REST API. Every call is a single request with
//! binary success/failure; nothing is retried.
//!
//! # Endpoints
//!
//! - `GET /products/`, `POST /products/`
//! - `PUT /products/:id/`, `DELETE /products/:id/`
//! - `GET /invoices/`, `POST /invoices/`
//! - `PUT /invoices/:id/`, `DELETE /invoices/:id/`
//!
//! # Example
//!
//! ```rust,no_run
//! use invoicedesk::api::ApiClient;
//! use invoicedesk::config::ApiConfig;
//! use invoicedesk::resources::Product;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(&ApiConfig::default())?;
//!     let products = client.list::<Product>().await?;
//!     println!("{} products", products.len());
//!     Ok(())
//! }
//! ```

mod client;
mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};

use async_trait::async_trait;

use crate::resources::{Resource, ResourceId};

/// CRUD operations on one collection
///
/// [`ApiClient`] implements this for every [`Resource`]; controllers only
/// depend on the trait.
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    async fn list(&self) -> ApiResult<Vec<R>>;

    async fn create(&self, input: &R::Input) -> ApiResult<()>;

    async fn update(&self, id: &ResourceId, input: &R::Input) -> ApiResult<()>;

    async fn delete(&self, id: &ResourceId) -> ApiResult<()>;
}

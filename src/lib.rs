//! # Invoicedesk
//!
//! Client for a small back-office API: product and invoice management over
//! REST, plus a chat assistant over a WebSocket.
//!
//! ## Features
//!
//! - **Resource controllers**: form validation, create/update/delete, list refresh
//! - **Notifications**: success and failure toasts for every action
//! - **Realtime chat**: one owned channel per mounted view, optimistic echo
//! - **Configuration**: TOML file with environment overrides
//!
//! ## Modules
//!
//! - [`api`]: REST client for the `/products/` and `/invoices/` collections
//! - [`resources`]: resource types and their forms
//! - [`controller`]: list/form/notification controller per collection
//! - [`chat`]: chat transcript, connection lifecycle and transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoicedesk::api::ApiClient;
//! use invoicedesk::config::Config;
//! use invoicedesk::controller::ProductsController;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let client = ApiClient::new(&config.api)?;
//!
//!     let mut products = ProductsController::mount(client).await;
//!     products.form_mut().name = "Laptop".to_string();
//!     products.form_mut().price = "1000".to_string();
//!     products.submit().await;
//!
//!     for note in products.take_notifications() {
//!         println!("{}", note);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod config;
pub mod controller;
pub mod logging;
pub mod notify;
pub mod resources;

// Re-export top-level types for convenience
pub use api::{ApiClient, ApiError, ApiResult, ResourceApi};

pub use chat::{
    ChatError, ChatMessage, ChatTransport, ChatUpdate, ChatView, CloseReason, ConnectionState,
    Sender, WebSocketTransport,
};

pub use config::{ApiConfig, ChatConfig, Config, ConfigError, LoggingConfig};

pub use controller::{Confirm, InvoicesController, Outcome, ProductsController, ResourceController};

pub use notify::{Level, Notification, Notifier};

pub use resources::{
    FormError, Invoice, InvoiceForm, LineItem, Product, ProductForm, Resource, ResourceForm,
    ResourceId,
};

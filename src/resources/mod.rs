//! Server-owned Resources
//!
//! Products and invoices as the client sees them: transient copies fetched
//! from the REST API, plus the form state used to create and edit them.
//!
//! - [`Resource`]: what a collection looks like on the wire
//! - [`ResourceForm`]: editable form state that validates into a payload
//! - [`ResourceId`]: opaque identifier used for update/delete addressing

mod invoice;
mod product;

pub use invoice::{Invoice, InvoiceForm, InvoiceInput, LineItem, LineItemForm};
pub use product::{Product, ProductForm, ProductInput};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Resource identifier
///
/// Servers hand out either numeric or string ids; both are kept verbatim and
/// serialized back in their original JSON type. Ids are opaque, so equality
/// and hashing go through the textual form: `Number(3)` equals `Text("3")`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{}", n),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for ResourceId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ResourceId::Number(a), ResourceId::Number(b)) => a == b,
            (ResourceId::Text(a), ResourceId::Text(b)) => a == b,
            (ResourceId::Number(n), ResourceId::Text(s))
            | (ResourceId::Text(s), ResourceId::Number(n)) => *s == n.to_string(),
        }
    }
}

impl Eq for ResourceId {}

impl Hash for ResourceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ResourceId::Number(n) => n.to_string().hash(state),
            ResourceId::Text(s) => s.hash(state),
        }
    }
}

impl FromStr for ResourceId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(n) => ResourceId::Number(n),
            Err(_) => ResourceId::Text(s.to_string()),
        })
    }
}

impl From<u64> for ResourceId {
    fn from(n: u64) -> Self {
        ResourceId::Number(n)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        ResourceId::Text(s.to_string())
    }
}

/// User-facing texts for one resource type
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub load_failed: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub create_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
    pub confirm_delete: &'static str,
}

/// Shown when a list response does not have the expected shape
pub const UNEXPECTED_RESPONSE: &str = "Unexpected API response";

/// A REST collection
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// JSON body for create and update
    type Input: Serialize + Send + Sync;

    /// Path segment of the collection, e.g. `products`
    const COLLECTION: &'static str;

    const MESSAGES: Messages;

    fn id(&self) -> &ResourceId;
}

/// Editable form state for a resource
pub trait ResourceForm: Default + Clone + Send {
    type Resource: Resource;

    /// Check required fields and build the request payload
    fn validate(&self) -> Result<<Self::Resource as Resource>::Input, FormError>;

    /// Copy a resource's fields into the form for editing
    fn fill(&mut self, resource: &Self::Resource);

    /// Whether every field is empty
    fn is_blank(&self) -> bool;
}

/// Form validation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(String),

    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: String, value: String },
}

/// Parse a price field the way a number input would
pub(crate) fn parse_price(field: &str, raw: &str) -> Result<f64, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required(field.to_string()));
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Render a price without a trailing `.0` for whole amounts
pub(crate) fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{}", price as i64)
    } else {
        format!("{}", price)
    }
}

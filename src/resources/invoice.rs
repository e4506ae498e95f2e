//! Invoices
//!
//! An invoice is a customer plus a list of line items. The form always keeps
//! at least one (possibly empty) line so there is somewhere to type.

use serde::{Deserialize, Serialize};

use super::{
    format_price, parse_price, FormError, Messages, Resource, ResourceForm, ResourceId,
};

/// A line on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub price: f64,
}

/// An invoice as returned by `GET /invoices/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: ResourceId,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub products: Vec<LineItem>,
}

impl Invoice {
    /// Customer name, or `N/A` when the server has none
    pub fn customer_label(&self) -> &str {
        match self.customer.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => "N/A",
        }
    }

    pub fn total(&self) -> f64 {
        self.products.iter().map(|p| p.price).sum()
    }

    /// One-line summary of the line items
    pub fn summary(&self) -> String {
        self.products
            .iter()
            .map(|p| format!("{} (${})", p.name, format_price(p.price)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Create/update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceInput {
    pub customer: String,
    pub products: Vec<LineItem>,
}

impl Resource for Invoice {
    type Input = InvoiceInput;

    const COLLECTION: &'static str = "invoices";

    const MESSAGES: Messages = Messages {
        load_failed: "Failed to load invoices",
        created: "Invoice created",
        updated: "Invoice updated",
        deleted: "Invoice deleted",
        create_failed: "Creation failed",
        update_failed: "Update failed",
        delete_failed: "Delete failed",
        confirm_delete: "Are you sure you want to delete this invoice?",
    };

    fn id(&self) -> &ResourceId {
        &self.id
    }
}

/// Raw text of one line in the invoice form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemForm {
    pub name: String,
    pub price: String,
}

impl LineItemForm {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.price.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceForm {
    pub customer: String,
    lines: Vec<LineItemForm>,
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self {
            customer: String::new(),
            lines: vec![LineItemForm::default()],
        }
    }
}

impl InvoiceForm {
    pub fn lines(&self) -> &[LineItemForm] {
        &self.lines
    }

    /// Append an empty line
    pub fn add_line(&mut self) {
        self.lines.push(LineItemForm::default());
    }

    /// Edit a line; out-of-range indexes are ignored
    pub fn set_line(&mut self, index: usize, name: impl Into<String>, price: impl Into<String>) {
        if let Some(line) = self.lines.get_mut(index) {
            line.name = name.into();
            line.price = price.into();
        }
    }

    /// Remove a line, keeping at least one
    pub fn remove_line(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
        if self.lines.is_empty() {
            self.lines.push(LineItemForm::default());
        }
    }

    /// Replace all lines at once
    pub fn set_lines(&mut self, lines: Vec<LineItemForm>) {
        self.lines = lines;
        if self.lines.is_empty() {
            self.lines.push(LineItemForm::default());
        }
    }
}

impl ResourceForm for InvoiceForm {
    type Resource = Invoice;

    fn validate(&self) -> Result<InvoiceInput, FormError> {
        let mut products = Vec::with_capacity(self.lines.len());

        for (i, line) in self.lines.iter().enumerate() {
            if line.is_blank() {
                continue;
            }
            if line.name.trim().is_empty() {
                return Err(FormError::Required(format!("Product name of line {}", i + 1)));
            }
            let price = parse_price(&format!("Price of line {}", i + 1), &line.price)?;
            products.push(LineItem {
                name: line.name.clone(),
                price,
            });
        }

        if products.is_empty() {
            return Err(FormError::Required("At least one product".to_string()));
        }

        Ok(InvoiceInput {
            customer: self.customer.clone(),
            products,
        })
    }

    fn fill(&mut self, invoice: &Invoice) {
        self.customer = invoice.customer.clone().unwrap_or_default();
        self.set_lines(
            invoice
                .products
                .iter()
                .map(|p| LineItemForm::new(p.name.clone(), p.price.to_string()))
                .collect(),
        );
    }

    fn is_blank(&self) -> bool {
        self.customer.is_empty() && self.lines.iter().all(|l| l.is_blank())
    }
}

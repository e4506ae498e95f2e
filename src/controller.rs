//! Resource Controllers
//!
//! Binds a form and a fetched list to one REST collection. Every action is a
//! single request followed, on success, by a list refresh:
//!
//! - **refresh**: replace the list; on failure keep the stale list
//! - **submit**: create or update from the form; on failure keep the form
//! - **delete**: ask for confirmation first; on failure notify only
//!
//! Outcomes are reported through the controller's [`Notifier`].

use crate::api::ResourceApi;
use crate::notify::{Notification, Notifier};
use crate::resources::{
    InvoiceForm, ProductForm, Resource, ResourceForm, ResourceId, UNEXPECTED_RESPONSE,
};

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a controller action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request succeeded
    Succeeded,
    /// The request was sent and failed
    Failed,
    /// The form did not validate; nothing was sent
    Rejected,
    /// The user declined the confirmation; nothing was sent
    Cancelled,
}

pub type ProductsController<A> = ResourceController<ProductForm, A>;
pub type InvoicesController<A> = ResourceController<InvoiceForm, A>;

/// Form, list and notifications for one collection
pub struct ResourceController<F: ResourceForm, A> {
    api: A,
    items: Vec<F::Resource>,
    form: F,
    editing: Option<ResourceId>,
    notifier: Notifier,
}

impl<F, A> ResourceController<F, A>
where
    F: ResourceForm,
    A: ResourceApi<F::Resource>,
{
    pub fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
            form: F::default(),
            editing: None,
            notifier: Notifier::default(),
        }
    }

    /// Create the controller and load the initial list
    pub async fn mount(api: A) -> Self {
        let mut controller = Self::new(api);
        controller.refresh().await;
        controller
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn items(&self) -> &[F::Resource] {
        &self.items
    }

    pub fn find(&self, id: &ResourceId) -> Option<&F::Resource> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    /// Id of the resource being edited, if any
    pub fn editing(&self) -> Option<&ResourceId> {
        self.editing.as_ref()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Drain pending notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifier.drain()
    }

    /// Re-fetch the list
    pub async fn refresh(&mut self) -> Outcome {
        match self.api.list().await {
            Ok(items) => {
                self.items = items;
                Outcome::Succeeded
            }
            Err(e) => {
                tracing::warn!(
                    collection = <F::Resource as Resource>::COLLECTION,
                    error = %e,
                    "Failed to refresh list"
                );
                let message = if e.is_decode() {
                    UNEXPECTED_RESPONSE
                } else {
                    <F::Resource as Resource>::MESSAGES.load_failed
                };
                self.notifier.error(message);
                Outcome::Failed
            }
        }
    }

    /// Load a listed resource into the form and enter edit mode
    ///
    /// Returns false when the id is not in the current list.
    pub fn edit(&mut self, id: &ResourceId) -> bool {
        let Some(resource) = self.items.iter().find(|item| item.id() == id) else {
            return false;
        };
        self.form.fill(resource);
        self.editing = Some(id.clone());
        true
    }

    /// Clear the form and leave edit mode
    pub fn cancel_edit(&mut self) {
        self.form = F::default();
        self.editing = None;
    }

    /// Create (or update, in edit mode) from the form
    pub async fn submit(&mut self) -> Outcome {
        let input = match self.form.validate() {
            Ok(input) => input,
            Err(e) => {
                self.notifier.error(e.to_string());
                return Outcome::Rejected;
            }
        };

        let messages = <F::Resource as Resource>::MESSAGES;
        let (result, succeeded, failed) = match &self.editing {
            Some(id) => (
                self.api.update(id, &input).await,
                messages.updated,
                messages.update_failed,
            ),
            None => (
                self.api.create(&input).await,
                messages.created,
                messages.create_failed,
            ),
        };

        match result {
            Ok(()) => {
                self.notifier.success(succeeded);
                self.cancel_edit();
                self.refresh().await;
                Outcome::Succeeded
            }
            Err(e) => {
                tracing::warn!(
                    collection = <F::Resource as Resource>::COLLECTION,
                    error = %e,
                    "Failed to save resource"
                );
                self.notifier.error(failed);
                Outcome::Failed
            }
        }
    }

    /// Delete after confirmation
    pub async fn delete(&mut self, id: &ResourceId, confirm: &dyn Confirm) -> Outcome {
        let messages = <F::Resource as Resource>::MESSAGES;
        if !confirm.confirm(messages.confirm_delete) {
            return Outcome::Cancelled;
        }

        match self.api.delete(id).await {
            Ok(()) => {
                self.notifier.success(messages.deleted);
                if self.editing.as_ref() == Some(id) {
                    self.cancel_edit();
                }
                self.refresh().await;
                Outcome::Succeeded
            }
            Err(e) => {
                tracing::warn!(
                    collection = <F::Resource as Resource>::COLLECTION,
                    id = %id,
                    error = %e,
                    "Failed to delete resource"
                );
                self.notifier.error(messages.delete_failed);
                Outcome::Failed
            }
        }
    }
}

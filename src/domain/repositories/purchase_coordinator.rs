use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::{
    domain::entities::{
        product::Product,
        subscription::{SubscriptionType, SubscriptionVerification},
        transaction::PaymentQueueEvent,
    },
    errors::IapError,
};

/// Owner of all asynchronous purchase and restore operations.
///
/// One coordinator instance exists per process and is the purchase queue's
/// sole observer. Every operation resolves through the returned future at
/// the caller's await point; no completion is ever invoked from a
/// background context.
#[async_trait]
pub trait PurchaseCoordinator: Send + Sync {
    /// Fetches catalog metadata for the given product identifiers.
    /// Duplicates are collapsed into a single query.
    async fn fetch_products(&self, identifiers: Vec<String>) -> Result<Vec<Product>, IapError>;

    /// Submits a payment and resolves when the resulting transaction
    /// reaches a terminal state. A second `buy` for the same product id
    /// while one is in flight replaces the pending request; the earlier
    /// caller observes [`IapError::RequestDropped`].
    async fn buy(&self, product: &Product) -> Result<(), IapError>;

    /// Restores previously completed transactions. Resolves on the queue's
    /// restore-finished notification, or with the queue's error on its
    /// restore-failed notification. An overlapping call replaces the
    /// active restore session.
    async fn restore_transactions(&self) -> Result<(), IapError>;

    /// Loads the local receipt (refreshing it once if absent), validates it
    /// against the production endpoint (falling back to sandbox exactly
    /// once on a sandbox-receipt status), and evaluates the resulting
    /// entitlement document against the requested products.
    async fn validate_subscriptions(
        &self,
        shared_secret: &str,
        subscription_type: SubscriptionType,
        product_ids: BTreeSet<String>,
    ) -> Result<SubscriptionVerification, IapError>;

    /// Entry point for the purchase queue's notification stream.
    ///
    /// # Panics
    ///
    /// Panics if a transaction carries a state outside the documented queue
    /// contract; that signals an interface violation this coordinator
    /// cannot reason about safely.
    async fn handle_queue_event(&self, event: PaymentQueueEvent);
}

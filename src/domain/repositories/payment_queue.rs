use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;

use crate::domain::entities::{
    product::{Product, ProductRequestId},
    transaction::Transaction,
};

/// Platform purchase queue and product catalog, implemented by the embedding
/// app's platform glue.
///
/// The queue is a shared, process-wide resource; the coordinator registers
/// as its sole observer by consuming the
/// [`PaymentQueueEvent`](crate::domain::entities::transaction::PaymentQueueEvent)
/// stream. All methods here are submissions only; their results arrive
/// asynchronously through that stream.
#[async_trait]
pub trait PaymentQueue: Send + Sync {
    /// Issues one catalog query for the given identifiers. The response
    /// must echo `request_id` in its `ProductsResponse` event.
    async fn query_products(&self, request_id: ProductRequestId, identifiers: BTreeSet<String>);

    /// Submits a payment for the product to the purchase queue.
    async fn submit_payment(&self, product: &Product);

    /// Requests restoration of all previously completed transactions.
    async fn restore_completed_transactions(&self);

    /// Finalizes (acknowledges) a transaction with the purchase queue,
    /// removing it from the queue's pending set.
    async fn finalize_transaction(&self, transaction: &Transaction);
}

// The queue is a process-wide singleton; a shared handle is a queue too.
#[async_trait]
impl<T: PaymentQueue + ?Sized> PaymentQueue for Arc<T> {
    async fn query_products(&self, request_id: ProductRequestId, identifiers: BTreeSet<String>) {
        (**self).query_products(request_id, identifiers).await
    }

    async fn submit_payment(&self, product: &Product) {
        (**self).submit_payment(product).await
    }

    async fn restore_completed_transactions(&self) {
        (**self).restore_completed_transactions().await
    }

    async fn finalize_transaction(&self, transaction: &Transaction) {
        (**self).finalize_transaction(transaction).await
    }
}

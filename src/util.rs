use std::{collections::BTreeSet, path::PathBuf};

use tokio::sync::mpsc;

use crate::{
    data::{
        datasources::{
            receipt_loader_datasource::ReceiptLoaderImpl,
            receipt_validation_datasource::ReceiptValidationDatasourceImpl,
        },
        repositories::purchase_coordinator_impl::PurchaseCoordinatorImpl,
    },
    domain::{
        entities::{
            product::Product,
            subscription::{SubscriptionType, SubscriptionVerification},
            transaction::PaymentQueueEvent,
        },
        repositories::{
            payment_queue::PaymentQueue, purchase_coordinator::PurchaseCoordinator,
            receipt_refresher::ReceiptRefresher, subscription_evaluator::SubscriptionEvaluator,
        },
    },
    errors::IapError,
};

/// Public entry point. Construct one per process, wired to the app's
/// platform glue, and hand [`IapClient::run_event_loop`] the purchase
/// queue's notification stream.
pub struct IapClient<R: PurchaseCoordinator> {
    coordinator: R,
}

impl<R: PurchaseCoordinator> IapClient<R> {
    pub async fn fetch_products(&self, identifiers: Vec<String>) -> Result<Vec<Product>, IapError> {
        self.coordinator.fetch_products(identifiers).await
    }

    pub async fn buy(&self, product: &Product) -> Result<(), IapError> {
        self.coordinator.buy(product).await
    }

    pub async fn restore_transactions(&self) -> Result<(), IapError> {
        self.coordinator.restore_transactions().await
    }

    pub async fn validate_subscriptions(
        &self,
        shared_secret: &str,
        subscription_type: SubscriptionType,
        product_ids: BTreeSet<String>,
    ) -> Result<SubscriptionVerification, IapError> {
        self.coordinator
            .validate_subscriptions(shared_secret, subscription_type, product_ids)
            .await
    }

    /// Delivers a single queue notification to the coordinator.
    pub async fn handle_queue_event(&self, event: PaymentQueueEvent) {
        self.coordinator.handle_queue_event(event).await
    }

    /// Consumes the purchase queue's notification stream until the sending
    /// side closes. The coordinator is the stream's sole consumer for the
    /// process lifetime; spawn this once at startup.
    pub async fn run_event_loop(&self, mut events: mpsc::Receiver<PaymentQueueEvent>) {
        while let Some(event) = events.recv().await {
            self.coordinator.handle_queue_event(event).await;
        }
        tracing::debug!("payment queue event stream closed");
    }
}

impl<Q, F, E>
    IapClient<PurchaseCoordinatorImpl<Q, ReceiptLoaderImpl<F>, ReceiptValidationDatasourceImpl, E>>
where
    Q: PaymentQueue,
    F: ReceiptRefresher,
    E: SubscriptionEvaluator,
{
    /// `receipt_path` is the platform-defined location of the locally
    /// cached receipt blob.
    pub fn new(
        payment_queue: Q,
        receipt_refresher: F,
        subscription_evaluator: E,
        receipt_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            coordinator: PurchaseCoordinatorImpl::new(
                payment_queue,
                ReceiptLoaderImpl::new(receipt_path, receipt_refresher),
                ReceiptValidationDatasourceImpl::new(),
                subscription_evaluator,
            ),
        }
    }
}

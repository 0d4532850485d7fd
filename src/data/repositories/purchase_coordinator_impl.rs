use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::{
    data::datasources::{
        receipt_loader_datasource::ReceiptLoaderDatasource,
        receipt_validation_datasource::ReceiptValidationDatasource,
    },
    domain::{
        entities::{
            product::{Product, ProductRequestId},
            receipt::VerifyReceiptEnvironment,
            subscription::{SubscriptionType, SubscriptionVerification},
            transaction::{PaymentQueueEvent, Transaction, TransactionState},
        },
        repositories::{
            payment_queue::PaymentQueue, purchase_coordinator::PurchaseCoordinator,
            subscription_evaluator::SubscriptionEvaluator,
        },
    },
    errors::IapError,
};

/// In-progress restore operation. The accumulated transaction list is kept
/// for the lifetime of the session but is not surfaced to callers beyond
/// success or failure.
struct RestoreSession {
    restored: Vec<Transaction>,
    completion: Option<oneshot::Sender<Result<(), IapError>>>,
}

pub struct PurchaseCoordinatorImpl<
    Q: PaymentQueue,
    L: ReceiptLoaderDatasource,
    V: ReceiptValidationDatasource,
    E: SubscriptionEvaluator,
> {
    payment_queue: Q,
    receipt_loader: L,
    receipt_validator: V,
    subscription_evaluator: E,
    next_request_id: AtomicU64,
    pending_product_requests: Mutex<HashMap<ProductRequestId, oneshot::Sender<Vec<Product>>>>,
    pending_purchases: Mutex<HashMap<String, oneshot::Sender<Result<(), IapError>>>>,
    restore_session: Mutex<RestoreSession>,
}

impl<
        Q: PaymentQueue,
        L: ReceiptLoaderDatasource,
        V: ReceiptValidationDatasource,
        E: SubscriptionEvaluator,
    > PurchaseCoordinatorImpl<Q, L, V, E>
{
    pub fn new(
        payment_queue: Q,
        receipt_loader: L,
        receipt_validator: V,
        subscription_evaluator: E,
    ) -> Self {
        Self {
            payment_queue,
            receipt_loader,
            receipt_validator,
            subscription_evaluator,
            next_request_id: AtomicU64::new(0),
            pending_product_requests: Mutex::new(HashMap::new()),
            pending_purchases: Mutex::new(HashMap::new()),
            restore_session: Mutex::new(RestoreSession {
                restored: Vec::new(),
                completion: None,
            }),
        }
    }

    fn take_pending_purchase(
        &self,
        product_id: &str,
    ) -> Option<oneshot::Sender<Result<(), IapError>>> {
        self.pending_purchases
            .lock()
            .expect("lock poisoned")
            .remove(product_id)
    }

    fn take_restore_completion(&self) -> Option<oneshot::Sender<Result<(), IapError>>> {
        self.restore_session
            .lock()
            .expect("lock poisoned")
            .completion
            .take()
    }

    async fn handle_transaction_update(&self, transaction: Transaction) {
        match transaction.state {
            // Not yet resolved; nothing to do.
            TransactionState::Purchasing => {}

            TransactionState::Deferred => {
                tracing::info!(
                    product_id = %transaction.product_id,
                    "purchase deferred pending external action"
                );
            }

            TransactionState::Purchased => {
                self.payment_queue.finalize_transaction(&transaction).await;
                match self.take_pending_purchase(&transaction.product_id) {
                    Some(sender) => {
                        let _ = sender.send(Ok(()));
                    }
                    // E.g. unfinished transaction from a previous process.
                    None => tracing::debug!(
                        product_id = %transaction.product_id,
                        "purchased transaction had no pending request"
                    ),
                }
            }

            TransactionState::Failed => {
                match &transaction.error {
                    Some(error) => {
                        if let Some(sender) = self.take_pending_purchase(&transaction.product_id) {
                            let _ = sender.send(Err(IapError::Platform(error.clone())));
                        }
                    }
                    None => tracing::warn!(
                        product_id = %transaction.product_id,
                        "failed transaction carried no error"
                    ),
                }
                self.payment_queue.finalize_transaction(&transaction).await;
            }

            TransactionState::Restored => {
                self.restore_session
                    .lock()
                    .expect("lock poisoned")
                    .restored
                    .push(transaction.clone());
                self.payment_queue.finalize_transaction(&transaction).await;
            }

            // The queue is speaking a wider contract than this coordinator
            // understands; halting is safer than mis-handling money.
            TransactionState::Unknown(code) => {
                panic!("payment queue delivered unrecognized transaction state {code}")
            }
        }
    }

    #[cfg(test)]
    fn restored_transaction_count(&self) -> usize {
        self.restore_session
            .lock()
            .expect("lock poisoned")
            .restored
            .len()
    }
}

#[async_trait]
impl<
        Q: PaymentQueue,
        L: ReceiptLoaderDatasource,
        V: ReceiptValidationDatasource,
        E: SubscriptionEvaluator,
    > PurchaseCoordinator for PurchaseCoordinatorImpl<Q, L, V, E>
{
    async fn fetch_products(&self, identifiers: Vec<String>) -> Result<Vec<Product>, IapError> {
        let identifiers: BTreeSet<String> = identifiers.into_iter().collect();
        let request_id = ProductRequestId(self.next_request_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = oneshot::channel();
        self.pending_product_requests
            .lock()
            .expect("lock poisoned")
            .insert(request_id, sender);
        self.payment_queue
            .query_products(request_id, identifiers)
            .await;
        receiver.await.map_err(|_| IapError::RequestDropped)
    }

    async fn buy(&self, product: &Product) -> Result<(), IapError> {
        let (sender, receiver) = oneshot::channel();
        if self
            .pending_purchases
            .lock()
            .expect("lock poisoned")
            .insert(product.id.clone(), sender)
            .is_some()
        {
            tracing::warn!(product_id = %product.id, "replacing in-flight purchase request");
        }
        self.payment_queue.submit_payment(product).await;
        receiver.await.map_err(|_| IapError::RequestDropped)?
    }

    async fn restore_transactions(&self) -> Result<(), IapError> {
        let (sender, receiver) = oneshot::channel();
        {
            let mut session = self.restore_session.lock().expect("lock poisoned");
            if session.completion.is_some() {
                tracing::warn!("replacing in-flight restore session");
            }
            session.restored.clear();
            session.completion = Some(sender);
        }
        self.payment_queue.restore_completed_transactions().await;
        receiver.await.map_err(|_| IapError::RequestDropped)?
    }

    async fn validate_subscriptions(
        &self,
        shared_secret: &str,
        subscription_type: SubscriptionType,
        product_ids: BTreeSet<String>,
    ) -> Result<SubscriptionVerification, IapError> {
        let receipt_data = self.receipt_loader.receipt_data().await?;
        let receipt_info = self
            .receipt_validator
            .validate(
                VerifyReceiptEnvironment::Production,
                &receipt_data,
                Some(shared_secret),
            )
            .await?;
        Ok(self
            .subscription_evaluator
            .evaluate(&receipt_info, subscription_type, &product_ids))
    }

    async fn handle_queue_event(&self, event: PaymentQueueEvent) {
        match event {
            PaymentQueueEvent::ProductsResponse {
                request_id,
                products,
            } => {
                let pending = self
                    .pending_product_requests
                    .lock()
                    .expect("lock poisoned")
                    .remove(&request_id);
                match pending {
                    Some(sender) => {
                        let _ = sender.send(products);
                    }
                    // Stale or duplicate response; dropped by design.
                    None => tracing::debug!(
                        ?request_id,
                        "dropping catalog response with no pending request"
                    ),
                }
            }

            PaymentQueueEvent::TransactionsUpdated(transactions) => {
                for transaction in transactions {
                    self.handle_transaction_update(transaction).await;
                }
            }

            // No-op by design.
            PaymentQueueEvent::TransactionsRemoved(transactions) => {
                tracing::debug!(
                    count = transactions.len(),
                    "ignoring removed-transaction notification"
                );
            }

            PaymentQueueEvent::RestoreFailed(error) => {
                if let Some(sender) = self.take_restore_completion() {
                    let _ = sender.send(Err(IapError::Platform(error)));
                }
            }

            PaymentQueueEvent::RestoreFinished => {
                if let Some(sender) = self.take_restore_completion() {
                    let _ = sender.send(Ok(()));
                }
            }
        }
    }
}

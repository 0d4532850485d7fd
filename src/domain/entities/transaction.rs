use crate::{
    domain::entities::product::{Product, ProductRequestId},
    errors::PlatformError,
};

/// Platform-issued record representing one purchase or restore attempt
/// moving through the payment queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub product_id: String,
    pub state: TransactionState,
    /// Only populated for failed transactions, and not always even then.
    pub error: Option<PlatformError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Purchasing,
    Purchased,
    Failed,
    Restored,
    Deferred,
    /// State code outside the documented queue contract.
    Unknown(i32),
}

impl TransactionState {
    /// Maps the platform's raw state code. Unrecognized codes are preserved
    /// so the coordinator can refuse them loudly instead of guessing.
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => Self::Purchasing,
            1 => Self::Purchased,
            2 => Self::Failed,
            3 => Self::Restored,
            4 => Self::Deferred,
            other => Self::Unknown(other),
        }
    }
}

/// Inbound notification from the platform purchase queue. The embedding
/// app's platform glue translates queue callbacks into this stream; the
/// coordinator is its sole consumer for the process lifetime.
#[derive(Debug, Clone)]
pub enum PaymentQueueEvent {
    /// Catalog response for an earlier `query_products` call.
    ProductsResponse {
        request_id: ProductRequestId,
        products: Vec<Product>,
    },
    /// One batch of transaction state changes, possibly for unrelated
    /// products.
    TransactionsUpdated(Vec<Transaction>),
    /// Transactions removed from the queue. Defined no-op.
    TransactionsRemoved(Vec<Transaction>),
    /// Terminal notification: the restore operation as a whole failed.
    RestoreFailed(PlatformError),
    /// Terminal notification: all restorable transactions were delivered.
    RestoreFinished,
}

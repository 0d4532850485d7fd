use async_trait::async_trait;

use crate::errors::PlatformError;

/// Platform receipt-refresh request, implemented by the embedding app's
/// platform glue. On success the platform has rewritten the local receipt
/// cache in place; the caller must re-read it from disk.
#[async_trait]
pub trait ReceiptRefresher: Send + Sync {
    async fn refresh_receipt(&self) -> Result<(), PlatformError>;
}

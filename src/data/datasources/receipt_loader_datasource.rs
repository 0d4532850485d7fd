use std::path::PathBuf;

use async_trait::async_trait;

use crate::{domain::repositories::receipt_refresher::ReceiptRefresher, errors::IapError};

#[async_trait]
pub trait ReceiptLoaderDatasource: Send + Sync {
    /// Returns the raw bytes of the locally cached receipt. If the cache is
    /// absent (or empty), requests one platform refresh and re-reads;
    /// failing that, returns [`IapError::NoReceiptData`]. Refresh errors
    /// pass through unchanged.
    async fn receipt_data(&self) -> Result<Vec<u8>, IapError>;
}

pub struct ReceiptLoaderImpl<R: ReceiptRefresher> {
    receipt_path: PathBuf,
    receipt_refresher: R,
}

impl<R: ReceiptRefresher> ReceiptLoaderImpl<R> {
    /// `receipt_path` is the platform-defined location of the receipt blob
    /// inside the app bundle.
    pub fn new(receipt_path: impl Into<PathBuf>, receipt_refresher: R) -> Self {
        Self {
            receipt_path: receipt_path.into(),
            receipt_refresher,
        }
    }

    /// Reads the cache, mapping a missing or empty file to `None`. The
    /// platform rewrites the file in place on refresh, so this is always a
    /// fresh read rather than a cached copy.
    async fn read_local(&self) -> Result<Option<Vec<u8>>, IapError> {
        match tokio::fs::read(&self.receipt_path).await {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<R: ReceiptRefresher> ReceiptLoaderDatasource for ReceiptLoaderImpl<R> {
    async fn receipt_data(&self) -> Result<Vec<u8>, IapError> {
        if let Some(bytes) = self.read_local().await? {
            return Ok(bytes);
        }
        tracing::info!(
            path = %self.receipt_path.display(),
            "local receipt absent; requesting platform refresh"
        );
        self.receipt_refresher
            .refresh_receipt()
            .await
            .map_err(IapError::Platform)?;
        self.read_local().await?.ok_or(IapError::NoReceiptData)
    }
}

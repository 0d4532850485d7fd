use serde::Serialize;

/// Request body for the verifyReceipt endpoints:
/// https://developer.apple.com/documentation/appstorereceipts/requestbody
#[derive(Debug, Serialize)]
pub(crate) struct VerifyReceiptRequestModel {
    /// The base64-encoded receipt blob.
    #[serde(rename = "receipt-data")]
    pub(crate) receipt_data: String,
    /// The app's shared secret. Required for receipts containing
    /// auto-renewable subscriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) password: Option<String>,
}

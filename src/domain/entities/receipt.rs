use serde::Deserialize;
use serde_json::Value;

/// The two candidate verification endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyReceiptEnvironment {
    Production,
    Sandbox,
}

/// Decoded entitlement document returned by the verification endpoint.
///
/// The endpoint's response is a loosely structured JSON object; beyond the
/// integer `status` field, its receipt and subscription arrays are consumed
/// by external subscription-evaluation logic, so the document is kept as-is
/// with typed accessors for the fields this crate interprets.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ReceiptInfo {
    fields: serde_json::Map<String, Value>,
}

impl ReceiptInfo {
    pub fn status(&self) -> ReceiptStatus {
        ReceiptStatus::from_code(self.fields.get("status").and_then(Value::as_i64))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `receipt` object, present for both receipt styles.
    pub fn receipt(&self) -> Option<&serde_json::Map<String, Value>> {
        self.fields.get("receipt").and_then(Value::as_object)
    }

    /// The `latest_receipt_info` array carrying subscription transactions.
    pub fn latest_receipt_info(&self) -> Option<&Vec<Value>> {
        self.fields.get("latest_receipt_info").and_then(Value::as_array)
    }

    /// The `pending_renewal_info` array for auto-renewable subscriptions.
    pub fn pending_renewal_info(&self) -> Option<&Vec<Value>> {
        self.fields.get("pending_renewal_info").and_then(Value::as_array)
    }
}

/// Status codes documented for the verifyReceipt contract. Codes outside the
/// documented set collapse to [`ReceiptStatus::Unknown`]; a response without
/// an integer `status` field maps to [`ReceiptStatus::Missing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// 0. The only approving status.
    Valid,
    /// 21000. The request body was not readable as JSON.
    JsonNotReadable,
    /// 21002. The receipt-data property was malformed or missing.
    MalformedReceiptData,
    /// 21003. The receipt could not be authenticated.
    AuthenticationFailed,
    /// 21004. The shared secret does not match the account's secret.
    SharedSecretMismatch,
    /// 21005. The receipt server is temporarily unavailable.
    ReceiptServerUnavailable,
    /// 21006. Receipt valid but the subscription has expired.
    SubscriptionExpired,
    /// 21007. Sandbox receipt sent to the production environment; the
    /// single fallback to the sandbox endpoint is keyed off this code.
    SandboxReceiptOnProduction,
    /// 21008. Production receipt sent to the sandbox environment.
    ProductionReceiptOnSandbox,
    /// 21010. The account cannot be found or has been deleted.
    AccountNotFound,
    Unknown(i64),
    /// The response carried no integer `status` field.
    Missing,
}

impl ReceiptStatus {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            None => Self::Missing,
            Some(0) => Self::Valid,
            Some(21000) => Self::JsonNotReadable,
            Some(21002) => Self::MalformedReceiptData,
            Some(21003) => Self::AuthenticationFailed,
            Some(21004) => Self::SharedSecretMismatch,
            Some(21005) => Self::ReceiptServerUnavailable,
            Some(21006) => Self::SubscriptionExpired,
            Some(21007) => Self::SandboxReceiptOnProduction,
            Some(21008) => Self::ProductionReceiptOnSandbox,
            Some(21010) => Self::AccountNotFound,
            Some(other) => Self::Unknown(other),
        }
    }

    pub fn is_valid(&self) -> bool {
        *self == Self::Valid
    }
}

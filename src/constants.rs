/// verifyReceipt endpoint for receipts issued by the production App Store.
pub(crate) const PRODUCTION_VERIFY_RECEIPT_URL: &str = "https://buy.itunes.apple.com/verifyReceipt";

/// verifyReceipt endpoint for receipts issued in the sandbox environment.
pub(crate) const SANDBOX_VERIFY_RECEIPT_URL: &str =
    "https://sandbox.itunes.apple.com/verifyReceipt";

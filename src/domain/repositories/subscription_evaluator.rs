use std::collections::BTreeSet;

use crate::domain::entities::{
    receipt::ReceiptInfo,
    subscription::{SubscriptionType, SubscriptionVerification},
};

/// Evaluates a verified entitlement document against a set of subscription
/// products. The evaluation rules (matching transactions, picking the
/// latest expiry) are owned by the embedding app, not by this crate.
pub trait SubscriptionEvaluator: Send + Sync {
    fn evaluate(
        &self,
        receipt: &ReceiptInfo,
        subscription_type: SubscriptionType,
        product_ids: &BTreeSet<String>,
    ) -> SubscriptionVerification;
}

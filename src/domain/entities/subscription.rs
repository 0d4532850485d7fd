use std::time::Duration;

use chrono::{DateTime, Utc};

/// Subscription model requested by the caller of a subscription validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionType {
    AutoRenewable,
    /// Non-renewing subscriptions carry no expiry in the receipt; the
    /// caller supplies how long one purchase remains valid.
    NonRenewing { valid_duration: Duration },
}

/// Entitlement summary produced by external subscription evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubscriptionVerification {
    Active { expiry: DateTime<Utc> },
    Expired { expiry: DateTime<Utc> },
    NotPurchased,
}

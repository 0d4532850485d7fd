/// Catalog entry returned by the platform store, identified by its unique
/// product identifier. Read-only; the catalog owns its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub localized_title: String,
    pub localized_description: String,
    pub price_micros: i64,
    /// Already in ISO 4217 format.
    pub currency_iso_4217: String,
}

/// Opaque correlation id tying a catalog query to its eventual response.
///
/// Generated by the coordinator when the query is issued, threaded through
/// [`PaymentQueue::query_products`] and echoed back unchanged in the
/// corresponding `ProductsResponse` event.
///
/// [`PaymentQueue::query_products`]: crate::domain::repositories::payment_queue::PaymentQueue::query_products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductRequestId(pub(crate) u64);

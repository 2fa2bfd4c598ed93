use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::checkout::{CheckoutIntent, CheckoutSession, VariantDetail};
use super::errors::DomainError;
use super::payment::{FulfillmentRequest, PaymentRecord};
use super::sale::{Materialized, SaleView};

pub trait CatalogRepository: Send + Sync + 'static {
    /// Variants matching `ids`; unknown ids are simply absent.
    fn find_variants(&self, ids: &[i32]) -> Result<Vec<VariantDetail>, DomainError>;
}

pub trait SaleRepository: Send + Sync + 'static {
    /// Records the sale for an approved payment and retires the buyer's cart
    /// in one transaction. Returns `Existing` when the payment was already
    /// fulfilled.
    fn materialize(&self, request: &FulfillmentRequest) -> Result<Materialized, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError>;
    fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<SaleView>, DomainError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_preference(&self, intent: &CheckoutIntent)
        -> Result<CheckoutSession, DomainError>;

    /// The provider's raw payment record.
    async fn fetch_payment_json(&self, payment_id: &str) -> Result<Value, DomainError>;

    /// Authoritative payment state, fetched fresh on every call.
    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentRecord, DomainError> {
        let raw = self.fetch_payment_json(payment_id).await?;
        PaymentRecord::from_json(&raw)
    }
}

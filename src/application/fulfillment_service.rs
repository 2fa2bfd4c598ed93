use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::run_blocking;
use crate::domain::errors::DomainError;
use crate::domain::payment::PaymentStatus;
use crate::domain::ports::{PaymentGateway, SaleRepository};
use crate::domain::sale::{Materialized, SaleView};
use crate::domain::webhook::{classify, WebhookEvent};

/// Every way a notification can be handled without failing.
#[derive(Debug, Clone)]
pub enum FulfillmentOutcome {
    /// Not a payment event.
    Ignored { event_type: Option<String> },
    /// The payment exists but is not approved (yet).
    Pending {
        payment_id: String,
        status: PaymentStatus,
    },
    Fulfilled {
        payment_id: String,
        status: PaymentStatus,
        sale: SaleView,
    },
    /// A redelivery for a payment that already produced a sale.
    AlreadyFulfilled {
        payment_id: String,
        status: PaymentStatus,
        sale: SaleView,
    },
}

pub struct FulfillmentService {
    sales: Arc<dyn SaleRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl FulfillmentService {
    pub fn new(sales: Arc<dyn SaleRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { sales, gateway }
    }

    /// Classifies a provider notification and, for payment events, verifies
    /// and materializes the payment.
    ///
    /// Errors mean the provider should redeliver later; there is no internal
    /// retry.
    pub async fn handle_notification(
        &self,
        payload: &Value,
    ) -> Result<FulfillmentOutcome, DomainError> {
        let payment_id = match classify(payload)? {
            WebhookEvent::Payment { payment_id } => payment_id,
            WebhookEvent::NotActionable { event_type } => {
                log::info!(
                    "Ignoring webhook event of type {}",
                    event_type.as_deref().unwrap_or("<none>")
                );
                return Ok(FulfillmentOutcome::Ignored { event_type });
            }
        };

        log::info!("Received payment notification for payment {payment_id}");
        self.process_payment(&payment_id).await.inspect_err(|e| {
            log::error!("Payment {payment_id} could not be fulfilled: {e}");
        })
    }

    pub async fn process_payment(
        &self,
        payment_id: &str,
    ) -> Result<FulfillmentOutcome, DomainError> {
        let payment = self
            .gateway
            .fetch_payment(payment_id)
            .await
            .map_err(|e| e.for_payment(payment_id))?;

        if !payment.is_approved() {
            log::info!(
                "Payment {} is {}, nothing to fulfill yet",
                payment.id,
                payment.status
            );
            return Ok(FulfillmentOutcome::Pending {
                payment_id: payment.id,
                status: payment.status,
            });
        }

        let request = payment
            .fulfillment_request()
            .map_err(|e| e.for_payment(&payment.id))?;

        let sales = Arc::clone(&self.sales);
        let materialized = run_blocking(move || sales.materialize(&request))
            .await
            .map_err(|e| e.for_payment(&payment.id))?;

        Ok(match materialized {
            Materialized::Created(sale) => {
                log::info!(
                    "Payment {} fulfilled as sale {} (total {})",
                    payment.id,
                    sale.id,
                    sale.total_amount
                );
                FulfillmentOutcome::Fulfilled {
                    payment_id: payment.id,
                    status: payment.status,
                    sale,
                }
            }
            Materialized::Existing(sale) => {
                log::info!(
                    "Payment {} was already fulfilled as sale {}",
                    payment.id,
                    sale.id
                );
                FulfillmentOutcome::AlreadyFulfilled {
                    payment_id: payment.id,
                    status: payment.status,
                    sale,
                }
            }
        })
    }

    pub async fn payment_json(&self, payment_id: &str) -> Result<Value, DomainError> {
        self.gateway.fetch_payment_json(payment_id).await
    }

    pub async fn find_sale(&self, id: Uuid) -> Result<SaleView, DomainError> {
        let sales = Arc::clone(&self.sales);
        run_blocking(move || sales.find_by_id(id))
            .await?
            .ok_or(DomainError::NotFound)
    }
}

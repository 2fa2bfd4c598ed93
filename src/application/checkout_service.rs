use std::sync::Arc;

use chrono::Utc;

use super::run_blocking;
use crate::domain::checkout::{build_checkout_intent, CheckoutCommand, CheckoutSession, CheckoutSettings};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CatalogRepository, PaymentGateway};

pub struct CheckoutService {
    catalog: Arc<dyn CatalogRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

impl CheckoutService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            catalog,
            gateway,
            settings,
        }
    }

    /// Prices the cart server-side and registers the intent with the
    /// provider. Nothing is persisted locally.
    pub async fn create_intent(
        &self,
        command: CheckoutCommand,
    ) -> Result<CheckoutSession, DomainError> {
        let catalog = Arc::clone(&self.catalog);
        let ids = command.variant_ids();
        let variants = run_blocking(move || catalog.find_variants(&ids)).await?;

        let intent = build_checkout_intent(&command, &variants, &self.settings, Utc::now())?;
        if intent.total() != command.declared_total {
            log::warn!(
                "Checkout total mismatch for user {}: client declared {}, catalog gives {}",
                command.buyer.id,
                command.declared_total,
                intent.total()
            );
        }

        let session = self.gateway.create_preference(&intent).await?;
        log::info!(
            "Created checkout preference {} ({}) for user {}",
            session.preference_id,
            session.external_reference,
            command.buyer.id
        );
        Ok(session)
    }
}

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use super::errors::DomainError;
use super::shipping::shipping_cost;

pub const INTENT_TTL_HOURS: i64 = 24;
pub const MAX_INSTALLMENTS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buyer {
    pub id: i32,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingDetails {
    pub references: Option<String>,
    pub between_street_one: Option<String>,
    pub between_street_two: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product_id: i32,
    pub variant_id: i32,
    pub quantity: i32,
}

/// A validated checkout request. Client prices have already been discarded.
#[derive(Debug, Clone)]
pub struct CheckoutCommand {
    pub lines: Vec<CheckoutLine>,
    pub declared_total: BigDecimal,
    pub buyer: Buyer,
    pub shipping: ShippingDetails,
}

impl CheckoutCommand {
    pub fn variant_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.lines.iter().map(|l| l.variant_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

/// Catalog view of a sellable variant.
#[derive(Debug, Clone)]
pub struct VariantDetail {
    pub variant_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: BigDecimal,
}

impl VariantDetail {
    pub fn description(&self) -> String {
        match (self.color.as_deref(), self.size.as_deref()) {
            (Some(color), Some(size)) => format!("{} - {color} / {size}", self.product_name),
            (Some(attr), None) | (None, Some(attr)) => format!("{} - {attr}", self.product_name),
            (None, None) => self.product_name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub frontend_url: String,
    pub backend_url: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub currency_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// What gets submitted to the payment provider. Never modified after
/// submission.
#[derive(Debug, Clone)]
pub struct CheckoutIntent {
    pub items: Vec<IntentItem>,
    pub payer: Buyer,
    pub shipping_cost: BigDecimal,
    pub external_reference: String,
    pub back_urls: BackUrls,
    pub notification_url: String,
    pub expires_from: DateTime<Utc>,
    pub expires_to: DateTime<Utc>,
    pub max_installments: u32,
    pub metadata: Value,
}

impl CheckoutIntent {
    pub fn subtotal(&self) -> BigDecimal {
        self.items
            .iter()
            .map(|i| &i.unit_price * BigDecimal::from(i.quantity))
            .sum()
    }

    pub fn total(&self) -> BigDecimal {
        self.subtotal() + &self.shipping_cost
    }
}

/// Provider-side handles for a created intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub preference_id: String,
    pub init_point: String,
    pub sandbox_init_point: Option<String>,
    pub external_reference: String,
}

pub fn external_reference(user_id: i32, now: DateTime<Utc>) -> String {
    format!("order_{}_{}", user_id, now.timestamp_millis())
}

/// Prices every line from the catalog and assembles the provider intent.
///
/// The metadata carries the user id, the shipping free text and a snapshot of
/// the cart with the catalog unit price used here, so fulfillment charges
/// exactly what the buyer was shown.
pub fn build_checkout_intent(
    command: &CheckoutCommand,
    variants: &[VariantDetail],
    settings: &CheckoutSettings,
    now: DateTime<Utc>,
) -> Result<CheckoutIntent, DomainError> {
    if command.lines.is_empty() {
        return Err(DomainError::InvalidInput("cart must not be empty".to_string()));
    }

    let catalog: HashMap<i32, &VariantDetail> =
        variants.iter().map(|v| (v.variant_id, v)).collect();

    let mut items = Vec::with_capacity(command.lines.len());
    let mut snapshot = Vec::with_capacity(command.lines.len());
    for line in &command.lines {
        let variant = catalog
            .get(&line.variant_id)
            .ok_or(DomainError::VariantNotFound(line.variant_id))?;
        if variant.product_id != line.product_id {
            return Err(DomainError::InvalidInput(format!(
                "variant {} does not belong to product {}",
                line.variant_id, line.product_id
            )));
        }

        items.push(IntentItem {
            id: variant.variant_id.to_string(),
            title: variant.product_name.clone(),
            description: variant.description(),
            quantity: line.quantity,
            unit_price: variant.price.clone(),
            currency_id: settings.currency.clone(),
        });
        snapshot.push(json!({
            "product_id": variant.product_id,
            "variant_id": variant.variant_id,
            "quantity": line.quantity,
            "unit_price": variant.price.to_string(),
        }));
    }

    let frontend = settings.frontend_url.trim_end_matches('/');
    let backend = settings.backend_url.trim_end_matches('/');

    Ok(CheckoutIntent {
        items,
        payer: command.buyer.clone(),
        shipping_cost: shipping_cost(command.total_quantity()),
        external_reference: external_reference(command.buyer.id, now),
        back_urls: BackUrls {
            success: format!("{frontend}/checkout/success"),
            failure: format!("{frontend}/checkout/failure"),
            pending: format!("{frontend}/checkout/pending"),
        },
        notification_url: format!("{backend}/webhooks/payments"),
        expires_from: now,
        expires_to: now + Duration::hours(INTENT_TTL_HOURS),
        max_installments: MAX_INSTALLMENTS,
        metadata: json!({
            "user_id": command.buyer.id,
            "references": command.shipping.references,
            "between_street_one": command.shipping.between_street_one,
            "between_street_two": command.shipping.between_street_two,
            "cart_items": snapshot,
        }),
    })
}

use std::collections::HashSet;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::payment::FulfillmentRequest;
use super::shipping::shipping_cost;

/// A live cart line joined with its variant and product.
#[derive(Debug, Clone)]
pub struct CartLineDetail {
    pub cart_item_id: i32,
    pub variant_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub quantity: i32,
    /// Current catalog price of the variant.
    pub unit_price: BigDecimal,
}

/// State loaded from storage inside the materialization transaction.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentContext {
    pub cart_id: Option<i32>,
    pub cart: Vec<CartLineDetail>,
    /// Which variants from the frozen snapshot still exist in the catalog.
    pub known_variant_ids: HashSet<i32>,
    pub default_address_id: Option<i32>,
    pub employee_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleLineDraft {
    pub product_variant_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub payment_id: String,
    pub user_id: i32,
    pub cart_id: i32,
    pub address_id: i32,
    pub employee_id: i32,
    pub external_reference: Option<String>,
    pub lines: Vec<SaleLineDraft>,
    pub subtotal_amount: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub total_amount: BigDecimal,
}

impl SaleDraft {
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleLineView {
    pub id: Uuid,
    pub product_variant_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleView {
    pub id: Uuid,
    pub user_id: i32,
    pub address_id: i32,
    pub employee_id: i32,
    pub subtotal_amount: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub total_amount: BigDecimal,
    pub external_reference: Option<String>,
    pub payment_id: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<SaleLineView>,
}

/// Result of a materialization attempt that did not fail.
#[derive(Debug, Clone)]
pub enum Materialized {
    Created(SaleView),
    /// A sale for this payment was already on record; nothing was written.
    Existing(SaleView),
}

/// Turns an approved payment plus the loaded storage state into the rows to
/// insert. Every missing piece is a data-integrity error because the buyer
/// has already paid.
pub fn assemble_sale(
    request: &FulfillmentRequest,
    context: &FulfillmentContext,
) -> Result<SaleDraft, DomainError> {
    let cart_id = match context.cart_id {
        Some(id) if !context.cart.is_empty() => id,
        _ => {
            return Err(DomainError::DataIntegrity(format!(
                "user {} has no cart items to fulfill",
                request.user_id
            )))
        }
    };
    let address_id = context.default_address_id.ok_or_else(|| {
        DomainError::DataIntegrity(format!(
            "user {} has no default shipping address",
            request.user_id
        ))
    })?;
    let employee_id = context.employee_id.ok_or_else(|| {
        DomainError::DataIntegrity("no active employee available for fulfillment".to_string())
    })?;

    let lines = if request.frozen_lines.is_empty() {
        context
            .cart
            .iter()
            .map(|l| line(l.variant_id, l.quantity, &l.unit_price))
            .collect::<Vec<_>>()
    } else {
        request
            .frozen_lines
            .iter()
            .map(|l| {
                if context.known_variant_ids.contains(&l.variant_id) {
                    Ok(line(l.variant_id, l.quantity, &l.unit_price))
                } else {
                    Err(DomainError::DataIntegrity(format!(
                        "product variant {} from the checkout snapshot no longer exists",
                        l.variant_id
                    )))
                }
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let subtotal_amount: BigDecimal = lines.iter().map(|l| &l.total_price).sum();
    let total_quantity: i64 = lines.iter().map(|l| i64::from(l.quantity)).sum();
    let shipping_cost = shipping_cost(total_quantity);
    let total_amount = &subtotal_amount + &shipping_cost;

    Ok(SaleDraft {
        payment_id: request.payment_id.clone(),
        user_id: request.user_id,
        cart_id,
        address_id,
        employee_id,
        external_reference: request.external_reference.clone(),
        lines,
        subtotal_amount,
        shipping_cost,
        total_amount,
    })
}

fn line(variant_id: i32, quantity: i32, unit_price: &BigDecimal) -> SaleLineDraft {
    SaleLineDraft {
        product_variant_id: variant_id,
        quantity,
        unit_price: unit_price.clone(),
        total_price: unit_price * BigDecimal::from(quantity),
    }
}

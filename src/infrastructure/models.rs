use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::checkout::VariantDetail;
use crate::domain::sale::{CartLineDetail, SaleLineView, SaleView};
use crate::schema::{commerce_sale_outbox, sale_lines, sales};

/// `product_variants` joined with `products`.
#[derive(Debug, Clone, Queryable)]
pub struct VariantDetailRow {
    pub variant_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: BigDecimal,
}

impl From<VariantDetailRow> for VariantDetail {
    fn from(r: VariantDetailRow) -> Self {
        VariantDetail {
            variant_id: r.variant_id,
            product_id: r.product_id,
            product_name: r.product_name,
            color: r.color,
            size: r.size,
            price: r.price,
        }
    }
}

/// `cart_items` joined with the variant and its product.
#[derive(Debug, Clone, Queryable)]
pub struct CartLineRow {
    pub cart_item_id: i32,
    pub variant_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl From<CartLineRow> for CartLineDetail {
    fn from(r: CartLineRow) -> Self {
        CartLineDetail {
            cart_item_id: r.cart_item_id,
            variant_id: r.variant_id,
            product_id: r.product_id,
            product_name: r.product_name,
            color: r.color,
            size: r.size,
            quantity: r.quantity,
            unit_price: r.unit_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sales)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaleRow {
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
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sales)]
pub struct NewSaleRow {
    pub id: Uuid,
    pub user_id: i32,
    pub address_id: i32,
    pub employee_id: i32,
    pub subtotal_amount: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub total_amount: BigDecimal,
    pub external_reference: Option<String>,
    pub payment_id: String,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = sale_lines)]
#[diesel(belongs_to(SaleRow, foreign_key = sale_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaleLineRow {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_variant_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sale_lines)]
pub struct NewSaleLineRow {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_variant_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

impl SaleRow {
    pub fn into_view(self, lines: Vec<SaleLineRow>) -> SaleView {
        SaleView {
            id: self.id,
            user_id: self.user_id,
            address_id: self.address_id,
            employee_id: self.employee_id,
            subtotal_amount: self.subtotal_amount,
            shipping_cost: self.shipping_cost,
            total_amount: self.total_amount,
            external_reference: self.external_reference,
            payment_id: self.payment_id,
            created_at: self.created_at,
            lines: lines
                .into_iter()
                .map(|l| SaleLineView {
                    id: l.id,
                    product_variant_id: l.product_variant_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    total_price: l.total_price,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = commerce_sale_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = commerce_sale_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

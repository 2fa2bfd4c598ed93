use std::collections::HashSet;

use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::payment::FulfillmentRequest;
use crate::domain::ports::SaleRepository;
use crate::domain::sale::{assemble_sale, FulfillmentContext, Materialized, SaleDraft, SaleView};
use crate::schema::{
    addresses, cart_items, carts, commerce_sale_outbox, employees, product_variants, products,
    sale_lines, sales,
};

use super::models::{CartLineRow, NewOutboxEventRow, NewSaleLineRow, NewSaleRow, SaleLineRow, SaleRow};

pub struct DieselSaleRepository {
    pool: DbPool,
}

impl DieselSaleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SaleRepository for DieselSaleRepository {
    fn materialize(&self, request: &FulfillmentRequest) -> Result<Materialized, DomainError> {
        let mut conn = self.pool.get()?;

        let result = conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the buyer's cart so concurrent deliveries for the same
            //    user queue up behind each other.
            let cart_id: Option<i32> = carts::table
                .filter(carts::user_id.eq(request.user_id))
                .select(carts::id)
                .for_update()
                .load::<i32>(conn)?
                .into_iter()
                .next();

            // 2. A redelivered payment must not produce a second sale.
            if let Some(existing) = load_sale_by_payment_id(conn, &request.payment_id)? {
                return Ok(Materialized::Existing(existing));
            }

            // 3. Load everything the sale depends on and price it.
            let context = load_context(conn, request, cart_id)?;
            let draft = assemble_sale(request, &context)?;

            // 4. Sale header, lines, cart teardown and outbox event commit together.
            let sale = insert_sale(conn, &draft)?;
            diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(draft.cart_id)))
                .execute(conn)?;
            insert_sale_created_event(conn, &sale)?;

            Ok(Materialized::Created(sale))
        });

        match result {
            // Lost the race against a concurrent delivery that committed first.
            Err(DomainError::AlreadyExists(_)) => load_sale_by_payment_id(&mut conn, &request.payment_id)?
                .map(Materialized::Existing)
                .ok_or_else(|| {
                    DomainError::Internal(format!(
                        "sale for payment {} conflicted but cannot be found",
                        request.payment_id
                    ))
                }),
            other => other,
        }
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        let mut conn = self.pool.get()?;

        let sale = sales::table
            .filter(sales::id.eq(id))
            .select(SaleRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let lines = load_lines(&mut conn, sale.id)?;
        Ok(Some(sale.into_view(lines)))
    }

    fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<SaleView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_sale_by_payment_id(&mut conn, payment_id)
    }
}

fn load_sale_by_payment_id(
    conn: &mut PgConnection,
    payment_id: &str,
) -> Result<Option<SaleView>, DomainError> {
    let sale = sales::table
        .filter(sales::payment_id.eq(payment_id))
        .select(SaleRow::as_select())
        .first(conn)
        .optional()?;

    match sale {
        Some(sale) => {
            let lines = load_lines(conn, sale.id)?;
            Ok(Some(sale.into_view(lines)))
        }
        None => Ok(None),
    }
}

fn load_lines(conn: &mut PgConnection, sale_id: Uuid) -> Result<Vec<SaleLineRow>, DomainError> {
    Ok(sale_lines::table
        .filter(sale_lines::sale_id.eq(sale_id))
        .select(SaleLineRow::as_select())
        .order(sale_lines::product_variant_id.asc())
        .load(conn)?)
}

fn load_context(
    conn: &mut PgConnection,
    request: &FulfillmentRequest,
    cart_id: Option<i32>,
) -> Result<FulfillmentContext, DomainError> {
    let cart = match cart_id {
        Some(cart_id) => cart_items::table
            .inner_join(product_variants::table.inner_join(products::table))
            .filter(cart_items::cart_id.eq(cart_id))
            .order(cart_items::id.asc())
            .select((
                cart_items::id,
                cart_items::product_variant_id,
                product_variants::product_id,
                products::name,
                product_variants::color,
                product_variants::size,
                cart_items::quantity,
                product_variants::price,
            ))
            .load::<CartLineRow>(conn)?
            .into_iter()
            .map(Into::into)
            .collect(),
        None => Vec::new(),
    };

    let frozen_ids: Vec<i32> = request.frozen_lines.iter().map(|l| l.variant_id).collect();
    let known_variant_ids: HashSet<i32> = if frozen_ids.is_empty() {
        HashSet::new()
    } else {
        product_variants::table
            .filter(product_variants::id.eq_any(frozen_ids))
            .select(product_variants::id)
            .load::<i32>(conn)?
            .into_iter()
            .collect()
    };

    let default_address_id = addresses::table
        .filter(addresses::user_id.eq(request.user_id))
        .filter(addresses::is_default.eq(true))
        .order(addresses::id.asc())
        .select(addresses::id)
        .first::<i32>(conn)
        .optional()?;

    let employee_id = employees::table
        .filter(employees::active.eq(true))
        .order(employees::id.asc())
        .select(employees::id)
        .first::<i32>(conn)
        .optional()?;

    Ok(FulfillmentContext {
        cart_id,
        cart,
        known_variant_ids,
        default_address_id,
        employee_id,
    })
}

fn insert_sale(conn: &mut PgConnection, draft: &SaleDraft) -> Result<SaleView, DomainError> {
    let sale_id = Uuid::new_v4();
    let sale = diesel::insert_into(sales::table)
        .values(&NewSaleRow {
            id: sale_id,
            user_id: draft.user_id,
            address_id: draft.address_id,
            employee_id: draft.employee_id,
            subtotal_amount: draft.subtotal_amount.clone(),
            shipping_cost: draft.shipping_cost.clone(),
            total_amount: draft.total_amount.clone(),
            external_reference: draft.external_reference.clone(),
            payment_id: draft.payment_id.clone(),
        })
        .returning(SaleRow::as_returning())
        .get_result(conn)?;

    let new_lines: Vec<NewSaleLineRow> = draft
        .lines
        .iter()
        .map(|l| NewSaleLineRow {
            id: Uuid::new_v4(),
            sale_id,
            product_variant_id: l.product_variant_id,
            quantity: l.quantity,
            unit_price: l.unit_price.clone(),
            total_price: l.total_price.clone(),
        })
        .collect();
    let lines = diesel::insert_into(sale_lines::table)
        .values(&new_lines)
        .returning(SaleLineRow::as_returning())
        .get_results(conn)?;

    Ok(sale.into_view(lines))
}

/// Downstream consumers (shipping, notifications) learn about the sale via
/// CDC on the outbox table.
fn insert_sale_created_event(conn: &mut PgConnection, sale: &SaleView) -> Result<(), DomainError> {
    let line_payloads: Vec<serde_json::Value> = sale
        .lines
        .iter()
        .map(|l| {
            json!({
                "product_variant_id": l.product_variant_id,
                "quantity": l.quantity,
                "unit_price": l.unit_price.to_string(),
                "total_price": l.total_price.to_string(),
            })
        })
        .collect();

    let payload = json!({
        "sale_id": sale.id,
        "payment_id": sale.payment_id,
        "user_id": sale.user_id,
        "address_id": sale.address_id,
        "employee_id": sale.employee_id,
        "subtotal_amount": sale.subtotal_amount.to_string(),
        "shipping_cost": sale.shipping_cost.to_string(),
        "total_amount": sale.total_amount.to_string(),
        "lines": line_payloads,
    });

    diesel::insert_into(commerce_sale_outbox::table)
        .values(&NewOutboxEventRow {
            id: Uuid::new_v4(),
            aggregate_type: "Sale".to_string(),
            aggregate_id: sale.id.to_string(),
            event_type: "SaleCreated".to_string(),
            payload,
        })
        .execute(conn)?;
    Ok(())
}

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::fulfillment_service::FulfillmentService;
use crate::domain::sale::SaleView;
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineResponse {
    pub id: Uuid,
    pub product_variant_id: i32,
    pub quantity: i32,
    pub unit_price: String,
    pub total_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: Uuid,
    pub user_id: i32,
    pub address_id: i32,
    pub employee_id: i32,
    pub payment_id: String,
    pub external_reference: Option<String>,
    pub subtotal_amount: String,
    pub shipping_cost: String,
    pub total_amount: String,
    pub created_at: String,
    pub lines: Vec<SaleLineResponse>,
}

impl From<SaleView> for SaleResponse {
    fn from(sale: SaleView) -> Self {
        SaleResponse {
            id: sale.id,
            user_id: sale.user_id,
            address_id: sale.address_id,
            employee_id: sale.employee_id,
            payment_id: sale.payment_id,
            external_reference: sale.external_reference,
            subtotal_amount: sale.subtotal_amount.to_string(),
            shipping_cost: sale.shipping_cost.to_string(),
            total_amount: sale.total_amount.to_string(),
            created_at: sale.created_at.to_rfc3339(),
            lines: sale
                .lines
                .into_iter()
                .map(|l| SaleLineResponse {
                    id: l.id,
                    product_variant_id: l.product_variant_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                    total_price: l.total_price.to_string(),
                })
                .collect(),
        }
    }
}

/// GET /sales/{id}
///
/// Returns a recorded sale together with its lines.
#[utoipa::path(
    get,
    path = "/sales/{id}",
    params(
        ("id" = Uuid, Path, description = "Sale UUID"),
    ),
    responses(
        (status = 200, description = "Sale found", body = SaleResponse),
        (status = 404, description = "Sale not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sales"
)]
pub async fn get_sale(
    service: web::Data<FulfillmentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let sale = service.find_sale(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SaleResponse::from(sale)))
}

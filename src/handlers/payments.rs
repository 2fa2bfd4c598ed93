use actix_web::{web, HttpResponse};

use crate::application::fulfillment_service::FulfillmentService;
use crate::errors::AppError;

/// GET /payments/{id}
///
/// Returns the provider's raw payment record.
#[utoipa::path(
    get,
    path = "/payments/{id}",
    params(
        ("id" = String, Path, description = "Provider payment id"),
    ),
    responses(
        (status = 200, description = "Payment found", body = Object),
        (status = 404, description = "Payment not found"),
        (status = 500, description = "Payment provider error"),
    ),
    tag = "payments"
)]
pub async fn get_payment(
    service: web::Data<FulfillmentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payment_id = path.into_inner();

    let payment = service.payment_json(&payment_id).await?;

    Ok(HttpResponse::Ok().json(payment))
}

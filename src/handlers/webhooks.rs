use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::fulfillment_service::{FulfillmentOutcome, FulfillmentService};
use crate::errors::AppError;

/// Query-string form of a notification (`?type=payment&data.id=1` or
/// `?topic=payment&id=1`).
#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub topic: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "data.id")]
    pub data_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// `ignored`, `pending`, `fulfilled` or `already_fulfilled`.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Payment status as reported by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<String>,
    pub processed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

impl From<FulfillmentOutcome> for WebhookResponse {
    fn from(outcome: FulfillmentOutcome) -> Self {
        let empty = WebhookResponse {
            outcome: "ignored",
            payment_id: None,
            status: None,
            sale_id: None,
            total_amount: None,
            processed: false,
            duplicate: false,
        };
        match outcome {
            FulfillmentOutcome::Ignored { .. } => empty,
            FulfillmentOutcome::Pending { payment_id, status } => WebhookResponse {
                outcome: "pending",
                payment_id: Some(payment_id),
                status: Some(status.to_string()),
                ..empty
            },
            FulfillmentOutcome::Fulfilled {
                payment_id,
                status,
                sale,
            } => WebhookResponse {
                outcome: "fulfilled",
                payment_id: Some(payment_id),
                status: Some(status.to_string()),
                sale_id: Some(sale.id),
                total_amount: Some(sale.total_amount.to_string()),
                processed: true,
                duplicate: false,
            },
            FulfillmentOutcome::AlreadyFulfilled {
                payment_id,
                status,
                sale,
            } => WebhookResponse {
                outcome: "already_fulfilled",
                payment_id: Some(payment_id),
                status: Some(status.to_string()),
                sale_id: Some(sale.id),
                total_amount: Some(sale.total_amount.to_string()),
                processed: true,
                duplicate: true,
            },
        }
    }
}

/// Parses the body and fills in whatever the query string carries that the
/// body does not.
fn notification_payload(body: &[u8], query: WebhookQuery) -> Result<Value, AppError> {
    let mut object = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(AppError::BadRequest(
                    "webhook body must be a JSON object".to_string(),
                ))
            }
            Err(e) => {
                return Err(AppError::BadRequest(format!(
                    "webhook body is not valid JSON: {e}"
                )))
            }
        }
    };

    let mut fill = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            object.entry(key).or_insert(Value::String(value));
        }
    };
    fill("type", query.event_type);
    fill("topic", query.topic);
    fill("resource", query.id);

    if let Some(data_id) = query.data_id {
        let data = object
            .entry("data")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(data) = data {
            data.entry("id").or_insert(Value::String(data_id));
        }
    }

    Ok(Value::Object(object))
}

/// POST /webhooks/payments
///
/// Payment provider notification. A 2xx tells the provider the delivery is
/// settled; a 5xx makes it redeliver later.
#[utoipa::path(
    post,
    path = "/webhooks/payments",
    params(
        ("type" = Option<String>, Query, description = "Event type (webhook style)"),
        ("topic" = Option<String>, Query, description = "Event type (IPN style)"),
        ("id" = Option<String>, Query, description = "Payment id (IPN style)"),
        ("data.id" = Option<String>, Query, description = "Payment id (webhook style)"),
    ),
    request_body(content = Object, description = "Provider notification payload"),
    responses(
        (status = 200, description = "Notification handled", body = WebhookResponse),
        (status = 400, description = "Malformed payment notification"),
        (status = 500, description = "Fulfillment failed; the provider should retry"),
    ),
    tag = "webhooks"
)]
pub async fn receive_payment_notification(
    service: web::Data<FulfillmentService>,
    query: web::Query<WebhookQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let payload = notification_payload(&body, query.into_inner())?;

    let outcome = service.handle_notification(&payload).await?;

    Ok(HttpResponse::Ok().json(WebhookResponse::from(outcome)))
}

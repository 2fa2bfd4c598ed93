use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::application::checkout_service::CheckoutService;
use crate::domain::checkout::{Buyer, CheckoutCommand, CheckoutLine, ShippingDetails};
use crate::domain::errors::DomainError;
use crate::domain::json;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_id: Option<i32>,
    pub variant_id: Option<i32>,
    pub name: Option<String>,
    /// Client-side price; required but never used for charging.
    #[schema(value_type = Option<f64>)]
    pub price: Option<Value>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserRequest {
    pub id: Option<i32>,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetailsRequest {
    pub references: Option<String>,
    pub between_street_one: Option<String>,
    pub between_street_two: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceRequest {
    pub cart: Option<Vec<CartLineRequest>>,
    #[schema(value_type = Option<f64>)]
    pub total: Option<Value>,
    pub user: Option<UserRequest>,
    pub shipping_details: Option<ShippingDetailsRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceResponse {
    pub success: bool,
    pub preference_id: String,
    pub init_point: String,
    pub sandbox_init_point: Option<String>,
    pub external_reference: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreatePreferenceRequest {
    /// Boundary validation. Anything rejected here never reaches the
    /// payment provider.
    pub fn into_command(self) -> Result<CheckoutCommand, DomainError> {
        let invalid = |msg: String| DomainError::InvalidInput(msg);

        let cart = self
            .cart
            .filter(|c| !c.is_empty())
            .ok_or_else(|| invalid("cart must be a non-empty array".to_string()))?;

        let declared_total = match &self.total {
            Some(total @ Value::Number(_)) => json::decimal(total),
            _ => None,
        }
        .ok_or_else(|| invalid("total must be a number".to_string()))?;
        if declared_total <= BigDecimal::from(0) {
            return Err(invalid("total must be positive".to_string()));
        }

        let user = self
            .user
            .ok_or_else(|| invalid("user is required".to_string()))?;
        let buyer = Buyer {
            id: user
                .id
                .ok_or_else(|| invalid("user.id is required".to_string()))?,
            email: non_blank(user.email)
                .ok_or_else(|| invalid("user.email is required".to_string()))?,
            name: non_blank(user.name)
                .ok_or_else(|| invalid("user.name is required".to_string()))?,
        };

        let lines = cart
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let product_id = line
                    .product_id
                    .ok_or_else(|| invalid(format!("cart[{i}].productId is required")))?;
                if !matches!(line.price, Some(Value::Number(_))) {
                    return Err(invalid(format!("cart[{i}].price is required")));
                }
                let quantity = line
                    .quantity
                    .ok_or_else(|| invalid(format!("cart[{i}].quantity is required")))?;
                if quantity <= 0 {
                    return Err(invalid(format!("cart[{i}].quantity must be positive")));
                }
                let variant_id = line
                    .variant_id
                    .ok_or_else(|| invalid(format!("cart[{i}].variantId is required")))?;
                Ok(CheckoutLine {
                    product_id,
                    variant_id,
                    quantity,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shipping = self.shipping_details.unwrap_or_default();
        Ok(CheckoutCommand {
            lines,
            declared_total,
            buyer,
            shipping: ShippingDetails {
                references: non_blank(shipping.references),
                between_street_one: non_blank(shipping.between_street_one),
                between_street_two: non_blank(shipping.between_street_two),
            },
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /checkout/preferences
///
/// Prices the cart from the catalog and registers a checkout preference with
/// the payment provider. Client-supplied prices are validated for presence
/// only.
#[utoipa::path(
    post,
    path = "/checkout/preferences",
    request_body = CreatePreferenceRequest,
    responses(
        (status = 201, description = "Checkout preference created", body = CreatePreferenceResponse),
        (status = 400, description = "Invalid checkout request"),
        (status = 404, description = "Product variant not found"),
        (status = 500, description = "Payment provider or internal error"),
    ),
    tag = "checkout"
)]
pub async fn create_preference(
    service: web::Data<CheckoutService>,
    body: web::Json<CreatePreferenceRequest>,
) -> Result<HttpResponse, AppError> {
    let command = body.into_inner().into_command()?;

    let session = service.create_intent(command).await?;

    Ok(HttpResponse::Created().json(CreatePreferenceResponse {
        success: true,
        preference_id: session.preference_id,
        init_point: session.init_point,
        sandbox_init_point: session.sandbox_init_point,
        external_reference: session.external_reference,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> Result<CheckoutCommand, DomainError> {
        serde_json::from_value::<CreatePreferenceRequest>(body)
            .expect("deserialize")
            .into_command()
    }

    fn valid() -> Value {
        json!({
            "cart": [{"productId": 1, "variantId": 7, "name": "Mug", "price": 100, "quantity": 3}],
            "total": 500,
            "user": {"id": 42, "email": "ana@example.com", "name": "Ana"},
            "shippingDetails": {"references": "green gate", "betweenStreetOne": "Belgrano", "betweenStreetTwo": ""}
        })
    }

    fn assert_invalid(body: Value, needle: &str) {
        match parse(body) {
            Err(DomainError::InvalidInput(msg)) => {
                assert!(msg.contains(needle), "{msg:?} should mention {needle:?}")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_request_becomes_command() {
        let command = parse(valid()).expect("command");
        assert_eq!(command.lines.len(), 1);
        assert_eq!(command.lines[0].variant_id, 7);
        assert_eq!(command.buyer.email, "ana@example.com");
        assert_eq!(command.declared_total, BigDecimal::from(500));
        assert_eq!(command.shipping.references.as_deref(), Some("green gate"));
        assert_eq!(command.shipping.between_street_two, None);
    }

    #[test]
    fn empty_cart_is_rejected() {
        let mut body = valid();
        body["cart"] = json!([]);
        assert_invalid(body, "cart");
    }

    #[test]
    fn non_numeric_total_is_rejected() {
        let mut body = valid();
        body["total"] = json!("five hundred");
        assert_invalid(body, "total");
    }

    #[test]
    fn user_without_email_is_rejected() {
        let mut body = valid();
        body["user"] = json!({"id": 42, "name": "Ana"});
        assert_invalid(body, "user.email");
    }

    #[test]
    fn line_without_price_is_rejected() {
        let mut body = valid();
        body["cart"][0].as_object_mut().expect("object").remove("price");
        assert_invalid(body, "cart[0].price");
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut body = valid();
        body["cart"][0]["quantity"] = json!(0);
        assert_invalid(body, "quantity");
    }

    #[test]
    fn missing_shipping_details_are_allowed() {
        let mut body = valid();
        body.as_object_mut().expect("object").remove("shippingDetails");
        let command = parse(body).expect("command");
        assert_eq!(command.shipping, ShippingDetails::default());
    }
}

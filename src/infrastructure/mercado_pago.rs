//! Mercado Pago REST client: checkout preferences and payment lookup.

use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::checkout::{CheckoutIntent, CheckoutSession};
use crate::domain::errors::DomainError;
use crate::domain::ports::PaymentGateway;

pub const DEFAULT_API_URL: &str = "https://api.mercadopago.com";

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PreferenceRequest<'a> {
    items: Vec<PreferenceItem<'a>>,
    payer: PreferencePayer<'a>,
    shipments: PreferenceShipments,
    back_urls: PreferenceBackUrls<'a>,
    auto_return: &'static str,
    notification_url: &'a str,
    external_reference: &'a str,
    expires: bool,
    expiration_date_from: String,
    expiration_date_to: String,
    payment_methods: PreferencePaymentMethods,
    metadata: &'a Value,
}

#[derive(Debug, Serialize)]
struct PreferenceItem<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    quantity: i32,
    unit_price: f64,
    currency_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PreferencePayer<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct PreferenceShipments {
    cost: f64,
    mode: &'static str,
}

#[derive(Debug, Serialize)]
struct PreferenceBackUrls<'a> {
    success: &'a str,
    failure: &'a str,
    pending: &'a str,
}

#[derive(Debug, Serialize)]
struct PreferencePaymentMethods {
    excluded_payment_methods: Vec<Value>,
    excluded_payment_types: Vec<Value>,
    installments: u32,
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    id: String,
    init_point: String,
    sandbox_init_point: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
    #[serde(default)]
    cause: Vec<ApiErrorCause>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorCause {
    description: Option<String>,
}

fn amount(value: &BigDecimal) -> Result<f64, DomainError> {
    value
        .to_f64()
        .ok_or_else(|| DomainError::Internal(format!("amount {value} is not representable")))
}

impl<'a> PreferenceRequest<'a> {
    fn from_intent(intent: &'a CheckoutIntent) -> Result<Self, DomainError> {
        let items = intent
            .items
            .iter()
            .map(|item| {
                Ok(PreferenceItem {
                    id: &item.id,
                    title: &item.title,
                    description: &item.description,
                    quantity: item.quantity,
                    unit_price: amount(&item.unit_price)?,
                    currency_id: &item.currency_id,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(PreferenceRequest {
            items,
            payer: PreferencePayer {
                name: &intent.payer.name,
                email: &intent.payer.email,
            },
            shipments: PreferenceShipments {
                cost: amount(&intent.shipping_cost)?,
                mode: "not_specified",
            },
            back_urls: PreferenceBackUrls {
                success: &intent.back_urls.success,
                failure: &intent.back_urls.failure,
                pending: &intent.back_urls.pending,
            },
            auto_return: "approved",
            notification_url: &intent.notification_url,
            external_reference: &intent.external_reference,
            expires: true,
            expiration_date_from: intent
                .expires_from
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            expiration_date_to: intent
                .expires_to
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            payment_methods: PreferencePaymentMethods {
                excluded_payment_methods: Vec::new(),
                excluded_payment_types: Vec::new(),
                installments: intent.max_installments,
            },
            metadata: &intent.metadata,
        })
    }
}

/// Builds the provider error text: the message followed by every cause.
fn provider_error(status: StatusCode, body: &str) -> DomainError {
    let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) else {
        return DomainError::Provider(format!("HTTP {status}: {body}"));
    };

    let mut parts: Vec<String> = parsed
        .message
        .or(parsed.error)
        .into_iter()
        .collect();
    parts.extend(parsed.cause.into_iter().filter_map(|c| c.description));

    if parts.is_empty() {
        DomainError::Provider(format!("HTTP {status}"))
    } else {
        DomainError::Provider(parts.join("; "))
    }
}

// ── Client ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MercadoPagoClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl MercadoPagoClient {
    pub fn new(
        base_url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    /// `{api}/v1/payments/{id}` with the id as a single encoded segment.
    fn payment_url(&self, payment_id: &str) -> Result<Url, DomainError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DomainError::Internal(format!("invalid provider URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| DomainError::Internal(format!("provider URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v1", "payments", payment_id]);
        Ok(url)
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    async fn create_preference(
        &self,
        intent: &CheckoutIntent,
    ) -> Result<CheckoutSession, DomainError> {
        let body = PreferenceRequest::from_intent(intent)?;
        let response = self
            .client
            .post(format!("{}/checkout/preferences", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Provider(format!("preference request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(provider_error(status, &text));
        }

        let preference: PreferenceResponse = response.json().await.map_err(|e| {
            DomainError::Provider(format!("failed to parse preference response: {e}"))
        })?;

        Ok(CheckoutSession {
            preference_id: preference.id,
            init_point: preference.init_point,
            sandbox_init_point: preference.sandbox_init_point,
            external_reference: intent.external_reference.clone(),
        })
    }

    async fn fetch_payment_json(&self, payment_id: &str) -> Result<Value, DomainError> {
        let response = self
            .client
            .get(self.payment_url(payment_id)?)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DomainError::Provider(format!("payment lookup failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DomainError::NotFound);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(provider_error(status, &text));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::Provider(format!("failed to parse payment {payment_id}: {e}")))
    }
}

//! Classification of inbound payment notifications.
//!
//! The provider has changed its notification shape over the years: the event
//! type arrives as `type`, `topic`, or the prefix of a dotted `action`
//! (`payment.created`), and the payment id as `data.id` or as a `resource`
//! that is either a bare numeric string or a URL ending in the id.

use serde_json::Value;

use super::errors::DomainError;
use super::json;

pub const PAYMENT_EVENT: &str = "payment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Payment { payment_id: String },
    NotActionable { event_type: Option<String> },
}

impl WebhookEvent {
    pub fn is_actionable(&self) -> bool {
        matches!(self, WebhookEvent::Payment { .. })
    }

    pub fn payment_id(&self) -> Option<&str> {
        match self {
            WebhookEvent::Payment { payment_id } => Some(payment_id),
            WebhookEvent::NotActionable { .. } => None,
        }
    }
}

/// Decides whether a notification concerns a payment and, if so, which one.
///
/// Non-payment events are an ordinary outcome, not an error. A payment event
/// without a usable id is `MalformedEvent`.
pub fn classify(payload: &Value) -> Result<WebhookEvent, DomainError> {
    let event_type = event_type(payload);
    if event_type.as_deref() != Some(PAYMENT_EVENT) {
        return Ok(WebhookEvent::NotActionable { event_type });
    }

    payment_id(payload)
        .map(|payment_id| WebhookEvent::Payment { payment_id })
        .ok_or_else(|| {
            DomainError::MalformedEvent("payment notification carries no payment id".to_string())
        })
}

fn event_type(payload: &Value) -> Option<String> {
    let non_empty = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    non_empty("type")
        .or_else(|| non_empty("topic"))
        .map(str::to_string)
        .or_else(|| {
            non_empty("action")
                .and_then(|action| action.split('.').next())
                .filter(|prefix| !prefix.is_empty())
                .map(str::to_string)
        })
}

/// Provider payment ids are numeric; anything else is not trusted to reach
/// the provider API.
fn payment_id(payload: &Value) -> Option<String> {
    payload
        .get("data")
        .and_then(|data| data.get("id"))
        .and_then(json::id_string)
        .filter(|id| is_numeric(id))
        .or_else(|| {
            payload
                .get("resource")
                .and_then(Value::as_str)
                .and_then(resource_id)
        })
}

fn resource_id(resource: &str) -> Option<String> {
    let candidate = resource
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    is_numeric(candidate).then(|| candidate.to_string())
}

fn is_numeric(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_digit())
}

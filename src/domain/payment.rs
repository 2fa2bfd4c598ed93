use std::fmt;

use bigdecimal::BigDecimal;
use serde_json::Value;

use super::errors::DomainError;
use super::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Authorized,
    InProcess,
    InMediation,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
    Other(String),
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => PaymentStatus::Pending,
            "approved" => PaymentStatus::Approved,
            "authorized" => PaymentStatus::Authorized,
            "in_process" => PaymentStatus::InProcess,
            "in_mediation" => PaymentStatus::InMediation,
            "rejected" => PaymentStatus::Rejected,
            "cancelled" => PaymentStatus::Cancelled,
            "refunded" => PaymentStatus::Refunded,
            "charged_back" => PaymentStatus::ChargedBack,
            other => PaymentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::InProcess => "in_process",
            PaymentStatus::InMediation => "in_mediation",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::ChargedBack => "charged_back",
            PaymentStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment as reported by the provider's own API. Webhook bodies are never
/// parsed into this type.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub id: String,
    pub status: PaymentStatus,
    pub external_reference: Option<String>,
    pub metadata: Value,
}

/// One cart line as it was priced when the checkout intent was created.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenLine {
    pub product_id: Option<i32>,
    pub variant_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Everything materialization needs to know about an approved payment.
#[derive(Debug, Clone)]
pub struct FulfillmentRequest {
    pub payment_id: String,
    pub user_id: i32,
    pub external_reference: Option<String>,
    /// Empty when the intent predates cart snapshots.
    pub frozen_lines: Vec<FrozenLine>,
}

impl PaymentRecord {
    pub fn from_json(value: &Value) -> Result<Self, DomainError> {
        let id = value
            .get("id")
            .and_then(json::id_string)
            .ok_or_else(|| DomainError::Provider("payment record has no id".to_string()))?;
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .map(PaymentStatus::parse)
            .ok_or_else(|| {
                DomainError::Provider(format!("payment record {id} has no status"))
            })?;
        let external_reference = value
            .get("external_reference")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let metadata = value.get("metadata").cloned().unwrap_or(Value::Null);

        Ok(PaymentRecord {
            id,
            status,
            external_reference,
            metadata,
        })
    }

    pub fn is_approved(&self) -> bool {
        self.status == PaymentStatus::Approved
    }

    /// Recovers the buyer and the frozen cart from the checkout metadata.
    ///
    /// An approved payment without an attributable user is a data-integrity
    /// error: money moved and nobody can be credited with it.
    pub fn fulfillment_request(&self) -> Result<FulfillmentRequest, DomainError> {
        let user_id = self
            .metadata
            .get("user_id")
            .and_then(json::int)
            .ok_or_else(|| {
                DomainError::DataIntegrity(format!(
                    "approved payment {} carries no user_id in its metadata",
                    self.id
                ))
            })?;

        let frozen_lines = match self.metadata.get("cart_items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| parse_frozen_line(index, item))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(DomainError::DataIntegrity(format!(
                    "payment {} has a cart_items snapshot that is not a list",
                    self.id
                )))
            }
        };

        Ok(FulfillmentRequest {
            payment_id: self.id.clone(),
            user_id,
            external_reference: self.external_reference.clone(),
            frozen_lines,
        })
    }
}

fn parse_frozen_line(index: usize, item: &Value) -> Result<FrozenLine, DomainError> {
    let malformed = |field: &str| {
        DomainError::DataIntegrity(format!(
            "checkout snapshot line {index} has a missing or invalid {field}"
        ))
    };
    let variant_id = item
        .get("variant_id")
        .and_then(json::int)
        .ok_or_else(|| malformed("variant_id"))?;
    let quantity = item
        .get("quantity")
        .and_then(json::int)
        .filter(|q| *q > 0)
        .ok_or_else(|| malformed("quantity"))?;
    let unit_price = item
        .get("unit_price")
        .and_then(json::decimal)
        .ok_or_else(|| malformed("unit_price"))?;

    Ok(FrozenLine {
        product_id: item.get("product_id").and_then(json::int),
        variant_id,
        quantity,
        unit_price,
    })
}

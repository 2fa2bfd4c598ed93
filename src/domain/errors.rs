use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Product variant {0} not found")]
    VariantNotFound(i32),
    #[error("Malformed webhook event: {0}")]
    MalformedEvent(String),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
    #[error("Payment provider error: {0}")]
    Provider(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Error processing payment {payment_id}: {source}")]
    Payment {
        payment_id: String,
        #[source]
        source: Box<DomainError>,
    },
}

impl DomainError {
    /// Tags the error with the payment it was raised for.
    pub fn for_payment(self, payment_id: &str) -> Self {
        match self {
            already @ DomainError::Payment { .. } => already,
            other => DomainError::Payment {
                payment_id: payment_id.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping payment tagging.
    pub fn kind(&self) -> &DomainError {
        match self {
            DomainError::Payment { source, .. } => source.kind(),
            other => other,
        }
    }
}

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::checkout::CheckoutSettings;
use crate::infrastructure::mercado_pago::DEFAULT_API_URL;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CURRENCY: &str = "ARS";
const TEST_TOKEN_PREFIX: &str = "TEST-";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CredentialMode {
    Test,
    Production,
}

impl CredentialMode {
    pub fn of_token(token: &str) -> Self {
        if token.starts_with(TEST_TOKEN_PREFIX) {
            CredentialMode::Test
        } else {
            CredentialMode::Production
        }
    }
}

/// Diagnostic view of the configuration. Never carries secret values.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReport {
    pub mode: CredentialMode,
    pub frontend_url: bool,
    pub backend_url: bool,
    pub access_token: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub backend_url: String,
    pub access_token: String,
    pub provider_api_url: String,
    pub provider_timeout: Duration,
    pub currency: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let optional = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let port = match optional("PORT") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };
        let timeout_secs = match optional("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                name: "PROVIDER_TIMEOUT_SECS",
                reason: format!("{e}"),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(AppConfig {
            database_url: required("DATABASE_URL")?,
            host: optional("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            frontend_url: origin(required("FRONTEND_URL")?),
            backend_url: origin(required("BACKEND_URL")?),
            access_token: required("MERCADOPAGO_ACCESS_TOKEN")?,
            provider_api_url: origin(
                optional("MERCADOPAGO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ),
            provider_timeout: Duration::from_secs(timeout_secs),
            currency: optional("CHECKOUT_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            frontend_url: self.frontend_url.clone(),
            backend_url: self.backend_url.clone(),
            currency: self.currency.clone(),
        }
    }

    pub fn report(&self) -> ConfigReport {
        ConfigReport {
            mode: CredentialMode::of_token(&self.access_token),
            frontend_url: !self.frontend_url.is_empty(),
            backend_url: !self.backend_url.is_empty(),
            access_token: !self.access_token.is_empty(),
        }
    }
}

fn origin(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

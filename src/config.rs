use std::env;

use crate::error::{AppError, AppResult};

/// Configuration for the webhook handler, read from the environment at
/// startup and passed into the components that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Zendesk subdomain the API URLs are templated with.
    pub subdomain: String,
    /// Account email used for `{email}/token` Basic auth.
    pub email: String,
    /// Parameter-store key holding the Zendesk API access token.
    pub access_token_param_key: String,
    /// Id of the ticket custom field that stores the ticket language.
    pub ticket_lang_field_id: u64,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            subdomain: require_var("ZENDESK_SUBDOMAIN")?,
            email: require_var("ZENDESK_EMAIL")?,
            access_token_param_key: require_var("ZENDESK_ACCESS_TOKEN_PARAM_KEY")?,
            ticket_lang_field_id: require_var("ZENDESK_TICKET_LANG_FIELD_ID")?
                .parse()
                .map_err(|_| {
                    AppError::Configuration(
                        "ZENDESK_TICKET_LANG_FIELD_ID must be a numeric field id".to_string(),
                    )
                })?,
        })
    }
}

/// Configuration for the gateway authorizer.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Parameter-store key holding the expected Basic-Auth username.
    pub username_param_key: String,
    /// Parameter-store key holding the expected password, stored encrypted.
    pub password_param_key: String,
}

impl AuthConfig {
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            username_param_key: require_var("BASIC_AUTH_USERNAME_PARAM_KEY")?,
            password_param_key: require_var("BASIC_AUTH_PASSWORD_PARAM_KEY")?,
        })
    }
}

/// Whether the `DEBUG=true` toggle is set.
pub fn debug_enabled() -> bool {
    env::var("DEBUG").map(|value| value == "true").unwrap_or(false)
}

fn require_var(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Configuration(format!("{name} is not set")))
}

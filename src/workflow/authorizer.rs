use std::collections::HashMap;

use base64::prelude::{BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::services::SecretStore;

const POLICY_VERSION: &str = "2012-10-17";

/// Gateway authorizer input: the inbound request headers plus the ARN of
/// the method being invoked.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizerRequest {
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(rename = "methodArn")]
    pub method_arn: String,
}

/// IAM-style allow policy scoped to one method resource.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizerResponse {
    #[serde(rename = "principalId")]
    pub principal_id: String,
    #[serde(rename = "policyDocument")]
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "Statement")]
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyStatement {
    #[serde(rename = "Action")]
    pub action: &'static str,
    #[serde(rename = "Effect")]
    pub effect: &'static str,
    #[serde(rename = "Resource")]
    pub resource: Vec<String>,
}

/// Validates the request's Basic-Auth credentials against the secret
/// store and, on success, returns an allow policy for exactly the
/// invoked method. Every failure path yields `AppError::Unauthorized`
/// (or a store error), which callers answer without detail.
pub async fn authorize(
    config: &AuthConfig,
    secrets: &dyn SecretStore,
    request: &AuthorizerRequest,
) -> AppResult<AuthorizerResponse> {
    let Some(header) = request.headers.get("Authorization") else {
        return Err(AppError::Unauthorized);
    };
    let (username, password) = decode_basic_credentials(header)?;

    let Some(expected_username) = secrets.fetch(&config.username_param_key, false).await? else {
        error!("missing username value under {}", config.username_param_key);
        return Err(AppError::Unauthorized);
    };
    // The password parameter is stored encrypted.
    let Some(expected_password) = secrets.fetch(&config.password_param_key, true).await? else {
        error!("missing password value under {}", config.password_param_key);
        return Err(AppError::Unauthorized);
    };

    if username != expected_username || password != expected_password {
        return Err(AppError::Unauthorized);
    }

    let resource = method_resource_arn(&request.method_arn).ok_or(AppError::Unauthorized)?;
    Ok(AuthorizerResponse {
        principal_id: username,
        policy_document: PolicyDocument {
            version: POLICY_VERSION,
            statement: vec![PolicyStatement {
                action: "execute-api:Invoke",
                effect: "Allow",
                resource: vec![resource],
            }],
        },
    })
}

fn decode_basic_credentials(header: &str) -> AppResult<(String, String)> {
    let encoded = header
        .split_whitespace()
        .nth(1)
        .ok_or(AppError::Unauthorized)?;
    let decoded = BASE64_STANDARD
        .decode(encoded)
        .map_err(|_| AppError::Unauthorized)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AppError::Unauthorized)?;
    let (username, password) = decoded.split_once(':').ok_or(AppError::Unauthorized)?;
    Ok((username.to_string(), password.to_string()))
}

/// Rebuilds the ARN of exactly the invoked method from the request's
/// method ARN — never a wildcard. Returns `None` when the ARN does not
/// split into the expected segments.
fn method_resource_arn(method_arn: &str) -> Option<String> {
    let parts: Vec<&str> = method_arn.splitn(6, ':').collect();
    if parts.len() != 6 {
        return None;
    }
    let region = parts[3];
    let account_id = parts[4];

    let path: Vec<&str> = parts[5].split('/').collect();
    if path.len() < 4 {
        return None;
    }
    let (api_id, stage, http_method, resource) = (path[0], path[1], path[2], path[3]);

    Some(format!(
        "arn:aws:execute-api:{region}:{account_id}:{api_id}/{stage}/{http_method}/{resource}"
    ))
}

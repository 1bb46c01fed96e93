use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ssm::Client;

use crate::error::{AppError, AppResult};
use crate::services::SecretStore;

/// AWS Systems Manager Parameter Store backend for secrets.
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    pub async fn new() -> Self {
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&aws_config),
        }
    }
}

#[async_trait]
impl SecretStore for SsmParameterStore {
    async fn fetch(&self, key: &str, decrypt: bool) -> AppResult<Option<String>> {
        let output = self
            .client
            .get_parameter()
            .name(key)
            .with_decryption(decrypt)
            .send()
            .await
            .map_err(|err| {
                AppError::SecretStore(format!("failed to read parameter {key}: {err}"))
            })?;

        Ok(output.parameter.and_then(|parameter| parameter.value))
    }
}

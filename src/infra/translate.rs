use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_translate::Client;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::services::{Translation, TranslationService};

/// AWS Translate backend.
pub struct AwsTranslate {
    client: Client,
}

impl AwsTranslate {
    pub async fn new() -> Self {
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&aws_config),
        }
    }
}

#[async_trait]
impl TranslationService for AwsTranslate {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> AppResult<Translation> {
        info!("Translating text from {source_language} to {target_language}...");
        let output = self
            .client
            .translate_text()
            .text(text)
            .source_language_code(source_language)
            .target_language_code(target_language)
            .send()
            .await
            .map_err(|err| AppError::Translation(format!("translate call failed: {err}")))?;

        info!(
            "Successfully translated from {} to {}",
            output.source_language_code(),
            output.target_language_code()
        );
        debug!("translated result: {}", output.translated_text());

        Ok(Translation {
            text: output.translated_text().to_string(),
            source_language: output.source_language_code().to_string(),
            target_language: output.target_language_code().to_string(),
        })
    }
}

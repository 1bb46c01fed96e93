use async_trait::async_trait;

use crate::error::AppResult;

/// Source language value that asks the service to detect the language.
pub const AUTO_SOURCE_LANGUAGE: &str = "auto";

/// A completed translation with the language codes the service resolved.
#[derive(Debug, Clone)]
pub struct Translation {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> AppResult<Translation>;
}

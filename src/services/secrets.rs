use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches a named value from the store; `decrypt` requests decryption
    /// for values stored encrypted. `None` means the store holds no value
    /// under the key.
    async fn fetch(&self, key: &str, decrypt: bool) -> AppResult<Option<String>>;
}

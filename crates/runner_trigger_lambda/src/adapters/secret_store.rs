use async_trait::async_trait;
use runner_trigger_core::contract::SecretBundle;
use runner_trigger_core::error::TriggerError;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the raw string value stored under `name` in `region`.
    async fn fetch_secret(&self, name: &str, region: &str) -> Result<String, TriggerError>;
}

/// Reads and decodes the webhook secret bundle. Never cached.
pub async fn fetch_secret_bundle(
    store: &dyn SecretStore,
    name: &str,
    region: &str,
) -> Result<SecretBundle, TriggerError> {
    let raw = store.fetch_secret(name, region).await?;
    parse_secret_bundle(name, &raw)
}

pub fn parse_secret_bundle(name: &str, raw: &str) -> Result<SecretBundle, TriggerError> {
    serde_json::from_str(raw).map_err(|error| {
        TriggerError::secret_retrieval(name, format!("secret value is not a valid bundle: {error}"))
    })
}

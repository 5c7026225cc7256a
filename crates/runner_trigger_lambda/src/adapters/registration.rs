use async_trait::async_trait;
use runner_trigger_core::error::TriggerError;

/// Exchanges a privileged access token for a short-lived runner
/// registration token scoped to one repository.
#[async_trait]
pub trait RegistrationTokenIssuer: Send + Sync {
    async fn registration_token(
        &self,
        access_token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<String, TriggerError>;
}

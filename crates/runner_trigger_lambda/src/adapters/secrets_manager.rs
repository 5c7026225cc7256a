use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::config::retry::RetryConfig;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use runner_trigger_core::error::TriggerError;

use crate::adapters::secret_store::SecretStore;

/// [`SecretStore`] backed by AWS Secrets Manager.
///
/// The client for the default region is built once; other regions get a
/// client derived from the same shared configuration on demand.
pub struct SecretsManagerStore {
    sdk_config: SdkConfig,
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            sdk_config: sdk_config.clone(),
            client: aws_sdk_secretsmanager::Client::from_conf(single_attempt(sdk_config).build()),
        }
    }

    fn client_for(&self, region: &str) -> aws_sdk_secretsmanager::Client {
        let matches_default = self
            .client
            .config()
            .region()
            .is_some_and(|configured| configured.as_ref() == region);
        if matches_default {
            return self.client.clone();
        }

        let config = single_attempt(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_secretsmanager::Client::from_conf(config)
    }
}

// One attempt per call; the SDK's default retry policy is turned off.
fn single_attempt(sdk_config: &SdkConfig) -> aws_sdk_secretsmanager::config::Builder {
    aws_sdk_secretsmanager::config::Builder::from(sdk_config).retry_config(RetryConfig::disabled())
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn fetch_secret(&self, name: &str, region: &str) -> Result<String, TriggerError> {
        let response = self
            .client_for(region)
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|error| {
                TriggerError::secret_retrieval(
                    name,
                    format!("get_secret_value failed: {}", DisplayErrorContext(&error)),
                )
            })?;

        response
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| TriggerError::secret_retrieval(name, "secret has no SecretString value"))
    }
}

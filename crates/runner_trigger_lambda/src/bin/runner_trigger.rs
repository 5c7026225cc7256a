use lambda_runtime::{service_fn, Error, LambdaEvent};
use runner_trigger_core::config::TriggerConfig;
use runner_trigger_core::contract::ApiGatewayResponse;
use runner_trigger_core::error::TriggerError;
use runner_trigger_lambda::adapters::ecs::EcsTaskRunner;
use runner_trigger_lambda::adapters::github::GithubRegistrationClient;
use runner_trigger_lambda::adapters::secrets_manager::SecretsManagerStore;
use runner_trigger_lambda::handlers::webhook::{handle_webhook_event, HandlerDeps};
use runner_trigger_lambda::launcher::TaskLauncher;
use runner_trigger_lambda::observability::init_tracing;
use serde_json::Value;
use tracing::{error, warn};

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &HandlerDeps<'_>,
) -> Result<ApiGatewayResponse, Error> {
    handle_webhook_event(event.payload, deps)
        .await
        .map_err(|failure| {
            log_failure(&failure);
            Error::from(failure)
        })
}

fn log_failure(failure: &TriggerError) {
    match failure {
        TriggerError::Authentication => {
            warn!(error_kind = failure.kind(), "webhook signature rejected");
        }
        _ => error!(error_kind = failure.kind(), error = %failure, "invocation failed"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = TriggerConfig::from_env()?;
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()))
        .retry_config(aws_config::retry::RetryConfig::disabled())
        .load()
        .await;

    let secret_store = SecretsManagerStore::new(&sdk_config);
    let task_runner = EcsTaskRunner::new(&sdk_config);
    let registration = GithubRegistrationClient::new(config.github_api_url.clone())?;
    let launcher = TaskLauncher::new(&registration, &task_runner, &config.launcher);
    let deps = HandlerDeps {
        config: &config,
        secret_store: &secret_store,
        launcher: &launcher,
    };

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, deps).await
    }))
    .await
}

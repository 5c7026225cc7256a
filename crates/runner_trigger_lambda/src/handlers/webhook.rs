use runner_trigger_core::config::TriggerConfig;
use runner_trigger_core::contract::ApiGatewayResponse;
use runner_trigger_core::error::TriggerError;
use runner_trigger_core::event::parse_webhook_event;
use runner_trigger_core::signature::verify_signature;
use serde_json::Value;
use tracing::info;

use crate::adapters::secret_store::{fetch_secret_bundle, SecretStore};
use crate::launcher::RunnerLauncher;

pub struct HandlerDeps<'a> {
    pub config: &'a TriggerConfig,
    pub secret_store: &'a dyn SecretStore,
    pub launcher: &'a dyn RunnerLauncher,
}

/// Handles one `workflow_job` delivery.
///
/// Only `queued` jobs with a valid signature start a runner; every other
/// action is acknowledged with `200`. All failures are returned to the
/// caller unhandled.
pub async fn handle_webhook_event(
    event: Value,
    deps: &HandlerDeps<'_>,
) -> Result<ApiGatewayResponse, TriggerError> {
    let webhook = parse_webhook_event(&event)?;
    let runner_name = webhook.runner_name();
    info!(
        action = %webhook.action,
        job_id = webhook.job_id,
        owner = %webhook.owner,
        repo = %webhook.repo,
        "workflow_job event received"
    );

    let secrets = fetch_secret_bundle(
        deps.secret_store,
        &deps.config.secret_name,
        &deps.config.region,
    )
    .await?;

    if !webhook.is_queued() {
        info!(action = %webhook.action, job_id = webhook.job_id, "runner not required");
        return Ok(ApiGatewayResponse::ignored(&webhook.action));
    }

    verify_signature(&webhook.raw_body, &secrets.webhook_secret, &webhook.signature)?;

    let task = deps
        .launcher
        .launch(
            &secrets.access_token,
            &runner_name,
            &webhook.owner,
            &webhook.repo,
            &deps.config.region,
        )
        .await?;
    info!(
        runner_name = %runner_name,
        task_arn = task.task_arn.as_deref().unwrap_or("unknown"),
        cluster_arn = task.cluster_arn.as_deref().unwrap_or("unknown"),
        created_at = task.created_at.as_deref().unwrap_or("unknown"),
        "runner task started"
    );

    Ok(ApiGatewayResponse::created(&runner_name))
}

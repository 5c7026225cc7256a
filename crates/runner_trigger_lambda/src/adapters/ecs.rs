use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecs::config::retry::RetryConfig;
use aws_sdk_ecs::config::Region;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::operation::run_task::RunTaskOutput;
use aws_sdk_ecs::primitives::DateTimeFormat;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use runner_trigger_core::contract::{LaunchedTask, RunTaskRequest};
use runner_trigger_core::error::TriggerError;
use tracing::warn;

use crate::adapters::task_runner::TaskRunner;

/// [`TaskRunner`] that submits `RunTask` calls to Amazon ECS.
pub struct EcsTaskRunner {
    sdk_config: SdkConfig,
    client: aws_sdk_ecs::Client,
}

impl EcsTaskRunner {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            sdk_config: sdk_config.clone(),
            client: aws_sdk_ecs::Client::from_conf(single_attempt(sdk_config).build()),
        }
    }

    fn client_for(&self, region: &str) -> aws_sdk_ecs::Client {
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
        aws_sdk_ecs::Client::from_conf(config)
    }
}

// One attempt per call; the SDK's default retry policy is turned off.
fn single_attempt(sdk_config: &SdkConfig) -> aws_sdk_ecs::config::Builder {
    aws_sdk_ecs::config::Builder::from(sdk_config).retry_config(RetryConfig::disabled())
}

#[async_trait]
impl TaskRunner for EcsTaskRunner {
    async fn run_task(&self, request: &RunTaskRequest) -> Result<LaunchedTask, TriggerError> {
        let network_configuration = network_configuration(request)?;
        let overrides = task_override(request);

        let output = self
            .client_for(&request.region)
            .run_task()
            .task_definition(&request.task_definition)
            .cluster(&request.cluster)
            .launch_type(LaunchType::from(request.launch_type.as_str()))
            .platform_version(&request.platform_version)
            .count(request.count)
            .network_configuration(network_configuration)
            .overrides(overrides)
            .send()
            .await
            .map_err(|error| {
                TriggerError::TaskLaunch(format!(
                    "ecs run_task failed: {}",
                    DisplayErrorContext(&error)
                ))
            })?;

        launched_task_from_output(&output)
    }
}

fn failure_reasons(output: &RunTaskOutput) -> Vec<String> {
    output
        .failures()
        .iter()
        .map(|failure| {
            format!(
                "{}: {}",
                failure.arn().unwrap_or("unknown"),
                failure.reason().unwrap_or("no reason given")
            )
        })
        .collect()
}

pub fn network_configuration(
    request: &RunTaskRequest,
) -> Result<NetworkConfiguration, TriggerError> {
    let assign_public_ip = if request.assign_public_ip {
        AssignPublicIp::Enabled
    } else {
        AssignPublicIp::Disabled
    };

    let vpc = AwsVpcConfiguration::builder()
        .set_subnets(Some(request.subnets.clone()))
        .set_security_groups(Some(request.security_groups.clone()))
        .assign_public_ip(assign_public_ip)
        .build()
        .map_err(|error| {
            TriggerError::TaskLaunch(format!("invalid awsvpc configuration: {error}"))
        })?;

    Ok(NetworkConfiguration::builder()
        .awsvpc_configuration(vpc)
        .build())
}

pub fn task_override(request: &RunTaskRequest) -> TaskOverride {
    let environment = request
        .container_override
        .environment
        .iter()
        .map(|entry| {
            KeyValuePair::builder()
                .name(&entry.name)
                .value(&entry.value)
                .build()
        })
        .collect();

    TaskOverride::builder()
        .container_overrides(
            ContainerOverride::builder()
                .name(&request.container_override.name)
                .set_environment(Some(environment))
                .build(),
        )
        .build()
}

/// Requires at least one started task. Reported `failures` become part of
/// the `TaskLaunch` error when nothing started, and are logged as warnings
/// when a task started anyway.
pub fn launched_task_from_output(output: &RunTaskOutput) -> Result<LaunchedTask, TriggerError> {
    let reasons = failure_reasons(output);
    let Some(task) = output.tasks().first() else {
        let detail = if reasons.is_empty() {
            "orchestrator returned no tasks".to_string()
        } else {
            format!("orchestrator returned no tasks ({})", reasons.join("; "))
        };
        return Err(TriggerError::TaskLaunch(detail));
    };

    if !reasons.is_empty() {
        warn!(
            failures = %reasons.join("; "),
            task_arn = task.task_arn().unwrap_or("unknown"),
            "run_task reported failures alongside a started task"
        );
    }

    Ok(LaunchedTask {
        task_arn: task.task_arn().map(str::to_string),
        cluster_arn: task.cluster_arn().map(str::to_string),
        created_at: task
            .created_at()
            .and_then(|created_at| created_at.fmt(DateTimeFormat::DateTime).ok()),
    })
}

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const QUEUED_ACTION: &str = "queued";
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const RUNNER_NAME_PREFIX: &str = "ecs-runner-";
pub const RUNNER_CONTAINER_NAME: &str = "runner";
pub const FARGATE_LAUNCH_TYPE: &str = "FARGATE";
pub const LATEST_PLATFORM_VERSION: &str = "LATEST";

pub const SECRET_KEY_WEBHOOK_TOKEN: &str = "GITHUB_SECRET_TOKEN";
pub const SECRET_KEY_ACCESS_TOKEN: &str = "GITHUB_PAT";

pub const ENV_REGISTRATION_TOKEN: &str = "GITHUB_REGISTRATION_TOKEN";
pub const ENV_RUNNER_NAME: &str = "GITHUB_RUNNER_NAME";
pub const ENV_REPO: &str = "GITHUB_REPO";
pub const ENV_OWNER: &str = "GITHUB_OWNER";

/// A validated `workflow_job` delivery.
///
/// `raw_body` holds the body bytes exactly as delivered; the signature is
/// checked against these and never against a re-serialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub action: String,
    pub job_id: u64,
    pub owner: String,
    pub repo: String,
    pub signature: String,
    pub raw_body: Vec<u8>,
}

impl WebhookEvent {
    pub fn is_queued(&self) -> bool {
        self.action == QUEUED_ACTION
    }

    pub fn runner_name(&self) -> String {
        runner_name(self.job_id)
    }
}

pub fn runner_name(job_id: u64) -> String {
    format!("{RUNNER_NAME_PREFIX}{job_id}")
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SecretBundle {
    #[serde(rename = "GITHUB_SECRET_TOKEN")]
    pub webhook_secret: String,
    #[serde(rename = "GITHUB_PAT")]
    pub access_token: String,
}

impl std::fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBundle")
            .field("webhook_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct EnvironmentEntry {
    pub name: String,
    pub value: String,
}

impl EnvironmentEntry {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

impl std::fmt::Debug for EnvironmentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value: &str = if self.name == ENV_REGISTRATION_TOKEN {
            "<redacted>"
        } else {
            &self.value
        };
        f.debug_struct("EnvironmentEntry")
            .field("name", &self.name)
            .field("value", &value)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOverride {
    pub name: String,
    pub environment: Vec<EnvironmentEntry>,
}

/// Orchestrator-neutral description of the one-shot runner task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTaskRequest {
    pub region: String,
    pub task_definition: String,
    pub cluster: String,
    pub launch_type: String,
    pub platform_version: String,
    pub count: i32,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub assign_public_ip: bool,
    pub container_override: ContainerOverride,
}

/// First task reported back by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchedTask {
    pub task_arn: Option<String>,
    pub cluster_arn: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl ApiGatewayResponse {
    pub fn created(runner_name: &str) -> Self {
        Self::text(201, format!("Starting Runner with name: {runner_name}!"))
    }

    pub fn ignored(action: &str) -> Self {
        Self::text(
            200,
            format!("Will not start runner, as workflow job status is {action}!"),
        )
    }

    fn text(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            headers: json!({"Content-Type": "text/plain"}),
            body,
        }
    }
}

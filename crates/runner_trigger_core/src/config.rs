use thiserror::Error;

pub const ENV_TASK_DEFINITION: &str = "ECS_TASK_DEFINITION";
pub const ENV_CLUSTER_NAME: &str = "ECS_CLUSTER_NAME";
pub const ENV_SUBNETS: &str = "SUBNETS";
pub const ENV_SECURITY_GROUPS: &str = "SECURITY_GROUPS";
pub const ENV_SECRETS_NAME: &str = "GH_SECRETS_NAME";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),

    #[error("{0} must list at least one non-empty, comma-separated value")]
    EmptyList(&'static str),

    #[error("{name} must be an http(s) URL, got {value:?}")]
    InvalidUrl { name: &'static str, value: String },
}

/// Settings the launcher needs to describe the runner task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub task_definition: String,
    pub cluster: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
}

/// Process-wide configuration, built once at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    pub region: String,
    pub secret_name: String,
    pub github_api_url: String,
    pub launcher: LauncherConfig,
}

impl TriggerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let launcher = LauncherConfig {
            task_definition: required(ENV_TASK_DEFINITION)?,
            cluster: required(ENV_CLUSTER_NAME)?,
            subnets: split_list(ENV_SUBNETS, &required(ENV_SUBNETS)?)?,
            security_groups: split_list(ENV_SECURITY_GROUPS, &required(ENV_SECURITY_GROUPS)?)?,
        };

        let github_api_url = match lookup(ENV_GITHUB_API_URL) {
            Some(value) if !value.trim().is_empty() => validate_url(ENV_GITHUB_API_URL, &value)?,
            _ => DEFAULT_GITHUB_API_URL.to_string(),
        };

        Ok(Self {
            region: required(ENV_REGION)?,
            secret_name: required(ENV_SECRETS_NAME)?,
            github_api_url,
            launcher,
        })
    }
}

fn split_list(name: &'static str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let values: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    if values.is_empty() {
        return Err(ConfigError::EmptyList(name));
    }
    Ok(values)
}

fn validate_url(name: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidUrl {
            name,
            value: raw.to_string(),
        })
    }
}

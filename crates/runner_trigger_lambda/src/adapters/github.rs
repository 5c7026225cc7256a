use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use runner_trigger_core::error::TriggerError;
use serde::Deserialize;

use crate::adapters::registration::RegistrationTokenIssuer;

pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
pub const GITHUB_API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
pub const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("runner-trigger/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct RegistrationTokenResponse {
    token: Option<String>,
}

/// Calls the GitHub REST API `actions/runners/registration-token` endpoint.
pub struct GithubRegistrationClient {
    http: reqwest::Client,
    api_base: String,
}

impl GithubRegistrationClient {
    pub fn new(api_base: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(http, api_base))
    }

    pub fn with_client(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn registration_url(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/repos/{owner}/{repo}/actions/runners/registration-token",
            self.api_base
        )
    }
}

#[async_trait]
impl RegistrationTokenIssuer for GithubRegistrationClient {
    async fn registration_token(
        &self,
        access_token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<String, TriggerError> {
        let response = self
            .http
            .post(self.registration_url(owner, repo))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .header(GITHUB_API_VERSION_HEADER, GITHUB_API_VERSION)
            .send()
            .await
            .map_err(|error| TriggerError::RegistrationToken {
                status: None,
                body: format!("request failed: {error}"),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| TriggerError::RegistrationToken {
                status: Some(status.as_u16()),
                body: format!("failed to read response body: {error}"),
            })?;

        if status != StatusCode::CREATED {
            return Err(TriggerError::RegistrationToken {
                status: Some(status.as_u16()),
                body,
            });
        }

        parse_registration_token(status.as_u16(), &body)
    }
}

fn parse_registration_token(status: u16, body: &str) -> Result<String, TriggerError> {
    let parsed: RegistrationTokenResponse =
        serde_json::from_str(body).map_err(|error| TriggerError::RegistrationToken {
            status: Some(status),
            body: format!("invalid JSON response: {error}"),
        })?;

    match parsed.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(TriggerError::RegistrationToken {
            status: Some(status),
            body: "response did not contain a token".to_string(),
        }),
    }
}

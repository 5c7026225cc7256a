use async_trait::async_trait;
use runner_trigger_core::config::LauncherConfig;
use runner_trigger_core::contract::{
    ContainerOverride, EnvironmentEntry, LaunchedTask, RunTaskRequest, ENV_OWNER,
    ENV_REGISTRATION_TOKEN, ENV_REPO, ENV_RUNNER_NAME, FARGATE_LAUNCH_TYPE,
    LATEST_PLATFORM_VERSION, RUNNER_CONTAINER_NAME,
};
use runner_trigger_core::error::TriggerError;
use tracing::debug;

use crate::adapters::registration::RegistrationTokenIssuer;
use crate::adapters::task_runner::TaskRunner;

/// Provisions one ephemeral runner for a repository.
#[async_trait]
pub trait RunnerLauncher: Send + Sync {
    async fn launch(
        &self,
        access_token: &str,
        runner_name: &str,
        owner: &str,
        repo: &str,
        region: &str,
    ) -> Result<LaunchedTask, TriggerError>;
}

/// Registration-token exchange followed by a single task submission.
///
/// If submission fails after a token was issued, the token is left to
/// expire on its own.
pub struct TaskLauncher<'a> {
    issuer: &'a dyn RegistrationTokenIssuer,
    runner: &'a dyn TaskRunner,
    config: &'a LauncherConfig,
}

impl<'a> TaskLauncher<'a> {
    pub fn new(
        issuer: &'a dyn RegistrationTokenIssuer,
        runner: &'a dyn TaskRunner,
        config: &'a LauncherConfig,
    ) -> Self {
        Self {
            issuer,
            runner,
            config,
        }
    }
}

#[async_trait]
impl RunnerLauncher for TaskLauncher<'_> {
    async fn launch(
        &self,
        access_token: &str,
        runner_name: &str,
        owner: &str,
        repo: &str,
        region: &str,
    ) -> Result<LaunchedTask, TriggerError> {
        let registration_token = self
            .issuer
            .registration_token(access_token, owner, repo)
            .await?;
        debug!(owner, repo, "registration token issued");

        let request = build_run_task_request(
            self.config,
            region,
            &registration_token,
            runner_name,
            owner,
            repo,
        );
        self.runner.run_task(&request).await
    }
}

pub fn build_run_task_request(
    config: &LauncherConfig,
    region: &str,
    registration_token: &str,
    runner_name: &str,
    owner: &str,
    repo: &str,
) -> RunTaskRequest {
    RunTaskRequest {
        region: region.to_string(),
        task_definition: config.task_definition.clone(),
        cluster: config.cluster.clone(),
        launch_type: FARGATE_LAUNCH_TYPE.to_string(),
        platform_version: LATEST_PLATFORM_VERSION.to_string(),
        count: 1,
        subnets: config.subnets.clone(),
        security_groups: config.security_groups.clone(),
        assign_public_ip: true,
        container_override: ContainerOverride {
            name: RUNNER_CONTAINER_NAME.to_string(),
            environment: vec![
                EnvironmentEntry::new(ENV_REGISTRATION_TOKEN, registration_token),
                EnvironmentEntry::new(ENV_RUNNER_NAME, runner_name),
                EnvironmentEntry::new(ENV_REPO, repo),
                EnvironmentEntry::new(ENV_OWNER, owner),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    struct FixedIssuer {
        result: Result<String, u16>,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl FixedIssuer {
        fn new(result: Result<String, u16>) -> Self {
            Self {
                result,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RegistrationTokenIssuer for FixedIssuer {
        async fn registration_token(
            &self,
            access_token: &str,
            owner: &str,
            repo: &str,
        ) -> Result<String, TriggerError> {
            self.calls.lock().expect("poisoned mutex").push((
                access_token.to_string(),
                owner.to_string(),
                repo.to_string(),
            ));
            self.result
                .clone()
                .map_err(|status| TriggerError::RegistrationToken {
                    status: Some(status),
                    body: "{}".to_string(),
                })
        }
    }

    struct CapturingRunner {
        requests: Mutex<Vec<RunTaskRequest>>,
        fail: bool,
    }

    impl CapturingRunner {
        fn new(fail: bool) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail,
            }
        }

        fn requests(&self) -> Vec<RunTaskRequest> {
            self.requests.lock().expect("poisoned mutex").clone()
        }
    }

    #[async_trait]
    impl TaskRunner for CapturingRunner {
        async fn run_task(&self, request: &RunTaskRequest) -> Result<LaunchedTask, TriggerError> {
            self.requests
                .lock()
                .expect("poisoned mutex")
                .push(request.clone());
            if self.fail {
                return Err(TriggerError::TaskLaunch(
                    "orchestrator returned no tasks".to_string(),
                ));
            }
            Ok(LaunchedTask {
                task_arn: Some("arn:task".to_string()),
                ..LaunchedTask::default()
            })
        }
    }

    fn config() -> LauncherConfig {
        LauncherConfig {
            task_definition: "runner:3".to_string(),
            cluster: "runners".to_string(),
            subnets: vec!["subnet-a".to_string()],
            security_groups: vec!["sg-1".to_string(), "sg-2".to_string()],
        }
    }

    #[tokio::test]
    async fn submits_task_with_registration_token_and_identity() {
        let issuer = FixedIssuer::new(Ok("reg-token".to_string()));
        let runner = CapturingRunner::new(false);
        let config = config();
        let launcher = TaskLauncher::new(&issuer, &runner, &config);

        let task = launcher
            .launch("p", "ecs-runner-42", "acme", "repo", "eu-central-1")
            .await
            .expect("launch should succeed");

        assert_eq!(task.task_arn.as_deref(), Some("arn:task"));
        assert_eq!(
            issuer.calls.lock().expect("poisoned mutex").clone(),
            vec![("p".to_string(), "acme".to_string(), "repo".to_string())]
        );

        let requests = runner.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.region, "eu-central-1");
        assert_eq!(request.launch_type, "FARGATE");
        assert_eq!(request.platform_version, "LATEST");
        assert_eq!(request.count, 1);
        assert!(request.assign_public_ip);
        assert_eq!(request.security_groups, vec!["sg-1", "sg-2"]);
        assert_eq!(request.container_override.name, "runner");
        assert_eq!(
            request.container_override.environment,
            vec![
                EnvironmentEntry::new("GITHUB_REGISTRATION_TOKEN", "reg-token"),
                EnvironmentEntry::new("GITHUB_RUNNER_NAME", "ecs-runner-42"),
                EnvironmentEntry::new("GITHUB_REPO", "repo"),
                EnvironmentEntry::new("GITHUB_OWNER", "acme"),
            ]
        );
    }

    #[tokio::test]
    async fn registration_failure_skips_task_submission() {
        let issuer = FixedIssuer::new(Err(401));
        let runner = CapturingRunner::new(false);
        let config = config();
        let launcher = TaskLauncher::new(&issuer, &runner, &config);

        let error = launcher
            .launch("p", "ecs-runner-1", "acme", "repo", "eu-central-1")
            .await
            .expect_err("registration failure should propagate");

        assert!(matches!(
            error,
            TriggerError::RegistrationToken {
                status: Some(401),
                ..
            }
        ));
        assert!(runner.requests().is_empty());
    }

    #[tokio::test]
    async fn submission_failure_propagates_after_token_issued() {
        let issuer = FixedIssuer::new(Ok("reg-token".to_string()));
        let runner = CapturingRunner::new(true);
        let config = config();
        let launcher = TaskLauncher::new(&issuer, &runner, &config);

        let error = launcher
            .launch("p", "ecs-runner-1", "acme", "repo", "eu-central-1")
            .await
            .expect_err("submission failure should propagate");

        assert!(matches!(error, TriggerError::TaskLaunch(_)));
        assert_eq!(runner.requests().len(), 1);
    }
}

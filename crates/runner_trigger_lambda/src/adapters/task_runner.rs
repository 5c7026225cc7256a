use async_trait::async_trait;
use runner_trigger_core::contract::{LaunchedTask, RunTaskRequest};
use runner_trigger_core::error::TriggerError;

#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Submits the task and returns the first task the orchestrator accepted.
    async fn run_task(&self, request: &RunTaskRequest) -> Result<LaunchedTask, TriggerError>;
}

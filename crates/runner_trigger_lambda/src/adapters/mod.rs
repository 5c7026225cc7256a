pub mod ecs;
pub mod github;
pub mod registration;
pub mod secret_store;
pub mod secrets_manager;
pub mod task_runner;

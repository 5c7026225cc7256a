//! Shared domain primitives for the ECS runner trigger.
//!
//! This crate owns webhook parsing, signature verification, configuration and
//! the request/response contracts. It intentionally excludes AWS SDK, Lambda
//! runtime and HTTP client concerns, which live in `runner_trigger_lambda`.

pub mod config;
pub mod contract;
pub mod error;
pub mod event;
pub mod signature;

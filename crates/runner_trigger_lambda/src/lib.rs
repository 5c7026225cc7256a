//! AWS-oriented adapters and the webhook handler for the ECS runner trigger.
//!
//! This crate owns runtime integration details (Lambda handler, Secrets
//! Manager, ECS and GitHub clients). Domain contracts, parsing and signature
//! checks come from `runner_trigger_core`.

pub mod adapters;
pub mod handlers;
pub mod launcher;
pub mod observability;

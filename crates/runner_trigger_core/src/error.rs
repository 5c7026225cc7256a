use thiserror::Error;

/// Failure of a single webhook invocation.
///
/// None of these are recovered locally: every variant aborts the invocation.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("malformed webhook event: {0}")]
    MalformedEvent(String),

    #[error("GitHub request signatures didn't match")]
    Authentication,

    #[error("failed to retrieve secret {secret_name}: {reason}")]
    SecretRetrieval { secret_name: String, reason: String },

    #[error("registration token request failed: status_code={}, detail={body}", display_status(.status))]
    RegistrationToken { status: Option<u16>, body: String },

    #[error("failed to launch runner task: {0}")]
    TaskLaunch(String),
}

impl TriggerError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEvent(message.into())
    }

    pub fn secret_retrieval(secret_name: &str, reason: impl Into<String>) -> Self {
        Self::SecretRetrieval {
            secret_name: secret_name.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable identifier used as the `error_kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) => "malformed_event",
            Self::Authentication => "authentication",
            Self::SecretRetrieval { .. } => "secret_retrieval",
            Self::RegistrationToken { .. } => "registration_token",
            Self::TaskLaunch(_) => "task_launch",
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

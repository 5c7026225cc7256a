use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::contract::{WebhookEvent, SIGNATURE_HEADER};
use crate::error::TriggerError;

#[derive(Debug, Deserialize)]
struct WorkflowJobPayload {
    action: String,
    workflow_job: WorkflowJobRef,
    repository: RepositoryRef,
}

#[derive(Debug, Deserialize)]
struct WorkflowJobRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RepositoryRef {
    full_name: String,
}

/// Extracts a [`WebhookEvent`] from an API Gateway / function URL proxy event.
pub fn parse_webhook_event(event: &Value) -> Result<WebhookEvent, TriggerError> {
    let Some(object) = event.as_object() else {
        return Err(TriggerError::malformed("event must be a JSON object"));
    };

    let raw_body = raw_body(object)?;
    let payload: WorkflowJobPayload = serde_json::from_slice(&raw_body)
        .map_err(|error| TriggerError::malformed(format!("invalid workflow_job body: {error}")))?;
    let (owner, repo) = split_full_name(&payload.repository.full_name)?;
    let signature = header_value(object, SIGNATURE_HEADER)?;

    Ok(WebhookEvent {
        action: payload.action,
        job_id: payload.workflow_job.id,
        owner,
        repo,
        signature,
        raw_body,
    })
}

fn raw_body(object: &Map<String, Value>) -> Result<Vec<u8>, TriggerError> {
    let body = match object.get("body") {
        Some(Value::String(text)) => text,
        Some(Value::Null) | None => return Err(TriggerError::malformed("missing body")),
        Some(_) => return Err(TriggerError::malformed("body must be a string")),
    };

    let is_base64 = object
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if is_base64 {
        BASE64
            .decode(body)
            .map_err(|error| TriggerError::malformed(format!("invalid base64 body: {error}")))
    } else {
        Ok(body.as_bytes().to_vec())
    }
}

fn split_full_name(full_name: &str) -> Result<(String, String), TriggerError> {
    match full_name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(TriggerError::malformed(format!(
            "repository.full_name must be <owner>/<repo>, got {full_name:?}"
        ))),
    }
}

// Header names are matched case-insensitively.
fn header_value(object: &Map<String, Value>, name: &str) -> Result<String, TriggerError> {
    let headers = object
        .get("headers")
        .and_then(Value::as_object)
        .ok_or_else(|| TriggerError::malformed("missing headers"))?;

    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| TriggerError::malformed(format!("missing {name} header")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const BODY: &str =
        r#"{"action":"queued","workflow_job":{"id":42},"repository":{"full_name":"acme/repo"}}"#;

    fn proxy_event(body: &str) -> Value {
        json!({
            "body": body,
            "headers": {"x-hub-signature-256": "sha256=abc"},
            "isBase64Encoded": false
        })
    }

    #[test]
    fn extracts_job_fields_and_keeps_raw_body() {
        let event = parse_webhook_event(&proxy_event(BODY)).expect("event should parse");

        assert_eq!(
            event,
            WebhookEvent {
                action: "queued".to_string(),
                job_id: 42,
                owner: "acme".to_string(),
                repo: "repo".to_string(),
                signature: "sha256=abc".to_string(),
                raw_body: BODY.as_bytes().to_vec(),
            }
        );
        assert!(event.is_queued());
        assert_eq!(event.runner_name(), "ecs-runner-42");
    }

    #[test]
    fn raw_body_is_not_reserialized() {
        let spaced = "{ \"action\" : \"completed\", \"workflow_job\": {\"id\": 1},\n  \"repository\": {\"full_name\": \"o/r\"} }";
        let event = parse_webhook_event(&proxy_event(spaced)).expect("event should parse");

        assert_eq!(event.raw_body, spaced.as_bytes());
    }

    #[test]
    fn decodes_base64_bodies() {
        let event = json!({
            "body": BASE64.encode(BODY),
            "headers": {"x-hub-signature-256": "sha256=abc"},
            "isBase64Encoded": true
        });

        let parsed = parse_webhook_event(&event).expect("event should parse");
        assert_eq!(parsed.raw_body, BODY.as_bytes());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let event = json!({
            "body": BODY,
            "headers": {"X-Hub-Signature-256": "sha256=def"}
        });

        let parsed = parse_webhook_event(&event).expect("event should parse");
        assert_eq!(parsed.signature, "sha256=def");
    }

    #[test]
    fn rejects_missing_signature_header() {
        let event = json!({"body": BODY, "headers": {"content-type": "application/json"}});

        let error = parse_webhook_event(&event).expect_err("missing header should fail");
        assert!(error.to_string().contains("x-hub-signature-256"));
    }

    #[test]
    fn rejects_missing_job_id() {
        let body = r#"{"action":"queued","workflow_job":{},"repository":{"full_name":"acme/repo"}}"#;

        let error = parse_webhook_event(&proxy_event(body)).expect_err("missing id should fail");
        assert!(matches!(error, TriggerError::MalformedEvent(_)));
    }

    #[test]
    fn rejects_non_json_body() {
        let error = parse_webhook_event(&proxy_event("payload=%7B%7D"))
            .expect_err("form-encoded body should fail");
        assert!(error.to_string().contains("invalid workflow_job body"));
    }

    #[test]
    fn rejects_object_body() {
        let event = json!({
            "body": {"action": "queued"},
            "headers": {"x-hub-signature-256": "sha256=abc"}
        });

        let error = parse_webhook_event(&event).expect_err("object body should fail");
        assert!(error.to_string().contains("body must be a string"));
    }

    #[test]
    fn rejects_full_name_without_owner() {
        for full_name in ["repo", "/repo", "acme/", "acme/repo/extra"] {
            let body = format!(
                r#"{{"action":"queued","workflow_job":{{"id":1}},"repository":{{"full_name":"{full_name}"}}}}"#
            );
            assert!(
                parse_webhook_event(&proxy_event(&body)).is_err(),
                "{full_name} should be rejected"
            );
        }
    }
}

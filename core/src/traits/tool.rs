use crate::sandbox::SandboxError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// What a tool invocation produced, after the dispatcher has contained any
/// failure. Either way it renders to the JSON text carried by the tool
/// message, so the model always gets something to read.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

impl ToolOutcome {
    pub fn success(value: Value) -> Self {
        Self::Success(value)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Success(value) => value.clone(),
            Self::Failure(message) => json!({ "error": message }),
        }
    }

    /// Compact JSON for the tool message content.
    pub fn to_content(&self) -> String {
        self.to_value().to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("missing configuration: {0}")]
    Configuration(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport { status: Option<u16>, message: String },

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

impl ToolError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<Value, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_content_is_raw_json() {
        let outcome = ToolOutcome::success(json!({"logs": [], "result": 4}));
        assert_eq!(outcome.to_content(), r#"{"logs":[],"result":4}"#);
        assert!(!outcome.is_failure());
    }

    #[test]
    fn failure_content_wraps_message() {
        let outcome = ToolOutcome::failure("missing configuration: search api key");
        assert_eq!(
            outcome.to_content(),
            r#"{"error":"missing configuration: search api key"}"#
        );
        assert!(outcome.is_failure());
    }

    #[test]
    fn transport_error_display_includes_status() {
        let with_status = ToolError::transport(Some(403), "backend refused");
        assert_eq!(
            with_status.to_string(),
            "transport error (status 403): backend refused"
        );
        let without = ToolError::transport(None, "connection reset");
        assert_eq!(without.to_string(), "transport error: connection reset");
    }
}

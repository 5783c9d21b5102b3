use crate::sandbox::SandboxExecutor;
use crate::tools::{extract_string_arg, extract_u64_arg_opt};
use crate::traits::{Tool, ToolError};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Sandboxed code evaluation. Each call runs in a fresh worker process
/// under a hard deadline; the success value carries the worker's captured
/// logs alongside the result.
pub struct EvaluateTool {
    executor: SandboxExecutor,
    default_timeout_ms: u64,
}

impl EvaluateTool {
    pub fn new(executor: SandboxExecutor) -> Self {
        Self {
            executor,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }
}

#[async_trait]
impl Tool for EvaluateTool {
    fn name(&self) -> &str {
        "evaluate"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression in a sandboxed worker; echo(..) captures log lines"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Expression to evaluate, e.g. echo(2 + 2)"
                },
                "timeout_ms": {
                    "type": "number",
                    "description": "Evaluation budget in milliseconds (default 2000)"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let code = extract_string_arg(&args, "code")?;
        let timeout_ms = extract_u64_arg_opt(&args, "timeout_ms", self.default_timeout_ms);

        let evaluation = self
            .executor
            .run(&code, Duration::from_millis(timeout_ms))
            .await?;
        Ok(match evaluation.result {
            Some(result) => json!({"logs": evaluation.logs, "result": result}),
            None => json!({"logs": evaluation.logs}),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_code() {
        let tool = EvaluateTool::new(SandboxExecutor::new("/nonexistent"));
        assert_eq!(tool.parameters_schema()["required"], json!(["code"]));
        assert_eq!(tool.name(), "evaluate");
    }

    #[tokio::test]
    async fn missing_code_is_invalid_arguments() {
        let tool = EvaluateTool::new(SandboxExecutor::new("/nonexistent"));
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn unspawnable_worker_surfaces_as_sandbox_error() {
        let tool = EvaluateTool::new(SandboxExecutor::new("/nonexistent/worker/bin"));
        let err = tool.execute(json!({"code": "2+2"})).await.unwrap_err();
        assert!(matches!(err, ToolError::Sandbox(_)));
    }
}

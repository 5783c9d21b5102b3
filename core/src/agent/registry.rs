use crate::traits::{Tool, ToolCall, ToolError, ToolOutcome, ToolSpec};
use serde_json::{Value, json};
use std::sync::Arc;

/// The closed set of tools the model may call. Registration happens while
/// the host still holds the registry exclusively; after that the set never
/// changes for the life of the session.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn resolve(&self, name: &str) -> Result<&Arc<dyn Tool>, ToolError> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Run one requested call to completion. Every failure along the way,
    /// unknown name, bad arguments, tool error, sandbox timeout, becomes a
    /// `ToolOutcome::Failure` the model can read; nothing escapes as an
    /// error from here.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        let args = decode_arguments(&call.arguments);
        let tool = match self.resolve(&call.name) {
            Ok(tool) => Arc::clone(tool),
            Err(err) => {
                tracing::warn!(name = %call.name, "model requested an unregistered tool");
                return ToolOutcome::failure(err.to_string());
            }
        };
        tracing::debug!(name = %call.name, id = %call.id, "dispatching tool call");
        match tool.execute(args).await {
            Ok(value) => ToolOutcome::success(value),
            Err(err) => ToolOutcome::failure(err.to_string()),
        }
    }
}

/// Tool-call arguments arrive as opaque text that should decode to a JSON
/// object. Anything else is substituted with `{}` so the tool itself gets
/// to report what is missing, and the substitution is logged rather than
/// silently swallowed.
fn decode_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            tracing::warn!(arguments = %other, "tool arguments are not a JSON object, substituting {{}}");
            json!({})
        }
        Err(err) => {
            tracing::warn!(error = %err, arguments = raw, "malformed tool arguments, substituting {{}}");
            json!({})
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingTool {
        seen: Mutex<Vec<Value>>,
    }

    impl RecordingTool {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Tool for RecordingTool {
        fn name(&self) -> &str {
            "record"
        }

        fn description(&self) -> &str {
            "records its arguments"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, args: Value) -> Result<Value, ToolError> {
            self.seen.lock().unwrap().push(args.clone());
            Ok(json!({"ok": true}))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: Value) -> Result<Value, ToolError> {
            Err(ToolError::Configuration("backend not configured".into()))
        }
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[test]
    fn specs_cover_registered_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(RecordingTool::new()));
        registry.register(Arc::new(FailingTool));
        let names: Vec<String> = registry.get_specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["record", "broken"]);
    }

    #[test]
    fn resolve_unknown_tool_fails() {
        let registry = ToolRegistry::new();
        let err = registry.resolve("bogus").err().unwrap();
        assert!(matches!(&err, ToolError::UnknownTool(_)));
        assert_eq!(err.to_string(), "unknown tool 'bogus'");
    }

    #[tokio::test]
    async fn dispatch_contains_unknown_tool() {
        let registry = ToolRegistry::new();
        let outcome = registry.dispatch(&call("bogus", "{}")).await;
        assert!(outcome.is_failure());
        assert_eq!(outcome.to_content(), r#"{"error":"unknown tool 'bogus'"}"#);
    }

    #[tokio::test]
    async fn dispatch_contains_tool_failures() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FailingTool));
        let outcome = registry.dispatch(&call("broken", "{}")).await;
        assert_eq!(
            outcome.to_content(),
            r#"{"error":"missing configuration: backend not configured"}"#
        );
    }

    #[tokio::test]
    async fn malformed_arguments_become_empty_object() {
        let tool = Arc::new(RecordingTool::new());
        let mut registry = ToolRegistry::new();
        registry.register(Arc::clone(&tool) as Arc<dyn Tool>);

        let outcome = registry.dispatch(&call("record", "definitely not json")).await;
        assert!(!outcome.is_failure());
        assert_eq!(*tool.seen.lock().unwrap(), vec![json!({})]);
    }

    #[tokio::test]
    async fn non_object_arguments_become_empty_object() {
        let tool = Arc::new(RecordingTool::new());
        let mut registry = ToolRegistry::new();
        registry.register(Arc::clone(&tool) as Arc<dyn Tool>);

        registry.dispatch(&call("record", "5")).await;
        registry.dispatch(&call("record", "")).await;
        assert_eq!(*tool.seen.lock().unwrap(), vec![json!({}), json!({})]);
    }

    #[tokio::test]
    async fn well_formed_arguments_pass_through() {
        let tool = Arc::new(RecordingTool::new());
        let mut registry = ToolRegistry::new();
        registry.register(Arc::clone(&tool) as Arc<dyn Tool>);

        registry
            .dispatch(&call("record", r#"{"query": "rust"}"#))
            .await;
        assert_eq!(*tool.seen.lock().unwrap(), vec![json!({"query": "rust"})]);
    }
}

use crate::traits::ToolError;
use serde_json::Value;

pub mod evaluate;
pub mod proxy;
pub mod search;

pub use evaluate::EvaluateTool;
pub use proxy::ProxyTool;
pub use search::WebSearchTool;

pub fn extract_string_arg(args: &Value, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing '{key}' parameter")))
}

pub fn extract_string_arg_opt(args: &Value, key: &str, default: &str) -> String {
    args.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .to_string()
}

// Models sometimes send numbers as floats; treat 5.0 as 5 rather than
// falling back to the default.
pub fn extract_u64_arg_opt(args: &Value, key: &str, default: u64) -> u64 {
    args.get(key)
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
        .unwrap_or(default)
}

pub mod executor;
pub mod worker;

pub use executor::{SandboxError, SandboxExecutor};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire format between the executor and a worker process: one request line
/// in, one response line out, then the worker exits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerResponse {
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A successful evaluation: captured logs in call order, plus the final
/// value when it has a JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

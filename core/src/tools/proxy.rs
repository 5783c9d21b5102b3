use crate::tools::{extract_string_arg, extract_string_arg_opt};
use crate::traits::{Tool, ToolError};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Relays JSON requests through a configured proxy base URL, attaching the
/// configured token verbatim as the Authorization header. Gives the model
/// a doorway to whatever sits behind the proxy without holding any
/// credentials itself.
pub struct ProxyTool {
    client: reqwest::Client,
    base_url: Option<String>,
    token: Option<String>,
}

impl ProxyTool {
    pub fn new(base_url: Option<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }
}

fn join_url(base: &str, endpoint: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), endpoint)
}

fn decode_body(text: String) -> Value {
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(_) => json!({ "raw": text }),
    }
}

#[async_trait]
impl Tool for ProxyTool {
    fn name(&self) -> &str {
        "proxy_call"
    }

    fn description(&self) -> &str {
        "Send a GET or POST request with a JSON payload through the configured proxy endpoint"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "endpoint": {
                    "type": "string",
                    "description": "Path under the proxy base URL, e.g. /usage"
                },
                "payload": {
                    "type": "object",
                    "description": "JSON body for POST requests (default {})"
                },
                "method": {
                    "type": "string",
                    "enum": ["GET", "POST"],
                    "description": "HTTP method (default POST)"
                }
            },
            "required": ["endpoint"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let endpoint = extract_string_arg(&args, "endpoint")?;
        let method = extract_string_arg_opt(&args, "method", "POST").to_uppercase();
        if method != "GET" && method != "POST" {
            return Err(ToolError::InvalidArguments(
                "method must be GET or POST".to_string(),
            ));
        }
        let payload = args.get("payload").cloned().unwrap_or_else(|| json!({}));

        let base = self
            .base_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ToolError::Configuration("proxy base url is not configured".to_string())
            })?;
        let url = join_url(base, &endpoint);

        let request = if method == "GET" {
            self.client.get(&url)
        } else {
            self.client.post(&url).json(&payload)
        };
        let request = match self.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => request.header("Authorization", token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ToolError::transport(None, e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ToolError::transport(None, e.to_string()))?;

        if !status.is_success() {
            // The body goes back verbatim so the model can see what the
            // upstream actually said.
            return Err(ToolError::transport(Some(status.as_u16()), text));
        }
        Ok(decode_body(text))
    }
}

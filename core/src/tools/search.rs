use crate::tools::{extract_string_arg, extract_u64_arg_opt};
use crate::traits::{Tool, ToolError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const DEFAULT_TOP_K: u64 = 5;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Web search over a Google Custom Search style endpoint. Credentials are
/// optional at construction so the tool can always be registered; an
/// unconfigured call fails with a contained configuration error the model
/// gets to read.
pub struct WebSearchTool {
    client: reqwest::Client,
    api_key: Option<String>,
    engine_id: Option<String>,
    base_url: String,
}

impl WebSearchTool {
    pub fn new(api_key: Option<String>, engine_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            engine_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn credentials(&self) -> Result<(&str, &str), ToolError> {
        match (self.api_key.as_deref(), self.engine_id.as_deref()) {
            (Some(key), Some(cx)) if !key.is_empty() && !cx.is_empty() => Ok((key, cx)),
            _ => Err(ToolError::Configuration(
                "search api key and engine id are required".to_string(),
            )),
        }
    }
}

fn requested_top_k(args: &Value) -> u64 {
    extract_u64_arg_opt(args, "top_k", DEFAULT_TOP_K).clamp(1, 10)
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web and return the top results as title, link, and snippet"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "top_k": {
                    "type": "number",
                    "description": "How many results to return, 1 to 10 (default 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let query = extract_string_arg(&args, "query")?;
        let top_k = requested_top_k(&args);
        let (key, cx) = self.credentials()?;
        let num = top_k.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query.as_str()),
                ("key", key),
                ("cx", cx),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ToolError::transport(None, e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::transport(
                Some(response.status().as_u16()),
                "search backend returned an error",
            ));
        }

        let decoded: SearchResponse = response
            .json()
            .await
            .map_err(|e| ToolError::transport(None, format!("undecodable search response: {e}")))?;

        let items: Vec<Value> = decoded
            .items
            .into_iter()
            .map(|item| {
                json!({
                    "title": item.title,
                    "link": item.link,
                    "snippet": item.snippet,
                })
            })
            .collect();
        Ok(Value::Array(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_clamps_to_backend_range() {
        assert_eq!(requested_top_k(&json!({})), 5);
        assert_eq!(requested_top_k(&json!({"top_k": 0})), 1);
        assert_eq!(requested_top_k(&json!({"top_k": 3})), 3);
        assert_eq!(requested_top_k(&json!({"top_k": 25})), 10);
    }

    #[test]
    fn schema_requires_query() {
        let tool = WebSearchTool::new(None, None);
        let schema = tool.parameters_schema();
        assert_eq!(schema["required"], json!(["query"]));
    }

    #[tokio::test]
    async fn unconfigured_search_is_a_configuration_error() {
        let tool = WebSearchTool::new(None, Some("cx".to_string()));
        let err = tool.execute(json!({"query": "rust"})).await.unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));
    }

    #[tokio::test]
    async fn missing_query_is_invalid_arguments() {
        let tool = WebSearchTool::new(Some("key".to_string()), Some("cx".to_string()));
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn decodes_result_items() {
        let raw = r#"{"items": [{"title": "Rust", "link": "https://rust-lang.org", "snippet": "A language"}], "kind": "customsearch#search"}"#;
        let decoded: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].title, "Rust");
    }

    #[test]
    fn missing_items_decodes_empty() {
        let decoded: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(decoded.items.is_empty());
    }
}

pub mod provider;
pub mod tool;

pub use provider::{
    ChatMessage, ChatRequest, ChatResponse, Provider, ProviderError, Role, ToolCall,
};
pub use tool::{Tool, ToolError, ToolOutcome, ToolSpec};

pub mod agent;
pub mod config;
pub mod conversation;
pub mod providers;
pub mod sandbox;
pub mod tools;
pub mod traits;

pub use agent::{AgentLoop, ToolRegistry, TurnEvent, TurnOutcome};
pub use config::*;
pub use conversation::Conversation;
pub use providers::*;
pub use sandbox::{Evaluation, SandboxError, SandboxExecutor};
pub use tools::*;
pub use traits::*;

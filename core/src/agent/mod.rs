pub mod loop_;
pub mod registry;

pub use loop_::{
    AgentLoop, DEFAULT_MAX_TOOL_LOOPS, LOOP_STOP_MESSAGE, TurnEvent, TurnOutcome,
    default_system_prompt,
};
pub use registry::ToolRegistry;

use crate::agent::ToolRegistry;
use crate::conversation::Conversation;
use crate::traits::{ChatMessage, ChatRequest, Provider, ProviderError, ToolOutcome};
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_MAX_TOOL_LOOPS: usize = 6;

/// Appended as the terminal assistant message when a turn is cut off by
/// the loop bound, so the transcript itself records the stop.
pub const LOOP_STOP_MESSAGE: &str = "[Stopped after max tool loops]";

const SYSTEM_PROMPT: &str = "You are a helpful command-line agent. Think step by step, and \
when external information or computation would help, use the available tools via function \
calls. Prefer short, clear answers.";

pub fn default_system_prompt() -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M (%A)");
    format!("{SYSTEM_PROMPT}\n\nCurrent time: {now}")
}

/// Something the host may want to render while a turn is in flight.
/// Assistant narration for a round is always emitted before that round's
/// tool results, and tool results arrive in dispatch order.
#[derive(Debug)]
pub enum TurnEvent<'a> {
    Assistant(&'a str),
    ToolResult {
        name: &'a str,
        outcome: &'a ToolOutcome,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The model answered without requesting more tools.
    Final(String),
    /// The loop bound cut the turn off; a soft stop, not an error.
    MaxToolLoops,
}

/// Drives one conversation against a model endpoint: send the transcript,
/// run whatever tools the model asks for, feed the results back, repeat
/// until the model stops asking or the loop bound trips. Tool failures are
/// contained as tool-message content; only a provider failure aborts a
/// turn.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    conversation: Conversation,
    max_tool_loops: usize,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            registry,
            conversation: Conversation::new(default_system_prompt()),
            max_tool_loops: DEFAULT_MAX_TOOL_LOOPS,
        }
    }

    /// Replaces the seeded system message. Intended for setup, before the
    /// first turn runs.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.conversation = Conversation::new(prompt);
        self
    }

    pub fn with_max_tool_loops(mut self, max: usize) -> Self {
        self.max_tool_loops = max;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub async fn run_turn(&mut self, user_text: &str) -> Result<TurnOutcome, ProviderError> {
        self.run_turn_with_events(user_text, |_| {}).await
    }

    pub async fn run_turn_with_events(
        &mut self,
        user_text: &str,
        mut on_event: impl FnMut(TurnEvent<'_>),
    ) -> Result<TurnOutcome, ProviderError> {
        self.conversation.append(ChatMessage::user(user_text));
        let mut loops = 0;

        loop {
            let tools = self.registry.get_specs();
            let request = ChatRequest {
                messages: self.conversation.snapshot(),
                tools: if tools.is_empty() { None } else { Some(&tools) },
            };
            let response = self.provider.chat(request).await?;

            if let Some(text) = response.text.as_deref()
                && !text.is_empty()
            {
                on_event(TurnEvent::Assistant(text));
            }

            if !response.has_tool_calls() {
                let content = response.text.unwrap_or_default();
                self.conversation
                    .append(ChatMessage::assistant(content.clone()));
                return Ok(TurnOutcome::Final(content));
            }

            // The assistant message carrying the calls goes in first, so
            // every tool message that follows pairs with the id set of the
            // message immediately before it.
            self.conversation
                .append(ChatMessage::assistant_with_tool_calls(
                    response.text.clone().unwrap_or_default(),
                    response.tool_calls.clone(),
                ));

            for call in &response.tool_calls {
                let outcome = self.registry.dispatch(call).await;
                on_event(TurnEvent::ToolResult {
                    name: &call.name,
                    outcome: &outcome,
                });
                self.conversation
                    .append(ChatMessage::tool_result(call.id.clone(), outcome.to_content()));
            }

            loops += 1;
            if loops >= self.max_tool_loops {
                warn!(loops, "tool loop bound reached, stopping turn");
                self.conversation
                    .append(ChatMessage::assistant(LOOP_STOP_MESSAGE));
                return Ok(TurnOutcome::MaxToolLoops);
            }
        }
    }
}

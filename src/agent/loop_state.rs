//! Agent loop state management
//!
//! Tracks where a conversation loop is: waiting on the model, or done with a
//! final answer. Tool execution happens between two model turns and has no
//! state of its own.

/// Phase of the conversation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Next step is a model call
    AwaitingModel,
    /// A final answer was produced
    Done,
}

/// State of the agent reasoning loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Model calls made so far
    pub turn: usize,
    /// Maximum allowed model calls
    pub max_turns: usize,
    /// Current phase
    pub phase: LoopPhase,
    /// Tool calls dispatched across all turns
    pub tool_calls: usize,
    /// Final answer if the agent has completed reasoning
    pub final_answer: Option<String>,
}

impl AgentLoopState {
    /// Create a new loop state with the given max turns
    pub fn new(max_turns: usize) -> Self {
        Self {
            turn: 0,
            max_turns,
            phase: LoopPhase::AwaitingModel,
            tool_calls: 0,
            final_answer: None,
        }
    }

    /// Check if the loop should make another model call
    pub fn should_continue(&self) -> bool {
        self.phase == LoopPhase::AwaitingModel && self.turn < self.max_turns
    }

    /// Whether the turn budget ran out before a final answer
    pub fn exhausted(&self) -> bool {
        self.phase == LoopPhase::AwaitingModel && self.turn >= self.max_turns
    }

    /// Count a model call
    pub fn next_turn(&mut self) {
        self.turn += 1;
    }

    /// Count dispatched tool calls
    pub fn record_tool_calls(&mut self, count: usize) {
        self.tool_calls += count;
    }

    /// Move to Done with the final answer
    pub fn finish(&mut self, answer: impl Into<String>) {
        self.final_answer = Some(answer.into());
        self.phase = LoopPhase::Done;
    }
}

//! States and transitions of the conversation loop.

use strum::Display;

use crate::error::AgentError;

/// Where the conversation currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LoopState {
    /// Waiting for the operator to type something.
    #[default]
    AwaitUserInput,
    /// Sending the transcript to the model.
    QueryModel,
    /// Running the tool calls from the latest assistant reply.
    InvokeTools,
}

/// What happened while a state ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LoopEvent {
    UserInput,
    ReplyText,
    ReplyToolCalls,
    ModelFailed,
    ToolsFinished,
}

/// The transition function: state × event → next state.
pub fn transition(state: LoopState, event: LoopEvent) -> Result<LoopState, AgentError> {
    use LoopEvent::*;
    use LoopState::*;

    match (state, event) {
        (AwaitUserInput, UserInput) => Ok(QueryModel),
        (QueryModel, ReplyToolCalls) => Ok(InvokeTools),
        (QueryModel, ReplyText) | (QueryModel, ModelFailed) => Ok(AwaitUserInput),
        (InvokeTools, ToolsFinished) => Ok(QueryModel),
        (state, event) => Err(AgentError::InvalidState(format!(
            "no transition from {state} on {event}"
        ))),
    }
}

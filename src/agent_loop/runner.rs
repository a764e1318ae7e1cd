//! The conversation loop: drives the state machine over a transcript.

use tracing::{debug, info, warn};

use super::context::AgentContext;
use super::state::{transition, LoopEvent, LoopState};
use super::tooling::{execute_parallel_tool_calls, execute_tool_call};
use crate::error::{AgentError, Result};
use crate::provider::ProviderRequest;
use crate::types::{AssistantReply, Message, Transcript, Usage};
use crate::util::timeout::with_timeout;

/// Result of running a single state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The loop moved to this state.
    Continue(LoopState),
    /// The operator's input stream ended; the loop is done.
    InputClosed,
}

/// Reads input, queries the model and runs tools until input runs out.
pub struct ConversationLoop {
    ctx: AgentContext,
    state: LoopState,
    transcript: Transcript,
    usage: Usage,
}

impl ConversationLoop {
    pub fn new(ctx: AgentContext) -> Self {
        let mut transcript = Transcript::new();
        if let Some(greeting) = &ctx.greeting {
            transcript.push(Message::assistant(greeting.clone()));
        }
        Self {
            ctx,
            state: LoopState::default(),
            transcript,
            usage: Usage::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Token usage accumulated over every successful query.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn context(&self) -> &AgentContext {
        &self.ctx
    }

    /// Release the context (console, provider) once the loop is finished.
    pub fn into_parts(self) -> (AgentContext, Transcript) {
        (self.ctx, self.transcript)
    }

    /// Outbound message list: system instruction, working-directory notice, then the transcript.
    pub fn build_request(&self) -> ProviderRequest {
        let mut messages = Vec::with_capacity(self.transcript.len() + 2);
        messages.push(Message::system(self.ctx.system_prompt.clone()));
        messages.push(Message::user(self.ctx.working_directory_notice()));
        messages.extend(self.transcript.messages().iter().cloned());

        ProviderRequest {
            messages,
            settings: self.ctx.settings.clone(),
            tools: self.ctx.registry.definitions(),
        }
    }

    /// Run until the operator's input ends.
    ///
    /// Only console I/O failures and broken invariants surface as errors;
    /// model and tool failures become part of the conversation.
    pub async fn run(&mut self) -> Result<()> {
        self.ctx.console.show_banner(self.ctx.provider.model_id())?;
        if let Some(greeting) = &self.ctx.greeting {
            self.ctx.console.show_assistant(greeting)?;
        }

        loop {
            if self.step().await? == StepOutcome::InputClosed {
                info!(
                    messages = self.transcript.len(),
                    total_tokens = self.usage.total_tokens,
                    "input closed, ending conversation"
                );
                return Ok(());
            }
        }
    }

    /// Execute the current state and apply the resulting transition.
    pub async fn step(&mut self) -> Result<StepOutcome> {
        let event = match self.state {
            LoopState::AwaitUserInput => match self.await_user_input().await? {
                Some(event) => event,
                None => return Ok(StepOutcome::InputClosed),
            },
            LoopState::QueryModel => self.query_model().await?,
            LoopState::InvokeTools => self.invoke_tools().await?,
        };

        let next = transition(self.state, event)?;
        debug!(from = %self.state, %event, to = %next, "transition");
        self.state = next;
        Ok(StepOutcome::Continue(next))
    }

    async fn await_user_input(&mut self) -> Result<Option<LoopEvent>> {
        loop {
            let Some(line) = self.ctx.console.read_line().await? else {
                return Ok(None);
            };
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            self.ctx.console.show_user(text)?;
            self.transcript.push(Message::user(text));
            return Ok(Some(LoopEvent::UserInput));
        }
    }

    async fn query_model(&mut self) -> Result<LoopEvent> {
        let request = self.build_request();
        let outcome = {
            let provider = self.ctx.provider.as_ref();
            let request = &request;
            let timeout = self.ctx.request_timeout;
            self.ctx
                .retry
                .execute(move || with_timeout(timeout, provider.generate(request)))
                .await
        };

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "model query failed");
                self.ctx.console.show_error(&err)?;
                return Ok(LoopEvent::ModelFailed);
            }
        };

        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            finish_reason = ?response.finish_reason,
            "model replied"
        );
        self.usage.merge(&response.usage);

        let event = match &response.reply {
            AssistantReply::ToolCalls(calls) if !calls.is_empty() => {
                self.ctx.console.show_tool_calls(calls)?;
                LoopEvent::ReplyToolCalls
            }
            AssistantReply::ToolCalls(_) => {
                // An empty call list carries nothing to run or show.
                LoopEvent::ReplyText
            }
            AssistantReply::Text(text) => {
                self.ctx.console.show_assistant(text)?;
                LoopEvent::ReplyText
            }
        };
        self.transcript.push(response.into_message());
        Ok(event)
    }

    async fn invoke_tools(&mut self) -> Result<LoopEvent> {
        let calls = match self.transcript.last() {
            Some(message @ Message::Assistant { .. }) => message.tool_calls().to_vec(),
            _ => {
                return Err(AgentError::InvalidState(
                    "tool phase entered without a preceding assistant reply".into(),
                ))
            }
        };

        if self.ctx.parallel_tool_calls {
            let results = execute_parallel_tool_calls(&self.ctx.registry, &calls).await;
            for result in results {
                self.ctx.console.show_tool_result(&result)?;
                self.transcript.push(Message::tool_result(result));
            }
        } else {
            for call in &calls {
                let result = execute_tool_call(&self.ctx.registry, call).await;
                self.ctx.console.show_tool_result(&result)?;
                self.transcript.push(Message::tool_result(result));
            }
        }

        debug_assert!(self.transcript.pending_tool_calls().is_empty());
        Ok(LoopEvent::ToolsFinished)
    }
}

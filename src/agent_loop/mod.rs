//! The three-state conversation loop.

pub mod context;
pub mod runner;
pub mod state;
pub mod tooling;

pub use context::{AgentContext, DEFAULT_GREETING};
pub use runner::{ConversationLoop, StepOutcome};
pub use state::{transition, LoopEvent, LoopState};

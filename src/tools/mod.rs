//! Tool system for function calling.

pub mod arguments;
pub mod file_read;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use file_read::{default_tools, FileReadTool, FILE_READ_TOOL_NAME};
pub use registry::ToolRegistry;
pub use tool::Tool;
pub use types::{ToolDefinition, ToolParameters};

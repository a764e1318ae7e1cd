//! The `file_read` tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::arguments::ToolArguments;
use super::tool::Tool;
use super::types::ToolParameters;
use crate::error::AgentError;

pub const FILE_READ_TOOL_NAME: &str = "file_read";

const DESCRIPTION: &str = "Prints a content file designated by the supplied absolute path \
and returns the content of the file as string.";

#[derive(Deserialize)]
struct FileReadInput {
    file_path: String,
}

/// Reads a whole file as UTF-8 text and returns it verbatim.
pub struct FileReadTool {
    parameters: ToolParameters,
}

impl FileReadTool {
    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::object()
                .string("file_path", "The absolute path to the file to be read.", true)
                .build(),
        }
    }
}

impl Default for FileReadTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        FILE_READ_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<String, AgentError> {
        let FileReadInput { file_path } = args.deserialize()?;

        tracing::debug!(path = %file_path, "reading file");
        tokio::fs::read_to_string(&file_path)
            .await
            .map_err(|e| AgentError::tool(FILE_READ_TOOL_NAME, format!("{file_path}: {e}")))
    }
}

/// Every tool the assistant ships with.
pub fn default_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(FileReadTool::new())]
}

//! Operator-facing console: reads input lines and renders the conversation.

pub mod markdown;
pub mod panel;

use async_trait::async_trait;
use console::{style, Style, Term};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::error::{AgentError, Result};
use crate::types::{ToolCall, ToolResult};

pub use markdown::{render_markdown, LineKind, MarkdownLine};
pub use panel::{render_panel, render_styled_panel};

/// Interactive read/write collaborator used by the conversation loop.
#[async_trait]
pub trait Console: Send {
    /// Prompt for one line of input. `None` means the input stream is closed.
    async fn read_line(&mut self) -> Result<Option<String>>;

    fn show_banner(&mut self, model_id: &str) -> Result<()>;

    fn show_user(&mut self, text: &str) -> Result<()>;

    fn show_assistant(&mut self, text: &str) -> Result<()>;

    fn show_tool_calls(&mut self, calls: &[ToolCall]) -> Result<()>;

    fn show_tool_result(&mut self, result: &ToolResult) -> Result<()>;

    fn show_error(&mut self, error: &AgentError) -> Result<()>;
}

/// One-line summary of a tool call, e.g. `file_read({"file_path":"/tmp/a"})`.
pub fn summarize_tool_call(call: &ToolCall) -> String {
    format!("{}({})", call.name, call.arguments)
}

/// The "AI" panel with the reply rendered as Markdown.
pub fn render_assistant_reply(text: &str, max_width: usize) -> String {
    let lines = render_markdown(text);
    let styles: Vec<Style> = lines.iter().map(|line| line_style(line.kind)).collect();
    let body: Vec<(&str, &Style)> = lines
        .iter()
        .zip(&styles)
        .map(|(line, style)| (line.text.as_str(), style))
        .collect();
    render_styled_panel("AI", &body, &Style::new().yellow(), max_width)
}

fn line_style(kind: LineKind) -> Style {
    match kind {
        LineKind::Text => Style::new(),
        LineKind::Heading => Style::new().cyan().bold(),
        LineKind::Code => Style::new().green(),
        LineKind::Quote => Style::new().dim().italic(),
        LineKind::Rule => Style::new().dim(),
    }
}

/// Console backed by the process's stdin and stdout.
pub struct TerminalConsole {
    term: Term,
    input: Lines<BufReader<Stdin>>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            input: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    fn width(&self) -> usize {
        let (_, cols) = self.term.size();
        usize::from(cols).max(20)
    }

    fn panel(&self, title: &str, body: &str, border: Style) -> Result<()> {
        let rendered = render_panel(title, body, &border, self.width());
        self.term.write_line(&rendered)?;
        Ok(())
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn read_line(&mut self) -> Result<Option<String>> {
        self.term.write_line(&style("User Input").blue().bold().to_string())?;
        self.term.write_str(&format!("{} ", style(">").blue().bold()))?;
        self.term.flush()?;
        self.input.next_line().await.map_err(AgentError::Io)
    }

    fn show_banner(&mut self, model_id: &str) -> Result<()> {
        let body = format!("Simple Agent\nmodel: {model_id}");
        self.panel("Agent", &body, Style::new().green())
    }

    fn show_user(&mut self, text: &str) -> Result<()> {
        self.panel("User Input", text, Style::new().blue().bold())
    }

    fn show_assistant(&mut self, text: &str) -> Result<()> {
        let rendered = render_assistant_reply(text, self.width());
        self.term.write_line(&rendered)?;
        Ok(())
    }

    fn show_tool_calls(&mut self, calls: &[ToolCall]) -> Result<()> {
        let body = calls
            .iter()
            .map(summarize_tool_call)
            .collect::<Vec<_>>()
            .join("\n");
        self.panel("AI", &body, Style::new().yellow())
    }

    fn show_tool_result(&mut self, result: &ToolResult) -> Result<()> {
        let line = if result.is_error {
            style(format!("✗ {}: {}", result.name, result.content)).red().to_string()
        } else {
            style(format!("✓ {} returned {} bytes", result.name, result.content.len()))
                .green()
                .to_string()
        };
        self.term.write_line(&line)?;
        Ok(())
    }

    fn show_error(&mut self, error: &AgentError) -> Result<()> {
        self.panel("Error", &error.to_string(), Style::new().red().bold())
    }
}

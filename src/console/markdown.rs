//! Markdown to terminal lines.
//!
//! Replies are flattened into one [`MarkdownLine`] per output line, each tagged
//! with the kind of block it came from. Inline emphasis markers are dropped;
//! styling is applied per line by the caller so panel wrapping never splits an
//! escape sequence.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Block a rendered line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Text,
    Heading,
    Code,
    Quote,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLine {
    pub text: String,
    pub kind: LineKind,
}

impl MarkdownLine {
    fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Render Markdown source into display lines.
pub fn render_markdown(source: &str) -> Vec<MarkdownLine> {
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS) {
        renderer.event(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct Renderer {
    lines: Vec<MarkdownLine>,
    buf: String,
    heading: bool,
    in_code: bool,
    quote_depth: usize,
    // `Some(n)` for ordered lists, holding the next item number.
    lists: Vec<Option<u64>>,
    item_marker: Option<String>,
    links: Vec<String>,
}

impl Renderer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.in_code => {
                let prefix = self.quote_prefix();
                for line in text.lines() {
                    self.lines
                        .push(MarkdownLine::new(format!("{prefix}  {line}"), LineKind::Code));
                }
            }
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.buf.push_str(&text)
            }
            Event::Code(code) => {
                self.buf.push('`');
                self.buf.push_str(&code);
                self.buf.push('`');
            }
            Event::SoftBreak => self.buf.push(' '),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(MarkdownLine::new("─".repeat(24), LineKind::Rule));
                self.gap();
            }
            Event::TaskListMarker(done) => self.buf.push_str(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush();
                self.heading = true;
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code = true;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.item_marker = Some(marker);
            }
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.links.push(dest_url.to_string());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.gap();
                }
            }
            TagEnd::Heading(_) => {
                self.flush();
                self.heading = false;
                self.gap();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.gap();
            }
            TagEnd::CodeBlock => {
                self.in_code = false;
                self.gap();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.gap();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Link | TagEnd::Image => {
                if let Some(url) = self.links.pop() {
                    if !url.is_empty() && !self.buf.ends_with(url.as_str()) {
                        self.buf.push_str(&format!(" ({url})"));
                    }
                }
            }
            _ => {}
        }
    }

    fn quote_prefix(&self) -> String {
        "> ".repeat(self.quote_depth)
    }

    fn flush(&mut self) {
        if self.buf.trim().is_empty() {
            self.buf.clear();
            return;
        }
        let text = std::mem::take(&mut self.buf);
        let depth = self.lists.len();
        let indent = "  ".repeat(depth.saturating_sub(1));
        let marker = match self.item_marker.take() {
            Some(marker) => marker,
            None if depth > 0 => "  ".to_string(),
            None => String::new(),
        };
        let kind = if self.heading {
            LineKind::Heading
        } else if self.quote_depth > 0 {
            LineKind::Quote
        } else {
            LineKind::Text
        };
        let line = format!("{}{indent}{marker}{}", self.quote_prefix(), text.trim());
        self.lines.push(MarkdownLine::new(line, kind));
    }

    fn gap(&mut self) {
        if self.lines.last().is_some_and(|l| !l.text.is_empty()) {
            self.lines.push(MarkdownLine::new("", LineKind::Text));
        }
    }

    fn finish(mut self) -> Vec<MarkdownLine> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.text.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

//! Boxed panels for terminal output.

use console::{measure_text_width, Style};

/// Render `body` inside a rounded box with `title` in the top border.
///
/// Lines wider than `max_width` (border included) are wrapped.
pub fn render_panel(title: &str, body: &str, border: &Style, max_width: usize) -> String {
    let plain = Style::new();
    let lines: Vec<(&str, &Style)> = body.lines().map(|line| (line, &plain)).collect();
    render_styled_panel(title, &lines, border, max_width)
}

/// Like [`render_panel`], with a style per body line.
///
/// Lines must be plain text; each wrapped segment is styled separately.
pub fn render_styled_panel(
    title: &str,
    body: &[(&str, &Style)],
    border: &Style,
    max_width: usize,
) -> String {
    let inner_max = max_width.saturating_sub(4).max(8);
    let plain = Style::new();
    let mut lines: Vec<(String, &Style)> = body
        .iter()
        .flat_map(|(line, style)| {
            wrap_line(line, inner_max)
                .into_iter()
                .map(move |segment| (segment, *style))
        })
        .collect();
    if lines.is_empty() {
        lines.push((String::new(), &plain));
    }

    let title_width = measure_text_width(title);
    let inner = lines
        .iter()
        .map(|(l, _)| measure_text_width(l))
        .max()
        .unwrap_or(0)
        .max(title_width + 2)
        .min(inner_max.max(title_width + 2));

    let mut out = String::new();
    let top_fill = (inner + 2).saturating_sub(title_width + 2);
    out.push_str(&border.apply_to(format!("╭─ {title} {}╮", "─".repeat(top_fill.saturating_sub(1)))).to_string());
    out.push('\n');
    for (line, style) in &lines {
        let pad = inner.saturating_sub(measure_text_width(line));
        out.push_str(&border.apply_to("│ ").to_string());
        out.push_str(&style.apply_to(line).to_string());
        out.push_str(&" ".repeat(pad));
        out.push_str(&border.apply_to(" │").to_string());
        out.push('\n');
    }
    out.push_str(&border.apply_to(format!("╰{}╯", "─".repeat(inner + 2))).to_string());
    out
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if measure_text_width(line) <= width {
        return vec![line.to_string()];
    }
    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut buf = [0u8; 4];
    for ch in line.chars() {
        let w = measure_text_width(ch.encode_utf8(&mut buf));
        if current_width + w > width && !current.is_empty() {
            wrapped.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += w;
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

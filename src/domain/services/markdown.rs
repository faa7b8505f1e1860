#[cfg(test)]
#[path = "markdown_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Span;

fn code_style() -> Style {
    return Style::default().fg(Color::Yellow);
}

fn inline_spans(line: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans = vec![];
    let mut rest = line;

    while !rest.is_empty() {
        let (start, marker, style) = match (rest.find("**"), rest.find('`')) {
            (Some(bold), Some(code)) if code < bold => (code, "`", code_style()),
            (Some(bold), _) => (bold, "**", base.add_modifier(Modifier::BOLD)),
            (None, Some(code)) => (code, "`", code_style()),
            (None, None) => break,
        };

        let after = &rest[start + marker.len()..];
        let Some(end) = after.find(marker) else {
            break;
        };

        if start > 0 {
            spans.push(Span::styled(rest[..start].to_string(), base));
        }
        spans.push(Span::styled(after[..end].to_string(), style));
        rest = &after[end + marker.len()..];
    }

    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), base));
    }

    return spans;
}

/// Turns an answer written in markdown into styled lines, one per source
/// line. Headings, bullets, bold, inline code and fenced code blocks are
/// understood; everything else is kept verbatim. Lines are not wrapped.
pub fn markdown_lines(text: &str) -> Vec<Vec<Span<'static>>> {
    let mut in_codeblock = false;

    return text
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();

            if trimmed.starts_with("```") {
                in_codeblock = !in_codeblock;
                return vec![Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::DarkGray),
                )];
            }

            if in_codeblock {
                return vec![Span::styled(line.to_string(), code_style())];
            }

            if trimmed.starts_with('#') {
                let heading = trimmed.trim_start_matches('#').trim();
                return inline_spans(
                    heading,
                    Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                );
            }

            if let Some(item) = trimmed
                .strip_prefix("- ")
                .or_else(|| return trimmed.strip_prefix("* "))
            {
                let indent = &line[..line.len() - trimmed.len()];
                let mut spans = vec![Span::from(format!("{indent}• "))];
                spans.extend(inline_spans(item, Style::default()));
                return spans;
            }

            return inline_spans(line, Style::default());
        })
        .collect();
}

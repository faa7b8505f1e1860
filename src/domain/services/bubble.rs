#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use std::mem;

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use super::markdown_lines;
use crate::domain::models::Message;
use crate::domain::models::MessageStatus;
use crate::domain::models::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BubbleAlignment {
    Left,
    Right,
}

impl BubbleAlignment {
    pub fn for_role(role: Role) -> BubbleAlignment {
        if role == Role::User {
            return BubbleAlignment::Right;
        }
        return BubbleAlignment::Left;
    }
}

pub struct Bubble<'a> {
    alignment: BubbleAlignment,
    message: &'a Message,
    name: String,
    window_max_width: usize,
}

pub struct BubbleConfig {
    pub border_elements_length: usize,
    pub outer_padding_percentage: f32,
}

fn text_width(text: &str) -> usize {
    return text.chars().count();
}

fn spans_width(spans: &[Span<'static>]) -> usize {
    return spans.iter().map(|span| return text_width(&span.content)).sum();
}

/// Breaks styled spans on spaces so no line is wider than `max_width`. Words
/// longer than a whole line are split mid-word.
fn wrap_spans(spans: Vec<Span<'static>>, max_width: usize) -> Vec<Vec<Span<'static>>> {
    let max_width = max_width.max(1);
    let mut lines = vec![];
    let mut current: Vec<Span<'static>> = vec![];
    let mut width = 0;

    for span in spans {
        let style = span.style;
        for (idx, word) in span.content.split(' ').enumerate() {
            let mut piece = if idx == 0 {
                word.to_string()
            } else {
                format!(" {word}")
            };

            if width > 0 && width + text_width(&piece) > max_width {
                lines.push(mem::take(&mut current));
                width = 0;
                piece = piece.trim_start().to_string();
            }

            while text_width(&piece) > max_width {
                let head = piece.chars().take(max_width).collect::<String>();
                piece = piece.chars().skip(max_width).collect::<String>();
                current.push(Span::styled(head, style));
                lines.push(mem::take(&mut current));
            }

            width += text_width(&piece);
            if !piece.is_empty() {
                current.push(Span::styled(piece, style));
            }
        }
    }

    lines.push(current);
    return lines;
}

impl<'a> Bubble<'a> {
    pub fn new(
        message: &'a Message,
        alignment: BubbleAlignment,
        window_max_width: usize,
        username: &str,
    ) -> Bubble<'a> {
        return Bubble {
            alignment,
            message,
            name: message.role.display_name(username),
            window_max_width,
        };
    }

    pub fn style_config() -> BubbleConfig {
        return BubbleConfig {
            // left border + left padding + (text, not counted) + right padding + right border +
            // scrollbar.
            border_elements_length: 5,
            outer_padding_percentage: 0.04,
        };
    }

    pub fn as_lines(&self) -> Vec<Line<'static>> {
        let max_line_length = self.get_max_line_length();

        let lines = self
            .body_lines()
            .into_iter()
            .flat_map(|spans| return wrap_spans(spans, max_line_length))
            .collect::<Vec<Vec<Span<'static>>>>();

        let inner_width = lines
            .iter()
            .map(|spans| return spans_width(spans))
            .max()
            .unwrap_or(0)
            .max(text_width(&self.name));

        let mut res = vec![self.border_line("╭", "╮", inner_width, true)];
        res.extend(
            lines
                .into_iter()
                .map(|spans| return self.spans_to_line(spans, inner_width)),
        );
        res.push(self.border_line("╰", "╯", inner_width, false));

        return res;
    }

    /// Unwrapped content of the bubble: reasoning annotations first (always
    /// expanded), then the answer itself.
    fn body_lines(&self) -> Vec<Vec<Span<'static>>> {
        let mut lines = vec![];

        for step in &self.message.reasoning {
            lines.push(vec![Span::styled(
                format!("▸ {}", step.title),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]);
            lines.push(vec![Span::styled(
                format!("  {}", step.content),
                Style::default().fg(Color::DarkGray),
            )]);
        }
        if !self.message.reasoning.is_empty() {
            lines.push(vec![]);
        }

        // Tabs would throw off the width math.
        let content = self.message.content.replace('\t', "  ");

        match self.message.status {
            MessageStatus::Pending => {
                lines.push(vec![Span::styled(
                    "● ● ●".to_string(),
                    Style::default().fg(Color::DarkGray),
                )]);
            }
            MessageStatus::Failed => {
                lines.push(vec![Span::styled(
                    content,
                    Style::default().fg(Color::Red),
                )]);
            }
            MessageStatus::Complete => {
                if self.message.role == Role::User {
                    lines.extend(
                        content
                            .lines()
                            .map(|line| return vec![Span::from(line.to_string())]),
                    );
                } else {
                    lines.extend(markdown_lines(&content));
                }
            }
        }

        if lines.is_empty() {
            lines.push(vec![]);
        }

        return lines;
    }

    fn get_max_line_length(&self) -> usize {
        let style_config = Bubble::style_config();
        // Add a minimum 4% of padding on the side.
        let min_bubble_padding_length = ((self.window_max_width as f32
            * style_config.outer_padding_percentage)
            .ceil()) as usize;

        // Border elements + minimum bubble padding.
        let line_border_width = style_config.border_elements_length + min_bubble_padding_length;

        return self
            .window_max_width
            .saturating_sub(line_border_width)
            .max(text_width(&self.name));
    }

    fn outer_padding(&self, inner_width: usize) -> String {
        // Two borders and two spaces of padding around the text, plus the scrollbar.
        let bubble_width = inner_width + 5;
        return " ".repeat(self.window_max_width.saturating_sub(bubble_width));
    }

    fn spans_to_line(&self, mut spans: Vec<Span<'static>>, inner_width: usize) -> Line<'static> {
        let fill = " ".repeat(inner_width.saturating_sub(spans_width(&spans)));

        let mut wrapped_spans = vec![self.highlight_span("│ ".to_string())];
        wrapped_spans.append(&mut spans);
        wrapped_spans.push(Span::from(fill));
        wrapped_spans.push(self.highlight_span(" │".to_string()));

        if self.alignment == BubbleAlignment::Left {
            return Line::from(wrapped_spans);
        }

        let mut line_spans = vec![Span::from(self.outer_padding(inner_width))];
        line_spans.extend(wrapped_spans);

        return Line::from(line_spans);
    }

    fn border_line(
        &self,
        left: &str,
        right: &str,
        inner_width: usize,
        titled: bool,
    ) -> Line<'static> {
        // Add 2 for the spaces next to the vertical bars.
        let mut inner_bar = "─".repeat(inner_width + 2);
        if titled {
            let rest = "─".repeat(inner_width + 2 - text_width(&self.name));
            inner_bar = format!("{}{rest}", self.name);
        }

        let bar = format!("{left}{inner_bar}{right}");
        if self.alignment == BubbleAlignment::Left {
            return Line::from(self.highlight_span(bar));
        }

        return Line::from(vec![
            Span::from(self.outer_padding(inner_width)),
            self.highlight_span(bar),
        ]);
    }

    fn highlight_span(&self, text: String) -> Span<'static> {
        match self.message.status {
            MessageStatus::Failed => {
                return Span::styled(text, Style::default().fg(Color::Red));
            }
            MessageStatus::Pending => {
                return Span::styled(text, Style::default().fg(Color::DarkGray));
            }
            MessageStatus::Complete => {}
        }

        if self.message.role == Role::Assistant {
            return Span::styled(text, Style::default().fg(Color::Rgb(94, 129, 244)));
        }

        return Span::from(text);
    }
}

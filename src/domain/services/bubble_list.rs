#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

use std::collections::HashMap;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::Bubble;
use super::BubbleAlignment;
use crate::domain::models::Message;
use crate::domain::models::MessageId;
use crate::domain::models::MessageStatus;

struct BubbleCacheEntry {
    content_len: usize,
    status: MessageStatus,
    lines: Vec<Line<'static>>,
}

/// Rendered bubbles for a transcript snapshot. Messages only change when their
/// pending answer resolves, so bubbles are cached per message and rebuilt when
/// the status or content differs, or the width changes.
pub struct BubbleList {
    cache: HashMap<MessageId, BubbleCacheEntry>,
    order: Vec<MessageId>,
    line_width: usize,
    lines_len: usize,
    username: String,
}

impl BubbleList {
    pub fn new(username: &str) -> BubbleList {
        return BubbleList {
            cache: HashMap::new(),
            order: vec![],
            line_width: 0,
            lines_len: 0,
            username: username.to_string(),
        };
    }

    pub fn set_messages(&mut self, messages: &[Message], line_width: usize) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }

        for message in messages {
            if let Some(entry) = self.cache.get(&message.id()) {
                if entry.status == message.status && entry.content_len == message.content.len() {
                    continue;
                }
            }

            let alignment = BubbleAlignment::for_role(message.role);
            let lines = Bubble::new(message, alignment, line_width, &self.username).as_lines();
            self.cache.insert(
                message.id(),
                BubbleCacheEntry {
                    content_len: message.content.len(),
                    status: message.status,
                    lines,
                },
            );
        }

        self.order = messages.iter().map(|message| return message.id()).collect();
        self.lines_len = self
            .order
            .iter()
            .filter_map(|id| return self.cache.get(id))
            .map(|entry| return entry.lines.len())
            .sum();
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn is_empty(&self) -> bool {
        return self.lines_len == 0;
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, scroll: u16) {
        let lines = self
            .order
            .iter()
            .filter_map(|id| return self.cache.get(id))
            .flat_map(|entry| return entry.lines.to_owned())
            .collect::<Vec<Line<'static>>>();

        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default())
                .scroll((scroll, 0)),
            rect,
        );
    }
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Widget;
use tui_textarea::Input;
use tui_textarea::Key;
use tui_textarea::TextArea;

const IDLE_TITLE: &str = "Ask a question...";
const BUSY_TITLE: &str = "Reasoning...";

/// The question being typed. It stays editable while an answer is pending,
/// only the title changes.
pub struct Prompt {
    busy: bool,
    textarea: TextArea<'static>,
}

impl Default for Prompt {
    fn default() -> Prompt {
        let mut prompt = Prompt {
            busy: false,
            textarea: TextArea::default(),
        };
        prompt.set_block();
        return prompt;
    }
}

impl Prompt {
    fn set_block(&mut self) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .padding(Padding::new(1, 1, 0, 0));

        if self.busy {
            block = block
                .title(BUSY_TITLE)
                .border_style(Style::default().fg(Color::DarkGray));
        } else {
            block = block.title(IDLE_TITLE);
        }

        self.textarea.set_block(block);
    }

    pub fn title(&self) -> &'static str {
        if self.busy {
            return BUSY_TITLE;
        }
        return IDLE_TITLE;
    }

    pub fn set_busy(&mut self, busy: bool) {
        if self.busy != busy {
            self.busy = busy;
            self.set_block();
        }
    }

    pub fn input(&mut self, input: Input) {
        self.textarea.input(input);
    }

    /// Feeds pasted text one key at a time so newlines become line breaks.
    pub fn paste(&mut self, text: &str) {
        for char in text.chars() {
            let key = if char == '\n' {
                Key::Enter
            } else {
                Key::Char(char)
            };
            self.textarea.input(Input {
                key,
                ctrl: false,
                alt: false,
            });
        }
    }

    pub fn text(&self) -> String {
        return self.textarea.lines().join("\n");
    }

    pub fn clear(&mut self) {
        self.textarea = TextArea::default();
        self.set_block();
    }

    pub fn widget(&self) -> impl Widget + '_ {
        return self.textarea.widget();
    }
}

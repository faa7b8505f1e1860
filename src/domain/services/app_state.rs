#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use ratatui::prelude::Rect;
use tui_textarea::Input;

use super::BubbleList;
use super::Prompt;
use super::Scroll;
use crate::domain::models::ControllerState;
use crate::domain::models::EngineStatus;
use crate::domain::models::Message;

/// What the terminal shows. It only mirrors what the core publishes and never
/// mutates the transcript itself.
pub struct AppState {
    pub bubble_list: BubbleList,
    pub controller_state: ControllerState,
    pub engine_status: EngineStatus,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub messages: Vec<Message>,
    pub prompt: Prompt,
    pub scroll: Scroll,
}

impl AppState {
    pub fn new(username: &str) -> AppState {
        return AppState {
            bubble_list: BubbleList::new(username),
            controller_state: ControllerState::Idle,
            engine_status: EngineStatus::Checking,
            last_known_height: 0,
            last_known_width: 0,
            messages: vec![],
            prompt: Prompt::default(),
            scroll: Scroll::default(),
        };
    }

    pub fn handle_transcript(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.sync_dependants();
    }

    pub fn set_controller_state(&mut self, state: ControllerState) {
        self.controller_state = state;
        self.prompt
            .set_busy(!self.controller_state.accepts_submissions());
    }

    pub fn set_engine_status(&mut self, status: EngineStatus) {
        self.engine_status = status;
    }

    /// Mirrors the disabled submit button: nothing is sent while an answer is
    /// pending or the prompt is blank.
    pub fn can_submit(&self, input: &str) -> bool {
        return self.controller_state.accepts_submissions() && !input.trim().is_empty();
    }

    pub fn handle_input(&mut self, input: Input) {
        self.prompt.input(input);
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.prompt.paste(text);
    }

    /// Takes the typed question when it can be sent. The controller publishes
    /// `InFlight` asynchronously, so the state is flipped here as well to keep
    /// a second Enter from being sent before that arrives. A rejected submit
    /// leaves the prompt untouched.
    pub fn submit(&mut self) -> Option<String> {
        let question = self.prompt.text();
        if !self.can_submit(&question) {
            return None;
        }

        self.prompt.clear();
        self.set_controller_state(ControllerState::InFlight);

        return Some(question);
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    fn sync_dependants(&mut self) {
        self.bubble_list
            .set_messages(&self.messages, self.last_known_width as usize);

        let list_length = u16::try_from(self.bubble_list.len()).unwrap_or(u16::MAX);
        self.scroll.set_state(list_length, self.last_known_height);
    }
}

#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;

use ratatui::widgets::ScrollbarState;

const PAGE_SIZE: u16 = 10;

/// Vertical position in the transcript. While the view sits at the bottom it
/// keeps following new lines; scrolling up detaches it until the bottom is
/// reached again.
#[derive(Default)]
pub struct Scroll {
    list_length: u16,
    viewport_length: u16,
    detached: bool,
    pub position: u16,
    pub scrollbar_state: ScrollbarState,
}

impl Scroll {
    fn max_position(&self) -> u16 {
        return self.list_length.saturating_sub(self.viewport_length);
    }

    fn sync_scrollbar(&mut self) {
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn up(&mut self) {
        self.position = self.position.saturating_sub(1);
        self.detached = self.position < self.max_position();
        self.sync_scrollbar();
    }

    pub fn up_page(&mut self) {
        for _ in 0..PAGE_SIZE {
            self.up();
        }
    }

    pub fn down(&mut self) {
        self.position = self.position.saturating_add(1).min(self.max_position());
        self.detached = self.position < self.max_position();
        self.sync_scrollbar();
    }

    pub fn down_page(&mut self) {
        for _ in 0..PAGE_SIZE {
            self.down();
        }
    }

    pub fn last(&mut self) {
        self.position = self.max_position();
        self.detached = false;
        self.sync_scrollbar();
    }

    pub fn is_following(&self) -> bool {
        return !self.detached;
    }

    pub fn set_state(&mut self, list_length: u16, viewport_length: u16) {
        self.list_length = list_length;
        self.viewport_length = viewport_length;
        self.scrollbar_state = self
            .scrollbar_state
            .content_length(list_length)
            .viewport_content_length(viewport_length);

        if self.detached {
            self.position = self.position.min(self.max_position());
            self.sync_scrollbar();
        } else {
            self.last();
        }
    }
}

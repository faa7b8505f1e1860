use anyhow::bail;
use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::KeyEventKind;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::ControllerState;
use crate::domain::models::Event;
use crate::domain::models::Message;

/// Merges terminal input with everything the core publishes: transcript
/// snapshots, controller state, and results of background actions.
pub struct EventsService {
    crossterm_events: EventStream,
    events: mpsc::UnboundedReceiver<Event>,
    transcript: mpsc::UnboundedReceiver<Vec<Message>>,
    controller_state: watch::Receiver<ControllerState>,
    controller_open: bool,
    events_open: bool,
}

impl EventsService {
    pub fn new(
        events: mpsc::UnboundedReceiver<Event>,
        transcript: mpsc::UnboundedReceiver<Vec<Message>>,
        controller_state: watch::Receiver<ControllerState>,
    ) -> EventsService {
        return EventsService {
            crossterm_events: EventStream::new(),
            events,
            transcript,
            controller_state,
            controller_open: true,
            events_open: true,
        };
    }

    fn handle_crossterm(&self, event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Paste(text) => {
                return Some(Event::KeyboardPaste(text));
            }
            CrosstermEvent::Resize(_, _) => {
                return Some(Event::UIResize());
            }
            CrosstermEvent::Mouse(mouseevent) => match mouseevent.kind {
                MouseEventKind::ScrollUp => {
                    return Some(Event::UIScrollUp());
                }
                MouseEventKind::ScrollDown => {
                    return Some(Event::UIScrollDown());
                }
                _ => {
                    return None;
                }
            },
            CrosstermEvent::Key(keyevent) => {
                if keyevent.kind == KeyEventKind::Release {
                    return None;
                }

                match Input::from(CrosstermEvent::Key(keyevent)) {
                    Input { key: Key::Down, .. } => {
                        return Some(Event::UIScrollDown());
                    }
                    Input { key: Key::Up, .. } => {
                        return Some(Event::UIScrollUp());
                    }
                    Input {
                        key: Key::PageDown, ..
                    } => {
                        return Some(Event::UIScrollPageDown());
                    }
                    Input {
                        key: Key::PageUp, ..
                    } => {
                        return Some(Event::UIScrollPageUp());
                    }
                    Input {
                        key: Key::Char('d'),
                        ctrl: true,
                        ..
                    } => {
                        return Some(Event::UIScrollPageDown());
                    }
                    Input {
                        key: Key::Char('u'),
                        ctrl: true,
                        ..
                    } => {
                        return Some(Event::UIScrollPageUp());
                    }
                    Input {
                        key: Key::Char('c'),
                        ctrl: true,
                        ..
                    } => {
                        return Some(Event::KeyboardCTRLC());
                    }
                    Input {
                        key: Key::Enter, ..
                    } => {
                        return Some(Event::KeyboardEnter());
                    }
                    input => {
                        return Some(Event::KeyboardCharInput(input));
                    }
                }
            }
            _ => return None,
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let evt = tokio::select! {
                snapshot = self.transcript.recv() => match snapshot {
                    Some(messages) => Some(Event::TranscriptChanged(messages)),
                    None => bail!("Transcript closed unexpectedly"),
                },
                changed = self.controller_state.changed(), if self.controller_open => match changed {
                    Ok(()) => Some(Event::ControllerStateChanged(*self.controller_state.borrow_and_update())),
                    Err(_) => {
                        self.controller_open = false;
                        None
                    }
                },
                event = self.events.recv(), if self.events_open => match event {
                    Some(event) => Some(event),
                    None => {
                        self.events_open = false;
                        None
                    }
                },
                event = self.crossterm_events.next() => match event {
                    Some(Ok(input)) => self.handle_crossterm(input),
                    Some(Err(_)) => None,
                    None => None
                },
            };

            if let Some(event) = evt {
                return Ok(event);
            }
        }
    }
}

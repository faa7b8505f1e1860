use tui_textarea::Input;

use super::ControllerState;
use super::EngineStatus;
use super::Message;

pub enum Event {
    ControllerStateChanged(ControllerState),
    EngineStatusChanged(EngineStatus),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardPaste(String),
    TranscriptChanged(Vec<Message>),
    UIResize(),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
}

use std::fmt;

/// Whether a submission is currently waiting on the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControllerState {
    #[default]
    Idle,
    InFlight,
}

impl ControllerState {
    pub fn accepts_submissions(&self) -> bool {
        return *self == ControllerState::Idle;
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ControllerState::Idle => return write!(f, "idle"),
            ControllerState::InFlight => return write!(f, "in_flight"),
        }
    }
}

mod action;
mod controller_state;
mod event;
mod gateway;
mod message;
mod role;

pub use action::*;
pub use controller_state::*;
pub use event::*;
pub use gateway::*;
pub use message::*;
pub use role::*;

pub mod actions;
mod app_state;
mod bubble;
mod bubble_list;
pub mod events;
mod markdown;
mod prompt;
pub mod reasoning;
mod scroll;
mod submission;
mod transcript;

pub use app_state::*;
pub use bubble::*;
pub use bubble_list::*;
pub use markdown::*;
pub use prompt::*;
pub use scroll::*;
pub use submission::*;
pub use transcript::*;

mod action;
mod feedback;
mod screen;

pub use action::Action;
pub use feedback::{ConsoleFeedback, UiFeedback};
pub use screen::MainScreen;

//! Application state and core logic

pub mod screen;
pub mod state;

pub use screen::{AppCoordinator, Feedback, Screen};
pub use state::App;

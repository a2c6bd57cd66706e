//! Ratatui front-end. The app state, form and dialog state, drawing helpers
//! and the terminal loop live in separate submodules.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;

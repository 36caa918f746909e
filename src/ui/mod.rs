//! Ratatui front end: book list, detail panel, process log and the modal
//! dialogs layered on top of them.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;

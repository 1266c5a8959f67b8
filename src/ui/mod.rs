//! Ratatui front-end for the student records manager. The `App` owns the
//! store plus the screen/mode state machines; `terminal` drives the event
//! loop. Forms, screen state, and drawing helpers live in their own
//! submodules so the interaction logic in `app` stays readable.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;

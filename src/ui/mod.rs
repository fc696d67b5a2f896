//! Terminal UI: a ratatui front-end that drives a [`crate::session::GameSession`]
//! through its controller interface.

mod app;
mod game_view;

pub use app::App;

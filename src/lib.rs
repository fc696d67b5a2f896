//! # Four in a Row
//!
//! 4x4 tic-tac-toe where four marks in a row, column or diagonal win.
//! Two people can play each other, or one person can play a rule-based
//! computer opponent that replies after a short, cancellable delay.
//!
//! ## Modules
//!
//! - [`game`]: Board, marks, winning-line catalog, move/status state machine
//! - [`ai`]: Agent trait, heuristic opponent, random baseline
//! - [`session`]: Game session: modes, scheduled computer replies, events
//! - [`ui`]: Terminal front-end
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod ui;

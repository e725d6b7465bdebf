pub mod config;
pub mod roster;
pub mod tui;

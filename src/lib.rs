//! ghsearch library
//!
//! Search state, the GitHub client and the terminal UI, exported for the
//! binary and for integration tests.

pub mod browser;
pub mod cli;
pub mod config;
pub mod event;
pub mod logging;
pub mod output;
pub mod search;
pub mod tui;

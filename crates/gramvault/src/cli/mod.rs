//! # CLI
//!
//! The command-line client for gramvault:
//! - `setup`: clap definitions of every command and option
//! - `commands`: opening the store and dispatching to the API
//! - `render`: rows, tables and colored messages
//!
//! Everything here is presentation. Business rules live in `gramvaultapp`.

mod commands;
mod render;
pub mod setup;

pub use commands::run;

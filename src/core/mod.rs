// src/core/mod.rs

//! The central module containing the relay's registry, command handling and fan-out.

pub mod broadcast;
pub mod commands;
pub mod dispatcher;
pub mod errors;
pub mod metrics;
pub mod protocol;
pub mod state;

pub use commands::ChatCommand;
pub use errors::ChatError;

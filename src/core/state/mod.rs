// src/core/state/mod.rs

//! Per-connection records and the registry that owns them.

mod client;
mod registry;

pub use client::*;
pub use registry::ClientRegistry;

// src/connection/mod.rs

//! Manages the two halves of a single client TCP connection: a reader that
//! feeds the server's event loop, and a writer that is the sole owner of the
//! socket's write side.

mod events;
mod handler;
mod writer;

pub use events::{CloseReason, ConnectionEvent};
pub use handler::ConnectionReader;
pub use writer::ConnectionWriter;

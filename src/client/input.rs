// src/client/input.rs

//! Terminal input for the interactive client.
//!
//! Stdin is owned by a plain thread that forwards lines over a channel; the
//! runtime never holds a blocking stdin read, so it can shut down while the
//! user is idle.

use bytes::Bytes;
use futures::Stream;
use std::io::{self, BufRead};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;
use tracing::debug;

/// Lines buffered between the input thread and the client.
const INPUT_QUEUE_CAPACITY: usize = 16;

/// The receiving side of the input thread, as a stream of byte chunks.
#[derive(Debug)]
pub struct InputStream {
    rx: mpsc::Receiver<io::Result<Bytes>>,
}

impl Stream for InputStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Line-readable client input fed by a background thread.
pub type ClientInput = StreamReader<InputStream, Bytes>;

fn channel_input(rx: mpsc::Receiver<io::Result<Bytes>>) -> ClientInput {
    StreamReader::new(InputStream { rx })
}

/// Starts a detached thread that reads stdin line by line. The process can exit
/// while the thread is still blocked in a read.
pub fn spawn_stdin_reader() -> io::Result<ClientInput> {
    let (tx, rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || forward_lines(io::stdin().lock(), tx))?;
    Ok(channel_input(rx))
}

/// Pumps lines from `source` into `tx` until EOF, an error, or the receiver
/// going away.
fn forward_lines<R: BufRead>(mut source: R, tx: mpsc::Sender<io::Result<Bytes>>) {
    loop {
        let mut line = Vec::new();
        match source.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                if tx.blocking_send(Ok(Bytes::from(line))).is_err() {
                    debug!("Client input closed; stopping stdin reader.");
                    break;
                }
            }
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                break;
            }
        }
    }
}

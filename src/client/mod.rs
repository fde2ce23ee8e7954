// src/client/mod.rs

//! The interactive chat client: forwards input lines to the server and prints
//! whatever the server sends back.

use crate::config::ClientConfig;
use crate::core::ChatError;
use crate::core::protocol::ChunkCodec;
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;
use tracing::debug;

mod input;

pub use input::{ClientInput, spawn_stdin_reader};

/// How a client session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientExit {
    /// The server closed the connection or it broke.
    ServerShutdown,
    /// The input source reached end of file.
    InputClosed,
}

/// A connected chat client.
pub struct ChatClient {
    stream: TcpStream,
    peer: SocketAddr,
    codec: ChunkCodec,
}

impl ChatClient {
    /// Connects to the configured server. A refused connection is a
    /// [`ChatError::Connect`].
    pub async fn connect(config: &ClientConfig) -> Result<Self, ChatError> {
        let addr = config.server_addr();
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| ChatError::Connect {
                addr: addr.clone(),
                source: Arc::new(e),
            })?;
        let peer = stream.peer_addr()?;
        debug!("Connected to {}", peer);
        Ok(Self {
            stream,
            peer,
            codec: ChunkCodec::new(config.read_buffer_size),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Pumps `input` lines to the server and server payloads to `output` until
    /// either side ends.
    pub async fn run<I, O>(self, input: I, mut output: O) -> Result<ClientExit, ChatError>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let (read_half, mut write_half) = self.stream.into_split();
        let mut inbound = FramedRead::new(read_half, self.codec);
        let mut lines = input.lines();

        output.write_all(b"Connected to the server.\n").await?;
        output.flush().await?;

        let exit = loop {
            tokio::select! {
                frame = inbound.next() => match frame {
                    Some(Ok(payload)) => {
                        let text = String::from_utf8_lossy(&payload);
                        output.write_all(format!("Received: {text}\n").as_bytes()).await?;
                        output.flush().await?;
                    }
                    Some(Err(e)) => {
                        debug!("Read from {} failed: {}", self.peer, e);
                        break ClientExit::ServerShutdown;
                    }
                    None => break ClientExit::ServerShutdown,
                },
                line = lines.next_line() => match line? {
                    Some(mut line) => {
                        line.push('\n');
                        if let Err(e) = write_half.write_all(line.as_bytes()).await {
                            debug!("Write to {} failed: {}", self.peer, e);
                            break ClientExit::ServerShutdown;
                        }
                    }
                    None => break ClientExit::InputClosed,
                },
            }
        };

        match exit {
            ClientExit::ServerShutdown => output.write_all(b"Server shutdown\n").await?,
            ClientExit::InputClosed => {
                output.write_all(b"Disconnected by user\n").await?;
                let _ = write_half.shutdown().await;
            }
        }
        output.flush().await?;
        Ok(exit)
    }
}

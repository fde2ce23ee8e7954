// src/core/dispatcher.rs

//! Routes a parsed [`ChatCommand`] to the registry and broadcast engine.

use crate::core::broadcast::{self, BroadcastOutcome};
use crate::core::commands::ChatCommand;
use crate::core::state::{ClientRegistry, ConnectionId};
use bytes::Bytes;
use std::fmt::Write;
use tracing::{debug, info};

/// What a dispatch ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A reply was queued for the caller only.
    Replied(String),
    /// A chat message was fanned out.
    Broadcast(BroadcastOutcome),
    /// The caller is no longer registered; nothing happened.
    Ignored,
}

/// Executes commands on behalf of one connection.
pub struct CommandDispatcher<'a> {
    registry: &'a mut ClientRegistry,
    origin: ConnectionId,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(registry: &'a mut ClientRegistry, origin: ConnectionId) -> Self {
        Self { registry, origin }
    }

    pub fn dispatch(self, command: ChatCommand) -> DispatchOutcome {
        if !self.registry.contains(self.origin) {
            debug!(
                "Ignoring '{}' from connection {} which is no longer registered.",
                command.name(),
                self.origin
            );
            return DispatchOutcome::Ignored;
        }

        match command {
            ChatCommand::ListClients => {
                let reply = self.render_client_list();
                self.reply(reply)
            }
            ChatCommand::SetName(name) => {
                if let Some(record) = self.registry.get_mut(self.origin) {
                    info!(
                        "Client {} renamed from '{}' to '{}'.",
                        self.origin,
                        record.display_name(),
                        name
                    );
                    record.set_name(name.clone());
                }
                self.reply(format!("Name {name} applied"))
            }
            ChatCommand::Message(text) => {
                info!("Received message from {}: {}", self.origin, text);
                let outcome = broadcast::broadcast(self.registry, &Bytes::from(text), &[]);
                DispatchOutcome::Broadcast(outcome)
            }
        }
    }

    fn render_client_list(&self) -> String {
        let mut list = String::from("Connected clients:\n");
        for client in self.registry.snapshot() {
            let _ = writeln!(list, "{} {}", client.name, client.addr);
        }
        list
    }

    fn reply(self, text: String) -> DispatchOutcome {
        broadcast::send(self.registry, self.origin, Bytes::from(text.clone()));
        DispatchOutcome::Replied(text)
    }
}

// src/core/state/registry.rs

//! The authoritative set of live connections.
//!
//! The registry is owned by the server's event loop task and is only ever
//! mutated from there, so it needs no interior locking. Anything that wants to
//! look at the client list from elsewhere gets a [`ClientSummary`] snapshot.

use super::client::{ClientSummary, ConnectionId, ConnectionRecord};
use crate::core::ChatError;
use indexmap::IndexMap;

/// Maps each connection id to its record, in join order.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: IndexMap<ConnectionId, ConnectionRecord>,
    next_id: ConnectionId,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Hands out the next sequential connection id, starting from 0.
    pub fn allocate_id(&mut self) -> ConnectionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Registers a record. Fails if its id is already present.
    pub fn add(&mut self, record: ConnectionRecord) -> Result<(), ChatError> {
        if self.clients.contains_key(&record.id) {
            return Err(ChatError::DuplicateHandle(record.id));
        }
        self.clients.insert(record.id, record);
        Ok(())
    }

    /// Removes and returns the record for `id`. A second call returns `None`.
    pub fn remove(&mut self, id: ConnectionId) -> Option<ConnectionRecord> {
        self.clients.shift_remove(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&ConnectionRecord> {
        self.clients.get(&id)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut ConnectionRecord> {
        self.clients.get_mut(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.clients.contains_key(&id)
    }

    /// Copies out the current roster, in join order.
    pub fn snapshot(&self) -> Vec<ClientSummary> {
        self.clients.values().map(ClientSummary::from).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionRecord> {
        self.clients.values()
    }

    /// Empties the registry, handing every record back to the caller.
    pub fn drain(&mut self) -> Vec<ConnectionRecord> {
        self.clients.drain(..).map(|(_, record)| record).collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

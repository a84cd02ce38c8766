//! Pending notification batches keyed by (client, event kind).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ActorRole, ClientId, Timestamp};

/// Kind of domain event accumulated into a batch.
///
/// Document and folder activity for the same client coalesce into
/// separate batches and never merge into one digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Document,
    Folder,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Document => "document",
            EventKind::Folder => "folder",
        };
        write!(f, "{}", s)
    }
}

/// Partition key for the coalescer's batch map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub client_id: ClientId,
    pub kind: EventKind,
}

/// One accumulated event: the uploaded document or created folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDescriptor {
    pub name: String,
    pub path: Option<String>,
    pub occurred_at: Timestamp,
}

/// Events accumulated for one (client, kind) key during a quiet-period
/// window.
///
/// The first event of the window fixes the recorded actor and client
/// display name; later events only append descriptors. When multiple
/// actors fire into the same key before the flush, the digest is
/// attributed to whoever opened the window.
#[derive(Debug, Clone)]
pub struct PendingBatch {
    client_id: ClientId,
    kind: EventKind,
    client_name: String,
    actor_name: String,
    actor_role: ActorRole,
    events: Vec<EventDescriptor>,
}

impl PendingBatch {
    /// Opens a new batch with the attribution of its first event.
    pub fn opened_by(
        client_id: ClientId,
        kind: EventKind,
        client_name: impl Into<String>,
        actor_name: impl Into<String>,
        actor_role: ActorRole,
        first_event: EventDescriptor,
    ) -> Self {
        Self {
            client_id,
            kind,
            client_name: client_name.into(),
            actor_name: actor_name.into(),
            actor_role,
            events: vec![first_event],
        }
    }

    /// Appends an event, preserving insertion order. Attribution is not
    /// revisited.
    pub fn push(&mut self, event: EventDescriptor) {
        self.events.push(event);
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn actor_name(&self) -> &str {
        &self.actor_name
    }

    pub fn actor_role(&self) -> ActorRole {
        self.actor_role
    }

    /// Accumulated events in insertion order.
    pub fn events(&self) -> &[EventDescriptor] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//! Handshake messages exchanged over the in-process message bus.

use crate::models::{AgentId, Position, WasteItem, WasteKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    /// "I hold one spare item of `kind` and stand at `position`."
    Offer { position: Position, kind: WasteKind },
    /// Reply to an offer, carrying the acceptor's position.
    Accept { position: Position },
    /// "Where are you?" sent to a partner missing at the rendezvous.
    Where,
    /// Reply to `Where`.
    Here { position: Position },
    /// Hands over carried items. Ownership moves at send time.
    Transfer { items: Vec<WasteItem> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Offer,
    Accept,
    Where,
    Here,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: AgentId,
    /// `None` for broadcasts.
    pub recipient: Option<AgentId>,
    pub tick: u64,
    pub body: MessageBody,
}

impl Message {
    pub fn broadcast(sender: AgentId, tick: u64, body: MessageBody) -> Self {
        Self {
            sender,
            recipient: None,
            tick,
            body,
        }
    }

    pub fn direct(sender: AgentId, recipient: AgentId, tick: u64, body: MessageBody) -> Self {
        Self {
            sender,
            recipient: Some(recipient),
            tick,
            body,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self.body {
            MessageBody::Offer { .. } => MessageKind::Offer,
            MessageBody::Accept { .. } => MessageKind::Accept,
            MessageBody::Where => MessageKind::Where,
            MessageBody::Here { .. } => MessageKind::Here,
            MessageBody::Transfer { .. } => MessageKind::Transfer,
        }
    }

    /// Addressed to `agent` specifically (broadcasts excluded).
    pub fn is_for(&self, agent: AgentId) -> bool {
        self.recipient == Some(agent)
    }
}

//! Event logging for simulation replay and auditing.
//!
//! Every observable state change made by an agent or the clock is appended to
//! the [`EventLog`] in the order it happens within a tick. Events enable:
//! - Deterministic replay checks (same seed, same log)
//! - Debugging (what did robot 3 do at tick 120?)
//! - Aggregation (transfers, deliveries, distance)
//!
//! # Example
//!
//! ```rust
//! use robot_mission_core_rs::models::{Event, EventLog, Position, WasteKind};
//!
//! let mut log = EventLog::new();
//! log.log(Event::PickedUp {
//!     tick: 3,
//!     agent_id: 0,
//!     item_id: 7,
//!     kind: WasteKind::Green,
//!     position: Position::new(1, 0),
//! });
//! assert_eq!(log.events_of_type("PickedUp").len(), 1);
//! ```

use crate::models::{AgentId, DeliveryOutcome, ItemId, Position, WasteKind};
use crate::orchestrator::Status;
use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Moved {
        tick: u64,
        agent_id: AgentId,
        from: Position,
        to: Position,
    },

    /// Items entered the shared seen-set from this agent's scan
    ItemsSighted {
        tick: u64,
        agent_id: AgentId,
        count: usize,
    },

    Claimed {
        tick: u64,
        agent_id: AgentId,
        item_id: ItemId,
        kind: WasteKind,
    },

    Released {
        tick: u64,
        agent_id: AgentId,
        item_id: ItemId,
    },

    PickedUp {
        tick: u64,
        agent_id: AgentId,
        item_id: ItemId,
        kind: WasteKind,
        position: Position,
    },

    Combined {
        tick: u64,
        agent_id: AgentId,
        consumed: Vec<ItemId>,
        produced: ItemId,
        kind: WasteKind,
    },

    /// Product dropped at a region boundary or destroyed at the disposal cell
    Delivered {
        tick: u64,
        agent_id: AgentId,
        item_id: ItemId,
        outcome: DeliveryOutcome,
        /// Id of the respawned item, if any
        spawned: Option<ItemId>,
        position: Position,
    },

    OfferBroadcast {
        tick: u64,
        agent_id: AgentId,
        kind: WasteKind,
        position: Position,
    },

    OfferAccepted {
        tick: u64,
        agent_id: AgentId,
        offerer: AgentId,
        rendezvous: Position,
    },

    PartnerAdopted {
        tick: u64,
        agent_id: AgentId,
        partner: AgentId,
        rendezvous: Position,
    },

    OfferWithdrawn {
        tick: u64,
        agent_id: AgentId,
    },

    WhereSent {
        tick: u64,
        agent_id: AgentId,
        partner: AgentId,
    },

    HereSent {
        tick: u64,
        agent_id: AgentId,
        partner: AgentId,
        position: Position,
    },

    TransferSent {
        tick: u64,
        agent_id: AgentId,
        partner: AgentId,
        items: Vec<ItemId>,
    },

    TransferReceived {
        tick: u64,
        agent_id: AgentId,
        from: AgentId,
        items: Vec<ItemId>,
    },

    HandshakeAbandoned {
        tick: u64,
        agent_id: AgentId,
        partner: AgentId,
    },

    /// Termination oracle changed its verdict
    StatusChanged {
        tick: u64,
        status: Status,
    },
}

impl Event {
    pub fn tick(&self) -> u64 {
        match self {
            Event::Moved { tick, .. }
            | Event::ItemsSighted { tick, .. }
            | Event::Claimed { tick, .. }
            | Event::Released { tick, .. }
            | Event::PickedUp { tick, .. }
            | Event::Combined { tick, .. }
            | Event::Delivered { tick, .. }
            | Event::OfferBroadcast { tick, .. }
            | Event::OfferAccepted { tick, .. }
            | Event::PartnerAdopted { tick, .. }
            | Event::OfferWithdrawn { tick, .. }
            | Event::WhereSent { tick, .. }
            | Event::HereSent { tick, .. }
            | Event::TransferSent { tick, .. }
            | Event::TransferReceived { tick, .. }
            | Event::HandshakeAbandoned { tick, .. }
            | Event::StatusChanged { tick, .. } => *tick,
        }
    }

    /// Acting agent, if the event has one
    pub fn agent_id(&self) -> Option<AgentId> {
        match self {
            Event::Moved { agent_id, .. }
            | Event::ItemsSighted { agent_id, .. }
            | Event::Claimed { agent_id, .. }
            | Event::Released { agent_id, .. }
            | Event::PickedUp { agent_id, .. }
            | Event::Combined { agent_id, .. }
            | Event::Delivered { agent_id, .. }
            | Event::OfferBroadcast { agent_id, .. }
            | Event::OfferAccepted { agent_id, .. }
            | Event::PartnerAdopted { agent_id, .. }
            | Event::OfferWithdrawn { agent_id, .. }
            | Event::WhereSent { agent_id, .. }
            | Event::HereSent { agent_id, .. }
            | Event::TransferSent { agent_id, .. }
            | Event::TransferReceived { agent_id, .. }
            | Event::HandshakeAbandoned { agent_id, .. } => Some(*agent_id),
            Event::StatusChanged { .. } => None,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Moved { .. } => "Moved",
            Event::ItemsSighted { .. } => "ItemsSighted",
            Event::Claimed { .. } => "Claimed",
            Event::Released { .. } => "Released",
            Event::PickedUp { .. } => "PickedUp",
            Event::Combined { .. } => "Combined",
            Event::Delivered { .. } => "Delivered",
            Event::OfferBroadcast { .. } => "OfferBroadcast",
            Event::OfferAccepted { .. } => "OfferAccepted",
            Event::PartnerAdopted { .. } => "PartnerAdopted",
            Event::OfferWithdrawn { .. } => "OfferWithdrawn",
            Event::WhereSent { .. } => "WhereSent",
            Event::HereSent { .. } => "HereSent",
            Event::TransferSent { .. } => "TransferSent",
            Event::TransferReceived { .. } => "TransferReceived",
            Event::HandshakeAbandoned { .. } => "HandshakeAbandoned",
            Event::StatusChanged { .. } => "StatusChanged",
        }
    }
}

/// Append-only event log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events logged since index `start`, for per-tick forwarding
    pub fn since(&self, start: usize) -> &[Event] {
        self.events.get(start..).unwrap_or(&[])
    }

    pub fn events_at_tick(&self, tick: u64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_agent(&self, agent_id: AgentId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.agent_id() == Some(agent_id))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(tick: u64, agent_id: AgentId) -> Event {
        Event::Moved {
            tick,
            agent_id,
            from: Position::new(0, 0),
            to: Position::new(1, 0),
        }
    }

    #[test]
    fn test_event_accessors() {
        let event = Event::OfferWithdrawn {
            tick: 9,
            agent_id: 4,
        };
        assert_eq!(event.tick(), 9);
        assert_eq!(event.agent_id(), Some(4));
        assert_eq!(event.event_type(), "OfferWithdrawn");

        let status = Event::StatusChanged {
            tick: 2,
            status: Status::Won,
        };
        assert_eq!(status.agent_id(), None);
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.log(moved(1, 0));
        log.log(moved(1, 1));
        log.log(moved(2, 0));

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_at_tick(1).len(), 2);
        assert_eq!(log.events_for_agent(0).len(), 2);
        assert_eq!(log.events_of_type("Moved").len(), 3);
        assert_eq!(log.since(2).len(), 1);
        assert!(log.since(10).is_empty());
    }
}

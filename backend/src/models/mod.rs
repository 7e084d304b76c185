//! Domain models for the robot mission simulator

pub mod agent;
pub mod event;
pub mod grid;
pub mod message;
pub mod tier;
pub mod waste;
pub mod zone;

/// Stable agent identifier (index into the roster).
pub type AgentId = u32;
/// Stable waste item identifier (arena key).
pub type ItemId = u64;

// Re-exports
pub use agent::{Agent, Handshake, HandshakeRole, Rendezvous, ScoutCursor};
pub use event::{Event, EventLog};
pub use grid::{Grid, MoveError, Position};
pub use message::{Message, MessageBody, MessageKind};
pub use tier::{DeliveryOutcome, DeliveryRule, DeliveryTarget, Tier};
pub use waste::{ItemCounts, Owner, WasteItem, WasteKind};
pub use zone::{Zone, ZoneMap};

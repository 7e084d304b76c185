//! Agent (robot) model
//!
//! Holds the per-robot state the decision procedure in `behavior` reads and
//! mutates each tick:
//! - tier, position and distance travelled
//! - carried items (off the grid) and assigned items (claimed, still on grid)
//! - scouting cursor for the boustrophedon sweep
//! - handshake state for the OFFER/ACCEPT/TRANSFER protocol
//! - hunt progress: turns without a step towards the current target, and
//!   items given up on until a retry tick
//!
//! # Critical Invariants
//!
//! 1. Every carried item is owned `Carried(self)` in its kind's pool
//! 2. Every assigned item is owned `Claimed(self)` in its kind's pool

use crate::models::{AgentId, ItemId, Position, Tier, WasteItem, WasteKind};
use crate::policy::Heuristic;
use serde::{Deserialize, Serialize};

/// Which side of a handoff this agent plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandshakeRole {
    /// Broadcast the offer; walks to the partner and sends TRANSFER.
    Giver,
    /// Accepted the offer; waits at the rendezvous and answers WHERE.
    Receiver,
}

/// A committed handoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendezvous {
    pub partner: AgentId,
    pub point: Position,
    pub role: HandshakeRole,
    /// Tick the commitment was made.
    pub since: u64,
    /// A WHERE is outstanding and no HERE has arrived yet.
    pub awaiting_reply: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Handshake {
    #[default]
    Idle,
    /// An OFFER from this agent sits on the bus.
    Offering { since: u64 },
    Committed(Rendezvous),
}

impl Handshake {
    pub fn is_idle(&self) -> bool {
        matches!(self, Handshake::Idle)
    }

    pub fn partner(&self) -> Option<AgentId> {
        match self {
            Handshake::Committed(r) => Some(r.partner),
            _ => None,
        }
    }
}

/// Boustrophedon sweep state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutCursor {
    /// Column currently being swept.
    pub column: i32,
    /// +1 sweeping south, -1 sweeping north.
    pub vertical: i32,
    /// +1 drifting east, -1 drifting west.
    pub drift: i32,
}

impl ScoutCursor {
    pub fn starting_at(column: i32) -> Self {
        Self {
            column,
            vertical: 1,
            drift: 1,
        }
    }
}

/// A collector robot
///
/// # Example
/// ```
/// use robot_mission_core_rs::{Agent, Heuristic, Position, Tier};
///
/// let agent = Agent::new(0, Tier::Green, Position::new(0, 0), Heuristic::Closest, 1);
/// assert_eq!(agent.carried_count(), 0);
/// assert!(agent.handshake().is_idle());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub(crate) id: AgentId,
    pub(crate) tier: Tier,
    pub(crate) position: Position,
    pub(crate) carrying: Vec<WasteItem>,
    pub(crate) assigned: Vec<WasteItem>,
    pub(crate) heuristic: Heuristic,
    pub(crate) vision_radius: u32,
    pub(crate) scout: Option<ScoutCursor>,
    pub(crate) handshake: Handshake,
    pub(crate) distance_travelled: u64,
    /// Consecutive hunting turns that failed to move towards the target.
    #[serde(default)]
    pub(crate) stalled: u32,
    /// Items released as unreachable, each ignored until the given tick.
    #[serde(default)]
    pub(crate) shunned: Vec<(ItemId, u64)>,
}

impl Agent {
    pub fn new(
        id: AgentId,
        tier: Tier,
        position: Position,
        heuristic: Heuristic,
        vision_radius: u32,
    ) -> Self {
        Self {
            id,
            tier,
            position,
            carrying: Vec::new(),
            assigned: Vec::new(),
            heuristic,
            vision_radius,
            scout: None,
            handshake: Handshake::Idle,
            distance_travelled: 0,
            stalled: 0,
            shunned: Vec::new(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn carrying(&self) -> &[WasteItem] {
        &self.carrying
    }

    pub fn assigned(&self) -> &[WasteItem] {
        &self.assigned
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn vision_radius(&self) -> u32 {
        self.vision_radius
    }

    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    pub fn scout_cursor(&self) -> Option<ScoutCursor> {
        self.scout
    }

    pub fn distance_travelled(&self) -> u64 {
        self.distance_travelled
    }

    /// Whether `id` was given up on and may not be claimed before `tick`.
    pub fn is_shunning(&self, id: ItemId, tick: u64) -> bool {
        self.shunned
            .iter()
            .any(|&(shunned, until)| shunned == id && tick < until)
    }

    pub fn carried_count(&self) -> usize {
        self.carrying.len()
    }

    pub fn carried_of(&self, kind: WasteKind) -> usize {
        self.carrying.iter().filter(|item| item.kind == kind).count()
    }

    pub fn is_carrying(&self, id: ItemId) -> bool {
        self.carrying.iter().any(|item| item.id == id)
    }

    pub fn is_assigned(&self, id: ItemId) -> bool {
        self.assigned.iter().any(|item| item.id == id)
    }

    /// Exactly one item, and it is this tier's input: the handoff precondition.
    /// Never true for tiers that do not combine.
    pub fn holds_single_input(&self) -> bool {
        self.tier.combines()
            && self.carrying.len() == 1
            && self.carrying[0].kind == self.tier.input()
    }
}

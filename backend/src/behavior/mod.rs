//! Agent Decision Procedure
//!
//! One generic procedure runs for every tier. Each turn the agent first
//! performs its bookkeeping (sense, answer WHERE queries, expire stale
//! handshakes), then evaluates a fixed priority list of guarded actions and
//! performs the first one whose guard holds:
//!
//! ```text
//! 1. Combine          enough inputs carried -> one output item
//! 2. Deliver          carrying output -> step towards target, drop on arrival
//! 3. Accept TRANSFER  merge items a partner sent
//! 4. Accept OFFER     holding a single input, idle -> reply ACCEPT
//! 5. Resolve OFFER    own offer answered -> commit; unanswered -> withdraw
//! 6. Broadcast OFFER  single input, nothing to claim -> announce and wait
//! 7. Handshake travel walk to the rendezvous, hand over on contact
//! 8. Hunt / scout     claim, walk, pick up; sweep the region otherwise
//! ```
//!
//! Every branch either acts or deliberately stands still, so a turn always
//! finishes. Contention misses (partial claims, no route) are ordinary
//! outcomes, retried next turn. An assignment the agent fails to approach for
//! [`STALL_LIMIT`] hunting turns goes back to its pool and is ignored by that
//! agent for [`RETRY_COOLDOWN`] ticks. Ownership violations surface as
//! [`SimulationError`] and abort the tick.

mod handshake;
mod scout;

pub use handshake::rendezvous_point;

use crate::coordination::{MessageBus, TaskPools, VisibilityTracker};
use crate::models::{
    Agent, DeliveryOutcome, DeliveryTarget, Event, EventLog, Grid, Position, WasteItem, ZoneMap,
};
use crate::orchestrator::SimulationError;
use crate::policy::{ClaimRanking, RankingContext};
use crate::routing::Pathfinder;
use serde::{Deserialize, Serialize};

/// Hunting turns without progress before an assignment is given back.
pub const STALL_LIMIT: u32 = 3;

/// Ticks a given-up item stays off an agent's claim list.
pub const RETRY_COOLDOWN: u64 = 20;

/// Everything an agent may touch during its turn
pub struct TurnContext<'a> {
    pub tick: u64,
    pub grid: &'a mut Grid,
    pub zones: &'a ZoneMap,
    pub pools: &'a TaskPools,
    pub bus: &'a MessageBus,
    pub ranking: &'a mut dyn ClaimRanking,
    /// Ticks a committed handshake may stay open.
    pub handshake_timeout: u64,
    pub log: &'a mut EventLog,
    /// Items destroyed at the disposal cell during this turn.
    pub disposed: u64,
    /// TRANSFER messages sent during this turn.
    pub transfers: u64,
}

/// Which branch of the procedure fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentAction {
    Combine,
    Deliver,
    AcceptTransfer,
    AcceptOffer,
    ResolveOffer,
    BroadcastOffer,
    HandshakeTravel,
    Hunt,
    Scout,
    /// Nothing to do: no claim, no route, region exhausted.
    Wait,
}

impl Agent {
    /// Run one turn.
    pub fn step(&mut self, ctx: &mut TurnContext<'_>) -> Result<AgentAction, SimulationError> {
        self.sense(ctx);
        self.answer_where(ctx);
        self.expire_handshake(ctx);

        if let Some(action) = self.try_combine(ctx)? {
            return Ok(action);
        }
        if let Some(action) = self.try_deliver(ctx)? {
            return Ok(action);
        }
        if let Some(action) = self.try_accept_transfer(ctx)? {
            return Ok(action);
        }
        if let Some(action) = self.try_accept_offer(ctx)? {
            return Ok(action);
        }
        if let Some(action) = self.try_resolve_offer(ctx) {
            return Ok(action);
        }
        if let Some(action) = self.try_broadcast_offer(ctx) {
            return Ok(action);
        }
        if let Some(action) = self.try_handshake_travel(ctx)? {
            return Ok(action);
        }
        self.hunt_or_scout(ctx)
    }

    // ========================================================================
    // Turn preamble
    // ========================================================================

    fn sense(&mut self, ctx: &mut TurnContext<'_>) {
        let fresh = VisibilityTracker::new(ctx.pools).sense(self.position, self.vision_radius);
        if fresh > 0 {
            ctx.log.log(Event::ItemsSighted {
                tick: ctx.tick,
                agent_id: self.id,
                count: fresh,
            });
        }
    }

    // ========================================================================
    // 1-2: Combine and deliver
    // ========================================================================

    fn try_combine(
        &mut self,
        ctx: &mut TurnContext<'_>,
    ) -> Result<Option<AgentAction>, SimulationError> {
        let input = self.tier.input();
        let required = self.tier.required_count();
        if !self.tier.combines() || self.carried_of(input) < required {
            return Ok(None);
        }

        let mut consumed = Vec::with_capacity(required);
        let mut kept = Vec::with_capacity(self.carrying.len());
        for item in self.carrying.drain(..) {
            if item.kind == input && consumed.len() < required {
                consumed.push(item);
            } else {
                kept.push(item);
            }
        }
        self.carrying = kept;

        let pool = ctx.pools.pool(input);
        for item in &consumed {
            pool.consume(self.id, item.id)?;
        }
        let output = ctx
            .pools
            .spawn_carried(self.tier.output(), self.position, self.id)?;
        self.carrying.push(output);

        ctx.log.log(Event::Combined {
            tick: ctx.tick,
            agent_id: self.id,
            consumed: consumed.iter().map(|item| item.id).collect(),
            produced: output.id,
            kind: output.kind,
        });
        self.reset_handshake(ctx);
        Ok(Some(AgentAction::Combine))
    }

    /// Where this agent's product goes.
    pub fn delivery_target(&self, grid: &Grid, zones: &ZoneMap) -> DeliveryTarget {
        self.tier
            .delivery_rule()
            .target(self.tier.boundary_x(zones), grid)
    }

    fn try_deliver(
        &mut self,
        ctx: &mut TurnContext<'_>,
    ) -> Result<Option<AgentAction>, SimulationError> {
        let output = self.tier.output();
        let Some(index) = self.carrying.iter().position(|item| item.kind == output) else {
            return Ok(None);
        };

        let target = self.delivery_target(ctx.grid, ctx.zones);
        if !target.reached(self.position) {
            if let Some(waypoint) = target.waypoint(self.position, ctx.grid) {
                self.navigate(ctx, waypoint)?;
            }
            if !target.reached(self.position) {
                return Ok(Some(AgentAction::Deliver));
            }
        }

        let item = self.carrying.remove(index);
        ctx.pools.pool(item.kind).consume(self.id, item.id)?;
        let outcome = self.tier.delivery_rule().outcome(item.kind);
        let spawned = match outcome {
            DeliveryOutcome::Respawn(kind) => Some(ctx.pools.spawn(kind, self.position)?.id),
            DeliveryOutcome::Dispose => {
                ctx.disposed += 1;
                None
            }
        };
        ctx.log.log(Event::Delivered {
            tick: ctx.tick,
            agent_id: self.id,
            item_id: item.id,
            outcome,
            spawned,
            position: self.position,
        });
        Ok(Some(AgentAction::Deliver))
    }

    // ========================================================================
    // 8: Hunt / scout
    // ========================================================================

    fn hunt_or_scout(&mut self, ctx: &mut TurnContext<'_>) -> Result<AgentAction, SimulationError> {
        self.claim_missing(ctx);

        if self.assigned.is_empty() {
            return self.scout_step(ctx);
        }

        if self.pick_up_here(ctx)? {
            return Ok(AgentAction::Hunt);
        }

        let here = self.position;
        let nearest = self
            .assigned
            .iter()
            .min_by_key(|item| here.chebyshev(item.position))
            .copied();
        let Some(goal) = nearest else {
            return Ok(AgentAction::Hunt);
        };
        if self.navigate(ctx, goal.position)? {
            self.pick_up_here(ctx)?;
            return Ok(AgentAction::Hunt);
        }

        self.stalled += 1;
        if self.stalled < STALL_LIMIT {
            return Ok(AgentAction::Hunt);
        }
        // No route to it from here: hand it back and look elsewhere for a while.
        self.stalled = 0;
        self.assigned.retain(|item| item.id != goal.id);
        self.release(ctx, goal)?;
        self.shunned.push((goal.id, ctx.tick + RETRY_COOLDOWN));
        Ok(AgentAction::Wait)
    }

    /// Top up assignments so that carried plus assigned inputs reach the
    /// tier's required count.
    fn claim_missing(&mut self, ctx: &mut TurnContext<'_>) {
        let tick = ctx.tick;
        self.shunned.retain(|&(_, until)| tick < until);

        let input = self.tier.input();
        let needed = self
            .tier
            .required_count()
            .saturating_sub(self.carried_of(input) + self.assigned.len());
        if needed == 0 {
            return;
        }

        let boundary = self.tier.boundary_x(ctx.zones);
        let ranking_ctx = RankingContext {
            origin: self.position,
            target: self.delivery_target(ctx.grid, ctx.zones),
            pathfinder: Pathfinder::confined(ctx.grid, boundary),
        };
        let ranking = &mut *ctx.ranking;
        let claimed = ctx.pools.pool(input).claim(
            self.id,
            needed,
            |item| item.position.x <= boundary && !self.is_shunning(item.id, tick),
            |candidates| ranking.rank(candidates, &ranking_ctx),
        );

        for item in claimed {
            ctx.log.log(Event::Claimed {
                tick: ctx.tick,
                agent_id: self.id,
                item_id: item.id,
                kind: item.kind,
            });
            self.assigned.push(item);
        }
    }

    /// Pick up every assigned item lying on the current cell.
    fn pick_up_here(&mut self, ctx: &mut TurnContext<'_>) -> Result<bool, SimulationError> {
        let here = self.position;
        let (ready, waiting): (Vec<_>, Vec<_>) = self
            .assigned
            .drain(..)
            .partition(|item| item.position == here);
        self.assigned = waiting;

        let picked = !ready.is_empty();
        for item in ready {
            let item = ctx.pools.pool(item.kind).pick_up(self.id, item.id, here)?;
            ctx.log.log(Event::PickedUp {
                tick: ctx.tick,
                agent_id: self.id,
                item_id: item.id,
                kind: item.kind,
                position: here,
            });
            self.carrying.push(item);
        }
        Ok(picked)
    }

    /// Give every assignment back to its pool.
    fn release_assignments(&mut self, ctx: &mut TurnContext<'_>) -> Result<(), SimulationError> {
        for item in std::mem::take(&mut self.assigned) {
            self.release(ctx, item)?;
        }
        Ok(())
    }

    fn release(&self, ctx: &mut TurnContext<'_>, item: WasteItem) -> Result<(), SimulationError> {
        ctx.pools.pool(item.kind).release(self.id, item.id)?;
        ctx.log.log(Event::Released {
            tick: ctx.tick,
            agent_id: self.id,
            item_id: item.id,
        });
        Ok(())
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Take one step towards `goal` inside the tier's region. Agents whose
    /// ranking searches paths follow A*; the rest step greedily. Returns
    /// whether the agent moved.
    fn navigate(&mut self, ctx: &mut TurnContext<'_>, goal: Position) -> Result<bool, SimulationError> {
        if self.position == goal {
            return Ok(false);
        }
        let next = {
            let finder = Pathfinder::confined(ctx.grid, self.tier.boundary_x(ctx.zones));
            if ctx.ranking.uses_path_search() {
                finder.astar(self.position, goal).first().copied()
            } else {
                finder.step_towards(self.position, goal)
            }
        };
        match next {
            Some(cell) => {
                self.move_to(ctx, cell)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn move_to(&mut self, ctx: &mut TurnContext<'_>, cell: Position) -> Result<(), SimulationError> {
        ctx.grid.move_agent(self.id, cell)?;
        let from = self.position;
        self.position = cell;
        self.distance_travelled += 1;
        self.stalled = 0;
        ctx.log.log(Event::Moved {
            tick: ctx.tick,
            agent_id: self.id,
            from,
            to: cell,
        });
        Ok(())
    }
}

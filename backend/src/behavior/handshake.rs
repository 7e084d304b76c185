//! OFFER / ACCEPT / WHERE / HERE / TRANSFER handoff
//!
//! Lets two same-tier agents that each hold a single input item meet and
//! consolidate. The offerer becomes the giver, the acceptor the receiver.
//! Both derive the same rendezvous point from the two positions exchanged in
//! OFFER and ACCEPT. Ownership of transferred items moves in the pool ledger
//! when TRANSFER is sent; the receiver merges them when it reads it.

use super::{AgentAction, TurnContext};
use crate::models::{
    Agent, AgentId, Event, Handshake, HandshakeRole, Message, MessageBody, MessageKind, Owner,
    Position, Rendezvous,
};
use crate::orchestrator::SimulationError;
use crate::routing::Pathfinder;

/// Meeting cell for two agents: the integer midpoint, or the nearest open
/// cell to it scanning Chebyshev rings outward in row-major order. Symmetric
/// in its two positions.
pub fn rendezvous_point(a: Position, b: Position, finder: &Pathfinder<'_>) -> Position {
    let mid = a.midpoint(b);
    if finder.is_open(mid) {
        return mid;
    }
    let grid = finder.grid();
    let max_radius = grid.width().max(grid.height());
    for radius in 1..=max_radius {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let cell = Position::new(mid.x + dx, mid.y + dy);
                if finder.is_open(cell) {
                    return cell;
                }
            }
        }
    }
    a.min(b)
}

impl Agent {
    fn region<'c>(&self, ctx: &'c TurnContext<'_>) -> Pathfinder<'c> {
        Pathfinder::confined(ctx.grid, self.tier.boundary_x(ctx.zones))
    }

    /// Reply HERE to WHERE queries from the committed partner. A receiver
    /// also pins the rendezvous to where it stands. Queries from anyone else
    /// are stale and dropped.
    pub(super) fn answer_where(&mut self, ctx: &mut TurnContext<'_>) {
        let me = self.id;
        let queries = ctx
            .bus
            .drain(|m| m.is_for(me) && m.kind() == MessageKind::Where);

        for query in queries {
            let Handshake::Committed(rendezvous) = &mut self.handshake else {
                continue;
            };
            if rendezvous.partner != query.sender {
                continue;
            }
            if rendezvous.role == HandshakeRole::Receiver {
                rendezvous.point = self.position;
            }
            ctx.bus.send(Message::direct(
                me,
                query.sender,
                ctx.tick,
                MessageBody::Here {
                    position: self.position,
                },
            ));
            ctx.log.log(Event::HereSent {
                tick: ctx.tick,
                agent_id: me,
                partner: query.sender,
                position: self.position,
            });
        }
    }

    /// Drop a committed handshake that has been open for too long.
    pub(super) fn expire_handshake(&mut self, ctx: &mut TurnContext<'_>) {
        let Handshake::Committed(rendezvous) = self.handshake else {
            return;
        };
        if ctx.tick.saturating_sub(rendezvous.since) < ctx.handshake_timeout {
            return;
        }
        ctx.log.log(Event::HandshakeAbandoned {
            tick: ctx.tick,
            agent_id: self.id,
            partner: rendezvous.partner,
        });
        self.reset_handshake(ctx);
    }

    /// Back to idle, withdrawing anything this handshake left on the bus.
    /// TRANSFER messages are never withdrawn: they carry owned items.
    pub(super) fn reset_handshake(&mut self, ctx: &mut TurnContext<'_>) {
        let me = self.id;
        match self.handshake {
            Handshake::Idle => {}
            Handshake::Offering { .. } => {
                ctx.bus
                    .withdraw(|m| m.sender == me && m.kind() == MessageKind::Offer);
            }
            Handshake::Committed(rendezvous) => {
                let partner = rendezvous.partner;
                ctx.bus.withdraw(|m| {
                    let between = (m.sender == me && m.is_for(partner))
                        || (m.sender == partner && m.is_for(me));
                    between && matches!(m.kind(), MessageKind::Where | MessageKind::Here)
                });
            }
        }
        self.handshake = Handshake::Idle;
    }

    // ========================================================================
    // 3: Accept TRANSFER
    // ========================================================================

    pub(super) fn try_accept_transfer(
        &mut self,
        ctx: &mut TurnContext<'_>,
    ) -> Result<Option<AgentAction>, SimulationError> {
        let me = self.id;
        let transfers = ctx
            .bus
            .drain(|m| m.is_for(me) && m.kind() == MessageKind::Transfer);
        if transfers.is_empty() {
            return Ok(None);
        }

        for message in transfers {
            let MessageBody::Transfer { items } = message.body else {
                continue;
            };
            for item in &items {
                let owner = ctx.pools.pool(item.kind).owner_of(item.id);
                if owner != Some(Owner::Carried(me)) {
                    return Err(SimulationError::InvariantViolation(format!(
                        "agent {me} received item {} owned by {owner:?}",
                        item.id
                    )));
                }
            }
            ctx.log.log(Event::TransferReceived {
                tick: ctx.tick,
                agent_id: me,
                from: message.sender,
                items: items.iter().map(|item| item.id).collect(),
            });
            self.carrying.extend(items);
        }

        self.reset_handshake(ctx);
        Ok(Some(AgentAction::AcceptTransfer))
    }

    // ========================================================================
    // 4-6: Offers
    // ========================================================================

    pub(super) fn try_accept_offer(
        &mut self,
        ctx: &mut TurnContext<'_>,
    ) -> Result<Option<AgentAction>, SimulationError> {
        if !self.holds_single_input() || !self.handshake.is_idle() {
            return Ok(None);
        }

        let me = self.id;
        let input = self.tier.input();
        let offer = ctx.bus.take(|m| {
            m.sender != me
                && m.recipient.is_none()
                && matches!(m.body, MessageBody::Offer { kind, .. } if kind == input)
        });
        let Some(offer) = offer else {
            return Ok(None);
        };
        let MessageBody::Offer {
            position: their_position,
            ..
        } = offer.body
        else {
            return Ok(None);
        };

        self.release_assignments(ctx)?;
        let point = rendezvous_point(self.position, their_position, &self.region(ctx));
        ctx.bus.send(Message::direct(
            me,
            offer.sender,
            ctx.tick,
            MessageBody::Accept {
                position: self.position,
            },
        ));
        self.handshake = Handshake::Committed(Rendezvous {
            partner: offer.sender,
            point,
            role: HandshakeRole::Receiver,
            since: ctx.tick,
            awaiting_reply: false,
        });
        ctx.log.log(Event::OfferAccepted {
            tick: ctx.tick,
            agent_id: me,
            offerer: offer.sender,
            rendezvous: point,
        });
        Ok(Some(AgentAction::AcceptOffer))
    }

    pub(super) fn try_resolve_offer(&mut self, ctx: &mut TurnContext<'_>) -> Option<AgentAction> {
        let Handshake::Offering { since } = self.handshake else {
            return None;
        };

        let me = self.id;
        let accept = ctx
            .bus
            .take(|m| m.is_for(me) && m.kind() == MessageKind::Accept);
        if let Some(Message {
            sender,
            body: MessageBody::Accept { position },
            ..
        }) = accept
        {
            let point = rendezvous_point(self.position, position, &self.region(ctx));
            self.handshake = Handshake::Committed(Rendezvous {
                partner: sender,
                point,
                role: HandshakeRole::Giver,
                since: ctx.tick,
                awaiting_reply: false,
            });
            ctx.log.log(Event::PartnerAdopted {
                tick: ctx.tick,
                agent_id: me,
                partner: sender,
                rendezvous: point,
            });
            return Some(AgentAction::ResolveOffer);
        }

        if ctx.tick > since {
            self.reset_handshake(ctx);
            ctx.log.log(Event::OfferWithdrawn {
                tick: ctx.tick,
                agent_id: me,
            });
            return Some(AgentAction::ResolveOffer);
        }
        Some(AgentAction::Wait)
    }

    pub(super) fn try_broadcast_offer(&mut self, ctx: &mut TurnContext<'_>) -> Option<AgentAction> {
        if !self.holds_single_input() || !self.assigned.is_empty() || !self.handshake.is_idle() {
            return None;
        }
        let input = self.tier.input();
        let boundary = self.tier.boundary_x(ctx.zones);
        let visible = crate::coordination::VisibilityTracker::new(ctx.pools)
            .any_claimable(input, |item| item.position.x <= boundary);
        if visible {
            return None;
        }

        ctx.bus.send(Message::broadcast(
            self.id,
            ctx.tick,
            MessageBody::Offer {
                position: self.position,
                kind: input,
            },
        ));
        self.handshake = Handshake::Offering { since: ctx.tick };
        ctx.log.log(Event::OfferBroadcast {
            tick: ctx.tick,
            agent_id: self.id,
            kind: input,
            position: self.position,
        });
        Some(AgentAction::BroadcastOffer)
    }

    // ========================================================================
    // 7: Travel and hand over
    // ========================================================================

    pub(super) fn try_handshake_travel(
        &mut self,
        ctx: &mut TurnContext<'_>,
    ) -> Result<Option<AgentAction>, SimulationError> {
        let Handshake::Committed(mut rendezvous) = self.handshake else {
            return Ok(None);
        };

        let me = self.id;
        let partner = rendezvous.partner;
        for reply in ctx
            .bus
            .drain(|m| m.is_for(me) && m.kind() == MessageKind::Here)
        {
            match reply.body {
                MessageBody::Here { position } if reply.sender == partner => {
                    rendezvous.point = position;
                    rendezvous.awaiting_reply = false;
                }
                _ => {}
            }
        }
        self.handshake = Handshake::Committed(rendezvous);

        if self.position != rendezvous.point {
            self.navigate(ctx, rendezvous.point)?;
            if self.position != rendezvous.point {
                return Ok(Some(AgentAction::HandshakeTravel));
            }
        }

        if rendezvous.role == HandshakeRole::Receiver {
            return Ok(Some(AgentAction::HandshakeTravel));
        }

        if ctx.grid.agents_at(self.position).contains(&partner) {
            self.hand_over(ctx, partner)?;
        } else if !rendezvous.awaiting_reply {
            rendezvous.awaiting_reply = true;
            self.handshake = Handshake::Committed(rendezvous);
            ctx.bus
                .send(Message::direct(me, partner, ctx.tick, MessageBody::Where));
            ctx.log.log(Event::WhereSent {
                tick: ctx.tick,
                agent_id: me,
                partner,
            });
        }
        Ok(Some(AgentAction::HandshakeTravel))
    }

    /// Send the whole inventory to `partner`. Ownership moves now.
    fn hand_over(
        &mut self,
        ctx: &mut TurnContext<'_>,
        partner: AgentId,
    ) -> Result<(), SimulationError> {
        let items = std::mem::take(&mut self.carrying);
        for item in &items {
            ctx.pools.pool(item.kind).transfer(self.id, partner, item.id)?;
        }
        ctx.log.log(Event::TransferSent {
            tick: ctx.tick,
            agent_id: self.id,
            partner,
            items: items.iter().map(|item| item.id).collect(),
        });
        ctx.bus.send(Message::direct(
            self.id,
            partner,
            ctx.tick,
            MessageBody::Transfer { items },
        ));
        ctx.transfers += 1;
        self.reset_handshake(ctx);
        Ok(())
    }
}

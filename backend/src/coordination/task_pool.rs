//! Per-kind task pools
//!
//! Each [`TaskPool`] is the ownership ledger for every live item of one waste
//! kind. Items are stored in an arena keyed by [`ItemId`] and tagged with a
//! single [`Owner`]; the pool's unclaimed list and its share of the seen-set
//! sit behind the same mutex.
//!
//! # Critical Invariants
//!
//! - **Exclusivity**: an item id is claimed or carried by at most one agent,
//!   and a claimed item is never in the unclaimed list
//! - **Atomic hand-out**: selection, removal from the unclaimed list and the
//!   owner change happen under one lock acquisition
//! - **Atomic pickup**: the owner change and removal from the seen-set happen
//!   under one lock acquisition

use super::lock;
use crate::models::{AgentId, ItemCounts, ItemId, Owner, Position, WasteItem, WasteKind};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Ownership violations reported by a pool
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Item {0} is not in the {1} pool")]
    UnknownItem(ItemId, WasteKind),

    #[error("Item {item} is {actual}, pool holds {expected}")]
    WrongKind {
        item: ItemId,
        expected: WasteKind,
        actual: WasteKind,
    },

    #[error("Item {0} is already registered")]
    DuplicateItem(ItemId),

    #[error("Item {item} is not claimed by agent {agent} (owner: {owner:?})")]
    NotClaimedBy {
        item: ItemId,
        agent: AgentId,
        owner: Owner,
    },

    #[error("Item {item} is not carried by agent {agent} (owner: {owner:?})")]
    NotCarriedBy {
        item: ItemId,
        agent: AgentId,
        owner: Owner,
    },

    #[error("Item {item} lies at {actual}, not at {expected}")]
    NotAtPosition {
        item: ItemId,
        expected: Position,
        actual: Position,
    },
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    item: WasteItem,
    owner: Owner,
}

#[derive(Debug, Default)]
struct PoolState {
    entries: BTreeMap<ItemId, Entry>,
    /// Unclaimed ids in the order they entered the pool.
    unclaimed: Vec<ItemId>,
    seen: HashSet<ItemId>,
}

impl PoolState {
    fn entry_mut(&mut self, id: ItemId, kind: WasteKind) -> Result<&mut Entry, PoolError> {
        self.entries
            .get_mut(&id)
            .ok_or(PoolError::UnknownItem(id, kind))
    }
}

/// Lock-guarded ledger for one waste kind
///
/// # Example
/// ```
/// use robot_mission_core_rs::coordination::TaskPool;
/// use robot_mission_core_rs::models::{Position, WasteItem, WasteKind};
///
/// let pool = TaskPool::new(WasteKind::Green);
/// let item = WasteItem { id: 1, kind: WasteKind::Green, position: Position::new(0, 0) };
/// pool.add(item).unwrap();
///
/// // Nobody has seen it yet, so it cannot be claimed.
/// assert!(pool.claim(0, 1, |_| true, |_| {}).is_empty());
///
/// pool.observe(Position::new(1, 1), 1);
/// assert_eq!(pool.claim(0, 1, |_| true, |_| {}), vec![item]);
/// ```
#[derive(Debug)]
pub struct TaskPool {
    kind: WasteKind,
    state: Mutex<PoolState>,
}

impl TaskPool {
    pub fn new(kind: WasteKind) -> Self {
        Self {
            kind,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn kind(&self) -> WasteKind {
        self.kind
    }

    fn check_kind(&self, item: &WasteItem) -> Result<(), PoolError> {
        if item.kind != self.kind {
            return Err(PoolError::WrongKind {
                item: item.id,
                expected: self.kind,
                actual: item.kind,
            });
        }
        Ok(())
    }

    /// Insert a new item on the grid as unclaimed.
    pub fn add(&self, item: WasteItem) -> Result<(), PoolError> {
        self.check_kind(&item)?;
        let mut state = lock(&self.state);
        if state.entries.contains_key(&item.id) {
            return Err(PoolError::DuplicateItem(item.id));
        }
        state.entries.insert(
            item.id,
            Entry {
                item,
                owner: Owner::Pool,
            },
        );
        state.unclaimed.push(item.id);
        Ok(())
    }

    /// Register an item that comes into existence already in `agent`'s
    /// inventory (the output of a combine).
    pub fn register_carried(&self, item: WasteItem, agent: AgentId) -> Result<(), PoolError> {
        self.check_kind(&item)?;
        let mut state = lock(&self.state);
        if state.entries.contains_key(&item.id) {
            return Err(PoolError::DuplicateItem(item.id));
        }
        state.entries.insert(
            item.id,
            Entry {
                item,
                owner: Owner::Carried(agent),
            },
        );
        Ok(())
    }

    /// Claim up to `n` unclaimed, already-seen items passing `filter`.
    ///
    /// Candidates are handed to `rank` in pool insertion order; `rank` may
    /// reorder them and the first `n` are claimed. Returns fewer than `n`
    /// (possibly none) when not enough qualify. Never blocks beyond the lock.
    pub fn claim<F, R>(&self, agent: AgentId, n: usize, filter: F, rank: R) -> Vec<WasteItem>
    where
        F: Fn(&WasteItem) -> bool,
        R: FnOnce(&mut Vec<WasteItem>),
    {
        if n == 0 {
            return Vec::new();
        }

        let mut guard = lock(&self.state);
        let state = &mut *guard;

        let mut candidates: Vec<WasteItem> = state
            .unclaimed
            .iter()
            .filter(|id| state.seen.contains(id))
            .filter_map(|id| state.entries.get(id))
            .map(|entry| entry.item)
            .filter(|item| filter(item))
            .collect();
        if candidates.is_empty() {
            return candidates;
        }

        rank(&mut candidates);

        let mut claimed = Vec::with_capacity(n);
        for item in candidates {
            if claimed.len() == n {
                break;
            }
            if let Some(entry) = state.entries.get_mut(&item.id) {
                if entry.owner == Owner::Pool {
                    entry.owner = Owner::Claimed(agent);
                    claimed.push(entry.item);
                }
            }
        }
        state
            .unclaimed
            .retain(|id| !claimed.iter().any(|item| item.id == *id));
        claimed
    }

    /// Return a claimed item to the back of the pool.
    pub fn release(&self, agent: AgentId, id: ItemId) -> Result<WasteItem, PoolError> {
        let mut state = lock(&self.state);
        let entry = state.entry_mut(id, self.kind)?;
        if entry.owner != Owner::Claimed(agent) {
            return Err(PoolError::NotClaimedBy {
                item: id,
                agent,
                owner: entry.owner,
            });
        }
        entry.owner = Owner::Pool;
        let item = entry.item;
        state.unclaimed.push(id);
        Ok(item)
    }

    /// Lift a claimed item off the grid at `at`.
    ///
    /// Succeeds only if `agent` holds the claim and the item lies on `at`.
    /// The item leaves the seen-set in the same critical section.
    pub fn pick_up(&self, agent: AgentId, id: ItemId, at: Position) -> Result<WasteItem, PoolError> {
        let mut state = lock(&self.state);
        let entry = state.entry_mut(id, self.kind)?;
        if entry.owner != Owner::Claimed(agent) {
            return Err(PoolError::NotClaimedBy {
                item: id,
                agent,
                owner: entry.owner,
            });
        }
        if entry.item.position != at {
            return Err(PoolError::NotAtPosition {
                item: id,
                expected: at,
                actual: entry.item.position,
            });
        }
        entry.owner = Owner::Carried(agent);
        let item = entry.item;
        state.seen.remove(&id);
        Ok(item)
    }

    /// Move a carried item from one agent's inventory to another's.
    pub fn transfer(&self, from: AgentId, to: AgentId, id: ItemId) -> Result<(), PoolError> {
        let mut state = lock(&self.state);
        let entry = state.entry_mut(id, self.kind)?;
        if entry.owner != Owner::Carried(from) {
            return Err(PoolError::NotCarriedBy {
                item: id,
                agent: from,
                owner: entry.owner,
            });
        }
        entry.owner = Owner::Carried(to);
        Ok(())
    }

    /// Destroy a carried item (combined away, dropped or disposed).
    pub fn consume(&self, agent: AgentId, id: ItemId) -> Result<WasteItem, PoolError> {
        let mut state = lock(&self.state);
        let owner = state.entry_mut(id, self.kind)?.owner;
        if owner != Owner::Carried(agent) {
            return Err(PoolError::NotCarriedBy {
                item: id,
                agent,
                owner,
            });
        }
        state.seen.remove(&id);
        state
            .entries
            .remove(&id)
            .map(|entry| entry.item)
            .ok_or(PoolError::UnknownItem(id, self.kind))
    }

    /// Mark every on-grid item within Chebyshev `radius` of `center` as seen.
    /// Returns how many were newly seen.
    pub fn observe(&self, center: Position, radius: u32) -> usize {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        let mut fresh = 0;
        for entry in state.entries.values() {
            if entry.owner.is_on_grid()
                && entry.item.position.chebyshev(center) <= radius
                && state.seen.insert(entry.item.id)
            {
                fresh += 1;
            }
        }
        fresh
    }

    /// Whether any unclaimed, seen item passes `filter`.
    pub fn has_visible_unclaimed<F>(&self, filter: F) -> bool
    where
        F: Fn(&WasteItem) -> bool,
    {
        let state = lock(&self.state);
        state
            .unclaimed
            .iter()
            .filter(|id| state.seen.contains(id))
            .filter_map(|id| state.entries.get(id))
            .any(|entry| filter(&entry.item))
    }

    pub fn is_seen(&self, id: ItemId) -> bool {
        lock(&self.state).seen.contains(&id)
    }

    pub fn seen_count(&self) -> usize {
        lock(&self.state).seen.len()
    }

    pub fn owner_of(&self, id: ItemId) -> Option<Owner> {
        lock(&self.state).entries.get(&id).map(|entry| entry.owner)
    }

    /// On-grid items (unclaimed or claimed) lying at `pos`.
    pub fn items_at(&self, pos: Position) -> Vec<WasteItem> {
        lock(&self.state)
            .entries
            .values()
            .filter(|entry| entry.owner.is_on_grid() && entry.item.position == pos)
            .map(|entry| entry.item)
            .collect()
    }

    /// Every live item with its owner, ascending by id.
    pub fn snapshot(&self) -> Vec<(WasteItem, Owner)> {
        lock(&self.state)
            .entries
            .values()
            .map(|entry| (entry.item, entry.owner))
            .collect()
    }

    /// Live items in any state.
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unclaimed_len(&self) -> usize {
        lock(&self.state).unclaimed.len()
    }
}

/// The three per-kind pools plus the item id allocator
#[derive(Debug)]
pub struct TaskPools {
    green: TaskPool,
    yellow: TaskPool,
    red: TaskPool,
    next_id: AtomicU64,
}

impl Default for TaskPools {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskPools {
    pub fn new() -> Self {
        Self {
            green: TaskPool::new(WasteKind::Green),
            yellow: TaskPool::new(WasteKind::Yellow),
            red: TaskPool::new(WasteKind::Red),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn pool(&self, kind: WasteKind) -> &TaskPool {
        match kind {
            WasteKind::Green => &self.green,
            WasteKind::Yellow => &self.yellow,
            WasteKind::Red => &self.red,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskPool> {
        [&self.green, &self.yellow, &self.red].into_iter()
    }

    fn allocate(&self, kind: WasteKind, position: Position) -> WasteItem {
        WasteItem {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            position,
        }
    }

    /// Create a new unclaimed item on the grid.
    pub fn spawn(&self, kind: WasteKind, position: Position) -> Result<WasteItem, PoolError> {
        let item = self.allocate(kind, position);
        self.pool(kind).add(item)?;
        Ok(item)
    }

    /// Create a new item directly in `agent`'s inventory.
    pub fn spawn_carried(
        &self,
        kind: WasteKind,
        position: Position,
        agent: AgentId,
    ) -> Result<WasteItem, PoolError> {
        let item = self.allocate(kind, position);
        self.pool(kind).register_carried(item, agent)?;
        Ok(item)
    }

    /// Live counts per kind, any state.
    pub fn counts(&self) -> ItemCounts {
        let mut counts = ItemCounts::default();
        for pool in self.iter() {
            counts.set(pool.kind(), pool.len());
        }
        counts
    }

    /// On-grid items of every kind at `pos`.
    pub fn contents(&self, pos: Position) -> Vec<WasteItem> {
        self.iter().flat_map(|pool| pool.items_at(pos)).collect()
    }
}

//! Chain reaction resolution.
//!
//! A placement adds one unit to a cell. Any cell whose units reach its
//! critical mass explodes: it loses critical-mass units and hands one to
//! each orthogonal neighbour, taking the neighbour over. Explosions are
//! processed from a FIFO worklist of cell indices until it drains.
//!
//! Every mutation is applied eagerly, one explosion at a time, so a cell is
//! resolved with whatever units and owner it holds when it is popped. The
//! result is the same whether the cascade runs in one call or is stepped
//! from outside.
//!
//! Headquarters never receive units. An explosion next to an enemy HQ costs
//! that HQ one point of health instead; an explosion next to the player's
//! own HQ simply loses the unit.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::game::{
    critical_mass, geometry::neighbor_indices, Coord, GameState, Mode, PlayerId, PowerUpKind,
    MAX_PLAYERS,
};

/// Explosions allowed per board cell before a cascade is cut off.
///
/// Classic boards saturated by a single player would otherwise explode
/// forever.
pub const EXPLOSION_BUDGET_PER_CELL: usize = 64;

/// A change to a headquarters' health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HqEvent {
    /// The HQ lost one point of health.
    Damaged {
        /// Owner of the HQ.
        owner: PlayerId,
        /// Player who caused the damage.
        by: PlayerId,
        /// Health after the hit.
        health: u8,
    },
    /// The HQ regained one point of health.
    Healed {
        /// Owner of the HQ.
        owner: PlayerId,
        /// Health after healing.
        health: u8,
    },
}

/// A single resolved explosion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explosion {
    /// Cell that exploded.
    pub coord: Coord,
    /// Player the units were spread for.
    pub owner: PlayerId,
    /// Wave number: 0 for cells queued at the start, n+1 for cells set off
    /// by wave n.
    pub depth: u32,
}

/// Everything that happened while resolving one move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeLog {
    /// Explosions in the order they were resolved.
    pub explosions: Vec<Explosion>,
    /// HQ damage and healing in the order it happened.
    pub hq_events: Vec<HqEvent>,
    /// Deepest wave reached (0 when nothing exploded).
    pub max_depth: u32,
    /// True if the cascade hit the explosion budget and was cut off.
    pub truncated: bool,
    /// Power-up consumed by the move, if any.
    pub power_up: Option<PowerUpKind>,
    /// Units that landed on the exploding player's own HQ and were lost.
    pub absorbed: u32,
}

impl CascadeLog {
    /// Number of cells that exploded.
    #[must_use]
    pub fn explosion_count(&self) -> usize {
        self.explosions.len()
    }

    /// Total HQ damage dealt.
    #[must_use]
    pub fn damage_dealt(&self) -> usize {
        self.hq_events
            .iter()
            .filter(|e| matches!(e, HqEvent::Damaged { .. }))
            .count()
    }

    /// Units the cascade took off the board: one per hit on an enemy HQ
    /// plus those absorbed by the exploding player's own HQ. A Heart strike
    /// damages without spending a unit and is not counted.
    #[must_use]
    pub fn units_removed(&self) -> u64 {
        let hits = if self.power_up == Some(PowerUpKind::Heart) {
            0
        } else {
            self.hq_events
                .iter()
                .filter(|e| matches!(e, HqEvent::Damaged { .. }))
                .map(|_| 1u64)
                .sum()
        };
        hits + u64::from(self.absorbed)
    }
}

/// Add one unit to a cell for `player`.
///
/// Taking an enemy-held cell resets it to a single unit. Own and empty cells
/// simply gain a unit. Legal ordinary moves never target enemy cells.
pub fn place_unit(state: &mut GameState, coord: Coord, player: PlayerId) {
    if let Some(cell) = state.board.get_mut(coord) {
        match cell.owner {
            Some(owner) if owner != player => {
                cell.units = 1;
                cell.owner = Some(player);
            }
            _ => cell.add_unit(player),
        }
    }
}

/// Place a unit at `coord` and run the resulting cascade to completion.
pub fn resolve_placement(state: &mut GameState, coord: Coord, player: PlayerId) -> CascadeLog {
    place_unit(state, coord, player);
    Cascade::new(state, coord, player).run(state)
}

/// An in-progress cascade.
///
/// Created after the initiating unit is placed; each [`Cascade::step`]
/// resolves exactly one explosion.
#[derive(Debug, Clone)]
pub struct Cascade {
    /// Pending cell indices with their wave number.
    queue: VecDeque<(usize, u32)>,
    /// Membership flags for `queue`.
    queued: Vec<bool>,
    /// Acting player.
    player: PlayerId,
    /// Cells owned per player id.
    owned: [u32; MAX_PLAYERS + 1],
    /// Opponents who held cells when the cascade started.
    rivals_at_start: [bool; MAX_PLAYERS + 1],
    /// Explosions left before the cascade is cut off.
    budget: usize,
    /// Set once the cascade can make no further progress.
    finished: bool,
    /// Record of what happened.
    log: CascadeLog,
}

impl Cascade {
    /// Start a cascade from `origin`, which has just received a unit.
    ///
    /// The origin is queued first, then every other cell already at or
    /// above critical mass in row-major order.
    #[must_use]
    pub fn new(state: &GameState, origin: Coord, player: PlayerId) -> Self {
        let board = &state.board;
        let mut owned = [0u32; MAX_PLAYERS + 1];
        for cell in board.cells() {
            if let Some(owner) = cell.owner {
                if let Some(count) = owned.get_mut(usize::from(owner)) {
                    *count += 1;
                }
            }
        }
        let mut rivals_at_start = [false; MAX_PLAYERS + 1];
        for (id, &count) in owned.iter().enumerate() {
            rivals_at_start[id] = count > 0 && id != usize::from(player);
        }

        let mut cascade = Self {
            queue: VecDeque::new(),
            queued: vec![false; board.len()],
            player,
            owned,
            rivals_at_start,
            budget: board.len() * EXPLOSION_BUDGET_PER_CELL,
            finished: false,
            log: CascadeLog::default(),
        };

        if let Some(idx) = board.index_of(origin) {
            if is_critical(state, idx) {
                cascade.enqueue(idx, 0);
            }
        }
        // Cells left overfilled by a power-up go off on the next placement.
        for idx in 0..board.len() {
            if is_critical(state, idx) {
                cascade.enqueue(idx, 0);
            }
        }
        cascade.finished = cascade.queue.is_empty();
        cascade
    }

    /// Check if the cascade has settled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of cells waiting to explode.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// What has happened so far.
    #[must_use]
    pub fn log(&self) -> &CascadeLog {
        &self.log
    }

    /// Resolve the next explosion.
    ///
    /// Returns `None` once the cascade has settled. Entries that dropped
    /// below critical mass while queued are skipped silently.
    pub fn step(&mut self, state: &mut GameState) -> Option<Explosion> {
        while !self.finished {
            let Some((idx, depth)) = self.queue.pop_front() else {
                self.finished = true;
                break;
            };
            self.queued[idx] = false;

            if !is_critical(state, idx) {
                continue;
            }
            if self.budget == 0 {
                self.cut_off();
                break;
            }
            self.budget -= 1;

            let explosion = self.explode(state, idx, depth);
            if self.queue.is_empty() || self.is_looping_after_win(state) {
                self.finished = true;
            }
            return Some(explosion);
        }
        None
    }

    /// Run the cascade until it settles and return the log.
    pub fn run(mut self, state: &mut GameState) -> CascadeLog {
        while self.step(state).is_some() {}
        self.log
    }

    /// Consume the cascade and return its log.
    #[must_use]
    pub fn into_log(self) -> CascadeLog {
        self.log
    }

    fn explode(&mut self, state: &mut GameState, idx: usize, depth: u32) -> Explosion {
        let rows = state.board.rows();
        let cols = state.board.cols();
        let coord = state.board.coord_of(idx);
        let mass = critical_mass(coord.row, coord.col, rows, cols);

        let cell = state.board.at_mut(idx);
        let owner = cell.owner.unwrap_or(self.player);
        cell.remove_units(mass);
        if cell.owner.is_none() {
            self.release(owner);
        }

        let (neighbors, count) = neighbor_indices(idx, rows, cols);
        for &next in &neighbors[..count as usize] {
            let next_coord = state.board.coord_of(next);
            if let Some(hq) = state.hqs.iter_mut().find(|hq| hq.position == next_coord) {
                if hq.owner == owner {
                    self.log.absorbed += 1;
                } else {
                    hq.damage();
                    self.log.hq_events.push(HqEvent::Damaged {
                        owner: hq.owner,
                        by: owner,
                        health: hq.health,
                    });
                }
                continue;
            }

            let target = state.board.at_mut(next);
            let previous = target.owner;
            target.add_unit(owner);
            if previous != Some(owner) {
                if let Some(lost) = previous {
                    self.release(lost);
                }
                self.claim(owner);
            }
            if is_critical(state, next) {
                self.enqueue(next, depth + 1);
            }
        }
        if is_critical(state, idx) {
            self.enqueue(idx, depth + 1);
        }

        trace!(at = %coord, owner, depth, "explosion");
        let explosion = Explosion {
            coord,
            owner,
            depth,
        };
        self.log.max_depth = self.log.max_depth.max(depth);
        self.log.explosions.push(explosion);
        explosion
    }

    fn enqueue(&mut self, idx: usize, depth: u32) {
        if !self.queued[idx] {
            self.queued[idx] = true;
            self.queue.push_back((idx, depth));
        }
    }

    fn claim(&mut self, player: PlayerId) {
        if let Some(count) = self.owned.get_mut(usize::from(player)) {
            *count += 1;
        }
    }

    fn release(&mut self, player: PlayerId) {
        if let Some(count) = self.owned.get_mut(usize::from(player)) {
            *count = count.saturating_sub(1);
        }
    }

    /// The cascade has gone round the board and the game is already settled,
    /// so further explosions cannot change the outcome.
    fn is_looping_after_win(&self, state: &GameState) -> bool {
        if self.log.explosions.len() < state.board.len() {
            return false;
        }
        match state.mode {
            Mode::Classic => {
                let mut had_rivals = false;
                for (id, &was_present) in self.rivals_at_start.iter().enumerate() {
                    if was_present {
                        had_rivals = true;
                        if self.owned[id] > 0 {
                            return false;
                        }
                    }
                }
                had_rivals
            }
            Mode::Base => state
                .hqs
                .iter()
                .filter(|hq| hq.owner != self.player)
                .all(|hq| !hq.is_alive()),
        }
    }

    fn cut_off(&mut self) {
        warn!(
            player = self.player,
            pending = self.queue.len(),
            explosions = self.log.explosions.len(),
            "cascade hit the explosion budget, cutting off"
        );
        self.queue.clear();
        self.queued.iter_mut().for_each(|q| *q = false);
        self.log.truncated = true;
        self.finished = true;
    }
}

fn is_critical(state: &GameState, idx: usize) -> bool {
    let coord = state.board.coord_of(idx);
    let cell = state.board.at(idx);
    cell.units > 0
        && cell.units >= critical_mass(coord.row, coord.col, state.board.rows(), state.board.cols())
}

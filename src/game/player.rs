//! Players and headquarters.

use serde::{Deserialize, Serialize};

use crate::game::Coord;

/// Unique identifier for a player. Players are numbered from 1.
pub type PlayerId = u8;

/// Maximum number of players in a game.
pub const MAX_PLAYERS: usize = 4;

/// Full health of a headquarters.
pub const MAX_HQ_HEALTH: u8 = 5;

/// Board edge a headquarters sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HqSide {
    /// Top edge, centred.
    Top,
    /// Bottom edge, centred.
    Bottom,
    /// Left edge, centred.
    Left,
    /// Right edge, centred.
    Right,
}

impl HqSide {
    /// Sides handed out to players in seating order.
    pub const SEATING: [HqSide; MAX_PLAYERS] =
        [HqSide::Top, HqSide::Bottom, HqSide::Left, HqSide::Right];

    /// Position of an HQ on this side of a `rows x cols` board.
    #[must_use]
    pub const fn position(self, rows: u16, cols: u16) -> Coord {
        match self {
            HqSide::Top => Coord::new(0, cols / 2),
            HqSide::Bottom => Coord::new(rows - 1, cols / 2),
            HqSide::Left => Coord::new(rows / 2, 0),
            HqSide::Right => Coord::new(rows / 2, cols - 1),
        }
    }
}

/// A player's headquarters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hq {
    /// Cell occupied by the HQ.
    pub position: Coord,
    /// Owning player.
    pub owner: PlayerId,
    /// Remaining health in `0..=MAX_HQ_HEALTH`.
    pub health: u8,
    /// Edge the HQ sits on; determines the owner's HQ line.
    pub side: HqSide,
}

impl Hq {
    /// Create a full-health HQ on the given side of the board.
    #[must_use]
    pub const fn new(owner: PlayerId, side: HqSide, rows: u16, cols: u16) -> Self {
        Self {
            position: side.position(rows, cols),
            owner,
            health: MAX_HQ_HEALTH,
            side,
        }
    }

    /// Check if the HQ is still standing.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Take one point of damage. Health floors at zero.
    pub fn damage(&mut self) {
        self.health = self.health.saturating_sub(1);
    }

    /// Restore one point of health, capped at full.
    pub fn heal(&mut self) {
        self.health = (self.health + 1).min(MAX_HQ_HEALTH);
    }

    /// Check if a coordinate lies on this HQ's line: its row for top/bottom
    /// HQs, its column for left/right ones.
    #[must_use]
    pub const fn on_line(&self, coord: Coord) -> bool {
        match self.side {
            HqSide::Top | HqSide::Bottom => coord.row == self.position.row,
            HqSide::Left | HqSide::Right => coord.col == self.position.col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hq_positions() {
        assert_eq!(HqSide::Top.position(9, 9), Coord::new(0, 4));
        assert_eq!(HqSide::Bottom.position(9, 9), Coord::new(8, 4));
        assert_eq!(HqSide::Left.position(9, 9), Coord::new(4, 0));
        assert_eq!(HqSide::Right.position(9, 9), Coord::new(4, 8));
    }

    #[test]
    fn test_hq_health_bounds() {
        let mut hq = Hq::new(1, HqSide::Top, 9, 9);
        assert_eq!(hq.health, MAX_HQ_HEALTH);
        hq.heal();
        assert_eq!(hq.health, MAX_HQ_HEALTH);

        for _ in 0..10 {
            hq.damage();
        }
        assert_eq!(hq.health, 0);
        assert!(!hq.is_alive());

        hq.heal();
        assert_eq!(hq.health, 1);
    }

    #[test]
    fn test_hq_line() {
        let top = Hq::new(1, HqSide::Top, 9, 9);
        assert!(top.on_line(Coord::new(0, 0)));
        assert!(!top.on_line(Coord::new(1, 4)));

        let left = Hq::new(3, HqSide::Left, 9, 9);
        assert!(left.on_line(Coord::new(8, 0)));
        assert!(!left.on_line(Coord::new(4, 1)));
    }
}

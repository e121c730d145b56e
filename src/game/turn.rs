use std::collections::{
    HashMap,
    HashSet,
};

use serde::Serialize;

use super::card::{
    PairId,
    Player,
    TileIndex,
};

/// Face-up, unresolved tiles in flip order. Holds at most two.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlipSet {
    tiles: Vec<TileIndex>,
}

impl FlipSet {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tiles.len() == 2
    }

    pub fn contains(&self, tile: TileIndex) -> bool {
        self.tiles.contains(&tile)
    }

    pub fn first(&self) -> Option<TileIndex> {
        self.tiles.first().copied()
    }

    pub fn second(&self) -> Option<TileIndex> {
        self.tiles.get(1).copied()
    }

    pub fn tiles(&self) -> &[TileIndex] {
        &self.tiles
    }

    /// Adds a tile; returns false when the set is full or already holds it.
    pub fn push(&mut self, tile: TileIndex) -> bool {
        if self.is_full() || self.contains(tile) {
            return false;
        }
        self.tiles.push(tile);
        true
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

/// Resolved pairs and who won each. Only ever grows within a session.
#[derive(Debug, Clone, Default)]
pub struct Matches {
    pairs: HashSet<PairId>,
    owners: HashMap<PairId, Player>,
}

impl Matches {
    pub fn is_matched(&self, pair_id: PairId) -> bool {
        self.pairs.contains(&pair_id)
    }

    pub fn owner(&self, pair_id: PairId) -> Option<Player> {
        self.owners.get(&pair_id).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Records a pair for `owner`. Returns false if it was already matched.
    pub fn insert(&mut self, pair_id: PairId, owner: Player) -> bool {
        if !self.pairs.insert(pair_id) {
            return false;
        }
        self.owners.insert(pair_id, owner);
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub player1: u32,
    pub player2: u32,
}

impl Scores {
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::One => self.player1,
            Player::Two => self.player2,
        }
    }

    pub fn award(&mut self, player: Player) {
        match player {
            Player::One => self.player1 += 1,
            Player::Two => self.player2 += 1,
        }
    }

    pub fn leader(&self) -> Option<Player> {
        match self.player1.cmp(&self.player2) {
            std::cmp::Ordering::Greater => Some(Player::One),
            std::cmp::Ordering::Less => Some(Player::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnPhase {
    Idle,
    OneFlipped,
    /// Two tiles face-up; the processing lock is held.
    Resolving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// First tile of the turn is face-up.
    FirstFlipped(TileIndex),
    /// Second tile is face-up; the processing lock is now held and the pair
    /// must be evaluated after the reveal delay.
    PairReady(TileIndex, TileIndex),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Same player continues; the lock is already released.
    Match { pair_id: PairId, player: Player },
    /// Both tiles stay visible until the mismatch display ends.
    Mismatch { first: TileIndex, second: TileIndex },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameResult {
    Winner(Player),
    Tie,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_set_holds_two_distinct_tiles() {
        let mut flips = FlipSet::default();
        assert!(flips.push(3));
        assert!(!flips.push(3));
        assert!(flips.push(5));
        assert!(!flips.push(7));

        assert_eq!(flips.first(), Some(3));
        assert_eq!(flips.second(), Some(5));
        assert!(flips.is_full());

        flips.clear();
        assert!(flips.is_empty());
        assert_eq!(flips.first(), None);
    }

    #[test]
    fn test_matches_record_owner_once() {
        let mut matches = Matches::default();
        assert!(matches.insert(2, Player::Two));
        assert!(!matches.insert(2, Player::One));
        assert_eq!(matches.owner(2), Some(Player::Two));
        assert_eq!(matches.len(), 1);
        assert!(!matches.is_matched(1));
    }

    #[test]
    fn test_scores_leader() {
        let mut scores = Scores::default();
        assert_eq!(scores.leader(), None);
        scores.award(Player::Two);
        assert_eq!(scores.get(Player::Two), 1);
        assert_eq!(scores.leader(), Some(Player::Two));
    }
}

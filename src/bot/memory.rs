use std::collections::BTreeMap;

use crate::game::{
    PairId,
    TileIndex,
};

/// What the bot has seen: tile index to pair id. Entries are only ever added
/// during a session. Iteration is in ascending tile order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotMemory {
    seen: BTreeMap<TileIndex, PairId>,
}

impl BotMemory {
    pub fn record(&mut self, tile: TileIndex, pair_id: PairId) {
        self.seen.insert(tile, pair_id);
    }

    pub fn get(&self, tile: TileIndex) -> Option<PairId> {
        self.seen.get(&tile).copied()
    }

    pub fn knows(&self, tile: TileIndex) -> bool {
        self.seen.contains_key(&tile)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileIndex, PairId)> + '_ {
        self.seen.iter().map(|(&tile, &pair_id)| (tile, pair_id))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

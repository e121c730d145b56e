use std::sync::Arc;

use rand::{
    seq::SliceRandom,
    Rng,
};

use super::card::{
    Card,
    KanjiPayload,
    PairId,
    TileIndex,
};
use crate::{
    core::GameError,
    dictionary::WordEntry,
};

/// Ordered tiles of one session. Every pair id in `0..pair_count()` appears
/// on exactly two tiles.
#[derive(Debug, Clone)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// Two cards per payload (pair id = payload position), uniformly shuffled.
    pub fn build<R: Rng + ?Sized>(
        payloads: Vec<KanjiPayload>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if payloads.is_empty() {
            return Err(GameError::EmptySelection);
        }

        let mut cards: Vec<Card> = payloads
            .into_iter()
            .enumerate()
            .flat_map(|(pair_id, payload)| {
                let payload = Arc::new(payload);
                [
                    Card { id: pair_id * 2, pair_id, payload: payload.clone(), words: None },
                    Card { id: pair_id * 2 + 1, pair_id, payload, words: None },
                ]
            })
            .collect();

        cards.shuffle(rng);
        Ok(Self { cards })
    }

    /// Board with a fixed layout: tile `i` carries pair `layout[i]`.
    #[cfg(test)]
    pub(crate) fn with_layout(payloads: Vec<KanjiPayload>, layout: &[PairId]) -> Self {
        let payloads: Vec<Arc<KanjiPayload>> = payloads.into_iter().map(Arc::new).collect();
        let mut seen = vec![0; payloads.len()];

        let cards = layout
            .iter()
            .map(|&pair_id| {
                let id = pair_id * 2 + seen[pair_id];
                seen[pair_id] += 1;
                Card { id, pair_id, payload: payloads[pair_id].clone(), words: None }
            })
            .collect();

        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, tile: TileIndex) -> Option<&Card> {
        self.cards.get(tile)
    }

    pub fn pair_id(&self, tile: TileIndex) -> Option<PairId> {
        self.cards.get(tile).map(|c| c.pair_id)
    }

    /// The other tile carrying the same kanji.
    pub fn partner(&self, tile: TileIndex) -> Option<TileIndex> {
        let pair_id = self.pair_id(tile)?;
        self.cards.iter().enumerate().position(|(i, c)| i != tile && c.pair_id == pair_id)
    }

    /// Payloads in pair-id order, one per pair.
    pub fn payloads(&self) -> Vec<KanjiPayload> {
        let mut payloads: Vec<Option<KanjiPayload>> = vec![None; self.pair_count()];
        for card in &self.cards {
            if let Some(slot) = payloads.get_mut(card.pair_id) {
                if slot.is_none() {
                    *slot = Some(card.payload.as_ref().clone());
                }
            }
        }
        payloads.into_iter().flatten().collect()
    }

    /// Stores a word list on every card of `kanji` that has none yet.
    /// Returns whether anything was attached.
    pub fn attach_word_data(&mut self, kanji: &str, words: Arc<Vec<WordEntry>>) -> bool {
        let mut attached = false;
        for card in self.cards.iter_mut().filter(|c| c.kanji() == kanji && c.words.is_none()) {
            card.words = Some(words.clone());
            attached = true;
        }
        attached
    }
}

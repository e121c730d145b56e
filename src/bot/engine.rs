use rand::{
    seq::IndexedRandom,
    Rng,
};

use super::{
    config::BotConfig,
    memory::BotMemory,
    weighted::select_weighted,
};
use crate::game::{
    board::Board,
    turn::{
        FlipSet,
        Matches,
    },
    TileIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstAction {
    KnownPair,
    Known,
    New,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondAction {
    Match,
    RandomClose,
    Random,
    New,
    Known,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstChoice {
    pub tile: TileIndex,
    pub action: FirstAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondChoice {
    pub tile: TileIndex,
    pub action: SecondAction,
    /// The action's tile was unusable and a random valid tile was taken.
    pub fallback: bool,
}

/// Two-stage card selection over a read-only view of the game.
pub struct OpponentEngine<'a> {
    pub board: &'a Board,
    pub matches: &'a Matches,
    pub flips: &'a FlipSet,
    pub memory: &'a BotMemory,
    pub config: &'a BotConfig,
}

impl<'a> OpponentEngine<'a> {
    fn is_available(&self, tile: TileIndex) -> bool {
        match self.board.pair_id(tile) {
            Some(pair_id) => !self.matches.is_matched(pair_id) && !self.flips.contains(tile),
            None => false,
        }
    }

    /// Unmatched, face-down tiles.
    pub fn available(&self) -> Vec<TileIndex> {
        (0..self.board.len()).filter(|&t| self.is_available(t)).collect()
    }

    fn known_pool(&self) -> Vec<TileIndex> {
        self.available().into_iter().filter(|&t| self.memory.knows(t)).collect()
    }

    fn new_pool(&self) -> Vec<TileIndex> {
        self.available().into_iter().filter(|&t| !self.memory.knows(t)).collect()
    }

    fn random_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TileIndex> {
        self.available().choose(rng).copied()
    }

    fn from_pool<R: Rng + ?Sized>(&self, pool: Vec<TileIndex>, rng: &mut R) -> Option<TileIndex> {
        pool.choose(rng).copied().or_else(|| self.random_tile(rng))
    }

    /// First remembered pair whose tiles are both still in play, in memory order.
    pub fn known_pair(&self) -> Option<(TileIndex, TileIndex)> {
        self.memory.iter().filter(|&(tile, _)| self.is_available(tile)).find_map(|(tile, pair_id)| {
            self.memory
                .iter()
                .find(|&(other, other_pair)| {
                    other != tile && other_pair == pair_id && self.is_available(other)
                })
                .map(|(other, _)| (tile, other))
        })
    }

    /// Remembered partner of `first`, if its pair is still unmatched.
    pub fn known_partner(&self, first: TileIndex) -> Option<TileIndex> {
        let pair_id = self.board.pair_id(first)?;
        if self.matches.is_matched(pair_id) {
            return None;
        }
        let partner = self.board.partner(first)?;
        (self.memory.get(partner) == Some(pair_id)).then_some(partner)
    }

    /// `None` means no tile is left to flip and the turn is abandoned.
    pub fn choose_first<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<FirstChoice> {
        if let Some((tile, _)) = self.known_pair() {
            if rng.random_range(0.0..100.0) < self.config.known_pair_chance {
                return Some(FirstChoice { tile, action: FirstAction::KnownPair });
            }
        }

        let action = select_weighted(
            &[
                (self.config.first_known, FirstAction::Known),
                (self.config.first_new, FirstAction::New),
                (self.config.first_random, FirstAction::Random),
            ],
            rng,
        )?;

        let tile = match action {
            FirstAction::Known => self.from_pool(self.known_pool(), rng),
            FirstAction::New => self.from_pool(self.new_pool(), rng),
            FirstAction::KnownPair | FirstAction::Random => self.random_tile(rng),
        }?;

        Some(FirstChoice { tile, action })
    }

    /// Picks the second card while `first` is face-up. `None` means no valid
    /// tile other than `first` remains.
    pub fn choose_second<R: Rng + ?Sized>(&self, first: TileIndex, rng: &mut R) -> Option<SecondChoice> {
        let partner = self.known_partner(first);

        let action = match partner {
            Some(_) => select_weighted(
                &[
                    (self.config.second_known_match, SecondAction::Match),
                    (self.config.second_known_random_close, SecondAction::RandomClose),
                    (self.config.second_known_random, SecondAction::Random),
                    (self.config.second_known_new, SecondAction::New),
                    (self.config.second_known_known, SecondAction::Known),
                ],
                rng,
            ),
            None => select_weighted(
                &[
                    (self.config.second_unknown_known, SecondAction::Known),
                    (self.config.second_unknown_new, SecondAction::New),
                    (self.config.second_unknown_random, SecondAction::Random),
                ],
                rng,
            ),
        }?;

        let candidate = match action {
            SecondAction::Match => partner,
            SecondAction::RandomClose | SecondAction::Random => self.random_tile(rng),
            SecondAction::New => self.from_pool(self.new_pool(), rng),
            SecondAction::Known => {
                let pool = self.known_pool().into_iter().filter(|&t| Some(t) != partner).collect();
                self.from_pool(pool, rng)
            }
        };

        match candidate {
            Some(tile) if tile != first && self.is_available(tile) => {
                Some(SecondChoice { tile, action, fallback: false })
            }
            _ => {
                let valid: Vec<TileIndex> = self.available().into_iter().filter(|&t| t != first).collect();
                let tile = valid.choose(rng).copied()?;
                Some(SecondChoice { tile, action, fallback: true })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{
        rngs::StdRng,
        SeedableRng,
    };

    use super::*;
    use crate::{
        bot::config::OpponentType,
        game::{
            sample_payloads,
            Player,
        },
    };

    // Pairs: 0 at tiles {0, 4}, 1 at {1, 5}, 2 at {2, 6}, 3 at {3, 7}.
    fn board() -> Board {
        Board::with_layout(sample_payloads(4), &[0, 1, 2, 3, 0, 1, 2, 3])
    }

    fn config(slots: [f64; 12]) -> BotConfig {
        BotConfig::from_slots(slots).expect("valid slots")
    }

    struct State {
        board: Board,
        matches: Matches,
        flips: FlipSet,
        memory: BotMemory,
        config: BotConfig,
    }

    impl State {
        fn new(config: BotConfig) -> Self {
            Self {
                board: board(),
                matches: Matches::default(),
                flips: FlipSet::default(),
                memory: BotMemory::default(),
                config,
            }
        }

        fn remember(&mut self, tiles: &[TileIndex]) {
            for &tile in tiles {
                let pair_id = self.board.pair_id(tile).expect("tile on board");
                self.memory.record(tile, pair_id);
            }
        }

        fn engine(&self) -> OpponentEngine<'_> {
            OpponentEngine {
                board: &self.board,
                matches: &self.matches,
                flips: &self.flips,
                memory: &self.memory,
                config: &self.config,
            }
        }
    }

    #[test]
    fn test_known_pair_in_memory_order() {
        let mut state = State::new(config([0.0; 12]));
        state.remember(&[6, 1, 5, 2]);
        assert_eq!(state.engine().known_pair(), Some((1, 5)));

        state.matches.insert(1, Player::One);
        assert_eq!(state.engine().known_pair(), Some((2, 6)));
    }

    #[test]
    fn test_always_plays_known_pair_at_full_chance() {
        let mut state = State::new(config([100.0, 0.0, 0.0, 100.0, 0.0, 0.0, 100.0, 100.0, 0.0, 0.0, 0.0, 0.0]));
        state.remember(&[3, 7]);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..50 {
            let first = state.engine().choose_first(&mut rng).expect("a tile is chosen");
            assert_eq!(first, FirstChoice { tile: 3, action: FirstAction::KnownPair });

            state.flips.push(first.tile);
            let second = state.engine().choose_second(first.tile, &mut rng).expect("partner chosen");
            assert_eq!(second.tile, 7);
            assert_eq!(second.action, SecondAction::Match);
            state.flips.clear();
        }
    }

    #[test]
    fn test_randomizer_ignores_memory() {
        let randomizer = OpponentType::Randomizer.bot_config().expect("bot tier");
        let mut state = State::new(randomizer);
        state.remember(&[0, 4, 1, 5, 2, 6]);
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..200 {
            let first = state.engine().choose_first(&mut rng).expect("a tile is chosen");
            assert_eq!(first.action, FirstAction::Random);

            state.flips.push(first.tile);
            let second = state.engine().choose_second(first.tile, &mut rng).expect("a tile is chosen");
            assert_eq!(second.action, SecondAction::Random);
            assert!(!second.fallback);
            assert_ne!(second.tile, first.tile);
            state.flips.clear();
        }
    }

    #[test]
    fn test_new_action_prefers_unseen_tiles() {
        let mut state = State::new(config([0.0, 0.0, 100.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        state.remember(&[0, 1, 2, 3, 4, 5]);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..50 {
            let first = state.engine().choose_first(&mut rng).expect("a tile is chosen");
            assert_eq!(first.action, FirstAction::New);
            assert!(first.tile == 6 || first.tile == 7);
        }
    }

    #[test]
    fn test_empty_pool_falls_back_to_random() {
        // "known" first, but nothing is remembered.
        let state = State::new(config([0.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        let mut rng = StdRng::seed_from_u64(8);
        let first = state.engine().choose_first(&mut rng).expect("falls back to random");
        assert_eq!(first.action, FirstAction::Known);
        assert!(first.tile < 8);
    }

    #[test]
    fn test_known_action_excludes_partner() {
        let mut state = State::new(config([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 100.0]));
        state.remember(&[0, 4, 1]);
        state.flips.push(0);
        let mut rng = StdRng::seed_from_u64(13);

        for _ in 0..50 {
            let second = state.engine().choose_second(0, &mut rng).expect("a tile is chosen");
            assert_eq!(second.action, SecondAction::Known);
            assert_eq!(second.tile, 1);
        }
    }

    #[test]
    fn test_never_picks_matched_or_face_up_tiles() {
        let elite = OpponentType::Elite.bot_config().expect("bot tier");
        let mut state = State::new(elite);
        state.matches.insert(0, Player::One);
        state.matches.insert(1, Player::Two);
        state.remember(&[0, 4, 1, 5, 2]);
        let mut rng = StdRng::seed_from_u64(17);

        for _ in 0..100 {
            let first = state.engine().choose_first(&mut rng).expect("tiles remain");
            assert!([2, 3, 6, 7].contains(&first.tile));

            state.flips.push(first.tile);
            let second = state.engine().choose_second(first.tile, &mut rng).expect("tiles remain");
            assert!([2, 3, 6, 7].contains(&second.tile));
            assert_ne!(second.tile, first.tile);
            state.flips.clear();
        }
    }

    #[test]
    fn test_exhausted_board_aborts() {
        let mut state = State::new(OpponentType::Casual.bot_config().expect("bot tier"));
        for pair_id in 0..4 {
            state.matches.insert(pair_id, Player::One);
        }
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(state.engine().choose_first(&mut rng), None);
    }

    #[test]
    fn test_second_choice_aborts_without_other_tiles() {
        let mut state = State::new(OpponentType::Casual.bot_config().expect("bot tier"));
        for pair_id in 0..3 {
            state.matches.insert(pair_id, Player::One);
        }
        state.flips.push(3);
        state.flips.push(7);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(state.engine().choose_second(3, &mut rng), None);
    }
}

//! Match simulation and league orchestration

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::registry::StrategyRegistry;
use crate::strategy::{Decider, MoveSymbol};

/// The round count for a league is drawn once from this inclusive range
/// and reused for every match, so all matches in a run are comparable.
pub const MIN_ROUNDS: u32 = 200;
pub const MAX_ROUNDS: u32 = 400;

/// A fault that aborts the entire league. No partial outcome survives it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error(
        "strategy `{strategy}` returned {returned:?} in round {round}; \
         a move must be one of C, c, D, d"
    )]
    InvalidMove {
        strategy: String,
        round: u32,
        returned: char,
    },
}

/// Both sides' move sequences for one simulated pair. A self-pair is
/// simulated (and recorded) exactly once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRecord {
    pub left: String,
    pub right: String,
    pub left_moves: Vec<MoveSymbol>,
    pub right_moves: Vec<MoveSymbol>,
}

/// Every match record of a league run, plus the round count they all share.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeagueOutcome {
    pub rounds: u32,
    pub records: Vec<MatchRecord>,
}

/// Run a complete match between two strategies.
///
/// Each round both sides are invoked against the same snapshot of prior
/// rounds — own history first, opponent's second, both empty on round 0.
/// Moves are appended only after both calls, so neither side sees the move
/// currently being decided. A returned character outside the move domain
/// fails the match immediately.
pub fn play_match(
    left_name: &str,
    left: &dyn Decider,
    right_name: &str,
    right: &dyn Decider,
    rounds: u32,
) -> Result<MatchRecord, MatchError> {
    let mut left_moves: Vec<MoveSymbol> = Vec::with_capacity(rounds as usize);
    let mut right_moves: Vec<MoveSymbol> = Vec::with_capacity(rounds as usize);

    for round in 0..rounds {
        let left_raw = left.decide(&left_moves, &right_moves);
        let right_raw = right.decide(&right_moves, &left_moves);

        let left_symbol =
            MoveSymbol::parse(left_raw).ok_or_else(|| MatchError::InvalidMove {
                strategy: left_name.to_owned(),
                round,
                returned: left_raw,
            })?;
        let right_symbol =
            MoveSymbol::parse(right_raw).ok_or_else(|| MatchError::InvalidMove {
                strategy: right_name.to_owned(),
                round,
                returned: right_raw,
            })?;

        left_moves.push(left_symbol);
        right_moves.push(right_symbol);
    }

    Ok(MatchRecord {
        left: left_name.to_owned(),
        right: right_name.to_owned(),
        left_moves,
        right_moves,
    })
}

/// Run the full round-robin league over the registry, each strategy against
/// every other including itself (n·(n+1)/2 pairs). One round count is drawn
/// for the entire run. Any match fault aborts the league.
pub fn run_league<R: Rng>(
    registry: &StrategyRegistry,
    rng: &mut R,
) -> Result<LeagueOutcome, MatchError> {
    let rounds = rng.gen_range(MIN_ROUNDS..=MAX_ROUNDS);
    let entries = registry.entries();
    info!(strategies = entries.len(), rounds, "playing full league");

    let mut records = Vec::with_capacity(entries.len() * (entries.len() + 1) / 2);
    for (i, left) in entries.iter().enumerate() {
        for right in &entries[i..] {
            debug!(left = %left.callable, right = %right.callable, "playing match");
            records.push(play_match(
                &left.callable,
                &left.kind,
                &right.callable,
                &right.kind,
                rounds,
            )?);
        }
    }

    Ok(LeagueOutcome { rounds, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StrategyEntry;
    use crate::strategy::StrategyKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Always returns a character outside the move domain.
    struct Broken;

    impl Decider for Broken {
        fn decide(&self, _mine: &[MoveSymbol], _theirs: &[MoveSymbol]) -> char {
            'x'
        }
    }

    /// Cooperates in lowercase.
    struct LowercaseCooperator;

    impl Decider for LowercaseCooperator {
        fn decide(&self, _mine: &[MoveSymbol], _theirs: &[MoveSymbol]) -> char {
            'c'
        }
    }

    fn make_registry(entries: &[(&str, &str, StrategyKind)]) -> StrategyRegistry {
        StrategyRegistry::from_entries(
            entries
                .iter()
                .map(|(file_key, callable, kind)| StrategyEntry {
                    file_key: (*file_key).to_owned(),
                    callable: (*callable).to_owned(),
                    kind: *kind,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_tft_vs_all_defect() {
        let record = play_match(
            "tit_for_tat",
            &StrategyKind::TitForTat,
            "all_d",
            &StrategyKind::AllDefect,
            5,
        )
        .unwrap();

        // Round 0: TFT cooperates, then retaliates every round
        let left: String = record.left_moves.iter().map(|s| s.as_char()).collect();
        let right: String = record.right_moves.iter().map(|s| s.as_char()).collect();
        assert_eq!(left, "CDDDD");
        assert_eq!(right, "DDDDD");
    }

    #[test]
    fn test_tft_vs_tft_stays_cooperative() {
        // Both sides act on the same snapshot; if one side saw the other's
        // current-round move this would not stay all-C.
        let record = play_match(
            "left",
            &StrategyKind::TitForTat,
            "right",
            &StrategyKind::TitForTat,
            20,
        )
        .unwrap();

        assert!(record.left_moves.iter().all(|s| s.as_char() == 'C'));
        assert!(record.right_moves.iter().all(|s| s.as_char() == 'C'));
    }

    #[test]
    fn test_histories_preserve_literal_casing() {
        let record = play_match(
            "tit_for_tat",
            &StrategyKind::TitForTat,
            "lowercase",
            &LowercaseCooperator,
            3,
        )
        .unwrap();

        let left: String = record.left_moves.iter().map(|s| s.as_char()).collect();
        let right: String = record.right_moves.iter().map(|s| s.as_char()).collect();
        // TFT echoes the opponent's literal lowercase symbol from round 1 on
        assert_eq!(left, "Ccc");
        assert_eq!(right, "ccc");
    }

    #[test]
    fn test_invalid_move_fails_the_match() {
        let err = play_match(
            "broken",
            &Broken,
            "all_c",
            &StrategyKind::AllCooperate,
            10,
        )
        .unwrap_err();

        assert_eq!(
            err,
            MatchError::InvalidMove {
                strategy: "broken".to_owned(),
                round: 0,
                returned: 'x',
            }
        );
    }

    #[test]
    fn test_round_count_shared_and_in_range() {
        let registry = make_registry(&[
            ("a", "tit_for_tat", StrategyKind::TitForTat),
            ("b", "all_d", StrategyKind::AllDefect),
            ("c", "all_c", StrategyKind::AllCooperate),
        ]);

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let outcome = run_league(&registry, &mut rng).unwrap();
            assert!(
                (MIN_ROUNDS..=MAX_ROUNDS).contains(&outcome.rounds),
                "rounds {} out of range",
                outcome.rounds
            );
            for record in &outcome.records {
                assert_eq!(record.left_moves.len() as u32, outcome.rounds);
                assert_eq!(record.right_moves.len() as u32, outcome.rounds);
            }
        }
    }

    #[test]
    fn test_pair_count_includes_self_pairs() {
        let registry = make_registry(&[
            ("a", "tit_for_tat", StrategyKind::TitForTat),
            ("b", "all_d", StrategyKind::AllDefect),
            ("c", "all_c", StrategyKind::AllCooperate),
        ]);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let outcome = run_league(&registry, &mut rng).unwrap();

        // n·(n+1)/2 for n = 3
        assert_eq!(outcome.records.len(), 6);
        let self_pairs = outcome
            .records
            .iter()
            .filter(|r| r.left == r.right)
            .count();
        assert_eq!(self_pairs, 3);
    }

    #[test]
    fn test_league_determinism_with_seeded_rng() {
        let registry = make_registry(&[
            ("a", "tit_for_tat", StrategyKind::TitForTat),
            ("b", "pavlov", StrategyKind::Pavlov),
        ]);

        let outcome1 = run_league(&registry, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let outcome2 = run_league(&registry, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();

        assert_eq!(outcome1.rounds, outcome2.rounds);
        assert_eq!(outcome1.records.len(), outcome2.records.len());
    }

    #[test]
    fn test_empty_registry_yields_empty_outcome() {
        let registry = StrategyRegistry::from_entries(Vec::new()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = run_league(&registry, &mut rng).unwrap();
        assert!(outcome.records.is_empty());
    }
}

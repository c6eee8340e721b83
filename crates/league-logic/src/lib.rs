//! Dilemma League engine
//!
//! Scoring engine for an iterated Prisoner's Dilemma league: submission
//! discovery and code-shape validation, round-robin match simulation,
//! payoff accounting with a self-play special case, and CSV report
//! rendering. The CLI in `league-cli` is the only consumer with I/O
//! beyond the registry's directory scan.

mod league;
mod registry;
mod report;
mod score;
mod strategy;

pub use league::{
    play_match, run_league, LeagueOutcome, MatchError, MatchRecord, MAX_ROUNDS, MIN_ROUNDS,
};
pub use registry::{PolicyViolation, RegistryError, StrategyEntry, StrategyRegistry};
pub use report::{file_name, render};
pub use score::{aggregate, shared_ranks, ScoreBoard, ScoreError};
pub use strategy::{Decider, Move, MoveSymbol, StrategyKind};

/// Payoff matrix for the Prisoner's Dilemma
/// Returns (score_a, score_b)
pub fn payoff(a: MoveSymbol, b: MoveSymbol) -> (u8, u8) {
    match (a.canonical(), b.canonical()) {
        (Move::Cooperate, Move::Cooperate) => (3, 3),
        (Move::Cooperate, Move::Defect) => (0, 5),
        (Move::Defect, Move::Cooperate) => (5, 0),
        (Move::Defect, Move::Defect) => (1, 1),
    }
}

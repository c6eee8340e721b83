//! Move types and the built-in strategy catalog

use serde::{Deserialize, Serialize};

/// A canonical move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Cooperate,
    Defect,
}

/// The literal symbol a strategy returned: one of `C`, `c`, `D`, `d`.
///
/// History buffers keep the symbol exactly as it was returned; scoring and
/// strategy logic canonicalize case-insensitively via [`MoveSymbol::canonical`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSymbol(char);

impl MoveSymbol {
    /// Parse a raw character. Anything outside the four accepted symbols is
    /// rejected — this is the only way to construct a `MoveSymbol`, so the
    /// payoff table never sees an out-of-domain value.
    pub fn parse(raw: char) -> Option<Self> {
        matches!(raw, 'C' | 'c' | 'D' | 'd').then_some(Self(raw))
    }

    /// Case-insensitive canonical move.
    pub fn canonical(self) -> Move {
        match self.0 {
            'C' | 'c' => Move::Cooperate,
            _ => Move::Defect,
        }
    }

    /// The symbol exactly as the strategy returned it.
    pub fn as_char(self) -> char {
        self.0
    }
}

/// A decision procedure: own history first, opponent's history second, both
/// empty on round 0. Returns a raw symbol; the simulator validates it.
pub trait Decider {
    fn decide(&self, mine: &[MoveSymbol], theirs: &[MoveSymbol]) -> char;
}

/// Built-in strategy implementations, keyed by the callable name a
/// submission declares. Submissions never execute as code; a validated
/// callable name selects one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Copy opponent's last move. Start with cooperate.
    TitForTat,
    /// Always defect, never cooperate.
    AllDefect,
    /// Always cooperate, never defect.
    AllCooperate,
    /// Cooperate until opponent defects once, then always defect.
    GrimTrigger,
    /// Defect only if opponent defected twice in a row.
    TitForTwoTats,
    /// Win-stay, lose-switch. Repeat move if good outcome.
    Pavlov,
}

impl StrategyKind {
    /// Look up the implementation registered under a callable name.
    pub fn for_callable(name: &str) -> Option<Self> {
        match name {
            "tit_for_tat" => Some(Self::TitForTat),
            "all_d" => Some(Self::AllDefect),
            "all_c" => Some(Self::AllCooperate),
            "grim_trigger" => Some(Self::GrimTrigger),
            "tit_for_two_tats" => Some(Self::TitForTwoTats),
            "pavlov" => Some(Self::Pavlov),
            _ => None,
        }
    }
}

impl Decider for StrategyKind {
    fn decide(&self, mine: &[MoveSymbol], theirs: &[MoveSymbol]) -> char {
        match self {
            StrategyKind::TitForTat => decide_tit_for_tat(theirs),
            StrategyKind::AllDefect => 'D',
            StrategyKind::AllCooperate => 'C',
            StrategyKind::GrimTrigger => decide_grim_trigger(theirs),
            StrategyKind::TitForTwoTats => decide_tit_for_two_tats(theirs),
            StrategyKind::Pavlov => decide_pavlov(mine, theirs),
        }
    }
}

/// Tit-for-Tat: cooperate first, then echo the opponent's last symbol as
/// submitted (casing included).
fn decide_tit_for_tat(theirs: &[MoveSymbol]) -> char {
    match theirs.last() {
        None => 'C',
        Some(last) => last.as_char(),
    }
}

/// Grim Trigger: cooperate until opponent defects, then always defect
fn decide_grim_trigger(theirs: &[MoveSymbol]) -> char {
    let betrayed = theirs.iter().any(|s| s.canonical() == Move::Defect);
    if betrayed {
        'D'
    } else {
        'C'
    }
}

/// Tit-for-Two-Tats: only defect if opponent defected twice in a row
fn decide_tit_for_two_tats(theirs: &[MoveSymbol]) -> char {
    if theirs.len() < 2 {
        return 'C';
    }

    let last_two = &theirs[theirs.len() - 2..];
    if last_two.iter().all(|s| s.canonical() == Move::Defect) {
        'D'
    } else {
        'C'
    }
}

/// Pavlov: win-stay, lose-switch.
/// A round pays 3+ exactly when the opponent cooperated, so: repeat the
/// last move after opponent cooperation, switch after opponent defection.
fn decide_pavlov(mine: &[MoveSymbol], theirs: &[MoveSymbol]) -> char {
    if mine.is_empty() {
        return 'C'; // start with cooperate
    }

    let my_last = mine.last().unwrap().canonical();
    let their_last = theirs.last().unwrap().canonical();

    match (their_last, my_last) {
        (Move::Cooperate, Move::Cooperate) => 'C',
        (Move::Cooperate, Move::Defect) => 'D',
        (Move::Defect, Move::Cooperate) => 'D',
        (Move::Defect, Move::Defect) => 'C',
    }
}

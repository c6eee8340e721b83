//! Report artifact rendering.
//!
//! The layout is the external contract the embedding application parses:
//! comma-delimited sections separated by blank lines, in a fixed order —
//! submission table, run parameters, score matrix with sums and rankings,
//! then the obtained and given ranking tables.

use std::fmt::Write;

use crate::registry::StrategyEntry;
use crate::score::{shared_ranks, ScoreBoard};

/// Report file name for a run generated at `timestamp` (unix seconds).
pub fn file_name(timestamp: i64) -> String {
    format!("report_file_{timestamp}.csv")
}

/// Render the full report artifact.
pub fn render(entries: &[StrategyEntry], board: &ScoreBoard, rounds: u32) -> String {
    let n = board.names.len();
    let matches = n * (n + 1) / 2;
    let mut out = String::new();

    out.push_str("file,strategy\n");
    for entry in entries {
        let _ = writeln!(out, "{},{}", entry.file_key, entry.callable);
    }
    out.push('\n');

    let _ = writeln!(out, "matches (A),{matches}");
    let _ = writeln!(out, "rounds (B),{rounds}");
    let _ = writeln!(
        out,
        "total games (A*B),{}\n",
        matches as u64 * u64::from(rounds)
    );

    let obtained_ranks = shared_ranks(&board.obtained);
    let given_ranks = shared_ranks(&board.given);

    out.push_str("score table");
    for name in &board.names {
        let _ = write!(out, ",{name}");
    }
    out.push_str(",sum,ranking\n");
    for (i, name) in board.names.iter().enumerate() {
        out.push_str(name);
        for j in 0..n {
            let cell = board.matrix[i][j];
            if i == j {
                let _ = write!(out, ",{}", fmt_averaged(cell));
            } else {
                let _ = write!(out, ",{}", fmt_points(cell));
            }
        }
        let _ = writeln!(out, ",{},{}", fmt_averaged(board.obtained[i]), obtained_ranks[i]);
    }
    out.push_str("sum");
    for j in 0..n {
        let _ = write!(out, ",{}", fmt_averaged(board.given[j]));
    }
    out.push('\n');
    out.push_str("ranking");
    for rank in &given_ranks {
        let _ = write!(out, ",{rank}");
    }
    out.push_str("\n\n");

    out.push_str("ranking,strategy,obtained\n");
    for (i, (name, total)) in sorted_desc(&board.names, &board.obtained).into_iter().enumerate() {
        let _ = writeln!(out, "{},{},{}", i + 1, name, fmt_averaged(total));
    }
    out.push('\n');

    out.push_str("ranking,strategy,given\n");
    for (i, (name, total)) in sorted_desc(&board.names, &board.given).into_iter().enumerate() {
        let _ = writeln!(out, "{},{},{}", i + 1, name, fmt_averaged(total));
    }

    out
}

/// Stable descending sort, so tied totals keep registry order.
fn sorted_desc(names: &[String], totals: &[f64]) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = names
        .iter()
        .cloned()
        .zip(totals.iter().copied())
        .collect();
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    pairs
}

/// Off-diagonal cells accumulate whole points and print bare.
fn fmt_points(value: f64) -> String {
    format!("{}", value as i64)
}

/// Mirror cells and the obtained/given totals include per-round averages
/// and always carry a decimal point, `9.0` included; consumers of the
/// artifact rely on the distinction.
fn fmt_averaged(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

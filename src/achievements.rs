//! Achievement evaluation
//!
//! Every achievement is an independent stateless predicate over a finished
//! [`GameReport`]. The registry is an ordered collection, but order only
//! affects the order of the returned ids, never which ones fire.

use crate::report::GameReport;
use crate::session::SessionStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Stable identifiers for the built-in achievements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    /// Won without a single backtrack.
    NoBacktracks,
    /// Finished (either way) after more than three backtracks.
    FrequentBacktracker,
    /// Won after drifting at least two hops further out than the start.
    Comeback,
    /// Gave up while the remaining path was longer than the original optimum.
    QuitWhileBehind,
    /// Won and at least once picked the rarest candidate seen all game.
    RareWordFind,
    /// Won while at least half the moves took the most similar neighbor.
    SimilarityStreakWon,
    /// Gave up while at least half the moves took the most similar neighbor.
    SimilarityStreakGivenUp,
    /// Won while at least half the moves took the least similar neighbor.
    ContrarianWin,
    /// Followed the optimum, left it, and found the way back onto it.
    DeviateAndReturn,
}

impl AchievementId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoBacktracks => "no_backtracks",
            Self::FrequentBacktracker => "frequent_backtracker",
            Self::Comeback => "comeback",
            Self::QuitWhileBehind => "quit_while_behind",
            Self::RareWordFind => "rare_word_find",
            Self::SimilarityStreakWon => "similarity_streak_won",
            Self::SimilarityStreakGivenUp => "similarity_streak_given_up",
            Self::ContrarianWin => "contrarian_win",
            Self::DeviateAndReturn => "deviate_and_return",
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registry entry: id plus its predicate.
#[derive(Clone, Copy)]
pub struct AchievementEntry {
    pub id: AchievementId,
    pub predicate: fn(&GameReport) -> bool,
}

/// Ordered collection of achievement predicates.
#[derive(Clone, Default)]
pub struct AchievementRegistry {
    entries: Vec<AchievementEntry>,
}

impl AchievementRegistry {
    /// The built-in achievement set.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            entries: vec![
                AchievementEntry {
                    id: AchievementId::NoBacktracks,
                    predicate: no_backtracks,
                },
                AchievementEntry {
                    id: AchievementId::FrequentBacktracker,
                    predicate: frequent_backtracker,
                },
                AchievementEntry {
                    id: AchievementId::Comeback,
                    predicate: comeback,
                },
                AchievementEntry {
                    id: AchievementId::QuitWhileBehind,
                    predicate: quit_while_behind,
                },
                AchievementEntry {
                    id: AchievementId::RareWordFind,
                    predicate: rare_word_find,
                },
                AchievementEntry {
                    id: AchievementId::SimilarityStreakWon,
                    predicate: similarity_streak_won,
                },
                AchievementEntry {
                    id: AchievementId::SimilarityStreakGivenUp,
                    predicate: similarity_streak_given_up,
                },
                AchievementEntry {
                    id: AchievementId::ContrarianWin,
                    predicate: contrarian_win,
                },
                AchievementEntry {
                    id: AchievementId::DeviateAndReturn,
                    predicate: deviate_and_return,
                },
            ],
        }
    }

    /// Run every predicate over `report`, returning the ids that fired in
    /// registry order.
    #[must_use]
    pub fn evaluate(&self, report: &GameReport) -> Vec<AchievementId> {
        self.entries
            .iter()
            .filter(|entry| (entry.predicate)(report))
            .map(|entry| entry.id)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for AchievementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.id))
            .finish()
    }
}

fn no_backtracks(report: &GameReport) -> bool {
    report.status == SessionStatus::Won && report.backtrack_history.is_empty()
}

fn frequent_backtracker(report: &GameReport) -> bool {
    report.status.is_terminal() && report.backtrack_history.len() > 3
}

fn comeback(report: &GameReport) -> bool {
    if report.status != SessionStatus::Won
        || report.optimal_path.is_empty()
        || report.optimal_choices.is_empty()
    {
        return false;
    }
    let initial_hops = report.optimal_hops();
    report
        .optimal_choices
        .iter()
        .any(|c| c.hops_from_position_to_end >= initial_hops + 2)
}

fn quit_while_behind(report: &GameReport) -> bool {
    report.status == SessionStatus::GivenUp
        && report.suggested_path.len() > report.optimal_path.len()
}

fn rare_word_find(report: &GameReport) -> bool {
    if report.status != SessionStatus::Won || report.rarest_moves.is_empty() {
        return false;
    }
    let global_min = report
        .rarest_moves
        .iter()
        .map(|r| r.frequency)
        .fold(f64::INFINITY, f64::min);
    report
        .rarest_moves
        .iter()
        .any(|r| r.frequency <= global_min && r.player_chose_rarest)
}

/// At least half the moves took the most similar available neighbor.
fn similarity_bias(report: &GameReport) -> bool {
    if report.optimal_choices.is_empty() {
        return false;
    }
    let biased = report
        .optimal_choices
        .iter()
        .filter(|c| c.chose_most_similar)
        .count();
    biased * 2 >= report.optimal_choices.len()
}

fn similarity_streak_won(report: &GameReport) -> bool {
    report.status == SessionStatus::Won && similarity_bias(report)
}

fn similarity_streak_given_up(report: &GameReport) -> bool {
    report.status == SessionStatus::GivenUp && similarity_bias(report)
}

fn contrarian_win(report: &GameReport) -> bool {
    if report.status != SessionStatus::Won || report.optimal_choices.is_empty() {
        return false;
    }
    let biased = report
        .optimal_choices
        .iter()
        .filter(|c| c.chose_least_similar)
        .count();
    biased * 2 >= report.optimal_choices.len()
}

/// True when the player tracked the optimum, deviated from it, and a later
/// move still landed on an optimal-path word. False when the very first move
/// already deviates, when no deviation ever happens, and when a deviation
/// never finds the way back.
fn deviate_and_return(report: &GameReport) -> bool {
    let Some(first_deviation) = report
        .optimal_choices
        .iter()
        .position(|c| !c.is_global_optimal)
    else {
        return false;
    };
    if first_deviation == 0 {
        return false;
    }
    let on_optimum: HashSet<&str> = report.optimal_path.iter().map(String::as_str).collect();
    // Move i lands at player_path[i + 1]; "returns" means some position
    // strictly after the deviation landing sits on the optimal path.
    report
        .player_path
        .iter()
        .skip(first_deviation + 2)
        .any(|w| on_optimum.contains(w.as_str()))
}

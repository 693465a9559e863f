//! Post-game report generation
//!
//! A [`GameReport`] is the one artifact a finished or abandoned session hands
//! to the outside world (result screens, sharing, sync). Generation is a pure
//! reduction over the session's accumulated records: identical inputs always
//! yield an identical report.

use crate::achievements::{AchievementId, AchievementRegistry};
use crate::graph::WordGraph;
use crate::pathfind::PathFinder;
use crate::session::{
    BacktrackEvent, ChallengeMeta, GameSession, OptimalChoice, RarestMoveRecord, SessionStatus,
};
use serde::{Deserialize, Serialize};

/// Immutable summary of a playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub player_path: Vec<String>,
    /// Fixed start→target optimum the session was created with.
    pub optimal_path: Vec<String>,
    /// Shortest path from the final position to the target. Matches
    /// `[target]` on a win; on a give-up it shows what remained.
    pub suggested_path: Vec<String>,
    pub optimal_choices: Vec<OptimalChoice>,
    pub backtrack_history: Vec<BacktrackEvent>,
    pub rarest_moves: Vec<RarestMoveRecord>,
    pub status: SessionStatus,
    #[serde(default)]
    pub challenge: Option<ChallengeMeta>,
    pub earned_achievements: Vec<AchievementId>,
}

impl GameReport {
    /// Hops of the fixed optimum.
    #[must_use]
    pub fn optimal_hops(&self) -> usize {
        self.optimal_path.len().saturating_sub(1)
    }

    /// Moves the player actually made.
    #[must_use]
    pub fn moves_played(&self) -> usize {
        self.optimal_choices.len()
    }
}

/// Reduce a terminal (or abandoned) session into its report and evaluate the
/// achievement registry over it.
///
/// Side-effect-free apart from path-cache population; calling it twice with
/// the same inputs returns the same report.
#[must_use]
pub fn generate_report(
    graph: &WordGraph,
    finder: &mut PathFinder,
    session: &GameSession,
    registry: &AchievementRegistry,
) -> GameReport {
    let suggested_path =
        finder.shortest_by_hops(graph, &session.current_word, &session.target_word);
    let mut report = GameReport {
        player_path: session.player_path.clone(),
        optimal_path: session.optimal_path.clone(),
        suggested_path,
        optimal_choices: session.optimal_choices.clone(),
        backtrack_history: session.backtrack_history.clone(),
        rarest_moves: session.rarest_moves.clone(),
        status: session.status,
        challenge: session.challenge.clone(),
        earned_achievements: Vec::new(),
    };
    report.earned_achievements = registry.evaluate(&report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WordNode;
    use crate::pair::WordPair;
    use std::collections::HashMap;

    fn line_graph() -> WordGraph {
        let mut words = HashMap::new();
        for (word, neighbors) in [
            ("start", vec![("mid", 0.9_f32)]),
            ("mid", vec![("start", 0.9), ("end", 0.9)]),
            ("end", vec![("mid", 0.9)]),
        ] {
            words.insert(
                word.to_string(),
                WordNode {
                    edges: neighbors
                        .into_iter()
                        .map(|(n, s)| (n.to_string(), s))
                        .collect(),
                    coordinate: None,
                },
            );
        }
        WordGraph::from_words(words)
    }

    #[test]
    fn report_generation_is_deterministic() {
        let graph = line_graph();
        let registry = AchievementRegistry::standard();
        let mut finder = PathFinder::new();
        let mut session = GameSession::new();
        session
            .start(
                &graph,
                &mut finder,
                &WordPair {
                    start: "start".to_string(),
                    target: "end".to_string(),
                },
                0,
                None,
            )
            .unwrap();
        session.status = SessionStatus::GivenUp;

        let first = generate_report(&graph, &mut finder, &session, &registry);
        let second = generate_report(&graph, &mut finder, &session, &registry);
        assert_eq!(first, second);
        assert_eq!(first.suggested_path, vec!["start", "mid", "end"]);
        assert_eq!(first.optimal_hops(), 2);
        assert_eq!(first.moves_played(), 0);
    }

    #[test]
    fn report_serializes_round_trip() {
        let graph = line_graph();
        let registry = AchievementRegistry::standard();
        let mut finder = PathFinder::new();
        let mut session = GameSession::new();
        session
            .start(
                &graph,
                &mut finder,
                &WordPair {
                    start: "start".to_string(),
                    target: "end".to_string(),
                },
                0,
                Some(ChallengeMeta {
                    daily: true,
                    id: Some("2026-08-30".to_string()),
                }),
            )
            .unwrap();
        session.status = SessionStatus::GivenUp;

        let report = generate_report(&graph, &mut finder, &session, &registry);
        let json = serde_json::to_string(&report).unwrap();
        let back: GameReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert!(back.challenge.unwrap().daily);
    }
}

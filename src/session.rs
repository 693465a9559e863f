//! Game session state machine
//!
//! A [`GameSession`] drives a single playthrough: `idle → loading → playing →
//! {won, given_up}`, with `idle` doubling as the recovery state when a start
//! attempt fails. The session is plain serializable data; all mutation goes
//! through [`GameSession::start`], [`GameSession::select_word`],
//! [`GameSession::backtrack_to`] and [`GameSession::give_up`], and a finished
//! session produces exactly one [`GameReport`].
//!
//! Invalid moves and backtracks never mutate state: the caller gets a typed
//! error and the session is untouched.

use crate::achievements::AchievementRegistry;
use crate::graph::{FrequencyTable, WordGraph};
use crate::pair::WordPair;
use crate::pathfind::PathFinder;
use crate::report::{GameReport, generate_report};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Frequency recorded for neighbors absent from the frequency table. Treated
/// as maximally common so unknown words can never count as "rarest".
const UNKNOWN_FREQUENCY: f64 = f64::MAX;

/// Errors surfaced by session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("word graph or frequency data not loaded")]
    DataMissing,
    #[error("invalid pair: {reason}")]
    InvalidPair { reason: String },
    #[error("no path from '{start}' to '{target}'")]
    Unreachable { start: String, target: String },
    #[error("'{word}' is not adjacent to the current word")]
    InvalidMove { word: String },
    #[error("invalid backtrack: {reason}")]
    InvalidBacktrack { reason: String },
    #[error("no game in progress")]
    NotPlaying,
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Playing,
    Won,
    GivenUp,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Won => "won",
            Self::GivenUp => "given_up",
        }
    }

    /// True for `won` and `given_up`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::GivenUp)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "loading" => Ok(Self::Loading),
            "playing" => Ok(Self::Playing),
            "won" => Ok(Self::Won),
            "given_up" => Ok(Self::GivenUp),
            _ => Err(()),
        }
    }
}

/// Challenge provenance for externally supplied pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChallengeMeta {
    /// True for the shared daily challenge, false for a direct challenge link.
    #[serde(default)]
    pub daily: bool,
    #[serde(default)]
    pub id: Option<String>,
}

/// Per-move record of how the player's choice relates to the optimal routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalChoice {
    /// Word the player stood on before the move.
    pub player_position: String,
    pub player_chose: String,
    /// Next word after `player_position` in the fixed start→target path, when
    /// that position lies on it.
    pub optimal_choice: Option<String>,
    /// Choice matches the fixed start→target path.
    pub is_global_optimal: bool,
    /// Choice matches the recomputed position→target path.
    pub is_local_optimal: bool,
    /// Length in hops of the pre-move suggested path.
    pub hops_from_position_to_end: usize,
    pub chose_most_similar: bool,
    pub chose_least_similar: bool,
    /// Set once this move is consumed as a backtrack checkpoint.
    pub used_as_checkpoint: bool,
}

/// One backtrack jump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktrackEvent {
    pub jumped_from: String,
    pub landed_on: String,
}

/// Rarest neighbor available at one move, and whether the player took it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarestMoveRecord {
    pub word: String,
    pub frequency: f64,
    pub player_chose_rarest: bool,
}

/// Outcome of a valid [`GameSession::select_word`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Move accepted, game continues.
    Advanced,
    /// Move reached the target; the session is `won` and reported.
    Won(Box<GameReport>),
}

/// A single playthrough. See the module docs for the lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameSession {
    pub start_word: String,
    pub target_word: String,
    pub current_word: String,
    /// Ordered visited words; first is the start, last is the current word.
    pub player_path: Vec<String>,
    /// Shortest start→target path, fixed at session creation.
    pub optimal_path: Vec<String>,
    /// Shortest current→target path, recomputed after every accepted move.
    pub suggested_path: Vec<String>,
    /// One entry per move, parallel to `player_path[1..]`.
    pub optimal_choices: Vec<OptimalChoice>,
    pub backtrack_history: Vec<BacktrackEvent>,
    /// One entry per move, parallel to `optimal_choices`.
    pub rarest_moves: Vec<RarestMoveRecord>,
    pub status: SessionStatus,
    /// Host-supplied epoch milliseconds at start.
    pub start_time_ms: u64,
    #[serde(default)]
    pub challenge: Option<ChallengeMeta>,
    /// Human-readable reason for the most recent start failure.
    #[serde(default)]
    pub idle_reason: Option<String>,
}

impl GameSession {
    /// Fresh idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a playthrough for `pair`, replacing whatever this session held.
    ///
    /// On failure the session lands back in `idle` carrying the reason, ready
    /// for another start attempt.
    ///
    /// # Errors
    ///
    /// `DataMissing` when the graph is empty, `InvalidPair` when either word
    /// is absent (or the words coincide), `Unreachable` when no path connects
    /// them.
    pub fn start(
        &mut self,
        graph: &WordGraph,
        finder: &mut PathFinder,
        pair: &WordPair,
        start_time_ms: u64,
        challenge: Option<ChallengeMeta>,
    ) -> Result<(), GameError> {
        self.status = SessionStatus::Loading;
        match Self::resolve_start(graph, finder, pair) {
            Ok(optimal_path) => {
                *self = Self {
                    start_word: pair.start.clone(),
                    target_word: pair.target.clone(),
                    current_word: pair.start.clone(),
                    player_path: vec![pair.start.clone()],
                    suggested_path: optimal_path.clone(),
                    optimal_path,
                    optimal_choices: Vec::new(),
                    backtrack_history: Vec::new(),
                    rarest_moves: Vec::new(),
                    status: SessionStatus::Playing,
                    start_time_ms,
                    challenge,
                    idle_reason: None,
                };
                log::debug!(
                    "session started: {} -> {} ({} hop optimum)",
                    self.start_word,
                    self.target_word,
                    self.optimal_path.len().saturating_sub(1)
                );
                Ok(())
            }
            Err(err) => {
                *self = Self {
                    status: SessionStatus::Idle,
                    idle_reason: Some(err.to_string()),
                    ..Self::default()
                };
                Err(err)
            }
        }
    }

    fn resolve_start(
        graph: &WordGraph,
        finder: &mut PathFinder,
        pair: &WordPair,
    ) -> Result<Vec<String>, GameError> {
        if graph.is_empty() {
            return Err(GameError::DataMissing);
        }
        if pair.start == pair.target {
            return Err(GameError::InvalidPair {
                reason: "start and target are the same word".to_string(),
            });
        }
        for word in [&pair.start, &pair.target] {
            if !graph.contains(word) {
                return Err(GameError::InvalidPair {
                    reason: format!("'{word}' is not in the graph"),
                });
            }
        }
        let optimal = finder.shortest_by_hops(graph, &pair.start, &pair.target);
        if optimal.is_empty() {
            return Err(GameError::Unreachable {
                start: pair.start.clone(),
                target: pair.target.clone(),
            });
        }
        Ok(optimal)
    }

    /// Play one move to an adjacent word.
    ///
    /// # Errors
    ///
    /// `NotPlaying` outside the `playing` state; `InvalidMove` when `word` is
    /// not adjacent to the current word. Neither mutates anything.
    pub fn select_word(
        &mut self,
        graph: &WordGraph,
        frequencies: &FrequencyTable,
        finder: &mut PathFinder,
        registry: &AchievementRegistry,
        word: &str,
    ) -> Result<MoveOutcome, GameError> {
        if self.status != SessionStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        let Some(chosen_weight) = graph.edge_weight(&self.current_word, word) else {
            return Err(GameError::InvalidMove {
                word: word.to_string(),
            });
        };

        self.rarest_moves
            .push(self.rarity_record(graph, frequencies, word));
        let choice = self.build_optimal_choice(graph, word, chosen_weight);
        self.optimal_choices.push(choice);
        self.player_path.push(word.to_string());
        self.current_word = word.to_string();

        if self.current_word == self.target_word {
            self.status = SessionStatus::Won;
            let report = generate_report(graph, finder, self, registry);
            return Ok(MoveOutcome::Won(Box::new(report)));
        }
        self.suggested_path =
            finder.shortest_by_hops(graph, &self.current_word, &self.target_word);
        Ok(MoveOutcome::Advanced)
    }

    /// Rarest neighbor reachable from the pre-move position. Ties resolve to
    /// whichever candidate iterates first; that is incidental, not a rule.
    fn rarity_record(
        &self,
        graph: &WordGraph,
        frequencies: &FrequencyTable,
        chosen: &str,
    ) -> RarestMoveRecord {
        let mut rarest: Option<(&String, f64)> = None;
        if let Some(edges) = graph.neighbors(&self.current_word) {
            for neighbor in edges.keys() {
                let frequency = frequencies.get(neighbor).unwrap_or(UNKNOWN_FREQUENCY);
                let replace = rarest.is_none_or(|(_, best)| frequency < best);
                if replace {
                    rarest = Some((neighbor, frequency));
                }
            }
        }
        match rarest {
            Some((word, frequency)) => RarestMoveRecord {
                word: word.clone(),
                frequency,
                player_chose_rarest: chosen == word,
            },
            // Unreachable for a validated move, but keep the record stream
            // parallel to the move stream.
            None => RarestMoveRecord {
                word: chosen.to_string(),
                frequency: UNKNOWN_FREQUENCY,
                player_chose_rarest: true,
            },
        }
    }

    fn build_optimal_choice(
        &self,
        graph: &WordGraph,
        chosen: &str,
        chosen_weight: f32,
    ) -> OptimalChoice {
        let position = &self.current_word;
        let global_next = self
            .optimal_path
            .iter()
            .position(|w| w == position)
            .and_then(|i| self.optimal_path.get(i + 1));
        let local_next = self.suggested_path.get(1);

        let mut max_weight = f32::MIN;
        let mut min_weight = f32::MAX;
        if let Some(edges) = graph.neighbors(position) {
            for &weight in edges.values() {
                max_weight = max_weight.max(weight);
                min_weight = min_weight.min(weight);
            }
        }

        OptimalChoice {
            player_position: position.clone(),
            player_chose: chosen.to_string(),
            optimal_choice: global_next.cloned(),
            is_global_optimal: global_next.is_some_and(|w| w == chosen),
            is_local_optimal: local_next.is_some_and(|w| w == chosen),
            hops_from_position_to_end: self.suggested_path.len().saturating_sub(1),
            chose_most_similar: chosen_weight >= max_weight,
            chose_least_similar: chosen_weight <= min_weight,
            used_as_checkpoint: false,
        }
    }

    /// Jump back to an earlier word in the path.
    ///
    /// The landing word must sit at `index` in the player path, the move that
    /// arrived there must be an unused global- or local-optimal checkpoint,
    /// and no earlier backtrack may have landed on the same word.
    ///
    /// # Errors
    ///
    /// `NotPlaying` outside the `playing` state, otherwise
    /// `InvalidBacktrack` with the violated rule. Failed calls mutate
    /// nothing.
    pub fn backtrack_to(
        &mut self,
        graph: &WordGraph,
        finder: &mut PathFinder,
        word: &str,
        index: usize,
    ) -> Result<(), GameError> {
        if self.status != SessionStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        if index == 0 || index >= self.player_path.len() {
            return Err(GameError::InvalidBacktrack {
                reason: format!("index {index} out of range"),
            });
        }
        if self.player_path[index] != word {
            return Err(GameError::InvalidBacktrack {
                reason: format!("'{word}' is not at index {index}"),
            });
        }
        let checkpoint = &self.optimal_choices[index - 1];
        if !(checkpoint.is_global_optimal || checkpoint.is_local_optimal) {
            return Err(GameError::InvalidBacktrack {
                reason: format!("move onto '{word}' was not an optimal choice"),
            });
        }
        if checkpoint.used_as_checkpoint {
            return Err(GameError::InvalidBacktrack {
                reason: format!("checkpoint '{word}' already used"),
            });
        }
        if self.backtrack_history.iter().any(|e| e.landed_on == word) {
            return Err(GameError::InvalidBacktrack {
                reason: format!("'{word}' was already a backtrack target"),
            });
        }

        let jumped_from = std::mem::take(&mut self.current_word);
        self.player_path.truncate(index + 1);
        self.optimal_choices.truncate(index);
        self.rarest_moves.truncate(index);
        self.optimal_choices[index - 1].used_as_checkpoint = true;
        self.current_word = word.to_string();
        // Defensive recompute of the fixed path as well; it is cached, so
        // this costs a map lookup unless the graph was reloaded.
        self.optimal_path = finder.shortest_by_hops(graph, &self.start_word, &self.target_word);
        self.suggested_path =
            finder.shortest_by_hops(graph, &self.current_word, &self.target_word);
        self.backtrack_history.push(BacktrackEvent {
            jumped_from,
            landed_on: word.to_string(),
        });
        Ok(())
    }

    /// Abandon the playthrough, producing the final report.
    ///
    /// # Errors
    ///
    /// `NotPlaying` outside the `playing` state.
    pub fn give_up(
        &mut self,
        graph: &WordGraph,
        finder: &mut PathFinder,
        registry: &AchievementRegistry,
    ) -> Result<GameReport, GameError> {
        if self.status != SessionStatus::Playing || self.target_word.is_empty() {
            return Err(GameError::NotPlaying);
        }
        self.status = SessionStatus::GivenUp;
        Ok(generate_report(graph, finder, self, registry))
    }

    /// Number of moves played so far.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.optimal_choices.len()
    }
}

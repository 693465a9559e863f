//! Session snapshots for the persistence boundary
//!
//! A [`SessionSnapshot`] is the flat, serializable image of an in-flight
//! session that the host's storage adapter saves and loads. Snapshots are only
//! meaningful while a game is `playing`; terminal sessions are summarized by a
//! report instead and their snapshot is cleared.

use crate::session::{
    BacktrackEvent, ChallengeMeta, GameSession, OptimalChoice, RarestMoveRecord, SessionStatus,
};
use serde::{Deserialize, Serialize};

/// Serializable image of a [`GameSession`] plus challenge provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub start_word: String,
    pub target_word: String,
    pub current_word: String,
    pub player_path: Vec<String>,
    pub optimal_path: Vec<String>,
    pub suggested_path: Vec<String>,
    pub optimal_choices: Vec<OptimalChoice>,
    pub backtrack_history: Vec<BacktrackEvent>,
    pub rarest_moves: Vec<RarestMoveRecord>,
    pub status: SessionStatus,
    /// Epoch milliseconds when the run started.
    pub start_time_ms: u64,
    #[serde(default)]
    pub is_challenge: bool,
    #[serde(default)]
    pub is_daily_challenge: bool,
    #[serde(default)]
    pub challenge_id: Option<String>,
}

impl SessionSnapshot {
    /// Capture the persistable image of `session`.
    #[must_use]
    pub fn capture(session: &GameSession) -> Self {
        Self {
            start_word: session.start_word.clone(),
            target_word: session.target_word.clone(),
            current_word: session.current_word.clone(),
            player_path: session.player_path.clone(),
            optimal_path: session.optimal_path.clone(),
            suggested_path: session.suggested_path.clone(),
            optimal_choices: session.optimal_choices.clone(),
            backtrack_history: session.backtrack_history.clone(),
            rarest_moves: session.rarest_moves.clone(),
            status: session.status,
            start_time_ms: session.start_time_ms,
            is_challenge: session.challenge.is_some(),
            is_daily_challenge: session
                .challenge
                .as_ref()
                .is_some_and(|c| c.daily),
            challenge_id: session.challenge.as_ref().and_then(|c| c.id.clone()),
        }
    }

    /// Rebuild the in-memory session. The transient `idle_reason` is not
    /// persisted; hosts should defensively recompute paths after restoring in
    /// case the graph shipped an update since the save.
    #[must_use]
    pub fn restore(self) -> GameSession {
        let challenge = self.is_challenge.then(|| ChallengeMeta {
            daily: self.is_daily_challenge,
            id: self.challenge_id.clone(),
        });
        GameSession {
            start_word: self.start_word,
            target_word: self.target_word,
            current_word: self.current_word,
            player_path: self.player_path,
            optimal_path: self.optimal_path,
            suggested_path: self.suggested_path,
            optimal_choices: self.optimal_choices,
            backtrack_history: self.backtrack_history,
            rarest_moves: self.rarest_moves,
            status: self.status,
            start_time_ms: self.start_time_ms,
            challenge,
            idle_reason: None,
        }
    }

    /// Serialize for a JSON-backed store.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a snapshot previously produced by [`Self::to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

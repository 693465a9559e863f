//! WordWalk Game Engine
//!
//! Platform-agnostic core logic for the WordWalk word-navigation puzzle. The
//! player walks a weighted word-similarity graph from a start word to a
//! target word, one neighbor at a time; this crate owns the pathfinding, pair
//! selection, the per-move session state machine, report generation, and
//! achievement evaluation. Rendering, storage backends, and transport are the
//! host's problem and plug in through the [`GraphLoader`] and [`SessionStore`]
//! ports.

pub mod achievements;
pub mod graph;
pub mod pair;
pub mod pathfind;
pub mod report;
pub mod rng;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use achievements::{AchievementEntry, AchievementId, AchievementRegistry};
pub use graph::{FrequencyTable, WordGraph, WordNode};
pub use pair::{SelectorConfig, SelectorConfigError, WordPair, select_pair};
pub use pathfind::PathFinder;
pub use report::{GameReport, generate_report};
pub use rng::{CountingRng, RngBundle};
pub use session::{
    BacktrackEvent, ChallengeMeta, GameError, GameSession, MoveOutcome, OptimalChoice,
    RarestMoveRecord, SessionStatus,
};
pub use snapshot::SessionSnapshot;

/// Trait for abstracting graph and configuration loading.
/// Platform-specific implementations should provide this.
pub trait GraphLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the word graph from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph data cannot be loaded.
    fn load_graph(&self) -> Result<WordGraph, Self::Error>;

    /// Load the corpus frequency table.
    ///
    /// # Errors
    ///
    /// Returns an error if the frequency data cannot be loaded.
    fn load_frequencies(&self) -> Result<FrequencyTable, Self::Error>;

    /// Load configuration data for a specific system.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Trait for abstracting snapshot save/load/clear operations.
/// Platform-specific implementations should provide this.
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the in-flight session snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), Self::Error>;

    /// Load the previously saved snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded.
    fn load(&self) -> Result<Option<SessionSnapshot>, Self::Error>;

    /// Remove any saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be removed.
    fn clear(&self) -> Result<(), Self::Error>;
}

/// Main engine binding loaded data, pathfinding, and the active session.
///
/// Persistence is best-effort by contract: every mutating action issues a
/// save (or clear, once terminal), failures are logged and never roll back
/// in-memory state.
pub struct GameEngine<L, S>
where
    L: GraphLoader,
    S: SessionStore,
{
    loader: L,
    store: S,
    graph: WordGraph,
    frequencies: FrequencyTable,
    selector: SelectorConfig,
    finder: PathFinder,
    rng: RngBundle,
    registry: AchievementRegistry,
    session: GameSession,
}

impl<L, S> GameEngine<L, S>
where
    L: GraphLoader,
    S: SessionStore,
{
    /// Create an engine, loading graph, frequencies, and selector config
    /// through `loader`. `seed` drives all pair-selection randomness.
    ///
    /// # Errors
    ///
    /// Returns an error if any data source fails to load or the selector
    /// configuration is invalid.
    pub fn new(loader: L, store: S, seed: u64) -> Result<Self, anyhow::Error> {
        let graph = loader.load_graph()?;
        let frequencies = loader.load_frequencies()?;
        let selector: SelectorConfig = loader.load_config("selector")?;
        selector.validate()?;
        Ok(Self {
            loader,
            store,
            graph,
            frequencies,
            selector,
            finder: PathFinder::new(),
            rng: RngBundle::from_user_seed(seed),
            registry: AchievementRegistry::standard(),
            session: GameSession::new(),
        })
    }

    /// Re-fetch graph and frequency data, dropping every memoized path.
    ///
    /// # Errors
    ///
    /// Returns an error if either data source fails to load; the previous
    /// data stays in place in that case.
    pub fn reload_data(&mut self) -> Result<(), anyhow::Error> {
        let graph = self.loader.load_graph()?;
        let frequencies = self.loader.load_frequencies()?;
        self.graph = graph;
        self.frequencies = frequencies;
        self.finder.invalidate();
        Ok(())
    }

    /// Deterministically reseed pair selection.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RngBundle::from_user_seed(seed);
    }

    /// Start a playthrough on a freshly selected pair.
    ///
    /// # Errors
    ///
    /// `DataMissing` when no graph is loaded, plus any [`GameSession::start`]
    /// failure. The session recovers to `idle` carrying the reason.
    pub fn start_random(&mut self, start_time_ms: u64) -> Result<&GameSession, GameError> {
        if self.graph.is_empty() {
            return Err(GameError::DataMissing);
        }
        let pair = select_pair(&self.graph, &mut self.finder, &self.selector, &self.rng)?;
        self.start_with_pair(&pair, start_time_ms, None)
    }

    /// Start a playthrough on an externally supplied pair (challenge links,
    /// daily challenges).
    ///
    /// # Errors
    ///
    /// Any [`GameSession::start`] failure; the session recovers to `idle`.
    pub fn start_with_pair(
        &mut self,
        pair: &WordPair,
        start_time_ms: u64,
        challenge: Option<ChallengeMeta>,
    ) -> Result<&GameSession, GameError> {
        self.session
            .start(&self.graph, &mut self.finder, pair, start_time_ms, challenge)?;
        self.persist();
        Ok(&self.session)
    }

    /// Play one move. Valid moves persist the new snapshot (or clear it on a
    /// win); invalid moves change nothing and touch no storage.
    ///
    /// # Errors
    ///
    /// See [`GameSession::select_word`].
    pub fn select_word(&mut self, word: &str) -> Result<MoveOutcome, GameError> {
        let outcome = self.session.select_word(
            &self.graph,
            &self.frequencies,
            &mut self.finder,
            &self.registry,
            word,
        )?;
        match outcome {
            MoveOutcome::Advanced => self.persist(),
            MoveOutcome::Won(_) => self.clear_snapshot(),
        }
        Ok(outcome)
    }

    /// Backtrack to an earlier checkpoint. Persists on success only.
    ///
    /// # Errors
    ///
    /// See [`GameSession::backtrack_to`].
    pub fn backtrack_to(&mut self, word: &str, index: usize) -> Result<(), GameError> {
        self.session
            .backtrack_to(&self.graph, &mut self.finder, word, index)?;
        self.persist();
        Ok(())
    }

    /// Abandon the current playthrough.
    ///
    /// # Errors
    ///
    /// See [`GameSession::give_up`].
    pub fn give_up(&mut self) -> Result<GameReport, GameError> {
        let report = self
            .session
            .give_up(&self.graph, &mut self.finder, &self.registry)?;
        self.clear_snapshot();
        Ok(report)
    }

    /// Restore a saved in-flight session, if one exists.
    ///
    /// Paths are recomputed defensively after the restore in case the graph
    /// shipped an update since the save. Snapshots in any state other than
    /// `playing` are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to load.
    pub fn load_session(&mut self) -> Result<bool, anyhow::Error> {
        let Some(snapshot) = self.store.load()? else {
            return Ok(false);
        };
        if snapshot.status != SessionStatus::Playing {
            return Ok(false);
        }
        let mut session = snapshot.restore();
        session.optimal_path =
            self.finder
                .shortest_by_hops(&self.graph, &session.start_word, &session.target_word);
        session.suggested_path = self.finder.shortest_by_hops(
            &self.graph,
            &session.current_word,
            &session.target_word,
        );
        self.session = session;
        Ok(true)
    }

    /// Borrow the active session.
    #[must_use]
    pub const fn session(&self) -> &GameSession {
        &self.session
    }

    /// Borrow the loaded graph.
    #[must_use]
    pub const fn graph(&self) -> &WordGraph {
        &self.graph
    }

    /// Borrow the achievement registry.
    #[must_use]
    pub const fn registry(&self) -> &AchievementRegistry {
        &self.registry
    }

    fn persist(&self) {
        let snapshot = SessionSnapshot::capture(&self.session);
        if let Err(err) = self.store.save(&snapshot) {
            log::warn!("session save failed (state kept in memory): {err}");
        }
    }

    fn clear_snapshot(&self) {
        if let Err(err) = self.store.clear() {
            log::warn!("session snapshot clear failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    const GRAPH_JSON: &str = r#"{
        "start":  { "edges": { "mid": 0.9, "detour": 0.4 }, "coordinate": [0.0, 0.0] },
        "mid":    { "edges": { "start": 0.9, "end": 0.8, "detour": 0.5 }, "coordinate": [0.4, 0.1] },
        "detour": { "edges": { "start": 0.4, "mid": 0.5, "end": 0.3 }, "coordinate": [0.2, 0.6] },
        "end":    { "edges": { "mid": 0.8, "detour": 0.3 }, "coordinate": [0.9, 0.8] }
    }"#;

    impl GraphLoader for FixtureLoader {
        type Error = Infallible;

        fn load_graph(&self) -> Result<WordGraph, Self::Error> {
            Ok(WordGraph::from_json(GRAPH_JSON).unwrap())
        }

        fn load_frequencies(&self) -> Result<FrequencyTable, Self::Error> {
            Ok(FrequencyTable::from_json(
                r#"{ "start": 900.0, "mid": 500.0, "detour": 3.0, "end": 700.0 }"#,
            )
            .unwrap())
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            Ok(serde_json::from_str("{}").unwrap())
        }
    }

    #[derive(Default)]
    struct StoreState {
        snapshot: Option<SessionSnapshot>,
        saves: u32,
        clears: u32,
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        state: Rc<RefCell<StoreState>>,
    }

    impl SessionStore for MemoryStore {
        type Error = Infallible;

        fn save(&self, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
            let mut state = self.state.borrow_mut();
            state.snapshot = Some(snapshot.clone());
            state.saves += 1;
            Ok(())
        }

        fn load(&self) -> Result<Option<SessionSnapshot>, Self::Error> {
            Ok(self.state.borrow().snapshot.clone())
        }

        fn clear(&self) -> Result<(), Self::Error> {
            let mut state = self.state.borrow_mut();
            state.snapshot = None;
            state.clears += 1;
            Ok(())
        }
    }

    fn pair(start: &str, target: &str) -> WordPair {
        WordPair {
            start: start.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn engine_plays_through_to_a_win() {
        let store = MemoryStore::default();
        let mut engine = GameEngine::new(FixtureLoader, store.clone(), 1).unwrap();
        engine.start_with_pair(&pair("start", "end"), 100, None).unwrap();
        assert_eq!(engine.session().status, SessionStatus::Playing);
        assert_eq!(store.state.borrow().saves, 1);

        assert_eq!(
            engine.select_word("mid").unwrap(),
            MoveOutcome::Advanced
        );
        let MoveOutcome::Won(report) = engine.select_word("end").unwrap() else {
            panic!("expected win");
        };
        assert_eq!(report.player_path, vec!["start", "mid", "end"]);
        assert!(
            report
                .earned_achievements
                .contains(&AchievementId::NoBacktracks)
        );
        // Terminal sessions leave no snapshot behind.
        assert!(store.state.borrow().snapshot.is_none());
        assert_eq!(store.state.borrow().clears, 1);
    }

    #[test]
    fn invalid_move_issues_no_persistence_call() {
        let store = MemoryStore::default();
        let mut engine = GameEngine::new(FixtureLoader, store.clone(), 1).unwrap();
        engine.start_with_pair(&pair("start", "end"), 0, None).unwrap();
        let saves_before = store.state.borrow().saves;

        let err = engine.select_word("end").unwrap_err();
        assert!(matches!(err, GameError::InvalidMove { .. }));
        assert_eq!(engine.session().player_path, vec!["start"]);
        assert_eq!(engine.session().current_word, "start");
        assert_eq!(store.state.borrow().saves, saves_before);
    }

    #[test]
    fn saved_session_reloads_into_identical_state() {
        let store = MemoryStore::default();
        let mut engine = GameEngine::new(FixtureLoader, store.clone(), 1).unwrap();
        engine.start_with_pair(&pair("start", "end"), 42, None).unwrap();
        engine.select_word("mid").unwrap();

        let mut revived = GameEngine::new(FixtureLoader, store, 1).unwrap();
        assert!(revived.load_session().unwrap());
        assert_eq!(revived.session().current_word, engine.session().current_word);
        assert_eq!(revived.session().player_path, engine.session().player_path);
        assert_eq!(
            revived.session().optimal_choices.len(),
            engine.session().optimal_choices.len()
        );
        assert_eq!(revived.session().start_time_ms, 42);
    }

    #[test]
    fn load_session_ignores_missing_or_terminal_snapshots() {
        let store = MemoryStore::default();
        let mut engine = GameEngine::new(FixtureLoader, store.clone(), 1).unwrap();
        assert!(!engine.load_session().unwrap());

        engine.start_with_pair(&pair("start", "end"), 0, None).unwrap();
        let mut stale = SessionSnapshot::capture(engine.session());
        stale.status = SessionStatus::Won;
        store.state.borrow_mut().snapshot = Some(stale);
        assert!(!engine.load_session().unwrap());
    }

    #[test]
    fn start_random_is_deterministic_per_seed() {
        let first = {
            let mut engine = GameEngine::new(FixtureLoader, MemoryStore::default(), 7).unwrap();
            engine.start_random(0).unwrap();
            (
                engine.session().start_word.clone(),
                engine.session().target_word.clone(),
            )
        };
        let second = {
            let mut engine = GameEngine::new(FixtureLoader, MemoryStore::default(), 7).unwrap();
            engine.start_random(0).unwrap();
            (
                engine.session().start_word.clone(),
                engine.session().target_word.clone(),
            )
        };
        assert_eq!(first, second);
        assert_ne!(first.0, first.1);
    }

    #[test]
    fn reload_data_drops_memoized_paths() {
        let mut engine = GameEngine::new(FixtureLoader, MemoryStore::default(), 1).unwrap();
        engine.start_with_pair(&pair("start", "end"), 0, None).unwrap();
        assert!(engine.finder.cached_paths() > 0);
        engine.reload_data().unwrap();
        assert_eq!(engine.finder.cached_paths(), 0);
    }
}

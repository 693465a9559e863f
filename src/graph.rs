//! Word graph and frequency data
//!
//! Immutable in-memory representation of the semantic similarity graph and the
//! corpus frequency table. Both are plain data: the platform layer loads them
//! (bundled JSON, network fetch, whatever) and hands them to the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single word in the similarity graph.
///
/// `edges` maps neighbor words to similarity weights in `[0, 1]`. Edges are
/// stored per direction; symmetry is assumed by the data pipeline but never
/// enforced here, and lookups only ever read the out-edges of the queried word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WordNode {
    #[serde(default)]
    pub edges: HashMap<String, f32>,
    /// Optional 2-D embedding projection, used by pair selection to keep the
    /// start and target visually far apart.
    #[serde(default)]
    pub coordinate: Option<[f32; 2]>,
}

/// The full word graph: word → node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct WordGraph {
    words: HashMap<String, WordNode>,
}

impl WordGraph {
    /// Create an empty graph (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            words: HashMap::new(),
        }
    }

    /// Load a graph from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid graph data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build a graph from pre-constructed nodes.
    #[must_use]
    pub fn from_words(words: HashMap<String, WordNode>) -> Self {
        Self { words }
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    #[must_use]
    pub fn node(&self, word: &str) -> Option<&WordNode> {
        self.words.get(word)
    }

    /// Out-edges of `word`, or an empty map for unknown words.
    #[must_use]
    pub fn neighbors(&self, word: &str) -> Option<&HashMap<String, f32>> {
        self.words.get(word).map(|node| &node.edges)
    }

    /// Number of out-edges of `word`; zero for unknown words.
    #[must_use]
    pub fn degree(&self, word: &str) -> usize {
        self.words.get(word).map_or(0, |node| node.edges.len())
    }

    /// Similarity weight of the directed edge `from → to`, if it exists.
    #[must_use]
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f32> {
        self.words.get(from)?.edges.get(to).copied()
    }

    /// Squared euclidean distance between the embedding coordinates of two
    /// words. `None` when either word is missing or lacks a coordinate.
    #[must_use]
    pub fn squared_coord_distance(&self, a: &str, b: &str) -> Option<f32> {
        let ca = self.words.get(a)?.coordinate?;
        let cb = self.words.get(b)?.coordinate?;
        let dx = ca[0] - cb[0];
        let dy = ca[1] - cb[1];
        Some(dx * dx + dy * dy)
    }

    /// Iterate over all words in the graph.
    pub fn words(&self) -> impl Iterator<Item = &String> {
        self.words.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Corpus frequency per word. Lower values mean rarer words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct FrequencyTable {
    entries: HashMap<String, f64>,
}

impl FrequencyTable {
    /// Create an empty table (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Load a frequency table from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a word → number map.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build a table from pre-constructed entries.
    #[must_use]
    pub fn from_entries(entries: HashMap<String, f64>) -> Self {
        Self { entries }
    }

    /// Corpus frequency of `word`, if known.
    #[must_use]
    pub fn get(&self, word: &str) -> Option<f64> {
        self.entries.get(word).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

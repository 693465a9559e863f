//! Start/target pair selection
//!
//! Constrained random sampling of an interesting `(start, target)` pair.
//! Cheap degree and embedding-distance checks run before any shortest-path
//! computation; only candidates surviving those pay for a Dijkstra run. When
//! every attempt fails, selection degrades to an unconstrained random pair
//! and logs the quality loss.

use crate::graph::WordGraph;
use crate::pathfind::PathFinder;
use crate::rng::RngBundle;
use crate::session::GameError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A selected start/target pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub start: String,
    pub target: String,
}

/// Thresholds governing pair quality. All values are data, not constants;
/// hosts may ship their own tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Minimum out-degree required of both endpoints.
    #[serde(default = "SelectorConfig::default_min_degree")]
    pub min_degree: usize,
    /// Minimum euclidean distance between endpoint embedding coordinates.
    /// Compared squared; words without coordinates pass the check.
    #[serde(default = "SelectorConfig::default_min_coord_distance")]
    pub min_coord_distance: f32,
    /// Inclusive bounds on the hop count of the shortest path.
    #[serde(default = "SelectorConfig::default_min_path_hops")]
    pub min_path_hops: usize,
    #[serde(default = "SelectorConfig::default_max_path_hops")]
    pub max_path_hops: usize,
    /// Sampling attempts before falling back to an unconstrained pair.
    #[serde(default = "SelectorConfig::default_max_attempts")]
    pub max_attempts: u32,
}

impl SelectorConfig {
    const fn default_min_degree() -> usize {
        2
    }

    const fn default_min_coord_distance() -> f32 {
        0.2
    }

    const fn default_min_path_hops() -> usize {
        3
    }

    const fn default_max_path_hops() -> usize {
        8
    }

    const fn default_max_attempts() -> u32 {
        100
    }

    /// Check configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `SelectorConfigError` when any field violates the documented
    /// bounds.
    pub fn validate(&self) -> Result<(), SelectorConfigError> {
        if self.min_degree < 1 {
            return Err(SelectorConfigError::MinViolation {
                field: "selector.min_degree",
                min: 1.0,
                value: 0.0,
            });
        }
        if self.min_coord_distance < 0.0 {
            return Err(SelectorConfigError::MinViolation {
                field: "selector.min_coord_distance",
                min: 0.0,
                value: f64::from(self.min_coord_distance),
            });
        }
        if self.min_path_hops < 1 {
            return Err(SelectorConfigError::MinViolation {
                field: "selector.min_path_hops",
                min: 1.0,
                value: self.min_path_hops as f64,
            });
        }
        if self.min_path_hops > self.max_path_hops {
            return Err(SelectorConfigError::HopBounds {
                min: self.min_path_hops,
                max: self.max_path_hops,
            });
        }
        if self.max_attempts < 1 {
            return Err(SelectorConfigError::MinViolation {
                field: "selector.max_attempts",
                min: 1.0,
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_degree: Self::default_min_degree(),
            min_coord_distance: Self::default_min_coord_distance(),
            min_path_hops: Self::default_min_path_hops(),
            max_path_hops: Self::default_max_path_hops(),
            max_attempts: Self::default_max_attempts(),
        }
    }
}

/// Errors raised when selector configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum SelectorConfigError {
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("hop bounds invalid (min {min} > max {max})")]
    HopBounds { min: usize, max: usize },
}

/// Select a start/target pair satisfying every configured constraint.
///
/// # Errors
///
/// Returns `GameError::InvalidPair` when the graph holds fewer than two
/// words. Exhausting `max_attempts` is not an error: selection falls back to
/// an unconstrained random distinct pair and logs the degradation.
pub fn select_pair(
    graph: &WordGraph,
    finder: &mut PathFinder,
    cfg: &SelectorConfig,
    rng: &RngBundle,
) -> Result<WordPair, GameError> {
    // Sorted word list keeps sampling deterministic under an injected seed;
    // map iteration order is not stable across processes.
    let mut words: Vec<&String> = graph.words().collect();
    words.sort_unstable();
    if words.len() < 2 {
        return Err(GameError::InvalidPair {
            reason: "graph holds fewer than two words".to_string(),
        });
    }

    for _ in 0..cfg.max_attempts {
        let (start, target) = sample_distinct(&words, &mut *rng.pair());
        if !passes_cheap_checks(graph, cfg, start, target) {
            continue;
        }
        let path = finder.shortest_by_hops(graph, start, target);
        if path.is_empty() {
            continue;
        }
        let hops = path.len() - 1;
        if hops < cfg.min_path_hops || hops > cfg.max_path_hops {
            continue;
        }
        if !has_alternate_final_approach(graph, &path) {
            continue;
        }
        return Ok(WordPair {
            start: start.clone(),
            target: target.clone(),
        });
    }

    let (start, target) = sample_distinct(&words, &mut *rng.fallback());
    log::warn!(
        "pair selector exhausted {} attempts; falling back to unconstrained pair {start} -> {target}",
        cfg.max_attempts
    );
    Ok(WordPair {
        start: start.clone(),
        target: target.clone(),
    })
}

fn sample_distinct<'a, R: Rng>(words: &[&'a String], rng: &mut R) -> (&'a String, &'a String) {
    let first = rng.gen_range(0..words.len());
    let mut second = rng.gen_range(0..words.len() - 1);
    if second >= first {
        second += 1;
    }
    (words[first], words[second])
}

fn passes_cheap_checks(graph: &WordGraph, cfg: &SelectorConfig, start: &str, target: &str) -> bool {
    if graph.degree(start) < cfg.min_degree || graph.degree(target) < cfg.min_degree {
        return false;
    }
    // Missing coordinates cannot fail the distance constraint; graphs shipped
    // without embeddings remain playable.
    match graph.squared_coord_distance(start, target) {
        Some(sq) => sq >= cfg.min_coord_distance * cfg.min_coord_distance,
        None => true,
    }
}

/// True when some neighbor of the path's penultimate word, other than the
/// target itself, also has a direct edge to the target. Guarantees the final
/// move is never the only plausible one.
fn has_alternate_final_approach(graph: &WordGraph, path: &[String]) -> bool {
    let Some([penultimate, target]) = path.last_chunk::<2>() else {
        return false;
    };
    let Some(edges) = graph.neighbors(penultimate) else {
        return false;
    };
    edges
        .keys()
        .any(|n| n != target && graph.edge_weight(n, target).is_some())
}

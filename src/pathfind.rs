//! Shortest-path search over the word graph
//!
//! Two Dijkstra variants share one implementation and differ only in edge
//! cost: hop count (every edge costs 1) and semantic distance (every edge
//! costs `1 - similarity`). Each variant keeps its own memo cache, owned by
//! the [`PathFinder`] value rather than any process-wide state; the host must
//! call [`PathFinder::invalidate`] whenever it reloads the graph.

use crate::graph::WordGraph;
use std::collections::{BinaryHeap, HashMap};

/// Edge cost function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CostModel {
    Hops,
    SemanticDistance,
}

impl CostModel {
    fn edge_cost(self, similarity: f32) -> f32 {
        match self {
            Self::Hops => 1.0,
            // Similarity weights are expected in [0, 1]; clamp so dirty data
            // can never produce a negative-cost edge.
            Self::SemanticDistance => (1.0 - similarity).max(0.0),
        }
    }
}

/// Memoizing shortest-path searcher over a single graph instance.
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    hops_cache: HashMap<(String, String), Vec<String>>,
    semantic_cache: HashMap<(String, String), Vec<String>>,
}

impl PathFinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortest path from `start` to `end` minimizing the number of edges.
    ///
    /// Returns the ordered word sequence including both endpoints, or an
    /// empty vector when either endpoint is missing or `end` is unreachable.
    pub fn shortest_by_hops(&mut self, graph: &WordGraph, start: &str, end: &str) -> Vec<String> {
        let key = (start.to_string(), end.to_string());
        if let Some(cached) = self.hops_cache.get(&key) {
            return cached.clone();
        }
        let path = dijkstra(graph, start, end, CostModel::Hops);
        self.hops_cache.insert(key, path.clone());
        path
    }

    /// Shortest path from `start` to `end` minimizing cumulative semantic
    /// distance, Σ(1 − similarity).
    ///
    /// Same contract as [`Self::shortest_by_hops`].
    pub fn shortest_by_semantic_distance(
        &mut self,
        graph: &WordGraph,
        start: &str,
        end: &str,
    ) -> Vec<String> {
        let key = (start.to_string(), end.to_string());
        if let Some(cached) = self.semantic_cache.get(&key) {
            return cached.clone();
        }
        let path = dijkstra(graph, start, end, CostModel::SemanticDistance);
        self.semantic_cache.insert(key, path.clone());
        path
    }

    /// Drop all memoized paths. Must be called when the graph is reloaded.
    pub fn invalidate(&mut self) {
        log::debug!(
            "invalidating path caches ({} hop entries, {} semantic entries)",
            self.hops_cache.len(),
            self.semantic_cache.len()
        );
        self.hops_cache.clear();
        self.semantic_cache.clear();
    }

    /// Total number of memoized paths across both caches.
    #[must_use]
    pub fn cached_paths(&self) -> usize {
        self.hops_cache.len() + self.semantic_cache.len()
    }
}

/// Min-heap entry; ordering is reversed so `BinaryHeap` pops lowest cost.
struct FrontierEntry<'a> {
    cost: f32,
    word: &'a str,
}

impl PartialEq for FrontierEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost).is_eq() && self.word == other.word
    }
}

impl Eq for FrontierEntry<'_> {}

impl PartialOrd for FrontierEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry<'_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.word.cmp(self.word))
    }
}

fn dijkstra(graph: &WordGraph, start: &str, end: &str, model: CostModel) -> Vec<String> {
    if !graph.contains(start) || !graph.contains(end) {
        return Vec::new();
    }
    if start == end {
        return vec![start.to_string()];
    }

    let mut dist: HashMap<&str, f32> = HashMap::new();
    let mut prev: HashMap<&str, &str> = HashMap::new();
    let mut frontier = BinaryHeap::new();
    dist.insert(start, 0.0);
    frontier.push(FrontierEntry {
        cost: 0.0,
        word: start,
    });

    while let Some(FrontierEntry { cost, word }) = frontier.pop() {
        if word == end {
            return reconstruct(&prev, start, end);
        }
        // Stale entry: a cheaper route to this word was already settled.
        if dist.get(word).is_some_and(|&best| cost > best) {
            continue;
        }
        let Some(edges) = graph.neighbors(word) else {
            continue;
        };
        for (neighbor, &similarity) in edges {
            let next_cost = cost + model.edge_cost(similarity);
            let improved = dist
                .get(neighbor.as_str())
                .is_none_or(|&best| next_cost < best);
            if improved {
                dist.insert(neighbor, next_cost);
                prev.insert(neighbor, word);
                frontier.push(FrontierEntry {
                    cost: next_cost,
                    word: neighbor,
                });
            }
        }
    }

    Vec::new()
}

fn reconstruct(prev: &HashMap<&str, &str>, start: &str, end: &str) -> Vec<String> {
    let mut path = vec![end.to_string()];
    let mut cursor = end;
    while cursor != start {
        match prev.get(cursor) {
            Some(&parent) => {
                path.push(parent.to_string());
                cursor = parent;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WordNode;

    fn graph(edges: &[(&str, &[(&str, f32)])]) -> WordGraph {
        let words = edges
            .iter()
            .map(|(word, neighbors)| {
                let node = WordNode {
                    edges: neighbors
                        .iter()
                        .map(|(n, s)| ((*n).to_string(), *s))
                        .collect(),
                    coordinate: None,
                };
                ((*word).to_string(), node)
            })
            .collect();
        WordGraph::from_words(words)
    }

    fn line_graph() -> WordGraph {
        graph(&[
            ("start", &[("mid", 1.0)]),
            ("mid", &[("start", 1.0), ("end", 1.0)]),
            ("end", &[("mid", 1.0)]),
        ])
    }

    #[test]
    fn hops_path_on_line_graph() {
        let graph = line_graph();
        let mut finder = PathFinder::new();
        assert_eq!(
            finder.shortest_by_hops(&graph, "start", "end"),
            vec!["start", "mid", "end"]
        );
    }

    #[test]
    fn missing_or_unreachable_yields_empty() {
        let graph = graph(&[
            ("a", &[("b", 0.9)]),
            ("b", &[("a", 0.9)]),
            ("island", &[]),
        ]);
        let mut finder = PathFinder::new();
        assert!(finder.shortest_by_hops(&graph, "a", "nowhere").is_empty());
        assert!(finder.shortest_by_hops(&graph, "nowhere", "a").is_empty());
        assert!(finder.shortest_by_hops(&graph, "a", "island").is_empty());
        assert!(
            finder
                .shortest_by_semantic_distance(&graph, "a", "island")
                .is_empty()
        );
    }

    #[test]
    fn start_equals_end_is_single_word_path() {
        let graph = line_graph();
        let mut finder = PathFinder::new();
        assert_eq!(
            finder.shortest_by_hops(&graph, "mid", "mid"),
            vec!["mid"]
        );
    }

    #[test]
    fn semantic_distance_prefers_strong_edges_over_fewer_hops() {
        // Direct edge a→c is weak (cost 0.9); the detour via b costs 0.2.
        let graph = graph(&[
            ("a", &[("c", 0.1), ("b", 0.9)]),
            ("b", &[("a", 0.9), ("c", 0.9)]),
            ("c", &[("a", 0.1), ("b", 0.9)]),
        ]);
        let mut finder = PathFinder::new();
        assert_eq!(
            finder.shortest_by_hops(&graph, "a", "c"),
            vec!["a", "c"]
        );
        assert_eq!(
            finder.shortest_by_semantic_distance(&graph, "a", "c"),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn every_path_edge_exists_in_graph() {
        let graph = graph(&[
            ("a", &[("b", 0.5), ("c", 0.4)]),
            ("b", &[("a", 0.5), ("d", 0.7)]),
            ("c", &[("a", 0.4), ("d", 0.2)]),
            ("d", &[("b", 0.7), ("c", 0.2)]),
        ]);
        let mut finder = PathFinder::new();
        for path in [
            finder.shortest_by_hops(&graph, "a", "d"),
            finder.shortest_by_semantic_distance(&graph, "a", "d"),
        ] {
            for pair in path.windows(2) {
                assert!(
                    graph.edge_weight(&pair[0], &pair[1]).is_some(),
                    "edge {} -> {} not in graph",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn repeated_queries_hit_the_cache_and_agree() {
        let graph = line_graph();
        let mut finder = PathFinder::new();
        let first = finder.shortest_by_hops(&graph, "start", "end");
        assert_eq!(finder.cached_paths(), 1);
        let second = finder.shortest_by_hops(&graph, "start", "end");
        assert_eq!(first, second);
        assert_eq!(finder.cached_paths(), 1);

        finder.invalidate();
        assert_eq!(finder.cached_paths(), 0);
        assert_eq!(finder.shortest_by_hops(&graph, "start", "end"), first);
    }
}

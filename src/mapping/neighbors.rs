// location-area adjacency, read-only
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::types::Group;
use crate::mapping::loader::{opt_text, text};

/// One `tac -> neighbor` line of the neighbor table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborPair {
    #[serde(deserialize_with = "text")]
    pub tac: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub neighbor: Option<String>,
}

/// Precomputed adjacency between location-area codes.
///
/// Directed as given: `a -> b` does not imply `b -> a`.
#[derive(Clone, Debug, Default)]
pub struct NeighborGraph {
    adjacency: HashMap<String, BTreeSet<String>>,
}

impl NeighborGraph {
    pub fn new() -> Self {
        NeighborGraph::default()
    }

    /// Builds the table from raw lines. A line with a blank neighbor still
    /// registers its code; self loops are dropped.
    pub fn from_pairs(pairs: impl IntoIterator<Item = NeighborPair>) -> Self {
        let mut graph = NeighborGraph::new();
        for pair in pairs {
            let tac = pair.tac.trim();
            if tac.is_empty() {
                continue;
            }
            let entry = graph.adjacency.entry(tac.to_string()).or_default();
            if let Some(neighbor) = pair.neighbor.as_deref().map(str::trim) {
                if !neighbor.is_empty() && neighbor != tac {
                    entry.insert(neighbor.to_string());
                }
            }
        }
        graph
    }

    pub fn insert(&mut self, tac: impl Into<String>, neighbor: impl Into<String>) {
        let tac = tac.into();
        let neighbor = neighbor.into();
        let entry = self.adjacency.entry(tac.clone()).or_default();
        if neighbor != tac {
            entry.insert(neighbor);
        }
    }

    /// Sorted; empty for unknown codes.
    pub fn neighbors_of(&self, tac: &str) -> Vec<String> {
        self.adjacency
            .get(tac)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// `tac` plus its declared neighbors.
    pub fn group_for(&self, tac: &str) -> Group {
        Group::new(tac, self.neighbors_of(tac))
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_pair(tac: &str, neighbor: Option<&str>) -> NeighborPair {
        NeighborPair {
            tac: tac.to_string(),
            neighbor: neighbor.map(str::to_string),
        }
    }

    #[test]
    fn pairs_build_sorted_directed_adjacency() {
        let g = NeighborGraph::from_pairs([
            mk_pair("100", Some("300")),
            mk_pair("100", Some("200")),
            mk_pair("100", Some("100")),
            mk_pair("400", None),
            mk_pair(" ", Some("999")),
        ]);

        assert_eq!(g.neighbors_of("100"), vec!["200".to_string(), "300".to_string()]);
        assert!(g.neighbors_of("200").is_empty());
        assert!(g.neighbors_of("400").is_empty());
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn group_closure_includes_anchor() {
        let mut g = NeighborGraph::new();
        g.insert("100", "200");
        g.insert("200", "200");

        let group = g.group_for("100");
        assert_eq!(group.anchor(), "100");
        assert_eq!(group.neighbors(), ["200".to_string()]);
        assert!(group.contains("100") && group.contains("200"));

        //unknown code: singleton group
        let lonely = g.group_for("999");
        assert_eq!(lonely.members().len(), 1);
    }
}

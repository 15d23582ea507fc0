//! Bigram co-occurrence graph with a spring layout.

use std::collections::HashMap;

use log::{debug, info};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::dataset::{self, Dataset, RegionFilter};
use crate::error::{Error, Result};
use crate::layout::spring_layout;
use crate::source::DataSource;

/// An ordered pair of adjacent words.
pub type Bigram = (String, String);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkNode {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkView {
    NoData,
    Graph {
        nodes: Vec<NetworkNode>,
        edges: Vec<NetworkEdge>,
    },
}

impl NetworkView {
    pub fn is_no_data(&self) -> bool {
        matches!(self, NetworkView::NoData)
    }
}

///Counts adjacent word pairs. Fragments are split on whitespace and pairs never span two fragments.
///Pairs are returned in the order they were first seen.
/// # Example
/// ```
/// use cdp_reasons::network::bigram_counts;
/// let counts = bigram_counts(&["x y y z"]);
/// let pairs: Vec<(&str, &str)> = counts.iter().map(|((a, b), _)| (a.as_str(), b.as_str())).collect();
/// assert_eq!(pairs, vec![("x", "y"), ("y", "y"), ("y", "z")]);
/// ```
pub fn bigram_counts<S: AsRef<str>>(fragments: &[S]) -> Vec<(Bigram, u64)> {
    let mut position: HashMap<Bigram, usize> = HashMap::new();
    let mut counts: Vec<(Bigram, u64)> = Vec::new();
    for fragment in fragments {
        let words: Vec<&str> = fragment.as_ref().split_whitespace().collect();
        for pair in words.windows(2) {
            let bigram = (pair[0].to_string(), pair[1].to_string());
            match position.get(&bigram) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    position.insert(bigram.clone(), counts.len());
                    counts.push((bigram, 1));
                }
            }
        }
    }
    counts
}

/// The `n` most frequent pairs; ties keep first-seen order.
pub fn most_common(mut counts: Vec<(Bigram, u64)>, n: usize) -> Vec<(Bigram, u64)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

/// One node per distinct word and one edge per pair, weighted `count * scale`.
/// A pair seen again as its reverse replaces the earlier weight.
pub fn bigram_graph(pairs: &[(Bigram, u64)], scale: f64) -> UnGraph<String, f64> {
    let mut graph = UnGraph::new_undirected();
    let mut word_to_node: HashMap<&str, NodeIndex> = HashMap::new();
    for ((first, second), count) in pairs {
        let a = *word_to_node
            .entry(first.as_str())
            .or_insert_with(|| graph.add_node(first.clone()));
        let b = *word_to_node
            .entry(second.as_str())
            .or_insert_with(|| graph.add_node(second.clone()));
        graph.update_edge(a, b, *count as f64 * scale);
    }
    graph
}

/// Loads `year` for `region` and assembles its bigram network.
pub fn build_network_view(
    source: &dyn DataSource,
    config: &PipelineConfig,
    year: u16,
    region: RegionFilter,
    top_n: usize,
) -> Result<NetworkView> {
    if top_n == 0 {
        return Err(Error::InvalidTopN);
    }
    let dataset = dataset::load(source, config, year, region)?;
    let view = network_view_from(&dataset, config, top_n)?;
    if let NetworkView::Graph { nodes, edges } = &view {
        info!(
            "Network view for {} / {} - nodes={}, edges={}",
            year,
            region,
            nodes.len(),
            edges.len()
        );
    }
    Ok(view)
}

/// Assembles the bigram network of an already loaded dataset.
pub fn network_view_from(
    dataset: &Dataset,
    config: &PipelineConfig,
    top_n: usize,
) -> Result<NetworkView> {
    if top_n == 0 {
        return Err(Error::InvalidTopN);
    }
    let counts = bigram_counts(&dataset.fragments);
    if counts.is_empty() {
        return Ok(NetworkView::NoData);
    }
    debug!("{} distinct bigrams", counts.len());

    let top = most_common(counts, top_n);
    let graph = bigram_graph(&top, config.edge_weight_scale);
    let positions = spring_layout(&graph, &config.layout);

    let nodes = graph
        .node_indices()
        .zip(positions)
        .map(|(node, [x, y])| NetworkNode {
            label: graph[node].clone(),
            x,
            y,
        })
        .collect();
    let edges = graph
        .edge_references()
        .map(|edge| NetworkEdge {
            source: graph[edge.source()].clone(),
            target: graph[edge.target()].clone(),
            weight: *edge.weight(),
        })
        .collect();
    Ok(NetworkView::Graph { nodes, edges })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> Bigram {
        (a.to_string(), b.to_string())
    }

    fn dataset(fragments: &[&str]) -> Dataset {
        Dataset {
            year: 2013,
            records: Vec::new(),
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn pairs_stay_within_a_fragment() {
        let counts = bigram_counts(&["x y", "z w"]);
        assert_eq!(counts, vec![(pair("x", "y"), 1), (pair("z", "w"), 1)]);
        assert!(!counts.iter().any(|(p, _)| *p == pair("y", "z")));
        assert!(bigram_counts(&["single", "", "  "]).is_empty());
    }

    #[test]
    fn ranking_keeps_first_seen_order_on_ties() {
        let counts = bigram_counts(&["a b", "c d", "c d", "e f", "a b", "g h"]);
        let top = most_common(counts, 3);
        assert_eq!(
            top,
            vec![(pair("a", "b"), 2), (pair("c", "d"), 2), (pair("e", "f"), 1)]
        );
    }

    #[test]
    fn graph_weights_and_self_loops() {
        let graph = bigram_graph(&[(pair("x", "y"), 3), (pair("y", "y"), 1)], 10.0);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        let weights: Vec<f64> = graph.edge_references().map(|e| *e.weight()).collect();
        assert_eq!(weights, vec![30.0, 10.0]);

        // the reverse pair collapses onto the same undirected edge
        let reversed = bigram_graph(&[(pair("a", "b"), 2), (pair("b", "a"), 1)], 10.0);
        assert_eq!(reversed.edge_count(), 1);
        assert_eq!(reversed.edge_references().next().map(|e| *e.weight()), Some(10.0));
    }

    #[test]
    fn view_has_positions_for_every_word() {
        let ds = dataset(&["bus fleet electric", "electric bus fleet", "landfill gas capture"]);
        let view = network_view_from(&ds, &PipelineConfig::default(), 3).unwrap();
        let NetworkView::Graph { nodes, edges } = view else {
            panic!("expected a graph");
        };
        // bus fleet (2), fleet electric, electric bus
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].source, "bus");
        assert_eq!(edges[0].target, "fleet");
        assert_eq!(edges[0].weight, 20.0);
        let labels: Vec<&str> = nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["bus", "fleet", "electric"]);
        for node in &nodes {
            assert!(node.x.abs() <= 1.0 + 1e-9 && node.y.abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn empty_or_single_word_fragments_are_no_data() {
        let config = PipelineConfig::default();
        assert!(network_view_from(&dataset(&[]), &config, 5).unwrap().is_no_data());
        assert!(network_view_from(&dataset(&["car", ""]), &config, 5).unwrap().is_no_data());
        assert!(matches!(
            network_view_from(&dataset(&["a b"]), &config, 0),
            Err(Error::InvalidTopN)
        ));
    }
}

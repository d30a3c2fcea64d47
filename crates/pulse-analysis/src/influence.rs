//! Author → mention influence graph and centrality ranking.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use pulse_core::{Influencer, PostTable};
use serde::Serialize;

/// Number of users reported as top influencers.
pub const TOP_INFLUENCERS: usize = 10;

/// Betweenness is O(V·E); skip it on graphs larger than this.
const BETWEENNESS_NODE_LIMIT: usize = 5_000;

/// The graph of one run and its highest-degree users.
#[derive(Debug, Clone)]
pub struct InfluenceReport {
    pub graph: InfluenceGraph,
    pub top_influencers: Vec<Influencer>,
}

/// Builds the influence graph and ranks its top [`TOP_INFLUENCERS`] users.
#[must_use]
pub fn map_influence(table: &PostTable) -> InfluenceReport {
    let graph = InfluenceGraph::build(table);
    let top_influencers = graph.top_influencers(TOP_INFLUENCERS);
    InfluenceReport {
        graph,
        top_influencers,
    }
}

/// Engagement figures of an author, taken from their first post in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthorStats {
    pub followers: u64,
    pub likes: u64,
    pub retweets: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNode {
    pub username: String,
    /// `None` for users that only appear as mention targets.
    pub stats: Option<AuthorStats>,
}

/// Directed graph with an edge from each author to every user they mention.
/// Edge weight is the number of mentions.
#[derive(Debug, Clone, Default)]
pub struct InfluenceGraph {
    graph: DiGraph<UserNode, u32>,
    index: HashMap<String, NodeIndex>,
}

impl InfluenceGraph {
    /// Builds the graph in one pass over the table.
    #[must_use]
    pub fn build(table: &PostTable) -> Self {
        let mut g = Self::default();
        for post in table {
            let stats = AuthorStats {
                followers: post.author_followers,
                likes: post.likes,
                retweets: post.retweets,
            };
            let author = g.ensure_node(&post.author);
            let node = &mut g.graph[author];
            if node.stats.is_none() {
                node.stats = Some(stats);
            }

            for mention in &post.mentions {
                let target = g.ensure_node(mention);
                if let Some(edge) = g.graph.find_edge(author, target) {
                    g.graph[edge] += 1;
                } else {
                    g.graph.add_edge(author, target, 1);
                }
            }
        }
        tracing::debug!(
            nodes = g.node_count(),
            edges = g.edge_count(),
            "influence graph built"
        );
        g
    }

    fn ensure_node(&mut self, username: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(username) {
            return idx;
        }
        let idx = self.graph.add_node(UserNode {
            username: username.to_string(),
            stats: None,
        });
        self.index.insert(username.to_string(), idx);
        idx
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn node(&self, username: &str) -> Option<&UserNode> {
        self.index.get(username).map(|&idx| &self.graph[idx])
    }

    #[must_use]
    pub fn in_degree(&self, username: &str) -> usize {
        self.degree_in(username, Direction::Incoming)
    }

    #[must_use]
    pub fn out_degree(&self, username: &str) -> usize {
        self.degree_in(username, Direction::Outgoing)
    }

    fn degree_in(&self, username: &str, direction: Direction) -> usize {
        self.index.get(username).map_or(0, |&idx| {
            self.graph.edges_directed(idx, direction).count()
        })
    }

    /// Mention count on the edge `from → to`, if any.
    #[must_use]
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<u32> {
        let a = *self.index.get(from)?;
        let b = *self.index.get(to)?;
        self.graph.find_edge(a, b).map(|e| self.graph[e])
    }

    /// `(in + out) / (n - 1)` per node, indexed by node position. All zero
    /// for graphs with fewer than two nodes.
    fn degree_centrality(&self) -> Vec<f64> {
        let n = self.graph.node_count();
        if n <= 1 {
            return vec![0.0; n];
        }
        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / (n - 1) as f64;
        self.graph
            .node_indices()
            .map(|idx| {
                let degree = self.graph.edges_directed(idx, Direction::Incoming).count()
                    + self.graph.edges_directed(idx, Direction::Outgoing).count();
                #[allow(clippy::cast_precision_loss)]
                let degree = degree as f64;
                degree * scale
            })
            .collect()
    }

    /// Brandes betweenness over unweighted directed shortest paths,
    /// normalized by `1 / ((n - 1)(n - 2))`.
    ///
    /// Returns `None` when the graph is too large to score.
    fn betweenness_centrality(&self) -> Option<Vec<f64>> {
        let n = self.graph.node_count();
        if n > BETWEENNESS_NODE_LIMIT {
            tracing::warn!(nodes = n, "graph too large, skipping betweenness centrality");
            return None;
        }
        let mut centrality = vec![0.0_f64; n];

        for source in self.graph.node_indices() {
            let s = source.index();
            let mut stack: Vec<usize> = Vec::with_capacity(n);
            let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
            let mut sigma = vec![0.0_f64; n];
            let mut distance: Vec<Option<usize>> = vec![None; n];
            sigma[s] = 1.0;
            distance[s] = Some(0);

            let mut queue = VecDeque::from([source]);
            while let Some(v) = queue.pop_front() {
                let vi = v.index();
                stack.push(vi);
                let dv = distance[vi].unwrap_or(0);
                for w in self.graph.neighbors_directed(v, Direction::Outgoing) {
                    let wi = w.index();
                    if distance[wi].is_none() {
                        distance[wi] = Some(dv + 1);
                        queue.push_back(w);
                    }
                    if distance[wi] == Some(dv + 1) {
                        sigma[wi] += sigma[vi];
                        predecessors[wi].push(vi);
                    }
                }
            }

            let mut delta = vec![0.0_f64; n];
            while let Some(w) = stack.pop() {
                for &v in &predecessors[w] {
                    delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
                }
                if w != s {
                    centrality[w] += delta[w];
                }
            }
        }

        if n > 2 {
            #[allow(clippy::cast_precision_loss)]
            let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
            for c in &mut centrality {
                *c *= scale;
            }
        }
        if centrality.iter().any(|c| !c.is_finite()) {
            tracing::warn!("betweenness centrality produced non-finite values, dropping it");
            return None;
        }
        Some(centrality)
    }

    /// Node positions with non-zero degree, highest degree first, ties by
    /// username ascending.
    fn ranked_nodes(&self, degree: &[f64]) -> Vec<NodeIndex> {
        let mut ranked: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| degree[idx.index()] > 0.0)
            .collect();
        ranked.sort_by(|a, b| {
            degree[b.index()]
                .total_cmp(&degree[a.index()])
                .then_with(|| self.graph[*a].username.cmp(&self.graph[*b].username))
        });
        ranked
    }

    /// The `limit` most connected users. Users with no edges are never ranked.
    #[must_use]
    pub fn top_influencers(&self, limit: usize) -> Vec<Influencer> {
        let degree = self.degree_centrality();
        let betweenness = self.betweenness_centrality();
        self.ranked_nodes(&degree)
            .into_iter()
            .take(limit)
            .map(|idx| Influencer {
                user: self.graph[idx].username.clone(),
                centrality: degree[idx.index()],
                betweenness: betweenness.as_ref().map(|b| b[idx.index()]),
            })
            .collect()
    }

    /// The `max_nodes` most connected users and the edges among them.
    ///
    /// Isolated users fill remaining slots when fewer connected users exist.
    #[must_use]
    pub fn top_subgraph(&self, max_nodes: usize) -> GraphExport {
        let degree = self.degree_centrality();
        let mut ranked: Vec<NodeIndex> = self.graph.node_indices().collect();
        ranked.sort_by(|a, b| {
            degree[b.index()]
                .total_cmp(&degree[a.index()])
                .then_with(|| self.graph[*a].username.cmp(&self.graph[*b].username))
        });
        ranked.truncate(max_nodes);
        let kept: HashSet<NodeIndex> = ranked.iter().copied().collect();

        let nodes = ranked
            .iter()
            .map(|&idx| {
                let node = &self.graph[idx];
                GraphNode {
                    id: node.username.clone(),
                    stats: node.stats,
                    degree_centrality: degree[idx.index()],
                }
            })
            .collect();

        let edges = self
            .graph
            .edge_references()
            .filter(|e| kept.contains(&e.source()) && kept.contains(&e.target()))
            .map(|e| GraphEdge {
                source: self.graph[e.source()].username.clone(),
                target: self.graph[e.target()].username.clone(),
                weight: *e.weight(),
            })
            .collect();

        GraphExport { nodes, edges }
    }
}

/// A render-ready slice of the influence graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(flatten)]
    pub stats: Option<AuthorStats>,
    pub degree_centrality: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

#[cfg(test)]
#[path = "influence_test.rs"]
mod tests;

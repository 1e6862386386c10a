//! The DAG engine: construction, validation, and structural queries.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use super::parser::parse_graph;
use crate::error::{Error, Result};

/// Unique identifier for a node, dense in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Per-node visitation state for the ancestor-closure traversal.
///
/// Completion is tracked explicitly rather than inferred from set contents,
/// so an empty default set can never be mistaken for a computed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// Traversal frame for the iterative post-order walk.
enum Frame {
    Enter(usize),
    Finish(usize),
}

/// The DAG ancestry engine.
///
/// Built once from a complete textual description; immutable afterwards. All
/// queries are read-only and idempotent. The ancestor table is populated at
/// most once, behind a [`OnceLock`], so repeated and concurrent reads share
/// one memo.
#[derive(Debug)]
pub struct GraphEngine {
    /// The directed graph: edges go from parent to child
    graph: DiGraph<NodeId, ()>,
    /// Node ID to petgraph index, dense
    node_indices: Vec<NodeIndex>,
    /// Node name to ID mapping
    name_index: FxHashMap<String, NodeId>,
    /// ID to name table, in declaration order
    names: Vec<String>,
    /// Ancestor closure memo, computed on first query
    ancestors: OnceLock<Vec<FxHashSet<NodeId>>>,
}

impl GraphEngine {
    /// Parse a graph description and build a validated engine.
    ///
    /// Construction is all-or-nothing: any parse failure or cycle aborts
    /// with a typed [`Error`] and no engine is returned.
    ///
    /// Declared nodes are interned in declaration order. A name referenced
    /// only as a parent is implicitly created with an empty parent list.
    pub fn from_text(input: &str) -> Result<Self> {
        let records = parse_graph(input)?;

        let mut engine = Self {
            graph: DiGraph::new(),
            node_indices: Vec::new(),
            name_index: FxHashMap::default(),
            names: Vec::new(),
            ancestors: OnceLock::new(),
        };

        // Declared nodes first, so IDs follow declaration order.
        for (node, _) in &records {
            engine.intern(node);
        }

        for (node, parents) in &records {
            let child = engine.name_index[node.as_str()];
            for parent in parents {
                let parent = engine.intern(parent);
                let (parent_idx, child_idx) = (
                    engine.node_indices[parent.0],
                    engine.node_indices[child.0],
                );
                // update_edge: a repeated parent entry stays a single edge
                engine.graph.update_edge(parent_idx, child_idx, ());
            }
        }

        engine.detect_cycles()?;

        tracing::debug!(
            nodes = engine.len(),
            edges = engine.edge_count(),
            "graph constructed"
        );

        Ok(engine)
    }

    /// Look up a name, creating the node if it is new.
    fn intern(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.name_index.get(name) {
            return id;
        }
        let id = NodeId(self.names.len());
        let idx = self.graph.add_node(id);
        self.node_indices.push(idx);
        self.name_index.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    /// Detect cycles in the finished edge set.
    fn detect_cycles(&self) -> Result<()> {
        use petgraph::algo::kosaraju_scc;

        // Self-loops form size-1 SCCs, so scan for them separately.
        for idx in self.graph.node_indices() {
            if self.graph.find_edge(idx, idx).is_some() {
                let name = &self.names[self.graph[idx].0];
                return Err(Error::CycleDetected(format!("{name} → {name}")));
            }
        }

        for scc in kosaraju_scc(&self.graph) {
            if scc.len() > 1 {
                let cycle_names: Vec<&str> = scc
                    .iter()
                    .map(|&idx| self.names[self.graph[idx].0].as_str())
                    .collect();
                return Err(Error::CycleDetected(format!(
                    "{} → {}",
                    cycle_names.join(" → "),
                    cycle_names[0]
                )));
            }
        }

        Ok(())
    }

    /// All nodes with zero outgoing edges (nodes that are nobody's parent),
    /// in declaration order.
    pub fn find_leaves(&self) -> Vec<String> {
        self.names
            .iter()
            .enumerate()
            .filter(|&(id, _)| {
                self.graph
                    .neighbors_directed(self.node_indices[id], Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// The full ancestor closure: every node mapped to the set of nodes
    /// reachable by following edges backward, itself included.
    pub fn find_ancestors(&self) -> HashMap<String, HashSet<String>> {
        let table = self.ancestor_table();
        self.names
            .iter()
            .enumerate()
            .map(|(id, name)| {
                let set = table[id]
                    .iter()
                    .map(|ancestor| self.names[ancestor.0].clone())
                    .collect();
                (name.clone(), set)
            })
            .collect()
    }

    /// Node(s) whose ancestor-set size most evenly splits the graph, in
    /// declaration order. Ties are all returned.
    ///
    /// Score is `min(|A|, N - |A|)`; all nodes share the one memo table, so
    /// the scoring pass is O(V) once the closure is computed.
    pub fn find_bisectors(&self) -> Vec<String> {
        let table = self.ancestor_table();
        let n = self.names.len();
        let max_score = table
            .iter()
            .map(|set| set.len().min(n - set.len()))
            .max()
            .unwrap_or(0);
        table
            .iter()
            .enumerate()
            .filter(|(_, set)| set.len().min(n - set.len()) == max_score)
            .map(|(id, _)| self.names[id].clone())
            .collect()
    }

    /// Get the memoized ancestor table, computing it on first use.
    fn ancestor_table(&self) -> &[FxHashSet<NodeId>] {
        self.ancestors.get_or_init(|| self.compute_ancestor_table())
    }

    /// Compute ancestor sets for every node with one iterative post-order
    /// DFS over incoming edges. O(V + E) total: each edge is walked a
    /// constant number of times.
    fn compute_ancestor_table(&self) -> Vec<FxHashSet<NodeId>> {
        let n = self.names.len();
        let mut state = vec![Visit::Unvisited; n];
        let mut table: Vec<FxHashSet<NodeId>> = vec![FxHashSet::default(); n];
        let mut stack: Vec<Frame> = Vec::new();

        // Outer loop guarantees every node is visited, including nodes no
        // descendant would pull into a recursion.
        for start in 0..n {
            if state[start] == Visit::Done {
                continue;
            }
            stack.push(Frame::Enter(start));
            while let Some(frame) = stack.pop() {
                match frame {
                    Frame::Enter(v) => {
                        if state[v] == Visit::Done {
                            continue;
                        }
                        // Construction already rejected cycles; re-entering
                        // an in-progress node would mean one survived.
                        debug_assert!(
                            state[v] == Visit::Unvisited,
                            "cycle reached ancestor computation"
                        );
                        state[v] = Visit::InProgress;
                        stack.push(Frame::Finish(v));
                        for parent in self.parent_ids(v) {
                            if state[parent.0] != Visit::Done {
                                stack.push(Frame::Enter(parent.0));
                            }
                        }
                    }
                    Frame::Finish(v) => {
                        let mut set = FxHashSet::default();
                        set.insert(NodeId(v));
                        for parent in self.parent_ids(v) {
                            set.extend(table[parent.0].iter().copied());
                        }
                        table[v] = set;
                        state[v] = Visit::Done;
                    }
                }
            }
        }

        tracing::debug!(nodes = n, "ancestor table computed");
        table
    }

    /// Direct parents of a node by dense ID.
    fn parent_ids(&self, id: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.graph
            .neighbors_directed(self.node_indices[id], Direction::Incoming)
            .map(|idx| self.graph[idx])
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the graph is empty (never true for a constructed engine).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node names in declaration order.
    pub fn node_names(&self) -> &[String] {
        &self.names
    }

    /// Direct parents of a node by name.
    pub fn parents_of(&self, name: &str) -> Option<Vec<String>> {
        let id = self.name_index.get(name)?;
        Some(
            self.parent_ids(id.0)
                .map(|parent| self.names[parent.0].clone())
                .collect(),
        )
    }

    /// Direct children of a node by name (nodes listing it as a parent).
    pub fn children_of(&self, name: &str) -> Option<Vec<String>> {
        let id = self.name_index.get(name)?;
        Some(
            self.graph
                .neighbors_directed(self.node_indices[id.0], Direction::Outgoing)
                .map(|idx| self.names[self.graph[idx].0].clone())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(input: &str) -> GraphEngine {
        GraphEngine::from_text(input).unwrap()
    }

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn set_of(names: Vec<String>) -> HashSet<String> {
        names.into_iter().collect()
    }

    #[test]
    fn single_node_graph() {
        let engine = engine("A:");
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.edge_count(), 0);
        assert_eq!(engine.find_leaves(), vec!["A"]);
        assert_eq!(engine.find_ancestors()["A"], set(&["A"]));
    }

    #[test]
    fn edges_run_from_parent_to_child() {
        let engine = engine("A:\nB: A\nC: B, A");
        assert_eq!(engine.len(), 3);
        assert_eq!(engine.edge_count(), 3);
        assert_eq!(engine.children_of("A").map(set_of), Some(set(&["B", "C"])));
        assert_eq!(engine.parents_of("C").map(set_of), Some(set(&["B", "A"])));
        assert_eq!(engine.parents_of("A"), Some(vec![]));
    }

    #[test]
    fn find_leaves_on_fanout() {
        let engine = engine("A:\nB: A\nC: A");
        let leaves: HashSet<String> = engine.find_leaves().into_iter().collect();
        assert_eq!(leaves, set(&["B", "C"]));
    }

    #[test]
    fn every_nonempty_dag_has_a_leaf() {
        let engine = engine("A:\nB: A\nC: B\nD:\nE: D\nF: C, E\nG: F\nH: G");
        assert!(!engine.find_leaves().is_empty());
    }

    #[test]
    fn ancestors_of_linear_chain() {
        let engine = engine("A:\nB: A");
        let ancestors = engine.find_ancestors();
        assert_eq!(ancestors["A"], set(&["A"]));
        assert_eq!(ancestors["B"], set(&["A", "B"]));
    }

    #[test]
    fn ancestors_with_disconnected_root() {
        let engine = engine("A:\nB:\nC: B");
        let ancestors = engine.find_ancestors();
        assert_eq!(ancestors["A"], set(&["A"]));
        assert_eq!(ancestors["B"], set(&["B"]));
        assert_eq!(ancestors["C"], set(&["B", "C"]));
    }

    #[test]
    fn ancestors_of_diamond() {
        let engine = engine("A:\nB: A\nC: A\nD: B, C");
        let ancestors = engine.find_ancestors();
        assert_eq!(ancestors["A"], set(&["A"]));
        assert_eq!(ancestors["B"], set(&["A", "B"]));
        assert_eq!(ancestors["C"], set(&["A", "C"]));
        assert_eq!(ancestors["D"], set(&["A", "B", "C", "D"]));
    }

    #[test]
    fn ancestors_shared_across_siblings() {
        let engine = engine("A:\nB: A\nC: A\nD: B, C\nE: B, C");
        let ancestors = engine.find_ancestors();
        assert_eq!(ancestors["D"], set(&["A", "B", "C", "D"]));
        assert_eq!(ancestors["E"], set(&["A", "B", "C", "E"]));
    }

    #[test]
    fn ancestors_of_two_root_merge() {
        let engine = engine("A:\nB: A\nC: B\nD:\nE: D\nF: C, E\nG: F\nH: G");
        let ancestors = engine.find_ancestors();
        assert_eq!(ancestors["F"], set(&["A", "B", "C", "D", "E", "F"]));
        assert_eq!(ancestors["H"], set(&["A", "B", "C", "D", "E", "F", "G", "H"]));
        assert_eq!(ancestors["E"], set(&["D", "E"]));
    }

    #[test]
    fn bisectors_tie_on_diamond() {
        let engine = engine("A:\nB: A\nC: A\nD: B, C");
        let bisectors: HashSet<String> = engine.find_bisectors().into_iter().collect();
        assert_eq!(bisectors, set(&["B", "C"]));
    }

    #[test]
    fn single_bisector_on_chain_merge() {
        let engine = engine("A:\nB: A\nC: B\nD:\nE: D\nF: C, E\nG: F\nH: G");
        assert_eq!(engine.find_bisectors(), vec!["C"]);
    }

    #[test]
    fn bisector_of_single_node_is_itself() {
        // N = 1: score is min(1, 0) = 0 for the only node.
        let engine = engine("A:");
        assert_eq!(engine.find_bisectors(), vec!["A"]);
    }

    #[test]
    fn implicit_parent_node() {
        // "B" never appears on its own line; it is created with no parents.
        let engine = engine("A: B");
        assert_eq!(engine.len(), 2);
        let ancestors = engine.find_ancestors();
        assert_eq!(ancestors["B"], set(&["B"]));
        assert_eq!(ancestors["A"], set(&["A", "B"]));
        assert_eq!(engine.find_leaves(), vec!["A"]);
    }

    #[test]
    fn repeated_parent_entry_is_one_edge() {
        let engine = engine("A:\nB: A, A");
        assert_eq!(engine.edge_count(), 1);
    }

    #[test]
    fn two_node_cycle_is_rejected() {
        let err = GraphEngine::from_text("A: B\nB: A").unwrap_err();
        assert!(matches!(err, Error::CycleDetected(_)));
    }

    #[test]
    fn three_node_cycle_is_rejected() {
        let err = GraphEngine::from_text("A: C\nB: A\nC: B").unwrap_err();
        assert!(matches!(err, Error::CycleDetected(_)));
    }

    #[test]
    fn self_loop_is_rejected() {
        let err = GraphEngine::from_text("A: A").unwrap_err();
        assert!(matches!(err, Error::CycleDetected(msg) if msg.contains('A')));
    }

    #[test]
    fn construction_failures_are_typed() {
        assert!(matches!(
            GraphEngine::from_text(""),
            Err(Error::EmptyInput)
        ));
        assert!(matches!(
            GraphEngine::from_text("A1:\nB-2: A1"),
            Err(Error::InvalidNodeName(_))
        ));
        assert!(matches!(
            GraphEngine::from_text("A:\nB: A\nB: C"),
            Err(Error::DuplicateNode(_))
        ));
    }

    #[test]
    fn queries_are_idempotent() {
        let engine = engine("A:\nB: A\nC: B, A");
        let first = engine.find_ancestors();
        let second = engine.find_ancestors();
        assert_eq!(first, second);
        assert_eq!(engine.find_leaves(), engine.find_leaves());
        assert_eq!(engine.find_bisectors(), engine.find_bisectors());
    }
}

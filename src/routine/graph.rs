use super::edge::{Edge, SourceHandle};
use super::node::{ActionCategory, ActionKind, Node, NodeId, NodeKind};
use crate::error::GraphError;
use ahash::{AHashMap, AHashSet};

/// The validated routine graph: nodes, edges and one distinguished start node.
///
/// All structural invariants are enforced at mutation time; a graph that
/// exists is a graph the compiler can traverse. Looping is expressed only via
/// the dedicated loop node kind, never via topology, so every traversal from
/// the start node is finite.
#[derive(Debug, Clone)]
pub struct ProgramGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    start_id: NodeId,
    index: AHashMap<NodeId, usize>,
    next_edge_id: usize,
}

impl ProgramGraph {
    /// Creates a graph containing a single start node with the given id.
    pub fn new(start_id: impl Into<NodeId>) -> Self {
        let start_id = start_id.into();
        let start = Node::start(start_id.clone());
        let mut index = AHashMap::new();
        index.insert(start_id.clone(), 0);
        Self {
            nodes: vec![start],
            edges: Vec::new(),
            start_id,
            index,
            next_edge_id: 0,
        }
    }

    pub fn start_id(&self) -> &str {
        &self.start_id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Adds a node. Fails if the id is taken or a second start node is added.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode {
                node_id: node.id.clone(),
            });
        }
        if matches!(node.kind, NodeKind::Start) {
            return Err(GraphError::MultipleStart { count: 2 });
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Connects `source` to `target`, validating every structural invariant.
    ///
    /// Checks are applied in order: unknown endpoints, self loop, duplicate
    /// edge, cycle, occupied handle, parallel category conflict. On any
    /// failure the graph is left unchanged.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        handle: Option<SourceHandle>,
    ) -> Result<(), GraphError> {
        let source_node = self.node(source).ok_or_else(|| GraphError::UnknownNode {
            node_id: source.to_string(),
        })?;
        if self.node(target).is_none() {
            return Err(GraphError::UnknownNode {
                node_id: target.to_string(),
            });
        }

        if source == target {
            return Err(GraphError::SelfLoop {
                node_id: source.to_string(),
            });
        }

        let slot = handle.unwrap_or(SourceHandle::Next);
        if self
            .edges
            .iter()
            .any(|e| e.source == source && e.target == target && e.handle_slot() == slot)
        {
            return Err(GraphError::DuplicateEdge {
                from: source.to_string(),
                to: target.to_string(),
                handle: slot.to_string(),
            });
        }

        // Reachability is checked from the new edge's target back toward its
        // source: if the target can already reach the source, the edge would
        // close a cycle.
        if self.reachable_from(target).contains(source) {
            return Err(GraphError::CycleDetected {
                from: source.to_string(),
                to: target.to_string(),
            });
        }

        if self.edges.iter().any(|e| e.source == source && e.handle_slot() == slot) {
            return Err(GraphError::HandleOccupied {
                node_id: source.to_string(),
                handle: slot.to_string(),
            });
        }

        if slot.is_action()
            && matches!(source_node.as_action(), Some(ActionKind::Parallel))
            && let Some(category) = self.node_category(target)
        {
            for edge in self.edges.iter().filter(|e| e.source == source) {
                if edge.handle_slot().is_action()
                    && self.node_category(&edge.target) == Some(category)
                {
                    return Err(GraphError::CategoryConflict {
                        node_id: source.to_string(),
                        category,
                    });
                }
            }
        }

        let id = format!("e{}", self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.push(Edge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            handle,
        });
        Ok(())
    }

    fn node_category(&self, id: &str) -> Option<ActionCategory> {
        self.node(id)?.as_action().map(ActionKind::category)
    }

    /// All outgoing edges of a node.
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// The target followed by straight-line continuation (the unlabeled or
    /// `next` edge), if any.
    pub fn next_target(&self, id: &str) -> Option<&str> {
        self.outgoing(id)
            .find(|e| e.is_continuation())
            .map(|e| e.target.as_str())
    }

    /// The target bound to a specific labeled handle, if any.
    pub fn branch_target(&self, id: &str, handle: SourceHandle) -> Option<&str> {
        self.outgoing(id)
            .find(|e| e.handle_slot() == handle)
            .map(|e| e.target.as_str())
    }

    /// Depth-first closure of every node reachable from `id` over all edges,
    /// excluding `id` itself unless a path loops back to it.
    pub fn reachable_from(&self, id: &str) -> AHashSet<NodeId> {
        let mut reached = AHashSet::new();
        let mut stack: Vec<&str> = self.outgoing(id).map(|e| e.target.as_str()).collect();
        while let Some(current) = stack.pop() {
            if reached.insert(current.to_string()) {
                stack.extend(self.outgoing(current).map(|e| e.target.as_str()));
            }
        }
        reached
    }

    /// The finite sequence of action nodes reached from the start node by
    /// following only continuation edges. Branch bodies are not entered;
    /// this is the linear spine previews and the waypoint deriver consume.
    pub fn execution_order(&self) -> Vec<&Node> {
        let mut order = Vec::new();
        let mut visited = AHashSet::new();
        let mut current = Some(self.start_id.as_str());
        while let Some(id) = current {
            // Continuation edges are acyclic by construction; the visited set
            // is a termination guard against a corrupted graph.
            if !visited.insert(id) {
                break;
            }
            if let Some(node) = self.node(id)
                && matches!(node.kind, NodeKind::Action { .. })
            {
                order.push(node);
            }
            current = self.next_target(id);
        }
        order
    }

    /// True when at least one edge leaves the start node.
    pub fn has_route(&self) -> bool {
        self.outgoing(&self.start_id).next().is_some()
    }
}

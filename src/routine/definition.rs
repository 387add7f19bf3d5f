use super::edge::SourceHandle;
use super::graph::ProgramGraph;
use super::node::{Node, NodeKind};
use crate::error::{GraphError, RoutineConversionError};
use serde::{Deserialize, Serialize};

/// The raw, serde-facing form of a routine: exactly the `{nodes, edges}`
/// document the authoring surface exchanges. Nothing here is validated; the
/// upgrade to a [`ProgramGraph`] replays every edge through mutation-time
/// validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutineDefinition {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeDefinition>,
}

/// A raw edge as serialized by the authoring surface. The id is optional and
/// assigned during graph assembly when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default, rename = "sourceHandle", skip_serializing_if = "Option::is_none")]
    pub handle: Option<SourceHandle>,
}

impl RoutineDefinition {
    /// Parses a routine from its JSON document form.
    pub fn from_json_str(json: &str) -> Result<Self, RoutineConversionError> {
        serde_json::from_str(json).map_err(|e| RoutineConversionError::JsonParseError(e.to_string()))
    }

    /// Upgrades the raw definition into a validated [`ProgramGraph`].
    ///
    /// Requires exactly one start node; every edge is added via
    /// [`ProgramGraph::add_edge`], so a definition that encodes a cycle or an
    /// over-bound handle is rejected with the same error a live edit would
    /// produce.
    pub fn into_graph(self) -> Result<ProgramGraph, GraphError> {
        let start_ids: Vec<&str> = self
            .nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Start))
            .map(|n| n.id.as_str())
            .collect();
        let start_id = match start_ids.as_slice() {
            [] => return Err(GraphError::MissingStart),
            [one] => one.to_string(),
            many => {
                return Err(GraphError::MultipleStart { count: many.len() });
            }
        };

        let mut graph = ProgramGraph::new(start_id.clone());
        for node in self.nodes {
            if node.id == start_id {
                continue;
            }
            graph.add_node(node)?;
        }
        for edge in self.edges {
            graph.add_edge(&edge.source, &edge.target, edge.handle)?;
        }
        Ok(graph)
    }
}

/// A trait for custom authoring formats that can be converted into a routine
/// definition.
///
/// This is the extension point that keeps the compiler format-agnostic: parse
/// your own project file into your own structs, then implement `IntoRoutine`
/// to translate them into the canonical `{nodes, edges}` model.
pub trait IntoRoutine {
    /// Consumes the object and converts it into a routine definition.
    fn into_routine(self) -> Result<RoutineDefinition, RoutineConversionError>;
}

impl IntoRoutine for RoutineDefinition {
    fn into_routine(self) -> Result<RoutineDefinition, RoutineConversionError> {
        Ok(self)
    }
}

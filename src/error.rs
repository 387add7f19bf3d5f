use crate::routine::ActionCategory;
use thiserror::Error;

/// Structural errors detected eagerly while mutating a routine graph.
///
/// A rejected mutation leaves the graph exactly as it was; none of these are
/// ever persisted into the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("node '{node_id}' cannot connect to itself")]
    SelfLoop { node_id: String },

    #[error("an edge from '{from}' to '{to}' on handle '{handle}' already exists")]
    DuplicateEdge {
        from: String,
        to: String,
        handle: String,
    },

    #[error(
        "connecting '{from}' to '{to}' would create a cycle; use a loop node to repeat actions"
    )]
    CycleDetected { from: String, to: String },

    #[error("handle '{handle}' on node '{node_id}' is already connected")]
    HandleOccupied { node_id: String, handle: String },

    #[error("parallel node '{node_id}' already runs a {category} action on another handle")]
    CategoryConflict {
        node_id: String,
        category: ActionCategory,
    },

    #[error("node '{node_id}' does not exist in the routine")]
    UnknownNode { node_id: String },

    #[error("node id '{node_id}' is defined more than once")]
    DuplicateNode { node_id: String },

    #[error("routine has no start node")]
    MissingStart,

    #[error("routine has {count} start nodes, expected exactly one")]
    MultipleStart { count: usize },
}

/// Errors a code generation backend can surface.
///
/// Backends always terminate and always return text otherwise; a cyclic
/// remnant inside a branch degrades to an inline comment instead of failing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("the start node has no outgoing route; connect at least one action before exporting")]
    NoRoute,
}

/// Errors that can occur when converting a custom authoring format into a
/// [`RoutineDefinition`](crate::routine::RoutineDefinition).
#[derive(Error, Debug, Clone)]
pub enum RoutineConversionError {
    #[error("invalid routine data: {0}")]
    ValidationError(String),

    #[error("failed to parse routine JSON: {0}")]
    JsonParseError(String),
}

use super::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named exit point on a node, disambiguating multiple outgoing edges.
///
/// An edge with no handle is the plain continuation and is treated as
/// [`SourceHandle::Next`] everywhere occupancy matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceHandle {
    Next,
    True,
    False,
    Loop,
    Action1,
    Action2,
    Action3,
}

impl SourceHandle {
    /// The three parallel-branch handles in emission order.
    pub const ACTIONS: [SourceHandle; 3] = [
        SourceHandle::Action1,
        SourceHandle::Action2,
        SourceHandle::Action3,
    ];

    pub fn is_action(&self) -> bool {
        matches!(
            self,
            SourceHandle::Action1 | SourceHandle::Action2 | SourceHandle::Action3
        )
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceHandle::Next => "next",
            SourceHandle::True => "true",
            SourceHandle::False => "false",
            SourceHandle::Loop => "loop",
            SourceHandle::Action1 => "action1",
            SourceHandle::Action2 => "action2",
            SourceHandle::Action3 => "action3",
        };
        f.write_str(name)
    }
}

/// A validated connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<SourceHandle>,
}

impl Edge {
    /// The occupancy slot this edge binds on its source node.
    pub fn handle_slot(&self) -> SourceHandle {
        self.handle.unwrap_or(SourceHandle::Next)
    }

    /// True for edges the straight-line traversal follows.
    pub fn is_continuation(&self) -> bool {
        self.handle_slot() == SourceHandle::Next
    }
}

//! The typed node/edge routine model and its mutation-time validation.

pub mod definition;
pub mod edge;
pub mod freehand;
pub mod graph;
pub mod node;

pub use definition::*;
pub use edge::*;
pub use freehand::*;
pub use graph::*;
pub use node::*;

//! # Kiseki - Routine Graph Compilation and Code Generation Engine
//!
//! **Kiseki** compiles visually authored robot autonomous routines - node
//! graphs of movement, mechanism, sensor and control-flow steps - into
//! runnable procedural source code for four distinct robot-control runtime
//! styles. It is a pure library: no canvas, no persistence, no hardware I/O.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Routine**: Parse the authoring surface's `{nodes, edges}`
//!     document into a [`routine::RoutineDefinition`] (or implement
//!     [`routine::IntoRoutine`] for your own format).
//! 2.  **Validate**: Upgrade the definition into a [`routine::ProgramGraph`].
//!     Every structural rule - single start node, no cycles, no duplicate or
//!     over-bound handles, no parallel category conflicts - is enforced at
//!     this boundary, exactly as it is during live edits.
//! 3.  **Derive**: Run [`sim::derive_waypoints`] to simulate the robot pose
//!     across the routine's movement nodes, and [`geometry::generate_spline`]
//!     for a dense preview path.
//! 4.  **Generate**: Pick a [`codegen::GeneratorChoice`] and call
//!     [`codegen::generate`] with the graph, the waypoints and the read-only
//!     device registry to obtain one self-contained source file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kiseki::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut graph = ProgramGraph::new("start");
//!     graph.add_node(Node::action(
//!         "drive",
//!         ActionKind::Forward {
//!             distance: Some(24.0),
//!         },
//!     ))?;
//!     graph.add_node(Node::end("end"))?;
//!     graph.add_edge("start", "drive", None)?;
//!     graph.add_edge("drive", "end", None)?;
//!
//!     let waypoints = derive_waypoints(&graph, Pose::new(72.0, 72.0, 0.0));
//!     let devices = DeviceRegistry::default();
//!     let source = generate(GeneratorChoice::Encoder, &graph, &waypoints, &devices)?;
//!
//!     println!("{}", source);
//!     Ok(())
//! }
//! ```

pub mod codegen;
pub mod device;
pub mod error;
pub mod geometry;
pub mod prelude;
pub mod routine;
pub mod sim;

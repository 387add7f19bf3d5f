//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and functions from the kiseki
//! crate so consumers can bring the core surface in with one `use`.

// Routine model and validation
pub use crate::routine::{
    ActionCategory, ActionKind, Edge, EdgeDefinition, IntoRoutine, Node, NodeId, NodeKind,
    ProgramGraph, RoutineDefinition, SourceHandle, freehand_to_actions,
};

// Pose simulation
pub use crate::sim::{FIELD_SIZE_IN, Pose, derive_waypoints};

// Geometry engine
pub use crate::geometry::{DEFAULT_EPSILON_IN, generate_spline, path_length, simplify_path};

// Device registry
pub use crate::device::{
    DeviceRegistry, DriveKind, DrivetrainConfig, Hub, MotorConfig, SensorConfig, SensorKind,
    ServoConfig,
};

// Code generation
pub use crate::codegen::{CodeBackend, GeneratorChoice, generate};

// Error types
pub use crate::error::{CodegenError, GraphError, RoutineConversionError};

use super::{DEFAULT_ANGLE_DEG, DEFAULT_DISTANCE_IN};
use crate::routine::{ActionKind, NodeKind, ProgramGraph};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A robot pose in field coordinates: inches for position, degrees for
/// heading, 0° pointing along the +X axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Pose) -> f64 {
        self.position().distance(other.position())
    }

    /// Returns the pose displaced `distance` inches along `angle_deg`.
    pub fn translated_along(&self, angle_deg: f64, distance: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self {
            x: self.x + distance * rad.cos(),
            y: self.y + distance * rad.sin(),
            heading: self.heading,
        }
    }
}

/// Derives the ordered waypoint list for a routine.
///
/// Walks the graph's linear spine (continuation edges only) from the start
/// node, applies each movement node to a simulated pose and records the
/// result. Element 0 is always `initial`; every later element corresponds to
/// exactly one movement node, so the list length is
/// `1 + count(movement nodes visited)`.
pub fn derive_waypoints(graph: &ProgramGraph, initial: Pose) -> Vec<Pose> {
    let mut pose = initial;
    let mut waypoints = vec![initial];

    for node in graph.execution_order() {
        let NodeKind::Action { action, .. } = &node.kind else {
            continue;
        };
        if let Some(next) = apply_movement(action, pose) {
            pose = next;
            waypoints.push(pose);
        }
    }

    debug!(
        waypoints = waypoints.len(),
        "derived waypoints for routine spine"
    );
    waypoints
}

/// Applies one movement action to `pose`, or returns `None` for non-movement
/// actions. Matched exhaustively so a new movement variant cannot silently
/// derive no waypoint.
pub fn apply_movement(action: &ActionKind, pose: Pose) -> Option<Pose> {
    let next = match action {
        ActionKind::MoveToPosition { x, y, heading } | ActionKind::SplineTo { x, y, heading } => {
            Pose::new(*x, *y, heading.unwrap_or(pose.heading))
        }
        ActionKind::Forward { distance } => {
            pose.translated_along(pose.heading, distance.unwrap_or(DEFAULT_DISTANCE_IN))
        }
        ActionKind::Backward { distance } => {
            pose.translated_along(pose.heading, -distance.unwrap_or(DEFAULT_DISTANCE_IN))
        }
        ActionKind::StrafeLeft { distance } => {
            pose.translated_along(pose.heading - 90.0, distance.unwrap_or(DEFAULT_DISTANCE_IN))
        }
        ActionKind::StrafeRight { distance } => {
            pose.translated_along(pose.heading + 90.0, distance.unwrap_or(DEFAULT_DISTANCE_IN))
        }
        ActionKind::TurnLeft { angle } => Pose::new(
            pose.x,
            pose.y,
            pose.heading - angle.unwrap_or(DEFAULT_ANGLE_DEG),
        ),
        ActionKind::TurnRight { angle } => Pose::new(
            pose.x,
            pose.y,
            pose.heading + angle.unwrap_or(DEFAULT_ANGLE_DEG),
        ),
        ActionKind::TurnToHeading { heading } => Pose::new(pose.x, pose.y, *heading),

        ActionKind::SetServoPosition { .. }
        | ActionKind::SetMotorPower { .. }
        | ActionKind::RunMotorToPosition { .. }
        | ActionKind::StopMotor { .. }
        | ActionKind::OpenClaw { .. }
        | ActionKind::CloseClaw { .. }
        | ActionKind::IntakeIn { .. }
        | ActionKind::IntakeOut { .. }
        | ActionKind::ArmUp { .. }
        | ActionKind::ArmDown { .. }
        | ActionKind::WaitForTouch { .. }
        | ActionKind::WaitForColor { .. }
        | ActionKind::WaitForDistance { .. }
        | ActionKind::Wait { .. }
        | ActionKind::Conditional { .. }
        | ActionKind::Loop { .. }
        | ActionKind::ForEach { .. }
        | ActionKind::Parallel
        | ActionKind::CustomCode { .. } => return None,
    };
    Some(next)
}

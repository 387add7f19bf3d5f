use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node within a routine graph.
pub type NodeId = String;

/// One authored step in a routine: the start marker, the end marker, or an
/// action with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn start(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Start,
        }
    }

    pub fn end(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::End,
        }
    }

    pub fn action(id: impl Into<NodeId>, action: ActionKind) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Action {
                action,
                combined: None,
            },
        }
    }

    /// Returns the action payload if this is an action node.
    pub fn as_action(&self) -> Option<&ActionKind> {
        match &self.kind {
            NodeKind::Action { action, .. } => Some(action),
            _ => None,
        }
    }
}

/// The three node roles a routine graph distinguishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeKind {
    Start,
    End,
    Action {
        #[serde(flatten)]
        action: ActionKind,
        /// Optional secondary action executed alongside the primary one
        /// (e.g. spin the intake while driving a segment).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        combined: Option<ActionKind>,
    },
}

/// Broad grouping of action variants, used by parallel-node validation and
/// device usage analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionCategory {
    Movement,
    Mechanism,
    Sensor,
    ControlFlow,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionCategory::Movement => "movement",
            ActionCategory::Mechanism => "mechanism",
            ActionCategory::Sensor => "sensor",
            ActionCategory::ControlFlow => "control-flow",
        };
        f.write_str(name)
    }
}

/// Every action a routine node can perform, each variant carrying only its
/// own parameters. Numeric parameters the authoring surface may leave unset
/// are `Option` and default at derivation/codegen time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActionKind {
    // --- Movement ---
    MoveToPosition {
        x: f64,
        y: f64,
        heading: Option<f64>,
    },
    SplineTo {
        x: f64,
        y: f64,
        heading: Option<f64>,
    },
    Forward {
        distance: Option<f64>,
    },
    Backward {
        distance: Option<f64>,
    },
    StrafeLeft {
        distance: Option<f64>,
    },
    StrafeRight {
        distance: Option<f64>,
    },
    TurnLeft {
        angle: Option<f64>,
    },
    TurnRight {
        angle: Option<f64>,
    },
    TurnToHeading {
        heading: f64,
    },

    // --- Mechanism ---
    SetServoPosition {
        servo: String,
        position: Option<f64>,
    },
    SetMotorPower {
        motor: String,
        power: Option<f64>,
    },
    RunMotorToPosition {
        motor: String,
        target_ticks: i32,
        power: Option<f64>,
    },
    StopMotor {
        motor: String,
    },
    OpenClaw {
        servo: String,
    },
    CloseClaw {
        servo: String,
    },
    IntakeIn {
        motor: String,
        power: Option<f64>,
    },
    IntakeOut {
        motor: String,
        power: Option<f64>,
    },
    ArmUp {
        motor: String,
        power: Option<f64>,
    },
    ArmDown {
        motor: String,
        power: Option<f64>,
    },

    // --- Sensor ---
    WaitForTouch {
        sensor: String,
    },
    WaitForColor {
        sensor: String,
        target: String,
    },
    WaitForDistance {
        sensor: String,
        threshold_in: Option<f64>,
    },

    // --- Control flow ---
    Wait {
        duration: Option<f64>,
    },
    Conditional {
        condition: String,
    },
    Loop {
        count: Option<u32>,
    },
    ForEach {
        iterator: String,
        count: Option<u32>,
    },
    Parallel,
    CustomCode {
        code: String,
    },
}

impl ActionKind {
    /// The category of this action, matched exhaustively so a new variant
    /// cannot be forgotten.
    pub fn category(&self) -> ActionCategory {
        match self {
            ActionKind::MoveToPosition { .. }
            | ActionKind::SplineTo { .. }
            | ActionKind::Forward { .. }
            | ActionKind::Backward { .. }
            | ActionKind::StrafeLeft { .. }
            | ActionKind::StrafeRight { .. }
            | ActionKind::TurnLeft { .. }
            | ActionKind::TurnRight { .. }
            | ActionKind::TurnToHeading { .. } => ActionCategory::Movement,

            ActionKind::SetServoPosition { .. }
            | ActionKind::SetMotorPower { .. }
            | ActionKind::RunMotorToPosition { .. }
            | ActionKind::StopMotor { .. }
            | ActionKind::OpenClaw { .. }
            | ActionKind::CloseClaw { .. }
            | ActionKind::IntakeIn { .. }
            | ActionKind::IntakeOut { .. }
            | ActionKind::ArmUp { .. }
            | ActionKind::ArmDown { .. } => ActionCategory::Mechanism,

            ActionKind::WaitForTouch { .. }
            | ActionKind::WaitForColor { .. }
            | ActionKind::WaitForDistance { .. } => ActionCategory::Sensor,

            ActionKind::Wait { .. }
            | ActionKind::Conditional { .. }
            | ActionKind::Loop { .. }
            | ActionKind::ForEach { .. }
            | ActionKind::Parallel
            | ActionKind::CustomCode { .. } => ActionCategory::ControlFlow,
        }
    }

    pub fn is_movement(&self) -> bool {
        self.category() == ActionCategory::Movement
    }

    /// True for the node kinds that own labeled branch handles.
    pub fn is_branching(&self) -> bool {
        matches!(
            self,
            ActionKind::Conditional { .. }
                | ActionKind::Loop { .. }
                | ActionKind::ForEach { .. }
                | ActionKind::Parallel
        )
    }
}

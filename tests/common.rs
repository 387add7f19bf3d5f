//! Common test utilities for building routine graphs and device registries.
use kiseki::prelude::*;

/// `start -> forward(24) -> end`, the smallest useful routine.
#[allow(dead_code)]
pub fn linear_graph() -> ProgramGraph {
    let mut graph = ProgramGraph::new("start");
    graph
        .add_node(Node::action(
            "drive",
            ActionKind::Forward {
                distance: Some(24.0),
            },
        ))
        .unwrap();
    graph.add_node(Node::end("end")).unwrap();
    graph.add_edge("start", "drive", None).unwrap();
    graph.add_edge("drive", "end", None).unwrap();
    graph
}

/// A routine exercising movement, mechanisms, a loop and a conditional.
///
/// Spine: start -> forward(24) -> turnLeft(90) -> openClaw -> loop -> end
/// Loop body: intakeIn; conditional after the loop's next edge is reached
/// through the loop node's `next` handle.
#[allow(dead_code)]
pub fn branching_graph() -> ProgramGraph {
    let mut graph = ProgramGraph::new("start");
    graph
        .add_node(Node::action(
            "drive",
            ActionKind::Forward {
                distance: Some(24.0),
            },
        ))
        .unwrap();
    graph
        .add_node(Node::action("face", ActionKind::TurnLeft { angle: Some(90.0) }))
        .unwrap();
    graph
        .add_node(Node::action(
            "open",
            ActionKind::OpenClaw {
                servo: "claw".to_string(),
            },
        ))
        .unwrap();
    graph
        .add_node(Node::action("repeat", ActionKind::Loop { count: Some(2) }))
        .unwrap();
    graph
        .add_node(Node::action(
            "spin",
            ActionKind::IntakeIn {
                motor: "intake".to_string(),
                power: Some(0.8),
            },
        ))
        .unwrap();
    graph
        .add_node(Node::action(
            "check",
            ActionKind::Conditional {
                condition: "getRuntime() < 25.0".to_string(),
            },
        ))
        .unwrap();
    graph
        .add_node(Node::action(
            "grab",
            ActionKind::CloseClaw {
                servo: "claw".to_string(),
            },
        ))
        .unwrap();
    graph
        .add_node(Node::action("pause", ActionKind::Wait { duration: Some(0.5) }))
        .unwrap();
    graph.add_node(Node::end("end")).unwrap();

    graph.add_edge("start", "drive", None).unwrap();
    graph.add_edge("drive", "face", None).unwrap();
    graph.add_edge("face", "open", None).unwrap();
    graph.add_edge("open", "repeat", None).unwrap();
    graph
        .add_edge("repeat", "spin", Some(SourceHandle::Loop))
        .unwrap();
    graph
        .add_edge("repeat", "check", Some(SourceHandle::Next))
        .unwrap();
    graph
        .add_edge("check", "grab", Some(SourceHandle::True))
        .unwrap();
    graph
        .add_edge("check", "pause", Some(SourceHandle::False))
        .unwrap();
    graph.add_edge("grab", "end", None).unwrap();
    graph
}

/// A registry with a claw servo, an intake motor and a touch sensor on top
/// of the stock drivetrain.
#[allow(dead_code)]
pub fn sample_devices() -> DeviceRegistry {
    DeviceRegistry {
        motors: vec![MotorConfig {
            name: "intake".to_string(),
            port: 0,
            hub: Hub::Expansion,
            enabled: true,
            reversed: false,
        }],
        servos: vec![ServoConfig {
            name: "claw".to_string(),
            port: 1,
            hub: Hub::Control,
            enabled: true,
        }],
        sensors: vec![SensorConfig {
            name: "bumper".to_string(),
            kind: SensorKind::Touch,
            port: 2,
            hub: Hub::Control,
            enabled: true,
        }],
        drivetrain: None,
    }
}

/// Asserts the generated Java source has exactly one class declaration and
/// balanced braces.
#[allow(dead_code)]
pub fn assert_well_formed(source: &str) {
    assert!(!source.is_empty(), "generated source must not be empty");
    let classes = source.matches("public class ").count();
    assert_eq!(classes, 1, "expected exactly one class declaration");
    let open = source.matches('{').count();
    let close = source.matches('}').count();
    assert_eq!(open, close, "unbalanced braces in generated source:\n{source}");
}

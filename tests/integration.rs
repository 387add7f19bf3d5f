mod common;

use common::{assert_well_formed, sample_devices};
use glam::DVec2;
use kiseki::prelude::*;

const ROUTINE_JSON: &str = r#"{
    "nodes": [
        { "id": "start", "kind": "start" },
        { "id": "drive", "kind": "action", "type": "forward", "distance": 24.0 },
        { "id": "face", "kind": "action", "type": "turnLeft", "angle": 90.0 },
        { "id": "check", "kind": "action", "type": "conditional", "condition": "getRuntime() < 25.0" },
        { "id": "grab", "kind": "action", "type": "closeClaw", "servo": "claw" },
        { "id": "pause", "kind": "action", "type": "wait", "duration": 0.5 },
        { "id": "end", "kind": "end" }
    ],
    "edges": [
        { "source": "start", "target": "drive" },
        { "source": "drive", "target": "face" },
        { "source": "face", "target": "check" },
        { "source": "check", "target": "grab", "sourceHandle": "true" },
        { "source": "check", "target": "pause", "sourceHandle": "false" },
        { "source": "grab", "target": "end" }
    ]
}"#;

#[test]
fn routine_json_compiles_through_every_backend() {
    let definition = RoutineDefinition::from_json_str(ROUTINE_JSON).unwrap();
    let graph = definition.into_graph().unwrap();

    let waypoints = derive_waypoints(&graph, Pose::new(72.0, 72.0, 0.0));
    assert_eq!(waypoints.len(), 3);
    assert_eq!(waypoints[2].heading, -90.0);

    let devices = sample_devices();
    for choice in GeneratorChoice::ALL {
        let source = generate(choice, &graph, &waypoints, &devices).unwrap();
        assert_well_formed(&source);
    }
}

#[test]
fn routine_definition_round_trips_through_serde() {
    let definition = RoutineDefinition::from_json_str(ROUTINE_JSON).unwrap();
    let json = serde_json::to_string(&definition).unwrap();
    let reparsed = RoutineDefinition::from_json_str(&json).unwrap();
    assert_eq!(reparsed.nodes, definition.nodes);
    assert_eq!(reparsed.nodes.len(), 7);
    assert!(reparsed.into_graph().is_ok());
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = RoutineDefinition::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, RoutineConversionError::JsonParseError(_)));
}

#[test]
fn definition_without_a_start_node_is_rejected() {
    let json = r#"{
        "nodes": [{ "id": "end", "kind": "end" }],
        "edges": []
    }"#;
    let definition = RoutineDefinition::from_json_str(json).unwrap();
    assert_eq!(definition.into_graph().unwrap_err(), GraphError::MissingStart);
}

#[test]
fn definition_with_two_start_nodes_is_rejected() {
    let json = r#"{
        "nodes": [
            { "id": "a", "kind": "start" },
            { "id": "b", "kind": "start" }
        ],
        "edges": []
    }"#;
    let definition = RoutineDefinition::from_json_str(json).unwrap();
    assert_eq!(
        definition.into_graph().unwrap_err(),
        GraphError::MultipleStart { count: 2 }
    );
}

#[test]
fn definition_encoding_a_cycle_is_rejected() {
    let json = r#"{
        "nodes": [
            { "id": "start", "kind": "start" },
            { "id": "a", "kind": "action", "type": "forward", "distance": 12.0 },
            { "id": "b", "kind": "action", "type": "backward", "distance": 12.0 }
        ],
        "edges": [
            { "source": "start", "target": "a" },
            { "source": "a", "target": "b" },
            { "source": "b", "target": "a" }
        ]
    }"#;
    let definition = RoutineDefinition::from_json_str(json).unwrap();
    assert!(matches!(
        definition.into_graph().unwrap_err(),
        GraphError::CycleDetected { .. }
    ));
}

#[test]
fn combined_action_survives_the_document_form() {
    let json = r#"{
        "nodes": [
            { "id": "start", "kind": "start" },
            {
                "id": "drivegrab",
                "kind": "action",
                "type": "forward",
                "distance": 24.0,
                "combined": { "type": "intakeIn", "motor": "intake", "power": 1.0 }
            },
            { "id": "end", "kind": "end" }
        ],
        "edges": [
            { "source": "start", "target": "drivegrab" },
            { "source": "drivegrab", "target": "end" }
        ]
    }"#;
    let definition = RoutineDefinition::from_json_str(json).unwrap();
    let node = definition
        .nodes
        .iter()
        .find(|n| n.id == "drivegrab")
        .unwrap();
    let NodeKind::Action { action, combined } = &node.kind else {
        panic!("expected an action node");
    };
    assert_eq!(
        action,
        &ActionKind::Forward {
            distance: Some(24.0)
        }
    );
    assert_eq!(
        combined,
        &Some(ActionKind::IntakeIn {
            motor: "intake".to_string(),
            power: Some(1.0)
        })
    );
}

#[test]
fn freehand_stroke_becomes_a_compilable_routine() {
    // An L-shaped stroke with a little jitter.
    let stroke: Vec<DVec2> = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(12.0, 0.2),
        DVec2::new(24.0, -0.1),
        DVec2::new(36.0, 0.0),
        DVec2::new(36.1, 12.0),
        DVec2::new(36.0, 24.0),
    ];
    let actions = freehand_to_actions(&stroke, DEFAULT_EPSILON_IN);
    assert!(!actions.is_empty());
    // The corner produces a heading change.
    assert!(
        actions
            .iter()
            .any(|a| matches!(a, ActionKind::TurnToHeading { .. }))
    );

    let mut graph = ProgramGraph::new("start");
    let mut previous = "start".to_string();
    for (i, action) in actions.into_iter().enumerate() {
        let id = format!("n{i}");
        graph.add_node(Node::action(id.clone(), action)).unwrap();
        graph.add_edge(&previous, &id, None).unwrap();
        previous = id;
    }
    graph.add_node(Node::end("end")).unwrap();
    graph.add_edge(&previous, "end", None).unwrap();

    let waypoints = derive_waypoints(&graph, Pose::new(0.0, 0.0, 0.0));
    assert!(waypoints.len() >= 3);
    // The simulated endpoint lands near the stroke's endpoint.
    let last = waypoints.last().unwrap();
    assert!(last.distance_to(&Pose::new(36.0, 24.0, last.heading)) < 2.0 * DEFAULT_EPSILON_IN);

    let devices = DeviceRegistry::default();
    let source = generate(GeneratorChoice::RoadRunner, &graph, &waypoints, &devices).unwrap();
    assert_well_formed(&source);
}

#[test]
fn graph_error_messages_are_actionable() {
    use std::error::Error as _;

    let err = GraphError::CycleDetected {
        from: "b".to_string(),
        to: "a".to_string(),
    };
    assert!(err.to_string().contains("use a loop node"));
    // Endpoint ids are message data, not a chained cause.
    assert!(err.source().is_none());

    let err = GraphError::DuplicateEdge {
        from: "a".to_string(),
        to: "b".to_string(),
        handle: "next".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "an edge from 'a' to 'b' on handle 'next' already exists"
    );
    assert!(err.source().is_none());

    let err = CodegenError::NoRoute;
    assert!(err.to_string().contains("connect at least one action"));
}

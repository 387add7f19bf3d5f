mod common;

use common::{branching_graph, linear_graph};
use kiseki::prelude::*;

#[test]
fn new_graph_contains_only_the_start_node() {
    let graph = ProgramGraph::new("start");
    assert_eq!(graph.nodes().len(), 1);
    assert!(graph.edges().is_empty());
    assert_eq!(graph.start_id(), "start");
    assert!(!graph.has_route());
}

#[test]
fn duplicate_node_id_is_rejected() {
    let mut graph = ProgramGraph::new("start");
    graph
        .add_node(Node::action("a", ActionKind::Wait { duration: None }))
        .unwrap();
    let err = graph
        .add_node(Node::action("a", ActionKind::Parallel))
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::DuplicateNode {
            node_id: "a".to_string()
        }
    );
}

#[test]
fn second_start_node_is_rejected() {
    let mut graph = ProgramGraph::new("start");
    let err = graph.add_node(Node::start("start2")).unwrap_err();
    assert!(matches!(err, GraphError::MultipleStart { .. }));
}

#[test]
fn self_loop_is_rejected() {
    let mut graph = ProgramGraph::new("start");
    graph
        .add_node(Node::action("a", ActionKind::Forward { distance: None }))
        .unwrap();
    graph.add_edge("start", "a", None).unwrap();
    let err = graph.add_edge("a", "a", None).unwrap_err();
    assert_eq!(
        err,
        GraphError::SelfLoop {
            node_id: "a".to_string()
        }
    );
}

#[test]
fn unknown_endpoint_is_rejected() {
    let mut graph = ProgramGraph::new("start");
    let err = graph.add_edge("start", "ghost", None).unwrap_err();
    assert_eq!(
        err,
        GraphError::UnknownNode {
            node_id: "ghost".to_string()
        }
    );
    let err = graph.add_edge("ghost", "start", None).unwrap_err();
    assert_eq!(
        err,
        GraphError::UnknownNode {
            node_id: "ghost".to_string()
        }
    );
}

#[test]
fn duplicate_edge_on_same_handle_is_rejected() {
    let mut graph = ProgramGraph::new("start");
    graph
        .add_node(Node::action("a", ActionKind::Forward { distance: None }))
        .unwrap();
    graph.add_edge("start", "a", None).unwrap();
    // An explicit `next` handle occupies the same slot as no handle at all.
    let err = graph
        .add_edge("start", "a", Some(SourceHandle::Next))
        .unwrap_err();
    assert!(matches!(err, GraphError::DuplicateEdge { .. }));
}

#[test]
fn handle_occupied_is_rejected() {
    let mut graph = ProgramGraph::new("start");
    graph
        .add_node(Node::action(
            "check",
            ActionKind::Conditional {
                condition: "true".to_string(),
            },
        ))
        .unwrap();
    graph
        .add_node(Node::action("a", ActionKind::Wait { duration: None }))
        .unwrap();
    graph
        .add_node(Node::action("b", ActionKind::Wait { duration: None }))
        .unwrap();
    graph.add_edge("start", "check", None).unwrap();
    graph
        .add_edge("check", "a", Some(SourceHandle::True))
        .unwrap();
    let err = graph
        .add_edge("check", "b", Some(SourceHandle::True))
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::HandleOccupied {
            node_id: "check".to_string(),
            handle: "true".to_string()
        }
    );
}

#[test]
fn cycle_closing_edge_is_rejected_and_graph_is_unchanged() {
    let mut graph = ProgramGraph::new("start");
    graph
        .add_node(Node::action("a", ActionKind::Forward { distance: None }))
        .unwrap();
    graph
        .add_node(Node::action("b", ActionKind::TurnLeft { angle: None }))
        .unwrap();
    graph.add_edge("start", "a", None).unwrap();
    graph.add_edge("a", "b", None).unwrap();

    let before = graph.edges().len();
    let err = graph.add_edge("b", "a", None).unwrap_err();
    assert_eq!(
        err,
        GraphError::CycleDetected {
            from: "b".to_string(),
            to: "a".to_string()
        }
    );
    assert_eq!(graph.edges().len(), before);
    assert_eq!(graph.next_target("b"), None);
}

#[test]
fn parallel_rejects_two_actions_of_the_same_category() {
    let mut graph = ProgramGraph::new("start");
    graph.add_node(Node::action("par", ActionKind::Parallel)).unwrap();
    graph
        .add_node(Node::action(
            "open",
            ActionKind::OpenClaw {
                servo: "claw".to_string(),
            },
        ))
        .unwrap();
    graph
        .add_node(Node::action(
            "lift",
            ActionKind::ArmUp {
                motor: "arm".to_string(),
                power: None,
            },
        ))
        .unwrap();
    graph.add_edge("start", "par", None).unwrap();
    graph
        .add_edge("par", "open", Some(SourceHandle::Action1))
        .unwrap();
    let err = graph
        .add_edge("par", "lift", Some(SourceHandle::Action2))
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::CategoryConflict {
            node_id: "par".to_string(),
            category: ActionCategory::Mechanism,
        }
    );
}

#[test]
fn parallel_accepts_actions_of_different_categories() {
    let mut graph = ProgramGraph::new("start");
    graph.add_node(Node::action("par", ActionKind::Parallel)).unwrap();
    graph
        .add_node(Node::action(
            "open",
            ActionKind::OpenClaw {
                servo: "claw".to_string(),
            },
        ))
        .unwrap();
    graph
        .add_node(Node::action("drive", ActionKind::Forward { distance: None }))
        .unwrap();
    graph.add_edge("start", "par", None).unwrap();
    graph
        .add_edge("par", "open", Some(SourceHandle::Action1))
        .unwrap();
    graph
        .add_edge("par", "drive", Some(SourceHandle::Action2))
        .unwrap();
    assert_eq!(graph.outgoing("par").count(), 2);
}

#[test]
fn parallel_pairs_a_wait_with_a_mechanism() {
    let mut graph = ProgramGraph::new("start");
    graph.add_node(Node::action("par", ActionKind::Parallel)).unwrap();
    graph
        .add_node(Node::action("pause", ActionKind::Wait { duration: Some(2.0) }))
        .unwrap();
    graph
        .add_node(Node::action(
            "spin",
            ActionKind::IntakeIn {
                motor: "intake".to_string(),
                power: None,
            },
        ))
        .unwrap();
    graph.add_edge("start", "par", None).unwrap();
    graph
        .add_edge("par", "pause", Some(SourceHandle::Action1))
        .unwrap();
    // A timed branch is control flow, not a mechanism; pairing it with a
    // mechanism branch is allowed.
    graph
        .add_edge("par", "spin", Some(SourceHandle::Action2))
        .unwrap();
    assert_eq!(graph.outgoing("par").count(), 2);
    assert_eq!(
        ActionKind::Wait { duration: None }.category(),
        ActionCategory::ControlFlow
    );
}

#[test]
fn execution_order_follows_only_continuation_edges() {
    let graph = branching_graph();
    let ids: Vec<&str> = graph
        .execution_order()
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    // Branch bodies (spin, grab, pause) never appear on the spine; the
    // conditional itself does, reached through the loop node's next handle.
    assert_eq!(ids, ["drive", "face", "open", "repeat", "check"]);
}

#[test]
fn branch_target_resolves_labeled_handles() {
    let graph = branching_graph();
    assert_eq!(graph.branch_target("repeat", SourceHandle::Loop), Some("spin"));
    assert_eq!(graph.branch_target("check", SourceHandle::True), Some("grab"));
    assert_eq!(graph.branch_target("check", SourceHandle::False), Some("pause"));
    assert_eq!(graph.branch_target("check", SourceHandle::Loop), None);
}

#[test]
fn reachable_from_covers_branch_bodies() {
    let graph = branching_graph();
    let reached = graph.reachable_from("start");
    for id in ["drive", "face", "open", "repeat", "spin", "grab", "pause"] {
        assert!(reached.contains(id), "expected '{id}' to be reachable");
    }
    assert!(!reached.contains("start"));
}

#[test]
fn linear_graph_has_a_route() {
    let graph = linear_graph();
    assert!(graph.has_route());
    assert_eq!(graph.next_target("start"), Some("drive"));
    assert_eq!(graph.next_target("drive"), Some("end"));
    assert_eq!(graph.next_target("end"), None);
}

use super::common::*;

use crate::workflows::licensing::{
    Language, LicensingError, LocalizedTitle, Status, StatusCategory, StatusNode, WorkflowGraph,
    WorkflowNode, WorkflowPosition,
};

fn graph_of(ids: &[u64]) -> WorkflowGraph<StatusCategory> {
    WorkflowGraph::from_nodes(
        ids.iter()
            .map(|id| workflow_category(*id, &format!("step-{id}"))),
    )
    .expect("graph loads")
}

fn chain_ids(graph: &WorkflowGraph<StatusCategory>, start: u64) -> Vec<u64> {
    graph
        .chain_from(start)
        .map(|node| node.expect("chain step").id())
        .collect()
}

#[test]
fn link_builds_a_doubly_linked_chain() {
    let mut graph = graph_of(&[1, 2, 3]);
    graph.link(1, 2).expect("link 1 -> 2");
    graph.link(2, 3).expect("link 2 -> 3");

    assert_eq!(chain_ids(&graph, 1), vec![1, 2, 3]);
    assert_eq!(graph.position(1).expect("node"), WorkflowPosition::First);
    assert_eq!(graph.position(2).expect("node"), WorkflowPosition::Middle);
    assert_eq!(graph.position(3).expect("node"), WorkflowPosition::Last);
    assert_eq!(graph.heads(), vec![1]);
    assert!(graph.can_transition(1, 2).expect("nodes exist"));
    assert!(!graph.can_transition(1, 3).expect("nodes exist"));
}

#[test]
fn reverse_link_is_a_cycle() {
    let mut graph = graph_of(&[1, 2]);
    graph.link(1, 2).expect("link 1 -> 2");
    let error = graph.link(2, 1).expect_err("2-cycle");
    assert!(matches!(error, LicensingError::Cycle { node: 2 }));
    assert_eq!(chain_ids(&graph, 1), vec![1, 2]);
}

#[test]
fn closing_a_longer_loop_is_a_cycle() {
    let mut graph = graph_of(&[1, 2, 3]);
    graph.link(1, 2).expect("link");
    graph.link(2, 3).expect("link");
    assert!(matches!(
        graph.link(3, 1),
        Err(LicensingError::Cycle { node: 3 })
    ));
}

#[test]
fn self_link_is_a_validation_error() {
    let mut graph = graph_of(&[1]);
    assert!(matches!(
        graph.link(1, 1),
        Err(LicensingError::Validation(_))
    ));
}

#[test]
fn link_to_unknown_node_is_not_found() {
    let mut graph = graph_of(&[1]);
    assert!(matches!(
        graph.link(1, 9),
        Err(LicensingError::NotFound {
            entity: "status node",
            id: 9
        })
    ));
}

#[test]
fn relinking_detaches_former_neighbours() {
    let mut graph = graph_of(&[1, 2, 3]);
    graph.link(1, 2).expect("link");
    graph.link(1, 3).expect("relink");

    assert_eq!(chain_ids(&graph, 1), vec![1, 3]);
    assert_eq!(graph.position(2).expect("node"), WorkflowPosition::Standalone);
    assert_eq!(graph.heads(), vec![1, 2]);
}

#[test]
fn unlink_restores_standalone_nodes() {
    let mut graph = graph_of(&[1, 2, 3]);
    graph.link(1, 2).expect("link");
    graph.link(2, 3).expect("link");
    graph.unlink(2).expect("unlink");

    assert_eq!(graph.position(1).expect("node"), WorkflowPosition::Standalone);
    assert_eq!(graph.position(2).expect("node"), WorkflowPosition::Standalone);
    assert_eq!(graph.position(3).expect("node"), WorkflowPosition::Standalone);
}

#[test]
fn self_referencing_node_is_rejected_on_insert() {
    let mut node = workflow_category(4, "loop");
    node.node.next_id = Some(4);
    assert!(matches!(
        WorkflowGraph::from_nodes(vec![node]),
        Err(LicensingError::Validation(_))
    ));

    let mut graph = graph_of(&[1]);
    assert!(graph.insert(workflow_category(1, "again")).is_err());
}

#[test]
fn persisted_cycle_is_detected_lazily() {
    let mut first = workflow_category(1, "a");
    first.node.next_id = Some(2);
    let mut second = workflow_category(2, "b");
    second.node.previous_id = Some(1);
    second.node.next_id = Some(1);
    let graph = WorkflowGraph::from_nodes(vec![first, second]).expect("loads");

    let steps: Vec<_> = graph.chain_from(1).collect();
    assert_eq!(steps.len(), 3);
    assert!(matches!(steps[2], Err(LicensingError::Cycle { node: 1 })));
    assert!(matches!(
        graph.validate_acyclic(),
        Err(LicensingError::Cycle { .. })
    ));
}

#[test]
fn dangling_next_pointer_ends_the_chain_with_not_found() {
    let mut first = workflow_category(1, "a");
    first.node.next_id = Some(42);
    let graph = WorkflowGraph::from_nodes(vec![first]).expect("loads");

    let steps: Vec<_> = graph.chain_from(1).collect();
    assert_eq!(steps.len(), 2);
    assert!(matches!(
        steps[1],
        Err(LicensingError::NotFound { id: 42, .. })
    ));
    assert!(graph.validate_acyclic().is_ok());
}

#[test]
fn visibility_respects_roles_and_activity() {
    let mut graph = graph_of(&[1, 2, 3]);
    graph.link(1, 2).expect("link");
    graph.link(2, 3).expect("link");
    graph
        .get_mut(2)
        .expect("node")
        .node_mut()
        .set_roles(["licensing_director"]);
    graph.get_mut(3).expect("node").node_mut().deactivate();

    let visible: Vec<u64> = graph
        .visible_chain(1, "club_admin")
        .expect("chain")
        .into_iter()
        .map(WorkflowNode::id)
        .collect();
    assert_eq!(visible, vec![1]);

    let visible: Vec<u64> = graph
        .visible_chain(1, "licensing_director")
        .expect("chain")
        .into_iter()
        .map(WorkflowNode::id)
        .collect();
    assert_eq!(visible, vec![1, 2]);
    assert!(!graph.is_accessible(2, "club_admin").expect("node"));
    assert!(graph.is_accessible(1, "club_admin").expect("node"));

    graph.get_mut(3).expect("node").node_mut().activate();
    let visible: Vec<u64> = graph
        .visible_chain(1, "licensing_director")
        .expect("chain")
        .into_iter()
        .map(WorkflowNode::id)
        .collect();
    assert_eq!(visible, vec![1, 2, 3]);
}

#[test]
fn role_edits_toggle_access() {
    let mut node = StatusNode::new(1, "review", LocalizedTitle::new("Проверка", "Тексеру"));
    assert!(node.is_accessible("anyone"));
    node.add_role("expert");
    assert!(!node.is_accessible("anyone"));
    assert!(node.is_accessible("expert"));
    node.remove_role("expert");
    assert!(node.is_accessible("anyone"));
    node.set_roles(["a", "b"]);
    node.clear_roles();
    assert!(node.roles.is_empty());
}

#[test]
fn titles_fall_back_to_russian() {
    let mut node = StatusNode::new(1, "review", LocalizedTitle::new("Проверка", "Тексеру"));
    assert_eq!(node.title(Language::Kk), "Тексеру");
    assert_eq!(node.title(Language::En), "Проверка");
    node.title.en = Some("Review".to_string());
    assert_eq!(node.title(Language::En), "Review");
    assert_eq!(node.description(Language::Ru), None);
}

#[test]
fn node_validation_requires_titles_and_value() {
    let node = StatusNode::new(1, " ", LocalizedTitle::new("Проверка", "Тексеру"));
    assert!(node.validate().is_err());

    let node = StatusNode::new(1, "review", LocalizedTitle::new("Проверка", ""));
    assert!(node.validate().is_err());

    let node = StatusNode::new(1, "review", LocalizedTitle::new("Проверка", "Тексеру"));
    assert!(node.validate().is_ok());
}

#[test]
fn statuses_share_the_graph_rules() {
    let status = |id: u64| Status {
        category_id: 1,
        node: StatusNode::new(id, format!("s{id}"), LocalizedTitle::new("С", "С")),
    };
    let mut graph = WorkflowGraph::from_nodes(vec![status(10), status(11)]).expect("loads");
    graph.link(10, 11).expect("link");
    assert!(matches!(
        graph.link(11, 10),
        Err(LicensingError::Cycle { .. })
    ));
    assert_eq!(graph.len(), 2);
}

#[test]
fn statuses_from_different_categories_never_link() {
    let mut graph = WorkflowGraph::from_nodes(vec![
        workflow_status(1, 10, "draft"),
        workflow_status(2, 20, "sent"),
    ])
    .expect("loads");

    let error = graph.link(1, 2).expect_err("cross-category link");
    assert!(matches!(error, LicensingError::Validation(_)));
    assert_eq!(graph.position(1).expect("node"), WorkflowPosition::Standalone);
    assert_eq!(graph.position(2).expect("node"), WorkflowPosition::Standalone);
}

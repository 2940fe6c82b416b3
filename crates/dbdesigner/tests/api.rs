//! Integration tests for the public API

use dbdesigner::prelude::*;
use dbdesigner::{build_grid, export};

fn test_port(table: &Table, side: PortSide) -> PortId {
    let column = table.column_by_name("Test").unwrap().id();
    table.port(column, side).unwrap().id()
}

fn id_port(table: &Table, side: PortSide) -> PortId {
    let column = table.primary_column().unwrap().id();
    table.port(column, side).unwrap().id()
}

#[test]
fn test_two_by_two_grid() {
    let (diagram, report) = build_grid(2, 2).unwrap();

    let expected = [
        ("Table_0_0", Point::new(0.0, 0.0)),
        ("Table_0_1", Point::new(400.0, 0.0)),
        ("Table_1_0", Point::new(0.0, 400.0)),
        ("Table_1_1", Point::new(400.0, 400.0)),
    ];
    for (name, position) in expected {
        let table = diagram.table_by_name(name).unwrap();
        assert_eq!(table.position, position, "{}", name);
    }

    assert_eq!(report.links.len(), 2);
    for column in 0..2 {
        let upper = diagram.table(report.table_at(0, column).unwrap()).unwrap();
        let lower = diagram.table(report.table_at(1, column).unwrap()).unwrap();
        let link = diagram
            .links()
            .find(|l| l.source().table == upper.id())
            .unwrap();
        assert_eq!(link.source(), id_port(upper, PortSide::Bottom));
        assert_eq!(link.target(), Some(test_port(lower, PortSide::Top)));
    }
}

#[test]
fn test_grid_links_are_subscribed() {
    let (diagram, report) = build_grid(3, 2).unwrap();
    for link in &report.links {
        assert!(diagram.is_subscribed(*link));
    }
    assert_eq!(diagram.subscription_count(), report.links.len());
}

#[test]
fn test_unattached_link_then_rebind() {
    let mut diagram = Diagram::new();
    let recorder = EventRecorder::new();
    diagram.subscribe(recorder.clone());

    let users = Table::named("Users", Point::ORIGIN);
    let orders = Table::named("Orders", Point::new(0.0, 400.0));
    let source = id_port(&users, PortSide::Bottom);
    let target = test_port(&orders, PortSide::Top);
    diagram.add_node(users);
    diagram.add_node(orders);

    let link = diagram.add_link(diagram.create_link(source)).unwrap();
    assert!(!diagram.link(link).unwrap().is_attached());
    assert!(diagram.link(link).unwrap().labels().is_empty());
    assert!(diagram.link_path(link).is_none());

    recorder.clear();
    diagram.set_link_target(link, Some(target)).unwrap();

    let bound = diagram.link(link).unwrap();
    assert_eq!(bound.target(), Some(target));
    assert_eq!(bound.labels().len(), 1);
    assert_eq!(bound.labels()[0].content, "1..*");
    assert!(diagram.link_path(link).is_some());

    let events = recorder.events();
    assert_eq!(
        events[0],
        DiagramEvent::TargetPortChanged {
            link,
            old: None,
            new: Some(target),
        }
    );
    assert_eq!(recorder.refresh_count(EntityRef::Link(link)), 1);
    assert_eq!(
        recorder.refresh_count(EntityRef::Column {
            table: target.table,
            column: target.column,
        }),
        1
    );
}

#[test]
fn test_removing_table_leaves_no_dangling_links() {
    let (mut diagram, report) = build_grid(3, 2).unwrap();
    let middle = report.table_at(1, 0).unwrap();

    let removed = diagram.remove_node(middle).unwrap();
    assert_eq!(removed.name, "Table_1_0");

    // Only the second column's chain survives
    assert_eq!(diagram.links().count(), 2);
    assert_eq!(diagram.subscription_count(), 2);
    assert!(diagram.links_of(middle).next().is_none());
    let right = [report.table_at(0, 1), report.table_at(1, 1), report.table_at(2, 1)];
    for link in diagram.links() {
        assert!(right.contains(&Some(link.source().table)));
        assert!(diagram.port(link.source()).is_some());
        if let Some(target) = link.target() {
            assert!(diagram.port(target).is_some());
        }
    }
}

#[test]
fn test_removing_bottom_row_keeps_upper_links() {
    let (mut diagram, report) = build_grid(3, 1).unwrap();
    diagram.remove_node(report.table_at(2, 0).unwrap());

    assert_eq!(diagram.links().count(), 1);
    let link = diagram.links().next().unwrap();
    assert!(diagram.port(link.source()).is_some());
    assert!(diagram.port(link.target().unwrap()).is_some());
}

#[test]
fn test_removing_link_refreshes_dependent_table() {
    let (mut diagram, report) = build_grid(2, 1).unwrap();
    let recorder = EventRecorder::new();
    diagram.subscribe(recorder.clone());

    diagram.remove_link(report.links[0]);

    let lower = report.table_at(1, 0).unwrap();
    let upper = report.table_at(0, 0).unwrap();
    assert_eq!(recorder.refresh_count(EntityRef::Table(lower)), 1);
    assert_eq!(recorder.refresh_count(EntityRef::Table(upper)), 0);
}

#[test]
fn test_closure_observer() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let added = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&added);

    let mut diagram = Diagram::new();
    diagram.subscribe(move |event: &DiagramEvent| {
        if matches!(event, DiagramEvent::NodeAdded(_)) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    diagram.add_node(Table::new(Point::ORIGIN));
    diagram.add_node(Table::new(Point::ORIGIN));
    assert_eq!(added.load(Ordering::SeqCst), 2);
}

#[test]
fn test_grid_build_emits_single_refresh() {
    let mut diagram = Diagram::new();
    let recorder = EventRecorder::new();
    diagram.subscribe(recorder.clone());

    GridBuilder::new(3, 3).build(&mut diagram).unwrap();
    assert_eq!(recorder.events(), vec![DiagramEvent::Refreshed]);
}

#[test]
fn test_custom_policy() {
    struct Quiet;

    impl RelationshipPolicy for Quiet {
        fn on_target_port_changed(
            &self,
            _diagram: &Diagram,
            link: LinkId,
            _old: Option<PortId>,
            _new: Option<PortId>,
        ) -> Vec<dbdesigner::PolicyAction> {
            vec![dbdesigner::PolicyAction::SetLabel {
                link,
                label: LinkLabel::new("n..m"),
            }]
        }

        fn on_link_removed(&self, _diagram: &Diagram, _link: &Link) -> Vec<dbdesigner::PolicyAction> {
            Vec::new()
        }
    }

    let mut diagram = Diagram::new();
    diagram.set_policy(Quiet);
    let a = Table::new(Point::ORIGIN);
    let b = Table::new(Point::new(0.0, 400.0));
    let source = id_port(&a, PortSide::Bottom);
    let target = test_port(&b, PortSide::Top);
    diagram.add_node(a);
    diagram.add_node(b);

    let link = diagram.add_link(Link::new(source)).unwrap();
    diagram.set_link_target(link, Some(target)).unwrap();
    assert_eq!(diagram.link(link).unwrap().labels()[0].content, "n..m");
}

#[test]
fn test_link_into_removed_table_is_rejected() {
    let (mut diagram, report) = build_grid(2, 1).unwrap();
    let upper = diagram.table(report.table_at(0, 0).unwrap()).unwrap();
    let source = id_port(upper, PortSide::Bottom);
    let lower = diagram.remove_node(report.table_at(1, 0).unwrap()).unwrap();

    let err = diagram
        .add_link(Link::between(source, test_port(&lower, PortSide::Top)))
        .unwrap_err();
    assert!(matches!(err, DesignerError::UnknownPort { .. }));
    assert_eq!(diagram.links().count(), 0);
}

#[test]
fn test_export_round_numbers() {
    let (diagram, _) = build_grid(2, 1).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&export::to_json(&diagram, false).unwrap()).unwrap();

    // The bottom port of the upper "Id" row sits on the right edge
    let path = value["links"][0]["path"].as_str().unwrap();
    assert!(path.starts_with("M 200 55 C"), "{}", path);
    assert!(path.ends_with("0 485"), "{}", path);
}

//! The diagram: owner of all tables and links
//!
//! Tables and links live in flat maps keyed by their ids, with a separate
//! order vector so iteration follows insertion order. Every mutation goes
//! through the methods here, which keep three things in step:
//!
//! - the per-link subscription table (one entry per link in the diagram),
//! - the relationship policy reactions,
//! - the notifications delivered to observers (held back while refresh is
//!   suspended, then coalesced into a single [`DiagramEvent::Refreshed`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::{debug, info, trace};

use super::geometry;
use super::{
    CardinalityLabelPolicy, Column, ColumnId, DesignerError, DiagramEvent, DiagramObserver,
    EntityRef, GraphStore, Link, LinkId, ObserverId, PathStyle, Point, PolicyAction, Port, PortId,
    RelationshipPolicy, Table, TableId,
};

/// Options applied to links created through [`Diagram::create_link`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    pub path_style: PathStyle,
}

/// Diagram configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramOptions {
    /// Positions passed to [`Diagram::move_node`] snap to this grid
    pub grid_size: Option<f64>,
    pub links: LinkOptions,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            grid_size: Some(40.0),
            links: LinkOptions::default(),
        }
    }
}

/// Handle of the target-port listener attached to a link in the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Graph container for one editing session
pub struct Diagram {
    options: DiagramOptions,
    tables: HashMap<TableId, Table>,
    table_order: Vec<TableId>,
    links: HashMap<LinkId, Link>,
    link_order: Vec<LinkId>,
    subscriptions: HashMap<LinkId, SubscriptionId>,
    next_subscription: u64,
    observers: Vec<(ObserverId, Box<dyn DiagramObserver>)>,
    next_observer: u64,
    policy: Option<Box<dyn RelationshipPolicy>>,
    suspend_depth: usize,
    suppressed: usize,
}

impl Diagram {
    /// Create an empty diagram with the cardinality label policy installed
    pub fn new() -> Self {
        Self::with_options(DiagramOptions::default())
    }

    pub fn with_options(options: DiagramOptions) -> Self {
        Self {
            options,
            tables: HashMap::new(),
            table_order: Vec::new(),
            links: HashMap::new(),
            link_order: Vec::new(),
            subscriptions: HashMap::new(),
            next_subscription: 0,
            observers: Vec::new(),
            next_observer: 0,
            policy: Some(Box::new(CardinalityLabelPolicy)),
            suspend_depth: 0,
            suppressed: 0,
        }
    }

    /// Create an empty diagram that does not react to link changes
    pub fn without_policy() -> Self {
        let mut diagram = Self::new();
        diagram.policy = None;
        diagram
    }

    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    pub fn set_policy(&mut self, policy: impl RelationshipPolicy + 'static) {
        self.policy = Some(Box::new(policy));
    }

    pub fn clear_policy(&mut self) {
        self.policy = None;
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    /// Register an observer for change notifications
    pub fn subscribe(&mut self, observer: impl DiagramObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        trace!(observer = id.0, "Observer subscribed");
        id
    }

    /// Remove an observer; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    fn emit(&mut self, event: DiagramEvent) {
        if self.suspend_depth > 0 {
            self.suppressed += 1;
            return;
        }
        for (_, observer) in &mut self.observers {
            observer.notify(&event);
        }
    }

    /// Ask the rendering layer to redraw an entity
    pub fn refresh(&mut self, entity: EntityRef) {
        self.emit(DiagramEvent::RefreshRequested(entity));
    }

    // ---------------------------------------------------------------------
    // Refresh suspension
    // ---------------------------------------------------------------------

    /// Hold back notifications until the returned guard is dropped.
    ///
    /// Guards nest; only the outermost one delivers the coalesced
    /// [`DiagramEvent::Refreshed`].
    pub fn suspend_refresh(&mut self) -> SuspendGuard<'_> {
        self.suspend_depth += 1;
        trace!(depth = self.suspend_depth, "Refresh suspended");
        SuspendGuard { diagram: self }
    }

    /// Run `f` with refresh suspended
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Diagram) -> R) -> R {
        let mut guard = self.suspend_refresh();
        f(&mut *guard)
    }

    pub fn is_refresh_suspended(&self) -> bool {
        self.suspend_depth > 0
    }

    fn resume_refresh(&mut self) {
        self.suspend_depth = self.suspend_depth.saturating_sub(1);
        if self.suspend_depth > 0 {
            return;
        }
        let suppressed = std::mem::take(&mut self.suppressed);
        if suppressed > 0 {
            info!(
                suppressed,
                tables = self.tables.len(),
                links = self.links.len(),
                "Refresh resumed"
            );
            self.emit(DiagramEvent::Refreshed);
        }
    }

    // ---------------------------------------------------------------------
    // Tables
    // ---------------------------------------------------------------------

    /// Add a table; adding a table that is already present does nothing
    pub fn add_node(&mut self, table: Table) -> TableId {
        let id = table.id();
        if self.tables.contains_key(&id) {
            trace!(table = %id, "Table already in diagram");
            return id;
        }
        trace!(table = %id, name = %table.name, position = %table.position, "Adding table");
        self.tables.insert(id, table);
        self.table_order.push(id);
        self.emit(DiagramEvent::NodeAdded(id));
        debug!(table_count = self.tables.len(), "Table added");
        id
    }

    /// Remove a table and every link attached to one of its ports
    pub fn remove_node(&mut self, id: TableId) -> Option<Table> {
        if !self.tables.contains_key(&id) {
            return None;
        }
        let attached: Vec<LinkId> = self.links_of(id).map(Link::id).collect();
        for link in attached {
            self.remove_link(link);
        }

        self.table_order.retain(|t| *t != id);
        let table = self.tables.remove(&id)?;
        self.emit(DiagramEvent::NodeRemoved(id));
        debug!(table = %id, table_count = self.tables.len(), "Table removed");
        Some(table)
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    /// Mutable access to a table.
    ///
    /// Columns can be added and edited through this handle. Removing one goes
    /// through [`Diagram::remove_column`] so its links are detached first.
    pub fn table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.get_mut(&id)
    }

    /// Mutable access to one column of a table
    pub fn column_mut(&mut self, table: TableId, column: ColumnId) -> Option<&mut Column> {
        self.tables.get_mut(&table)?.column_mut(column)
    }

    /// First table with the given name, in insertion order
    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables().find(|t| t.name == name)
    }

    /// Tables in insertion order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.table_order.iter().filter_map(|id| self.tables.get(id))
    }

    /// Move a table, snapping to the configured grid; returns the final position
    pub fn move_node(&mut self, id: TableId, position: Point) -> Result<Point, DesignerError> {
        let snapped = match self.options.grid_size {
            Some(size) => position.snap(size),
            None => position,
        };
        let table = self
            .tables
            .get_mut(&id)
            .ok_or(DesignerError::UnknownTable { id })?;
        table.position = snapped;
        trace!(table = %id, position = %snapped, "Table moved");
        self.refresh(EntityRef::Table(id));
        Ok(snapped)
    }

    /// Remove a column from a table, detaching links on its ports first
    pub fn remove_column(&mut self, table: TableId, column: ColumnId) -> Option<Column> {
        self.tables.get(&table)?.column(column)?;
        let attached: Vec<LinkId> = self
            .links()
            .filter(|l| {
                [Some(l.source()), l.target()]
                    .into_iter()
                    .flatten()
                    .any(|p| p.table == table && p.column == column)
            })
            .map(Link::id)
            .collect();
        for link in attached {
            self.remove_link(link);
        }

        let removed = self.tables.get_mut(&table)?.remove_column(column)?;
        self.refresh(EntityRef::Table(table));
        Some(removed)
    }

    // ---------------------------------------------------------------------
    // Ports
    // ---------------------------------------------------------------------

    /// Resolve a port id against the tables in the diagram
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.tables.get(&id.table)?.port(id.column, id.side)
    }

    /// Column bound to a port
    pub fn column_of(&self, id: PortId) -> Option<&Column> {
        let table = self.tables.get(&id.table)?;
        table.port(id.column, id.side)?;
        table.column(id.column)
    }

    /// Canvas position of a port
    pub fn port_anchor(&self, id: PortId) -> Option<Point> {
        geometry::port_anchor(self.tables.get(&id.table)?, id.column, id.side)
    }

    // ---------------------------------------------------------------------
    // Links
    // ---------------------------------------------------------------------

    /// An unattached link from `source`, styled by the diagram options
    pub fn create_link(&self, source: PortId) -> Link {
        Link::new(source).with_path_style(self.options.links.path_style)
    }

    /// Add a link and start listening to its target port.
    ///
    /// Both ends must resolve to ports of tables in the diagram. Adding a
    /// link that is already present does nothing.
    pub fn add_link(&mut self, link: Link) -> Result<LinkId, DesignerError> {
        let id = link.id();
        if self.links.contains_key(&id) {
            trace!(link = %id, "Link already in diagram");
            return Ok(id);
        }
        for port in [Some(link.source()), link.target()].into_iter().flatten() {
            if self.port(port).is_none() {
                return Err(DesignerError::UnknownPort { port });
            }
        }
        trace!(
            link = %id,
            source = %link.source(),
            target = ?link.target(),
            "Adding link"
        );
        self.links.insert(id, link);
        self.link_order.push(id);

        let subscription = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(id, subscription);

        self.emit(DiagramEvent::LinkAdded(id));
        debug!(link_count = self.links.len(), "Link added");
        Ok(id)
    }

    /// Remove a link, release its listener and let the policy react
    pub fn remove_link(&mut self, id: LinkId) -> Option<Link> {
        let link = self.links.remove(&id)?;
        self.link_order.retain(|l| *l != id);
        if let Some(subscription) = self.subscriptions.remove(&id) {
            trace!(link = %id, subscription = subscription.0, "Listener released");
        }
        self.emit(DiagramEvent::LinkRemoved(id));

        let actions = match &self.policy {
            Some(policy) => policy.on_link_removed(self, &link),
            None => Vec::new(),
        };
        self.apply(actions);

        debug!(link_count = self.links.len(), "Link removed");
        Some(link)
    }

    /// Rebind the target port of a link in the diagram.
    ///
    /// Returns the previous target. Notifications and policy reactions only
    /// happen when the target actually changes.
    pub fn set_link_target(
        &mut self,
        id: LinkId,
        target: Option<PortId>,
    ) -> Result<Option<PortId>, DesignerError> {
        if let Some(port) = target {
            if self.port(port).is_none() {
                return Err(DesignerError::UnknownPort { port });
            }
        }
        let link = self
            .links
            .get_mut(&id)
            .ok_or(DesignerError::UnknownLink { id })?;
        let old = link.set_target(target);
        if old == target {
            return Ok(old);
        }
        trace!(link = %id, old = ?old, new = ?target, "Target port changed");

        self.emit(DiagramEvent::TargetPortChanged {
            link: id,
            old,
            new: target,
        });
        let actions = match &self.policy {
            Some(policy) => policy.on_target_port_changed(self, id, old, target),
            None => Vec::new(),
        };
        self.apply(actions);
        Ok(old)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    /// Links in insertion order
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.link_order.iter().filter_map(|id| self.links.get(id))
    }

    /// Links with at least one end on a port of `table`
    pub fn links_of(&self, table: TableId) -> impl Iterator<Item = &Link> {
        self.links().filter(move |l| {
            l.source().table == table || l.target().is_some_and(|p| p.table == table)
        })
    }

    /// Links with an end on exactly this port
    pub fn links_at(&self, port: PortId) -> impl Iterator<Item = &Link> {
        self.links().filter(move |l| l.touches(port))
    }

    /// True while the link's target-port listener is registered
    pub fn is_subscribed(&self, link: LinkId) -> bool {
        self.subscriptions.contains_key(&link)
    }

    /// Number of live link listeners
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// SVG path for a link, if both ends resolve
    pub fn link_path(&self, id: LinkId) -> Option<String> {
        let link = self.links.get(&id)?;
        let source = link.source();
        let target = link.target()?;
        Some(geometry::link_path(
            link.path_style,
            self.port_anchor(source)?,
            source.side,
            self.port_anchor(target)?,
            target.side,
        ))
    }

    fn apply(&mut self, actions: Vec<PolicyAction>) {
        for action in actions {
            match action {
                PolicyAction::SetLabel { link, label } => {
                    if let Some(link) = self.links.get_mut(&link) {
                        link.replace_label(label);
                    }
                }
                PolicyAction::RemoveLabel { link, content } => {
                    if let Some(link) = self.links.get_mut(&link) {
                        link.remove_labels(&content);
                    }
                }
                PolicyAction::Refresh(entity) => self.refresh(entity),
            }
        }
    }

    /// Remove every link and table
    pub fn clear(&mut self) {
        self.batch(|diagram| {
            let links: Vec<LinkId> = diagram.link_order.clone();
            for link in links {
                diagram.remove_link(link);
            }
            let tables: Vec<TableId> = diagram.table_order.clone();
            for table in tables {
                diagram.remove_node(table);
            }
        });
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagram")
            .field("options", &self.options)
            .field("tables", &self.tables.len())
            .field("links", &self.links.len())
            .field("subscriptions", &self.subscriptions.len())
            .field("observers", &self.observers.len())
            .field("has_policy", &self.policy.is_some())
            .field("suspend_depth", &self.suspend_depth)
            .finish()
    }
}

impl GraphStore for Diagram {
    type Node = Table;
    type Edge = Link;
    type NodeId = TableId;
    type EdgeId = LinkId;
    type Error = DesignerError;

    fn add_node(&mut self, node: Table) -> TableId {
        Diagram::add_node(self, node)
    }

    fn remove_node(&mut self, id: TableId) -> Option<Table> {
        Diagram::remove_node(self, id)
    }

    fn add_edge(&mut self, edge: Link) -> Result<LinkId, DesignerError> {
        self.add_link(edge)
    }

    fn remove_edge(&mut self, id: LinkId) -> Option<Link> {
        self.remove_link(id)
    }

    fn get_node(&self, id: TableId) -> Option<&Table> {
        self.table(id)
    }

    fn get_edge(&self, id: LinkId) -> Option<&Link> {
        self.link(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Table> {
        self.tables()
    }

    fn edges(&self) -> impl Iterator<Item = &Link> {
        self.links()
    }

    fn clear(&mut self) {
        Diagram::clear(self)
    }

    fn node_count(&self) -> usize {
        self.tables.len()
    }

    fn edge_count(&self) -> usize {
        self.links.len()
    }
}

/// Keeps refresh suspended until dropped; derefs to the diagram
pub struct SuspendGuard<'a> {
    diagram: &'a mut Diagram,
}

impl Deref for SuspendGuard<'_> {
    type Target = Diagram;

    fn deref(&self) -> &Diagram {
        &*self.diagram
    }
}

impl DerefMut for SuspendGuard<'_> {
    fn deref_mut(&mut self) -> &mut Diagram {
        &mut *self.diagram
    }
}

impl Drop for SuspendGuard<'_> {
    fn drop(&mut self) {
        self.diagram.resume_refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnType, EventRecorder, LinkLabel, PortSide};

    fn linked_pair(diagram: &mut Diagram) -> (TableId, TableId, PortId, PortId) {
        let a = Table::named("A", Point::ORIGIN);
        let b = Table::named("B", Point::new(0.0, 400.0));
        let source = a
            .port(a.primary_column().unwrap().id(), PortSide::Bottom)
            .unwrap()
            .id();
        let target = b
            .port(b.column_by_name("Test").unwrap().id(), PortSide::Top)
            .unwrap()
            .id();
        let a = diagram.add_node(a);
        let b = diagram.add_node(b);
        (a, b, source, target)
    }

    #[test]
    fn test_add_and_remove_nodes() {
        let mut diagram = Diagram::new();
        let a = diagram.add_node(Table::named("A", Point::ORIGIN));
        let b = diagram.add_node(Table::named("B", Point::ORIGIN));

        let names: Vec<_> = diagram.tables().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        assert_eq!(diagram.remove_node(a).unwrap().name, "A");
        assert!(diagram.remove_node(a).is_none());
        assert!(diagram.table(b).is_some());
        assert_eq!(diagram.node_count(), 1);
    }

    #[test]
    fn test_add_node_twice_is_noop() {
        let mut diagram = Diagram::new();
        let table = Table::new(Point::ORIGIN);
        diagram.add_node(table.clone());
        diagram.add_node(table);
        assert_eq!(diagram.tables().count(), 1);
    }

    #[test]
    fn test_link_events_reach_observer() {
        let mut diagram = Diagram::new();
        let recorder = EventRecorder::new();
        diagram.subscribe(recorder.clone());

        let (_, _, source, target) = linked_pair(&mut diagram);
        let link = diagram.add_link(Link::between(source, target)).unwrap();
        diagram.remove_link(link);

        let events = recorder.events();
        assert!(events.contains(&DiagramEvent::LinkAdded(link)));
        assert!(events.contains(&DiagramEvent::LinkRemoved(link)));
    }

    #[test]
    fn test_subscription_follows_link_membership() {
        let mut diagram = Diagram::new();
        let (_, _, source, _) = linked_pair(&mut diagram);
        let link = diagram.add_link(Link::new(source)).unwrap();

        assert!(diagram.is_subscribed(link));
        assert_eq!(diagram.subscription_count(), 1);

        diagram.remove_link(link);
        assert!(!diagram.is_subscribed(link));
        assert_eq!(diagram.subscription_count(), 0);
    }

    #[test]
    fn test_rebinding_target_labels_link() {
        let mut diagram = Diagram::new();
        let (_, _, source, target) = linked_pair(&mut diagram);
        let link = diagram.add_link(diagram.create_link(source)).unwrap();

        assert!(!diagram.link(link).unwrap().is_attached());
        assert!(diagram.link(link).unwrap().labels().is_empty());

        assert_eq!(diagram.set_link_target(link, Some(target)).unwrap(), None);
        let bound = diagram.link(link).unwrap();
        assert!(bound.is_attached());
        assert_eq!(bound.labels().len(), 1);
        assert_eq!(bound.labels()[0].content, "1..*");
    }

    #[test]
    fn test_repeated_rebinding_keeps_single_label() {
        let mut diagram = Diagram::new();
        let (_, b, source, target) = linked_pair(&mut diagram);
        let other = {
            let table = diagram.table(b).unwrap();
            table
                .port(table.primary_column().unwrap().id(), PortSide::Top)
                .unwrap()
                .id()
        };
        let link = diagram.add_link(Link::new(source)).unwrap();

        diagram.set_link_target(link, Some(target)).unwrap();
        diagram.set_link_target(link, Some(other)).unwrap();
        assert_eq!(diagram.link(link).unwrap().labels().len(), 1);

        diagram.set_link_target(link, None).unwrap();
        assert!(diagram.link(link).unwrap().labels().is_empty());
    }

    #[test]
    fn test_same_target_does_not_fire() {
        let mut diagram = Diagram::new();
        let recorder = EventRecorder::new();
        let (_, _, source, target) = linked_pair(&mut diagram);
        let link = diagram.add_link(Link::between(source, target)).unwrap();
        diagram.subscribe(recorder.clone());

        diagram.set_link_target(link, Some(target)).unwrap();
        assert!(recorder.is_empty());
        assert!(diagram.link(link).unwrap().labels().is_empty());
    }

    #[test]
    fn test_rebind_refreshes_new_column() {
        let mut diagram = Diagram::new();
        let recorder = EventRecorder::new();
        diagram.subscribe(recorder.clone());
        let (_, _, source, target) = linked_pair(&mut diagram);
        let link = diagram.add_link(Link::new(source)).unwrap();

        diagram.set_link_target(link, Some(target)).unwrap();
        assert_eq!(
            recorder.refresh_count(EntityRef::Column {
                table: target.table,
                column: target.column,
            }),
            1
        );
    }

    #[test]
    fn test_set_link_target_errors() {
        let mut diagram = Diagram::new();
        let (_, _, source, target) = linked_pair(&mut diagram);
        let stray = Link::new(source);
        assert!(matches!(
            diagram.set_link_target(stray.id(), Some(target)),
            Err(DesignerError::UnknownLink { .. })
        ));

        let link = diagram.add_link(Link::new(source)).unwrap();
        let ghost = Table::new(Point::ORIGIN);
        let ghost_port = ghost.ports()[0].id();
        assert!(matches!(
            diagram.set_link_target(link, Some(ghost_port)),
            Err(DesignerError::UnknownPort { .. })
        ));
        assert!(!diagram.link(link).unwrap().is_attached());
    }

    #[test]
    fn test_remove_attached_link_keeps_ports() {
        let mut diagram = Diagram::new();
        let recorder = EventRecorder::new();
        diagram.subscribe(recorder.clone());
        let (_, b, source, target) = linked_pair(&mut diagram);
        let link = diagram.add_link(Link::between(source, target)).unwrap();

        let removed = diagram.remove_link(link).unwrap();
        assert_eq!(removed.source(), source);
        assert!(diagram.port(source).is_some());
        assert!(diagram.port(target).is_some());
        assert_eq!(diagram.links().count(), 0);
        assert_eq!(recorder.refresh_count(EntityRef::Table(b)), 1);
    }

    #[test]
    fn test_remove_node_cascades_links() {
        let mut diagram = Diagram::new();
        let (a, b, source, target) = linked_pair(&mut diagram);
        let link = diagram.add_link(Link::between(source, target)).unwrap();
        let dangling = diagram.add_link(Link::new(target)).unwrap();

        diagram.remove_node(b);
        assert!(diagram.link(link).is_none());
        assert!(diagram.link(dangling).is_none());
        assert_eq!(diagram.subscription_count(), 0);
        assert!(diagram.links_of(b).next().is_none());
        assert!(diagram.table(a).is_some());
    }

    #[test]
    fn test_add_link_rejects_unresolved_ports() {
        let mut diagram = Diagram::new();
        let recorder = EventRecorder::new();
        let (_, b, source, target) = linked_pair(&mut diagram);
        diagram.remove_node(b);
        diagram.subscribe(recorder.clone());

        let stale = Link::between(source, target);
        let stale_id = stale.id();
        assert!(matches!(
            diagram.add_link(stale),
            Err(DesignerError::UnknownPort { port }) if port == target
        ));

        let ghost = Table::new(Point::ORIGIN);
        let ghost_source = ghost.ports()[1].id();
        assert!(matches!(
            diagram.add_link(Link::new(ghost_source)),
            Err(DesignerError::UnknownPort { .. })
        ));

        assert!(diagram.link(stale_id).is_none());
        assert!(diagram.links_of(b).next().is_none());
        assert_eq!(diagram.subscription_count(), 0);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_column_edits_keep_links_resolving() {
        let mut diagram = Diagram::new();
        let (_, b, source, target) = linked_pair(&mut diagram);
        let link = diagram.add_link(Link::between(source, target)).unwrap();

        diagram.column_mut(b, target.column).unwrap().name = "OrderId".into();
        diagram
            .table_mut(b)
            .unwrap()
            .add_column(Column::new("Note", ColumnType::Text));

        let bound = diagram.link(link).unwrap();
        assert!(diagram.port(bound.target().unwrap()).is_some());
        assert_eq!(diagram.column_of(target).unwrap().name, "OrderId");
        assert!(diagram.column_mut(b, ColumnId::next()).is_none());
    }

    #[test]
    fn test_rebind_keeps_user_labels() {
        let mut diagram = Diagram::new();
        let (_, b, source, target) = linked_pair(&mut diagram);
        let other = {
            let table = diagram.table(b).unwrap();
            table
                .port(table.primary_column().unwrap().id(), PortSide::Top)
                .unwrap()
                .id()
        };
        let mut link = Link::new(source);
        link.add_label(LinkLabel::new("places"));
        let link = diagram.add_link(link).unwrap();

        diagram.set_link_target(link, Some(target)).unwrap();
        diagram.set_link_target(link, Some(other)).unwrap();
        let contents: Vec<_> = diagram
            .link(link)
            .unwrap()
            .labels()
            .iter()
            .map(|l| l.content.clone())
            .collect();
        assert_eq!(contents, vec!["places", "1..*"]);

        diagram.set_link_target(link, None).unwrap();
        let labels = diagram.link(link).unwrap().labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].content, "places");
    }

    #[test]
    fn test_remove_column_cascades_links() {
        let mut diagram = Diagram::new();
        let (_, b, source, target) = linked_pair(&mut diagram);
        let link = diagram.add_link(Link::between(source, target)).unwrap();

        let removed = diagram.remove_column(b, target.column).unwrap();
        assert_eq!(removed.name, "Test");
        assert!(diagram.link(link).is_none());
        assert!(diagram.port(target).is_none());
        assert!(diagram.remove_column(b, target.column).is_none());
    }

    #[test]
    fn test_suspend_coalesces_notifications() {
        let mut diagram = Diagram::new();
        let recorder = EventRecorder::new();
        diagram.subscribe(recorder.clone());

        {
            let mut guard = diagram.suspend_refresh();
            for i in 0..5 {
                guard.add_node(Table::named(format!("T{}", i), Point::ORIGIN));
            }
            assert!(guard.is_refresh_suspended());
            assert!(recorder.is_empty());
        }

        assert!(!diagram.is_refresh_suspended());
        assert_eq!(recorder.events(), vec![DiagramEvent::Refreshed]);
    }

    #[test]
    fn test_nested_suspension() {
        let mut diagram = Diagram::new();
        let recorder = EventRecorder::new();
        diagram.subscribe(recorder.clone());

        diagram.batch(|outer| {
            outer.batch(|inner| {
                inner.add_node(Table::new(Point::ORIGIN));
            });
            assert!(outer.is_refresh_suspended());
        });
        assert_eq!(recorder.events(), vec![DiagramEvent::Refreshed]);
    }

    #[test]
    fn test_empty_suspension_is_silent() {
        let mut diagram = Diagram::new();
        let recorder = EventRecorder::new();
        diagram.subscribe(recorder.clone());
        diagram.batch(|_| {});
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_policy_runs_while_suspended() {
        let mut diagram = Diagram::new();
        let (_, _, source, target) = linked_pair(&mut diagram);
        let link = diagram.batch(|d| {
            let link = d.add_link(Link::new(source)).unwrap();
            d.set_link_target(link, Some(target)).unwrap();
            link
        });
        assert_eq!(diagram.link(link).unwrap().labels().len(), 1);
    }

    #[test]
    fn test_without_policy_no_labels() {
        let mut diagram = Diagram::without_policy();
        let (_, _, source, target) = linked_pair(&mut diagram);
        let link = diagram.add_link(Link::new(source)).unwrap();
        diagram.set_link_target(link, Some(target)).unwrap();
        assert!(diagram.link(link).unwrap().labels().is_empty());
    }

    #[test]
    fn test_unsubscribe_observer() {
        let mut diagram = Diagram::new();
        let recorder = EventRecorder::new();
        let id = diagram.subscribe(recorder.clone());
        assert!(diagram.unsubscribe(id));
        assert!(!diagram.unsubscribe(id));

        diagram.add_node(Table::new(Point::ORIGIN));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_move_node_snaps_to_grid() {
        let mut diagram = Diagram::new();
        let id = diagram.add_node(Table::new(Point::ORIGIN));
        let position = diagram.move_node(id, Point::new(55.0, 118.0)).unwrap();
        assert_eq!(position, Point::new(40.0, 120.0));
        assert_eq!(diagram.table(id).unwrap().position, position);

        let mut free = Diagram::with_options(DiagramOptions {
            grid_size: None,
            ..Default::default()
        });
        let id = free.add_node(Table::new(Point::ORIGIN));
        assert_eq!(
            free.move_node(id, Point::new(55.0, 118.0)).unwrap(),
            Point::new(55.0, 118.0)
        );

        assert!(matches!(
            free.move_node(TableId::next(), Point::ORIGIN),
            Err(DesignerError::UnknownTable { .. })
        ));
    }

    #[test]
    fn test_link_path_requires_both_ends() {
        let mut diagram = Diagram::new();
        let (_, _, source, target) = linked_pair(&mut diagram);
        let pending = diagram.add_link(Link::new(source)).unwrap();
        let bound = diagram.add_link(Link::between(source, target)).unwrap();

        assert!(diagram.link_path(pending).is_none());
        let path = diagram.link_path(bound).unwrap();
        assert!(path.starts_with("M 200 55 C"));
    }

    #[test]
    fn test_clear() {
        let mut diagram = Diagram::new();
        let (_, _, source, target) = linked_pair(&mut diagram);
        diagram.add_link(Link::between(source, target)).unwrap();

        diagram.clear();
        assert_eq!(diagram.node_count(), 0);
        assert_eq!(diagram.edge_count(), 0);
        assert_eq!(diagram.subscription_count(), 0);
        assert!(!diagram.is_refresh_suspended());
    }
}

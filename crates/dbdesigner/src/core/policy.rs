//! Relationship label policy
//!
//! Reacts to link rebinding and removal. A policy only reads the diagram and
//! answers with [`PolicyAction`]s; the diagram applies them, which keeps the
//! borrow of the link collection in one place.

use tracing::trace;

use super::{Diagram, EntityRef, Link, LinkId, LinkLabel, PortId, CARDINALITY_LABEL};

/// A change requested by a policy
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyAction {
    /// Add this label, replacing any label with the same content
    SetLabel { link: LinkId, label: LinkLabel },
    /// Drop every label with the given content
    RemoveLabel { link: LinkId, content: String },
    Refresh(EntityRef),
}

/// Reactive logic attached to every link in a diagram
pub trait RelationshipPolicy: Send + Sync {
    /// The target port of `link` went from `old` to `new`
    fn on_target_port_changed(
        &self,
        diagram: &Diagram,
        link: LinkId,
        old: Option<PortId>,
        new: Option<PortId>,
    ) -> Vec<PolicyAction>;

    /// `link` has just left the diagram's link collection
    fn on_link_removed(&self, diagram: &Diagram, link: &Link) -> Vec<PolicyAction>;
}

/// Labels attached links with "1..*" and refreshes the dependent side.
///
/// Cells and ports that cannot be resolved are skipped without error.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardinalityLabelPolicy;

impl CardinalityLabelPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl RelationshipPolicy for CardinalityLabelPolicy {
    fn on_target_port_changed(
        &self,
        diagram: &Diagram,
        link: LinkId,
        old: Option<PortId>,
        new: Option<PortId>,
    ) -> Vec<PolicyAction> {
        let mut actions = Vec::with_capacity(3);

        if new.is_some() {
            actions.push(PolicyAction::SetLabel {
                link,
                label: LinkLabel::cardinality(),
            });
        } else {
            actions.push(PolicyAction::RemoveLabel {
                link,
                content: CARDINALITY_LABEL.to_string(),
            });
        }
        actions.push(PolicyAction::Refresh(EntityRef::Link(link)));

        if let Some(port) = new.or(old) {
            if diagram.column_of(port).is_some() {
                actions.push(PolicyAction::Refresh(EntityRef::Column {
                    table: port.table,
                    column: port.column,
                }));
            } else {
                trace!(link = %link, port = %port, "Port no longer resolves, skipping column refresh");
            }
        }

        actions
    }

    fn on_link_removed(&self, diagram: &Diagram, link: &Link) -> Vec<PolicyAction> {
        let Some(target) = link.target() else {
            return Vec::new();
        };
        let source = link.source();

        let (Some(source_col), Some(_)) = (diagram.column_of(source), diagram.column_of(target))
        else {
            trace!(link = %link.id(), "Endpoint column missing, skipping refresh");
            return Vec::new();
        };

        // The primary side is assumed stable; refresh the dependent table
        let dependent = if source_col.primary { target } else { source };
        vec![PolicyAction::Refresh(EntityRef::Table(dependent.table))]
    }
}

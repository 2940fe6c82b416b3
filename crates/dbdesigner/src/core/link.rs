//! Links between column ports

use serde::Serialize;

use super::{LinkId, PathStyle, Point, PortId};

/// Text shown for the "one to many" relationship cardinality
pub const CARDINALITY_LABEL: &str = "1..*";

/// A text label drawn along a link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkLabel {
    pub content: String,
    /// Distance along the path from the source; negative values count from the target
    pub distance: Option<f64>,
    pub offset: Point,
}

impl LinkLabel {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            distance: None,
            offset: Point::ORIGIN,
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    /// The "1..*" label placed near the target end, above the path
    pub fn cardinality() -> Self {
        Self::new(CARDINALITY_LABEL)
            .with_distance(-40.0)
            .with_offset(Point::new(0.0, -30.0))
    }
}

/// A directed edge from a source port to an optional target port
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    id: LinkId,
    source: PortId,
    target: Option<PortId>,
    labels: Vec<LinkLabel>,
    pub path_style: PathStyle,
}

impl Link {
    /// A link that is still being dragged: source bound, target pending
    pub fn new(source: PortId) -> Self {
        Self {
            id: LinkId::next(),
            source,
            target: None,
            labels: Vec::new(),
            path_style: PathStyle::default(),
        }
    }

    /// A link attached at both ends
    pub fn between(source: PortId, target: PortId) -> Self {
        Self::new(source).with_target(target)
    }

    /// Bind the target port of a link that is not in a diagram yet
    pub fn with_target(mut self, target: PortId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_path_style(mut self, style: PathStyle) -> Self {
        self.path_style = style;
        self
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn source(&self) -> PortId {
        self.source
    }

    pub fn target(&self) -> Option<PortId> {
        self.target
    }

    /// Both ports are bound
    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    pub fn labels(&self) -> &[LinkLabel] {
        &self.labels
    }

    /// True if either end sits on the given port
    pub fn touches(&self, port: PortId) -> bool {
        self.source == port || self.target == Some(port)
    }

    /// Rebind the target port, returning the previous one.
    ///
    /// This does not notify anyone; links that live in a diagram are rebound
    /// through `Diagram::set_link_target`.
    pub fn set_target(&mut self, target: Option<PortId>) -> Option<PortId> {
        std::mem::replace(&mut self.target, target)
    }

    pub fn add_label(&mut self, label: LinkLabel) {
        self.labels.push(label);
    }

    /// Add `label`, dropping any existing label with the same content first
    pub fn replace_label(&mut self, label: LinkLabel) {
        self.remove_labels(&label.content);
        self.labels.push(label);
    }

    /// Drop labels with the given content; returns how many were removed
    pub fn remove_labels(&mut self, content: &str) -> usize {
        let before = self.labels.len();
        self.labels.retain(|l| l.content != content);
        before - self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Point, PortSide, Table};

    fn two_ports() -> (PortId, PortId) {
        let a = Table::new(Point::ORIGIN);
        let b = Table::new(Point::ORIGIN);
        let pa = a.ports()[1].id();
        let pb = b.ports()[0].id();
        (pa, pb)
    }

    #[test]
    fn test_new_link_is_unattached() {
        let (source, _) = two_ports();
        let link = Link::new(source);
        assert!(!link.is_attached());
        assert!(link.labels().is_empty());
        assert_eq!(link.path_style, PathStyle::Smooth);
    }

    #[test]
    fn test_set_target_returns_previous() {
        let (source, target) = two_ports();
        let mut link = Link::new(source);
        assert_eq!(link.set_target(Some(target)), None);
        assert!(link.is_attached());
        assert_eq!(link.set_target(None), Some(target));
        assert!(!link.is_attached());
    }

    #[test]
    fn test_touches() {
        let (source, target) = two_ports();
        let link = Link::between(source, target);
        assert!(link.touches(source));
        assert!(link.touches(target));
        assert!(!link.touches(PortId::new(source.table, source.column, PortSide::Top)));
    }

    #[test]
    fn test_replace_label_keeps_other_labels() {
        let (source, _) = two_ports();
        let mut link = Link::new(source);
        link.add_label(LinkLabel::new("orders"));
        link.replace_label(LinkLabel::cardinality());
        link.replace_label(LinkLabel::cardinality());

        let contents: Vec<_> = link.labels().iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, vec!["orders", "1..*"]);

        assert_eq!(link.remove_labels(CARDINALITY_LABEL), 1);
        assert_eq!(link.labels().len(), 1);
        assert_eq!(link.remove_labels(CARDINALITY_LABEL), 0);
    }

    #[test]
    fn test_cardinality_label() {
        let label = LinkLabel::cardinality();
        assert_eq!(label.content, "1..*");
        assert_eq!(label.distance, Some(-40.0));
        assert_eq!(label.offset, Point::new(0.0, -30.0));
    }
}

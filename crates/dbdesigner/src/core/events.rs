//! Change notifications delivered to the rendering layer

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::{ColumnId, LinkId, PortId, TableId};

/// An entity that can be asked to re-render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityRef {
    Table(TableId),
    Column { table: TableId, column: ColumnId },
    Link(LinkId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Table(id) => write!(f, "{}", id),
            EntityRef::Column { table, column } => write!(f, "{}/{}", table, column),
            EntityRef::Link(id) => write!(f, "{}", id),
        }
    }
}

/// Something that happened to the diagram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DiagramEvent {
    NodeAdded(TableId),
    NodeRemoved(TableId),
    LinkAdded(LinkId),
    LinkRemoved(LinkId),
    TargetPortChanged {
        link: LinkId,
        old: Option<PortId>,
        new: Option<PortId>,
    },
    RefreshRequested(EntityRef),
    /// Emitted once when refresh suspension ends, if anything was held back
    Refreshed,
}

/// Handle returned by `Diagram::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

/// Receiver of diagram notifications, typically the rendering layer
pub trait DiagramObserver: Send + Sync {
    fn notify(&mut self, event: &DiagramEvent);
}

impl<F> DiagramObserver for F
where
    F: FnMut(&DiagramEvent) + Send + Sync,
{
    fn notify(&mut self, event: &DiagramEvent) {
        self(event)
    }
}

/// Observer that keeps every event it receives.
///
/// Clones share the same buffer, so one clone can be handed to the diagram
/// while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<DiagramEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<DiagramEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Number of refresh requests aimed at `entity`
    pub fn refresh_count(&self, entity: EntityRef) -> usize {
        self.events
            .lock()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| **e == DiagramEvent::RefreshRequested(entity))
                    .count()
            })
            .unwrap_or(0)
    }
}

impl DiagramObserver for EventRecorder {
    fn notify(&mut self, event: &DiagramEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

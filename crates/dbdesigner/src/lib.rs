//! dbdesigner - graph model for entity-relationship diagram editors
//!
//! Tables own typed columns, every column exposes a port on each side of
//! its row, and links join a source port to an optional target port. The
//! [`Diagram`] owns all of it, batches change notifications and runs the
//! relationship label policy when a link is rebound.
//!
//! # Quick Start
//!
//! ```rust
//! use dbdesigner::build_grid;
//!
//! let (diagram, report) = build_grid(2, 2).unwrap();
//! assert_eq!(report.table_count(), 4);
//! assert_eq!(diagram.links().count(), 2);
//! ```
//!
//! # Editing a diagram
//!
//! ```rust
//! use dbdesigner::prelude::*;
//!
//! let mut diagram = Diagram::new();
//! let users = Table::named("Users", Point::new(0.0, 0.0));
//! let orders = Table::named("Orders", Point::new(0.0, 400.0));
//!
//! let source = users.bottom_port(users.primary_column().unwrap().id()).unwrap().id();
//! let target = orders.port(orders.columns()[1].id(), PortSide::Top).unwrap().id();
//! diagram.add_node(users);
//! diagram.add_node(orders);
//!
//! // A link dragged from a port starts unattached
//! let link = diagram.add_link(diagram.create_link(source)).unwrap();
//! diagram.set_link_target(link, Some(target)).unwrap();
//!
//! let labels = diagram.link(link).unwrap().labels();
//! assert_eq!(labels[0].content, "1..*");
//! ```

pub mod core;
pub mod export;
pub mod grid;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        CardinalityLabelPolicy, Column, ColumnId, ColumnType, DesignerError, Diagram,
        DiagramEvent, DiagramObserver, DiagramOptions, EntityRef, EventRecorder, GraphStore, Link,
        LinkId, LinkLabel, PathStyle, Point, Port, PortId, PortSide, RelationshipPolicy, Table,
        TableId,
    };
    pub use crate::grid::{GridBuilder, GridReport, SkipReason};
}

/// Build an R x C grid of linked tables in a fresh diagram
///
/// Uses the default spacing and table factory. Cells that cannot be wired
/// are listed in the returned report.
///
/// # Example
/// ```rust
/// use dbdesigner::build_grid;
///
/// let (diagram, report) = build_grid(3, 1).unwrap();
/// assert_eq!(report.links.len(), 2);
/// assert!(diagram.table_by_name("Table_2_0").is_some());
/// ```
pub fn build_grid(rows: usize, columns: usize) -> anyhow::Result<(Diagram, grid::GridReport)> {
    let mut diagram = Diagram::new();
    let report = grid::GridBuilder::new(rows, columns).build(&mut diagram)?;
    Ok((diagram, report))
}

/// Build a grid and export it as JSON
///
/// # Example
/// ```rust
/// let json = dbdesigner::grid_json(1, 2, false).unwrap();
/// assert!(json.contains("Table_0_1"));
/// ```
pub fn grid_json(rows: usize, columns: usize, pretty: bool) -> anyhow::Result<String> {
    let (diagram, _) = build_grid(rows, columns)?;
    Ok(export::to_json(&diagram, pretty)?)
}

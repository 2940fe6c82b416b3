//! Document export
//!
//! Walks the diagram by identifier and produces a serializable document.
//! Tables carry their columns and ports; ports and links refer to tables
//! and columns by id only, so the document never nests an entity inside
//! itself.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::core::{DesignerError, Diagram, DiagramOptions, Link, LinkId, Table, TableId};

/// A table as exported
#[derive(Debug, Serialize)]
pub struct NodeDocument<'a> {
    #[serde(flatten)]
    pub table: &'a Table,
    pub has_primary_column: bool,
}

/// A link as exported, with its resolved path when attached
#[derive(Debug, Serialize)]
pub struct LinkDocument<'a> {
    #[serde(flatten)]
    pub link: &'a Link,
    pub attached: bool,
    pub path: Option<String>,
}

/// Snapshot of a diagram ready for serialization
#[derive(Debug, Serialize)]
pub struct DiagramDocument<'a> {
    pub options: &'a DiagramOptions,
    pub nodes: Vec<NodeDocument<'a>>,
    pub links: Vec<LinkDocument<'a>>,
}

/// Build a document from the diagram, visiting each entity once
pub fn to_document(diagram: &Diagram) -> DiagramDocument<'_> {
    let mut seen_tables: HashSet<TableId> = HashSet::new();
    let mut seen_links: HashSet<LinkId> = HashSet::new();

    let nodes: Vec<_> = diagram
        .tables()
        .filter(|t| seen_tables.insert(t.id()))
        .map(|table| NodeDocument {
            table,
            has_primary_column: table.has_primary_column(),
        })
        .collect();

    let links: Vec<_> = diagram
        .links()
        .filter(|l| seen_links.insert(l.id()))
        .map(|link| {
            trace!(link = %link.id(), "Exporting link");
            LinkDocument {
                link,
                attached: link.is_attached(),
                path: diagram.link_path(link.id()),
            }
        })
        .collect();

    debug!(nodes = nodes.len(), links = links.len(), "Document built");
    DiagramDocument {
        options: diagram.options(),
        nodes,
        links,
    }
}

/// Serialize the diagram to JSON
pub fn to_json(diagram: &Diagram, pretty: bool) -> Result<String, DesignerError> {
    let document = to_document(diagram);
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(json)
}

/// Serialize the diagram as JSON into a writer
pub fn write_json<W: std::io::Write>(
    diagram: &Diagram,
    writer: W,
    pretty: bool,
) -> Result<(), DesignerError> {
    let document = to_document(diagram);
    if pretty {
        serde_json::to_writer_pretty(writer, &document)?;
    } else {
        serde_json::to_writer(writer, &document)?;
    }
    Ok(())
}

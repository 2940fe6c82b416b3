//! Core error types for diagram construction and export
//!
//! Lookups that may legitimately miss (a column, a port, a table) return
//! `Option` and never produce one of these. Errors are reserved for invalid
//! requests and for reporting in strict mode.

use thiserror::Error;

use crate::core::{LinkId, PortId, TableId};
use crate::grid::SkippedCell;

/// Core error types for the diagram model
#[derive(Error, Debug)]
pub enum DesignerError {
    #[error("Invalid grid: {rows} rows x {columns} columns (both must be positive)")]
    InvalidGrid { rows: usize, columns: usize },

    #[error("Invalid grid spacing: {spacing} (must be finite and positive)")]
    InvalidSpacing { spacing: f64 },

    #[error("Incomplete wiring: {} cell(s) produced no link", skipped.len())]
    IncompleteWiring { skipped: Vec<SkippedCell> },

    #[error("Unknown table: {id}")]
    UnknownTable { id: TableId },

    #[error("Unknown link: {id}")]
    UnknownLink { id: LinkId },

    #[error("Unknown port: {port}")]
    UnknownPort { port: PortId },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DesignerError {
    /// Create a new invalid grid error
    pub fn invalid_grid(rows: usize, columns: usize) -> Self {
        Self::InvalidGrid { rows, columns }
    }

    /// Create a new invalid spacing error
    pub fn invalid_spacing(spacing: f64) -> Self {
        Self::InvalidSpacing { spacing }
    }

    /// Create a new incomplete wiring error
    pub fn incomplete_wiring(skipped: Vec<SkippedCell>) -> Self {
        Self::IncompleteWiring { skipped }
    }

    /// Cells that were skipped, when this is a wiring report
    pub fn skipped_cells(&self) -> &[SkippedCell] {
        match self {
            Self::IncompleteWiring { skipped } => skipped,
            _ => &[],
        }
    }
}

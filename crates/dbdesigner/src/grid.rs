//! Grid construction
//!
//! Fills a diagram with an R x C matrix of tables and links every table to
//! the one directly below it: the bottom port of the upper table's primary
//! column goes to the top port of the lower table's "Test" column.
//!
//! Wiring is best effort. A cell whose tables lack the expected columns or
//! ports is skipped and recorded in the [`GridReport`]; only strict mode
//! turns skipped cells into an error.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info, span, trace, warn, Level};

use crate::core::{
    DesignerError, Diagram, LinkId, Point, PortSide, Table, TableId, DEFAULT_SECONDARY_COLUMN,
};

/// Distance between neighbouring tables, on both axes
pub const DEFAULT_SPACING: f64 = 400.0;

/// Why a cell produced no link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The upper table has no primary column
    NoPrimaryColumn,
    /// The lower table has no non-primary column named "Test"
    NoTargetColumn,
    /// A column exists but its port on the required side does not
    MissingPort,
    /// One of the two tables is not in the diagram
    MissingTable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoPrimaryColumn => write!(f, "source table has no primary column"),
            SkipReason::NoTargetColumn => write!(f, "target table has no \"Test\" column"),
            SkipReason::MissingPort => write!(f, "column port not found"),
            SkipReason::MissingTable => write!(f, "table not in diagram"),
        }
    }
}

/// A grid cell (identified by its upper table) that was not wired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedCell {
    pub row: usize,
    pub column: usize,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}): {}", self.row, self.column, self.reason)
    }
}

/// Outcome of a grid build
#[derive(Debug, Clone, Default)]
pub struct GridReport {
    /// Table ids indexed as `tables[row][column]`
    pub tables: Vec<Vec<TableId>>,
    pub links: Vec<LinkId>,
    pub skipped: Vec<SkippedCell>,
}

impl GridReport {
    pub fn table_at(&self, row: usize, column: usize) -> Option<TableId> {
        self.tables.get(row)?.get(column).copied()
    }

    pub fn table_count(&self) -> usize {
        self.tables.iter().map(Vec::len).sum()
    }
}

/// Builds a table for cell `(row, column)` placed at `position`
pub type TableFactory = fn(row: usize, column: usize, position: Point) -> Table;

/// Default factory: a default table named `Table_{row}_{column}`
pub fn default_table(row: usize, column: usize, position: Point) -> Table {
    Table::named(format!("Table_{}_{}", row, column), position)
}

/// Builder for grid construction runs
#[derive(Debug, Clone, Copy)]
pub struct GridBuilder {
    rows: usize,
    columns: usize,
    spacing: f64,
    strict: bool,
    factory: TableFactory,
}

impl GridBuilder {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            spacing: DEFAULT_SPACING,
            strict: false,
            factory: default_table,
        }
    }

    /// Distance between neighbouring tables; must be finite and positive
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Report skipped cells as [`DesignerError::IncompleteWiring`]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn table_factory(mut self, factory: TableFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Populate `diagram` with the grid.
    ///
    /// Runs with refresh suspended, so observers see a single
    /// `Refreshed` notification. In strict mode the tables and links built
    /// so far remain in the diagram when an error is returned.
    pub fn build(&self, diagram: &mut Diagram) -> Result<GridReport, DesignerError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(DesignerError::invalid_grid(self.rows, self.columns));
        }
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(DesignerError::invalid_spacing(self.spacing));
        }

        let build_span = span!(
            Level::INFO,
            "build_grid",
            rows = self.rows,
            columns = self.columns,
            spacing = self.spacing
        );
        let _enter = build_span.enter();

        let report = diagram.batch(|diagram| self.populate(diagram));

        info!(
            tables = report.table_count(),
            links = report.links.len(),
            skipped = report.skipped.len(),
            "Grid built"
        );

        if self.strict && !report.skipped.is_empty() {
            for cell in &report.skipped {
                warn!(row = cell.row, column = cell.column, reason = %cell.reason, "Cell not wired");
            }
            return Err(DesignerError::incomplete_wiring(report.skipped));
        }
        Ok(report)
    }

    fn populate(&self, diagram: &mut Diagram) -> GridReport {
        let mut report = GridReport::default();

        for row in 0..self.rows {
            let mut ids = Vec::with_capacity(self.columns);
            for column in 0..self.columns {
                let position =
                    Point::new(column as f64 * self.spacing, row as f64 * self.spacing);
                let table = (self.factory)(row, column, position);
                ids.push(diagram.add_node(table));
            }
            report.tables.push(ids);
        }
        debug!(tables = report.table_count(), "Tables placed");

        for row in 0..self.rows - 1 {
            for column in 0..self.columns {
                let upper = report.tables[row][column];
                let lower = report.tables[row + 1][column];
                match connect_tables(diagram, upper, lower, PortSide::Bottom, PortSide::Top) {
                    Ok(link) => report.links.push(link),
                    Err(reason) => {
                        trace!(row, column, %reason, "Skipping cell");
                        report.skipped.push(SkippedCell {
                            row,
                            column,
                            reason,
                        });
                    }
                }
            }
        }

        report
    }
}

/// Link the primary column of `source` to the "Test" column of `target`.
///
/// The target column must be non-primary and named exactly "Test". Any
/// missing piece yields the matching [`SkipReason`]; nothing is added then.
pub fn connect_tables(
    diagram: &mut Diagram,
    source: TableId,
    target: TableId,
    source_side: PortSide,
    target_side: PortSide,
) -> Result<LinkId, SkipReason> {
    let (Some(source_table), Some(target_table)) = (diagram.table(source), diagram.table(target))
    else {
        return Err(SkipReason::MissingTable);
    };

    let source_column = source_table
        .primary_column()
        .ok_or(SkipReason::NoPrimaryColumn)?;
    let target_column = target_table
        .columns()
        .iter()
        .find(|c| !c.primary && c.name == DEFAULT_SECONDARY_COLUMN)
        .ok_or(SkipReason::NoTargetColumn)?;

    let source_port = source_table
        .port(source_column.id(), source_side)
        .ok_or(SkipReason::MissingPort)?
        .id();
    let target_port = target_table
        .port(target_column.id(), target_side)
        .ok_or(SkipReason::MissingPort)?
        .id();

    let link = diagram.create_link(source_port).with_target(target_port);
    diagram.add_link(link).map_err(|_| SkipReason::MissingPort)
}

//! Tables, their columns, and the ports bound to each column
//!
//! A table owns an ordered list of columns. Every column carries exactly two
//! ports, one per [`PortSide`], created when the column is attached. Column
//! order is meaningful: it determines where the ports sit on the canvas.

use serde::Serialize;
use tracing::trace;

use super::{ColumnId, ColumnType, Point, PortId, PortSide, TableId};

/// Name of the identity column every new table starts with
pub const DEFAULT_PRIMARY_COLUMN: &str = "Id";

/// Name of the non-primary column every new table starts with
pub const DEFAULT_SECONDARY_COLUMN: &str = "Test";

/// Name given to tables that were not named explicitly
pub const DEFAULT_TABLE_NAME: &str = "Table";

/// A named, typed attribute of a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    id: ColumnId,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub primary: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: ColumnId::next(),
            name: name.into(),
            column_type,
            primary: false,
        }
    }

    /// Mark this column as the table's identity attribute
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }
}

/// A connection anchor bound to one column and one side of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Port {
    table: TableId,
    column: ColumnId,
    side: PortSide,
}

impl Port {
    pub fn id(&self) -> PortId {
        PortId::new(self.table, self.column, self.side)
    }

    /// Owning table
    pub fn table(&self) -> TableId {
        self.table
    }

    /// Bound column (lookup only; the column is owned by the table)
    pub fn column(&self) -> ColumnId {
        self.column
    }

    pub fn side(&self) -> PortSide {
        self.side
    }
}

/// A table node on the canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    id: TableId,
    pub name: String,
    pub position: Point,
    columns: Vec<Column>,
    ports: Vec<Port>,
}

impl Table {
    /// Create a table with the default "Id" (primary) and "Test" columns
    pub fn new(position: Point) -> Self {
        Self::named(DEFAULT_TABLE_NAME, position)
    }

    /// Create a named table with the default columns
    pub fn named(name: impl Into<String>, position: Point) -> Self {
        let mut table = Self::empty(name, position);
        table.add_column(Column::new(DEFAULT_PRIMARY_COLUMN, ColumnType::Integer).primary());
        table.add_column(Column::new(DEFAULT_SECONDARY_COLUMN, ColumnType::Integer));
        table
    }

    /// Create a table with no columns at all
    pub fn empty(name: impl Into<String>, position: Point) -> Self {
        Self {
            id: TableId::next(),
            name: name.into(),
            position,
            columns: Vec::new(),
            ports: Vec::new(),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// True iff any column is marked primary
    pub fn has_primary_column(&self) -> bool {
        self.columns.iter().any(|c| c.primary)
    }

    /// First column marked primary, if any
    pub fn primary_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary)
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Mutable access to a column.
    ///
    /// Edits made here are not checked: marking a second column primary is
    /// allowed. Use [`Table::set_primary_column`] to keep a single primary.
    pub fn column_mut(&mut self, id: ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    /// First column with the given name
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column in display order
    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Append a column and create both of its ports
    pub fn add_column(&mut self, column: Column) -> ColumnId {
        let id = column.id;
        trace!(table = %self.id, column = %id, name = %column.name, "Adding column");
        self.columns.push(column);
        for side in PortSide::ALL {
            self.add_port(id, side);
        }
        id
    }

    /// Remove a column together with its ports
    ///
    /// Links attached to those ports are not touched here. Outside the crate
    /// columns are removed through `Diagram::remove_column`, which detaches
    /// them first.
    pub(crate) fn remove_column(&mut self, id: ColumnId) -> Option<Column> {
        let index = self.column_index(id)?;
        self.ports.retain(|p| p.column != id);
        trace!(table = %self.id, column = %id, "Removed column");
        Some(self.columns.remove(index))
    }

    /// Register a port for the given column and side.
    ///
    /// Duplicate (column, side) pairs are not rejected; callers create each
    /// pair once.
    pub fn add_port(&mut self, column: ColumnId, side: PortSide) -> PortId {
        let port = Port {
            table: self.id,
            column,
            side,
        };
        self.ports.push(port);
        port.id()
    }

    /// Port bound to `column` on `side`, matched by column identity
    pub fn port(&self, column: ColumnId, side: PortSide) -> Option<&Port> {
        self.ports
            .iter()
            .find(|p| p.column == column && p.side == side)
    }

    /// Port bound to `column` on the default (bottom) side
    pub fn bottom_port(&self, column: ColumnId) -> Option<&Port> {
        self.port(column, PortSide::default())
    }

    /// All ports bound to a column
    pub fn ports_of(&self, column: ColumnId) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(move |p| p.column == column)
    }

    pub fn owns_port(&self, port: PortId) -> bool {
        port.table == self.id && self.port(port.column, port.side).is_some()
    }

    /// Make `id` the only primary column.
    ///
    /// Returns false (and changes nothing) if the column does not belong to
    /// this table.
    pub fn set_primary_column(&mut self, id: ColumnId) -> bool {
        if self.column(id).is_none() {
            return false;
        }
        for column in &mut self.columns {
            column.primary = column.id == id;
        }
        true
    }
}

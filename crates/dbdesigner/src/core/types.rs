//! Core type definitions for the diagram model
//!
//! This module contains the identifiers and small value types shared by
//! tables, ports and links: positions, column types, port sides and link
//! path styles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_COLUMN_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_LINK_ID: AtomicU64 = AtomicU64::new(1);

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $counter:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Allocate a fresh, process-unique identifier
            pub fn next() -> Self {
                Self($counter.fetch_add(1, Ordering::Relaxed))
            }

            /// Raw numeric value of the identifier
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Stable identifier of a table within a diagram session
    TableId,
    NEXT_TABLE_ID,
    "table"
);
define_id!(
    /// Stable identifier of a column; compared by identity, never by name
    ColumnId,
    NEXT_COLUMN_ID,
    "column"
);
define_id!(
    /// Stable identifier of a link
    LinkId,
    NEXT_LINK_ID,
    "link"
);

/// A position on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset this point by the given deltas
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Snap both coordinates to the nearest multiple of `size`
    pub fn snap(self, size: f64) -> Self {
        if size <= 0.0 {
            return self;
        }
        Self::new((self.x / size).round() * size, (self.y / size).round() * size)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// SQL-ish type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    #[default]
    Integer,
    Text,
    Boolean,
    Decimal,
    Date,
    DateTime,
    Guid,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Decimal => write!(f, "decimal"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::DateTime => write!(f, "datetime"),
            ColumnType::Guid => write!(f, "guid"),
        }
    }
}

/// Which edge of a table a port sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PortSide {
    Top,
    /// Lookups without an explicit side resolve to the bottom port
    #[default]
    Bottom,
}

impl PortSide {
    pub const ALL: [PortSide; 2] = [PortSide::Top, PortSide::Bottom];

    pub fn opposite(self) -> Self {
        match self {
            PortSide::Top => PortSide::Bottom,
            PortSide::Bottom => PortSide::Top,
        }
    }
}

impl fmt::Display for PortSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSide::Top => write!(f, "top"),
            PortSide::Bottom => write!(f, "bottom"),
        }
    }
}

/// How the rendering layer should draw a link between two anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum PathStyle {
    /// Cubic curve leaving each port perpendicular to its side
    #[default]
    Smooth,
    /// Single straight segment
    Straight,
}

impl fmt::Display for PathStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStyle::Smooth => write!(f, "smooth"),
            PathStyle::Straight => write!(f, "straight"),
        }
    }
}

/// Identity of a port: owning table, bound column and side
///
/// Ports are identified by value so links never hold references into the
/// table that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PortId {
    pub table: TableId,
    pub column: ColumnId,
    pub side: PortSide,
}

impl PortId {
    pub fn new(table: TableId, column: ColumnId, side: PortSide) -> Self {
        Self {
            table,
            column,
            side,
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.table, self.column, self.side)
    }
}

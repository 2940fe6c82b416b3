//! Port anchors and link paths for the rendering layer
//!
//! Tables are laid out as a header followed by one row per column. Each
//! row exposes two anchors: the top-side port on the row's left edge and the
//! bottom-side port on its right edge. Moving a column therefore moves its
//! anchors.

use super::{ColumnId, PathStyle, Point, PortSide, Table};

/// Rendered width of a table
pub const TABLE_WIDTH: f64 = 200.0;

/// Height of the name header above the first column
pub const HEADER_HEIGHT: f64 = 40.0;

/// Height of a single column row
pub const ROW_HEIGHT: f64 = 30.0;

const MIN_CURVE: f64 = 40.0;
const MAX_CURVE: f64 = 125.0;

/// Total rendered height of a table
pub fn table_height(table: &Table) -> f64 {
    HEADER_HEIGHT + ROW_HEIGHT * table.columns().len() as f64
}

/// Canvas position of the port bound to `column` on `side`
pub fn port_anchor(table: &Table, column: ColumnId, side: PortSide) -> Option<Point> {
    table.port(column, side)?;
    let index = table.column_index(column)?;
    let y = table.position.y + HEADER_HEIGHT + ROW_HEIGHT * index as f64 + ROW_HEIGHT / 2.0;
    let x = match side {
        PortSide::Top => table.position.x,
        PortSide::Bottom => table.position.x + TABLE_WIDTH,
    };
    Some(Point::new(x, y))
}

/// Outward direction of a port, as a unit x offset
fn outward(side: PortSide) -> f64 {
    match side {
        PortSide::Top => -1.0,
        PortSide::Bottom => 1.0,
    }
}

/// SVG path data for a link between two anchors
pub fn link_path(
    style: PathStyle,
    from: Point,
    from_side: PortSide,
    to: Point,
    to_side: PortSide,
) -> String {
    match style {
        PathStyle::Smooth => smooth_path(from, from_side, to, to_side),
        PathStyle::Straight => straight_path(from, to),
    }
}

/// A cubic curve leaving each anchor away from its table
pub fn smooth_path(from: Point, from_side: PortSide, to: Point, to_side: PortSide) -> String {
    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    let curve = (dx.max(dy) / 2.0).clamp(MIN_CURVE, MAX_CURVE);

    let c1 = from.translate(outward(from_side) * curve, 0.0);
    let c2 = to.translate(outward(to_side) * curve, 0.0);

    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        from.x, from.y, c1.x, c1.y, c2.x, c2.y, to.x, to.y
    )
}

pub fn straight_path(from: Point, to: Point) -> String {
    format!("M {} {} L {} {}", from.x, from.y, to.x, to.y)
}

//! Coordinate mapping and grid snapping.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Default number of grid columns across the canvas width.
pub const GRID_COLUMNS: u32 = 24;
/// Default fixed grid row height in pixels.
pub const GRID_ROW_HEIGHT: f64 = 40.0;

/// Grid configuration, injectable per session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of columns the canvas width is divided into.
    pub columns: u32,
    /// Fixed row height in pixels.
    pub row_height: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            columns: GRID_COLUMNS,
            row_height: GRID_ROW_HEIGHT,
        }
    }
}

/// Derived grid geometry for the current canvas size.
///
/// Never persisted; re-derived whenever the drawing surface resizes so the
/// reported grid lines and the snap results cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    /// Cell width in pixels (integer-valued, from floor division).
    pub cell_width: f64,
    /// Cell height in pixels.
    pub cell_height: f64,
}

/// Convert device coordinates to canvas-local space.
///
/// No clamping: points left of or above the surface come out negative and
/// callers decide what to do with them.
pub fn to_local_point(device: Point, container_origin: Point) -> Point {
    Point::new(device.x - container_origin.x, device.y - container_origin.y)
}

/// Derive the grid for a canvas width.
///
/// `cell_width = floor(canvas_width / columns)`, so every cell is the same
/// integer size and snap targets are deterministic. Row height is a fixed
/// layout constant rather than derived from the canvas height.
pub fn compute_grid(canvas_width: f64, spec: GridSpec) -> Grid {
    let columns = spec.columns.max(1) as f64;
    Grid {
        cell_width: (canvas_width.max(0.0) / columns).floor().max(1.0),
        cell_height: spec.row_height.max(1.0),
    }
}

/// Snap a point to the nearest grid intersection, each axis independently.
///
/// Idempotent: snapping an already-snapped point is a no-op.
pub fn snap(point: Point, grid: Grid) -> Point {
    Point::new(
        (point.x / grid.cell_width).round() * grid.cell_width,
        (point.y / grid.cell_height).round() * grid.cell_height,
    )
}

/// Round a rectangle to the grid: size to whole cells (minimum one cell),
/// origin to the nearest grid line.
pub fn snap_rect(rect: Rect, grid: Grid) -> Rect {
    let width = (rect.width() / grid.cell_width).round().max(1.0) * grid.cell_width;
    let height = (rect.height() / grid.cell_height).round().max(1.0) * grid.cell_height;
    let origin = snap(Point::new(rect.x0, rect.y0), grid);
    Rect::new(origin.x, origin.y, origin.x + width, origin.y + height)
}

//! Freehand stroke capture and smoothed rendering.
//!
//! One stroke runs `Idle -> Capturing -> Idle`, committing or cancelling its
//! ink. In recognition mode several strokes accumulate into one gesture path
//! that the recognizer consumes on an explicit trigger.

use crate::component::SerializableColor;
use crate::raster::{BlendMode, RasterSnapshot, RasterSurface};
use kurbo::{BezPath, PathEl, Point};

/// Minimum distance between recorded samples. Filters degenerate zero-length
/// segments and keeps point density bounded at high pointer rates.
pub const MIN_SAMPLE_DISTANCE: f64 = 2.0;

/// Curve flattening tolerance when stamping the smoothed stroke.
const FLATTEN_TOLERANCE: f64 = 0.25;

/// Brush configuration applied to every stamp of a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStyle {
    pub width: f64,
    pub color: SerializableColor,
    pub mode: BlendMode,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            width: 4.0,
            color: SerializableColor::black(),
            mode: BlendMode::SourceOver,
        }
    }
}

/// Capture phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokePhase {
    #[default]
    Idle,
    Capturing,
}

/// Captures pointer input into a point path and renders a smoothed preview
/// non-destructively over the raster surface.
#[derive(Debug, Default)]
pub struct StrokeEngine {
    phase: StrokePhase,
    /// Samples of the stroke in progress. Cleared on commit or cancel,
    /// never persisted across gestures.
    points: Vec<Point>,
    /// Pre-stroke pixels, restored before every preview redraw so repeated
    /// incremental renders never accumulate error. Held from `begin` until
    /// commit or cancel.
    snapshot: Option<RasterSnapshot>,
    /// Path accumulated across the strokes of one recognition gesture.
    gesture: Vec<Point>,
    /// Pre-gesture pixels, captured at the first stroke of a gesture so the
    /// ink can be lifted off when a component is recognized.
    gesture_snapshot: Option<RasterSnapshot>,
    pub brush: BrushStyle,
}

impl StrokeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_capturing(&self) -> bool {
        self.phase == StrokePhase::Capturing
    }

    /// Start a new stroke at `point`.
    ///
    /// Snapshots the surface for preview rollback; an unavailable surface is
    /// skipped and the snapshot retried on the next extension.
    pub fn begin(&mut self, surface: &mut dyn RasterSurface, point: Point) {
        if self.is_capturing() {
            log::debug!("stroke begin while already capturing; ignored");
            return;
        }
        self.phase = StrokePhase::Capturing;
        self.points.clear();
        self.points.push(point);
        self.snapshot = surface.snapshot().ok();
        if self.gesture.is_empty() && self.gesture_snapshot.is_none() {
            self.gesture_snapshot = self.snapshot.clone();
        }
    }

    /// Record a sample without touching the surface. Returns true if the
    /// point was far enough from the last sample to be kept. Used by the
    /// session so sampling runs at pointer rate while preview redraws stay
    /// coalesced to frame rate.
    pub fn add_sample(&mut self, point: Point) -> bool {
        if !self.is_capturing() {
            log::debug!("stroke sample without begin; ignored");
            return false;
        }
        if let Some(last) = self.points.last() {
            if last.distance(point) < MIN_SAMPLE_DISTANCE {
                return false;
            }
        }
        self.points.push(point);
        true
    }

    /// Add a sample to the stroke in progress and redraw the preview.
    ///
    /// The preview restores the pre-stroke snapshot and re-renders the
    /// smoothed curve from the full accumulated path, not just the last
    /// segment.
    pub fn extend(&mut self, surface: &mut dyn RasterSurface, point: Point) {
        if self.add_sample(point) {
            self.redraw_preview(surface);
        }
    }

    /// Commit the stroke: the final smoothed curve stays on the surface and
    /// the path joins the gesture accumulator. Returns the committed path,
    /// or `None` if no stroke was in progress.
    pub fn end(&mut self, surface: &mut dyn RasterSurface) -> Option<Vec<Point>> {
        if !self.is_capturing() {
            log::debug!("stroke end without begin; ignored");
            return None;
        }
        self.redraw_preview(surface);
        self.phase = StrokePhase::Idle;
        self.snapshot = None;
        let path = std::mem::take(&mut self.points);
        self.gesture.extend_from_slice(&path);
        Some(path)
    }

    /// Cancel the stroke: restore the pre-stroke pixels and discard the path.
    pub fn cancel(&mut self, surface: &mut dyn RasterSurface) {
        if !self.is_capturing() {
            return;
        }
        if let Some(snapshot) = &self.snapshot {
            if let Err(err) = surface.restore(snapshot) {
                log::warn!("stroke cancel could not restore surface: {err}");
            }
        }
        self.phase = StrokePhase::Idle;
        self.snapshot = None;
        self.points.clear();
    }

    /// The path accumulated by the current gesture, across strokes.
    pub fn gesture_path(&self) -> &[Point] {
        &self.gesture
    }

    /// Take the accumulated gesture path, leaving the accumulator empty.
    pub fn take_gesture(&mut self) -> Vec<Point> {
        self.gesture_snapshot = None;
        std::mem::take(&mut self.gesture)
    }

    /// Restore the surface to its pre-gesture pixels and drop the gesture.
    /// Used when recognized ink is replaced by a placed component.
    pub fn lift_gesture(&mut self, surface: &mut dyn RasterSurface) -> Vec<Point> {
        if let Some(snapshot) = &self.gesture_snapshot {
            if let Err(err) = surface.restore(snapshot) {
                log::warn!("gesture lift could not restore surface: {err}");
            }
        }
        self.take_gesture()
    }

    /// Drop the accumulated gesture without touching the surface. Used after
    /// a recognition miss, when the ink stays where the user drew it.
    pub fn clear_gesture(&mut self) {
        self.gesture.clear();
        self.gesture_snapshot = None;
    }

    /// Restore the pre-stroke pixels and re-render the smoothed preview of
    /// the full accumulated path.
    pub fn redraw_preview(&mut self, surface: &mut dyn RasterSurface) {
        if !self.is_capturing() {
            return;
        }
        if self.snapshot.is_none() {
            // Snapshot failed at begin (zero-sized surface); retry now.
            self.snapshot = surface.snapshot().ok();
            if self.gesture.is_empty() && self.gesture_snapshot.is_none() {
                self.gesture_snapshot = self.snapshot.clone();
            }
        }
        if let Some(snapshot) = &self.snapshot {
            if let Err(err) = surface.restore(snapshot) {
                log::warn!("stroke preview could not restore surface: {err}");
            }
        }
        render_stroke(surface, &self.points, &self.brush);
    }

    /// Drop all capture state without touching the surface. Used when the
    /// tool changes mid-capture and no surface is on hand to roll back.
    pub fn reset(&mut self) {
        self.phase = StrokePhase::Idle;
        self.points.clear();
        self.snapshot = None;
        self.clear_gesture();
    }
}

/// Build the smoothed curve for a point path: quadratic segments through
/// each sample toward the midpoint of the following pair, so the rendered
/// stroke has no visible polyline corners.
pub fn smooth_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if points.is_empty() {
        return path;
    }
    path.move_to(points[0]);
    if points.len() == 1 {
        return path;
    }
    if points.len() == 2 {
        path.line_to(points[1]);
        return path;
    }
    for i in 1..points.len() - 1 {
        let mid = Point::new(
            (points[i].x + points[i + 1].x) / 2.0,
            (points[i].y + points[i + 1].y) / 2.0,
        );
        path.quad_to(points[i], mid);
    }
    path.line_to(points[points.len() - 1]);
    path
}

/// Stamp a smoothed stroke onto the surface with the given brush. Ink and
/// eraser both go through this path so they taper identically.
pub fn render_stroke(surface: &mut dyn RasterSurface, points: &[Point], brush: &BrushStyle) {
    if points.is_empty() || surface.is_empty() {
        return;
    }
    let radius = (brush.width / 2.0).max(0.5);
    if points.len() == 1 {
        surface.stamp_disc(points[0], radius, brush.color, brush.mode);
        return;
    }

    let path = smooth_path(points);
    let mut flat: Vec<Point> = Vec::new();
    kurbo::flatten(path, FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => flat.push(p),
        _ => {}
    });

    let spacing = (radius * 0.5).max(0.75);
    surface.stamp_disc(flat[0], radius, brush.color, brush.mode);
    for window in flat.windows(2) {
        let (a, b) = (window[0], window[1]);
        let length = a.distance(b);
        let steps = (length / spacing).ceil().max(1.0) as usize;
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            surface.stamp_disc(p, radius, brush.color, brush.mode);
        }
    }
}

/// Ramer-Douglas-Peucker path simplification. Applied to gesture paths
/// before classification so the recognizer sees corners, not sample noise.
pub fn simplify_path(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = simplify_path(&points[..=max_index], tolerance);
        let right = simplify_path(&points[max_index..], tolerance);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Perpendicular distance from a point to the line through `a` and `b`.
fn perpendicular_distance(point: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        return point.distance(a);
    }
    ((point.x - a.x) * dy - (point.y - a.y) * dx).abs() / len_sq.sqrt()
}

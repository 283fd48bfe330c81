//! Selection set, handle hit-testing, and drag/resize transforms.

use crate::component::{Component, ComponentId, MIN_HEIGHT, MIN_WIDTH};
use crate::grid::Grid;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pointer distance (px) within which a border handle wins over the body.
pub const HANDLE_MARGIN: f64 = 8.0;
/// Minimum movement on either axis before a press counts as a box drag
/// rather than a click on empty canvas.
pub const BOX_DRAG_THRESHOLD: f64 = 5.0;

/// The eight border handles of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl HandleKind {
    /// All handles, corners first.
    pub fn all() -> [HandleKind; 8] {
        [
            HandleKind::NorthWest,
            HandleKind::NorthEast,
            HandleKind::SouthWest,
            HandleKind::SouthEast,
            HandleKind::North,
            HandleKind::East,
            HandleKind::South,
            HandleKind::West,
        ]
    }

    /// Whether dragging this handle moves the west edge.
    pub fn affects_west(&self) -> bool {
        matches!(
            self,
            HandleKind::NorthWest | HandleKind::West | HandleKind::SouthWest
        )
    }

    /// Whether dragging this handle moves the east edge.
    pub fn affects_east(&self) -> bool {
        matches!(
            self,
            HandleKind::NorthEast | HandleKind::East | HandleKind::SouthEast
        )
    }

    /// Whether dragging this handle moves the north edge.
    pub fn affects_north(&self) -> bool {
        matches!(
            self,
            HandleKind::NorthWest | HandleKind::North | HandleKind::NorthEast
        )
    }

    /// Whether dragging this handle moves the south edge.
    pub fn affects_south(&self) -> bool {
        matches!(
            self,
            HandleKind::SouthWest | HandleKind::South | HandleKind::SouthEast
        )
    }

    /// Position of the handle on a bounding rectangle.
    pub fn anchor(&self, bounds: Rect) -> Point {
        let cx = (bounds.x0 + bounds.x1) / 2.0;
        let cy = (bounds.y0 + bounds.y1) / 2.0;
        match self {
            HandleKind::NorthWest => Point::new(bounds.x0, bounds.y0),
            HandleKind::North => Point::new(cx, bounds.y0),
            HandleKind::NorthEast => Point::new(bounds.x1, bounds.y0),
            HandleKind::East => Point::new(bounds.x1, cy),
            HandleKind::SouthEast => Point::new(bounds.x1, bounds.y1),
            HandleKind::South => Point::new(cx, bounds.y1),
            HandleKind::SouthWest => Point::new(bounds.x0, bounds.y1),
            HandleKind::West => Point::new(bounds.x0, cy),
        }
    }
}

/// Resize policy applied across a multi-selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeMode {
    /// Scale every selected component by the ratio applied to the grabbed
    /// one, measured against its own start size.
    #[default]
    Relative,
    /// Force every selected component to the grabbed component's exact new
    /// size; only the grabbed component's position moves.
    Match,
}

/// Ordered set of selected component ids. Insertion order is recency, which
/// anchors shift-range extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSet {
    ids: Vec<ComponentId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ComponentId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.ids.contains(&id)
    }

    /// The most recently selected id.
    pub fn last(&self) -> Option<ComponentId> {
        self.ids.last().copied()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection with a single id.
    pub fn replace(&mut self, id: ComponentId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Replace the selection with many ids (z-order preserved).
    pub fn replace_all(&mut self, ids: Vec<ComponentId>) {
        self.ids = ids;
        self.dedup();
    }

    /// Add an id; re-adding moves it to the recency end.
    pub fn push(&mut self, id: ComponentId) {
        self.ids.retain(|&existing| existing != id);
        self.ids.push(id);
    }

    /// Toggle an id in or out (ctrl/cmd-click).
    pub fn toggle(&mut self, id: ComponentId) {
        if self.contains(id) {
            self.ids.retain(|&existing| existing != id);
        } else {
            self.ids.push(id);
        }
    }

    /// Extend with the contiguous z-order range between the most recently
    /// selected component and `to` (shift-click). With no prior selection
    /// this is a plain replace.
    pub fn extend_range(&mut self, components: &[Component], to: ComponentId) {
        let Some(anchor) = self.last() else {
            self.replace(to);
            return;
        };
        let anchor_idx = components.iter().position(|c| c.id == anchor);
        let to_idx = components.iter().position(|c| c.id == to);
        let (Some(anchor_idx), Some(to_idx)) = (anchor_idx, to_idx) else {
            self.push(to);
            return;
        };
        let (lo, hi) = if anchor_idx <= to_idx {
            (anchor_idx, to_idx)
        } else {
            (to_idx, anchor_idx)
        };
        for component in &components[lo..=hi] {
            if !self.contains(component.id) {
                self.ids.push(component.id);
            }
        }
    }

    /// Drop ids that no longer reference a live component. Called whenever
    /// components are removed so the set never holds stale ids.
    pub fn prune(&mut self, components: &[Component]) {
        self.ids
            .retain(|id| components.iter().any(|c| c.id == *id));
    }

    fn dedup(&mut self) {
        let mut seen = Vec::with_capacity(self.ids.len());
        self.ids.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        });
    }
}

/// Explicit hit-test result passed into dispatch, replacing implicit
/// event-target comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Empty canvas.
    Background,
    /// The body of a component.
    Body(ComponentId),
    /// A resize handle of a selected component.
    Handle(ComponentId, HandleKind),
}

/// Find which handle of `bounds`, if any, lies within [`HANDLE_MARGIN`] of
/// the point.
pub fn handle_at(bounds: Rect, point: Point) -> Option<HandleKind> {
    for handle in HandleKind::all() {
        let anchor = handle.anchor(bounds);
        if (point.x - anchor.x).abs() <= HANDLE_MARGIN && (point.y - anchor.y).abs() <= HANDLE_MARGIN
        {
            return Some(handle);
        }
    }
    None
}

/// Classify a pointer press against the component list, front to back.
/// Handles are only live on selected components.
pub fn hit_test(components: &[Component], selection: &SelectionSet, point: Point) -> HitTarget {
    for component in components.iter().rev() {
        if !selection.contains(component.id) {
            continue;
        }
        if let Some(handle) = handle_at(component.bounds(), point) {
            return HitTarget::Handle(component.id, handle);
        }
    }
    for component in components.iter().rev() {
        if component.hit_test(point) {
            return HitTarget::Body(component.id);
        }
    }
    HitTarget::Background
}

/// Per-gesture drag state. Created at pointer-down, dropped at release.
#[derive(Debug, Clone)]
pub struct DragState {
    /// The component under the cursor at press time.
    pub grabbed: ComponentId,
    /// Offset from the cursor to the grabbed component's origin, fixed at
    /// press so the component does not jump to the cursor.
    pub grab_offset: Vec2,
    /// Origin of every selected component at press time.
    pub origins: HashMap<ComponentId, Point>,
}

impl DragState {
    /// Capture drag state for the current selection.
    pub fn begin(
        components: &[Component],
        selection: &SelectionSet,
        grabbed: ComponentId,
        cursor: Point,
    ) -> Self {
        let mut origins = HashMap::new();
        for component in components {
            if selection.contains(component.id) {
                origins.insert(component.id, component.origin());
            }
        }
        let grabbed_origin = origins.get(&grabbed).copied().unwrap_or(cursor);
        Self {
            grabbed,
            grab_offset: Vec2::new(grabbed_origin.x - cursor.x, grabbed_origin.y - cursor.y),
            origins,
        }
    }

    /// Apply the drag for the current cursor position: the whole selection
    /// translates by one shared delta, then each position snaps
    /// independently so relative spacing survives up to grid rounding.
    /// Returns true if any component moved.
    pub fn update(
        &self,
        components: &mut [Component],
        cursor: Point,
        grid: Grid,
        snap_enabled: bool,
    ) -> bool {
        let Some(&grabbed_origin) = self.origins.get(&self.grabbed) else {
            return false;
        };
        let target = Point::new(cursor.x + self.grab_offset.x, cursor.y + self.grab_offset.y);
        let delta = Vec2::new(target.x - grabbed_origin.x, target.y - grabbed_origin.y);

        let mut moved = false;
        for component in components.iter_mut() {
            let Some(&origin) = self.origins.get(&component.id) else {
                continue;
            };
            let mut next = Point::new(origin.x + delta.x, origin.y + delta.y);
            if snap_enabled {
                next = crate::grid::snap(next, grid);
            }
            if component.origin() != next {
                component.set_origin(next);
                moved = true;
            }
        }
        moved
    }
}

/// Per-gesture resize state. Created at pointer-down on a handle, dropped at
/// release.
#[derive(Debug, Clone)]
pub struct ResizeState {
    pub grabbed: ComponentId,
    pub handle: HandleKind,
    pub mode: ResizeMode,
    /// Cursor position at press time.
    pub start_cursor: Point,
    /// Bounds of every selected component at press time.
    pub start_bounds: HashMap<ComponentId, Rect>,
}

impl ResizeState {
    /// Capture resize state for the current selection.
    pub fn begin(
        components: &[Component],
        selection: &SelectionSet,
        grabbed: ComponentId,
        handle: HandleKind,
        mode: ResizeMode,
        cursor: Point,
    ) -> Self {
        let mut start_bounds = HashMap::new();
        for component in components {
            if selection.contains(component.id) {
                start_bounds.insert(component.id, component.bounds());
            }
        }
        Self {
            grabbed,
            handle,
            mode,
            start_cursor: cursor,
            start_bounds,
        }
    }

    /// Apply the resize for the current cursor position. Returns true if
    /// any component changed.
    pub fn update(
        &self,
        components: &mut [Component],
        cursor: Point,
        grid: Grid,
        snap_enabled: bool,
    ) -> bool {
        let Some(&grabbed_start) = self.start_bounds.get(&self.grabbed) else {
            return false;
        };
        let delta = Vec2::new(cursor.x - self.start_cursor.x, cursor.y - self.start_cursor.y);
        let grabbed_next = resize_bounds(grabbed_start, self.handle, delta);

        let scale_x = grabbed_next.width() / grabbed_start.width().max(1.0);
        let scale_y = grabbed_next.height() / grabbed_start.height().max(1.0);

        let mut changed = false;
        for component in components.iter_mut() {
            let Some(&start) = self.start_bounds.get(&component.id) else {
                continue;
            };
            let mut next = if component.id == self.grabbed {
                grabbed_next
            } else {
                match self.mode {
                    ResizeMode::Relative => {
                        let width = (start.width() * scale_x).max(MIN_WIDTH);
                        let height = (start.height() * scale_y).max(MIN_HEIGHT);
                        // Shift so the edge opposite the grabbed one stays
                        // fixed, mirroring the grabbed component's anchor.
                        let x = if self.handle.affects_west() {
                            start.x1 - width
                        } else {
                            start.x0
                        };
                        let y = if self.handle.affects_north() {
                            start.y1 - height
                        } else {
                            start.y0
                        };
                        Rect::new(x, y, x + width, y + height)
                    }
                    ResizeMode::Match => Rect::new(
                        start.x0,
                        start.y0,
                        start.x0 + grabbed_next.width(),
                        start.y0 + grabbed_next.height(),
                    ),
                }
            };
            if snap_enabled {
                next = crate::grid::snap_rect(next, grid);
            }
            if component.bounds() != next {
                component.set_bounds(next);
                changed = true;
            }
        }
        changed
    }
}

/// Resize a rectangle by dragging one of its handles, keeping the opposite
/// edges fixed and enforcing the minimum size floor.
fn resize_bounds(start: Rect, handle: HandleKind, delta: Vec2) -> Rect {
    let mut x0 = start.x0;
    let mut y0 = start.y0;
    let mut x1 = start.x1;
    let mut y1 = start.y1;
    if handle.affects_west() {
        x0 += delta.x;
    }
    if handle.affects_east() {
        x1 += delta.x;
    }
    if handle.affects_north() {
        y0 += delta.y;
    }
    if handle.affects_south() {
        y1 += delta.y;
    }

    let width = (x1 - x0).max(MIN_WIDTH);
    let height = (y1 - y0).max(MIN_HEIGHT);
    let x = if handle.affects_west() { start.x1 - width } else { start.x0 };
    let y = if handle.affects_north() { start.y1 - height } else { start.y0 };
    Rect::new(x, y, x + width, y + height)
}

/// Rubber-band state for box selection.
#[derive(Debug, Clone, Copy)]
pub struct BoxSelect {
    pub start: Point,
    pub current: Point,
}

impl BoxSelect {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
        }
    }

    /// The selection rectangle spanned so far.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.start.x.min(self.current.x),
            self.start.y.min(self.current.y),
            self.start.x.max(self.current.x),
            self.start.y.max(self.current.y),
        )
    }

    /// True once the pointer has moved enough to count as a real drag
    /// rather than a click on empty canvas.
    pub fn is_drag(&self) -> bool {
        (self.current.x - self.start.x).abs() > BOX_DRAG_THRESHOLD
            || (self.current.y - self.start.y).abs() > BOX_DRAG_THRESHOLD
    }
}

/// Ids of components whose bounds intersect the rectangle, in z-order.
pub fn components_in_rect(components: &[Component], rect: Rect) -> Vec<ComponentId> {
    components
        .iter()
        .filter(|c| rects_intersect(c.bounds(), rect))
        .map(|c| c.id)
        .collect()
}

/// Ids of components whose bounds intersect the lasso polygon, in z-order.
pub fn components_in_lasso(components: &[Component], lasso: &[Point]) -> Vec<ComponentId> {
    if lasso.len() < 3 {
        return Vec::new();
    }
    components
        .iter()
        .filter(|c| rect_intersects_polygon(c.bounds(), lasso))
        .map(|c| c.id)
        .collect()
}

fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Test whether a rectangle touches a closed polygon: any polygon vertex
/// inside the rect, any rect corner inside the polygon, or any edge
/// crossing.
fn rect_intersects_polygon(rect: Rect, polygon: &[Point]) -> bool {
    if polygon.iter().any(|p| rect.contains(*p)) {
        return true;
    }
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    if corners.iter().any(|c| point_in_polygon(*c, polygon)) {
        return true;
    }
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        for &(c, d) in &edges {
            if segments_intersect(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

/// Ray-casting point-in-polygon test.
fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Test if two line segments (a-b) and (c-d) intersect.
fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear cases: check if an endpoint lies on the other segment
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use crate::grid::{compute_grid, GridSpec};

    fn component_at(x: f64, y: f64, w: f64, h: f64) -> Component {
        Component::with_bounds(ComponentKind::Card, Rect::new(x, y, x + w, y + h))
    }

    fn select_all(components: &[Component]) -> SelectionSet {
        let mut selection = SelectionSet::new();
        for c in components {
            selection.push(c.id);
        }
        selection
    }

    #[test]
    fn test_selection_recency_order() {
        let a = component_at(0.0, 0.0, 100.0, 50.0);
        let b = component_at(200.0, 0.0, 100.0, 50.0);
        let mut selection = SelectionSet::new();
        selection.push(a.id);
        selection.push(b.id);
        assert_eq!(selection.last(), Some(b.id));

        // Re-pushing moves to the recency end.
        selection.push(a.id);
        assert_eq!(selection.last(), Some(a.id));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_selection_toggle() {
        let a = component_at(0.0, 0.0, 100.0, 50.0);
        let mut selection = SelectionSet::new();
        selection.toggle(a.id);
        assert!(selection.contains(a.id));
        selection.toggle(a.id);
        assert!(!selection.contains(a.id));
    }

    #[test]
    fn test_selection_extend_range() {
        let components: Vec<Component> = (0..5)
            .map(|i| component_at(i as f64 * 120.0, 0.0, 100.0, 50.0))
            .collect();
        let mut selection = SelectionSet::new();
        selection.replace(components[1].id);
        selection.extend_range(&components, components[3].id);

        assert_eq!(selection.len(), 3);
        assert!(selection.contains(components[1].id));
        assert!(selection.contains(components[2].id));
        assert!(selection.contains(components[3].id));
        assert!(!selection.contains(components[0].id));
    }

    #[test]
    fn test_selection_prune_drops_stale_ids() {
        let mut components = vec![
            component_at(0.0, 0.0, 100.0, 50.0),
            component_at(200.0, 0.0, 100.0, 50.0),
        ];
        let mut selection = select_all(&components);
        components.remove(0);
        selection.prune(&components);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.ids()[0], components[0].id);
    }

    #[test]
    fn test_hit_test_prefers_front() {
        let back = component_at(0.0, 0.0, 100.0, 100.0);
        let front = component_at(50.0, 50.0, 100.0, 100.0);
        let components = vec![back.clone(), front.clone()];
        let selection = SelectionSet::new();

        assert_eq!(
            hit_test(&components, &selection, Point::new(75.0, 75.0)),
            HitTarget::Body(front.id)
        );
        assert_eq!(
            hit_test(&components, &selection, Point::new(25.0, 25.0)),
            HitTarget::Body(back.id)
        );
        assert_eq!(
            hit_test(&components, &selection, Point::new(300.0, 300.0)),
            HitTarget::Background
        );
    }

    #[test]
    fn test_hit_test_handles_require_selection() {
        let card = component_at(100.0, 100.0, 100.0, 60.0);
        let components = vec![card.clone()];
        let corner = Point::new(100.0, 100.0);

        let unselected = SelectionSet::new();
        assert_eq!(
            hit_test(&components, &unselected, corner),
            HitTarget::Body(card.id)
        );

        let mut selected = SelectionSet::new();
        selected.replace(card.id);
        assert_eq!(
            hit_test(&components, &selected, corner),
            HitTarget::Handle(card.id, HandleKind::NorthWest)
        );
    }

    #[test]
    fn test_handle_at_margin() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 60.0);
        assert_eq!(
            handle_at(bounds, Point::new(98.0, 58.0)),
            Some(HandleKind::SouthEast)
        );
        assert_eq!(
            handle_at(bounds, Point::new(50.0, 2.0)),
            Some(HandleKind::North)
        );
        assert_eq!(handle_at(bounds, Point::new(50.0, 30.0)), None);
        // 8px margin outside the bounds also counts.
        assert_eq!(
            handle_at(bounds, Point::new(106.0, 30.0)),
            Some(HandleKind::East)
        );
    }

    #[test]
    fn test_drag_preserves_relative_offsets() {
        let mut components = vec![
            component_at(0.0, 0.0, 100.0, 50.0),
            component_at(150.0, 80.0, 100.0, 50.0),
            component_at(300.0, 10.0, 100.0, 50.0),
        ];
        let selection = select_all(&components);
        let grid = compute_grid(1200.0, GridSpec::default());
        let before: Vec<Point> = components.iter().map(|c| c.origin()).collect();

        let cursor = Point::new(20.0, 20.0);
        let drag = DragState::begin(&components, &selection, components[0].id, cursor);
        drag.update(
            &mut components,
            Point::new(cursor.x + 137.0, cursor.y + 93.0),
            grid,
            true,
        );

        // Relative offsets survive up to one grid cell per axis.
        for i in 0..components.len() {
            for j in (i + 1)..components.len() {
                let before_dx = before[i].x - before[j].x;
                let before_dy = before[i].y - before[j].y;
                let after_dx = components[i].x - components[j].x;
                let after_dy = components[i].y - components[j].y;
                assert!((after_dx - before_dx).abs() <= grid.cell_width);
                assert!((after_dy - before_dy).abs() <= grid.cell_height);
            }
        }
    }

    #[test]
    fn test_drag_without_snap_is_exact() {
        let mut components = vec![
            component_at(0.0, 0.0, 100.0, 50.0),
            component_at(150.0, 80.0, 100.0, 50.0),
        ];
        let selection = select_all(&components);
        let grid = compute_grid(1200.0, GridSpec::default());

        let cursor = Point::new(10.0, 10.0);
        let drag = DragState::begin(&components, &selection, components[0].id, cursor);
        drag.update(
            &mut components,
            Point::new(cursor.x + 33.0, cursor.y + 7.0),
            grid,
            false,
        );

        assert_eq!(components[0].origin(), Point::new(33.0, 7.0));
        assert_eq!(components[1].origin(), Point::new(183.0, 87.0));
    }

    #[test]
    fn test_drag_only_moves_selection() {
        let mut components = vec![
            component_at(0.0, 0.0, 100.0, 50.0),
            component_at(150.0, 80.0, 100.0, 50.0),
        ];
        let mut selection = SelectionSet::new();
        selection.replace(components[0].id);
        let grid = compute_grid(1200.0, GridSpec::default());

        let cursor = Point::new(10.0, 10.0);
        let drag = DragState::begin(&components, &selection, components[0].id, cursor);
        drag.update(
            &mut components,
            Point::new(cursor.x + 50.0, cursor.y),
            grid,
            false,
        );

        assert_eq!(components[0].origin(), Point::new(50.0, 0.0));
        assert_eq!(components[1].origin(), Point::new(150.0, 80.0));
    }

    #[test]
    fn test_relative_resize_scales_selection() {
        let mut components = vec![
            component_at(0.0, 0.0, 100.0, 100.0),
            component_at(200.0, 0.0, 80.0, 60.0),
        ];
        let selection = select_all(&components);
        let grid = compute_grid(1200.0, GridSpec::default());

        let grabbed = components[0].id;
        let cursor = Point::new(100.0, 100.0);
        let resize = ResizeState::begin(
            &components,
            &selection,
            grabbed,
            HandleKind::SouthEast,
            ResizeMode::Relative,
            cursor,
        );
        resize.update(&mut components, Point::new(150.0, 150.0), grid, false);

        // Grabbed scaled 1.5x on both axes; the other follows the same scale.
        assert!((components[0].width - 150.0).abs() < f64::EPSILON);
        assert!((components[0].height - 150.0).abs() < f64::EPSILON);
        assert!((components[1].width - 120.0).abs() < f64::EPSILON);
        assert!((components[1].height - 90.0).abs() < f64::EPSILON);
        // Positions anchored on the north-west stay fixed.
        assert_eq!(components[1].origin(), Point::new(200.0, 0.0));
    }

    #[test]
    fn test_relative_resize_enforces_floor() {
        let mut components = vec![
            component_at(0.0, 0.0, 100.0, 100.0),
            component_at(200.0, 0.0, 80.0, 60.0),
        ];
        let selection = select_all(&components);
        let grid = compute_grid(1200.0, GridSpec::default());

        let grabbed = components[0].id;
        let resize = ResizeState::begin(
            &components,
            &selection,
            grabbed,
            HandleKind::SouthEast,
            ResizeMode::Relative,
            Point::new(100.0, 100.0),
        );
        resize.update(&mut components, Point::new(5.0, 5.0), grid, false);

        for component in &components {
            assert!(component.width >= MIN_WIDTH);
            assert!(component.height >= MIN_HEIGHT);
        }
    }

    #[test]
    fn test_west_resize_keeps_east_edge() {
        let mut components = vec![component_at(100.0, 100.0, 100.0, 60.0)];
        let mut selection = SelectionSet::new();
        selection.replace(components[0].id);
        let grid = compute_grid(1200.0, GridSpec::default());

        let resize = ResizeState::begin(
            &components,
            &selection,
            components[0].id,
            HandleKind::West,
            ResizeMode::Relative,
            Point::new(100.0, 130.0),
        );
        resize.update(&mut components, Point::new(80.0, 130.0), grid, false);

        let bounds = components[0].bounds();
        assert!((bounds.x1 - 200.0).abs() < f64::EPSILON);
        assert!((bounds.width() - 120.0).abs() < f64::EPSILON);
        // Height untouched by a pure horizontal handle.
        assert!((bounds.height() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_match_resize_clones_size_keeps_positions() {
        let mut components = vec![
            component_at(0.0, 0.0, 100.0, 100.0),
            component_at(300.0, 200.0, 80.0, 60.0),
        ];
        let selection = select_all(&components);
        let grid = compute_grid(1200.0, GridSpec::default());

        let grabbed = components[0].id;
        let resize = ResizeState::begin(
            &components,
            &selection,
            grabbed,
            HandleKind::SouthEast,
            ResizeMode::Match,
            Point::new(100.0, 100.0),
        );
        resize.update(&mut components, Point::new(160.0, 130.0), grid, false);

        assert!((components[0].width - 160.0).abs() < f64::EPSILON);
        assert!((components[1].width - 160.0).abs() < f64::EPSILON);
        assert!((components[1].height - 130.0).abs() < f64::EPSILON);
        // Only the grabbed component may reposition.
        assert_eq!(components[1].origin(), Point::new(300.0, 200.0));
    }

    #[test]
    fn test_snapped_resize_rounds_to_whole_cells() {
        let mut components = vec![component_at(0.0, 0.0, 100.0, 80.0)];
        let mut selection = SelectionSet::new();
        selection.replace(components[0].id);
        let grid = Grid {
            cell_width: 50.0,
            cell_height: 40.0,
        };

        let resize = ResizeState::begin(
            &components,
            &selection,
            components[0].id,
            HandleKind::SouthEast,
            ResizeMode::Relative,
            Point::new(100.0, 80.0),
        );
        resize.update(&mut components, Point::new(130.0, 95.0), grid, true);

        let bounds = components[0].bounds();
        assert!((bounds.width() % grid.cell_width).abs() < f64::EPSILON);
        assert!((bounds.height() % grid.cell_height).abs() < f64::EPSILON);
        assert!(bounds.width() >= grid.cell_width);
    }

    #[test]
    fn test_box_select_threshold() {
        let mut select = BoxSelect::new(Point::new(10.0, 10.0));
        select.current = Point::new(13.0, 14.0);
        assert!(!select.is_drag());
        select.current = Point::new(13.0, 17.0);
        assert!(select.is_drag());
    }

    #[test]
    fn test_components_in_rect() {
        let components = vec![
            component_at(0.0, 0.0, 100.0, 50.0),
            component_at(300.0, 300.0, 100.0, 50.0),
        ];
        let hit = components_in_rect(&components, Rect::new(50.0, 25.0, 200.0, 200.0));
        assert_eq!(hit, vec![components[0].id]);
    }

    #[test]
    fn test_components_in_lasso() {
        let components = vec![
            component_at(10.0, 10.0, 50.0, 30.0),
            component_at(300.0, 300.0, 50.0, 30.0),
        ];
        // Triangle around the first component.
        let lasso = vec![
            Point::new(0.0, 0.0),
            Point::new(120.0, 0.0),
            Point::new(0.0, 120.0),
        ];
        let hit = components_in_lasso(&components, &lasso);
        assert_eq!(hit, vec![components[0].id]);
    }

    #[test]
    fn test_lasso_too_short_selects_nothing() {
        let components = vec![component_at(10.0, 10.0, 50.0, 30.0)];
        let lasso = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        assert!(components_in_lasso(&components, &lasso).is_empty());
    }
}

//! Editor session: tool routing, settings, and event flow.
//!
//! The session is an explicit, injectable state object: multiple editors
//! (and unit tests) run side by side without shared globals. It owns the
//! component list for the duration of editing and reports every mutation
//! through its event queue; the embedding shell drains [`EngineEvent`]s and
//! re-reads state after each batch.

use crate::component::{Component, ComponentId, ComponentKind, SerializableColor, MIN_HEIGHT, MIN_WIDTH};
use crate::error::Notice;
use crate::frame::FrameCoalescer;
use crate::grid::{compute_grid, snap, snap_rect, Grid, GridSpec};
use crate::history::{HistoryEntry, HistoryLog};
use crate::input::{Key, KeyPress, Modifiers, MouseButton, PointerEvent, ToolMode};
use crate::raster::{BlendMode, RasterSurface};
use crate::recognizer::recognize;
use crate::selection::{
    components_in_lasso, components_in_rect, hit_test, BoxSelect, DragState, HitTarget,
    ResizeMode, ResizeState, SelectionSet,
};
use crate::stroke::{simplify_path, BrushStyle, StrokeEngine};
use kurbo::{Point, Rect};

/// Tolerance for simplifying a gesture path before classification.
const GESTURE_SIMPLIFY_TOLERANCE: f64 = 1.5;
/// Paste offset (px) when grid snapping is off.
const PASTE_OFFSET: f64 = 10.0;

/// Session-level settings, injectable per editor instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub grid: GridSpec,
    pub snap_to_grid: bool,
    pub resize_mode: ResizeMode,
    pub pen_width: f64,
    pub eraser_width: f64,
    pub pen_color: SerializableColor,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            snap_to_grid: true,
            resize_mode: ResizeMode::default(),
            pen_width: 4.0,
            eraser_width: 12.0,
            pen_color: SerializableColor::black(),
        }
    }
}

/// Engine-to-shell notifications, drained with [`EditorSession::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The component list changed; re-read [`EditorSession::components`].
    ComponentsChanged,
    /// The raster surface changed; repaint it.
    RasterChanged,
    /// The selection set changed.
    SelectionChanged,
    /// A gesture was recognized and placed as this kind.
    ComponentRecognized(ComponentKind),
    /// A no-op or degraded operation worth surfacing.
    Notice(Notice),
}

/// The gesture the cursor/lasso tools are currently performing.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    None,
    Drag(DragState),
    Resize(ResizeState),
    Box(BoxSelect),
    Lasso(Vec<Point>),
}

/// One editor session over a canvas.
#[derive(Debug)]
pub struct EditorSession {
    pub settings: SessionSettings,
    tool: ToolMode,
    components: Vec<Component>,
    selection: SelectionSet,
    stroke: StrokeEngine,
    history: HistoryLog,
    grid: Grid,
    canvas_width: f64,
    clipboard: Vec<Component>,
    gesture: Gesture,
    /// Latest pointer position awaiting the next frame. Repeated moves
    /// before the frame overwrite it; the frame only sees the last one.
    pending_preview: FrameCoalescer<Point>,
    /// Set on drag/resize release; absorbs the background press that
    /// follows so it is not misread as a deselecting click. Cleared by the
    /// press that consumed it.
    just_transformed: bool,
    /// Whether the active drag/resize actually changed anything.
    gesture_dirty: bool,
    /// True between primary pointer-down and pointer-up. Guards against
    /// moves arriving without a press.
    pointer_down: bool,
    events: Vec<EngineEvent>,
}

impl EditorSession {
    /// Create a session for a canvas of the given width.
    pub fn new(canvas_width: f64) -> Self {
        Self::with_settings(canvas_width, SessionSettings::default())
    }

    pub fn with_settings(canvas_width: f64, settings: SessionSettings) -> Self {
        let grid = compute_grid(canvas_width, settings.grid);
        Self {
            settings,
            tool: ToolMode::default(),
            components: Vec::new(),
            selection: SelectionSet::new(),
            stroke: StrokeEngine::new(),
            history: HistoryLog::new(HistoryEntry::new(Vec::new(), None)),
            grid,
            canvas_width,
            clipboard: Vec::new(),
            gesture: Gesture::None,
            pending_preview: FrameCoalescer::new(),
            just_transformed: false,
            gesture_dirty: false,
            pointer_down: false,
            events: Vec::new(),
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drain queued engine events.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Switch the active tool. Any gesture in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolMode) {
        if self.tool == tool {
            return;
        }
        if self.stroke.is_capturing() {
            log::debug!("tool changed mid-capture; dropping stroke state");
        }
        self.stroke.reset();
        self.gesture = Gesture::None;
        self.pending_preview.cancel();
        self.pointer_down = false;
        self.gesture_dirty = false;
        self.tool = tool;
    }

    /// Resize notification from the surrounding layout; re-derives the grid.
    pub fn set_canvas_size(&mut self, width: f64) {
        self.canvas_width = width;
        self.grid = compute_grid(width, self.settings.grid);
    }

    /// Feed a pointer event in canvas-local coordinates.
    pub fn handle_pointer(&mut self, surface: &mut dyn RasterSurface, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(surface, position, button, modifiers),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up {
                position, button, ..
            } => self.pointer_up(surface, position, button),
        }
    }

    /// Pointer press. Establishes all gesture state synchronously, before
    /// any move event can be processed.
    pub fn pointer_down(
        &mut self,
        surface: &mut dyn RasterSurface,
        point: Point,
        button: MouseButton,
        modifiers: Modifiers,
    ) {
        if button != MouseButton::Primary {
            return;
        }
        self.pointer_down = true;
        self.gesture_dirty = false;
        match self.tool {
            ToolMode::Pen | ToolMode::Eraser | ToolMode::Wand => {
                self.stroke.brush = self.brush_for_tool();
                self.stroke.begin(surface, point);
            }
            ToolMode::Cursor => {
                let hit = hit_test(&self.components, &self.selection, point);
                self.dispatch_cursor_press(hit, point, modifiers);
            }
            ToolMode::Lasso => {
                self.gesture = Gesture::Lasso(vec![point]);
            }
            ToolMode::TextSelect => {}
        }
    }

    /// Pointer move. Samples are recorded immediately; preview redraw and
    /// transform recompute are coalesced to the next frame.
    pub fn pointer_move(&mut self, point: Point) {
        if !self.pointer_down {
            // Move without a press is inconsistent gesture state; drop it.
            log::debug!("pointer move without down; ignored");
            return;
        }
        if self.stroke.is_capturing() {
            self.stroke.add_sample(point);
        }
        self.pending_preview.push(point);
    }

    /// Per-frame callback: runs the coalesced pointer work and settles the
    /// pending history entry.
    pub fn on_frame(&mut self, surface: &mut dyn RasterSurface) {
        if let Some(point) = self.pending_preview.take() {
            self.apply_move(surface, point);
        }
        self.history.flush();
    }

    /// Pointer release. Applies any pending move, then ends the gesture.
    pub fn pointer_up(
        &mut self,
        surface: &mut dyn RasterSurface,
        point: Point,
        button: MouseButton,
    ) {
        if button != MouseButton::Primary {
            return;
        }
        if !self.pointer_down {
            log::debug!("pointer up without down; ignored");
            return;
        }
        self.pending_preview.cancel();
        self.apply_move(surface, point);
        self.pointer_down = false;

        match self.tool {
            ToolMode::Pen | ToolMode::Eraser => {
                if self.stroke.end(surface).is_some() {
                    self.stroke.clear_gesture();
                    self.touch_raster(surface);
                }
            }
            ToolMode::Wand => {
                // Strokes stay accumulated until the explicit recognize
                // trigger (Enter).
                if self.stroke.end(surface).is_some() {
                    self.touch_raster(surface);
                }
            }
            ToolMode::Cursor => self.finish_cursor_gesture(),
            ToolMode::Lasso => {
                if let Gesture::Lasso(points) = std::mem::take(&mut self.gesture) {
                    self.selection
                        .replace_all(components_in_lasso(&self.components, &points));
                    self.events.push(EngineEvent::SelectionChanged);
                }
            }
            ToolMode::TextSelect => {}
        }
    }

    /// Keyboard shortcut surface.
    pub fn handle_key(&mut self, surface: &mut dyn RasterSurface, press: KeyPress) {
        let mods = press.modifiers;
        match press.key {
            Key::Escape => self.cancel_or_deselect(surface),
            Key::Enter => {
                if self.tool == ToolMode::Wand {
                    self.recognize_gesture(surface);
                }
            }
            Key::Delete | Key::Backspace => self.delete_selection(),
            Key::A if mods.command => self.select_all(),
            Key::C if mods.command => self.copy_selection(),
            Key::V if mods.command => self.paste_clipboard(),
            Key::Z if mods.command && mods.shift => self.redo(surface),
            Key::Z if mods.command => self.undo(surface),
            Key::Y if mods.command => self.redo(surface),
            Key::ArrowLeft => self.nudge(-1.0, 0.0),
            Key::ArrowRight => self.nudge(1.0, 0.0),
            Key::ArrowUp => self.nudge(0.0, -1.0),
            Key::ArrowDown => self.nudge(0.0, 1.0),
            _ => {}
        }
    }

    /// Place a component from the palette at a position.
    pub fn place_component(&mut self, kind: ComponentKind, position: Point) -> ComponentId {
        let origin = if self.settings.snap_to_grid {
            snap(position, self.grid)
        } else {
            position
        };
        let component = Component::new(kind, origin);
        let id = component.id;
        self.components.push(component);
        self.selection.replace(id);
        self.events.push(EngineEvent::SelectionChanged);
        self.touch_components();
        id
    }

    /// Delete the selected components.
    pub fn delete_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let doomed: Vec<ComponentId> = self.selection.ids().to_vec();
        self.components.retain(|c| !doomed.contains(&c.id));
        self.selection.prune(&self.components);
        self.events.push(EngineEvent::SelectionChanged);
        self.touch_components();
    }

    /// Delete every component and wipe the ink.
    pub fn clear_all(&mut self, surface: &mut dyn RasterSurface) {
        self.components.clear();
        self.selection.clear();
        self.stroke.reset();
        surface.clear();
        self.events.push(EngineEvent::SelectionChanged);
        self.events.push(EngineEvent::ComponentsChanged);
        self.events.push(EngineEvent::RasterChanged);
        self.history
            .record(self.components.clone(), surface.encode().ok());
    }

    /// Select every component.
    pub fn select_all(&mut self) {
        self.selection
            .replace_all(self.components.iter().map(|c| c.id).collect());
        self.events.push(EngineEvent::SelectionChanged);
    }

    /// Copy the selection to the session clipboard, in z-order.
    pub fn copy_selection(&mut self) {
        self.clipboard = self
            .components
            .iter()
            .filter(|c| self.selection.contains(c.id))
            .cloned()
            .collect();
    }

    /// Paste the clipboard with fresh ids, offset so the copies are visible,
    /// and select them.
    pub fn paste_clipboard(&mut self) {
        if self.clipboard.is_empty() {
            return;
        }
        let (dx, dy) = if self.settings.snap_to_grid {
            (self.grid.cell_width, self.grid.cell_height)
        } else {
            (PASTE_OFFSET, PASTE_OFFSET)
        };
        let mut pasted_ids = Vec::with_capacity(self.clipboard.len());
        for source in self.clipboard.clone() {
            let mut copy = source;
            copy.regenerate_id();
            copy.x += dx;
            copy.y += dy;
            pasted_ids.push(copy.id);
            self.components.push(copy);
        }
        self.selection.replace_all(pasted_ids);
        self.events.push(EngineEvent::SelectionChanged);
        self.touch_components();
    }

    /// Move the selection by one step: a grid cell when snapping, a pixel
    /// when not. Repeated presses within one tick coalesce into one entry.
    pub fn nudge(&mut self, direction_x: f64, direction_y: f64) {
        if self.selection.is_empty() {
            return;
        }
        let (dx, dy) = if self.settings.snap_to_grid {
            (
                direction_x * self.grid.cell_width,
                direction_y * self.grid.cell_height,
            )
        } else {
            (direction_x, direction_y)
        };
        for component in &mut self.components {
            if self.selection.contains(component.id) {
                component.x += dx;
                component.y += dy;
            }
        }
        self.touch_components();
    }

    /// Set a widget-specific property on a component.
    pub fn set_component_prop(&mut self, id: ComponentId, key: &str, value: String) {
        if let Some(component) = self.components.iter_mut().find(|c| c.id == id) {
            component.props.insert(key.to_string(), value);
            self.touch_components();
        }
    }

    /// Set or clear a component's color override.
    pub fn set_component_color(&mut self, id: ComponentId, color: Option<SerializableColor>) {
        if let Some(component) = self.components.iter_mut().find(|c| c.id == id) {
            component.color = color;
            self.touch_components();
        }
    }

    /// Step back in history and apply the restored state.
    pub fn undo(&mut self, surface: &mut dyn RasterSurface) {
        let Some(entry) = self.history.undo().cloned() else {
            self.events.push(EngineEvent::Notice(Notice::NothingToUndo));
            return;
        };
        self.apply_entry(surface, entry);
    }

    /// Step forward in history and apply the restored state.
    pub fn redo(&mut self, surface: &mut dyn RasterSurface) {
        let Some(entry) = self.history.redo().cloned() else {
            self.events.push(EngineEvent::Notice(Notice::NothingToRedo));
            return;
        };
        self.apply_entry(surface, entry);
    }

    /// Run the recognizer over the accumulated gesture and place the
    /// matching component, replacing the gesture ink.
    pub fn recognize_gesture(&mut self, surface: &mut dyn RasterSurface) {
        let path = simplify_path(self.stroke.gesture_path(), GESTURE_SIMPLIFY_TOLERANCE);
        if path.len() < 2 {
            self.stroke.clear_gesture();
            self.events
                .push(EngineEvent::Notice(Notice::RecognitionMiss));
            return;
        }
        match recognize(&path) {
            Some(kind) => {
                self.stroke.lift_gesture(surface);
                let bounds = gesture_bounds(&path);
                let mut rect = Rect::new(
                    bounds.x0,
                    bounds.y0,
                    bounds.x0 + bounds.width().max(MIN_WIDTH),
                    bounds.y0 + bounds.height().max(MIN_HEIGHT),
                );
                if self.settings.snap_to_grid {
                    rect = snap_rect(rect, self.grid);
                }
                let component = Component::with_bounds(kind, rect);
                let id = component.id;
                self.components.push(component);
                self.selection.replace(id);
                log::info!("gesture recognized as {}", kind.label());
                self.events.push(EngineEvent::ComponentRecognized(kind));
                self.events.push(EngineEvent::SelectionChanged);
                self.events.push(EngineEvent::ComponentsChanged);
                self.events.push(EngineEvent::RasterChanged);
                // One user action: the component placement and the lifted
                // ink coalesce into a single history entry.
                self.history
                    .record(self.components.clone(), surface.encode().ok());
            }
            None => {
                // Manual fallback: the ink stays where the user drew it.
                self.stroke.clear_gesture();
                self.events
                    .push(EngineEvent::Notice(Notice::RecognitionMiss));
            }
        }
    }

    fn brush_for_tool(&self) -> BrushStyle {
        match self.tool {
            ToolMode::Eraser => BrushStyle {
                width: self.settings.eraser_width,
                color: SerializableColor::black(),
                mode: BlendMode::DestinationOut,
            },
            _ => BrushStyle {
                width: self.settings.pen_width,
                color: self.settings.pen_color,
                mode: BlendMode::SourceOver,
            },
        }
    }

    /// Route a cursor press by its explicit hit-test result.
    fn dispatch_cursor_press(&mut self, hit: HitTarget, point: Point, modifiers: Modifiers) {
        match hit {
            HitTarget::Handle(id, handle) => {
                self.just_transformed = false;
                if !self.selection.contains(id) {
                    self.selection.replace(id);
                    self.events.push(EngineEvent::SelectionChanged);
                }
                self.gesture = Gesture::Resize(ResizeState::begin(
                    &self.components,
                    &self.selection,
                    id,
                    handle,
                    self.settings.resize_mode,
                    point,
                ));
            }
            HitTarget::Body(id) => {
                self.just_transformed = false;
                if modifiers.command {
                    self.selection.toggle(id);
                    self.events.push(EngineEvent::SelectionChanged);
                } else if modifiers.shift {
                    self.selection.extend_range(&self.components, id);
                    self.events.push(EngineEvent::SelectionChanged);
                } else {
                    if !self.selection.contains(id) {
                        self.selection.replace(id);
                        self.events.push(EngineEvent::SelectionChanged);
                    } else {
                        // Keep the set, refresh recency for range anchoring.
                        self.selection.push(id);
                    }
                    self.gesture = Gesture::Drag(DragState::begin(
                        &self.components,
                        &self.selection,
                        id,
                        point,
                    ));
                }
            }
            HitTarget::Background => {
                if self.just_transformed {
                    // The press right after a transform release is not a
                    // deselect.
                    self.just_transformed = false;
                } else if !modifiers.command && !modifiers.shift && !self.selection.is_empty() {
                    self.selection.clear();
                    self.events.push(EngineEvent::SelectionChanged);
                }
                self.gesture = Gesture::Box(BoxSelect::new(point));
            }
        }
    }

    /// Frame-rate application of the latest pointer position.
    fn apply_move(&mut self, surface: &mut dyn RasterSurface, point: Point) {
        match self.tool {
            ToolMode::Pen | ToolMode::Eraser | ToolMode::Wand => {
                if self.stroke.is_capturing() {
                    self.stroke.add_sample(point);
                    self.stroke.redraw_preview(surface);
                    self.events.push(EngineEvent::RasterChanged);
                }
            }
            ToolMode::Cursor => match &mut self.gesture {
                Gesture::Drag(drag) => {
                    if drag.update(
                        &mut self.components,
                        point,
                        self.grid,
                        self.settings.snap_to_grid,
                    ) {
                        self.gesture_dirty = true;
                        self.events.push(EngineEvent::ComponentsChanged);
                    }
                }
                Gesture::Resize(resize) => {
                    if resize.update(
                        &mut self.components,
                        point,
                        self.grid,
                        self.settings.snap_to_grid,
                    ) {
                        self.gesture_dirty = true;
                        self.events.push(EngineEvent::ComponentsChanged);
                    }
                }
                Gesture::Box(select) => {
                    select.current = point;
                }
                _ => {}
            },
            ToolMode::Lasso => {
                if let Gesture::Lasso(points) = &mut self.gesture {
                    if points.last().map(|p| p.distance(point) > 2.0).unwrap_or(true) {
                        points.push(point);
                    }
                }
            }
            ToolMode::TextSelect => {}
        }
    }

    /// Release handling for the cursor tool.
    fn finish_cursor_gesture(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Drag(_) | Gesture::Resize(_) => {
                if self.gesture_dirty {
                    self.just_transformed = true;
                    self.touch_components();
                }
                self.gesture_dirty = false;
            }
            Gesture::Box(select) => {
                if select.is_drag() {
                    self.selection
                        .replace_all(components_in_rect(&self.components, select.rect()));
                    self.events.push(EngineEvent::SelectionChanged);
                }
            }
            _ => {}
        }
    }

    /// Escape: cancel whatever gesture is live, otherwise deselect.
    fn cancel_or_deselect(&mut self, surface: &mut dyn RasterSurface) {
        if self.stroke.is_capturing() {
            self.stroke.cancel(surface);
            self.pointer_down = false;
            self.pending_preview.cancel();
            self.events.push(EngineEvent::RasterChanged);
            return;
        }
        if self.tool == ToolMode::Wand && !self.stroke.gesture_path().is_empty() {
            // Abandon the pending recognition gesture and lift its ink.
            self.stroke.lift_gesture(surface);
            self.events.push(EngineEvent::RasterChanged);
            self.history
                .record(self.components.clone(), surface.encode().ok());
            return;
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::None => {}
            gesture @ (Gesture::Drag(_) | Gesture::Resize(_)) => {
                // The last applied snapped state stays committed.
                self.gesture = gesture;
                self.finish_cursor_gesture();
                self.pointer_down = false;
                return;
            }
            Gesture::Box(_) | Gesture::Lasso(_) => {
                // A rubber band in progress vanishes without selecting.
                self.pointer_down = false;
                return;
            }
        }
        if !self.selection.is_empty() {
            self.selection.clear();
            self.events.push(EngineEvent::SelectionChanged);
        }
    }

    fn apply_entry(&mut self, surface: &mut dyn RasterSurface, entry: HistoryEntry) {
        self.history.begin_restore();
        self.components = entry.components;
        self.selection.prune(&self.components);
        match &entry.raster_image {
            Some(encoded) => {
                if let Err(err) = surface.apply_encoded(encoded) {
                    log::warn!("history raster restore skipped: {err}");
                }
            }
            None => surface.clear(),
        }
        self.history.end_restore();
        self.events.push(EngineEvent::ComponentsChanged);
        self.events.push(EngineEvent::RasterChanged);
        self.events.push(EngineEvent::SelectionChanged);
    }

    /// Report a component-list mutation: queue the event and open (or
    /// update) the pending history entry.
    fn touch_components(&mut self) {
        self.events.push(EngineEvent::ComponentsChanged);
        self.history.record(self.components.clone(), None);
    }

    /// Report a raster mutation. An unavailable surface is skipped; the
    /// entry then inherits the last captured image.
    fn touch_raster(&mut self, surface: &mut dyn RasterSurface) {
        self.events.push(EngineEvent::RasterChanged);
        let encoded = match surface.encode() {
            Ok(encoded) => Some(encoded),
            Err(err) => {
                log::debug!("raster snapshot skipped: {err}");
                None
            }
        };
        self.history.record(self.components.clone(), encoded);
    }
}

/// Bounding box of a gesture path.
fn gesture_bounds(path: &[Point]) -> Rect {
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for point in path {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    Rect::new(min_x, min_y, max_x, max_y)
}

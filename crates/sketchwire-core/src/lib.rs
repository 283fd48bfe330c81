//! Sketchwire Core Library
//!
//! Platform-agnostic interaction engine for the sketchwire wireframe canvas:
//! grid-disciplined coordinates, freehand ink with smoothed previews,
//! gesture-to-component recognition, multi-select transforms, and bounded
//! undo/redo over combined vector+raster state.

pub mod component;
pub mod error;
pub mod frame;
pub mod grid;
pub mod history;
pub mod input;
pub mod raster;
pub mod recognizer;
pub mod selection;
pub mod session;
pub mod stroke;

pub use component::{Component, ComponentId, ComponentKind, SerializableColor};
pub use error::{Notice, RasterError};
pub use frame::FrameCoalescer;
pub use grid::{compute_grid, snap, snap_rect, to_local_point, Grid, GridSpec};
pub use history::{HistoryEntry, HistoryLog, MAX_HISTORY};
pub use input::{Key, KeyPress, Modifiers, MouseButton, PointerEvent, ToolMode};
pub use raster::{BlendMode, PixelSurface, RasterSnapshot, RasterSurface};
pub use recognizer::recognize;
pub use selection::{HandleKind, HitTarget, ResizeMode, SelectionSet};
pub use session::{EditorSession, EngineEvent, SessionSettings};
pub use stroke::{BrushStyle, StrokeEngine};

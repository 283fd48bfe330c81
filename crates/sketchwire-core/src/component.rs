//! Component data model for placed widgets.

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for components, stable for the component's lifetime.
pub type ComponentId = Uuid;

/// Minimum component width enforced by resize operations.
pub const MIN_WIDTH: f64 = 50.0;
/// Minimum component height enforced by resize operations.
pub const MIN_HEIGHT: f64 = 30.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The fixed set of widget kinds the editor can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Button,
    Card,
    Checkbox,
    Divider,
    Avatar,
    Input,
    Label,
}

impl ComponentKind {
    /// Default size used when a component is placed without explicit bounds.
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            ComponentKind::Button => (120.0, 40.0),
            ComponentKind::Card => (240.0, 160.0),
            ComponentKind::Checkbox => (50.0, 30.0),
            ComponentKind::Divider => (200.0, 30.0),
            ComponentKind::Avatar => (60.0, 60.0),
            ComponentKind::Input => (180.0, 40.0),
            ComponentKind::Label => (100.0, 30.0),
        }
    }

    /// Display name for palettes and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Button => "Button",
            ComponentKind::Card => "Card",
            ComponentKind::Checkbox => "Checkbox",
            ComponentKind::Divider => "Divider",
            ComponentKind::Avatar => "Avatar",
            ComponentKind::Input => "Input",
            ComponentKind::Label => "Label",
        }
    }
}

/// A placed widget instance.
///
/// The component list is one ordered sequence owned by the editor session;
/// insertion order is z-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Optional per-component color override; `None` uses the palette default.
    pub color: Option<SerializableColor>,
    /// Open widget-specific fields (label text, placeholder, ...).
    #[serde(default)]
    pub props: BTreeMap<String, String>,
}

impl Component {
    /// Create a component of the given kind at a position, using the kind's
    /// default size.
    pub fn new(kind: ComponentKind, position: Point) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id: Uuid::new_v4(),
            kind,
            x: position.x,
            y: position.y,
            width,
            height,
            color: None,
            props: BTreeMap::new(),
        }
    }

    /// Create a component with explicit bounds.
    pub fn with_bounds(kind: ComponentKind, bounds: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x: bounds.x0,
            y: bounds.y0,
            width: bounds.width(),
            height: bounds.height(),
            color: None,
            props: BTreeMap::new(),
        }
    }

    /// The component's bounding rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the component so its top-left corner is at `origin`.
    pub fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }

    /// Replace position and size from a rectangle.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.x = bounds.x0;
        self.y = bounds.y0;
        self.width = bounds.width();
        self.height = bounds.height();
    }

    /// Check if a canvas-local point lies on the component body.
    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Give the component a fresh identifier. Used when pasting or
    /// duplicating so copies never alias the original.
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }
}

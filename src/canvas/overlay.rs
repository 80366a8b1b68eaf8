use egui::{pos2, vec2, Color32, Pos2, Rect, Vec2};

use crate::canvas::geometry::{bounding_rect, point_in_polygon};
use crate::canvas::text;

pub const DEFAULT_POSITION: Pos2 = pos2(100.0, 100.0);
pub const DEFAULT_TEXT: &str = "Edit me";
pub const DEFAULT_TEXT_WIDTH: f32 = 200.0;
pub const DEFAULT_FONT_SIZE: f32 = 20.0;
pub const LINE_HEIGHT: f32 = 1.16;
pub const DEFAULT_STROKE: Stroke = Stroke {
    color: Color32::BLACK,
    width: 2.0,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color32,
    pub width: f32,
}

impl Stroke {
    pub fn to_egui(self) -> egui::Stroke {
        egui::Stroke::new(self.width, self.color)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Triangle,
    Polygon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Rectangle,
        ShapeKind::Triangle,
        ShapeKind::Polygon,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Circle => "Circle",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Polygon => "Polygon",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFlag {
    Bold,
    Italic,
    Underline,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OverlayKind {
    Text {
        content: String,
        /// Wrap width
        width: f32,
        style: TextStyle,
    },
    Circle {
        radius: f32,
    },
    Rectangle {
        size: Vec2,
    },
    Triangle {
        size: Vec2,
    },
    /// Points relative to the overlay position.
    Polygon {
        points: Vec<Pos2>,
    },
}

/// A user-added element drawn over the base image.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub id: OverlayId,
    /// Top-left of the bounding box, canvas coordinates
    pub pos: Pos2,
    pub kind: OverlayKind,
    pub fill: Option<Color32>,
    pub stroke: Option<Stroke>,
}

impl Overlay {
    pub fn text(id: OverlayId) -> Self {
        Self {
            id,
            pos: DEFAULT_POSITION,
            kind: OverlayKind::Text {
                content: DEFAULT_TEXT.to_string(),
                width: DEFAULT_TEXT_WIDTH,
                style: TextStyle {
                    font_size: DEFAULT_FONT_SIZE,
                    bold: true,
                    italic: true,
                    underline: true,
                },
            },
            fill: Some(Color32::BLACK),
            stroke: None,
        }
    }

    /// Unfilled, black-outlined shape at the default position.
    pub fn shape(id: OverlayId, shape: ShapeKind) -> Self {
        let kind = match shape {
            ShapeKind::Circle => OverlayKind::Circle { radius: 50.0 },
            ShapeKind::Rectangle => OverlayKind::Rectangle {
                size: vec2(100.0, 50.0),
            },
            ShapeKind::Triangle => OverlayKind::Triangle {
                size: vec2(100.0, 100.0),
            },
            ShapeKind::Polygon => OverlayKind::Polygon {
                points: vec![
                    pos2(50.0, 0.0),
                    pos2(100.0, 50.0),
                    pos2(50.0, 100.0),
                    pos2(0.0, 50.0),
                ],
            },
        };
        Self {
            id,
            pos: DEFAULT_POSITION,
            kind,
            fill: None,
            stroke: Some(DEFAULT_STROKE),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, OverlayKind::Text { .. })
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        match &self.kind {
            OverlayKind::Text { style, .. } => Some(style),
            _ => None,
        }
    }

    pub fn text_content_mut(&mut self) -> Option<&mut String> {
        match &mut self.kind {
            OverlayKind::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Flip a text flag; returns false for shapes.
    pub fn toggle(&mut self, flag: TextFlag) -> bool {
        let OverlayKind::Text { style, .. } = &mut self.kind else {
            return false;
        };
        let slot = match flag {
            TextFlag::Bold => &mut style.bold,
            TextFlag::Italic => &mut style.italic,
            TextFlag::Underline => &mut style.underline,
        };
        *slot = !*slot;
        true
    }

    /// Absolute outline for polygonal shapes; `None` for circles and text.
    pub fn outline(&self) -> Option<Vec<Pos2>> {
        let o = self.pos.to_vec2();
        match &self.kind {
            OverlayKind::Rectangle { size } => Some(vec![
                self.pos,
                self.pos + vec2(size.x, 0.0),
                self.pos + *size,
                self.pos + vec2(0.0, size.y),
            ]),
            OverlayKind::Triangle { size } => Some(vec![
                self.pos + vec2(size.x * 0.5, 0.0),
                self.pos + *size,
                self.pos + vec2(0.0, size.y),
            ]),
            OverlayKind::Polygon { points } => Some(points.iter().map(|p| *p + o).collect()),
            OverlayKind::Circle { .. } | OverlayKind::Text { .. } => None,
        }
    }

    pub fn bounds(&self) -> Rect {
        match &self.kind {
            OverlayKind::Circle { radius } => {
                Rect::from_min_size(self.pos, Vec2::splat(radius * 2.0))
            }
            OverlayKind::Text { content, width, style } => {
                let rows = text::layout_lines(content, *width, style).len() as f32;
                Rect::from_min_size(self.pos, vec2(*width, rows * text::line_height(style)))
            }
            _ => self
                .outline()
                .map(|pts| bounding_rect(&pts))
                .unwrap_or(Rect::from_min_size(self.pos, Vec2::ZERO)),
        }
    }

    /// Hit test. Filled circles and polygons use their exact area; text and
    /// unfilled shapes use the bounding box so outlines stay easy to grab.
    pub fn contains(&self, p: Pos2) -> bool {
        if self.fill.is_none() || self.is_text() {
            return self.bounds().contains(p);
        }
        match &self.kind {
            OverlayKind::Circle { radius } => {
                let center = self.pos + Vec2::splat(*radius);
                (p - center).length() <= *radius
            }
            _ => self
                .outline()
                .is_some_and(|pts| point_in_polygon(p, &pts)),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }
}

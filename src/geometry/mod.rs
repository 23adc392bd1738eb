/// Geometry module
///
/// Pixel-space primitives shared by the field registry, the row adjuster and
/// the detection matcher. All coordinates are in the canonical screenshot
/// space (origin top-left, y growing downwards).
///
/// ## Layout
///
/// ```text
/// geometry
///   ├── Point / Bounds / Quad   (this file)
///   ├── registry                (named field rectangles)
///   └── rows                    (row-index → vertical offset)
/// ```
pub mod registry;
pub mod rows;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

pub use registry::{FieldRegistry, FieldSpec, MetadataField, PlayerField};
pub use rows::RowLayout;

/// A point in canonical pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its top-left and bottom-right corners.
///
/// Constructed through [`Bounds::new`], which rejects rectangles whose
/// bottom-right corner does not strictly dominate the top-left one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    top_left: Point,
    bottom_right: Point,
}

impl Bounds {
    /// Create bounds, failing with `InvalidBounds` unless
    /// `bottom_right.x > top_left.x` and `bottom_right.y > top_left.y`.
    pub fn new(top_left: Point, bottom_right: Point) -> Result<Self, GeometryError> {
        let bounds = Self {
            top_left,
            bottom_right,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Unchecked constructor for built-in layout tables
    pub(crate) const fn from_literal(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            top_left: Point::new(x1, y1),
            bottom_right: Point::new(x2, y2),
        }
    }

    /// Shorthand for `Bounds::new` from raw coordinates
    pub fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self, GeometryError> {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    pub fn width(&self) -> f32 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> f32 {
        self.bottom_right.y - self.top_left.y
    }

    /// Check strict dominance. NaN coordinates fail the comparison too.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let ok = self.bottom_right.x > self.top_left.x && self.bottom_right.y > self.top_left.y;
        if ok {
            Ok(())
        } else {
            Err(GeometryError::InvalidBounds {
                min_x: self.top_left.x,
                min_y: self.top_left.y,
                max_x: self.bottom_right.x,
                max_y: self.bottom_right.y,
            })
        }
    }

    /// Same rectangle moved down by `dy` pixels
    pub fn translate_y(&self, dy: f32) -> Self {
        Self {
            top_left: Point::new(self.top_left.x, self.top_left.y + dy),
            bottom_right: Point::new(self.bottom_right.x, self.bottom_right.y + dy),
        }
    }

    /// Inclusive containment test against the rectangle grown by `tolerance`
    /// pixels on every side.
    pub fn contains_with_tolerance(&self, point: Point, tolerance: f32) -> bool {
        point.x >= self.top_left.x - tolerance
            && point.x <= self.bottom_right.x + tolerance
            && point.y >= self.top_left.y - tolerance
            && point.y <= self.bottom_right.y + tolerance
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            top_left: Point,
            bottom_right: Point,
        }

        let raw = Raw::deserialize(deserializer)?;
        Bounds::new(raw.top_left, raw.bottom_right).map_err(serde::de::Error::custom)
    }
}

/// Four-corner region reported by an OCR engine. Not necessarily
/// axis-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    /// Axis-aligned quad from a pixel box (x, y, width, height)
    pub fn from_box(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self([
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ])
    }

    /// Arithmetic mean of the four corners.
    ///
    /// This is not the area centroid of the polygon; OCR boxes are close to
    /// rectangular so the corner mean lands in the same place.
    pub fn centroid(&self) -> Point {
        let (sx, sy) = self
            .0
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }
}

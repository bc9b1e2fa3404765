use crate::error::{FraxelError, FraxelResult};

pub use kurbo::{Insets, Point, Rect, Size, Vec2};

/// A shard outline: 3 or 4 vertices in card-local percent space (0..=100 on
/// both axes), wound in emission order.
pub type Polygon = smallvec::SmallVec<[Point; 4]>;

/// Axis-aligned box in card-local percent space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PercentBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentBox {
    /// Tight extents of a polygon. Empty polygons yield a zero box at origin.
    pub fn of_polygon(polygon: &Polygon) -> Self {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in polygon {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if polygon.is_empty() {
            return Self {
                min_x: 0.0,
                min_y: 0.0,
                width: 0.0,
                height: 0.0,
            };
        }
        Self {
            min_x,
            min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Grow by `bleed` percent on every side, clamped to the card's 0..=100
    /// square.
    pub fn expanded(self, bleed: f64) -> Self {
        let min_x = (self.min_x - bleed).max(0.0);
        let min_y = (self.min_y - bleed).max(0.0);
        let max_x = (self.min_x + self.width + bleed).min(100.0);
        let max_y = (self.min_y + self.height + bleed).min(100.0);
        Self {
            min_x,
            min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    pub fn max_x(self) -> f64 {
        self.min_x + self.width
    }

    pub fn max_y(self) -> f64 {
        self.min_y + self.height
    }
}

/// Viewport dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> FraxelResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(FraxelError::validation("viewport dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Freshly measured geometry of a mounted card: rendered content size and
/// content padding, both in pixels. Never cached by the engine — hosts
/// re-measure on every recompute trigger.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardMetrics {
    pub width: f64,
    pub height: f64,
    pub padding: Insets,
}

impl CardMetrics {
    pub fn new(width: f64, height: f64, padding: Insets) -> FraxelResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(FraxelError::validation("card dimensions must be > 0"));
        }
        Ok(Self {
            width,
            height,
            padding,
        })
    }
}

/// Per-shard visual transform. `translate` is in layout units (pixels),
/// `depth` is the Z offset, `rotate` the in-plane rotation in degrees and
/// `tilt_x`/`tilt_y` the 3D tilt in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShardTransform {
    pub translate: Vec2,
    pub depth: f64,
    pub rotate: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub scale: f64,
}

impl ShardTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::new(0.0, 0.0),
        depth: 0.0,
        rotate: 0.0,
        tilt_x: 0.0,
        tilt_y: 0.0,
        scale: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Linear interpolation from `self` toward the identity transform.
    /// `t = 1` returns the identity exactly, not a float-noise neighbour.
    pub fn toward_identity(&self, t: f64) -> Self {
        if t >= 1.0 {
            return Self::IDENTITY;
        }
        let t = t.max(0.0);
        let inv = 1.0 - t;
        Self {
            translate: self.translate * inv,
            depth: self.depth * inv,
            rotate: self.rotate * inv,
            tilt_x: self.tilt_x * inv,
            tilt_y: self.tilt_y * inv,
            scale: self.scale + (1.0 - self.scale) * t,
        }
    }
}

/// Round to 3 decimals. Emitted percent coordinates are quantized so adjacent
/// shards agree on shared edges down to the rendered clip path.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

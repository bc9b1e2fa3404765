use std::f64::consts::TAU;

use crate::{
    core::{CardMetrics, PercentBox, Polygon, ShardTransform, Vec2},
    error::{FraxelError, FraxelResult},
    rng::RandomSource,
};

/// Default bleed margin in percent of the card dimension. Hides sub-pixel
/// seams between adjacent shards; overlap-only and symmetric, so it never
/// affects tiling.
pub const DEFAULT_BLEED: f64 = 0.45;

/// One decomposed piece of a card, ready to be rendered as an independently
/// transformable fragment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShardSpec {
    /// Raw outline in card-local percent space.
    pub polygon: Polygon,
    /// Bled bounding box, clamped to the card square.
    pub bounding_box: PercentBox,
    /// Outline re-expressed in the bled box's own 0..=100 frame (clip-path
    /// coordinates).
    pub normalized_polygon: Polygon,
    /// Pixel translation for the shard's full-size content copy, computed
    /// from the *unbled* box origin so content stays registered across the
    /// bleed overlap.
    pub content_offset: Vec2,
    /// Exploded rest state before assembly.
    pub initial_transform: ShardTransform,
}

impl ShardSpec {
    /// Recompute pixel-space quantities after a responsive reflow. Percent
    /// geometry is fixed; only the pixel mapping changes.
    pub fn remeasure(&mut self, metrics: &CardMetrics) {
        let raw = PercentBox::of_polygon(&self.polygon);
        self.content_offset = content_offset(raw, metrics);
    }
}

/// Resolve one polygon into a full [`ShardSpec`].
pub fn resolve_shard(
    polygon: Polygon,
    bleed: f64,
    metrics: &CardMetrics,
    rng: &mut dyn RandomSource,
) -> FraxelResult<ShardSpec> {
    if !(polygon.len() == 3 || polygon.len() == 4) {
        return Err(FraxelError::geometry(format!(
            "shard polygon must have 3 or 4 vertices, got {}",
            polygon.len()
        )));
    }
    if !(bleed >= 0.0 && bleed.is_finite()) {
        return Err(FraxelError::validation("bleed must be finite and >= 0"));
    }

    let raw = PercentBox::of_polygon(&polygon);
    let bled = raw.expanded(bleed);
    let normalized_polygon = normalize_into(&polygon, bled);

    Ok(ShardSpec {
        content_offset: content_offset(raw, metrics),
        initial_transform: scatter_transform(rng),
        polygon,
        bounding_box: bled,
        normalized_polygon,
    })
}

/// Resolve a whole decomposition in emission order.
pub fn resolve_shards(
    polygons: Vec<Polygon>,
    bleed: f64,
    metrics: &CardMetrics,
    rng: &mut dyn RandomSource,
) -> FraxelResult<Vec<ShardSpec>> {
    polygons
        .into_iter()
        .map(|polygon| resolve_shard(polygon, bleed, metrics, rng))
        .collect()
}

/// Random exploded pose: polar offset at 340±160 units, in-plane rotation
/// ±200°, 3D tilt ±85° per axis, depth ±260.
pub fn scatter_transform(rng: &mut dyn RandomSource) -> ShardTransform {
    let angle = rng.in_range(0.0, TAU);
    let distance = 340.0 + rng.signed(160.0);
    ShardTransform {
        translate: Vec2::new(angle.cos() * distance, angle.sin() * distance),
        depth: rng.signed(260.0),
        rotate: rng.signed(200.0),
        tilt_x: rng.signed(85.0),
        tilt_y: rng.signed(85.0),
        scale: 1.0,
    }
}

/// Re-map raw vertices into the bled box frame as 0..=100 percentages.
/// Degenerate boxes map to 0 rather than dividing by zero.
fn normalize_into(polygon: &Polygon, bled: PercentBox) -> Polygon {
    polygon
        .iter()
        .map(|p| {
            let nx = if bled.width > 0.0 {
                (p.x - bled.min_x) / bled.width * 100.0
            } else {
                0.0
            };
            let ny = if bled.height > 0.0 {
                (p.y - bled.min_y) / bled.height * 100.0
            } else {
                0.0
            };
            crate::core::Point::new(nx, ny)
        })
        .collect()
}

fn content_offset(raw: PercentBox, metrics: &CardMetrics) -> Vec2 {
    Vec2::new(
        -(raw.min_x / 100.0) * metrics.width + metrics.padding.x0,
        -(raw.min_y / 100.0) * metrics.height + metrics.padding.y0,
    )
}

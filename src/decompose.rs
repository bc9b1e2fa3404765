use std::collections::HashMap;

use smallvec::smallvec;

use crate::{
    core::{Point, Polygon, Vec2, round3},
    error::{FraxelError, FraxelResult},
    rng::RandomSource,
};

/// Parameters for decomposing a card's 0..=100 percent square into shards.
///
/// `jitter` is the maximum corner displacement in percent units. `jitter == 0`
/// selects the perfect grid: evenly spaced splits, no corner displacement and
/// no diagonal cells regardless of `diagonal_prob`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
    pub jitter: f64,
    pub diagonal_prob: f64,
    /// Allowed column width range in percent, `(min, max)`.
    pub col_gap: (f64, f64),
    /// Allowed row height range in percent, `(min, max)`.
    pub row_gap: (f64, f64),
}

impl GridSpec {
    pub const DEFAULT_COL_GAP: (f64, f64) = (15.0, 35.0);
    pub const DEFAULT_ROW_GAP: (f64, f64) = (18.0, 30.0);

    pub fn new(cols: u32, rows: u32, jitter: f64, diagonal_prob: f64) -> Self {
        Self {
            cols,
            rows,
            jitter,
            diagonal_prob,
            col_gap: Self::DEFAULT_COL_GAP,
            row_gap: Self::DEFAULT_ROW_GAP,
        }
    }

    pub fn validate(&self) -> FraxelResult<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(FraxelError::validation("grid must have cols>0 and rows>0"));
        }
        if !(self.jitter >= 0.0 && self.jitter.is_finite()) {
            return Err(FraxelError::validation("jitter must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&self.diagonal_prob) {
            return Err(FraxelError::validation("diagonal_prob must be in [0, 1]"));
        }
        for (name, (min, max)) in [("col_gap", self.col_gap), ("row_gap", self.row_gap)] {
            if !(min > 0.0 && min <= max) {
                return Err(FraxelError::validation(format!(
                    "{name} must satisfy 0 < min <= max"
                )));
            }
        }
        Ok(())
    }
}

/// Decompose the unit card into a jittered tiling of quads and triangles.
///
/// The emitted polygons exactly tile \[0,100\]²: split coordinates are shared
/// between neighbouring cells and corner jitter is keyed by grid-vertex
/// identity, so adjacent shards agree on every shared edge.
#[tracing::instrument(skip(rng), level = "debug")]
pub fn decompose(spec: &GridSpec, rng: &mut dyn RandomSource) -> FraxelResult<Vec<Polygon>> {
    spec.validate()?;

    let perfect = spec.jitter == 0.0;
    let xs = split_coords(spec.cols, spec.col_gap, perfect, rng);
    let ys = split_coords(spec.rows, spec.row_gap, perfect, rng);

    let mut jitter_map: HashMap<(u32, u32), Vec2> = HashMap::new();
    let mut corner = |i: u32, j: u32, rng: &mut dyn RandomSource| -> Point {
        let base = Point::new(xs[i as usize], ys[j as usize]);
        if perfect {
            return base;
        }
        let offset = *jitter_map.entry((i, j)).or_insert_with(|| {
            // Border vertices stay put so the card outline remains a rectangle.
            if i == 0 || i == spec.cols || j == 0 || j == spec.rows {
                Vec2::ZERO
            } else {
                Vec2::new(rng.signed(spec.jitter), rng.signed(spec.jitter))
            }
        });
        base + offset
    };

    let mut polygons = Vec::with_capacity((spec.cols * spec.rows) as usize);
    for j in 0..spec.rows {
        for i in 0..spec.cols {
            let tl = corner(i, j, rng);
            let tr = corner(i + 1, j, rng);
            let br = corner(i + 1, j + 1, rng);
            let bl = corner(i, j + 1, rng);

            if !perfect && rng.chance(spec.diagonal_prob) {
                // Split along one of the two diagonals, chosen at random.
                if rng.chance(0.5) {
                    polygons.push(rounded(smallvec![tl, tr, br]));
                    polygons.push(rounded(smallvec![tl, br, bl]));
                } else {
                    polygons.push(rounded(smallvec![tl, tr, bl]));
                    polygons.push(rounded(smallvec![tr, br, bl]));
                }
            } else {
                polygons.push(rounded(smallvec![tl, tr, br, bl]));
            }
        }
    }

    Ok(polygons)
}

/// Monotonically increasing split coordinates over `[0, 100]` with `n + 1`
/// entries. Each step takes the average remaining gap, wobbles it by up to
/// ±35% of itself and clamps into `range`; the final split is forced to 100
/// for full coverage. Caps keep enough headroom for the slots still to come,
/// so the sequence never has to step backwards.
fn split_coords(n: u32, range: (f64, f64), perfect: bool, rng: &mut dyn RandomSource) -> Vec<f64> {
    let n_f = f64::from(n);
    let mut coords = Vec::with_capacity(n as usize + 1);
    coords.push(0.0);

    if perfect {
        for i in 1..=n {
            coords.push(f64::from(i) * 100.0 / n_f);
        }
        return coords;
    }

    let (min, max) = range;
    let mut pos = 0.0;
    for i in 0..n {
        if i == n - 1 {
            pos = 100.0;
            coords.push(pos);
            break;
        }
        let slots = n_f - f64::from(i);
        let remaining = 100.0 - pos;
        let avg = remaining / slots;
        let headroom = remaining - (slots - 1.0) * min;
        let gap = if headroom < min {
            // Gap range infeasible from here; fall back to even spacing.
            avg
        } else {
            (avg * (1.0 + rng.signed(0.35))).clamp(min, max.min(headroom))
        };
        pos += gap;
        coords.push(pos);
    }
    coords
}

fn rounded(mut polygon: Polygon) -> Polygon {
    for p in &mut polygon {
        p.x = round3(p.x);
        p.y = round3(p.y);
    }
    polygon
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng64;

    fn shoelace(polygon: &Polygon) -> f64 {
        let mut sum = 0.0;
        for (idx, a) in polygon.iter().enumerate() {
            let b = polygon[(idx + 1) % polygon.len()];
            sum += a.x * b.y - b.x * a.y;
        }
        (sum / 2.0).abs()
    }

    #[test]
    fn rejects_degenerate_specs() {
        let mut rng = Rng64::new(1);
        let bad = GridSpec::new(0, 4, 2.0, 0.5);
        assert!(decompose(&bad, &mut rng).is_err());

        let mut bad_gap = GridSpec::new(4, 4, 2.0, 0.5);
        bad_gap.col_gap = (10.0, 5.0);
        assert!(decompose(&bad_gap, &mut rng).is_err());

        let bad_prob = GridSpec::new(4, 4, 2.0, 1.5);
        assert!(decompose(&bad_prob, &mut rng).is_err());
    }

    #[test]
    fn perfect_grid_is_uniform_quads() {
        let mut rng = Rng64::new(3);
        // Non-zero diagonal_prob must be ignored in perfect mode.
        let spec = GridSpec::new(4, 4, 0.0, 0.9);
        let polygons = decompose(&spec, &mut rng).unwrap();
        assert_eq!(polygons.len(), 16);
        for polygon in &polygons {
            assert_eq!(polygon.len(), 4);
            assert!((shoelace(polygon) - 625.0).abs() < 1e-9);
        }
    }

    #[test]
    fn standard_grid_without_diagonals_is_sixteen_quads() {
        let mut rng = Rng64::new(0xF00D);
        let spec = GridSpec::new(4, 4, 2.2, 0.0);
        let polygons = decompose(&spec, &mut rng).unwrap();
        assert_eq!(polygons.len(), 16);
        for polygon in &polygons {
            assert_eq!(polygon.len(), 4);
            for p in polygon {
                assert_eq!(p.x, round3(p.x));
                assert_eq!(p.y, round3(p.y));
            }
        }
    }

    #[test]
    fn diagonals_emit_triangle_pairs() {
        let mut rng = Rng64::new(5);
        let spec = GridSpec::new(3, 3, 2.0, 1.0);
        let polygons = decompose(&spec, &mut rng).unwrap();
        assert_eq!(polygons.len(), 18);
        assert!(polygons.iter().all(|p| p.len() == 3));
    }

    #[test]
    fn split_coords_are_monotonic_and_span_the_card() {
        for seed in 0..200 {
            let mut rng = Rng64::new(seed);
            for n in 2..=5 {
                let xs = split_coords(n, GridSpec::DEFAULT_COL_GAP, false, &mut rng);
                assert_eq!(xs.len(), n as usize + 1);
                assert_eq!(xs[0], 0.0);
                assert_eq!(*xs.last().unwrap(), 100.0);
                assert!(xs.windows(2).all(|w| w[1] > w[0]), "seed {seed} n {n}");
            }
        }
    }

    #[test]
    fn same_seed_reproduces_geometry() {
        let spec = GridSpec::new(4, 4, 2.2, 0.5);
        let a = decompose(&spec, &mut Rng64::new(77)).unwrap();
        let b = decompose(&spec, &mut Rng64::new(77)).unwrap();
        assert_eq!(a, b);
    }
}

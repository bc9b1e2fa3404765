use crate::{
    core::ShardTransform,
    error::{FraxelError, FraxelResult},
    rng::RandomSource,
    shard::ShardSpec,
};

/// Spacing between consecutive shard start times, in progress units.
const STAGGER_STEP: f64 = 0.05;

/// Shard body opacity once fully assembled (real content shows through).
const SETTLED_BODY_OPACITY: f64 = 0.2;

/// The portion of a card's timeline during which real content fades in as
/// shard-rendered content fades out.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BuildWindow {
    pub start: f64,
    pub end: f64,
}

impl BuildWindow {
    pub const STANDARD: Self = Self {
        start: 0.83,
        end: 0.94,
    };

    pub fn new(start: f64, end: f64) -> FraxelResult<Self> {
        if !(0.0..1.0).contains(&start) || !(start < end && end <= 1.0) {
            return Err(FraxelError::validation(
                "build window must satisfy 0 <= start < end <= 1",
            ));
        }
        Ok(Self { start, end })
    }

    pub(crate) const fn new_unchecked(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Linear crossfade blend at `progress`: 0 before the window, 1 after.
    pub fn blend(self, progress: f64) -> f64 {
        ((progress - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }
}

/// Interpolated state of one shard at a progress value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShardFrame {
    pub transform: ShardTransform,
    /// Opacity of the shard's own rendered copy of the card content.
    pub content_copy_opacity: f64,
    /// Opacity of the shard body itself.
    pub body_opacity: f64,
}

/// Everything a host needs to paint one card at a progress value.
#[derive(Clone, Debug, PartialEq)]
pub struct CardFrame {
    pub shards: Vec<ShardFrame>,
    /// Opacity of the card's true content layer.
    pub content_opacity: f64,
    pub assembled: bool,
}

/// One card's assemble timeline. Fixed at mount; [`sample`](Self::sample) is a
/// pure function of progress, so replaying a progress value is idempotent.
#[derive(Clone, Debug)]
pub struct CardTimeline {
    shards: Vec<ShardSpec>,
    /// Per-shard start offsets in progress units, randomly ordered.
    staggers: Vec<f64>,
    window: BuildWindow,
}

impl CardTimeline {
    pub fn new(
        shards: Vec<ShardSpec>,
        window: BuildWindow,
        rng: &mut dyn RandomSource,
    ) -> FraxelResult<Self> {
        if shards.is_empty() {
            return Err(FraxelError::choreography(
                "card timeline needs at least one shard",
            ));
        }
        let staggers = stagger_offsets(shards.len(), window, rng);
        Ok(Self {
            shards,
            staggers,
            window,
        })
    }

    pub fn shards(&self) -> &[ShardSpec] {
        &self.shards
    }

    pub fn window(&self) -> BuildWindow {
        self.window
    }

    /// Sample the timeline at `progress` (clamped to `[0, 1]`).
    ///
    /// At or past the window end every shard transform is snapped exactly to
    /// identity so no sub-pixel drift survives assembly.
    pub fn sample(&self, progress: f64) -> CardFrame {
        let p = progress.clamp(0.0, 1.0);
        let blend = self.window.blend(p);
        let assembled = p >= self.window.end;

        let shards = self
            .shards
            .iter()
            .zip(&self.staggers)
            .map(|(shard, &start)| {
                let transform = if assembled {
                    ShardTransform::IDENTITY
                } else {
                    let span = self.window.end - start;
                    let t = if span > 0.0 { (p - start) / span } else { 1.0 };
                    shard.initial_transform.toward_identity(t.clamp(0.0, 1.0))
                };
                ShardFrame {
                    transform,
                    content_copy_opacity: 1.0 - blend,
                    body_opacity: 1.0 - (1.0 - SETTLED_BODY_OPACITY) * blend,
                }
            })
            .collect();

        CardFrame {
            shards,
            content_opacity: blend,
            assembled,
        }
    }
}

/// Random-order start offsets spaced `STAGGER_STEP` apart, compressed when the
/// shard count would otherwise push the last starter past the build window.
fn stagger_offsets(count: usize, window: BuildWindow, rng: &mut dyn RandomSource) -> Vec<f64> {
    let mut order: Vec<usize> = (0..count).collect();
    // Fisher-Yates.
    for i in (1..count).rev() {
        let j = (rng.next_f64() * (i + 1) as f64) as usize;
        order.swap(i, j.min(i));
    }

    let max_raw = STAGGER_STEP * (count.saturating_sub(1)) as f64;
    let latest_allowed = (window.end - 0.2).max(0.0);
    let scale = if max_raw > latest_allowed && max_raw > 0.0 {
        latest_allowed / max_raw
    } else {
        1.0
    };

    order
        .into_iter()
        .map(|rank| rank as f64 * STAGGER_STEP * scale)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{CardMetrics, Insets},
        decompose::{GridSpec, decompose},
        rng::Rng64,
        shard::{DEFAULT_BLEED, resolve_shards},
    };

    fn timeline(window: BuildWindow) -> CardTimeline {
        let mut rng = Rng64::new(21);
        let metrics = CardMetrics::new(420.0, 280.0, Insets::uniform(12.0)).unwrap();
        let polygons = decompose(&GridSpec::new(4, 4, 2.2, 0.5), &mut rng).unwrap();
        let shards = resolve_shards(polygons, DEFAULT_BLEED, &metrics, &mut rng).unwrap();
        CardTimeline::new(shards, window, &mut rng).unwrap()
    }

    #[test]
    fn window_validation() {
        assert!(BuildWindow::new(0.83, 0.94).is_ok());
        assert!(BuildWindow::new(0.94, 0.83).is_err());
        assert!(BuildWindow::new(-0.1, 0.5).is_err());
        assert!(BuildWindow::new(0.5, 1.2).is_err());
    }

    #[test]
    fn empty_shard_list_is_rejected() {
        let mut rng = Rng64::new(1);
        assert!(CardTimeline::new(vec![], BuildWindow::STANDARD, &mut rng).is_err());
    }

    #[test]
    fn scenario_window_083_094() {
        let tl = timeline(BuildWindow::new(0.83, 0.94).unwrap());

        let before = tl.sample(0.80);
        assert!(!before.assembled);
        assert_eq!(before.content_opacity, 0.0);
        assert!(before.shards.iter().all(|s| s.content_copy_opacity == 1.0));
        assert!(before.shards.iter().all(|s| s.body_opacity == 1.0));

        let interior = tl.sample(0.90);
        assert!(!interior.assembled);
        assert!((interior.content_opacity - 0.6364).abs() < 1e-3);

        let after = tl.sample(0.95);
        assert!(after.assembled);
        assert_eq!(after.content_opacity, 1.0);
        assert!(after.shards.iter().all(|s| s.transform.is_identity()));
        assert!(after.shards.iter().all(|s| s.content_copy_opacity == 0.0));
        assert!(after.shards.iter().all(|s| s.body_opacity == 0.2));
    }

    #[test]
    fn sampling_is_idempotent() {
        let tl = timeline(BuildWindow::STANDARD);
        for p in [0.0, 0.12, 0.5, 0.835, 0.9, 0.94, 1.0] {
            assert_eq!(tl.sample(p), tl.sample(p), "progress {p}");
        }
    }

    #[test]
    fn assembly_snaps_exactly_at_window_end() {
        let tl = timeline(BuildWindow::STANDARD);
        let at_end = tl.sample(tl.window().end);
        assert!(at_end.assembled);
        assert!(at_end.shards.iter().all(|s| s.transform.is_identity()));

        // One tick earlier at least some shard is still in motion.
        let just_before = tl.sample(tl.window().end - 1e-6);
        assert!(!just_before.assembled);
    }

    #[test]
    fn progress_is_clamped() {
        let tl = timeline(BuildWindow::STANDARD);
        assert_eq!(tl.sample(-2.0), tl.sample(0.0));
        assert_eq!(tl.sample(3.0), tl.sample(1.0));
    }

    #[test]
    fn staggers_stay_inside_the_window() {
        let mut rng = Rng64::new(33);
        for count in [1usize, 6, 16, 50] {
            let offsets = stagger_offsets(count, BuildWindow::STANDARD, &mut rng);
            assert_eq!(offsets.len(), count);
            for &s in &offsets {
                assert!(s >= 0.0);
                assert!(s < BuildWindow::STANDARD.end);
            }
            // Offsets form a permutation of the step multiples (scaled).
            let mut sorted = offsets.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            for w in sorted.windows(2) {
                assert!(w[1] > w[0], "duplicate stagger offset");
            }
        }
    }
}

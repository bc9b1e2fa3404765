use crate::{choreo::BuildWindow, decompose::GridSpec, shard::DEFAULT_BLEED};

/// Named per-card presets selecting grid density, jitter and timing.
///
/// Replaces the flag soup the visual design went through (`tiny`, `fast`,
/// `perfect`, `perfectRandom` and friends): every preset fully determines its
/// parameters, so no flag precedence is left to reason about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CardProfile {
    /// Regular content card: 4×4 grid, jittered, mixed quads and triangles.
    Standard,
    /// Small cards (approach steps, CTAs): reduced 3×2 grid.
    Compact,
    /// Mid-density variant for square-ish cards: 3×3 grid.
    Dense,
    /// Snappier build for cards near the fold: calmer shatter, late window.
    Quick,
    /// Perfect uncorrupted grid, no jitter and no diagonals.
    Pristine,
}

/// Fully resolved animation parameters for one card.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfileParams {
    pub grid: GridSpec,
    pub build_window: BuildWindow,
    pub bleed: f64,
}

impl CardProfile {
    pub fn params(self) -> ProfileParams {
        let (grid, build_window) = match self {
            Self::Standard => (GridSpec::new(4, 4, 2.2, 0.5), BuildWindow::STANDARD),
            Self::Compact => (GridSpec::new(3, 2, 2.0, 0.35), BuildWindow::new_unchecked(0.81, 0.93)),
            Self::Dense => (GridSpec::new(3, 3, 2.2, 0.5), BuildWindow::STANDARD),
            Self::Quick => (GridSpec::new(4, 4, 1.6, 0.3), BuildWindow::new_unchecked(0.86, 0.97)),
            Self::Pristine => (GridSpec::new(4, 4, 0.0, 0.0), BuildWindow::new_unchecked(0.84, 0.94)),
        };
        ProfileParams {
            grid,
            build_window,
            bleed: DEFAULT_BLEED,
        }
    }
}

use std::f64::consts::TAU;

use crate::{
    core::{Point, Rect, Viewport},
    ease::Ease,
    rng::RandomSource,
};

/// Seconds the host keeps the overlay alive after navigation, so the route
/// swap never flashes through it.
pub const OVERLAY_REMOVAL_DELAY: f64 = 0.4;

/// A delayed, eased interpolation window over wall-clock seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tween {
    pub delay: f64,
    pub duration: f64,
    pub ease: Ease,
}

impl Tween {
    pub fn new(delay: f64, duration: f64, ease: Ease) -> Self {
        Self {
            delay,
            duration,
            ease,
        }
    }

    /// Eased progress at `elapsed` seconds. Rests exactly at 0 before the
    /// delay and exactly at 1 once finished.
    pub fn progress(&self, elapsed: f64) -> f64 {
        if self.duration <= 0.0 {
            return if elapsed >= self.delay { 1.0 } else { 0.0 };
        }
        self.ease.apply((elapsed - self.delay) / self.duration)
    }

    pub fn finished(&self, elapsed: f64) -> bool {
        elapsed >= self.delay + self.duration
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Viewport width tier; particle populations shrink on small screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ViewportTier {
    Desktop,
    Mobile,
    SmallMobile,
}

impl ViewportTier {
    pub fn of(viewport: Viewport) -> Self {
        if viewport.width <= 480.0 {
            Self::SmallMobile
        } else if viewport.width <= 768.0 {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// (ambient particles, fragments, streaks)
    pub fn populations(self) -> (usize, usize, usize) {
        match self {
            Self::Desktop => (40, 15, 20),
            Self::Mobile => (30, 10, 15),
            Self::SmallMobile => (20, 8, 10),
        }
    }
}

/// The ghost clone of the clicked image, growing into the portal mouth.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GhostPlan {
    pub start_rect: Rect,
    /// 4× the source size, centred on the focal point.
    pub end_rect: Rect,
    pub tween: Tween,
}

/// Interpolated ghost state. `roundness` runs 0 (source corner radius) to 1
/// (full circle).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostState {
    pub rect: Rect,
    pub roundness: f64,
}

impl GhostPlan {
    pub fn sample(&self, elapsed: f64) -> GhostState {
        let t = self.tween.progress(elapsed);
        let s = self.start_rect;
        let e = self.end_rect;
        GhostState {
            rect: Rect::new(
                lerp(s.x0, e.x0, t),
                lerp(s.y0, e.y0, t),
                lerp(s.x1, e.x1, t),
                lerp(s.y1, e.y1, t),
            ),
            roundness: t,
        }
    }
}

/// Expanding decorative element anchored at the focal point (ring, swirl,
/// vortex, burst — they differ only in their envelopes).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlourishPlan {
    pub start_scale: f64,
    pub end_scale: f64,
    pub start_opacity: f64,
    pub end_opacity: f64,
    pub start_rotate: f64,
    pub end_rotate: f64,
    pub tween: Tween,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlourishState {
    pub scale: f64,
    pub opacity: f64,
    pub rotate: f64,
}

impl FlourishPlan {
    pub fn sample(&self, elapsed: f64) -> FlourishState {
        let t = self.tween.progress(elapsed);
        FlourishState {
            scale: lerp(self.start_scale, self.end_scale, t),
            opacity: lerp(self.start_opacity, self.end_opacity, t),
            rotate: lerp(self.start_rotate, self.end_rotate, t),
        }
    }
}

/// What a converging scatter element is.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ParticleKind {
    /// Ambient dust mote.
    Ambient,
    /// Page fragment: sized square, tumbling as it falls in.
    Fragment { size: f64, end_rotate: f64 },
    /// Motion streak, pre-rotated to point at the focal point.
    Streak,
}

/// One scatter element animating from its spawn position into the focal
/// point with shrinking scale and fading opacity.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParticlePlan {
    pub kind: ParticleKind,
    pub start: Point,
    pub start_opacity: f64,
    pub start_rotate: f64,
    pub end_scale: f64,
    pub tween: Tween,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleState {
    pub position: Point,
    pub scale: f64,
    pub opacity: f64,
    pub rotate: f64,
}

impl ParticlePlan {
    pub fn sample(&self, focal: Point, elapsed: f64) -> ParticleState {
        let t = self.tween.progress(elapsed);
        let end_rotate = match self.kind {
            ParticleKind::Fragment { end_rotate, .. } => end_rotate,
            _ => self.start_rotate,
        };
        ParticleState {
            position: lerp_point(self.start, focal, t),
            scale: lerp(1.0, self.end_scale, t),
            opacity: lerp(self.start_opacity, 0.0, t),
            rotate: lerp(self.start_rotate, end_rotate, t),
        }
    }
}

/// The full departure overlay: ghost, flourishes and three scatter
/// populations, all sampled from one clock. Built once per transition and
/// owned by the director; hosts only read it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayPlan {
    pub focal: Point,
    pub ghost: GhostPlan,
    pub rings: [FlourishPlan; 2],
    pub swirl: FlourishPlan,
    pub vortex: FlourishPlan,
    pub burst: FlourishPlan,
    /// Backdrop darkening, 0..1 over this tween.
    pub backdrop: Tween,
    pub particles: Vec<ParticlePlan>,
    pub removal_delay: f64,
}

impl OverlayPlan {
    /// Seconds until every overlay tween has finished.
    pub fn total_duration(&self) -> f64 {
        let mut end: f64 = 0.0;
        for t in [
            self.ghost.tween,
            self.rings[0].tween,
            self.rings[1].tween,
            self.swirl.tween,
            self.vortex.tween,
            self.burst.tween,
            self.backdrop,
        ] {
            end = end.max(t.delay + t.duration);
        }
        for p in &self.particles {
            end = end.max(p.tween.delay + p.tween.duration);
        }
        end
    }
}

/// Populate the overlay around `focal` for a thumbnail occupying
/// `source_rect`. All scatter randomness comes from `rng`.
pub fn build_overlay(
    source_rect: Rect,
    focal: Point,
    viewport: Viewport,
    rng: &mut dyn RandomSource,
) -> OverlayPlan {
    let (n_particles, n_fragments, n_streaks) = ViewportTier::of(viewport).populations();

    let width = source_rect.width();
    let height = source_rect.height();
    let end_rect = Rect::new(
        focal.x - width * 2.0,
        focal.y - height * 2.0,
        focal.x + width * 2.0,
        focal.y + height * 2.0,
    );

    let mut particles = Vec::with_capacity(n_particles + n_fragments + n_streaks);

    for i in 0..n_particles {
        let angle = TAU * i as f64 / n_particles as f64;
        let distance = 300.0 + rng.next_f64() * 400.0;
        particles.push(ParticlePlan {
            kind: ParticleKind::Ambient,
            start: focal + polar(angle, distance),
            start_opacity: 0.6 + rng.next_f64() * 0.4,
            start_rotate: 0.0,
            end_scale: 0.0,
            tween: Tween::new(i as f64 / n_particles as f64 * 0.3, 0.8, Ease::InCubic),
        });
    }

    for i in 0..n_fragments {
        let angle = TAU * i as f64 / n_fragments as f64 + rng.next_f64() * 0.5;
        let distance = 200.0 + rng.next_f64() * 350.0;
        particles.push(ParticlePlan {
            kind: ParticleKind::Fragment {
                size: 40.0 + rng.next_f64() * 80.0,
                end_rotate: rng.next_f64() * 720.0 - 360.0,
            },
            start: focal + polar(angle, distance),
            start_opacity: 1.0,
            start_rotate: rng.next_f64() * 360.0,
            end_scale: 0.2,
            tween: Tween::new(i as f64 / n_fragments as f64 * 0.25, 0.85, Ease::InCubic),
        });
    }

    for i in 0..n_streaks {
        let angle = TAU * i as f64 / n_streaks as f64;
        let distance = 250.0 + rng.next_f64() * 300.0;
        particles.push(ParticlePlan {
            kind: ParticleKind::Streak,
            start: focal + polar(angle, distance),
            start_opacity: 0.4 + rng.next_f64() * 0.4,
            start_rotate: angle.to_degrees() + 90.0,
            end_scale: 0.0,
            tween: Tween::new(i as f64 / n_streaks as f64 * 0.2, 0.75, Ease::InCubic),
        });
    }

    OverlayPlan {
        focal,
        ghost: GhostPlan {
            start_rect: source_rect,
            end_rect,
            tween: Tween::new(0.0, 0.85, Ease::OutCubic),
        },
        rings: [
            FlourishPlan {
                start_scale: 0.2,
                end_scale: 2.8,
                start_opacity: 0.9,
                end_opacity: 0.0,
                start_rotate: 0.0,
                end_rotate: 0.0,
                tween: Tween::new(0.0, 0.9, Ease::OutQuart),
            },
            FlourishPlan {
                start_scale: 0.15,
                end_scale: 3.2,
                start_opacity: 0.5,
                end_opacity: 0.0,
                start_rotate: 0.0,
                end_rotate: 0.0,
                tween: Tween::new(0.1, 1.0, Ease::OutQuart),
            },
        ],
        swirl: FlourishPlan {
            start_scale: 0.0,
            end_scale: 2.2,
            start_opacity: 0.2,
            end_opacity: 0.6,
            start_rotate: 0.0,
            end_rotate: 720.0,
            tween: Tween::new(0.0, 0.9, Ease::InOutCubic),
        },
        vortex: FlourishPlan {
            start_scale: 0.0,
            end_scale: 1.5,
            start_opacity: 0.0,
            end_opacity: 0.4,
            start_rotate: 0.0,
            end_rotate: -180.0,
            tween: Tween::new(0.0, 0.85, Ease::OutCubic),
        },
        burst: FlourishPlan {
            start_scale: 0.0,
            end_scale: 3.0,
            start_opacity: 0.8,
            end_opacity: 0.0,
            start_rotate: 0.0,
            end_rotate: 0.0,
            tween: Tween::new(0.0, 0.6, Ease::OutQuart),
        },
        backdrop: Tween::new(0.0, 0.7, Ease::OutCubic),
        particles,
        removal_delay: OVERLAY_REMOVAL_DELAY,
    }
}

fn polar(angle: f64, distance: f64) -> kurbo::Vec2 {
    kurbo::Vec2::new(angle.cos() * distance, angle.sin() * distance)
}

use crate::{
    core::{Point, Rect, Vec2, Viewport},
    ease::Ease,
    overlay::{OverlayPlan, Tween, build_overlay},
    rng::RandomSource,
};

/// Phase of the portal transition between pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WarpPhase {
    #[default]
    Idle,
    Expanding,
    InFlight,
    Navigated,
    Arriving,
    Settled,
}

/// Viewport coordinate anchoring the transition on both the departing and the
/// arriving page. Serializes so it can ride along as navigation state.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FocalPoint {
    pub x: f64,
    pub y: f64,
}

impl FocalPoint {
    /// Clamp a pointer position into the clicked image's rectangle, so the
    /// portal mouth always opens inside the image.
    pub fn clamp_into(pointer: Point, rect: Rect) -> Self {
        Self {
            x: pointer.x.clamp(rect.x0, rect.x1),
            y: pointer.y.clamp(rect.y0, rect.y1),
        }
    }

    pub fn as_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Captured visual of the clicked element: rendered independently of the
/// underlying layout for the whole transition, so mid-flight reflows cannot
/// disturb the ghost.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceSnapshot {
    /// Image source the ghost paints.
    pub image_src: String,
    /// Viewport-space rect of the clicked image at click time.
    pub rect: Rect,
    /// Applied visual transform of the preview container, as rendered.
    pub container_transform: Option<String>,
    /// Applied visual transform of the inner image, as rendered.
    pub image_transform: Option<String>,
}

/// Click input from the surrounding layer.
#[derive(Clone, Debug)]
pub struct ClickInfo {
    pub pointer: Point,
    pub snapshot: SourceSnapshot,
    /// Opaque navigation target identifier.
    pub destination: String,
}

/// CSS-style page filter applied while the page is being pulled in.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageFilter {
    pub blur_px: f64,
    pub saturate: f64,
    pub brightness: f64,
}

impl PageFilter {
    pub const NONE: Self = Self {
        blur_px: 0.0,
        saturate: 1.0,
        brightness: 1.0,
    };
}

/// Full-page transform anchored at the focal point.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageTransform {
    /// Transform origin, viewport space.
    pub origin: Point,
    pub scale: f64,
    /// Tilt around the X axis, degrees.
    pub rotation_x: f64,
    /// Tilt around the Y axis, degrees.
    pub rotation_y: f64,
    /// Rotation around the screen normal, degrees.
    pub rotation_z: f64,
    /// Z push-back in layout units.
    pub depth: f64,
    pub filter: PageFilter,
}

impl PageTransform {
    pub fn identity_at(origin: Point) -> Self {
        Self {
            origin,
            scale: 1.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
            depth: 0.0,
            filter: PageFilter::NONE,
        }
    }
}

/// The "deep in the portal" page state for a focal point: scale 0.05 with a
/// 3D tilt proportional to the focal point's offset from viewport centre.
/// Used as the departure end state and, mirrored, as the arrival start state
/// — forward and reverse portal math are the same function.
pub fn portal_page_transform(focal: FocalPoint, viewport: Viewport) -> PageTransform {
    let dx = focal.x / viewport.width - 0.5;
    let dy = focal.y / viewport.height - 0.5;
    PageTransform {
        origin: focal.as_point(),
        scale: 0.05,
        rotation_x: dy * 15.0,
        rotation_y: -dx * 15.0,
        rotation_z: (dx - dy) * 20.0,
        depth: -400.0,
        filter: PageFilter {
            blur_px: 5.0,
            saturate: 1.15,
            brightness: 0.85,
        },
    }
}

/// Everything the host needs to play the departure: the overlay, the page
/// suck tween and the navigation payload for when it completes.
#[derive(Clone, Debug)]
pub struct DeparturePlan {
    pub overlay: OverlayPlan,
    pub page_target: PageTransform,
    pub page_tween: Tween,
    pub destination: String,
    pub snapshot: SourceSnapshot,
}

/// Per-text-element micro-animation on the arriving page. Elements start at
/// the portal mouth and fly out to their resting position.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextArrival {
    /// Initial translation: focal point minus the element's resting centre.
    pub displacement: Vec2,
    pub start_scale: f64,
    /// Initial rotation in degrees, ±10 random.
    pub start_rotate: f64,
    pub start_blur_px: f64,
    pub tween: Tween,
}

/// Arrival choreography for the destination page.
#[derive(Clone, Debug)]
pub struct ArrivalPlan {
    /// Page root starts here (the mirror of the departure end state) and
    /// plays back to identity.
    pub page_start: PageTransform,
    pub page_tween: Tween,
    pub texts: Vec<TextArrival>,
    /// Once everything has played, every inline transform/filter override
    /// must be cleared so later layout (e.g. back navigation) starts clean.
    pub clear_overrides_on_settle: bool,
}

/// Orchestrates the portal transition. At most one transition is in flight;
/// clicks arriving while busy are rejected at the gate.
#[derive(Debug, Default)]
pub struct WarpDirector {
    phase: WarpPhase,
    focal: Option<FocalPoint>,
}

impl WarpDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WarpPhase {
        self.phase
    }

    /// `true` across the whole Expanding → Navigated span; the UI uses this
    /// to drop further clicks.
    pub fn busy(&self) -> bool {
        matches!(self.phase, WarpPhase::Expanding | WarpPhase::InFlight)
    }

    /// Start a transition from a click. Returns `None` — with no state
    /// created — when another transition is already in flight.
    #[tracing::instrument(skip(self, click, rng))]
    pub fn begin(
        &mut self,
        click: ClickInfo,
        viewport: Viewport,
        rng: &mut dyn RandomSource,
    ) -> Option<DeparturePlan> {
        if !matches!(self.phase, WarpPhase::Idle | WarpPhase::Settled) {
            tracing::debug!(phase = ?self.phase, "warp gate rejected click");
            return None;
        }

        let focal = FocalPoint::clamp_into(click.pointer, click.snapshot.rect);
        let overlay = build_overlay(click.snapshot.rect, focal.as_point(), viewport, rng);

        self.phase = WarpPhase::Expanding;
        self.focal = Some(focal);

        Some(DeparturePlan {
            overlay,
            page_target: portal_page_transform(focal, viewport),
            page_tween: Tween::new(0.1, 0.8, Ease::InQuart),
            destination: click.destination,
            snapshot: click.snapshot,
        })
    }

    /// The overlay timeline has started playing.
    pub fn mark_in_flight(&mut self) {
        if self.phase == WarpPhase::Expanding {
            self.phase = WarpPhase::InFlight;
        }
    }

    /// The suck timeline finished: navigate now. Yields the focal point to
    /// pass forward as navigation state; the overlay outlives the route swap
    /// by [`OverlayPlan::removal_delay`](crate::overlay::OverlayPlan).
    pub fn complete_departure(&mut self) -> Option<FocalPoint> {
        if self.phase != WarpPhase::InFlight {
            return None;
        }
        self.phase = WarpPhase::Navigated;
        self.focal
    }

    /// Destination page mounted. With a focal point in navigation state this
    /// produces the reverse emergence; without one (direct load, back
    /// navigation) the page renders at rest and the director settles.
    ///
    /// `text_centers` are the resting centres of the destination's
    /// text-bearing elements, in the new page's viewport space.
    #[tracing::instrument(skip(self, text_centers, rng))]
    pub fn arrive(
        &mut self,
        focal: Option<FocalPoint>,
        viewport: Viewport,
        text_centers: &[Point],
        rng: &mut dyn RandomSource,
    ) -> Option<ArrivalPlan> {
        let Some(focal) = focal else {
            tracing::debug!("no focal point in navigation state, skipping arrival");
            self.phase = WarpPhase::Settled;
            self.focal = None;
            return None;
        };

        self.phase = WarpPhase::Arriving;
        self.focal = Some(focal);

        let texts = text_centers
            .iter()
            .enumerate()
            .map(|(index, &center)| TextArrival {
                displacement: focal.as_point() - center,
                start_scale: 0.15,
                start_rotate: rng.signed(10.0),
                start_blur_px: 8.0,
                tween: Tween::new(
                    (index % 12) as f64 * 0.025,
                    rng.in_range(0.7, 1.0),
                    Ease::OutCubic,
                ),
            })
            .collect();

        Some(ArrivalPlan {
            page_start: portal_page_transform(focal, viewport),
            page_tween: Tween::new(0.0, 0.8, Ease::OutCubic),
            texts,
            clear_overrides_on_settle: true,
        })
    }

    /// Arrival animations have completed and inline overrides are cleared.
    pub fn settle(&mut self) {
        self.phase = WarpPhase::Settled;
        self.focal = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng64;

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 800.0).unwrap()
    }

    fn click_at(x: f64, y: f64) -> ClickInfo {
        ClickInfo {
            pointer: Point::new(x, y),
            snapshot: SourceSnapshot {
                image_src: "https://example.test/preview.jpg".into(),
                rect: Rect::new(400.0, 250.0, 700.0, 450.0),
                container_transform: None,
                image_transform: None,
            },
            destination: "services/web-performance".into(),
        }
    }

    #[test]
    fn focal_point_clamps_into_the_image() {
        let rect = Rect::new(400.0, 250.0, 700.0, 450.0);
        let inside = FocalPoint::clamp_into(Point::new(500.0, 300.0), rect);
        assert_eq!((inside.x, inside.y), (500.0, 300.0));

        let outside = FocalPoint::clamp_into(Point::new(50.0, 50.0), rect);
        assert_eq!((outside.x, outside.y), (400.0, 250.0));

        let beyond = FocalPoint::clamp_into(Point::new(9999.0, 9999.0), rect);
        assert_eq!((beyond.x, beyond.y), (700.0, 450.0));
    }

    #[test]
    fn gate_rejects_second_click_while_busy() {
        let mut rng = Rng64::new(1);
        let mut director = WarpDirector::new();
        assert!(!director.busy());

        let first = director.begin(click_at(500.0, 300.0), viewport(), &mut rng);
        assert!(first.is_some());
        assert!(director.busy());
        assert_eq!(director.phase(), WarpPhase::Expanding);

        // Second click: no new state, phase unchanged.
        let second = director.begin(click_at(600.0, 350.0), viewport(), &mut rng);
        assert!(second.is_none());
        assert_eq!(director.phase(), WarpPhase::Expanding);

        director.mark_in_flight();
        assert!(director.busy());
        assert!(
            director
                .begin(click_at(600.0, 350.0), viewport(), &mut rng)
                .is_none()
        );
    }

    #[test]
    fn departure_hands_focal_forward() {
        let mut rng = Rng64::new(2);
        let mut director = WarpDirector::new();
        let plan = director
            .begin(click_at(500.0, 300.0), viewport(), &mut rng)
            .unwrap();
        assert_eq!(plan.overlay.focal, Point::new(500.0, 300.0));
        assert_eq!(plan.destination, "services/web-performance");

        director.mark_in_flight();
        let focal = director.complete_departure().unwrap();
        assert_eq!((focal.x, focal.y), (500.0, 300.0));
        assert_eq!(director.phase(), WarpPhase::Navigated);
        assert!(!director.busy());
    }

    #[test]
    fn complete_departure_requires_in_flight() {
        let mut director = WarpDirector::new();
        assert!(director.complete_departure().is_none());
    }

    #[test]
    fn arrival_mirrors_departure_exactly() {
        let vp = viewport();
        let focal = FocalPoint { x: 500.0, y: 300.0 };

        let departure_end = portal_page_transform(focal, vp);
        let arrival_start = portal_page_transform(focal, vp);
        assert_eq!(departure_end, arrival_start);

        // Tilt follows the focal offset from centre.
        let dx = 500.0 / vp.width - 0.5;
        let dy = 300.0 / vp.height - 0.5;
        assert_eq!(departure_end.rotation_x, dy * 15.0);
        assert_eq!(departure_end.rotation_y, -dx * 15.0);
        assert_eq!(departure_end.rotation_z, (dx - dy) * 20.0);
        assert_eq!(departure_end.scale, 0.05);
    }

    #[test]
    fn arrival_without_focal_skips_animation() {
        let mut rng = Rng64::new(3);
        let mut director = WarpDirector::new();
        let plan = director.arrive(None, viewport(), &[], &mut rng);
        assert!(plan.is_none());
        assert_eq!(director.phase(), WarpPhase::Settled);
    }

    #[test]
    fn text_arrivals_fly_out_of_the_portal() {
        let mut rng = Rng64::new(4);
        let mut director = WarpDirector::new();
        let centers: Vec<Point> = (0..30)
            .map(|i| Point::new(100.0 + 40.0 * i as f64, 600.0))
            .collect();
        let plan = director
            .arrive(
                Some(FocalPoint { x: 500.0, y: 300.0 }),
                viewport(),
                &centers,
                &mut rng,
            )
            .unwrap();
        assert_eq!(director.phase(), WarpPhase::Arriving);
        assert_eq!(plan.texts.len(), 30);

        for (i, (text, center)) in plan.texts.iter().zip(&centers).enumerate() {
            assert_eq!(
                text.displacement,
                Point::new(500.0, 300.0) - *center,
                "element {i}"
            );
            assert_eq!(text.start_scale, 0.15);
            assert!(text.start_rotate.abs() <= 10.0);
            assert!((0.7..1.0).contains(&text.tween.duration));
            assert_eq!(text.tween.delay, (i % 12) as f64 * 0.025);
        }

        director.settle();
        assert_eq!(director.phase(), WarpPhase::Settled);

        // Settled directors accept the next click.
        let next = director.begin(click_at(450.0, 320.0), viewport(), &mut rng);
        assert!(next.is_some());
    }
}

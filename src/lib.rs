//! Fraxel is a shard-assembly and warp-transition engine for card-based UIs.
//!
//! It owns the geometry and choreography only: decomposing rectangular card
//! content into a jittered polygon tiling ([`decompose`]), resolving each
//! piece into an independently transformable fragment ([`shard`]), driving
//! scroll-linked assemble timelines ([`choreo`], [`registry`]) and
//! orchestrating the portal-style page transition ([`warp`], [`overlay`]).
//! Rendering, routing and the DOM stay on the host side of the
//! [`host::HostElement`] boundary; the engine hands back plans and frames to
//! paint.
#![forbid(unsafe_code)]

pub mod choreo;
pub mod core;
pub mod decompose;
pub mod ease;
pub mod error;
pub mod host;
pub mod overlay;
pub mod profile;
pub mod registry;
pub mod rng;
pub mod shard;
pub mod warp;

pub use choreo::{BuildWindow, CardFrame, CardTimeline, ShardFrame};
pub use crate::core::{CardMetrics, PercentBox, Polygon, ShardTransform, Viewport};
pub use decompose::{GridSpec, decompose};
pub use ease::Ease;
pub use error::{FraxelError, FraxelResult};
pub use host::HostElement;
pub use overlay::{OverlayPlan, Tween};
pub use profile::{CardProfile, ProfileParams};
pub use registry::{CardId, CardRegistry};
pub use rng::{RandomSource, Rng64};
pub use shard::{DEFAULT_BLEED, ShardSpec};
pub use warp::{
    ArrivalPlan, ClickInfo, DeparturePlan, FocalPoint, PageTransform, SourceSnapshot, WarpDirector,
    WarpPhase,
};

use std::collections::BTreeMap;

use crate::{
    choreo::{CardFrame, CardTimeline},
    decompose::decompose,
    error::FraxelResult,
    host::HostElement,
    profile::CardProfile,
    rng::RandomSource,
    shard::resolve_shards,
};

/// Stable identifier for a registered card within one view.
pub type CardId = String;

struct MountedCard {
    profile: CardProfile,
    handle: Box<dyn HostElement>,
    timeline: CardTimeline,
    assembled: bool,
}

/// Per-view registry owning every active card timeline.
///
/// One registry is created when a view mounts and disposed when it unmounts;
/// there is no ambient global collection of animations. Only this registry
/// mutates its cards' state.
#[derive(Default)]
pub struct CardRegistry {
    cards: BTreeMap<CardId, MountedCard>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card and build its timeline.
    ///
    /// Returns `Ok(false)` without mounting anything when the host element
    /// cannot be measured — a missing element must not leave a partially
    /// initialized timeline behind. Validation failures in the profile
    /// geometry surface as errors.
    #[tracing::instrument(skip(self, handle, rng))]
    pub fn mount(
        &mut self,
        id: CardId,
        profile: CardProfile,
        handle: Box<dyn HostElement>,
        rng: &mut dyn RandomSource,
    ) -> FraxelResult<bool> {
        // Re-mounting an id replaces the previous registration outright.
        self.cards.remove(&id);

        let Some(metrics) = handle.measure() else {
            tracing::debug!(card = %id, "skipping mount, element not measurable");
            return Ok(false);
        };

        let params = profile.params();
        let polygons = decompose(&params.grid, rng)?;
        let shards = resolve_shards(polygons, params.bleed, &metrics, rng)?;
        let timeline = CardTimeline::new(shards, params.build_window, rng)?;

        self.cards.insert(
            id,
            MountedCard {
                profile,
                handle,
                timeline,
                assembled: false,
            },
        );
        Ok(true)
    }

    /// Advance a card to `progress` and return its frame.
    ///
    /// A silent no-op (`None`) for unknown ids and for cards whose host
    /// element has been detached since mount — a callback firing after
    /// removal must never touch a dead element.
    pub fn update(&mut self, id: &str, progress: f64) -> Option<CardFrame> {
        let card = self.cards.get_mut(id)?;
        if !card.handle.is_attached() {
            tracing::trace!(card = %id, "skipping update, element detached");
            return None;
        }
        let frame = card.timeline.sample(progress);
        card.assembled = frame.assembled;
        Some(frame)
    }

    /// The card's exposed "assembled" flag (for conditional styling such as
    /// disabling pointer events on the shard layer).
    pub fn assembled(&self, id: &str) -> bool {
        self.cards.get(id).is_some_and(|c| c.assembled)
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.cards.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Drop one card's timeline. Idempotent; safe after element removal.
    #[tracing::instrument(skip(self))]
    pub fn teardown(&mut self, id: &str) {
        self.cards.remove(id);
    }

    /// Drop every timeline. Called on view unmount.
    #[tracing::instrument(skip(self))]
    pub fn teardown_all(&mut self) {
        self.cards.clear();
    }

    /// Full teardown and re-mount of every registration, for responsive
    /// breakpoint crossings. Timelines are rebuilt from fresh measurements,
    /// never mutated in place; cards whose elements have disappeared are
    /// dropped.
    #[tracing::instrument(skip(self, rng))]
    pub fn reinitialize(&mut self, rng: &mut dyn RandomSource) -> FraxelResult<()> {
        let old = std::mem::take(&mut self.cards);
        for (id, card) in old {
            self.mount(id, card.profile, card.handle, rng)?;
        }
        Ok(())
    }
}

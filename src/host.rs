use crate::core::CardMetrics;

/// Handle to a host-side element, injected at registration time.
///
/// The engine never looks elements up itself; the surrounding layer hands it
/// explicit handles, which removes any chance of grabbing the wrong instance
/// when several views are mounted at once. Geometry is re-measured through
/// the handle on every recompute trigger — layout can change underneath a
/// card (font load, viewport resize) and stale rects are worse than the
/// extra read.
pub trait HostElement {
    /// Whether the element is still attached to the live document/tree.
    fn is_attached(&self) -> bool;

    /// Fresh rendered geometry, or `None` when the element cannot be
    /// measured (absent, display:none, zero-sized).
    fn measure(&self) -> Option<CardMetrics>;
}

impl<E: HostElement + ?Sized> HostElement for Box<E> {
    fn is_attached(&self) -> bool {
        (**self).is_attached()
    }

    fn measure(&self) -> Option<CardMetrics> {
        (**self).measure()
    }
}

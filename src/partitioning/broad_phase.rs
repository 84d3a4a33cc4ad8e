use crate::bounding_volume::Aabb;
use crate::math::{Real, Vector};
use alloc::vec::Vec;

/// The identifier of a proxy inserted into a broad-phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ProxyId(pub usize);

/// A spatial index that finds the pairs of proxies whose bounding boxes may overlap.
///
/// Every proxy carries a payload of type `T`, returned when a pair is reported. Proxies store an
/// enlarged ("fat") AABB so that a proxy moving a little does not need to be re-inserted.
pub trait BroadPhase<T: Copy>: Send + Sync {
    /// Inserts a proxy with the given tight AABB and payload.
    fn create_proxy(&mut self, aabb: &Aabb, data: T) -> ProxyId;

    /// Removes a proxy. The proxy will no longer be reported in pairs.
    fn destroy_proxy(&mut self, proxy: ProxyId);

    /// Updates the tight AABB of a proxy that moved by `displacement`.
    ///
    /// Returns `true` if the proxy needed to be enlarged and was flagged as moved.
    fn move_proxy(&mut self, proxy: ProxyId, aabb: &Aabb, displacement: &Vector<Real>) -> bool;

    /// Flags a proxy as moved, so that its pairs are reported on the next
    /// [`BroadPhase::update_pairs`].
    fn touch_proxy(&mut self, proxy: ProxyId);

    /// The fat AABB of a proxy.
    fn fat_aabb(&self, proxy: ProxyId) -> Option<&Aabb>;

    /// The payload of a proxy.
    fn proxy_data(&self, proxy: ProxyId) -> Option<T>;

    /// Do the fat AABBs of both proxies overlap?
    fn test_overlap(&self, proxy_a: ProxyId, proxy_b: ProxyId) -> bool;

    /// Pushes to `out` the payloads of every overlapping pair involving at least one moved
    /// proxy, then clears the moved flags.
    ///
    /// Each pair is reported once.
    fn update_pairs(&mut self, out: &mut Vec<(T, T)>);

    /// Calls `callback` for each proxy whose fat AABB overlaps `aabb`, until it returns `false`.
    fn query(&self, aabb: &Aabb, callback: &mut dyn FnMut(ProxyId) -> bool);

    /// Translates every proxy so that `new_origin` becomes the origin.
    fn shift_origin(&mut self, new_origin: &Vector<Real>);

    /// The number of proxies.
    fn proxy_count(&self) -> usize;
}

use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Real, Vector};
use crate::partitioning::{BroadPhase, ProxyId};
use crate::utils::SortedPair;
use alloc::vec::Vec;
use slab::Slab;

/// The default fat AABB margin, in meters.
pub const DEFAULT_AABB_EXTENSION: Real = 0.1;
/// The default factor applied to the displacement when predicting the fat AABB.
pub const DEFAULT_AABB_MULTIPLIER: Real = 2.0;

#[derive(Clone, Debug)]
struct Proxy<T> {
    fat_aabb: Aabb,
    data: T,
}

/// A simple broad-phase storing proxies in a slab.
///
/// Pairs are found by testing each moved proxy against every other proxy, then sorted and
/// deduplicated. This is well suited to scenes with a few hundred proxies.
#[derive(Clone, Debug)]
pub struct DefaultBroadPhase<T> {
    proxies: Slab<Proxy<T>>,
    move_buffer: Vec<ProxyId>,
    candidates: Vec<SortedPair<ProxyId>>,
    aabb_extension: Real,
    aabb_multiplier: Real,
}

impl<T> Default for DefaultBroadPhase<T> {
    fn default() -> Self {
        Self::new(DEFAULT_AABB_EXTENSION, DEFAULT_AABB_MULTIPLIER)
    }
}

impl<T> DefaultBroadPhase<T> {
    /// Creates an empty broad-phase.
    ///
    /// Fat AABBs are enlarged by `aabb_extension` on every side, and by `aabb_multiplier` times
    /// the displacement in the direction of motion.
    pub fn new(aabb_extension: Real, aabb_multiplier: Real) -> Self {
        Self {
            proxies: Slab::new(),
            move_buffer: Vec::new(),
            candidates: Vec::new(),
            aabb_extension,
            aabb_multiplier,
        }
    }

    fn buffer_move(&mut self, proxy: ProxyId) {
        self.move_buffer.push(proxy);
    }
}

impl<T: Copy + Send + Sync> BroadPhase<T> for DefaultBroadPhase<T> {
    fn create_proxy(&mut self, aabb: &Aabb, data: T) -> ProxyId {
        let proxy = Proxy {
            fat_aabb: aabb.loosened(self.aabb_extension),
            data,
        };
        let id = ProxyId(self.proxies.insert(proxy));
        self.buffer_move(id);
        id
    }

    fn destroy_proxy(&mut self, proxy: ProxyId) {
        if self.proxies.try_remove(proxy.0).is_some() {
            self.move_buffer.retain(|id| *id != proxy);
        }
    }

    fn move_proxy(&mut self, proxy: ProxyId, aabb: &Aabb, displacement: &Vector<Real>) -> bool {
        let extension = self.aabb_extension;
        let multiplier = self.aabb_multiplier;
        let Some(entry) = self.proxies.get_mut(proxy.0) else {
            return false;
        };

        if entry.fat_aabb.contains(aabb) {
            return false;
        }

        entry.fat_aabb = aabb.loosened(extension).swept(&(displacement * multiplier));
        self.buffer_move(proxy);
        true
    }

    fn touch_proxy(&mut self, proxy: ProxyId) {
        if self.proxies.contains(proxy.0) {
            self.buffer_move(proxy);
        }
    }

    fn fat_aabb(&self, proxy: ProxyId) -> Option<&Aabb> {
        self.proxies.get(proxy.0).map(|p| &p.fat_aabb)
    }

    fn proxy_data(&self, proxy: ProxyId) -> Option<T> {
        self.proxies.get(proxy.0).map(|p| p.data)
    }

    fn test_overlap(&self, proxy_a: ProxyId, proxy_b: ProxyId) -> bool {
        match (self.proxies.get(proxy_a.0), self.proxies.get(proxy_b.0)) {
            (Some(a), Some(b)) => a.fat_aabb.intersects(&b.fat_aabb),
            _ => false,
        }
    }

    fn update_pairs(&mut self, out: &mut Vec<(T, T)>) {
        self.candidates.clear();

        for moved in &self.move_buffer {
            let Some(query) = self.proxies.get(moved.0) else {
                continue;
            };

            for (id, other) in self.proxies.iter() {
                if id != moved.0 && query.fat_aabb.intersects(&other.fat_aabb) {
                    self.candidates.push(SortedPair::new(*moved, ProxyId(id)));
                }
            }
        }

        self.move_buffer.clear();
        self.candidates.sort_unstable();
        self.candidates.dedup();

        for pair in &self.candidates {
            let (a, b) = **pair;
            out.push((self.proxies[a.0].data, self.proxies[b.0].data));
        }
    }

    fn query(&self, aabb: &Aabb, callback: &mut dyn FnMut(ProxyId) -> bool) {
        for (id, proxy) in self.proxies.iter() {
            if proxy.fat_aabb.intersects(aabb) && !callback(ProxyId(id)) {
                return;
            }
        }
    }

    fn shift_origin(&mut self, new_origin: &Vector<Real>) {
        for (_, proxy) in self.proxies.iter_mut() {
            proxy.fat_aabb = proxy.fat_aabb.translated(&-new_origin);
        }
    }

    fn proxy_count(&self) -> usize {
        self.proxies.len()
    }
}

#[cfg(test)]
mod test {
    use super::DefaultBroadPhase;
    use crate::bounding_volume::Aabb;
    use crate::math::{Point, Real, Vector};
    use crate::partitioning::BroadPhase;

    fn unit_box(x: Real, y: Real) -> Aabb {
        Aabb::from_half_extents(Point::new(x, y), Vector::repeat(0.5))
    }

    #[test]
    fn pairs_are_reported_once() {
        let mut bf = DefaultBroadPhase::default();
        let _ = bf.create_proxy(&unit_box(0.0, 0.0), 'a');
        let _ = bf.create_proxy(&unit_box(0.8, 0.0), 'b');
        let _ = bf.create_proxy(&unit_box(5.0, 0.0), 'c');

        let mut pairs = Vec::new();
        bf.update_pairs(&mut pairs);
        assert_eq!(pairs.len(), 1);
        let (a, b) = pairs[0];
        assert!((a, b) == ('a', 'b') || (a, b) == ('b', 'a'));

        pairs.clear();
        bf.update_pairs(&mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn small_moves_stay_in_the_fat_aabb() {
        let mut bf = DefaultBroadPhase::default();
        let id = bf.create_proxy(&unit_box(0.0, 0.0), 0u32);
        let mut pairs = Vec::new();
        bf.update_pairs(&mut pairs);

        let small = Vector::new(0.05, 0.0);
        assert!(!bf.move_proxy(id, &unit_box(0.05, 0.0), &small));

        let large = Vector::new(1.0, 0.0);
        assert!(bf.move_proxy(id, &unit_box(1.0, 0.0), &large));
        let fat = bf.fat_aabb(id).unwrap();
        // Predicted along the motion direction only.
        assert!(fat.maxs.x >= 1.5 + 0.1 + 2.0 - 1.0e-5);
        assert!((fat.mins.x - (0.5 - 0.1)).abs() < 1.0e-5);
    }

    #[test]
    fn destroyed_proxies_are_not_reported() {
        let mut bf = DefaultBroadPhase::default();
        let a = bf.create_proxy(&unit_box(0.0, 0.0), 1);
        let _ = bf.create_proxy(&unit_box(0.5, 0.5), 2);
        bf.destroy_proxy(a);

        let mut pairs = Vec::new();
        bf.update_pairs(&mut pairs);
        assert!(pairs.is_empty());
        assert_eq!(bf.proxy_count(), 1);

        let mut found = 0;
        bf.query(&unit_box(0.5, 0.5), &mut |_| {
            found += 1;
            true
        });
        assert_eq!(found, 1);
    }
}

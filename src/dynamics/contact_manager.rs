use crate::dynamics::contact::ContactFlags;
use crate::dynamics::{
    Body, BodyHandle, Contact, ContactEdge, ContactFilter, ContactHandle, ContactListener,
    DefaultContactFilter, Fixture, FixtureProxy, NoopContactListener,
};
use crate::partitioning::{BroadPhase, DefaultBroadPhase, ProxyId};
use crate::query::{DefaultNarrowPhase, NarrowPhase};
use alloc::boxed::Box;
use alloc::vec::Vec;
use thunderdome::Arena;

/// Owns the contacts and drives their lifecycle.
///
/// Contacts are created when the broad-phase reports new overlapping proxies, refreshed once
/// per step by [`ContactManager::collide`], and destroyed once the proxies stop overlapping.
pub struct ContactManager {
    pub(crate) contacts: Arena<Contact>,
    // Contacts in insertion order. Destroyed contacts leave a stale handle behind until the next
    // `collide` compacts the list.
    pub(crate) contact_list: Vec<ContactHandle>,
    pub(crate) broad_phase: Box<dyn BroadPhase<FixtureProxy>>,
    pub(crate) narrow_phase: Box<dyn NarrowPhase>,
    pub(crate) contact_filter: Box<dyn ContactFilter>,
    pub(crate) contact_listener: Box<dyn ContactListener>,
    pairs: Vec<(FixtureProxy, FixtureProxy)>,
    snapshot: Vec<ContactHandle>,
}

impl Default for ContactManager {
    fn default() -> Self {
        Self::new(
            Box::new(DefaultBroadPhase::default()),
            Box::new(DefaultNarrowPhase::default()),
        )
    }
}

impl ContactManager {
    /// A contact manager with the given broad-phase and narrow-phase.
    pub fn new(
        broad_phase: Box<dyn BroadPhase<FixtureProxy>>,
        narrow_phase: Box<dyn NarrowPhase>,
    ) -> Self {
        Self {
            contacts: Arena::new(),
            contact_list: Vec::new(),
            broad_phase,
            narrow_phase,
            contact_filter: Box::new(DefaultContactFilter),
            contact_listener: Box::new(NoopContactListener),
            pairs: Vec::new(),
            snapshot: Vec::new(),
        }
    }

    /// The number of contacts.
    #[inline]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Is there no contact?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// The contact with the given handle.
    #[inline]
    pub fn get(&self, handle: ContactHandle) -> Option<&Contact> {
        self.contacts.get(handle.0)
    }

    /// Iterates through all the contacts, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ContactHandle, &Contact)> {
        self.contact_list
            .iter()
            .filter_map(|h| self.contacts.get(h.0).map(|c| (*h, c)))
    }

    /// The broad-phase.
    #[inline]
    pub fn broad_phase(&self) -> &dyn BroadPhase<FixtureProxy> {
        &*self.broad_phase
    }

    /// The narrow-phase.
    #[inline]
    pub fn narrow_phase(&self) -> &dyn NarrowPhase {
        &*self.narrow_phase
    }

    /// Called for each pair of overlapping proxies reported by the broad-phase.
    pub(crate) fn add_pair(
        &mut self,
        bodies: &mut Arena<Body>,
        fixtures: &Arena<Fixture>,
        proxy_a: FixtureProxy,
        proxy_b: FixtureProxy,
    ) {
        let (Some(fixture_a), Some(fixture_b)) =
            (fixtures.get(proxy_a.fixture.0), fixtures.get(proxy_b.fixture.0))
        else {
            return;
        };

        let handle_a = fixture_a.body();
        let handle_b = fixture_b.body();

        if handle_a == handle_b {
            return;
        }

        let (Some(body_a), Some(body_b)) = (bodies.get(handle_a.0), bodies.get(handle_b.0)) else {
            return;
        };

        let exists = body_b.contact_edges.iter().any(|edge| {
            edge.other == handle_a
                && self.contacts.get(edge.contact.0).is_some_and(|c| {
                    c.joins(
                        proxy_a.fixture,
                        proxy_a.child_index,
                        proxy_b.fixture,
                        proxy_b.child_index,
                    )
                })
        });

        if exists {
            return;
        }

        if !body_b.should_collide(handle_a, body_a) {
            return;
        }

        if !self.contact_filter.should_collide(fixture_a, fixture_b) {
            return;
        }

        // The first shape of a contact has the greatest type.
        let (proxy_a, fixture_a, proxy_b, fixture_b) =
            if fixture_a.shape().shape_type() < fixture_b.shape().shape_type() {
                (proxy_b, fixture_b, proxy_a, fixture_a)
            } else {
                (proxy_a, fixture_a, proxy_b, fixture_b)
            };

        let type_a = fixture_a.shape().shape_type();
        let type_b = fixture_b.shape().shape_type();
        if !self.narrow_phase.supports(type_a, type_b) {
            log::debug!(
                "No contact created between {:?} and {:?}: unsupported shape pair.",
                type_a,
                type_b
            );
            return;
        }

        let contact = Contact::new(
            proxy_a.fixture,
            fixture_a,
            proxy_a.child_index,
            proxy_b.fixture,
            fixture_b,
            proxy_b.child_index,
        );
        let body_a = contact.body_a;
        let body_b = contact.body_b;
        let handle = ContactHandle(self.contacts.insert(contact));
        self.contact_list.push(handle);

        if let (Some(a), Some(b)) = bodies.get2_mut(body_a.0, body_b.0) {
            a.contact_edges.push(ContactEdge {
                contact: handle,
                other: body_b,
            });
            b.contact_edges.push(ContactEdge {
                contact: handle,
                other: body_a,
            });

            if !fixture_a.is_sensor() && !fixture_b.is_sensor() {
                a.set_awake(true);
                b.set_awake(true);
            }
        }

        log::debug!(
            "Created contact {:?} between {:?} and {:?}.",
            handle,
            proxy_a.fixture,
            proxy_b.fixture
        );
    }

    /// Asks the broad-phase for the new overlapping pairs and creates their contacts.
    pub(crate) fn find_new_contacts(&mut self, bodies: &mut Arena<Body>, fixtures: &Arena<Fixture>) {
        let mut pairs = core::mem::take(&mut self.pairs);
        pairs.clear();
        self.broad_phase.update_pairs(&mut pairs);

        for (proxy_a, proxy_b) in pairs.drain(..) {
            self.add_pair(bodies, fixtures, proxy_a, proxy_b);
        }

        self.pairs = pairs;
    }

    /// Destroys a contact, notifying the listener if it was touching.
    pub(crate) fn destroy(
        &mut self,
        handle: ContactHandle,
        bodies: &mut Arena<Body>,
        fixtures: &Arena<Fixture>,
    ) {
        let Some(contact) = self.contacts.remove(handle.0) else {
            return;
        };

        if contact.is_touching() {
            self.contact_listener.end_contact(&contact);
        }

        let sensor = fixtures
            .get(contact.fixture_a.0)
            .is_some_and(|f| f.is_sensor())
            || fixtures
                .get(contact.fixture_b.0)
                .is_some_and(|f| f.is_sensor());
        let wake = !contact.manifold.is_empty() && !sensor;

        for body in [contact.body_a, contact.body_b] {
            if let Some(body) = bodies.get_mut(body.0) {
                body.unlink_contact(handle);
                if wake {
                    body.set_awake(true);
                }
            }
        }

        log::debug!("Destroyed contact {:?}.", handle);
    }

    /// Updates every contact: filtering, broad-phase overlap and narrow-phase manifolds.
    pub(crate) fn collide(&mut self, bodies: &mut Arena<Body>, fixtures: &Arena<Fixture>) {
        let contacts = &self.contacts;
        self.contact_list.retain(|h| contacts.contains(h.0));

        let mut snapshot = core::mem::take(&mut self.snapshot);
        snapshot.clear();
        snapshot.extend_from_slice(&self.contact_list);

        for handle in snapshot.iter().copied() {
            let Some(contact) = self.contacts.get_mut(handle.0) else {
                continue;
            };
            let (Some(fixture_a), Some(fixture_b)) = (
                fixtures.get(contact.fixture_a.0),
                fixtures.get(contact.fixture_b.0),
            ) else {
                continue;
            };
            let (Some(body_a), Some(body_b)) =
                (bodies.get(contact.body_a.0), bodies.get(contact.body_b.0))
            else {
                continue;
            };

            if contact.flags.contains(ContactFlags::FILTER) {
                if !body_b.should_collide(contact.body_a, body_a)
                    || !self.contact_filter.should_collide(fixture_a, fixture_b)
                {
                    self.destroy(handle, bodies, fixtures);
                    continue;
                }

                contact.flags.remove(ContactFlags::FILTER);
            }

            let active_a = body_a.is_awake() && !body_a.is_static();
            let active_b = body_b.is_awake() && !body_b.is_static();

            // Sleeping and static bodies do not move, so their contacts do not change.
            if !active_a && !active_b {
                continue;
            }

            let overlap = match (
                proxy_of(fixture_a, contact.child_a),
                proxy_of(fixture_b, contact.child_b),
            ) {
                (Some(a), Some(b)) => self.broad_phase.test_overlap(a, b),
                _ => false,
            };

            if !overlap {
                self.destroy(handle, bodies, fixtures);
                continue;
            }

            self.update_contact(handle, bodies, fixtures);
        }

        self.snapshot = snapshot;
    }

    /// Refreshes the manifold and touching state of a contact, and fires the listener events.
    pub(crate) fn update_contact(
        &mut self,
        handle: ContactHandle,
        bodies: &mut Arena<Body>,
        fixtures: &Arena<Fixture>,
    ) {
        let Some(contact) = self.contacts.get_mut(handle.0) else {
            return;
        };
        let (Some(fixture_a), Some(fixture_b)) = (
            fixtures.get(contact.fixture_a.0),
            fixtures.get(contact.fixture_b.0),
        ) else {
            return;
        };
        let (Some(xf_a), Some(xf_b)) = (
            bodies.get(contact.body_a.0).map(|b| b.xf),
            bodies.get(contact.body_b.0).map(|b| b.xf),
        ) else {
            return;
        };

        let old_manifold = contact.manifold.clone();
        contact.flags.insert(ContactFlags::ENABLED);

        let was_touching = contact.is_touching();
        let sensor = fixture_a.is_sensor() || fixture_b.is_sensor();
        let touching;

        if sensor {
            touching = self.narrow_phase.test_overlap(
                fixture_a.shape(),
                contact.child_a,
                &xf_a,
                fixture_b.shape(),
                contact.child_b,
                &xf_b,
            );
            // Sensors do not generate manifolds.
            contact.manifold.clear();
        } else {
            if let Err(err) = self.narrow_phase.evaluate(
                fixture_a.shape(),
                contact.child_a,
                &xf_a,
                fixture_b.shape(),
                contact.child_b,
                &xf_b,
                &mut contact.manifold,
            ) {
                log::debug!("Failed to update contact {:?}: {}", handle, err);
                contact.manifold.clear();
            }

            contact.manifold.match_impulses(&old_manifold);
            touching = !contact.manifold.is_empty();

            if touching != was_touching {
                for body in [contact.body_a, contact.body_b] {
                    if let Some(body) = bodies.get_mut(body.0) {
                        body.set_awake(true);
                    }
                }
            }
        }

        contact.flags.set(ContactFlags::TOUCHING, touching);

        if !was_touching && touching {
            self.contact_listener.begin_contact(contact);
        }

        if was_touching && !touching {
            self.contact_listener.end_contact(contact);
        }

        if !sensor && touching {
            self.contact_listener.pre_solve(contact, &old_manifold);
        }
    }

    /// Flags every contact between the two bodies for filtering.
    pub(crate) fn flag_contacts_between(
        &mut self,
        bodies: &Arena<Body>,
        body: BodyHandle,
        other: BodyHandle,
    ) {
        let Some(body) = bodies.get(body.0) else {
            return;
        };

        for edge in body.contact_edges.iter().filter(|e| e.other == other) {
            if let Some(contact) = self.contacts.get_mut(edge.contact.0) {
                contact.flag_for_filtering();
            }
        }
    }
}

fn proxy_of(fixture: &Fixture, child_index: usize) -> Option<ProxyId> {
    fixture
        .proxies
        .iter()
        .find(|p| p.child_index == child_index)
        .map(|p| p.proxy_id)
}

use crate::{dynamic_ball, ground, gravity, step, DT};
use approx::assert_relative_eq;
use impulse2d::dynamics::{
    CollisionFilter, Contact, ContactImpulse, ContactListener, FixtureDef, World,
};
use impulse2d::math::{Point, Real};
use impulse2d::query::Manifold;
use impulse2d::shape::SharedShape;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
struct EventCounter {
    begin: Arc<AtomicUsize>,
    end: Arc<AtomicUsize>,
    pre_solve: Arc<AtomicUsize>,
    post_solve: Arc<AtomicUsize>,
    disable: bool,
}

impl EventCounter {
    fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl ContactListener for EventCounter {
    fn begin_contact(&mut self, _contact: &Contact) {
        let _ = self.begin.fetch_add(1, Ordering::SeqCst);
    }

    fn end_contact(&mut self, _contact: &Contact) {
        let _ = self.end.fetch_add(1, Ordering::SeqCst);
    }

    fn pre_solve(&mut self, contact: &mut Contact, _old_manifold: &Manifold) {
        let _ = self.pre_solve.fetch_add(1, Ordering::SeqCst);
        if self.disable {
            contact.set_enabled(false);
        }
    }

    fn post_solve(&mut self, _contact: &Contact, impulse: &ContactImpulse) {
        assert!(impulse.count > 0);
        assert!(impulse.normal_impulses[..impulse.count]
            .iter()
            .all(|i| *i >= 0.0));
        let _ = self.post_solve.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn begin_and_end_events_bracket_a_touch() {
    let mut world = World::new(gravity());
    let events = EventCounter::default();
    world.set_contact_listener(Box::new(events.clone()));

    let _ = ground(&mut world);
    let (ball, _) = dynamic_ball(&mut world, Point::new(0.0, 2.0), 0.5);

    step(&mut world, 60);
    assert_eq!(EventCounter::count(&events.begin), 1);
    assert_eq!(EventCounter::count(&events.end), 0);
    assert!(EventCounter::count(&events.pre_solve) > 0);
    assert!(EventCounter::count(&events.post_solve) > 0);
    assert!((world.body(ball).unwrap().position().y - 1.0).abs() < 0.05);

    let (handle, contact) = world.contacts().next().unwrap();
    assert!(contact.is_touching());
    let manifold = world.world_manifold(handle).unwrap();
    assert!(manifold.len > 0);
    assert!(manifold.normal.y.abs() > 0.99);

    // Teleport the ball away: the contact is destroyed during the next step.
    world
        .set_transform(ball, Point::new(0.0, 10.0), 0.0)
        .unwrap();
    world.body_mut(ball).unwrap().set_awake(true);
    step(&mut world, 1);

    assert_eq!(EventCounter::count(&events.end), 1);
    assert_eq!(world.contact_count(), 0);
}

#[test]
fn contacts_disabled_before_solving_let_bodies_through() {
    let mut world = World::new(gravity());
    let events = EventCounter {
        disable: true,
        ..Default::default()
    };
    world.set_contact_listener(Box::new(events.clone()));

    let _ = ground(&mut world);
    let (ball, _) = dynamic_ball(&mut world, Point::new(0.0, 2.0), 0.5);

    step(&mut world, 120);

    assert!(EventCounter::count(&events.begin) >= 1);
    assert_eq!(EventCounter::count(&events.post_solve), 0);
    assert!(world.body(ball).unwrap().position().y < -5.0);
}

#[test]
fn filtered_fixtures_never_touch() {
    let mut world = World::new(gravity());
    let _ = ground(&mut world);

    let ghost_filter = CollisionFilter {
        mask_bits: 0,
        ..Default::default()
    };
    let (ball, fixture) = dynamic_ball(&mut world, Point::new(0.0, 2.0), 0.5);
    world.set_fixture_filter(fixture, ghost_filter).unwrap();

    step(&mut world, 120);

    assert_eq!(world.contact_count(), 0);
    assert!(world.body(ball).unwrap().position().y < -5.0);
}

#[test]
fn refiltering_destroys_existing_contacts() {
    let mut world = World::new(gravity());
    let _ = ground(&mut world);
    let (ball, fixture) = dynamic_ball(&mut world, Point::new(0.0, 1.0), 0.5);

    step(&mut world, 10);
    assert_eq!(world.contact_count(), 1);

    let filter = CollisionFilter {
        group_index: -1,
        ..Default::default()
    };
    world.set_fixture_filter(fixture, filter).unwrap();
    let ground_fixture = world
        .fixtures()
        .find(|(_, f)| f.body() != ball)
        .map(|(h, _)| h)
        .unwrap();
    world.set_fixture_filter(ground_fixture, filter).unwrap();

    step(&mut world, 1);
    assert_eq!(world.contact_count(), 0);
}

#[test]
fn sensors_report_overlaps_without_colliding() {
    let mut world = World::new(gravity());
    let events = EventCounter::default();
    world.set_contact_listener(Box::new(events.clone()));

    let ground = world.create_body(&Default::default()).unwrap();
    let _ = world
        .create_fixture(
            ground,
            FixtureDef::new(SharedShape::cuboid(20.0, 0.5)).sensor(true),
        )
        .unwrap();
    let (ball, _) = dynamic_ball(&mut world, Point::new(0.0, 2.0), 0.5);

    step(&mut world, 30);
    assert_eq!(EventCounter::count(&events.begin), 1);
    assert_eq!(EventCounter::count(&events.pre_solve), 0);
    assert!(world.contacts().all(|(_, c)| c.manifold().is_empty()));

    step(&mut world, 90);
    assert_eq!(EventCounter::count(&events.end), 1);
    assert!(world.body(ball).unwrap().position().y < -2.0);
}

#[test]
fn resting_contact_impulse_balances_gravity() {
    for warm_starting in [true, false] {
        let mut world = World::new(gravity());
        world.set_warm_starting(warm_starting);
        let _ = ground(&mut world);
        let (ball, _) = dynamic_ball(&mut world, Point::new(0.0, 1.0), 0.5);

        step(&mut world, 30);

        let weight = world.body(ball).unwrap().mass() * 10.0 * DT;
        let (_, contact) = world.contacts().next().unwrap();
        let points = &contact.manifold().points;
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].normal_impulse, weight, max_relative = 0.1);
    }
}

#[test]
fn contact_list_stays_consistent_across_destruction() {
    let mut world = World::new(gravity());
    let _ = ground(&mut world);
    let balls: Vec<_> = (0..4)
        .map(|i| dynamic_ball(&mut world, Point::new(-3.0 + 2.0 * i as Real, 1.0), 0.5))
        .collect();

    step(&mut world, 10);
    assert_eq!(world.contact_count(), 4);

    // Destroying fixtures removes their contacts right away.
    world.destroy_fixture(balls[1].1).unwrap();
    world.destroy_fixture(balls[2].1).unwrap();
    assert_eq!(world.contact_count(), 2);
    assert_eq!(world.contacts().count(), 2);

    step(&mut world, 1);
    assert_eq!(world.contacts().count(), 2);
    let survivors = [balls[0].0, balls[3].0];
    for (handle, contact) in world.contacts() {
        assert!(world.contact(handle).is_some());
        assert!(survivors.contains(&contact.body_a()) || survivors.contains(&contact.body_b()));
    }

    // New contacts are listed after the surviving ones.
    let _ = world
        .create_fixture(balls[1].0, FixtureDef::new(SharedShape::ball(0.5)).density(1.0))
        .unwrap();
    step(&mut world, 1);
    assert_eq!(world.contact_count(), 3);
    let revived = balls[1].0;
    let touches_revived: Vec<_> = world
        .contacts()
        .map(|(_, c)| c.body_a() == revived || c.body_b() == revived)
        .collect();
    assert_eq!(touches_revived, vec![false, false, true]);
}

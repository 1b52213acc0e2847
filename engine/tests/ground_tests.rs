//! Ground Tests - Ground, Rail, Contact and Penetration Classification
//!
//! Runs entities through full updates against scripted and box worlds.

mod common;

use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use common::{Phase, ScriptedWorld};
use glam::{Quat, Vec3};
use platformer_kit_engine::physics::{
    Aabb, BoxCollider, ColliderId, ContactRegistry, Damage, EntityContact, Penetration,
    StaticWorld, SurfaceTags,
};

const DT: f32 = 0.1;

/// Depth below the capsule centre of the step threshold (h/2 - step offset).
const STEP_DEPTH: f32 = 0.7;

fn floor(world: &mut StaticWorld, tags: SurfaceTags) -> ColliderId {
    world.insert(
        BoxCollider::new(Vec3::new(-20.0, -1.0, -20.0), Vec3::new(20.0, 0.0, 20.0))
            .with_tags(tags),
    )
}

// ============================================================================
// Ground Test
// ============================================================================

#[test]
fn test_grounded_on_gentle_slope_stays_grounded() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new().with_ground(STEP_DEPTH + 0.05, 10.0, SurfaceTags::NONE);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);
    entity.body_mut().set_velocity(Vec3::new(0.0, -5.0, 0.0));

    entity.update(&world, &mut contacts);

    let body = entity.body();
    assert!(body.is_grounded());
    assert!((body.ground().angle - 10.0).abs() < 1e-3);
    assert!((body.ground().normal.x - 10f32.to_radians().sin()).abs() < 1e-5);
    assert!(body.ground().local_slope_direction.x > 0.99);
    assert!(entity.data().slopes.is_empty());
    assert!(entity.data().ledges.is_empty());
}

#[test]
fn test_rising_entity_does_not_land() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new().with_ground(0.9, 0.0, SurfaceTags::NONE);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);
    entity.body_mut().exit_ground();
    entity.body_mut().set_velocity(Vec3::new(0.0, 2.0, 0.0));

    entity.update(&world, &mut contacts);

    assert!(!entity.body().is_grounded());
    assert_eq!(entity.body().velocity().y, 2.0);
    assert!((entity.body().position().y - 5.2).abs() < 1e-5);
}

#[test]
fn test_airborne_entity_lands() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new().with_ground(0.9, 0.0, SurfaceTags::NONE);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);
    entity.body_mut().exit_ground();

    let landings = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&landings);
    entity
        .body_mut()
        .events
        .ground_enter
        .subscribe(move |_| *counter.borrow_mut() += 1);

    entity.update(&world, &mut contacts);
    entity.update(&world, &mut contacts);

    assert!(entity.body().is_grounded());
    assert_eq!(*landings.borrow(), 1);
}

#[test]
fn test_high_ledge_while_airborne() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new().with_ground(STEP_DEPTH - 0.05, 0.0, SurfaceTags::NONE);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);
    entity.body_mut().exit_ground();

    entity.update(&world, &mut contacts);

    assert!(!entity.body().is_grounded());
    assert_eq!(entity.data().ledges.len(), 1);
}

#[test]
fn test_landing_rejected_on_steep_surface() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new().with_ground(0.9, 60.0, SurfaceTags::NONE);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);
    entity.body_mut().exit_ground();

    entity.update(&world, &mut contacts);

    assert!(!entity.body().is_grounded());
    assert_eq!(entity.data().ledges.len(), 1);
}

#[test]
fn test_slope_limit_handler_while_grounded() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new().with_ground(0.9, 50.0, SurfaceTags::NONE);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);

    entity.update(&world, &mut contacts);

    assert!(entity.body().is_grounded());
    assert_eq!(entity.data().slopes.len(), 1);
    assert!((entity.body().ground().angle - 50.0).abs() < 1e-3);
}

#[test]
fn test_grounded_ledge_above_step() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new().with_ground(0.5, 0.0, SurfaceTags::NONE);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);

    entity.update(&world, &mut contacts);

    assert!(entity.body().is_grounded());
    assert_eq!(entity.data().ledges.len(), 1);
}

#[test]
fn test_losing_ground_clamps_fall_and_records_time() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new();
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);
    entity.body_mut().set_velocity(Vec3::new(1.0, -5.0, 0.0));

    entity.update(&world, &mut contacts);

    let body = entity.body();
    assert!(!body.is_grounded());
    assert_eq!(body.velocity(), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(body.last_ground_time(), clock.time());
}

// ============================================================================
// Rails
// ============================================================================

#[test]
fn test_rail_and_ground_are_exclusive() {
    let clock = common::clock(DT);
    let log = common::log();
    let mut world = StaticWorld::new();
    let rail = floor(&mut world, SurfaceTags::RAIL);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 1.05, 0.0), &clock, &log);

    let rail_events = common::log();
    let enter = Rc::clone(&rail_events);
    entity
        .body_mut()
        .events
        .rail_enter
        .subscribe(move |_| enter.borrow_mut().push("rail enter".to_string()));
    let exit = Rc::clone(&rail_events);
    entity
        .body_mut()
        .events
        .ground_exit
        .subscribe(move |_| exit.borrow_mut().push("ground exit".to_string()));

    for _ in 0..3 {
        entity.update(&world, &mut contacts);
        let body = entity.body();
        assert!(!(body.is_grounded() && body.on_rails()));
    }
    assert!(entity.body().on_rails());
    assert_eq!(entity.body().rail(), Some(rail));
    assert_eq!(common::entries(&rail_events), vec!["ground exit", "rail enter"]);

    world.remove(rail);
    entity.update(&world, &mut contacts);
    assert!(!entity.body().on_rails());
    assert!(!entity.body().is_grounded());
}

#[test]
fn test_rising_entity_does_not_board_rail() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new().with_ground(1.2, 0.0, SurfaceTags::RAIL);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);
    entity.body_mut().set_velocity(Vec3::new(0.0, 3.0, 0.0));

    entity.update(&world, &mut contacts);

    assert!(!entity.body().on_rails());
}

// ============================================================================
// Moving Platforms
// ============================================================================

#[test]
fn test_grounded_entity_rides_platform() {
    let clock = common::clock(DT);
    let log = common::log();
    let mut world = StaticWorld::new();
    let platform = floor(&mut world, SurfaceTags::PLATFORM);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 1.05, 0.0), &clock, &log);

    entity.update(&world, &mut contacts);
    assert_eq!(entity.body().platform().map(|p| p.collider), Some(platform));

    let center = world.get(platform).unwrap().position;
    world.set_position(platform, center + Vec3::new(1.5, 0.0, -0.5));
    entity.update(&world, &mut contacts);

    let position = entity.body().position();
    assert!((position.x - 1.5).abs() < 1e-4);
    assert!((position.z + 0.5).abs() < 1e-4);
}

#[test]
fn test_rider_turns_with_rotating_platform() {
    let clock = common::clock(DT);
    let log = common::log();
    let mut world = StaticWorld::new();
    let platform = floor(&mut world, SurfaceTags::PLATFORM);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(2.0, 1.05, 0.0), &clock, &log);

    entity.update(&world, &mut contacts);
    assert_eq!(entity.body().platform().map(|p| p.collider), Some(platform));

    world.set_rotation(platform, Quat::from_rotation_y(FRAC_PI_2));
    entity.update(&world, &mut contacts);

    let position = entity.body().position();
    assert!((position - Vec3::new(0.0, 1.05, -2.0)).length() < 1e-4, "{position:?}");
    assert!((entity.body().forward() - Vec3::NEG_X).length() < 1e-4);
    assert!(entity.body().rotation().is_normalized());
}

// ============================================================================
// Contacts
// ============================================================================

#[test]
fn test_contact_listener_damage_reaches_family() {
    let clock = common::clock(DT);
    let log = common::log();
    let mut world = StaticWorld::new();
    floor(&mut world, SurfaceTags::NONE);
    let spikes = world.insert(
        BoxCollider::new(Vec3::new(0.505, 0.0, -1.0), Vec3::new(1.5, 2.0, 1.0))
            .with_tags(common::HAZARD),
    );
    let mut contacts = ContactRegistry::new();
    let origin = Vec3::new(1.0, 1.0, 0.0);
    contacts.attach(spikes, move |_: &EntityContact| -> Option<Damage> {
        Some(Damage { amount: 5, origin })
    });

    let mut entity = common::spawn(Vec3::new(0.0, 1.005, 0.0), &clock, &log);
    entity.update(&world, &mut contacts);

    assert_eq!(entity.data().damage, vec![Damage { amount: 5, origin }]);
    assert_eq!(entity.states().current_id(), Some(Phase::Hurt));
    assert_eq!(
        common::entries(&log),
        vec!["step idle", "contact idle", "contact idle", "exit idle", "enter hurt"]
    );
}

#[test]
fn test_ceiling_contact_stops_rising() {
    let clock = common::clock(DT);
    let log = common::log();
    let mut world = ScriptedWorld::new();
    world.overlaps.push(common::collider(
        7,
        Aabb::new(Vec3::new(-5.0, 100.0, -5.0), Vec3::new(5.0, 101.0, 5.0)),
        SurfaceTags::NONE,
    ));
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);
    entity.body_mut().set_velocity(Vec3::new(1.0, 3.0, 0.0));

    entity.update(&world, &mut contacts);

    assert_eq!(entity.body().velocity(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_side_contact_keeps_rising() {
    let clock = common::clock(DT);
    let log = common::log();
    let mut world = ScriptedWorld::new();
    world.overlaps.push(common::collider(
        7,
        Aabb::new(Vec3::new(0.5, 0.0, -1.0), Vec3::new(2.0, 10.0, 1.0)),
        SurfaceTags::NONE,
    ));
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::new(0.0, 5.0, 0.0), &clock, &log);
    entity.body_mut().set_velocity(Vec3::new(0.0, 3.0, 0.0));

    entity.update(&world, &mut contacts);

    assert_eq!(entity.body().velocity().y, 3.0);
}

#[test]
fn test_trigger_colliders_are_not_contacts() {
    let clock = common::clock(DT);
    let log = common::log();
    let mut world = ScriptedWorld::new();
    let mut trigger = common::collider(
        3,
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
        SurfaceTags::NONE,
    );
    trigger.is_trigger = true;
    world.overlaps.push(trigger);
    let mut contacts = ContactRegistry::new();
    let mut entity = common::spawn(Vec3::ZERO, &clock, &log);

    entity.update(&world, &mut contacts);

    assert!(!common::entries(&log).iter().any(|e| e.starts_with("contact")));
}

// ============================================================================
// Penetration
// ============================================================================

fn penetrating_world(tags: SurfaceTags) -> ScriptedWorld {
    let mut world = ScriptedWorld::new();
    world.overlaps.push(common::collider(
        4,
        Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(-0.3, 3.0, 1.0)),
        tags,
    ));
    world.penetration = Some(Penetration {
        direction: Vec3::new(1.0, 1.0, 0.0).normalize(),
        distance: 0.2,
    });
    world
}

#[test]
fn test_still_entity_pushed_out_horizontally() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = penetrating_world(SurfaceTags::NONE);
    let mut entity = common::spawn(Vec3::new(0.0, 1.5, 0.0), &clock, &log);

    entity.late_update(&world);

    let position = entity.body().position();
    assert!((position.x - 0.2).abs() < 1e-5);
    assert_eq!(position.y, 1.5);
}

#[test]
fn test_moving_entity_only_pushed_by_platforms() {
    let clock = common::clock(DT);
    let log = common::log();

    let world = penetrating_world(SurfaceTags::NONE);
    let mut entity = common::spawn(Vec3::new(0.0, 1.5, 0.0), &clock, &log);
    entity.body_mut().set_velocity(Vec3::new(0.0, 0.0, 3.0));
    entity.late_update(&world);
    assert_eq!(entity.body().position(), Vec3::new(0.0, 1.5, 0.0));

    let world = penetrating_world(SurfaceTags::PLATFORM);
    entity.late_update(&world);
    assert!((entity.body().position().x - 0.2).abs() < 1e-5);
}

#[test]
fn test_position_delta_tracked_in_late_update() {
    let clock = common::clock(DT);
    let log = common::log();
    let world = ScriptedWorld::new();
    let mut entity = common::spawn(Vec3::ZERO, &clock, &log);

    entity.late_update(&world);
    entity.body_mut().set_position(Vec3::new(0.0, 0.0, 2.0));
    entity.late_update(&world);

    assert!((entity.body().position_delta() - 2.0).abs() < 1e-6);
}

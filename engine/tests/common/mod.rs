//! Shared fixtures for integration tests: a scripted physics world, a test
//! entity family and a few recording states.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Quat, Vec3};
use platformer_kit_engine::physics::{
    Aabb, CastHit, Collider, ColliderId, Damage, LayerMask, Penetration, PhysicsWorld,
    QueryFilter, Shape, SurfaceTags,
};
use platformer_kit_engine::{
    Actor, Entity, EntityConfig, EntityFamily, EntityState, SimulationClock, StateRegistry,
};

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// ============================================================================
// Scripted world
// ============================================================================

/// Ground under a probe, placed relative to the cast origin.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedGround {
    pub offset: Vec3,
    pub normal: Vec3,
    pub collider: Collider,
}

/// Physics world whose answers are set by the test.
///
/// Sphere casts pointing down report `ground`; capsule casts (controller
/// moves) never hit anything.
#[derive(Debug, Default)]
pub struct ScriptedWorld {
    pub ground: Option<ScriptedGround>,
    pub overlaps: Vec<Collider>,
    pub penetration: Option<Penetration>,
    pub colliders: HashMap<ColliderId, Collider>,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ground `depth` below the probe origin with the given slope in degrees.
    pub fn with_ground(mut self, depth: f32, slope_degrees: f32, tags: SurfaceTags) -> Self {
        let angle = slope_degrees.to_radians();
        self.ground = Some(ScriptedGround {
            offset: Vec3::new(0.0, -depth, 0.0),
            normal: Vec3::new(angle.sin(), angle.cos(), 0.0),
            collider: collider(1, Aabb::new(Vec3::splat(-50.0), Vec3::ZERO), tags),
        });
        self
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn shape_cast(
        &self,
        origin: Vec3,
        shape: Shape,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<CastHit> {
        if !matches!(shape, Shape::Sphere { .. }) || direction.y >= 0.0 {
            return None;
        }
        let ground = self.ground.filter(|g| filter.accepts(&g.collider))?;
        let distance = (-ground.offset.y - shape.radius()).max(0.0);
        if distance > max_distance {
            return None;
        }
        Some(CastHit {
            point: origin + ground.offset,
            normal: ground.normal,
            distance,
            collider: ground.collider,
        })
    }

    fn overlap(&self, _position: Vec3, _shape: Shape, filter: QueryFilter) -> Vec<Collider> {
        self.overlaps
            .iter()
            .filter(|c| filter.accepts(c))
            .copied()
            .collect()
    }

    fn compute_penetration(
        &self,
        _shape: Shape,
        _position: Vec3,
        _other: &Collider,
    ) -> Option<Penetration> {
        self.penetration
    }

    fn collider(&self, id: ColliderId) -> Option<Collider> {
        self.colliders.get(&id).copied()
    }
}

/// Game-defined tag for damaging surfaces.
pub const HAZARD: SurfaceTags = SurfaceTags::USER;

pub fn collider(id: u32, bounds: Aabb, tags: SurfaceTags) -> Collider {
    Collider {
        id: ColliderId(id),
        position: bounds.center(),
        rotation: Quat::IDENTITY,
        bounds,
        layer: LayerMask::DEFAULT,
        tags,
        is_trigger: false,
    }
}

// ============================================================================
// Test family
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Walk,
    Hurt,
}

/// Records every handler call.
#[derive(Debug, Default)]
pub struct Probe {
    pub ledges: Vec<CastHit>,
    pub slopes: Vec<CastHit>,
    pub damage: Vec<Damage>,
    pub updates: u32,
}

impl EntityFamily for Probe {
    type StateId = Phase;

    fn on_update(actor: &mut Actor<Self>, _world: &dyn PhysicsWorld) {
        actor.data.updates += 1;
    }

    fn on_high_ledge(actor: &mut Actor<Self>, hit: &CastHit) {
        actor.data.ledges.push(*hit);
    }

    fn on_slope_limit(actor: &mut Actor<Self>, hit: &CastHit) {
        actor.data.slopes.push(*hit);
    }

    fn apply_damage(actor: &mut Actor<Self>, damage: Damage) {
        actor.data.damage.push(damage);
        actor.change_state(Phase::Hurt);
    }
}

/// Appends `"<callback> <name>"` to a shared log.
pub struct Logged {
    pub name: &'static str,
    pub log: Log,
}

impl Logged {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Rc::clone(log),
        }
    }

    fn record(&self, callback: &str) {
        self.log.borrow_mut().push(format!("{callback} {}", self.name));
    }
}

impl EntityState<Probe> for Logged {
    fn enter(&mut self, _actor: &mut Actor<Probe>) {
        self.record("enter");
    }

    fn step(&mut self, _actor: &mut Actor<Probe>) {
        self.record("step");
    }

    fn exit(&mut self, _actor: &mut Actor<Probe>) {
        self.record("exit");
    }

    fn on_contact(&mut self, _actor: &mut Actor<Probe>, _other: &Collider) {
        self.record("contact");
    }
}

/// Walks along a fixed direction under gravity.
pub struct Walker {
    pub direction: Vec3,
}

impl EntityState<Probe> for Walker {
    fn step(&mut self, actor: &mut Actor<Probe>) {
        actor.body.accelerate(self.direction, 10.0, 20.0, 8.0);
        actor.body.face_direction(self.direction);
        actor.body.gravity(20.0);
    }
}

/// Idle, Walk (+X) and Hurt, in that order.
pub fn registry(log: &Log) -> StateRegistry<Probe> {
    StateRegistry::new()
        .with(Phase::Idle, Logged::new("idle", log))
        .with(Phase::Walk, Walker { direction: Vec3::X })
        .with(Phase::Hurt, Logged::new("hurt", log))
}

/// A default-config entity with the capsule centre at `position`.
pub fn spawn(position: Vec3, clock: &SimulationClock, log: &Log) -> Entity<Probe> {
    let mut entity = Entity::new(
        &EntityConfig::default(),
        Probe::default(),
        registry(log),
        clock.clone(),
    )
    .expect("default config is valid");
    entity.body_mut().set_position(position);
    entity
}

/// A clock that has advanced one frame of `dt`.
pub fn clock(dt: f32) -> SimulationClock {
    let clock = SimulationClock::new();
    clock.advance(dt);
    clock
}

//! Concrete body kinds and their spawn parameter lists.
//!
//! Every kind shares the same integrator and collision primitives; they differ
//! only in how they set `target`/`friction` and react to hooks.

use glam::Vec2;

use crate::api::Behavior;
use crate::body::{Body, BodySpawn, BodyState};
use crate::types::*;

/// Horizontal speed lost per unit of uphill gradient.
const UPHILL_DRAG: f32 = 0.3;
/// Ticks per walk-cycle frame at unit speed.
const WALK_FRAME_TICKS: f32 = 8.0;
const WALK_FRAMES: u32 = 4;
/// Frame index shown while a walker's death animation plays.
pub const DEATH_FRAME: u32 = WALK_FRAMES;

/// Ground mover shared by the player and enemies.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Walker {
    pub run_speed: f32,
    pub gravity: f32,
    /// Facing, `1.0` right or `-1.0` left.
    pub dir: f32,
    /// Length of the death animation in ticks.
    pub death_ticks: f32,
    anim: f32,
    dying_for: f32,
}

impl Walker {
    pub fn new(run_speed: f32, gravity: f32, dir: f32) -> Self {
        Self {
            run_speed,
            gravity,
            dir: dir.signum(),
            death_ticks: 30.0,
            anim: 0.0,
            dying_for: 0.0,
        }
    }

    /// Run speed scaled down on uphill slopes.
    fn ground_speed(&self, steepness: f32) -> f32 {
        // y grows downward, so walking right up a slope means a negative gradient.
        let uphill = (-steepness * self.dir).max(0.0);
        self.run_speed / (1.0 + UPHILL_DRAG * uphill)
    }
}

impl Behavior for Walker {
    fn update_event(&mut self, body: &mut BodyState, tick: f32) {
        if body.is_dying() {
            body.target = Vec2::new(0.0, self.gravity);
            return;
        }
        body.target.x = self.dir * self.ground_speed(body.steepness_factor);
        body.target.y = self.gravity;
        body.flip = self.dir < 0.0;
        self.anim += body.speed.x.abs() * tick / WALK_FRAME_TICKS;
        body.frame = self.anim as u32 % WALK_FRAMES;
    }

    fn die(&mut self, body: &mut BodyState, tick: f32) -> bool {
        body.frame = DEATH_FRAME;
        self.dying_for += tick;
        self.dying_for >= self.death_ticks
    }

    fn wall_collision_event(&mut self, _body: &mut BodyState, dir: WallDir, _tick: f32) {
        self.dir = dir.sign();
    }
}

/// Straight-flying shot, gone on impact or when it leaves the view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Remaining lifetime in ticks.
    pub lifetime: f32,
    pub impacts: u32,
}

impl Behavior for Projectile {
    fn update_event(&mut self, body: &mut BodyState, tick: f32) {
        self.lifetime -= tick;
        if self.lifetime <= 0.0 {
            body.instant_kill();
        }
    }

    fn wall_collision_event(&mut self, body: &mut BodyState, _dir: WallDir, _tick: f32) {
        self.impacts += 1;
        body.kill();
    }

    fn slope_collision_event(&mut self, body: &mut BodyState, _dir: SlopeDir, _tick: f32) {
        self.impacts += 1;
        body.kill();
    }

    fn camera_event(&mut self, body: &mut BodyState, entered: bool, _camera: &Camera, _tick: f32) {
        if !entered {
            body.instant_kill();
        }
    }
}

/// Decorative spark or splinter that fades out.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub life: f32,
    pub max_life: f32,
    pub gravity: f32,
    pub start: Color,
    pub end: Color,
    pub color: Color,
}

impl Behavior for Particle {
    fn update_event(&mut self, body: &mut BodyState, tick: f32) {
        self.life -= tick;
        if self.life <= 0.0 {
            body.instant_kill();
            return;
        }
        body.target.y = self.gravity;
        let t = 1.0 - self.life / self.max_life;
        self.color = self.start.lerp(self.end, t);
    }

    fn camera_event(&mut self, body: &mut BodyState, entered: bool, _camera: &Camera, _tick: f32) {
        if !entered {
            body.instant_kill();
        }
    }
}

/// Pickup that bounces to rest and expires.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collectable {
    pub timer: f32,
    pub gravity: f32,
}

impl Behavior for Collectable {
    fn update_event(&mut self, body: &mut BodyState, tick: f32) {
        self.timer -= tick;
        if self.timer <= 0.0 {
            body.instant_kill();
            return;
        }
        body.target = Vec2::new(0.0, self.gravity);
    }

    fn water_collision_event(&mut self, body: &mut BodyState, submerged: bool, _is_surface: bool, _tick: f32) {
        // Sink slowly under water.
        if submerged {
            body.target.y = self.gravity * 0.25;
        }
    }
}

/// Externally driven platform that turns around at level geometry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Platform {
    pub velocity: Vec2,
}

impl Behavior for Platform {
    fn update_event(&mut self, body: &mut BodyState, _tick: f32) {
        body.target = self.velocity;
    }

    fn wall_collision_event(&mut self, _body: &mut BodyState, dir: WallDir, _tick: f32) {
        self.velocity.x = self.velocity.x.abs() * dir.sign();
    }

    fn slope_collision_event(&mut self, _body: &mut BodyState, dir: SlopeDir, _tick: f32) {
        // A floor pushes up (negative y), a ceiling down.
        self.velocity.y = -self.velocity.y.abs() * dir.sign();
    }
}

/// Dispatch table over every body kind.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum BodyKind {
    /// Never-spawned slot.
    #[default]
    Idle,
    Walker(Walker),
    Projectile(Projectile),
    Particle(Particle),
    Collectable(Collectable),
    Platform(Platform),
}

impl BodyKind {
    pub fn is_platform(&self) -> bool {
        matches!(self, BodyKind::Platform(_))
    }
}

macro_rules! dispatch {
    ($self:ident, $b:ident => $call:expr, $idle:expr) => {
        match $self {
            BodyKind::Idle => $idle,
            BodyKind::Walker($b) => $call,
            BodyKind::Projectile($b) => $call,
            BodyKind::Particle($b) => $call,
            BodyKind::Collectable($b) => $call,
            BodyKind::Platform($b) => $call,
        }
    };
}

impl Behavior for BodyKind {
    fn update_event(&mut self, body: &mut BodyState, tick: f32) {
        dispatch!(self, b => b.update_event(body, tick), ())
    }

    fn post_movement_event(&mut self, body: &mut BodyState, tick: f32) {
        dispatch!(self, b => b.post_movement_event(body, tick), ())
    }

    fn die(&mut self, body: &mut BodyState, tick: f32) -> bool {
        dispatch!(self, b => b.die(body, tick), true)
    }

    fn slope_collision_event(&mut self, body: &mut BodyState, dir: SlopeDir, tick: f32) {
        dispatch!(self, b => b.slope_collision_event(body, dir, tick), ())
    }

    fn wall_collision_event(&mut self, body: &mut BodyState, dir: WallDir, tick: f32) {
        dispatch!(self, b => b.wall_collision_event(body, dir, tick), ())
    }

    fn water_collision_event(&mut self, body: &mut BodyState, submerged: bool, is_surface: bool, tick: f32) {
        dispatch!(self, b => b.water_collision_event(body, submerged, is_surface, tick), ())
    }

    fn camera_event(&mut self, body: &mut BodyState, entered: bool, camera: &Camera, tick: f32) {
        dispatch!(self, b => b.camera_event(body, entered, camera, tick), ())
    }
}

/// Default gravity target speed in units per tick.
pub const GRAVITY: f32 = 5.0;

// --- Spawn parameter lists ---------------------------------------------------

impl Body<BodyKind> {
    pub fn spawn_walker(&mut self, pos: Vec2, dir: f32, run_speed: f32, size: Vec2) {
        let walker = Walker::new(run_speed, GRAVITY, dir);
        self.spawn(
            BodySpawn {
                pos,
                friction: Vec2::new(0.25, 0.15),
                collision_box: Rect::centered(size.x, size.y),
                hitbox: Rect::centered(size.x * 0.75, size.y * 0.9),
                camera_check_area: size * 2.0,
                config: SpawnConfig { check_vertical_slope: true, ..Default::default() },
                ..Default::default()
            },
            BodyKind::Walker(walker),
        );
    }

    pub fn spawn_projectile(&mut self, pos: Vec2, speed: Vec2, lifetime: f32) {
        self.spawn(
            BodySpawn {
                pos,
                speed,
                target: speed,
                collision_box: Rect::centered(4.0, 4.0),
                hitbox: Rect::centered(6.0, 6.0),
                camera_check_area: Vec2::splat(4.0),
                config: SpawnConfig { ignore_bottom_layer: true, ..Default::default() },
                ..Default::default()
            },
            BodyKind::Projectile(Projectile { lifetime, impacts: 0 }),
        );
        self.state.flip = speed.x < 0.0;
    }

    pub fn spawn_particle(&mut self, pos: Vec2, speed: Vec2, life: f32, color: Color) {
        self.spawn(
            BodySpawn {
                pos,
                speed,
                target: Vec2::new(speed.x, 0.0),
                friction: Vec2::new(0.05, 0.1),
                collision_box: Rect::centered(2.0, 2.0),
                hitbox: Rect::default(),
                camera_check_area: Vec2::splat(2.0),
                config: SpawnConfig::ghost(),
                ..Default::default()
            },
            BodyKind::Particle(Particle {
                life,
                max_life: life.max(f32::EPSILON),
                gravity: GRAVITY * 0.5,
                start: color,
                end: color.with_alpha(0.0),
                color,
            }),
        );
    }

    pub fn spawn_collectable(&mut self, pos: Vec2, speed: Vec2, timer: f32) {
        self.spawn(
            BodySpawn {
                pos,
                speed,
                friction: Vec2::new(0.05, 0.2),
                bounce_factor: Vec2::new(0.5, 0.5),
                collision_box: Rect::centered(8.0, 8.0),
                hitbox: Rect::centered(10.0, 10.0),
                camera_check_area: Vec2::splat(8.0),
                config: SpawnConfig { ignore_even_slopes: true, ..Default::default() },
                ..Default::default()
            },
            BodyKind::Collectable(Collectable { timer, gravity: GRAVITY }),
        );
    }

    pub fn spawn_platform(&mut self, pos: Vec2, size: Vec2, velocity: Vec2) {
        self.spawn(
            BodySpawn {
                pos,
                speed: velocity,
                target: velocity,
                collision_box: Rect::centered(size.x, size.y),
                hitbox: Rect::centered(size.x, size.y),
                camera_check_area: size,
                ..Default::default()
            },
            BodyKind::Platform(Platform { velocity }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Collidable, Pooled, Updatable};

    fn slot() -> Body<BodyKind> {
        Body::default()
    }

    #[test]
    fn idle_slot_does_nothing() {
        let mut b = slot();
        b.update(1.0);
        assert!(!b.exists());
        assert_eq!(b.behavior, BodyKind::Idle);
    }

    #[test]
    fn projectile_stops_at_wall_and_dies_next_tick() {
        let mut b = slot();
        b.spawn_projectile(Vec2::new(45.0, 20.0), Vec2::new(4.0, 0.0), 100.0);
        b.update(1.0);
        assert!(b.wall_collision(50.0, 0.0, 64.0, WallDir::Left, 1.0));
        assert_eq!(b.state.pos.x, 48.0);
        assert_eq!(b.state.speed.x, 0.0);
        assert!(b.is_dying());
        let BodyKind::Projectile(p) = b.behavior else { panic!("kind changed") };
        assert_eq!(p.impacts, 1);
        b.update(1.0);
        assert!(!b.exists());
    }

    #[test]
    fn projectile_vanishes_when_leaving_view() {
        let cam = Camera::new(Vec2::ZERO, Vec2::new(64.0, 64.0));
        let mut b = slot();
        b.spawn_projectile(Vec2::new(56.0, 20.0), Vec2::new(8.0, 0.0), 100.0);
        b.camera_check(&cam, 1.0);
        assert!(b.is_in_camera());
        for _ in 0..3 {
            b.update(1.0);
            b.camera_check(&cam, 1.0);
        }
        assert!(!b.exists());
    }

    #[test]
    fn projectile_lifetime_expires() {
        let mut b = slot();
        b.spawn_projectile(Vec2::ZERO, Vec2::new(1.0, 0.0), 2.5);
        b.update(1.0);
        b.update(1.0);
        assert!(b.exists());
        b.update(1.0);
        assert!(!b.exists());
    }

    #[test]
    fn walker_turns_at_walls_and_flips() {
        let mut b = slot();
        b.spawn_walker(Vec2::new(40.0, 40.0), 1.0, 2.0, Vec2::new(8.0, 16.0));
        b.update(1.0);
        assert!(!b.state.flip);
        // Right edge moved from 44 to 44.5 this tick.
        assert!(b.wall_collision(44.2, 0.0, 100.0, WallDir::Left, 1.0));
        let BodyKind::Walker(w) = b.behavior else { panic!("kind changed") };
        assert_eq!(w.dir, -1.0);
        b.update(1.0);
        assert!(b.state.flip);
        assert!(b.state.target.x < 0.0);
    }

    #[test]
    fn walker_slows_uphill_only() {
        let w = Walker::new(2.0, GRAVITY, 1.0);
        assert_eq!(w.ground_speed(0.0), 2.0);
        assert!(w.ground_speed(-1.0) < 2.0);
        assert_eq!(w.ground_speed(1.0), 2.0);
        let left = Walker::new(2.0, GRAVITY, -1.0);
        assert!(left.ground_speed(1.0) < 2.0);
    }

    #[test]
    fn walker_death_animation_runs_its_length() {
        let mut b = slot();
        b.spawn_walker(Vec2::ZERO, 1.0, 2.0, Vec2::new(8.0, 16.0));
        if let BodyKind::Walker(w) = &mut b.behavior {
            w.death_ticks = 3.0;
        }
        b.kill();
        for _ in 0..2 {
            b.update(1.0);
            assert!(b.is_dying());
            assert_eq!(b.state.frame, DEATH_FRAME);
        }
        b.update(1.0);
        assert!(!b.exists());
    }

    #[test]
    fn particle_fades_and_expires() {
        let mut b = slot();
        b.spawn_particle(Vec2::ZERO, Vec2::new(1.0, -2.0), 4.0, Color::WHITE);
        assert!(!b.spawn_config().take_collisions);
        b.update(1.0);
        b.update(1.0);
        let BodyKind::Particle(p) = b.behavior else { panic!("kind changed") };
        assert!((p.color.a - 0.5).abs() < 1e-5);
        b.update(1.0);
        b.update(1.0);
        assert!(!b.exists());
    }

    #[test]
    fn collectable_bounces_then_settles() {
        let mut b = slot();
        b.spawn_collectable(Vec2::new(40.0, 60.0), Vec2::new(0.0, 6.0), 500.0);
        let mut bounced = false;
        for _ in 0..120 {
            b.update(1.0);
            b.slope_collision(0.0, 100.0, 200.0, 100.0, SlopeDir::Floor, 1.0);
            bounced |= b.state.speed.y < 0.0;
        }
        assert!(bounced);
        assert_eq!(b.state.pos.y, 96.0);
        assert!(b.state.touch_surface);
    }

    #[test]
    fn platform_reverses_at_walls() {
        let mut b = slot();
        b.spawn_platform(Vec2::new(40.0, 40.0), Vec2::new(32.0, 8.0), Vec2::new(2.0, 0.0));
        b.update(1.0);
        assert_eq!(b.state.pos.x, 42.0);
        assert!(b.wall_collision(57.0, 0.0, 100.0, WallDir::Left, 1.0));
        b.update(1.0);
        assert_eq!(b.state.speed.x, -2.0);
        assert!(b.behavior.is_platform());
    }
}

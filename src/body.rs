use glam::Vec2;

use crate::api::{Behavior, Collidable, Drawable, Pooled, Updatable};
use crate::types::*;

/// Steepest floor gradient in the tile catalogue (45 degrees).
const MAX_CLIMB_GRADIENT: f32 = 1.0;

/// Resolution tolerances copied from [`PhysicsConfig`] when a slot is handed out.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tuning {
    pub surface_epsilon: f32,
    pub bounce_threshold: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning::from(&PhysicsConfig::default())
    }
}

impl From<&PhysicsConfig> for Tuning {
    fn from(cfg: &PhysicsConfig) -> Self {
        Self {
            surface_epsilon: cfg.surface_epsilon,
            bounce_threshold: cfg.bounce_threshold,
        }
    }
}

/// Per-spawn parameters shared by every body kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodySpawn {
    pub pos: Vec2,
    /// Scalar payload riding along with the position (e.g. distance to camera).
    pub depth: f32,
    pub speed: Vec2,
    pub target: Vec2,
    pub friction: Vec2,
    pub bounce_factor: Vec2,
    pub collision_box: Rect,
    pub hitbox: Rect,
    pub camera_check_area: Vec2,
    pub config: SpawnConfig,
}

impl Default for BodySpawn {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            depth: 0.0,
            speed: Vec2::ZERO,
            target: Vec2::ZERO,
            friction: Vec2::ZERO,
            bounce_factor: Vec2::ZERO,
            collision_box: Rect::centered(16.0, 16.0),
            hitbox: Rect::centered(16.0, 16.0),
            camera_check_area: Vec2::splat(16.0),
            config: SpawnConfig::default(),
        }
    }
}

/// Motion and collision state of one body, independent of its behavior.
///
/// `exist` and `dying` are only reachable through methods so that a dying
/// body always exists.
#[derive(Clone, Debug, Default)]
pub struct BodyState {
    pub pos: Vec2,
    /// Position at the start of the current integration step.
    pub old_pos: Vec2,
    pub depth: f32,
    pub speed: Vec2,
    /// Velocity the integrator converges towards.
    pub target: Vec2,
    /// Per-axis convergence rate per tick; zero snaps straight to `target`.
    pub friction: Vec2,
    /// Restitution applied when a surface reverses the velocity.
    pub bounce_factor: Vec2,
    pub collision_box: Rect,
    pub hitbox: Rect,
    pub camera_check_area: Vec2,
    pub touch_surface: bool,
    pub in_water: bool,
    /// Gradient of the last floor/ceiling hit this tick (dy/dx, y down).
    pub steepness_factor: f32,
    pub flip: bool,
    pub frame: u32,
    exist: bool,
    dying: bool,
    in_camera: bool,
    /// Set by the first camera check after a spawn.
    camera_known: bool,
    was_touching: bool,
    config: SpawnConfig,
    tuning: Tuning,
}

impl BodyState {
    pub fn exists(&self) -> bool {
        self.exist
    }

    pub fn is_dying(&self) -> bool {
        self.dying
    }

    pub fn is_active(&self) -> bool {
        self.exist && !self.dying
    }

    pub fn in_camera(&self) -> bool {
        self.in_camera
    }

    pub fn config(&self) -> SpawnConfig {
        self.config
    }

    pub fn tuning(&self) -> Tuning {
        self.tuning
    }

    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    /// Start the death animation. No-op for slots that hold nothing.
    pub fn kill(&mut self) {
        if self.exist {
            self.dying = true;
        }
    }

    pub fn instant_kill(&mut self) {
        self.exist = false;
        self.dying = false;
    }

    /// Reset everything but the tuning and mark the slot live.
    pub fn respawn(&mut self, s: BodySpawn) {
        let tuning = self.tuning;
        *self = BodyState {
            pos: s.pos,
            old_pos: s.pos,
            depth: s.depth,
            speed: s.speed,
            target: s.target,
            friction: s.friction,
            bounce_factor: s.bounce_factor,
            collision_box: s.collision_box,
            hitbox: s.hitbox,
            camera_check_area: s.camera_check_area,
            config: s.config,
            tuning,
            exist: true,
            ..BodyState::default()
        };
    }

    /// Shift the body without it counting as motion for swept tests.
    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
        self.old_pos += delta;
    }

    /// Snapshot `old_pos` and clear the per-tick contact results.
    fn begin_step(&mut self) {
        self.old_pos = self.pos;
        self.was_touching = self.touch_surface;
        self.touch_surface = false;
        self.steepness_factor = 0.0;
    }

    /// Exponential approach of `speed` to `target`, then position integration.
    pub fn integrate(&mut self, tick: f32) {
        self.speed.x = converge(self.speed.x, self.target.x, self.friction.x, tick);
        self.speed.y = converge(self.speed.y, self.target.y, self.friction.y, tick);
        self.pos += self.speed * tick;
    }

    /// Velocity after hitting a surface: bounced when fast enough and bouncy, else zero.
    fn rebound(&self, v: f32, factor: f32) -> f32 {
        if factor > 0.0 && v.abs() > self.tuning.bounce_threshold {
            -v * factor
        } else {
            0.0
        }
    }

    /// Floor/ceiling projection; see [`Collidable::slope_collision`].
    ///
    /// The segment's y is sampled at the box's horizontal center, clamped to the
    /// segment's x-range, once for the old and once for the new position. A hit
    /// needs the box edge to have started on the open side of the surface and to
    /// end on or past it, which catches fast bodies in a single tick.
    pub fn resolve_slope(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, dir: SlopeDir) -> bool {
        let cb = self.collision_box;
        let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        if cb.is_degenerate() || !(hi - lo > 0.0) {
            return false;
        }
        let min = cb.min(self.pos);
        let max = cb.max(self.pos);
        if !(max.x > lo && min.x < hi) {
            return false;
        }

        let gradient = (y2 - y1) / (x2 - x1);
        let surface_at = |cx: f32| y1 + gradient * (cx.clamp(lo, hi) - x1);
        let center = cb.center_offset().x;
        let cx = self.pos.x + center;
        let old_cx = self.old_pos.x + center;
        // A slope only supports the box when its center is over it; the
        // clamped end height of a neighboring ramp is not the ground below.
        if gradient != 0.0 && !(lo..=hi).contains(&cx) {
            return false;
        }
        let surface = surface_at(cx);
        let old_surface = surface_at(old_cx);
        let eps = self.tuning.surface_epsilon;

        match dir {
            SlopeDir::Floor => {
                if self.speed.y < 0.0 {
                    return false;
                }
                let bottom = max.y;
                let old_bottom = self.old_pos.y + cb.y + cb.h;
                let dx = (cx - old_cx).abs();
                let reach = if self.config.check_vertical_slope && self.was_touching {
                    gradient.abs() * dx
                } else {
                    0.0
                };
                // Grounded bodies may step up by what the steepest ramp climbs
                // over `dx`, so leaving a ramp top onto a block keeps them on it.
                let climb = if self.was_touching { MAX_CLIMB_GRADIENT * dx } else { 0.0 };
                if bottom < surface - eps - reach || old_bottom > old_surface + eps + climb {
                    return false;
                }
                self.pos.y = surface - (cb.y + cb.h);
                if self.speed.y > 0.0 {
                    self.speed.y = self.rebound(self.speed.y, self.bounce_factor.y);
                }
                self.touch_surface = true;
            }
            SlopeDir::Ceiling => {
                if self.speed.y > 0.0 {
                    return false;
                }
                let top = min.y;
                let old_top = self.old_pos.y + cb.y;
                if top > surface + eps || old_top < old_surface - eps {
                    return false;
                }
                self.pos.y = surface - cb.y;
                if self.speed.y < 0.0 {
                    self.speed.y = self.rebound(self.speed.y, self.bounce_factor.y);
                }
            }
        }
        self.steepness_factor = gradient;
        true
    }

    /// Vertical-segment projection; see [`Collidable::wall_collision`].
    pub fn resolve_wall(&mut self, x: f32, y: f32, height: f32, dir: WallDir) -> bool {
        let cb = self.collision_box;
        if cb.is_degenerate() || !(height > 0.0) {
            return false;
        }
        let eps = self.tuning.surface_epsilon;
        let min = cb.min(self.pos);
        let max = cb.max(self.pos);
        if !(max.y > y + eps && min.y < y + height - eps) {
            return false;
        }

        match dir {
            WallDir::Left => {
                let old_right = self.old_pos.x + cb.x + cb.w;
                if !(max.x > x) || old_right > x + eps {
                    return false;
                }
                self.pos.x = x - (cb.x + cb.w);
                if self.speed.x > 0.0 {
                    self.speed.x = self.rebound(self.speed.x, self.bounce_factor.x);
                }
            }
            WallDir::Right => {
                let old_left = self.old_pos.x + cb.x;
                if !(min.x < x) || old_left < x - eps {
                    return false;
                }
                self.pos.x = x - cb.x;
                if self.speed.x < 0.0 {
                    self.speed.x = self.rebound(self.speed.x, self.bounce_factor.x);
                }
            }
        }
        true
    }

    /// Strict overlap of the collision box with a world rectangle.
    pub fn box_overlaps(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        self.collision_box
            .overlaps(self.pos, &Rect::new(x, y, w, h), Vec2::ZERO)
    }

    /// Hitbox overlap with another live, non-dying body.
    pub fn overlay_object(&self, other: &BodyState) -> bool {
        self.is_active()
            && other.is_active()
            && self.hitbox.overlaps(self.pos, &other.hitbox, other.pos)
    }

    /// Hitbox overlap with `rect` placed at `offset`.
    pub fn overlay_rect(&self, offset: Vec2, rect: &Rect) -> bool {
        self.is_active() && self.hitbox.overlaps(self.pos, rect, offset)
    }
}

fn converge(speed: f32, target: f32, friction: f32, tick: f32) -> f32 {
    if friction <= 0.0 {
        return target;
    }
    speed + (target - speed) * (friction * tick).min(1.0)
}

/// A pooled simulation body: shared state plus its kind's behavior.
#[derive(Clone, Debug, Default)]
pub struct Body<B> {
    pub state: BodyState,
    pub behavior: B,
}

impl<B: Behavior> Body<B> {
    /// Re-arm this slot in place.
    pub fn spawn(&mut self, params: BodySpawn, behavior: B) {
        self.state.respawn(params);
        self.behavior = behavior;
    }

    pub fn exists(&self) -> bool {
        self.state.exists()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn kill(&mut self) {
        self.state.kill();
    }

    pub fn is_dying(&self) -> bool {
        self.state.is_dying()
    }

    pub fn speed(&self) -> Vec2 {
        self.state.speed
    }

    pub fn overlay_object<C>(&self, other: &Body<C>) -> bool {
        self.state.overlay_object(&other.state)
    }

    pub fn overlay_rect(&self, offset: Vec2, rect: &Rect) -> bool {
        self.state.overlay_rect(offset, rect)
    }
}

impl<B: Behavior> Updatable for Body<B> {
    fn update(&mut self, tick: f32) {
        if !self.state.exist {
            return;
        }
        self.behavior.update_event(&mut self.state, tick);
        if !self.state.exist {
            return;
        }
        self.state.begin_step();
        self.state.integrate(tick);
        self.behavior.post_movement_event(&mut self.state, tick);
        if self.state.dying && self.behavior.die(&mut self.state, tick) {
            self.state.instant_kill();
        }
    }
}

impl<B: Behavior> Pooled for Body<B> {
    fn exists(&self) -> bool {
        self.state.exist
    }

    fn is_active(&self) -> bool {
        self.state.is_active()
    }

    fn is_in_camera(&self) -> bool {
        self.state.in_camera
    }

    fn camera_check(&mut self, camera: &Camera, tick: f32) {
        if !self.state.exist {
            return;
        }
        let seen = camera.sees(self.state.pos, self.state.camera_check_area);
        // The first check always reports, so bodies spawned off-screen hear about it.
        if !self.state.camera_known || seen != self.state.in_camera {
            self.state.camera_known = true;
            self.state.in_camera = seen;
            self.behavior.camera_event(&mut self.state, seen, camera, tick);
        }
    }
}

impl<B: Behavior> Collidable for Body<B> {
    fn exists(&self) -> bool {
        self.state.exist
    }

    fn position(&self) -> Vec2 {
        self.state.pos
    }

    fn old_position(&self) -> Vec2 {
        self.state.old_pos
    }

    fn collision_box(&self) -> Rect {
        self.state.collision_box
    }

    fn spawn_config(&self) -> SpawnConfig {
        self.state.config
    }

    fn slope_collision(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, dir: SlopeDir, tick: f32) -> bool {
        let hit = self.state.resolve_slope(x1, y1, x2, y2, dir);
        if hit {
            self.behavior.slope_collision_event(&mut self.state, dir, tick);
        }
        hit
    }

    fn wall_collision(&mut self, x: f32, y: f32, height: f32, dir: WallDir, tick: f32) -> bool {
        let hit = self.state.resolve_wall(x, y, height, dir);
        if hit {
            self.behavior.wall_collision_event(&mut self.state, dir, tick);
        }
        hit
    }

    fn water_collision(&mut self, x: f32, y: f32, w: f32, h: f32, tick: f32, is_surface: bool) -> bool {
        let submerged = self.state.box_overlaps(x, y, w, h);
        self.state.in_water = submerged;
        self.behavior
            .water_collision_event(&mut self.state, submerged, is_surface, tick);
        submerged
    }

    fn instant_kill(&mut self) {
        self.state.instant_kill();
    }
}

impl<B> Drawable for Body<B> {
    fn draw_state(&self) -> Option<DrawState> {
        self.state.exist.then(|| DrawState {
            pos: self.state.pos,
            flip: self.state.flip,
            frame: self.state.frame,
        })
    }
}

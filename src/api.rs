use glam::Vec2;

use crate::body::BodyState;
use crate::types::*;

/// Minimal capability set the pool and visible buffer rely on.
pub trait Pooled {
    /// Slot holds a live instance. `false` means the pool may hand it out again.
    fn exists(&self) -> bool;

    /// Live and not playing a death animation.
    fn is_active(&self) -> bool;

    /// Result of the last `camera_check`.
    fn is_in_camera(&self) -> bool;

    /// Recompute camera visibility, firing the enter/leave hook on a transition.
    fn camera_check(&mut self, camera: &Camera, tick: f32);
}

/// Per-kind behavior hooks. Every hook defaults to a no-op, so a kind only
/// overrides what it reacts to.
#[allow(unused_variables)]
pub trait Behavior {
    /// Runs first in `update`; sets `target` for the integrator.
    fn update_event(&mut self, body: &mut BodyState, tick: f32) {}

    /// Runs right after position integration.
    fn post_movement_event(&mut self, body: &mut BodyState, tick: f32) {}

    /// Called once per tick while dying. Returning `true` ends the animation
    /// and releases the slot.
    fn die(&mut self, body: &mut BodyState, tick: f32) -> bool {
        true
    }

    fn slope_collision_event(&mut self, body: &mut BodyState, dir: SlopeDir, tick: f32) {}

    fn wall_collision_event(&mut self, body: &mut BodyState, dir: WallDir, tick: f32) {}

    /// `submerged` is the overlap result; `is_surface` whether the box straddles the water line.
    fn water_collision_event(
        &mut self,
        body: &mut BodyState,
        submerged: bool,
        is_surface: bool,
        tick: f32,
    ) {
    }

    fn camera_event(&mut self, body: &mut BodyState, entered: bool, camera: &Camera, tick: f32) {}
}

/// Advances one simulation tick.
pub trait Updatable {
    fn update(&mut self, tick: f32);
}

/// Geometry queries and resolution primitives the collision map drives.
pub trait Collidable {
    fn exists(&self) -> bool;
    fn position(&self) -> Vec2;
    fn old_position(&self) -> Vec2;
    fn collision_box(&self) -> Rect;
    fn spawn_config(&self) -> SpawnConfig;

    // --- Resolution --------------------------------------------------------

    /// Swept test against the segment `(x1, y1)-(x2, y2)`; snaps onto it on a hit.
    fn slope_collision(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, dir: SlopeDir, tick: f32) -> bool;

    /// Swept test against the vertical segment at `x` spanning `y .. y + height`.
    fn wall_collision(&mut self, x: f32, y: f32, height: f32, dir: WallDir, tick: f32) -> bool;

    /// Overlap test against a water rectangle; informational only.
    fn water_collision(&mut self, x: f32, y: f32, w: f32, h: f32, tick: f32, is_surface: bool) -> bool;

    /// Remove immediately, skipping any death animation.
    fn instant_kill(&mut self);
}

/// Read-only sprite state for the renderer.
pub trait Drawable {
    /// `None` for slots that hold no live instance.
    fn draw_state(&self) -> Option<DrawState>;
}

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Unit direction from `from` towards `to`, or zero when the points coincide.
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Axis-aligned rectangle stored as an offset from its owner's position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given full size centered on the owner's position.
    pub fn centered(w: f32, h: f32) -> Self {
        Self { x: -w * 0.5, y: -h * 0.5, w, h }
    }

    /// Zero or negative extents never overlap anything.
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// World-space top-left corner when the owner sits at `pos`.
    pub fn min(&self, pos: Vec2) -> Vec2 {
        Vec2::new(pos.x + self.x, pos.y + self.y)
    }

    /// World-space bottom-right corner when the owner sits at `pos`.
    pub fn max(&self, pos: Vec2) -> Vec2 {
        Vec2::new(pos.x + self.x + self.w, pos.y + self.y + self.h)
    }

    /// Offset of the rectangle's center from the owner's position.
    pub fn center_offset(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Strict overlap of `self` placed at `pos` and `other` placed at `other_pos`.
    /// Touching edges do not count.
    pub fn overlaps(&self, pos: Vec2, other: &Rect, other_pos: Vec2) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        let (a0, a1) = (self.min(pos), self.max(pos));
        let (b0, b1) = (other.min(other_pos), other.max(other_pos));
        a0.x < b1.x && b0.x < a1.x && a0.y < b1.y && b0.y < a1.y
    }
}

/// Straight RGBA color, components in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let f = |c: u8| c as f32 / 255.0;
        Self { r: f(r), g: f(g), b: f(b), a: f(a) }
    }

    /// Linear blend towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub fn with_alpha(self, a: f32) -> Color {
        Color { a: a.clamp(0.0, 1.0), ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Visible world rectangle (top-left corner plus size).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Camera {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Whether the box `center ± half_extents` intersects the view.
    pub fn sees(&self, center: Vec2, half_extents: Vec2) -> bool {
        let view_max = self.pos + self.size;
        center.x + half_extents.x > self.pos.x
            && center.x - half_extents.x < view_max.x
            && center.y + half_extents.y > self.pos.y
            && center.y - half_extents.y < view_max.y
    }
}

/// Side a floor/ceiling segment is approached from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum SlopeDir {
    /// Landed on from above.
    Floor = 1,
    /// Hit from below.
    Ceiling = -1,
}

impl SlopeDir {
    pub fn sign(self) -> f32 {
        self as i8 as f32
    }
}

/// Direction a wall pushes a body that runs into it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum WallDir {
    Right = 1,
    Left = -1,
}

impl WallDir {
    pub fn sign(self) -> f32 {
        self as i8 as f32
    }
}

/// Collision flags fixed for the lifetime of one spawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Opt in to tile, stage-edge and water resolution.
    pub take_collisions: bool,
    /// Pass through thin one-way edges (platforms, one-way ramps).
    pub ignore_bottom_layer: bool,
    /// Pass through flat thin edges only; one-way ramps still stop the body.
    pub ignore_even_slopes: bool,
    /// Stay glued to floors when walking down slopes.
    pub check_vertical_slope: bool,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            take_collisions: true,
            ignore_bottom_layer: false,
            ignore_even_slopes: false,
            check_vertical_slope: false,
        }
    }
}

impl SpawnConfig {
    /// Body that never touches level geometry.
    pub fn ghost() -> Self {
        Self { take_collisions: false, ..Self::default() }
    }
}

/// Sprite state a renderer reads after the step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawState {
    pub pos: Vec2,
    pub flip: bool,
    pub frame: u32,
}

/// Physics tuning shared by the map and the step driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Tile edge length in world units.
    pub tile_size: f32,
    /// Extra tiles added around a body's swept box when gathering edges.
    pub swept_padding_tiles: i32,
    /// Distance under which a body counts as already resting on a surface.
    pub surface_epsilon: f32,
    /// Speeds at or below this are zeroed instead of bounced.
    pub bounce_threshold: f32,
    /// How far below the map a body may fall before being removed.
    pub kill_margin: f32,
    /// Walls at x = 0 and x = map width.
    pub stage_edges: bool,
    /// Measure step timings (adds small overhead when true).
    pub enable_timing: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tile_size: 16.0,
            swept_padding_tiles: 1,
            surface_epsilon: 0.01,
            bounce_threshold: 0.5,
            kill_margin: 32.0,
            stage_edges: true,
            enable_timing: false,
        }
    }
}

impl PhysicsConfig {
    /// Parse a JSON object; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: PhysicsConfig = serde_json::from_str(text)?;
        if !(cfg.tile_size > 0.0) {
            return Err(Error::InvalidTileSize(cfg.tile_size));
        }
        Ok(cfg)
    }
}

/// Counters for the last completed step.
#[derive(Copy, Clone, Debug, Default)]
pub struct StepStats {
    pub slots: usize,
    pub live: usize,
    pub visible: usize,
    /// Pair callbacks issued (k*(k-1)/2 over visible bodies still in view).
    pub pairs: usize,
    pub riders: usize,
}

/// Timing breakdown for the last completed step.
#[derive(Copy, Clone, Debug, Default)]
pub struct StepTiming {
    pub step_ms: f64,
    pub integrate_ms: f64,
    pub tiles_ms: f64,
    pub pairs_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_overlap_is_strict() {
        let a = Rect::centered(2.0, 2.0);
        let b = Rect::centered(2.0, 2.0);
        assert!(a.overlaps(Vec2::ZERO, &b, Vec2::new(1.5, 0.0)));
        assert!(!a.overlaps(Vec2::ZERO, &b, Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn degenerate_rect_never_overlaps() {
        let a = Rect::new(0.0, 0.0, 0.0, 4.0);
        let b = Rect::centered(10.0, 10.0);
        assert!(!a.overlaps(Vec2::ZERO, &b, Vec2::ZERO));
        assert!(!b.overlaps(Vec2::ZERO, &a, Vec2::ZERO));
    }

    #[test]
    fn direction_handles_coincident_points() {
        assert_eq!(direction(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
        let d = direction(Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert!((d.x - 0.6).abs() < 1e-5 && (d.y - 0.8).abs() < 1e-5);
    }

    #[test]
    fn camera_sees_partial_overlap() {
        let cam = Camera::new(Vec2::ZERO, Vec2::new(320.0, 240.0));
        assert!(cam.sees(Vec2::new(-4.0, 10.0), Vec2::splat(8.0)));
        assert!(!cam.sees(Vec2::new(-8.0, 10.0), Vec2::splat(8.0)));
    }

    #[test]
    fn color_lerp_clamps() {
        let c = Color::WHITE.lerp(Color::TRANSPARENT, 2.0);
        assert_eq!(c, Color::TRANSPARENT);
        let half = Color::from_rgba8(255, 0, 0, 255).lerp(Color::new(0.0, 0.0, 0.0, 1.0), 0.5);
        assert!((half.r - 0.5).abs() < 1e-5);
    }

    #[test]
    fn config_json_overrides_defaults() {
        let cfg = PhysicsConfig::from_json(r#"{ "tile_size": 32.0, "stage_edges": false }"#).unwrap();
        assert_eq!(cfg.tile_size, 32.0);
        assert!(!cfg.stage_edges);
        assert_eq!(cfg.swept_padding_tiles, 1);
        assert!(matches!(
            PhysicsConfig::from_json(r#"{ "tile_size": 0.0 }"#),
            Err(Error::InvalidTileSize(_))
        ));
        assert!(matches!(PhysicsConfig::from_json("{"), Err(Error::InvalidConfig(_))));
    }
}

use glam::Vec2;

use crate::api::Collidable;
use crate::error::{Error, Result};
use crate::tiles::{Edge, EdgeKind, Neighbors, TileShape, build_edges};
use crate::types::*;

/// Tile geometry of one stage, precomputed into per-tile edges.
///
/// Bodies are resolved one at a time with [`CollisionMap::resolve`]. A body
/// moving further than one tile of padding beyond its swept box in a single
/// tick may still tunnel; that is an accuracy bound of the discrete scheme.
#[derive(Clone, Debug)]
pub struct CollisionMap {
    pub cfg: PhysicsConfig,
    width: u32,
    height: u32,
    visual: Vec<u32>,
    codes: Vec<u16>,
    shapes: Vec<TileShape>,
    edges: Vec<Vec<Edge>>,
    water_level: Option<f32>,
}

impl CollisionMap {
    /// Build from a visual tile layer and a same-sized collision-code layer
    /// (both row-major, `width * height` entries).
    pub fn new(
        cfg: PhysicsConfig,
        width: u32,
        height: u32,
        visual: &[u32],
        collision: &[u16],
    ) -> Result<Self> {
        if !(cfg.tile_size > 0.0) {
            return Err(Error::InvalidTileSize(cfg.tile_size));
        }
        let expected = width as usize * height as usize;
        if visual.len() != expected || collision.len() != expected {
            return Err(Error::LayerSizeMismatch {
                expected,
                visual: visual.len(),
                collision: collision.len(),
            });
        }

        let shapes = visual
            .iter()
            .zip(collision)
            .map(|(&v, &c)| TileShape::resolve(v, c))
            .collect();
        let mut map = Self {
            cfg,
            width,
            height,
            visual: visual.to_vec(),
            codes: collision.to_vec(),
            shapes,
            edges: vec![Vec::new(); expected],
            water_level: None,
        };
        for ty in 0..height as i32 {
            for tx in 0..width as i32 {
                map.rebuild_tile(tx, ty);
            }
        }
        log::debug!(
            "collision map {}x{} built: {} edges",
            width,
            height,
            map.edges.iter().map(Vec::len).sum::<usize>()
        );
        Ok(map)
    }

    /// Map whose collision layer is all "inherit": every non-zero visual tile is solid.
    pub fn from_visual(cfg: PhysicsConfig, width: u32, height: u32, visual: &[u32]) -> Result<Self> {
        let codes = vec![crate::tiles::CODE_INHERIT; visual.len()];
        Self::new(cfg, width, height, visual, &codes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// World size in units.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.cfg.tile_size
    }

    pub fn water_level(&self) -> Option<f32> {
        self.water_level
    }

    /// World y of the water surface; `None` removes the water plane.
    pub fn set_water_level(&mut self, level: Option<f32>) {
        self.water_level = level;
    }

    fn index(&self, tx: i32, ty: i32) -> Option<usize> {
        if tx < 0 || ty < 0 || tx >= self.width as i32 || ty >= self.height as i32 {
            return None;
        }
        Some(ty as usize * self.width as usize + tx as usize)
    }

    pub fn shape(&self, tx: i32, ty: i32) -> TileShape {
        self.index(tx, ty).map_or(TileShape::Empty, |i| self.shapes[i])
    }

    pub fn code(&self, tx: i32, ty: i32) -> Option<u16> {
        self.index(tx, ty).map(|i| self.codes[i])
    }

    pub fn edges(&self, tx: i32, ty: i32) -> &[Edge] {
        match self.index(tx, ty) {
            Some(i) => &self.edges[i],
            None => &[],
        }
    }

    /// Change one tile's collision code (switch blocks and the like). Only the
    /// tile and its four neighbors get their edges rebuilt.
    pub fn set_tile_code(&mut self, tx: i32, ty: i32, code: u16) -> Result<()> {
        let i = self.index(tx, ty).ok_or(Error::TileOutOfBounds { x: tx, y: ty })?;
        if self.codes[i] == code {
            return Ok(());
        }
        self.codes[i] = code;
        self.shapes[i] = TileShape::resolve(self.visual[i], code);
        log::debug!("tile ({tx}, {ty}) -> code {code} ({:?})", self.shapes[i]);
        for (dx, dy) in [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
            self.rebuild_tile(tx + dx, ty + dy);
        }
        Ok(())
    }

    fn rebuild_tile(&mut self, tx: i32, ty: i32) {
        let Some(i) = self.index(tx, ty) else { return };
        let n = Neighbors {
            left: self.shape(tx - 1, ty),
            right: self.shape(tx + 1, ty),
            above: self.shape(tx, ty - 1),
            below: self.shape(tx, ty + 1),
        };
        self.edges[i] = build_edges(self.shapes[i], tx, ty, self.cfg.tile_size, n);
    }

    /// Inclusive tile range covered by the body's old and new collision box,
    /// padded and clamped to the map. `None` when it lies entirely outside.
    fn swept_range<C: Collidable>(&self, body: &C) -> Option<(i32, i32, i32, i32)> {
        let cb = body.collision_box();
        let lo = cb.min(body.old_position()).min(cb.min(body.position()));
        let hi = cb.max(body.old_position()).max(cb.max(body.position()));
        let ts = self.cfg.tile_size;
        let pad = self.cfg.swept_padding_tiles.max(0);
        let tx0 = ((lo.x / ts).floor() as i32 - pad).max(0);
        let ty0 = ((lo.y / ts).floor() as i32 - pad).max(0);
        let tx1 = ((hi.x / ts).floor() as i32 + pad).min(self.width as i32 - 1);
        let ty1 = ((hi.y / ts).floor() as i32 + pad).min(self.height as i32 - 1);
        (tx0 <= tx1 && ty0 <= ty1).then_some((tx0, ty0, tx1, ty1))
    }

    /// Resolve one body against tiles, stage edges, water and the kill line.
    /// Returns the number of edge hits.
    pub fn resolve<C: Collidable>(&self, body: &mut C, tick: f32) -> usize {
        let config = body.spawn_config();
        if !body.exists() || !config.take_collisions {
            return 0;
        }
        let mut hits = 0;

        if let Some((tx0, ty0, tx1, ty1)) = self.swept_range(body) {
            for ty in ty0..=ty1 {
                for tx in tx0..=tx1 {
                    for edge in self.edges(tx, ty) {
                        if edge.thin && config.ignore_bottom_layer {
                            continue;
                        }
                        if edge.is_even() && config.ignore_even_slopes {
                            continue;
                        }
                        let hit = match edge.kind {
                            EdgeKind::Slope { a, b, dir } => body.slope_collision(a.x, a.y, b.x, b.y, dir, tick),
                            EdgeKind::Wall { x, y, height, dir } => body.wall_collision(x, y, height, dir, tick),
                        };
                        hits += hit as usize;
                    }
                }
            }
        }

        let size = self.size();
        if self.cfg.stage_edges {
            hits += self.stage_edge_collision(body, size, tick);
        }
        if let Some(level) = self.water_level {
            let cb = body.collision_box();
            let (top, bottom) = (cb.min(body.position()).y, cb.max(body.position()).y);
            let is_surface = top < level && bottom > level;
            let depth = (size.y - level).max(0.0) + self.cfg.kill_margin;
            body.water_collision(0.0, level, size.x, depth, tick, is_surface);
        }
        self.kill_below(body);
        hits
    }

    /// The two vertical world boundaries, tall enough to cover anything above
    /// or below the map.
    fn stage_edge_collision<C: Collidable>(&self, body: &mut C, size: Vec2, tick: f32) -> usize {
        let top = -size.y - 1.0e4;
        let height = size.y * 3.0 + 2.0e4;
        let left = body.wall_collision(0.0, top, height, WallDir::Right, tick);
        let right = body.wall_collision(size.x, top, height, WallDir::Left, tick);
        left as usize + right as usize
    }

    /// Remove bodies whose box has fallen entirely below the map.
    pub fn kill_below<C: Collidable>(&self, body: &mut C) -> bool {
        let top = body.collision_box().min(body.position()).y;
        if body.exists() && top > self.size().y + self.cfg.kill_margin {
            body.instant_kill();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Behavior, Updatable};
    use crate::body::{Body, BodySpawn, BodyState};

    #[derive(Default)]
    struct Counter {
        walls: usize,
        submerged: Option<(bool, bool)>,
    }

    impl Behavior for Counter {
        fn wall_collision_event(&mut self, _body: &mut BodyState, _dir: WallDir, _tick: f32) {
            self.walls += 1;
        }

        fn water_collision_event(&mut self, _body: &mut BodyState, submerged: bool, is_surface: bool, _tick: f32) {
            self.submerged = Some((submerged, is_surface));
        }
    }

    fn cfg() -> PhysicsConfig {
        PhysicsConfig { tile_size: 16.0, ..Default::default() }
    }

    /// 8x6 map with a solid ground row at ty = 5.
    fn flat_map(extra: &[(usize, usize, u16)]) -> CollisionMap {
        let (w, h) = (8usize, 6usize);
        let mut visual = vec![0u32; w * h];
        let mut codes = vec![0u16; w * h];
        for x in 0..w {
            visual[5 * w + x] = 1;
        }
        for &(x, y, c) in extra {
            codes[y * w + x] = c;
        }
        CollisionMap::new(cfg(), w as u32, h as u32, &visual, &codes).unwrap()
    }

    fn spawn(pos: Vec2, target: Vec2, config: SpawnConfig) -> Body<Counter> {
        let mut b = Body::<Counter>::default();
        b.spawn(
            BodySpawn {
                pos,
                target,
                collision_box: Rect::centered(8.0, 8.0),
                config,
                ..Default::default()
            },
            Counter::default(),
        );
        b
    }

    #[test]
    fn rejects_mismatched_layers() {
        let err = CollisionMap::new(cfg(), 4, 4, &[0; 16], &[0; 15]).unwrap_err();
        assert!(matches!(err, Error::LayerSizeMismatch { expected: 16, .. }));
        let bad = PhysicsConfig { tile_size: -1.0, ..cfg() };
        assert!(matches!(
            CollisionMap::from_visual(bad, 1, 1, &[0]),
            Err(Error::InvalidTileSize(_))
        ));
    }

    #[test]
    fn interior_ground_has_only_floors_and_end_walls() {
        let map = flat_map(&[]);
        assert_eq!(map.edges(3, 5).len(), 2); // floor + ceiling
        let end_walls = map.edges(0, 5).iter().filter(|e| matches!(e.kind, EdgeKind::Wall { .. })).count();
        assert_eq!(end_walls, 1);
    }

    #[test]
    fn falling_body_lands_on_ground_for_any_offset() {
        let map = flat_map(&[]);
        // Per-tick displacement below the half-height (4.0); start at many sub-tile offsets.
        for i in 0..32 {
            let start_y = 60.0 + i as f32 * 0.37;
            let mut b = spawn(Vec2::new(40.0, start_y), Vec2::new(0.0, 3.9), SpawnConfig::default());
            for _ in 0..40 {
                b.update(1.0);
                map.resolve(&mut b, 1.0);
            }
            assert_eq!(b.state.pos.y, 76.0, "start {start_y}");
            assert!(b.state.touch_surface);
        }
    }

    #[test]
    fn fast_body_crossing_tile_boundary_lands() {
        let map = flat_map(&[]);
        let mut b = spawn(Vec2::new(40.0, 70.0), Vec2::new(0.0, 14.0), SpawnConfig::default());
        b.update(1.0);
        assert!(b.state.pos.y > 80.0);
        map.resolve(&mut b, 1.0);
        assert_eq!(b.state.pos.y, 76.0);
    }

    #[test]
    fn walks_up_ramp_onto_block() {
        // Ramp at (3,4) rising right, solid block at (4,4).
        let mut map = flat_map(&[(3, 4, 3), (4, 4, 2)]);
        map.cfg.stage_edges = false;
        let mut b = spawn(Vec2::new(36.0, 76.0), Vec2::new(1.0, 2.0), SpawnConfig::default());
        for _ in 0..40 {
            b.update(1.0);
            map.resolve(&mut b, 1.0);
        }
        assert_eq!(b.behavior.walls, 0);
        assert!((b.state.pos.x - 76.0).abs() < 1e-3);
        assert_eq!(b.state.pos.y, 60.0);
        assert!(b.state.touch_surface);
    }

    #[test]
    fn lands_on_seam_between_stacked_ramps() {
        // Ramps rising right at (3,4) and (4,3) form one 45 degree line.
        let map = flat_map(&[(3, 4, 3), (4, 3, 3)]);
        let mut b = spawn(Vec2::new(62.0, 30.0), Vec2::new(0.0, 2.0), SpawnConfig::default());
        for _ in 0..60 {
            b.update(1.0);
            map.resolve(&mut b, 1.0);
        }
        // Surface under x = 62 is y = 66.
        assert_eq!(b.state.pos.y, 62.0);
        assert!(b.state.touch_surface);
    }

    #[test]
    fn walks_up_stacked_ramps_on_the_line() {
        let map = flat_map(&[(3, 4, 3), (4, 3, 3)]);
        let mut b = spawn(Vec2::new(52.0, 72.0), Vec2::new(1.0, 2.0), SpawnConfig::default());
        for _ in 0..20 {
            b.update(1.0);
            map.resolve(&mut b, 1.0);
            // Bottom edge stays on y = 128 - x.
            let bottom = b.state.pos.y + 4.0;
            assert!((bottom - (128.0 - b.state.pos.x)).abs() < 1e-3, "x {}", b.state.pos.x);
        }
        assert_eq!(b.state.pos, Vec2::new(72.0, 52.0));
        assert_eq!(b.behavior.walls, 0);
    }

    #[test]
    fn block_in_path_stops_walker() {
        let map = flat_map(&[(4, 4, 2)]);
        let mut b = spawn(Vec2::new(40.0, 76.0), Vec2::new(2.0, 2.0), SpawnConfig::default());
        for _ in 0..20 {
            b.update(1.0);
            map.resolve(&mut b, 1.0);
        }
        assert_eq!(b.state.pos.x, 60.0);
        assert!(b.behavior.walls > 0);
    }

    #[test]
    fn bottom_layer_flags_filter_thin_edges() {
        // Flat platform at (2,2), one-way ramp at (5,2).
        let map = flat_map(&[(2, 2, 9), (5, 2, 10)]);
        let ghostly = SpawnConfig { ignore_bottom_layer: true, ..Default::default() };
        let even_only = SpawnConfig { ignore_even_slopes: true, ..Default::default() };

        let land = |x: f32, config: SpawnConfig| {
            let mut b = spawn(Vec2::new(x, 20.0), Vec2::new(0.0, 3.0), config);
            for _ in 0..6 {
                b.update(1.0);
                map.resolve(&mut b, 1.0);
            }
            b.state.touch_surface
        };
        assert!(land(40.0, SpawnConfig::default()));
        assert!(!land(40.0, ghostly));
        assert!(!land(40.0, even_only));
        assert!(land(88.0, even_only));
        assert!(!land(88.0, ghostly));
    }

    #[test]
    fn one_way_platform_lets_body_jump_through() {
        let map = flat_map(&[(2, 2, 9)]);
        let mut b = spawn(Vec2::new(40.0, 44.0), Vec2::new(0.0, -3.0), SpawnConfig::default());
        for _ in 0..8 {
            b.update(1.0);
            map.resolve(&mut b, 1.0);
        }
        assert!(b.state.pos.y < 28.0);
    }

    #[test]
    fn ghost_bodies_skip_resolution() {
        let map = flat_map(&[]);
        let mut b = spawn(Vec2::new(40.0, 70.0), Vec2::new(0.0, 14.0), SpawnConfig::ghost());
        b.update(1.0);
        assert_eq!(map.resolve(&mut b, 1.0), 0);
        assert_eq!(b.state.pos.y, 84.0);
    }

    #[test]
    fn stage_edges_contain_bodies() {
        let map = flat_map(&[]);
        let mut b = spawn(Vec2::new(6.0, 40.0), Vec2::new(-5.0, 0.0), SpawnConfig::default());
        b.update(1.0);
        assert!(map.resolve(&mut b, 1.0) >= 1);
        assert_eq!(b.state.pos.x, 4.0);
        let mut b = spawn(Vec2::new(122.0, 40.0), Vec2::new(5.0, 0.0), SpawnConfig::default());
        b.update(1.0);
        map.resolve(&mut b, 1.0);
        assert_eq!(b.state.pos.x, 124.0);
    }

    #[test]
    fn switch_block_toggles_collision() {
        let mut map = flat_map(&[(4, 4, 1)]);
        assert!(map.edges(4, 4).is_empty());
        assert_eq!(map.edges(3, 5).len(), 2);
        map.set_tile_code(4, 4, 2).unwrap();
        assert!(!map.edges(4, 4).is_empty());
        // Ground under the new block lost its floor.
        assert_eq!(map.edges(4, 5).len(), 1);
        map.set_tile_code(4, 4, 1).unwrap();
        assert!(map.edges(4, 4).is_empty());
        assert_eq!(map.edges(4, 5).len(), 2);
        assert!(matches!(
            map.set_tile_code(8, 0, 2),
            Err(Error::TileOutOfBounds { x: 8, y: 0 })
        ));
    }

    #[test]
    fn water_plane_reports_surface() {
        let mut map = flat_map(&[]);
        map.set_water_level(Some(50.0));
        let mut b = spawn(Vec2::new(40.0, 48.0), Vec2::ZERO, SpawnConfig::default());
        b.update(1.0);
        map.resolve(&mut b, 1.0);
        assert_eq!(b.behavior.submerged, Some((true, true)));
        assert!(b.state.in_water);
        b.state.pos.y = 20.0;
        map.resolve(&mut b, 1.0);
        assert_eq!(b.behavior.submerged, Some((false, false)));
    }

    #[test]
    fn bodies_below_the_map_are_removed() {
        let map = CollisionMap::from_visual(cfg(), 4, 4, &[0; 16]).unwrap();
        let mut b = spawn(Vec2::new(20.0, 60.0), Vec2::new(0.0, 8.0), SpawnConfig::default());
        for _ in 0..6 {
            b.update(1.0);
            map.resolve(&mut b, 1.0);
        }
        assert!(!b.exists());
    }
}

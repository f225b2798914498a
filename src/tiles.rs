use glam::Vec2;

use crate::types::{SlopeDir, WallDir};

/// Collision-layer code meaning "take the shape from the visual layer".
pub const CODE_INHERIT: u16 = 0;

/// Collision geometry of one tile.
///
/// Ramp names describe the floor as walked left to right. Gentle ramps span two
/// tiles and come as a low and a high half.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileShape {
    #[default]
    Empty,
    Solid,
    RampUpRight,
    RampUpLeft,
    GentleUpRightLow,
    GentleUpRightHigh,
    GentleUpLeftHigh,
    GentleUpLeftLow,
    /// One-way flat floor on the tile's top edge.
    Platform,
    /// One-way ramp rising to the right.
    PlatformRampUpRight,
    /// One-way ramp rising to the left.
    PlatformRampUpLeft,
    /// Bottom half solid.
    HalfBlock,
    /// Solid above a line falling to the right.
    CeilingRampDownRight,
    /// Solid above a line falling to the left.
    CeilingRampDownLeft,
}

impl TileShape {
    /// Shape for an explicit collision-layer code. `None` for inherit and unknown codes.
    pub fn from_code(code: u16) -> Option<TileShape> {
        use TileShape::*;
        Some(match code {
            1 => Empty,
            2 => Solid,
            3 => RampUpRight,
            4 => RampUpLeft,
            5 => GentleUpRightLow,
            6 => GentleUpRightHigh,
            7 => GentleUpLeftHigh,
            8 => GentleUpLeftLow,
            9 => Platform,
            10 => PlatformRampUpRight,
            11 => PlatformRampUpLeft,
            12 => HalfBlock,
            13 => CeilingRampDownRight,
            14 => CeilingRampDownLeft,
            _ => return None,
        })
    }

    /// Combine a visual tile id with its collision code. Code 0 makes any
    /// non-empty visual tile solid; unknown codes are passable.
    pub fn resolve(visual: u32, code: u16) -> TileShape {
        if code == CODE_INHERIT {
            return if visual != 0 { TileShape::Solid } else { TileShape::Empty };
        }
        TileShape::from_code(code).unwrap_or_else(|| {
            log::warn!("unknown collision code {code}; treating tile as passable");
            TileShape::Empty
        })
    }

    fn profile(self) -> Profile {
        use TileShape::*;
        let p = |left, right, top, bottom| Profile { left, right, top, bottom };
        match self {
            Empty | Platform | PlatformRampUpRight | PlatformRampUpLeft => p(0.0, 0.0, false, false),
            Solid => p(1.0, 1.0, true, true),
            RampUpRight => p(0.0, 1.0, false, true),
            RampUpLeft => p(1.0, 0.0, false, true),
            GentleUpRightLow => p(0.0, 0.5, false, true),
            GentleUpRightHigh => p(0.5, 1.0, false, true),
            GentleUpLeftHigh => p(1.0, 0.5, false, true),
            GentleUpLeftLow => p(0.5, 0.0, false, true),
            HalfBlock => p(0.5, 0.5, false, true),
            CeilingRampDownRight => p(0.0, 1.0, true, false),
            CeilingRampDownLeft => p(1.0, 0.0, true, false),
        }
    }

    /// Floor or ceiling segments in tile-local units (0..1, y down), plus whether
    /// the segment is one-way.
    fn surfaces(self) -> &'static [(f32, f32, f32, f32, SlopeDir, bool)] {
        use SlopeDir::*;
        use TileShape::*;
        match self {
            Empty => &[],
            Solid => &[(0.0, 0.0, 1.0, 0.0, Floor, false), (0.0, 1.0, 1.0, 1.0, Ceiling, false)],
            RampUpRight => &[(0.0, 1.0, 1.0, 0.0, Floor, false), (0.0, 1.0, 1.0, 1.0, Ceiling, false)],
            RampUpLeft => &[(0.0, 0.0, 1.0, 1.0, Floor, false), (0.0, 1.0, 1.0, 1.0, Ceiling, false)],
            GentleUpRightLow => &[(0.0, 1.0, 1.0, 0.5, Floor, false), (0.0, 1.0, 1.0, 1.0, Ceiling, false)],
            GentleUpRightHigh => &[(0.0, 0.5, 1.0, 0.0, Floor, false), (0.0, 1.0, 1.0, 1.0, Ceiling, false)],
            GentleUpLeftHigh => &[(0.0, 0.0, 1.0, 0.5, Floor, false), (0.0, 1.0, 1.0, 1.0, Ceiling, false)],
            GentleUpLeftLow => &[(0.0, 0.5, 1.0, 1.0, Floor, false), (0.0, 1.0, 1.0, 1.0, Ceiling, false)],
            Platform => &[(0.0, 0.0, 1.0, 0.0, Floor, true)],
            PlatformRampUpRight => &[(0.0, 1.0, 1.0, 0.0, Floor, true)],
            PlatformRampUpLeft => &[(0.0, 0.0, 1.0, 1.0, Floor, true)],
            HalfBlock => &[(0.0, 0.5, 1.0, 0.5, Floor, false), (0.0, 1.0, 1.0, 1.0, Ceiling, false)],
            CeilingRampDownRight => &[(0.0, 0.0, 1.0, 0.0, Floor, false), (0.0, 0.0, 1.0, 1.0, Ceiling, false)],
            CeilingRampDownLeft => &[(0.0, 0.0, 1.0, 0.0, Floor, false), (0.0, 1.0, 1.0, 0.0, Ceiling, false)],
        }
    }
}

/// How much of each tile side is solid, used to hide faces behind neighbors.
/// `left`/`right` are fractions of the side height measured from the bottom.
#[derive(Copy, Clone, Debug)]
struct Profile {
    left: f32,
    right: f32,
    top: bool,
    bottom: bool,
}

/// World-space collision segment of one tile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EdgeKind {
    Slope { a: Vec2, b: Vec2, dir: SlopeDir },
    Wall { x: f32, y: f32, height: f32, dir: WallDir },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub kind: EdgeKind,
    /// One-way edge on the bottom layer (platforms, one-way ramps).
    pub thin: bool,
}

impl Edge {
    /// Thin edge with zero gradient.
    pub fn is_even(&self) -> bool {
        match self.kind {
            EdgeKind::Slope { a, b, .. } => self.thin && a.y == b.y,
            EdgeKind::Wall { .. } => false,
        }
    }
}

/// The four neighbors of a tile; `Empty` outside the map.
#[derive(Copy, Clone, Debug, Default)]
pub struct Neighbors {
    pub left: TileShape,
    pub right: TileShape,
    pub above: TileShape,
    pub below: TileShape,
}

/// World-space edges of the tile at `(tx, ty)`, floors and ceilings first.
///
/// Flat floors under a tile with a solid bottom, flat ceilings over a tile with
/// a solid top, and wall spans covered by the neighbor's facing side are left
/// out.
pub fn build_edges(shape: TileShape, tx: i32, ty: i32, tile_size: f32, n: Neighbors) -> Vec<Edge> {
    let origin = Vec2::new(tx as f32, ty as f32) * tile_size;
    let mut edges = Vec::new();

    for &(x1, y1, x2, y2, dir, thin) in shape.surfaces() {
        let flat_top = !thin && y1 == 0.0 && y2 == 0.0 && dir == SlopeDir::Floor;
        let flat_bottom = y1 == 1.0 && y2 == 1.0 && dir == SlopeDir::Ceiling;
        if (flat_top && n.above.profile().bottom) || (flat_bottom && n.below.profile().top) {
            continue;
        }
        edges.push(Edge {
            kind: EdgeKind::Slope {
                a: origin + Vec2::new(x1, y1) * tile_size,
                b: origin + Vec2::new(x2, y2) * tile_size,
                dir,
            },
            thin,
        });
    }

    let own = shape.profile();
    // Left face pushes bodies further left; right face pushes them right.
    let faces = [
        (own.left, n.left.profile().right, 0.0, WallDir::Left),
        (own.right, n.right.profile().left, 1.0, WallDir::Right),
    ];
    for (mine, theirs, side, dir) in faces {
        if mine <= theirs {
            continue;
        }
        let top = origin.y + (1.0 - mine) * tile_size;
        let bottom = origin.y + (1.0 - theirs) * tile_size;
        edges.push(Edge {
            kind: EdgeKind::Wall {
                x: origin.x + side * tile_size,
                y: top,
                height: bottom - top,
                dir,
            },
            thin: false,
        });
    }
    edges
}

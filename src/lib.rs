//! tileslope: tile-map physics core for 2D side-scrolling action games
//! (swept slope/wall resolution, pooled bodies, camera-culled pair iteration)

pub mod error;
pub mod types;
pub mod api;
pub mod body;
pub mod tiles;
pub mod map;
pub mod pool;
pub mod visible;
pub mod kinds;
pub mod world;

pub use crate::error::{Error, Result};
pub use crate::types::*;
pub use crate::api::*;
pub use crate::body::{Body, BodySpawn, BodyState, Tuning};
pub use crate::tiles::{TileShape, CODE_INHERIT};
pub use crate::map::CollisionMap;
pub use crate::pool::ObjectPool;
pub use crate::visible::VisibleBuffer;
pub use crate::kinds::BodyKind;
pub use crate::world::World;

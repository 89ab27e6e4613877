#![warn(missing_docs)]

//! Block layout loader with connectivity-aware texture formatting for Macroquad.

mod compositor;
mod connectivity;
mod error;
mod grid;
mod layout;
mod loader {
    pub mod json_loader;
}
mod map;
mod material;
mod node;
mod overlay;
mod render {
    pub mod batch;
}
mod tile;

pub use compositor::{Formatter, OverlayArt};
pub use connectivity::{classify, Classified, Connectivity, CutFlags, TileTraits};
pub use error::LayoutError;
pub use grid::{GridPos, OccupancyGrid, SlopeKind, SlopeMap};
pub use layout::{plan, CellGroup, Layer, LayerPlan, LayoutPlan, DEFAULT_CELL_SIZE};
pub use loader::json_loader::{load_node_file, node_from_json};
pub use map::BlockMap;
pub use material::{BlockMaterial, Fingerprint, MaterialId, Playback, Surface};
pub use node::Node;
pub use overlay::{overlay_plan, OverlayKind, OverlayKinds, OverlayStep, MAX_OVERLAYS};
pub use render::batch::{cell_world_rect, draw_groups, DrawGroup};
pub use tile::{BlendMode, TileDef};

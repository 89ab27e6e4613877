//! The loaded block map: materials, draw groups and collision data.

use anyhow::Context;
use macroquad::prelude::*;
use std::collections::HashMap;

use crate::compositor::{Formatter, OverlayArt};
use crate::grid::{OccupancyGrid, SlopeMap};
use crate::layout::{self, Layer, LayoutPlan};
use crate::loader::json_loader::load_node_file;
use crate::material::{BlockMaterial, Fingerprint, MaterialId};
use crate::node::Node;
use crate::render::batch::{draw_groups, DrawGroup};

/// A loaded block layout.
///
/// Owns the deduplicated material arena, the per-layer draw groups that
/// reference it, and the middleground's collision view (solid cells plus
/// sloped cells).
pub struct BlockMap {
    /// World-space size of one grid cell.
    pub cell_size: f32,
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Solid middleground cells. Sloped cells are not in here.
    pub occupancy: OccupancyGrid,
    /// Sloped middleground cells and their orientations.
    pub slopes: SlopeMap,
    materials: Vec<BlockMaterial>,
    layers: [Vec<DrawGroup>; 3],
}

impl BlockMap {
    /// Loads a block layout from a node file.
    pub async fn load(path: &str) -> anyhow::Result<Self> {
        let node = load_node_file(path)?;
        Self::from_node(&node).await
    }

    /// Loads a block layout from an already parsed node tree.
    pub async fn from_node(node: &Node) -> anyhow::Result<Self> {
        let plan = layout::plan(node)?;
        Self::realize(plan).await
    }

    /// Turns a plan into GPU materials.
    ///
    /// Base and overlay art live only for the duration of this call; the
    /// composited outputs in the material arena are what survives.
    async fn realize(plan: LayoutPlan) -> anyhow::Result<Self> {
        let LayoutPlan {
            key,
            width,
            height,
            cell_size,
            layers: planned,
            occupancy,
            slopes,
        } = plan;

        let formatter = Formatter::new().context("Compiling the block formatting shader")?;

        let mut art: HashMap<char, OverlayArt> = HashMap::new();
        for (name, def) in &key {
            if def.textured() {
                let loaded = OverlayArt::load(def)
                    .await
                    .with_context(|| format!("Loading overlay art for tile '{name}'"))?;
                art.insert(*name, loaded);
            }
        }

        let mut bases: HashMap<(char, usize), Texture2D> = HashMap::new();
        let mut materials: Vec<BlockMaterial> = Vec::new();
        let mut by_fingerprint: HashMap<Fingerprint, MaterialId> = HashMap::new();
        let mut draw_layers: [Vec<DrawGroup>; 3] = Default::default();
        let mut total_blocks = 0usize;

        for (index, layer_plan) in planned.into_iter().enumerate() {
            for group in layer_plan.groups {
                total_blocks += group.cells.len();
                let fingerprint = group.fingerprint;
                let id = match by_fingerprint.get(&fingerprint) {
                    Some(id) => *id,
                    None => {
                        let def = match key.get(&fingerprint.tile) {
                            Some(def) => def,
                            None => continue,
                        };
                        let material = match fingerprint.variant {
                            None => BlockMaterial::flat(def.color),
                            Some(variant) => {
                                let base = match bases.get(&(fingerprint.tile, variant)) {
                                    Some(texture) => texture.clone(),
                                    None => {
                                        let path = &def.texture_paths[variant];
                                        let texture = load_texture(&path.to_string_lossy())
                                            .await
                                            .with_context(|| {
                                                format!("Loading texture {}", path.display())
                                            })?;
                                        texture.set_filter(FilterMode::Nearest);
                                        bases.insert((fingerprint.tile, variant), texture.clone());
                                        texture
                                    }
                                };
                                let tile_art = match art.get(&fingerprint.tile) {
                                    Some(tile_art) => tile_art,
                                    None => continue,
                                };
                                let sloped = def.slopes && fingerprint.class.is_corner();
                                let formatted = formatter
                                    .compose(
                                        &base,
                                        tile_art,
                                        def,
                                        fingerprint.class,
                                        fingerprint.cuts,
                                        sloped,
                                    )
                                    .with_context(|| {
                                        format!(
                                            "Formatting texture for tile '{}'",
                                            fingerprint.tile
                                        )
                                    })?;
                                BlockMaterial::textured(
                                    formatted,
                                    def.animation_frames,
                                    def.animation_time,
                                )
                            }
                        };
                        let id = MaterialId(materials.len() as u16);
                        materials.push(material);
                        by_fingerprint.insert(fingerprint, id);
                        id
                    }
                };
                draw_layers[index].push(DrawGroup {
                    material: id,
                    cells: group.cells,
                });
            }
        }

        info!(
            "Finished loading block layout with: {} resulting material instances, {} total blocks",
            materials.len(),
            total_blocks
        );

        Ok(BlockMap {
            cell_size,
            width,
            height,
            occupancy,
            slopes,
            materials,
            layers: draw_layers,
        })
    }

    /// Advances every animated material by `dt` seconds.
    ///
    /// Playback state lives on the shared material, so all cells drawing
    /// one material stay in frame lockstep.
    pub fn update(&mut self, dt: f32) {
        for material in &mut self.materials {
            material.update(dt);
        }
    }

    /// Draws all three layers back to front, culling cells whose centers
    /// fall outside the view rectangle. Returns the number of cells drawn.
    pub fn draw_visible_rect(&self, view_min: Vec2, view_max: Vec2) -> usize {
        let mut drawn = 0;
        for layer in Layer::ALL {
            drawn += draw_groups(
                &self.layers[layer.index()],
                &self.materials,
                self.height,
                self.cell_size,
                view_min,
                view_max,
            );
        }
        drawn
    }

    /// Number of deduplicated materials backing the map.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

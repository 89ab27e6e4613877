//! Layout planning: from a parsed node tree to deduplicated cell groups.
//!
//! Planning is the CPU half of layout loading. It parses the key, sizes
//! the grid, classifies every occupied cell against its own layer and
//! groups cells by material fingerprint, all without touching the GPU.
//! [`crate::BlockMap`] then realizes each group into a material.

use std::collections::HashMap;

use macroquad::rand::gen_range;

use crate::connectivity::classify;
use crate::error::LayoutError;
use crate::grid::{GridPos, OccupancyGrid, SlopeKind, SlopeMap};
use crate::material::Fingerprint;
use crate::node::Node;
use crate::tile::TileDef;

/// World-space cell size used when the layout does not set one.
pub const DEFAULT_CELL_SIZE: f32 = 32.0;

/// The three block layers of a layout, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Drawn first, behind the terrain.
    Background,
    /// The terrain layer collision data comes from. Mandatory.
    Middleground,
    /// Drawn last, in front of the terrain.
    Foreground,
}

impl Layer {
    /// All layers in draw order.
    pub const ALL: [Layer; 3] = [Layer::Background, Layer::Middleground, Layer::Foreground];

    /// Index into per-layer arrays.
    pub fn index(self) -> usize {
        match self {
            Layer::Background => 0,
            Layer::Middleground => 1,
            Layer::Foreground => 2,
        }
    }

    fn node_name(self) -> &'static str {
        match self {
            Layer::Background => "background",
            Layer::Middleground => "middleground",
            Layer::Foreground => "foreground",
        }
    }
}

/// Cells sharing one material fingerprint, in the order the scan first saw
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGroup {
    /// The shared fingerprint.
    pub fingerprint: Fingerprint,
    /// Every cell that resolved to it, bottom row first.
    pub cells: Vec<GridPos>,
}

/// One layer's worth of planned cell groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPlan {
    /// Groups in first-appearance order.
    pub groups: Vec<CellGroup>,
}

/// Everything layout loading decides before the GPU gets involved.
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    /// Tile definitions by character.
    pub key: HashMap<char, TileDef>,
    /// Grid width in cells, the widest row across all layers.
    pub width: usize,
    /// Grid height in cells, the tallest layer.
    pub height: usize,
    /// World-space size of one cell.
    pub cell_size: f32,
    /// Per-layer groups, indexed by [`Layer::index`].
    pub layers: [LayerPlan; 3],
    /// Middleground occupancy with slope cells already removed.
    pub occupancy: OccupancyGrid,
    /// Middleground cells that became sloped collision surfaces.
    pub slopes: SlopeMap,
}

/// Plans a layout from its node.
///
/// The node needs a `key` child and a `middleground` layer; `background`,
/// `foreground` and `cell_size` are optional. Rows are read bottom-up: a
/// layer's first row child is the bottom visual row, and a row's character
/// count is its width. Characters missing from the key are empty cells.
/// Texture variants are rolled here, one per cell, so the plan pins down
/// exactly which materials loading will create.
pub fn plan(node: &Node) -> Result<LayoutPlan, LayoutError> {
    let key = parse_key(node.need_child("key")?)?;

    let cell_size = match node.child("cell_size") {
        Some(child) => {
            let size = child.as_f32().ok_or_else(|| LayoutError::InvalidValue {
                node: node.name.clone(),
                field: "cell_size".to_string(),
                reason: format!("expected a float, got '{}'", child.value),
            })?;
            if size <= 0.0 {
                return Err(LayoutError::InvalidValue {
                    node: node.name.clone(),
                    field: "cell_size".to_string(),
                    reason: format!("{size} is not a positive size"),
                });
            }
            size
        }
        None => DEFAULT_CELL_SIZE,
    };

    node.need_child(Layer::Middleground.node_name())?;

    let mut width = 0;
    let mut height = 0;
    for layer in Layer::ALL {
        if let Some(rows) = node.child(layer.node_name()) {
            height = height.max(rows.children.len());
            for row in &rows.children {
                width = width.max(row.value.chars().count());
            }
        }
    }

    let mut layers: [LayerPlan; 3] = Default::default();
    let mut occupancy = OccupancyGrid::new(width, height);
    let mut slopes: SlopeMap = SlopeMap::new();

    for layer in Layer::ALL {
        let rows = match node.child(layer.node_name()) {
            Some(rows) => rows,
            None => continue,
        };
        let (layer_plan, grid, layer_slopes) = plan_layer(rows, &key, width, height);
        layers[layer.index()] = layer_plan;
        if layer == Layer::Middleground {
            occupancy = grid;
            slopes = layer_slopes.into_iter().collect();
        }
    }

    // sloped cells belong to the slope map, not the solid grid
    for pos in slopes.keys() {
        occupancy.set(pos.x, pos.y, false);
    }

    Ok(LayoutPlan {
        key,
        width,
        height,
        cell_size,
        layers,
        occupancy,
        slopes,
    })
}

fn parse_key(node: &Node) -> Result<HashMap<char, TileDef>, LayoutError> {
    let mut key = HashMap::new();
    for child in &node.children {
        let def = TileDef::from_node(child)?;
        key.insert(def.name, def);
    }
    Ok(key)
}

/// Classifies one layer against its own occupancy and groups the cells.
///
/// Connectivity never crosses layers: a middleground block is not a
/// neighbor of a background block at the same position.
fn plan_layer(
    rows: &Node,
    key: &HashMap<char, TileDef>,
    width: usize,
    height: usize,
) -> (LayerPlan, OccupancyGrid, Vec<(GridPos, SlopeKind)>) {
    let mut grid = OccupancyGrid::new(width, height);
    for (y, row) in rows.children.iter().enumerate() {
        for (x, ch) in row.value.chars().enumerate() {
            if key.contains_key(&ch) {
                grid.set(x, y, true);
            }
        }
    }

    let mut groups: Vec<CellGroup> = Vec::new();
    let mut by_fingerprint: HashMap<Fingerprint, usize> = HashMap::new();
    let mut slopes = Vec::new();

    for (y, row) in rows.children.iter().enumerate() {
        for (x, ch) in row.value.chars().enumerate() {
            let def = match key.get(&ch) {
                Some(def) => def,
                None => continue,
            };
            let variant = if def.textured() {
                Some(gen_range(0, def.texture_paths.len()))
            } else {
                None
            };
            let classified = classify(x, y, &grid, def.traits());
            let pos = GridPos::new(x, y);
            if let Some(slope) = classified.slope {
                slopes.push((pos, slope));
            }
            let fingerprint = Fingerprint {
                tile: ch,
                variant,
                class: classified.class,
                cuts: classified.cuts,
            };
            let slot = *by_fingerprint.entry(fingerprint).or_insert_with(|| {
                groups.push(CellGroup {
                    fingerprint,
                    cells: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].cells.push(pos);
        }
    }

    (LayerPlan { groups }, grid, slopes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{Connectivity, CutFlags};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn rows(values: &[&str]) -> Node {
        Node::branch(
            "rows",
            values.iter().map(|value| Node::leaf("", value)).collect(),
        )
    }

    fn layer(name: &str, values: &[&str]) -> Node {
        let mut node = rows(values);
        node.name = name.to_string();
        node
    }

    fn flat_key(tiles: &[&str]) -> Node {
        Node::branch(
            "key",
            tiles
                .iter()
                .map(|name| Node::branch(name, vec![]))
                .collect(),
        )
    }

    #[test]
    fn middleground_is_mandatory() {
        let err = plan(&Node::branch(
            "cavern",
            vec![flat_key(&["x"]), layer("background", &["x"])],
        ))
        .expect_err("layout without middleground should fail");
        assert!(
            matches!(err, LayoutError::MissingChild { ref child, .. } if child == "middleground")
        );
    }

    #[test]
    fn groups_cells_by_fingerprint_in_first_seen_order() {
        let plan = plan(&Node::branch(
            "cavern",
            vec![
                flat_key(&["x"]),
                layer("middleground", &["xxx", "xxx", "xxx"]),
            ],
        ))
        .expect("layout should plan");

        assert_eq!(plan.width, 3);
        assert_eq!(plan.height, 3);
        assert_eq!(plan.cell_size, DEFAULT_CELL_SIZE);

        // untextured tiles always classify Default; the four grid corners
        // differ from the interior only by their cut flags
        let groups = &plan.layers[Layer::Middleground.index()].groups;
        assert_eq!(groups.len(), 5);
        for group in groups {
            assert_eq!(group.fingerprint.class, Connectivity::Default);
            assert_eq!(group.fingerprint.variant, None);
        }
        assert_eq!(groups[0].fingerprint.cuts.0, CutFlags::BOTTOM_LEFT);
        assert_eq!(groups[0].cells, vec![GridPos::new(0, 0)]);
        assert!(groups[1].fingerprint.cuts.is_empty());
        assert_eq!(groups[1].cells.len(), 5);
        assert_eq!(groups[2].fingerprint.cuts.0, CutFlags::BOTTOM_RIGHT);
        assert_eq!(groups[3].fingerprint.cuts.0, CutFlags::TOP_LEFT);
        assert_eq!(groups[4].fingerprint.cuts.0, CutFlags::TOP_RIGHT);

        // every middleground cell is solid, nothing sloped
        assert_eq!(plan.occupancy.occupied_count(), 9);
        assert!(plan.slopes.is_empty());
    }

    #[test]
    fn key_misses_and_short_rows_leave_cells_empty() {
        let plan = plan(&Node::branch(
            "cavern",
            vec![flat_key(&["x"]), layer("middleground", &["x?x", "x"])],
        ))
        .expect("layout should plan");

        assert_eq!(plan.width, 3);
        assert_eq!(plan.height, 2);
        assert!(plan.occupancy.get(0, 0));
        assert!(!plan.occupancy.get(1, 0), "'?' is not in the key");
        assert!(plan.occupancy.get(2, 0));
        assert!(plan.occupancy.get(0, 1));
        assert!(!plan.occupancy.get(1, 1), "short rows end early");
        assert_eq!(plan.occupancy.occupied_count(), 3);
    }

    #[test]
    fn extent_spans_all_layers() {
        let plan = plan(&Node::branch(
            "cavern",
            vec![
                flat_key(&["x"]),
                layer("background", &["xxxxx"]),
                layer("middleground", &["x"]),
                layer("foreground", &["x", "x", "x"]),
            ],
        ))
        .expect("layout should plan");
        assert_eq!(plan.width, 5);
        assert_eq!(plan.height, 3);
        // the middleground grid is sized to the shared extent even though
        // its own rows are smaller
        assert_eq!(plan.occupancy.occupied_count(), 1);
    }

    #[test]
    fn layers_classify_against_their_own_occupancy() {
        let plan = plan(&Node::branch(
            "cavern",
            vec![
                flat_key(&["x"]),
                layer("background", &["xx"]),
                layer("middleground", &["x"]),
            ],
        ))
        .expect("layout should plan");

        let background = &plan.layers[Layer::Background.index()].groups;
        let middleground = &plan.layers[Layer::Middleground.index()].groups;

        // background (0,0) has a right neighbor, middleground (0,0) does
        // not, so their cut flags differ
        assert_eq!(
            background[0].fingerprint.cuts.0,
            CutFlags::TOP_LEFT | CutFlags::BOTTOM_LEFT
        );
        assert_eq!(middleground[0].fingerprint.cuts, CutFlags::all());
    }

    #[test]
    fn identical_situations_share_a_fingerprint_across_layers() {
        let plan = plan(&Node::branch(
            "cavern",
            vec![
                flat_key(&["x"]),
                layer("background", &["x"]),
                layer("middleground", &["x"]),
                layer("foreground", &["x"]),
            ],
        ))
        .expect("layout should plan");

        let fingerprints: Vec<Fingerprint> = Layer::ALL
            .iter()
            .map(|layer| plan.layers[layer.index()].groups[0].fingerprint)
            .collect();
        assert_eq!(fingerprints[0], fingerprints[1]);
        assert_eq!(fingerprints[1], fingerprints[2]);
    }

    #[test]
    fn cell_size_parses_and_validates() {
        let sized = plan(&Node::branch(
            "cavern",
            vec![
                flat_key(&["x"]),
                Node::leaf("cell_size", "16"),
                layer("middleground", &["x"]),
            ],
        ))
        .expect("layout should plan");
        assert_eq!(sized.cell_size, 16.0);

        for bad in ["0", "-4", "wide"] {
            let err = plan(&Node::branch(
                "cavern",
                vec![
                    flat_key(&["x"]),
                    Node::leaf("cell_size", bad),
                    layer("middleground", &["x"]),
                ],
            ))
            .expect_err("bad cell_size should fail");
            assert!(matches!(err, LayoutError::InvalidValue { ref field, .. } if field == "cell_size"));
        }
    }

    fn temp_art_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("mq_blockmap_layout_{nanos}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    fn sloping_tile(dir: &std::path::Path) -> Node {
        let texture = dir.join("rock.png");
        fs::write(&texture, b"img").expect("failed to write texture stub");
        fs::write(dir.join("rock_overlay_slope.png"), b"img")
            .expect("failed to write overlay stub");
        Node::branch(
            "t",
            vec![
                Node::leaf("slopes", "true"),
                Node::branch(
                    "texture_paths",
                    vec![Node::leaf("path", &texture.display().to_string())],
                ),
                Node::branch(
                    "overlay_info",
                    vec![
                        Node::leaf(
                            "resource_path",
                            &dir.join("rock_overlay").display().to_string(),
                        ),
                        Node::leaf("extension", ".png"),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn slope_cells_move_from_occupancy_to_the_slope_map() {
        let dir = temp_art_dir();
        let plan = plan(&Node::branch(
            "cavern",
            vec![
                Node::branch("key", vec![sloping_tile(&dir)]),
                layer("middleground", &["tt", "t"]),
            ],
        ))
        .expect("layout should plan");

        // (0,0) has neighbors above and right: a bottom-left corner, which
        // slopes and leaves the solid grid
        assert_eq!(
            plan.slopes.get(&GridPos::new(0, 0)),
            Some(&SlopeKind::NegativeTop)
        );
        assert!(!plan.occupancy.get(0, 0));
        assert!(plan.occupancy.get(1, 0));
        assert!(plan.occupancy.get(0, 1));
        assert_eq!(plan.occupancy.occupied_count(), 2);

        let groups = &plan.layers[Layer::Middleground.index()].groups;
        let corner = groups
            .iter()
            .find(|group| group.cells.contains(&GridPos::new(0, 0)))
            .expect("corner cell should be planned");
        assert_eq!(corner.fingerprint.class, Connectivity::BottomLeftCorner);
        assert_eq!(corner.fingerprint.variant, Some(0));

        let _ = fs::remove_dir_all(&dir);
    }
}

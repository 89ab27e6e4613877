//! Tile definitions parsed from a layout's key.
//!
//! Each child of the layout's `key` node describes one tile: the character
//! cells in the layer rows refer to it by name. Parsing validates every
//! field up front so layout loading never meets a half-formed definition.

use std::path::{Path, PathBuf};

use crate::connectivity::TileTraits;
use crate::error::LayoutError;
use crate::node::Node;
use crate::overlay::{OverlayKind, OverlayKinds};

/// How a tile's color combines with its texture when the material is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Texture wins when present, the flat color otherwise.
    #[default]
    None,
    /// Component-wise product of color and texture.
    Multiplicative,
    /// Component-wise average of color and texture.
    Averaged,
}

impl BlendMode {
    fn from_name(name: &str) -> Option<BlendMode> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Some(BlendMode::None),
            "multiplicative" => Some(BlendMode::Multiplicative),
            "averaged" => Some(BlendMode::Averaged),
            _ => None,
        }
    }

    /// Value the compositing shader receives for this mode.
    pub(crate) fn uniform_value(self) -> i32 {
        match self {
            BlendMode::None => 0,
            BlendMode::Multiplicative => 1,
            BlendMode::Averaged => 2,
        }
    }
}

/// Immutable description of one tile kind from the layout key.
///
/// Texture variant selection happens per cell at load time, so the
/// definition keeps every candidate path. Overlay art is resolved here by
/// probing the filesystem, but actual image loading is deferred until a
/// material needs compositing.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDef {
    /// Single-character name the layer rows refer to.
    pub name: char,
    /// Candidate texture paths, one chosen at random per cell.
    pub texture_paths: Vec<PathBuf>,
    /// Overlay art found on disk, keyed by the kind it serves.
    pub overlays: Vec<(OverlayKind, PathBuf)>,
    /// Flat color, also the blend partner for textured tiles.
    pub color: [f32; 4],
    /// How color and texture combine.
    pub blend_mode: BlendMode,
    /// Horizontal filmstrip frame count, 1 for static tiles.
    pub animation_frames: u32,
    /// Seconds each frame stays visible.
    pub animation_time: f32,
    /// Radius of the circle used to round off cut corners, in [0, 1].
    pub cut_radius: f32,
    /// Whether corner cells become sloped collision surfaces.
    pub slopes: bool,
    /// Whether the layout boundary counts as occupied terrain.
    pub connects_with_edge: bool,
}

impl TileDef {
    /// Parses one key entry.
    ///
    /// The node's name is the tile character; all fields are optional
    /// except that `overlay_info`, when present on a textured tile, must
    /// carry an `extension` child. Texture paths are checked for existence
    /// here and overlay art is discovered by probing
    /// `{base}_{kind}{extension}` for each overlay kind. Slope art stands
    /// in for corner art when the tile slopes and is skipped otherwise.
    pub fn from_node(node: &Node) -> Result<TileDef, LayoutError> {
        let mut chars = node.name.chars();
        let name = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(LayoutError::InvalidKeyName(node.name.clone())),
        };

        let invalid = |field: &str, reason: String| LayoutError::InvalidValue {
            node: node.name.clone(),
            field: field.to_string(),
            reason,
        };

        let color = match node.child("color") {
            Some(child) => parse_color(&child.value).ok_or_else(|| {
                invalid(
                    "color",
                    format!("expected four rgba floats, got '{}'", child.value),
                )
            })?,
            None => [1.0, 1.0, 1.0, 1.0],
        };

        let blend_mode = match node.child("blend_mode") {
            Some(child) => BlendMode::from_name(&child.value).ok_or_else(|| {
                invalid(
                    "blend_mode",
                    format!(
                        "'{}' is not one of none, multiplicative, averaged",
                        child.value
                    ),
                )
            })?,
            None => BlendMode::None,
        };

        let animation_frames = match node.child("animation_frames") {
            Some(child) => {
                let frames = child.as_u32().ok_or_else(|| {
                    invalid(
                        "animation_frames",
                        format!("expected an integer, got '{}'", child.value),
                    )
                })?;
                if !(1..=20).contains(&frames) {
                    return Err(invalid(
                        "animation_frames",
                        format!("{frames} is outside 1..=20"),
                    ));
                }
                frames
            }
            None => 1,
        };

        let animation_time = match node.child("animation_time") {
            Some(child) => {
                let time = child.as_f32().ok_or_else(|| {
                    invalid(
                        "animation_time",
                        format!("expected a float, got '{}'", child.value),
                    )
                })?;
                if time < 0.1 {
                    return Err(invalid(
                        "animation_time",
                        format!("{time}s per frame is shorter than the 0.1s minimum"),
                    ));
                }
                time
            }
            None => 1.0,
        };

        let cut_radius = match node.child("cut_radius") {
            Some(child) => {
                let radius = child.as_f32().ok_or_else(|| {
                    invalid(
                        "cut_radius",
                        format!("expected a float, got '{}'", child.value),
                    )
                })?;
                if !(0.0..=1.0).contains(&radius) {
                    return Err(invalid("cut_radius", format!("{radius} is outside 0..=1")));
                }
                radius
            }
            None => 0.5,
        };

        let slopes = node.child("slopes").map(Node::as_bool).unwrap_or(false);
        let connects_with_edge = node
            .child("connect_with_edge")
            .map(Node::as_bool)
            .unwrap_or(false);

        let mut texture_paths = Vec::new();
        if let Some(paths) = node.child("texture_paths") {
            for child in &paths.children {
                let path = PathBuf::from(child.value.trim());
                if !path.exists() {
                    return Err(LayoutError::MissingTexture(path));
                }
                texture_paths.push(path);
            }
        }

        // Overlays only make sense on textured tiles.
        let mut overlays: Vec<(OverlayKind, PathBuf)> = Vec::new();
        if !texture_paths.is_empty() {
            if let Some(info) = node.child("overlay_info") {
                let extension = info.need_child("extension")?.value.trim().to_string();
                let base = info
                    .children
                    .iter()
                    .find(|child| child.name.to_ascii_lowercase().contains("path"));
                if let Some(base) = base {
                    for kind in OverlayKind::ALL {
                        let candidate = PathBuf::from(format!(
                            "{}_{}{}",
                            base.value.trim(),
                            kind.file_suffix(),
                            extension
                        ));
                        if !candidate.exists() {
                            continue;
                        }
                        match kind {
                            // Slope art replaces corner art for sloping
                            // tiles and is dead weight for flat ones.
                            OverlayKind::Slope if slopes => {
                                overlays.retain(|(k, _)| *k != OverlayKind::Corner);
                                overlays.push((OverlayKind::Corner, candidate));
                            }
                            OverlayKind::Slope => {}
                            _ => overlays.push((kind, candidate)),
                        }
                    }
                }
            }
        }

        Ok(TileDef {
            name,
            texture_paths,
            overlays,
            color,
            blend_mode,
            animation_frames,
            animation_time,
            cut_radius,
            slopes,
            connects_with_edge,
        })
    }

    /// Inputs the connectivity classifier needs for cells of this tile.
    pub fn traits(&self) -> TileTraits {
        let mut kinds = OverlayKinds::default();
        for (kind, _) in &self.overlays {
            kinds.insert(*kind);
        }
        TileTraits {
            kinds,
            slopes: self.slopes,
            connects_with_edge: self.connects_with_edge,
        }
    }

    /// Path of the overlay art serving `kind`, if any was found.
    pub fn overlay(&self, kind: OverlayKind) -> Option<&Path> {
        self.overlays
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, path)| path.as_path())
    }

    /// Whether cells of this tile animate.
    pub fn animated(&self) -> bool {
        self.animation_frames > 1
    }

    /// Whether the tile has texture art at all.
    pub fn textured(&self) -> bool {
        !self.texture_paths.is_empty()
    }
}

/// Parses "r g b a" with an optional trailing `f` per component.
fn parse_color(text: &str) -> Option<[f32; 4]> {
    let mut parts = text
        .split_whitespace()
        .map(|part| part.trim_end_matches(|c| c == 'f' || c == 'F').parse::<f32>());
    let mut color = [0.0; 4];
    for slot in &mut color {
        *slot = parts.next()?.ok()?;
    }
    match parts.next() {
        None => Some(color),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_art_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("mq_blockmap_tiles_{nanos}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let def = TileDef::from_node(&Node::branch("d", vec![])).expect("bare tile should parse");
        assert_eq!(def.name, 'd');
        assert_eq!(def.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(def.blend_mode, BlendMode::None);
        assert_eq!(def.animation_frames, 1);
        assert_eq!(def.animation_time, 1.0);
        assert_eq!(def.cut_radius, 0.5);
        assert!(!def.slopes);
        assert!(!def.connects_with_edge);
        assert!(!def.textured());
        assert!(!def.animated());
        assert!(def.traits().kinds.is_empty());
    }

    #[test]
    fn parses_scalar_fields_and_color() {
        let def = TileDef::from_node(&Node::branch(
            "w",
            vec![
                Node::leaf("color", "0.2 0.4f 0.6 1f"),
                Node::leaf("blend_mode", "Multiplicative"),
                Node::leaf("animation_frames", "4"),
                Node::leaf("animation_time", "0.25"),
                Node::leaf("cut_radius", "0.75"),
                Node::leaf("slopes", "true"),
                Node::leaf("connect_with_edge", "TRUE"),
            ],
        ))
        .expect("tile should parse");
        assert_eq!(def.color, [0.2, 0.4, 0.6, 1.0]);
        assert_eq!(def.blend_mode, BlendMode::Multiplicative);
        assert_eq!(def.animation_frames, 4);
        assert_eq!(def.animation_time, 0.25);
        assert_eq!(def.cut_radius, 0.75);
        assert!(def.slopes);
        assert!(def.connects_with_edge);
        assert!(def.animated());
    }

    #[test]
    fn rejects_out_of_bounds_values() {
        let bad = [
            Node::leaf("animation_frames", "0"),
            Node::leaf("animation_frames", "21"),
            Node::leaf("animation_frames", "four"),
            Node::leaf("animation_time", "0.05"),
            Node::leaf("cut_radius", "1.5"),
            Node::leaf("cut_radius", "-0.1"),
            Node::leaf("blend_mode", "additive"),
            Node::leaf("color", "1 0 0"),
            Node::leaf("color", "1 0 0 1 0"),
        ];
        for field in bad {
            let err = TileDef::from_node(&Node::branch("x", vec![field.clone()]))
                .expect_err("out-of-bounds field should fail");
            assert!(
                matches!(err, LayoutError::InvalidValue { .. }),
                "{}={} gave {err:?}",
                field.name,
                field.value,
            );
        }
    }

    #[test]
    fn key_names_must_be_single_characters() {
        for name in ["", "ab"] {
            let err = TileDef::from_node(&Node::branch(name, vec![]))
                .expect_err("multi-character name should fail");
            assert!(matches!(err, LayoutError::InvalidKeyName(_)));
        }
    }

    #[test]
    fn texture_paths_must_exist() {
        let dir = temp_art_dir();
        let missing = dir.join("nowhere.png");
        let err = TileDef::from_node(&Node::branch(
            "t",
            vec![Node::branch(
                "texture_paths",
                vec![Node::leaf("path", &missing.display().to_string())],
            )],
        ))
        .expect_err("missing texture should fail");
        assert!(matches!(err, LayoutError::MissingTexture(p) if p == missing));

        let real = dir.join("stone.png");
        fs::write(&real, b"img").expect("failed to write texture stub");
        let def = TileDef::from_node(&Node::branch(
            "t",
            vec![Node::branch(
                "texture_paths",
                vec![Node::leaf("path", &real.display().to_string())],
            )],
        ))
        .expect("existing texture should parse");
        assert!(def.textured());
        assert_eq!(def.texture_paths, vec![real]);

        let _ = fs::remove_dir_all(&dir);
    }

    fn textured_node(dir: &std::path::Path, slopes: bool, overlay_children: Vec<Node>) -> Node {
        let texture = dir.join("grass.png");
        fs::write(&texture, b"img").expect("failed to write texture stub");
        Node::branch(
            "g",
            vec![
                Node::leaf("slopes", if slopes { "true" } else { "false" }),
                Node::branch(
                    "texture_paths",
                    vec![Node::leaf("path", &texture.display().to_string())],
                ),
                Node::branch("overlay_info", overlay_children),
            ],
        )
    }

    #[test]
    fn probes_overlay_art_by_suffix() {
        let dir = temp_art_dir();
        let base = dir.join("grass_overlay");
        for suffix in ["corner", "edge", "slope"] {
            fs::write(dir.join(format!("grass_overlay_{suffix}.png")), b"img")
                .expect("failed to write overlay stub");
        }
        let overlay_children = |base: &PathBuf| {
            vec![
                Node::leaf("resource_path", &base.display().to_string()),
                Node::leaf("extension", ".png"),
            ]
        };

        let flat = TileDef::from_node(&textured_node(&dir, false, overlay_children(&base)))
            .expect("tile should parse");
        assert_eq!(
            flat.overlay(OverlayKind::Corner),
            Some(dir.join("grass_overlay_corner.png").as_path()),
        );
        assert!(flat.overlay(OverlayKind::Edge).is_some());
        assert!(flat.overlay(OverlayKind::Cap).is_none());
        assert!(flat.overlay(OverlayKind::Slope).is_none());
        let kinds = flat.traits().kinds;
        assert!(kinds.has(OverlayKind::Corner) && kinds.has(OverlayKind::Edge));
        assert!(!kinds.has(OverlayKind::Single));

        // Sloping tiles swap the slope art in under the corner kind.
        let sloped = TileDef::from_node(&textured_node(&dir, true, overlay_children(&base)))
            .expect("tile should parse");
        assert_eq!(
            sloped.overlay(OverlayKind::Corner),
            Some(dir.join("grass_overlay_slope.png").as_path()),
        );
        assert!(sloped.overlay(OverlayKind::Slope).is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn overlay_info_requires_an_extension() {
        let dir = temp_art_dir();
        let err = TileDef::from_node(&textured_node(
            &dir,
            false,
            vec![Node::leaf("resource_path", "anywhere")],
        ))
        .expect_err("overlay info without extension should fail");
        assert!(
            matches!(err, LayoutError::MissingChild { ref node, ref child }
                if node == "overlay_info" && child == "extension")
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn untextured_tiles_ignore_overlay_info() {
        // No texture paths: overlay_info is skipped entirely, even when it
        // would fail validation.
        let def = TileDef::from_node(&Node::branch(
            "u",
            vec![Node::branch(
                "overlay_info",
                vec![Node::leaf("resource_path", "anywhere")],
            )],
        ))
        .expect("untextured tile should parse");
        assert!(def.overlays.is_empty());
    }
}

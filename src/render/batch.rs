//! Draws planned cell groups with their shared materials.

use macroquad::prelude::*;

use crate::grid::GridPos;
use crate::material::{BlockMaterial, MaterialId, Surface};

/// One draw batch: every cell in `cells` renders with the same material.
pub struct DrawGroup {
    /// Arena index of the shared material.
    pub material: MaterialId,
    /// Grid cells covered by this material.
    pub cells: Vec<GridPos>,
}

/// World-space rectangle of a grid cell.
///
/// Row 0 is the bottom row while screen space grows downward, so the y
/// coordinate flips against the grid height.
pub fn cell_world_rect(cell: GridPos, grid_height: usize, cell_size: f32) -> Rect {
    let flipped = grid_height.saturating_sub(cell.y + 1);
    Rect::new(
        cell.x as f32 * cell_size,
        flipped as f32 * cell_size,
        cell_size,
        cell_size,
    )
}

/// Draws every group whose material exists, culling cells whose centers
/// fall outside the view rectangle. Returns the number of cells drawn.
pub fn draw_groups(
    groups: &[DrawGroup],
    materials: &[BlockMaterial],
    grid_height: usize,
    cell_size: f32,
    view_min: Vec2,
    view_max: Vec2,
) -> usize {
    let mut x_min = view_min.x;
    let mut y_min = view_min.y;
    let mut x_max = view_max.x;
    let mut y_max = view_max.y;

    if x_min > x_max {
        std::mem::swap(&mut x_min, &mut x_max);
    }
    if y_min > y_max {
        std::mem::swap(&mut y_min, &mut y_max);
    }

    let mut drawn = 0;
    for group in groups {
        let material = match materials.get(group.material.index()) {
            Some(material) => material,
            None => continue,
        };
        let source = material.source_rect();

        for &cell in &group.cells {
            let rect = cell_world_rect(cell, grid_height, cell_size);
            let center_x = rect.x + rect.w / 2.0;
            let center_y = rect.y + rect.h / 2.0;
            if center_x < x_min || center_x > x_max || center_y < y_min || center_y > y_max {
                continue;
            }

            match &material.surface {
                Surface::Flat(color) => {
                    draw_rectangle(rect.x, rect.y, rect.w, rect.h, *color);
                }
                Surface::Texture(texture) => {
                    draw_texture_ex(
                        texture,
                        rect.x,
                        rect.y,
                        WHITE,
                        DrawTextureParams {
                            dest_size: Some(vec2(rect.w, rect.h)),
                            source,
                            ..Default::default()
                        },
                    );
                }
            }
            drawn += 1;
        }
    }
    drawn
}

//! Deduplicated render states for loaded block layouts.
//!
//! Compositing is the expensive step of layout loading, so its outputs are
//! shared: every cell whose tile, texture variant, connectivity class and
//! corner cuts coincide draws through the same [`BlockMaterial`]. The
//! [`Fingerprint`] is the cache key that decides sharing.

use macroquad::prelude::{Color, Rect, Texture2D};

use crate::connectivity::{Connectivity, CutFlags};

/// Cache key deciding which cells share one material.
///
/// `variant` is the index of the texture path chosen for the cell, `None`
/// for untextured tiles. Variant choice is rolled per cell before the cache
/// lookup, so two cells of the same tile may land on different materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// Tile character the cell resolved to.
    pub tile: char,
    /// Chosen texture variant, `None` when the tile has no textures.
    pub variant: Option<usize>,
    /// Connectivity class of the cell.
    pub class: Connectivity,
    /// Corner cuts of the cell.
    pub cuts: CutFlags,
}

/// Handle into the material arena a loaded map owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) u16);

impl MaterialId {
    /// Arena slot this id points at.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a material puts on screen.
pub enum Surface {
    /// Untextured: a solid color quad.
    Flat(Color),
    /// Composited texture, laid out as a horizontal filmstrip when the
    /// tile animates.
    Texture(Texture2D),
}

/// Animation state for a filmstrip material.
#[derive(Debug, Clone, Copy)]
pub struct Playback {
    frames: u32,
    frame_time: f32,
    frame: u32,
    time_left: f32,
}

impl Playback {
    /// Starts at frame zero with a full frame of time left.
    pub fn new(frames: u32, frame_time: f32) -> Playback {
        Playback {
            frames,
            frame_time,
            frame: 0,
            time_left: frame_time,
        }
    }

    /// Advances playback by `dt` seconds, wrapping past the last frame.
    pub fn advance(&mut self, dt: f32) {
        if self.frame_time <= 0.0 || self.frames == 0 {
            return;
        }
        self.time_left -= dt;
        while self.time_left <= 0.0 {
            self.time_left += self.frame_time;
            self.frame = (self.frame + 1) % self.frames;
        }
    }

    /// Frame currently on display.
    pub fn frame(self) -> u32 {
        self.frame
    }

    /// Total frames in the filmstrip.
    pub fn frames(self) -> u32 {
        self.frames
    }
}

/// One render state shared by every cell with an identical fingerprint.
pub struct BlockMaterial {
    /// Color quad or composited texture.
    pub surface: Surface,
    playback: Option<Playback>,
}

impl BlockMaterial {
    /// Material for an untextured tile.
    pub fn flat(color: [f32; 4]) -> BlockMaterial {
        let [r, g, b, a] = color;
        BlockMaterial {
            surface: Surface::Flat(Color::new(r, g, b, a)),
            playback: None,
        }
    }

    /// Material around a composited texture. A frame count above one turns
    /// the texture into an animated filmstrip.
    pub fn textured(texture: Texture2D, frames: u32, frame_time: f32) -> BlockMaterial {
        let playback = if frames > 1 {
            Some(Playback::new(frames, frame_time))
        } else {
            None
        };
        BlockMaterial {
            surface: Surface::Texture(texture),
            playback,
        }
    }

    /// Advances animation, if any.
    pub fn update(&mut self, dt: f32) {
        if let Some(playback) = &mut self.playback {
            playback.advance(dt);
        }
    }

    /// Source rectangle of the current animation frame. `None` means the
    /// whole texture (or the flat color) is drawn.
    pub fn source_rect(&self) -> Option<Rect> {
        match (&self.surface, &self.playback) {
            (Surface::Texture(texture), Some(playback)) => {
                let frame_width = texture.width() / playback.frames as f32;
                Some(Rect::new(
                    frame_width * playback.frame as f32,
                    0.0,
                    frame_width,
                    texture.height(),
                ))
            }
            _ => None,
        }
    }
}

//! GPU compositing of formatted block textures.
//!
//! A layout load owns one [`Formatter`]: a single compiled shader program
//! reused for every material the layout needs. Each compose call renders
//! the base art into a fresh off-screen target, applying rotated overlays
//! plus any corner or slope cuts, then keeps the texture and drops the
//! framebuffer. Animated bases are treated as horizontal filmstrips and
//! formatted frame by frame in one pass.

use macroquad::miniquad::{
    BlendFactor, BlendState, Equation, PipelineParams, ShaderSource, UniformDesc, UniformType,
};
use macroquad::prelude::*;

use crate::connectivity::{Connectivity, CutFlags};
use crate::error::LayoutError;
use crate::overlay::{overlay_plan, OverlayKind, MAX_OVERLAYS};
use crate::tile::TileDef;

const VERTEX_SHADER: &str = r#"#version 100
attribute vec3 position;
attribute vec2 texcoord;
varying mediump vec2 uv;
uniform mat4 Model;
uniform mat4 Projection;
void main() {
    gl_Position = Projection * Model * vec4(position, 1);
    uv = texcoord;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
varying mediump vec2 uv;
uniform sampler2D Texture; // base block art, possibly a filmstrip
uniform sampler2D overlay0;
uniform sampler2D overlay1;
uniform sampler2D overlay2;
uniform sampler2D overlay3;
uniform int rotation0; // quarter-turns, -1 marks an unused slot
uniform int rotation1;
uniform int rotation2;
uniform int rotation3;
uniform int frames;
uniform int cutTopLeft;
uniform int cutTopRight;
uniform int cutBottomLeft;
uniform int cutBottomRight;
uniform float cutRadius;
uniform int slopeCut;
uniform vec4 blockColor;
uniform int blendMode; // 0 none, 1 multiplicative, 2 averaged

vec2 turn(vec2 p, int r) {
    if (r == 1) return vec2(1.0 - p.y, p.x);
    if (r == 2) return vec2(1.0 - p.x, 1.0 - p.y);
    if (r == 3) return vec2(p.y, 1.0 - p.x);
    return p;
}

vec4 blend_over(vec4 under, vec4 top) {
    float a = top.a + under.a * (1.0 - top.a);
    if (a <= 0.0) return vec4(0.0);
    vec3 rgb = (top.rgb * top.a + under.rgb * under.a * (1.0 - top.a)) / a;
    return vec4(rgb, a);
}

void main() {
    // all formatting happens in frame-local coordinates so every frame of
    // an animated base gets identical treatment
    vec2 cell = vec2(fract(uv.x * float(frames)), uv.y);

    float r = cutRadius * 0.5;
    if (r > 0.0) {
        if (cutTopLeft == 1 && cell.x < r && cell.y < r
            && distance(cell, vec2(r, r)) > r) discard;
        if (cutTopRight == 1 && cell.x > 1.0 - r && cell.y < r
            && distance(cell, vec2(1.0 - r, r)) > r) discard;
        if (cutBottomLeft == 1 && cell.x < r && cell.y > 1.0 - r
            && distance(cell, vec2(r, 1.0 - r)) > r) discard;
        if (cutBottomRight == 1 && cell.x > 1.0 - r && cell.y > 1.0 - r
            && distance(cell, vec2(1.0 - r, 1.0 - r)) > r) discard;
    }

    // sloped corners keep the half the rotated triangle art covers
    if (slopeCut == 1) {
        vec2 p = turn(cell, rotation0 < 0 ? 0 : rotation0);
        if (p.x + p.y < 1.0) discard;
    }

    vec4 color = texture2D(Texture, uv);
    if (rotation0 >= 0) color = blend_over(color, texture2D(overlay0, turn(cell, rotation0)));
    if (rotation1 >= 0) color = blend_over(color, texture2D(overlay1, turn(cell, rotation1)));
    if (rotation2 >= 0) color = blend_over(color, texture2D(overlay2, turn(cell, rotation2)));
    if (rotation3 >= 0) color = blend_over(color, texture2D(overlay3, turn(cell, rotation3)));

    if (blendMode == 1) color *= blockColor;
    if (blendMode == 2) color = (color + blockColor) * 0.5;

    gl_FragColor = color;
}
"#;

/// GPU-resident overlay art for one tile definition.
///
/// Loaded once per layout load and dropped when loading finishes; only the
/// composited outputs survive.
pub struct OverlayArt {
    slots: Vec<(OverlayKind, Texture2D)>,
}

impl OverlayArt {
    /// Uploads every overlay image the definition found on disk.
    pub async fn load(def: &TileDef) -> Result<OverlayArt, LayoutError> {
        let mut slots = Vec::with_capacity(def.overlays.len());
        for (kind, path) in &def.overlays {
            let texture = load_texture(&path.to_string_lossy())
                .await
                .map_err(LayoutError::Gpu)?;
            texture.set_filter(FilterMode::Nearest);
            slots.push((*kind, texture));
        }
        Ok(OverlayArt { slots })
    }

    fn get(&self, kind: OverlayKind) -> Option<&Texture2D> {
        self.slots
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, texture)| texture)
    }
}

/// Reusable compositing state: the formatting shader and a transparent
/// texture that fills unused overlay slots.
pub struct Formatter {
    material: Material,
    blank: Texture2D,
}

impl Formatter {
    /// Compiles the formatting shader. Blending is disabled in the
    /// pipeline; the shader writes final colors and overlay mixing happens
    /// per fragment.
    pub fn new() -> Result<Formatter, LayoutError> {
        let replace = BlendState::new(Equation::Add, BlendFactor::One, BlendFactor::Zero);
        let mut uniforms = vec![
            UniformDesc::new("frames", UniformType::Int1),
            UniformDesc::new("cutTopLeft", UniformType::Int1),
            UniformDesc::new("cutTopRight", UniformType::Int1),
            UniformDesc::new("cutBottomLeft", UniformType::Int1),
            UniformDesc::new("cutBottomRight", UniformType::Int1),
            UniformDesc::new("cutRadius", UniformType::Float1),
            UniformDesc::new("slopeCut", UniformType::Int1),
            UniformDesc::new("blockColor", UniformType::Float4),
            UniformDesc::new("blendMode", UniformType::Int1),
        ];
        let mut textures = Vec::new();
        for slot in 0..MAX_OVERLAYS {
            uniforms.push(UniformDesc::new(
                &format!("rotation{slot}"),
                UniformType::Int1,
            ));
            textures.push(format!("overlay{slot}"));
        }

        let material = load_material(
            ShaderSource::Glsl {
                vertex: VERTEX_SHADER,
                fragment: FRAGMENT_SHADER,
            },
            MaterialParams {
                pipeline_params: PipelineParams {
                    color_blend: Some(replace),
                    alpha_blend: Some(replace),
                    ..Default::default()
                },
                uniforms,
                textures,
            },
        )
        .map_err(LayoutError::Gpu)?;

        Ok(Formatter {
            material,
            blank: Texture2D::from_rgba8(1, 1, &[0, 0, 0, 0]),
        })
    }

    /// Renders the formatted texture for one material.
    ///
    /// The overlay plan for `class` is resolved against the tile's loaded
    /// art, the base is drawn through the formatting shader into a target
    /// of its own size, and the target's texture is returned. The
    /// framebuffer itself is dropped here; callers re-wrap animated
    /// results with the tile's frame timing.
    pub fn compose(
        &self,
        base: &Texture2D,
        art: &OverlayArt,
        def: &TileDef,
        class: Connectivity,
        cuts: CutFlags,
        sloped: bool,
    ) -> Result<Texture2D, LayoutError> {
        let plan = overlay_plan(class);
        if plan.len() > MAX_OVERLAYS {
            return Err(LayoutError::TooManyOverlays(plan.len()));
        }
        let mut resolved = Vec::with_capacity(plan.len());
        for step in plan {
            let texture = art.get(step.kind).ok_or_else(|| {
                LayoutError::MissingOverlay(step.kind.file_suffix().to_string())
            })?;
            resolved.push((texture, step.turns));
        }

        let target = render_target(base.width() as u32, base.height() as u32);
        target.texture.set_filter(FilterMode::Nearest);
        set_camera(&Camera2D {
            zoom: vec2(2.0 / base.width(), 2.0 / base.height()),
            target: vec2(base.width() / 2.0, base.height() / 2.0),
            render_target: Some(target.clone()),
            ..Default::default()
        });
        clear_background(BLANK);

        gl_use_material(&self.material);
        self.material
            .set_uniform("frames", def.animation_frames as i32);
        self.material.set_uniform("cutRadius", def.cut_radius);
        self.material
            .set_uniform("cutTopLeft", cut_flag(cuts, CutFlags::TOP_LEFT));
        self.material
            .set_uniform("cutTopRight", cut_flag(cuts, CutFlags::TOP_RIGHT));
        self.material
            .set_uniform("cutBottomLeft", cut_flag(cuts, CutFlags::BOTTOM_LEFT));
        self.material
            .set_uniform("cutBottomRight", cut_flag(cuts, CutFlags::BOTTOM_RIGHT));
        self.material
            .set_uniform("slopeCut", if sloped { 1i32 } else { 0i32 });
        let [red, green, blue, alpha] = def.color;
        self.material
            .set_uniform("blockColor", vec4(red, green, blue, alpha));
        self.material
            .set_uniform("blendMode", def.blend_mode.uniform_value());

        for slot in 0..MAX_OVERLAYS {
            let rotation = format!("rotation{slot}");
            let sampler = format!("overlay{slot}");
            match resolved.get(slot) {
                Some((texture, turns)) => {
                    self.material.set_uniform(&rotation, *turns as i32);
                    self.material.set_texture(&sampler, (*texture).clone());
                }
                None => {
                    self.material.set_uniform(&rotation, -1i32);
                    self.material.set_texture(&sampler, self.blank.clone());
                }
            }
        }

        draw_texture_ex(
            base,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(base.width(), base.height())),
                ..Default::default()
            },
        );

        gl_use_default_material();
        set_default_camera();
        Ok(target.texture.clone())
    }
}

fn cut_flag(cuts: CutFlags, corner: u8) -> i32 {
    if cuts.has(corner) {
        1
    } else {
        0
    }
}

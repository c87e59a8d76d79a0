// nvfx/renderer/src/composite.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Accelerated composites: prepare once, draw any number of rectangles, then finish.
//!
//! Each rectangle is drawn as one oversized triangle covering it, cut back to the rectangle by
//! the scissor.

use crate::accel::Accel;
use crate::blend::BlendState;
use crate::check;
use crate::error::{Fallback, PrepareError};
use crate::format::blend_rule;
use crate::picture::{Op, PictFormat, Picture, Pixmap};
use crate::regs;
use crate::shaders::{self, FragmentProgramId};
use nvfx_geometry::fixed::Fixed;
use nvfx_geometry::transform::Transform;
use nvfx_geometry::vector::{Vector2F, Vector2I};
use nvfx_gpu::{Allocator, PushBuffer};

const PREPARE_PUSH_SPACE: usize = 128;
const COMPOSITE_PUSH_SPACE: usize = 64;

// Attribute slots of the compositing vertex layout.
const ATTR_POSITION: u16 = 0;
const ATTR_TEXCOORD: u16 = 8;

/// How texture coordinates are computed for one bound texture unit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextureUnit {
    pub transform: Option<Transform>,
    /// The bound pixmap's size, by which coordinates are divided when they are normalized.
    pub size: Vector2F,
}

/// The state of a prepared composite, threaded through `composite` and `done_composite`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeState {
    pub have_mask: bool,
    pub units: [TextureUnit; 2],
    normalize: bool,
}

impl TextureUnit {
    fn new(picture: &Picture, pixmap: &Pixmap) -> TextureUnit {
        TextureUnit { transform: picture.transform, size: pixmap.size.to_f32() }
    }

    /// The texture coordinate the unit samples at `point`.
    pub fn texcoord(&self, point: Vector2I, normalize: bool) -> Vector2F {
        match self.transform {
            Some(ref transform) => {
                // An overflowing projection samples at the untransformed point.
                let [x, y] = transform.transform_point(point).unwrap_or_else(|| {
                    [Fixed::from_int(point.x()), Fixed::from_int(point.y())]
                });
                if normalize {
                    Vector2F::new((x.to_f64() / self.size.x() as f64) as f32,
                                  (y.to_f64() / self.size.y() as f64) as f32)
                } else {
                    Vector2F::new(x.to_f32(), y.to_f32())
                }
            }
            None if normalize => {
                Vector2F::new(point.x() as f32 / self.size.x(), point.y() as f32 / self.size.y())
            }
            None => point.to_f32(),
        }
    }
}

impl<P, A> Accel<P, A> where P: PushBuffer, A: Allocator {
    /// Decides whether a composite can be done on the 3D engine. Rejections are logged at
    /// debug level only.
    pub fn check_composite(&self,
                           op: Op,
                           src: &Picture,
                           mask: Option<&Picture>,
                           dst: &Picture)
                           -> Result<(), Fallback> {
        check::check_composite(&*self.generation, op, src, mask, dst).map_err(|fallback| {
            debug!("composite fallback: {}", fallback);
            fallback
        })
    }

    /// Programs blending, the render target, the texture units and the shaders for a
    /// composite that `check_composite` accepted.
    pub fn prepare_composite(&mut self,
                             op: Op,
                             src: &Picture,
                             src_pixmap: &Pixmap,
                             mask: Option<(&Picture, &Pixmap)>,
                             dst: &Picture,
                             dst_pixmap: &Pixmap)
                             -> Result<CompositeState, PrepareError> {
        let result = self.emit_composite_state(op, src, src_pixmap, mask, dst, dst_pixmap);
        if let Err(ref err) = result {
            debug!("prepare composite failed: {}", err);
        }
        result
    }

    fn emit_composite_state(&mut self,
                            op: Op,
                            src: &Picture,
                            src_pixmap: &Pixmap,
                            mask: Option<(&Picture, &Pixmap)>,
                            dst: &Picture,
                            dst_pixmap: &Pixmap)
                            -> Result<CompositeState, PrepareError> {
        let rule = blend_rule(op).ok_or(PrepareError::UnsupportedOp(op))?;
        let tables = self.generation.tables();
        let surface_format = tables.surface_format(dst.format)
                                   .ok_or(PrepareError::DestinationFormat(dst.format))?;
        let src_format = tables.texture_format(src.format)
                               .ok_or(PrepareError::TextureFormat(src.format))?;
        let mask_format = match mask {
            Some((mask, _)) => {
                Some(tables.texture_format(mask.format)
                           .ok_or(PrepareError::TextureFormat(mask.format))?)
            }
            None => None,
        };

        if !self.push.space(PREPARE_PUSH_SPACE) {
            return Err(PrepareError::NoSpace);
        }
        self.push.reset();

        let component_alpha = mask.map_or(false, |(mask, _)| mask.is_component_alpha_rgb());
        let blend = BlendState::resolve(&rule, dst.format, component_alpha);
        self.generation.emit_blend(&mut self.push, blend);
        self.generation.emit_surface(&mut self.push, dst_pixmap, surface_format);
        self.generation.emit_texture(&mut self.push, 0, src_pixmap, src, src_format);

        let mut state = CompositeState {
            have_mask: false,
            units: [TextureUnit::new(src, src_pixmap), TextureUnit::default()],
            normalize: self.generation.normalizes_coordinates(),
        };

        if let Some(slot) = self.shaders.render_vertex() {
            shaders::load_vertex_program(&mut self.push, slot);
        }

        let program = match (mask, mask_format) {
            (Some((mask, mask_pixmap)), Some(mask_format)) => {
                self.generation.emit_texture(&mut self.push, 1, mask_pixmap, mask, mask_format);
                state.units[1] = TextureUnit::new(mask, mask_pixmap);
                state.have_mask = true;
                if !mask.is_component_alpha_rgb() {
                    FragmentProgramId::CompositeMask
                } else if rule.src_alpha {
                    FragmentProgramId::CompositeMaskSaCa
                } else {
                    FragmentProgramId::CompositeMaskCa
                }
            }
            _ => FragmentProgramId::PassTex0,
        };

        let slot = self.shaders.fragment(program, dst.format == PictFormat::A8);
        shaders::load_fragment_program(&mut self.push, &self.shader_buffer, slot);
        self.generation.emit_texture_units(&mut self.push, state.have_mask);

        self.push.bind_bufctx(Some(self.channel.bufctx));
        if self.push.validate().is_err() {
            self.push.bind_bufctx(None);
            return Err(PrepareError::Validation);
        }

        debug!("prepared composite op {:?} with {:?}, blend {:?}", op, program, blend);
        Ok(state)
    }

    /// Draws one rectangle of a prepared composite.
    ///
    /// `src`, `mask` and `dst` are the rectangle's origins in their pictures and `size` its
    /// extent. If the push buffer cannot make room the rectangle is dropped.
    pub fn composite(&mut self,
                     state: &CompositeState,
                     src: Vector2I,
                     mask: Vector2I,
                     dst: Vector2I,
                     size: Vector2I) {
        if !self.push.space(COMPOSITE_PUSH_SPACE) {
            debug!("no push buffer space for composite, dropping rectangle");
            return;
        }

        let (width, height) = (size.x(), size.y());
        self.push.begin(regs::SCISSOR_HORIZ, 2);
        self.push.push(((width << 16) | dst.x()) as u32);
        self.push.push(((height << 16) | dst.y()) as u32);
        self.push.begin(regs::VERTEX_BEGIN_END, 1);
        self.push.push(regs::VERTEX_BEGIN_END_TRIANGLES);

        let corners = [
            Vector2I::new(0, -height),
            Vector2I::new(0, height),
            Vector2I::new(2 * width, height),
        ];
        for &corner in &corners {
            let src_coord = state.units[0].texcoord(src + corner, state.normalize);
            if state.have_mask {
                let mask_coord = state.units[1].texcoord(mask + corner, state.normalize);
                self.push.begin(regs::vtx_attr_2f_x(ATTR_TEXCOORD), 4);
                self.push.push_f32(src_coord.x());
                self.push.push_f32(src_coord.y());
                self.push.push_f32(mask_coord.x());
                self.push.push_f32(mask_coord.y());
            } else {
                self.push.begin(regs::vtx_attr_2f_x(ATTR_TEXCOORD), 2);
                self.push.push_f32(src_coord.x());
                self.push.push_f32(src_coord.y());
            }
            self.push.begin(regs::vtx_attr_2i(ATTR_POSITION), 1);
            self.push.push((dst + corner).pack_i16());
        }

        self.push.begin(regs::VERTEX_BEGIN_END, 1);
        self.push.push(regs::VERTEX_BEGIN_END_STOP);
    }

    /// Ends a composite.
    #[inline]
    pub fn done_composite(&mut self, _: CompositeState) {
        self.push.bind_bufctx(None);
    }
}

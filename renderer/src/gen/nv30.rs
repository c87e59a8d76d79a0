// nvfx/renderer/src/gen/nv30.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The NV30 family: NV30, NV34 and NV35.
//!
//! Textures are rectangular with unnormalized coordinates, and only 1×1 pictures may repeat.

use crate::blend::BlendState;
use crate::format::{FormatTables, TextureFormat};
use crate::gen::{self, Family, Generation};
use crate::picture::{Filter, PictFormat, Picture, Pixmap};
use crate::regs::{self, TEX_SWIZZLE_S0_ONE as ONE, TEX_SWIZZLE_S0_S1 as S1};
use crate::regs::{TEX_SWIZZLE_S0_ZERO as ZERO, TEX_SWIZZLE_S1_W as W, TEX_SWIZZLE_S1_X as X};
use crate::regs::{TEX_SWIZZLE_S1_Y as Y, TEX_SWIZZLE_S1_Z as Z};
use nvfx_gpu::{BufferFlags, Channel, GpuObject, Method, PushBuffer, Reloc, RelocFlags};
use nvfx_gpu::{METHOD_OBJECT, SUBC_3D, SUBC_BLIT};

const NV30_REVISIONS: u32 = 0x0000_0003;
const NV35_REVISIONS: u32 = 0x0000_01e0;
const NV34_REVISIONS: u32 = 0x0000_0010;

// Render target placeholder programmed at bring-up: 4096×4096 ARGB8888.
const DEFAULT_RT_SIZE: u32 = 4096;
const DEFAULT_RT_PITCH: u32 = DEFAULT_RT_SIZE * 4;

/// The 3D class for an NV3x revision.
pub fn class_for_revision(revision: u32) -> Option<u32> {
    let bit = 1 << revision;
    if NV30_REVISIONS & bit != 0 {
        Some(regs::NV30_3D_CLASS)
    } else if NV35_REVISIONS & bit != 0 {
        Some(regs::NV35_3D_CLASS)
    } else if NV34_REVISIONS & bit != 0 {
        Some(regs::NV34_3D_CLASS)
    } else {
        None
    }
}

pub struct Nv30 {
    class: u32,
    tables: FormatTables,
}

impl Nv30 {
    pub fn new(class: u32) -> Nv30 {
        let surfaces = [
            (PictFormat::A8R8G8B8, 0x148),
            (PictFormat::A8B8G8R8, 0x150),
            (PictFormat::X8R8G8B8, 0x145),
            (PictFormat::X8B8G8R8, 0x14f),
            (PictFormat::R5G6B5, 0x143),
            (PictFormat::A8, 0x149),
            (PictFormat::X1R5G5B5, 0x142),
        ];

        let rgba = [S1, S1, S1, S1];
        let rgbx = [S1, S1, S1, ONE];
        let textures = [
            (PictFormat::A8R8G8B8, texture(0x12, rgba, [X, Y, Z, W])),
            (PictFormat::A8B8G8R8, texture(0x12, rgba, [Z, Y, X, W])),
            (PictFormat::X8R8G8B8, texture(0x12, rgbx, [X, Y, Z, W])),
            (PictFormat::X8B8G8R8, texture(0x12, rgbx, [Z, Y, X, W])),
            (PictFormat::A1R5G5B5, texture(0x10, rgba, [X, Y, Z, W])),
            (PictFormat::X1R5G5B5, texture(0x10, rgbx, [X, Y, Z, W])),
            (PictFormat::A1B5G5R5, texture(0x10, rgba, [Z, Y, X, W])),
            (PictFormat::X1B5G5R5, texture(0x10, rgbx, [Z, Y, X, W])),
            (PictFormat::X4R4G4B4, texture(0x1d, rgbx, [X, Y, Z, W])),
            (PictFormat::A4R4G4B4, texture(0x1d, rgba, [X, Y, Z, W])),
            (PictFormat::X4B4G4R4, texture(0x1d, rgbx, [Z, Y, X, W])),
            (PictFormat::A4B4G4R4, texture(0x1d, rgba, [Z, Y, X, W])),
            (PictFormat::A8, texture(0x1b, [ZERO, ZERO, ZERO, S1], [X, X, X, X])),
            (PictFormat::R5G6B5, texture(0x11, rgbx, [X, Y, Z, W])),
            (PictFormat::B5G6R5, texture(0x11, rgbx, [Z, Y, X, W])),
        ];

        Nv30 { class, tables: FormatTables::new(&surfaces, &textures) }
    }
}

#[inline]
fn texture(format: u32, s0: [u32; 4], s1: [u32; 4]) -> TextureFormat {
    TextureFormat { format, swizzle: regs::tex_swizzle(s0, s1) }
}

fn push_identity_matrix(push: &mut dyn PushBuffer, method: Method) {
    push.begin(method, 16);
    for row in 0..4 {
        for column in 0..4 {
            push.push_f32(if row == column { 1.0 } else { 0.0 });
        }
    }
}

impl Generation for Nv30 {
    #[inline]
    fn family(&self) -> Family {
        Family::Nv30
    }

    #[inline]
    fn class(&self) -> u32 {
        self.class
    }

    #[inline]
    fn tables(&self) -> &FormatTables {
        &self.tables
    }

    #[inline]
    fn restricts_repeat(&self) -> bool {
        true
    }

    #[inline]
    fn normalizes_coordinates(&self) -> bool {
        false
    }

    #[inline]
    fn has_vertex_programs(&self) -> bool {
        false
    }

    #[inline]
    fn shader_buffer_flags(&self) -> BufferFlags {
        BufferFlags::VRAM | BufferFlags::MAP
    }

    #[inline]
    fn yv12_bicubic_path(&self) -> &'static str {
        "shaders/nv30/yv12_bicubic.fp"
    }

    fn emit_init(&self, push: &mut dyn PushBuffer, object: &GpuObject, channel: &Channel) {
        push.begin(Method::new(SUBC_3D, METHOD_OBJECT), 1);
        push.push(object.handle);
        push.begin(regs::DMA_TEXTURE0, 3);
        push.push(channel.vram);
        push.push(channel.gart);
        push.push(channel.vram);
        push.begin(regs::DMA_UNK1AC, 1);
        push.push(channel.vram);
        push.begin(regs::DMA_COLOR0, 2);
        push.push(channel.vram);
        push.push(channel.vram);
        push.begin(regs::DMA_UNK1B0, 1);
        push.push(channel.vram);

        for index in 1..8 {
            push.begin(regs::viewport_clip_horiz(index), 2);
            push.push(0);
            push.push(0);
        }

        push.begin(regs::RT_ENABLE, 1);
        push.push(regs::RT_ENABLE_COLOR0);

        // Undocumented state, as the binary driver leaves it.
        for &(offset, value) in &[
            (0x03b0, 0x0010_0000),
            (0x1454, 0),
            (0x1d80, 3),
            (0x1450, 0x0003_0004),
            (0x1e98, 0),
        ] {
            push.begin(Method::three_d(offset), 1);
            push.push(value);
        }
        push.begin(Method::three_d(0x17e0), 3);
        push.push(0);
        push.push(0);
        push.push_f32(1.0);
        push.begin(Method::three_d(0x1f80), 16);
        for index in 0..16 {
            push.push(if index == 8 { 0x0000_ffff } else { 0 });
        }

        for &subchannel in &[SUBC_3D, SUBC_BLIT] {
            push.begin(Method::new(subchannel, regs::FLIP_SET_READ), 3);
            push.push(0);
            push.push(1);
            push.push(2);
        }

        push.begin(Method::three_d(0x1d88), 1);
        push.push(0x0000_1200);
        push.begin(regs::RC_ENABLE, 1);
        push.push(0);

        gen::emit_fixed_function_defaults(push);
        push.begin(regs::BLEND_FUNC_ENABLE, 5);
        push.push(0);
        push.push(0);
        push.push(0);
        push.push(0);
        push.push(regs::NV30_BLEND_EQUATION_FUNC_ADD);
        gen::emit_raster_defaults(push, true);
        gen::emit_textures_disabled(push, 4);
        gen::emit_solid_stipple(push);

        push.begin(regs::DEPTH_RANGE_NEAR, 2);
        push.push_f32(0.0);
        push.push_f32(1.0);

        let (width, height) = (DEFAULT_RT_SIZE, DEFAULT_RT_SIZE);
        push.begin(regs::RT_HORIZ, 5);
        push.push(width << 16);
        push.push(height << 16);
        push.push(0x148);
        push.push((DEFAULT_RT_PITCH << 16) | DEFAULT_RT_PITCH);
        push.push(0);
        push.begin(regs::VIEWPORT_TX_ORIGIN, 1);
        push.push(0);
        push.begin(regs::VIEWPORT_HORIZ, 2);
        push.push(width << 16);
        push.push(height << 16);
        push.begin(regs::viewport_clip_horiz(0), 2);
        push.push((width - 1) << 16);
        push.push((height - 1) << 16);
        push.begin(regs::SCISSOR_HORIZ, 2);
        push.push(width << 16);
        push.push(height << 16);
        push.begin(regs::VIEWPORT_HORIZ, 2);
        push.push(width << 16);
        push.push(height << 16);

        gen::emit_viewport_translate(push);
        push_identity_matrix(push, regs::MODELVIEW_MATRIX);
        push_identity_matrix(push, regs::PROJECTION_MATRIX);

        push.begin(regs::SCISSOR_HORIZ, 2);
        push.push(width << 16);
        push.push(height << 16);
    }

    fn emit_blend(&self, push: &mut dyn PushBuffer, blend: BlendState) {
        match blend {
            BlendState::Disabled => {
                push.begin(regs::BLEND_FUNC_ENABLE, 1);
                push.push(0);
            }
            BlendState::Enabled { src, dst } => {
                push.begin(regs::BLEND_FUNC_ENABLE, 3);
                push.push(1);
                push.push(src.packed());
                push.push(dst.packed());
            }
        }
    }

    fn emit_surface(&self, push: &mut dyn PushBuffer, pixmap: &Pixmap, format: u32) {
        push.begin(regs::RT_FORMAT, 3);
        push.push(format);
        push.push((pixmap.pitch << 16) | pixmap.pitch);
        push.push_reloc(&pixmap.bo, Reloc::low(0, RelocFlags::VRAM | RelocFlags::RDWR));
    }

    fn emit_texture(&self,
                    push: &mut dyn PushBuffer,
                    unit: u16,
                    pixmap: &Pixmap,
                    picture: &Picture,
                    format: TextureFormat) {
        let reloc = RelocFlags::VRAM | RelocFlags::GART | RelocFlags::RD;
        let filter = match picture.filter {
            Filter::Bilinear => regs::TEX_FILTER_LINEAR,
            _ => regs::TEX_FILTER_NEAREST,
        };
        let wrap = regs::TEX_WRAP_CLAMP_TO_EDGE;

        push.begin(regs::tex_offset(unit), 8);
        push.push_reloc(&pixmap.bo, Reloc::low(0, reloc));
        push.push_reloc(&pixmap.bo,
                        Reloc::or((1 << regs::TEX_FORMAT_MIPMAP_COUNT_SHIFT) |
                                  regs::TEX_FORMAT_NO_BORDER |
                                  regs::TEX_FORMAT_DIMS_2D |
                                  (format.format << regs::TEX_FORMAT_FORMAT_SHIFT) |
                                  (gen::log2i(pixmap.width()) <<
                                   regs::TEX_FORMAT_BASE_SIZE_U_SHIFT) |
                                  (gen::log2i(pixmap.height()) <<
                                   regs::TEX_FORMAT_BASE_SIZE_V_SHIFT),
                                  reloc,
                                  regs::TEX_FORMAT_DMA0,
                                  regs::TEX_FORMAT_DMA1));
        push.push(regs::tex_wrap(wrap, wrap, wrap));
        push.push(regs::NV30_TEX_ENABLE_ENABLE);
        push.push((pixmap.pitch << regs::TEX_SWIZZLE_RECT_PITCH_SHIFT) | format.swizzle);
        push.push(regs::tex_filter(filter, filter) | regs::NV30_TEX_FILTER_ENGINE_LOCK);
        push.push((pixmap.width() << regs::TEX_NPOT_SIZE_W_SHIFT) | pixmap.height());
        push.push(0);
    }

    fn emit_texture_units(&self, push: &mut dyn PushBuffer, have_mask: bool) {
        // A bitmask: 3 enables units 0 and 1.
        push.begin(regs::TEX_UNITS_ENABLE, 1);
        push.push(if have_mask { 3 } else { 1 });
    }
}

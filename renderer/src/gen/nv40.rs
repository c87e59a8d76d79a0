// nvfx/renderer/src/gen/nv40.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The NV40 family: NV40, NV44 and the integrated 0x6x chipsets.

use crate::blend::BlendState;
use crate::format::{FormatTables, TextureFormat};
use crate::gen::{self, Family, Generation};
use crate::picture::{Filter, PictFormat, Picture, Pixmap, RepeatType};
use crate::regs::{self, TEX_SWIZZLE_S0_ONE as ONE, TEX_SWIZZLE_S0_S1 as S1};
use crate::regs::{TEX_SWIZZLE_S0_ZERO as ZERO, TEX_SWIZZLE_S1_W as W, TEX_SWIZZLE_S1_X as X};
use crate::regs::{TEX_SWIZZLE_S1_Y as Y, TEX_SWIZZLE_S1_Z as Z};
use nvfx_gpu::{BufferFlags, Channel, GpuObject, Method, PushBuffer, Reloc, RelocFlags};
use nvfx_gpu::{METHOD_OBJECT, SUBC_3D};

const NV40_REVISIONS: u32 = 0x0000_0baf;
const NV44_REVISIONS: u32 = 0x0000_5450;

const MAX_RT_SIZE: u32 = 4096;

/// The 3D class for an NV4x revision.
pub fn class_for_revision(revision: u32) -> Option<u32> {
    let bit = 1 << revision;
    if NV40_REVISIONS & bit != 0 {
        Some(regs::NV40_3D_CLASS)
    } else if NV44_REVISIONS & bit != 0 {
        Some(regs::NV44_3D_CLASS)
    } else {
        None
    }
}

pub struct Nv40 {
    class: u32,
    tables: FormatTables,
}

impl Nv40 {
    pub fn new(class: u32) -> Nv40 {
        let surfaces = [
            (PictFormat::A8R8G8B8, regs::RT_FORMAT_COLOR_A8R8G8B8),
            (PictFormat::X8R8G8B8, regs::RT_FORMAT_COLOR_X8R8G8B8),
            (PictFormat::R5G6B5, regs::RT_FORMAT_COLOR_R5G6B5),
            (PictFormat::A8, regs::RT_FORMAT_COLOR_B8),
        ];

        let argb = regs::NV40_TEX_FORMAT_FORMAT_A8R8G8B8;
        let argb1555 = regs::NV40_TEX_FORMAT_FORMAT_A1R5G5B5;
        let rgba = [S1, S1, S1, S1];
        let rgbx = [S1, S1, S1, ONE];
        let textures = [
            (PictFormat::A8R8G8B8, texture(argb, rgba, [X, Y, Z, W])),
            (PictFormat::X8R8G8B8, texture(argb, rgbx, [X, Y, Z, W])),
            (PictFormat::X8B8G8R8, texture(argb, rgbx, [Z, Y, X, W])),
            (PictFormat::A1R5G5B5, texture(argb1555, rgba, [X, Y, Z, W])),
            (PictFormat::X1R5G5B5, texture(argb1555, rgbx, [X, Y, Z, W])),
            (PictFormat::R5G6B5,
             texture(regs::NV40_TEX_FORMAT_FORMAT_R5G6B5, rgba, [X, Y, Z, W])),
            (PictFormat::A8,
             texture(regs::NV40_TEX_FORMAT_FORMAT_L8, [ZERO, ZERO, ZERO, S1], [X, X, X, X])),
        ];

        Nv40 { class, tables: FormatTables::new(&surfaces, &textures) }
    }
}

#[inline]
fn texture(format: u32, s0: [u32; 4], s1: [u32; 4]) -> TextureFormat {
    TextureFormat { format, swizzle: regs::tex_swizzle(s0, s1) }
}

/// The wrap mode for all three axes of a composite texture.
pub(crate) fn wrap_mode(picture: &Picture) -> u32 {
    if !picture.repeat {
        return regs::TEX_WRAP_CLAMP_TO_BORDER;
    }
    match picture.repeat_type {
        RepeatType::Pad => regs::TEX_WRAP_CLAMP,
        RepeatType::Reflect => regs::TEX_WRAP_MIRRORED_REPEAT,
        RepeatType::Normal | RepeatType::None => regs::TEX_WRAP_REPEAT,
    }
}

impl Generation for Nv40 {
    #[inline]
    fn family(&self) -> Family {
        Family::Nv40
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
        false
    }

    #[inline]
    fn normalizes_coordinates(&self) -> bool {
        true
    }

    #[inline]
    fn has_vertex_programs(&self) -> bool {
        true
    }

    #[inline]
    fn shader_buffer_flags(&self) -> BufferFlags {
        BufferFlags::VRAM | BufferFlags::GART | BufferFlags::MAP
    }

    #[inline]
    fn yv12_bicubic_path(&self) -> &'static str {
        "shaders/nv40/yv12_bicubic.fp"
    }

    fn emit_init(&self, push: &mut dyn PushBuffer, object: &GpuObject, channel: &Channel) {
        push.begin(Method::new(SUBC_3D, METHOD_OBJECT), 1);
        push.push(object.handle);
        push.begin(regs::DMA_NOTIFY, 1);
        push.push(channel.notify);
        push.begin(regs::DMA_TEXTURE0, 2);
        push.push(channel.vram);
        push.push(channel.gart);
        push.begin(regs::DMA_COLOR0, 2);
        push.push(channel.vram);
        push.push(channel.vram);

        // Undocumented state, as the binary driver leaves it.
        push.begin(Method::three_d(0x1ea4), 3);
        push.push(0x0000_0010);
        push.push(0x0100_0100);
        push.push(0xff80_0006);
        push.begin(Method::three_d(0x1fc4), 1);
        push.push(0x0614_4321);
        push.begin(Method::three_d(0x1fc8), 2);
        push.push(0xedcb_a987);
        push.push(0x0000_0021);
        for &(offset, value) in &[
            (0x1fd0, 0x0017_1615),
            (0x1fd4, 0x001b_1a19),
            (0x1ef8, 0x0020_ffff),
            (0x1d64, 0x00d3_0000),
            (0x1e94, 0x0000_0001),
            // Avoids stair-shaped tearing on some boards.
            (0x1450, 0x0000_000f),
        ] {
            push.begin(Method::three_d(offset), 1);
            push.push(value);
        }

        gen::emit_viewport_translate(push);

        gen::emit_fixed_function_defaults(push);
        push.begin(regs::BLEND_FUNC_ENABLE, 1);
        push.push(0);
        gen::emit_raster_defaults(push, false);
        gen::emit_solid_stipple(push);
        gen::emit_textures_disabled(push, 16);

        push.begin(Method::three_d(0x1d78), 1);
        push.push(0x110);
        push.begin(regs::RT_ENABLE, 1);
        push.push(regs::RT_ENABLE_COLOR0);

        for &method in &[regs::RT_HORIZ, regs::SCISSOR_HORIZ, regs::VIEWPORT_HORIZ] {
            push.begin(method, 2);
            push.push(MAX_RT_SIZE << 16);
            push.push(MAX_RT_SIZE << 16);
        }
        push.begin(regs::viewport_clip_horiz(0), 2);
        push.push((MAX_RT_SIZE - 1) << 16);
        push.push((MAX_RT_SIZE - 1) << 16);
    }

    fn emit_blend(&self, push: &mut dyn PushBuffer, blend: BlendState) {
        match blend {
            BlendState::Disabled => {
                push.begin(regs::BLEND_FUNC_ENABLE, 1);
                push.push(0);
            }
            BlendState::Enabled { src, dst } => {
                push.begin(regs::BLEND_FUNC_ENABLE, 5);
                push.push(1);
                push.push(src.packed());
                push.push(dst.packed());
                push.push(0);
                push.push(regs::NV40_BLEND_EQUATION_FUNC_ADD);
            }
        }
    }

    fn emit_surface(&self, push: &mut dyn PushBuffer, pixmap: &Pixmap, format: u32) {
        push.begin(regs::RT_FORMAT, 3);
        push.push(regs::RT_FORMAT_TYPE_LINEAR | regs::RT_FORMAT_ZETA_Z24S8 | format);
        push.push(pixmap.pitch);
        push.push_reloc(&pixmap.bo, Reloc::low(0, RelocFlags::VRAM | RelocFlags::RDWR));
    }

    fn emit_texture(&self,
                    push: &mut dyn PushBuffer,
                    unit: u16,
                    pixmap: &Pixmap,
                    picture: &Picture,
                    format: TextureFormat) {
        let reloc = RelocFlags::VRAM | RelocFlags::GART | RelocFlags::WR;
        let filter = match picture.filter {
            Filter::Bilinear => regs::TEX_FILTER_LINEAR,
            _ => regs::TEX_FILTER_NEAREST,
        };
        let wrap = wrap_mode(picture);

        push.begin(regs::tex_offset(unit), 8);
        push.push_reloc(&pixmap.bo, Reloc::low(0, reloc));
        push.push_reloc(&pixmap.bo,
                        Reloc::or(format.format |
                                  regs::NV40_TEX_FORMAT_LINEAR |
                                  regs::TEX_FORMAT_DIMS_2D |
                                  regs::TEX_FORMAT_UNK8000 |
                                  regs::TEX_FORMAT_NO_BORDER |
                                  (1 << regs::TEX_FORMAT_MIPMAP_COUNT_SHIFT),
                                  reloc,
                                  regs::TEX_FORMAT_DMA0,
                                  regs::TEX_FORMAT_DMA1));
        push.push(regs::tex_wrap(wrap, wrap, wrap));
        push.push(regs::NV40_TEX_ENABLE_ENABLE);
        push.push(format.swizzle);
        push.push(regs::tex_filter(filter, filter) | regs::NV40_TEX_FILTER_DEFAULT_BITS);
        push.push((pixmap.width() << regs::TEX_NPOT_SIZE_W_SHIFT) | pixmap.height());
        push.push(0);
        push.begin(regs::nv40_tex_size1(unit), 1);
        push.push((1 << regs::NV40_TEX_SIZE1_DEPTH_SHIFT) | pixmap.pitch);
    }

    fn emit_texture_units(&self, push: &mut dyn PushBuffer, _: bool) {
        // Flushes the texture cache; stale texels show up without it.
        push.begin(regs::NV40_TEX_CACHE_CTL, 1);
        push.push(2);
        push.begin(regs::NV40_TEX_CACHE_CTL, 1);
        push.push(1);
    }
}

#[cfg(test)]
mod test {
    use super::{class_for_revision, wrap_mode, Nv40};
    use crate::gen::Generation;
    use crate::picture::{PictFormat, Picture, RepeatType};
    use crate::regs;
    use nvfx_geometry::vector::Vector2I;

    #[test]
    fn test_revisions() {
        assert_eq!(class_for_revision(0), Some(regs::NV40_3D_CLASS));
        assert_eq!(class_for_revision(6), Some(regs::NV44_3D_CLASS));
        assert_eq!(class_for_revision(12), Some(regs::NV44_3D_CLASS));
        assert_eq!(class_for_revision(8), None);
    }

    #[test]
    fn test_wrap_modes() {
        let picture = Picture::new(PictFormat::A8R8G8B8, Vector2I::new(8, 8));
        assert_eq!(wrap_mode(&picture), regs::TEX_WRAP_CLAMP_TO_BORDER);
        assert_eq!(wrap_mode(&picture.clone().with_repeat(RepeatType::Pad)),
                   regs::TEX_WRAP_CLAMP);
        assert_eq!(wrap_mode(&picture.clone().with_repeat(RepeatType::Reflect)),
                   regs::TEX_WRAP_MIRRORED_REPEAT);
        assert_eq!(wrap_mode(&picture.with_repeat(RepeatType::Normal)), regs::TEX_WRAP_REPEAT);
    }

    #[test]
    fn test_tables() {
        let nv40 = Nv40::new(regs::NV40_3D_CLASS);
        let tables = nv40.tables();
        assert_eq!(tables.surface_format(PictFormat::A8), Some(regs::RT_FORMAT_COLOR_B8));
        assert_eq!(tables.surface_format(PictFormat::A8B8G8R8), None);
        assert_eq!(tables.texture_format(PictFormat::A8B8G8R8), None);
        assert_eq!(tables.texture_format(PictFormat::X8B8G8R8).unwrap().format,
                   regs::NV40_TEX_FORMAT_FORMAT_A8R8G8B8);
    }
}

// nvfx/renderer/src/gen/mod.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The two hardware generations.
//!
//! Both share the method layout and the compositing algorithm. What differs is captured by the
//! `Generation` trait: format tables, how texture units, render targets and blending are
//! encoded, whether texture coordinates are normalized, and the default state written at
//! bring-up.

use crate::blend::BlendState;
use crate::error::InitError;
use crate::format::{FormatTables, TextureFormat};
use crate::picture::{Picture, Pixmap};
use crate::regs;
use nvfx_gpu::{BufferFlags, Channel, GpuObject, PushBuffer};

pub mod nv30;
pub mod nv40;

/// The texture size limit in either dimension.
pub const MAX_TEXTURE_SIZE: i32 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    /// NV30, NV34 and NV35.
    Nv30,
    /// NV40 and NV44, including the integrated 0x6x parts.
    Nv40,
}

/// Encodings that differ between generations.
pub trait Generation {
    fn family(&self) -> Family;

    /// The 3D object class to instantiate.
    fn class(&self) -> u32;

    fn tables(&self) -> &FormatTables;

    /// Whether repeating pictures other than 1×1 must fall back.
    fn restricts_repeat(&self) -> bool;

    /// Whether texture coordinates are divided by the texture size.
    fn normalizes_coordinates(&self) -> bool;

    fn has_vertex_programs(&self) -> bool;

    /// Where the fragment-program buffer may be placed.
    fn shader_buffer_flags(&self) -> BufferFlags;

    /// The path of the bicubic YV12 program, which is generation-specific.
    fn yv12_bicubic_path(&self) -> &'static str;

    /// Writes the default 3D state.
    fn emit_init(&self, push: &mut dyn PushBuffer, object: &GpuObject, channel: &Channel);

    fn emit_blend(&self, push: &mut dyn PushBuffer, blend: BlendState);

    fn emit_surface(&self, push: &mut dyn PushBuffer, pixmap: &Pixmap, format: u32);

    /// Binds `pixmap` to texture unit `unit`, sampled as `picture` describes.
    fn emit_texture(&self,
                    push: &mut dyn PushBuffer,
                    unit: u16,
                    pixmap: &Pixmap,
                    picture: &Picture,
                    format: TextureFormat);

    /// Enables the bound texture units once all of them are programmed.
    fn emit_texture_units(&self, push: &mut dyn PushBuffer, have_mask: bool);
}

/// The generation and 3D class for a chipset id.
pub fn select(chipset: u32) -> Result<Box<dyn Generation>, InitError> {
    let revision = chipset & 0xf;
    match chipset & 0xf0 {
        0x30 => {
            let class = nv30::class_for_revision(revision)
                              .ok_or(InitError::UnknownChipset(chipset))?;
            Ok(Box::new(nv30::Nv30::new(class)))
        }
        0x40 => {
            let class = nv40::class_for_revision(revision)
                              .ok_or(InitError::UnknownChipset(chipset))?;
            Ok(Box::new(nv40::Nv40::new(class)))
        }
        0x60 => Ok(Box::new(nv40::Nv40::new(regs::NV44_3D_CLASS))),
        _ => Err(InitError::UnsupportedArchitecture(chipset)),
    }
}

/// The floor of the base-2 logarithm. Zero for zero.
#[inline]
pub(crate) fn log2i(value: u32) -> u32 {
    if value == 0 {
        0
    } else {
        31 - value.leading_zeros()
    }
}

/// Stencil, alpha test, depth writes and culling off, with the colour mask fully open.
pub(crate) fn emit_fixed_function_defaults(push: &mut dyn PushBuffer) {
    push.begin(regs::stencil_enable(0), 1);
    push.push(0);
    push.begin(regs::stencil_enable(1), 1);
    push.push(0);
    push.begin(regs::ALPHA_FUNC_ENABLE, 1);
    push.push(0);
    push.begin(regs::DEPTH_WRITE_ENABLE, 2);
    push.push(0);
    push.push(0);
    push.begin(regs::COLOR_MASK, 1);
    push.push(regs::COLOR_MASK_ALL);
    push.begin(regs::CULL_FACE_ENABLE, 1);
    push.push(0);
}

/// Logic op off, dithering as requested, smooth shading, zero polygon offset and filled
/// polygons.
pub(crate) fn emit_raster_defaults(push: &mut dyn PushBuffer, dither: bool) {
    push.begin(regs::COLOR_LOGIC_OP_ENABLE, 2);
    push.push(0);
    push.push(regs::COLOR_LOGIC_OP_COPY);
    push.begin(regs::DITHER_ENABLE, 1);
    push.push(dither as u32);
    push.begin(regs::SHADE_MODEL, 1);
    push.push(regs::SHADE_MODEL_SMOOTH);
    push.begin(regs::POLYGON_OFFSET_FACTOR, 2);
    push.push_f32(0.0);
    push.push_f32(0.0);
    push.begin(regs::POLYGON_MODE_FRONT, 2);
    push.push(regs::POLYGON_MODE_FILL);
    push.push(regs::POLYGON_MODE_FILL);
}

pub(crate) fn emit_solid_stipple(push: &mut dyn PushBuffer) {
    push.begin(regs::POLYGON_STIPPLE_PATTERN, 32);
    for _ in 0..32 {
        push.push(0xffff_ffff);
    }
}

pub(crate) fn emit_textures_disabled(push: &mut dyn PushBuffer, units: u16) {
    for unit in 0..units {
        push.begin(regs::tex_enable(unit), 1);
        push.push(0);
    }
}

/// The viewport translation: zero offset, unit scale.
pub(crate) fn emit_viewport_translate(push: &mut dyn PushBuffer) {
    push.begin(regs::VIEWPORT_TRANSLATE_X, 8);
    for &value in &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0] {
        push.push_f32(value);
    }
}

#[cfg(test)]
mod test {
    use super::{log2i, select, Family};
    use crate::error::InitError;
    use crate::regs;

    #[test]
    fn test_class_selection() {
        let cases = [
            (0x30, Family::Nv30, regs::NV30_3D_CLASS),
            (0x31, Family::Nv30, regs::NV30_3D_CLASS),
            (0x34, Family::Nv30, regs::NV34_3D_CLASS),
            (0x35, Family::Nv30, regs::NV35_3D_CLASS),
            (0x36, Family::Nv30, regs::NV35_3D_CLASS),
            (0x40, Family::Nv40, regs::NV40_3D_CLASS),
            (0x47, Family::Nv40, regs::NV40_3D_CLASS),
            (0x4b, Family::Nv40, regs::NV40_3D_CLASS),
            (0x44, Family::Nv40, regs::NV44_3D_CLASS),
            (0x4e, Family::Nv40, regs::NV44_3D_CLASS),
            (0x63, Family::Nv40, regs::NV44_3D_CLASS),
            (0x67, Family::Nv40, regs::NV44_3D_CLASS),
        ];
        for &(chipset, family, class) in &cases {
            let generation = select(chipset).unwrap();
            assert_eq!(generation.family(), family, "chipset {:x}", chipset);
            assert_eq!(generation.class(), class, "chipset {:x}", chipset);
        }
    }

    #[test]
    fn test_unknown_chipsets() {
        for &chipset in &[0x32, 0x3f, 0x4d, 0x4f] {
            match select(chipset) {
                Err(InitError::UnknownChipset(id)) => assert_eq!(id, chipset),
                Err(other) => panic!("unexpected {:?}", other),
                Ok(_) => panic!("chipset {:x} accepted", chipset),
            }
        }
        for &chipset in &[0x10, 0x20, 0x50, 0xa0] {
            match select(chipset) {
                Err(InitError::UnsupportedArchitecture(_)) => {}
                Err(other) => panic!("unexpected {:?}", other),
                Ok(_) => panic!("chipset {:x} accepted", chipset),
            }
        }
    }

    #[test]
    fn test_log2i() {
        assert_eq!(log2i(0), 0);
        assert_eq!(log2i(1), 0);
        assert_eq!(log2i(2), 1);
        assert_eq!(log2i(3), 1);
        assert_eq!(log2i(4096), 12);
        assert_eq!(log2i(5000), 12);
    }
}

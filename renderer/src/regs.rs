// nvfx/renderer/src/regs.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Methods and field encodings of the NV30/NV40 3D classes.
//!
//! Both generations share one method layout; registers only present on the later generation
//! are prefixed `NV40_`.

use nvfx_gpu::Method;

// Object classes.
pub const NV30_3D_CLASS: u32 = 0x0397;
pub const NV35_3D_CLASS: u32 = 0x0497;
pub const NV34_3D_CLASS: u32 = 0x0697;
pub const NV40_3D_CLASS: u32 = 0x4097;
pub const NV44_3D_CLASS: u32 = 0x4497;

pub const FLIP_SET_READ: u16 = 0x0120;

pub const DMA_NOTIFY: Method = Method::three_d(0x0180);
pub const DMA_TEXTURE0: Method = Method::three_d(0x0184);
pub const DMA_COLOR0: Method = Method::three_d(0x0194);
pub const DMA_UNK1AC: Method = Method::three_d(0x01ac);
pub const DMA_UNK1B0: Method = Method::three_d(0x01b0);

pub const RT_HORIZ: Method = Method::three_d(0x0200);
pub const RT_FORMAT: Method = Method::three_d(0x0208);
pub const RT_ENABLE: Method = Method::three_d(0x0220);
pub const TEX_UNITS_ENABLE: Method = Method::three_d(0x023c);

pub const RT_ENABLE_COLOR0: u32 = 0x0000_0001;

pub const RT_FORMAT_TYPE_LINEAR: u32 = 0x0000_0100;
pub const RT_FORMAT_ZETA_Z24S8: u32 = 0x0000_0040;
pub const RT_FORMAT_COLOR_X1R5G5B5: u32 = 0x0000_0002;
pub const RT_FORMAT_COLOR_R5G6B5: u32 = 0x0000_0003;
pub const RT_FORMAT_COLOR_X8R8G8B8: u32 = 0x0000_0005;
pub const RT_FORMAT_COLOR_A8R8G8B8: u32 = 0x0000_0008;
pub const RT_FORMAT_COLOR_B8: u32 = 0x0000_0009;
pub const RT_FORMAT_COLOR_X8B8G8R8: u32 = 0x0000_000f;
pub const RT_FORMAT_COLOR_A8B8G8R8: u32 = 0x0000_0010;

pub const VIEWPORT_TX_ORIGIN: Method = Method::three_d(0x02b8);

#[inline]
pub fn viewport_clip_horiz(index: u16) -> Method {
    Method::three_d(0x02c0 + 8 * index)
}

pub const DITHER_ENABLE: Method = Method::three_d(0x0300);
pub const ALPHA_FUNC_ENABLE: Method = Method::three_d(0x0304);
pub const BLEND_FUNC_ENABLE: Method = Method::three_d(0x0310);
pub const COLOR_MASK: Method = Method::three_d(0x0324);

#[inline]
pub fn stencil_enable(index: u16) -> Method {
    Method::three_d(0x0328 + 0x20 * index)
}

pub const SHADE_MODEL: Method = Method::three_d(0x0368);
pub const COLOR_LOGIC_OP_ENABLE: Method = Method::three_d(0x0374);
pub const DEPTH_RANGE_NEAR: Method = Method::three_d(0x0394);

pub const COLOR_MASK_ALL: u32 = 0x0101_0101;
pub const COLOR_LOGIC_OP_COPY: u32 = 0x1503;
pub const SHADE_MODEL_SMOOTH: u32 = 0x1d01;
pub const NV30_BLEND_EQUATION_FUNC_ADD: u32 = 0x8006;
pub const NV40_BLEND_EQUATION_FUNC_ADD: u32 = 0x8006_8006;

pub const MODELVIEW_MATRIX: Method = Method::three_d(0x0480);
pub const PROJECTION_MATRIX: Method = Method::three_d(0x0680);

pub const SCISSOR_HORIZ: Method = Method::three_d(0x08c0);
pub const FP_ACTIVE_PROGRAM: Method = Method::three_d(0x08e4);

pub const FP_ACTIVE_PROGRAM_DMA0: u32 = 0x0000_0001;
pub const FP_ACTIVE_PROGRAM_DMA1: u32 = 0x0000_0002;

pub const VIEWPORT_HORIZ: Method = Method::three_d(0x0a00);
pub const VIEWPORT_TRANSLATE_X: Method = Method::three_d(0x0a20);
pub const DEPTH_WRITE_ENABLE: Method = Method::three_d(0x0a70);
pub const POLYGON_OFFSET_FACTOR: Method = Method::three_d(0x0a78);

pub const VP_UPLOAD_INST: Method = Method::three_d(0x0b80);

pub const POLYGON_STIPPLE_PATTERN: Method = Method::three_d(0x1480);

pub const VERTEX_BEGIN_END: Method = Method::three_d(0x1808);
pub const POLYGON_MODE_FRONT: Method = Method::three_d(0x1828);
pub const CULL_FACE_ENABLE: Method = Method::three_d(0x183c);

pub const VERTEX_BEGIN_END_STOP: u32 = 0;
pub const VERTEX_BEGIN_END_TRIANGLES: u32 = 5;
pub const POLYGON_MODE_FILL: u32 = 0x1b02;

#[inline]
pub fn nv40_tex_size1(unit: u16) -> Method {
    Method::three_d(0x1840 + 4 * unit)
}

pub const NV40_TEX_SIZE1_DEPTH_SHIFT: u32 = 20;

#[inline]
pub fn vtx_attr_2f_x(attr: u16) -> Method {
    Method::three_d(0x1880 + 8 * attr)
}

#[inline]
pub fn vtx_attr_2i(attr: u16) -> Method {
    Method::three_d(0x1900 + 4 * attr)
}

#[inline]
pub fn tex_offset(unit: u16) -> Method {
    Method::three_d(0x1a00 + 0x20 * unit)
}

#[inline]
pub fn tex_enable(unit: u16) -> Method {
    Method::three_d(0x1a0c + 0x20 * unit)
}

pub const TEX_FORMAT_DMA0: u32 = 0x0000_0001;
pub const TEX_FORMAT_DMA1: u32 = 0x0000_0002;
pub const TEX_FORMAT_NO_BORDER: u32 = 0x0000_0008;
pub const TEX_FORMAT_DIMS_1D: u32 = 0x0000_0010;
pub const TEX_FORMAT_DIMS_2D: u32 = 0x0000_0020;
pub const TEX_FORMAT_FORMAT_SHIFT: u32 = 8;
pub const TEX_FORMAT_MIPMAP_COUNT_SHIFT: u32 = 16;
pub const TEX_FORMAT_BASE_SIZE_U_SHIFT: u32 = 20;
pub const TEX_FORMAT_BASE_SIZE_V_SHIFT: u32 = 24;
// Undocumented; always set alongside the format.
pub const TEX_FORMAT_UNK8000: u32 = 0x0000_8000;

pub const NV40_TEX_FORMAT_LINEAR: u32 = 0x0000_2000;
pub const NV40_TEX_FORMAT_RECT: u32 = 0x0000_4000;
pub const NV40_TEX_FORMAT_FORMAT_L8: u32 = 0x0000_0100;
pub const NV40_TEX_FORMAT_FORMAT_A1R5G5B5: u32 = 0x0000_0200;
pub const NV40_TEX_FORMAT_FORMAT_R5G6B5: u32 = 0x0000_0400;
pub const NV40_TEX_FORMAT_FORMAT_A8R8G8B8: u32 = 0x0000_0500;
pub const NV40_TEX_FORMAT_FORMAT_A8L8: u32 = 0x0000_1800;

pub const TEX_WRAP_S_SHIFT: u32 = 0;
pub const TEX_WRAP_T_SHIFT: u32 = 8;
pub const TEX_WRAP_R_SHIFT: u32 = 16;
pub const TEX_WRAP_REPEAT: u32 = 1;
pub const TEX_WRAP_MIRRORED_REPEAT: u32 = 2;
pub const TEX_WRAP_CLAMP_TO_EDGE: u32 = 3;
pub const TEX_WRAP_CLAMP_TO_BORDER: u32 = 4;
pub const TEX_WRAP_CLAMP: u32 = 5;

#[inline]
pub fn tex_wrap(s: u32, t: u32, r: u32) -> u32 {
    (s << TEX_WRAP_S_SHIFT) | (t << TEX_WRAP_T_SHIFT) | (r << TEX_WRAP_R_SHIFT)
}

pub const NV30_TEX_ENABLE_ENABLE: u32 = 0x4000_0000;
pub const NV40_TEX_ENABLE_ENABLE: u32 = 0x8000_0000;

pub const TEX_SWIZZLE_S0_ZERO: u32 = 0;
pub const TEX_SWIZZLE_S0_ONE: u32 = 1;
pub const TEX_SWIZZLE_S0_S1: u32 = 2;
pub const TEX_SWIZZLE_S1_X: u32 = 3;
pub const TEX_SWIZZLE_S1_Y: u32 = 2;
pub const TEX_SWIZZLE_S1_Z: u32 = 1;
pub const TEX_SWIZZLE_S1_W: u32 = 0;
pub const TEX_SWIZZLE_RECT_PITCH_SHIFT: u32 = 16;

/// Packs a texture swizzle: `s0` selects zero, one or the `s1` source per output channel,
/// `s1` picks the source component, both in X, Y, Z, W order.
#[inline]
pub fn tex_swizzle(s0: [u32; 4], s1: [u32; 4]) -> u32 {
    (s0[0] << 14) | (s0[1] << 12) | (s0[2] << 10) | (s0[3] << 8) |
        (s1[0] << 6) | (s1[1] << 4) | (s1[2] << 2) | s1[3]
}

pub const TEX_FILTER_MIN_SHIFT: u32 = 16;
pub const TEX_FILTER_MAG_SHIFT: u32 = 24;
pub const TEX_FILTER_NEAREST: u32 = 1;
pub const TEX_FILTER_LINEAR: u32 = 2;
pub const TEX_FILTER_SIGNED_ALPHA: u32 = 0x1000_0000;
pub const TEX_FILTER_SIGNED_RED: u32 = 0x2000_0000;
pub const TEX_FILTER_SIGNED_GREEN: u32 = 0x4000_0000;
pub const TEX_FILTER_SIGNED_BLUE: u32 = 0x8000_0000;
// Low filter bits the hardware expects on every unit; the earlier generation only wants the
// engine lock bit.
pub const NV30_TEX_FILTER_ENGINE_LOCK: u32 = 0x0000_2000;
pub const NV40_TEX_FILTER_DEFAULT_BITS: u32 = 0x0000_3fd6;

#[inline]
pub fn tex_filter(min: u32, mag: u32) -> u32 {
    (min << TEX_FILTER_MIN_SHIFT) | (mag << TEX_FILTER_MAG_SHIFT)
}

pub const TEX_NPOT_SIZE_W_SHIFT: u32 = 16;

pub const FP_CONTROL: Method = Method::three_d(0x1d60);
pub const FP_CONTROL_TEMP_COUNT_SHIFT: u32 = 24;

pub const RC_ENABLE: Method = Method::three_d(0x1e94);
pub const VP_UPLOAD_FROM_ID: Method = Method::three_d(0x1e9c);
pub const VP_START_FROM_ID: Method = Method::three_d(0x1ea0);

pub const NV40_TEX_CACHE_CTL: Method = Method::three_d(0x1fd8);
pub const NV40_VP_ATTRIB_EN: Method = Method::three_d(0x1ff0);

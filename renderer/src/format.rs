// nvfx/renderer/src/format.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Mapping of picture formats and operators onto hardware encodings.

use crate::picture::{Op, PictFormat};
use fxhash::FxHashMap;

/// A texture encoding: the format field and the channel swizzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureFormat {
    pub format: u32,
    pub swizzle: u32,
}

/// Per-generation lookup tables from picture formats to hardware codes.
///
/// A format that is missing from a table is unsupported in that role.
pub struct FormatTables {
    surfaces: FxHashMap<PictFormat, u32>,
    textures: FxHashMap<PictFormat, TextureFormat>,
}

impl FormatTables {
    pub fn new(surfaces: &[(PictFormat, u32)], textures: &[(PictFormat, TextureFormat)])
               -> FormatTables {
        FormatTables {
            surfaces: surfaces.iter().cloned().collect(),
            textures: textures.iter().cloned().collect(),
        }
    }

    /// The render-target colour format for a destination picture.
    #[inline]
    pub fn surface_format(&self, format: PictFormat) -> Option<u32> {
        self.surfaces.get(&format).cloned()
    }

    #[inline]
    pub fn texture_format(&self, format: PictFormat) -> Option<TextureFormat> {
        self.textures.get(&format).cloned()
    }
}

/// Blend factor codes. Register values carry the code in both the colour and alpha halves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendFactor(pub u32);

impl BlendFactor {
    pub const ZERO: BlendFactor = BlendFactor(0x0000);
    pub const ONE: BlendFactor = BlendFactor(0x0001);
    pub const SRC_COLOR: BlendFactor = BlendFactor(0x0300);
    pub const ONE_MINUS_SRC_COLOR: BlendFactor = BlendFactor(0x0301);
    pub const SRC_ALPHA: BlendFactor = BlendFactor(0x0302);
    pub const ONE_MINUS_SRC_ALPHA: BlendFactor = BlendFactor(0x0303);
    pub const DST_ALPHA: BlendFactor = BlendFactor(0x0304);
    pub const ONE_MINUS_DST_ALPHA: BlendFactor = BlendFactor(0x0305);
    pub const DST_COLOR: BlendFactor = BlendFactor(0x0306);
    pub const ONE_MINUS_DST_COLOR: BlendFactor = BlendFactor(0x0307);
    pub const ALPHA_SATURATE: BlendFactor = BlendFactor(0x0308);

    /// The register value: the code in both halves.
    #[inline]
    pub fn packed(self) -> u32 {
        (self.0 << 16) | self.0
    }
}

/// How an operator combines source and destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendRule {
    /// The source factor or the destination factor reads source alpha.
    pub src_alpha: bool,
    /// The source factor reads destination alpha.
    pub dst_alpha: bool,
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

const fn rule(src_alpha: bool, dst_alpha: bool, src_factor: BlendFactor, dst_factor: BlendFactor)
              -> BlendRule {
    BlendRule { src_alpha, dst_alpha, src_factor, dst_factor }
}

static BLEND_RULES: [BlendRule; 13] = [
    // Clear
    rule(false, false, BlendFactor::ZERO, BlendFactor::ZERO),
    // Src
    rule(false, false, BlendFactor::ONE, BlendFactor::ZERO),
    // Dst
    rule(false, false, BlendFactor::ZERO, BlendFactor::ONE),
    // Over
    rule(true, false, BlendFactor::ONE, BlendFactor::ONE_MINUS_SRC_ALPHA),
    // OverReverse
    rule(false, true, BlendFactor::ONE_MINUS_DST_ALPHA, BlendFactor::ONE),
    // In
    rule(false, true, BlendFactor::DST_ALPHA, BlendFactor::ZERO),
    // InReverse
    rule(true, false, BlendFactor::ZERO, BlendFactor::SRC_ALPHA),
    // Out
    rule(false, true, BlendFactor::ONE_MINUS_DST_ALPHA, BlendFactor::ZERO),
    // OutReverse
    rule(true, false, BlendFactor::ZERO, BlendFactor::ONE_MINUS_SRC_ALPHA),
    // Atop
    rule(true, true, BlendFactor::DST_ALPHA, BlendFactor::ONE_MINUS_SRC_ALPHA),
    // AtopReverse
    rule(true, true, BlendFactor::ONE_MINUS_DST_ALPHA, BlendFactor::SRC_ALPHA),
    // Xor
    rule(true, true, BlendFactor::ONE_MINUS_DST_ALPHA, BlendFactor::ONE_MINUS_SRC_ALPHA),
    // Add
    rule(false, false, BlendFactor::ONE, BlendFactor::ONE),
];

/// The blend rule for an operator. Saturate and above have none.
#[inline]
pub fn blend_rule(op: Op) -> Option<BlendRule> {
    BLEND_RULES.get(op.0 as usize).cloned()
}

#[cfg(test)]
mod test {
    use crate::picture::Op;

    use super::{blend_rule, BlendFactor};

    #[test]
    fn test_add_rule() {
        let add = blend_rule(Op::ADD).unwrap();
        assert!(!add.src_alpha && !add.dst_alpha);
        assert_eq!(add.src_factor, BlendFactor::ONE);
        assert_eq!(add.dst_factor, BlendFactor::ONE);
    }

    #[test]
    fn test_saturate_and_above_have_no_rule() {
        for op in 13..=255 {
            assert_eq!(blend_rule(Op(op)), None);
        }
    }

    #[test]
    fn test_packing() {
        assert_eq!(BlendFactor::ONE_MINUS_SRC_ALPHA.packed(), 0x0303_0303);
        assert_eq!(BlendFactor::ZERO.packed(), 0);
    }
}

// nvfx/renderer/src/check.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deciding whether a composite can be done on the 3D engine at all.

use crate::error::{Fallback, Role};
use crate::format::{blend_rule, BlendFactor, BlendRule};
use crate::gen::{Generation, MAX_TEXTURE_SIZE};
use crate::picture::{Filter, Op, Picture, RepeatType};

/// Checks a composite against what `generation` can express. Has no side effects.
pub fn check_composite(generation: &dyn Generation,
                       op: Op,
                       src: &Picture,
                       mask: Option<&Picture>,
                       dst: &Picture)
                       -> Result<(), Fallback> {
    let rule = blend_rule(op).ok_or(Fallback::UnsupportedOp(op))?;
    if generation.tables().surface_format(dst.format).is_none() {
        return Err(Fallback::DestinationFormat(dst.format));
    }

    check_texture(generation, &rule, Role::Source, src, dst)?;

    if let Some(mask) = mask {
        if mask.is_component_alpha_rgb() && rule.src_alpha &&
                rule.src_factor != BlendFactor::ZERO {
            return Err(Fallback::ComponentAlphaSourceAlpha);
        }
        check_texture(generation, &rule, Role::Mask, mask, dst)?;
    }

    Ok(())
}

fn check_texture(generation: &dyn Generation,
                 rule: &BlendRule,
                 role: Role,
                 picture: &Picture,
                 dst: &Picture)
                 -> Result<(), Fallback> {
    let size = picture.drawable.ok_or(Fallback::NoDrawable(role))?;
    let (width, height) = (size.x(), size.y());
    if width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
        return Err(Fallback::TooLarge(role, width, height));
    }

    if generation.tables().texture_format(picture.format).is_none() {
        return Err(Fallback::TextureFormat(role, picture.format));
    }

    match picture.filter {
        Filter::Nearest | Filter::Bilinear => {}
        filter => return Err(Fallback::UnsupportedFilter(role, filter)),
    }

    if generation.restricts_repeat() && !(width == 1 && height == 1) && picture.repeat &&
            picture.repeat_type != RepeatType::None {
        return Err(Fallback::UnsupportedRepeat(role, picture.repeat_type));
    }

    // Outside a non-repeating texture the sampler returns opaque black for formats without
    // alpha, where transparent is wanted. Untransformed sources are assumed to be clipped.
    if rule.src_alpha && !picture.repeat && picture.transform.is_some() &&
            !picture.format.has_alpha() && dst.format.has_alpha() {
        return Err(Fallback::UntransformableOpaque(role));
    }

    Ok(())
}

// nvfx/renderer/src/blend.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Resolving an operator's blend rule against the destination format.

use crate::format::{BlendFactor, BlendRule};
use crate::picture::PictFormat;

/// The fixed-function blend configuration to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendState {
    /// Source replaces destination.
    Disabled,
    Enabled { src: BlendFactor, dst: BlendFactor },
}

impl BlendState {
    /// Rewrites the rule's factors for what the destination and mask can actually provide.
    ///
    /// Destinations without alpha read it as one. An 8-bit alpha destination is bound as a
    /// single-channel colour buffer, so its alpha is read as colour. With component alpha, or
    /// into such a destination, per-channel source alpha arrives in the colour channels.
    pub fn resolve(rule: &BlendRule, dst_format: PictFormat, component_alpha: bool)
                   -> BlendState {
        let mut src = rule.src_factor;
        let mut dst = rule.dst_factor;

        if rule.dst_alpha {
            if !dst_format.has_alpha() {
                if src == BlendFactor::DST_ALPHA {
                    src = BlendFactor::ONE;
                } else if src == BlendFactor::ONE_MINUS_DST_ALPHA {
                    src = BlendFactor::ZERO;
                }
            } else if dst_format == PictFormat::A8 {
                if src == BlendFactor::DST_ALPHA {
                    src = BlendFactor::DST_COLOR;
                } else if src == BlendFactor::ONE_MINUS_DST_ALPHA {
                    src = BlendFactor::ONE_MINUS_DST_COLOR;
                }
            }
        }

        if rule.src_alpha && (component_alpha || dst_format == PictFormat::A8) {
            if dst == BlendFactor::SRC_ALPHA {
                dst = BlendFactor::SRC_COLOR;
            } else if dst == BlendFactor::ONE_MINUS_SRC_ALPHA {
                dst = BlendFactor::ONE_MINUS_SRC_COLOR;
            }
        }

        if src == BlendFactor::ONE && dst == BlendFactor::ZERO {
            BlendState::Disabled
        } else {
            BlendState::Enabled { src, dst }
        }
    }
}

// nvfx/renderer/src/options.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Options that control how acceleration is performed.

/// Options fixed when the 3D engine is brought up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelOptions {
    /// Whether video ports use bicubic filtering when the scale factor allows it.
    pub video_bicubic: bool,
    /// The initial sync-to-vblank setting of new video ports.
    pub sync_to_vblank: bool,
    /// Whether chroma planes are stored with their byte pairs swapped, as on big-endian hosts.
    pub big_endian_chroma: bool,
}

impl Default for AccelOptions {
    #[inline]
    fn default() -> AccelOptions {
        AccelOptions {
            video_bicubic: true,
            sync_to_vblank: true,
            big_endian_chroma: cfg!(target_endian = "big"),
        }
    }
}

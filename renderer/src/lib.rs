// nvfx/renderer/src/lib.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Render acceleration and textured video on the NV30 and NV40 3D engines.
//!
//! `Accel` brings the engine up on a channel. Composites then go through `check_composite`,
//! `prepare_composite`, `composite` and `done_composite`; video frames through `put_image`.
//! Everything is expressed as command words appended to a `nvfx_gpu::PushBuffer`.

#[macro_use]
extern crate log;

pub mod accel;
pub mod blend;
pub mod check;
pub mod composite;
pub mod error;
pub mod filter;
pub mod format;
pub mod gen;
pub mod options;
pub mod picture;
pub mod regs;
pub mod shaders;
pub mod video;

pub use crate::accel::Accel;
pub use crate::options::AccelOptions;

#[cfg(test)]
mod tests;

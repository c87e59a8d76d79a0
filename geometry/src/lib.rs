// nvfx/geometry/src/lib.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Geometry primitives in the windowing system's number formats.
//!
//! Picture transforms and video source boxes arrive as 16.16 fixed-point values, and the
//! texture coordinates the 3D engine consumes must match the rendering extension's own
//! rounding exactly, so this crate does its arithmetic the way the server does rather than in
//! floating point.

pub mod fixed;
pub mod rect;
pub mod transform;
pub mod vector;

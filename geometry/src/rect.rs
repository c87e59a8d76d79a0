// nvfx/geometry/src/rect.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Axis-aligned boxes.

use crate::fixed::Fixed;
use crate::vector::{Vector2F, Vector2I};

/// An integer box with an inclusive upper-left and exclusive lower-right corner, the way clip
/// regions and drawables are described.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RectI {
    origin: Vector2I,
    lower_right: Vector2I,
}

impl RectI {
    #[inline]
    pub fn new(origin: Vector2I, size: Vector2I) -> RectI {
        RectI { origin, lower_right: origin + size }
    }

    #[inline]
    pub fn from_points(origin: Vector2I, lower_right: Vector2I) -> RectI {
        RectI { origin, lower_right }
    }

    #[inline]
    pub fn origin(self) -> Vector2I {
        self.origin
    }

    #[inline]
    pub fn lower_right(self) -> Vector2I {
        self.lower_right
    }

    #[inline]
    pub fn size(self) -> Vector2I {
        self.lower_right - self.origin
    }

    #[inline]
    pub fn min_x(self) -> i32 {
        self.origin.x()
    }

    #[inline]
    pub fn min_y(self) -> i32 {
        self.origin.y()
    }

    #[inline]
    pub fn max_x(self) -> i32 {
        self.lower_right.x()
    }

    #[inline]
    pub fn max_y(self) -> i32 {
        self.lower_right.y()
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max_x() - self.min_x()
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max_y() - self.min_y()
    }
}

/// A box in 16.16 fixed point. Video source rectangles arrive in this form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RectX {
    pub origin: [Fixed; 2],
    pub lower_right: [Fixed; 2],
}

impl RectX {
    #[inline]
    pub fn from_int_rect(rect: RectI) -> RectX {
        RectX {
            origin: [Fixed::from_int(rect.min_x()), Fixed::from_int(rect.min_y())],
            lower_right: [Fixed::from_int(rect.max_x()), Fixed::from_int(rect.max_y())],
        }
    }

    #[inline]
    pub fn origin_f32(&self) -> Vector2F {
        Vector2F::new(self.origin[0].to_f32(), self.origin[1].to_f32())
    }

    #[inline]
    pub fn lower_right_f32(&self) -> Vector2F {
        Vector2F::new(self.lower_right[0].to_f32(), self.lower_right[1].to_f32())
    }
}

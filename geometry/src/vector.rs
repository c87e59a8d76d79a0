// nvfx/geometry/src/vector.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Two-component vectors.

use std::ops::{Add, Mul, Sub};

/// 2D points with 32-bit signed integer coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vector2I {
    x: i32,
    y: i32,
}

impl Vector2I {
    #[inline]
    pub fn new(x: i32, y: i32) -> Vector2I {
        Vector2I { x, y }
    }

    #[inline]
    pub fn zero() -> Vector2I {
        Vector2I::default()
    }

    #[inline]
    pub fn x(self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> i32 {
        self.y
    }

    #[inline]
    pub fn to_f32(self) -> Vector2F {
        Vector2F::new(self.x as f32, self.y as f32)
    }

    /// Packs the vector as two signed 16-bit halves, `y` in the high half.
    #[inline]
    pub fn pack_i16(self) -> u32 {
        ((self.y as u32) << 16) | (self.x as u32 & 0xffff)
    }
}

impl Add<Vector2I> for Vector2I {
    type Output = Vector2I;
    #[inline]
    fn add(self, other: Vector2I) -> Vector2I {
        Vector2I::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub<Vector2I> for Vector2I {
    type Output = Vector2I;
    #[inline]
    fn sub(self, other: Vector2I) -> Vector2I {
        Vector2I::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<i32> for Vector2I {
    type Output = Vector2I;
    #[inline]
    fn mul(self, factor: i32) -> Vector2I {
        Vector2I::new(self.x * factor, self.y * factor)
    }
}

/// 2D points with 32-bit floating point coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2F {
    x: f32,
    y: f32,
}

impl Vector2F {
    #[inline]
    pub fn new(x: f32, y: f32) -> Vector2F {
        Vector2F { x, y }
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.y
    }

    #[inline]
    pub fn scale_xy(self, factors: Vector2F) -> Vector2F {
        Vector2F::new(self.x * factors.x, self.y * factors.y)
    }
}

impl Add<Vector2F> for Vector2F {
    type Output = Vector2F;
    #[inline]
    fn add(self, other: Vector2F) -> Vector2F {
        Vector2F::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub<Vector2F> for Vector2F {
    type Output = Vector2F;
    #[inline]
    fn sub(self, other: Vector2F) -> Vector2F {
        Vector2F::new(self.x - other.x, self.y - other.y)
    }
}

// nvfx/geometry/src/fixed.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! 16.16 signed fixed-point numbers.

use std::ops::{Add, Neg, Sub};

/// A 16.16 signed fixed-point number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(pub i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(0x10000);

    #[inline]
    pub fn from_int(value: i32) -> Fixed {
        Fixed(value << 16)
    }

    /// Truncating conversion, the same as the server's `XDoubleToFixed`.
    #[inline]
    pub fn from_f64(value: f64) -> Fixed {
        Fixed((value * 65536.0) as i32)
    }

    /// The integer part, rounded towards negative infinity.
    #[inline]
    pub fn to_int(self) -> i32 {
        self.0 >> 16
    }

    /// The fractional part, in units of 1/65536.
    #[inline]
    pub fn frac(self) -> i32 {
        self.0 & 0xffff
    }

    /// Integer part plus fraction, each narrowed to single precision and summed in double.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.to_int() as f32 as f64 + self.frac() as f32 as f64 / 65536.0
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }
}

impl Add<Fixed> for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, other: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(other.0))
    }
}

impl Sub<Fixed> for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, other: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(other.0))
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        Fixed(self.0.wrapping_neg())
    }
}

// nvfx/geometry/src/transform.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Projective picture transforms in 16.16 fixed point.

use crate::fixed::Fixed;
use crate::vector::Vector2I;

const MAX_FIXED_48_16: i64 = i32::MAX as i64;
const MIN_FIXED_48_16: i64 = i32::MIN as i64;

/// A 3×3 projective matrix, stored row-major, as attached to a picture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    pub matrix: [[Fixed; 3]; 3],
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        Transform::identity()
    }
}

impl Transform {
    #[inline]
    pub fn identity() -> Transform {
        Transform {
            matrix: [
                [Fixed::ONE, Fixed::ZERO, Fixed::ZERO],
                [Fixed::ZERO, Fixed::ONE, Fixed::ZERO],
                [Fixed::ZERO, Fixed::ZERO, Fixed::ONE],
            ],
        }
    }

    #[inline]
    pub fn from_translation(x: Fixed, y: Fixed) -> Transform {
        let mut transform = Transform::identity();
        transform.matrix[0][2] = x;
        transform.matrix[1][2] = y;
        transform
    }

    #[inline]
    pub fn from_scale(x: Fixed, y: Fixed) -> Transform {
        let mut transform = Transform::identity();
        transform.matrix[0][0] = x;
        transform.matrix[1][1] = y;
        transform
    }

    /// Transforms the homogeneous point `(x, y, w)` and divides through by the resulting `w`.
    ///
    /// Each row is accumulated as a sum of `(m * v) >> 16` partial products in 48.16 precision.
    /// Returns `None` if any intermediate leaves the 16.16 range or the projected `w` is zero.
    pub fn transform_vector(&self, vector: [Fixed; 3]) -> Option<[Fixed; 2]> {
        let mut result = [0i64; 3];
        for (row, value) in self.matrix.iter().zip(result.iter_mut()) {
            let mut sum = 0i64;
            for (m, v) in row.iter().zip(vector.iter()) {
                sum += (m.0 as i64 * v.0 as i64) >> 16;
            }
            if sum > MAX_FIXED_48_16 || sum < MIN_FIXED_48_16 {
                return None;
            }
            *value = sum;
        }

        if result[2] == 0 {
            return None;
        }

        let mut projected = [Fixed::ZERO; 2];
        for (out, &value) in projected.iter_mut().zip(result.iter()) {
            let quotient = (value << 16) / result[2];
            if quotient > MAX_FIXED_48_16 || quotient < MIN_FIXED_48_16 {
                return None;
            }
            *out = Fixed(quotient as i32);
        }
        Some(projected)
    }

    /// Transforms an integer pixel position.
    #[inline]
    pub fn transform_point(&self, point: Vector2I) -> Option<[Fixed; 2]> {
        self.transform_vector([Fixed::from_int(point.x()), Fixed::from_int(point.y()), Fixed::ONE])
    }
}

#[cfg(test)]
mod test {
    use crate::fixed::Fixed;
    use crate::vector::Vector2I;
    use quickcheck;

    use super::Transform;

    #[test]
    fn test_identity_preserves_points() {
        quickcheck::quickcheck(prop_identity as fn(i16, i16) -> bool);

        fn prop_identity(x: i16, y: i16) -> bool {
            let point = Vector2I::new(x as i32, y as i32);
            Transform::identity().transform_point(point) ==
                Some([Fixed::from_int(x as i32), Fixed::from_int(y as i32)])
        }
    }

    #[test]
    fn test_translation_and_scale() {
        let translation = Transform::from_translation(Fixed::from_int(3), Fixed(-0x8000));
        assert_eq!(translation.transform_point(Vector2I::new(10, 10)),
                   Some([Fixed::from_int(13), Fixed(0x98000)]));

        let scale = Transform::from_scale(Fixed(0x8000), Fixed::from_int(2));
        assert_eq!(scale.transform_point(Vector2I::new(7, -4)),
                   Some([Fixed(0x38000), Fixed::from_int(-8)]));
    }

    #[test]
    fn test_perspective_divide() {
        let mut transform = Transform::identity();
        transform.matrix[2][2] = Fixed::from_int(2);
        assert_eq!(transform.transform_point(Vector2I::new(8, 5)),
                   Some([Fixed::from_int(4), Fixed(0x28000)]));
    }

    #[test]
    fn test_degenerate_w_fails() {
        let mut transform = Transform::identity();
        transform.matrix[2][2] = Fixed::ZERO;
        assert_eq!(transform.transform_point(Vector2I::new(1, 1)), None);
    }

    #[test]
    fn test_overflow_fails() {
        let transform = Transform::from_scale(Fixed::from_int(30000), Fixed::ONE);
        assert_eq!(transform.transform_point(Vector2I::new(30000, 0)), None);
    }
}

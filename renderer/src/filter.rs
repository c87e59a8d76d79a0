// nvfx/renderer/src/filter.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The lookup table behind bicubic video scaling.
//!
//! Cubic filtering is done as two bilinear fetches per axis ("Fast Third-Order Texture
//! Filtering", Sigg and Hadwiger, GPU Gems 2). For each subtexel position the table holds the
//! weight of the first fetch and the offsets of both fetches, as signed 8-bit fractions of 127.
//!
//! The kernel is the Mitchell-Netravali cubic with B = 0.75 and C = (1 - B) / 2. Intermediate
//! results are rounded to single precision exactly where the hardware table was generated with
//! them, so the table is reproduced byte for byte.

/// The number of subtexel positions.
pub const FILTER_TABLE_ENTRIES: usize = 512;
/// Four signed bytes per entry.
pub const FILTER_TABLE_BYTES: usize = FILTER_TABLE_ENTRIES * 4;
/// The size of the buffer the table is uploaded into.
pub const FILTER_TABLE_BUFFER_SIZE: u64 = (FILTER_TABLE_ENTRIES * 16) as u64;

const B: f64 = 0.75;
const C: f64 = (1.0 - B) / 2.0;

/// The Mitchell-Netravali reconstruction filter.
pub fn filter_func(x: f32) -> f32 {
    let x1 = (x as f64).abs();
    let x2 = x1 * x1;
    let x3 = x1 * x2;
    let value = if x1 < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * x3 + (-18.0 + 12.0 * B + 6.0 * C) * x2 + (6.0 - 2.0 * B)) /
            6.0
    } else {
        ((-B - 6.0 * C) * x3 + (6.0 * B + 30.0 * C) * x2 + (-12.0 * B - 48.0 * C) * x1 +
         (8.0 * B + 24.0 * C)) / 6.0
    };
    value as f32
}

#[inline]
fn to_signed_byte(value: f64) -> i8 {
    ((value as f32) as f64 * 127.0) as i8
}

/// The table entry for subtexel position `index`: first-fetch weight, second-fetch offset,
/// first-fetch offset and zero.
pub fn filter_table_entry(index: usize) -> [i8; 4] {
    let x = ((index as f64 + 0.5) / FILTER_TABLE_ENTRIES as f64) as f32;
    let w0 = filter_func((x as f64 + 1.0) as f32);
    let w1 = filter_func(x);
    let w2 = filter_func((x as f64 - 1.0) as f32);
    let w3 = filter_func((x as f64 - 2.0) as f32);

    [
        to_signed_byte((w0 + w1) as f64),
        to_signed_byte(1.0 - x as f64 + (w3 / (w2 + w3)) as f64),
        to_signed_byte(1.0 + x as f64 - (w1 / (w0 + w1)) as f64),
        0,
    ]
}

/// Writes the whole table into `out`, which must hold at least `FILTER_TABLE_BYTES` bytes.
pub fn fill_filter_table(out: &mut [u8]) {
    for (index, entry) in out[..FILTER_TABLE_BYTES].chunks_mut(4).enumerate() {
        for (byte, &value) in entry.iter_mut().zip(filter_table_entry(index).iter()) {
            *byte = value as u8;
        }
    }
}

pub fn compute_filter_table() -> Vec<u8> {
    let mut table = vec![0; FILTER_TABLE_BYTES];
    fill_filter_table(&mut table);
    table
}

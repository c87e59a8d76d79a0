// nvfx/renderer/src/picture.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pictures and pixmaps as described by the rendering extension.

use nvfx_geometry::transform::Transform;
use nvfx_geometry::vector::Vector2I;
use nvfx_gpu::BufferObject;
use std::fmt::{self, Debug, Formatter};

pub const PICT_TYPE_A: u32 = 1;
pub const PICT_TYPE_ARGB: u32 = 2;
pub const PICT_TYPE_ABGR: u32 = 3;

/// A pixel format code, packed as bits per pixel, type, then four channel widths.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PictFormat(pub u32);

impl PictFormat {
    pub const A8R8G8B8: PictFormat = PictFormat::new(32, PICT_TYPE_ARGB, 8, 8, 8, 8);
    pub const X8R8G8B8: PictFormat = PictFormat::new(32, PICT_TYPE_ARGB, 0, 8, 8, 8);
    pub const A8B8G8R8: PictFormat = PictFormat::new(32, PICT_TYPE_ABGR, 8, 8, 8, 8);
    pub const X8B8G8R8: PictFormat = PictFormat::new(32, PICT_TYPE_ABGR, 0, 8, 8, 8);
    pub const R5G6B5: PictFormat = PictFormat::new(16, PICT_TYPE_ARGB, 0, 5, 6, 5);
    pub const B5G6R5: PictFormat = PictFormat::new(16, PICT_TYPE_ABGR, 0, 5, 6, 5);
    pub const A1R5G5B5: PictFormat = PictFormat::new(16, PICT_TYPE_ARGB, 1, 5, 5, 5);
    pub const X1R5G5B5: PictFormat = PictFormat::new(16, PICT_TYPE_ARGB, 0, 5, 5, 5);
    pub const A1B5G5R5: PictFormat = PictFormat::new(16, PICT_TYPE_ABGR, 1, 5, 5, 5);
    pub const X1B5G5R5: PictFormat = PictFormat::new(16, PICT_TYPE_ABGR, 0, 5, 5, 5);
    pub const A4R4G4B4: PictFormat = PictFormat::new(16, PICT_TYPE_ARGB, 4, 4, 4, 4);
    pub const X4R4G4B4: PictFormat = PictFormat::new(16, PICT_TYPE_ARGB, 0, 4, 4, 4);
    pub const A4B4G4R4: PictFormat = PictFormat::new(16, PICT_TYPE_ABGR, 4, 4, 4, 4);
    pub const X4B4G4R4: PictFormat = PictFormat::new(16, PICT_TYPE_ABGR, 0, 4, 4, 4);
    pub const A8: PictFormat = PictFormat::new(8, PICT_TYPE_A, 8, 0, 0, 0);

    pub const ALL: [PictFormat; 15] = [
        PictFormat::A8R8G8B8, PictFormat::X8R8G8B8, PictFormat::A8B8G8R8, PictFormat::X8B8G8R8,
        PictFormat::R5G6B5, PictFormat::B5G6R5,
        PictFormat::A1R5G5B5, PictFormat::X1R5G5B5, PictFormat::A1B5G5R5, PictFormat::X1B5G5R5,
        PictFormat::A4R4G4B4, PictFormat::X4R4G4B4, PictFormat::A4B4G4R4, PictFormat::X4B4G4R4,
        PictFormat::A8,
    ];

    #[inline]
    pub const fn new(bpp: u32, ty: u32, a: u32, r: u32, g: u32, b: u32) -> PictFormat {
        PictFormat((bpp << 24) | (ty << 16) | (a << 12) | (r << 8) | (g << 4) | b)
    }

    #[inline]
    pub fn bpp(self) -> u32 {
        self.0 >> 24
    }

    #[inline]
    pub fn ty(self) -> u32 {
        (self.0 >> 16) & 0xff
    }

    #[inline]
    pub fn alpha_bits(self) -> u32 {
        (self.0 >> 12) & 0x0f
    }

    /// The packed widths of the colour channels. Zero for alpha-only formats.
    #[inline]
    pub fn rgb(self) -> u32 {
        self.0 & 0xfff
    }

    #[inline]
    pub fn has_alpha(self) -> bool {
        self.alpha_bits() != 0
    }
}

impl Debug for PictFormat {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "PictFormat(0x{:08x})", self.0)
    }
}

/// A compositing operator index. Only the first thirteen have blend rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Op(pub u8);

impl Op {
    pub const CLEAR: Op = Op(0);
    pub const SRC: Op = Op(1);
    pub const DST: Op = Op(2);
    pub const OVER: Op = Op(3);
    pub const OVER_REVERSE: Op = Op(4);
    pub const IN: Op = Op(5);
    pub const IN_REVERSE: Op = Op(6);
    pub const OUT: Op = Op(7);
    pub const OUT_REVERSE: Op = Op(8);
    pub const ATOP: Op = Op(9);
    pub const ATOP_REVERSE: Op = Op(10);
    pub const XOR: Op = Op(11);
    pub const ADD: Op = Op(12);
    pub const SATURATE: Op = Op(13);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatType {
    None,
    Normal,
    Pad,
    Reflect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Bilinear,
    Fast,
    Good,
    Best,
    Convolution,
}

/// A picture: pixel data plus the attributes that control how it is sampled.
#[derive(Clone, Debug, PartialEq)]
pub struct Picture {
    pub format: PictFormat,
    pub transform: Option<Transform>,
    pub repeat: bool,
    pub repeat_type: RepeatType,
    pub filter: Filter,
    pub component_alpha: bool,
    /// The size of the backing drawable. Solid fills and gradients have none.
    pub drawable: Option<Vector2I>,
}

impl Picture {
    pub fn new(format: PictFormat, size: Vector2I) -> Picture {
        Picture {
            format,
            transform: None,
            repeat: false,
            repeat_type: RepeatType::None,
            filter: Filter::Nearest,
            component_alpha: false,
            drawable: Some(size),
        }
    }

    /// A picture with no drawable, such as a solid fill or a gradient.
    pub fn source_only(format: PictFormat) -> Picture {
        Picture { drawable: None, ..Picture::new(format, Vector2I::zero()) }
    }

    #[inline]
    pub fn with_repeat(mut self, repeat_type: RepeatType) -> Picture {
        self.repeat = true;
        self.repeat_type = repeat_type;
        self
    }

    #[inline]
    pub fn with_filter(mut self, filter: Filter) -> Picture {
        self.filter = filter;
        self
    }

    #[inline]
    pub fn with_transform(mut self, transform: Transform) -> Picture {
        self.transform = Some(transform);
        self
    }

    #[inline]
    pub fn with_component_alpha(mut self) -> Picture {
        self.component_alpha = true;
        self
    }

    /// Whether the mask carries separate per-channel alpha.
    #[inline]
    pub fn is_component_alpha_rgb(&self) -> bool {
        self.component_alpha && self.format.rgb() != 0
    }
}

/// The pixmap backing a picture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pixmap {
    pub size: Vector2I,
    /// Bytes per row.
    pub pitch: u32,
    pub bits_per_pixel: u32,
    pub bo: BufferObject,
}

impl Pixmap {
    #[inline]
    pub fn width(&self) -> u32 {
        self.size.x() as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.y() as u32
    }
}

// nvfx/renderer/src/error.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The ways an acceleration request can fail.
//!
//! A `Fallback` is routine and tells the caller to use the software path for this one operation.
//! `PrepareError` and `VideoError` are transient. An `InitError` disables acceleration for the
//! rest of the session.

use crate::picture::{Filter, Op, PictFormat, RepeatType};
use nvfx_gpu::AllocError;
use nvfx_resources::program::ProgramError;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Which picture of a composite a fallback refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Source,
    Mask,
}

/// Reasons a composite cannot be expressed on the 3D engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fallback {
    /// The operator has no blend rule.
    UnsupportedOp(Op),
    /// The destination cannot be bound as a render target.
    DestinationFormat(PictFormat),
    /// Solid fills and gradients have no drawable to sample.
    NoDrawable(Role),
    /// The picture exceeds the texture size limit.
    TooLarge(Role, i32, i32),
    /// The picture cannot be sampled as a texture.
    TextureFormat(Role, PictFormat),
    UnsupportedFilter(Role, Filter),
    /// The earlier generation only repeats 1×1 pictures.
    UnsupportedRepeat(Role, RepeatType),
    /// A transformed, non-repeating picture without alpha would sample opaque black outside its
    /// bounds where transparent black is required.
    UntransformableOpaque(Role),
    /// Per-channel mask alpha combined with an operator that needs source alpha in the source
    /// factor.
    ComponentAlphaSourceAlpha,
}

/// Transient failures while programming a composite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PrepareError {
    /// The push buffer could not make room for the state.
    NoSpace,
    /// The operator has no blend rule.
    UnsupportedOp(Op),
    /// The destination cannot be bound as a render target.
    DestinationFormat(PictFormat),
    /// A picture cannot be sampled as a texture.
    TextureFormat(PictFormat),
    /// The referenced buffers could not be made resident.
    Validation,
}

/// Failures of the textured-video path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VideoError {
    /// This generation has no textured-video support.
    Unsupported,
    /// The drawn size exceeds the render-target limit.
    DrawTooLarge(u16, u16),
    /// There is no render-target format for this pixel depth.
    NoSurfaceFormat(u32),
    NoSpace,
    /// The filter table could not be allocated or filled.
    FilterTable(AllocError),
    Validation,
}

/// The protocol status a video failure is reported to the client as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XvStatus {
    BadAlloc,
    BadImplementation,
    BadValue,
    BadMatch,
}

/// Errors that can occur when getting or setting a port attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeError {
    /// The value is outside the attribute's range.
    BadValue,
    /// The port has no such attribute, or it cannot be accessed this way.
    BadMatch,
}

/// Fatal failures while bringing up the 3D engine.
#[derive(Debug)]
pub enum InitError {
    /// The chipset architecture has no 3D backend here.
    UnsupportedArchitecture(u32),
    /// The chipset revision has no known 3D class.
    UnknownChipset(u32),
    /// A shader program could not be loaded.
    Program(ProgramError),
    /// The 3D object could not be created.
    Object(AllocError),
    /// The shader buffer could not be allocated or mapped.
    Alloc(AllocError),
    NoSpace,
    /// The shader programs do not fit in the shader buffer.
    ShaderUpload { offset: u32, size: u32 },
}

impl VideoError {
    pub fn status(&self) -> XvStatus {
        match *self {
            VideoError::DrawTooLarge(..) |
            VideoError::FilterTable(_) |
            VideoError::Validation => XvStatus::BadAlloc,
            VideoError::Unsupported |
            VideoError::NoSurfaceFormat(_) |
            VideoError::NoSpace => XvStatus::BadImplementation,
        }
    }
}

impl AttributeError {
    #[inline]
    pub fn status(&self) -> XvStatus {
        match *self {
            AttributeError::BadValue => XvStatus::BadValue,
            AttributeError::BadMatch => XvStatus::BadMatch,
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            Role::Source => formatter.write_str("src picture"),
            Role::Mask => formatter.write_str("mask picture"),
        }
    }
}

impl Display for Fallback {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            Fallback::UnsupportedOp(op) => write!(formatter, "unsupported blend op 0x{:x}", op.0),
            Fallback::DestinationFormat(format) => {
                write!(formatter, "dst picture format 0x{:08x} not supported", format.0)
            }
            Fallback::NoDrawable(role) => {
                write!(formatter, "{}: solid and gradient pictures unsupported", role)
            }
            Fallback::TooLarge(role, width, height) => {
                write!(formatter, "{}: picture too large, {}x{}", role, width, height)
            }
            Fallback::TextureFormat(role, format) => {
                write!(formatter, "{}: picture format 0x{:08x} not supported", role, format.0)
            }
            Fallback::UnsupportedFilter(role, filter) => {
                write!(formatter, "{}: filter {:?} not supported", role, filter)
            }
            Fallback::UnsupportedRepeat(role, repeat_type) => {
                write!(formatter, "{}: repeat {:?} not supported", role, repeat_type)
            }
            Fallback::UntransformableOpaque(role) => {
                write!(formatter, "{}: REPEAT_NONE unsupported for XRGB source", role)
            }
            Fallback::ComponentAlphaSourceAlpha => formatter.write_str("mask CA + SA"),
        }
    }
}

impl Error for Fallback {}

impl Display for PrepareError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            PrepareError::NoSpace => formatter.write_str("no push buffer space"),
            PrepareError::UnsupportedOp(op) => {
                write!(formatter, "no blend rule for op 0x{:x}", op.0)
            }
            PrepareError::DestinationFormat(format) => {
                write!(formatter, "no surface format for 0x{:08x}", format.0)
            }
            PrepareError::TextureFormat(format) => {
                write!(formatter, "no texture format for 0x{:08x}", format.0)
            }
            PrepareError::Validation => formatter.write_str("buffer validation failed"),
        }
    }
}

impl Error for PrepareError {}

impl Display for VideoError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            VideoError::Unsupported => formatter.write_str("textured video unsupported"),
            VideoError::DrawTooLarge(width, height) => {
                write!(formatter, "drawn size {}x{} too large", width, height)
            }
            VideoError::NoSurfaceFormat(bpp) => {
                write!(formatter, "no surface format for {} bits per pixel", bpp)
            }
            VideoError::NoSpace => formatter.write_str("no push buffer space"),
            VideoError::FilterTable(ref error) => write!(formatter, "filter table: {}", error),
            VideoError::Validation => formatter.write_str("buffer validation failed"),
        }
    }
}

impl Error for VideoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            VideoError::FilterTable(ref error) => Some(error),
            _ => None,
        }
    }
}

impl Display for AttributeError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            AttributeError::BadValue => formatter.write_str("attribute value out of range"),
            AttributeError::BadMatch => formatter.write_str("no such attribute"),
        }
    }
}

impl Error for AttributeError {}

impl Display for InitError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            InitError::UnsupportedArchitecture(chipset) => {
                write!(formatter, "no 3D backend for chipset 0x{:02x}", chipset)
            }
            InitError::UnknownChipset(chipset) => {
                write!(formatter, "unknown chipset nv{:02x}", chipset)
            }
            InitError::Program(ref error) => write!(formatter, "shader program: {}", error),
            InitError::Object(ref error) => write!(formatter, "3D object: {}", error),
            InitError::Alloc(ref error) => write!(formatter, "shader buffer: {}", error),
            InitError::NoSpace => formatter.write_str("no push buffer space"),
            InitError::ShaderUpload { offset, size } => {
                write!(formatter,
                       "{} byte program at offset {} overflows the shader buffer",
                       size,
                       offset)
            }
        }
    }
}

impl Error for InitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            InitError::Program(ref error) => Some(error),
            InitError::Object(ref error) | InitError::Alloc(ref error) => Some(error),
            _ => None,
        }
    }
}

impl From<ProgramError> for InitError {
    #[inline]
    fn from(error: ProgramError) -> InitError {
        InitError::Program(error)
    }
}

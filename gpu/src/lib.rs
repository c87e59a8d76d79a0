// nvfx/gpu/src/lib.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Minimal abstractions over a GPU channel: the push buffer that command words are appended
//! to, and the allocator that hands out buffer objects.
//!
//! The command-stream backend only ever talks to these traits. A kernel-backed implementation
//! lives with the driver; `recording` provides an in-memory one that keeps every word.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

use std::error::Error;
use std::fmt::{self, Display, Formatter};

pub mod recording;

/// The subchannel the 3D object is bound to.
pub const SUBC_3D: u8 = 7;
/// The subchannel the 2D blitter object is bound to.
pub const SUBC_BLIT: u8 = 3;

/// The object-binding method, present on every subchannel.
pub const METHOD_OBJECT: u16 = 0x0000;

/// A method (register) address on a subchannel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Method {
    pub subchannel: u8,
    pub offset: u16,
}

impl Method {
    #[inline]
    pub const fn new(subchannel: u8, offset: u16) -> Method {
        Method { subchannel, offset }
    }

    /// A method on the 3D subchannel.
    #[inline]
    pub const fn three_d(offset: u16) -> Method {
        Method::new(SUBC_3D, offset)
    }

    /// The incrementing-method header announcing `count` data words.
    #[inline]
    pub fn header(self, count: u32) -> u32 {
        (count << 18) | ((self.subchannel as u32) << 13) | self.offset as u32
    }
}

bitflags! {
    /// Placement and access requested when allocating a buffer object.
    pub struct BufferFlags: u32 {
        const VRAM = 0x0000_0001;
        const GART = 0x0000_0002;
        const MAP  = 0x8000_0000;
    }
}

bitflags! {
    /// How a buffer object is referenced by a relocated command word.
    pub struct RelocFlags: u32 {
        const VRAM = 0x0000_0001;
        const GART = 0x0000_0002;
        const RD   = 0x0000_0100;
        const WR   = 0x0000_0200;
        const RDWR = Self::RD.bits | Self::WR.bits;
        /// Add the low 32 bits of the buffer's GPU address to the data word.
        const LOW  = 0x0000_1000;
        /// OR the data word with `vor` if the buffer is in VRAM, `tor` otherwise.
        const OR   = 0x0000_4000;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u64);

/// A buffer object as seen by the command stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferObject {
    pub id: BufferId,
    pub size: u64,
    /// The GPU virtual address of the buffer.
    pub offset: u64,
    /// The memory domain the buffer currently lives in.
    pub domain: BufferFlags,
}

/// A command word whose final value depends on where a buffer object ends up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reloc {
    pub data: u32,
    pub flags: RelocFlags,
    pub vor: u32,
    pub tor: u32,
}

impl Reloc {
    /// A reference to `data` bytes into the buffer.
    #[inline]
    pub fn low(data: u32, flags: RelocFlags) -> Reloc {
        Reloc { data, flags: flags | RelocFlags::LOW, vor: 0, tor: 0 }
    }

    /// A word that gets `vor` or `tor` OR'd in depending on the buffer's domain.
    #[inline]
    pub fn or(data: u32, flags: RelocFlags, vor: u32, tor: u32) -> Reloc {
        Reloc { data, flags: flags | RelocFlags::OR, vor, tor }
    }

    /// Computes the word the hardware will see for the buffer at its current placement.
    pub fn resolve(&self, bo: &BufferObject) -> u32 {
        let mut word = self.data;
        if self.flags.contains(RelocFlags::LOW) {
            word = word.wrapping_add(bo.offset as u32);
        }
        if self.flags.contains(RelocFlags::OR) {
            if bo.domain.contains(BufferFlags::VRAM) {
                word |= self.vor;
            } else {
                word |= self.tor;
            }
        }
        word
    }
}

/// A buffer-validation context: the set of buffers that must be resident while a batch of
/// commands executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufCtxId(pub u64);

/// An object instantiated on the channel, such as the 3D engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuObject {
    pub handle: u32,
    pub class: u32,
}

/// Per-channel handles the backend needs to address memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Channel {
    /// DMA object covering video memory.
    pub vram: u32,
    /// DMA object covering the GART aperture.
    pub gart: u32,
    /// The notifier object.
    pub notify: u32,
    /// The validation context used for rendering.
    pub bufctx: BufCtxId,
}

/// The command-stream transport.
pub trait PushBuffer {
    /// Ensures room for `words` more words. Returns false if the space cannot be made.
    fn space(&mut self, words: usize) -> bool;
    /// Drops the buffer references accumulated since the last submission.
    fn reset(&mut self);
    fn push(&mut self, word: u32);
    /// Emits a word referencing `bo`, recording a relocation.
    fn push_reloc(&mut self, bo: &BufferObject, reloc: Reloc);
    fn bind_bufctx(&mut self, bufctx: Option<BufCtxId>);
    /// Makes every referenced buffer resident.
    fn validate(&mut self) -> Result<(), PushError>;
    /// Submits the pending commands.
    fn kick(&mut self);

    #[inline]
    fn push_f32(&mut self, value: f32) {
        self.push(value.to_bits())
    }

    #[inline]
    fn begin(&mut self, method: Method, count: u32) {
        self.push(method.header(count))
    }
}

/// Buffer-object and engine-object management.
pub trait Allocator {
    fn allocate(&mut self, size: u64, flags: BufferFlags) -> Result<BufferObject, AllocError>;
    /// Returns a CPU mapping of the whole buffer.
    fn map(&mut self, bo: &BufferObject) -> Result<&mut [u8], AllocError>;
    fn create_object(&mut self, class: u32) -> Result<GpuObject, AllocError>;
}

/// Errors that can occur when validating a push buffer.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PushError {
    /// The referenced buffers could not all be made resident.
    Validation,
}

/// Errors that can occur when allocating buffers or objects.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AllocError {
    /// There was not enough memory in the requested domains.
    OutOfMemory,
    /// The buffer could not be mapped for CPU access.
    MapFailed,
    /// The buffer is not known to this allocator.
    UnknownBuffer,
    /// The channel refused to instantiate an object of this class.
    ObjectCreation(u32),
}

impl Display for PushError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            PushError::Validation => formatter.write_str("push buffer validation failed"),
        }
    }
}

impl Error for PushError {}

impl Display for AllocError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            AllocError::OutOfMemory => formatter.write_str("out of memory"),
            AllocError::MapFailed => formatter.write_str("failed to map buffer"),
            AllocError::UnknownBuffer => formatter.write_str("unknown buffer object"),
            AllocError::ObjectCreation(class) => {
                write!(formatter, "failed to create object of class 0x{:04x}", class)
            }
        }
    }
}

impl Error for AllocError {}

// nvfx/renderer/src/tests/mod.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end tests against the recording channel.

use crate::accel::Accel;
use crate::options::AccelOptions;
use crate::picture::Pixmap;
use crate::shaders::{FragmentProgramId, RENDER_VERTEX_PATH, VIDEO_VERTEX_PATH};
use crate::shaders::YV12_BILINEAR_PATH;
use nvfx_geometry::vector::Vector2I;
use nvfx_gpu::recording::{Command, HeapAllocator, RecordingPushBuffer};
use nvfx_gpu::{Allocator, BufCtxId, BufferFlags, Channel, Method};
use nvfx_resources::program::{FragmentProgram, VertexProgram};
use nvfx_resources::MemoryResourceLoader;

mod composite;

pub(crate) type TestAccel = Accel<RecordingPushBuffer, HeapAllocator>;

pub(crate) const CHANNEL: Channel = Channel {
    vram: 0xd8000001,
    gart: 0xd8000002,
    notify: 0xd8000003,
    bufctx: BufCtxId(1),
};

pub(crate) const NV30_BICUBIC_PATH: &str = "shaders/nv30/yv12_bicubic.fp";
pub(crate) const NV40_BICUBIC_PATH: &str = "shaders/nv40/yv12_bicubic.fp";

pub(crate) const RENDER_VERTEX_INSTRUCTIONS: usize = 3;
pub(crate) const VIDEO_VERTEX_INSTRUCTIONS: usize = 2;

/// A fragment program whose words identify it by `tag`.
pub(crate) fn fragment_program(tag: u32, instructions: usize) -> FragmentProgram {
    FragmentProgram {
        num_regs: 2 + tag % 3,
        data: (0..instructions as u32 * 4).map(|word| (tag << 16) | word | 0x81).collect(),
    }
}

pub(crate) fn vertex_program(tag: u32, instructions: usize) -> VertexProgram {
    VertexProgram {
        input_mask: 0x0000_0101 * tag,
        output_mask: 0x0000_4000 | tag,
        data: (0..instructions as u32 * 4).map(|word| (tag << 24) | word).collect(),
    }
}

/// Every program either generation loads, each two instructions long.
pub(crate) fn resources() -> MemoryResourceLoader {
    resources_with_fragment_size(2)
}

pub(crate) fn resources_with_fragment_size(instructions: usize) -> MemoryResourceLoader {
    let mut loader = MemoryResourceLoader::new();
    for (tag, id) in FragmentProgramId::ALL.iter().enumerate() {
        loader.insert(id.path(), fragment_program(tag as u32 + 1, instructions).to_bytes());
    }
    loader.insert(NV30_BICUBIC_PATH, fragment_program(0x30, instructions).to_bytes());
    loader.insert(NV40_BICUBIC_PATH, fragment_program(0x40, instructions).to_bytes());
    loader.insert(YV12_BILINEAR_PATH, fragment_program(0x50, instructions).to_bytes());
    loader.insert(RENDER_VERTEX_PATH,
                  vertex_program(0x0a, RENDER_VERTEX_INSTRUCTIONS).to_bytes());
    loader.insert(VIDEO_VERTEX_PATH, vertex_program(0x0b, VIDEO_VERTEX_INSTRUCTIONS).to_bytes());
    loader
}

pub(crate) fn accel(chipset: u32) -> TestAccel {
    accel_with_options(chipset, AccelOptions::default())
}

/// A brought-up engine with the bring-up stream already cleared.
pub(crate) fn accel_with_options(chipset: u32, options: AccelOptions) -> TestAccel {
    let mut accel = Accel::new(RecordingPushBuffer::new(),
                               HeapAllocator::new(),
                               CHANNEL,
                               chipset,
                               &resources(),
                               options).unwrap();
    accel.push_mut().clear();
    accel
}

pub(crate) fn pixmap(accel: &mut TestAccel, width: i32, height: i32, bits_per_pixel: u32)
                     -> Pixmap {
    let pitch = width as u32 * bits_per_pixel / 8;
    let bo = accel.allocator_mut()
                  .allocate(pitch as u64 * height as u64, BufferFlags::VRAM | BufferFlags::MAP)
                  .unwrap();
    Pixmap { size: Vector2I::new(width, height), pitch, bits_per_pixel, bo }
}

/// The calls to `method`, in stream order.
pub(crate) fn calls(push: &RecordingPushBuffer, method: Method) -> Vec<Command> {
    push.commands()
        .into_iter()
        .filter(|command| command.subchannel == method.subchannel &&
                command.method == method.offset)
        .collect()
}

/// Reads back a word written through the shader upload path.
pub(crate) fn uploaded_word(bytes: &[u8], offset: usize) -> u32 {
    let word = u32::from_ne_bytes([bytes[offset],
                                   bytes[offset + 1],
                                   bytes[offset + 2],
                                   bytes[offset + 3]]);
    if cfg!(target_endian = "big") {
        word.rotate_left(16)
    } else {
        word
    }
}

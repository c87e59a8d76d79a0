// nvfx/renderer/src/shaders.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The precompiled shader programs: loading, upload at bring-up and selection at draw time.
//!
//! Fragment programs live in a small buffer object and are selected by relocating its address
//! into the active-program register. Vertex programs are uploaded into instruction slots on the
//! later generation and selected by slot number.

use crate::error::InitError;
use crate::gen::Generation;
use crate::regs::{self, FP_ACTIVE_PROGRAM_DMA0, FP_ACTIVE_PROGRAM_DMA1};
use byteorder::{ByteOrder, NativeEndian};
use nvfx_gpu::{BufferObject, PushBuffer, Reloc, RelocFlags};
use nvfx_resources::program::{FragmentProgram, ProgramError, VertexProgram};
use nvfx_resources::program::WORDS_PER_INSTRUCTION;
use nvfx_resources::ResourceLoader;

/// The size of the fragment-program buffer in bytes.
pub const SHADER_BUFFER_SIZE: u64 = 0x1000;

// Fragment programs start on 64-byte boundaries.
const PROGRAM_ALIGNMENT: u32 = 64;

/// The instruction appended to make a program write its result alpha into the colour channels.
const A8_RESOLVE_INSTRUCTION: [u32; 4] = [0x01401e81, 0x1c9dfe00, 0x0001c800, 0x0001c800];
/// The end-of-program and output-select bits of an instruction's opcode word.
const END_OF_PROGRAM_BITS: u32 = 0x0000_0081;

/// The fragment programs used for compositing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FragmentProgramId {
    /// Outputs the interpolated colour.
    PassCol0,
    /// Outputs the source texel.
    PassTex0,
    /// Source texel times mask alpha.
    CompositeMask,
    /// Source alpha times the per-channel mask.
    CompositeMaskSaCa,
    /// Source texel times the per-channel mask.
    CompositeMaskCa,
}

impl FragmentProgramId {
    pub const ALL: [FragmentProgramId; 5] = [
        FragmentProgramId::PassCol0,
        FragmentProgramId::PassTex0,
        FragmentProgramId::CompositeMask,
        FragmentProgramId::CompositeMaskSaCa,
        FragmentProgramId::CompositeMaskCa,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// The virtual path the program is loaded from.
    pub fn path(self) -> &'static str {
        match self {
            FragmentProgramId::PassCol0 => "shaders/nv30/pass_col0.fp",
            FragmentProgramId::PassTex0 => "shaders/nv30/pass_tex0.fp",
            FragmentProgramId::CompositeMask => "shaders/nv30/composite_mask.fp",
            FragmentProgramId::CompositeMaskSaCa => "shaders/nv30/composite_mask_sa_ca.fp",
            FragmentProgramId::CompositeMaskCa => "shaders/nv30/composite_mask_ca.fp",
        }
    }
}

/// The YV12 video fragment programs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoProgramId {
    Yv12Bicubic,
    Yv12Bilinear,
}

pub(crate) const YV12_BILINEAR_PATH: &str = "shaders/nv30/yv12_bilinear.fp";
pub(crate) const RENDER_VERTEX_PATH: &str = "shaders/nv40/exa_render.vp";
pub(crate) const VIDEO_VERTEX_PATH: &str = "shaders/nv40/video.vp";

/// Derives the variant of a program for 8-bit alpha destinations.
///
/// Those are bound as single-channel colour buffers, so the variant ends with an extra
/// instruction that moves the result alpha into the colour channels. The last instruction of
/// the source program loses its end-of-program bits.
pub fn derive_a8_variant(program: &FragmentProgram) -> FragmentProgram {
    let mut data = program.data.clone();
    if let Some(last) = data.len().checked_sub(WORDS_PER_INSTRUCTION) {
        data[last] &= !END_OF_PROGRAM_BITS;
    }
    data.extend_from_slice(&A8_RESOLVE_INSTRUCTION);
    FragmentProgram { num_regs: program.num_regs, data }
}

/// The programs a generation needs, as loaded from resources.
pub struct ProgramSet {
    composite: Vec<FragmentProgram>,
    composite_a8: Vec<FragmentProgram>,
    yv12_bicubic: FragmentProgram,
    yv12_bilinear: FragmentProgram,
    render_vertex: Option<VertexProgram>,
    video_vertex: Option<VertexProgram>,
}

impl ProgramSet {
    pub fn load(loader: &dyn ResourceLoader, generation: &dyn Generation)
                -> Result<ProgramSet, ProgramError> {
        let mut composite = Vec::with_capacity(FragmentProgramId::ALL.len());
        for &id in &FragmentProgramId::ALL {
            composite.push(FragmentProgram::load(loader, id.path())?);
        }
        let composite_a8 = composite.iter().map(derive_a8_variant).collect();

        let (render_vertex, video_vertex) = if generation.has_vertex_programs() {
            (Some(VertexProgram::load(loader, RENDER_VERTEX_PATH)?),
             Some(VertexProgram::load(loader, VIDEO_VERTEX_PATH)?))
        } else {
            (None, None)
        };

        Ok(ProgramSet {
            composite,
            composite_a8,
            yv12_bicubic: FragmentProgram::load(loader, generation.yv12_bicubic_path())?,
            yv12_bilinear: FragmentProgram::load(loader, YV12_BILINEAR_PATH)?,
            render_vertex,
            video_vertex,
        })
    }
}

/// Where a fragment program lives in the shader buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FragmentProgramSlot {
    /// Byte offset into the shader buffer.
    pub offset: u32,
    pub num_regs: u32,
}

/// Where a vertex program lives in instruction memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexProgramSlot {
    /// The first instruction slot.
    pub id: u32,
    pub input_mask: u32,
    pub output_mask: u32,
}

/// Every uploaded program. Filled in once at bring-up.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderTable {
    composite: [FragmentProgramSlot; 5],
    composite_a8: [FragmentProgramSlot; 5],
    yv12_bicubic: FragmentProgramSlot,
    yv12_bilinear: FragmentProgramSlot,
    render_vertex: Option<VertexProgramSlot>,
    video_vertex: Option<VertexProgramSlot>,
}

impl ShaderTable {
    /// Uploads every program. Fragment programs go into `memory`, the mapping of the shader
    /// buffer; vertex programs are streamed through `push`.
    ///
    /// The order is fixed: the render vertex program, each compositing program followed by its
    /// a8 variant, the video vertex program, then the bicubic and bilinear video programs.
    pub fn upload(push: &mut dyn PushBuffer, memory: &mut [u8], programs: &ProgramSet)
                  -> Result<ShaderTable, InitError> {
        let mut next_vertex_id = 0;
        let render_vertex = match programs.render_vertex {
            Some(ref program) => Some(upload_vertex_program(push, program, &mut next_vertex_id)?),
            None => None,
        };

        let mut uploader = ShaderUploader::new(memory);
        let mut composite = [FragmentProgramSlot::default(); 5];
        let mut composite_a8 = [FragmentProgramSlot::default(); 5];
        for index in 0..composite.len() {
            composite[index] = uploader.upload(&programs.composite[index])?;
            composite_a8[index] = uploader.upload(&programs.composite_a8[index])?;
        }

        let video_vertex = match programs.video_vertex {
            Some(ref program) => Some(upload_vertex_program(push, program, &mut next_vertex_id)?),
            None => None,
        };

        let yv12_bicubic = uploader.upload(&programs.yv12_bicubic)?;
        let yv12_bilinear = uploader.upload(&programs.yv12_bilinear)?;
        debug!("uploaded fragment programs: {} of {} bytes used",
               uploader.cursor(),
               SHADER_BUFFER_SIZE);

        Ok(ShaderTable {
            composite,
            composite_a8,
            yv12_bicubic,
            yv12_bilinear,
            render_vertex,
            video_vertex,
        })
    }

    /// The compositing program to use, in its a8 variant when rendering to an 8-bit alpha
    /// destination.
    #[inline]
    pub fn fragment(&self, id: FragmentProgramId, a8: bool) -> FragmentProgramSlot {
        if a8 {
            self.composite_a8[id.index()]
        } else {
            self.composite[id.index()]
        }
    }

    #[inline]
    pub fn video(&self, id: VideoProgramId) -> FragmentProgramSlot {
        match id {
            VideoProgramId::Yv12Bicubic => self.yv12_bicubic,
            VideoProgramId::Yv12Bilinear => self.yv12_bilinear,
        }
    }

    #[inline]
    pub fn render_vertex(&self) -> Option<VertexProgramSlot> {
        self.render_vertex
    }

    #[inline]
    pub fn video_vertex(&self) -> Option<VertexProgramSlot> {
        self.video_vertex
    }
}

/// Copies fragment programs into the shader buffer at a running cursor.
pub struct ShaderUploader<'a> {
    memory: &'a mut [u8],
    cursor: u32,
}

impl<'a> ShaderUploader<'a> {
    #[inline]
    pub fn new(memory: &'a mut [u8]) -> ShaderUploader<'a> {
        ShaderUploader { memory, cursor: 0 }
    }

    /// The byte offset the next program will be placed at.
    #[inline]
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn upload(&mut self, program: &FragmentProgram) -> Result<FragmentProgramSlot, InitError> {
        let offset = self.cursor;
        let size = (program.size() * 4) as u32;
        let end = offset as usize + size as usize;
        if end > self.memory.len() {
            return Err(InitError::ShaderUpload { offset, size });
        }

        for (chunk, &word) in self.memory[offset as usize..end].chunks_mut(4)
                                                               .zip(program.data.iter()) {
            // Big-endian hosts see the halves of each word swapped by the aperture.
            let word = if cfg!(target_endian = "big") { word.rotate_left(16) } else { word };
            NativeEndian::write_u32(chunk, word);
        }

        self.cursor = align_up(offset + size, PROGRAM_ALIGNMENT);
        Ok(FragmentProgramSlot { offset, num_regs: program.num_regs })
    }
}

fn upload_vertex_program(push: &mut dyn PushBuffer,
                         program: &VertexProgram,
                         next_id: &mut u32)
                         -> Result<VertexProgramSlot, InitError> {
    let instructions = program.size() / WORDS_PER_INSTRUCTION;
    if !push.space(2 + instructions * (WORDS_PER_INSTRUCTION + 1)) {
        return Err(InitError::NoSpace);
    }

    let id = *next_id;
    push.begin(regs::VP_UPLOAD_FROM_ID, 1);
    push.push(id);
    for instruction in program.data.chunks(WORDS_PER_INSTRUCTION) {
        push.begin(regs::VP_UPLOAD_INST, WORDS_PER_INSTRUCTION as u32);
        for &word in instruction {
            push.push(word);
        }
        *next_id += 1;
    }

    Ok(VertexProgramSlot {
        id,
        input_mask: program.input_mask,
        output_mask: program.output_mask,
    })
}

/// Makes a fragment program the active one.
pub fn load_fragment_program(push: &mut dyn PushBuffer,
                             shader_buffer: &BufferObject,
                             slot: FragmentProgramSlot) {
    push.begin(regs::FP_ACTIVE_PROGRAM, 1);
    push.push_reloc(shader_buffer, Reloc {
        data: slot.offset,
        flags: RelocFlags::VRAM | RelocFlags::GART | RelocFlags::RD | RelocFlags::LOW |
            RelocFlags::OR,
        vor: FP_ACTIVE_PROGRAM_DMA0,
        tor: FP_ACTIVE_PROGRAM_DMA1,
    });
    push.begin(regs::FP_CONTROL, 1);
    push.push(slot.num_regs << regs::FP_CONTROL_TEMP_COUNT_SHIFT);
}

/// Starts vertex processing at a program's first slot and enables its attributes.
pub fn load_vertex_program(push: &mut dyn PushBuffer, slot: VertexProgramSlot) {
    push.begin(regs::VP_START_FROM_ID, 1);
    push.push(slot.id);
    push.begin(regs::NV40_VP_ATTRIB_EN, 2);
    push.push(slot.input_mask);
    push.push(slot.output_mask);
}

#[inline]
fn align_up(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) & !(alignment - 1)
}

// nvfx/renderer/src/accel.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The 3D engine as the compositing and video code sees it.

use crate::error::InitError;
use crate::gen::{self, Generation};
use crate::options::AccelOptions;
use crate::shaders::{ProgramSet, ShaderTable, SHADER_BUFFER_SIZE};
use nvfx_gpu::{Allocator, BufferObject, Channel, GpuObject, PushBuffer};
use nvfx_resources::ResourceLoader;

// Words the default state needs, with room to spare.
const INIT_PUSH_SPACE: usize = 256;

/// A brought-up 3D engine on one channel.
///
/// The engine owns the push buffer and the allocator. All emission goes through `&mut self`, so
/// only one composite or video operation can be in flight at a time.
pub struct Accel<P, A> where P: PushBuffer, A: Allocator {
    pub(crate) push: P,
    pub(crate) allocator: A,
    pub(crate) channel: Channel,
    pub(crate) generation: Box<dyn Generation>,
    pub(crate) object: GpuObject,
    pub(crate) shader_buffer: BufferObject,
    pub(crate) shaders: ShaderTable,
    pub(crate) filter_table: Option<FilterTableBuffer>,
    pub(crate) options: AccelOptions,
}

/// The video filter table's buffer, and whether its contents have been written.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FilterTableBuffer {
    pub(crate) bo: BufferObject,
    pub(crate) filled: bool,
}

impl<P, A> Accel<P, A> where P: PushBuffer, A: Allocator {
    /// Brings up the 3D engine for `chipset`.
    ///
    /// Selects the object class, loads the shader programs through `resources`, creates the 3D
    /// object and the shader buffer, writes the default state and uploads every program.
    /// Failure is fatal: acceleration should stay disabled for the session.
    pub fn new(push: P,
               allocator: A,
               channel: Channel,
               chipset: u32,
               resources: &dyn ResourceLoader,
               options: AccelOptions)
               -> Result<Accel<P, A>, InitError> {
        Accel::bring_up(push, allocator, channel, chipset, resources, options).map_err(|err| {
            match err {
                InitError::UnsupportedArchitecture(_) => {
                    debug!("no 3D acceleration for chipset 0x{:02x}", chipset)
                }
                ref err => error!("3D acceleration disabled: {}", err),
            }
            err
        })
    }

    fn bring_up(mut push: P,
                mut allocator: A,
                channel: Channel,
                chipset: u32,
                resources: &dyn ResourceLoader,
                options: AccelOptions)
                -> Result<Accel<P, A>, InitError> {
        let generation = gen::select(chipset)?;
        let programs = ProgramSet::load(resources, &*generation)?;

        let object = allocator.create_object(generation.class()).map_err(InitError::Object)?;
        let shader_buffer = allocator.allocate(SHADER_BUFFER_SIZE,
                                               generation.shader_buffer_flags())
                                     .map_err(InitError::Alloc)?;

        if !push.space(INIT_PUSH_SPACE) {
            return Err(InitError::NoSpace);
        }
        generation.emit_init(&mut push, &object, &channel);

        let shaders = {
            let memory = allocator.map(&shader_buffer).map_err(InitError::Alloc)?;
            ShaderTable::upload(&mut push, memory, &programs)?
        };

        info!("3D acceleration on chipset 0x{:02x}: {:?}, class 0x{:04x}",
              chipset,
              generation.family(),
              generation.class());

        Ok(Accel {
            push,
            allocator,
            channel,
            generation,
            object,
            shader_buffer,
            shaders,
            filter_table: None,
            options,
        })
    }

    #[inline]
    pub fn push(&self) -> &P {
        &self.push
    }

    #[inline]
    pub fn push_mut(&mut self) -> &mut P {
        &mut self.push
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    #[inline]
    pub fn allocator_mut(&mut self) -> &mut A {
        &mut self.allocator
    }

    #[inline]
    pub fn generation(&self) -> &dyn Generation {
        &*self.generation
    }

    #[inline]
    pub fn object(&self) -> &GpuObject {
        &self.object
    }

    #[inline]
    pub fn shader_buffer(&self) -> &BufferObject {
        &self.shader_buffer
    }

    #[inline]
    pub fn shaders(&self) -> &ShaderTable {
        &self.shaders
    }

    #[inline]
    pub fn options(&self) -> &AccelOptions {
        &self.options
    }
}

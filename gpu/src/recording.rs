// nvfx/gpu/src/recording.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An in-memory channel that records every command word.
//!
//! `RecordingPushBuffer` keeps the stream instead of submitting it, and `HeapAllocator` backs
//! buffer objects with ordinary heap memory at made-up GPU addresses. Together they let the
//! backend run without hardware, which is how the test suite inspects what gets emitted.

use crate::{AllocError, Allocator, BufCtxId, BufferFlags, BufferId, BufferObject, GpuObject};
use crate::{PushBuffer, PushError, Reloc};
use fxhash::FxHashMap;

// Fake GPU addresses start here so that a zero offset is never valid.
const BASE_GPU_ADDRESS: u64 = 0x0100_0000;
const BUFFER_ALIGNMENT: u64 = 0x1000;

/// A relocation recorded at a particular word of the stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordedReloc {
    pub index: usize,
    pub buffer: BufferId,
    pub reloc: Reloc,
}

/// One decoded method call: a header plus its data words.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub subchannel: u8,
    pub method: u16,
    pub args: Vec<u32>,
}

impl Command {
    #[inline]
    pub fn arg_f32(&self, index: usize) -> f32 {
        f32::from_bits(self.args[index])
    }
}

pub struct RecordingPushBuffer {
    words: Vec<u32>,
    relocs: Vec<RecordedReloc>,
    referenced: Vec<BufferId>,
    bound_bufctx: Option<BufCtxId>,
    capacity: Option<usize>,
    fail_validation: bool,
    kick_count: usize,
    validate_count: usize,
}

impl RecordingPushBuffer {
    pub fn new() -> RecordingPushBuffer {
        RecordingPushBuffer {
            words: vec![],
            relocs: vec![],
            referenced: vec![],
            bound_bufctx: None,
            capacity: None,
            fail_validation: false,
            kick_count: 0,
            validate_count: 0,
        }
    }

    /// Limits the total number of words the buffer will accept.
    pub fn with_capacity_limit(words: usize) -> RecordingPushBuffer {
        let mut push = RecordingPushBuffer::new();
        push.capacity = Some(words);
        push
    }

    pub fn set_capacity_limit(&mut self, words: Option<usize>) {
        self.capacity = words;
    }

    /// Makes every subsequent `validate()` fail.
    pub fn set_fail_validation(&mut self, fail: bool) {
        self.fail_validation = fail;
    }

    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    #[inline]
    pub fn relocs(&self) -> &[RecordedReloc] {
        &self.relocs
    }

    /// Buffers referenced since the last reset.
    #[inline]
    pub fn referenced(&self) -> &[BufferId] {
        &self.referenced
    }

    #[inline]
    pub fn bound_bufctx(&self) -> Option<BufCtxId> {
        self.bound_bufctx
    }

    #[inline]
    pub fn kick_count(&self) -> usize {
        self.kick_count
    }

    #[inline]
    pub fn validate_count(&self) -> usize {
        self.validate_count
    }

    /// Forgets all recorded words and relocations.
    pub fn clear(&mut self) {
        self.words.clear();
        self.relocs.clear();
        self.referenced.clear();
    }

    /// Splits the stream back into method calls.
    ///
    /// Words that don't form a complete call at the end of the stream are dropped.
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = vec![];
        let mut index = 0;
        while index < self.words.len() {
            let header = self.words[index];
            let count = (header >> 18) as usize & 0x7ff;
            let subchannel = ((header >> 13) & 0x7) as u8;
            let method = (header & 0x1ffc) as u16;
            let start = index + 1;
            let end = start + count;
            if end > self.words.len() {
                break;
            }
            commands.push(Command { subchannel, method, args: self.words[start..end].to_vec() });
            index = end;
        }
        commands
    }
}

impl Default for RecordingPushBuffer {
    #[inline]
    fn default() -> RecordingPushBuffer {
        RecordingPushBuffer::new()
    }
}

impl PushBuffer for RecordingPushBuffer {
    fn space(&mut self, words: usize) -> bool {
        match self.capacity {
            Some(capacity) => self.words.len() + words <= capacity,
            None => true,
        }
    }

    fn reset(&mut self) {
        self.referenced.clear();
    }

    #[inline]
    fn push(&mut self, word: u32) {
        self.words.push(word);
    }

    fn push_reloc(&mut self, bo: &BufferObject, reloc: Reloc) {
        let index = self.words.len();
        self.words.push(reloc.resolve(bo));
        self.relocs.push(RecordedReloc { index, buffer: bo.id, reloc });
        if !self.referenced.contains(&bo.id) {
            self.referenced.push(bo.id);
        }
    }

    fn bind_bufctx(&mut self, bufctx: Option<BufCtxId>) {
        self.bound_bufctx = bufctx;
    }

    fn validate(&mut self) -> Result<(), PushError> {
        self.validate_count += 1;
        if self.fail_validation {
            debug!("validation of {} buffer(s) failed", self.referenced.len());
            return Err(PushError::Validation);
        }
        Ok(())
    }

    fn kick(&mut self) {
        self.kick_count += 1;
        debug!("kick #{}: {} words recorded", self.kick_count, self.words.len());
    }
}

struct HeapBuffer {
    object: BufferObject,
    data: Vec<u8>,
}

/// An allocator backed by heap memory.
pub struct HeapAllocator {
    buffers: FxHashMap<BufferId, HeapBuffer>,
    objects: Vec<GpuObject>,
    next_buffer_id: BufferId,
    next_gpu_address: u64,
    next_handle: u32,
    fail_allocation: bool,
    fail_map: bool,
    bytes_allocated: u64,
}

impl HeapAllocator {
    pub fn new() -> HeapAllocator {
        HeapAllocator {
            buffers: FxHashMap::default(),
            objects: vec![],
            next_buffer_id: BufferId(0),
            next_gpu_address: BASE_GPU_ADDRESS,
            next_handle: 0xbeef_3d00,
            fail_allocation: false,
            fail_map: false,
            bytes_allocated: 0,
        }
    }

    /// Makes every subsequent allocation fail with `OutOfMemory`.
    pub fn set_fail_allocation(&mut self, fail: bool) {
        self.fail_allocation = fail;
    }

    /// Makes every subsequent mapping fail.
    pub fn set_fail_map(&mut self, fail: bool) {
        self.fail_map = fail;
    }

    /// The current contents of a buffer.
    pub fn contents(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(&id).map(|buffer| &buffer.data[..])
    }

    pub fn buffer(&self, id: BufferId) -> Option<BufferObject> {
        self.buffers.get(&id).map(|buffer| buffer.object)
    }

    #[inline]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    #[inline]
    pub fn objects(&self) -> &[GpuObject] {
        &self.objects
    }

    #[inline]
    pub fn bytes_allocated(&self) -> u64 {
        self.bytes_allocated
    }
}

impl Default for HeapAllocator {
    #[inline]
    fn default() -> HeapAllocator {
        HeapAllocator::new()
    }
}

impl Allocator for HeapAllocator {
    fn allocate(&mut self, size: u64, flags: BufferFlags) -> Result<BufferObject, AllocError> {
        if self.fail_allocation {
            return Err(AllocError::OutOfMemory);
        }

        let id = self.next_buffer_id;
        self.next_buffer_id.0 += 1;

        // Buffers that may live in VRAM are placed there.
        let domain = if flags.contains(BufferFlags::VRAM) {
            BufferFlags::VRAM
        } else {
            BufferFlags::GART
        };

        let object = BufferObject { id, size, offset: self.next_gpu_address, domain };
        let aligned_size = (size + BUFFER_ALIGNMENT - 1) / BUFFER_ALIGNMENT * BUFFER_ALIGNMENT;
        self.next_gpu_address += aligned_size.max(BUFFER_ALIGNMENT);
        self.bytes_allocated += size;

        debug!("allocated buffer {:?}: {} bytes at 0x{:08x} ({:?})",
               id,
               size,
               object.offset,
               domain);

        self.buffers.insert(id, HeapBuffer { object, data: vec![0; size as usize] });
        Ok(object)
    }

    fn map(&mut self, bo: &BufferObject) -> Result<&mut [u8], AllocError> {
        if self.fail_map {
            return Err(AllocError::MapFailed);
        }
        match self.buffers.get_mut(&bo.id) {
            Some(buffer) => Ok(&mut buffer.data[..]),
            None => Err(AllocError::UnknownBuffer),
        }
    }

    fn create_object(&mut self, class: u32) -> Result<GpuObject, AllocError> {
        if self.fail_allocation {
            return Err(AllocError::ObjectCreation(class));
        }
        let object = GpuObject { handle: self.next_handle, class };
        self.next_handle += 1;
        self.objects.push(object);
        debug!("created object 0x{:08x} of class 0x{:04x}", object.handle, class);
        Ok(object)
    }
}

#[cfg(test)]
mod test {
    use crate::{Allocator, BufferFlags, Method, PushBuffer, Reloc, RelocFlags, SUBC_3D};
    use quickcheck;

    use super::{HeapAllocator, RecordingPushBuffer};

    #[test]
    fn test_commands_decode_what_was_pushed() {
        quickcheck::quickcheck(prop_decode as fn(Vec<(u16, Vec<u32>)>) -> bool);

        fn prop_decode(calls: Vec<(u16, Vec<u32>)>) -> bool {
            let mut push = RecordingPushBuffer::new();
            for &(offset, ref args) in &calls {
                push.begin(Method::three_d(offset & 0x1ffc), args.len() as u32);
                args.iter().for_each(|&arg| push.push(arg));
            }
            let commands = push.commands();
            commands.len() == calls.len() &&
                commands.iter().zip(calls.iter()).all(|(command, &(offset, ref args))| {
                    command.subchannel == SUBC_3D &&
                        command.method == offset & 0x1ffc &&
                        command.args == *args
                })
        }
    }

    #[test]
    fn test_reloc_is_resolved_and_referenced() {
        let mut allocator = HeapAllocator::new();
        let bo = allocator.allocate(64, BufferFlags::VRAM | BufferFlags::MAP).unwrap();
        let mut push = RecordingPushBuffer::new();
        push.push_reloc(&bo, Reloc::low(0x10, RelocFlags::VRAM | RelocFlags::RD));
        assert_eq!(push.words(), &[bo.offset as u32 + 0x10]);
        assert_eq!(push.relocs()[0].buffer, bo.id);
        assert_eq!(push.referenced(), &[bo.id]);

        push.reset();
        assert!(push.referenced().is_empty());
        assert_eq!(push.words().len(), 1);
    }

    #[test]
    fn test_capacity_limit() {
        let mut push = RecordingPushBuffer::with_capacity_limit(4);
        assert!(push.space(4));
        push.push(0);
        assert!(push.space(3));
        assert!(!push.space(4));
    }

    #[test]
    fn test_heap_allocator_maps_zeroed_memory() {
        let mut allocator = HeapAllocator::new();
        let first = allocator.allocate(8192, BufferFlags::VRAM).unwrap();
        let second = allocator.allocate(16, BufferFlags::GART).unwrap();
        assert_ne!(first.offset, second.offset);
        assert_eq!(second.domain, BufferFlags::GART);
        {
            let mapping = allocator.map(&first).unwrap();
            assert_eq!(mapping.len(), 8192);
            assert!(mapping.iter().all(|&byte| byte == 0));
            mapping[3] = 0x7f;
        }
        assert_eq!(allocator.contents(first.id).unwrap()[3], 0x7f);

        allocator.set_fail_allocation(true);
        assert!(allocator.allocate(16, BufferFlags::VRAM).is_err());
    }
}

// nvfx/resources/src/lib.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An abstraction for reading resources.
//!
//! Shader programs are precompiled binaries. We can't always count on a filesystem being
//! present, so they are read through a `ResourceLoader`.

#[macro_use]
extern crate log;

use fxhash::FxHashMap;
use std::io::{Error as IOError, ErrorKind};

pub mod fs;
pub mod program;

/// A source of precompiled shader program binaries.
pub trait ResourceLoader {
    /// Reads the whole resource at `path`, such as `shaders/nv40/pass_tex0.fp`. Paths are
    /// slash-separated and relative to the loader's root, whatever the loader stores them in.
    fn slurp(&self, path: &str) -> Result<Vec<u8>, IOError>;
}

/// Resources held in memory, keyed by virtual path.
#[derive(Clone, Default)]
pub struct MemoryResourceLoader {
    resources: FxHashMap<String, Vec<u8>>,
}

impl MemoryResourceLoader {
    #[inline]
    pub fn new() -> MemoryResourceLoader {
        MemoryResourceLoader::default()
    }

    pub fn insert<P>(&mut self, virtual_path: P, data: Vec<u8>) where P: Into<String> {
        self.resources.insert(virtual_path.into(), data);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceLoader for MemoryResourceLoader {
    fn slurp(&self, virtual_path: &str) -> Result<Vec<u8>, IOError> {
        match self.resources.get(virtual_path) {
            Some(data) => Ok(data.clone()),
            None => {
                debug!("resource {} not present", virtual_path);
                let message = format!("{} is not loaded", virtual_path);
                Err(IOError::new(ErrorKind::NotFound, message))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::ErrorKind;

    use super::{MemoryResourceLoader, ResourceLoader};

    #[test]
    fn test_memory_loader() {
        let mut loader = MemoryResourceLoader::new();
        loader.insert("shaders/nv30/pass_tex0.fp", vec![1, 2, 3, 4]);
        assert_eq!(loader.slurp("shaders/nv30/pass_tex0.fp").unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(loader.slurp("shaders/nv30/missing.fp").unwrap_err().kind(),
                   ErrorKind::NotFound);
    }
}

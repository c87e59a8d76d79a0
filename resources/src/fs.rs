// nvfx/resources/src/fs.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading resources from the filesystem.

use crate::ResourceLoader;
use std::env;
use std::fs::File;
use std::io::{Error as IOError, ErrorKind, Read};
use std::path::PathBuf;

pub struct FilesystemResourceLoader {
    pub directory: PathBuf,
}

impl FilesystemResourceLoader {
    /// Walks up from the current directory looking for a `res/` directory containing
    /// `shaders/`.
    pub fn locate() -> Result<FilesystemResourceLoader, IOError> {
        let mut parent_directory = env::current_dir()?;
        loop {
            let mut resources_directory = parent_directory.clone();
            resources_directory.push("res");
            let mut shaders_directory = resources_directory.clone();
            shaders_directory.push("shaders");
            if shaders_directory.is_dir() {
                debug!("using resources in {}", resources_directory.display());
                return Ok(FilesystemResourceLoader { directory: resources_directory });
            }

            if !parent_directory.pop() {
                break;
            }
        }

        Err(IOError::new(ErrorKind::NotFound, "no suitable `res/` directory found"))
    }
}

impl ResourceLoader for FilesystemResourceLoader {
    fn slurp(&self, virtual_path: &str) -> Result<Vec<u8>, IOError> {
        let mut path = self.directory.clone();
        virtual_path.split('/').for_each(|segment| path.push(segment));

        let mut data = vec![];
        File::open(&path)?.read_to_end(&mut data)?;
        Ok(data)
    }
}

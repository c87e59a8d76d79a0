// nvfx/resources/src/program.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Precompiled shader program containers.
//!
//! A program file is a sequence of little-endian 32-bit words. Fragment programs start with
//! the number of temporary registers the program uses; vertex programs start with their input
//! and output attribute masks. The instruction words follow, four words per instruction.

use crate::ResourceLoader;
use byteorder::{ByteOrder, LittleEndian};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io::Error as IOError;

pub const WORDS_PER_INSTRUCTION: usize = 4;

const FRAGMENT_HEADER_WORDS: usize = 1;
const VERTEX_HEADER_WORDS: usize = 2;

/// A fragment program as uploaded into the shader buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentProgram {
    /// Temporary registers used; programmed into the fragment-program control register.
    pub num_regs: u32,
    pub data: Vec<u32>,
}

/// A vertex program as uploaded into the vertex-program instruction slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexProgram {
    pub input_mask: u32,
    pub output_mask: u32,
    pub data: Vec<u32>,
}

/// Errors that can occur when reading a program file.
#[derive(Debug)]
pub enum ProgramError {
    /// The file could not be read.
    Io(String, IOError),
    /// The file length is not a whole number of words.
    Misaligned(String, usize),
    /// The file is shorter than its header.
    Truncated(String),
    /// The instructions are not a whole number of four-word instructions, or there are none.
    BadInstructionCount(String, usize),
}

impl FragmentProgram {
    /// Size in words.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn load(loader: &dyn ResourceLoader, path: &str) -> Result<FragmentProgram, ProgramError> {
        let words = read_words(loader, path, FRAGMENT_HEADER_WORDS)?;
        let program = FragmentProgram { num_regs: words[0], data: words[1..].to_vec() };
        debug!("loaded fragment program {}: {} words, {} registers",
               path,
               program.size(),
               program.num_regs);
        Ok(program)
    }

    /// Serializes the program in the container format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut words = Vec::with_capacity(FRAGMENT_HEADER_WORDS + self.data.len());
        words.push(self.num_regs);
        words.extend_from_slice(&self.data);
        words_to_bytes(&words)
    }
}

impl VertexProgram {
    /// Size in words.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn load(loader: &dyn ResourceLoader, path: &str) -> Result<VertexProgram, ProgramError> {
        let words = read_words(loader, path, VERTEX_HEADER_WORDS)?;
        let program = VertexProgram {
            input_mask: words[0],
            output_mask: words[1],
            data: words[2..].to_vec(),
        };
        debug!("loaded vertex program {}: {} instructions",
               path,
               program.size() / WORDS_PER_INSTRUCTION);
        Ok(program)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut words = Vec::with_capacity(VERTEX_HEADER_WORDS + self.data.len());
        words.push(self.input_mask);
        words.push(self.output_mask);
        words.extend_from_slice(&self.data);
        words_to_bytes(&words)
    }
}

fn read_words(loader: &dyn ResourceLoader, path: &str, header_words: usize)
              -> Result<Vec<u32>, ProgramError> {
    let bytes = loader.slurp(path).map_err(|error| ProgramError::Io(path.to_owned(), error))?;
    if bytes.len() % 4 != 0 {
        return Err(ProgramError::Misaligned(path.to_owned(), bytes.len()));
    }

    let mut words = vec![0; bytes.len() / 4];
    LittleEndian::read_u32_into(&bytes, &mut words);

    if words.len() < header_words {
        return Err(ProgramError::Truncated(path.to_owned()));
    }
    let instruction_words = words.len() - header_words;
    if instruction_words == 0 || instruction_words % WORDS_PER_INSTRUCTION != 0 {
        return Err(ProgramError::BadInstructionCount(path.to_owned(), instruction_words));
    }
    Ok(words)
}

fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = vec![0; words.len() * 4];
    LittleEndian::write_u32_into(words, &mut bytes);
    bytes
}

impl Display for ProgramError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            ProgramError::Io(ref path, ref error) => write!(formatter, "{}: {}", path, error),
            ProgramError::Misaligned(ref path, length) => {
                write!(formatter, "{}: length {} is not a multiple of 4", path, length)
            }
            ProgramError::Truncated(ref path) => write!(formatter, "{}: header truncated", path),
            ProgramError::BadInstructionCount(ref path, words) => {
                write!(formatter, "{}: {} instruction words", path, words)
            }
        }
    }
}

impl Error for ProgramError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            ProgramError::Io(_, ref error) => Some(error),
            _ => None,
        }
    }
}

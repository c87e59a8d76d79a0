// nvfx/utils/filter-lut/src/main.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Dumps the bicubic video filter table, for inspection or for baking into shader tests.
//!
//! The table's signed bytes are stored as-is, so a PNG viewer shows negative weights as bright.

use clap::{App, Arg};
use image::ColorType;
use nvfx_renderer::filter::{self, FILTER_TABLE_ENTRIES};
use std::error::Error;
use std::fs;

fn main() -> Result<(), Box<dyn Error>> {
    let matches =
        App::new("filter-lut").arg(Arg::with_name("raw").short("r")
                                                       .long("raw")
                                                       .help("Write raw table bytes, not a PNG"))
                              .arg(Arg::with_name("OUTPUT").help("Path to the output file")
                                                           .required(true)
                                                           .index(1))
                              .get_matches();
    let output_path = matches.value_of("OUTPUT").ok_or("no output path")?;

    let table = filter::compute_filter_table();
    if matches.is_present("raw") {
        fs::write(output_path, &table)?;
    } else {
        image::save_buffer(output_path,
                           &table,
                           FILTER_TABLE_ENTRIES as u32,
                           1,
                           ColorType::Rgba8)?;
    }
    Ok(())
}

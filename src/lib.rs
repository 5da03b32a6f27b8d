// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Decoder for baseline and progressive Huffman-coded JPEG images
//! (ITU-T T.81).
//!
//! ```no_run
//! let file = std::fs::File::open("image.jpg")?;
//! let image = jpegdec::decode(std::io::BufReader::new(file))?;
//! println!("{:?}", image.size());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
pub mod api;
pub mod bit_reader;
pub mod color;
pub mod entropy_coding;
pub mod error;
pub mod frame;
pub mod headers;
pub mod image;
pub mod util;
pub mod var_dct;

use std::io::Read;

pub use api::{ColorModel, ImageConfig, JpegDecoder, JpegDecoderOptions};
pub use error::{Error, ErrorKind, Result};
pub use image::Image;

const BLOCK_DIM: usize = 8;
const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;

/// Decodes a JPEG image with default options.
pub fn decode<R: Read>(reader: R) -> Result<Image> {
    JpegDecoder::new(reader).decode()
}

/// Reads the color model and dimensions of a JPEG image without decoding
/// its pixels.
pub fn decode_config<R: Read>(reader: R) -> Result<ImageConfig> {
    JpegDecoder::new(reader).decode_config()
}

// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

mod decoder;
mod options;

pub use crate::color::ColorModel;
pub use crate::image::Image;
pub use decoder::*;
pub use options::*;

/// What `decode_config` reports without decoding any pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageConfig {
    pub color_model: ColorModel,
    pub width: usize,
    pub height: usize,
}

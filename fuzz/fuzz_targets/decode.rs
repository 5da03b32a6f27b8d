// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use jpegdec::{Image, JpegDecoder, JpegDecoderOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = JpegDecoderOptions {
        pixel_limit: Some(1 << 24),
    };
    let Ok(image) = JpegDecoder::with_options(data, options).decode() else {
        return;
    };
    let (width, height) = image.size();
    match image {
        Image::Gray8(image) => {
            let (xsize, ysize) = image.plane.size();
            assert!(xsize >= width && ysize >= height);
        }
        Image::YCbCr(image) => {
            assert!(image.y.size().0 >= width && image.y.size().1 >= height);
        }
        Image::Rgba8(image) | Image::Cmyk8(image) => {
            assert_eq!(image.pixels.len(), 4 * width * height);
        }
    }
});

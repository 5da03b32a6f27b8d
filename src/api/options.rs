// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[derive(Debug, Clone, Default)]
pub struct JpegDecoderOptions {
    /// Fail decoding images with more than this number of pixels, before
    /// any sample buffer is allocated.
    pub pixel_limit: Option<usize>,
}

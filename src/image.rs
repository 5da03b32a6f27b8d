// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::color::ycbcr_to_rgb;
use crate::error::Result;
use crate::util::tracing_wrappers::*;
use crate::util::try_filled_vec;
use crate::BLOCK_DIM;

/// An 8-bit sample plane. Decoded planes cover whole MCUs, so they are
/// usually larger than the image they belong to.
#[derive(Clone, PartialEq, Eq)]
pub struct Plane {
    data: Vec<u8>,
    xsize: usize,
    ysize: usize,
}

impl Debug for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Plane {}x{}", self.xsize, self.ysize)
    }
}

impl Plane {
    #[instrument(level = "debug", err)]
    pub fn new(size: (usize, usize)) -> Result<Plane> {
        let data = try_filled_vec(size.0 * size.1, 0u8)?;
        Ok(Plane {
            data,
            xsize: size.0,
            ysize: size.1,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        (self.xsize, self.ysize)
    }

    /// Distance in bytes between vertically adjacent samples.
    pub fn stride(&self) -> usize {
        self.xsize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.xsize..(y + 1) * self.xsize]
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.xsize + x]
    }

    /// The samples from the top-left corner of block (`bx`, `by`) onwards.
    pub(crate) fn block_mut(&mut self, bx: usize, by: usize) -> &mut [u8] {
        let offset = BLOCK_DIM * (by * self.xsize + bx);
        &mut self.data[offset..]
    }
}

/// Chroma subsampling, named J:a:b after the usual convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsampleRatio {
    Ratio444,
    Ratio422,
    Ratio420,
    Ratio440,
    Ratio411,
    Ratio410,
}

impl SubsampleRatio {
    /// Classifies the ratio of luma to chroma sampling factors.
    pub fn from_factor_ratio(h_ratio: usize, v_ratio: usize) -> Option<SubsampleRatio> {
        match (h_ratio, v_ratio) {
            (1, 1) => Some(SubsampleRatio::Ratio444),
            (1, 2) => Some(SubsampleRatio::Ratio440),
            (2, 1) => Some(SubsampleRatio::Ratio422),
            (2, 2) => Some(SubsampleRatio::Ratio420),
            (4, 1) => Some(SubsampleRatio::Ratio411),
            (4, 2) => Some(SubsampleRatio::Ratio410),
            _ => None,
        }
    }

    /// Horizontal and vertical log2 downsampling of chroma relative to luma.
    pub fn chroma_shift(self) -> (usize, usize) {
        match self {
            SubsampleRatio::Ratio444 => (0, 0),
            SubsampleRatio::Ratio440 => (0, 1),
            SubsampleRatio::Ratio422 => (1, 0),
            SubsampleRatio::Ratio420 => (1, 1),
            SubsampleRatio::Ratio411 => (2, 0),
            SubsampleRatio::Ratio410 => (2, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub plane: Plane,
}

impl GrayImage {
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.plane.get(x, y)
    }
}

/// Y, Cb and Cr planes as decoded, with chroma possibly subsampled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YCbCrImage {
    pub width: usize,
    pub height: usize,
    pub y: Plane,
    pub cb: Plane,
    pub cr: Plane,
    pub ratio: SubsampleRatio,
}

impl YCbCrImage {
    /// Position in `cb` and `cr` of the chroma sample covering pixel
    /// (`x`, `y`).
    pub fn chroma_position(&self, x: usize, y: usize) -> (usize, usize) {
        let (hs, vs) = self.ratio.chroma_shift();
        (x >> hs, y >> vs)
    }

    /// Returns the (Y, Cb, Cr) triple of pixel (`x`, `y`).
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let (cx, cy) = self.chroma_position(x, y);
        [self.y.get(x, y), self.cb.get(cx, cy), self.cr.get(cx, cy)]
    }

    /// Converts to interleaved RGBA with opaque alpha, replicating chroma
    /// samples over the pixels they cover.
    pub fn to_rgba(&self) -> Result<InterleavedImage> {
        let mut out = InterleavedImage::new(self.width, self.height)?;
        for y in 0..self.height {
            let row = out.row_mut(y);
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let [l, cb, cr] = self.pixel(x, y);
                let [r, g, b] = ycbcr_to_rgb(l, cb, cr);
                px.copy_from_slice(&[r, g, b, 255]);
            }
        }
        Ok(out)
    }
}

/// Four interleaved 8-bit channels per pixel: RGBA or CMYK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterleavedImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl InterleavedImage {
    pub const CHANNELS: usize = 4;

    pub fn new(width: usize, height: usize) -> Result<InterleavedImage> {
        Ok(InterleavedImage {
            width,
            height,
            pixels: try_filled_vec(Self::CHANNELS * width * height, 0u8)?,
        })
    }

    pub fn stride(&self) -> usize {
        Self::CHANNELS * self.width
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let stride = self.stride();
        &mut self.pixels[y * stride..(y + 1) * stride]
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let offset = y * self.stride() + Self::CHANNELS * x;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[offset..offset + Self::CHANNELS]);
        px
    }
}

/// A decoded image in the representation its stream calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Image {
    Gray8(GrayImage),
    YCbCr(YCbCrImage),
    Rgba8(InterleavedImage),
    Cmyk8(InterleavedImage),
}

impl Image {
    pub fn size(&self) -> (usize, usize) {
        match self {
            Image::Gray8(img) => (img.width, img.height),
            Image::YCbCr(img) => (img.width, img.height),
            Image::Rgba8(img) | Image::Cmyk8(img) => (img.width, img.height),
        }
    }
}

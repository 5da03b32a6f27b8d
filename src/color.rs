// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Turns decoded component planes into the final image representation.

use num_traits::FromPrimitive;

use crate::error::{Error, Result};
use crate::frame::FrameState;
use crate::headers::{AdobeTransform, FrameHeader};
use crate::image::{GrayImage, Image, InterleavedImage, Plane, SubsampleRatio, YCbCrImage};
use crate::util::tracing_wrappers::*;

/// The color model of a decoded image, known once the frame header is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    YCbCr,
    Rgba,
    Cmyk,
}

/// JFIF YCbCr to RGB, in 16.16 fixed point.
///
/// R = Y + 1.40200 (Cr - 128)
/// G = Y - 0.34414 (Cb - 128) - 0.71414 (Cr - 128)
/// B = Y + 1.77200 (Cb - 128)
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    // 0x10101 scales Y to 16.16 with the fraction set to Y/256, so that
    // values above 255 saturate exactly at 0xff.
    let yy = y as i32 * 0x10101;
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;

    let clamp = |v: i32| -> u8 {
        if (v as u32) & 0xff00_0000 == 0 {
            (v >> 16) as u8
        } else {
            // Negative values map to 0, overflowing ones to 0xff.
            !(v >> 31) as u8
        }
    };
    [
        clamp(yy + 91881 * cr),
        clamp(yy - 22554 * cb - 46802 * cr),
        clamp(yy + 116130 * cb),
    ]
}

/// Whether a 3-component frame holds RGB rather than YCbCr.
fn is_rgb(header: &FrameHeader, jfif: bool, adobe_transform: Option<u8>) -> bool {
    if jfif {
        return false;
    }
    if adobe_transform.and_then(AdobeTransform::from_u8) == Some(AdobeTransform::Unknown) {
        return true;
    }
    let ids: Vec<u8> = header.components.iter().map(|c| c.id).collect();
    ids == b"RGB"
}

pub(crate) fn color_model(header: &FrameHeader, jfif: bool, adobe_transform: Option<u8>) -> ColorModel {
    match header.num_components() {
        1 => ColorModel::Gray,
        3 if is_rgb(header, jfif, adobe_transform) => ColorModel::Rgba,
        3 => ColorModel::YCbCr,
        _ => ColorModel::Cmyk,
    }
}

/// Subsampling of the planes of components 1 and 2 relative to component 0.
pub(crate) fn subsample_ratio(header: &FrameHeader) -> Result<SubsampleRatio> {
    let (c0, c1) = (&header.components[0], &header.components[1]);
    let ratio = SubsampleRatio::from_factor_ratio(c0.h / c1.h, c0.v / c1.v);
    // Frame header validation only admits the six named ratios.
    debug_assert!(ratio.is_some());
    ratio.ok_or(Error::UnsupportedSubsampling)
}

/// Builds the output image from the planes of a completely decoded frame.
pub(crate) fn assemble(state: FrameState) -> Result<Image> {
    let FrameState {
        header,
        jfif,
        adobe_transform,
        planes,
        ..
    } = state;
    let header = match header {
        Some(header) if !planes.is_empty() => header,
        _ => return Err(Error::MissingSos),
    };
    let model = color_model(&header, jfif, adobe_transform);
    debug!(?model, "assembling image");
    let (width, height) = (header.width, header.height);
    let mut planes = planes.into_iter();
    let mut next_plane = || planes.next().ok_or(Error::MissingSos);

    if model == ColorModel::Gray {
        return Ok(Image::Gray8(GrayImage {
            width,
            height,
            plane: next_plane()?,
        }));
    }

    let ycbcr = YCbCrImage {
        width,
        height,
        y: next_plane()?,
        cb: next_plane()?,
        cr: next_plane()?,
        ratio: subsample_ratio(&header)?,
    };
    match model {
        ColorModel::YCbCr => Ok(Image::YCbCr(ycbcr)),
        ColorModel::Rgba => Ok(Image::Rgba8(planes_to_rgba(&ycbcr)?)),
        _ => {
            let black = next_plane()?;
            match adobe_transform.map(AdobeTransform::from_u8) {
                None => Err(Error::UnknownColorModel),
                Some(Some(AdobeTransform::Unknown)) => {
                    Ok(Image::Cmyk8(interleave_cmyk(&header, &ycbcr, &black)?))
                }
                // Anything other than "unknown" is taken as YCbCrK.
                Some(_) => Ok(Image::Cmyk8(ycbcrk_to_cmyk(&ycbcr, &black)?)),
            }
        }
    }
}

/// Interleaves RGB stored in the Y, Cb and Cr planes, replicating the
/// subsampled planes.
fn planes_to_rgba(image: &YCbCrImage) -> Result<InterleavedImage> {
    let mut out = InterleavedImage::new(image.width, image.height)?;
    for y in 0..image.height {
        for (x, px) in out.row_mut(y).chunks_exact_mut(4).enumerate() {
            let [r, g, b] = image.pixel(x, y);
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }
    Ok(out)
}

/// Adobe CMYK stores every channel inverted.
fn interleave_cmyk(
    header: &FrameHeader,
    image: &YCbCrImage,
    black: &Plane,
) -> Result<InterleavedImage> {
    let c0 = &header.components[0];
    let planes = [&image.y, &image.cb, &image.cr, black];
    let mut out = InterleavedImage::new(image.width, image.height)?;
    for (channel, (plane, component)) in planes.iter().zip(&header.components).enumerate() {
        let shift = (component.h != c0.h || component.v != c0.v) as usize;
        for y in 0..image.height {
            let src = plane.row(y >> shift);
            for (x, px) in out.row_mut(y).chunks_exact_mut(4).enumerate() {
                px[channel] = 255 - src[x >> shift];
            }
        }
    }
    Ok(out)
}

/// YCbCrK converts to RGB and then inverts to CMY, which cancels the Adobe
/// inversion, so only K is inverted.
fn ycbcrk_to_cmyk(image: &YCbCrImage, black: &Plane) -> Result<InterleavedImage> {
    let mut out = image.to_rgba()?;
    for y in 0..image.height {
        let src = black.row(y);
        for (x, px) in out.row_mut(y).chunks_exact_mut(4).enumerate() {
            px[3] = 255 - src[x];
        }
    }
    Ok(out)
}

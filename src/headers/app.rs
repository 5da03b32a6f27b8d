// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use num_derive::FromPrimitive;

use crate::bit_reader::BitReader;
use crate::error::Result;
use crate::util::tracing_wrappers::*;

const JFIF_SIGNATURE: &[u8; 5] = b"JFIF\0";
const ADOBE_SIGNATURE: &[u8; 5] = b"Adobe";
const ADOBE_SEGMENT_LEN: usize = 12;

/// Color transform code carried by an Adobe APP14 segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum AdobeTransform {
    /// RGB for 3 components, CMYK for 4.
    Unknown = 0,
    YCbCr = 1,
    YCbCrK = 2,
}

/// Reads an APP0 payload of `n` bytes and reports whether it starts with a
/// JFIF signature.
pub fn read_app0<R: Read>(br: &mut BitReader<R>, n: usize) -> Result<bool> {
    if n < JFIF_SIGNATURE.len() {
        br.skip(n)?;
        return Ok(false);
    }
    let mut signature = [0u8; 5];
    br.read_full(&mut signature)?;
    br.skip(n - signature.len())?;
    let jfif = &signature == JFIF_SIGNATURE;
    debug!(jfif, "APP0");
    Ok(jfif)
}

/// Reads an APP14 payload of `n` bytes and returns the raw transform byte if
/// the segment carries an Adobe signature.
pub fn read_app14<R: Read>(br: &mut BitReader<R>, n: usize) -> Result<Option<u8>> {
    if n < ADOBE_SEGMENT_LEN {
        br.skip(n)?;
        return Ok(None);
    }
    let mut payload = [0u8; ADOBE_SEGMENT_LEN];
    br.read_full(&mut payload)?;
    br.skip(n - ADOBE_SEGMENT_LEN)?;
    if payload[..ADOBE_SIGNATURE.len()] != ADOBE_SIGNATURE[..] {
        return Ok(None);
    }
    let transform = payload[ADOBE_SEGMENT_LEN - 1];
    debug!(transform, "Adobe APP14");
    Ok(Some(transform))
}

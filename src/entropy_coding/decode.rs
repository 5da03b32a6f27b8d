// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use crate::bit_reader::BitReader;
use crate::error::Result;

/// RECEIVE followed by EXTEND (T.81 F.2.2.1): reads `t` bits and maps them
/// to a value of magnitude category `t`.
///
/// Values below `2^(t-1)` are negative and stored as their one's complement.
/// ```
/// # use jpegdec::bit_reader::BitReader;
/// # use jpegdec::entropy_coding::decode::receive_extend;
/// let mut br = BitReader::new(&[0b011_100_00][..]);
/// assert_eq!(receive_extend(&mut br, 3)?, -4);
/// assert_eq!(receive_extend(&mut br, 3)?, 4);
/// assert_eq!(receive_extend(&mut br, 0)?, 0);
/// # Ok::<(), jpegdec::error::Error>(())
/// ```
#[inline]
pub fn receive_extend<R: Read>(br: &mut BitReader<R>, t: u8) -> Result<i32> {
    let t = t as u32;
    let bits = br.read_bits(t)? as i32;
    let s = 1i32 << t;
    if bits < s >> 1 {
        Ok(bits + (-1i32 << t) + 1)
    } else {
        Ok(bits)
    }
}

/// Reads the length of an end-of-band run whose code carries `r` extra bits
/// (T.81 G.1.2.2). The returned run includes the current block.
#[inline]
pub fn read_eob_run<R: Read>(br: &mut BitReader<R>, r: u8) -> Result<u16> {
    debug_assert!(r < 15);
    let mut run = 1u16 << r;
    if r != 0 {
        run |= br.read_bits(r as u32)? as u16;
    }
    Ok(run)
}
